//! Authentication provider for the Hasura client.
//!
//! Attaches the admin-secret header to outgoing HTTP requests.

/// Header Hasura inspects for admin authentication.
pub const ADMIN_SECRET_HEADER: &str = "x-hasura-admin-secret";

/// Authentication credentials for the Hasura query API.
///
/// # Examples
///
/// ```rust
/// use hasura_link::AuthProvider;
///
/// // Admin secret (the usual mode for the v2 query API)
/// let auth = AuthProvider::admin_secret("myadminsecretkey".to_string());
///
/// // No authentication (server running with auth disabled)
/// let auth = AuthProvider::none();
/// ```
#[derive(Debug, Clone, Default)]
pub enum AuthProvider {
    /// `X-Hasura-Admin-Secret` header authentication
    AdminSecret(String),

    /// No authentication
    #[default]
    None,
}

impl AuthProvider {
    /// Create admin-secret authentication
    pub fn admin_secret(secret: String) -> Self {
        Self::AdminSecret(secret)
    }

    /// No authentication
    pub fn none() -> Self {
        Self::None
    }

    /// Attach authentication headers to an HTTP request builder.
    ///
    /// An empty admin secret attaches nothing, matching the behavior of the
    /// server's own CLI tooling.
    pub fn apply_to_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::AdminSecret(secret) if !secret.is_empty() => {
                request.header(ADMIN_SECRET_HEADER, secret)
            }
            _ => request,
        }
    }

    /// Check if authentication is configured
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::AdminSecret(secret) if !secret.is_empty())
    }
}
