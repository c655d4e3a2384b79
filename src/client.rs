//! Main Hasura client with builder pattern.
//!
//! Provides the primary interface for sending `run_sql` and `bulk` requests
//! and decoding their results into typed records.

use std::time::Duration;

use crate::auth::AuthProvider;
use crate::decode::{decode_bulk_results, DecodeTarget};
use crate::error::{HasuraLinkError, Result};
use crate::models::{QueryResult, RequestBody};
use crate::query::QueryExecutor;
use crate::schema::SqlRecord;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Client for the Hasura `/v2/query` API.
///
/// Use [`HasuraClient::builder`] to construct instances with custom
/// configuration.
///
/// # Examples
///
/// ```rust,no_run
/// use hasura_link::HasuraClient;
///
/// # async fn example() -> hasura_link::Result<()> {
/// let client = HasuraClient::builder()
///     .base_url("http://localhost:8080")
///     .admin_secret("myadminsecretkey")
///     .build()?;
///
/// let result = client.run_sql("default", "SELECT id, name FROM users", false).await?;
/// println!("rows: {:?}", result.rows());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HasuraClient {
    base_url: String,
    query_executor: QueryExecutor,
}

impl HasuraClient {
    /// Create a new builder for configuring the client
    pub fn builder() -> HasuraClientBuilder {
        HasuraClientBuilder::new()
    }

    /// The configured server base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The underlying query executor, for raw request submission
    pub fn query(&self) -> &QueryExecutor {
        &self.query_executor
    }

    /// Execute one SQL statement and return the raw result envelope.
    pub async fn run_sql(&self, source: &str, sql: &str, cascade: bool) -> Result<QueryResult> {
        self.query_executor.run_sql(source, sql, cascade).await
    }

    /// Execute one SQL statement and decode its rows into typed records.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use hasura_link::{sql_record, HasuraClient};
    ///
    /// sql_record! {
    ///     #[derive(Debug)]
    ///     struct User {
    ///         id: i64,
    ///         name: String,
    ///     }
    /// }
    ///
    /// # async fn example(client: &HasuraClient) -> hasura_link::Result<()> {
    /// let users: Vec<User> = client
    ///     .run_sql_into("default", "SELECT id, name FROM users", false)
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run_sql_into<T: SqlRecord>(
        &self,
        source: &str,
        sql: &str,
        cascade: bool,
    ) -> Result<Vec<T>> {
        let result = self.run_sql(source, sql, cascade).await?;
        result.decode()
    }

    /// Send multiple requests at once and return the raw result envelopes.
    pub async fn bulk(&self, requests: Vec<RequestBody>) -> Result<Vec<QueryResult>> {
        self.query_executor.bulk(requests).await
    }

    /// Send multiple requests at once and decode the tabular results.
    ///
    /// Routing is positional among tabular results only: `CommandOk`
    /// results are skipped and consume no target. Supply one target per
    /// statement expected to return rows, in statement order.
    pub async fn bulk_into(
        &self,
        requests: Vec<RequestBody>,
        targets: &mut [&mut dyn DecodeTarget],
    ) -> Result<()> {
        let results = self.bulk(requests).await?;
        decode_bulk_results(&results, targets)
    }
}

/// Builder for [`HasuraClient`].
#[derive(Debug, Default)]
pub struct HasuraClientBuilder {
    base_url: Option<String>,
    auth: AuthProvider,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    max_retries: Option<u32>,
    http_client: Option<reqwest::Client>,
}

impl HasuraClientBuilder {
    /// Create a builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the server base URL (required), e.g. `http://localhost:8080`
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Authenticate with an admin secret
    pub fn admin_secret(mut self, secret: impl Into<String>) -> Self {
        self.auth = AuthProvider::admin_secret(secret.into());
        self
    }

    /// Set the overall request timeout (default: 30 seconds)
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout (default: 10 seconds)
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the retry limit for transient transport failures (default: 3)
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Supply a preconfigured HTTP client, bypassing the timeout settings
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<HasuraClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| HasuraLinkError::Configuration("base_url is required".into()))?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
                .connect_timeout(self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT))
                .build()
                .map_err(|e| HasuraLinkError::Configuration(e.to_string()))?,
        };

        let query_executor = QueryExecutor::new(
            &base_url,
            http_client,
            self.auth,
            self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
        );

        Ok(HasuraClient {
            base_url,
            query_executor,
        })
    }
}
