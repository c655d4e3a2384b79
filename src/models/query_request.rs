use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Request payload for the `/v2/query` endpoint.
///
/// # Examples
///
/// ```rust
/// use hasura_link::RequestBody;
///
/// // Single statement
/// let request = RequestBody::run_sql("default", "SELECT * FROM users", false);
///
/// // Batched statements, answered by an array of results
/// let request = RequestBody::bulk(vec![
///     RequestBody::run_sql("default", "CREATE TABLE t (id int)", false),
///     RequestBody::run_sql("default", "SELECT * FROM t", false),
/// ]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    /// Request type (`run_sql`, `bulk`, ...)
    #[serde(rename = "type")]
    pub kind: String,

    /// Optional API version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    /// Type-specific arguments
    pub args: RequestArgs,
}

/// Arguments of a [`RequestBody`], shaped by its `type` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestArgs {
    /// Arguments of a `run_sql` request
    RunSql(RunSqlArgs),

    /// Nested requests of a `bulk` request
    Bulk(Vec<RequestBody>),

    /// Escape hatch for request types this crate has no model for
    Raw(JsonValue),
}

/// Arguments of a `run_sql` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSqlArgs {
    /// Cascade side effects to dependent metadata objects
    pub cascade: bool,

    /// Name of the database source to run against
    pub source: String,

    /// SQL text to execute
    pub sql: String,

    /// Hint that the statement does not modify data
    pub read_only: bool,
}

impl RequestBody {
    /// Create a `run_sql` request
    pub fn run_sql(source: &str, sql: &str, cascade: bool) -> Self {
        Self {
            kind: "run_sql".to_string(),
            version: None,
            args: RequestArgs::RunSql(RunSqlArgs {
                cascade,
                source: source.to_string(),
                sql: sql.to_string(),
                read_only: false,
            }),
        }
    }

    /// Create a `bulk` request wrapping multiple sub-requests
    pub fn bulk(requests: Vec<RequestBody>) -> Self {
        Self {
            kind: "bulk".to_string(),
            version: None,
            args: RequestArgs::Bulk(requests),
        }
    }
}
