//! Data models for the hasura-link client.
//!
//! Defines the request payloads accepted by the `/v2/query` endpoint and the
//! result envelopes it returns.

pub mod error_response;
pub mod query_request;
pub mod query_result;


pub use error_response::ErrorResponse;
pub use query_request::{RequestArgs, RequestBody, RunSqlArgs};
pub use query_result::{QueryResult, QueryResultType};
