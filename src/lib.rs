//! Client library for the Hasura `/v2/query` API.
//!
//! The server executes SQL through `run_sql` and answers with an untyped
//! tabular matrix: string cells, header row first. This crate turns those
//! matrices into caller-defined typed records. Record types are declared
//! with the [`sql_record!`] macro, which fixes the column mapping and the
//! per-field coercion kind at compile time; decoding then resolves the
//! header once per result and coerces cells row by row.
//!
//! Decoding works on raw bytes or readers without any client at all, and the
//! bundled [`HasuraClient`] adds the HTTP transport, admin-secret
//! authentication and `run_sql`/`bulk` request construction on top.
//!
//! # Examples
//!
//! Decoding a response body, no server required:
//!
//! ```rust
//! use hasura_link::{decode_bytes, sql_record};
//!
//! sql_record! {
//!     #[derive(Debug, PartialEq)]
//!     struct User {
//!         id: i64 => "user_id",
//!         name: String,
//!         active: bool,
//!     }
//! }
//!
//! let body = br#"{
//!     "result_type": "TuplesOk",
//!     "result": [
//!         ["user_id", "name", "active"],
//!         ["1", "alice", "true"],
//!         ["2", "NULL", "false"]
//!     ]
//! }"#;
//!
//! let mut users: Vec<User> = Vec::new();
//! decode_bytes(body, &mut users)?;
//!
//! assert_eq!(users.len(), 2);
//! assert_eq!(users[0], User { id: 1, name: "alice".to_string(), active: true });
//! // NULL cells leave the field at its default
//! assert_eq!(users[1].name, "");
//! # Ok::<(), hasura_link::HasuraLinkError>(())
//! ```
//!
//! Executing SQL against a running server:
//!
//! ```rust,no_run
//! use hasura_link::HasuraClient;
//!
//! # async fn example() -> hasura_link::Result<()> {
//! let client = HasuraClient::builder()
//!     .base_url("http://localhost:8080")
//!     .admin_secret("myadminsecretkey")
//!     .build()?;
//!
//! let result = client.run_sql("default", "SELECT 1", false).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod coerce;
pub mod decode;
pub mod error;
pub mod models;
pub mod query;
pub mod schema;

pub use auth::AuthProvider;
pub use client::{HasuraClient, HasuraClientBuilder};
pub use coerce::FieldValue;
pub use decode::{
    decode, decode_bulk, decode_bulk_bytes, decode_bulk_results, decode_bytes, decode_result,
    DecodeTarget,
};
pub use error::{HasuraLinkError, Result};
pub use models::{ErrorResponse, QueryResult, QueryResultType, RequestArgs, RequestBody, RunSqlArgs};
pub use query::QueryExecutor;
pub use schema::{
    resolve_columns, AssignError, ColumnSpec, FieldKind, FieldSpec, Json, SqlField, SqlRecord,
};
