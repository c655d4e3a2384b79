use serde::{Deserialize, Serialize};

use crate::decode::decode_result;
use crate::error::Result;
use crate::schema::SqlRecord;

/// Result type tag of a `run_sql` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryResultType {
    /// Statement acknowledged, no row data (DDL, DML without RETURNING)
    CommandOk,

    /// Tabular result: header row followed by data rows
    TuplesOk,
}

/// One result of a `run_sql` or `bulk` request.
///
/// For [`QueryResultType::TuplesOk`] the `result` matrix holds string cells:
/// row 0 is the header (column names), rows 1..N are data rows with the same
/// arity as the header. For [`QueryResultType::CommandOk`] there are no rows.
///
/// # Examples
///
/// ```rust
/// use hasura_link::QueryResult;
///
/// let raw = r#"{"result_type": "TuplesOk", "result": [["id"], ["1"], ["2"]]}"#;
/// let result: QueryResult = serde_json::from_str(raw)?;
///
/// assert!(result.is_tabular());
/// assert_eq!(result.header(), Some(&["id".to_string()][..]));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// Tag selecting the shape of `result`
    pub result_type: QueryResultType,

    /// The result rows as string matrices, header first (`TuplesOk` only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<Vec<String>>>,
}

impl QueryResult {
    /// Whether this result carries row data
    pub fn is_tabular(&self) -> bool {
        self.result_type == QueryResultType::TuplesOk
    }

    /// All rows including the header, if present
    pub fn rows(&self) -> Option<&[Vec<String>]> {
        self.result.as_deref()
    }

    /// The header row (column names), if present
    pub fn header(&self) -> Option<&[String]> {
        self.result.as_ref()?.first().map(|row| row.as_slice())
    }

    /// Decode the data rows into typed records.
    ///
    /// Convenience wrapper around [`decode_result`]; see the `decode` module
    /// for the full set of entry points.
    pub fn decode<T: SqlRecord>(&self) -> Result<Vec<T>> {
        let mut records = Vec::new();
        decode_result(self, &mut records)?;
        Ok(records)
    }
}
