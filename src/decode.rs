//! Decoding of `run_sql` result matrices into typed records.
//!
//! Entry points come in four shapes: single result or bulk envelope, each
//! from a reader or from an in-memory buffer. All of them parse the JSON
//! envelope first and then hand tabular results to [`decode_result`].

use std::io::Read;

use crate::coerce::{is_null, parse_cell};
use crate::error::{HasuraLinkError, Result};
use crate::models::QueryResult;
use crate::schema::{resolve_columns, AssignError, SqlRecord};

/// Decode a single-result response read from `reader`.
///
/// A non-tabular result, or a tabular result with fewer than two rows
/// (header only, or empty), appends nothing and succeeds.
pub fn decode<T, R>(reader: R, records: &mut Vec<T>) -> Result<()>
where
    T: SqlRecord,
    R: Read,
{
    let raw: QueryResult = serde_json::from_reader(reader)?;
    decode_result(&raw, records)
}

/// Decode a single-result response held in memory.
pub fn decode_bytes<T: SqlRecord>(input: &[u8], records: &mut Vec<T>) -> Result<()> {
    let raw: QueryResult = serde_json::from_slice(input)?;
    decode_result(&raw, records)
}

/// Decode a bulk response read from `reader`. See [`decode_bulk_results`]
/// for the routing contract.
pub fn decode_bulk<R: Read>(reader: R, targets: &mut [&mut dyn DecodeTarget]) -> Result<()> {
    let raw: Vec<QueryResult> = serde_json::from_reader(reader)?;
    decode_bulk_results(&raw, targets)
}

/// Decode a bulk response held in memory. See [`decode_bulk_results`] for
/// the routing contract.
pub fn decode_bulk_bytes(input: &[u8], targets: &mut [&mut dyn DecodeTarget]) -> Result<()> {
    let raw: Vec<QueryResult> = serde_json::from_slice(input)?;
    decode_bulk_results(&raw, targets)
}

/// Decode one parsed result into `records`.
///
/// The column mapping is built once from the header row and reused for every
/// data row. Rows decode in order; unmapped fields and `NULL` cells leave
/// the field at its default. On the first failing cell the error is returned
/// with row and field context, and records already appended for prior rows
/// stay in place (decoding is not rolled back).
pub fn decode_result<T: SqlRecord>(raw: &QueryResult, records: &mut Vec<T>) -> Result<()> {
    let Some(rows) = raw.rows() else {
        return Ok(());
    };
    if rows.len() < 2 {
        return Ok(());
    }

    let header = &rows[0];
    let mapping = resolve_columns(header, T::FIELDS);

    for (row_index, row) in rows[1..].iter().enumerate() {
        let mut record = T::default();
        for (field_index, slot) in mapping.iter().enumerate() {
            let Some((column, kind)) = *slot else {
                continue;
            };
            let cell = row.get(column).ok_or(HasuraLinkError::RowArity {
                row: row_index,
                expected: header.len(),
                actual: row.len(),
            })?;
            if is_null(cell) {
                continue;
            }
            let value = parse_cell(kind, cell).ok_or_else(|| HasuraLinkError::Conversion {
                expected: kind,
                value: cell.clone(),
                row: row_index,
                field: field_index,
            })?;
            record
                .assign(field_index, value)
                .map_err(|err| match err {
                    AssignError::Json(source) => HasuraLinkError::CellJson {
                        row: row_index,
                        field: field_index,
                        source,
                    },
                    other => HasuraLinkError::Internal(format!(
                        "row {row_index}, field {field_index}: {other}"
                    )),
                })?;
        }
        records.push(record);
    }
    Ok(())
}

/// A destination a bulk result can be decoded into.
///
/// Blanket-implemented for `Vec<T>` of any [`SqlRecord`]; the object-safe
/// indirection is what lets one bulk call fill differently-typed vectors.
pub trait DecodeTarget {
    /// Decode one tabular result into this destination
    fn decode_result(&mut self, result: &QueryResult) -> Result<()>;
}

impl<T: SqlRecord> DecodeTarget for Vec<T> {
    fn decode_result(&mut self, result: &QueryResult) -> Result<()> {
        decode_result(result, self)
    }
}

/// Route each tabular result of a bulk envelope to the next target.
///
/// The contract is positional among the *tabular* results only: results
/// tagged `CommandOk` are skipped entirely and consume no target, so callers
/// must supply exactly one target per statement they expect rows from, in
/// statement order. More tabular results than targets is an error; fewer
/// simply leaves the remaining targets untouched.
///
/// # Examples
///
/// ```rust
/// use hasura_link::{decode_bulk_bytes, sql_record};
///
/// sql_record! {
///     #[derive(Debug, PartialEq)]
///     struct Row {
///         id: i64,
///     }
/// }
///
/// let body = br#"[
///     {"result_type": "CommandOk", "result": null},
///     {"result_type": "TuplesOk", "result": [["id"], ["7"]]}
/// ]"#;
///
/// let mut rows: Vec<Row> = Vec::new();
/// decode_bulk_bytes(body, &mut [&mut rows])?;
/// assert_eq!(rows, vec![Row { id: 7 }]);
/// # Ok::<(), hasura_link::HasuraLinkError>(())
/// ```
pub fn decode_bulk_results(
    results: &[QueryResult],
    targets: &mut [&mut dyn DecodeTarget],
) -> Result<()> {
    let supplied = targets.len();
    let mut cursor = 0usize;
    for result in results {
        if !result.is_tabular() {
            continue;
        }
        let target = targets
            .get_mut(cursor)
            .ok_or(HasuraLinkError::BulkTargets { supplied })?;
        target.decode_result(result)?;
        cursor += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QueryResultType;
    use crate::schema::Json;
    use crate::sql_record;
    use chrono::{DateTime, TimeZone, Utc};

    sql_record! {
        #[derive(Debug, Clone, PartialEq)]
        struct Basic {
            string: String,
            bool: bool,
            int: isize,
        }
    }

    sql_record! {
        #[derive(Debug, Clone, PartialEq)]
        struct Annotated {
            column_1: String => "col1",
            column_2: isize => "col2",
        }
    }

    sql_record! {
        #[derive(Debug, Clone)]
        struct Wide {
            id: i64,
            ratio: f64,
            seen_at: DateTime<Utc>,
            tags: Json<Vec<String>>,
            note: Option<String>,
        }
    }

    fn tabular(rows: &[&[&str]]) -> QueryResult {
        QueryResult {
            result_type: QueryResultType::TuplesOk,
            result: Some(
                rows.iter()
                    .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                    .collect(),
            ),
        }
    }

    fn command_ok() -> QueryResult {
        QueryResult {
            result_type: QueryResultType::CommandOk,
            result: None,
        }
    }

    // ==================== Decode Engine Tests ====================

    #[test]
    fn test_decode_basic_rows_with_null_cell() {
        let result = tabular(&[
            &["string", "bool", "int"],
            &["s1", "true", "1"],
            &["null", "false", "2"],
        ]);

        let records: Vec<Basic> = result.decode().unwrap();
        assert_eq!(
            records,
            vec![
                Basic {
                    string: "s1".to_string(),
                    bool: true,
                    int: 1,
                },
                // lowercase `null` matches the sentinel case-insensitively,
                // leaving the string field at its empty default
                Basic {
                    string: String::new(),
                    bool: false,
                    int: 2,
                },
            ]
        );
    }

    #[test]
    fn test_decode_postgres_bool_cells() {
        // Postgres serializes booleans as t/f
        let result = tabular(&[
            &["string", "bool", "int"],
            &["a", "t", "1"],
            &["b", "f", "2"],
        ]);

        let records: Vec<Basic> = result.decode().unwrap();
        assert!(records[0].bool);
        assert!(!records[1].bool);
    }

    #[test]
    fn test_record_count_is_row_count_minus_header() {
        let result = tabular(&[&["int"], &["1"], &["2"], &["3"]]);
        let records: Vec<Basic> = result.decode().unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_header_only_result_decodes_to_zero_records() {
        let result = tabular(&[&["string", "bool", "int"]]);
        let records: Vec<Basic> = result.decode().unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_empty_result_decodes_to_zero_records() {
        let result = tabular(&[]);
        let records: Vec<Basic> = result.decode().unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_command_ok_decodes_to_zero_records() {
        let records: Vec<Basic> = command_ok().decode().unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_unmapped_fields_keep_defaults() {
        let result = tabular(&[&["bool"], &["true"]]);
        let records: Vec<Basic> = result.decode().unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].string, "");
        assert!(records[0].bool);
        assert_eq!(records[0].int, 0);
    }

    #[test]
    fn test_row_order_is_preserved() {
        let result = tabular(&[&["int"], &["3"], &["1"], &["2"], &["1"]]);
        let records: Vec<Basic> = result.decode().unwrap();
        let ints: Vec<isize> = records.iter().map(|r| r.int).collect();

        // no reordering, filtering, or deduplication
        assert_eq!(ints, vec![3, 1, 2, 1]);
    }

    #[test]
    fn test_conversion_error_carries_row_and_field_context() {
        let result = tabular(&[
            &["string", "bool", "int"],
            &["ok", "true", "1"],
            &["bad", "true", "abc"],
        ]);

        let mut records: Vec<Basic> = Vec::new();
        let err = decode_result(&result, &mut records).unwrap_err();

        match err {
            HasuraLinkError::Conversion {
                value, row, field, ..
            } => {
                assert_eq!(value, "abc");
                assert_eq!(row, 1);
                assert_eq!(field, 2);
            }
            other => panic!("expected Conversion, got {other:?}"),
        }

        // prior rows stay appended; decoding is not transactional
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].string, "ok");
    }

    #[test]
    fn test_short_row_reports_arity_error() {
        let result = tabular(&[&["string", "bool", "int"], &["only-one"]]);

        let mut records: Vec<Basic> = Vec::new();
        let err = decode_result(&result, &mut records).unwrap_err();

        assert!(matches!(
            err,
            HasuraLinkError::RowArity {
                row: 0,
                expected: 3,
                actual: 1,
            }
        ));
    }

    #[test]
    fn test_decode_wide_record() {
        let result = tabular(&[
            &["id", "ratio", "seen_at", "tags", "note"],
            &["42", "0.25", "2024-06-01T12:30:45Z", r#"["a", "b"]"#, "hello"],
            &["43", "NULL", "2024-06-01", "[]", "NULL"],
        ]);

        let records: Vec<Wide> = result.decode().unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].id, 42);
        assert_eq!(records[0].ratio, 0.25);
        assert_eq!(
            records[0].seen_at,
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 45).unwrap()
        );
        assert_eq!(*records[0].tags, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(records[0].note.as_deref(), Some("hello"));

        assert_eq!(records[1].ratio, 0.0);
        assert!(records[1].tags.is_empty());
        assert_eq!(records[1].note, None);
    }

    #[test]
    fn test_malformed_json_cell_reports_cell_json_error() {
        let result = tabular(&[
            &["id", "ratio", "seen_at", "tags", "note"],
            &["1", "0.5", "2024-06-01", "[broken", "x"],
        ]);

        let mut records: Vec<Wide> = Vec::new();
        let err = decode_result(&result, &mut records).unwrap_err();

        assert!(matches!(
            err,
            HasuraLinkError::CellJson { row: 0, field: 3, .. }
        ));
    }

    // ==================== Entry Point Tests ====================

    #[test]
    fn test_decode_bytes_round_trip() {
        let body = br#"{"result_type": "TuplesOk", "result": [["int"], ["5"]]}"#;

        let mut records: Vec<Basic> = Vec::new();
        decode_bytes(body, &mut records).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].int, 5);
    }

    #[test]
    fn test_decode_from_reader() {
        let body = br#"{"result_type": "TuplesOk", "result": [["int"], ["5"]]}"#;

        let mut records: Vec<Basic> = Vec::new();
        decode(&body[..], &mut records).unwrap();

        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_malformed_envelope_is_fatal() {
        let mut records: Vec<Basic> = Vec::new();
        let err = decode_bytes(b"{not json", &mut records).unwrap_err();

        assert!(matches!(err, HasuraLinkError::Envelope(_)));
        assert!(records.is_empty());
    }

    // ==================== Bulk Demultiplexer Tests ====================

    #[test]
    fn test_bulk_skips_non_tabular_results() {
        let results = vec![
            command_ok(),
            tabular(&[&["col1", "col2"], &["foo", "1"]]),
            command_ok(),
        ];

        let mut annotated: Vec<Annotated> = Vec::new();
        decode_bulk_results(&results, &mut [&mut annotated]).unwrap();

        assert_eq!(
            annotated,
            vec![Annotated {
                column_1: "foo".to_string(),
                column_2: 1,
            }]
        );
    }

    #[test]
    fn test_bulk_routes_tabular_results_in_order() {
        let results = vec![
            tabular(&[&["int"], &["1"]]),
            command_ok(),
            tabular(&[&["col1", "col2"], &["bar", "2"]]),
        ];

        let mut basics: Vec<Basic> = Vec::new();
        let mut annotated: Vec<Annotated> = Vec::new();
        decode_bulk_results(&results, &mut [&mut basics, &mut annotated]).unwrap();

        assert_eq!(basics.len(), 1);
        assert_eq!(basics[0].int, 1);
        assert_eq!(annotated[0].column_1, "bar");
    }

    #[test]
    fn test_bulk_fails_when_targets_run_short() {
        let results = vec![
            tabular(&[&["int"], &["1"]]),
            tabular(&[&["int"], &["2"]]),
        ];

        let mut basics: Vec<Basic> = Vec::new();
        let err = decode_bulk_results(&results, &mut [&mut basics]).unwrap_err();

        assert!(matches!(err, HasuraLinkError::BulkTargets { supplied: 1 }));
        // the first tabular result was already decoded
        assert_eq!(basics.len(), 1);
    }

    #[test]
    fn test_bulk_leaves_extra_targets_untouched() {
        let results = vec![command_ok(), tabular(&[&["int"], &["1"]])];

        let mut first: Vec<Basic> = Vec::new();
        let mut second: Vec<Basic> = Vec::new();
        decode_bulk_results(&results, &mut [&mut first, &mut second]).unwrap();

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }

    #[test]
    fn test_bulk_propagates_conversion_errors() {
        let results = vec![tabular(&[&["int"], &["abc"]])];

        let mut basics: Vec<Basic> = Vec::new();
        let err = decode_bulk_results(&results, &mut [&mut basics]).unwrap_err();

        assert!(matches!(err, HasuraLinkError::Conversion { .. }));
    }

    #[test]
    fn test_decode_bulk_bytes() {
        let body = br#"[
            {"result_type": "CommandOk", "result": null},
            {"result_type": "TuplesOk", "result": [["int"], ["9"]]}
        ]"#;

        let mut basics: Vec<Basic> = Vec::new();
        decode_bulk_bytes(body, &mut [&mut basics]).unwrap();

        assert_eq!(basics.len(), 1);
        assert_eq!(basics[0].int, 9);
    }
}
