//! Cell-level type coercion.
//!
//! `run_sql` serializes every cell as text; this module turns one cell back
//! into the value its field kind calls for. Parsing is dispatched on
//! [`FieldKind`], which the schema fixed at type-definition time, so no type
//! inspection happens per cell.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use num_complex::{Complex32, Complex64};

use crate::schema::FieldKind;

/// Cells equal to this token (case-insensitively) leave the field untouched.
pub const NULL_SENTINEL: &str = "NULL";

/// Whether a cell is the null sentinel.
pub fn is_null(cell: &str) -> bool {
    cell.eq_ignore_ascii_case(NULL_SENTINEL)
}

/// A coerced cell, tagged with the shape its field kind produced.
///
/// Integer and float variants carry the widest representation; the coercion
/// already enforced the kind's width bound, so narrowing casts on assignment
/// are lossless. `Text` and `Json` borrow from the source row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Complex(Complex64),
    Timestamp(DateTime<Utc>),
    Text(&'a str),
    /// Raw JSON literal, decoded by the destination field
    Json(&'a str),
}

impl FieldValue<'_> {
    /// Representative kind of this value, for mismatch diagnostics.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Bool(_) => FieldKind::Bool,
            FieldValue::Int(_) => FieldKind::Int64,
            FieldValue::UInt(_) => FieldKind::UInt64,
            FieldValue::Float(_) => FieldKind::Float64,
            FieldValue::Complex(_) => FieldKind::Complex128,
            FieldValue::Timestamp(_) => FieldKind::Timestamp,
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Json(_) => FieldKind::Json,
        }
    }
}

/// Coerce one cell to the given kind.
///
/// Returns `None` when the cell cannot be parsed as that kind; the decode
/// engine attaches row and field context to the failure. The null sentinel is
/// the caller's concern ([`is_null`]), not this function's.
pub fn parse_cell<'a>(kind: FieldKind, cell: &'a str) -> Option<FieldValue<'a>> {
    let value = match kind {
        FieldKind::Bool => FieldValue::Bool(parse_bool(cell)?),
        FieldKind::Int8 => FieldValue::Int(cell.parse::<i8>().ok()? as i64),
        FieldKind::Int16 => FieldValue::Int(cell.parse::<i16>().ok()? as i64),
        FieldKind::Int32 => FieldValue::Int(cell.parse::<i32>().ok()? as i64),
        FieldKind::Int64 => FieldValue::Int(cell.parse::<i64>().ok()?),
        FieldKind::Int => FieldValue::Int(cell.parse::<isize>().ok()? as i64),
        FieldKind::UInt8 => FieldValue::UInt(cell.parse::<u8>().ok()? as u64),
        FieldKind::UInt16 => FieldValue::UInt(cell.parse::<u16>().ok()? as u64),
        FieldKind::UInt32 => FieldValue::UInt(cell.parse::<u32>().ok()? as u64),
        FieldKind::UInt64 => FieldValue::UInt(cell.parse::<u64>().ok()?),
        // bare `uint` keeps the legacy 16-bit parse bound
        FieldKind::UInt => FieldValue::UInt(cell.parse::<u16>().ok()? as u64),
        FieldKind::Float32 => FieldValue::Float(cell.parse::<f32>().ok()? as f64),
        // legacy: float64 cells parse with 32-bit precision
        FieldKind::Float64 => FieldValue::Float(cell.parse::<f32>().ok()? as f64),
        FieldKind::Complex64 => {
            let parsed = trim_parens(cell).parse::<Complex32>().ok()?;
            FieldValue::Complex(Complex64::new(parsed.re as f64, parsed.im as f64))
        }
        FieldKind::Complex128 => FieldValue::Complex(trim_parens(cell).parse::<Complex64>().ok()?),
        FieldKind::Timestamp => FieldValue::Timestamp(parse_timestamp(cell)?),
        FieldKind::Text => FieldValue::Text(cell),
        FieldKind::Json => FieldValue::Json(cell),
    };
    Some(value)
}

/// Boolean lexical forms of the wire format. Postgres serializes booleans as
/// `t`/`f`; the legacy decoder also took `1`/`0` and the cased word forms.
fn parse_bool(cell: &str) -> Option<bool> {
    match cell {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Strip one pair of surrounding parentheses, the form `(a+bi)` complex
/// values are serialized in.
fn trim_parens(cell: &str) -> &str {
    cell.strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(cell)
}

/// Time-of-day forms tried for short inputs. The flagged entries carry the
/// legacy 12-hour hour bound.
const SHORT_TIME_FORMATS: &[(&str, bool)] = &[
    ("%H:%M", true),
    ("%H:%M:%S", true),
    ("%I:%M:%S%p", false),
];

/// Best-effort timestamp parse.
///
/// Inputs of 10 characters or fewer are tried as a pure date (`2024-06-01`)
/// and as time-of-day forms anchored at the epoch date; longer inputs are
/// tried as a fractional-seconds-with-offset form and the standard internet
/// timestamp formats, in order. The first format that parses wins. Values
/// without an offset are taken as UTC.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    if input.len() <= 10 {
        if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
            return Some(date.and_time(NaiveTime::default()).and_utc());
        }
        for &(format, twelve_hour_bound) in SHORT_TIME_FORMATS {
            if let Ok(time) = NaiveTime::parse_from_str(input, format) {
                if twelve_hour_bound && time.hour() > 12 {
                    continue;
                }
                return Some(NaiveDate::default().and_time(time).and_utc());
            }
        }
        return None;
    }

    // 2024-06-01 12:30:45.123456-07
    if let Ok(ts) = DateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(ts.with_timezone(&Utc));
    }
    // RFC 3339, any fractional precision
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.with_timezone(&Utc));
    }
    // RFC 2822, which also covers RFC 1123 dates
    if let Ok(ts) = DateTime::parse_from_rfc2822(input) {
        return Some(ts.with_timezone(&Utc));
    }
    // RFC 822 with a numeric zone
    if let Ok(ts) = DateTime::parse_from_str(input, "%d %b %y %H:%M %z") {
        return Some(ts.with_timezone(&Utc));
    }
    None
}
