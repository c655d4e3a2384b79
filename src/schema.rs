//! Compile-time schema descriptions for decodable record types.
//!
//! A record type declares, per field, the column it reads from and the kind
//! of coercion its cells need. The [`sql_record!`](crate::sql_record) macro
//! generates the whole description at definition time, so nothing is
//! introspected per decode call, let alone per row.

use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use num_complex::{Complex32, Complex64};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::coerce::FieldValue;

/// Coercion kind of one record field, fixed at type-definition time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    /// Platform-width signed integer (`isize`)
    Int,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    /// Platform-width unsigned integer (`usize`); parses with the legacy
    /// 16-bit bound
    UInt,
    Float32,
    /// Parses with 32-bit precision (legacy behavior)
    Float64,
    Complex64,
    Complex128,
    Timestamp,
    Text,
    /// Cell holds a JSON-encoded literal decoded via serde
    Json,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Bool => "bool",
            FieldKind::Int8 => "int8",
            FieldKind::Int16 => "int16",
            FieldKind::Int32 => "int32",
            FieldKind::Int64 => "int64",
            FieldKind::Int => "int",
            FieldKind::UInt8 => "uint8",
            FieldKind::UInt16 => "uint16",
            FieldKind::UInt32 => "uint32",
            FieldKind::UInt64 => "uint64",
            FieldKind::UInt => "uint",
            FieldKind::Float32 => "float32",
            FieldKind::Float64 => "float64",
            FieldKind::Complex64 => "complex64",
            FieldKind::Complex128 => "complex128",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Text => "string",
            FieldKind::Json => "json",
        };
        f.write_str(name)
    }
}

/// How a field picks its source column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSpec {
    /// Use the field's own name
    Default,
    /// Use an explicit column annotation
    Named(&'static str),
    /// Never decoded; the field keeps `Default::default()`
    Skip,
}

/// Static description of one record field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// The field's own name
    pub name: &'static str,

    /// Source-column selection
    pub column: ColumnSpec,

    /// Coercion kind; `None` only for skipped fields
    pub kind: Option<FieldKind>,
}

impl FieldSpec {
    /// Effective column name: the explicit annotation if present, else the
    /// field's own name. `None` for skipped fields.
    pub fn column_name(&self) -> Option<&'static str> {
        match self.column {
            ColumnSpec::Default => Some(self.name),
            ColumnSpec::Named(name) => Some(name),
            ColumnSpec::Skip => None,
        }
    }
}

/// Failure to move a coerced [`FieldValue`] into a record field.
#[derive(Debug, Error)]
pub enum AssignError {
    /// A structured cell carried malformed JSON
    #[error("invalid JSON cell: {0}")]
    Json(#[source] serde_json::Error),

    /// The coerced value does not match the field's kind
    #[error("kind mismatch: field expects {expected}, decoder produced {got}")]
    Mismatch { expected: FieldKind, got: FieldKind },

    /// The field index is out of range for this record type
    #[error("unknown field index {0}")]
    UnknownField(usize),

    /// The field is marked as skipped and cannot be assigned
    #[error("field is skipped")]
    Skipped,
}

/// A record type decodable from tabular `run_sql` results.
///
/// Implemented by the [`sql_record!`](crate::sql_record) macro; implement it
/// by hand only when a type needs a column mapping the macro cannot express.
///
/// # Examples
///
/// ```rust
/// use hasura_link::sql_record;
///
/// sql_record! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct User {
///         pub id: i64 => "user_id",
///         pub name: String,
///         pub active: bool,
///     }
/// }
/// ```
pub trait SqlRecord: Default {
    /// Ordered field descriptions, one per declared field.
    const FIELDS: &'static [FieldSpec];

    /// Move a coerced value into the field at `field` (declaration order).
    fn assign(&mut self, field: usize, value: FieldValue<'_>) -> Result<(), AssignError>;
}

/// A Rust type usable as a decodable record field.
///
/// Ties a concrete type to its [`FieldKind`] and to the conversion out of the
/// coercion subsystem's tagged [`FieldValue`].
pub trait SqlField: Sized {
    /// Coercion kind cells of this field are parsed with
    const KIND: FieldKind;

    /// Convert a coerced value into this type
    fn from_value(value: FieldValue<'_>) -> Result<Self, AssignError>;

    /// Value a field keeps when its cell is `NULL` or its column is unmapped
    fn null_value() -> Self;
}

macro_rules! signed_field {
    ($($ty:ty => $kind:ident),+ $(,)?) => {
        $(
            impl SqlField for $ty {
                const KIND: FieldKind = FieldKind::$kind;

                fn from_value(value: FieldValue<'_>) -> Result<Self, AssignError> {
                    match value {
                        // width already checked during coercion
                        FieldValue::Int(v) => Ok(v as $ty),
                        other => Err(AssignError::Mismatch {
                            expected: Self::KIND,
                            got: other.kind(),
                        }),
                    }
                }

                fn null_value() -> Self {
                    0
                }
            }
        )+
    };
}

macro_rules! unsigned_field {
    ($($ty:ty => $kind:ident),+ $(,)?) => {
        $(
            impl SqlField for $ty {
                const KIND: FieldKind = FieldKind::$kind;

                fn from_value(value: FieldValue<'_>) -> Result<Self, AssignError> {
                    match value {
                        FieldValue::UInt(v) => Ok(v as $ty),
                        other => Err(AssignError::Mismatch {
                            expected: Self::KIND,
                            got: other.kind(),
                        }),
                    }
                }

                fn null_value() -> Self {
                    0
                }
            }
        )+
    };
}

signed_field! {
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    isize => Int,
}

unsigned_field! {
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    usize => UInt,
}

impl SqlField for bool {
    const KIND: FieldKind = FieldKind::Bool;

    fn from_value(value: FieldValue<'_>) -> Result<Self, AssignError> {
        match value {
            FieldValue::Bool(v) => Ok(v),
            other => Err(AssignError::Mismatch {
                expected: Self::KIND,
                got: other.kind(),
            }),
        }
    }

    fn null_value() -> Self {
        false
    }
}

impl SqlField for f32 {
    const KIND: FieldKind = FieldKind::Float32;

    fn from_value(value: FieldValue<'_>) -> Result<Self, AssignError> {
        match value {
            FieldValue::Float(v) => Ok(v as f32),
            other => Err(AssignError::Mismatch {
                expected: Self::KIND,
                got: other.kind(),
            }),
        }
    }

    fn null_value() -> Self {
        0.0
    }
}

impl SqlField for f64 {
    const KIND: FieldKind = FieldKind::Float64;

    fn from_value(value: FieldValue<'_>) -> Result<Self, AssignError> {
        match value {
            FieldValue::Float(v) => Ok(v),
            other => Err(AssignError::Mismatch {
                expected: Self::KIND,
                got: other.kind(),
            }),
        }
    }

    fn null_value() -> Self {
        0.0
    }
}

impl SqlField for Complex32 {
    const KIND: FieldKind = FieldKind::Complex64;

    fn from_value(value: FieldValue<'_>) -> Result<Self, AssignError> {
        match value {
            FieldValue::Complex(v) => Ok(Complex32::new(v.re as f32, v.im as f32)),
            other => Err(AssignError::Mismatch {
                expected: Self::KIND,
                got: other.kind(),
            }),
        }
    }

    fn null_value() -> Self {
        Complex32::new(0.0, 0.0)
    }
}

impl SqlField for Complex64 {
    const KIND: FieldKind = FieldKind::Complex128;

    fn from_value(value: FieldValue<'_>) -> Result<Self, AssignError> {
        match value {
            FieldValue::Complex(v) => Ok(v),
            other => Err(AssignError::Mismatch {
                expected: Self::KIND,
                got: other.kind(),
            }),
        }
    }

    fn null_value() -> Self {
        Complex64::new(0.0, 0.0)
    }
}

impl SqlField for DateTime<Utc> {
    const KIND: FieldKind = FieldKind::Timestamp;

    fn from_value(value: FieldValue<'_>) -> Result<Self, AssignError> {
        match value {
            FieldValue::Timestamp(v) => Ok(v),
            other => Err(AssignError::Mismatch {
                expected: Self::KIND,
                got: other.kind(),
            }),
        }
    }

    fn null_value() -> Self {
        DateTime::UNIX_EPOCH
    }
}

impl SqlField for String {
    const KIND: FieldKind = FieldKind::Text;

    fn from_value(value: FieldValue<'_>) -> Result<Self, AssignError> {
        match value {
            FieldValue::Text(v) => Ok(v.to_string()),
            other => Err(AssignError::Mismatch {
                expected: Self::KIND,
                got: other.kind(),
            }),
        }
    }

    fn null_value() -> Self {
        String::new()
    }
}

impl SqlField for serde_json::Value {
    const KIND: FieldKind = FieldKind::Json;

    fn from_value(value: FieldValue<'_>) -> Result<Self, AssignError> {
        match value {
            FieldValue::Json(raw) => serde_json::from_str(raw).map_err(AssignError::Json),
            other => Err(AssignError::Mismatch {
                expected: Self::KIND,
                got: other.kind(),
            }),
        }
    }

    fn null_value() -> Self {
        serde_json::Value::Null
    }
}

/// `None` when the cell is `NULL` or the column is unmapped, `Some` otherwise.
impl<T: SqlField> SqlField for Option<T> {
    const KIND: FieldKind = T::KIND;

    fn from_value(value: FieldValue<'_>) -> Result<Self, AssignError> {
        T::from_value(value).map(Some)
    }

    fn null_value() -> Self {
        None
    }
}

/// Wrapper marking a field whose cells hold JSON-encoded literals.
///
/// Works for any `serde`-deserializable payload; the decoded value is
/// reachable through `Deref` or [`Json::into_inner`].
///
/// # Examples
///
/// ```rust
/// use hasura_link::{sql_record, Json};
/// use std::collections::HashMap;
///
/// sql_record! {
///     #[derive(Debug)]
///     pub struct Event {
///         pub id: i64,
///         pub payload: Json<HashMap<String, i64>>,
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Unwrap the decoded payload
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: DeserializeOwned + Default> SqlField for Json<T> {
    const KIND: FieldKind = FieldKind::Json;

    fn from_value(value: FieldValue<'_>) -> Result<Self, AssignError> {
        match value {
            FieldValue::Json(raw) => serde_json::from_str(raw).map(Json).map_err(AssignError::Json),
            other => Err(AssignError::Mismatch {
                expected: Self::KIND,
                got: other.kind(),
            }),
        }
    }

    fn null_value() -> Self {
        Json(T::default())
    }
}

/// Resolve a header row against a record's field specs.
///
/// Returns, per field in declaration order, the source-column index and the
/// field's coercion kind, or `None` for skipped fields and fields whose
/// effective column name is absent from the header. Matching is exact and
/// case-sensitive; duplicate header names resolve to their first occurrence.
/// A partial mapping is not an error: unmapped fields keep their defaults,
/// which is how callers decode sparse projections.
pub fn resolve_columns(
    header: &[String],
    fields: &[FieldSpec],
) -> Vec<Option<(usize, FieldKind)>> {
    let mut columns: HashMap<&str, usize> = HashMap::with_capacity(header.len());
    for (index, name) in header.iter().enumerate() {
        columns.entry(name.as_str()).or_insert(index);
    }

    fields
        .iter()
        .map(|spec| {
            let name = spec.column_name()?;
            let column = *columns.get(name)?;
            Some((column, spec.kind?))
        })
        .collect()
}

/// Define a struct decodable from tabular `run_sql` results.
///
/// Generates the struct itself plus `Default` and [`SqlRecord`] impls. Three
/// field forms are supported:
///
/// - `name: Type` — reads the column named after the field;
/// - `name: Type => "column"` — reads an explicitly named column;
/// - `name: Type => _` — never decoded; initialized via `Default::default()`.
///
/// # Examples
///
/// ```rust
/// use hasura_link::sql_record;
///
/// sql_record! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct Account {
///         pub id: i64 => "account_id",
///         pub email: String,
///         pub verified: bool,
///         pub request_count: u32 => _,
///     }
/// }
///
/// let account = Account::default();
/// assert_eq!(account.request_count, 0);
/// ```
#[macro_export]
macro_rules! sql_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty $(=> $col:tt)?
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )+
        }

        impl ::core::default::Default for $name {
            fn default() -> Self {
                Self {
                    $(
                        $field: $crate::sql_record!(@default $ty $(, $col)?),
                    )+
                }
            }
        }

        impl $crate::schema::SqlRecord for $name {
            const FIELDS: &'static [$crate::schema::FieldSpec] = &[
                $(
                    $crate::sql_record!(@spec $field, $ty $(, $col)?),
                )+
            ];

            fn assign(
                &mut self,
                field: usize,
                value: $crate::coerce::FieldValue<'_>,
            ) -> ::core::result::Result<(), $crate::schema::AssignError> {
                let mut index = 0usize;
                $(
                    if field == index {
                        return $crate::sql_record!(@assign self, $field, $ty $(, $col)?; value);
                    }
                    index += 1;
                )+
                let _ = index;
                ::core::result::Result::Err($crate::schema::AssignError::UnknownField(field))
            }
        }
    };

    // ---- internal rules ----

    (@default $ty:ty, _) => {
        ::core::default::Default::default()
    };
    (@default $ty:ty, $col:literal) => {
        <$ty as $crate::schema::SqlField>::null_value()
    };
    (@default $ty:ty) => {
        <$ty as $crate::schema::SqlField>::null_value()
    };

    (@spec $field:ident, $ty:ty, _) => {
        $crate::schema::FieldSpec {
            name: ::core::stringify!($field),
            column: $crate::schema::ColumnSpec::Skip,
            kind: ::core::option::Option::None,
        }
    };
    (@spec $field:ident, $ty:ty, $col:literal) => {
        $crate::schema::FieldSpec {
            name: ::core::stringify!($field),
            column: $crate::schema::ColumnSpec::Named($col),
            kind: ::core::option::Option::Some(<$ty as $crate::schema::SqlField>::KIND),
        }
    };
    (@spec $field:ident, $ty:ty) => {
        $crate::schema::FieldSpec {
            name: ::core::stringify!($field),
            column: $crate::schema::ColumnSpec::Default,
            kind: ::core::option::Option::Some(<$ty as $crate::schema::SqlField>::KIND),
        }
    };

    (@assign $self_:expr, $field:ident, $ty:ty, _; $value:ident) => {
        ::core::result::Result::Err($crate::schema::AssignError::Skipped)
    };
    (@assign $self_:expr, $field:ident, $ty:ty, $col:literal; $value:ident) => {{
        $self_.$field = <$ty as $crate::schema::SqlField>::from_value($value)?;
        ::core::result::Result::Ok(())
    }};
    (@assign $self_:expr, $field:ident, $ty:ty; $value:ident) => {{
        $self_.$field = <$ty as $crate::schema::SqlField>::from_value($value)?;
        ::core::result::Result::Ok(())
    }};
}
