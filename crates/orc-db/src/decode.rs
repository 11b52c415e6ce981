use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{Row, TypeInfo, ValueRef};

use orc_reconcile::FieldValue;

/// How a Postgres column is lifted into a [`FieldValue`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    Text,
    Int2,
    Int4,
    Int8,
    /// Decimal; integral values become `Int`, others canonical text.
    Numeric,
    Float4,
    Float8,
    /// `true`/`false` as `1`/`0`.
    Bool,
    Date,
    Timestamp,
    TimestampTz,
    /// Binary text; decoded as lossy UTF-8.
    Bytes,
}

/// Map a Postgres type name to its decode rule. `None` for types the
/// ledgers never store a compared field in.
pub fn cell_kind(type_name: &str) -> Option<CellKind> {
    let kind = match type_name.to_ascii_uppercase().as_str() {
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => CellKind::Text,
        "INT2" => CellKind::Int2,
        "INT4" => CellKind::Int4,
        "INT8" => CellKind::Int8,
        "NUMERIC" => CellKind::Numeric,
        "FLOAT4" => CellKind::Float4,
        "FLOAT8" => CellKind::Float8,
        "BOOL" => CellKind::Bool,
        "DATE" => CellKind::Date,
        "TIMESTAMP" => CellKind::Timestamp,
        "TIMESTAMPTZ" => CellKind::TimestampTz,
        "BYTEA" => CellKind::Bytes,
        _ => return None,
    };
    Some(kind)
}

/// Decode column `col` of `row`. SQL NULL is [`FieldValue::Null`].
pub(crate) fn decode_cell(row: &PgRow, table: &str, col: &str) -> Result<FieldValue> {
    let raw = row
        .try_get_raw(col)
        .with_context(|| format!("{table}.{col}: column missing"))?;
    if raw.is_null() {
        return Ok(FieldValue::Null);
    }
    let type_name = raw.type_info().name().to_string();
    let Some(kind) = cell_kind(&type_name) else {
        bail!("{table}.{col}: unsupported column type {type_name}");
    };

    let ctx = || format!("{table}.{col}");
    let value = match kind {
        CellKind::Text => FieldValue::Text(row.try_get::<String, _>(col).with_context(ctx)?),
        CellKind::Int2 => FieldValue::Int(row.try_get::<i16, _>(col).with_context(ctx)?.into()),
        CellKind::Int4 => FieldValue::Int(row.try_get::<i32, _>(col).with_context(ctx)?.into()),
        CellKind::Int8 => FieldValue::Int(row.try_get::<i64, _>(col).with_context(ctx)?),
        CellKind::Numeric => {
            canonical_decimal(row.try_get::<Decimal, _>(col).with_context(ctx)?)
        }
        CellKind::Float4 => {
            canonical_float(row.try_get::<f32, _>(col).with_context(ctx)?.into())
        }
        CellKind::Float8 => canonical_float(row.try_get::<f64, _>(col).with_context(ctx)?),
        CellKind::Bool => {
            FieldValue::Int(row.try_get::<bool, _>(col).with_context(ctx)?.into())
        }
        CellKind::Date => FieldValue::Date(row.try_get::<NaiveDate, _>(col).with_context(ctx)?),
        CellKind::Timestamp => {
            FieldValue::Timestamp(row.try_get::<NaiveDateTime, _>(col).with_context(ctx)?)
        }
        CellKind::TimestampTz => FieldValue::Timestamp(
            row.try_get::<DateTime<Utc>, _>(col)
                .with_context(ctx)?
                .naive_utc(),
        ),
        CellKind::Bytes => {
            let bytes = row.try_get::<Vec<u8>, _>(col).with_context(ctx)?;
            FieldValue::Text(String::from_utf8_lossy(&bytes).into_owned())
        }
    };
    Ok(value)
}

/// `15000.00` and `15000` compare equal; `12.50` renders as `12.5`.
pub fn canonical_decimal(d: Decimal) -> FieldValue {
    let d = d.normalize();
    match d.to_i64() {
        Some(n) if d.scale() == 0 => FieldValue::Int(n),
        _ => FieldValue::Text(d.to_string()),
    }
}

/// Integral floats become `Int`; NaN and infinities are absent.
pub fn canonical_float(f: f64) -> FieldValue {
    if !f.is_finite() {
        return FieldValue::Null;
    }
    match Decimal::from_f64_retain(f) {
        Some(d) => canonical_decimal(d),
        None => FieldValue::Text(f.to_string()),
    }
}

/// Decode a cell that is consumed as a plain string (keys, codes).
pub(crate) fn decode_text(row: &PgRow, table: &str, col: &str) -> Result<Option<String>> {
    Ok(match decode_cell(row, table, col)? {
        FieldValue::Null => None,
        FieldValue::Text(s) => Some(s),
        FieldValue::Int(n) => Some(n.to_string()),
        other => bail!("{table}.{col}: expected text, got {other:?}"),
    })
}
