//! Stored-procedure runner
//!
//! Issues `CALL` statements and converts whatever comes back into ordered
//! `RawRow`s. Column sets are decided by the procedure, so conversion is
//! driven by each column's reported type rather than by a Rust struct.

use futures::TryStreamExt;
use rust_decimal::prelude::ToPrimitive;
use sqlx::mysql::{MySqlArguments, MySqlPool, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, Either, Executor, MySql, Row, TypeInfo};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{RawRow, ScalarValue};

/// A named procedure argument. Names are for logging only; binding is
/// positional.
#[derive(Debug, Clone)]
pub struct ProcedureParam {
    pub name: &'static str,
    pub value: ScalarValue,
}

impl ProcedureParam {
    pub fn new(name: &'static str, value: impl Into<ScalarValue>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// Build the `CALL` text. Null arguments are written inline as `NULL`
/// because MySQL mishandles bound nulls for some procedure parameter types.
pub fn call_statement(procedure: &str, params: &[ProcedureParam]) -> String {
    let placeholders: Vec<&str> = params
        .iter()
        .map(|p| if p.value.is_null() { "NULL" } else { "?" })
        .collect();
    format!(
        "CALL `{}`({})",
        procedure.replace('`', "``"),
        placeholders.join(", ")
    )
}

fn bind_params<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &'q [ProcedureParam],
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match &param.value {
            ScalarValue::Null => query,
            ScalarValue::Boolean(b) => query.bind(*b),
            ScalarValue::Integer(i) => query.bind(*i),
            ScalarValue::Float(f) => query.bind(*f),
            ScalarValue::DateTime(dt) => query.bind(*dt),
            ScalarValue::String(s) => query.bind(s.as_str()),
        };
    }
    query
}

#[derive(Clone)]
pub struct ProcedureRunner {
    pool: MySqlPool,
}

impl ProcedureRunner {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Call a procedure and return its first result set.
    pub async fn call_procedure(
        &self,
        procedure: &str,
        params: &[ProcedureParam],
    ) -> Result<Vec<RawRow>> {
        let mut sets = self.call_procedure_multi(procedure, params).await?;
        Ok(if sets.is_empty() {
            Vec::new()
        } else {
            sets.swap_remove(0)
        })
    }

    /// Call a procedure and return every result set, in order.
    ///
    /// The trailing status packet of a `CALL` shows up as a final empty set;
    /// callers index the sets they expect and ignore the rest.
    pub async fn call_procedure_multi(
        &self,
        procedure: &str,
        params: &[ProcedureParam],
    ) -> Result<Vec<Vec<RawRow>>> {
        let sql = call_statement(procedure, params);
        info!(
            "Calling {} with {}",
            procedure,
            params
                .iter()
                .map(|p| format!("{}={:?}", p.name, p.value))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let query = bind_params(sqlx::query(&sql), params);
        let mut stream = (&self.pool).fetch_many(query);

        let mut sets: Vec<Vec<RawRow>> = Vec::new();
        let mut current: Vec<RawRow> = Vec::new();
        while let Some(item) = stream.try_next().await? {
            match item {
                Either::Left(_) => sets.push(std::mem::take(&mut current)),
                Either::Right(row) => current.push(row_to_raw_row(&row)),
            }
        }
        if !current.is_empty() {
            sets.push(current);
        }

        debug!(
            "{} returned {} result set(s): {:?} rows",
            procedure,
            sets.len(),
            sets.iter().map(Vec::len).collect::<Vec<_>>()
        );
        Ok(sets)
    }
}

/// Convert a database row to a `RawRow`, keeping column order
fn row_to_raw_row(row: &MySqlRow) -> RawRow {
    let mut raw = RawRow::with_capacity(row.columns().len());

    for column in row.columns() {
        let index = column.ordinal();
        let type_name = column.type_info().name();

        let decoded: std::result::Result<Option<ScalarValue>, sqlx::Error> = match type_name {
            "BOOLEAN" => row
                .try_get::<Option<bool>, _>(index)
                .map(|v| v.map(ScalarValue::Boolean)),
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => row
                .try_get::<Option<i64>, _>(index)
                .map(|v| v.map(ScalarValue::Integer)),
            "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
            | "BIGINT UNSIGNED" | "YEAR" => {
                row.try_get::<Option<u64>, _>(index).map(|v| {
                    v.map(|u| match i64::try_from(u) {
                        Ok(i) => ScalarValue::Integer(i),
                        Err(_) => ScalarValue::String(u.to_string()),
                    })
                })
            }
            "FLOAT" | "DOUBLE" => row
                .try_get::<Option<f64>, _>(index)
                .map(|v| v.map(ScalarValue::Float)),
            "DECIMAL" => row
                .try_get::<Option<rust_decimal::Decimal>, _>(index)
                .map(|v| v.and_then(|d| d.to_f64()).map(ScalarValue::Float)),
            "DATETIME" => row
                .try_get::<Option<chrono::NaiveDateTime>, _>(index)
                .map(|v| v.map(ScalarValue::DateTime)),
            "TIMESTAMP" => row
                .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(index)
                .map(|v| v.map(|dt| ScalarValue::DateTime(dt.naive_utc()))),
            "DATE" => row
                .try_get::<Option<chrono::NaiveDate>, _>(index)
                .map(|v| {
                    v.and_then(|d| d.and_hms_opt(0, 0, 0))
                        .map(ScalarValue::DateTime)
                }),
            "TIME" => row
                .try_get::<Option<chrono::NaiveTime>, _>(index)
                .map(|v| v.map(|t| ScalarValue::String(t.to_string()))),
            "NULL" => Ok(None),
            _ => Ok(text_fallback(row, index)),
        };

        let value = decoded_or_fallback(column.name(), type_name, decoded, || {
            text_fallback(row, index)
        });
        raw.insert(column.name(), value);
    }

    raw
}

/// Typed decode result. When the typed read fails (zero dates, YEAR columns
/// without the unsigned flag, ...) the failure is logged and the column's
/// text form is used if one can be read; otherwise the cell is `Null`.
fn decoded_or_fallback(
    column: &str,
    type_name: &str,
    decoded: std::result::Result<Option<ScalarValue>, sqlx::Error>,
    fallback: impl FnOnce() -> Option<ScalarValue>,
) -> ScalarValue {
    let value = match decoded {
        Ok(value) => value,
        Err(e) => {
            warn!(
                "Column {} ({}) did not decode, reading it as text: {}",
                column, type_name, e
            );
            fallback()
        }
    };
    value.unwrap_or(ScalarValue::Null)
}

fn text_fallback(row: &MySqlRow, index: usize) -> Option<ScalarValue> {
    if let Ok(text) = row.try_get::<Option<String>, _>(index) {
        return text.map(ScalarValue::String);
    }
    row.try_get::<Option<Vec<u8>>, _>(index)
        .ok()
        .flatten()
        .map(|bytes| ScalarValue::String(String::from_utf8_lossy(&bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_statement_inlines_nulls() {
        let params = [
            ProcedureParam::new("FormID", 3002443i64),
            ProcedureParam::new("ObjTypeList", ""),
            ProcedureParam::new("RequiredDate", ScalarValue::Null),
        ];
        assert_eq!(
            call_statement("ReadNewERM", &params),
            "CALL `ReadNewERM`(?, ?, NULL)"
        );
    }

    #[test]
    fn test_call_statement_without_params() {
        assert_eq!(call_statement("ReadNavigation", &[]), "CALL `ReadNavigation`()");
    }

    #[test]
    fn test_decode_failure_falls_back_to_text() {
        let err = sqlx::Error::ColumnDecode {
            index: "\"Created\"".to_string(),
            source: "invalid DATETIME".into(),
        };
        let value = decoded_or_fallback("Created", "DATETIME", Err(err), || {
            Some(ScalarValue::from("0000-00-00 00:00:00"))
        });
        assert_eq!(value, ScalarValue::from("0000-00-00 00:00:00"));
    }

    #[test]
    fn test_decoded_values_pass_through() {
        let value = decoded_or_fallback("ObjNo", "INT", Ok(Some(ScalarValue::Integer(7))), || {
            panic!("fallback must not run for a successful decode")
        });
        assert_eq!(value, ScalarValue::Integer(7));
        let value = decoded_or_fallback("Note", "VARCHAR", Ok(None), || None);
        assert!(value.is_null());
    }

    #[test]
    fn test_call_statement_escapes_backticks() {
        assert_eq!(call_statement("odd`name", &[]), "CALL `odd``name`()");
    }
}
