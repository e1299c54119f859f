//! Result normalization for the generic grid
//!
//! The procedures behind each form define their own column set, so columns
//! cannot be known ahead of time. They are taken from the first row.
//!
//! # Precondition
//!
//! Result sets are row-homogeneous: every row carries the same keys in the
//! same order as the first one. This is trusted, not enforced. Debug builds
//! assert it; release builds pass heterogeneous rows through untouched.

use serde::{Deserialize, Serialize};

use crate::models::RawRow;

/// `{columns, rows, totalRows}` projection of a procedure result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResult {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
    pub total_rows: usize,
}

/// Normalize a procedure result set.
pub fn normalize(rows: Vec<RawRow>) -> NormalizedResult {
    debug_assert!(
        is_homogeneous(&rows),
        "result set rows do not share the first row's columns"
    );

    let columns = rows
        .first()
        .map(|first| first.keys().map(str::to_string).collect())
        .unwrap_or_default();
    let total_rows = rows.len();

    NormalizedResult {
        columns,
        rows,
        total_rows,
    }
}

/// Absent result sets normalize the same as empty ones.
pub fn normalize_opt(rows: Option<Vec<RawRow>>) -> NormalizedResult {
    normalize(rows.unwrap_or_default())
}

/// True when every row has exactly the first row's key sequence.
pub fn is_homogeneous(rows: &[RawRow]) -> bool {
    let Some((first, rest)) = rows.split_first() else {
        return true;
    };
    rest.iter().all(|row| row.keys().eq(first.keys()))
}
