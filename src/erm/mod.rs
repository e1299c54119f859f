//! ERM form results (`ReadNewERM`)
//!
//! One procedure serves every data form; the caller picks the form with
//! `FormID` and gets back whatever columns that form defines.

pub mod forms;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::Result;
use crate::grid::{normalize, NormalizedResult, Pager};
use crate::models::RawRow;

pub use forms::{ErmForm, ErmFormCatalog};

pub const READ_NEW_ERM: &str = "ReadNewERM";

/// Arguments for one `ReadNewERM` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErmQuery {
    pub form_id: i64,
    pub obj_type_list: String,
    pub required_date: Option<NaiveDateTime>,
}

impl ErmQuery {
    pub fn new(form_id: i64) -> Self {
        Self {
            form_id,
            obj_type_list: String::new(),
            required_date: None,
        }
    }
}

/// Lenient date parsing for the `requiredDate` query parameter. Anything
/// unparseable is treated as "no date".
pub fn parse_required_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Runs `ReadNewERM`.
#[async_trait]
pub trait ErmSource: Send + Sync {
    async fn fetch_erm_result(&self, query: &ErmQuery) -> Result<Vec<RawRow>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

/// Response body for `/api/erm`: the normalized result plus the call context.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErmResult {
    #[serde(flatten)]
    pub result: NormalizedResult,
    pub form_id: i64,
    pub procedure_name: &'static str,
    #[serde(flatten)]
    pub page: Option<PageInfo>,
}

impl ErmResult {
    /// Normalize `rows`. With `paging`, only the requested page is kept in
    /// `rows`; `totalRows` and `columns` still describe the full result. A
    /// page outside the result falls back to page 1.
    pub fn build(form_id: i64, rows: Vec<RawRow>, paging: Option<(usize, usize)>) -> Self {
        let mut result = normalize(rows);

        let page = paging.map(|(page, page_size)| {
            let mut pager = Pager::new(page_size);
            pager.go_to_page(page, result.total_rows);
            result.rows = pager.page_of(&result.rows).to_vec();
            PageInfo {
                page: pager.current_page(),
                page_size: pager.page_size(),
                total_pages: pager.total_pages(result.total_rows),
            }
        });

        Self {
            result,
            form_id,
            procedure_name: READ_NEW_ERM,
            page,
        }
    }
}
