//! ERM grid endpoints

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};

use super::envelope::{ApiError, ApiResponse};
use super::request_log::ProcedureName;
use super::state::AppState;
use crate::erm::{parse_required_date, ErmForm, ErmQuery, ErmResult, READ_NEW_ERM};
use crate::grid::DEFAULT_PAGE_SIZE;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErmParams {
    pub form_id: Option<String>,
    pub obj_type_list: Option<String>,
    pub required_date: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl ErmParams {
    fn to_query(&self) -> Result<ErmQuery, ApiError> {
        let raw = self
            .form_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::BadRequest("formId is required".to_string()))?;
        let form_id = raw
            .parse::<i64>()
            .map_err(|_| ApiError::BadRequest(format!("formId must be an integer, got '{}'", raw)))?;

        let required_date = self.required_date.as_deref().and_then(|raw| {
            let parsed = parse_required_date(raw);
            if parsed.is_none() && !raw.trim().is_empty() {
                warn!("Ignoring unparseable requiredDate '{}'", raw);
            }
            parsed
        });

        Ok(ErmQuery {
            form_id,
            obj_type_list: self.obj_type_list.clone().unwrap_or_default(),
            required_date,
        })
    }

    /// `Some((page, size))` when the caller asked for a page.
    fn paging(&self) -> Option<(usize, usize)> {
        if self.page.is_none() && self.page_size.is_none() {
            return None;
        }
        let page_size = match self.page_size {
            Some(0) | None => DEFAULT_PAGE_SIZE,
            Some(size) => size,
        };
        Some((self.page.unwrap_or(1), page_size))
    }
}

/// GET /api/erm?formId=..&objTypeList=..&requiredDate=..&page=..&pageSize=..
pub async fn get_erm(
    State(state): State<AppState>,
    params: Result<Query<ErmParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let query = params.to_query()?;

    let form_name = state
        .erm_forms
        .find(query.form_id)
        .map(|f| f.name.as_str())
        .unwrap_or("unlisted form");
    info!("Loading ERM form {} ({})", query.form_id, form_name);

    let rows = state.erm.fetch_erm_result(&query).await?;
    let result = ErmResult::build(query.form_id, rows, params.paging());

    let mut response = Json(ApiResponse::ok(result)).into_response();
    response.extensions_mut().insert(ProcedureName(READ_NEW_ERM));
    Ok(response)
}

/// GET /api/erm/forms
pub async fn list_erm_forms(State(state): State<AppState>) -> Json<ApiResponse<Vec<ErmForm>>> {
    Json(ApiResponse::ok(state.erm_forms.forms().to_vec()))
}
