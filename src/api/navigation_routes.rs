//! Navigation endpoints

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::debug;

use super::envelope::{ApiError, ApiResponse};
use super::request_log::ProcedureName;
use super::state::AppState;
use crate::navigation::{
    MenuChild, MenuModule, NavigationState, NavigationTree, ObjNo, READ_NAVIGATION,
};

/// GET /api/navigation
///
/// Raw `{modules, children}` straight from `ReadNavigation`, fetched on every
/// call. The cached tree is not touched.
pub async fn get_navigation(State(state): State<AppState>) -> Result<Response, ApiError> {
    let data = state.navigation_source.fetch_navigation().await?;
    debug!(
        "ReadNavigation: {} modules, {} children",
        data.modules.len(),
        data.children.len()
    );

    let mut response = Json(ApiResponse::ok(data)).into_response();
    response.extensions_mut().insert(ProcedureName(READ_NAVIGATION));
    Ok(response)
}

async fn loaded_tree(state: &AppState) -> Result<Arc<NavigationTree>, ApiError> {
    match state.ensure_navigation().await {
        NavigationState::Ready(tree) => Ok(tree),
        NavigationState::Failed(message) => {
            Err(ApiError::NavigationUnavailable(message.to_string()))
        }
        NavigationState::Empty | NavigationState::Pending => Err(
            ApiError::NavigationUnavailable("navigation is still loading".to_string()),
        ),
    }
}

/// GET /api/navigation/tree
pub async fn get_navigation_tree(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<MenuModule>>>, ApiError> {
    let tree = loaded_tree(&state).await?;
    Ok(Json(ApiResponse::ok(tree.menu())))
}

/// GET /api/navigation/modules/:objNo/children
pub async fn get_module_children(
    State(state): State<AppState>,
    Path(obj_no): Path<String>,
) -> Result<Json<ApiResponse<Vec<MenuChild>>>, ApiError> {
    let tree = loaded_tree(&state).await?;
    let children = tree
        .children_of(&ObjNo::from(obj_no))
        .iter()
        .map(MenuChild::from)
        .collect();
    Ok(Json(ApiResponse::ok(children)))
}
