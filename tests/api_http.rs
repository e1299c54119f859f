//! HTTP-level tests for the portal router.
//!
//! The procedures are replaced by in-memory sources, so no database is
//! needed: these exercise routing, the response envelope, paging, the
//! navigation cache and the request log.

#![cfg(feature = "server")]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use ips_portal::api::{build_router, AppState};
use ips_portal::erm::{ErmFormCatalog, ErmQuery, ErmSource};
use ips_portal::error::{PortalError, Result};
use ips_portal::models::RawRow;
use ips_portal::navigation::{
    FormIdOverrideTable, NavChild, NavModule, NavigationCell, NavigationData, NavigationSource,
};

// ── In-memory sources ──────────────────────────────────────────

#[derive(Default)]
struct MemoryErm {
    rows: Vec<RawRow>,
    fail: bool,
    last_query: Mutex<Option<ErmQuery>>,
}

#[async_trait]
impl ErmSource for MemoryErm {
    async fn fetch_erm_result(&self, query: &ErmQuery) -> Result<Vec<RawRow>> {
        *self.last_query.lock().unwrap() = Some(query.clone());
        if self.fail {
            return Err(PortalError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.rows.clone())
    }
}

#[derive(Default)]
struct MemoryNavigation {
    data: NavigationData,
    fail: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl NavigationSource for MemoryNavigation {
    async fn fetch_navigation(&self) -> Result<NavigationData> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PortalError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.data.clone())
    }
}

// ── Fixtures ───────────────────────────────────────────────────

const ERM: i64 = 3003721;

fn module(obj_no: i64, code: &str, is_active: i64) -> NavModule {
    NavModule {
        obj_no: obj_no.into(),
        code: code.to_string(),
        name: code.to_string(),
        description: String::new(),
        icon: String::new(),
        sort_order: obj_no,
        status_no: 1,
        is_active,
    }
}

fn child(obj_no: i64, code: &str, parent: i64) -> NavChild {
    NavChild {
        obj_no: obj_no.into(),
        code: code.to_string(),
        name: code.to_string(),
        parent_obj_no: parent.into(),
        obj_type_no: 826,
        sort_order: obj_no,
        status_no: 1,
        form_id: None,
    }
}

fn navigation_fixture() -> NavigationData {
    NavigationData {
        modules: vec![
            module(ERM, "ERM", 1),
            module(100, "Admin", 1),
            module(200, "Retired", 0),
        ],
        children: vec![
            child(1, "Stakeholder", ERM),
            child(1, "Stakeholder", ERM),
            child(2, "Custom Thing", ERM),
            child(3, "Users", 100),
        ],
    }
}

fn erm_rows(n: i64) -> Vec<RawRow> {
    (0..n)
        .map(|i| {
            RawRow::new()
                .with("ObjNo", i)
                .with("Name", format!("Row {}", i))
        })
        .collect()
}

struct TestApp {
    router: axum::Router,
    erm: Arc<MemoryErm>,
    navigation: Arc<MemoryNavigation>,
}

fn build_test_app(erm: MemoryErm, navigation: MemoryNavigation) -> TestApp {
    let erm = Arc::new(erm);
    let navigation = Arc::new(navigation);
    let state = AppState::new(
        erm.clone(),
        navigation.clone(),
        Arc::new(NavigationCell::new(FormIdOverrideTable::default())),
        ErmFormCatalog::default(),
    );
    TestApp {
        router: build_router(state),
        erm,
        navigation,
    }
}

async fn send(router: &axum::Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

// ── ERM grid ───────────────────────────────────────────────────

#[tokio::test]
async fn erm_returns_normalized_envelope() {
    let app = build_test_app(
        MemoryErm {
            rows: erm_rows(3),
            ..Default::default()
        },
        MemoryNavigation::default(),
    );

    let (status, body) = send(
        &app.router,
        "GET",
        "/api/erm?formId=3002443&objTypeList=826&requiredDate=2024-01-31",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["error"].is_null());
    let data = &body["data"];
    assert_eq!(data["columns"], serde_json::json!(["ObjNo", "Name"]));
    assert_eq!(data["totalRows"], 3);
    assert_eq!(data["formId"], 3002443);
    assert_eq!(data["procedureName"], "ReadNewERM");
    assert_eq!(data["rows"][2]["Name"], "Row 2");

    let query = app.erm.last_query.lock().unwrap().clone().unwrap();
    assert_eq!(query.obj_type_list, "826");
    assert!(query.required_date.is_some());
}

#[tokio::test]
async fn erm_empty_result() {
    let app = build_test_app(MemoryErm::default(), MemoryNavigation::default());
    let (status, body) = send(&app.router, "GET", "/api/erm?formId=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["columns"], serde_json::json!([]));
    assert_eq!(body["data"]["rows"], serde_json::json!([]));
    assert_eq!(body["data"]["totalRows"], 0);
}

#[tokio::test]
async fn erm_pages_rows_but_keeps_total() {
    let app = build_test_app(
        MemoryErm {
            rows: erm_rows(120),
            ..Default::default()
        },
        MemoryNavigation::default(),
    );
    let (_, body) = send(&app.router, "GET", "/api/erm?formId=1&page=3").await;
    let data = &body["data"];
    assert_eq!(data["totalRows"], 120);
    assert_eq!(data["rows"].as_array().unwrap().len(), 20);
    assert_eq!(data["rows"][0]["ObjNo"], 100);
    assert_eq!(data["page"], 3);
    assert_eq!(data["pageSize"], 50);
    assert_eq!(data["totalPages"], 3);
}

#[tokio::test]
async fn erm_missing_form_id_is_bad_request() {
    let app = build_test_app(MemoryErm::default(), MemoryNavigation::default());

    let (status, body) = send(&app.router, "GET", "/api/erm").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["data"].is_null());

    let (status, _) = send(&app.router, "GET", "/api/erm?formId=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.erm.last_query.lock().unwrap().is_none());
}

#[tokio::test]
async fn erm_upstream_failure_is_500_envelope() {
    let app = build_test_app(
        MemoryErm {
            fail: true,
            ..Default::default()
        },
        MemoryNavigation::default(),
    );
    let (status, body) = send(&app.router, "GET", "/api/erm?formId=1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Database error: "));
}

#[tokio::test]
async fn erm_forms_lists_catalog() {
    let app = build_test_app(MemoryErm::default(), MemoryNavigation::default());
    let (status, body) = send(&app.router, "GET", "/api/erm/forms").await;
    assert_eq!(status, StatusCode::OK);
    let forms = body["data"].as_array().unwrap();
    assert_eq!(forms.len(), 20);
    assert_eq!(forms[0]["id"], 3002443);
    assert_eq!(forms[0]["code"], "Stakeholder");
}

// ── Navigation ─────────────────────────────────────────────────

#[tokio::test]
async fn navigation_raw_sets_fetch_every_time() {
    let app = build_test_app(
        MemoryErm::default(),
        MemoryNavigation {
            data: navigation_fixture(),
            ..Default::default()
        },
    );
    let (status, body) = send(&app.router, "GET", "/api/navigation").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["modules"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"]["children"].as_array().unwrap().len(), 4);

    send(&app.router, "GET", "/api/navigation").await;
    assert_eq!(app.navigation.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn navigation_tree_is_synthesized_once() {
    let app = build_test_app(
        MemoryErm::default(),
        MemoryNavigation {
            data: navigation_fixture(),
            ..Default::default()
        },
    );

    let (status, body) = send(&app.router, "GET", "/api/navigation/tree").await;
    assert_eq!(status, StatusCode::OK);
    let menu = body["data"].as_array().unwrap();
    assert_eq!(menu.len(), 2, "inactive module is hidden");
    assert_eq!(menu[0]["Code"], "ERM");

    let erm_children = menu[0]["Children"].as_array().unwrap();
    assert_eq!(erm_children.len(), 2, "duplicate ERM child is dropped");
    assert_eq!(erm_children[0]["FormID"], "3002443");
    assert_eq!(erm_children[0]["Route"], "/form/3002443");
    assert!(erm_children[1]["FormID"].is_null());
    assert_eq!(erm_children[1]["Route"], format!("/module/{}/2", ERM));

    send(&app.router, "GET", "/api/navigation/tree").await;
    assert_eq!(app.navigation.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn module_children_by_obj_no() {
    let app = build_test_app(
        MemoryErm::default(),
        MemoryNavigation {
            data: navigation_fixture(),
            ..Default::default()
        },
    );
    let (status, body) = send(&app.router, "GET", "/api/navigation/modules/100/children").await;
    assert_eq!(status, StatusCode::OK);
    let children = body["data"].as_array().unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0]["Code"], "Users");

    let (_, body) = send(&app.router, "GET", "/api/navigation/modules/999/children").await;
    assert_eq!(body["data"], serde_json::json!([]));
}

#[tokio::test]
async fn navigation_failure_is_sticky_503() {
    let app = build_test_app(
        MemoryErm::default(),
        MemoryNavigation {
            fail: true,
            ..Default::default()
        },
    );
    let (status, body) = send(&app.router, "GET", "/api/navigation/tree").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app.router, "GET", "/api/navigation/tree").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(app.navigation.calls.load(Ordering::SeqCst), 1);
}

// ── Health and request log ─────────────────────────────────────

#[tokio::test]
async fn health_reports_healthy() {
    let app = build_test_app(MemoryErm::default(), MemoryNavigation::default());
    let (status, body) = send(&app.router, "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["navigationLoaded"], false);
}

#[tokio::test]
async fn request_log_records_and_clears() {
    let app = build_test_app(
        MemoryErm {
            rows: erm_rows(1),
            ..Default::default()
        },
        MemoryNavigation::default(),
    );

    send(&app.router, "GET", "/health").await;
    send(&app.router, "GET", "/api/erm?formId=7").await;
    send(&app.router, "GET", "/api/logs").await;

    let (status, body) = send(&app.router, "GET", "/api/logs").await;
    assert_eq!(status, StatusCode::OK);
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 2, "log reads are not recorded");
    assert_eq!(entries[0]["url"], "/api/erm?formId=7");
    assert_eq!(entries[0]["statusCode"], 200);
    assert_eq!(entries[0]["procedureName"], "ReadNewERM");
    assert_eq!(entries[1]["url"], "/health");
    assert!(entries[1].get("procedureName").is_none());

    let (status, _) = send(&app.router, "DELETE", "/api/logs").await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app.router, "GET", "/api/logs").await;
    assert_eq!(body["data"], serde_json::json!([]));
}
