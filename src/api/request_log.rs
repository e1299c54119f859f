//! In-memory log of recent API calls
//!
//! Backs the diagnostics panel: the last [`REQUEST_LOG_CAPACITY`] calls,
//! most recent first. Calls to the log endpoint itself are not recorded.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

pub const REQUEST_LOG_CAPACITY: usize = 50;

const LOGS_PATH: &str = "/api/logs";

/// Response extension a handler sets to name the procedure it called.
#[derive(Debug, Clone, Copy)]
pub struct ProcedureName(pub &'static str);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequestLog {
    pub id: Uuid,
    pub method: String,
    pub url: String,
    pub status_code: u16,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub procedure_name: Option<&'static str>,
}

#[derive(Debug, Clone, Default)]
pub struct RequestLog {
    entries: Arc<RwLock<VecDeque<ApiRequestLog>>>,
}

impl RequestLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend `entry`, dropping the oldest past capacity.
    pub async fn record(&self, entry: ApiRequestLog) {
        let mut entries = self.entries.write().await;
        entries.push_front(entry);
        entries.truncate(REQUEST_LOG_CAPACITY);
    }

    /// Most recent first.
    pub async fn snapshot(&self) -> Vec<ApiRequestLog> {
        self.entries.read().await.iter().cloned().collect()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

fn is_logged_path(path: &str) -> bool {
    if path == LOGS_PATH || path.starts_with("/api/logs/") {
        return false;
    }
    path == "/health" || path == "/api" || path.starts_with("/api/")
}

/// Middleware recording each API call into the [`RequestLog`].
pub async fn record_request(
    State(log): State<RequestLog>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if !is_logged_path(&path) {
        return next.run(request).await;
    }

    let method = request.method().to_string();
    let url = request.uri().to_string();
    let start_time = Instant::now();

    let response = next.run(request).await;

    let duration = start_time.elapsed();
    let status = response.status();
    debug!("{} {} - {} - {:?}", method, url, status, duration);

    log.record(ApiRequestLog {
        id: Uuid::new_v4(),
        method,
        url,
        status_code: status.as_u16(),
        duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        timestamp: Utc::now(),
        procedure_name: response
            .extensions()
            .get::<ProcedureName>()
            .map(|p| p.0),
    })
    .await;

    response
}
