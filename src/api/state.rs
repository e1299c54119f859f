//! Shared handler state

use std::sync::Arc;

use super::request_log::RequestLog;
use crate::erm::{ErmFormCatalog, ErmSource};
use crate::navigation::{NavigationCell, NavigationSource, NavigationState};

#[derive(Clone)]
pub struct AppState {
    pub erm: Arc<dyn ErmSource>,
    pub navigation_source: Arc<dyn NavigationSource>,
    pub navigation: Arc<NavigationCell>,
    pub erm_forms: Arc<ErmFormCatalog>,
    pub request_log: RequestLog,
}

impl AppState {
    pub fn new(
        erm: Arc<dyn ErmSource>,
        navigation_source: Arc<dyn NavigationSource>,
        navigation: Arc<NavigationCell>,
        erm_forms: ErmFormCatalog,
    ) -> Self {
        Self {
            erm,
            navigation_source,
            navigation,
            erm_forms: Arc::new(erm_forms),
            request_log: RequestLog::new(),
        }
    }

    /// Run the one-time navigation load and wait for its outcome. Safe to
    /// call from every request; only the first one fetches, and a dropped
    /// request does not cancel that fetch.
    pub async fn ensure_navigation(&self) -> NavigationState {
        self.navigation
            .load(Arc::clone(&self.navigation_source))
            .await;
        self.navigation.wait_loaded().await
    }
}
