//! Load-once cache cell for the navigation tree
//!
//! Several consumers ask for navigation on startup. Only the first `load`
//! performs a fetch; later calls are no-ops. Consumers that need the result
//! subscribe to the state channel (or await `wait_loaded`) instead of polling
//! a flag.
//!
//! ```text
//! Empty ──load()──▶ Pending ──fetch ok──▶ Ready(tree)
//!                          └─fetch err──▶ Failed(message)
//! ```
//!
//! There is no way back to `Empty`. A fresh synthesis needs a new cell.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};

use super::overrides::FormIdOverrideTable;
use super::source::NavigationSource;
use super::synthesize::{synthesize, NavigationTree};

#[derive(Debug, Clone, Default)]
pub enum NavigationState {
    #[default]
    Empty,
    Pending,
    Ready(Arc<NavigationTree>),
    Failed(Arc<str>),
}

impl NavigationState {
    /// `Ready` or `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, NavigationState::Ready(_) | NavigationState::Failed(_))
    }

    pub fn tree(&self) -> Option<Arc<NavigationTree>> {
        match self {
            NavigationState::Ready(tree) => Some(Arc::clone(tree)),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            NavigationState::Failed(message) => Some(&message[..]),
            _ => None,
        }
    }
}

/// Subscriber handle; yields on every state transition.
pub type NavigationWatcher = watch::Receiver<NavigationState>;

pub struct NavigationCell {
    overrides: FormIdOverrideTable,
    state: watch::Sender<NavigationState>,
}

impl NavigationCell {
    pub fn new(overrides: FormIdOverrideTable) -> Self {
        let (state, _) = watch::channel(NavigationState::Empty);
        Self { overrides, state }
    }

    /// Trigger the one-time load. Returns `false` without touching `source`
    /// if a load already started.
    ///
    /// The fetch runs on its own task, so dropping the returned future does
    /// not abandon the load: the cell still reaches `Ready` or `Failed`. A
    /// fetch failure is terminal and never retried.
    pub async fn load(self: &Arc<Self>, source: Arc<dyn NavigationSource>) -> bool {
        let claimed = self.state.send_if_modified(|state| {
            if matches!(state, NavigationState::Empty) {
                *state = NavigationState::Pending;
                true
            } else {
                false
            }
        });
        if !claimed {
            return false;
        }

        let cell = Arc::clone(self);
        let task = tokio::spawn(async move {
            let guard = PendingGuard { cell: &cell };
            let next = guard.cell.fetch_and_synthesize(source.as_ref()).await;
            guard.cell.state.send_replace(next);
        });
        if let Err(e) = task.await {
            error!("Navigation load task ended abnormally: {}", e);
        }
        true
    }

    async fn fetch_and_synthesize(&self, source: &dyn NavigationSource) -> NavigationState {
        match source.fetch_navigation().await {
            Ok(data) => {
                let tree = synthesize(data.modules, data.children, &self.overrides);
                info!(
                    "Navigation loaded: {} modules ({} active), overrides {}",
                    tree.all_modules().len(),
                    tree.active_modules().len(),
                    self.overrides.version
                );
                NavigationState::Ready(Arc::new(tree))
            }
            Err(e) => {
                error!("Navigation load failed: {}", e);
                NavigationState::Failed(Arc::from(e.to_string()))
            }
        }
    }

    pub fn state(&self) -> NavigationState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> NavigationWatcher {
        self.state.subscribe()
    }

    /// Wait for `Ready` or `Failed`. Does not trigger a load by itself.
    pub async fn wait_loaded(&self) -> NavigationState {
        let mut watcher = self.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let state = match watcher.wait_for(NavigationState::is_terminal).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        state
    }

    pub fn is_loading(&self) -> bool {
        matches!(*self.state.borrow(), NavigationState::Pending)
    }

    /// True once a load has finished, successfully or not.
    pub fn is_loaded(&self) -> bool {
        self.state.borrow().is_terminal()
    }

    /// The tree, if the load succeeded. A failed load reads the same as "not
    /// loaded" here; use `state()` to tell the two apart.
    pub fn tree(&self) -> Option<Arc<NavigationTree>> {
        self.state.borrow().tree()
    }

    pub fn overrides(&self) -> &FormIdOverrideTable {
        &self.overrides
    }
}

/// Publishes `Failed` if the load task unwinds before it stores a result.
struct PendingGuard<'a> {
    cell: &'a NavigationCell,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.cell.state.send_if_modified(|state| {
            if matches!(state, NavigationState::Pending) {
                *state = NavigationState::Failed(Arc::from("navigation load aborted"));
                true
            } else {
                false
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PortalError, Result};
    use crate::navigation::source::NavigationData;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl NavigationSource for CountingSource {
        async fn fetch_navigation(&self) -> Result<NavigationData> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if self.fail {
                let source = serde_json::from_str::<u8>("x").unwrap_err();
                Err(PortalError::RowDecode {
                    kind: "navigation module",
                    index: 0,
                    source,
                })
            } else {
                Ok(NavigationData::default())
            }
        }
    }

    fn counting(fail: bool) -> Arc<CountingSource> {
        Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            fail,
        })
    }

    #[tokio::test]
    async fn test_second_load_is_noop() {
        let source = counting(false);
        let cell = Arc::new(NavigationCell::new(FormIdOverrideTable::default()));
        assert!(!cell.is_loaded());

        assert!(cell.load(source.clone()).await);
        assert!(!cell.load(source.clone()).await);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(cell.is_loaded());
        assert!(cell.tree().is_some());
    }

    #[tokio::test]
    async fn test_failure_is_terminal_and_visible() {
        let source = counting(true);
        let cell = Arc::new(NavigationCell::new(FormIdOverrideTable::default()));
        cell.load(source.clone()).await;
        cell.load(source.clone()).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(cell.is_loaded());
        assert!(!cell.is_loading());
        assert!(cell.tree().is_none());
        assert!(cell.state().error().unwrap().contains("navigation module"));
    }
}
