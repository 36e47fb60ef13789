//! Shared state container with a single mutation entry point

use tokio::sync::Mutex;

use super::app_state::{Action, AppState, Effect};
use crate::error::ViewError;

/// Owns the application state; everything else reads snapshots
pub struct AppModel {
    state: Mutex<AppState>,
}

impl AppModel {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(AppState::default()),
        }
    }

    /// Apply one action atomically and return its follow-up effect
    pub async fn apply(&self, action: Action) -> Result<Effect, ViewError> {
        let mut state = self.state.lock().await;
        tracing::trace!(?action, "Applying action");
        state.reduce(action)
    }

    pub async fn snapshot(&self) -> AppState {
        self.state.lock().await.clone()
    }

    pub async fn should_quit(&self) -> bool {
        self.state.lock().await.should_quit
    }
}

impl Default for AppModel {
    fn default() -> Self {
        Self::new()
    }
}
