//! Background history persistence
//!
//! Saves are spawned as detached tasks so the batch loop never waits on the
//! history store. Failures are logged and counted, not shown to the user.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::client::{ClassifierApi, NewHistoryRecord};

/// Counts of settled saves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistSummary {
    pub saved: usize,
    pub failed: usize,
}

/// Owns the in-flight history save tasks
pub struct HistoryWriter<A: ClassifierApi> {
    api: Arc<A>,
    tasks: JoinSet<bool>,
}

impl<A: ClassifierApi> HistoryWriter<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            tasks: JoinSet::new(),
        }
    }

    /// Start saving `record` without waiting for it
    pub fn submit(&mut self, record: NewHistoryRecord) {
        let api = Arc::clone(&self.api);
        self.tasks.spawn(async move {
            let outcome = api
                .save_history(&record)
                .await
                .and_then(|status| status.into_result());
            match outcome {
                Ok(_) => {
                    debug!("History saved ({})", record.created_at);
                    true
                }
                Err(e) => {
                    warn!("History save failed ({}): {}", record.created_at, e);
                    false
                }
            }
        });
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for every submitted save
    pub async fn drain(&mut self) -> PersistSummary {
        let mut summary = PersistSummary::default();
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(true) => summary.saved += 1,
                Ok(false) => summary.failed += 1,
                Err(e) => {
                    warn!("History save task aborted: {}", e);
                    summary.failed += 1;
                }
            }
        }
        summary
    }
}
