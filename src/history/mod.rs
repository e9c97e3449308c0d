//! History store proxy
//!
//! The backend is the source of truth. Records are shown in the order the
//! store returns them (newest first) and are never re-sorted here.

mod writer;

pub use writer::{HistoryWriter, PersistSummary};

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::client::{ClassifierApi, HistoryId, HistoryRecord};
use crate::error::ClientError;
use crate::stats::{ChartSeries, CHART_CAPACITY};
use crate::ui::{dates, Notifier};

/// Seed `chart` from a newest-first record list.
///
/// Takes the most recent [`CHART_CAPACITY`] records and pushes them oldest
/// first, so the chart reads chronologically.
pub fn seed_chart(chart: &mut ChartSeries, records: &[HistoryRecord]) {
    for record in records.iter().take(CHART_CAPACITY).rev() {
        chart.push(dates::label_for(&record.created_at), &record.stats());
    }
}

/// Read, delete and export saved detections
pub struct HistoryBrowser<A: ClassifierApi> {
    api: Arc<A>,
    notifier: Arc<dyn Notifier>,
}

impl<A: ClassifierApi> HistoryBrowser<A> {
    pub fn new(api: Arc<A>, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, notifier }
    }

    /// All records, newest first
    pub async fn load(&self) -> Result<Vec<HistoryRecord>, ClientError> {
        let records = self.api.history().await?;
        info!("Loaded {} history record(s)", records.len());
        Ok(records)
    }

    /// Delete one record and return the refreshed list
    pub async fn delete(&self, id: &HistoryId) -> Result<Vec<HistoryRecord>, ClientError> {
        let deleted = self
            .api
            .delete_history(id)
            .await
            .and_then(|status| status.into_result());
        if let Err(e) = deleted {
            self.notifier.error(&e.to_string());
            return Err(e);
        }

        info!("Deleted history record {}", id);
        self.notifier.success("History deleted");
        let refreshed = self.load().await.map_err(|e| {
            self.notifier.error(&format!("Cannot load history: {}", e));
            e
        })?;
        Ok(refreshed)
    }

    /// Download the server-side export into `dest`, returning its size
    pub async fn export(&self, dest: &Path) -> Result<u64> {
        let bytes = self
            .api
            .export_history()
            .await
            .context("Failed to download history export")?;

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        tokio::fs::write(dest, &bytes)
            .await
            .with_context(|| format!("Failed to write export: {}", dest.display()))?;

        info!("Exported history to {}", dest.display());
        self.notifier
            .success(&format!("History exported to {}", dest.display()));
        Ok(bytes.len() as u64)
    }
}
