//! LacakTani Library
//!
//! Client for the LacakTani crop ripeness classifier - uploads field photos
//! one at a time, tallies ripe / unripe / flowering detections, keeps the
//! detection history in sync and manages the server's models.
//!
//! # Features
//!
//! - **Sequential batches**: One request in flight, per-file error isolation
//! - **Background history**: Results are saved without blocking the batch
//! - **Dashboard**: Latest-result panel plus a rolling 20-sample chart
//! - **Model management**: Switch, upload and delete classifier weights
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! use lacaktani::batch::{select_files, BatchOrchestrator};
//! use lacaktani::client::HttpClient;
//! use lacaktani::stats::Dashboard;
//! use lacaktani::ui::ConsoleNotifier;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let api = Arc::new(HttpClient::new("http://127.0.0.1:5000")?);
//!     let mut batch = BatchOrchestrator::new(api, Arc::new(ConsoleNotifier::default()));
//!
//!     let files = select_files(&[PathBuf::from("foto")]).await?;
//!     let mut dashboard = Dashboard::new();
//!     let report = batch.run(files, &mut dashboard, |_| {}).await?;
//!     batch.settle().await;
//!
//!     println!("{}", report.summary_line());
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod batch;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod history;
pub mod models;
pub mod settings;
pub mod spinner;
pub mod stats;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod ui;
pub mod view;

// Re-export commonly used types
pub use app::App;
pub use batch::{BatchOrchestrator, BatchReport, DetectionResult, SelectedFile};
pub use client::{ClassifierApi, HttpClient};
pub use config::Config;
pub use error::{ClientError, InputError};
pub use spinner::{BatchProgress, PendingSpinner, StatusIcons};
pub use stats::{ChartSeries, Dashboard, Stats, TopDetection};
