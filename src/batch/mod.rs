//! Batch orchestrator - sequential upload of a selection to the classifier
//!
//! One file at a time, in selection order. A failed file is reported and
//! skipped; it never aborts the rest of the batch. Every success is rendered
//! as soon as it arrives, pushed to the dashboard chart and handed to the
//! history writer, which saves it in the background.

mod selection;

pub use selection::{detect_mime, is_image_mime, select_files, SelectedFile};

use std::path::PathBuf;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Local, Utc};
use tracing::{debug, info, warn};

use crate::client::{ClassifierApi, NewHistoryRecord, Prediction};
use crate::error::{ClientError, InputError};
use crate::history::{HistoryWriter, PersistSummary};
use crate::stats::{Dashboard, Stats, TopDetection};
use crate::ui::{dates, Notifier};

/// One successful classification
#[derive(Debug, Clone)]
pub struct DetectionResult {
    /// Local file the prediction was made for
    pub original: PathBuf,
    pub file_name: String,
    /// Annotated image from the server, base64 JPEG
    pub result_image: String,
    pub stats: Stats,
    pub top: Option<TopDetection>,
    /// Where the decoded annotated image was written, if anywhere
    pub annotated_path: Option<PathBuf>,
    pub completed_at: DateTime<Local>,
}

/// Why a file produced no result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network, HTTP or backend-reported failure
    Transport,
    /// The response arrived but lacked the image or the stats
    MalformedResponse,
}

#[derive(Debug, Clone)]
pub struct FileFailure {
    pub file_name: String,
    pub path: PathBuf,
    pub kind: FailureKind,
    pub message: String,
}

/// Outcome of one batch run
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub attempted: usize,
    /// Successful results in processing order
    pub results: Vec<DetectionResult>,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.results.len()
    }

    /// Most recently processed successful result
    pub fn last(&self) -> Option<&DetectionResult> {
        self.results.last()
    }

    pub fn summary_line(&self) -> String {
        format!("Done: {}/{} succeeded", self.succeeded(), self.attempted)
    }
}

/// Progress notifications for the caller's display
#[derive(Debug)]
pub enum BatchEvent<'a> {
    Started { total: usize },
    Processing { index: usize, file: &'a SelectedFile },
    Succeeded { index: usize, result: &'a DetectionResult },
    Failed { index: usize, failure: &'a FileFailure },
    Finished { report: &'a BatchReport },
}

/// Options for a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Write each annotated image as `<stem>_result.jpg` here
    pub output_dir: Option<PathBuf>,
}

/// State of the batch in progress, rebuilt for every run
struct BatchSession {
    files: Vec<SelectedFile>,
    results: Vec<DetectionResult>,
    failures: Vec<FileFailure>,
}

impl BatchSession {
    fn new(files: Vec<SelectedFile>) -> Self {
        Self {
            results: Vec::with_capacity(files.len()),
            failures: Vec::new(),
            files,
        }
    }

    fn into_report(self) -> BatchReport {
        BatchReport {
            attempted: self.files.len(),
            results: self.results,
            failures: self.failures,
        }
    }
}

/// Drives batches against one backend
pub struct BatchOrchestrator<A: ClassifierApi> {
    api: Arc<A>,
    notifier: Arc<dyn Notifier>,
    writer: HistoryWriter<A>,
    options: BatchOptions,
}

impl<A: ClassifierApi> BatchOrchestrator<A> {
    pub fn new(api: Arc<A>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            writer: HistoryWriter::new(Arc::clone(&api)),
            api,
            notifier,
            options: BatchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Process `files` one after another.
    ///
    /// At most one classifier request is in flight at any time. History
    /// saves are started but not awaited; call [`Self::settle`] before
    /// shutting down.
    pub async fn run<F>(
        &mut self,
        files: Vec<SelectedFile>,
        dashboard: &mut Dashboard,
        mut on_event: F,
    ) -> Result<BatchReport, InputError>
    where
        F: FnMut(BatchEvent<'_>),
    {
        if files.is_empty() {
            self.notifier.error("Select images first");
            return Err(InputError::NoFiles);
        }

        let mut session = BatchSession::new(files);
        info!("Batch started: {} file(s)", session.files.len());
        on_event(BatchEvent::Started {
            total: session.files.len(),
        });

        for (index, file) in session.files.iter().enumerate() {
            on_event(BatchEvent::Processing { index, file });

            match self.classify(file).await {
                Ok(prediction) => {
                    let annotated_path = self.write_annotated(file, &prediction).await;
                    let completed_at = Local::now();
                    let result = DetectionResult {
                        original: file.path.clone(),
                        file_name: file.name.clone(),
                        result_image: prediction.image_data,
                        stats: prediction.stats,
                        top: prediction.top,
                        annotated_path,
                        completed_at,
                    };
                    debug!("{} -> {:?}", file.name, result.stats);

                    on_event(BatchEvent::Succeeded {
                        index,
                        result: &result,
                    });
                    dashboard.record_sample(dates::time_label(&completed_at), &result.stats);
                    self.writer.submit(NewHistoryRecord::new(
                        completed_at.with_timezone(&Utc),
                        result.result_image.clone(),
                        result.stats,
                        result.top.as_ref(),
                    ));
                    session.results.push(result);
                }
                Err(err) => {
                    warn!("Classification failed for {}: {}", file.name, err);
                    let failure = FileFailure {
                        file_name: file.name.clone(),
                        path: file.path.clone(),
                        kind: if err.is_malformed() {
                            FailureKind::MalformedResponse
                        } else {
                            FailureKind::Transport
                        },
                        message: err.to_string(),
                    };
                    self.notifier.error(&format!("Failed: {}", file.name));
                    on_event(BatchEvent::Failed {
                        index,
                        failure: &failure,
                    });
                    session.failures.push(failure);
                }
            }
        }

        if let Some(last) = session.results.last() {
            dashboard.show(last.stats, last.top.clone());
        }

        let report = session.into_report();
        info!(
            "Batch finished: {}/{} succeeded",
            report.succeeded(),
            report.attempted
        );
        self.notifier.success(&report.summary_line());
        on_event(BatchEvent::Finished { report: &report });
        Ok(report)
    }

    async fn classify(&self, file: &SelectedFile) -> Result<Prediction, ClientError> {
        self.api.predict(file).await?.into_prediction()
    }

    /// Decode and store the annotated image; failures only warn
    async fn write_annotated(&self, file: &SelectedFile, prediction: &Prediction) -> Option<PathBuf> {
        let dir = self.options.output_dir.as_ref()?;
        let bytes = match STANDARD.decode(prediction.image_data.trim()) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Annotated image for {} is not valid base64: {}", file.name, e);
                return None;
            }
        };

        let target = dir.join(format!("{}_result.jpg", file.stem()));
        let written = async {
            tokio::fs::create_dir_all(dir).await?;
            tokio::fs::write(&target, &bytes).await
        }
        .await;

        match written {
            Ok(()) => Some(target),
            Err(e) => {
                warn!("Failed to write {}: {}", target.display(), e);
                None
            }
        }
    }

    /// Wait for background history saves to finish
    pub async fn settle(&mut self) -> PersistSummary {
        self.writer.drain().await
    }

    /// Number of history saves still running
    pub fn pending_saves(&self) -> usize {
        self.writer.pending()
    }
}
