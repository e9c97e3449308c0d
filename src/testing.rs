//! In-memory [`ClassifierApi`] for tests
//!
//! Behaves like a small LacakTani server: predictions are canned per file
//! name, history lives in a newest-first list, and every call is counted so
//! tests can assert what did (or did not) reach the backend.

use std::collections::{HashMap, HashSet};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use parking_lot::Mutex;

use crate::batch::SelectedFile;
use crate::client::{
    ClassifierApi, HistoryId, HistoryRecord, ModelCatalog, ModelUpload, NewHistoryRecord,
    PredictResponse, StatusResponse,
};
use crate::error::ClientError;
use crate::stats::{Stats, TopDetection};

#[derive(Debug, Default)]
struct State {
    predict_order: Vec<String>,
    failing: HashSet<String>,
    malformed: HashSet<String>,
    stats: HashMap<String, Stats>,
    fail_history: bool,
    fail_history_loads: bool,
    history_calls: usize,
    history: Vec<HistoryRecord>,
    next_id: u64,
    saved: Vec<NewHistoryRecord>,
    deleted_history: Vec<String>,
    models: ModelCatalog,
    fail_model_listing: bool,
    rejected_change: Option<String>,
    change_calls: Vec<String>,
    delete_calls: Vec<String>,
    uploads: Vec<String>,
    confidence: Option<f32>,
    export: Vec<u8>,
}

/// Scriptable fake backend
#[derive(Debug, Default)]
pub struct FakeBackend {
    state: Mutex<State>,
}

impl FakeBackend {
    /// Bytes behind every annotated image this backend returns
    pub const ANNOTATED_BYTES: &'static [u8] = b"\xFF\xD8annotated\xFF\xD9";

    pub fn new() -> Self {
        let backend = Self::default();
        {
            let mut state = backend.state.lock();
            state.next_id = 1;
            state.models = ModelCatalog {
                models: vec!["best.pt".to_string()],
                current: "best.pt".to_string(),
            };
            state.export = b"id,created_at,matang,mentah,berbunga\n".to_vec();
        }
        backend
    }

    pub fn fail_predict_for(&self, name: &str) {
        self.state.lock().failing.insert(name.to_string());
    }

    pub fn malformed_predict_for(&self, name: &str) {
        self.state.lock().malformed.insert(name.to_string());
    }

    pub fn set_stats_for(&self, name: &str, stats: Stats) {
        self.state.lock().stats.insert(name.to_string(), stats);
    }

    pub fn fail_history_saves(&self) {
        self.state.lock().fail_history = true;
    }

    /// Every later history listing fails; saves and deletes still work
    pub fn fail_history_loads(&self) {
        self.state.lock().fail_history_loads = true;
    }

    pub fn fail_model_listing(&self) {
        self.state.lock().fail_model_listing = true;
    }

    pub fn set_models(&self, models: &[&str], current: &str) {
        self.state.lock().models = ModelCatalog {
            models: models.iter().map(|m| m.to_string()).collect(),
            current: current.to_string(),
        };
    }

    pub fn reject_model_change(&self, message: &str) {
        self.state.lock().rejected_change = Some(message.to_string());
    }

    /// Store `records` as if saved earlier; the first one is the newest
    pub fn seed_history(&self, records: Vec<HistoryRecord>) {
        self.state.lock().history = records;
    }

    pub fn predict_calls(&self) -> usize {
        self.state.lock().predict_order.len()
    }

    pub fn predict_order(&self) -> Vec<String> {
        self.state.lock().predict_order.clone()
    }

    pub fn history_calls(&self) -> usize {
        self.state.lock().history_calls
    }

    pub fn saved_history(&self) -> Vec<NewHistoryRecord> {
        self.state.lock().saved.clone()
    }

    pub fn deleted_history(&self) -> Vec<String> {
        self.state.lock().deleted_history.clone()
    }

    pub fn change_calls(&self) -> Vec<String> {
        self.state.lock().change_calls.clone()
    }

    pub fn delete_calls(&self) -> Vec<String> {
        self.state.lock().delete_calls.clone()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.state.lock().uploads.clone()
    }

    pub fn confidence(&self) -> Option<f32> {
        self.state.lock().confidence
    }
}

impl ClassifierApi for FakeBackend {
    async fn predict(&self, file: &SelectedFile) -> Result<PredictResponse, ClientError> {
        let mut state = self.state.lock();
        state.predict_order.push(file.name.clone());

        if state.failing.contains(&file.name) {
            return Err(ClientError::Http {
                status: 500,
                body: "inference crashed".to_string(),
            });
        }
        if state.malformed.contains(&file.name) {
            return Ok(PredictResponse::default());
        }

        let stats = state
            .stats
            .get(&file.name)
            .copied()
            .unwrap_or(Stats::new(1, 0, 0));
        Ok(PredictResponse {
            image_data: Some(STANDARD.encode(Self::ANNOTATED_BYTES)),
            stats: Some(stats),
            top_detection: Some(TopDetection {
                label: "Matang".to_string(),
                confidence: 0.9,
                matang_siap_panen: None,
            }),
        })
    }

    async fn set_confidence(&self, confidence: f32) -> Result<StatusResponse, ClientError> {
        self.state.lock().confidence = Some(confidence);
        Ok(StatusResponse::success())
    }

    async fn list_models(&self) -> Result<ModelCatalog, ClientError> {
        let state = self.state.lock();
        if state.fail_model_listing {
            return Err(ClientError::Http {
                status: 500,
                body: "model folder unreadable".to_string(),
            });
        }
        Ok(state.models.clone())
    }

    async fn change_model(&self, model_name: &str) -> Result<StatusResponse, ClientError> {
        let mut state = self.state.lock();
        state.change_calls.push(model_name.to_string());
        if let Some(message) = state.rejected_change.clone() {
            return Ok(StatusResponse::failure(message));
        }
        if !state.models.models.iter().any(|m| m == model_name) {
            return Ok(StatusResponse::failure("Model tidak ditemukan"));
        }
        state.models.current = model_name.to_string();
        Ok(StatusResponse::success())
    }

    async fn delete_model(&self, model_name: &str) -> Result<StatusResponse, ClientError> {
        let mut state = self.state.lock();
        state.delete_calls.push(model_name.to_string());
        state.models.models.retain(|m| m != model_name);
        Ok(StatusResponse::success())
    }

    async fn upload_model(&self, upload: &ModelUpload) -> Result<StatusResponse, ClientError> {
        let mut state = self.state.lock();
        state.uploads.push(upload.file_name.clone());
        state.models.models.push(upload.file_name.clone());
        Ok(StatusResponse {
            model_name: Some(upload.file_name.clone()),
            ..StatusResponse::success()
        })
    }

    async fn history(&self) -> Result<Vec<HistoryRecord>, ClientError> {
        let mut state = self.state.lock();
        state.history_calls += 1;
        if state.fail_history_loads {
            return Err(ClientError::Http {
                status: 503,
                body: "database locked".to_string(),
            });
        }
        Ok(state.history.clone())
    }

    async fn save_history(&self, record: &NewHistoryRecord) -> Result<StatusResponse, ClientError> {
        let mut state = self.state.lock();
        if state.fail_history {
            return Err(ClientError::Http {
                status: 503,
                body: "database locked".to_string(),
            });
        }
        let id = HistoryId::new(state.next_id.to_string());
        state.next_id += 1;
        state.saved.push(record.clone());
        state.history.insert(0, record.clone().with_id(id));
        Ok(StatusResponse::success())
    }

    async fn delete_history(&self, id: &HistoryId) -> Result<StatusResponse, ClientError> {
        let mut state = self.state.lock();
        state.deleted_history.push(id.to_string());
        let before = state.history.len();
        state.history.retain(|r| &r.id != id);
        if state.history.len() == before {
            return Ok(StatusResponse::failure("Riwayat tidak ditemukan"));
        }
        Ok(StatusResponse::success())
    }

    async fn export_history(&self) -> Result<Vec<u8>, ClientError> {
        Ok(self.state.lock().export.clone())
    }
}
