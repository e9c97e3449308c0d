//! Remote classifier client
//!
//! [`ClassifierApi`] is the seam between the orchestration code and the
//! backend. [`HttpClient`] talks to a real server; tests plug in fakes.
//!
//! Calls are single attempts: no retry, caching, auth or request timeout.

mod http;
mod types;

pub use http::HttpClient;
pub use types::{
    HistoryId, HistoryList, HistoryRecord, ModelCatalog, ModelNameRequest, ModelUpload,
    NewHistoryRecord, PredictResponse, Prediction, SettingsRequest, StatusResponse,
};

use std::future::Future;

use crate::batch::SelectedFile;
use crate::error::ClientError;

/// Every backend capability the client uses
pub trait ClassifierApi: Send + Sync + 'static {
    /// `POST /predict` with the image as multipart field `file`
    fn predict(
        &self,
        file: &SelectedFile,
    ) -> impl Future<Output = Result<PredictResponse, ClientError>> + Send;

    /// `POST /api/settings`
    fn set_confidence(
        &self,
        confidence: f32,
    ) -> impl Future<Output = Result<StatusResponse, ClientError>> + Send;

    /// `GET /api/list_models`
    fn list_models(&self) -> impl Future<Output = Result<ModelCatalog, ClientError>> + Send;

    /// `POST /api/change_model`
    fn change_model(
        &self,
        model_name: &str,
    ) -> impl Future<Output = Result<StatusResponse, ClientError>> + Send;

    /// `POST /api/delete_model`
    fn delete_model(
        &self,
        model_name: &str,
    ) -> impl Future<Output = Result<StatusResponse, ClientError>> + Send;

    /// `POST /api/upload_model` with the artifact as multipart field `model_file`
    fn upload_model(
        &self,
        upload: &ModelUpload,
    ) -> impl Future<Output = Result<StatusResponse, ClientError>> + Send;

    /// `GET /api/history`, newest first
    fn history(&self) -> impl Future<Output = Result<Vec<HistoryRecord>, ClientError>> + Send;

    /// `POST /api/history`
    fn save_history(
        &self,
        record: &NewHistoryRecord,
    ) -> impl Future<Output = Result<StatusResponse, ClientError>> + Send;

    /// `DELETE /api/history/{id}`
    fn delete_history(
        &self,
        id: &HistoryId,
    ) -> impl Future<Output = Result<StatusResponse, ClientError>> + Send;

    /// `GET /api/export_history`, raw file body
    fn export_history(&self) -> impl Future<Output = Result<Vec<u8>, ClientError>> + Send;
}
