//! Model management - list, switch, delete and upload classifier weights

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::client::{ClassifierApi, ModelCatalog, ModelUpload};
use crate::error::{ClientError, InputError};
use crate::ui::Notifier;

/// Extension accepted for uploaded weights
pub const MODEL_EXTENSION: &str = "pt";

/// Notification text for a backend failure
fn failure_message(err: &ClientError) -> String {
    match err {
        ClientError::Rejected { message } => message.clone().unwrap_or_else(|| "Failed".to_string()),
        other => other.to_string(),
    }
}

pub struct ModelManager<A: ClassifierApi> {
    api: Arc<A>,
    notifier: Arc<dyn Notifier>,
}

impl<A: ClassifierApi> ModelManager<A> {
    pub fn new(api: Arc<A>, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, notifier }
    }

    pub async fn catalog(&self) -> Result<ModelCatalog, ClientError> {
        self.api.list_models().await
    }

    /// Catalog for a follow-up step; a failure is notified here
    async fn refresh(&self) -> Result<ModelCatalog> {
        self.catalog().await.map_err(|e| {
            self.notifier.error(&format!("Cannot load models: {}", e));
            e.into()
        })
    }

    /// Make `name` the active model; returns the refreshed catalog
    pub async fn select(&self, name: &str) -> Result<ModelCatalog> {
        let changed = self
            .api
            .change_model(name)
            .await
            .and_then(|status| status.into_result());
        if let Err(e) = changed {
            self.notifier.error(&failure_message(&e));
            return Err(e.into());
        }

        info!("Active model is now {}", name);
        self.notifier.success(&format!("Model: {}", name));
        self.refresh().await
    }

    /// Delete `name`. The active model is refused without calling the backend.
    pub async fn delete(&self, name: &str) -> Result<ModelCatalog> {
        let catalog = self.refresh().await?;
        if catalog.is_active(name) {
            self.notifier
                .error(&format!("Model {} is active and cannot be deleted", name));
            return Err(InputError::ActiveModel(name.to_string()).into());
        }

        let deleted = self
            .api
            .delete_model(name)
            .await
            .and_then(|status| status.into_result());
        if let Err(e) = deleted {
            self.notifier.error(&failure_message(&e));
            return Err(e.into());
        }

        info!("Deleted model {}", name);
        self.notifier.success("Model deleted");
        self.refresh().await
    }

    /// Upload a `.pt` file; returns the name the server stored it under
    pub async fn upload(&self, path: &Path) -> Result<String> {
        let ext_ok = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case(MODEL_EXTENSION))
            .unwrap_or(false);
        if !ext_ok {
            self.notifier
                .error(&format!("Select a .{} model file", MODEL_EXTENSION));
            return Err(InputError::ModelExtension {
                path: path.to_path_buf(),
                expected: MODEL_EXTENSION,
            }
            .into());
        }

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(source) => {
                self.notifier
                    .error(&format!("Cannot read {}", path.display()));
                return Err(InputError::Io {
                    path: path.to_path_buf(),
                    source,
                }
                .into());
            }
        };
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("model.{}", MODEL_EXTENSION));

        let uploaded = self
            .api
            .upload_model(&ModelUpload { file_name: file_name.clone(), bytes })
            .await
            .and_then(|status| status.into_result());
        match uploaded {
            Ok(status) => {
                let stored = status.model_name.unwrap_or(file_name);
                info!("Uploaded model {}", stored);
                self.notifier
                    .success(&format!("Upload succeeded: {}", stored));
                Ok(stored)
            }
            Err(e) => {
                self.notifier.error(&failure_message(&e));
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;
    use crate::ui::{RecordingNotifier, ToastKind};
    use tempfile::tempdir;

    fn manager(backend: &Arc<FakeBackend>) -> (ModelManager<FakeBackend>, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        (
            ModelManager::new(Arc::clone(backend), notifier.clone()),
            notifier,
        )
    }

    #[tokio::test]
    async fn test_active_model_is_never_deleted() {
        let backend = Arc::new(FakeBackend::new());
        backend.set_models(&["best.pt", "padi.pt"], "best.pt");
        let (models, notifier) = manager(&backend);

        let err = models.delete("best.pt").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InputError>(),
            Some(InputError::ActiveModel(name)) if name == "best.pt"
        ));
        assert!(backend.delete_calls().is_empty());
        assert_eq!(notifier.of_kind(ToastKind::Error).len(), 1);
    }

    #[tokio::test]
    async fn test_delete_inactive_model_refreshes() {
        let backend = Arc::new(FakeBackend::new());
        backend.set_models(&["best.pt", "padi.pt"], "best.pt");
        let (models, notifier) = manager(&backend);

        let catalog = models.delete("padi.pt").await.unwrap();
        assert_eq!(catalog.models, vec!["best.pt".to_string()]);
        assert_eq!(backend.delete_calls(), vec!["padi.pt".to_string()]);
        assert_eq!(notifier.last().unwrap().message, "Model deleted");
    }

    #[tokio::test]
    async fn test_select_switches_active_model() {
        let backend = Arc::new(FakeBackend::new());
        backend.set_models(&["best.pt", "padi.pt"], "best.pt");
        let (models, notifier) = manager(&backend);

        let catalog = models.select("padi.pt").await.unwrap();
        assert_eq!(catalog.current, "padi.pt");
        assert_eq!(notifier.last().unwrap().message, "Model: padi.pt");
    }

    #[tokio::test]
    async fn test_select_rejection_uses_backend_message() {
        let backend = Arc::new(FakeBackend::new());
        backend.reject_model_change("GPU penuh");
        let (models, notifier) = manager(&backend);

        assert!(models.select("best.pt").await.is_err());
        assert_eq!(
            notifier.of_kind(ToastKind::Error),
            vec!["GPU penuh".to_string()]
        );
    }

    #[tokio::test]
    async fn test_upload_requires_pt_extension() {
        let dir = tempdir().unwrap();
        let onnx = dir.path().join("model.onnx");
        tokio::fs::write(&onnx, b"weights").await.unwrap();
        let backend = Arc::new(FakeBackend::new());
        let (models, _notifier) = manager(&backend);

        let err = models.upload(&onnx).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InputError>(),
            Some(InputError::ModelExtension { .. })
        ));
        assert!(backend.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_upload_of_missing_file_is_notified() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("hilang.pt");
        let backend = Arc::new(FakeBackend::new());
        let (models, notifier) = manager(&backend);

        let err = models.upload(&missing).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InputError>(),
            Some(InputError::Io { .. })
        ));
        assert!(backend.uploads().is_empty());
        assert_eq!(
            notifier.of_kind(ToastKind::Error),
            vec![format!("Cannot read {}", missing.display())]
        );
    }

    #[tokio::test]
    async fn test_delete_reports_unreadable_catalog() {
        let backend = Arc::new(FakeBackend::new());
        backend.set_models(&["best.pt", "padi.pt"], "best.pt");
        backend.fail_model_listing();
        let (models, notifier) = manager(&backend);

        assert!(models.delete("padi.pt").await.is_err());
        assert!(backend.delete_calls().is_empty());
        let errors = notifier.of_kind(ToastKind::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Cannot load models: "));
    }

    #[tokio::test]
    async fn test_select_reports_unreadable_catalog() {
        let backend = Arc::new(FakeBackend::new());
        backend.set_models(&["best.pt", "padi.pt"], "best.pt");
        backend.fail_model_listing();
        let (models, notifier) = manager(&backend);

        assert!(models.select("padi.pt").await.is_err());
        assert_eq!(backend.change_calls(), vec!["padi.pt".to_string()]);
        assert_eq!(notifier.of_kind(ToastKind::Success), vec!["Model: padi.pt".to_string()]);
        assert!(notifier.last().unwrap().message.starts_with("Cannot load models: "));
    }

    #[tokio::test]
    async fn test_upload_reports_stored_name() {
        let dir = tempdir().unwrap();
        let weights = dir.path().join("tomat_v2.PT");
        tokio::fs::write(&weights, b"weights").await.unwrap();
        let backend = Arc::new(FakeBackend::new());
        let (models, notifier) = manager(&backend);

        let stored = models.upload(&weights).await.unwrap();
        assert_eq!(stored, "tomat_v2.PT");
        assert_eq!(backend.uploads(), vec!["tomat_v2.PT".to_string()]);
        assert_eq!(
            notifier.last().unwrap().message,
            "Upload succeeded: tomat_v2.PT"
        );
    }
}
