//! Detection settings pushed to the backend

use tracing::{info, warn};

use crate::client::ClassifierApi;
use crate::error::{ClientError, InputError};
use crate::ui::Notifier;

/// Minimum confidence for a detection to be counted, in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Confidence(f32);

impl Confidence {
    pub fn value(self) -> f32 {
        self.0
    }
}

impl TryFrom<f32> for Confidence {
    type Error = InputError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InputError::ConfidenceOutOfRange(value))
        }
    }
}

/// Send the confidence threshold; reports the outcome as a notification
pub async fn save_confidence<A: ClassifierApi>(
    api: &A,
    notifier: &dyn Notifier,
    value: f32,
) -> anyhow::Result<()> {
    let confidence = match Confidence::try_from(value) {
        Ok(c) => c,
        Err(e) => {
            notifier.error(&e.to_string());
            return Err(e.into());
        }
    };

    match api.set_confidence(confidence.value()).await {
        Ok(status) if status.is_success() => {
            info!("Confidence threshold set to {}", confidence.value());
            notifier.success("Configuration saved");
            Ok(())
        }
        Ok(status) => {
            notifier.error("Failed");
            Err(ClientError::Rejected {
                message: status.message,
            }
            .into())
        }
        Err(e) => {
            warn!("Saving settings failed: {}", e);
            notifier.error("Error");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;
    use crate::ui::{RecordingNotifier, ToastKind};

    #[test]
    fn test_confidence_bounds() {
        assert!(Confidence::try_from(0.0).is_ok());
        assert!(Confidence::try_from(1.0).is_ok());
        assert!(Confidence::try_from(-0.1).is_err());
        assert!(Confidence::try_from(1.01).is_err());
        assert!(Confidence::try_from(f32::NAN).is_err());
    }

    #[tokio::test]
    async fn test_out_of_range_never_reaches_backend() {
        let backend = FakeBackend::new();
        let notifier = RecordingNotifier::new();

        assert!(save_confidence(&backend, &notifier, 4.0).await.is_err());
        assert_eq!(backend.confidence(), None);
        assert_eq!(notifier.of_kind(ToastKind::Error).len(), 1);
    }

    #[tokio::test]
    async fn test_saves_threshold() {
        let backend = FakeBackend::new();
        let notifier = RecordingNotifier::new();

        save_confidence(&backend, &notifier, 0.45).await.unwrap();
        assert_eq!(backend.confidence(), Some(0.45));
        assert_eq!(notifier.last().unwrap().message, "Configuration saved");
    }
}
