//! Wire types for the LacakTani backend

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ClientError;
use crate::stats::{count_or_zero, Stats, TopDetection};

/// Body of `POST /predict`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictResponse {
    /// Base64 JPEG with boxes drawn by the server
    #[serde(default)]
    pub image_data: Option<String>,
    #[serde(default)]
    pub stats: Option<Stats>,
    #[serde(default)]
    pub top_detection: Option<TopDetection>,
}

/// A usable classification: annotated image and counts both present
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub image_data: String,
    pub stats: Stats,
    pub top: Option<TopDetection>,
}

impl PredictResponse {
    pub fn into_prediction(self) -> Result<Prediction, ClientError> {
        let image_data = self
            .image_data
            .filter(|data| !data.is_empty())
            .ok_or(ClientError::Malformed("response has no image_data"))?;
        let stats = self
            .stats
            .ok_or(ClientError::Malformed("response has no stats"))?;
        Ok(Prediction {
            image_data,
            stats,
            top: self.top_detection,
        })
    }
}

/// Generic `{status, message?}` acknowledgement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    /// Set by `upload_model`
    #[serde(default)]
    pub model_name: Option<String>,
}

impl StatusResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
            ..Default::default()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
            model_name: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// Turn a non-success acknowledgement into [`ClientError::Rejected`]
    pub fn into_result(self) -> Result<Self, ClientError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ClientError::Rejected {
                message: self.message,
            })
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingsRequest {
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelNameRequest<'a> {
    pub model_name: &'a str,
}

/// Body of `GET /api/list_models`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCatalog {
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub current: String,
}

impl ModelCatalog {
    pub fn is_active(&self, name: &str) -> bool {
        !self.current.is_empty() && self.current == name
    }
}

/// A model artifact ready for upload
#[derive(Debug, Clone)]
pub struct ModelUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// History record id; the store may hand out numbers or strings
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HistoryId(String);

impl HistoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HistoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HistoryId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl<'de> Deserialize<'de> for HistoryId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => HistoryId(n.to_string()),
            RawId::Text(s) => HistoryId(s),
        })
    }
}

impl Serialize for HistoryId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

/// One saved detection, as returned by `GET /api/history`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: HistoryId,
    #[serde(default)]
    pub created_at: String,
    #[serde(rename = "result_b64", alias = "result_image", default)]
    pub result_image: String,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub matang: u32,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub mentah: u32,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub berbunga: u32,
    #[serde(default)]
    pub top_label: Option<String>,
    #[serde(default)]
    pub top_confidence: Option<f32>,
}

impl HistoryRecord {
    pub fn stats(&self) -> Stats {
        Stats::new(self.matang, self.mentah, self.berbunga)
    }

    /// Top label, treating the empty string the store writes as absent
    pub fn top_label(&self) -> Option<&str> {
        self.top_label.as_deref().filter(|label| !label.is_empty())
    }
}

/// Body of `POST /api/history`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHistoryRecord {
    pub created_at: String,
    #[serde(rename = "result_b64")]
    pub result_image: String,
    pub matang: u32,
    pub mentah: u32,
    pub berbunga: u32,
    pub top_label: String,
    pub top_confidence: f32,
}

impl NewHistoryRecord {
    pub fn new(
        created_at: DateTime<Utc>,
        result_image: String,
        stats: Stats,
        top: Option<&TopDetection>,
    ) -> Self {
        Self {
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            result_image,
            matang: stats.matang,
            mentah: stats.mentah,
            berbunga: stats.berbunga,
            top_label: top.map(|t| t.label.clone()).unwrap_or_default(),
            top_confidence: top.map(|t| t.confidence).unwrap_or(0.0),
        }
    }

    /// The record the store would hand back under `id`
    pub fn with_id(self, id: HistoryId) -> HistoryRecord {
        HistoryRecord {
            id,
            created_at: self.created_at,
            result_image: self.result_image,
            matang: self.matang,
            mentah: self.mentah,
            berbunga: self.berbunga,
            top_label: Some(self.top_label),
            top_confidence: Some(self.top_confidence),
        }
    }
}

/// Body of `GET /api/history`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryList {
    #[serde(default)]
    pub history: Vec<HistoryRecord>,
}
