//! View models - plain data derived from domain values, ready to render
//!
//! Every string that came from the server or the file system passes through
//! [`sanitize`] here, so renderers never print raw control sequences.

mod render;

pub use render::Renderer;

use crate::batch::{DetectionResult, SelectedFile};
use crate::client::{HistoryRecord, ModelCatalog};
use crate::stats::{Stats, StatsPanel, TopDetection};
use crate::ui::dates;

/// Names listed in a selection summary before eliding
const SELECTION_PREVIEW: usize = 5;

/// Placeholder for absent values
pub const EMPTY: &str = "—";

/// Strip control characters (terminal escapes included)
pub fn sanitize(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

/// `label 87%` badge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopBadge {
    pub label: String,
    pub percent: u32,
}

impl TopBadge {
    pub fn new(label: &str, confidence: f32) -> Self {
        Self {
            label: sanitize(label),
            percent: (confidence.clamp(0.0, 1.0) * 100.0).round() as u32,
        }
    }
}

impl From<&TopDetection> for TopBadge {
    fn from(top: &TopDetection) -> Self {
        Self::new(&top.label, top.confidence)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionView {
    pub count: usize,
    pub names: Vec<String>,
    pub truncated: bool,
}

impl SelectionView {
    pub fn new(files: &[SelectedFile]) -> Self {
        Self {
            count: files.len(),
            names: files
                .iter()
                .take(SELECTION_PREVIEW)
                .map(|f| sanitize(&f.name))
                .collect(),
            truncated: files.len() > SELECTION_PREVIEW,
        }
    }
}

/// One rendered batch result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItemView {
    pub position: usize,
    pub file_name: String,
    pub stats: Stats,
    pub top: Option<TopBadge>,
    pub annotated: Option<String>,
}

impl BatchItemView {
    pub fn new(index: usize, result: &DetectionResult) -> Self {
        Self {
            position: index + 1,
            file_name: sanitize(&result.file_name),
            stats: result.stats,
            top: result.top.as_ref().map(TopBadge::from),
            annotated: result
                .annotated_path
                .as_ref()
                .map(|p| p.display().to_string()),
        }
    }
}

/// Original vs annotated image for the last result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareView {
    pub original: String,
    pub annotated: String,
}

impl From<&DetectionResult> for CompareView {
    fn from(result: &DetectionResult) -> Self {
        Self {
            original: if result.original.as_os_str().is_empty() {
                sanitize(&result.file_name)
            } else {
                result.original.display().to_string()
            },
            annotated: result
                .annotated_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "not saved (use --output DIR)".to_string()),
        }
    }
}

/// Summary statistics panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsPanelView {
    pub stats: Stats,
    pub top_label: String,
    pub top_confidence: String,
    pub ready_to_harvest: u32,
}

impl StatsPanelView {
    pub fn new(panel: Option<&StatsPanel>) -> Self {
        match panel {
            Some(panel) => Self {
                stats: panel.stats,
                top_label: panel
                    .top
                    .as_ref()
                    .map(|t| sanitize(&t.label))
                    .unwrap_or_else(|| EMPTY.to_string()),
                top_confidence: panel
                    .top
                    .as_ref()
                    .map(|t| format!("{:.1}%", t.percent()))
                    .unwrap_or_else(|| EMPTY.to_string()),
                ready_to_harvest: panel.ready_to_harvest(),
            },
            None => Self {
                stats: Stats::default(),
                top_label: EMPTY.to_string(),
                top_confidence: EMPTY.to_string(),
                ready_to_harvest: 0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelItemView {
    pub name: String,
    pub active: bool,
    /// The active model cannot be deleted
    pub can_delete: bool,
}

impl ModelItemView {
    pub fn list(catalog: &ModelCatalog) -> Vec<Self> {
        catalog
            .models
            .iter()
            .map(|name| {
                let active = catalog.is_active(name);
                Self {
                    name: sanitize(name),
                    active,
                    can_delete: !active,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryItemView {
    pub id: String,
    pub timestamp: String,
    pub stats: Stats,
    pub top: Option<TopBadge>,
}

impl From<&HistoryRecord> for HistoryItemView {
    fn from(record: &HistoryRecord) -> Self {
        Self {
            id: sanitize(record.id.as_str()),
            timestamp: sanitize(&dates::display_timestamp(&record.created_at)),
            stats: record.stats(),
            top: record
                .top_label()
                .map(|label| TopBadge::new(label, record.top_confidence.unwrap_or(0.0))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::HistoryId;
    use chrono::Local;
    use std::path::PathBuf;

    fn result(top: Option<TopDetection>) -> DetectionResult {
        DetectionResult {
            original: PathBuf::from("/foto/cabai.jpg"),
            file_name: "cabai.jpg".to_string(),
            result_image: "QQ==".to_string(),
            stats: Stats::new(3, 1, 0),
            top,
            annotated_path: None,
            completed_at: Local::now(),
        }
    }

    #[test]
    fn test_sanitize_strips_escape_sequences() {
        assert_eq!(sanitize("Matang\u{1b}[31m\n"), "Matang[31m");
        assert_eq!(sanitize("biasa saja"), "biasa saja");
    }

    #[test]
    fn test_selection_view_previews_five() {
        let files: Vec<SelectedFile> = (0..7)
            .map(|i| SelectedFile::from_bytes(format!("{}.jpg", i), "image/jpeg", vec![]))
            .collect();
        let view = SelectionView::new(&files);
        assert_eq!(view.count, 7);
        assert_eq!(view.names.len(), 5);
        assert!(view.truncated);

        let view = SelectionView::new(&files[..2]);
        assert!(!view.truncated);
    }

    #[test]
    fn test_batch_item_badge_rounds() {
        let top = TopDetection {
            label: "Matang".to_string(),
            confidence: 0.876,
            matang_siap_panen: None,
        };
        let view = BatchItemView::new(0, &result(Some(top)));
        assert_eq!(view.position, 1);
        assert_eq!(
            view.top,
            Some(TopBadge {
                label: "Matang".to_string(),
                percent: 88
            })
        );
    }

    #[test]
    fn test_compare_view_without_output_dir() {
        let view = CompareView::from(&result(None));
        assert_eq!(view.original, "/foto/cabai.jpg");
        assert!(view.annotated.contains("--output"));
    }

    #[test]
    fn test_stats_panel_placeholders() {
        let empty = StatsPanelView::new(None);
        assert_eq!(empty.top_label, EMPTY);
        assert_eq!(empty.top_confidence, EMPTY);

        let panel = StatsPanel {
            stats: Stats::new(2, 0, 1),
            top: Some(TopDetection {
                label: "Berbunga".to_string(),
                confidence: 0.5,
                matang_siap_panen: None,
            }),
        };
        let view = StatsPanelView::new(Some(&panel));
        assert_eq!(view.top_confidence, "50.0%");
        assert_eq!(view.ready_to_harvest, 2);
    }

    #[test]
    fn test_model_items_mark_active_undeletable() {
        let catalog = ModelCatalog {
            models: vec!["best.pt".to_string(), "padi.pt".to_string()],
            current: "padi.pt".to_string(),
        };
        let items = ModelItemView::list(&catalog);
        assert!(!items[0].active && items[0].can_delete);
        assert!(items[1].active && !items[1].can_delete);
    }

    #[test]
    fn test_history_item_without_top_label() {
        let record = HistoryRecord {
            id: HistoryId::new("5"),
            created_at: "not a date".to_string(),
            result_image: String::new(),
            matang: 1,
            mentah: 2,
            berbunga: 3,
            top_label: Some(String::new()),
            top_confidence: Some(0.0),
        };
        let view = HistoryItemView::from(&record);
        assert_eq!(view.timestamp, "not a date");
        assert_eq!(view.top, None);
        assert_eq!(view.stats, Stats::new(1, 2, 3));
    }
}
