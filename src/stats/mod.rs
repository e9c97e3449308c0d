//! Aggregate statistics - category counts, top detection, dashboard state
//!
//! The dashboard shows the stats of the most recent result (never a sum)
//! next to a rolling chart of per-detection samples.

mod chart;

pub use chart::{ChartPoint, ChartSeries, CHART_CAPACITY};

use serde::{Deserialize, Deserializer, Serialize};

/// Per-category object counts returned by the classifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Ripe
    #[serde(default, deserialize_with = "count_or_zero")]
    pub matang: u32,
    /// Unripe
    #[serde(default, deserialize_with = "count_or_zero")]
    pub mentah: u32,
    /// Flowering
    #[serde(default, deserialize_with = "count_or_zero")]
    pub berbunga: u32,
}

impl Stats {
    pub fn new(matang: u32, mentah: u32, berbunga: u32) -> Self {
        Self {
            matang,
            mentah,
            berbunga,
        }
    }
}

/// Accepts a missing or null count as zero
pub(crate) fn count_or_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}

/// Highest-confidence detection in one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopDetection {
    pub label: String,
    /// Confidence in `[0, 1]`
    pub confidence: f32,
    /// Ripe objects the model considers ready to harvest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matang_siap_panen: Option<u32>,
}

impl TopDetection {
    /// Confidence as a whole percentage, clamped to 0..=100
    pub fn percent(&self) -> f32 {
        (self.confidence.clamp(0.0, 1.0)) * 100.0
    }
}

/// Summary panel contents for the latest result
#[derive(Debug, Clone, PartialEq)]
pub struct StatsPanel {
    pub stats: Stats,
    pub top: Option<TopDetection>,
}

impl StatsPanel {
    /// Harvest-ready figure; falls back to the ripe count
    pub fn ready_to_harvest(&self) -> u32 {
        self.top
            .as_ref()
            .and_then(|t| t.matang_siap_panen)
            .unwrap_or(self.stats.matang)
    }
}

/// Dashboard state for one session
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub chart: ChartSeries,
    panel: Option<StatsPanel>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push one chart sample
    pub fn record_sample(&mut self, label: impl Into<String>, stats: &Stats) {
        self.chart.push(label, stats);
    }

    /// Replace the summary panel with the given result
    pub fn show(&mut self, stats: Stats, top: Option<TopDetection>) {
        self.panel = Some(StatsPanel { stats, top });
    }

    pub fn panel(&self) -> Option<&StatsPanel> {
        self.panel.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_missing_and_null_fields_default_to_zero() {
        let stats: Stats = serde_json::from_str(r#"{"matang": 3, "mentah": null}"#).unwrap();
        assert_eq!(stats, Stats::new(3, 0, 0));
    }

    #[test]
    fn test_ready_to_harvest_prefers_model_figure() {
        let mut panel = StatsPanel {
            stats: Stats::new(4, 1, 0),
            top: None,
        };
        assert_eq!(panel.ready_to_harvest(), 4);

        panel.top = Some(TopDetection {
            label: "Matang".to_string(),
            confidence: 0.91,
            matang_siap_panen: Some(2),
        });
        assert_eq!(panel.ready_to_harvest(), 2);
    }

    #[test]
    fn test_dashboard_panel_is_replaced_not_summed() {
        let mut dash = Dashboard::new();
        dash.show(Stats::new(1, 1, 1), None);
        dash.show(Stats::new(5, 0, 2), None);
        assert_eq!(dash.panel().unwrap().stats, Stats::new(5, 0, 2));
    }

    #[test]
    fn test_percent_clamps() {
        let top = TopDetection {
            label: "Mentah".to_string(),
            confidence: 1.3,
            matang_siap_panen: None,
        };
        assert_eq!(top.percent(), 100.0);
    }
}
