//! Terminal rendering of view models

use colored::Colorize;

use super::{
    BatchItemView, CompareView, HistoryItemView, ModelItemView, SelectionView, StatsPanelView,
    TopBadge,
};
use crate::spinner::StatusIcons;
use crate::stats::{ChartSeries, Stats};
use crate::ui::Palette;

/// Widest bar drawn for the chart peak
const BAR_WIDTH: u64 = 24;

/// Renders view models into coloured lines
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    palette: Palette,
}

impl Renderer {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    /// `M:3 | N:1 | B:0`
    pub fn counts(&self, stats: &Stats) -> String {
        format!(
            "{} | {} | {}",
            format!("M:{}", stats.matang).color(self.palette.matang),
            format!("N:{}", stats.mentah).color(self.palette.mentah),
            format!("B:{}", stats.berbunga).color(self.palette.berbunga),
        )
    }

    fn badge(&self, top: &TopBadge) -> String {
        format!("[{} {}%]", top.label, top.percent)
            .color(self.palette.accent)
            .bold()
            .to_string()
    }

    pub fn selection(&self, view: &SelectionView) -> String {
        let mut out = format!("{} {} image(s) selected", StatusIcons::CAMERA, view.count);
        for name in &view.names {
            out.push_str(&format!("\n  • {}", name));
        }
        if view.truncated {
            out.push_str(&format!("\n  {}", "...".color(self.palette.muted)));
        }
        out
    }

    pub fn batch_item(&self, view: &BatchItemView) -> String {
        let mut out = format!(
            "{} #{} {}  {}",
            StatusIcons::SUCCESS.color(self.palette.accent),
            view.position,
            view.file_name.color(self.palette.text),
            self.counts(&view.stats)
        );
        if let Some(top) = &view.top {
            out.push_str(&format!("  {}", self.badge(top)));
        }
        if let Some(path) = &view.annotated {
            out.push_str(&format!("\n     {} {}", "→".color(self.palette.muted), path));
        }
        out
    }

    pub fn compare(&self, view: &CompareView) -> String {
        format!(
            "  {:<10} {}\n  {:<10} {}",
            "Original".color(self.palette.muted),
            view.original,
            "Result".color(self.palette.muted),
            view.annotated
        )
    }

    pub fn stats_panel(&self, view: &StatsPanelView) -> String {
        let rows = [
            ("Matang", view.stats.matang.to_string(), self.palette.matang),
            ("Mentah", view.stats.mentah.to_string(), self.palette.mentah),
            ("Berbunga", view.stats.berbunga.to_string(), self.palette.berbunga),
            ("Siap panen", view.ready_to_harvest.to_string(), self.palette.matang),
            ("Top", view.top_label.clone(), self.palette.accent),
            ("Confidence", view.top_confidence.clone(), self.palette.accent),
        ];
        rows.iter()
            .map(|(key, value, color)| {
                format!("  {:<12} {}", key.color(self.palette.muted), value.color(*color).bold())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn models(&self, items: &[ModelItemView]) -> String {
        if items.is_empty() {
            return format!("  {}", "No models on the server".color(self.palette.muted));
        }
        items
            .iter()
            .map(|item| {
                if item.active {
                    format!(
                        "  {} {} {}",
                        "●".color(self.palette.accent),
                        item.name.bold(),
                        "(active)".color(self.palette.muted)
                    )
                } else {
                    format!("  ○ {}", item.name)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn history(&self, items: &[HistoryItemView]) -> String {
        if items.is_empty() {
            return format!("  {}", "No history yet".color(self.palette.muted));
        }
        items
            .iter()
            .map(|item| {
                let mut line = format!(
                    "  {:>5}  {}  {}",
                    format!("#{}", item.id).color(self.palette.muted),
                    item.timestamp,
                    self.counts(&item.stats)
                );
                if let Some(top) = &item.top {
                    line.push_str(&format!("  {}", self.badge(top)));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// One row per sample, bars scaled to the series peak
    pub fn chart(&self, chart: &ChartSeries) -> String {
        if chart.is_empty() {
            return format!("  {}", "No detections yet".color(self.palette.muted));
        }
        let peak = u64::from(chart.peak().max(1));
        let bar = |count: u32| -> String {
            let width = (u64::from(count) * BAR_WIDTH).div_ceil(peak) as usize;
            "█".repeat(width)
        };

        chart
            .points()
            .iter()
            .map(|point| {
                format!(
                    "  {:>5} {}{}{} {}",
                    point.label.color(self.palette.muted),
                    bar(point.matang).color(self.palette.matang),
                    bar(point.mentah).color(self.palette.mentah),
                    bar(point.berbunga).color(self.palette.berbunga),
                    format!("{}/{}/{}", point.matang, point.mentah, point.berbunga)
                        .color(self.palette.muted)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn chart_legend(&self) -> String {
        format!(
            "  {} Matang  {} Mentah  {} Berbunga",
            "█".color(self.palette.matang),
            "█".color(self.palette.mentah),
            "█".color(self.palette.berbunga)
        )
    }
}
