//! Rolling chart series - the last N detection samples
//!
//! Four parallel columns (time label + one per category) that always have
//! the same length. Pushing beyond capacity evicts the oldest row from every
//! column in the same call.

use std::collections::VecDeque;

use serde::Serialize;

use super::Stats;

/// Depth of the rolling chart
pub const CHART_CAPACITY: usize = 20;

/// One row of the chart, as handed to renderers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub matang: u32,
    pub mentah: u32,
    pub berbunga: u32,
}

/// Bounded FIFO of chart samples
#[derive(Debug, Clone)]
pub struct ChartSeries {
    capacity: usize,
    labels: VecDeque<String>,
    matang: VecDeque<u32>,
    mentah: VecDeque<u32>,
    berbunga: VecDeque<u32>,
}

impl Default for ChartSeries {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartSeries {
    pub fn new() -> Self {
        Self::with_capacity(CHART_CAPACITY)
    }

    /// Chart with a custom depth (at least 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            labels: VecDeque::with_capacity(capacity + 1),
            matang: VecDeque::with_capacity(capacity + 1),
            mentah: VecDeque::with_capacity(capacity + 1),
            berbunga: VecDeque::with_capacity(capacity + 1),
        }
    }

    /// Append a sample, evicting the oldest one when over capacity.
    ///
    /// Returns the evicted row, if any.
    pub fn push(&mut self, label: impl Into<String>, stats: &Stats) -> Option<ChartPoint> {
        self.labels.push_back(label.into());
        self.matang.push_back(stats.matang);
        self.mentah.push_back(stats.mentah);
        self.berbunga.push_back(stats.berbunga);

        if self.labels.len() > self.capacity {
            // All four columns are popped together or not at all
            match (
                self.labels.pop_front(),
                self.matang.pop_front(),
                self.mentah.pop_front(),
                self.berbunga.pop_front(),
            ) {
                (Some(label), Some(matang), Some(mentah), Some(berbunga)) => Some(ChartPoint {
                    label,
                    matang,
                    mentah,
                    berbunga,
                }),
                _ => None,
            }
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn matang(&self) -> impl Iterator<Item = u32> + '_ {
        self.matang.iter().copied()
    }

    /// Rows in chronological order (oldest first)
    pub fn points(&self) -> Vec<ChartPoint> {
        self.labels
            .iter()
            .zip(self.matang.iter())
            .zip(self.mentah.iter())
            .zip(self.berbunga.iter())
            .map(|(((label, &matang), &mentah), &berbunga)| ChartPoint {
                label: label.clone(),
                matang,
                mentah,
                berbunga,
            })
            .collect()
    }

    /// Largest count across all categories, used to scale bars
    pub fn peak(&self) -> u32 {
        self.matang
            .iter()
            .chain(self.mentah.iter())
            .chain(self.berbunga.iter())
            .copied()
            .max()
            .unwrap_or(0)
    }

    #[cfg(test)]
    fn column_lengths(&self) -> [usize; 4] {
        [
            self.labels.len(),
            self.matang.len(),
            self.mentah.len(),
            self.berbunga.len(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn stats(n: u32) -> Stats {
        Stats {
            matang: n,
            mentah: n + 1,
            berbunga: n + 2,
        }
    }

    #[test]
    fn test_push_below_capacity_keeps_everything() {
        let mut chart = ChartSeries::new();
        for i in 0..5 {
            assert!(chart.push(format!("10.0{}", i), &stats(i)).is_none());
        }
        assert_eq!(chart.len(), 5);
        assert_eq!(chart.labels().next(), Some("10.00"));
    }

    #[test]
    fn test_push_past_capacity_evicts_oldest_row() {
        let mut chart = ChartSeries::new();
        for i in 0..CHART_CAPACITY as u32 {
            chart.push(format!("t{}", i), &stats(i));
        }
        assert_eq!(chart.len(), CHART_CAPACITY);

        let evicted = chart.push("t20", &stats(20)).unwrap();
        assert_eq!(evicted.label, "t0");
        assert_eq!((evicted.matang, evicted.mentah, evicted.berbunga), (0, 1, 2));

        assert_eq!(chart.len(), CHART_CAPACITY);
        assert_eq!(chart.labels().next(), Some("t1"));
        assert_eq!(chart.labels().last(), Some("t20"));
        assert_eq!(chart.matang().last(), Some(20));
    }

    #[test]
    fn test_peak() {
        let mut chart = ChartSeries::with_capacity(3);
        assert_eq!(chart.peak(), 0);
        chart.push(
            "a",
            &Stats {
                matang: 1,
                mentah: 9,
                berbunga: 0,
            },
        );
        chart.push("b", &stats(2));
        assert_eq!(chart.peak(), 9);
    }

    proptest! {
        #[test]
        fn prop_columns_stay_aligned(counts in prop::collection::vec((0u32..50, 0u32..50, 0u32..50), 0..80)) {
            let mut chart = ChartSeries::new();
            for (i, (matang, mentah, berbunga)) in counts.iter().enumerate() {
                chart.push(i.to_string(), &Stats { matang: *matang, mentah: *mentah, berbunga: *berbunga });
                let [l, a, b, c] = chart.column_lengths();
                prop_assert!(l == a && a == b && b == c);
                prop_assert!(l <= CHART_CAPACITY);
            }

            // The retained rows are exactly the most recent ones, in order
            let expected: Vec<String> = (0..counts.len())
                .skip(counts.len().saturating_sub(CHART_CAPACITY))
                .map(|i| i.to_string())
                .collect();
            let labels: Vec<String> = chart.labels().map(str::to_string).collect();
            prop_assert_eq!(labels, expected);
        }
    }
}
