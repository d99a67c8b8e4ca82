//! Chart dataset building.
//!
//! Converts raw chart series into the bar groups the render layer draws.
//! The overview pass-percentage is rounded to the nearest integer and
//! trend counts missing on the wire chart as 0.

use crate::api::{OverviewPoint, TrendPoint};

use super::state::ChartMode;

/// Bars per group, one per series.
pub const SERIES_PER_GROUP: usize = 4;

/// One x-axis group (a release or an execution date) with its bar values.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartGroup {
    pub label: String,
    pub values: [u64; SERIES_PER_GROUP],
}

/// A fully built chart, replaced wholesale on every load.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartModel {
    pub mode: ChartMode,
    pub groups: Vec<ChartGroup>,
}

impl ChartModel {
    pub fn overview(points: &[OverviewPoint]) -> Self {
        let groups = points
            .iter()
            .map(|p| ChartGroup {
                label: p.release.clone(),
                values: [
                    p.pass_percent_rounded(),
                    p.failed(),
                    p.broken(),
                    p.skipped(),
                ],
            })
            .collect();
        Self {
            mode: ChartMode::AppOverview,
            groups,
        }
    }

    pub fn trend(points: &[TrendPoint]) -> Self {
        let groups = points
            .iter()
            .map(|p| ChartGroup {
                label: p.execution_date.clone(),
                values: [p.passed(), p.failed(), p.broken(), p.skipped()],
            })
            .collect();
        Self {
            mode: ChartMode::ReleaseTrend,
            groups,
        }
    }

    /// Legend labels in bar order.
    pub fn series_labels(&self) -> [&'static str; SERIES_PER_GROUP] {
        match self.mode {
            ChartMode::AppOverview => ["Pass %", "Failed", "Broken", "Skipped"],
            ChartMode::ReleaseTrend => ["Passed", "Failed", "Broken", "Skipped"],
        }
    }

    /// Largest bar value, for axis scaling.
    pub fn max_value(&self) -> u64 {
        self.groups
            .iter()
            .flat_map(|g| g.values.iter().copied())
            .max()
            .unwrap_or(0)
    }
}
