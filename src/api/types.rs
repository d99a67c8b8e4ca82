//! Wire types for the platform API.
//!
//! Field names mirror the server's JSON: camelCase for run metadata,
//! snake_case `execution_date` on the trend series.

use serde::Deserialize;

/// One test-execution result under an (app, release) pair.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub run_id: String,
    /// ISO-8601 local datetime, rendered as-is.
    #[serde(default)]
    pub timestamp: String,
    pub passed: u32,
    pub failed: u32,
    pub broken: u32,
    pub skipped: u32,
    pub total: u32,
    pub duration_ms: u64,
    /// Storage key of the run's HTML report.
    pub html_path: String,
}

/// One bar group of the app-overview chart (`/api/charts/app`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewPoint {
    pub release: String,
    pub pass_percent: f64,
    #[serde(default)]
    pub failed: Option<u64>,
    #[serde(default)]
    pub broken: Option<u64>,
    #[serde(default)]
    pub skipped: Option<u64>,
}

/// One bar group of the release-trend chart (`/api/charts/release`).
///
/// The server omits or nulls counts for dates with partial data; every
/// accessor defaults those to 0.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrendPoint {
    pub execution_date: String,
    #[serde(default)]
    pub passed: Option<u64>,
    #[serde(default)]
    pub failed: Option<u64>,
    #[serde(default)]
    pub broken: Option<u64>,
    #[serde(default)]
    pub skipped: Option<u64>,
}

impl TrendPoint {
    pub fn passed(&self) -> u64 {
        self.passed.unwrap_or(0)
    }
    pub fn failed(&self) -> u64 {
        self.failed.unwrap_or(0)
    }
    pub fn broken(&self) -> u64 {
        self.broken.unwrap_or(0)
    }
    pub fn skipped(&self) -> u64 {
        self.skipped.unwrap_or(0)
    }
}

impl OverviewPoint {
    /// Pass percentage rounded to the nearest integer, clamped at 0.
    pub fn pass_percent_rounded(&self) -> u64 {
        self.pass_percent.max(0.0).round() as u64
    }
    pub fn failed(&self) -> u64 {
        self.failed.unwrap_or(0)
    }
    pub fn broken(&self) -> u64 {
        self.broken.unwrap_or(0)
    }
    pub fn skipped(&self) -> u64 {
        self.skipped.unwrap_or(0)
    }
}

/// Fields of a multipart archive upload. `file` is a local path.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub app_id: String,
    pub release: String,
    pub execution_date: String,
    pub file: String,
}
