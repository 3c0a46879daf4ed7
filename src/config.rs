//! Report configuration: passing threshold, ranking depth, bucket bins and
//! bucket weighting.
//!
//! Stored as a JSON object on disk; every field is optional:
//! ```json
//! {
//!   "passing_score": 70.0,
//!   "top_n": 5,
//!   "weighting": "by-student-count",
//!   "size_bins": [
//!     { "label": "Small (<1000)", "lower": 0, "upper": 1000 },
//!     { "label": "Large (1000-5000)", "lower": 1000, "upper": 5000 }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

use crate::error::{ReportError, Result};

/// A half-open numeric interval `(lower, upper]` with a display label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub label: String,
    pub lower: f64,
    pub upper: f64,
}

impl Bin {
    pub fn new(label: &str, lower: f64, upper: f64) -> Self {
        Self {
            label: label.to_string(),
            lower,
            upper,
        }
    }

    /// True when `value` lies in `(lower, upper]`.
    pub fn contains(&self, value: f64) -> bool {
        value > self.lower && value <= self.upper
    }
}

/// How per-school metrics are combined inside a bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Weighting {
    /// Every school counts once.
    #[default]
    #[serde(rename = "none")]
    Unweighted,
    /// Schools count in proportion to their enrolled students.
    ByStudentCount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Minimum score (inclusive) that counts as passing a subject.
    pub passing_score: f64,
    /// Number of schools in the top and bottom rankings.
    pub top_n: usize,
    pub weighting: Weighting,
    pub spending_bins: Vec<Bin>,
    pub size_bins: Vec<Bin>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            passing_score: 70.0,
            top_n: 5,
            weighting: Weighting::Unweighted,
            spending_bins: default_spending_bins(),
            size_bins: default_size_bins(),
        }
    }
}

pub fn default_spending_bins() -> Vec<Bin> {
    vec![
        Bin::new("<$585", 0.0, 585.0),
        Bin::new("$585-630", 585.0, 630.0),
        Bin::new("$630-645", 630.0, 645.0),
        Bin::new("$645-680", 645.0, 680.0),
    ]
}

pub fn default_size_bins() -> Vec<Bin> {
    vec![
        Bin::new("Small (<1000)", 0.0, 1000.0),
        Bin::new("Medium (1000-2000)", 1000.0, 2000.0),
        Bin::new("Large (2000-5000)", 2000.0, 5000.0),
    ]
}

impl ReportConfig {
    /// Loads the config from a JSON file at `path` and validates it.
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ReportError::SourceUnavailable {
                source_name: "config",
                path: path.to_string(),
                source,
            })?;
        let config: ReportConfig = serde_json::from_str(&content)?;
        config.validate()?;
        debug!(path, ?config, "Report config loaded");
        Ok(config)
    }

    /// Checks the threshold and that every bin list is well formed.
    pub fn validate(&self) -> Result<()> {
        if !self.passing_score.is_finite() {
            return Err(ReportError::Config(
                "passing_score must be a finite number".into(),
            ));
        }
        check_bins("spending_bins", &self.spending_bins)?;
        check_bins("size_bins", &self.size_bins)?;
        Ok(())
    }
}

fn check_bins(name: &str, bins: &[Bin]) -> Result<()> {
    for bin in bins {
        // NaN bounds compare as None and are rejected here too.
        if bin.lower.partial_cmp(&bin.upper) != Some(Ordering::Less) {
            return Err(ReportError::Config(format!(
                "{name}: bin '{}' needs lower < upper",
                bin.label
            )));
        }
    }

    let mut sorted: Vec<&Bin> = bins.iter().collect();
    sorted.sort_by(|a, b| a.lower.total_cmp(&b.lower));
    for pair in sorted.windows(2) {
        if pair[1].lower < pair[0].upper {
            return Err(ReportError::Config(format!(
                "{name}: bins '{}' and '{}' overlap",
                pair[0].label, pair[1].label
            )));
        }
    }

    Ok(())
}
