//! Dashboard assembly.
//!
//! Runs each aggregation once over the dataset and keeps the results
//! together so the report layer never touches raw rows.

use crate::analysis::aggregator::{
    action_items, college_averages, semester_averages, subject_college_heatmap,
    summary_statistics, DEFAULT_ACTION_THRESHOLD,
};
use crate::models::{ActionItems, CollegeAverage, Dataset, Heatmap, ScoreSummary, SemesterAverage};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tunables for the aggregation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisOptions {
    /// Scores strictly below this become action items.
    pub action_threshold: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            action_threshold: DEFAULT_ACTION_THRESHOLD,
        }
    }
}

impl From<&crate::config::AnalysisConfig> for AnalysisOptions {
    fn from(config: &crate::config::AnalysisConfig) -> Self {
        Self {
            action_threshold: config.action_threshold,
        }
    }
}

/// Every display-ready summary derived from one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    /// Headline cards; absent when no content score parsed.
    pub summary: Option<ScoreSummary>,
    pub colleges: Vec<CollegeAverage>,
    pub semesters: Vec<SemesterAverage>,
    pub heatmap: Heatmap,
    pub action_items: ActionItems,
}

impl Dashboard {
    /// Aggregate `dataset` into a dashboard.
    pub fn build(dataset: &Dataset, options: &AnalysisOptions) -> Self {
        debug!(
            "Building dashboard from {} rows (threshold {})",
            dataset.len(),
            options.action_threshold
        );

        Self {
            summary: summary_statistics(dataset),
            colleges: college_averages(dataset),
            semesters: semester_averages(dataset),
            heatmap: subject_college_heatmap(dataset),
            action_items: action_items(dataset, options.action_threshold),
        }
    }
}
