//! Report generation.
//!
//! Renders a [`Dashboard`] as Markdown or JSON.

pub mod generator;
pub mod palette;

pub use generator::{generate_json_report, generate_markdown_report, terminal_summary};

use crate::analysis::Dashboard;
use crate::models::ReportMetadata;
use serde::{Deserialize, Serialize};

/// Chart colour assigned to a college series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesColor {
    pub college: String,
    pub color: String,
}

/// Everything written to the report file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub dashboard: Dashboard,
    /// One colour per college, in first-seen order.
    pub palette: Vec<SeriesColor>,
}

impl Report {
    /// Assemble a report and assign series colours.
    pub fn new(metadata: ReportMetadata, dashboard: Dashboard) -> Self {
        let palette = dashboard
            .colleges
            .iter()
            .enumerate()
            .map(|(i, c)| SeriesColor {
                college: c.college.clone(),
                color: palette::series_color(i).to_string(),
            })
            .collect();

        Self {
            metadata,
            dashboard,
            palette,
        }
    }
}
