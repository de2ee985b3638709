//! Analysis modules.
//!
//! Pure aggregation routines over a loaded dataset, plus the dashboard
//! that bundles their results for rendering.

pub mod aggregator;
pub mod dashboard;

pub use aggregator::*;
pub use dashboard::{AnalysisOptions, Dashboard};
