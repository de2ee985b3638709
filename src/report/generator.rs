//! Markdown and JSON report generation.
//!
//! This module renders the dashboard sections that the web page used to
//! draw: summary cards, college comparison, semester bars, the subject x
//! college heatmap and the action-item table.

use super::palette::HeatBand;
use super::Report;
use crate::analysis::Dashboard;
use crate::models::{ActionItems, CollegeAverage, Heatmap, ReportMetadata, ScoreSummary, SemesterAverage};
use anyhow::Result;

/// Placeholder for a value that could not be computed.
const MISSING: &str = "—";

/// Message shown when no row fell below the threshold.
pub const NO_ACTION_ITEMS: &str = "No priority action items found. Great work!";

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, bar_width: usize) -> String {
    let mut output = String::new();
    let dashboard = &report.dashboard;

    output.push_str("# Survey Feedback Dashboard\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(dashboard.summary.as_ref()));
    output.push_str(&generate_college_section(&dashboard.colleges));
    output.push_str(&generate_semester_section(&dashboard.semesters, bar_width));
    output.push_str(&generate_heatmap_section(&dashboard.heatmap));
    output.push_str(&generate_action_items_section(
        &dashboard.action_items,
        report.metadata.action_threshold,
    ));
    output.push_str(&generate_footer());

    output
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Short summary printed to the terminal after the report is written.
pub fn terminal_summary(dashboard: &Dashboard) -> String {
    let mut lines = Vec::new();

    match &dashboard.summary {
        Some(summary) => {
            lines.push(format!(
                "   Avg content score: {:.2} | Avg trainer score: {}",
                summary.avg_content,
                fmt_score(summary.avg_trainer)
            ));
            lines.push(format!(
                "   Highest: {:.2} | Lowest: {:.2}",
                summary.highest, summary.lowest
            ));
        }
        None => lines.push("   No scored responses to summarise.".to_string()),
    }

    lines.push(format!(
        "   Colleges: {} | Semesters: {} | Subjects: {}",
        dashboard.colleges.len(),
        dashboard.semesters.len(),
        dashboard.heatmap.subjects.len()
    ));

    match &dashboard.action_items {
        ActionItems::Items(items) => {
            lines.push(format!("   ⚠️  Action items: {}", items.len()));
        }
        ActionItems::NoneFound => lines.push(format!("   ✅ {}", NO_ACTION_ITEMS)),
    }

    lines.join("\n")
}

/// Make free text safe inside a Markdown table cell.
fn cell(text: &str) -> String {
    text.replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .replace('|', "\\|")
}

fn fmt_score(score: Option<f64>) -> String {
    score
        .map(|s| format!("{:.2}", s))
        .unwrap_or_else(|| MISSING.to_string())
}

/// Text bar for a 0-10 score.
fn score_bar(score: f64, width: usize) -> String {
    let ratio = (score / 10.0).clamp(0.0, 1.0);
    let filled = (ratio * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Responses:** {}\n", metadata.rows_loaded));
    section.push_str(&format!(
        "- **Action Threshold:** {:.1}\n",
        metadata.action_threshold
    ));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the summary cards.
fn generate_summary_section(summary: Option<&ScoreSummary>) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");

    let Some(summary) = summary else {
        section.push_str("No valid content scores were found; summary skipped.\n\n");
        return section;
    };

    section.push_str("| Avg Content Score | Avg Trainer Score | Highest Score | Lowest Score |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {:.2} | {} | {:.2} | {:.2} |\n\n",
        summary.avg_content,
        fmt_score(summary.avg_trainer),
        summary.highest,
        summary.lowest
    ));
    section.push_str(&format!(
        "*Based on {} content and {} trainer scores.*\n\n",
        summary.content_count, summary.trainer_count
    ));

    section
}

/// Generate the per-college comparison table.
fn generate_college_section(colleges: &[CollegeAverage]) -> String {
    let mut section = String::new();

    section.push_str("## College Comparison\n\n");

    if colleges.is_empty() {
        section.push_str("No colleges found.\n\n");
        return section;
    }

    section.push_str("| College | Content Score | Trainer Score | Responses |\n");
    section.push_str("|:---|:---:|:---:|:---:|\n");

    for college in colleges {
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            cell(&college.college),
            fmt_score(college.avg_content),
            fmt_score(college.avg_trainer),
            college.responses
        ));
    }
    section.push('\n');

    section
}

/// Generate the semester averages with text bars.
fn generate_semester_section(semesters: &[SemesterAverage], bar_width: usize) -> String {
    let mut section = String::new();

    section.push_str("## Semester Averages\n\n");

    if semesters.is_empty() {
        section.push_str("No semesters found.\n\n");
        return section;
    }

    section.push_str("| Semester | Average Score | |\n");
    section.push_str("|:---|:---:|:---|\n");

    for semester in semesters {
        let bar = semester
            .avg_score
            .map(|s| format!("`{}`", score_bar(s, bar_width)))
            .unwrap_or_default();
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            cell(&semester.semester),
            fmt_score(semester.avg_score),
            bar
        ));
    }
    section.push('\n');

    section
}

/// Generate the subject x college heatmap table.
fn generate_heatmap_section(heatmap: &Heatmap) -> String {
    let mut section = String::new();

    section.push_str("## Subject x College Heatmap\n\n");

    if heatmap.series.is_empty() {
        section.push_str("No data to plot.\n\n");
        return section;
    }

    section.push_str("| College |");
    for subject in &heatmap.subjects {
        section.push_str(&format!(" {} |", cell(subject)));
    }
    section.push_str("\n|:---|");
    section.push_str(&":---:|".repeat(heatmap.subjects.len()));
    section.push('\n');

    for series in &heatmap.series {
        section.push_str(&format!("| {} |", cell(&series.college)));
        for heat in &series.cells {
            match heat.score {
                Some(score) => {
                    let band = HeatBand::for_score(score);
                    section.push_str(&format!(" {} {:.2} {} |", band.emoji(), score, band));
                }
                None => section.push_str(&format!(" {} |", MISSING)),
            }
        }
        section.push('\n');
    }

    section.push_str(&format!(
        "\n{} {} (< 6) · {} {} (6 - 8) · {} {} (≥ 8)\n\n",
        HeatBand::Low.emoji(),
        HeatBand::Low,
        HeatBand::Mid.emoji(),
        HeatBand::Mid,
        HeatBand::High.emoji(),
        HeatBand::High
    ));

    section
}

/// Generate the action items table.
fn generate_action_items_section(items: &ActionItems, threshold: f64) -> String {
    let mut section = String::new();

    section.push_str("## Priority Action Items\n\n");

    let items = match items {
        ActionItems::Items(items) => items,
        ActionItems::NoneFound => {
            section.push_str(NO_ACTION_ITEMS);
            section.push_str("\n\n");
            return section;
        }
    };

    section.push_str(&format!(
        "Responses with a score below {:.1}:\n\n",
        threshold
    ));
    section.push_str("| Subject | College | Semester | Low Score | Action |\n");
    section.push_str("|:---|:---|:---|:---|:---|\n");

    for item in items {
        section.push_str(&format!(
            "| {} | {} | {} | {} | **{}** |\n",
            cell(&item.subject),
            cell(&item.college),
            cell(&item.semester),
            item.low_field,
            item.label
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by SurveyDash v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}
