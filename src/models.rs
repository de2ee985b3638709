//! Data models for the survey dashboard.
//!
//! This module contains the row records received from the data source and
//! the aggregate structures derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Label attached to every action item.
pub const REVIEW_LABEL: &str = "Review Feedback";

/// One survey response record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// College the response belongs to.
    #[serde(rename = "College", default, deserialize_with = "text_field")]
    pub college: String,
    /// Semester token (sortable).
    #[serde(rename = "Semester", default, deserialize_with = "text_field")]
    pub semester: String,
    /// Subject taught.
    #[serde(rename = "Subject", default, deserialize_with = "text_field")]
    pub subject: String,
    /// Raw content score as sent by the source.
    #[serde(rename = "Content Score", default)]
    pub content_score: Value,
    /// Raw trainer score as sent by the source.
    #[serde(rename = "Trainer Score", default)]
    pub trainer_score: Value,
}

impl Row {
    /// Build a row from already-numeric scores.
    #[cfg(test)]
    pub fn new(college: &str, semester: &str, subject: &str, content: f64, trainer: f64) -> Self {
        Self {
            college: college.to_string(),
            semester: semester.to_string(),
            subject: subject.to_string(),
            content_score: Value::from(content),
            trainer_score: Value::from(trainer),
        }
    }

    /// Content score, if it parses as a finite number.
    pub fn content(&self) -> Option<f64> {
        parse_score(&self.content_score)
    }

    /// Trainer score, if it parses as a finite number.
    pub fn trainer(&self) -> Option<f64> {
        parse_score(&self.trainer_score)
    }

    /// Mean of both scores; requires both to be valid.
    pub fn combined(&self) -> Option<f64> {
        match (self.content(), self.trainer()) {
            (Some(c), Some(t)) => Some((c + t) / 2.0),
            _ => None,
        }
    }
}

/// Accept strings, numbers, booleans or null for a categorical field.
fn text_field<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

/// Parse a score cell.
///
/// Numbers pass through. Strings contribute their leading number, so
/// `"8/10"` reads as 8 and `"7.5 pts"` as 7.5.
pub fn parse_score(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number(s),
        _ => None,
    }?;

    parsed.is_finite().then_some(parsed)
}

/// Longest decimal prefix of `s` after leading whitespace.
fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - end - 1;
        end = frac_end;
    }

    if mantissa_digits == 0 {
        return None;
    }

    // An exponent only counts when it has digits.
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Round to two decimal places, matching a `toFixed(2)` display.
///
/// Ties in the exact binary value round away from zero; anything else
/// rounds to the nearest hundredth of the exact value, so 1.115 (stored
/// just below the tie) becomes 1.11.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if value.mul_add(100.0, -scaled) == 0.0 {
        return scaled.round() / 100.0;
    }

    format!("{:.2}", value).parse().unwrap_or(value)
}

/// The full ordered collection of rows for one load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Headline statistics across the whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// Mean content score.
    pub avg_content: f64,
    /// Mean trainer score; `None` when no trainer score parsed.
    pub avg_trainer: Option<f64>,
    /// Highest score across both fields.
    pub highest: f64,
    /// Lowest score across both fields.
    pub lowest: f64,
    /// Number of valid content scores.
    pub content_count: usize,
    /// Number of valid trainer scores.
    pub trainer_count: usize,
}

/// Per-college averages of each score field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollegeAverage {
    pub college: String,
    pub avg_content: Option<f64>,
    pub avg_trainer: Option<f64>,
    /// Rows belonging to the college.
    pub responses: usize,
}

/// Average combined score for one semester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemesterAverage {
    pub semester: String,
    pub avg_score: Option<f64>,
    pub responses: usize,
}

/// One subject cell in a heatmap series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub subject: String,
    /// `None` when the college has no rows for the subject.
    pub score: Option<f64>,
}

/// One college row of the subject x college heatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapSeries {
    pub college: String,
    pub cells: Vec<HeatmapCell>,
}

/// Complete subject x college grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Heatmap {
    /// Column order (first-seen).
    pub subjects: Vec<String>,
    pub series: Vec<HeatmapSeries>,
}

/// Which score pulled a row below the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LowField {
    Content,
    Trainer,
    Both,
}

impl fmt::Display for LowField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LowField::Content => write!(f, "Content"),
            LowField::Trainer => write!(f, "Trainer"),
            LowField::Both => write!(f, "Content + Trainer"),
        }
    }
}

/// A row flagged for follow-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub subject: String,
    pub college: String,
    pub semester: String,
    pub low_field: LowField,
    pub label: String,
}

/// Action-item output. `NoneFound` is distinct from an empty dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "items", rename_all = "snake_case")]
pub enum ActionItems {
    Items(Vec<ActionItem>),
    NoneFound,
}

impl ActionItems {
    /// Number of flagged rows (zero for the sentinel).
    pub fn count(&self) -> usize {
        match self {
            ActionItems::Items(items) => items.len(),
            ActionItems::NoneFound => 0,
        }
    }
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// URL or file the data came from.
    pub source: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of rows loaded.
    pub rows_loaded: usize,
    /// Threshold used for action items.
    pub action_threshold: f64,
    /// Load plus aggregation time in seconds.
    pub duration_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_score_variants() {
        assert_eq!(parse_score(&json!(8)), Some(8.0));
        assert_eq!(parse_score(&json!("7.5")), Some(7.5));
        assert_eq!(parse_score(&json!(" 9 ")), Some(9.0));
        assert_eq!(parse_score(&json!("")), None);
        assert_eq!(parse_score(&json!("n/a")), None);
        assert_eq!(parse_score(&json!("NaN")), None);
        assert_eq!(parse_score(&json!(null)), None);
        assert_eq!(parse_score(&json!(true)), None);
    }

    #[test]
    fn test_parse_score_leading_number() {
        assert_eq!(parse_score(&json!("8/10")), Some(8.0));
        assert_eq!(parse_score(&json!("7.5 pts")), Some(7.5));
        assert_eq!(parse_score(&json!("  .5")), Some(0.5));
        assert_eq!(parse_score(&json!("-3")), Some(-3.0));
        assert_eq!(parse_score(&json!("9.")), Some(9.0));
        assert_eq!(parse_score(&json!("1e1x")), Some(10.0));
        assert_eq!(parse_score(&json!("6e")), Some(6.0));
        assert_eq!(parse_score(&json!("abc")), None);
        assert_eq!(parse_score(&json!("-")), None);
        assert_eq!(parse_score(&json!(".")), None);
        assert_eq!(parse_score(&json!("Infinity")), None);
        assert_eq!(parse_score(&json!("1e400")), None);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(7.456), 7.46);
        assert_eq!(round2(6.0), 6.0);
        assert_eq!(round2(8.333333), 8.33);
    }

    #[test]
    fn test_round2_halfway_values() {
        // 1.115 is stored as 1.11499999...
        assert_eq!(round2(1.115), 1.11);
        assert_eq!(round2(1.005), 1.0);
        // 0.125 and 2.375 are exact ties.
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(2.375), 2.38);
    }

    #[test]
    fn test_row_deserialize_lenient_fields() {
        let row: Row = serde_json::from_value(json!({
            "College": "North",
            "Semester": 3,
            "Subject": "Maths",
            "Content Score": "8",
            "Trainer Score": 6.5,
            "Timestamp": "ignored"
        }))
        .unwrap();

        assert_eq!(row.college, "North");
        assert_eq!(row.semester, "3");
        assert_eq!(row.content(), Some(8.0));
        assert_eq!(row.trainer(), Some(6.5));
        assert_eq!(row.combined(), Some(7.25));
    }

    #[test]
    fn test_row_missing_fields() {
        let row: Row = serde_json::from_value(json!({ "College": null })).unwrap();
        assert_eq!(row.college, "");
        assert_eq!(row.subject, "");
        assert_eq!(row.content(), None);
        assert_eq!(row.combined(), None);
    }

    #[test]
    fn test_action_items_count() {
        assert_eq!(ActionItems::NoneFound.count(), 0);
        let items = ActionItems::Items(vec![ActionItem {
            subject: "Physics".to_string(),
            college: "A".to_string(),
            semester: "1".to_string(),
            low_field: LowField::Content,
            label: REVIEW_LABEL.to_string(),
        }]);
        assert_eq!(items.count(), 1);
    }
}
