//! Score aggregation and statistics.
//!
//! Every function here is a pure read of a [`Dataset`]. Invalid scores are
//! dropped per field; a category with nothing to average yields `None`.

use crate::models::{
    round2, ActionItem, ActionItems, CollegeAverage, Dataset, Heatmap, HeatmapCell,
    HeatmapSeries, LowField, Row, ScoreSummary, SemesterAverage, REVIEW_LABEL,
};
use std::collections::HashSet;
use tracing::debug;

/// Default score below which a row becomes an action item.
pub const DEFAULT_ACTION_THRESHOLD: f64 = 7.0;

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean rounded to two decimals.
fn rounded_mean(values: &[f64]) -> Option<f64> {
    mean(values).map(round2)
}

/// Distinct values of a categorical field in first-seen order.
pub fn distinct_in_order<F>(dataset: &Dataset, key: F) -> Vec<String>
where
    F: Fn(&Row) -> &str,
{
    let mut seen = HashSet::new();
    let mut ordered = Vec::new();

    for row in dataset.rows() {
        let value = key(row);
        if seen.insert(value) {
            ordered.push(value.to_string());
        }
    }

    ordered
}

/// Compute headline averages and extremes.
///
/// Returns `None` when no content score parses; an unscored dataset has
/// nothing to summarise.
pub fn summary_statistics(dataset: &Dataset) -> Option<ScoreSummary> {
    let content: Vec<f64> = dataset.rows().iter().filter_map(Row::content).collect();
    let trainer: Vec<f64> = dataset.rows().iter().filter_map(Row::trainer).collect();

    if content.is_empty() {
        debug!("No valid content scores, skipping summary");
        return None;
    }

    let all = content.iter().chain(trainer.iter()).copied();
    let highest = all.clone().fold(f64::NEG_INFINITY, f64::max);
    let lowest = all.fold(f64::INFINITY, f64::min);

    for score in content.iter().chain(trainer.iter()) {
        if !(0.0..=10.0).contains(score) {
            debug!("Score {} outside the expected 0-10 range", score);
        }
    }

    Some(ScoreSummary {
        avg_content: rounded_mean(&content)?,
        avg_trainer: rounded_mean(&trainer),
        highest: round2(highest),
        lowest: round2(lowest),
        content_count: content.len(),
        trainer_count: trainer.len(),
    })
}

/// Average content and trainer score per college, first-seen order.
pub fn college_averages(dataset: &Dataset) -> Vec<CollegeAverage> {
    distinct_in_order(dataset, |r| r.college.as_str())
        .into_iter()
        .map(|college| {
            let rows: Vec<&Row> = dataset
                .rows()
                .iter()
                .filter(|r| r.college == college)
                .collect();
            let content: Vec<f64> = rows.iter().filter_map(|r| r.content()).collect();
            let trainer: Vec<f64> = rows.iter().filter_map(|r| r.trainer()).collect();

            CollegeAverage {
                avg_content: rounded_mean(&content),
                avg_trainer: rounded_mean(&trainer),
                responses: rows.len(),
                college,
            }
        })
        .collect()
}

/// Average combined score per semester, sorted by semester token.
pub fn semester_averages(dataset: &Dataset) -> Vec<SemesterAverage> {
    let mut semesters = distinct_in_order(dataset, |r| r.semester.as_str());
    semesters.sort();

    semesters
        .into_iter()
        .map(|semester| {
            let rows: Vec<&Row> = dataset
                .rows()
                .iter()
                .filter(|r| r.semester == semester)
                .collect();
            let combined: Vec<f64> = rows.iter().filter_map(|r| r.combined()).collect();

            SemesterAverage {
                avg_score: rounded_mean(&combined),
                responses: rows.len(),
                semester,
            }
        })
        .collect()
}

/// Subject x college grid of combined-score averages.
///
/// The grid is always complete: a college with no rows for a subject gets a
/// `None` cell.
pub fn subject_college_heatmap(dataset: &Dataset) -> Heatmap {
    let subjects = distinct_in_order(dataset, |r| r.subject.as_str());
    let colleges = distinct_in_order(dataset, |r| r.college.as_str());

    let series = colleges
        .into_iter()
        .map(|college| {
            let cells = subjects
                .iter()
                .map(|subject| {
                    let combined: Vec<f64> = dataset
                        .rows()
                        .iter()
                        .filter(|r| r.college == college && &r.subject == subject)
                        .filter_map(Row::combined)
                        .collect();

                    HeatmapCell {
                        subject: subject.clone(),
                        score: rounded_mean(&combined),
                    }
                })
                .collect();

            HeatmapSeries { college, cells }
        })
        .collect();

    Heatmap { subjects, series }
}

/// Rows with either score below `threshold`, in source order.
pub fn action_items(dataset: &Dataset, threshold: f64) -> ActionItems {
    let items: Vec<ActionItem> = dataset
        .rows()
        .iter()
        .filter_map(|row| {
            let content_low = row.content().is_some_and(|s| s < threshold);
            let trainer_low = row.trainer().is_some_and(|s| s < threshold);

            let low_field = match (content_low, trainer_low) {
                (true, true) => LowField::Both,
                (true, false) => LowField::Content,
                (false, true) => LowField::Trainer,
                (false, false) => return None,
            };

            Some(ActionItem {
                subject: row.subject.clone(),
                college: row.college.clone(),
                semester: row.semester.clone(),
                low_field,
                label: REVIEW_LABEL.to_string(),
            })
        })
        .collect();

    if items.is_empty() {
        ActionItems::NoneFound
    } else {
        ActionItems::Items(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dataset(rows: Vec<Row>) -> Dataset {
        Dataset::new(rows)
    }

    fn sample() -> Dataset {
        dataset(vec![
            Row::new("A", "2", "Maths", 8.0, 6.0),
            Row::new("A", "1", "Physics", 6.0, 8.0),
            Row::new("B", "1", "Maths", 10.0, 10.0),
        ])
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
    }

    #[test]
    fn test_summary_statistics() {
        let summary = summary_statistics(&sample()).unwrap();

        assert_eq!(summary.avg_content, 8.0);
        assert_eq!(summary.avg_trainer, Some(8.0));
        assert_eq!(summary.highest, 10.0);
        assert_eq!(summary.lowest, 6.0);
        assert_eq!(summary.content_count, 3);
        assert_eq!(summary.trainer_count, 3);
    }

    #[test]
    fn test_summary_drops_non_numeric_entries() {
        let mut bad = Row::new("A", "1", "Maths", 0.0, 9.0);
        bad.content_score = json!("not a number");
        let data = dataset(vec![Row::new("A", "1", "Maths", 7.0, 5.0), bad]);

        let summary = summary_statistics(&data).unwrap();

        // The unparseable cell must not count as zero.
        assert_eq!(summary.avg_content, 7.0);
        assert_eq!(summary.content_count, 1);
        assert_eq!(summary.avg_trainer, Some(7.0));
        assert_eq!(summary.lowest, 5.0);
        assert_eq!(summary.highest, 9.0);
    }

    #[test]
    fn test_summary_rounding() {
        let data = dataset(vec![
            Row::new("A", "1", "Maths", 7.0, 7.0),
            Row::new("A", "1", "Maths", 8.0, 7.0),
            Row::new("A", "1", "Maths", 8.0, 7.0),
        ]);

        let summary = summary_statistics(&data).unwrap();
        assert_eq!(summary.avg_content, 7.67);
    }

    #[test]
    fn test_summary_skipped_without_content_scores() {
        let mut row = Row::new("A", "1", "Maths", 0.0, 9.0);
        row.content_score = json!("");
        assert_eq!(summary_statistics(&dataset(vec![row])), None);
        assert_eq!(summary_statistics(&Dataset::default()), None);
    }

    #[test]
    fn test_summary_without_trainer_scores() {
        let mut row = Row::new("A", "1", "Maths", 6.5, 0.0);
        row.trainer_score = json!(null);

        let summary = summary_statistics(&dataset(vec![row])).unwrap();
        assert_eq!(summary.avg_trainer, None);
        assert_eq!(summary.highest, 6.5);
        assert_eq!(summary.lowest, 6.5);
    }

    #[test]
    fn test_global_extremes() {
        let data = dataset(vec![
            Row::new("A", "1", "Maths", 8.0, 6.0),
            Row::new("A", "1", "Maths", 10.0, 10.0),
            Row::new("A", "1", "Maths", 6.0, 8.0),
        ]);

        let summary = summary_statistics(&data).unwrap();
        assert_eq!(format!("{:.2}", summary.highest), "10.00");
        assert_eq!(format!("{:.2}", summary.lowest), "6.00");
    }

    #[test]
    fn test_college_averages() {
        let averages = college_averages(&sample());

        assert_eq!(averages.len(), 2);
        assert_eq!(averages[0].college, "A");
        assert_eq!(averages[0].avg_content, Some(7.0));
        assert_eq!(averages[0].avg_trainer, Some(7.0));
        assert_eq!(averages[0].responses, 2);
        assert_eq!(averages[1].college, "B");
        assert_eq!(averages[1].avg_content, Some(10.0));
        assert_eq!(averages[1].avg_trainer, Some(10.0));
    }

    #[test]
    fn test_college_order_is_first_seen() {
        let data = dataset(vec![
            Row::new("Zeta", "1", "Maths", 8.0, 8.0),
            Row::new("Alpha", "1", "Maths", 8.0, 8.0),
            Row::new("Zeta", "1", "Maths", 8.0, 8.0),
        ]);

        let names: Vec<String> = college_averages(&data)
            .into_iter()
            .map(|c| c.college)
            .collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn test_college_without_valid_scores_is_null() {
        let mut row = Row::new("C", "1", "Maths", 0.0, 0.0);
        row.content_score = json!("x");
        row.trainer_score = json!("y");

        let averages = college_averages(&dataset(vec![row]));
        assert_eq!(averages[0].avg_content, None);
        assert_eq!(averages[0].avg_trainer, None);
        assert_eq!(averages[0].responses, 1);
    }

    #[test]
    fn test_semester_averages_sorted_and_combined() {
        let data = dataset(vec![
            Row::new("A", "2024-S2", "Maths", 8.0, 6.0),
            Row::new("A", "2024-S1", "Maths", 9.0, 7.0),
            Row::new("B", "2024-S2", "Maths", 10.0, 9.0),
        ]);

        let semesters = semester_averages(&data);

        assert_eq!(semesters[0].semester, "2024-S1");
        assert_eq!(semesters[0].avg_score, Some(8.0));
        assert_eq!(semesters[1].semester, "2024-S2");
        // (7 + 9.5) / 2
        assert_eq!(semesters[1].avg_score, Some(8.25));
        assert_eq!(semesters[1].responses, 2);
    }

    #[test]
    fn test_semester_skips_rows_with_partial_scores() {
        let mut partial = Row::new("A", "1", "Maths", 2.0, 0.0);
        partial.trainer_score = json!("-");
        let data = dataset(vec![Row::new("A", "1", "Maths", 8.0, 9.0), partial]);

        let semesters = semester_averages(&data);
        assert_eq!(semesters[0].avg_score, Some(8.5));
        assert_eq!(semesters[0].responses, 2);
    }

    #[test]
    fn test_heatmap_shape_and_null_cells() {
        let heatmap = subject_college_heatmap(&sample());

        assert_eq!(heatmap.subjects, vec!["Maths", "Physics"]);
        assert_eq!(heatmap.series.len(), 2);

        let a = &heatmap.series[0];
        assert_eq!(a.college, "A");
        assert_eq!(a.cells[0].score, Some(7.0));
        assert_eq!(a.cells[1].score, Some(7.0));

        let b = &heatmap.series[1];
        assert_eq!(b.college, "B");
        assert_eq!(b.cells.len(), 2);
        assert_eq!(b.cells[0].score, Some(10.0));
        assert_eq!(b.cells[1].subject, "Physics");
        assert_eq!(b.cells[1].score, None);
    }

    #[test]
    fn test_action_items_filters_low_rows() {
        let data = dataset(vec![
            Row::new("A", "1", "Maths", 5.0, 9.0),
            Row::new("B", "1", "Physics", 9.0, 9.0),
        ]);

        match action_items(&data, DEFAULT_ACTION_THRESHOLD) {
            ActionItems::Items(items) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].subject, "Maths");
                assert_eq!(items[0].college, "A");
                assert_eq!(items[0].low_field, LowField::Content);
                assert_eq!(items[0].label, REVIEW_LABEL);
            }
            ActionItems::NoneFound => panic!("expected an action item"),
        }
    }

    #[test]
    fn test_action_items_sentinel_when_all_good() {
        let data = dataset(vec![
            Row::new("A", "1", "Maths", 7.0, 9.0),
            Row::new("B", "1", "Physics", 9.0, 7.0),
        ]);

        assert_eq!(
            action_items(&data, DEFAULT_ACTION_THRESHOLD),
            ActionItems::NoneFound
        );
    }

    #[test]
    fn test_action_items_preserve_order_and_ignore_invalid() {
        let mut invalid = Row::new("C", "1", "Chemistry", 0.0, 0.0);
        invalid.content_score = json!("?");
        invalid.trainer_score = json!(null);

        let data = dataset(vec![
            Row::new("B", "1", "Physics", 9.0, 3.0),
            invalid,
            Row::new("A", "1", "Maths", 4.0, 2.0),
        ]);

        let ActionItems::Items(items) = action_items(&data, DEFAULT_ACTION_THRESHOLD) else {
            panic!("expected action items");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].subject, "Physics");
        assert_eq!(items[0].low_field, LowField::Trainer);
        assert_eq!(items[1].subject, "Maths");
        assert_eq!(items[1].low_field, LowField::Both);
    }

    #[test]
    fn test_action_items_custom_threshold() {
        let data = dataset(vec![Row::new("A", "1", "Maths", 8.0, 8.5)]);
        assert_eq!(action_items(&data, 8.0), ActionItems::NoneFound);
        assert_eq!(action_items(&data, 8.6).count(), 1);
    }

    #[test]
    fn test_aggregations_are_idempotent() {
        let data = sample();

        assert_eq!(summary_statistics(&data), summary_statistics(&data));
        assert_eq!(college_averages(&data), college_averages(&data));
        assert_eq!(semester_averages(&data), semester_averages(&data));
        assert_eq!(subject_college_heatmap(&data), subject_college_heatmap(&data));
        assert_eq!(action_items(&data, 7.0), action_items(&data, 7.0));
    }
}
