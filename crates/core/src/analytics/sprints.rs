//! Sprint metrics: per-sprint point reduction and pivot-split aggregates.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::sprints::{Sprint, SprintIssue};

/// Point totals reduced from one sprint's issue set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintMetrics {
    pub committed_points: f64,
    pub completed_points: f64,
    pub completion_rate: f64,
    pub issue_count: i64,
}

/// Before/after aggregates around the pivot date.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintStats {
    pub sprint_count_before: usize,
    pub sprint_count_after: usize,
    pub avg_completion_before: f64,
    pub avg_completion_after: f64,
    pub avg_points_before: f64,
    pub avg_points_after: f64,
    pub total_points_before: f64,
    pub total_points_after: f64,
}

/// Reduce a sprint's issues to committed/completed points.
///
/// Committed sums every issue's story points; completed restricts the sum
/// to issues whose status category is "done". Rate is a percentage, 0 when
/// nothing was committed.
pub fn sprint_metrics(issues: &[SprintIssue]) -> SprintMetrics {
    let mut committed = 0.0;
    let mut completed = 0.0;

    for issue in issues {
        committed += issue.story_points;
        if issue.done {
            completed += issue.story_points;
        }
    }

    SprintMetrics {
        committed_points: committed,
        completed_points: completed,
        completion_rate: if committed > 0.0 {
            completed / committed * 100.0
        } else {
            0.0
        },
        issue_count: issues.len() as i64,
    }
}

/// Partition by `(end_date else complete_date) < pivot`. Sprints with no
/// usable end date are skipped.
pub fn sprint_stats(sprints: &[Sprint], pivot: NaiveDate) -> SprintStats {
    let pivot = pivot.and_hms_opt(0, 0, 0).expect("valid midnight").and_utc();

    let end_of = |sprint: &Sprint| -> Option<DateTime<Utc>> {
        let raw = sprint
            .end_date
            .as_deref()
            .or(sprint.complete_date.as_deref())?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    };

    let mut stats = SprintStats::default();
    let mut completion_before = Vec::new();
    let mut completion_after = Vec::new();

    for sprint in sprints {
        let Some(end) = end_of(sprint) else {
            continue;
        };

        if end < pivot {
            stats.sprint_count_before += 1;
            stats.total_points_before += sprint.completed_points;
            completion_before.push(sprint.completion_rate);
        } else {
            stats.sprint_count_after += 1;
            stats.total_points_after += sprint.completed_points;
            completion_after.push(sprint.completion_rate);
        }
    }

    let average = |values: &[f64]| -> f64 {
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    };

    stats.avg_completion_before = average(&completion_before);
    stats.avg_completion_after = average(&completion_after);
    stats.avg_points_before = if stats.sprint_count_before > 0 {
        stats.total_points_before / stats.sprint_count_before as f64
    } else {
        0.0
    };
    stats.avg_points_after = if stats.sprint_count_after > 0 {
        stats.total_points_after / stats.sprint_count_after as f64
    } else {
        0.0
    };
    stats
}
