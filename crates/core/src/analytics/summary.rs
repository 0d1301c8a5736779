//! Before/after improvement rollups consumed by the dashboard summary.

use serde::{Deserialize, Serialize};

use super::prs::PrStats;
use super::sprints::SprintStats;

/// Hours saved per merged item, extrapolated to workdays and workweeks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSaved {
    pub per_item: f64,
    pub total_hours: f64,
    /// 8-hour workdays.
    pub total_days: f64,
    /// 40-hour workweeks.
    pub total_weeks: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Improvements {
    pub pr_count: f64,
    pub merge_time: f64,
    pub review_time: f64,
    pub completion_rate: f64,
    pub story_points: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub improvements: Improvements,
    pub time_saved: TimeSaved,
    pub overall_improvement: f64,
}

/// Percentage change from `before` to `after`. With `lower_is_better` the
/// sign flips so a drop reads as a positive improvement. A zero baseline
/// reports 100% unless nothing changed.
pub fn improvement(before: f64, after: f64, lower_is_better: bool) -> f64 {
    if before == 0.0 {
        return if after == 0.0 { 0.0 } else { 100.0 };
    }
    if lower_is_better {
        (before - after) / before * 100.0
    } else {
        (after - before) / before * 100.0
    }
}

pub fn time_saved(before_hours: f64, after_hours: f64, count: usize) -> TimeSaved {
    let per_item = before_hours - after_hours;
    let total_hours = per_item * count as f64;
    TimeSaved {
        per_item,
        total_hours,
        total_days: total_hours / 8.0,
        total_weeks: total_hours / 40.0,
    }
}

/// Combined summary over the pivot-split PR and sprint aggregates.
pub fn summarize(pr_stats: &PrStats, sprint_stats: &SprintStats) -> Summary {
    let improvements = Improvements {
        pr_count: improvement(
            pr_stats.pr_count_before as f64,
            pr_stats.pr_count_after as f64,
            false,
        ),
        merge_time: improvement(
            pr_stats.avg_merge_time_before,
            pr_stats.avg_merge_time_after,
            true,
        ),
        review_time: improvement(
            pr_stats.avg_review_time_before,
            pr_stats.avg_review_time_after,
            true,
        ),
        completion_rate: improvement(
            sprint_stats.avg_completion_before,
            sprint_stats.avg_completion_after,
            false,
        ),
        story_points: improvement(
            sprint_stats.avg_points_before,
            sprint_stats.avg_points_after,
            false,
        ),
    };

    let time_saved = time_saved(
        pr_stats.avg_merge_time_before,
        pr_stats.avg_merge_time_after,
        pr_stats.merged_count_after,
    );

    let overall_improvement = (improvements.pr_count
        + improvements.merge_time
        + improvements.completion_rate
        + improvements.story_points)
        / 4.0;

    Summary {
        improvements,
        time_saved,
        overall_improvement,
    }
}
