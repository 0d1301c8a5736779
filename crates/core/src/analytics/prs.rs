//! Pull-request statistics: pivot-split aggregates and monthly rollups.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::prs::PullRequest;

/// Before/after aggregates around the pivot date.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrStats {
    pub pr_count_before: usize,
    pub pr_count_after: usize,
    pub merged_count_before: usize,
    pub merged_count_after: usize,
    pub avg_merge_time_before: f64,
    pub avg_merge_time_after: f64,
    pub avg_review_time_before: f64,
    pub avg_review_time_after: f64,
}

/// One calendar month of PR activity, keyed `YYYY-MM`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPrStats {
    pub month: String,
    pub pr_count: usize,
    pub merged_count: usize,
    pub avg_merge_time: f64,
}

fn parse_ts(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Hours from creation to merge; `None` when unmerged or unparseable.
fn merge_hours(pr: &PullRequest) -> Option<f64> {
    let merged = parse_ts(pr.merged_at.as_deref()?)?;
    let created = parse_ts(&pr.created_at)?;
    Some((merged - created).num_milliseconds() as f64 / 3_600_000.0)
}

/// Hours from creation to first review; `None` when unreviewed.
fn review_hours(pr: &PullRequest) -> Option<f64> {
    let reviewed = parse_ts(pr.first_review_at.as_deref()?)?;
    let created = parse_ts(&pr.created_at)?;
    Some((reviewed - created).num_milliseconds() as f64 / 3_600_000.0)
}

fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Partition PRs by `created_at < pivot` and aggregate each side.
/// PRs with an unparseable `created_at` are skipped.
pub fn pr_stats(prs: &[PullRequest], pivot: NaiveDate) -> PrStats {
    let pivot = pivot.and_hms_opt(0, 0, 0).expect("valid midnight").and_utc();

    let mut stats = PrStats::default();
    let mut merge_before = Vec::new();
    let mut merge_after = Vec::new();
    let mut review_before = Vec::new();
    let mut review_after = Vec::new();

    for pr in prs {
        let Some(created) = parse_ts(&pr.created_at) else {
            continue;
        };
        let before = created < pivot;

        if before {
            stats.pr_count_before += 1;
        } else {
            stats.pr_count_after += 1;
        }

        if pr.merged_at.is_some() {
            if before {
                stats.merged_count_before += 1;
            } else {
                stats.merged_count_after += 1;
            }
            if let Some(hours) = merge_hours(pr) {
                if before {
                    merge_before.push(hours);
                } else {
                    merge_after.push(hours);
                }
            }
        }

        if let Some(hours) = review_hours(pr) {
            if before {
                review_before.push(hours);
            } else {
                review_after.push(hours);
            }
        }
    }

    stats.avg_merge_time_before = average(&merge_before);
    stats.avg_merge_time_after = average(&merge_after);
    stats.avg_review_time_before = average(&review_before);
    stats.avg_review_time_after = average(&review_after);
    stats
}

/// Group PRs by calendar month of `created_at`, ascending by month key.
pub fn prs_by_month(prs: &[PullRequest]) -> Vec<MonthlyPrStats> {
    struct Bucket {
        pr_count: usize,
        merged_count: usize,
        total_merge_time: f64,
        merged_with_time: usize,
    }

    let mut months: BTreeMap<String, Bucket> = BTreeMap::new();

    for pr in prs {
        let Some(created) = parse_ts(&pr.created_at) else {
            continue;
        };
        let key = format!("{:04}-{:02}", created.year(), created.month());
        let bucket = months.entry(key).or_insert(Bucket {
            pr_count: 0,
            merged_count: 0,
            total_merge_time: 0.0,
            merged_with_time: 0,
        });

        bucket.pr_count += 1;
        if pr.merged_at.is_some() {
            bucket.merged_count += 1;
            if let Some(hours) = merge_hours(pr) {
                bucket.total_merge_time += hours;
                bucket.merged_with_time += 1;
            }
        }
    }

    months
        .into_iter()
        .map(|(month, bucket)| MonthlyPrStats {
            month,
            pr_count: bucket.pr_count,
            merged_count: bucket.merged_count,
            avg_merge_time: if bucket.merged_with_time > 0 {
                bucket.total_merge_time / bucket.merged_with_time as f64
            } else {
                0.0
            },
        })
        .collect()
}
