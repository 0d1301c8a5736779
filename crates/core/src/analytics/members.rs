//! Per-member contribution analytics.
//!
//! Groups commits and pull requests by normalized author identity and
//! derives activity metrics: active days, streaks, busiest week, a
//! two-year contribution heatmap with drill-down details, working-pattern
//! histograms and a team ranking.
//!
//! All calendar bucketing uses a fixed GMT+7 offset (the team's home
//! zone), applied with plain offset arithmetic: no DST, not configurable.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::commits::Commit;
use crate::prs::PullRequest;

const GMT7_OFFSET_SECS: i32 = 7 * 3600;

/// Trailing heatmap window, in days.
const HEATMAP_WINDOW_DAYS: i64 = 730;

/// Login fragments identifying automation accounts; matched
/// case-insensitively as substrings.
const BOT_LOGIN_MARKERS: &[&str] = &[
    "bot",
    "[bot]",
    "copilot",
    "dependabot",
    "renovate",
    "github-actions",
];

pub fn gmt7() -> FixedOffset {
    FixedOffset::east_opt(GMT7_OFFSET_SECS).expect("valid fixed offset")
}

/// Today's calendar date in the GMT+7 bucketing zone.
pub fn gmt7_today() -> NaiveDate {
    Utc::now().with_timezone(&gmt7()).date_naive()
}

fn parse_gmt7(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&gmt7()))
}

/// One commit in the per-date drill-down listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitDetail {
    pub sha: String,
    pub message: String,
    pub url: Option<String>,
}

/// The Monday-keyed week with the most commits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusiestWeek {
    /// Monday of the week, `YYYY-MM-DD`.
    pub week_start: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitFrequency {
    pub total: usize,
    pub active_days: usize,
    pub current_streak: usize,
    pub longest_streak: usize,
    /// Commits per week over the member's active span, one decimal.
    pub per_week: f64,
    pub busiest_week: Option<BusiestWeek>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingPattern {
    /// Sunday-first day-of-week histogram.
    pub by_day: Vec<usize>,
    pub by_hour: Vec<usize>,
    pub peak_day: usize,
    pub peak_hour: usize,
}

impl Default for WorkingPattern {
    fn default() -> Self {
        Self {
            by_day: vec![0; 7],
            by_hour: vec![0; 24],
            peak_day: 0,
            peak_hour: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberPrMetrics {
    pub created: usize,
    pub merged: usize,
    /// Merged-over-created, percent.
    pub merge_rate: f64,
    pub avg_merge_time: f64,
    pub created_before: usize,
    pub created_after: usize,
    pub merged_before: usize,
    pub merged_after: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoActivity {
    pub repo: String,
    pub commits: usize,
    pub prs: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberMetrics {
    pub commit_frequency: CommitFrequency,
    pub working_pattern: WorkingPattern,
    pub pr_metrics: MemberPrMetrics,
    pub repo_activity: Vec<RepoActivity>,
}

/// Aggregated analytics for one contributor; the cached member-stats blob
/// is a ranked list of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberStats {
    pub username: String,
    pub display_name: String,
    pub metrics: MemberMetrics,
    /// Zero-filled trailing window of GMT+7 dates → commit count.
    pub heatmap_data: BTreeMap<String, usize>,
    /// date → repo → commit listing for drill-down.
    pub commit_details: BTreeMap<String, BTreeMap<String, Vec<CommitDetail>>>,
    pub rank: usize,
    /// Share of the team's total commits, percent, one decimal.
    pub team_percentage: f64,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Normalized member key: login, else the local part of the author email.
fn identity(login: Option<&str>, email: Option<&str>) -> Option<String> {
    if let Some(login) = login {
        let login = login.trim();
        if !login.is_empty() {
            return Some(login.to_lowercase());
        }
    }
    let email = email?.trim();
    let local = email.split('@').next()?.trim();
    if local.is_empty() {
        None
    } else {
        Some(local.to_lowercase())
    }
}

fn is_bot_like(username: &str) -> bool {
    let lowered = username.to_lowercase();
    BOT_LOGIN_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

/// Consecutive-day streak ending at `today`, over ascending distinct
/// dates. A gap of more than one day before the newest counted date ends
/// the walk.
pub fn current_streak(dates: &[NaiveDate], today: NaiveDate) -> usize {
    let mut streak = 0;
    let mut prev = today;
    for &date in dates.iter().rev() {
        if (prev - date).num_days() <= 1 {
            streak += 1;
            prev = date;
        } else {
            break;
        }
    }
    streak
}

/// Longest run of strictly consecutive days over ascending distinct dates.
pub fn longest_streak(dates: &[NaiveDate]) -> usize {
    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;
    for &date in dates {
        run = match prev {
            Some(p) if (date - p).num_days() == 1 => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(date);
    }
    longest
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

struct MemberAccumulator {
    display_name: String,
    commits: Vec<Commit>,
    prs: Vec<PullRequest>,
}

/// Compute ranked member stats from the full commit and PR corpus.
///
/// `today` is injected (GMT+7 calendar date) so streak math is
/// deterministic under test.
pub fn compute_member_stats(
    commits: &[Commit],
    prs: &[PullRequest],
    pivot: NaiveDate,
    today: NaiveDate,
) -> Vec<MemberStats> {
    // First-seen ordering is the ranking tie-breaker, so group through an
    // explicit order list rather than map iteration.
    let mut order: Vec<String> = Vec::new();
    let mut members: HashMap<String, MemberAccumulator> = HashMap::new();

    for commit in commits {
        let Some(key) = identity(commit.author_login.as_deref(), commit.author_email.as_deref())
        else {
            continue;
        };
        let display = commit
            .author_login
            .as_deref()
            .filter(|login| !login.trim().is_empty())
            .unwrap_or(&key)
            .to_string();
        let member = members.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            MemberAccumulator {
                display_name: display,
                commits: Vec::new(),
                prs: Vec::new(),
            }
        });
        member.commits.push(commit.clone());
    }

    for pr in prs {
        let Some(key) = identity(Some(&pr.author_login), None) else {
            continue;
        };
        let member = members.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            MemberAccumulator {
                display_name: pr.author_login.clone(),
                commits: Vec::new(),
                prs: Vec::new(),
            }
        });
        member.prs.push(pr.clone());
    }

    let mut stats: Vec<MemberStats> = order
        .iter()
        .filter(|key| !is_bot_like(key))
        .map(|key| {
            let member = &members[key];
            build_member_stats(key, member, pivot, today)
        })
        .collect();

    // Rank by commit volume; the sort is stable, so equal counts keep
    // first-seen order.
    stats.sort_by(|a, b| {
        b.metrics
            .commit_frequency
            .total
            .cmp(&a.metrics.commit_frequency.total)
    });

    let team_total: usize = stats
        .iter()
        .map(|member| member.metrics.commit_frequency.total)
        .sum();
    for (index, member) in stats.iter_mut().enumerate() {
        member.rank = index + 1;
        member.team_percentage = if team_total > 0 {
            round1(member.metrics.commit_frequency.total as f64 / team_total as f64 * 100.0)
        } else {
            0.0
        };
    }

    stats
}

fn build_member_stats(
    key: &str,
    member: &MemberAccumulator,
    pivot: NaiveDate,
    today: NaiveDate,
) -> MemberStats {
    let mut seen_dates: BTreeSet<NaiveDate> = BTreeSet::new();
    let mut commit_times: Vec<DateTime<FixedOffset>> = Vec::new();

    for commit in &member.commits {
        if let Some(at) = parse_gmt7(&commit.authored_at) {
            seen_dates.insert(at.date_naive());
            commit_times.push(at);
        }
    }
    // Ascending distinct GMT+7 dates; both streak walks rely on the order.
    let distinct_dates: Vec<NaiveDate> = seen_dates.into_iter().collect();

    let commit_frequency = commit_frequency(&member.commits, &distinct_dates, &commit_times, today);
    let working_pattern = working_pattern(&commit_times);
    let pr_metrics = pr_metrics(&member.prs, pivot);
    let (heatmap_data, commit_details) = heatmap(&member.commits, today);
    let repo_activity = repo_activity(&member.commits, &member.prs);

    MemberStats {
        username: key.to_string(),
        display_name: member.display_name.clone(),
        metrics: MemberMetrics {
            commit_frequency,
            working_pattern,
            pr_metrics,
            repo_activity,
        },
        heatmap_data,
        commit_details,
        rank: 0,
        team_percentage: 0.0,
    }
}

fn commit_frequency(
    commits: &[Commit],
    distinct_dates: &[NaiveDate],
    commit_times: &[DateTime<FixedOffset>],
    today: NaiveDate,
) -> CommitFrequency {
    let total = commits.len();

    let per_week = match (commit_times.iter().min(), commit_times.iter().max()) {
        (Some(first), Some(last)) => {
            let span_days = (last.date_naive() - first.date_naive()).num_days();
            let weeks = (span_days as f64 / 7.0).ceil().max(1.0);
            round1(total as f64 / weeks)
        }
        _ => 0.0,
    };

    // Monday buckets; ties go to the week seen first in commit order.
    let mut week_order: Vec<NaiveDate> = Vec::new();
    let mut week_counts: HashMap<NaiveDate, usize> = HashMap::new();
    for at in commit_times {
        let week = week_start(at.date_naive());
        if !week_counts.contains_key(&week) {
            week_order.push(week);
        }
        *week_counts.entry(week).or_insert(0) += 1;
    }
    let mut busiest: Option<BusiestWeek> = None;
    for week in &week_order {
        let count = week_counts[week];
        if busiest.as_ref().map_or(true, |best| count > best.count) {
            busiest = Some(BusiestWeek {
                week_start: week.format("%Y-%m-%d").to_string(),
                count,
            });
        }
    }

    CommitFrequency {
        total,
        active_days: distinct_dates.len(),
        current_streak: current_streak(distinct_dates, today),
        longest_streak: longest_streak(distinct_dates),
        per_week,
        busiest_week: busiest,
    }
}

fn working_pattern(commit_times: &[DateTime<FixedOffset>]) -> WorkingPattern {
    let mut pattern = WorkingPattern::default();
    for at in commit_times {
        pattern.by_day[at.weekday().num_days_from_sunday() as usize] += 1;
        pattern.by_hour[at.hour() as usize] += 1;
    }

    let arg_max = |buckets: &[usize]| -> usize {
        buckets
            .iter()
            .enumerate()
            .max_by_key(|(index, count)| (**count, std::cmp::Reverse(*index)))
            .map(|(index, _)| index)
            .unwrap_or(0)
    };
    pattern.peak_day = arg_max(&pattern.by_day);
    pattern.peak_hour = arg_max(&pattern.by_hour);
    pattern
}

fn pr_metrics(prs: &[PullRequest], pivot: NaiveDate) -> MemberPrMetrics {
    let pivot = pivot.and_hms_opt(0, 0, 0).expect("valid midnight").and_utc();
    let mut metrics = MemberPrMetrics::default();
    let mut merge_hours: Vec<f64> = Vec::new();

    for pr in prs {
        let Some(created) = DateTime::parse_from_rfc3339(&pr.created_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
        else {
            continue;
        };
        let before = created < pivot;

        metrics.created += 1;
        if before {
            metrics.created_before += 1;
        } else {
            metrics.created_after += 1;
        }

        if let Some(merged_at) = pr.merged_at.as_deref() {
            metrics.merged += 1;
            if before {
                metrics.merged_before += 1;
            } else {
                metrics.merged_after += 1;
            }
            if let Ok(merged) = DateTime::parse_from_rfc3339(merged_at) {
                merge_hours
                    .push((merged.with_timezone(&Utc) - created).num_milliseconds() as f64
                        / 3_600_000.0);
            }
        }
    }

    metrics.merge_rate = if metrics.created > 0 {
        round1(metrics.merged as f64 / metrics.created as f64 * 100.0)
    } else {
        0.0
    };
    metrics.avg_merge_time = if merge_hours.is_empty() {
        0.0
    } else {
        merge_hours.iter().sum::<f64>() / merge_hours.len() as f64
    };
    metrics
}

/// Zero-filled trailing window plus per-date-per-repo commit listings.
/// Commits older than the window are not represented.
fn heatmap(
    commits: &[Commit],
    today: NaiveDate,
) -> (
    BTreeMap<String, usize>,
    BTreeMap<String, BTreeMap<String, Vec<CommitDetail>>>,
) {
    let mut heatmap: BTreeMap<String, usize> = BTreeMap::new();
    let window_start = today - Duration::days(HEATMAP_WINDOW_DAYS - 1);
    for offset in 0..HEATMAP_WINDOW_DAYS {
        let date = window_start + Duration::days(offset);
        heatmap.insert(date.format("%Y-%m-%d").to_string(), 0);
    }

    let mut details: BTreeMap<String, BTreeMap<String, Vec<CommitDetail>>> = BTreeMap::new();
    for commit in commits {
        let Some(at) = parse_gmt7(&commit.authored_at) else {
            continue;
        };
        let date = at.date_naive();
        if date < window_start || date > today {
            continue;
        }
        let key = date.format("%Y-%m-%d").to_string();
        if let Some(count) = heatmap.get_mut(&key) {
            *count += 1;
        }
        details
            .entry(key)
            .or_default()
            .entry(commit.repo_name.clone())
            .or_default()
            .push(CommitDetail {
                sha: commit.sha.clone(),
                message: commit.message.clone(),
                url: commit.html_url.clone(),
            });
    }

    (heatmap, details)
}

fn repo_activity(commits: &[Commit], prs: &[PullRequest]) -> Vec<RepoActivity> {
    let mut order: Vec<String> = Vec::new();
    let mut activity: HashMap<String, (usize, usize)> = HashMap::new();

    for commit in commits {
        if !activity.contains_key(&commit.repo_name) {
            order.push(commit.repo_name.clone());
        }
        activity.entry(commit.repo_name.clone()).or_insert((0, 0)).0 += 1;
    }
    for pr in prs {
        if !activity.contains_key(&pr.repo_name) {
            order.push(pr.repo_name.clone());
        }
        activity.entry(pr.repo_name.clone()).or_insert((0, 0)).1 += 1;
    }

    order
        .into_iter()
        .map(|repo| {
            let (commits, prs) = activity[&repo];
            RepoActivity { repo, commits, prs }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prs::PullRequestState;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn commit(sha: &str, login: &str, authored_at: &str) -> Commit {
        Commit {
            sha: sha.to_string(),
            repo_name: "acme/widgets".to_string(),
            author_login: Some(login.to_string()),
            author_email: None,
            message: format!("commit {sha}"),
            html_url: None,
            authored_at: authored_at.to_string(),
        }
    }

    #[test]
    fn current_streak_counts_consecutive_days_up_to_today() {
        let dates: Vec<NaiveDate> = (1..=5).map(|d| date(2025, 8, d)).collect();
        assert_eq!(current_streak(&dates, date(2025, 8, 5)), 5);
    }

    #[test]
    fn current_streak_stops_at_the_first_gap() {
        // Aug 1 is isolated; the run ending today is Aug 3..5.
        let dates = vec![
            date(2025, 8, 1),
            date(2025, 8, 3),
            date(2025, 8, 4),
            date(2025, 8, 5),
        ];
        assert_eq!(current_streak(&dates, date(2025, 8, 5)), 3);
    }

    #[test]
    fn current_streak_is_zero_when_last_commit_is_old() {
        let dates = vec![date(2025, 8, 1)];
        assert_eq!(current_streak(&dates, date(2025, 8, 5)), 0);
    }

    #[test]
    fn longest_streak_tracks_the_best_run() {
        let dates = vec![
            date(2025, 7, 1),
            date(2025, 7, 2),
            date(2025, 7, 10),
            date(2025, 7, 11),
            date(2025, 7, 12),
            date(2025, 7, 20),
        ];
        assert_eq!(longest_streak(&dates), 3);
    }

    #[test]
    fn gmt7_shift_moves_late_utc_commits_to_the_next_day() {
        // 2025-08-01T20:00Z is 2025-08-02T03:00 in GMT+7.
        let at = parse_gmt7("2025-08-01T20:00:00Z").unwrap();
        assert_eq!(at.date_naive(), date(2025, 8, 2));
        assert_eq!(at.hour(), 3);
    }

    #[test]
    fn bot_like_logins_are_filtered() {
        let commits = vec![
            commit("a1", "mira", "2025-08-01T10:00:00Z"),
            commit("a2", "dependabot[bot]", "2025-08-01T11:00:00Z"),
            commit("a3", "github-actions", "2025-08-01T12:00:00Z"),
        ];

        let stats = compute_member_stats(&commits, &[], date(2025, 7, 1), date(2025, 8, 1));
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].username, "mira");
    }

    #[test]
    fn identity_falls_back_to_email_local_part() {
        let mut anonymous = commit("b1", "", "2025-08-01T10:00:00Z");
        anonymous.author_login = None;
        anonymous.author_email = Some("Kai.Tran@example.com".to_string());

        let stats =
            compute_member_stats(&[anonymous], &[], date(2025, 7, 1), date(2025, 8, 1));
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].username, "kai.tran");
    }

    #[test]
    fn ranking_is_by_commit_count_with_share_of_total() {
        let commits = vec![
            commit("c1", "mira", "2025-08-01T10:00:00Z"),
            commit("c2", "mira", "2025-08-01T11:00:00Z"),
            commit("c3", "mira", "2025-08-02T10:00:00Z"),
            commit("c4", "kai", "2025-08-01T10:00:00Z"),
        ];

        let stats = compute_member_stats(&commits, &[], date(2025, 7, 1), date(2025, 8, 2));
        assert_eq!(stats[0].username, "mira");
        assert_eq!(stats[0].rank, 1);
        assert_eq!(stats[0].team_percentage, 75.0);
        assert_eq!(stats[1].username, "kai");
        assert_eq!(stats[1].rank, 2);
        assert_eq!(stats[1].team_percentage, 25.0);
    }

    #[test]
    fn equal_commit_counts_keep_first_seen_order() {
        let commits = vec![
            commit("d1", "kai", "2025-08-01T10:00:00Z"),
            commit("d2", "mira", "2025-08-01T11:00:00Z"),
        ];

        let stats = compute_member_stats(&commits, &[], date(2025, 7, 1), date(2025, 8, 1));
        assert_eq!(stats[0].username, "kai");
        assert_eq!(stats[1].username, "mira");
    }

    #[test]
    fn heatmap_window_is_zero_filled_and_counts_commits() {
        let today = date(2025, 8, 6);
        let commits = vec![
            commit("e1", "mira", "2025-08-01T10:00:00Z"),
            commit("e2", "mira", "2025-08-01T12:00:00Z"),
        ];

        let stats = compute_member_stats(&commits, &[], date(2025, 7, 1), today);
        let heatmap = &stats[0].heatmap_data;
        assert_eq!(heatmap.len(), HEATMAP_WINDOW_DAYS as usize);
        assert_eq!(heatmap.get("2025-08-01"), Some(&2));
        assert_eq!(heatmap.get("2025-08-02"), Some(&0));

        let details = &stats[0].commit_details["2025-08-01"]["acme/widgets"];
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].sha, "e1");
    }

    #[test]
    fn busiest_week_buckets_start_on_monday() {
        // 2025-08-04 is a Monday; the three commits that week beat the one
        // the week before.
        let commits = vec![
            commit("f1", "mira", "2025-07-30T10:00:00Z"),
            commit("f2", "mira", "2025-08-04T10:00:00Z"),
            commit("f3", "mira", "2025-08-05T10:00:00Z"),
            commit("f4", "mira", "2025-08-06T10:00:00Z"),
        ];

        let stats = compute_member_stats(&commits, &[], date(2025, 7, 1), date(2025, 8, 6));
        let busiest = stats[0]
            .metrics
            .commit_frequency
            .busiest_week
            .clone()
            .unwrap();
        assert_eq!(busiest.week_start, "2025-08-04");
        assert_eq!(busiest.count, 3);
    }

    #[test]
    fn working_pattern_reports_peak_buckets() {
        // Two commits on a GMT+7 Friday morning, one on Saturday.
        let commits = vec![
            commit("g1", "mira", "2025-08-01T02:00:00Z"),
            commit("g2", "mira", "2025-08-01T03:00:00Z"),
            commit("g3", "mira", "2025-08-02T02:00:00Z"),
        ];

        let stats = compute_member_stats(&commits, &[], date(2025, 7, 1), date(2025, 8, 2));
        let pattern = &stats[0].metrics.working_pattern;
        // Friday is index 5, Sunday-first.
        assert_eq!(pattern.peak_day, 5);
        assert_eq!(pattern.by_day[5], 2);
        assert_eq!(pattern.by_day[6], 1);
        assert_eq!(pattern.by_hour[9], 1);
        assert_eq!(pattern.by_hour[10], 1);
    }

    #[test]
    fn member_pr_metrics_split_on_pivot() {
        let mut before = PullRequest {
            id: 1,
            number: 1,
            repo_name: "acme/widgets".to_string(),
            title: "one".to_string(),
            state: PullRequestState::Closed,
            author_login: "mira".to_string(),
            created_at: "2025-06-01T00:00:00Z".to_string(),
            merged_at: Some("2025-06-02T00:00:00Z".to_string()),
            first_review_at: None,
            raw_json: None,
            synced_at: "2025-08-01T00:00:00Z".to_string(),
        };
        let mut after = before.clone();
        before.number = 1;
        after.number = 2;
        after.created_at = "2025-08-01T00:00:00Z".to_string();
        after.merged_at = None;
        after.state = PullRequestState::Open;

        let stats = compute_member_stats(
            &[],
            &[before, after],
            date(2025, 7, 1),
            date(2025, 8, 1),
        );
        let metrics = &stats[0].metrics.pr_metrics;
        assert_eq!(metrics.created, 2);
        assert_eq!(metrics.created_before, 1);
        assert_eq!(metrics.created_after, 1);
        assert_eq!(metrics.merged, 1);
        assert_eq!(metrics.merge_rate, 50.0);
        assert!((metrics.avg_merge_time - 24.0).abs() < 1e-9);
    }

    #[test]
    fn commits_per_week_uses_the_active_span() {
        // 8 commits across a 14-day span: ceil(14/7) = 2 weeks -> 4.0.
        let commits: Vec<Commit> = (0..8)
            .map(|i| {
                commit(
                    &format!("h{i}"),
                    "mira",
                    &format!("2025-08-{:02}T10:00:00Z", 1 + i * 2),
                )
            })
            .collect();

        let stats = compute_member_stats(&commits, &[], date(2025, 7, 1), date(2025, 8, 15));
        assert_eq!(stats[0].metrics.commit_frequency.per_week, 4.0);
    }
}
