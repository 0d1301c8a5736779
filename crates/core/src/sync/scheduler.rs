//! Core scheduler constants for source refresh.

/// Default staleness window in hours; cached data older than this triggers
/// a background refresh on the next read.
pub const DEFAULT_STALE_HOURS: i64 = 6;

/// Cache key under which the derived member-stats blob is stored.
pub const MEMBER_STATS_CACHE_KEY: &str = "member_stats";
