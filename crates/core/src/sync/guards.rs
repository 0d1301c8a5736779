//! Per-source in-flight guards.
//!
//! At most one sync per source may run at a time within a process; a
//! concurrent attempt is skipped, not queued. The flags are plain process
//! memory and carry no meaning across instances sharing one store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use super::SyncSource;

/// Explicit holder for the per-source in-flight flags, owned by the
/// orchestrator instance.
#[derive(Debug, Default)]
pub struct SyncGuards {
    github: AtomicBool,
    jira: AtomicBool,
}

impl SyncGuards {
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self, source: SyncSource) -> &AtomicBool {
        match source {
            SyncSource::Github => &self.github,
            SyncSource::Jira => &self.jira,
        }
    }

    /// Claim the source for a sync run. Returns `None` when a run is
    /// already in flight; the permit releases the flag on drop, so the
    /// release happens on every exit path.
    pub fn try_acquire(&self, source: SyncSource) -> Option<SyncPermit<'_>> {
        self.flag(source)
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SyncPermit {
                flag: self.flag(source),
            })
    }

    pub fn is_syncing(&self, source: SyncSource) -> bool {
        self.flag(source).load(Ordering::Acquire)
    }

    /// Snapshot of every source's in-flight state, for status endpoints.
    pub fn syncing_map(&self) -> BTreeMap<SyncSource, bool> {
        SyncSource::ALL
            .into_iter()
            .map(|source| (source, self.is_syncing(source)))
            .collect()
    }
}

/// RAII claim on one source's guard.
#[derive(Debug)]
pub struct SyncPermit<'a> {
    flag: &'a AtomicBool,
}

impl Drop for SyncPermit<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_refused_until_permit_drops() {
        let guards = SyncGuards::new();

        let permit = guards.try_acquire(SyncSource::Github);
        assert!(permit.is_some());
        assert!(guards.try_acquire(SyncSource::Github).is_none());
        assert!(guards.is_syncing(SyncSource::Github));

        // The other source is independent.
        assert!(guards.try_acquire(SyncSource::Jira).is_some());

        drop(permit);
        assert!(!guards.is_syncing(SyncSource::Github));
        assert!(guards.try_acquire(SyncSource::Github).is_some());
    }

    #[test]
    fn syncing_map_covers_all_sources() {
        let guards = SyncGuards::new();
        let _permit = guards.try_acquire(SyncSource::Jira).unwrap();

        let map = guards.syncing_map();
        assert_eq!(map.get(&SyncSource::Github), Some(&false));
        assert_eq!(map.get(&SyncSource::Jira), Some(&true));
    }
}
