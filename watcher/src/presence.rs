//! Roster snapshot tracking and join-delta computation
//!
//! This module owns the only state the watcher keeps between polls:
//! - The previous poll's set of player names, used to compute which names
//!   are new this cycle.
//! - A per-name timestamp of the last delivered notification, used to gate
//!   repeat notifications behind a cooldown.
//!
//! A name that leaves and later rejoins is a fresh join every time (absence
//! clears it from the snapshot), but the cooldown map still suppresses
//! rapid-fire notifications for the same name.

use std::collections::{HashMap, HashSet};

/// Tracks which player names were present last poll and when each name was
/// last notified. Owned by exactly one poll loop; no internal locking.
#[derive(Debug, Default)]
pub struct PresenceTracker {
    known_names: HashSet<String>,
    last_notified_at: HashMap<String, u64>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingests a new roster snapshot and returns the names that qualify for
    /// notification this cycle, in lexicographic order.
    ///
    /// A name qualifies when it was absent from the previous snapshot and
    /// its cooldown window has elapsed. The known-name snapshot is replaced
    /// with `current` unconditionally, regardless of notification outcome.
    ///
    /// Cooldown timestamps are not written here; the caller commits them
    /// with [`mark_notified`](Self::mark_notified) once delivery succeeds,
    /// so a failed send can fire again on the next qualifying join.
    pub fn update(
        &mut self,
        current: &HashSet<String>,
        now: u64,
        cooldown_secs: u64,
    ) -> Vec<String> {
        let mut joined: Vec<&String> = current.difference(&self.known_names).collect();
        joined.sort();

        let qualifying = joined
            .into_iter()
            .filter(|name| {
                let last = self.last_notified_at.get(name.as_str()).copied().unwrap_or(0);
                now.saturating_sub(last) >= cooldown_secs
            })
            .cloned()
            .collect();

        self.known_names = current.clone();
        qualifying
    }

    /// Records a successfully delivered notification for `name`.
    pub fn mark_notified(&mut self, name: &str, now: u64) {
        let stamp = self.last_notified_at.entry(name.to_string()).or_insert(0);
        // Timestamps never move backwards, even with a skewed clock
        *stamp = (*stamp).max(now);
    }

    /// The name set from the most recent snapshot.
    pub fn known_names(&self) -> &HashSet<String> {
        &self.known_names
    }
}
