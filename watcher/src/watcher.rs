//! Poll loop wiring the query client, presence tracker and notifier
//!
//! One cycle is strictly sequential: fetch info, fetch players, compute the
//! join delta, notify, then sleep until the next tick. Query and delivery
//! failures are logged and confined to their own cycle; nothing is fatal to
//! the loop except Ctrl+C.

use crate::notify::{JoinEvent, Notifier};
use crate::presence::PresenceTracker;
use crate::query::QueryClient;
use log::{info, warn};
use protocol::PlayerRecord;
use std::collections::HashSet;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::{interval, MissedTickBehavior};

/// Values the watcher consumes; how they are loaded is the binary's concern.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub host: String,
    pub port: u16,
    /// Receive timeout applied to each query round trip
    pub timeout: Duration,
    /// Fixed interval between poll cycles
    pub poll_interval: Duration,
    /// Minimum seconds between repeat notifications for the same name
    pub cooldown_secs: u64,
}

/// One server's poll loop: a query client and presence tracker pair plus the
/// notification transport. Independently owned, no shared mutable state.
pub struct Watcher {
    client: QueryClient,
    tracker: PresenceTracker,
    notifier: Box<dyn Notifier>,
    poll_interval: Duration,
    cooldown_secs: u64,
}

impl Watcher {
    pub fn new(config: &WatcherConfig, notifier: Box<dyn Notifier>) -> Self {
        Self {
            client: QueryClient::new(&config.host, config.port, config.timeout),
            tracker: PresenceTracker::new(),
            notifier,
            poll_interval: config.poll_interval,
            cooldown_secs: config.cooldown_secs,
        }
    }

    /// Runs poll cycles at a fixed interval until Ctrl+C.
    pub async fn run(&mut self) {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.poll_once(epoch_secs()).await;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl+C, shutting down");
                    break;
                }
            }
        }
    }

    /// Executes one poll cycle against `now` (seconds since the epoch).
    ///
    /// Any query failure discards the cycle's results entirely; no partial
    /// notification is sent and the presence snapshot is left untouched.
    pub async fn poll_once(&mut self, now: u64) {
        let info = match self.client.fetch_info().await {
            Ok(info) => info,
            Err(e) => {
                warn!("info query failed: {}", e);
                return;
            }
        };

        let players = match self.client.fetch_players().await {
            Ok(players) => players,
            Err(e) => {
                warn!("player query failed: {}", e);
                return;
            }
        };

        let current = roster_names(&players);
        let qualifying = self.tracker.update(&current, now, self.cooldown_secs);

        for name in qualifying {
            let event = JoinEvent::new(&name, &info, &players);
            match self.notifier.notify(&event).await {
                Ok(()) => {
                    info!("notified join of {} on {}", name, info.name);
                    // Committed only on success so a failed send can retry
                    // on the next qualifying join
                    self.tracker.mark_notified(&name, now);
                }
                Err(e) => warn!("notification for {} failed: {}", name, e),
            }
        }
    }
}

/// Extracts the identity set from a roster. Empty names are connection
/// slots still negotiating and never participate in presence tracking.
pub fn roster_names(players: &[PlayerRecord]) -> HashSet<String> {
    players
        .iter()
        .filter(|p| !p.name.is_empty())
        .map(|p| p.name.clone())
        .collect()
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> PlayerRecord {
        PlayerRecord {
            index: 0,
            name: name.to_string(),
            score: 0,
            duration: 1.0,
        }
    }

    #[test]
    fn test_roster_names_drops_empty_slots() {
        let players = vec![record("alpha"), record(""), record("beta")];
        let names = roster_names(&players);

        assert_eq!(names.len(), 2);
        assert!(names.contains("alpha"));
        assert!(names.contains("beta"));
        assert!(!names.contains(""));
    }

    #[test]
    fn test_roster_names_deduplicates() {
        let players = vec![record("alpha"), record("alpha")];
        assert_eq!(roster_names(&players).len(), 1);
    }

    #[test]
    fn test_epoch_secs_is_monotonic_enough() {
        let a = epoch_secs();
        let b = epoch_secs();
        assert!(b >= a);
        assert!(a > 1_600_000_000); // sanity: after Sep 2020
    }
}
