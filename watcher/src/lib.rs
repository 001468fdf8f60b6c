//! # Join Watcher Library
//!
//! Polls one game server over the UDP query protocol, tracks which player
//! names are present from poll to poll, and pushes a notification through a
//! pluggable transport whenever a new name appears.
//!
//! ## Module Organization
//!
//! ### Query Module (`query`)
//! Owns the UDP conversation with the server: fresh socket per request,
//! receive timeout per round trip, and the two-phase challenge handshake
//! for the player list. Encoding and decoding live in the `protocol` crate.
//!
//! ### Presence Module (`presence`)
//! Holds the previous poll's name set and the per-name notification
//! timestamps, computes the join delta for each new snapshot, and applies
//! the cooldown gate.
//!
//! ### Notify Module (`notify`)
//! The notifier boundary: a join event carrying the server snapshot and
//! roster, a rendering helper, and the concrete transports (Telegram, log).
//!
//! ### Watcher Module (`watcher`)
//! The poll loop tying the three together: fetch, diff, notify, sleep.
//! Every failure is logged and confined to its own cycle; the loop runs
//! until the process receives Ctrl+C.
//!
//! One `Watcher` is an independently-owned unit with no shared mutable
//! state, so watching several servers at once is just running several
//! watchers.

pub mod notify;
pub mod presence;
pub mod query;
pub mod watcher;
