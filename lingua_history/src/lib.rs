#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Storage backends for conversation history.
//!
//! - [`MemoryHistoryStore`] keeps everything in process memory
//! - [`SqlHistoryStore`] persists one row per conversation through sea-orm
//!
//! Both expire a conversation once it has been idle longer than the
//! configured TTL; an expired conversation reads as empty.

mod locks;
mod memory;
mod sql;

use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

pub use lingua_core::HistoryStore;
pub use locks::{KeyGuard, KeyedLocks};
pub use memory::MemoryHistoryStore;
pub use sql::SqlHistoryStore;

/// Oldest `updated_at` that is still live, or `None` when nothing expires.
fn expiry_cutoff(ttl: Option<Duration>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let ttl = TimeDelta::from_std(ttl?).ok()?;
    now.checked_sub_signed(ttl)
}

fn is_expired(updated_at: DateTime<Utc>, ttl: Option<Duration>) -> bool {
    expiry_cutoff(ttl, Utc::now()).is_some_and(|cutoff| updated_at < cutoff)
}
