//! Stored value plus its expiration deadline

use std::time::Duration;
use tokio::time::Instant;

/// A value held by the [`Store`](crate::Store) together with its TTL metadata.
///
/// Liveness is evaluated at the moment of access: an entry is live iff it has
/// no deadline or the current instant is strictly before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    value: String,
    deadline: Option<Instant>,
}

impl Entry {
    /// Create an entry that expires `ttl_seconds` after `now`.
    ///
    /// A TTL of zero or below means the entry never expires. A deadline too far
    /// in the future to be represented is treated the same way.
    pub fn new(value: String, ttl_seconds: i64, now: Instant) -> Self {
        let deadline = if ttl_seconds > 0 {
            now.checked_add(Duration::from_secs(ttl_seconds as u64))
        } else {
            None
        };

        Self { value, deadline }
    }

    /// The stored payload
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether the entry is still live at `now`
    pub fn is_live_at(&self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) => now < deadline,
            None => true,
        }
    }

    /// Whether the entry has expired at `now`
    pub fn is_expired_at(&self, now: Instant) -> bool {
        !self.is_live_at(now)
    }
}
