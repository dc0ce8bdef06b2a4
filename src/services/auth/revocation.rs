//! Revocation registry for access tokens that must die before their natural expiry
//! (logout, explicit invalidation).
//!
//! Entries are keyed by the SHA-256 digest of the raw token, so the registry never holds a
//! usable bearer credential. Each entry remembers the token's own `exp`; once that instant
//! has passed the codec rejects the token anyway and the entry can be dropped.
//!
//! Compaction policy:
//! - a background task calls `compact()` on a fixed cadence (see `spawn_compaction`);
//! - `revoke()` compacts inline when the registry reaches a high-water mark, then re-arms
//!   the mark at twice the surviving size. Sustained revoke traffic therefore cannot grow
//!   memory without bound between background sweeps, while the scan cost stays amortised
//!   O(1) per `revoke`.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tokio::task::JoinHandle;
use tokio::time;

use crate::services::auth::clock::Clock;

/// Lowest high-water mark; below this size `revoke` never compacts inline.
pub const MIN_COMPACTION_THRESHOLD: usize = 1024;

/// Default cadence of the background sweep.
pub const DEFAULT_COMPACTION_INTERVAL: Duration = Duration::from_secs(60);

/// Derived identifier of a revoked token (hex SHA-256 of the encoded token).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenId(String);

impl TokenId {
    pub fn of(token: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short prefix is enough for log correlation.
        write!(f, "{}", &self.0[..12.min(self.0.len())])
    }
}

pub struct RevocationRegistry {
    entries: DashMap<TokenId, DateTime<Utc>>,
    clock: Arc<dyn Clock>,
    compact_at: AtomicUsize,
}

impl fmt::Debug for RevocationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevocationRegistry")
            .field("len", &self.entries.len())
            .field("compact_at", &self.compact_at.load(Ordering::Relaxed))
            .finish()
    }
}

impl RevocationRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
            compact_at: AtomicUsize::new(MIN_COMPACTION_THRESHOLD),
        }
    }

    /// Marks `token` as revoked until `expires_at`.
    ///
    /// Idempotent: returns `true` only for the call that actually inserted the entry.
    /// Once this returns, every `is_revoked(token)` that starts afterwards sees it.
    pub fn revoke(&self, token: &str, expires_at: DateTime<Utc>) -> bool {
        let id = TokenId::of(token);
        tracing::debug!(id = %id, %expires_at, "revoking token");
        let mut inserted = false;
        self.entries.entry(id).or_insert_with(|| {
            inserted = true;
            expires_at
        });

        if inserted && self.entries.len() >= self.compact_at.load(Ordering::Relaxed) {
            self.compact();
        }

        inserted
    }

    pub fn is_revoked(&self, token: &str) -> bool {
        self.entries.contains_key(&TokenId::of(token))
    }

    /// Drops every entry whose token has already expired. Entries for tokens that are
    /// still alive are never touched.
    ///
    /// Returns the number of removed entries.
    pub fn compact(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0usize;
        self.entries.retain(|_, expires_at| {
            let keep = *expires_at > now;
            if !keep {
                removed += 1;
            }
            keep
        });

        let next = (self.entries.len() * 2).max(MIN_COMPACTION_THRESHOLD);
        self.compact_at.store(next, Ordering::Relaxed);

        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Spawns the periodic sweep. Call once at startup.
pub fn spawn_compaction(registry: Arc<RevocationRegistry>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval(every);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let removed = registry.compact();
            if removed > 0 {
                tracing::debug!(
                    removed,
                    remaining = registry.len(),
                    "compacted revocation registry"
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::clock::ManualClock;
    use chrono::Duration as ChronoDuration;

    fn registry() -> (Arc<RevocationRegistry>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at_epoch_2024());
        (Arc::new(RevocationRegistry::new(clock.clone())), clock)
    }

    #[test]
    fn test_revoke_then_is_revoked() {
        let (reg, clock) = registry();
        let exp = clock.now() + ChronoDuration::hours(1);

        assert!(!reg.is_revoked("tok-a"));
        assert!(reg.revoke("tok-a", exp));
        assert!(reg.is_revoked("tok-a"));
        assert!(!reg.is_revoked("tok-b"));
    }

    #[test]
    fn test_revoke_is_idempotent() {
        let (reg, clock) = registry();
        let exp = clock.now() + ChronoDuration::hours(1);

        assert!(reg.revoke("tok-a", exp));
        assert!(!reg.revoke("tok-a", exp));
        assert_eq!(reg.len(), 1);
        assert!(reg.is_revoked("tok-a"));
    }

    #[test]
    fn test_compact_keeps_live_entries() {
        let (reg, clock) = registry();
        let now = clock.now();
        reg.revoke("short", now + ChronoDuration::minutes(5));
        reg.revoke("long", now + ChronoDuration::hours(1));

        assert_eq!(reg.compact(), 0);
        assert_eq!(reg.len(), 2);

        clock.advance(ChronoDuration::minutes(5) - ChronoDuration::milliseconds(1));
        assert_eq!(reg.compact(), 0);
        assert!(reg.is_revoked("short"));

        clock.advance(ChronoDuration::milliseconds(1));
        assert_eq!(reg.compact(), 1);
        assert!(!reg.is_revoked("short"));
        assert!(reg.is_revoked("long"));
    }

    #[test]
    fn test_memory_stays_bounded_under_sustained_revokes() {
        let (reg, clock) = registry();

        // Every token lives one minute; one token is revoked per simulated second.
        for i in 0..20_000 {
            let exp = clock.now() + ChronoDuration::minutes(1);
            reg.revoke(&format!("tok-{i}"), exp);
            clock.advance(ChronoDuration::seconds(1));
            assert!(reg.len() <= MIN_COMPACTION_THRESHOLD * 2, "len {}", reg.len());
        }
    }

    #[test]
    fn test_inline_compaction_never_drops_live_entries() {
        let (reg, clock) = registry();
        let exp = clock.now() + ChronoDuration::hours(1);

        for i in 0..(MIN_COMPACTION_THRESHOLD * 3) {
            reg.revoke(&format!("tok-{i}"), exp);
        }

        assert_eq!(reg.len(), MIN_COMPACTION_THRESHOLD * 3);
        for i in 0..(MIN_COMPACTION_THRESHOLD * 3) {
            assert!(reg.is_revoked(&format!("tok-{i}")));
        }
    }

    #[test]
    fn test_concurrent_revoke_is_visible_after_return() {
        let (reg, clock) = registry();
        let exp = clock.now() + ChronoDuration::hours(1);

        std::thread::scope(|s| {
            for t in 0..8 {
                let reg = &reg;
                s.spawn(move || {
                    for i in 0..500 {
                        let token = format!("tok-{t}-{i}");
                        reg.revoke(&token, exp);
                        assert!(reg.is_revoked(&token));
                        // Other threads race on the same key; still one entry per token.
                        reg.revoke(&format!("shared-{i}"), exp);
                    }
                });
            }
        });

        assert_eq!(reg.len(), 8 * 500 + 500);
    }

    #[test]
    fn test_token_id_is_a_digest_not_the_token() {
        let id = TokenId::of("eyJhbGciOi.payload.sig");
        assert_eq!(id.as_str().len(), 64);
        assert!(!id.as_str().contains("payload"));
        assert_eq!(id, TokenId::of("eyJhbGciOi.payload.sig"));
        assert_eq!(id.to_string().len(), 12);
        assert!(id.as_str().starts_with(&id.to_string()));
    }

    #[tokio::test]
    async fn test_background_compaction_sweeps_expired_entries() {
        let (reg, clock) = registry();
        reg.revoke("tok-a", clock.now() + ChronoDuration::seconds(30));
        reg.revoke("tok-b", clock.now() + ChronoDuration::hours(2));

        let handle = spawn_compaction(reg.clone(), Duration::from_millis(10));
        clock.advance(ChronoDuration::minutes(1));
        time::sleep(Duration::from_millis(50)).await;

        assert!(!reg.is_revoked("tok-a"));
        assert!(reg.is_revoked("tok-b"));
        handle.abort();
    }
}
