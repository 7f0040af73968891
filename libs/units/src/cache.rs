//! Concurrent cache of resolved unit expressions
//!
//! Keys are the verbatim expression text; values carry the resolved
//! [`UnitInfo`] together with its key text behind one `Arc`. Lookups are
//! lock-free; two racing misses may both resolve, and the map's
//! add-if-absent keeps exactly one.
//!
//! Expiration is sliding: every tick clears each entry's touch flag, and an
//! entry whose flag was already clear is dropped once its last-seen stamp
//! ages past the window — so an entry survives as long as it is touched
//! between consecutive ticks, and two idle ticks retire it. High memory
//! pressure additionally sheds the least-recently-seen slice of survivors.

use crate::error::Result;
use crate::unit::UnitInfo;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A resolved unit bound to the expression text it came from.
#[derive(Debug)]
pub struct ResolvedUnit {
    text: Box<str>,
    info: UnitInfo,
}

impl ResolvedUnit {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn info(&self) -> &UnitInfo {
        &self.info
    }
}

struct CacheEntry {
    value: Arc<ResolvedUnit>,
    touched: AtomicBool,
    last_seen: AtomicU64,
}

pub(crate) struct UnitCache {
    entries: DashMap<Box<str>, CacheEntry>,
    epoch: Instant,
    sliding_expiration: Duration,
    pressure_threshold: u8,
    pressure_clear_percentage: u8,
}

impl UnitCache {
    pub fn new(
        sliding_expiration: Duration,
        pressure_threshold: u8,
        pressure_clear_percentage: u8,
    ) -> Self {
        Self {
            entries: DashMap::new(),
            epoch: Instant::now(),
            sliding_expiration,
            pressure_threshold,
            pressure_clear_percentage,
        }
    }

    fn now_millis(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    pub fn lookup_or_resolve<F>(&self, text: &str, resolve: F) -> Result<Arc<ResolvedUnit>>
    where
        F: FnOnce(&str) -> Result<UnitInfo>,
    {
        if let Some(entry) = self.entries.get(text) {
            entry.touched.store(true, Ordering::Release);
            return Ok(Arc::clone(&entry.value));
        }

        let info = resolve(text)?;
        let value = Arc::new(ResolvedUnit {
            text: text.into(),
            info,
        });
        let now = self.now_millis();
        let entry = self
            .entries
            .entry(Box::from(text))
            .or_insert_with(|| CacheEntry {
                value: Arc::clone(&value),
                touched: AtomicBool::new(true),
                last_seen: AtomicU64::new(now),
            });
        Ok(Arc::clone(&entry.value))
    }

    /// One expiration pass, driven by the host's periodic collaborator.
    pub fn expiration_tick(&self, memory_pressure_percent: u8) {
        let now = self.now_millis();
        let horizon = now.saturating_sub(self.sliding_expiration.as_millis() as u64);
        let before = self.entries.len();

        self.entries.retain(|_, entry| {
            if entry.touched.swap(false, Ordering::AcqRel) {
                entry.last_seen.store(now, Ordering::Release);
                true
            } else {
                entry.last_seen.load(Ordering::Acquire) >= horizon
            }
        });

        let expired = before.saturating_sub(self.entries.len());
        if expired > 0 {
            tracing::debug!(
                expired,
                remaining = self.entries.len(),
                "expired idle unit cache entries"
            );
        }

        if memory_pressure_percent >= self.pressure_threshold {
            self.shed_least_recently_seen();
        }
    }

    fn shed_least_recently_seen(&self) {
        let target =
            self.entries.len() * usize::from(self.pressure_clear_percentage) / 100;
        if target == 0 {
            return;
        }
        let mut by_age: Vec<(Box<str>, u64)> = self
            .entries
            .iter()
            .map(|entry| {
                (
                    entry.key().clone(),
                    entry.value().last_seen.load(Ordering::Acquire),
                )
            })
            .collect();
        by_age.sort_by_key(|&(_, seen)| seen);
        for (key, _) in by_age.into_iter().take(target) {
            self.entries.remove(&key);
        }
        tracing::debug!(
            shed = target,
            remaining = self.entries.len(),
            "unit cache shed entries under memory pressure"
        );
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn constant(value: f64) -> UnitInfo {
        UnitInfo::constant(value, 8)
    }

    fn cache(expiration: Duration) -> UnitCache {
        UnitCache::new(expiration, 90, 50)
    }

    #[test]
    fn hit_returns_the_cached_value() {
        let cache = cache(Duration::from_secs(300));
        let first = cache.lookup_or_resolve("2", |_| Ok(constant(2.0))).unwrap();
        let second = cache
            .lookup_or_resolve("2", |_| panic!("must not re-resolve"))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn resolution_failures_are_not_cached() {
        let cache = cache(Duration::from_secs(300));
        let err = cache.lookup_or_resolve("bad", |_| {
            Err(crate::Error::InvalidConfig("nope".into()))
        });
        assert!(err.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn touched_entries_survive_ticks() {
        let cache = cache(Duration::ZERO);
        cache.lookup_or_resolve("2", |_| Ok(constant(2.0))).unwrap();
        for _ in 0..4 {
            thread::sleep(Duration::from_millis(5));
            cache
                .lookup_or_resolve("2", |_| panic!("must not re-resolve"))
                .unwrap();
            cache.expiration_tick(0);
            assert_eq!(cache.len(), 1);
        }
    }

    #[test]
    fn idle_entries_expire_after_two_ticks() {
        let cache = cache(Duration::ZERO);
        cache.lookup_or_resolve("2", |_| Ok(constant(2.0))).unwrap();

        // First tick clears the insertion touch and refreshes last-seen.
        cache.expiration_tick(0);
        assert_eq!(cache.len(), 1);

        thread::sleep(Duration::from_millis(5));
        cache.expiration_tick(0);
        assert!(cache.is_empty());
    }

    #[test]
    fn pressure_sheds_the_configured_percentage() {
        let cache = UnitCache::new(Duration::from_secs(300), 90, 50);
        for i in 0..10 {
            cache
                .lookup_or_resolve(&i.to_string(), |_| Ok(constant(f64::from(i))))
                .unwrap();
        }
        cache.expiration_tick(89);
        assert_eq!(cache.len(), 10, "below the threshold nothing is shed");
        cache.expiration_tick(90);
        assert_eq!(cache.len(), 5);
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = cache(Duration::from_secs(300));
        cache.lookup_or_resolve("2", |_| Ok(constant(2.0))).unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn racing_misses_converge_on_one_entry() {
        let cache = Arc::new(cache(Duration::from_secs(300)));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    cache
                        .lookup_or_resolve("kg*m/s^2", |_| Ok(constant(1.0)))
                        .unwrap()
                })
            })
            .collect();
        let values: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(cache.len(), 1);
        for value in &values {
            assert!(Arc::ptr_eq(value, &values[0]));
        }
    }
}
