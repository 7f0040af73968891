//! Cache-backed unit system and the process-wide default
//!
//! A [`UnitSystem`] pairs one resolver with one expression cache. The
//! process-wide active system lives behind a single swappable container so
//! reconfiguration replaces resolver and cache together; the host's periodic
//! memory-pressure collaborator drives [`UnitSystem::memory_pressure_tick`].

use crate::cache::{ResolvedUnit, UnitCache};
use crate::config::UnitsConfig;
use crate::error::Result;
use crate::unit::{Conversion, UnitInfo};
use crate::UnitResolver;
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::{Arc, RwLock};

static ACTIVE: Lazy<RwLock<Arc<UnitSystem>>> = Lazy::new(|| {
    let system = UnitSystem::new(&UnitsConfig::default_units())
        .expect("embedded default unit configuration must build");
    RwLock::new(Arc::new(system))
});

/// A resolved unit handle. Cheap to clone; the underlying value is shared
/// with the cache entry it came from.
#[derive(Clone)]
pub struct Unit {
    inner: Arc<ResolvedUnit>,
}

impl Unit {
    /// The expression text this unit was resolved from.
    pub fn text(&self) -> &str {
        self.inner.text()
    }

    pub fn info(&self) -> &UnitInfo {
        self.inner.info()
    }

    pub fn commensurable(&self, other: &Unit) -> bool {
        self.info().commensurable(other.info())
    }

    /// The linear map converting values in this unit to `other`. `None`
    /// means the unit is already in base form and yields the identity.
    pub fn conversion_to(&self, other: Option<&Unit>) -> Result<Conversion> {
        match other {
            None => Ok(Conversion::IDENTITY),
            Some(other) => self.info().conversion_to(other.info()),
        }
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.info() == other.info()
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("text", &self.text())
            .field("info", self.info())
            .finish()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

pub struct UnitSystem {
    resolver: UnitResolver,
    cache: UnitCache,
}

impl UnitSystem {
    pub fn new(config: &UnitsConfig) -> Result<Self> {
        let resolver = UnitResolver::new(config)?;
        let cache = UnitCache::new(
            config.sliding_expiration(),
            config.high_memory_pressure_threshold,
            config.high_memory_pressure_clear_percentage,
        );
        Ok(Self { resolver, cache })
    }

    /// Resolve an expression through the cache. This is the normal entry
    /// point; resolve once and reuse the returned handle.
    pub fn unit(&self, text: &str) -> Result<Unit> {
        let inner = self
            .cache
            .lookup_or_resolve(text, |expr| self.resolver.resolve(expr))?;
        Ok(Unit { inner })
    }

    pub fn resolver(&self) -> &UnitResolver {
        &self.resolver
    }

    /// Number of expressions currently cached.
    pub fn cached_units(&self) -> usize {
        self.cache.len()
    }

    /// Run one cache expiration pass.
    pub fn expiration_tick(&self, memory_pressure_percent: u8) {
        self.cache.expiration_tick(memory_pressure_percent);
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// The currently configured process-wide system.
    pub fn current() -> Arc<UnitSystem> {
        match ACTIVE.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Atomically replace the active system. The new system starts with an
    /// empty cache; units resolved against the old system stay valid.
    pub fn configure(config: &UnitsConfig) -> Result<()> {
        let fresh = Arc::new(UnitSystem::new(config)?);
        match ACTIVE.write() {
            Ok(mut guard) => *guard = fresh,
            Err(poisoned) => *poisoned.into_inner() = fresh,
        }
        tracing::debug!("unit system reconfigured");
        Ok(())
    }

    /// Entry point for the host's periodic collaborator. Never fails; the
    /// tick must keep running regardless of what one pass encounters.
    pub fn memory_pressure_tick(memory_pressure_percent: u8) {
        Self::current().expiration_tick(memory_pressure_percent);
    }
}

/// Resolve `text` against the currently configured system.
pub fn unit(text: &str) -> Result<Unit> {
    UnitSystem::current().unit(text)
}

/// Convert `value` from `from` to `to` using the current system.
pub fn convert(value: f64, from: &str, to: &str) -> Result<f64> {
    let system = UnitSystem::current();
    let from = system.unit(from)?;
    let to = system.unit(to)?;
    Ok(from.conversion_to(Some(&to))?.apply(value))
}

/// Replace the process-wide system configuration.
pub fn configure(config: &UnitsConfig) -> Result<()> {
    UnitSystem::configure(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_resolution_goes_through_the_cache() {
        let system = UnitSystem::new(&UnitsConfig::default_units()).unwrap();
        assert_eq!(system.cached_units(), 0);
        let first = system.unit("kg*m/s^2").unwrap();
        let second = system.unit("kg*m/s^2").unwrap();
        assert_eq!(system.cached_units(), 1);
        assert!(Arc::ptr_eq(&first.inner, &second.inner));
    }

    #[test]
    fn distinct_spellings_are_distinct_keys() {
        let system = UnitSystem::new(&UnitsConfig::default_units()).unwrap();
        let bare = system.unit("kg").unwrap();
        let spaced = system.unit(" kg ").unwrap();
        assert_eq!(system.cached_units(), 2);
        assert_eq!(bare, spaced, "spaces are ignorable when resolving");
    }

    #[test]
    fn conversion_to_none_is_the_identity() {
        let system = UnitSystem::new(&UnitsConfig::default_units()).unwrap();
        let unit = system.unit("km").unwrap();
        assert_eq!(unit.conversion_to(None).unwrap(), Conversion::IDENTITY);
    }

    #[test]
    fn the_global_system_is_available() {
        let newton = unit("N").unwrap();
        assert_eq!(newton.text(), "N");
        UnitSystem::memory_pressure_tick(0);
    }

    #[test]
    fn failed_resolutions_stay_out_of_the_cache() {
        let system = UnitSystem::new(&UnitsConfig::default_units()).unwrap();
        assert!(system.unit("zorble").is_err());
        assert_eq!(system.cached_units(), 0);
    }
}
