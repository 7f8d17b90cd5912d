//! Generated-type cache.
//!
//! At most one type is ever synthesized per [`CacheKey`]. Lookups take a
//! shared lock, so warm-cache readers never block each other. A miss takes
//! the upgradable read lock, which admits plain readers but excludes other
//! upgraders, re-checks, synthesizes, and upgrades to exclusive in place
//! (no release and reacquire) for the insert.
//!
//! Entries are never evicted. Each distinct key holds its type for the life
//! of the owning [`ModuleScope`](crate::ModuleScope).

use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use rustc_hash::FxHashMap;
use weft_ir::TypeId;

use crate::error::ProxyError;
use crate::interfaces::InterfaceSet;
use crate::options::OptionsFingerprint;
use crate::request::ProxyKind;

/// Structural identity of a proxy request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: ProxyKind,
    pub target: Option<TypeId>,
    pub primary: Option<TypeId>,
    pub interfaces: InterfaceSet,
    pub options: OptionsFingerprint,
}

/// Monotonic map from [`CacheKey`] to a synthesized value.
#[derive(Debug)]
pub struct TypeCache<V> {
    entries: RwLock<FxHashMap<CacheKey, V>>,
}

impl<V: Clone> TypeCache<V> {
    pub fn new() -> Self {
        TypeCache {
            entries: RwLock::new(FxHashMap::default()),
        }
    }

    /// Shared-lock lookup.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        self.entries.read().get(key).cloned()
    }

    /// Return the cached value for `key`, synthesizing it on a miss.
    ///
    /// Concurrent callers with equal keys observe exactly one call to
    /// `synthesize`; the others receive its result. A failed synthesis
    /// caches nothing.
    pub fn get_or_try_insert_with<F>(&self, key: CacheKey, synthesize: F) -> Result<V, ProxyError>
    where
        F: FnOnce(&CacheKey) -> Result<V, ProxyError>,
    {
        if let Some(hit) = self.get(&key) {
            tracing::debug!(kind = %key.kind, target = ?key.target, "proxy type cache hit");
            return Ok(hit);
        }

        let guard = self.entries.upgradable_read();

        // Another upgrader may have inserted between our read and now.
        if let Some(hit) = guard.get(&key) {
            tracing::debug!(kind = %key.kind, target = ?key.target, "proxy type cache hit after contention");
            return Ok(hit.clone());
        }

        tracing::debug!(kind = %key.kind, target = ?key.target, "proxy type cache miss");
        let value = synthesize(&key)?;

        let mut guard = RwLockUpgradableReadGuard::upgrade(guard);
        guard.insert(key, value.clone());
        Ok(value)
    }

    /// Number of cached types.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop every entry. Intended for test-harness teardown only; types
    /// already handed out stay valid.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl<V: Clone> Default for TypeCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
