//! Process-scoped generator state.

use std::sync::Arc;

use crate::cache::TypeCache;
use crate::generated::GeneratedType;
use crate::naming::NamingScope;

/// Namespace generated type names are placed in unless configured otherwise.
pub const DEFAULT_NAMESPACE: &str = "Proxies";

/// Owns the type cache and the naming scope.
///
/// Share one `ModuleScope` between every generator that should reuse the
/// same generated types. It lives as long as its last `Arc`; its cache only
/// grows.
#[derive(Debug)]
pub struct ModuleScope {
    namespace: String,
    cache: TypeCache<Arc<GeneratedType>>,
    naming: NamingScope,
}

impl ModuleScope {
    pub fn new() -> Self {
        Self::with_namespace(DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        ModuleScope {
            namespace: namespace.into(),
            cache: TypeCache::new(),
            naming: NamingScope::new(),
        }
    }

    #[inline]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[inline]
    pub fn cache(&self) -> &TypeCache<Arc<GeneratedType>> {
        &self.cache
    }

    #[inline]
    pub fn naming(&self) -> &NamingScope {
        &self.naming
    }

    /// Number of distinct types generated so far.
    pub fn generated_count(&self) -> usize {
        self.cache.len()
    }
}

impl Default for ModuleScope {
    fn default() -> Self {
        Self::new()
    }
}
