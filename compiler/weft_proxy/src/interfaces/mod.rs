//! Interface set normalization.
//!
//! Callers list interfaces however they like: with duplicates, in any order,
//! without their ancestors. Everything downstream (cache keys, resolution,
//! the emitted type header) works on an [`InterfaceSet`] instead, which is
//! closed under inheritance, deduplicated, and ordered by `TypeId`.

use std::fmt;

use smallvec::SmallVec;
use weft_ir::{TypeId, TypeRegistry};

use crate::error::{InterfaceKindDefect, ProxyError};

/// Deduplicated interface list, closed under "extends", ordered by id.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct InterfaceSet {
    ids: SmallVec<[TypeId; 8]>,
}

impl InterfaceSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_unsorted(mut ids: SmallVec<[TypeId; 8]>) -> Self {
        ids.sort_unstable();
        ids.dedup();
        InterfaceSet { ids }
    }

    #[inline]
    pub fn contains(&self, id: TypeId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    #[inline]
    pub fn as_slice(&self) -> &[TypeId] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.ids.iter().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Union of two sets. Both inputs are closed, so the result is too.
    #[must_use]
    pub fn union(&self, other: &InterfaceSet) -> InterfaceSet {
        let mut ids = self.ids.clone();
        ids.extend(other.iter());
        Self::from_unsorted(ids)
    }
}

impl fmt::Debug for InterfaceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.ids.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a InterfaceSet {
    type Item = TypeId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, TypeId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter().copied()
    }
}

/// Check that `id` is a concrete (non-generic-definition) interface.
pub fn check_interface(registry: &TypeRegistry, id: TypeId) -> Result<(), ProxyError> {
    let defect = match registry.get(id) {
        None => Some(InterfaceKindDefect::Unknown),
        Some(def) if !def.is_interface() => Some(InterfaceKindDefect::NotAnInterface(def.kind)),
        Some(def) if def.flags.is_open_generic() => Some(InterfaceKindDefect::OpenGeneric),
        Some(_) => None,
    };

    match defect {
        None => Ok(()),
        Some(reason) => Err(ProxyError::InvalidInterfaceKind {
            ty: id,
            name: registry.display_name(id),
            reason,
        }),
    }
}

/// Expand `interfaces` to their full ancestor closure.
///
/// Fails on the first entry that is unknown, not an interface, or an open
/// generic definition. Nothing is partially returned.
pub fn normalize(registry: &TypeRegistry, interfaces: &[TypeId]) -> Result<InterfaceSet, ProxyError> {
    let mut ids = SmallVec::new();
    for &id in interfaces {
        check_interface(registry, id)?;
        ids.extend(registry.all_interfaces(id));
    }
    Ok(InterfaceSet::from_unsorted(ids))
}

/// Every interface a target type implements, transitively.
///
/// The target is validated separately; unknown ids yield an empty set.
pub fn target_interfaces(registry: &TypeRegistry, target: TypeId) -> InterfaceSet {
    InterfaceSet::from_unsorted(registry.all_interfaces(target).into_iter().collect())
}
