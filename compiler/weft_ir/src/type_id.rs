//! Registry-allocated type handles.

use std::fmt;

/// Handle to a type described in a [`TypeRegistry`](crate::TypeRegistry).
///
/// Ids are dense indices allocated in registration order, so two ids from
/// the same registry compare in definition order. The first three slots are
/// reserved for well-known types registered by [`TypeRegistry::new`](crate::TypeRegistry::new).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    /// Root class every proxy inherits from unless options name another base.
    pub const OBJECT: TypeId = TypeId(0);

    /// Reserved interface exposing the wrapped target and interceptor chain.
    pub const TARGET_ACCESSOR: TypeId = TypeId(1);

    /// Reserved interface for persisting and rebuilding proxies.
    pub const SERIALIZABLE: TypeId = TypeId(2);

    /// Number of pre-registered ids.
    pub const RESERVED_COUNT: u32 = 3;

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        TypeId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether this id is one of the pre-registered well-known types.
    #[inline]
    pub const fn is_well_known(self) -> bool {
        self.0 < Self::RESERVED_COUNT
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TypeId::OBJECT => write!(f, "TypeId::OBJECT"),
            TypeId::TARGET_ACCESSOR => write!(f, "TypeId::TARGET_ACCESSOR"),
            TypeId::SERIALIZABLE => write!(f, "TypeId::SERIALIZABLE"),
            TypeId(raw) => write!(f, "TypeId({raw})"),
        }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
