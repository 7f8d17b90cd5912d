//! Type descriptor flags.
//!
//! Flags are fixed when a type is registered and never recomputed; the
//! proxy generator reads them to validate base types and interface lists
//! without consulting anything else.

use bitflags::bitflags;

bitflags! {
    /// Properties of a registered type relevant to proxy generation.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TypeFlags: u16 {
        /// Cannot be inherited from.
        const SEALED = 1 << 0;
        /// Cannot be instantiated directly.
        const ABSTRACT = 1 << 1;
        /// Generic type definition with unbound parameters (e.g. `IRepo<>`).
        const GENERIC_DEFINITION = 1 << 2;
        /// Constructed from a generic definition with concrete arguments.
        const CONSTRUCTED_GENERIC = 1 << 3;
        /// Registered by the registry itself rather than a caller.
        const RESERVED = 1 << 4;
    }
}

impl TypeFlags {
    /// Check whether the type still has unbound type parameters.
    #[inline]
    pub const fn is_open_generic(self) -> bool {
        self.contains(Self::GENERIC_DEFINITION)
    }

    #[inline]
    pub const fn is_sealed(self) -> bool {
        self.contains(Self::SEALED)
    }
}
