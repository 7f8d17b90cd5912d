//! Registry of described types.
//!
//! The `TypeRegistry` is the proxy generator's view of the host type system:
//! which types exist, what they implement, and which members they declare.
//!
//! # Design
//!
//! - Types stored once in a `Vec<TypeDef>` indexed by `TypeId`
//! - Name → id lookup through the interner, so names resolve in O(1)
//! - Mutable while being populated, then shared immutably behind an `Arc`
//! - Three well-known types are pre-registered at fixed ids

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::def::{CtorAccess, MemberDef, MemberKind, MemberSpec, TypeDef, TypeKind, TypeSpec};
use crate::{Name, StringInterner, TypeFlags, TypeId};

/// Names of the pre-registered types and their members.
pub mod well_known {
    pub const OBJECT: &str = "weft.Object";
    pub const TARGET_ACCESSOR: &str = "weft.IProxyTargetAccessor";
    pub const SERIALIZABLE: &str = "weft.ISerializable";

    /// Returns the wrapped target.
    pub const GET_TARGET: &str = "get_target";
    /// Swaps the wrapped target (only forwarding on target-interface proxies).
    pub const SET_TARGET: &str = "set_target";
    /// Returns the live interceptor chain.
    pub const INTERCEPTORS: &str = "interceptors";
    /// Writes the proxy's persisted state.
    pub const PERSIST_STATE: &str = "persist_state";
}

/// Error when registering a type fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefineError {
    /// A type with this name is already registered.
    DuplicateName(String),
    /// The definition references an id this registry never allocated.
    UnknownReference { name: String, referenced: TypeId },
    /// The definition lists a non-interface among its interfaces.
    NotAnInterface { name: String, referenced: String },
    /// The base is not a class, or the definition is not a class but names a base.
    InvalidBase { name: String },
}

impl fmt::Display for DefineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefineError::DuplicateName(name) => write!(f, "type `{name}` is already registered"),
            DefineError::UnknownReference { name, referenced } => {
                write!(f, "type `{name}` references unknown type {referenced}")
            }
            DefineError::NotAnInterface { name, referenced } => {
                write!(f, "type `{name}` lists `{referenced}` as an interface, but it is not one")
            }
            DefineError::InvalidBase { name } => {
                write!(f, "type `{name}` has an invalid base class")
            }
        }
    }
}

impl std::error::Error for DefineError {}

/// Registry of described types.
#[derive(Debug)]
pub struct TypeRegistry {
    interner: StringInterner,

    /// All registered types, indexed by `TypeId`.
    types: Vec<TypeDef>,

    /// Interned full name → type id.
    by_name: FxHashMap<Name, TypeId>,
}

impl TypeRegistry {
    /// Create a registry with the well-known types pre-registered.
    pub fn new() -> Self {
        let mut registry = TypeRegistry {
            interner: StringInterner::new(),
            types: Vec::with_capacity(64),
            by_name: FxHashMap::default(),
        };

        // Order must match the TypeId constants.
        let reserved = [
            TypeSpec::class(well_known::OBJECT),
            TypeSpec::interface(well_known::TARGET_ACCESSOR)
                .method(well_known::GET_TARGET, "fn() -> object")
                .method(well_known::SET_TARGET, "fn(object)")
                .method(well_known::INTERCEPTORS, "fn() -> [interceptor]"),
            TypeSpec::interface(well_known::SERIALIZABLE)
                .method(well_known::PERSIST_STATE, "fn(state)"),
        ];
        for spec in reserved {
            let id = registry.next_id();
            registry.insert(spec.with_flags(TypeFlags::RESERVED), id);
        }
        debug_assert_eq!(registry.next_id(), TypeId::from_raw(TypeId::RESERVED_COUNT));

        registry
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "registries never approach u32::MAX types"
    )]
    fn next_id(&self) -> TypeId {
        TypeId::from_raw(self.types.len() as u32)
    }

    /// Register a type, returning its id.
    pub fn define(&mut self, spec: TypeSpec) -> Result<TypeId, DefineError> {
        if self.lookup(&spec.name).is_some() {
            return Err(DefineError::DuplicateName(spec.name));
        }

        let unknown = spec
            .interfaces
            .iter()
            .chain(spec.base.iter())
            .chain(spec.type_args.iter())
            .find(|&&id| self.get(id).is_none())
            .copied();
        if let Some(referenced) = unknown {
            return Err(DefineError::UnknownReference {
                name: spec.name,
                referenced,
            });
        }

        if let Some(&bad) = spec.interfaces.iter().find(|&&id| !self.is_interface(id)) {
            return Err(DefineError::NotAnInterface {
                referenced: self.display_name(bad),
                name: spec.name,
            });
        }

        if let Some(base) = spec.base {
            let base_is_class = self.get(base).is_some_and(|def| def.kind == TypeKind::Class);
            if spec.kind != TypeKind::Class || !base_is_class {
                return Err(DefineError::InvalidBase { name: spec.name });
            }
        }

        let id = self.next_id();
        self.insert(spec, id);
        Ok(id)
    }

    fn insert(&mut self, spec: TypeSpec, id: TypeId) {
        let name = self.interner.intern(&spec.name);
        let members = spec
            .members
            .iter()
            .map(|member| self.intern_member(member))
            .collect();

        self.types.push(TypeDef {
            id,
            name,
            kind: spec.kind,
            flags: spec.flags,
            base: spec.base,
            interfaces: spec.interfaces,
            members,
            default_ctor: spec.default_ctor,
            type_args: spec.type_args,
        });
        self.by_name.insert(name, id);
    }

    fn intern_member(&self, member: &MemberSpec) -> MemberDef {
        MemberDef {
            name: self.interner.intern(&member.name),
            kind: member.kind,
            signature: self.interner.intern(&member.signature),
        }
    }

    /// Look up a type definition.
    #[inline]
    pub fn get(&self, id: TypeId) -> Option<&TypeDef> {
        self.types.get(id.index())
    }

    /// Look up a type by its full name.
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        let name = self.interner.get(name)?;
        self.by_name.get(&name).copied()
    }

    /// Resolve an interned name.
    #[inline]
    pub fn resolve(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    /// Full name of a type.
    pub fn name_of(&self, id: TypeId) -> Option<&'static str> {
        self.get(id).map(|def| self.resolve(def.name))
    }

    /// Full name of a type, or its raw id when unregistered. Used in diagnostics.
    pub fn display_name(&self, id: TypeId) -> String {
        self.name_of(id)
            .map_or_else(|| format!("<unknown type {id}>"), str::to_owned)
    }

    /// Simple name: the last `.`-separated segment of the full name.
    pub fn simple_name(&self, id: TypeId) -> Option<&'static str> {
        self.name_of(id)
            .map(|name| name.rsplit('.').next().unwrap_or(name))
    }

    #[inline]
    pub fn is_interface(&self, id: TypeId) -> bool {
        self.get(id).is_some_and(TypeDef::is_interface)
    }

    /// Members a type declares directly.
    pub fn members(&self, id: TypeId) -> &[MemberDef] {
        self.get(id).map_or(&[], |def| def.members.as_slice())
    }

    /// Find a declared member by name and kind.
    pub fn find_member(&self, id: TypeId, name: &str, kind: MemberKind) -> Option<&MemberDef> {
        let name = self.interner.get(name)?;
        self.members(id)
            .iter()
            .find(|member| member.name == name && member.kind == kind)
    }

    /// Every interface `id` implements, transitively, ordered by id.
    ///
    /// For an interface this includes the interface itself and all of its
    /// ancestors. For a class it includes interfaces inherited through the
    /// base-class chain. Unknown ids yield an empty list.
    pub fn all_interfaces(&self, id: TypeId) -> Vec<TypeId> {
        let mut seen = FxHashSet::default();
        let mut stack = Vec::new();

        if let Some(def) = self.get(id) {
            if def.is_interface() {
                stack.push(id);
            } else {
                let mut current = Some(def);
                while let Some(def) = current {
                    stack.extend(def.interfaces.iter().copied());
                    current = def.base.and_then(|base| self.get(base));
                }
            }
        }

        while let Some(next) = stack.pop() {
            if !seen.insert(next) {
                continue;
            }
            if let Some(def) = self.get(next) {
                stack.extend(def.interfaces.iter().copied());
            }
        }

        let mut all: Vec<TypeId> = seen.into_iter().collect();
        all.sort_unstable();
        all
    }

    /// Whether `ty` implements (or is, or extends) `interface`.
    pub fn implements(&self, ty: TypeId, interface: TypeId) -> bool {
        self.all_interfaces(ty).binary_search(&interface).is_ok()
    }

    /// Number of registered types, including the well-known ones.
    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether only the well-known types are registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.len() <= TypeId::RESERVED_COUNT as usize
    }

    /// Accessibility of a type's parameterless constructor.
    pub fn default_ctor(&self, id: TypeId) -> CtorAccess {
        self.get(id).map_or(CtorAccess::Missing, |def| def.default_ctor)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
