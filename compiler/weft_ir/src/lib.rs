//! Type descriptors for the weft proxy generator.
//!
//! The generator never inspects real Rust types. Instead, callers describe
//! the host type system in a [`TypeRegistry`]: interfaces with their members
//! and ancestors, classes with their base chain and constructor
//! accessibility. Everything the generator decides is derived from here.
//!
//! # Identity
//!
//! - `TypeId`: dense registry index, `Copy`, `Ord`, `Hash`
//! - `Name`: interned string for type and member names
//!
//! Three well-known types are registered by [`TypeRegistry::new`] at fixed
//! ids (`TypeId::OBJECT`, `TypeId::TARGET_ACCESSOR`, `TypeId::SERIALIZABLE`).

mod def;
mod flags;
mod interner;
mod name;
mod registry;
mod type_id;

pub use def::{CtorAccess, MemberDef, MemberKind, MemberSpec, TypeDef, TypeKind, TypeSpec};
pub use flags::TypeFlags;
pub use interner::{InternError, StringInterner};
pub use name::Name;
pub use registry::{well_known, DefineError, TypeRegistry};
pub use type_id::TypeId;
