//! Type and member descriptors.
//!
//! `TypeDef` is what the registry stores; `TypeSpec` is the string-based
//! builder callers use to describe a type before it has an id.

use crate::{Name, TypeFlags, TypeId};

/// The kind of a described type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A pure contract; the only kind a proxy can be asked to implement.
    Interface,
    /// A reference type that can serve as a proxy base or target.
    Class,
    /// A value type. Never a valid proxy base.
    Value,
}

impl TypeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeKind::Interface => "interface",
            TypeKind::Class => "class",
            TypeKind::Value => "value type",
        }
    }
}

/// Accessibility of a type's parameterless constructor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CtorAccess {
    Public,
    Protected,
    Internal,
    Private,
    /// No parameterless constructor exists.
    Missing,
}

impl CtorAccess {
    /// Whether a derived type may chain to this constructor.
    #[inline]
    pub fn is_accessible(self) -> bool {
        matches!(
            self,
            CtorAccess::Public | CtorAccess::Protected | CtorAccess::Internal
        )
    }
}

/// The kind of an interface member.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Method,
    Property,
    Event,
}

/// A member declared directly on a type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemberDef {
    /// Member name.
    pub name: Name,

    pub kind: MemberKind,

    /// Rendered signature, e.g. `fn(i32) -> str`. Distinguishes overloads.
    pub signature: Name,
}

/// A registered type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDef {
    pub id: TypeId,

    /// Fully qualified name.
    pub name: Name,

    pub kind: TypeKind,

    pub flags: TypeFlags,

    /// Base class (classes only).
    pub base: Option<TypeId>,

    /// Interfaces this type implements (classes, values) or extends
    /// (interfaces). Direct only; see `TypeRegistry::all_interfaces`.
    pub interfaces: Vec<TypeId>,

    /// Members declared by this type itself.
    pub members: Vec<MemberDef>,

    /// Parameterless constructor accessibility.
    pub default_ctor: CtorAccess,

    /// Concrete type arguments when constructed from a generic definition.
    pub type_args: Vec<TypeId>,
}

impl TypeDef {
    #[inline]
    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }
}

/// Member description before interning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberSpec {
    pub name: String,
    pub kind: MemberKind,
    pub signature: String,
}

/// Builder describing a type to register.
///
/// ```text
/// let foo = registry.define(TypeSpec::interface("Acme.IFoo").method("run", "fn()"))?;
/// let impl_ = registry.define(TypeSpec::class("Acme.Foo").implements([foo]))?;
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeSpec {
    pub name: String,
    pub kind: TypeKind,
    pub flags: TypeFlags,
    pub base: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
    pub members: Vec<MemberSpec>,
    pub default_ctor: CtorAccess,
    pub type_args: Vec<TypeId>,
}

impl TypeSpec {
    fn new(name: impl Into<String>, kind: TypeKind, default_ctor: CtorAccess) -> Self {
        TypeSpec {
            name: name.into(),
            kind,
            flags: TypeFlags::empty(),
            base: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            default_ctor,
            type_args: Vec::new(),
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Interface, CtorAccess::Missing)
    }

    /// A class with a public parameterless constructor.
    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Class, CtorAccess::Public)
    }

    /// Value types are implicitly sealed.
    pub fn value(name: impl Into<String>) -> Self {
        let mut spec = Self::new(name, TypeKind::Value, CtorAccess::Public);
        spec.flags |= TypeFlags::SEALED;
        spec
    }

    /// Interfaces extended by an interface.
    #[must_use]
    pub fn extends(self, interfaces: impl IntoIterator<Item = TypeId>) -> Self {
        self.implements(interfaces)
    }

    /// Interfaces implemented by a class or value type.
    #[must_use]
    pub fn implements(mut self, interfaces: impl IntoIterator<Item = TypeId>) -> Self {
        self.interfaces.extend(interfaces);
        self
    }

    #[must_use]
    pub fn inherits(mut self, base: TypeId) -> Self {
        self.base = Some(base);
        self
    }

    #[must_use]
    pub fn method(self, name: impl Into<String>, signature: impl Into<String>) -> Self {
        self.member(name, MemberKind::Method, signature)
    }

    #[must_use]
    pub fn property(self, name: impl Into<String>, signature: impl Into<String>) -> Self {
        self.member(name, MemberKind::Property, signature)
    }

    #[must_use]
    pub fn event(self, name: impl Into<String>, signature: impl Into<String>) -> Self {
        self.member(name, MemberKind::Event, signature)
    }

    #[must_use]
    pub fn member(
        mut self,
        name: impl Into<String>,
        kind: MemberKind,
        signature: impl Into<String>,
    ) -> Self {
        self.members.push(MemberSpec {
            name: name.into(),
            kind,
            signature: signature.into(),
        });
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: TypeFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[must_use]
    pub fn sealed(self) -> Self {
        self.with_flags(TypeFlags::SEALED)
    }

    #[must_use]
    pub fn generic_definition(self) -> Self {
        self.with_flags(TypeFlags::GENERIC_DEFINITION)
    }

    /// Mark as constructed from a generic definition with these arguments.
    #[must_use]
    pub fn with_type_args(mut self, args: impl IntoIterator<Item = TypeId>) -> Self {
        self.type_args.extend(args);
        self.flags |= TypeFlags::CONSTRUCTED_GENERIC;
        self
    }

    #[must_use]
    pub fn constructor(mut self, access: CtorAccess) -> Self {
        self.default_ctor = access;
        self
    }
}
