//! Errors raised while generating a proxy type.
//!
//! Every error is detected before the type builder commits anything, so
//! there is never a half-built type to clean up.

use std::fmt;

use thiserror::Error;
use weft_ir::{TypeId, TypeKind};

use crate::contributor::ContributorKind;

/// Why a type cannot serve as the base class of a proxy.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BaseTypeDefect {
    /// The id is not registered.
    Missing,
    /// Interfaces and value types cannot be inherited from.
    NotAClass(TypeKind),
    Sealed,
    /// No parameterless constructor, or only a private one.
    NoAccessibleConstructor,
}

impl fmt::Display for BaseTypeDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseTypeDefect::Missing => f.write_str("it is not registered"),
            BaseTypeDefect::NotAClass(kind) => {
                write!(f, "it is not a class type (it is a {})", kind.as_str())
            }
            BaseTypeDefect::Sealed => f.write_str("it is sealed"),
            BaseTypeDefect::NoAccessibleConstructor => {
                f.write_str("it does not have an accessible parameterless constructor")
            }
        }
    }
}

/// Why a type cannot be proxied as an interface.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InterfaceKindDefect {
    /// The id is not registered.
    Unknown,
    NotAnInterface(TypeKind),
    /// Generic definition with unbound type parameters.
    OpenGeneric,
}

impl fmt::Display for InterfaceKindDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterfaceKindDefect::Unknown => f.write_str("it is not registered"),
            InterfaceKindDefect::NotAnInterface(kind) => {
                write!(f, "it is a {}, not an interface", kind.as_str())
            }
            InterfaceKindDefect::OpenGeneric => f.write_str(
                "it is a generic type definition; supply concrete type arguments first",
            ),
        }
    }
}

/// Why a type cannot be the forwarding target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetDefect {
    Unknown,
    OpenGeneric,
    /// Target proxies forward to concrete types; use a target-interface proxy instead.
    NotConcrete,
    /// Target-interface proxies forward to an interface.
    NotAnInterface(TypeKind),
    /// The target does not implement the primary interface.
    DoesNotImplement { interface: String },
}

impl fmt::Display for TargetDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetDefect::Unknown => f.write_str("it is not registered"),
            TargetDefect::OpenGeneric => f.write_str("it is a generic type definition"),
            TargetDefect::NotConcrete => f.write_str("it is an interface, not a concrete type"),
            TargetDefect::NotAnInterface(kind) => {
                write!(f, "it is a {}, not an interface", kind.as_str())
            }
            TargetDefect::DoesNotImplement { interface } => {
                write!(f, "it does not implement `{interface}`")
            }
        }
    }
}

/// The part of the generation options that broke comparability.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OptionsComponent {
    Hook,
    Selector,
}

impl fmt::Display for OptionsComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionsComponent::Hook => f.write_str("generation hook"),
            OptionsComponent::Selector => f.write_str("interceptor selector"),
        }
    }
}

/// Errors raised while generating a proxy type.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ProxyError {
    #[error(
        "type `{name}` is not a valid base type for an interface proxy, because {reason}. \
         Only a non-sealed class with a non-private parameterless constructor can be used"
    )]
    InvalidBaseType {
        ty: TypeId,
        name: String,
        reason: BaseTypeDefect,
    },

    #[error("`{name}` cannot be proxied: {reason}")]
    InvalidInterfaceKind {
        ty: TypeId,
        name: String,
        reason: InterfaceKindDefect,
    },

    #[error("`{name}` cannot be a proxy target: {reason}")]
    InvalidTargetType {
        ty: TypeId,
        name: String,
        reason: TargetDefect,
    },

    #[error(
        "generation options are not comparable: the {component} has no structural identity, \
         so generated types could never be reused from the cache"
    )]
    OptionsNotComparable { component: OptionsComponent },

    #[error(
        "interface `{name}` is reserved by the proxy generator, but the {existing} already \
         claims it and the special-interface policy rejected the conflict"
    )]
    AmbiguousSpecialInterface {
        interface: TypeId,
        name: String,
        existing: ContributorKind,
    },

    #[error("mixins `{first}` and `{second}` both implement `{name}`")]
    DuplicateMixinInterface {
        interface: TypeId,
        name: String,
        first: String,
        second: String,
    },

    #[error("mixin provider {0} is not registered")]
    UnknownMixin(TypeId),

    #[error("no type named `{0}` is registered")]
    UnknownTypeName(String),

    #[error("no {kind} is registered under identity `{identity}`")]
    UnresolvedComponent {
        kind: OptionsComponent,
        identity: String,
    },

    #[error("persisted proxy state is malformed: {0}")]
    MalformedState(&'static str),

    #[error("type builder rejected `{type_name}`: {message}")]
    Backend { type_name: String, message: String },
}

impl ProxyError {
    pub(crate) fn backend(type_name: &str, message: impl Into<String>) -> Self {
        ProxyError::Backend {
            type_name: type_name.to_owned(),
            message: message.into(),
        }
    }
}
