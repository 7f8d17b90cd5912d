//! The type-builder capability the generator emits into.
//!
//! The generator decides *what* a proxy type looks like; turning that into
//! executable dispatch code belongs to a backend behind these traits. The
//! in-tree [`LayoutEmitter`](crate::LayoutEmitter) records the decisions
//! as data.

use std::any::Any;
use std::fmt;

use weft_ir::{MemberDef, TypeId};

use crate::error::ProxyError;
use crate::generated::TypeStatics;
use crate::request::ProxyKind;

/// Interceptor chain field present on every proxy.
pub const INTERCEPTORS_FIELD: &str = "__interceptors";
/// Forwarding target field, present when the proxy has a target.
pub const TARGET_FIELD: &str = "__target";
/// Interceptor selector field, present when options carry a selector.
pub const SELECTOR_FIELD: &str = "__selector";
/// Prefix of per-interface mixin fields.
pub const MIXIN_FIELD_PREFIX: &str = "__mixin_";

/// What a field is for. Also identifies the matching constructor argument.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldRole {
    Interceptors,
    Target,
    Selector,
    Mixin { interface: TypeId },
}

/// Handle to a declared field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub name: String,
    /// Declared type, when it is a registered type.
    pub ty: Option<TypeId>,
    pub role: FieldRole,
}

/// Everything fixed before the first field or member is declared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeHeader {
    pub name: String,
    pub kind: ProxyKind,
    pub base: TypeId,
    /// Every interface the type implements, in claim order.
    pub interfaces: Vec<TypeId>,
}

/// How a member's body behaves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Run the interceptor chain. Proceeding calls `proceed_to`'s
    /// implementation, or returns a default when there is none.
    Intercept {
        proceed_to: Option<FieldRef>,
        invocation: String,
    },
    /// Call the same member on a field directly.
    Forward { to: FieldRef },
    /// Return the member's default value.
    Default,
    /// Return the value of a field.
    ReadField { field: FieldRef },
    /// Replace the value of a field.
    WriteField { field: FieldRef },
    /// Present to satisfy the interface; fails when called.
    Unsupported,
    /// Write the proxy's persisted state.
    PersistState,
}

impl Dispatch {
    #[inline]
    pub fn is_intercepted(&self) -> bool {
        matches!(self, Dispatch::Intercept { .. })
    }
}

/// One member implementation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberEmission {
    pub interface: TypeId,
    pub member: MemberDef,
    pub dispatch: Dispatch,
}

/// The generated constructor. Parameters bind to fields in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CtorDecl {
    pub base: TypeId,
    pub params: Vec<FieldRef>,
}

/// Builds one type. Obtained from [`TypeEmitter::begin`].
pub trait TypeBuilder {
    fn declare_field(
        &mut self,
        name: &str,
        ty: Option<TypeId>,
        role: FieldRole,
    ) -> Result<FieldRef, ProxyError>;

    /// Look up a previously declared field.
    fn field(&self, name: &str) -> Option<FieldRef>;

    fn declare_member(&mut self, emission: MemberEmission) -> Result<(), ProxyError>;

    fn define_constructor(&mut self, ctor: CtorDecl) -> Result<(), ProxyError>;

    /// Register the statics the type initializer will populate.
    fn define_type_initializer(&mut self, statics: &TypeStatics) -> Result<(), ProxyError>;

    /// Commit the type. Nothing is visible to the backend's consumers before this.
    fn finalize(self: Box<Self>) -> Result<Box<dyn FinishedType>, ProxyError>;
}

/// A committed type as produced by a backend.
pub trait FinishedType: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Populate static state. The generator calls this exactly once per type.
    fn initialize_statics(&self, statics: &TypeStatics);

    fn as_any(&self) -> &dyn Any;
}

/// Factory for type builders.
pub trait TypeEmitter: fmt::Debug + Send + Sync {
    fn begin(&self, header: TypeHeader) -> Box<dyn TypeBuilder>;
}
