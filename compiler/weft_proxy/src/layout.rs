//! Reference backend that records a type's layout as data.
//!
//! `LayoutEmitter` produces no executable code. It checks the generator's
//! output for structural mistakes and keeps the result inspectable, which is
//! what tests and tooling need.

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};

use weft_ir::TypeId;

use crate::builder::{
    CtorDecl, Dispatch, FieldRef, FieldRole, FinishedType, MemberEmission, TypeBuilder,
    TypeEmitter, TypeHeader,
};
use crate::error::ProxyError;
use crate::generated::{GeneratedType, TypeStatics};
use crate::request::ProxyKind;

/// Emits [`TypeLayout`]s.
#[derive(Copy, Clone, Debug, Default)]
pub struct LayoutEmitter;

impl LayoutEmitter {
    pub fn new() -> Self {
        LayoutEmitter
    }
}

impl TypeEmitter for LayoutEmitter {
    fn begin(&self, header: TypeHeader) -> Box<dyn TypeBuilder> {
        Box::new(LayoutBuilder::new(header))
    }
}

/// A type under construction.
#[derive(Debug)]
pub struct LayoutBuilder {
    header: TypeHeader,
    fields: Vec<FieldRef>,
    members: Vec<MemberEmission>,
    constructor: Option<CtorDecl>,
    statics: Option<TypeStatics>,
}

impl LayoutBuilder {
    pub fn new(header: TypeHeader) -> Self {
        LayoutBuilder {
            header,
            fields: Vec::new(),
            members: Vec::new(),
            constructor: None,
            statics: None,
        }
    }

    fn reject(&self, message: impl Into<String>) -> ProxyError {
        ProxyError::backend(&self.header.name, message)
    }
}

impl TypeBuilder for LayoutBuilder {
    fn declare_field(
        &mut self,
        name: &str,
        ty: Option<TypeId>,
        role: FieldRole,
    ) -> Result<FieldRef, ProxyError> {
        if self.fields.iter().any(|f| f.name == name) {
            return Err(self.reject(format!("field `{name}` declared twice")));
        }
        let field = FieldRef {
            name: name.to_owned(),
            ty,
            role,
        };
        self.fields.push(field.clone());
        Ok(field)
    }

    fn field(&self, name: &str) -> Option<FieldRef> {
        self.fields.iter().find(|f| f.name == name).cloned()
    }

    fn declare_member(&mut self, emission: MemberEmission) -> Result<(), ProxyError> {
        if !self.header.interfaces.contains(&emission.interface) {
            return Err(self.reject(format!(
                "member of interface {} which the type does not implement",
                emission.interface
            )));
        }
        if self
            .members
            .iter()
            .any(|m| m.interface == emission.interface && m.member == emission.member)
        {
            return Err(self.reject(format!(
                "member of interface {} emitted twice",
                emission.interface
            )));
        }
        if let Dispatch::Intercept { invocation, .. } = &emission.dispatch {
            let reused = self.members.iter().any(|m| match &m.dispatch {
                Dispatch::Intercept { invocation: other, .. } => other == invocation,
                _ => false,
            });
            if reused {
                return Err(self.reject(format!("invocation `{invocation}` declared twice")));
            }
        }
        let field = match &emission.dispatch {
            Dispatch::Intercept { proceed_to, .. } => proceed_to.as_ref(),
            Dispatch::Forward { to } => Some(to),
            Dispatch::ReadField { field } | Dispatch::WriteField { field } => Some(field),
            _ => None,
        };
        if let Some(field) = field {
            if !self.fields.contains(field) {
                return Err(self.reject(format!("dispatch to undeclared field `{}`", field.name)));
            }
        }
        self.members.push(emission);
        Ok(())
    }

    fn define_constructor(&mut self, ctor: CtorDecl) -> Result<(), ProxyError> {
        if self.constructor.is_some() {
            return Err(self.reject("constructor defined twice"));
        }
        if let Some(param) = ctor.params.iter().find(|p| !self.fields.contains(p)) {
            return Err(self.reject(format!(
                "constructor parameter binds undeclared field `{}`",
                param.name
            )));
        }
        self.constructor = Some(ctor);
        Ok(())
    }

    fn define_type_initializer(&mut self, statics: &TypeStatics) -> Result<(), ProxyError> {
        self.statics = Some(statics.clone());
        Ok(())
    }

    fn finalize(self: Box<Self>) -> Result<Box<dyn FinishedType>, ProxyError> {
        let Some(constructor) = self.constructor.clone() else {
            return Err(self.reject("no constructor defined"));
        };
        let LayoutBuilder {
            header,
            fields,
            members,
            statics,
            ..
        } = *self;
        Ok(Box::new(TypeLayout {
            header,
            fields,
            members,
            constructor,
            statics,
            initializations: AtomicUsize::new(0),
        }))
    }
}

/// A finished type as recorded by [`LayoutEmitter`].
#[derive(Debug)]
pub struct TypeLayout {
    header: TypeHeader,
    fields: Vec<FieldRef>,
    members: Vec<MemberEmission>,
    constructor: CtorDecl,
    statics: Option<TypeStatics>,
    initializations: AtomicUsize,
}

impl TypeLayout {
    /// The layout behind a generated type, if it was built by [`LayoutEmitter`].
    pub fn of(generated: &GeneratedType) -> Option<&TypeLayout> {
        generated.finished().as_any().downcast_ref()
    }

    pub fn kind(&self) -> ProxyKind {
        self.header.kind
    }

    pub fn base(&self) -> TypeId {
        self.header.base
    }

    pub fn interfaces(&self) -> &[TypeId] {
        &self.header.interfaces
    }

    pub fn fields(&self) -> &[FieldRef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldRef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn members(&self) -> &[MemberEmission] {
        &self.members
    }

    pub fn members_of(&self, interface: TypeId) -> impl Iterator<Item = &MemberEmission> {
        self.members.iter().filter(move |m| m.interface == interface)
    }

    pub fn constructor(&self) -> &CtorDecl {
        &self.constructor
    }

    pub fn statics(&self) -> Option<&TypeStatics> {
        self.statics.as_ref()
    }

    /// How many times the statics initializer has run.
    pub fn initialization_count(&self) -> usize {
        self.initializations.load(Ordering::Acquire)
    }
}

impl FinishedType for TypeLayout {
    fn name(&self) -> &str {
        &self.header.name
    }

    fn initialize_statics(&self, _statics: &TypeStatics) {
        self.initializations.fetch_add(1, Ordering::AcqRel);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
