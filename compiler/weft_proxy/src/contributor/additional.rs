use weft_ir::TypeId;

use super::{release_from, ContributorKind, EmitCx};
use crate::builder::{Dispatch, FieldRef};
use crate::error::ProxyError;

/// Implements interfaces nothing else provides.
///
/// Intercepted members run the chain with nothing to proceed to; the rest
/// return default values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdditionalInterfaceHandler {
    interfaces: Vec<TypeId>,
}

impl AdditionalInterfaceHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, interface: TypeId) {
        if !self.interfaces.contains(&interface) {
            self.interfaces.push(interface);
        }
    }

    pub fn interfaces(&self) -> &[TypeId] {
        &self.interfaces
    }

    pub(crate) fn release(&mut self, interface: TypeId) {
        release_from(&mut self.interfaces, interface);
    }

    pub(crate) fn emit(&self, cx: &mut EmitCx<'_>) -> Result<Vec<FieldRef>, ProxyError> {
        let meta = cx.meta;
        for member in meta.owned_by(ContributorKind::AdditionalInterfaces) {
            let dispatch = if member.intercept {
                cx.intercept(member, None)
            } else {
                Dispatch::Default
            };
            cx.declare(member, dispatch)?;
        }
        Ok(Vec::new())
    }
}
