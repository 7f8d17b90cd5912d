use weft_ir::TypeId;

use super::{release_from, ContributorKind, EmitCx};
use crate::builder::FieldRef;
use crate::error::ProxyError;

/// Implements interfaces by calling the wrapped target.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TargetForwarder {
    interfaces: Vec<TypeId>,
}

impl TargetForwarder {
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
        let Some(target) = cx.target.clone() else {
            return Err(ProxyError::backend(
                cx.type_name,
                "target forwarder without a target field",
            ));
        };

        let meta = cx.meta;
        for member in meta.owned_by(ContributorKind::TargetForwarder) {
            cx.forward_or_intercept(member, target.clone())?;
        }
        Ok(Vec::new())
    }
}
