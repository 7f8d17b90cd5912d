use weft_ir::{well_known, TypeId};

use super::{release_from, ContributorKind, EmitCx};
use crate::builder::{Dispatch, FieldRef};
use crate::error::ProxyError;

/// Implements the generator's reserved interfaces: the target accessor and,
/// when enabled, serialization support. Its members are never intercepted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecialInterfaceHandler {
    interfaces: Vec<TypeId>,
    allow_change_target: bool,
}

impl SpecialInterfaceHandler {
    pub fn new(allow_change_target: bool) -> Self {
        SpecialInterfaceHandler {
            interfaces: Vec::new(),
            allow_change_target,
        }
    }

    pub(crate) fn add(&mut self, interface: TypeId) {
        if !self.interfaces.contains(&interface) {
            self.interfaces.push(interface);
        }
    }

    pub fn interfaces(&self) -> &[TypeId] {
        &self.interfaces
    }

    #[inline]
    pub fn allows_change_target(&self) -> bool {
        self.allow_change_target
    }

    pub(crate) fn release(&mut self, interface: TypeId) {
        release_from(&mut self.interfaces, interface);
    }

    pub(crate) fn emit(&self, cx: &mut EmitCx<'_>) -> Result<Vec<FieldRef>, ProxyError> {
        let meta = cx.meta;
        for member in meta.owned_by(ContributorKind::SpecialInterfaces) {
            let name = cx.registry.resolve(member.member.name);
            let dispatch = match (member.interface, name) {
                (TypeId::TARGET_ACCESSOR, well_known::GET_TARGET) => cx
                    .target
                    .clone()
                    .map_or(Dispatch::Default, |field| Dispatch::ReadField { field }),
                (TypeId::TARGET_ACCESSOR, well_known::SET_TARGET) => match &cx.target {
                    Some(field) if self.allow_change_target => Dispatch::WriteField {
                        field: field.clone(),
                    },
                    _ => Dispatch::Unsupported,
                },
                (TypeId::TARGET_ACCESSOR, well_known::INTERCEPTORS) => Dispatch::ReadField {
                    field: cx.interceptors.clone(),
                },
                (TypeId::SERIALIZABLE, well_known::PERSIST_STATE) => Dispatch::PersistState,
                _ => Dispatch::Unsupported,
            };
            cx.declare(member, dispatch)?;
        }
        Ok(Vec::new())
    }
}
