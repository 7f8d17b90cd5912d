use rustc_hash::FxHashMap;
use weft_ir::TypeId;

use super::{release_from, ContributorKind, EmitCx};
use crate::builder::{FieldRef, FieldRole, MIXIN_FIELD_PREFIX};
use crate::error::ProxyError;

/// One mixin interface and the provider instance that backs it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MixinSlot {
    pub interface: TypeId,
    pub provider: TypeId,
    /// Another contributor implements the interface. The slot still gets a
    /// field and constructor parameter but no members.
    pub empty: bool,
}

/// Implements interfaces by calling mixin instances, one field per slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MixinProvider {
    slots: Vec<MixinSlot>,
    interfaces: Vec<TypeId>,
}

impl MixinProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a slot that implements `interface`.
    pub(crate) fn add(&mut self, interface: TypeId, provider: TypeId) {
        self.slots.push(MixinSlot {
            interface,
            provider,
            empty: false,
        });
        self.interfaces.push(interface);
    }

    /// Add a pass-through slot for an interface owned elsewhere.
    pub(crate) fn add_empty(&mut self, interface: TypeId, provider: TypeId) {
        self.slots.push(MixinSlot {
            interface,
            provider,
            empty: true,
        });
    }

    /// Slots in mixin declaration order.
    pub fn slots(&self) -> &[MixinSlot] {
        &self.slots
    }

    pub fn interfaces(&self) -> &[TypeId] {
        &self.interfaces
    }

    pub(crate) fn release(&mut self, interface: TypeId) {
        release_from(&mut self.interfaces, interface);
        for slot in self.slots.iter_mut().filter(|s| s.interface == interface) {
            slot.empty = true;
        }
    }

    pub(crate) fn emit(&self, cx: &mut EmitCx<'_>) -> Result<Vec<FieldRef>, ProxyError> {
        let mut fields = Vec::with_capacity(self.slots.len());
        let mut by_interface = FxHashMap::default();

        for slot in &self.slots {
            let simple = cx.registry.simple_name(slot.interface).unwrap_or("Mixin");
            let name = cx.naming.unique_name(&format!("{MIXIN_FIELD_PREFIX}{simple}"));
            let field = cx.builder.declare_field(
                &name,
                Some(slot.interface),
                FieldRole::Mixin {
                    interface: slot.interface,
                },
            )?;
            by_interface.insert(slot.interface, field.clone());
            fields.push(field);
        }

        let meta = cx.meta;
        for member in meta.owned_by(ContributorKind::MixinProvider) {
            let Some(field) = by_interface.get(&member.interface).cloned() else {
                return Err(ProxyError::backend(
                    cx.type_name,
                    format!(
                        "no mixin field for {}",
                        cx.registry.display_name(member.interface)
                    ),
                ));
            };
            cx.forward_or_intercept(member, field)?;
        }

        Ok(fields)
    }
}
