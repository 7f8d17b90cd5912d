//! Contributors: the sources a proxy type's members come from.
//!
//! Every interface in a generated type is owned by exactly one contributor.
//! The set of contributors is closed, so it is an enum rather than a trait:
//!
//! - [`TargetForwarder`]: forwards to the wrapped target
//! - [`MixinProvider`]: forwards to mixin instances
//! - [`AdditionalInterfaceHandler`]: no implementation to forward to
//! - [`SpecialInterfaceHandler`]: the generator's reserved interfaces
//!
//! Each one takes part in both assembly passes: `collect` (inspection) and
//! `emit` (emission), and `emit` reports the constructor fields it added.

mod additional;
mod mixin;
mod special;
mod target;

use std::fmt;

use weft_ir::{TypeId, TypeRegistry};

pub use additional::AdditionalInterfaceHandler;
pub use mixin::{MixinProvider, MixinSlot};
pub use special::SpecialInterfaceHandler;
pub use target::TargetForwarder;

use crate::builder::{Dispatch, FieldRef, MemberEmission, TypeBuilder};
use crate::error::ProxyError;
use crate::generated::MemberToken;
use crate::meta::{MetaMember, MetaType};
use crate::naming::NamingScope;
use crate::options::{GenerationHook, MemberRef};

/// Identifies a contributor in a [`ContributorMapping`](crate::ContributorMapping).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContributorKind {
    TargetForwarder,
    MixinProvider,
    AdditionalInterfaces,
    SpecialInterfaces,
}

impl fmt::Display for ContributorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContributorKind::TargetForwarder => "target forwarder",
            ContributorKind::MixinProvider => "mixin provider",
            ContributorKind::AdditionalInterfaces => "additional-interfaces handler",
            ContributorKind::SpecialInterfaces => "special-interfaces handler",
        })
    }
}

/// A source of member implementations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Contributor {
    Target(TargetForwarder),
    Mixin(MixinProvider),
    Additional(AdditionalInterfaceHandler),
    Special(SpecialInterfaceHandler),
}

impl Contributor {
    pub fn kind(&self) -> ContributorKind {
        match self {
            Contributor::Target(_) => ContributorKind::TargetForwarder,
            Contributor::Mixin(_) => ContributorKind::MixinProvider,
            Contributor::Additional(_) => ContributorKind::AdditionalInterfaces,
            Contributor::Special(_) => ContributorKind::SpecialInterfaces,
        }
    }

    /// Interfaces whose members this contributor implements.
    pub fn interfaces(&self) -> &[TypeId] {
        match self {
            Contributor::Target(c) => c.interfaces(),
            Contributor::Mixin(c) => c.interfaces(),
            Contributor::Additional(c) => c.interfaces(),
            Contributor::Special(c) => c.interfaces(),
        }
    }

    /// Inspection pass: list members and record the hook's decisions.
    pub(crate) fn collect(
        &self,
        registry: &TypeRegistry,
        hook: &dyn GenerationHook,
        meta: &mut MetaType,
    ) {
        let owner = self.kind();
        for &interface in self.interfaces() {
            for member in registry.members(interface) {
                let intercept = owner != ContributorKind::SpecialInterfaces
                    && hook.should_intercept(&MemberRef::new(registry, interface, member));
                meta.push(MetaMember {
                    interface,
                    member: member.clone(),
                    owner,
                    intercept,
                });
            }
        }
    }

    /// Emission pass. Returns the constructor fields this contributor added.
    pub(crate) fn emit(&self, cx: &mut EmitCx<'_>) -> Result<Vec<FieldRef>, ProxyError> {
        match self {
            Contributor::Target(c) => c.emit(cx),
            Contributor::Mixin(c) => c.emit(cx),
            Contributor::Additional(c) => c.emit(cx),
            Contributor::Special(c) => c.emit(cx),
        }
    }
}

/// Shared state for the emission pass.
pub(crate) struct EmitCx<'a> {
    pub type_name: &'a str,
    pub registry: &'a TypeRegistry,
    pub builder: &'a mut dyn TypeBuilder,
    pub meta: &'a MetaType,
    /// Per-type scope for field and invocation names.
    pub naming: &'a NamingScope,
    pub interceptors: FieldRef,
    pub target: Option<FieldRef>,
    /// Intercepted members, in emission order.
    pub tokens: Vec<MemberToken>,
}

impl EmitCx<'_> {
    /// Dispatch through the interceptor chain, registering a member token.
    fn intercept(&mut self, member: &MetaMember, proceed_to: Option<FieldRef>) -> Dispatch {
        let interface = self.registry.simple_name(member.interface).unwrap_or("Interface");
        let name = self.registry.resolve(member.member.name);
        let invocation = self
            .naming
            .unique_name(&format!("Invocation_{interface}_{name}"));

        self.tokens.push(MemberToken {
            index: self.tokens.len(),
            interface: member.interface,
            member: member.member.clone(),
            invocation: invocation.clone(),
        });

        Dispatch::Intercept {
            proceed_to,
            invocation,
        }
    }

    fn declare(&mut self, member: &MetaMember, dispatch: Dispatch) -> Result<(), ProxyError> {
        self.builder.declare_member(MemberEmission {
            interface: member.interface,
            member: member.member.clone(),
            dispatch,
        })
    }

    /// Intercept or forward to `field`, following the inspection decision.
    fn forward_or_intercept(&mut self, member: &MetaMember, field: FieldRef) -> Result<(), ProxyError> {
        let dispatch = if member.intercept {
            self.intercept(member, Some(field))
        } else {
            Dispatch::Forward { to: field }
        };
        self.declare(member, dispatch)
    }
}

fn release_from(interfaces: &mut Vec<TypeId>, interface: TypeId) {
    interfaces.retain(|&i| i != interface);
}
