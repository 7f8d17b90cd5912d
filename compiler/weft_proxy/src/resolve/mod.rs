//! Contributor resolution: which contributor owns each interface.
//!
//! Stages run in precedence order and a later stage never takes an
//! interface an earlier stage already claimed:
//!
//! 1. Target: the primary interface's closure, plus every requested
//!    interface the target implements.
//! 2. Mixins, in declaration order. A mixin interface the target also
//!    implements stays with the target (and only if requested); the mixin
//!    keeps an empty slot for it.
//! 3. Additional: requested interfaces nobody claimed and no mixin declares.
//! 4. Special: the target accessor and, when enabled, serialization
//!    support. A claim conflict is put to the [`SpecialInterfacePolicy`].

use std::fmt;

use rustc_hash::FxHashMap;
use weft_ir::{TypeId, TypeRegistry};

use crate::contributor::{
    AdditionalInterfaceHandler, Contributor, ContributorKind, MixinProvider,
    SpecialInterfaceHandler, TargetForwarder,
};
use crate::error::ProxyError;
use crate::interfaces::{self, InterfaceSet};
use crate::options::MixinData;
use crate::request::ProxyKind;

/// Interface → owning contributor. Iterates in claim order.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ContributorMapping {
    order: Vec<TypeId>,
    owners: FxHashMap<TypeId, ContributorKind>,
}

impl ContributorMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(&self, interface: TypeId) -> Option<ContributorKind> {
        self.owners.get(&interface).copied()
    }

    #[inline]
    pub fn contains(&self, interface: TypeId) -> bool {
        self.owners.contains_key(&interface)
    }

    /// Mapped interfaces in claim order.
    #[inline]
    pub fn interfaces(&self) -> &[TypeId] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, ContributorKind)> + '_ {
        self.order
            .iter()
            .filter_map(|&i| self.owners.get(&i).map(|&owner| (i, owner)))
    }

    /// Interfaces owned by `owner`, in claim order.
    pub fn owned_by(&self, owner: ContributorKind) -> impl Iterator<Item = TypeId> + '_ {
        self.iter().filter(move |&(_, o)| o == owner).map(|(i, _)| i)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Claim an unowned interface. Returns false if it already had an owner.
    pub(crate) fn claim(&mut self, interface: TypeId, owner: ContributorKind) -> bool {
        if self.owners.contains_key(&interface) {
            return false;
        }
        self.owners.insert(interface, owner);
        self.order.push(interface);
        true
    }

    /// Move an owned interface to a new owner. Claim order is kept.
    pub(crate) fn reassign(&mut self, interface: TypeId, owner: ContributorKind) {
        if let Some(slot) = self.owners.get_mut(&interface) {
            *slot = owner;
        } else {
            self.claim(interface, owner);
        }
    }
}

impl fmt::Debug for ContributorMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// The generator's reserved interfaces.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SpecialInterface {
    /// Exposes the wrapped target and the interceptor chain. Always added.
    TargetAccessor,
    /// Persisted-state support. Added when options enable serialization.
    Serialization,
}

impl SpecialInterface {
    pub fn type_id(self) -> TypeId {
        match self {
            SpecialInterface::TargetAccessor => TypeId::TARGET_ACCESSOR,
            SpecialInterface::Serialization => TypeId::SERIALIZABLE,
        }
    }
}

/// A reserved interface that an earlier stage already claimed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SpecialInterfaceConflict {
    pub special: SpecialInterface,
    pub interface: TypeId,
    pub existing: ContributorKind,
}

/// Outcome of a [`SpecialInterfaceConflict`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConflictResolution {
    /// The earlier claim stands; the special handler skips the interface.
    KeepExisting,
    /// The special handler takes the interface over.
    Replace,
    /// Fail with `AmbiguousSpecialInterface`.
    Reject,
}

/// Decides reserved-interface conflicts.
pub trait SpecialInterfacePolicy: fmt::Debug + Send + Sync {
    fn on_conflict(&self, conflict: &SpecialInterfaceConflict) -> ConflictResolution;
}

/// Keeps an explicit serialization-support claim, rejects a claimed accessor.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultSpecialPolicy;

impl SpecialInterfacePolicy for DefaultSpecialPolicy {
    fn on_conflict(&self, conflict: &SpecialInterfaceConflict) -> ConflictResolution {
        match conflict.special {
            SpecialInterface::Serialization => ConflictResolution::KeepExisting,
            SpecialInterface::TargetAccessor => ConflictResolution::Reject,
        }
    }
}

/// Everything resolution reads. Interfaces and mixins are already validated.
#[derive(Clone, Copy, Debug)]
pub struct ResolveInput<'a> {
    pub registry: &'a TypeRegistry,
    pub kind: ProxyKind,
    pub target: Option<TypeId>,
    pub primary: Option<TypeId>,
    /// Normalized requested interfaces.
    pub interfaces: &'a InterfaceSet,
    pub mixins: &'a MixinData,
    pub serializable: bool,
    pub policy: &'a dyn SpecialInterfacePolicy,
}

/// Result of resolution.
#[derive(Clone, Debug)]
pub struct Resolution {
    pub mapping: ContributorMapping,
    /// Emission order: target (if any), additional, mixins, special.
    pub contributors: Vec<Contributor>,
}

#[derive(Default)]
struct Stages {
    mapping: ContributorMapping,
    target: TargetForwarder,
    mixins: MixinProvider,
    additional: AdditionalInterfaceHandler,
    special: SpecialInterfaceHandler,
}

impl Stages {
    fn release(&mut self, interface: TypeId, owner: ContributorKind) {
        match owner {
            ContributorKind::TargetForwarder => self.target.release(interface),
            ContributorKind::MixinProvider => self.mixins.release(interface),
            ContributorKind::AdditionalInterfaces => self.additional.release(interface),
            ContributorKind::SpecialInterfaces => self.special.release(interface),
        }
    }
}

#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(kind = %input.kind, interfaces = input.interfaces.len())
)]
pub fn resolve(input: &ResolveInput<'_>) -> Result<Resolution, ProxyError> {
    let registry = input.registry;
    let mut stages = Stages {
        special: SpecialInterfaceHandler::new(input.kind.allows_change_target()),
        ..Stages::default()
    };

    let target_interfaces = input
        .target
        .map(|t| interfaces::target_interfaces(registry, t))
        .unwrap_or_default();

    if input.target.is_some() {
        let primary_closure = input
            .primary
            .map(|p| registry.all_interfaces(p))
            .unwrap_or_default();

        for interface in primary_closure {
            if stages.mapping.claim(interface, ContributorKind::TargetForwarder) {
                stages.target.add(interface);
            }
        }
        for interface in input.interfaces {
            if target_interfaces.contains(interface)
                && stages.mapping.claim(interface, ContributorKind::TargetForwarder)
            {
                stages.target.add(interface);
            }
        }
    }

    for (interface, provider) in input.mixins.interfaces() {
        if target_interfaces.contains(interface) {
            if input.interfaces.contains(interface)
                && stages.mapping.claim(interface, ContributorKind::TargetForwarder)
            {
                stages.target.add(interface);
            }
            stages.mixins.add_empty(interface, provider);
        } else if stages.mapping.claim(interface, ContributorKind::MixinProvider) {
            stages.mixins.add(interface, provider);
        }
    }

    for interface in input.interfaces {
        if input.mixins.contains(interface) {
            continue;
        }
        if stages.mapping.claim(interface, ContributorKind::AdditionalInterfaces) {
            stages.additional.add(interface);
        }
    }

    if input.serializable {
        claim_special(&mut stages, SpecialInterface::Serialization, input, registry)?;
    }
    claim_special(&mut stages, SpecialInterface::TargetAccessor, input, registry)?;

    tracing::debug!(mapped = stages.mapping.len(), "contributors resolved");

    let Stages {
        mapping,
        target,
        mixins,
        additional,
        special,
    } = stages;

    let mut contributors = Vec::with_capacity(4);
    if input.target.is_some() {
        contributors.push(Contributor::Target(target));
    }
    contributors.push(Contributor::Additional(additional));
    contributors.push(Contributor::Mixin(mixins));
    contributors.push(Contributor::Special(special));

    Ok(Resolution {
        mapping,
        contributors,
    })
}

fn claim_special(
    stages: &mut Stages,
    special: SpecialInterface,
    input: &ResolveInput<'_>,
    registry: &TypeRegistry,
) -> Result<(), ProxyError> {
    let interface = special.type_id();

    let Some(existing) = stages.mapping.owner(interface) else {
        stages.mapping.claim(interface, ContributorKind::SpecialInterfaces);
        stages.special.add(interface);
        return Ok(());
    };

    let conflict = SpecialInterfaceConflict {
        special,
        interface,
        existing,
    };
    match input.policy.on_conflict(&conflict) {
        ConflictResolution::KeepExisting => {
            tracing::debug!(?special, %existing, "keeping explicit claim on reserved interface");
            Ok(())
        }
        ConflictResolution::Replace => {
            stages.release(interface, existing);
            stages
                .mapping
                .reassign(interface, ContributorKind::SpecialInterfaces);
            stages.special.add(interface);
            Ok(())
        }
        ConflictResolution::Reject => Err(ProxyError::AmbiguousSpecialInterface {
            interface,
            name: registry.display_name(interface),
            existing,
        }),
    }
}
