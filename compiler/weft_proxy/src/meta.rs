//! Members collected during the inspection pass.
//!
//! Inspection runs over every contributor before anything is emitted, so the
//! generation hook sees the whole type and can veto or force interception per
//! member. Emission then replays these decisions in the same order.

use weft_ir::{MemberDef, TypeId};

use crate::contributor::ContributorKind;

/// A member scheduled for emission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetaMember {
    pub interface: TypeId,
    pub member: MemberDef,
    pub owner: ContributorKind,
    /// Whether calls run the interceptor chain.
    pub intercept: bool,
}

/// The inspected shape of a type about to be emitted.
#[derive(Clone, Debug, Default)]
pub struct MetaType {
    members: Vec<MetaMember>,
}

impl MetaType {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, member: MetaMember) {
        self.members.push(member);
    }

    pub fn members(&self) -> &[MetaMember] {
        &self.members
    }

    /// Members owned by one contributor, in inspection order.
    pub fn owned_by(&self, owner: ContributorKind) -> impl Iterator<Item = &MetaMember> {
        self.members.iter().filter(move |m| m.owner == owner)
    }

    pub fn intercepted_count(&self) -> usize {
        self.members.iter().filter(|m| m.intercept).count()
    }
}
