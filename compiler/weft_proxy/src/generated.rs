//! The synthesized proxy type and its published contract.

use std::fmt;
use std::sync::OnceLock;

use weft_ir::{MemberDef, TypeId};

use crate::builder::{FieldRole, FinishedType};
use crate::options::OptionsFingerprint;
use crate::request::ProxyRequest;
use crate::resolve::ContributorMapping;

/// One constructor parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CtorParam {
    /// Field the argument is stored in.
    pub field: String,
    pub ty: Option<TypeId>,
    pub role: FieldRole,
}

/// Ordered constructor parameters. Instantiating the type means supplying
/// arguments in exactly this order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstructorSignature {
    params: Vec<CtorParam>,
}

impl ConstructorSignature {
    pub(crate) fn new(params: Vec<CtorParam>) -> Self {
        ConstructorSignature { params }
    }

    pub fn params(&self) -> &[CtorParam] {
        &self.params
    }

    pub fn roles(&self) -> impl Iterator<Item = &FieldRole> {
        self.params.iter().map(|p| &p.role)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Metadata for an intercepted member, indexed by position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberToken {
    pub index: usize,
    pub interface: TypeId,
    pub member: MemberDef,
    /// Invocation name, unique within the type.
    pub invocation: String,
}

/// Per-type static state, populated once after the type is finalized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeStatics {
    pub options: OptionsFingerprint,
    pub tokens: Vec<MemberToken>,
}

/// A synthesized proxy type.
pub struct GeneratedType {
    name: String,
    request: ProxyRequest,
    mapping: ContributorMapping,
    constructor: ConstructorSignature,
    statics: TypeStatics,
    initialized: OnceLock<()>,
    finished: Box<dyn FinishedType>,
}

impl GeneratedType {
    pub(crate) fn new(
        request: ProxyRequest,
        mapping: ContributorMapping,
        constructor: ConstructorSignature,
        statics: TypeStatics,
        finished: Box<dyn FinishedType>,
    ) -> Self {
        GeneratedType {
            name: finished.name().to_owned(),
            request,
            mapping,
            constructor,
            statics,
            initialized: OnceLock::new(),
            finished,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The request this type was first generated for.
    #[inline]
    pub fn request(&self) -> &ProxyRequest {
        &self.request
    }

    /// Which contributor implements each interface.
    #[inline]
    pub fn mapping(&self) -> &ContributorMapping {
        &self.mapping
    }

    /// Interfaces the type implements, in claim order.
    pub fn interfaces(&self) -> &[TypeId] {
        self.mapping.interfaces()
    }

    #[inline]
    pub fn constructor(&self) -> &ConstructorSignature {
        &self.constructor
    }

    /// Run the static initializer if it has not run yet, then return the statics.
    ///
    /// Safe under concurrent first use: the backend initializer runs once.
    pub fn statics(&self) -> &TypeStatics {
        self.initialized
            .get_or_init(|| self.finished.initialize_statics(&self.statics));
        &self.statics
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.get().is_some()
    }

    /// The backend's representation of the type.
    #[inline]
    pub fn finished(&self) -> &dyn FinishedType {
        self.finished.as_ref()
    }
}

impl fmt::Debug for GeneratedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedType")
            .field("name", &self.name)
            .field("kind", &self.request.kind())
            .field("mapping", &self.mapping)
            .field("constructor", &self.constructor)
            .finish_non_exhaustive()
    }
}
