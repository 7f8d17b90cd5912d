//! Generation options: base type, mixins, selection hook, selector.
//!
//! Options take part in the cache key, so they must compare structurally.
//! Hooks and selectors are trait objects whose identity cannot be derived
//! automatically; each one reports a `structural_identity` instead, and
//! [`GenerationOptions::fingerprint`] reduces the whole bag to an
//! [`OptionsFingerprint`] with value semantics.

use std::fmt;
use std::sync::Arc;

use weft_ir::{MemberDef, MemberKind, TypeId, TypeRegistry};

use crate::error::{OptionsComponent, ProxyError};
use crate::interfaces::{self, InterfaceSet};

/// An interface member as presented to a [`GenerationHook`].
#[derive(Copy, Clone, Debug)]
pub struct MemberRef<'a> {
    pub interface: TypeId,
    pub interface_name: &'a str,
    pub name: &'a str,
    pub kind: MemberKind,
    pub signature: &'a str,
}

impl<'a> MemberRef<'a> {
    pub(crate) fn new(registry: &'a TypeRegistry, interface: TypeId, member: &MemberDef) -> Self {
        MemberRef {
            interface,
            interface_name: registry.name_of(interface).unwrap_or(""),
            name: registry.resolve(member.name),
            kind: member.kind,
            signature: registry.resolve(member.signature),
        }
    }
}

/// Caller policy consulted while members are inspected, before emission.
pub trait GenerationHook: fmt::Debug + Send + Sync {
    /// Whether calls to `member` run the interceptor chain. Members that are
    /// not intercepted forward directly (or return a default value when there
    /// is nothing to forward to).
    fn should_intercept(&self, member: &MemberRef<'_>) -> bool;

    /// Called once per synthesis after every contributor has been inspected.
    fn members_inspected(&self) {}

    /// Value used in place of reference identity when options are compared.
    ///
    /// Two hooks reporting the same identity must make the same decisions.
    /// `None` makes the options unusable as a cache key.
    fn structural_identity(&self) -> Option<String> {
        None
    }
}

/// Intercepts every member. Used when options carry no hook.
#[derive(Copy, Clone, Debug, Default)]
pub struct AllMembersHook;

impl AllMembersHook {
    pub const IDENTITY: &'static str = "weft.AllMembersHook";
}

impl GenerationHook for AllMembersHook {
    fn should_intercept(&self, _member: &MemberRef<'_>) -> bool {
        true
    }

    fn structural_identity(&self) -> Option<String> {
        Some(Self::IDENTITY.to_owned())
    }
}

static DEFAULT_HOOK: AllMembersHook = AllMembersHook;

/// Chooses interceptors per member at call time.
///
/// Selection itself runs outside the generator; its presence adds a
/// `__selector` field and constructor parameter to the generated type.
pub trait InterceptorSelector: fmt::Debug + Send + Sync {
    /// See [`GenerationHook::structural_identity`].
    fn structural_identity(&self) -> Option<String> {
        None
    }
}

/// Options controlling the shape of a generated type.
#[derive(Clone, Debug)]
pub struct GenerationOptions {
    base_type: TypeId,
    mixins: Vec<TypeId>,
    hook: Option<Arc<dyn GenerationHook>>,
    selector: Option<Arc<dyn InterceptorSelector>>,
    serializable: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        GenerationOptions {
            base_type: TypeId::OBJECT,
            mixins: Vec::new(),
            hook: None,
            selector: None,
            serializable: false,
        }
    }
}

impl GenerationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Class the proxy inherits from.
    #[must_use]
    pub fn with_base_type(mut self, base: TypeId) -> Self {
        self.base_type = base;
        self
    }

    /// Append a mixin provider. Declaration order is kept.
    #[must_use]
    pub fn with_mixin(mut self, provider: TypeId) -> Self {
        self.mixins.push(provider);
        self
    }

    #[must_use]
    pub fn with_hook(mut self, hook: Arc<dyn GenerationHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    #[must_use]
    pub fn with_selector(mut self, selector: Arc<dyn InterceptorSelector>) -> Self {
        self.selector = Some(selector);
        self
    }

    /// Implement the reserved serialization-support interface.
    #[must_use]
    pub fn with_serialization(mut self, enabled: bool) -> Self {
        self.serializable = enabled;
        self
    }

    #[inline]
    pub fn base_type(&self) -> TypeId {
        self.base_type
    }

    #[inline]
    pub fn mixins(&self) -> &[TypeId] {
        &self.mixins
    }

    #[inline]
    pub fn has_mixins(&self) -> bool {
        !self.mixins.is_empty()
    }

    /// The configured hook, or [`AllMembersHook`].
    pub fn hook(&self) -> &dyn GenerationHook {
        self.hook.as_deref().unwrap_or(&DEFAULT_HOOK)
    }

    pub fn selector(&self) -> Option<&dyn InterceptorSelector> {
        self.selector.as_deref()
    }

    #[inline]
    pub fn has_selector(&self) -> bool {
        self.selector.is_some()
    }

    #[inline]
    pub fn serializable(&self) -> bool {
        self.serializable
    }

    /// Reduce the options to a comparable, hashable value.
    ///
    /// A missing hook and an explicit [`AllMembersHook`] fingerprint the
    /// same. A hook or selector without a structural identity fails with
    /// `OptionsNotComparable`.
    pub fn fingerprint(&self) -> Result<OptionsFingerprint, ProxyError> {
        let hook = match &self.hook {
            None => None,
            Some(hook) => {
                let identity = hook.structural_identity().ok_or(ProxyError::OptionsNotComparable {
                    component: OptionsComponent::Hook,
                })?;
                (identity != AllMembersHook::IDENTITY).then_some(identity)
            }
        };

        let selector = match &self.selector {
            None => None,
            Some(selector) => Some(selector.structural_identity().ok_or(
                ProxyError::OptionsNotComparable {
                    component: OptionsComponent::Selector,
                },
            )?),
        };

        Ok(OptionsFingerprint {
            base_type: self.base_type,
            mixins: self.mixins.clone(),
            hook,
            selector,
            serializable: self.serializable,
        })
    }

    /// Resolve mixin providers to the interfaces they contribute.
    pub fn mixin_data(&self, registry: &TypeRegistry) -> Result<MixinData, ProxyError> {
        MixinData::new(registry, &self.mixins)
    }
}

/// Structural identity of a [`GenerationOptions`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OptionsFingerprint {
    pub base_type: TypeId,
    pub mixins: Vec<TypeId>,
    /// `None` for the default hook.
    pub hook: Option<String>,
    pub selector: Option<String>,
    pub serializable: bool,
}

/// One declared mixin and the interfaces it contributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MixinEntry {
    pub provider: TypeId,
    pub interfaces: InterfaceSet,
}

/// Mixin providers resolved against the registry, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MixinData {
    entries: Vec<MixinEntry>,
}

impl MixinData {
    /// Fails if a provider is unknown, provides an interface that cannot be
    /// proxied, or shares an interface with an earlier provider.
    pub fn new(registry: &TypeRegistry, providers: &[TypeId]) -> Result<Self, ProxyError> {
        let mut entries: Vec<MixinEntry> = Vec::with_capacity(providers.len());

        for &provider in providers {
            if registry.get(provider).is_none() {
                return Err(ProxyError::UnknownMixin(provider));
            }
            let provided = interfaces::target_interfaces(registry, provider);

            for interface in provided.iter() {
                interfaces::check_interface(registry, interface)?;
                if let Some(first) = entries.iter().find(|e| e.interfaces.contains(interface)) {
                    return Err(ProxyError::DuplicateMixinInterface {
                        interface,
                        name: registry.display_name(interface),
                        first: registry.display_name(first.provider),
                        second: registry.display_name(provider),
                    });
                }
            }

            entries.push(MixinEntry {
                provider,
                interfaces: provided,
            });
        }

        Ok(MixinData { entries })
    }

    pub fn entries(&self) -> &[MixinEntry] {
        &self.entries
    }

    /// `(interface, provider)` pairs in declaration order.
    pub fn interfaces(&self) -> impl Iterator<Item = (TypeId, TypeId)> + '_ {
        self.entries
            .iter()
            .flat_map(|entry| entry.interfaces.iter().map(move |i| (i, entry.provider)))
    }

    pub fn contains(&self, interface: TypeId) -> bool {
        self.provider_of(interface).is_some()
    }

    pub fn provider_of(&self, interface: TypeId) -> Option<TypeId> {
        self.entries
            .iter()
            .find(|entry| entry.interfaces.contains(interface))
            .map(|entry| entry.provider)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
