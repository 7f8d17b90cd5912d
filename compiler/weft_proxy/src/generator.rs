//! The proxy generator: validate, key, and synthesize through the cache.

use std::sync::Arc;

use weft_ir::{TypeId, TypeKind, TypeRegistry};

use crate::assemble::{assemble, Assembly};
use crate::builder::TypeEmitter;
use crate::cache::CacheKey;
use crate::error::{BaseTypeDefect, ProxyError, TargetDefect};
use crate::generated::GeneratedType;
use crate::interfaces::{self, InterfaceSet};
use crate::layout::LayoutEmitter;
use crate::options::{MixinData, OptionsFingerprint};
use crate::request::{ProxyKind, ProxyRequest};
use crate::resolve::{resolve, DefaultSpecialPolicy, ResolveInput, SpecialInterfacePolicy};
use crate::scope::ModuleScope;

/// Generates interface proxy types.
///
/// Cheap to clone. Clones share the registry, the module scope (and so the
/// type cache), the emitter and the special-interface policy.
#[derive(Clone, Debug)]
pub struct ProxyGenerator {
    registry: Arc<TypeRegistry>,
    scope: Arc<ModuleScope>,
    emitter: Arc<dyn TypeEmitter>,
    policy: Arc<dyn SpecialInterfacePolicy>,
}

impl ProxyGenerator {
    /// A generator with its own module scope, the layout backend and the
    /// default special-interface policy.
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        ProxyGenerator {
            registry,
            scope: Arc::new(ModuleScope::new()),
            emitter: Arc::new(LayoutEmitter::new()),
            policy: Arc::new(DefaultSpecialPolicy),
        }
    }

    #[must_use]
    pub fn with_scope(mut self, scope: Arc<ModuleScope>) -> Self {
        self.scope = scope;
        self
    }

    #[must_use]
    pub fn with_emitter(mut self, emitter: Arc<dyn TypeEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: Arc<dyn SpecialInterfacePolicy>) -> Self {
        self.policy = policy;
        self
    }

    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    #[inline]
    pub fn scope(&self) -> &ModuleScope {
        &self.scope
    }

    /// Return the proxy type for `request`, synthesizing it on first use.
    ///
    /// Requests with equal kind, target, primary interface, interface
    /// closure and options fingerprint share one type. Every error is
    /// raised before anything is cached.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(kind = %request.kind(), target = ?request.target())
    )]
    pub fn generate(&self, request: &ProxyRequest) -> Result<Arc<GeneratedType>, ProxyError> {
        let registry = self.registry.as_ref();
        let options = request.generation_options();

        let fingerprint = options.fingerprint()?;
        self.validate_request(request)?;
        validate_base_type(registry, options.base_type())?;
        let mixins = options.mixin_data(registry)?;
        let requested = self.requested_interfaces(request)?;

        let key = CacheKey {
            kind: request.kind(),
            target: request.target(),
            primary: request.primary_interface(),
            interfaces: requested.clone(),
            options: fingerprint.clone(),
        };

        self.scope.cache().get_or_try_insert_with(key, |_| {
            self.synthesize(request, &requested, &mixins, &fingerprint)
                .map(Arc::new)
        })
    }

    fn synthesize(
        &self,
        request: &ProxyRequest,
        requested: &InterfaceSet,
        mixins: &MixinData,
        fingerprint: &OptionsFingerprint,
    ) -> Result<GeneratedType, ProxyError> {
        let registry = self.registry.as_ref();
        let options = request.generation_options();

        let resolution = resolve(&ResolveInput {
            registry,
            kind: request.kind(),
            target: request.target(),
            primary: request.primary_interface(),
            interfaces: requested,
            mixins,
            serializable: options.serializable(),
            policy: self.policy.as_ref(),
        })?;

        let naming = self.scope.naming();
        let name = naming.unique_name(&self.type_name_base(request, requested));
        tracing::debug!(%name, "synthesizing proxy type");

        assemble(
            Assembly {
                registry,
                emitter: self.emitter.as_ref(),
                request,
                fingerprint,
                name,
                naming: naming.safe_sub_scope(),
            },
            resolution,
        )
    }

    /// `<namespace>.<Name>Proxy`, named after the primary interface, the
    /// target, or the first requested interface.
    fn type_name_base(&self, request: &ProxyRequest, requested: &InterfaceSet) -> String {
        let named = request
            .primary_interface()
            .or(request.target())
            .or_else(|| requested.iter().next());
        let simple = named
            .and_then(|id| self.registry.simple_name(id))
            .unwrap_or("Object");
        format!("{}.{simple}Proxy", self.scope.namespace())
    }

    fn validate_request(&self, request: &ProxyRequest) -> Result<(), ProxyError> {
        let registry = self.registry.as_ref();
        match request.kind() {
            ProxyKind::InterfaceWithTarget => {
                let Some(target) = request.target() else {
                    return Err(ProxyError::MalformedState("target proxy without a target"));
                };
                validate_target(registry, target)?;
                validate_primary(registry, target, request.primary_interface())
            }
            ProxyKind::InterfaceWithTargetInterface => {
                let Some(target) = request.target() else {
                    return Err(ProxyError::MalformedState(
                        "target-interface proxy without a target",
                    ));
                };
                validate_target_interface(registry, target)?;
                validate_primary(registry, target, request.primary_interface())
            }
            ProxyKind::InterfaceWithoutTarget => match request.primary_interface() {
                Some(primary) => interfaces::check_interface(registry, primary),
                None => Ok(()),
            },
        }
    }

    /// Without a target, the primary interface is just one more interface to
    /// implement.
    fn requested_interfaces(&self, request: &ProxyRequest) -> Result<InterfaceSet, ProxyError> {
        let registry = self.registry.as_ref();
        match (request.kind(), request.primary_interface()) {
            (ProxyKind::InterfaceWithoutTarget, Some(primary)) => {
                let mut ids = request.additional_interfaces().to_vec();
                ids.push(primary);
                interfaces::normalize(registry, &ids)
            }
            _ => interfaces::normalize(registry, request.additional_interfaces()),
        }
    }
}

fn validate_target(registry: &TypeRegistry, target: TypeId) -> Result<(), ProxyError> {
    let reason = match registry.get(target) {
        None => TargetDefect::Unknown,
        Some(def) if def.flags.is_open_generic() => TargetDefect::OpenGeneric,
        Some(def) if def.is_interface() => TargetDefect::NotConcrete,
        Some(_) => return Ok(()),
    };
    Err(ProxyError::InvalidTargetType {
        ty: target,
        name: registry.display_name(target),
        reason,
    })
}

fn validate_target_interface(registry: &TypeRegistry, target: TypeId) -> Result<(), ProxyError> {
    let reason = match registry.get(target) {
        None => TargetDefect::Unknown,
        Some(def) if def.flags.is_open_generic() => TargetDefect::OpenGeneric,
        Some(def) if !def.is_interface() => TargetDefect::NotAnInterface(def.kind),
        Some(_) => return Ok(()),
    };
    Err(ProxyError::InvalidTargetType {
        ty: target,
        name: registry.display_name(target),
        reason,
    })
}

/// The target must implement the primary interface it is proxied as.
fn validate_primary(
    registry: &TypeRegistry,
    target: TypeId,
    primary: Option<TypeId>,
) -> Result<(), ProxyError> {
    let Some(primary) = primary else {
        return Ok(());
    };
    interfaces::check_interface(registry, primary)?;
    if registry.implements(target, primary) {
        return Ok(());
    }
    Err(ProxyError::InvalidTargetType {
        ty: target,
        name: registry.display_name(target),
        reason: TargetDefect::DoesNotImplement {
            interface: registry.display_name(primary),
        },
    })
}

/// A proxy can only inherit from a non-sealed class whose parameterless
/// constructor is not private.
pub fn validate_base_type(registry: &TypeRegistry, base: TypeId) -> Result<(), ProxyError> {
    let reason = match registry.get(base) {
        None => BaseTypeDefect::Missing,
        Some(def) if def.kind != TypeKind::Class => BaseTypeDefect::NotAClass(def.kind),
        Some(def) if def.flags.is_sealed() => BaseTypeDefect::Sealed,
        Some(def) if !def.default_ctor.is_accessible() => BaseTypeDefect::NoAccessibleConstructor,
        Some(_) => return Ok(()),
    };
    Err(ProxyError::InvalidBaseType {
        ty: base,
        name: registry.display_name(base),
        reason,
    })
}
