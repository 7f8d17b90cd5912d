//! Persisted proxy state.
//!
//! A proxy that implements serialization support writes a [`ProxyState`]:
//! enough to regenerate an equivalent type in another process. Types and
//! interfaces are stored by name; hooks and selectors by structural
//! identity, resolved on the way back in through a [`ComponentResolver`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use weft_ir::{TypeId, TypeRegistry};

use crate::error::{OptionsComponent, ProxyError};
use crate::generated::GeneratedType;
use crate::generator::ProxyGenerator;
use crate::options::{GenerationHook, GenerationOptions, InterceptorSelector};
use crate::request::{ProxyKind, ProxyRequest};

/// Serializable description of a proxy instance's type and interceptors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyState {
    pub kind: ProxyKind,
    /// Name of the generated type the state was captured from.
    pub type_name: String,
    pub target: Option<String>,
    pub primary: Option<String>,
    /// Additional interfaces as requested, before closure.
    pub interfaces: Vec<String>,
    pub base_type: String,
    pub mixins: Vec<String>,
    /// Structural identity of the hook; absent for the default hook.
    pub hook: Option<String>,
    pub selector: Option<String>,
    pub serializable: bool,
    /// Identifiers of the interceptors attached to the instance.
    pub interceptors: Vec<String>,
}

/// Maps structural identities back to hook and selector instances.
pub trait ComponentResolver {
    fn hook(&self, identity: &str) -> Option<Arc<dyn GenerationHook>>;

    fn selector(&self, identity: &str) -> Option<Arc<dyn InterceptorSelector>>;
}

/// Resolves nothing. Enough for state captured with default options.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoComponents;

impl ComponentResolver for NoComponents {
    fn hook(&self, _identity: &str) -> Option<Arc<dyn GenerationHook>> {
        None
    }

    fn selector(&self, _identity: &str) -> Option<Arc<dyn InterceptorSelector>> {
        None
    }
}

/// A regenerated proxy type and the interceptors to attach to its instance.
#[derive(Clone, Debug)]
pub struct RestoredProxy {
    pub generated: Arc<GeneratedType>,
    pub interceptors: Vec<String>,
}

impl ProxyState {
    pub fn capture<I, S>(registry: &TypeRegistry, generated: &GeneratedType, interceptors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let request = generated.request();
        let options = &generated.statics().options;
        let name = |id: TypeId| registry.display_name(id);

        ProxyState {
            kind: request.kind(),
            type_name: generated.name().to_owned(),
            target: request.target().map(name),
            primary: request.primary_interface().map(name),
            interfaces: request
                .additional_interfaces()
                .iter()
                .copied()
                .map(name)
                .collect(),
            base_type: name(options.base_type),
            mixins: options.mixins.iter().copied().map(name).collect(),
            hook: options.hook.clone(),
            selector: options.selector.clone(),
            serializable: options.serializable,
            interceptors: interceptors.into_iter().map(Into::into).collect(),
        }
    }

    /// Regenerate the proxy type through `generator`'s cache.
    ///
    /// Within the module scope the state was captured in, this returns the
    /// very type it was captured from.
    pub fn restore(
        &self,
        generator: &ProxyGenerator,
        components: &dyn ComponentResolver,
    ) -> Result<RestoredProxy, ProxyError> {
        let registry = generator.registry();
        let request = self.request(registry, components)?;
        let generated = generator.generate(&request)?;

        tracing::debug!(
            captured = %self.type_name,
            restored = %generated.name(),
            "restored proxy state"
        );

        Ok(RestoredProxy {
            generated,
            interceptors: self.interceptors.clone(),
        })
    }

    fn request(
        &self,
        registry: &TypeRegistry,
        components: &dyn ComponentResolver,
    ) -> Result<ProxyRequest, ProxyError> {
        let target = self.target.as_deref().map(|n| lookup(registry, n)).transpose()?;
        let primary = self.primary.as_deref().map(|n| lookup(registry, n)).transpose()?;

        let mut request = match (self.kind, target) {
            (ProxyKind::InterfaceWithTarget, Some(target)) => ProxyRequest::with_target(target),
            (ProxyKind::InterfaceWithTargetInterface, Some(target)) => {
                ProxyRequest::with_target_interface(target)
            }
            (ProxyKind::InterfaceWithoutTarget, None) => ProxyRequest::without_target(),
            (ProxyKind::InterfaceWithoutTarget, Some(_)) => {
                return Err(ProxyError::MalformedState("target recorded for a targetless proxy"))
            }
            (_, None) => return Err(ProxyError::MalformedState("missing target")),
        };
        if let Some(primary) = primary {
            request = request.primary(primary);
        }

        let interfaces = self
            .interfaces
            .iter()
            .map(|n| lookup(registry, n))
            .collect::<Result<Vec<_>, _>>()?;

        let mut options = GenerationOptions::new()
            .with_base_type(lookup(registry, &self.base_type)?)
            .with_serialization(self.serializable);
        for mixin in &self.mixins {
            options = options.with_mixin(lookup(registry, mixin)?);
        }
        if let Some(identity) = &self.hook {
            let hook = components
                .hook(identity)
                .ok_or_else(|| unresolved(OptionsComponent::Hook, identity))?;
            options = options.with_hook(hook);
        }
        if let Some(identity) = &self.selector {
            let selector = components
                .selector(identity)
                .ok_or_else(|| unresolved(OptionsComponent::Selector, identity))?;
            options = options.with_selector(selector);
        }

        Ok(request.interfaces(interfaces).options(options))
    }
}

fn lookup(registry: &TypeRegistry, name: &str) -> Result<TypeId, ProxyError> {
    registry
        .lookup(name)
        .ok_or_else(|| ProxyError::UnknownTypeName(name.to_owned()))
}

fn unresolved(kind: OptionsComponent, identity: &str) -> ProxyError {
    ProxyError::UnresolvedComponent {
        kind,
        identity: identity.to_owned(),
    }
}
