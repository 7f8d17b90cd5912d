//! What a caller asks the generator for.

use std::fmt;

use serde::{Deserialize, Serialize};
use weft_ir::TypeId;

use crate::options::GenerationOptions;

/// The flavour of interface proxy being generated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProxyKind {
    /// Forwards to a concrete target object.
    InterfaceWithTarget,
    /// Forwards to a target known only by interface; the target can be
    /// swapped through the accessor's `set_target`.
    InterfaceWithTargetInterface,
    /// No target. Every member is intercepted or returns a default.
    InterfaceWithoutTarget,
}

impl ProxyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProxyKind::InterfaceWithTarget => "interface-with-target",
            ProxyKind::InterfaceWithTargetInterface => "interface-with-target-interface",
            ProxyKind::InterfaceWithoutTarget => "interface-without-target",
        }
    }

    #[inline]
    pub fn allows_change_target(self) -> bool {
        self == ProxyKind::InterfaceWithTargetInterface
    }
}

impl fmt::Display for ProxyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request for a proxy type.
///
/// ```text
/// let request = ProxyRequest::with_target(foo_impl)
///     .primary(i_foo)
///     .interfaces([i_disposable])
///     .options(GenerationOptions::new().with_mixin(logger));
/// ```
#[derive(Clone, Debug)]
pub struct ProxyRequest {
    kind: ProxyKind,
    target: Option<TypeId>,
    primary: Option<TypeId>,
    interfaces: Vec<TypeId>,
    options: GenerationOptions,
}

impl ProxyRequest {
    fn new(kind: ProxyKind, target: Option<TypeId>, primary: Option<TypeId>) -> Self {
        ProxyRequest {
            kind,
            target,
            primary,
            interfaces: Vec::new(),
            options: GenerationOptions::default(),
        }
    }

    /// Proxy forwarding to an instance of the concrete type `target`.
    pub fn with_target(target: TypeId) -> Self {
        Self::new(ProxyKind::InterfaceWithTarget, Some(target), None)
    }

    /// Proxy forwarding to any implementation of `interface`.
    pub fn with_target_interface(interface: TypeId) -> Self {
        Self::new(
            ProxyKind::InterfaceWithTargetInterface,
            Some(interface),
            Some(interface),
        )
    }

    /// Proxy with nothing to forward to.
    pub fn without_target() -> Self {
        Self::new(ProxyKind::InterfaceWithoutTarget, None, None)
    }

    /// The interface the proxy is primarily generated for. With a target,
    /// it and its ancestors always forward to the target.
    #[must_use]
    pub fn primary(mut self, interface: TypeId) -> Self {
        self.primary = Some(interface);
        self
    }

    /// Additional interfaces the proxy must implement.
    #[must_use]
    pub fn interfaces(mut self, interfaces: impl IntoIterator<Item = TypeId>) -> Self {
        self.interfaces.extend(interfaces);
        self
    }

    #[must_use]
    pub fn options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    #[inline]
    pub fn kind(&self) -> ProxyKind {
        self.kind
    }

    #[inline]
    pub fn target(&self) -> Option<TypeId> {
        self.target
    }

    #[inline]
    pub fn primary_interface(&self) -> Option<TypeId> {
        self.primary
    }

    #[inline]
    pub fn additional_interfaces(&self) -> &[TypeId] {
        &self.interfaces
    }

    #[inline]
    pub fn generation_options(&self) -> &GenerationOptions {
        &self.options
    }
}
