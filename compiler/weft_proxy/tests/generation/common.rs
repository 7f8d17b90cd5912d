//! Shared fixtures: a small type world, instrumented emitters and hooks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use weft_ir::{TypeId, TypeRegistry, TypeSpec};
use weft_proxy::{
    Dispatch, GeneratedType, GenerationHook, InterceptorSelector, LayoutEmitter, MemberRef,
    ProxyGenerator, TypeBuilder, TypeEmitter, TypeHeader, TypeLayout,
};

/// A registry with a handful of interfaces and implementations.
pub struct World {
    pub registry: Arc<TypeRegistry>,
    pub i_foo: TypeId,
    pub i_bar: TypeId,
    pub i_baz: TypeId,
    pub i_base: TypeId,
    pub i_child: TypeId,
    /// Implements `IFoo` and `IBar`.
    pub foo_bar: TypeId,
    /// Implements nothing.
    pub empty: TypeId,
    /// Mixin implementing `IFoo`.
    pub foo_mixin: TypeId,
    /// Mixin implementing `IBaz`.
    pub baz_mixin: TypeId,
}

pub fn world() -> World {
    world_with(|_| {})
}

/// Build the world, letting the caller register extra types first.
pub fn world_with(extra: impl FnOnce(&mut TypeRegistry)) -> World {
    let mut registry = TypeRegistry::new();
    let mut define = |spec: TypeSpec| registry.define(spec).unwrap();

    let i_foo = define(TypeSpec::interface("Acme.IFoo").method("foo", "fn() -> int"));
    let i_bar = define(TypeSpec::interface("Acme.IBar").method("bar", "fn(str)"));
    let i_baz = define(
        TypeSpec::interface("Acme.IBaz")
            .method("baz", "fn()")
            .property("size", "int"),
    );
    let i_base = define(TypeSpec::interface("Acme.IBase").method("base", "fn()"));
    let i_child = define(
        TypeSpec::interface("Acme.IChild")
            .extends([i_base])
            .method("child", "fn()"),
    );
    let foo_bar = define(TypeSpec::class("Acme.FooBar").implements([i_foo, i_bar]));
    let empty = define(TypeSpec::class("Acme.Empty"));
    let foo_mixin = define(TypeSpec::class("Acme.FooMixin").implements([i_foo]));
    let baz_mixin = define(TypeSpec::class("Acme.BazMixin").implements([i_baz]));

    extra(&mut registry);

    World {
        registry: Arc::new(registry),
        i_foo,
        i_bar,
        i_baz,
        i_base,
        i_child,
        foo_bar,
        empty,
        foo_mixin,
        baz_mixin,
    }
}

impl World {
    pub fn generator(&self) -> ProxyGenerator {
        ProxyGenerator::new(Arc::clone(&self.registry))
    }
}

pub fn layout(generated: &GeneratedType) -> &TypeLayout {
    TypeLayout::of(generated).expect("generated by the layout backend")
}

/// Dispatch of the member called `name` on `interface`.
pub fn dispatch_of<'a>(
    registry: &TypeRegistry,
    generated: &'a GeneratedType,
    interface: TypeId,
    name: &str,
) -> &'a Dispatch {
    layout(generated)
        .members_of(interface)
        .find(|m| registry.resolve(m.member.name) == name)
        .map(|m| &m.dispatch)
        .unwrap_or_else(|| panic!("no member `{name}` on {interface}"))
}

pub fn ctor_fields(generated: &GeneratedType) -> Vec<&str> {
    generated
        .constructor()
        .params()
        .iter()
        .map(|p| p.field.as_str())
        .collect()
}

/// Counts builders handed out, and widens the race window a little.
#[derive(Debug, Default)]
pub struct CountingEmitter {
    inner: LayoutEmitter,
    begun: AtomicUsize,
}

impl CountingEmitter {
    pub fn begun(&self) -> usize {
        self.begun.load(Ordering::SeqCst)
    }
}

impl TypeEmitter for CountingEmitter {
    fn begin(&self, header: TypeHeader) -> Box<dyn TypeBuilder> {
        self.begun.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(5));
        self.inner.begin(header)
    }
}

/// Intercepts everything except the named members.
#[derive(Debug, Default)]
pub struct SkipHook {
    skip: Vec<String>,
    inspected: AtomicUsize,
}

impl SkipHook {
    pub fn skipping(names: &[&str]) -> Self {
        SkipHook {
            skip: names.iter().map(|&n| n.to_owned()).collect(),
            inspected: AtomicUsize::new(0),
        }
    }

    pub fn inspected(&self) -> usize {
        self.inspected.load(Ordering::SeqCst)
    }
}

impl GenerationHook for SkipHook {
    fn should_intercept(&self, member: &MemberRef<'_>) -> bool {
        !self.skip.iter().any(|s| s == member.name)
    }

    fn members_inspected(&self) {
        self.inspected.fetch_add(1, Ordering::SeqCst);
    }

    fn structural_identity(&self) -> Option<String> {
        Some(format!("skip:{}", self.skip.join(",")))
    }
}

/// A hook that cannot be compared.
#[derive(Debug)]
pub struct OpaqueHook;

impl GenerationHook for OpaqueHook {
    fn should_intercept(&self, _member: &MemberRef<'_>) -> bool {
        true
    }
}

#[derive(Debug)]
pub struct NamedSelector(pub &'static str);

impl InterceptorSelector for NamedSelector {
    fn structural_identity(&self) -> Option<String> {
        Some(self.0.to_owned())
    }
}
