//! Contributor mapping, dispatch and constructor shape of generated types.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use weft_ir::{TypeId, TypeSpec};
use weft_proxy::{
    ContributorKind, Dispatch, FieldRole, GenerationOptions, ModuleScope, ProxyError,
    ProxyGenerator, ProxyKind, ProxyRequest,
};

use crate::common::{
    ctor_fields, dispatch_of, layout, world, world_with, NamedSelector, OpaqueHook, SkipHook,
};

// =============================================================================
// Mapping
// =============================================================================

#[test]
fn target_owns_requested_interface_and_ignores_the_rest() {
    let w = world();
    let generated = w
        .generator()
        .generate(&ProxyRequest::with_target(w.foo_bar).interfaces([w.i_foo]))
        .unwrap();

    let mapping: Vec<_> = generated.mapping().iter().collect();
    assert_eq!(
        mapping,
        vec![
            (w.i_foo, ContributorKind::TargetForwarder),
            (TypeId::TARGET_ACCESSOR, ContributorKind::SpecialInterfaces),
        ]
    );
    assert!(!generated.mapping().contains(w.i_bar));
}

#[test]
fn mixin_supplies_interface_the_target_lacks() {
    let w = world();
    let request = ProxyRequest::with_target(w.empty)
        .interfaces([w.i_foo])
        .options(GenerationOptions::new().with_mixin(w.foo_mixin));
    let generated = w.generator().generate(&request).unwrap();

    let mapping: Vec<_> = generated.mapping().iter().collect();
    assert_eq!(
        mapping,
        vec![
            (w.i_foo, ContributorKind::MixinProvider),
            (TypeId::TARGET_ACCESSOR, ContributorKind::SpecialInterfaces),
        ]
    );
    assert_eq!(
        ctor_fields(&generated),
        vec!["__mixin_IFoo", "__interceptors", "__target"]
    );
    assert_eq!(
        generated.constructor().params()[0].role,
        FieldRole::Mixin { interface: w.i_foo }
    );
}

#[test]
fn target_takes_precedence_over_mixin() {
    let w = world();
    let request = ProxyRequest::with_target(w.foo_bar)
        .interfaces([w.i_foo])
        .options(GenerationOptions::new().with_mixin(w.foo_mixin));
    let generated = w.generator().generate(&request).unwrap();

    assert_eq!(
        generated.mapping().owner(w.i_foo),
        Some(ContributorKind::TargetForwarder)
    );
    // The mixin keeps its constructor slot but contributes no members.
    assert_eq!(
        ctor_fields(&generated),
        vec!["__mixin_IFoo", "__interceptors", "__target"]
    );
    let Dispatch::Intercept { proceed_to, .. } = dispatch_of(&w.registry, &generated, w.i_foo, "foo")
    else {
        panic!("foo should be intercepted");
    };
    assert_eq!(proceed_to.as_ref().map(|f| f.name.as_str()), Some("__target"));
}

#[test]
fn unprovided_interface_gets_a_default_implementation() {
    let w = world();
    let generated = w
        .generator()
        .generate(&ProxyRequest::with_target(w.foo_bar).interfaces([w.i_foo, w.i_baz]))
        .unwrap();

    assert_eq!(
        generated.mapping().owner(w.i_baz),
        Some(ContributorKind::AdditionalInterfaces)
    );
    assert!(matches!(
        dispatch_of(&w.registry, &generated, w.i_baz, "baz"),
        Dispatch::Intercept { proceed_to: None, .. }
    ));
}

#[test]
fn ancestors_are_implemented_exactly_once() {
    let w = world();
    let generated = w
        .generator()
        .generate(&ProxyRequest::without_target().interfaces([w.i_child, w.i_base]))
        .unwrap();

    let interfaces = generated.interfaces();
    for interface in [w.i_base, w.i_child] {
        assert_eq!(interfaces.iter().filter(|&&i| i == interface).count(), 1);
    }
    assert_eq!(layout(&generated).members_of(w.i_base).count(), 1);
}

#[test]
fn primary_interface_forwards_to_target() {
    let w = world();
    let generated = w
        .generator()
        .generate(&ProxyRequest::with_target(w.foo_bar).primary(w.i_bar))
        .unwrap();

    assert_eq!(
        generated.mapping().owner(w.i_bar),
        Some(ContributorKind::TargetForwarder)
    );
    assert_eq!(generated.name(), "Proxies.IBarProxy");
}

// =============================================================================
// Hooks and dispatch
// =============================================================================

#[test]
fn hook_decides_interception_per_member() {
    let w = world();
    let hook = Arc::new(SkipHook::skipping(&["foo"]));
    let request = ProxyRequest::with_target(w.foo_bar)
        .interfaces([w.i_foo, w.i_bar])
        .options(GenerationOptions::new().with_hook(hook.clone()));
    let generated = w.generator().generate(&request).unwrap();

    assert!(matches!(
        dispatch_of(&w.registry, &generated, w.i_foo, "foo"),
        Dispatch::Forward { to } if to.name == "__target"
    ));
    assert!(dispatch_of(&w.registry, &generated, w.i_bar, "bar").is_intercepted());
    assert_eq!(hook.inspected(), 1);

    let tokens = &generated.statics().tokens;
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].interface, w.i_bar);
    assert_eq!(tokens[0].invocation, "Invocation_IBar_bar");
}

#[test]
fn skipped_members_without_implementation_return_defaults() {
    let w = world();
    let hook = Arc::new(SkipHook::skipping(&["baz"]));
    let request = ProxyRequest::without_target()
        .interfaces([w.i_baz])
        .options(GenerationOptions::new().with_hook(hook));
    let generated = w.generator().generate(&request).unwrap();

    assert_eq!(
        dispatch_of(&w.registry, &generated, w.i_baz, "baz"),
        &Dispatch::Default
    );
    assert!(dispatch_of(&w.registry, &generated, w.i_baz, "size").is_intercepted());
}

#[test]
fn overloads_get_distinct_invocation_names() {
    let mut i_run = TypeId::OBJECT;
    let w = world_with(|registry| {
        i_run = registry
            .define(
                TypeSpec::interface("Acme.IRun")
                    .method("run", "fn()")
                    .method("run", "fn(int)"),
            )
            .unwrap();
    });
    let generated = w
        .generator()
        .generate(&ProxyRequest::without_target().primary(i_run))
        .unwrap();

    let names: Vec<_> = generated
        .statics()
        .tokens
        .iter()
        .map(|t| t.invocation.as_str())
        .collect();
    assert_eq!(names, vec!["Invocation_IRun_run", "Invocation_IRun_run_1"]);
}

#[test]
fn invocation_names_skip_suffixes_taken_by_other_members() {
    let mut i_run = TypeId::OBJECT;
    let w = world_with(|registry| {
        i_run = registry
            .define(
                TypeSpec::interface("Acme.IRun")
                    .method("run", "fn()")
                    .method("run", "fn(int)")
                    .method("run_1", "fn()"),
            )
            .unwrap();
    });
    let generated = w
        .generator()
        .generate(&ProxyRequest::without_target().primary(i_run))
        .unwrap();

    let mut names: Vec<_> = generated
        .statics()
        .tokens
        .iter()
        .map(|t| t.invocation.as_str())
        .collect();
    assert_eq!(names.len(), 3);
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), 3);
}

#[test]
fn mixin_fields_skip_suffixes_taken_by_other_mixins() {
    let mut mixins = Vec::new();
    let w = world_with(|registry| {
        for (iface, provider) in [
            ("A.IFoo", "A.FooImpl"),
            ("B.IFoo", "B.FooImpl"),
            ("C.IFoo_1", "C.FooImpl"),
        ] {
            let iface = registry
                .define(TypeSpec::interface(iface).method("call", "fn()"))
                .unwrap();
            mixins.push(
                registry
                    .define(TypeSpec::class(provider).implements([iface]))
                    .unwrap(),
            );
        }
    });
    let options = mixins
        .iter()
        .fold(GenerationOptions::new(), |options, &m| options.with_mixin(m));
    let generated = w
        .generator()
        .generate(&ProxyRequest::without_target().options(options))
        .unwrap();

    let mut fields: Vec<_> = ctor_fields(&generated)
        .into_iter()
        .filter(|f| f.starts_with("__mixin_"))
        .collect();
    assert_eq!(fields.len(), 3);
    fields.sort_unstable();
    fields.dedup();
    assert_eq!(fields.len(), 3);
}

#[test]
fn target_accessor_members() {
    let w = world();
    let generated = w
        .generator()
        .generate(&ProxyRequest::with_target(w.foo_bar).interfaces([w.i_foo]))
        .unwrap();
    let accessor = TypeId::TARGET_ACCESSOR;

    assert!(matches!(
        dispatch_of(&w.registry, &generated, accessor, "get_target"),
        Dispatch::ReadField { field } if field.role == FieldRole::Target
    ));
    assert_eq!(
        dispatch_of(&w.registry, &generated, accessor, "set_target"),
        &Dispatch::Unsupported
    );
    assert!(matches!(
        dispatch_of(&w.registry, &generated, accessor, "interceptors"),
        Dispatch::ReadField { field } if field.role == FieldRole::Interceptors
    ));
}

#[test]
fn target_interface_proxies_can_change_target() {
    let w = world();
    let generated = w
        .generator()
        .generate(&ProxyRequest::with_target_interface(w.i_foo))
        .unwrap();

    assert_eq!(generated.request().kind(), ProxyKind::InterfaceWithTargetInterface);
    assert!(matches!(
        dispatch_of(&w.registry, &generated, TypeId::TARGET_ACCESSOR, "set_target"),
        Dispatch::WriteField { field } if field.ty == Some(w.i_foo)
    ));
}

#[test]
fn targetless_proxies_have_no_target_field() {
    let w = world();
    let generated = w
        .generator()
        .generate(&ProxyRequest::without_target().primary(w.i_foo))
        .unwrap();

    assert_eq!(ctor_fields(&generated), vec!["__interceptors"]);
    assert_eq!(
        generated.mapping().owner(w.i_foo),
        Some(ContributorKind::AdditionalInterfaces)
    );
    assert_eq!(
        dispatch_of(&w.registry, &generated, TypeId::TARGET_ACCESSOR, "get_target"),
        &Dispatch::Default
    );
}

#[test]
fn serialization_support_is_opt_in() {
    let w = world();
    let generator = w.generator();
    let plain = generator
        .generate(&ProxyRequest::with_target(w.foo_bar).interfaces([w.i_foo]))
        .unwrap();
    assert!(!plain.mapping().contains(TypeId::SERIALIZABLE));

    let serializable = generator
        .generate(
            &ProxyRequest::with_target(w.foo_bar)
                .interfaces([w.i_foo])
                .options(GenerationOptions::new().with_serialization(true)),
        )
        .unwrap();
    assert_eq!(
        serializable.mapping().owner(TypeId::SERIALIZABLE),
        Some(ContributorKind::SpecialInterfaces)
    );
    assert_eq!(
        dispatch_of(&w.registry, &serializable, TypeId::SERIALIZABLE, "persist_state"),
        &Dispatch::PersistState
    );
}

// =============================================================================
// Constructor, naming, statics
// =============================================================================

#[test]
fn constructor_order_with_mixins_and_selector() {
    let w = world();
    let options = GenerationOptions::new()
        .with_mixin(w.baz_mixin)
        .with_mixin(w.foo_mixin)
        .with_selector(Arc::new(NamedSelector("by-name")));
    let generated = w
        .generator()
        .generate(&ProxyRequest::with_target(w.empty).interfaces([w.i_foo]).options(options))
        .unwrap();

    assert_eq!(
        ctor_fields(&generated),
        vec![
            "__mixin_IBaz",
            "__mixin_IFoo",
            "__interceptors",
            "__target",
            "__selector"
        ]
    );
    assert_eq!(
        generated.mapping().owner(w.i_baz),
        Some(ContributorKind::MixinProvider)
    );
}

#[test]
fn names_are_unique_within_a_scope() {
    let w = world();
    let generator = w.generator();
    let first = generator
        .generate(&ProxyRequest::with_target(w.foo_bar).interfaces([w.i_foo]))
        .unwrap();
    let second = generator
        .generate(&ProxyRequest::with_target(w.foo_bar).interfaces([w.i_bar]))
        .unwrap();

    assert_eq!(first.name(), "Proxies.FooBarProxy");
    assert_eq!(second.name(), "Proxies.FooBarProxy_1");
}

#[test]
fn namespace_comes_from_the_module_scope() {
    let w = world();
    let generator = ProxyGenerator::new(Arc::clone(&w.registry))
        .with_scope(Arc::new(ModuleScope::with_namespace("Acme.Generated")));
    let generated = generator
        .generate(&ProxyRequest::with_target_interface(w.i_foo))
        .unwrap();

    assert_eq!(generated.name(), "Acme.Generated.IFooProxy");
}

#[test]
fn statics_are_initialized_exactly_once() {
    let w = world();
    let generator = w.generator();
    let request = ProxyRequest::with_target(w.foo_bar).interfaces([w.i_foo]);

    let generated = generator.generate(&request).unwrap();
    assert!(generated.is_initialized());
    for _ in 0..3 {
        let _ = generated.statics();
        let _ = generator.generate(&request).unwrap();
    }
    assert_eq!(layout(&generated).initialization_count(), 1);
}

// =============================================================================
// Cache
// =============================================================================

#[test]
fn equal_requests_share_one_type() {
    let w = world();
    let generator = w.generator();

    let a = generator
        .generate(&ProxyRequest::with_target(w.foo_bar).interfaces([w.i_foo, w.i_baz]))
        .unwrap();
    let b = generator
        .generate(&ProxyRequest::with_target(w.foo_bar).interfaces([w.i_baz, w.i_foo, w.i_foo]))
        .unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(generator.scope().generated_count(), 1);
}

#[test]
fn structurally_equal_options_share_one_type() {
    let w = world();
    let generator = w.generator();
    let request = |hook: SkipHook| {
        ProxyRequest::with_target(w.foo_bar)
            .interfaces([w.i_foo])
            .options(GenerationOptions::new().with_hook(Arc::new(hook)))
    };

    let a = generator.generate(&request(SkipHook::skipping(&["foo"]))).unwrap();
    let b = generator.generate(&request(SkipHook::skipping(&["foo"]))).unwrap();
    let c = generator.generate(&request(SkipHook::skipping(&["bar"]))).unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&a, &c));
}

#[test]
fn explicit_default_hook_matches_no_hook() {
    let w = world();
    let generator = w.generator();
    let plain = generator
        .generate(&ProxyRequest::with_target(w.foo_bar).interfaces([w.i_foo]))
        .unwrap();
    let explicit = generator
        .generate(
            &ProxyRequest::with_target(w.foo_bar)
                .interfaces([w.i_foo])
                .options(GenerationOptions::new().with_hook(Arc::new(weft_proxy::AllMembersHook))),
        )
        .unwrap();

    assert!(Arc::ptr_eq(&plain, &explicit));
}

#[test]
fn different_shapes_get_different_types() {
    let w = world();
    let generator = w.generator();

    let with_target = generator
        .generate(&ProxyRequest::with_target(w.foo_bar).interfaces([w.i_foo]))
        .unwrap();
    let without_target = generator
        .generate(&ProxyRequest::without_target().interfaces([w.i_foo]))
        .unwrap();
    let other_base = generator
        .generate(
            &ProxyRequest::with_target(w.foo_bar)
                .interfaces([w.i_foo])
                .options(GenerationOptions::new().with_base_type(w.empty)),
        )
        .unwrap();

    assert!(!Arc::ptr_eq(&with_target, &without_target));
    assert!(!Arc::ptr_eq(&with_target, &other_base));
    assert_eq!(layout(&other_base).base(), w.empty);
    assert_eq!(generator.scope().generated_count(), 3);
}

#[test]
fn incomparable_options_fail_before_caching() {
    let w = world();
    let generator = w.generator();
    let request = ProxyRequest::with_target(w.foo_bar)
        .interfaces([w.i_foo])
        .options(GenerationOptions::new().with_hook(Arc::new(OpaqueHook)));

    assert!(matches!(
        generator.generate(&request),
        Err(ProxyError::OptionsNotComparable { .. })
    ));
    assert!(generator.scope().cache().is_empty());
}
