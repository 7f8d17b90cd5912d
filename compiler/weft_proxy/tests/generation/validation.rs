//! Invalid requests fail before anything is cached.

use pretty_assertions::assert_eq;
use weft_ir::{CtorAccess, TypeFlags, TypeId, TypeKind, TypeSpec};
use weft_proxy::{
    BaseTypeDefect, ContributorKind, GenerationOptions, InterfaceKindDefect, ProxyError,
    ProxyRequest, TargetDefect,
};

use crate::common::{world, world_with, World};

struct Bases {
    sealed: TypeId,
    private_ctor: TypeId,
    no_ctor: TypeId,
    abstract_protected: TypeId,
    value: TypeId,
    open_generic: TypeId,
}

fn world_with_bases() -> (World, Bases) {
    let mut bases = Bases {
        sealed: TypeId::OBJECT,
        private_ctor: TypeId::OBJECT,
        no_ctor: TypeId::OBJECT,
        abstract_protected: TypeId::OBJECT,
        value: TypeId::OBJECT,
        open_generic: TypeId::OBJECT,
    };
    let w = world_with(|registry| {
        let mut define = |spec| registry.define(spec).unwrap();
        bases.sealed = define(TypeSpec::class("Acme.Sealed").sealed());
        bases.private_ctor =
            define(TypeSpec::class("Acme.PrivateCtor").constructor(CtorAccess::Private));
        bases.no_ctor = define(TypeSpec::class("Acme.NoCtor").constructor(CtorAccess::Missing));
        bases.abstract_protected = define(
            TypeSpec::class("Acme.AbstractBase")
                .with_flags(TypeFlags::ABSTRACT)
                .constructor(CtorAccess::Protected),
        );
        bases.value = define(TypeSpec::value("Acme.Point"));
        bases.open_generic = define(TypeSpec::interface("Acme.IList`1").generic_definition());
    });
    (w, bases)
}

fn base_error(w: &World, base: TypeId) -> Result<(), ProxyError> {
    let generator = w.generator();
    let request = ProxyRequest::with_target(w.foo_bar)
        .interfaces([w.i_foo])
        .options(GenerationOptions::new().with_base_type(base));
    let result = generator.generate(&request).map(|_| ());
    if result.is_err() {
        assert!(generator.scope().cache().is_empty());
    }
    result
}

fn reason(result: Result<(), ProxyError>) -> BaseTypeDefect {
    match result {
        Err(ProxyError::InvalidBaseType { reason, .. }) => reason,
        other => panic!("expected InvalidBaseType, got {other:?}"),
    }
}

#[test]
fn unusable_base_types_are_rejected() {
    let (w, bases) = world_with_bases();

    assert_eq!(reason(base_error(&w, bases.sealed)), BaseTypeDefect::Sealed);
    assert_eq!(
        reason(base_error(&w, bases.private_ctor)),
        BaseTypeDefect::NoAccessibleConstructor
    );
    assert_eq!(
        reason(base_error(&w, bases.no_ctor)),
        BaseTypeDefect::NoAccessibleConstructor
    );
    assert_eq!(
        reason(base_error(&w, w.i_foo)),
        BaseTypeDefect::NotAClass(TypeKind::Interface)
    );
    assert_eq!(
        reason(base_error(&w, bases.value)),
        BaseTypeDefect::NotAClass(TypeKind::Value)
    );
    assert_eq!(
        reason(base_error(&w, TypeId::from_raw(9_999))),
        BaseTypeDefect::Missing
    );
}

#[test]
fn abstract_base_with_protected_constructor_is_accepted() {
    let (w, bases) = world_with_bases();
    assert_eq!(base_error(&w, bases.abstract_protected), Ok(()));
}

#[test]
fn base_type_error_names_the_type() {
    let (w, bases) = world_with_bases();
    let message = base_error(&w, bases.sealed).unwrap_err().to_string();
    assert!(message.contains("Acme.Sealed"), "{message}");
    assert!(message.contains("sealed"), "{message}");
}

#[test]
fn non_interfaces_cannot_be_requested() {
    let (w, bases) = world_with_bases();
    let generator = w.generator();

    let class = generator.generate(&ProxyRequest::with_target(w.foo_bar).interfaces([w.empty]));
    assert!(matches!(
        class,
        Err(ProxyError::InvalidInterfaceKind {
            reason: InterfaceKindDefect::NotAnInterface(TypeKind::Class),
            ..
        })
    ));

    let generic =
        generator.generate(&ProxyRequest::with_target(w.foo_bar).interfaces([bases.open_generic]));
    assert!(matches!(
        generic,
        Err(ProxyError::InvalidInterfaceKind {
            reason: InterfaceKindDefect::OpenGeneric,
            ..
        })
    ));
    assert!(generator.scope().cache().is_empty());
}

#[test]
fn targets_must_be_concrete_and_implement_the_primary() {
    let w = world();
    let generator = w.generator();

    assert!(matches!(
        generator.generate(&ProxyRequest::with_target(w.i_foo)),
        Err(ProxyError::InvalidTargetType {
            reason: TargetDefect::NotConcrete,
            ..
        })
    ));
    assert_eq!(
        generator
            .generate(&ProxyRequest::with_target(w.empty).primary(w.i_foo))
            .map(|_| ()),
        Err(ProxyError::InvalidTargetType {
            ty: w.empty,
            name: "Acme.Empty".to_owned(),
            reason: TargetDefect::DoesNotImplement {
                interface: "Acme.IFoo".to_owned(),
            },
        })
    );
    assert!(matches!(
        generator.generate(&ProxyRequest::with_target(TypeId::from_raw(9_999))),
        Err(ProxyError::InvalidTargetType {
            reason: TargetDefect::Unknown,
            ..
        })
    ));
}

#[test]
fn target_interfaces_must_implement_the_primary() {
    let w = world();
    let generator = w.generator();

    assert_eq!(
        generator
            .generate(&ProxyRequest::with_target_interface(w.i_foo).primary(w.i_bar))
            .map(|_| ()),
        Err(ProxyError::InvalidTargetType {
            ty: w.i_foo,
            name: "Acme.IFoo".to_owned(),
            reason: TargetDefect::DoesNotImplement {
                interface: "Acme.IBar".to_owned(),
            },
        })
    );
    assert!(generator.scope().cache().is_empty());
}

#[test]
fn target_interface_proxies_need_an_interface_target() {
    let w = world();
    let generator = w.generator();

    assert_eq!(
        generator
            .generate(&ProxyRequest::with_target_interface(w.foo_bar))
            .map(|_| ()),
        Err(ProxyError::InvalidTargetType {
            ty: w.foo_bar,
            name: "Acme.FooBar".to_owned(),
            reason: TargetDefect::NotAnInterface(TypeKind::Class),
        })
    );
    assert!(generator.scope().cache().is_empty());
}

#[test]
fn derived_target_interface_may_be_proxied_as_its_ancestor() {
    let w = world();
    let generated = w
        .generator()
        .generate(&ProxyRequest::with_target_interface(w.i_child).primary(w.i_base))
        .unwrap();

    assert_eq!(
        generated.mapping().owner(w.i_base),
        Some(ContributorKind::TargetForwarder)
    );
}

#[test]
fn mixins_providing_open_generic_interfaces_are_rejected() {
    let mut provider = TypeId::OBJECT;
    let w = world_with(|registry| {
        let list = registry
            .define(TypeSpec::interface("Acme.IList`1").generic_definition())
            .unwrap();
        provider = registry
            .define(TypeSpec::class("Acme.ListMixin").implements([list]))
            .unwrap();
    });
    let generator = w.generator();

    let result = generator.generate(
        &ProxyRequest::with_target(w.foo_bar)
            .options(GenerationOptions::new().with_mixin(provider)),
    );
    assert!(matches!(
        result,
        Err(ProxyError::InvalidInterfaceKind {
            reason: InterfaceKindDefect::OpenGeneric,
            ..
        })
    ));
    assert!(generator.scope().cache().is_empty());
}

#[test]
fn overlapping_mixins_are_rejected() {
    let mut other_foo = TypeId::OBJECT;
    let w = world_with(|registry| {
        let i_foo = registry.lookup("Acme.IFoo").unwrap();
        other_foo = registry
            .define(TypeSpec::class("Acme.OtherFoo").implements([i_foo]))
            .unwrap();
    });
    let options = GenerationOptions::new()
        .with_mixin(w.foo_mixin)
        .with_mixin(other_foo);

    let result = w
        .generator()
        .generate(&ProxyRequest::with_target(w.empty).options(options))
        .map(|_| ());
    assert_eq!(
        result,
        Err(ProxyError::DuplicateMixinInterface {
            interface: w.i_foo,
            name: "Acme.IFoo".to_owned(),
            first: "Acme.FooMixin".to_owned(),
            second: "Acme.OtherFoo".to_owned(),
        })
    );
}

#[test]
fn explicitly_requested_target_accessor_is_ambiguous() {
    let w = world();
    let generator = w.generator();
    let result = generator
        .generate(
            &ProxyRequest::with_target(w.foo_bar).interfaces([w.i_foo, TypeId::TARGET_ACCESSOR]),
        )
        .map(|_| ());

    assert_eq!(
        result,
        Err(ProxyError::AmbiguousSpecialInterface {
            interface: TypeId::TARGET_ACCESSOR,
            name: "weft.IProxyTargetAccessor".to_owned(),
            existing: ContributorKind::AdditionalInterfaces,
        })
    );
    assert!(generator.scope().cache().is_empty());
}

#[test]
fn explicitly_requested_serialization_support_keeps_its_owner() {
    let w = world();
    let generated = w
        .generator()
        .generate(
            &ProxyRequest::with_target(w.foo_bar)
                .interfaces([w.i_foo, TypeId::SERIALIZABLE])
                .options(GenerationOptions::new().with_serialization(true)),
        )
        .unwrap();

    assert_eq!(
        generated.mapping().owner(TypeId::SERIALIZABLE),
        Some(ContributorKind::AdditionalInterfaces)
    );
}
