//! Runtime interface proxy generation.
//!
//! Given a target type, a set of interfaces and generation options, the
//! generator composes one proxy type whose members come from up to four
//! contributors: the target, mixin instances, a default-implementation
//! handler for interfaces nothing else provides, and the generator's own
//! reserved interfaces. Generated types are cached per request shape.
//!
//! # Pipeline
//!
//! ```text
//! ProxyRequest
//!   -> options fingerprint, validation, interface closure   (generator)
//!   -> CacheKey lookup                                       (cache)
//!   -> on miss: contributor resolution                       (resolve)
//!   -> inspection + emission against a TypeBuilder          (assemble)
//!   -> GeneratedType, statics initialized once               (generated)
//! ```
//!
//! The code-emission backend sits behind [`TypeEmitter`]. [`LayoutEmitter`]
//! is the in-tree backend; it records each type's layout as data.
//!
//! # Tracing
//!
//! Cache hits and misses, resolution and synthesis are traced at `debug`.
//! Call [`init_tracing`] and set `RUST_LOG=weft_proxy=debug` to see them.

mod assemble;
mod builder;
mod cache;
mod contributor;
mod error;
mod generated;
mod generator;
mod interfaces;
mod layout;
mod meta;
mod naming;
mod options;
mod persist;
mod request;
mod resolve;
mod scope;

use std::sync::Once;

pub use builder::{
    CtorDecl, Dispatch, FieldRef, FieldRole, FinishedType, MemberEmission, TypeBuilder,
    TypeEmitter, TypeHeader, INTERCEPTORS_FIELD, MIXIN_FIELD_PREFIX, SELECTOR_FIELD, TARGET_FIELD,
};
pub use cache::{CacheKey, TypeCache};
pub use contributor::{
    AdditionalInterfaceHandler, Contributor, ContributorKind, MixinProvider, MixinSlot,
    SpecialInterfaceHandler, TargetForwarder,
};
pub use error::{BaseTypeDefect, InterfaceKindDefect, OptionsComponent, ProxyError, TargetDefect};
pub use generated::{ConstructorSignature, CtorParam, GeneratedType, MemberToken, TypeStatics};
pub use generator::{validate_base_type, ProxyGenerator};
pub use interfaces::{check_interface, normalize, target_interfaces, InterfaceSet};
pub use layout::{LayoutBuilder, LayoutEmitter, TypeLayout};
pub use meta::{MetaMember, MetaType};
pub use naming::NamingScope;
pub use options::{
    AllMembersHook, GenerationHook, GenerationOptions, InterceptorSelector, MemberRef, MixinData,
    MixinEntry, OptionsFingerprint,
};
pub use persist::{ComponentResolver, NoComponents, ProxyState, RestoredProxy};
pub use request::{ProxyKind, ProxyRequest};
pub use resolve::{
    resolve, ConflictResolution, ContributorMapping, DefaultSpecialPolicy, Resolution,
    ResolveInput, SpecialInterface, SpecialInterfaceConflict, SpecialInterfacePolicy,
};
pub use scope::{ModuleScope, DEFAULT_NAMESPACE};

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset or another subscriber is already
/// installed. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init();
        }
    });
}
