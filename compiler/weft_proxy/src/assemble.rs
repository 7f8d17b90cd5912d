//! Type assembly: drive contributors against a type builder.
//!
//! Order matters and is fixed:
//!
//! 1. Base fields (`__interceptors`, `__selector`, `__target`)
//! 2. Inspection pass over every contributor, then `members_inspected`
//! 3. Emission pass in the same contributor order
//! 4. Constructor: mixin fields, interceptors, target, selector
//! 5. Type initializer, finalize, one-time statics initialization

use weft_ir::TypeRegistry;

use crate::builder::{
    CtorDecl, FieldRole, TypeEmitter, TypeHeader, INTERCEPTORS_FIELD, SELECTOR_FIELD, TARGET_FIELD,
};
use crate::contributor::EmitCx;
use crate::error::ProxyError;
use crate::generated::{ConstructorSignature, CtorParam, GeneratedType, TypeStatics};
use crate::meta::MetaType;
use crate::naming::NamingScope;
use crate::options::OptionsFingerprint;
use crate::request::ProxyRequest;
use crate::resolve::Resolution;

/// Inputs to one assembly.
pub(crate) struct Assembly<'a> {
    pub registry: &'a TypeRegistry,
    pub emitter: &'a dyn TypeEmitter,
    pub request: &'a ProxyRequest,
    pub fingerprint: &'a OptionsFingerprint,
    /// Unique type name, already allocated in the module scope.
    pub name: String,
    /// Per-type scope for field and invocation names.
    pub naming: NamingScope,
}

#[tracing::instrument(level = "debug", skip_all, fields(name = %assembly.name))]
pub(crate) fn assemble(
    assembly: Assembly<'_>,
    resolution: Resolution,
) -> Result<GeneratedType, ProxyError> {
    let Assembly {
        registry,
        emitter,
        request,
        fingerprint,
        name,
        naming,
    } = assembly;
    let Resolution {
        mapping,
        contributors,
    } = resolution;
    let options = request.generation_options();
    let base = options.base_type();

    let mut builder = emitter.begin(TypeHeader {
        name: name.clone(),
        kind: request.kind(),
        base,
        interfaces: mapping.interfaces().to_vec(),
    });

    let interceptors = builder.declare_field(INTERCEPTORS_FIELD, None, FieldRole::Interceptors)?;
    if options.has_selector() {
        builder.declare_field(SELECTOR_FIELD, None, FieldRole::Selector)?;
    }
    let target = match request.target() {
        Some(ty) => Some(builder.declare_field(TARGET_FIELD, Some(ty), FieldRole::Target)?),
        None => None,
    };

    let hook = options.hook();
    let mut meta = MetaType::new();
    for contributor in &contributors {
        contributor.collect(registry, hook, &mut meta);
    }
    hook.members_inspected();
    tracing::debug!(
        members = meta.members().len(),
        intercepted = meta.intercepted_count(),
        "members inspected"
    );

    let mut cx = EmitCx {
        type_name: &name,
        registry,
        builder: builder.as_mut(),
        meta: &meta,
        naming: &naming,
        interceptors: interceptors.clone(),
        target: target.clone(),
        tokens: Vec::new(),
    };
    let mut params = Vec::new();
    for contributor in &contributors {
        params.extend(contributor.emit(&mut cx)?);
    }
    let tokens = cx.tokens;

    params.push(interceptors);
    params.extend(target);
    params.extend(builder.field(SELECTOR_FIELD));

    builder.define_constructor(CtorDecl {
        base,
        params: params.clone(),
    })?;

    let statics = TypeStatics {
        options: fingerprint.clone(),
        tokens,
    };
    builder.define_type_initializer(&statics)?;
    let finished = builder.finalize()?;

    let constructor = ConstructorSignature::new(
        params
            .into_iter()
            .map(|field| CtorParam {
                field: field.name,
                ty: field.ty,
                role: field.role,
            })
            .collect(),
    );

    let generated = GeneratedType::new(request.clone(), mapping, constructor, statics, finished);
    generated.statics();
    Ok(generated)
}
