//! Per-method annotation extraction: verbs, path fragment, media-type
//! overrides, and parameter bindings in declaration order.

use apimap_classfile::{
    internal_to_binary, parse_method_descriptor, Annotation, ClassFile, Method,
};
use apimap_classpool::ClassPool;
use apimap_model::{BindingKind, HttpVerb, MethodResult, ParameterBinding};
use tracing::debug;

use crate::vocab;

/// HTTP verbs of a method: direct verb annotations plus any annotation
/// whose own type is meta-annotated `@HttpMethod`. Deduplicated by value.
pub(crate) fn method_verbs(pool: &ClassPool, annotations: &[Annotation]) -> Vec<HttpVerb> {
    let mut verbs = Vec::new();
    for annotation in annotations {
        let verb = vocab::direct_verb(annotation).or_else(|| custom_verb(pool, annotation));
        if let Some(verb) = verb {
            if !verbs.contains(&verb) {
                verbs.push(verb);
            }
        }
    }
    verbs
}

/// Resolve a possible custom HTTP-method annotation by reading the
/// annotation type's own class file from the pool.
fn custom_verb(pool: &ClassPool, annotation: &Annotation) -> Option<HttpVerb> {
    let internal = annotation.type_name()?;
    if internal.starts_with("javax/ws/rs/") || internal.starts_with("jakarta/ws/rs/") {
        return None;
    }
    let bytes = pool.read_class(&internal_to_binary(internal)).ok()?;
    let parsed = ClassFile::parse(&bytes).ok()?;
    let meta = parsed
        .annotations
        .iter()
        .find(|a| vocab::is_http_method_meta(a))?;
    HttpVerb::from_name(meta.string_element("value")?)
}

/// Whether a method declaration carries any REST-relevant annotation.
pub(crate) fn is_rest_method(pool: &ClassPool, method: &Method) -> bool {
    method.annotations.iter().any(vocab::is_path) || !method_verbs(pool, &method.annotations).is_empty()
}

/// Populate a `MethodResult` from an annotation-bearing declaration.
/// `annotated` is the declaration whose annotations apply (the method
/// itself, or the supertype member it inherits from); `declared` is the
/// concrete method whose descriptor defines the parameter list.
pub(crate) fn populate_method_result(
    pool: &ClassPool,
    result: &mut MethodResult,
    annotated: &Method,
    declared: &Method,
) {
    result.verbs = method_verbs(pool, &annotated.annotations);
    result.path = annotated
        .annotations
        .iter()
        .find(|a| vocab::is_path(a))
        .and_then(|a| a.string_element("value").map(str::to_string));
    for annotation in &annotated.annotations {
        if vocab::is_consumes(annotation) {
            result.consumes = annotation.string_list_element("value");
        } else if vocab::is_produces(annotation) {
            result.produces = annotation.string_list_element("value");
        }
    }

    let descriptor = match parse_method_descriptor(&declared.descriptor) {
        Ok(descriptor) => descriptor,
        Err(err) => {
            debug!(method = %declared.name, %err, "bad descriptor, no parameters extracted");
            return;
        }
    };

    let tables = &annotated.parameter_annotations;
    let mut has_body = false;
    for (index, param) in descriptor.params.iter().enumerate() {
        let annotations: &[Annotation] = tables.get(index).map(Vec::as_slice).unwrap_or(&[]);

        let mut bound = None;
        let mut context = false;
        let mut default_value = None;
        for annotation in annotations {
            if let Some(kind) = vocab::binding_kind(annotation) {
                bound = Some((
                    kind,
                    annotation.string_element("value").map(str::to_string),
                ));
            } else if vocab::is_context(annotation) {
                context = true;
            } else if vocab::is_default_value(annotation) {
                default_value = annotation.string_element("value").map(str::to_string);
            }
        }

        let java_type = param.display_name();
        let binding = if let Some((kind, name)) = bound {
            let mut binding = ParameterBinding::new(kind, name, java_type);
            binding.default_value = default_value;
            binding
        } else if context {
            ParameterBinding::new(BindingKind::Context, None, java_type)
        } else if !has_body {
            // The first unannotated parameter is the request entity;
            // further unannotated parameters are dropped, mirroring the
            // framework's own binding rules.
            has_body = true;
            ParameterBinding::new(BindingKind::Body, None, java_type)
        } else {
            debug!(
                method = %declared.name,
                index,
                "dropping unannotated parameter after entity"
            );
            continue;
        };
        result.parameters.push(binding);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apimap_model::MethodKey;
    use apimap_testing::{AnnotationSpec, ClassBuilder, MethodSpec, ACC_PUBLIC};

    fn parse_one(bytes: &[u8]) -> (ClassFile, Method) {
        let class = ClassFile::parse(bytes).unwrap();
        let method = class.methods[0].clone();
        (class, method)
    }

    #[test]
    fn first_unannotated_parameter_becomes_body_rest_dropped() {
        let bytes = ClassBuilder::new("x/R")
            .method(
                MethodSpec::new(
                    ACC_PUBLIC,
                    "update",
                    "(Ljava/lang/String;Lx/Payload;Lx/Extra;)V",
                )
                .annotation(AnnotationSpec::marker("Ljavax/ws/rs/PUT;"))
                .parameter_annotations(vec![
                    vec![AnnotationSpec::with_value("Ljavax/ws/rs/PathParam;", "id")],
                    vec![],
                    vec![],
                ]),
            )
            .finish();
        let (_, method) = parse_one(&bytes);

        let pool = ClassPool::new();
        let mut result = MethodResult::new(MethodKey::new("update", &method.descriptor));
        populate_method_result(&pool, &mut result, &method, &method);

        assert_eq!(result.verbs, vec![HttpVerb::Put]);
        assert_eq!(result.parameters.len(), 2);
        assert_eq!(result.parameters[0].kind, BindingKind::Path);
        assert_eq!(result.parameters[0].name.as_deref(), Some("id"));
        assert_eq!(result.parameters[1].kind, BindingKind::Body);
        assert_eq!(result.parameters[1].java_type, "x.Payload");
    }

    #[test]
    fn default_value_is_captured() {
        let bytes = ClassBuilder::new("x/R")
            .method(
                MethodSpec::new(ACC_PUBLIC, "list", "(I)Ljava/lang/String;")
                    .annotation(AnnotationSpec::marker("Ljakarta/ws/rs/GET;"))
                    .parameter_annotations(vec![vec![
                        AnnotationSpec::with_value("Ljakarta/ws/rs/QueryParam;", "limit"),
                        AnnotationSpec::with_value("Ljakarta/ws/rs/DefaultValue;", "20"),
                    ]]),
            )
            .finish();
        let (_, method) = parse_one(&bytes);

        let pool = ClassPool::new();
        let mut result = MethodResult::new(MethodKey::new("list", &method.descriptor));
        populate_method_result(&pool, &mut result, &method, &method);

        assert_eq!(result.parameters[0].kind, BindingKind::Query);
        assert_eq!(result.parameters[0].default_value.as_deref(), Some("20"));
        assert_eq!(result.parameters[0].java_type, "int");
    }
}
