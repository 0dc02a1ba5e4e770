//! Folds per-class results into the final `Resources` tree: URI template
//! composition, media-type defaults, and `(template, verb)` deduplication.

use std::collections::{BTreeMap, BTreeSet};

use apimap_model::{
    BindingKind, ClassResult, HttpVerb, ResourceEntry, Resources, WILDCARD_MEDIA_TYPE,
};
use tracing::warn;

pub(crate) fn interpret(results: &[ClassResult]) -> Resources {
    let application_path = results
        .iter()
        .find_map(|class| class.application_path.as_deref())
        .map(normalize_fragment)
        .unwrap_or_default();

    let mut entries: BTreeMap<(String, HttpVerb), ResourceEntry> = BTreeMap::new();
    for class in results.iter().filter(|class| class.is_resource()) {
        for method in &class.methods {
            // One entry per distinct verb value; a method annotated both
            // directly and through a custom HTTP-method annotation with
            // the same value collapses to one entry.
            let verbs: BTreeSet<HttpVerb> = method.verbs.iter().copied().collect();
            if verbs.is_empty() {
                continue;
            }

            let template = compose_template(
                &application_path,
                class.path.as_deref(),
                method.path.as_deref(),
            );

            let request_media_types = with_wildcard_default(if method.consumes.is_empty() {
                &class.consumes
            } else {
                &method.consumes
            });
            let response_media_types = with_wildcard_default(if method.produces.is_empty() {
                &class.produces
            } else {
                &method.produces
            });

            let mut parameters = class.field_bindings.clone();
            parameters.extend(
                method
                    .parameters
                    .iter()
                    .filter(|p| !matches!(p.kind, BindingKind::Body | BindingKind::Context))
                    .cloned(),
            );
            parameters.sort();
            parameters.dedup();

            let request_body_type = method
                .parameters
                .iter()
                .find(|p| p.kind == BindingKind::Body)
                .map(|p| p.java_type.clone());

            for verb in verbs {
                let candidate = ResourceEntry {
                    template: template.clone(),
                    verb,
                    request_media_types: request_media_types.clone(),
                    response_media_types: response_media_types.clone(),
                    parameters: parameters.clone(),
                    request_body_type: request_body_type.clone(),
                    responses: method.responses.clone(),
                    doc: method.doc.clone(),
                };
                merge_entry(&mut entries, candidate);
            }
        }
    }

    Resources {
        application_path: if application_path.is_empty() {
            "/".to_string()
        } else {
            application_path.clone()
        },
        entries: entries.into_values().collect(),
    }
}

/// Later results for the same `(template, verb)` union-merge into the
/// earlier entry; a request-body type conflict is reported and the first
/// type kept.
fn merge_entry(entries: &mut BTreeMap<(String, HttpVerb), ResourceEntry>, candidate: ResourceEntry) {
    let key = (candidate.template.clone(), candidate.verb);
    match entries.get_mut(&key) {
        None => {
            entries.insert(key, candidate);
        }
        Some(existing) => {
            for response in candidate.responses {
                if !existing.responses.contains(&response) {
                    existing.responses.push(response);
                }
            }
            existing.responses.sort();
            existing.parameters.extend(candidate.parameters);
            existing.parameters.sort();
            existing.parameters.dedup();
            for media in candidate.request_media_types {
                if !existing.request_media_types.contains(&media) {
                    existing.request_media_types.push(media);
                }
            }
            for media in candidate.response_media_types {
                if !existing.response_media_types.contains(&media) {
                    existing.response_media_types.push(media);
                }
            }
            match (&existing.request_body_type, &candidate.request_body_type) {
                (Some(kept), Some(incoming)) if kept != incoming => {
                    warn!(
                        template = %existing.template,
                        verb = %existing.verb,
                        kept = %kept,
                        conflicting = %incoming,
                        "conflicting request body types for the same resource"
                    );
                }
                (None, Some(incoming)) => {
                    existing.request_body_type = Some(incoming.clone());
                }
                _ => {}
            }
            if existing.doc.is_none() {
                existing.doc = candidate.doc;
            }
        }
    }
}

fn with_wildcard_default(media: &[String]) -> Vec<String> {
    if media.is_empty() {
        vec![WILDCARD_MEDIA_TYPE.to_string()]
    } else {
        media.to_vec()
    }
}

/// Normalize one path fragment to exactly one leading `/`, no trailing
/// `/`, and no empty segments. `"/"` and `""` both normalize to the empty
/// fragment.
fn normalize_fragment(fragment: &str) -> String {
    let mut out = String::new();
    for segment in fragment.split('/').filter(|s| !s.is_empty()) {
        out.push('/');
        out.push_str(segment);
    }
    out
}

/// Canonical concatenation `(application?)/(class?)/(method?)`; the empty
/// result is the root template `/`.
fn compose_template(application: &str, class: Option<&str>, method: Option<&str>) -> String {
    let mut template = String::from(application);
    if let Some(fragment) = class {
        template.push_str(&normalize_fragment(fragment));
    }
    if let Some(fragment) = method {
        template.push_str(&normalize_fragment(fragment));
    }
    if template.is_empty() {
        template.push('/');
    }
    template
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_normalization() {
        assert_eq!(normalize_fragment("v1/users/"), "/v1/users");
        assert_eq!(normalize_fragment("/api/"), "/api");
        assert_eq!(normalize_fragment("//a//b//"), "/a/b");
        assert_eq!(normalize_fragment("/"), "");
        assert_eq!(normalize_fragment(""), "");
    }

    #[test]
    fn template_composition() {
        assert_eq!(
            compose_template("/api", Some("v1/users/"), Some("/{id}")),
            "/api/v1/users/{id}"
        );
        assert_eq!(compose_template("", Some("/"), None), "/");
        assert_eq!(compose_template("", None, None), "/");
        assert_eq!(compose_template("", Some("/users"), None), "/users");
    }
}
