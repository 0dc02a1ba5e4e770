use std::collections::{HashSet, VecDeque};

use apimap_classfile::{internal_to_binary, ClassFile, Method};
use apimap_classpool::ClassPool;
use tracing::{debug, warn};

use crate::extract;

/// An annotation-bearing declaration found on a supertype.
pub(crate) struct InheritedMember {
    /// Internal name of the declaring supertype.
    pub owner: String,
    pub method: Method,
}

/// Breadth-first search over the superclass chain and all transitive
/// interfaces (diamonds included, `Object` excluded) for a member with the
/// same name, a compatible signature, and REST-relevant annotations.
///
/// The whole closure is walked so that a second equally-qualifying match
/// can be reported; the first match in BFS order wins.
pub(crate) fn find_annotated_member(
    pool: &ClassPool,
    class: &ClassFile,
    target: &Method,
) -> Option<InheritedMember> {
    let mut queue: VecDeque<String> = VecDeque::new();
    let mut visited: HashSet<String> = HashSet::new();
    queue.extend(class.super_name.iter().cloned());
    queue.extend(class.interfaces.iter().cloned());

    let mut matches: Vec<InheritedMember> = Vec::new();
    while let Some(internal) = queue.pop_front() {
        if internal == "java/lang/Object" || !visited.insert(internal.clone()) {
            continue;
        }
        let binary = internal_to_binary(&internal);
        let bytes = match pool.read_class(&binary) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(class = %binary, %err, "supertype not resolvable, skipping");
                continue;
            }
        };
        let parsed = match ClassFile::parse(&bytes) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(class = %binary, %err, "unparseable supertype, skipping");
                continue;
            }
        };

        for method in &parsed.methods {
            if method.name == target.name
                && signatures_compatible(method, target)
                && extract::is_rest_method(pool, method)
            {
                matches.push(InheritedMember {
                    owner: parsed.name.clone(),
                    method: method.clone(),
                });
            }
        }

        queue.extend(parsed.super_name.iter().cloned());
        queue.extend(parsed.interfaces.iter().cloned());
    }

    if matches.len() > 1 {
        warn!(
            method = %target.name,
            first = %matches[0].owner,
            also = %matches[1].owner,
            "ambiguous supertype binding, using first in traversal order"
        );
    }
    matches.into_iter().next()
}

/// Erased descriptors must match; when both declarations carry a generic
/// signature, that signature must match instead.
fn signatures_compatible(a: &Method, b: &Method) -> bool {
    if let (Some(sig_a), Some(sig_b)) = (&a.signature, &b.signature) {
        return sig_a == sig_b;
    }
    a.descriptor == b.descriptor
}
