#![forbid(unsafe_code)]

//! Shared data model: per-class and per-method analysis results, inferred
//! responses, parameter bindings, and the final `Resources` output tree.

mod binding;
mod resources;
mod response;
mod result;
mod verb;

pub use crate::binding::{BindingKind, ParameterBinding};
pub use crate::resources::{ResourceEntry, Resources, WILDCARD_MEDIA_TYPE};
pub use crate::response::{HttpResponse, STATUS_UNKNOWN};
pub use crate::result::{CallTarget, ClassResult, MethodKey, MethodResult};
pub use crate::verb::HttpVerb;
