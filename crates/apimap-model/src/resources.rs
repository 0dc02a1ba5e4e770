use serde::Serialize;

use crate::binding::ParameterBinding;
use crate::response::HttpResponse;
use crate::verb::HttpVerb;

pub const WILDCARD_MEDIA_TYPE: &str = "*/*";

/// The assembled REST surface: one entry per `(template, verb)`, sorted.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Resources {
    pub application_path: String,
    pub entries: Vec<ResourceEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResourceEntry {
    /// Full URI template, e.g. `/api/v1/users/{id}`.
    pub template: String,
    pub verb: HttpVerb,
    pub request_media_types: Vec<String>,
    pub response_media_types: Vec<String>,
    pub parameters: Vec<ParameterBinding>,
    pub request_body_type: Option<String>,
    pub responses: Vec<HttpResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}
