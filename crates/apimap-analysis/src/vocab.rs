//! The JAX-RS annotation vocabulary and framework type names, covering
//! both the `javax.ws.rs` and `jakarta.ws.rs` namespaces.

use apimap_classfile::Annotation;
use apimap_model::{BindingKind, HttpVerb};

/// Strip `javax/ws/rs/` or `jakarta/ws/rs/` from an internal name.
fn ws_rs_suffix(internal_name: &str) -> Option<&str> {
    internal_name
        .strip_prefix("javax/ws/rs/")
        .or_else(|| internal_name.strip_prefix("jakarta/ws/rs/"))
}

pub fn is_path(annotation: &Annotation) -> bool {
    matches!(annotation.type_name().and_then(ws_rs_suffix), Some("Path"))
}

pub fn is_application_path(annotation: &Annotation) -> bool {
    matches!(
        annotation.type_name().and_then(ws_rs_suffix),
        Some("ApplicationPath")
    )
}

pub fn is_consumes(annotation: &Annotation) -> bool {
    matches!(annotation.type_name().and_then(ws_rs_suffix), Some("Consumes"))
}

pub fn is_produces(annotation: &Annotation) -> bool {
    matches!(annotation.type_name().and_then(ws_rs_suffix), Some("Produces"))
}

pub fn is_http_method_meta(annotation: &Annotation) -> bool {
    matches!(
        annotation.type_name().and_then(ws_rs_suffix),
        Some("HttpMethod")
    )
}

pub fn is_default_value(annotation: &Annotation) -> bool {
    matches!(
        annotation.type_name().and_then(ws_rs_suffix),
        Some("DefaultValue")
    )
}

/// Direct verb annotation (`@GET`, `@POST`, ...).
pub fn direct_verb(annotation: &Annotation) -> Option<HttpVerb> {
    HttpVerb::from_name(annotation.type_name().and_then(ws_rs_suffix)?)
}

/// Parameter/field binding annotation, excluding `@Context`.
pub fn binding_kind(annotation: &Annotation) -> Option<BindingKind> {
    match annotation.type_name().and_then(ws_rs_suffix)? {
        "PathParam" => Some(BindingKind::Path),
        "QueryParam" => Some(BindingKind::Query),
        "HeaderParam" => Some(BindingKind::Header),
        "CookieParam" => Some(BindingKind::Cookie),
        "FormParam" => Some(BindingKind::Form),
        "MatrixParam" => Some(BindingKind::Matrix),
        _ => None,
    }
}

pub fn is_context(annotation: &Annotation) -> bool {
    matches!(
        annotation.type_name(),
        Some("javax/ws/rs/core/Context" | "jakarta/ws/rs/core/Context")
    )
}

fn ws_rs_core_suffix(internal_name: &str) -> Option<&str> {
    internal_name
        .strip_prefix("javax/ws/rs/core/")
        .or_else(|| internal_name.strip_prefix("jakarta/ws/rs/core/"))
}

pub fn is_response_class(internal_name: &str) -> bool {
    matches!(ws_rs_core_suffix(internal_name), Some("Response"))
}

pub fn is_response_builder_class(internal_name: &str) -> bool {
    matches!(
        ws_rs_core_suffix(internal_name),
        Some("Response$ResponseBuilder")
    )
}

pub fn is_status_enum_class(internal_name: &str) -> bool {
    matches!(ws_rs_core_suffix(internal_name), Some("Response$Status"))
}

pub fn is_new_cookie_class(internal_name: &str) -> bool {
    matches!(ws_rs_core_suffix(internal_name), Some("NewCookie"))
}

/// Numeric code of a `Response.Status` enum constant.
pub fn status_enum_code(constant_name: &str) -> Option<u16> {
    let code = match constant_name {
        "OK" => 200,
        "CREATED" => 201,
        "ACCEPTED" => 202,
        "NO_CONTENT" => 204,
        "RESET_CONTENT" => 205,
        "PARTIAL_CONTENT" => 206,
        "MOVED_PERMANENTLY" => 301,
        "FOUND" => 302,
        "SEE_OTHER" => 303,
        "NOT_MODIFIED" => 304,
        "USE_PROXY" => 305,
        "TEMPORARY_REDIRECT" => 307,
        "PERMANENT_REDIRECT" => 308,
        "BAD_REQUEST" => 400,
        "UNAUTHORIZED" => 401,
        "PAYMENT_REQUIRED" => 402,
        "FORBIDDEN" => 403,
        "NOT_FOUND" => 404,
        "METHOD_NOT_ALLOWED" => 405,
        "NOT_ACCEPTABLE" => 406,
        "PROXY_AUTHENTICATION_REQUIRED" => 407,
        "REQUEST_TIMEOUT" => 408,
        "CONFLICT" => 409,
        "GONE" => 410,
        "LENGTH_REQUIRED" => 411,
        "PRECONDITION_FAILED" => 412,
        "REQUEST_ENTITY_TOO_LARGE" => 413,
        "REQUEST_URI_TOO_LONG" => 414,
        "UNSUPPORTED_MEDIA_TYPE" => 415,
        "REQUESTED_RANGE_NOT_SATISFIABLE" => 416,
        "EXPECTATION_FAILED" => 417,
        "PRECONDITION_REQUIRED" => 428,
        "TOO_MANY_REQUESTS" => 429,
        "REQUEST_HEADER_FIELDS_TOO_LARGE" => 431,
        "INTERNAL_SERVER_ERROR" => 500,
        "NOT_IMPLEMENTED" => 501,
        "BAD_GATEWAY" => 502,
        "SERVICE_UNAVAILABLE" => 503,
        "GATEWAY_TIMEOUT" => 504,
        "HTTP_VERSION_NOT_SUPPORTED" => 505,
        "NETWORK_AUTHENTICATION_REQUIRED" => 511,
        _ => return None,
    };
    Some(code)
}
