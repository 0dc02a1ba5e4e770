use std::fmt;

use serde::Serialize;

/// HTTP verb of a resource method. Variants are declared in alphabetical
/// order so the derived `Ord` matches the output sort order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
}

impl HttpVerb {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpVerb::Delete => "DELETE",
            HttpVerb::Get => "GET",
            HttpVerb::Head => "HEAD",
            HttpVerb::Options => "OPTIONS",
            HttpVerb::Patch => "PATCH",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
        }
    }

    /// Parse the value carried by an `@HttpMethod` annotation.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "DELETE" => Some(HttpVerb::Delete),
            "GET" => Some(HttpVerb::Get),
            "HEAD" => Some(HttpVerb::Head),
            "OPTIONS" => Some(HttpVerb::Options),
            "PATCH" => Some(HttpVerb::Patch),
            "POST" => Some(HttpVerb::Post),
            "PUT" => Some(HttpVerb::Put),
            _ => None,
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
