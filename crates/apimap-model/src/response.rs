use std::collections::BTreeSet;

use serde::Serialize;

/// Status code recorded when a builder received a status the interpreter
/// could not evaluate to a literal.
pub const STATUS_UNKNOWN: u16 = 0;

/// One response shape a method can produce, as inferred from its bytecode.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct HttpResponse {
    pub statuses: BTreeSet<u16>,
    pub headers: BTreeSet<String>,
    pub cookies: BTreeSet<String>,
    pub entity_type: Option<String>,
}

impl HttpResponse {
    pub fn with_status(status: u16) -> Self {
        Self {
            statuses: BTreeSet::from([status]),
            ..Self::default()
        }
    }
}
