use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    Path,
    Query,
    Header,
    Cookie,
    Form,
    Matrix,
    /// Framework-injected value (`@Context`); never part of the request
    /// entity.
    Context,
    /// The request entity. At most one per method.
    Body,
}

/// How one field or method parameter receives its value.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ParameterBinding {
    pub kind: BindingKind,
    /// Binding name (`{id}`, query key, header name, ...). `None` for
    /// `Context` and `Body`.
    pub name: Option<String>,
    /// Display name of the declared Java type, e.g. `java.lang.String`.
    pub java_type: String,
    pub default_value: Option<String>,
}

impl ParameterBinding {
    pub fn new(kind: BindingKind, name: Option<String>, java_type: impl Into<String>) -> Self {
        Self {
            kind,
            name,
            java_type: java_type.into(),
            default_value: None,
        }
    }
}
