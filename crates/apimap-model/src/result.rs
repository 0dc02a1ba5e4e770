use crate::binding::ParameterBinding;
use crate::response::HttpResponse;
use crate::verb::HttpVerb;

/// Name + erased descriptor; identifies a method for call-site resolution.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodKey {
    pub name: String,
    pub descriptor: String,
}

impl MethodKey {
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

/// A project-local method invoked from a resource method's body.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CallTarget {
    /// Binary name of the owning class.
    pub class: String,
    pub method: MethodKey,
}

/// Findings for one REST-eligible method.
#[derive(Clone, Debug)]
pub struct MethodResult {
    pub key: MethodKey,
    pub verbs: Vec<HttpVerb>,
    pub path: Option<String>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    /// Parameter bindings in declaration order.
    pub parameters: Vec<ParameterBinding>,
    pub responses: Vec<HttpResponse>,
    /// Documentation attached by the enricher.
    pub doc: Option<String>,
    /// Project-local methods invoked from the body; their classes are fed
    /// back into the job registry.
    pub invoked: Vec<CallTarget>,
}

impl MethodResult {
    pub fn new(key: MethodKey) -> Self {
        Self {
            key,
            verbs: Vec::new(),
            path: None,
            consumes: Vec::new(),
            produces: Vec::new(),
            parameters: Vec::new(),
            responses: Vec::new(),
            doc: None,
            invoked: Vec::new(),
        }
    }
}

/// Findings for one analyzed class.
#[derive(Clone, Debug)]
pub struct ClassResult {
    pub binary_name: String,
    /// Class-level `@Path` fragment.
    pub path: Option<String>,
    /// `@ApplicationPath` fragment, when the class is an application root.
    pub application_path: Option<String>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    /// Field-level bindings; they apply to every method of the class.
    pub field_bindings: Vec<ParameterBinding>,
    pub methods: Vec<MethodResult>,
}

impl ClassResult {
    pub fn new(binary_name: impl Into<String>) -> Self {
        Self {
            binary_name: binary_name.into(),
            path: None,
            application_path: None,
            consumes: Vec::new(),
            produces: Vec::new(),
            field_bindings: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// A class is emitted as a resource only if it declares a path or has
    /// at least one verbed method.
    pub fn is_resource(&self) -> bool {
        self.path.is_some() || self.methods.iter().any(|m| !m.verbs.is_empty())
    }
}
