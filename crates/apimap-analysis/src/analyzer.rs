//! Single-pass visit over one class file: class-level annotations,
//! instance-field bindings, method selection with supertype fallback, and
//! bytecode inference per method.

use apimap_classfile::{
    parse_type_descriptor, ClassFile, Method, ACC_NATIVE, ACC_STATIC, ACC_SYNTHETIC,
};
use apimap_classpool::ClassPool;
use apimap_model::{ClassResult, MethodKey, MethodResult, ParameterBinding};
use tracing::debug;

use crate::interp::{interpret_method, InterpContext};
use crate::registry::JobRegistry;
use crate::supertype;
use crate::vocab;
use crate::{extract, AnalysisError};

pub(crate) struct ClassAnalyzer<'a> {
    pub pool: &'a ClassPool,
    pub registry: &'a JobRegistry,
    pub iteration_cap: u32,
}

impl ClassAnalyzer<'_> {
    /// Analyze one class, mutating its pending `ClassResult` in place.
    pub fn analyze(&self, binary_name: &str, result: &mut ClassResult) -> Result<(), AnalysisError> {
        let bytes = self.pool.read_class(binary_name)?;
        let class = ClassFile::parse(&bytes).map_err(|source| AnalysisError::MalformedClassFile {
            name: binary_name.to_string(),
            source,
        })?;

        for annotation in &class.annotations {
            if vocab::is_path(annotation) {
                result.path = annotation.string_element("value").map(str::to_string);
            } else if vocab::is_application_path(annotation) {
                result.application_path = annotation.string_element("value").map(str::to_string);
            } else if vocab::is_consumes(annotation) {
                result.consumes = annotation.string_list_element("value");
            } else if vocab::is_produces(annotation) {
                result.produces = annotation.string_list_element("value");
            }
        }

        for field in &class.fields {
            if field.access_flags & ACC_STATIC != 0 {
                continue;
            }
            let mut bound = None;
            let mut default_value = None;
            for annotation in &field.annotations {
                if let Some(kind) = vocab::binding_kind(annotation) {
                    bound = Some((
                        kind,
                        annotation.string_element("value").map(str::to_string),
                    ));
                } else if vocab::is_default_value(annotation) {
                    default_value = annotation.string_element("value").map(str::to_string);
                }
            }
            if let Some((kind, name)) = bound {
                let java_type = parse_type_descriptor(&field.descriptor)
                    .map(|ty| ty.display_name())
                    .unwrap_or_else(|_| field.descriptor.clone());
                let mut binding =
                    ParameterBinding::new(kind, name.or_else(|| Some(field.name.clone())), java_type);
                binding.default_value = default_value;
                result.field_bindings.push(binding);
            }
        }

        for method in &class.methods {
            if !eligible(method) {
                continue;
            }

            let mut method_result =
                MethodResult::new(MethodKey::new(&method.name, &method.descriptor));
            if extract::is_rest_method(self.pool, method) {
                extract::populate_method_result(self.pool, &mut method_result, method, method);
            } else {
                let Some(inherited) = supertype::find_annotated_member(self.pool, &class, method)
                else {
                    continue;
                };
                debug!(
                    class = %class.name,
                    method = %method.name,
                    from = %inherited.owner,
                    "inheriting REST annotations from supertype"
                );
                extract::populate_method_result(
                    self.pool,
                    &mut method_result,
                    &inherited.method,
                    method,
                );
            }

            let interp = InterpContext {
                pool: self.pool,
                iteration_cap: self.iteration_cap,
            };
            let outcome = interpret_method(&interp, &class, method);
            method_result.responses = outcome.responses;
            method_result.invoked = outcome.invoked;

            for target in &method_result.invoked {
                self.registry.enqueue(&target.class);
            }
            result.methods.push(method_result);
        }

        Ok(())
    }
}

/// Constructors, static, native, and compiler-generated methods never
/// carry a REST surface.
fn eligible(method: &Method) -> bool {
    if method.name == "<init>" || method.name == "<clinit>" {
        return false;
    }
    method.access_flags & (ACC_SYNTHETIC | ACC_STATIC | ACC_NATIVE) == 0
}
