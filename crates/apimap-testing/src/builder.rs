use std::path::Path;

use crate::pool::PoolBuilder;

/// An annotation to attach to a class, field, method, or parameter.
#[derive(Clone)]
pub struct AnnotationSpec {
    pub type_descriptor: String,
    pub elements: Vec<(String, ElementSpec)>,
}

#[derive(Clone)]
pub enum ElementSpec {
    Str(String),
    Int(i32),
    Array(Vec<ElementSpec>),
    EnumConst {
        type_descriptor: String,
        name: String,
    },
}

impl AnnotationSpec {
    /// Marker annotation, e.g. `@GET`.
    pub fn marker(type_descriptor: &str) -> Self {
        Self {
            type_descriptor: type_descriptor.to_string(),
            elements: Vec::new(),
        }
    }

    /// Single-`value` string annotation, e.g. `@Path("/users")`.
    pub fn with_value(type_descriptor: &str, value: &str) -> Self {
        Self::marker(type_descriptor).element("value", ElementSpec::Str(value.to_string()))
    }

    /// Single-`value` string-array annotation, e.g. `@Produces({...})`.
    pub fn with_values(type_descriptor: &str, values: &[&str]) -> Self {
        Self::marker(type_descriptor).element(
            "value",
            ElementSpec::Array(
                values
                    .iter()
                    .map(|v| ElementSpec::Str(v.to_string()))
                    .collect(),
            ),
        )
    }

    pub fn element(mut self, name: &str, value: ElementSpec) -> Self {
        self.elements.push((name.to_string(), value));
        self
    }
}

pub struct FieldSpec {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub annotations: Vec<AnnotationSpec>,
}

impl FieldSpec {
    pub fn new(access_flags: u16, name: &str, descriptor: &str) -> Self {
        Self {
            access_flags,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            annotations: Vec::new(),
        }
    }

    pub fn annotation(mut self, annotation: AnnotationSpec) -> Self {
        self.annotations.push(annotation);
        self
    }
}

pub struct MethodSpec {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub annotations: Vec<AnnotationSpec>,
    pub parameter_annotations: Vec<Vec<AnnotationSpec>>,
    pub code: Option<CodeSpec>,
}

pub struct CodeSpec {
    pub max_stack: u16,
    pub max_locals: u16,
    pub bytes: Vec<u8>,
}

impl MethodSpec {
    pub fn new(access_flags: u16, name: &str, descriptor: &str) -> Self {
        Self {
            access_flags,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: None,
            annotations: Vec::new(),
            parameter_annotations: Vec::new(),
            code: None,
        }
    }

    pub fn annotation(mut self, annotation: AnnotationSpec) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn signature(mut self, signature: &str) -> Self {
        self.signature = Some(signature.to_string());
        self
    }

    /// Annotation tables for all parameters at once; pass an empty inner
    /// vec for an unannotated parameter.
    pub fn parameter_annotations(mut self, tables: Vec<Vec<AnnotationSpec>>) -> Self {
        self.parameter_annotations = tables;
        self
    }

    pub fn code(mut self, max_stack: u16, max_locals: u16, bytes: Vec<u8>) -> Self {
        self.code = Some(CodeSpec {
            max_stack,
            max_locals,
            bytes,
        });
        self
    }
}

/// Builds a syntactically valid class file from specs. Only what the
/// analyzer consumes is emitted; stack map frames and debug attributes are
/// omitted (the parser skips them anyway).
pub struct ClassBuilder {
    pub pool: PoolBuilder,
    access_flags: u16,
    name: String,
    super_name: String,
    interfaces: Vec<String>,
    annotations: Vec<AnnotationSpec>,
    fields: Vec<FieldSpec>,
    methods: Vec<MethodSpec>,
    bootstrap_methods: Vec<(u16, Vec<u16>)>,
}

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_SYNTHETIC: u16 = 0x1000;

/// `REF_invokeStatic`, the only method-handle kind fixtures use.
pub const REF_INVOKE_STATIC: u8 = 6;

impl ClassBuilder {
    pub fn new(internal_name: &str) -> Self {
        Self {
            pool: PoolBuilder::default(),
            access_flags: ACC_PUBLIC,
            name: internal_name.to_string(),
            super_name: "java/lang/Object".to_string(),
            interfaces: Vec::new(),
            annotations: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            bootstrap_methods: Vec::new(),
        }
    }

    pub fn interface(internal_name: &str) -> Self {
        let mut builder = Self::new(internal_name);
        builder.access_flags = ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT;
        builder
    }

    pub fn access_flags(mut self, flags: u16) -> Self {
        self.access_flags = flags;
        self
    }

    pub fn super_class(mut self, internal_name: &str) -> Self {
        self.super_name = internal_name.to_string();
        self
    }

    pub fn implements(mut self, internal_name: &str) -> Self {
        self.interfaces.push(internal_name.to_string());
        self
    }

    pub fn annotation(mut self, annotation: AnnotationSpec) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn method(mut self, method: MethodSpec) -> Self {
        self.methods.push(method);
        self
    }

    /// Register a bootstrap method; returns its index for
    /// `PoolBuilder::invoke_dynamic`.
    pub fn bootstrap_method(&mut self, method_handle: u16, arguments: Vec<u16>) -> u16 {
        self.bootstrap_methods.push((method_handle, arguments));
        (self.bootstrap_methods.len() - 1) as u16
    }

    pub fn finish(mut self) -> Vec<u8> {
        let this_class = self.pool.class(&self.name);
        let super_class = self.pool.class(&self.super_name.clone());
        let interfaces: Vec<u16> = self
            .interfaces
            .clone()
            .iter()
            .map(|name| self.pool.class(name))
            .collect();

        let field_blobs: Vec<Vec<u8>> = {
            let fields = std::mem::take(&mut self.fields);
            fields
                .into_iter()
                .map(|f| {
                    let mut blob = Vec::new();
                    blob.extend_from_slice(&f.access_flags.to_be_bytes());
                    let name = self.pool.utf8(&f.name);
                    let descriptor = self.pool.utf8(&f.descriptor);
                    blob.extend_from_slice(&name.to_be_bytes());
                    blob.extend_from_slice(&descriptor.to_be_bytes());
                    let mut attrs = Vec::new();
                    if !f.annotations.is_empty() {
                        attrs.push(self.annotation_attribute(&f.annotations));
                    }
                    write_attributes(&mut blob, &attrs);
                    blob
                })
                .collect()
        };

        let method_blobs: Vec<Vec<u8>> = {
            let methods = std::mem::take(&mut self.methods);
            methods
                .into_iter()
                .map(|m| {
                    let mut blob = Vec::new();
                    blob.extend_from_slice(&m.access_flags.to_be_bytes());
                    let name = self.pool.utf8(&m.name);
                    let descriptor = self.pool.utf8(&m.descriptor);
                    blob.extend_from_slice(&name.to_be_bytes());
                    blob.extend_from_slice(&descriptor.to_be_bytes());

                    let mut attrs = Vec::new();
                    if let Some(code) = &m.code {
                        let mut body = Vec::new();
                        body.extend_from_slice(&code.max_stack.to_be_bytes());
                        body.extend_from_slice(&code.max_locals.to_be_bytes());
                        body.extend_from_slice(&(code.bytes.len() as u32).to_be_bytes());
                        body.extend_from_slice(&code.bytes);
                        body.extend_from_slice(&0u16.to_be_bytes()); // exception table
                        body.extend_from_slice(&0u16.to_be_bytes()); // attributes
                        attrs.push((self.pool.utf8("Code"), body));
                    }
                    if let Some(signature) = &m.signature {
                        let sig = self.pool.utf8(signature);
                        attrs.push((self.pool.utf8("Signature"), sig.to_be_bytes().to_vec()));
                    }
                    if !m.annotations.is_empty() {
                        attrs.push(self.annotation_attribute(&m.annotations));
                    }
                    if !m.parameter_annotations.is_empty() {
                        let mut body = vec![m.parameter_annotations.len() as u8];
                        for table in &m.parameter_annotations {
                            body.extend_from_slice(&(table.len() as u16).to_be_bytes());
                            for annotation in table {
                                self.encode_annotation(annotation, &mut body);
                            }
                        }
                        attrs.push((
                            self.pool.utf8("RuntimeVisibleParameterAnnotations"),
                            body,
                        ));
                    }
                    write_attributes(&mut blob, &attrs);
                    blob
                })
                .collect()
        };

        let mut class_attrs = Vec::new();
        let annotations = std::mem::take(&mut self.annotations);
        if !annotations.is_empty() {
            class_attrs.push(self.annotation_attribute(&annotations));
        }
        if !self.bootstrap_methods.is_empty() {
            let bootstrap = std::mem::take(&mut self.bootstrap_methods);
            let mut body = Vec::new();
            body.extend_from_slice(&(bootstrap.len() as u16).to_be_bytes());
            for (handle, arguments) in &bootstrap {
                body.extend_from_slice(&handle.to_be_bytes());
                body.extend_from_slice(&(arguments.len() as u16).to_be_bytes());
                for argument in arguments {
                    body.extend_from_slice(&argument.to_be_bytes());
                }
            }
            class_attrs.push((self.pool.utf8("BootstrapMethods"), body));
        }

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFEBABEu32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes()); // minor
        out.extend_from_slice(&52u16.to_be_bytes()); // major: Java 8
        self.pool.serialize(&mut out);
        out.extend_from_slice(&self.access_flags.to_be_bytes());
        out.extend_from_slice(&this_class.to_be_bytes());
        out.extend_from_slice(&super_class.to_be_bytes());
        out.extend_from_slice(&(interfaces.len() as u16).to_be_bytes());
        for interface in interfaces {
            out.extend_from_slice(&interface.to_be_bytes());
        }
        out.extend_from_slice(&(field_blobs.len() as u16).to_be_bytes());
        for blob in field_blobs {
            out.extend_from_slice(&blob);
        }
        out.extend_from_slice(&(method_blobs.len() as u16).to_be_bytes());
        for blob in method_blobs {
            out.extend_from_slice(&blob);
        }
        write_attributes(&mut out, &class_attrs);
        out
    }

    fn annotation_attribute(&mut self, annotations: &[AnnotationSpec]) -> (u16, Vec<u8>) {
        let mut body = Vec::new();
        body.extend_from_slice(&(annotations.len() as u16).to_be_bytes());
        for annotation in annotations {
            self.encode_annotation(annotation, &mut body);
        }
        (self.pool.utf8("RuntimeVisibleAnnotations"), body)
    }

    fn encode_annotation(&mut self, annotation: &AnnotationSpec, out: &mut Vec<u8>) {
        let type_index = self.pool.utf8(&annotation.type_descriptor);
        out.extend_from_slice(&type_index.to_be_bytes());
        out.extend_from_slice(&(annotation.elements.len() as u16).to_be_bytes());
        for (name, value) in &annotation.elements {
            let name_index = self.pool.utf8(name);
            out.extend_from_slice(&name_index.to_be_bytes());
            self.encode_element(value, out);
        }
    }

    fn encode_element(&mut self, value: &ElementSpec, out: &mut Vec<u8>) {
        match value {
            ElementSpec::Str(s) => {
                out.push(b's');
                let index = self.pool.utf8(s);
                out.extend_from_slice(&index.to_be_bytes());
            }
            ElementSpec::Int(i) => {
                out.push(b'I');
                let index = self.pool.int(*i);
                out.extend_from_slice(&index.to_be_bytes());
            }
            ElementSpec::Array(values) => {
                out.push(b'[');
                out.extend_from_slice(&(values.len() as u16).to_be_bytes());
                for value in values {
                    self.encode_element(value, out);
                }
            }
            ElementSpec::EnumConst {
                type_descriptor,
                name,
            } => {
                out.push(b'e');
                let type_index = self.pool.utf8(type_descriptor);
                let name_index = self.pool.utf8(name);
                out.extend_from_slice(&type_index.to_be_bytes());
                out.extend_from_slice(&name_index.to_be_bytes());
            }
        }
    }
}

fn write_attributes(out: &mut Vec<u8>, attrs: &[(u16, Vec<u8>)]) {
    out.extend_from_slice(&(attrs.len() as u16).to_be_bytes());
    for (name_index, body) in attrs {
        out.extend_from_slice(&name_index.to_be_bytes());
        out.extend_from_slice(&(body.len() as u32).to_be_bytes());
        out.extend_from_slice(body);
    }
}

/// Write class bytes into `dir` under the conventional
/// `<internal_name>.class` layout.
pub fn write_class_file(dir: &Path, internal_name: &str, bytes: &[u8]) {
    let path = dir.join(format!("{internal_name}.class"));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create fixture package dir");
    }
    std::fs::write(path, bytes).expect("write fixture class");
}
