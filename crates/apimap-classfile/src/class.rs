use crate::annotation::{parse_annotation_table, parse_parameter_annotation_table, Annotation};
use crate::constant_pool::ConstantPool;
use crate::cursor::Cursor;
use crate::error::{Error, Result};

pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_NATIVE: u16 = 0x0100;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_SYNTHETIC: u16 = 0x1000;
pub const ACC_BRIDGE: u16 = 0x0040;

/// A parsed class file. The constant pool is retained because bytecode
/// interpretation resolves call sites and constants through it lazily.
#[derive(Debug, Clone)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub access_flags: u16,
    /// Internal name, e.g. `com/example/UserResource`.
    pub name: String,
    pub super_name: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    pub annotations: Vec<Annotation>,
    pub bootstrap_methods: Vec<BootstrapMethod>,
    pub constant_pool: ConstantPool,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone)]
pub struct Method {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub annotations: Vec<Annotation>,
    /// One annotation table per declared parameter; empty when the method
    /// carries no `RuntimeVisibleParameterAnnotations` attribute.
    pub parameter_annotations: Vec<Vec<Annotation>>,
    pub code: Option<Code>,
}

#[derive(Debug, Clone)]
pub struct Code {
    pub max_stack: u16,
    pub max_locals: u16,
    pub bytes: Vec<u8>,
}

/// One `BootstrapMethods` entry; both fields are constant pool indices
/// (a `MethodHandle` and its static arguments).
#[derive(Debug, Clone)]
pub struct BootstrapMethod {
    pub method_handle: u16,
    pub arguments: Vec<u16>,
}

impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut cur = Cursor::new(bytes);
        let magic = cur.u32()?;
        if magic != 0xCAFEBABE {
            return Err(Error::InvalidMagic(magic));
        }
        let minor_version = cur.u16()?;
        let major_version = cur.u16()?;

        let cp = ConstantPool::parse(&mut cur)?;

        let access_flags = cur.u16()?;
        let name = cp.class_name(cur.u16()?)?.to_string();
        let super_index = cur.u16()?;
        let super_name = if super_index == 0 {
            None
        } else {
            Some(cp.class_name(super_index)?.to_string())
        };

        let interface_count = cur.u16()? as usize;
        let mut interfaces = Vec::with_capacity(interface_count);
        for _ in 0..interface_count {
            interfaces.push(cp.class_name(cur.u16()?)?.to_string());
        }

        let field_count = cur.u16()? as usize;
        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            fields.push(parse_field(&mut cur, &cp)?);
        }

        let method_count = cur.u16()? as usize;
        let mut methods = Vec::with_capacity(method_count);
        for _ in 0..method_count {
            methods.push(parse_method(&mut cur, &cp)?);
        }

        let mut annotations = Vec::new();
        let mut bootstrap_methods = Vec::new();
        let attr_count = cur.u16()? as usize;
        for _ in 0..attr_count {
            let attr_name = cp.utf8(cur.u16()?)?.to_string();
            let len = cur.u32()? as usize;
            let mut body = Cursor::new(cur.take(len)?);
            match attr_name.as_str() {
                "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                    annotations.extend(parse_annotation_table(&mut body, &cp)?);
                }
                "BootstrapMethods" => {
                    let count = body.u16()? as usize;
                    for _ in 0..count {
                        let method_handle = body.u16()?;
                        let arg_count = body.u16()? as usize;
                        let mut arguments = Vec::with_capacity(arg_count);
                        for _ in 0..arg_count {
                            arguments.push(body.u16()?);
                        }
                        bootstrap_methods.push(BootstrapMethod {
                            method_handle,
                            arguments,
                        });
                    }
                    body.expect_end()?;
                }
                _ => {}
            }
        }

        cur.expect_end()?;

        Ok(Self {
            minor_version,
            major_version,
            access_flags,
            name,
            super_name,
            interfaces,
            fields,
            methods,
            annotations,
            bootstrap_methods,
            constant_pool: cp,
        })
    }

    /// Dot-separated binary name (`com.example.UserResource`).
    pub fn binary_name(&self) -> String {
        self.name.replace('/', ".")
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags & ACC_INTERFACE != 0
    }

    pub fn method(&self, name: &str, descriptor: &str) -> Option<&Method> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.descriptor == descriptor)
    }
}

fn parse_field(cur: &mut Cursor<'_>, cp: &ConstantPool) -> Result<Field> {
    let access_flags = cur.u16()?;
    let name = cp.utf8(cur.u16()?)?.to_string();
    let descriptor = cp.utf8(cur.u16()?)?.to_string();

    let mut signature = None;
    let mut annotations = Vec::new();
    let attr_count = cur.u16()? as usize;
    for _ in 0..attr_count {
        let attr_name = cp.utf8(cur.u16()?)?.to_string();
        let len = cur.u32()? as usize;
        let mut body = Cursor::new(cur.take(len)?);
        match attr_name.as_str() {
            "Signature" => signature = Some(cp.utf8(body.u16()?)?.to_string()),
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                annotations.extend(parse_annotation_table(&mut body, cp)?);
            }
            _ => {}
        }
    }

    Ok(Field {
        access_flags,
        name,
        descriptor,
        signature,
        annotations,
    })
}

fn parse_method(cur: &mut Cursor<'_>, cp: &ConstantPool) -> Result<Method> {
    let access_flags = cur.u16()?;
    let name = cp.utf8(cur.u16()?)?.to_string();
    let descriptor = cp.utf8(cur.u16()?)?.to_string();

    let mut signature = None;
    let mut annotations = Vec::new();
    let mut parameter_annotations = Vec::new();
    let mut code = None;
    let attr_count = cur.u16()? as usize;
    for _ in 0..attr_count {
        let attr_name = cp.utf8(cur.u16()?)?.to_string();
        let len = cur.u32()? as usize;
        let mut body = Cursor::new(cur.take(len)?);
        match attr_name.as_str() {
            "Signature" => signature = Some(cp.utf8(body.u16()?)?.to_string()),
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                annotations.extend(parse_annotation_table(&mut body, cp)?);
            }
            "RuntimeVisibleParameterAnnotations" | "RuntimeInvisibleParameterAnnotations" => {
                let tables = parse_parameter_annotation_table(&mut body, cp)?;
                if parameter_annotations.is_empty() {
                    parameter_annotations = tables;
                } else {
                    for (slot, extra) in parameter_annotations.iter_mut().zip(tables) {
                        slot.extend(extra);
                    }
                }
            }
            "Code" => code = Some(parse_code(&mut body)?),
            _ => {}
        }
    }

    Ok(Method {
        access_flags,
        name,
        descriptor,
        signature,
        annotations,
        parameter_annotations,
        code,
    })
}

fn parse_code(body: &mut Cursor<'_>) -> Result<Code> {
    let max_stack = body.u16()?;
    let max_locals = body.u16()?;
    let code_length = body.u32()? as usize;
    let bytes = body.take(code_length)?.to_vec();

    // Exception table and nested attributes (line numbers, stack map
    // frames) carry nothing the analysis consumes.
    let exception_count = body.u16()? as usize;
    body.skip(exception_count * 8)?;
    let attr_count = body.u16()? as usize;
    for _ in 0..attr_count {
        body.skip(2)?;
        let len = body.u32()? as usize;
        body.skip(len)?;
    }

    Ok(Code {
        max_stack,
        max_locals,
        bytes,
    })
}
