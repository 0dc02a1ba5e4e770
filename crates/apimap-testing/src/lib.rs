#![forbid(unsafe_code)]

//! Test support: synthesize compiled class files programmatically so
//! integration tests do not depend on a Java toolchain. The emitted bytes
//! carry exactly the structures the analyzer consumes (constant pool,
//! runtime annotations, parameter annotations, `Code`, `BootstrapMethods`).

mod asm;
mod builder;
mod pool;

pub use crate::asm::CodeAsm;
pub use crate::builder::{
    write_class_file, AnnotationSpec, ClassBuilder, CodeSpec, ElementSpec, FieldSpec, MethodSpec,
    ACC_ABSTRACT, ACC_INTERFACE, ACC_PUBLIC, ACC_STATIC, ACC_SYNTHETIC, REF_INVOKE_STATIC,
};
pub use crate::pool::PoolBuilder;
