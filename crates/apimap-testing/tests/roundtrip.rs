use apimap_classfile::{ClassFile, Insn};
use apimap_testing::{AnnotationSpec, ClassBuilder, CodeAsm, MethodSpec, ACC_PUBLIC};

#[test]
fn built_class_parses_back() {
    let mut asm = CodeAsm::new();
    asm.iconst(202).ireturn();

    let bytes = ClassBuilder::new("com/example/Fixture")
        .annotation(AnnotationSpec::with_value("Ljavax/ws/rs/Path;", "/fixtures"))
        .method(
            MethodSpec::new(ACC_PUBLIC, "status", "()I")
                .annotation(AnnotationSpec::marker("Ljavax/ws/rs/GET;"))
                .code(1, 1, asm.finish()),
        )
        .finish();

    let class = ClassFile::parse(&bytes).unwrap();
    assert_eq!(class.name, "com/example/Fixture");
    assert_eq!(class.super_name.as_deref(), Some("java/lang/Object"));
    assert_eq!(
        class.annotations[0].type_name(),
        Some("javax/ws/rs/Path")
    );
    assert_eq!(
        class.annotations[0].string_element("value"),
        Some("/fixtures")
    );

    let method = class.method("status", "()I").unwrap();
    assert_eq!(method.annotations[0].type_name(), Some("javax/ws/rs/GET"));
    let code = method.code.as_ref().unwrap();
    let insns: Vec<Insn> = apimap_classfile::decode(&code.bytes)
        .unwrap()
        .into_iter()
        .map(|(_, insn)| insn)
        .collect();
    assert_eq!(
        insns,
        vec![Insn::ConstI(202), Insn::Return(Some(apimap_classfile::VarKind::Int))]
    );
}

#[test]
fn parameter_annotations_round_trip() {
    let bytes = ClassBuilder::new("com/example/Params")
        .method(
            MethodSpec::new(
                ACC_PUBLIC,
                "find",
                "(Ljava/lang/String;Ljava/lang/String;)Ljava/lang/String;",
            )
            .parameter_annotations(vec![
                vec![AnnotationSpec::with_value("Ljavax/ws/rs/PathParam;", "id")],
                vec![],
            ]),
        )
        .finish();

    let class = ClassFile::parse(&bytes).unwrap();
    let method = &class.methods[0];
    assert_eq!(method.parameter_annotations.len(), 2);
    assert_eq!(
        method.parameter_annotations[0][0].string_element("value"),
        Some("id")
    );
    assert!(method.parameter_annotations[1].is_empty());
}
