//! End-to-end analysis over synthesized class files: root discovery,
//! inheritance, bytecode response inference, and resource assembly.

use std::collections::BTreeSet;
use std::path::Path;

use apimap_analysis::{AnalysisRequest, RestAnalyzer};
use apimap_model::{BindingKind, HttpResponse, HttpVerb, ResourceEntry, Resources};
use apimap_testing::{
    write_class_file, AnnotationSpec, ClassBuilder, CodeAsm, MethodSpec, ACC_ABSTRACT, ACC_PUBLIC,
    ACC_STATIC, REF_INVOKE_STATIC,
};
use pretty_assertions::assert_eq;

const RESPONSE: &str = "javax/ws/rs/core/Response";
const BUILDER: &str = "javax/ws/rs/core/Response$ResponseBuilder";
const STATUS: &str = "javax/ws/rs/core/Response$Status";

const RESPONSE_DESC: &str = "Ljavax/ws/rs/core/Response;";
const BUILDER_DESC: &str = "Ljavax/ws/rs/core/Response$ResponseBuilder;";

fn analyze(dir: &Path) -> Resources {
    analyze_with_deps(dir, &[])
}

fn analyze_with_deps(dir: &Path, deps: &[&Path]) -> Resources {
    let analyzer = RestAnalyzer::new().without_platform_classpath();
    let request = AnalysisRequest {
        project_class_paths: vec![dir.to_path_buf()],
        dependency_class_paths: deps.iter().map(|p| p.to_path_buf()).collect(),
        ..AnalysisRequest::default()
    };
    analyzer.analyze(&request).expect("analysis succeeds")
}

fn entry<'a>(resources: &'a Resources, template: &str, verb: HttpVerb) -> &'a ResourceEntry {
    resources
        .entries
        .iter()
        .find(|e| e.template == template && e.verb == verb)
        .unwrap_or_else(|| panic!("no entry {verb} {template} in {resources:?}"))
}

fn statuses(response: &HttpResponse) -> Vec<u16> {
    response.statuses.iter().copied().collect()
}

/// S1: a plain resource method returning a string.
#[test]
fn simple_string_resource() {
    let tmp = tempfile::tempdir().unwrap();
    let mut body = CodeAsm::new();
    let mut builder = ClassBuilder::new("com/acme/Users");
    let greeting = builder.pool.string("all users");
    body.ldc(greeting).areturn();

    let bytes = builder
        .annotation(AnnotationSpec::with_value("Ljavax/ws/rs/Path;", "/users"))
        .method(
            MethodSpec::new(ACC_PUBLIC, "list", "()Ljava/lang/String;")
                .annotation(AnnotationSpec::marker("Ljavax/ws/rs/GET;"))
                .code(1, 1, body.finish()),
        )
        .finish();
    write_class_file(tmp.path(), "com/acme/Users", &bytes);

    let resources = analyze(tmp.path());
    assert_eq!(resources.application_path, "/");
    assert_eq!(resources.entries.len(), 1);

    let found = entry(&resources, "/users", HttpVerb::Get);
    assert_eq!(found.response_media_types, vec!["*/*".to_string()]);
    assert_eq!(found.responses.len(), 1);
    assert_eq!(statuses(&found.responses[0]), vec![200]);
    assert_eq!(
        found.responses[0].entity_type.as_deref(),
        Some("java.lang.String")
    );
}

/// S2: verb and path declared on an interface; the interface is the
/// annotated root and its abstract method falls back to the declared
/// return type.
#[test]
fn verbed_interface_is_a_resource() {
    let tmp = tempfile::tempdir().unwrap();
    let bytes = ClassBuilder::interface("com/acme/IOrders")
        .annotation(AnnotationSpec::with_value("Ljavax/ws/rs/Path;", "/orders"))
        .method(
            MethodSpec::new(ACC_PUBLIC | ACC_ABSTRACT, "all", "()Ljavax/ws/rs/core/Response;")
                .annotation(AnnotationSpec::marker("Ljavax/ws/rs/GET;")),
        )
        .finish();
    write_class_file(tmp.path(), "com/acme/IOrders", &bytes);

    let resources = analyze(tmp.path());
    let found = entry(&resources, "/orders", HttpVerb::Get);
    assert_eq!(found.responses.len(), 1);
    assert_eq!(statuses(&found.responses[0]), vec![200]);
    assert_eq!(found.responses[0].entity_type, None);
}

/// Property 6: an implementation without annotations inherits the verb
/// from the interface member it overrides.
#[test]
fn bare_override_inherits_interface_annotations() {
    let tmp = tempfile::tempdir().unwrap();

    let iface = ClassBuilder::interface("com/acme/Contract")
        .method(
            MethodSpec::new(ACC_PUBLIC | ACC_ABSTRACT, "fetch", "()Ljava/lang/String;")
                .annotation(AnnotationSpec::marker("Ljavax/ws/rs/GET;"))
                .annotation(AnnotationSpec::with_value("Ljavax/ws/rs/Path;", "/items")),
        )
        .finish();
    write_class_file(tmp.path(), "com/acme/Contract", &iface);

    let mut body = CodeAsm::new();
    body.aconst_null().areturn();
    let impl_bytes = ClassBuilder::new("com/acme/Store")
        .implements("com/acme/Contract")
        .annotation(AnnotationSpec::with_value("Ljavax/ws/rs/Path;", "/store"))
        .method(
            MethodSpec::new(ACC_PUBLIC, "fetch", "()Ljava/lang/String;").code(1, 1, body.finish()),
        )
        .finish();
    write_class_file(tmp.path(), "com/acme/Store", &impl_bytes);

    let resources = analyze(tmp.path());
    let found = entry(&resources, "/store/items", HttpVerb::Get);
    assert_eq!(statuses(&found.responses[0]), vec![200]);
}

/// The cross-location variant: the annotated interface lives in a
/// dependency location and is never scanned for roots, yet its
/// annotations still propagate to the project-scope implementation.
#[test]
fn inherits_across_pool_locations() {
    let project = tempfile::tempdir().unwrap();
    let deps = tempfile::tempdir().unwrap();

    let iface = ClassBuilder::interface("ext/api/OrderApi")
        .method(
            MethodSpec::new(ACC_PUBLIC | ACC_ABSTRACT, "all", "()Ljavax/ws/rs/core/Response;")
                .annotation(AnnotationSpec::marker("Ljakarta/ws/rs/GET;")),
        )
        .finish();
    write_class_file(deps.path(), "ext/api/OrderApi", &iface);

    let mut body = CodeAsm::new();
    body.aconst_null().areturn();
    let impl_bytes = ClassBuilder::new("com/acme/Orders")
        .implements("ext/api/OrderApi")
        .annotation(AnnotationSpec::with_value("Ljakarta/ws/rs/Path;", "/orders"))
        .method(
            MethodSpec::new(ACC_PUBLIC, "all", "()Ljavax/ws/rs/core/Response;")
                .code(1, 1, body.finish()),
        )
        .finish();
    write_class_file(project.path(), "com/acme/Orders", &impl_bytes);

    let resources = analyze_with_deps(project.path(), &[deps.path()]);
    let found = entry(&resources, "/orders", HttpVerb::Get);
    assert_eq!(statuses(&found.responses[0]), vec![200]);

    // The dependency interface itself must not surface as a resource.
    assert_eq!(resources.entries.len(), 1);
}

/// S3: `Response.status(ACCEPTED).header("X-Test", "hi").build()`.
#[test]
fn builder_status_and_header_inference() {
    let tmp = tempfile::tempdir().unwrap();
    let mut builder = ClassBuilder::new("com/acme/Jobs");

    let accepted = builder
        .pool
        .field_ref(STATUS, "ACCEPTED", "Ljavax/ws/rs/core/Response$Status;");
    let status = builder.pool.method_ref(
        RESPONSE,
        "status",
        &format!("(Ljavax/ws/rs/core/Response$Status;){BUILDER_DESC}"),
    );
    let header_name = builder.pool.string("X-Test");
    let header_value = builder.pool.string("hi");
    let header = builder.pool.method_ref(
        BUILDER,
        "header",
        &format!("(Ljava/lang/String;Ljava/lang/Object;){BUILDER_DESC}"),
    );
    let build = builder
        .pool
        .method_ref(BUILDER, "build", &format!("(){RESPONSE_DESC}"));

    let mut body = CodeAsm::new();
    body.getstatic(accepted)
        .invokestatic(status)
        .ldc(header_name)
        .ldc(header_value)
        .invokevirtual(header)
        .invokevirtual(build)
        .areturn();

    let bytes = builder
        .annotation(AnnotationSpec::with_value("Ljavax/ws/rs/Path;", "/jobs"))
        .method(
            MethodSpec::new(ACC_PUBLIC, "submit", &format!("(){RESPONSE_DESC}"))
                .annotation(AnnotationSpec::marker("Ljavax/ws/rs/POST;"))
                .code(3, 1, body.finish()),
        )
        .finish();
    write_class_file(tmp.path(), "com/acme/Jobs", &bytes);

    let resources = analyze(tmp.path());
    let found = entry(&resources, "/jobs", HttpVerb::Post);
    assert_eq!(found.responses.len(), 1);
    assert_eq!(statuses(&found.responses[0]), vec![202]);
    let headers: Vec<&str> = found.responses[0].headers.iter().map(String::as_str).collect();
    assert_eq!(headers, vec!["X-Test"]);
}

/// S4: the body returns whatever a captured method reference produces.
#[test]
fn method_reference_body() {
    let tmp = tempfile::tempdir().unwrap();
    let mut builder = ClassBuilder::new("com/acme/Deferred");

    let status_int = builder
        .pool
        .method_ref(RESPONSE, "status", &format!("(I){BUILDER_DESC}"));
    let build = builder
        .pool
        .method_ref(BUILDER, "build", &format!("(){RESPONSE_DESC}"));

    let mut helper_body = CodeAsm::new();
    helper_body
        .iconst(202)
        .invokestatic(status_int)
        .invokevirtual(build)
        .areturn();

    let helper_ref =
        builder
            .pool
            .method_ref("com/acme/Deferred", "helper", &format!("(){RESPONSE_DESC}"));
    let impl_handle = builder.pool.method_handle(REF_INVOKE_STATIC, helper_ref);
    let metafactory_ref = builder.pool.method_ref(
        "java/lang/invoke/LambdaMetafactory",
        "metafactory",
        "(Ljava/lang/invoke/MethodHandles$Lookup;Ljava/lang/String;Ljava/lang/invoke/MethodType;Ljava/lang/invoke/MethodType;Ljava/lang/invoke/MethodHandle;Ljava/lang/invoke/MethodType;)Ljava/lang/invoke/CallSite;",
    );
    let metafactory = builder.pool.method_handle(REF_INVOKE_STATIC, metafactory_ref);
    let bootstrap = builder.bootstrap_method(metafactory, vec![impl_handle]);
    let indy = builder
        .pool
        .invoke_dynamic(bootstrap, "get", "()Ljava/util/function/Supplier;");
    let sam_get = builder.pool.interface_method_ref(
        "java/util/function/Supplier",
        "get",
        "()Ljava/lang/Object;",
    );
    let response_class = builder.pool.class(RESPONSE);

    let mut body = CodeAsm::new();
    body.invokedynamic(indy)
        .invokeinterface(sam_get, 1)
        .checkcast(response_class)
        .areturn();

    let bytes = builder
        .annotation(AnnotationSpec::with_value("Ljavax/ws/rs/Path;", "/deferred"))
        .method(
            MethodSpec::new(ACC_PUBLIC | ACC_STATIC, "helper", &format!("(){RESPONSE_DESC}"))
                .code(2, 0, helper_body.finish()),
        )
        .method(
            MethodSpec::new(ACC_PUBLIC, "run", &format!("(){RESPONSE_DESC}"))
                .annotation(AnnotationSpec::marker("Ljavax/ws/rs/GET;"))
                .code(2, 1, body.finish()),
        )
        .finish();
    write_class_file(tmp.path(), "com/acme/Deferred", &bytes);

    let resources = analyze(tmp.path());
    let found = entry(&resources, "/deferred", HttpVerb::Get);
    assert_eq!(found.responses.len(), 1);
    assert_eq!(statuses(&found.responses[0]), vec![202]);
}

/// S5: each return site contributes its own response shape.
#[test]
fn branching_produces_two_responses() {
    let tmp = tempfile::tempdir().unwrap();
    let mut builder = ClassBuilder::new("com/acme/Lookup");

    let ok_entity = builder.pool.method_ref(
        RESPONSE,
        "ok",
        &format!("(Ljava/lang/Object;){BUILDER_DESC}"),
    );
    let status_int = builder
        .pool
        .method_ref(RESPONSE, "status", &format!("(I){BUILDER_DESC}"));
    let build = builder
        .pool
        .method_ref(BUILDER, "build", &format!("(){RESPONSE_DESC}"));
    let payload = builder.pool.string("payload");

    // iload_1; ifeq -> else; ldc; Response.ok(..).build(); areturn;
    // else: sipush 404; Response.status(..).build(); areturn
    let mut body = CodeAsm::new();
    body.iload(1).ifeq(12);
    body.ldc(payload)
        .invokestatic(ok_entity)
        .invokevirtual(build)
        .areturn();
    body.iconst(404)
        .invokestatic(status_int)
        .invokevirtual(build)
        .areturn();

    let bytes = builder
        .annotation(AnnotationSpec::with_value("Ljavax/ws/rs/Path;", "/lookup"))
        .method(
            MethodSpec::new(ACC_PUBLIC, "find", &format!("(Z){RESPONSE_DESC}"))
                .annotation(AnnotationSpec::marker("Ljavax/ws/rs/GET;"))
                .code(2, 2, body.finish()),
        )
        .finish();
    write_class_file(tmp.path(), "com/acme/Lookup", &bytes);

    let resources = analyze(tmp.path());
    let found = entry(&resources, "/lookup", HttpVerb::Get);
    assert_eq!(found.responses.len(), 2);

    let ok = found
        .responses
        .iter()
        .find(|r| r.statuses.contains(&200))
        .expect("ok branch");
    assert_eq!(ok.entity_type.as_deref(), Some("java.lang.String"));

    let not_found = found
        .responses
        .iter()
        .find(|r| r.statuses.contains(&404))
        .expect("404 branch");
    assert_eq!(not_found.entity_type, None);
}

/// S6: application path, class path, and method path concatenate into a
/// normalized template.
#[test]
fn application_and_path_composition() {
    let tmp = tempfile::tempdir().unwrap();

    let app = ClassBuilder::new("com/acme/Api")
        .super_class("javax/ws/rs/core/Application")
        .annotation(AnnotationSpec::with_value(
            "Ljavax/ws/rs/ApplicationPath;",
            "/api/",
        ))
        .finish();
    write_class_file(tmp.path(), "com/acme/Api", &app);

    let mut body = CodeAsm::new();
    body.aconst_null().areturn();
    let resource = ClassBuilder::new("com/acme/UserResource")
        .annotation(AnnotationSpec::with_value("Ljavax/ws/rs/Path;", "v1/users/"))
        .method(
            MethodSpec::new(ACC_PUBLIC, "byId", "(Ljava/lang/String;)Ljava/lang/String;")
                .annotation(AnnotationSpec::marker("Ljavax/ws/rs/GET;"))
                .annotation(AnnotationSpec::with_value("Ljavax/ws/rs/Path;", "/{id}"))
                .parameter_annotations(vec![vec![AnnotationSpec::with_value(
                    "Ljavax/ws/rs/PathParam;",
                    "id",
                )]])
                .code(1, 2, body.finish()),
        )
        .finish();
    write_class_file(tmp.path(), "com/acme/UserResource", &resource);

    let resources = analyze(tmp.path());
    assert_eq!(resources.application_path, "/api");
    let found = entry(&resources, "/api/v1/users/{id}", HttpVerb::Get);
    assert_eq!(found.parameters.len(), 1);
    assert_eq!(found.parameters[0].kind, BindingKind::Path);
    assert_eq!(found.parameters[0].name.as_deref(), Some("id"));

    // Property 1: no `//`, no trailing slash.
    for entry in &resources.entries {
        assert!(!entry.template.contains("//"), "{}", entry.template);
        assert!(
            entry.template == "/" || !entry.template.ends_with('/'),
            "{}",
            entry.template
        );
    }
}

/// Property 2: k verb annotations expand into k entries with the same
/// template; a custom annotation meta-annotated `@HttpMethod` with an
/// already-present value does not add a third.
#[test]
fn multi_verb_expansion_and_value_dedup() {
    let tmp = tempfile::tempdir().unwrap();

    // Custom annotation type: @interface Fetch, meta-annotated
    // @HttpMethod("GET").
    let custom = ClassBuilder::interface("com/acme/Fetch")
        .annotation(AnnotationSpec::with_value("Ljavax/ws/rs/HttpMethod;", "GET"))
        .finish();
    write_class_file(tmp.path(), "com/acme/Fetch", &custom);

    let mut body = CodeAsm::new();
    body.aconst_null().areturn();
    let resource = ClassBuilder::new("com/acme/Multi")
        .annotation(AnnotationSpec::with_value("Ljavax/ws/rs/Path;", "/multi"))
        .method(
            MethodSpec::new(ACC_PUBLIC, "run", "()Ljava/lang/String;")
                .annotation(AnnotationSpec::marker("Ljavax/ws/rs/GET;"))
                .annotation(AnnotationSpec::marker("Ljavax/ws/rs/POST;"))
                .annotation(AnnotationSpec::marker("Lcom/acme/Fetch;"))
                .code(1, 1, body.finish()),
        )
        .finish();
    write_class_file(tmp.path(), "com/acme/Multi", &resource);

    let resources = analyze(tmp.path());
    let verbs: BTreeSet<HttpVerb> = resources
        .entries
        .iter()
        .filter(|e| e.template == "/multi")
        .map(|e| e.verb)
        .collect();
    assert_eq!(verbs, BTreeSet::from([HttpVerb::Get, HttpVerb::Post]));
    assert_eq!(resources.entries.len(), 2);
}

/// A custom HTTP-method annotation with a new value contributes its verb.
#[test]
fn custom_http_method_annotation() {
    let tmp = tempfile::tempdir().unwrap();

    let custom = ClassBuilder::interface("com/acme/Patchy")
        .annotation(AnnotationSpec::with_value(
            "Ljakarta/ws/rs/HttpMethod;",
            "PATCH",
        ))
        .finish();
    write_class_file(tmp.path(), "com/acme/Patchy", &custom);

    let mut body = CodeAsm::new();
    body.aconst_null().areturn();
    let resource = ClassBuilder::new("com/acme/Patches")
        .annotation(AnnotationSpec::with_value("Ljakarta/ws/rs/Path;", "/patches"))
        .method(
            MethodSpec::new(ACC_PUBLIC, "apply", "()Ljava/lang/String;")
                .annotation(AnnotationSpec::marker("Lcom/acme/Patchy;"))
                .code(1, 1, body.finish()),
        )
        .finish();
    write_class_file(tmp.path(), "com/acme/Patches", &resource);

    let resources = analyze(tmp.path());
    entry(&resources, "/patches", HttpVerb::Patch);
}

/// Responses of a project-local callee substitute at the call site, and
/// the callee's class joins the analysis queue.
#[test]
fn project_call_target_substitution() {
    let tmp = tempfile::tempdir().unwrap();

    let mut helper_builder = ClassBuilder::new("com/acme/Failing");
    let status_int = helper_builder
        .pool
        .method_ref(RESPONSE, "status", &format!("(I){BUILDER_DESC}"));
    let build = helper_builder
        .pool
        .method_ref(BUILDER, "build", &format!("(){RESPONSE_DESC}"));
    let mut helper_body = CodeAsm::new();
    helper_body
        .iconst(503)
        .invokestatic(status_int)
        .invokevirtual(build)
        .areturn();
    let helper = helper_builder
        .method(
            MethodSpec::new(ACC_PUBLIC | ACC_STATIC, "respond", &format!("(){RESPONSE_DESC}"))
                .code(2, 0, helper_body.finish()),
        )
        .finish();
    write_class_file(tmp.path(), "com/acme/Failing", &helper);

    let mut builder = ClassBuilder::new("com/acme/Gateway");
    let callee = builder
        .pool
        .method_ref("com/acme/Failing", "respond", &format!("(){RESPONSE_DESC}"));
    let mut body = CodeAsm::new();
    body.invokestatic(callee).areturn();
    let resource = builder
        .annotation(AnnotationSpec::with_value("Ljavax/ws/rs/Path;", "/gateway"))
        .method(
            MethodSpec::new(ACC_PUBLIC, "proxy", &format!("(){RESPONSE_DESC}"))
                .annotation(AnnotationSpec::marker("Ljavax/ws/rs/GET;"))
                .code(1, 1, body.finish()),
        )
        .finish();
    write_class_file(tmp.path(), "com/acme/Gateway", &resource);

    let resources = analyze(tmp.path());
    let found = entry(&resources, "/gateway", HttpVerb::Get);
    assert_eq!(found.responses.len(), 1);
    assert_eq!(statuses(&found.responses[0]), vec![503]);
}

/// Field-level bindings apply to the class's methods; `@Context` and the
/// entity parameter stay out of the parameter list.
#[test]
fn field_bindings_and_entity_parameter() {
    let tmp = tempfile::tempdir().unwrap();

    let mut body = CodeAsm::new();
    body.aconst_null().areturn();
    let bytes = ClassBuilder::new("com/acme/Filtered")
        .annotation(AnnotationSpec::with_value("Ljavax/ws/rs/Path;", "/filtered"))
        .field(
            apimap_testing::FieldSpec::new(0, "tenant", "Ljava/lang/String;")
                .annotation(AnnotationSpec::with_value("Ljavax/ws/rs/HeaderParam;", "X-Tenant")),
        )
        .method(
            MethodSpec::new(
                ACC_PUBLIC,
                "create",
                "(Ljavax/ws/rs/core/UriInfo;Lcom/acme/Payload;)Ljava/lang/String;",
            )
            .annotation(AnnotationSpec::marker("Ljavax/ws/rs/POST;"))
            .parameter_annotations(vec![
                vec![AnnotationSpec::marker("Ljavax/ws/rs/core/Context;")],
                vec![],
            ])
            .code(1, 3, body.finish()),
        )
        .finish();
    write_class_file(tmp.path(), "com/acme/Filtered", &bytes);

    let resources = analyze(tmp.path());
    let found = entry(&resources, "/filtered", HttpVerb::Post);
    assert_eq!(found.request_body_type.as_deref(), Some("com.acme.Payload"));
    assert_eq!(found.parameters.len(), 1);
    assert_eq!(found.parameters[0].kind, BindingKind::Header);
    assert_eq!(found.parameters[0].name.as_deref(), Some("X-Tenant"));
}

/// Property 3: adding an unrelated class does not disturb existing
/// entries. Property 4: analysis is deterministic.
#[test]
fn pool_monotonicity_and_determinism() {
    let tmp = tempfile::tempdir().unwrap();

    let mut body = CodeAsm::new();
    body.aconst_null().areturn();
    let bytes = ClassBuilder::new("com/acme/Stable")
        .annotation(AnnotationSpec::with_value("Ljavax/ws/rs/Path;", "/stable"))
        .method(
            MethodSpec::new(ACC_PUBLIC, "get", "()Ljava/lang/String;")
                .annotation(AnnotationSpec::marker("Ljavax/ws/rs/GET;"))
                .code(1, 1, body.finish()),
        )
        .finish();
    write_class_file(tmp.path(), "com/acme/Stable", &bytes);

    let before = analyze(tmp.path());
    let again = analyze(tmp.path());
    assert_eq!(before, again);

    let unrelated = ClassBuilder::new("com/acme/Unrelated").finish();
    write_class_file(tmp.path(), "com/acme/Unrelated", &unrelated);
    let after = analyze(tmp.path());
    assert_eq!(before, after);
}

/// Property 5: inferred statuses stay in `[100, 599]` plus the unknown
/// sentinel `0`, exercised through a non-literal status argument.
#[test]
fn non_literal_status_becomes_sentinel() {
    let tmp = tempfile::tempdir().unwrap();
    let mut builder = ClassBuilder::new("com/acme/Opaque");

    let status_int = builder
        .pool
        .method_ref(RESPONSE, "status", &format!("(I){BUILDER_DESC}"));
    let build = builder
        .pool
        .method_ref(BUILDER, "build", &format!("(){RESPONSE_DESC}"));

    // The status comes in as a method parameter, not a literal.
    let mut body = CodeAsm::new();
    body.iload(1)
        .invokestatic(status_int)
        .invokevirtual(build)
        .areturn();

    let bytes = builder
        .annotation(AnnotationSpec::with_value("Ljavax/ws/rs/Path;", "/opaque"))
        .method(
            MethodSpec::new(ACC_PUBLIC, "passthrough", &format!("(I){RESPONSE_DESC}"))
                .annotation(AnnotationSpec::marker("Ljavax/ws/rs/GET;"))
                .code(2, 2, body.finish()),
        )
        .finish();
    write_class_file(tmp.path(), "com/acme/Opaque", &bytes);

    let resources = analyze(tmp.path());
    let found = entry(&resources, "/opaque", HttpVerb::Get);
    for response in &found.responses {
        for status in &response.statuses {
            assert!(*status == 0 || (100..=599).contains(status), "{status}");
        }
    }
    assert!(found.responses[0].statuses.contains(&0));
}

/// Void resource methods report 204.
#[test]
fn void_method_is_no_content() {
    let tmp = tempfile::tempdir().unwrap();

    let mut body = CodeAsm::new();
    body.vreturn();
    let bytes = ClassBuilder::new("com/acme/Sink")
        .annotation(AnnotationSpec::with_value("Ljavax/ws/rs/Path;", "/sink"))
        .method(
            MethodSpec::new(ACC_PUBLIC, "drop", "()V")
                .annotation(AnnotationSpec::marker("Ljavax/ws/rs/DELETE;"))
                .code(0, 1, body.finish()),
        )
        .finish();
    write_class_file(tmp.path(), "com/acme/Sink", &bytes);

    let resources = analyze(tmp.path());
    let found = entry(&resources, "/sink", HttpVerb::Delete);
    assert_eq!(statuses(&found.responses[0]), vec![204]);
    assert_eq!(found.responses[0].entity_type, None);
}

/// Class-level media types apply unless the method overrides them.
#[test]
fn media_type_inheritance() {
    let tmp = tempfile::tempdir().unwrap();

    let mut body_a = CodeAsm::new();
    body_a.aconst_null().areturn();
    let mut body_b = CodeAsm::new();
    body_b.aconst_null().areturn();
    let bytes = ClassBuilder::new("com/acme/Media")
        .annotation(AnnotationSpec::with_value("Ljavax/ws/rs/Path;", "/media"))
        .annotation(AnnotationSpec::with_values(
            "Ljavax/ws/rs/Produces;",
            &["application/json"],
        ))
        .method(
            MethodSpec::new(ACC_PUBLIC, "asJson", "()Ljava/lang/String;")
                .annotation(AnnotationSpec::marker("Ljavax/ws/rs/GET;"))
                .code(1, 1, body_a.finish()),
        )
        .method(
            MethodSpec::new(ACC_PUBLIC, "asText", "()Ljava/lang/String;")
                .annotation(AnnotationSpec::marker("Ljavax/ws/rs/POST;"))
                .annotation(AnnotationSpec::with_values(
                    "Ljavax/ws/rs/Produces;",
                    &["text/plain"],
                ))
                .code(1, 1, body_b.finish()),
        )
        .finish();
    write_class_file(tmp.path(), "com/acme/Media", &bytes);

    let resources = analyze(tmp.path());
    assert_eq!(
        entry(&resources, "/media", HttpVerb::Get).response_media_types,
        vec!["application/json".to_string()]
    );
    assert_eq!(
        entry(&resources, "/media", HttpVerb::Post).response_media_types,
        vec!["text/plain".to_string()]
    );
}
