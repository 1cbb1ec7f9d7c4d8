#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use super::*;
use crate::descriptor::{Describe, RecordDescriptor, ScalarKind, TypeDescriptor};
use crate::handler::{HandlerDescriptor, HttpMethod};
use std::collections::HashMap;
use std::time::SystemTime;

fn scalar(kind: ScalarKind) -> TypeDescriptor {
    TypeDescriptor::Scalar(kind)
}

fn record(name: &str) -> RecordDescriptor {
    RecordDescriptor::new(name)
}

fn handler(name: &str, request: RecordDescriptor, response: RecordDescriptor) -> HandlerDescriptor {
    HandlerDescriptor::new(
        name,
        TypeDescriptor::Record(request),
        TypeDescriptor::Record(response),
        HttpMethod::Post,
        format!("/{}", name.to_lowercase()),
    )
    .unwrap()
}

fn names(records: &[RecordDescriptor]) -> Vec<&str> {
    records.iter().map(|r| r.name.as_str()).collect()
}

fn widget_service() -> ServiceDescriptor {
    let request = record("Request").field("id", scalar(ScalarKind::Int32));
    let response = record("Response").field("name", scalar(ScalarKind::Text));
    let get_widget = HandlerDescriptor::new(
        "GetWidget",
        TypeDescriptor::Record(request),
        TypeDescriptor::Record(response),
        HttpMethod::Get,
        "/widgets/{id}",
    )
    .unwrap();
    let mut info = ServiceInfo::new("Widget Service");
    info.package_path = "acme".to_string();
    info.go_package = "github.com/acme/widgets/gen".to_string();
    ServiceDescriptor::new(info, vec![get_widget], &WellKnownTypes::default()).unwrap()
}

// --- wire types -----------------------------------------------------------

#[test]
fn test_scalar_table() {
    let well_known = WellKnownTypes::default();
    let mapper = WireTypeMapper::new(&well_known);
    let cases = [
        (ScalarKind::Int8, "int32"),
        (ScalarKind::Int16, "int32"),
        (ScalarKind::Int32, "int32"),
        (ScalarKind::Int64, "int64"),
        (ScalarKind::Uint8, "uint32"),
        (ScalarKind::Uint16, "uint32"),
        (ScalarKind::Uint32, "uint32"),
        (ScalarKind::Uint64, "uint64"),
        (ScalarKind::Float32, "float"),
        (ScalarKind::Float64, "double"),
        (ScalarKind::Bool, "bool"),
        (ScalarKind::Text, "string"),
        (ScalarKind::Timestamp, "google.protobuf.Timestamp"),
        (ScalarKind::Duration, "google.protobuf.Duration"),
    ];
    for (kind, expected) in cases {
        assert_eq!(mapper.map(&scalar(kind.clone())), expected, "{kind:?}");
    }
}

#[test]
fn test_unknown_scalar_falls_back_to_name() {
    let well_known = WellKnownTypes::default();
    let mapper = WireTypeMapper::new(&well_known);
    assert_eq!(
        mapper.map(&scalar(ScalarKind::Other("Decimal".into()))),
        "Decimal"
    );
}

#[test]
fn test_composite_mapping_laws() {
    let well_known = WellKnownTypes::default();
    let mapper = WireTypeMapper::new(&well_known);
    let samples = vec![
        scalar(ScalarKind::Int16),
        scalar(ScalarKind::Text),
        TypeDescriptor::Record(record("Widget")),
        TypeDescriptor::Record(record("Time")),
        TypeDescriptor::sequence(scalar(ScalarKind::Bool)),
        TypeDescriptor::map(scalar(ScalarKind::Text), scalar(ScalarKind::Uint64)),
    ];
    for element in &samples {
        let seq = TypeDescriptor::sequence(element.clone());
        assert_eq!(
            mapper.map(&seq),
            format!("repeated {}", mapper.map(element))
        );
        for value in &samples {
            let map = TypeDescriptor::map(element.clone(), value.clone());
            assert_eq!(
                mapper.map(&map),
                format!("map<{}, {}>", mapper.map(element), mapper.map(value))
            );
        }
    }
}

#[test]
fn test_record_mapping_and_well_known_override() {
    let mut well_known = WellKnownTypes::default();
    well_known.insert(
        "Money",
        WellKnownType::new("google.type.Money", Some("google/type/money.proto")),
    );
    let mapper = WireTypeMapper::new(&well_known);
    assert_eq!(
        mapper.map(&TypeDescriptor::Record(record("Widget"))),
        "Widget"
    );
    assert_eq!(
        mapper.map(&TypeDescriptor::Record(record("Time"))),
        "google.protobuf.Timestamp"
    );
    assert_eq!(
        mapper.map(&TypeDescriptor::sequence(TypeDescriptor::Record(record("Money")))),
        "repeated google.type.Money"
    );

    let mut imports = std::collections::BTreeSet::new();
    mapper.collect_imports(
        &TypeDescriptor::map(
            scalar(ScalarKind::Text),
            TypeDescriptor::Record(record("Money")),
        ),
        &mut imports,
    );
    mapper.collect_imports(&scalar(ScalarKind::Duration), &mut imports);
    mapper.collect_imports(&TypeDescriptor::Record(record("Widget")), &mut imports);
    let imports: Vec<_> = imports.into_iter().collect();
    assert_eq!(
        imports,
        vec!["google/protobuf/duration.proto", "google/type/money.proto"]
    );
}

// --- discovery ------------------------------------------------------------

#[test]
fn test_discover_pre_order_parent_before_children() {
    let d = record("D").field("flag", scalar(ScalarKind::Bool));
    let b = record("B").field("d", TypeDescriptor::Record(d));
    let c = record("C").field("n", scalar(ScalarKind::Int64));
    let a = record("A")
        .field("b", TypeDescriptor::Record(b))
        .field("count", scalar(ScalarKind::Uint32))
        .field("c", TypeDescriptor::Record(c));
    let found = discover(&a, &WellKnownTypes::default()).unwrap();
    assert_eq!(names(&found), vec!["B", "D", "C"]);
}

#[test]
fn test_discover_unwraps_sequences_and_map_values() {
    let entry = record("Entry").field("v", scalar(ScalarKind::Text));
    let key = record("Key").field("k", scalar(ScalarKind::Text));
    let row = record("Row").field("cells", scalar(ScalarKind::Text));
    let root = record("Index")
        .field(
            "by_key",
            TypeDescriptor::map(
                TypeDescriptor::Record(key),
                TypeDescriptor::sequence(TypeDescriptor::Record(entry)),
            ),
        )
        .field(
            "grid",
            TypeDescriptor::sequence(TypeDescriptor::sequence(TypeDescriptor::Record(row))),
        );
    let found = discover(&root, &WellKnownTypes::default()).unwrap();
    // map keys are not walked
    assert_eq!(names(&found), vec!["Entry", "Row"]);
}

#[test]
fn test_discover_skips_scalars_and_ignored_types() {
    let time = record("Time").field("wall", scalar(ScalarKind::Uint64));
    let root = record("Event")
        .field("at", TypeDescriptor::Record(time))
        .field("when", SystemTime::describe())
        .field("tags", Vec::<String>::describe());
    let found = discover(&root, &WellKnownTypes::default()).unwrap();
    assert!(found.is_empty());

    let found = discover(&root, &WellKnownTypes::empty()).unwrap();
    assert_eq!(names(&found), vec!["Time"]);
}

#[test]
fn test_discover_deduplicates_by_name() {
    let item = record("Item").field("sku", scalar(ScalarKind::Text));
    let root = record("Basket")
        .field("first", TypeDescriptor::Record(item.clone()))
        .field("rest", TypeDescriptor::sequence(TypeDescriptor::Record(item)));
    let found = discover(&root, &WellKnownTypes::default()).unwrap();
    assert_eq!(names(&found), vec!["Item"]);
}

#[test]
fn test_record_set_rejects_shape_collisions() {
    let mut set = RecordSet::new();
    let a = record("Item").field("sku", scalar(ScalarKind::Text));
    let b = record("Item").field("sku", scalar(ScalarKind::Int32));
    assert!(set.insert(&a).unwrap());
    assert!(!set.insert(&a).unwrap());
    let err = set.insert(&b).unwrap_err();
    assert!(matches!(err, GenerationError::NameCollision { ref name } if name == "Item"));
    assert_eq!(set.len(), 1);
}

#[test]
fn test_collect_records_nested_before_response() {
    let owner = record("Owner").field("name", scalar(ScalarKind::Text));
    let item = record("Item").field("sku", scalar(ScalarKind::Text));
    let request = record("ListRequest").field("page", scalar(ScalarKind::Uint32));
    let response = record("ListResponse")
        .field("owner", TypeDescriptor::Record(owner))
        .field("items", TypeDescriptor::sequence(TypeDescriptor::Record(item)));
    let well_known = WellKnownTypes::default();
    let records = collect_records(&[handler("List", request, response)], &well_known).unwrap();
    assert_eq!(
        names(&records),
        vec!["Owner", "Item", "ListRequest", "ListResponse"]
    );
}

#[test]
fn test_collect_records_shared_nested_type_once() {
    let shared = record("Shared").field("id", scalar(ScalarKind::Int64));
    let first = handler(
        "First",
        record("FirstRequest").field("shared", TypeDescriptor::Record(shared.clone())),
        record("FirstResponse"),
    );
    let second = handler(
        "Second",
        record("SecondRequest"),
        record("SecondResponse").field("shared", TypeDescriptor::Record(shared)),
    );
    let records = collect_records(&[first, second], &WellKnownTypes::default()).unwrap();
    assert_eq!(
        names(&records),
        vec![
            "Shared",
            "FirstRequest",
            "FirstResponse",
            "SecondRequest",
            "SecondResponse"
        ]
    );
}

#[test]
fn test_collect_records_request_nested_in_other_response() {
    let request = record("Query").field("q", scalar(ScalarKind::Text));
    let response = record("Answer").field("echo", TypeDescriptor::Record(request.clone()));
    let well_known = WellKnownTypes::default();
    let records = collect_records(&[handler("Ask", request, response)], &well_known).unwrap();
    assert_eq!(names(&records), vec!["Query", "Answer"]);
}

#[test]
fn test_collect_records_rejects_colliding_handlers() {
    let first = handler(
        "First",
        record("Request").field("id", scalar(ScalarKind::Int32)),
        record("Empty"),
    );
    let second = handler(
        "Second",
        record("Request").field("name", scalar(ScalarKind::Text)),
        record("Empty"),
    );
    let err = collect_records(&[first, second], &WellKnownTypes::default()).unwrap_err();
    assert!(err.to_string().contains("`Request`"));
}

// --- assembly -------------------------------------------------------------

#[test]
fn test_service_info_naming() {
    let mut info = ServiceInfo::new("Widget Service");
    assert_eq!(info.package(), "widget_service.v1");
    info.package_path = ".acme.platform.".to_string();
    info.version = 3;
    assert_eq!(info.package(), "acme.platform.widget_service.v3");
    assert_eq!(info.service_ident(), "WidgetService");
}

#[test]
fn test_case_conversion_splits_words() {
    assert_eq!(to_snake_case("WidgetService"), "widget_service");
    assert_eq!(to_snake_case("widget-service v2"), "widget_service_v2");
    assert_eq!(to_snake_case("HTTPServer"), "http_server");
    assert_eq!(to_snake_case("  "), "");
    assert_eq!(to_camel_case("widget.service"), "WidgetService");
    assert_eq!(to_camel_case("WidgetService"), "WidgetService");
    assert_eq!(to_camel_case("audit-log_events"), "AuditLogEvents");
    assert_eq!(
        ServiceInfo::new("WidgetService").package(),
        "widget_service.v1"
    );
    assert_eq!(
        ServiceInfo::new("widget.service").service_ident(),
        "WidgetService"
    );
}

#[test]
fn test_build_document_model() {
    let service = widget_service();
    let well_known = WellKnownTypes::default();
    let doc = build_document(&service, &AssemblerOptions::new(&well_known));
    assert_eq!(doc.syntax, "proto3");
    assert_eq!(doc.package, "acme.widget_service.v1");
    assert_eq!(doc.imports, vec!["google/api/annotations.proto"]);
    assert_eq!(doc.messages.len(), 2);
    assert_eq!(
        doc.messages[0].fields,
        vec![FieldLine {
            name: "id".into(),
            wire_type: "int32".into(),
            ordinal: 1
        }]
    );
    assert_eq!(
        doc.service.rpcs,
        vec![RpcBlock {
            name: "GetWidget".into(),
            input: "Request".into(),
            output: "Response".into(),
            verb: "get".into(),
            route: "/widgets/{id}".into(),
        }]
    );
    assert!(!doc.type_first);
}

#[test]
fn test_assemble_widget_scenario() {
    let service = widget_service();
    let well_known = WellKnownTypes::default();
    let text = assemble(&service, &AssemblerOptions::new(&well_known)).unwrap();
    let expected = r#"syntax = "proto3";

package acme.widget_service.v1;

import "google/api/annotations.proto";

option go_package = "github.com/acme/widgets/gen";

message Request {
    id int32 = 1;
}

message Response {
    name string = 1;
}

service WidgetService {
    rpc GetWidget (Request) returns (Response) {
        option (google.api.http) = {
            get: "/widgets/{id}"
            body: "*"
        };
    }
}"#;
    assert_eq!(text.trim_end(), expected);
}

#[test]
fn test_assemble_without_go_package() {
    let mut service = widget_service();
    service.info.go_package.clear();
    let well_known = WellKnownTypes::default();
    let text = assemble(&service, &AssemblerOptions::new(&well_known)).unwrap();
    assert!(!text.contains("go_package"));
    assert!(text.starts_with(
        "syntax = \"proto3\";\n\npackage acme.widget_service.v1;\n\n\
         import \"google/api/annotations.proto\";\n\nmessage Request {\n"
    ));
}

#[test]
fn test_assemble_type_first_layout() {
    let service = widget_service();
    let well_known = WellKnownTypes::default();
    let options = AssemblerOptions::new(&well_known).with_field_layout(FieldLayout::TypeFirst);
    let text = assemble(&service, &options).unwrap();
    assert!(text.contains("message Request {\n    int32 id = 1;\n}"));
    assert!(text.contains("message Response {\n    string name = 1;\n}"));
}

#[test]
fn test_assemble_lowercases_route_and_adds_well_known_imports() {
    let request = record("UploadRequest")
        .field("taken_at", SystemTime::describe())
        .field("labels", HashMap::<String, i64>::describe());
    let response = record("UploadResponse").field("ttl", std::time::Duration::describe());
    let upload = HandlerDescriptor::new(
        "Upload",
        TypeDescriptor::Record(request),
        TypeDescriptor::Record(response),
        HttpMethod::Put,
        "/Photos/{ID}",
    )
    .unwrap();
    let service = ServiceDescriptor::new(
        ServiceInfo::new("photos"),
        vec![upload],
        &WellKnownTypes::default(),
    )
    .unwrap();
    let well_known = WellKnownTypes::default();
    let text = assemble(&service, &AssemblerOptions::new(&well_known)).unwrap();
    assert!(text.contains("put: \"/photos/{id}\""));
    assert!(text.contains("taken_at google.protobuf.Timestamp = 1;"));
    assert!(text.contains("labels map<string, int64> = 2;"));
    assert!(text.contains("ttl google.protobuf.Duration = 1;"));
    assert!(text.contains(
        "import \"google/api/annotations.proto\";\nimport \"google/protobuf/duration.proto\";\nimport \"google/protobuf/timestamp.proto\";"
    ));
}

#[test]
fn test_assemble_is_deterministic() {
    let service = widget_service();
    let well_known = WellKnownTypes::default();
    let options = AssemblerOptions::new(&well_known);
    let first = assemble(&service, &options).unwrap();
    let second = assemble(&widget_service(), &options).unwrap();
    assert_eq!(first, second);
}

// --- output ---------------------------------------------------------------

#[test]
fn test_schema_file_name() {
    assert_eq!(schema_file_name("Widget Service"), "widget_service.proto");
    assert_eq!(schema_file_name("pets"), "pets.proto");
}

#[test]
fn test_write_schema_creates_directory() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested").join("proto");
    let path = write_schema(&out, "Widget Service", "syntax = \"proto3\";\n").unwrap();
    assert_eq!(path, out.join("widget_service.proto"));
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "syntax = \"proto3\";\n"
    );
    // overwrite on retry
    write_schema(&out, "Widget Service", "x").unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "x");
}

#[test]
fn test_write_schema_reports_path_on_failure() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "").unwrap();
    let err = write_schema(&blocker, "svc", "x").unwrap_err();
    match err {
        GenerationError::Io { path, .. } => assert_eq!(path, blocker),
        other => panic!("unexpected error: {other}"),
    }
}

// --- compiler -------------------------------------------------------------

#[cfg(unix)]
fn stub_compiler(dir: &std::path::Path, body: &str) -> ProtocCompiler {
    let script = dir.join("stub.sh");
    std::fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
    // run through sh so the script never needs the exec bit
    ProtocCompiler::new("sh").arg(script.to_string_lossy())
}

#[cfg(unix)]
#[test]
fn test_compiler_success_passes_include_dir_and_path() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(dir.path(), "svc", "syntax = \"proto3\";").unwrap();
    let compiler = stub_compiler(dir.path(), "echo \"$@\"\nexit 0");
    let output = compiler.compile(&schema).unwrap();
    let expected = format!("-I {} {}", dir.path().display(), schema.display());
    assert_eq!(output.stdout.trim(), expected);
}

#[cfg(unix)]
#[test]
fn test_compiler_failure_carries_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(dir.path(), "svc", "garbage").unwrap();
    let compiler = stub_compiler(
        dir.path(),
        "echo 'svc.proto:1:1: Expected \"syntax\"' >&2\nexit 3",
    );
    match compiler.compile(&schema).unwrap_err() {
        GenerationError::Compiler { diagnostics, .. } => {
            assert!(diagnostics.contains("svc.proto:1:1"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[cfg(unix)]
#[test]
fn test_compiler_timeout_kills_process() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(dir.path(), "svc", "x").unwrap();
    let compiler = stub_compiler(dir.path(), "sleep 5")
        .timeout(std::time::Duration::from_millis(100));
    let started = std::time::Instant::now();
    let err = compiler.compile(&schema).unwrap_err();
    assert!(matches!(err, GenerationError::CompilerTimeout { .. }));
    assert!(started.elapsed() < std::time::Duration::from_secs(4));
}

#[cfg(unix)]
#[test]
fn test_compiler_large_diagnostics_under_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(dir.path(), "svc", "x").unwrap();
    // well past the pipe buffer, so an undrained stderr would block the child
    let compiler = stub_compiler(
        dir.path(),
        "head -c 200000 /dev/zero | tr '\\0' e >&2\nexit 3",
    )
    .timeout(std::time::Duration::from_secs(10));
    match compiler.compile(&schema).unwrap_err() {
        GenerationError::Compiler { diagnostics, .. } => {
            assert!(diagnostics.len() >= 200_000);
            assert!(diagnostics.bytes().all(|b| b == b'e'));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_compiler_spawn_failure() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(dir.path(), "svc", "x").unwrap();
    let compiler = ProtocCompiler::new("definitely-not-a-real-protoc-binary");
    let err = compiler.compile(&schema).unwrap_err();
    assert!(matches!(err, GenerationError::CompilerSpawn { .. }));
}

#[test]
fn test_compiler_from_config() {
    let config = CompilerConfig {
        program: "buf".into(),
        args: vec!["--go_out=gen".into()],
        timeout_secs: Some(30),
    };
    let compiler = ProtocCompiler::from_config(&config);
    assert_eq!(compiler.program(), "buf");
    assert_eq!(CompilerConfig::default().program, "protoc");
}
