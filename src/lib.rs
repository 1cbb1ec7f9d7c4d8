//! # protoroot
//!
//! **protoroot** derives a proto3 schema, with `google.api.http` transcoding
//! rules, from the request/response handlers registered on a service.
//!
//! ## Overview
//!
//! Handlers are plain Rust types implementing [`Handler`]. Their request and
//! response records describe themselves through [`Describe`] (usually
//! `#[derive(Describe)]`), so the generator never needs runtime reflection.
//! From that metadata the generator discovers every nested record, maps field
//! types to wire types and renders one schema file per service.
//!
//! ## Architecture
//!
//! - **[`descriptor`]** - Type descriptor model and the [`Describe`] trait
//! - **[`handler`]** - Handler contract and read-only handler metadata
//! - **[`generator`]** - Wire-type mapping, record discovery, schema assembly,
//!   file output and the external schema compiler
//! - **[`registry`]** - [`App`]: registered handlers of one service
//! - **[`security`]** - Authentication and permission contracts
//! - **[`context`]** - Typed per-call context
//! - **[`manifest`]** - Declarative service manifests for the CLI
//! - **[`config`]** - Generator configuration (files and environment)
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - The `protoroot-gen` command line
//!
//! ### Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant User
//!     participant App as registry::App
//!     participant Meta as handler::HandlerDescriptor
//!     participant Disc as generator::discovery
//!     participant Asm as generator::assembler
//!     participant Tpl as templates/service.proto.txt
//!     participant FS as File System
//!     participant Protoc as protoc
//!
//!     User->>App: register(handler)
//!     User->>App: write(&config)
//!     App->>Meta: HandlerDescriptor::of(handler)
//!     Meta-->>App: name, request, response, method, route
//!     App->>Disc: collect_records(&handlers)
//!     Disc->>Disc: Depth-first walk,<br/>dedupe by name
//!     Disc-->>App: Vec<RecordDescriptor>
//!     App->>Asm: assemble(&service)
//!     Asm->>Asm: Map field types<br/>to wire types
//!     Asm->>Tpl: SchemaDocument::render()
//!     Tpl-->>Asm: schema text
//!     App->>FS: write_schema(dir, name, text)
//!     FS-->>User: <service>.proto
//!     User->>Protoc: ProtocCompiler::compile(path)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use protoroot::context::Context;
//! use protoroot::{App, Describe, GeneratorConfig, Handler, HttpMethod};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Describe, Deserialize)]
//! struct Request {
//!     id: i32,
//! }
//!
//! #[derive(Describe, Serialize)]
//! struct Response {
//!     name: String,
//! }
//!
//! struct GetWidget;
//!
//! impl Handler for GetWidget {
//!     type Request = Request;
//!     type Response = Response;
//!
//!     fn method(&self) -> HttpMethod {
//!         HttpMethod::Get
//!     }
//!
//!     fn route(&self) -> &str {
//!         "/widgets/{id}"
//!     }
//!
//!     fn handle(&self, _ctx: &mut Context, req: Request) -> anyhow::Result<Response> {
//!         Ok(Response { name: format!("widget-{}", req.id) })
//!     }
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut app = App::new("Widget Service")
//!         .with_package("acme")
//!         .with_go_package("github.com/acme/widgets/gen");
//!     app.register(GetWidget);
//!
//!     let path = app.write(&GeneratorConfig::default())?;
//!     println!("wrote {}", path.display());
//!     Ok(())
//! }
//! ```
//!
//! Produces `proto/widget_service.proto`:
//!
//! ```text
//! syntax = "proto3";
//!
//! package acme.widget_service.v1;
//!
//! import "google/api/annotations.proto";
//!
//! option go_package = "github.com/acme/widgets/gen";
//!
//! message Request {
//!     id int32 = 1;
//! }
//!
//! message Response {
//!     name string = 1;
//! }
//!
//! service WidgetService {
//!     rpc GetWidget (Request) returns (Response) {
//!         option (google.api.http) = {
//!             get: "/widgets/{id}"
//!             body: "*"
//!         };
//!     }
//! }
//! ```
//!
//! ## Limitations
//!
//! - Records are identified by name. Two different records sharing a name
//!   fail generation with [`GenerationError::NameCollision`].
//! - Self-referential records cannot implement [`Describe`].
//! - One schema file per service; the package is versioned as `v<version>`.

// Lets `#[derive(Describe)]` output, which names `::protoroot`, compile inside
// this crate's own tests.
extern crate self as protoroot;

pub mod cli;
pub mod config;
pub mod context;
pub mod descriptor;
pub mod generator;
pub mod handler;
pub mod logging;
pub mod manifest;
pub mod registry;
pub mod security;

pub use config::{ConfigError, GeneratorConfig};
pub use descriptor::{Describe, FieldDescriptor, RecordDescriptor, ScalarKind, TypeDescriptor};
pub use generator::{GenerationError, ProtocCompiler, SchemaCompiler, ServiceInfo, WellKnownTypes};
pub use handler::{Handler, HandlerDescriptor, HttpMethod};
pub use manifest::{ManifestError, ServiceManifest};
pub use registry::{App, CallError};
