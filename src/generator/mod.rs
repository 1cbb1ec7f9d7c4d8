//! # Generator Module
//!
//! Derives a proto3 schema from handler descriptors.
//!
//! ## Overview
//!
//! Generation is a pure, in-memory transformation followed by optional I/O
//! done by the caller:
//!
//! ```text
//! HandlerDescriptor[] → Discovery → ServiceDescriptor → SchemaDocument → text
//!                                                                      ↓
//!                                             write_schema → SchemaCompiler
//! ```
//!
//! 1. **Discovery** ([`collect_records`]) - walks each handler's request and
//!    response record depth-first, collecting every nested record once
//! 2. **Mapping** ([`WireTypeMapper`]) - maps each field's type to its wire
//!    type (`repeated`, `map<K, V>`, scalar table, record names)
//! 3. **Assembly** ([`build_document`]) - builds the intermediate
//!    [`SchemaDocument`]: header, one message per record, one RPC per handler
//!    with a `google.api.http` rule
//! 4. **Rendering** ([`SchemaDocument::render`]) - stringifies the document
//!    through the `service.proto.txt` askama template
//!
//! ## Generated Shape
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
//! Field lines use `name wireType = ordinal;` by default. Set
//! [`FieldLayout::TypeFirst`] to emit the `wireType name = ordinal;` order
//! accepted by `protoc`.
//!
//! ## Well-Known Types
//!
//! Records named in [`WellKnownTypes`] (default `Time` and `Duration`) never
//! get a message block; references render as `google.protobuf.Timestamp` and
//! `google.protobuf.Duration` and the matching import is added.
//!
//! ## Determinism
//!
//! Only ordered collections feed the template, so regenerating from the same
//! handlers produces byte-identical output.

mod assembler;
mod compiler;
mod discovery;
mod error;
mod output;
mod templates;
mod wire_type;
#[cfg(test)]
mod tests;

pub use assembler::*;
pub use compiler::*;
pub use discovery::*;
pub use error::GenerationError;
pub use output::*;
pub use templates::*;
pub use wire_type::*;
