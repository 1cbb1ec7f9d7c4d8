use askama::Template;

use super::error::GenerationError;

/// One `field = ordinal;` line of a message block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLine {
    pub name: String,
    pub wire_type: String,
    pub ordinal: u32,
}

/// A `message` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBlock {
    pub name: String,
    pub fields: Vec<FieldLine>,
}

/// One `rpc` declaration with its HTTP transcoding rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcBlock {
    pub name: String,
    pub input: String,
    pub output: String,
    /// Lower-case HTTP verb (`get`, `post`, ...)
    pub verb: String,
    pub route: String,
}

/// The `service` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceBlock {
    pub name: String,
    pub rpcs: Vec<RpcBlock>,
}

/// Intermediate model of a schema file.
///
/// Built by [`build_document`](super::build_document); turning it into text
/// is a separate, pure step ([`SchemaDocument::render`]).
#[derive(Debug, Clone, PartialEq, Eq, Template)]
#[template(path = "service.proto.txt", escape = "none")]
pub struct SchemaDocument {
    pub syntax: String,
    pub package: String,
    pub imports: Vec<String>,
    pub go_package: String,
    pub messages: Vec<MessageBlock>,
    pub service: ServiceBlock,
    /// Render fields as `wireType name` instead of `name wireType`
    pub type_first: bool,
}

impl SchemaDocument {
    pub fn render(&self) -> Result<String, GenerationError> {
        Ok(Template::render(self)?)
    }
}
