use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::discovery::collect_records;
use super::error::GenerationError;
use super::templates::{FieldLine, MessageBlock, RpcBlock, SchemaDocument, ServiceBlock};
use super::wire_type::{WellKnownTypes, WireTypeMapper};
use crate::descriptor::RecordDescriptor;
use crate::handler::HandlerDescriptor;

const SYNTAX: &str = "proto3";
const ANNOTATIONS_IMPORT: &str = "google/api/annotations.proto";

/// Identity of a generated service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    /// Human-readable service name, e.g. `Widget Service`
    pub name: String,
    /// Dotted package prefix, e.g. `acme.platform`
    #[serde(default, alias = "package")]
    pub package_path: String,
    /// Value of the `go_package` option, left out of the schema when empty
    #[serde(default)]
    pub go_package: String,
    #[serde(default = "default_version")]
    pub version: u32,
}

fn default_version() -> u32 {
    1
}

impl ServiceInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package_path: String::new(),
            go_package: String::new(),
            version: default_version(),
        }
    }

    /// Schema package: `<package_path>.<service>.v<version>`.
    pub fn package(&self) -> String {
        let service = to_snake_case(&self.name);
        let prefix = self.package_path.trim_matches('.');
        if prefix.is_empty() {
            format!("{service}.v{}", self.version)
        } else {
            format!("{prefix}.{service}.v{}", self.version)
        }
    }

    /// Identifier used for the `service` block.
    pub fn service_ident(&self) -> String {
        to_camel_case(&self.name)
    }
}

/// Everything needed to assemble one schema file.
///
/// `records` holds every message in emission order, without duplicates.
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    pub info: ServiceInfo,
    pub handlers: Vec<HandlerDescriptor>,
    pub records: Vec<RecordDescriptor>,
}

impl ServiceDescriptor {
    /// Run record discovery over `handlers`.
    pub fn new(
        info: ServiceInfo,
        handlers: Vec<HandlerDescriptor>,
        well_known: &WellKnownTypes,
    ) -> Result<Self, GenerationError> {
        let records = collect_records(&handlers, well_known)?;
        Ok(Self {
            info,
            handlers,
            records,
        })
    }
}

/// Order of type and name in rendered field lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldLayout {
    /// `name wireType = ordinal;`
    #[default]
    NameFirst,
    /// `wireType name = ordinal;`
    TypeFirst,
}

/// Rendering options for [`assemble`].
#[derive(Debug, Clone, Copy)]
pub struct AssemblerOptions<'a> {
    pub well_known: &'a WellKnownTypes,
    pub field_layout: FieldLayout,
}

impl<'a> AssemblerOptions<'a> {
    pub fn new(well_known: &'a WellKnownTypes) -> Self {
        Self {
            well_known,
            field_layout: FieldLayout::default(),
        }
    }

    pub fn with_field_layout(mut self, field_layout: FieldLayout) -> Self {
        self.field_layout = field_layout;
        self
    }
}

/// Build the intermediate document for `service`.
pub fn build_document(
    service: &ServiceDescriptor,
    options: &AssemblerOptions<'_>,
) -> SchemaDocument {
    let mapper = WireTypeMapper::new(options.well_known);

    let mut well_known_imports = BTreeSet::new();
    let messages = service
        .records
        .iter()
        .map(|record| MessageBlock {
            name: record.name.clone(),
            fields: record
                .fields
                .iter()
                .map(|field| {
                    mapper.collect_imports(&field.ty, &mut well_known_imports);
                    FieldLine {
                        name: field.name.clone(),
                        wire_type: mapper.map(&field.ty),
                        ordinal: field.ordinal,
                    }
                })
                .collect(),
        })
        .collect::<Vec<_>>();

    let rpcs = service
        .handlers
        .iter()
        .map(|handler| RpcBlock {
            name: handler.name.clone(),
            input: handler.request.name.clone(),
            output: handler.response.name.clone(),
            verb: handler.method.verb().to_string(),
            route: handler.route.to_lowercase(),
        })
        .collect::<Vec<_>>();

    let mut imports = vec![ANNOTATIONS_IMPORT.to_string()];
    imports.extend(well_known_imports);

    debug!(
        messages = messages.len(),
        rpcs = rpcs.len(),
        imports = imports.len(),
        "Built schema document"
    );

    SchemaDocument {
        syntax: SYNTAX.to_string(),
        package: service.info.package(),
        imports,
        go_package: service.info.go_package.clone(),
        messages,
        service: ServiceBlock {
            name: service.info.service_ident(),
            rpcs,
        },
        type_first: options.field_layout == FieldLayout::TypeFirst,
    }
}

/// Render `service` as schema text.
///
/// Output depends only on the order of `records`, `handlers` and field
/// ordinals, so identical input yields byte-identical text.
pub fn assemble(
    service: &ServiceDescriptor,
    options: &AssemblerOptions<'_>,
) -> Result<String, GenerationError> {
    build_document(service, options).render()
}

/// Convert a name to CamelCase. Any non-alphanumeric character separates
/// words, as does a lower-to-upper case change.
///
/// ```rust
/// use protoroot::generator::to_camel_case;
/// assert_eq!(to_camel_case("widget service"), "WidgetService");
/// assert_eq!(to_camel_case("user_profile"), "UserProfile");
/// assert_eq!(to_camel_case("widget.service"), "WidgetService");
/// ```
pub fn to_camel_case(s: &str) -> String {
    words(s)
        .into_iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Lower-case a name and join its words with underscores.
///
/// ```rust
/// use protoroot::generator::to_snake_case;
/// assert_eq!(to_snake_case("Widget Service"), "widget_service");
/// assert_eq!(to_snake_case("WidgetService"), "widget_service");
/// assert_eq!(to_snake_case("HTTPServer"), "http_server");
/// ```
pub fn to_snake_case(s: &str) -> String {
    words(s)
        .iter()
        .map(|w| w.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Split on non-alphanumerics and on case boundaries. An upper-case run
/// followed by a lower-case letter keeps its last capital for the next word.
fn words(s: &str) -> Vec<&str> {
    let mut words = Vec::new();
    for part in s.split(|c: char| !c.is_ascii_alphanumeric()) {
        let bytes = part.as_bytes();
        let mut start = 0;
        for i in 1..bytes.len() {
            let (prev, cur) = (bytes[i - 1], bytes[i]);
            let next_lower = bytes.get(i + 1).is_some_and(u8::is_ascii_lowercase);
            let boundary = cur.is_ascii_uppercase()
                && (prev.is_ascii_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_ascii_uppercase() && next_lower));
            if boundary {
                words.push(&part[start..i]);
                start = i;
            }
        }
        if start < part.len() {
            words.push(&part[start..]);
        }
    }
    words
}
