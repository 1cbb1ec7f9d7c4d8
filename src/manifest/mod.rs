//! # Manifest Module
//!
//! Declarative description of a service, used by `protoroot-gen` to derive
//! a schema without compiling the handlers.
//!
//! ## Format
//!
//! ```yaml
//! service:
//!   name: Widget Service
//!   package: acme
//!   go_package: github.com/acme/widgets/gen
//!   version: 1
//!
//! records:
//!   - name: Request
//!     fields:
//!       - { name: id, type: i32 }
//!   - name: Response
//!     fields:
//!       - { name: name, type: string }
//!       - { name: tags, type: "list<string>" }
//!
//! handlers:
//!   - name: GetWidget
//!     method: GET
//!     route: /widgets/{id}
//!     request: Request
//!     response: Response
//!     authentication: [authenticated]
//!     permissions: [widgets.read]
//! ```
//!
//! JSON manifests use the same shape.
//!
//! ## Type Expressions
//!
//! | Expression | Descriptor |
//! |------------|------------|
//! | `i8` `i16` `i32`/`int32` `i64`/`int64` | signed integers |
//! | `u8` `u16` `u32`/`uint32` `u64`/`uint64` | unsigned integers |
//! | `f32`/`float` `f64`/`double` | floating point |
//! | `bool` `string` `timestamp` `duration` | other scalars |
//! | `list<T>` or `[T]` | sequence |
//! | `map<K, V>` | map |
//! | anything else | record name |
//!
//! Record names that are neither declared in `records` nor listed as
//! well-known types are errors, as are records that contain themselves.
//! Field ordinals follow declaration order.

mod expr;

pub use expr::{parse_type_expr, TypeExpr};

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::descriptor::{RecordDescriptor, TypeDescriptor};
use crate::generator::{GenerationError, ServiceDescriptor, ServiceInfo, WellKnownTypes};
use crate::handler::{HandlerDescriptor, HttpMethod};
use crate::security::{AuthenticationClaims, PermissionClaim};

/// Failure to load or resolve a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported manifest format `{extension}` for {path} (expected yaml, yml or json)")]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("invalid manifest: {0}")]
    Parse(String),

    #[error("malformed type expression `{expr}`: {reason}")]
    MalformedType { expr: String, reason: String },

    #[error("unknown type `{name}` referenced by {context}")]
    UnknownType { name: String, context: String },

    #[error("record `{name}` is declared more than once")]
    DuplicateRecord { name: String },

    #[error("record `{record}` declares field `{field}` more than once")]
    DuplicateField { record: String, field: String },

    #[error("recursive record definition: {cycle}")]
    RecursiveRecord { cycle: String },

    #[error("handler `{handler}` has unknown authentication claim `{claim}`")]
    UnknownClaim { handler: String, claim: String },

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Top-level manifest document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceManifest {
    pub service: ServiceInfo,
    #[serde(default)]
    pub records: Vec<RecordSpec>,
    #[serde(default)]
    pub handlers: Vec<HandlerSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSpec {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    /// Type expression, e.g. `map<string, list<Item>>`
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerSpec {
    pub name: String,
    pub method: HttpMethod,
    pub route: String,
    /// Request type expression; must resolve to a record
    pub request: String,
    /// Response type expression; must resolve to a record
    pub response: String,
    /// Claim names: `any`, `authenticated`, `admin`, `owner`
    #[serde(default)]
    pub authentication: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<PermissionClaim>,
}

impl ServiceManifest {
    /// Load a manifest, choosing the parser by extension.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let manifest = match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&content)?,
            "json" => Self::from_json_str(&content)?,
            _ => {
                return Err(ManifestError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    extension,
                })
            }
        };
        debug!(
            path = ?path,
            records = manifest.records.len(),
            handlers = manifest.handlers.len(),
            "Loaded manifest"
        );
        Ok(manifest)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ManifestError> {
        serde_yaml::from_str(content).map_err(|e| ManifestError::Parse(e.to_string()))
    }

    pub fn from_json_str(content: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(content).map_err(|e| ManifestError::Parse(e.to_string()))
    }

    /// Resolve every handler into a [`HandlerDescriptor`], in manifest order.
    pub fn handler_descriptors(
        &self,
        well_known: &WellKnownTypes,
    ) -> Result<Vec<HandlerDescriptor>, ManifestError> {
        let mut resolver = Resolver::new(&self.records, well_known)?;
        self.handlers
            .iter()
            .map(|spec| resolver.handler(spec))
            .collect()
    }

    /// Resolve handlers and run record discovery.
    pub fn service_descriptor(
        &self,
        well_known: &WellKnownTypes,
    ) -> Result<ServiceDescriptor, ManifestError> {
        let handlers = self.handler_descriptors(well_known)?;
        Ok(ServiceDescriptor::new(
            self.service.clone(),
            handlers,
            well_known,
        )?)
    }
}

/// Turns record specs into descriptors, memoizing finished records.
struct Resolver<'a> {
    specs: HashMap<&'a str, &'a RecordSpec>,
    well_known: &'a WellKnownTypes,
    resolved: HashMap<String, RecordDescriptor>,
    /// Records currently being resolved, outermost first
    stack: Vec<String>,
}

impl<'a> Resolver<'a> {
    fn new(
        records: &'a [RecordSpec],
        well_known: &'a WellKnownTypes,
    ) -> Result<Self, ManifestError> {
        let mut specs = HashMap::new();
        for spec in records {
            if specs.insert(spec.name.as_str(), spec).is_some() {
                return Err(ManifestError::DuplicateRecord {
                    name: spec.name.clone(),
                });
            }
            let mut seen = HashSet::new();
            if let Some(field) = spec.fields.iter().find(|f| !seen.insert(f.name.as_str())) {
                return Err(ManifestError::DuplicateField {
                    record: spec.name.clone(),
                    field: field.name.clone(),
                });
            }
        }
        Ok(Self {
            specs,
            well_known,
            resolved: HashMap::new(),
            stack: Vec::new(),
        })
    }

    fn handler(&mut self, spec: &HandlerSpec) -> Result<HandlerDescriptor, ManifestError> {
        let context = format!("handler `{}`", spec.name);
        let request = self.type_of(&spec.request, &context)?;
        let response = self.type_of(&spec.response, &context)?;

        let mut claims = AuthenticationClaims::empty();
        for name in &spec.authentication {
            claims |= AuthenticationClaims::from_claim_name(name).ok_or_else(|| {
                ManifestError::UnknownClaim {
                    handler: spec.name.clone(),
                    claim: name.clone(),
                }
            })?;
        }
        if claims.is_empty() {
            claims = AuthenticationClaims::default();
        }

        Ok(
            HandlerDescriptor::new(&spec.name, request, response, spec.method, &spec.route)?
                .with_authentication(claims)
                .with_permissions(spec.permissions.clone()),
        )
    }

    fn type_of(&mut self, expr: &str, context: &str) -> Result<TypeDescriptor, ManifestError> {
        let parsed = parse_type_expr(expr)?;
        self.descriptor(&parsed, context)
    }

    fn descriptor(
        &mut self,
        expr: &TypeExpr,
        context: &str,
    ) -> Result<TypeDescriptor, ManifestError> {
        Ok(match expr {
            TypeExpr::Scalar(kind) => TypeDescriptor::Scalar(kind.clone()),
            TypeExpr::List(element) => TypeDescriptor::sequence(self.descriptor(element, context)?),
            TypeExpr::Map(key, value) => TypeDescriptor::map(
                self.descriptor(key, context)?,
                self.descriptor(value, context)?,
            ),
            TypeExpr::Named(name) => TypeDescriptor::Record(self.record(name, context)?),
        })
    }

    fn record(&mut self, name: &str, context: &str) -> Result<RecordDescriptor, ManifestError> {
        if let Some(done) = self.resolved.get(name) {
            return Ok(done.clone());
        }
        if self.stack.iter().any(|n| n == name) {
            let mut cycle = self.stack.clone();
            cycle.push(name.to_string());
            return Err(ManifestError::RecursiveRecord {
                cycle: cycle.join(" -> "),
            });
        }
        let Some(spec) = self.specs.get(name).copied() else {
            // Well-known types stand in for themselves and never get a block.
            if self.well_known.is_ignored(name) {
                return Ok(RecordDescriptor::new(name));
            }
            return Err(ManifestError::UnknownType {
                name: name.to_string(),
                context: context.to_string(),
            });
        };

        self.stack.push(name.to_string());
        let mut record = RecordDescriptor::new(name);
        for field in &spec.fields {
            let context = format!("field `{}.{}`", name, field.name);
            let ty = self.type_of(&field.ty, &context)?;
            record = record.field(&field.name, ty);
        }
        self.stack.pop();

        self.resolved.insert(name.to_string(), record.clone());
        Ok(record)
    }
}
