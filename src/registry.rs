//! # Registry Module
//!
//! [`App`] holds the registered handlers of one service and is the entry
//! point for schema generation and in-process invocation.
//!
//! ## Registration
//!
//! Handlers are keyed by their stable [`Handler::name`]. Registering a second
//! handler with a name already present is a no-op (the first registration
//! wins), so registration order is also RPC order in the generated schema.
//!
//! ## Generation
//!
//! ```rust,ignore
//! let mut app = App::new("Widget Service")
//!     .with_package("acme.platform")
//!     .with_go_package("github.com/acme/widgets/gen")
//!     .with_version(1);
//! app.register(GetWidget);
//!
//! let path = app.write(&GeneratorConfig::default())?;
//! ProtocCompiler::default().compile(&path)?;
//! ```
//!
//! ## Invocation
//!
//! [`App::call`] runs one handler against a JSON request after checking its
//! authentication and permission claims. There is no network transport; a
//! server built on top of this crate decides how requests arrive.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::GeneratorConfig;
use crate::context::{Context, ContextKey, ContextValue};
use crate::generator::{
    assemble, schema_file_name, write_schema, CompilerOutput, GeneratedSchema, GenerationError,
    SchemaCompiler, ServiceDescriptor, ServiceInfo, WellKnownTypes,
};
use crate::handler::{erase, ErasedHandler, Handler, HandlerDescriptor};
use crate::security::{
    AuthDecision, AuthenticationBackend, AuthenticationClaims, PermissionBackend, SecurityError,
};

/// Failure of [`App::call`].
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error("no handler registered under `{0}`")]
    UnknownHandler(String),

    #[error("handler `{handler}` rejected the caller: not authenticated")]
    Unauthenticated { handler: String },

    #[error("handler `{handler}` rejected the caller: missing permissions")]
    Forbidden { handler: String },

    #[error("handler `{handler}` requires {what} but no backend is configured")]
    MissingBackend { handler: String, what: &'static str },

    #[error(transparent)]
    Security(#[from] SecurityError),

    #[error("handler `{handler}` could not decode the request: {message}")]
    InvalidRequest { handler: String, message: String },

    #[error("handler `{handler}` could not encode the response: {message}")]
    InvalidResponse { handler: String, message: String },

    #[error("handler `{handler}` failed: {message}")]
    Handler { handler: String, message: String },
}

/// A service and its registered handlers.
pub struct App {
    info: ServiceInfo,
    handlers: Vec<Box<dyn ErasedHandler>>,
    authentication: Option<Arc<dyn AuthenticationBackend>>,
    permissions: Option<Arc<dyn PermissionBackend>>,
}

impl App {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            info: ServiceInfo::new(name),
            handlers: Vec::new(),
            authentication: None,
            permissions: None,
        }
    }

    /// Dotted package prefix for the generated schema, e.g. `acme.platform`.
    pub fn with_package(mut self, package_path: impl Into<String>) -> Self {
        self.info.package_path = package_path.into();
        self
    }

    /// Output namespace written as the `go_package` option.
    pub fn with_go_package(mut self, go_package: impl Into<String>) -> Self {
        self.info.go_package = go_package.into();
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.info.version = version;
        self
    }

    pub fn with_authentication(mut self, backend: Arc<dyn AuthenticationBackend>) -> Self {
        self.authentication = Some(backend);
        self
    }

    pub fn with_permissions(mut self, backend: Arc<dyn PermissionBackend>) -> Self {
        self.permissions = Some(backend);
        self
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn info(&self) -> &ServiceInfo {
        &self.info
    }

    /// Register a handler. Returns `false` when a handler with the same name
    /// was already registered; the earlier one is kept.
    pub fn register<H: Handler>(&mut self, handler: H) -> bool {
        let erased = erase(handler);
        if self.handlers.iter().any(|h| h.name() == erased.name()) {
            warn!(handler = %erased.name(), "Handler already registered, ignoring duplicate");
            return false;
        }
        debug!(handler = %erased.name(), "Registered handler");
        self.handlers.push(erased);
        true
    }

    /// Handler names in registration order.
    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub fn handler_descriptors(&self) -> Result<Vec<HandlerDescriptor>, GenerationError> {
        self.handlers.iter().map(|h| h.descriptor()).collect()
    }

    pub fn service_descriptor(
        &self,
        well_known: &WellKnownTypes,
    ) -> Result<ServiceDescriptor, GenerationError> {
        ServiceDescriptor::new(self.info.clone(), self.handler_descriptors()?, well_known)
    }

    /// Derive and render the schema without touching the filesystem.
    pub fn generate(&self, config: &GeneratorConfig) -> Result<GeneratedSchema, GenerationError> {
        let well_known = config.well_known_types();
        let service = self.service_descriptor(&well_known)?;
        let text = assemble(&service, &config.assembler_options(&well_known))?;
        info!(
            service = %self.info.name,
            handlers = service.handlers.len(),
            records = service.records.len(),
            "Generated schema"
        );
        Ok(GeneratedSchema {
            file_name: schema_file_name(&self.info.name),
            text,
        })
    }

    /// Generate the schema and write it under `config.output_dir`.
    pub fn write(&self, config: &GeneratorConfig) -> Result<PathBuf, GenerationError> {
        let schema = self.generate(config)?;
        write_schema(&config.output_dir, &self.info.name, &schema.text)
    }

    /// Write the schema and hand it to `compiler`.
    pub fn compile(
        &self,
        config: &GeneratorConfig,
        compiler: &dyn SchemaCompiler,
    ) -> Result<CompilerOutput, GenerationError> {
        let path = self.write(config)?;
        compiler.compile(&path)
    }

    /// Invoke handler `name` with a JSON request.
    pub fn call(&self, name: &str, ctx: &mut Context, request: Value) -> Result<Value, CallError> {
        let handler = self
            .handlers
            .iter()
            .find(|h| h.name() == name)
            .ok_or_else(|| CallError::UnknownHandler(name.to_string()))?;

        self.authenticate(handler.as_ref(), ctx)?;
        self.authorize(handler.as_ref(), ctx)?;

        debug!(handler = %name, request_id = ?ctx.request_id(), "Calling handler");
        handler.call(ctx, request)
    }

    fn authenticate(
        &self,
        handler: &dyn ErasedHandler,
        ctx: &mut Context,
    ) -> Result<(), CallError> {
        let claims = handler.authentication_claims();
        if claims.contains(AuthenticationClaims::ALLOW_ANY) {
            return Ok(());
        }
        let backend = self
            .authentication
            .as_ref()
            .ok_or_else(|| CallError::MissingBackend {
                handler: handler.name().to_string(),
                what: "authentication",
            })?;
        match backend.authenticate(ctx, claims)? {
            AuthDecision::Allow(Some(user)) => {
                ctx.set(ContextKey::User, ContextValue::User(user));
                Ok(())
            }
            AuthDecision::Allow(None) => Ok(()),
            AuthDecision::Deny => Err(CallError::Unauthenticated {
                handler: handler.name().to_string(),
            }),
        }
    }

    fn authorize(&self, handler: &dyn ErasedHandler, ctx: &Context) -> Result<(), CallError> {
        let required = handler.permission_claims();
        if required.is_empty() {
            return Ok(());
        }
        let backend = self
            .permissions
            .as_ref()
            .ok_or_else(|| CallError::MissingBackend {
                handler: handler.name().to_string(),
                what: "permissions",
            })?;
        if backend.has_permissions(ctx, &required) {
            Ok(())
        } else {
            Err(CallError::Forbidden {
                handler: handler.name().to_string(),
            })
        }
    }
}
