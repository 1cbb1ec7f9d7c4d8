//! # Handler Module
//!
//! The contract every registered handler implements, and the read-only
//! metadata the generator derives from it.
//!
//! ## Overview
//!
//! A [`Handler`] names its request and response records through associated
//! types. Both must implement [`Describe`], which is how the generator learns
//! their shape without runtime reflection:
//!
//! ```rust
//! use protoroot::{Describe, Handler, HttpMethod};
//! use protoroot::context::Context;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Describe, Deserialize)]
//! pub struct GetWidgetRequest { id: i32 }
//!
//! #[derive(Describe, Serialize)]
//! pub struct GetWidgetResponse { name: String }
//!
//! pub struct GetWidget;
//!
//! impl Handler for GetWidget {
//!     type Request = GetWidgetRequest;
//!     type Response = GetWidgetResponse;
//!
//!     fn method(&self) -> HttpMethod { HttpMethod::Get }
//!     fn route(&self) -> &str { "/widgets/{id}" }
//!
//!     fn handle(&self, _ctx: &mut Context, req: GetWidgetRequest) -> anyhow::Result<GetWidgetResponse> {
//!         Ok(GetWidgetResponse { name: format!("widget-{}", req.id) })
//!     }
//! }
//!
//! assert_eq!(GetWidget.name(), "GetWidget");
//! ```
//!
//! ## Metadata
//!
//! [`HandlerDescriptor`] is the projection consumed by discovery and
//! assembly: stable name, request/response records, HTTP method, route and
//! the security claims (carried through untouched).

mod method;

pub use method::{HttpMethod, ParseHttpMethodError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::context::Context;
use crate::descriptor::{Describe, RecordDescriptor, TypeDescriptor};
use crate::generator::GenerationError;
use crate::registry::CallError;
use crate::security::{AuthenticationClaims, PermissionClaim};

/// A request/response handler.
pub trait Handler: Send + Sync + 'static {
    /// Request record, decoded from JSON before [`Handler::handle`] runs
    type Request: Describe + DeserializeOwned;
    /// Response record, encoded to JSON after [`Handler::handle`] returns
    type Response: Describe + Serialize;

    fn method(&self) -> HttpMethod;

    fn route(&self) -> &str;

    fn authentication_claims(&self) -> AuthenticationClaims {
        AuthenticationClaims::ALLOW_ANY
    }

    fn permission_claims(&self) -> Vec<PermissionClaim> {
        Vec::new()
    }

    fn handle(&self, ctx: &mut Context, request: Self::Request) -> anyhow::Result<Self::Response>;

    /// Stable name, used as the RPC name and the registry key.
    ///
    /// Defaults to the handler's own type name without module path or
    /// generic arguments.
    fn name(&self) -> String {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// Strip module path and generic arguments from a fully qualified type name.
///
/// ```rust
/// assert_eq!(protoroot::handler::short_type_name("app::api::GetWidget<app::Db>"), "GetWidget");
/// ```
pub fn short_type_name(full: &str) -> String {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

/// Read-only metadata of one handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerDescriptor {
    pub name: String,
    pub request: RecordDescriptor,
    pub response: RecordDescriptor,
    pub method: HttpMethod,
    pub route: String,
    pub authentication_claims: AuthenticationClaims,
    pub permission_claims: Vec<PermissionClaim>,
}

impl HandlerDescriptor {
    /// Build a descriptor, rejecting request or response types that are not
    /// records.
    pub fn new(
        name: impl Into<String>,
        request: TypeDescriptor,
        response: TypeDescriptor,
        method: HttpMethod,
        route: impl Into<String>,
    ) -> Result<Self, GenerationError> {
        let name = name.into();
        let request = require_record(&name, "request", request)?;
        let response = require_record(&name, "response", response)?;
        Ok(Self {
            name,
            request,
            response,
            method,
            route: route.into(),
            authentication_claims: AuthenticationClaims::default(),
            permission_claims: Vec::new(),
        })
    }

    /// Describe a registered handler.
    pub fn of<H: Handler>(handler: &H) -> Result<Self, GenerationError> {
        Ok(Self::new(
            handler.name(),
            H::Request::describe(),
            H::Response::describe(),
            handler.method(),
            handler.route(),
        )?
        .with_authentication(handler.authentication_claims())
        .with_permissions(handler.permission_claims()))
    }

    pub fn with_authentication(mut self, claims: AuthenticationClaims) -> Self {
        self.authentication_claims = claims;
        self
    }

    pub fn with_permissions(mut self, claims: Vec<PermissionClaim>) -> Self {
        self.permission_claims = claims;
        self
    }
}

fn require_record(
    handler: &str,
    role: &'static str,
    ty: TypeDescriptor,
) -> Result<RecordDescriptor, GenerationError> {
    ty.into_record()
        .map_err(|other| GenerationError::InvalidHandler {
            handler: handler.to_string(),
            role,
            found: other.kind_label(),
            type_name: other.to_string(),
        })
}

/// Object-safe view of a [`Handler`], as stored by the registry.
pub trait ErasedHandler: Send + Sync {
    fn name(&self) -> &str;

    fn descriptor(&self) -> Result<HandlerDescriptor, GenerationError>;

    fn authentication_claims(&self) -> AuthenticationClaims;

    fn permission_claims(&self) -> Vec<PermissionClaim>;

    /// Decode `request`, run the handler and encode its response.
    fn call(&self, ctx: &mut Context, request: Value) -> Result<Value, CallError>;
}

/// Wrap a typed handler for storage behind `dyn ErasedHandler`.
pub fn erase<H: Handler>(handler: H) -> Box<dyn ErasedHandler> {
    Box::new(TypedHandler {
        name: handler.name(),
        handler,
    })
}

struct TypedHandler<H> {
    name: String,
    handler: H,
}

impl<H: Handler> ErasedHandler for TypedHandler<H> {
    fn name(&self) -> &str {
        &self.name
    }

    fn descriptor(&self) -> Result<HandlerDescriptor, GenerationError> {
        HandlerDescriptor::of(&self.handler)
    }

    fn authentication_claims(&self) -> AuthenticationClaims {
        self.handler.authentication_claims()
    }

    fn permission_claims(&self) -> Vec<PermissionClaim> {
        self.handler.permission_claims()
    }

    fn call(&self, ctx: &mut Context, request: Value) -> Result<Value, CallError> {
        let request: H::Request =
            serde_json::from_value(request).map_err(|err| CallError::InvalidRequest {
                handler: self.name.clone(),
                message: err.to_string(),
            })?;
        let response = self
            .handler
            .handle(ctx, request)
            .map_err(|err| CallError::Handler {
                handler: self.name.clone(),
                message: format!("{err:#}"),
            })?;
        serde_json::to_value(response).map_err(|err| CallError::InvalidResponse {
            handler: self.name.clone(),
            message: err.to_string(),
        })
    }
}
