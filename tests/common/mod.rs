//! Shared fixtures: a small widget service with nested records.
#![allow(dead_code)]

use protoroot::context::Context;
use protoroot::security::{AuthenticationClaims, PermissionClaim};
use protoroot::{Describe, Handler, HttpMethod};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Describe, Serialize, Deserialize)]
pub struct Part {
    pub sku: String,
    pub stock: u32,
}

#[derive(Debug, Describe, Serialize, Deserialize)]
pub struct Owner {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Describe, Deserialize)]
pub struct GetWidgetRequest {
    pub id: i32,
}

#[derive(Debug, Describe, Serialize)]
pub struct GetWidgetResponse {
    pub name: String,
    pub owner: Owner,
    pub parts: Vec<Part>,
    pub labels: HashMap<String, String>,
}

pub struct GetWidget;

impl Handler for GetWidget {
    type Request = GetWidgetRequest;
    type Response = GetWidgetResponse;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn route(&self) -> &str {
        "/widgets/{id}"
    }

    fn handle(
        &self,
        _ctx: &mut Context,
        req: GetWidgetRequest,
    ) -> anyhow::Result<GetWidgetResponse> {
        if req.id < 0 {
            anyhow::bail!("widget {} does not exist", req.id);
        }
        Ok(GetWidgetResponse {
            name: format!("widget-{}", req.id),
            owner: Owner {
                id: 1,
                name: "acme".into(),
            },
            parts: vec![Part {
                sku: "bolt".into(),
                stock: 12,
            }],
            labels: HashMap::new(),
        })
    }
}

#[derive(Debug, Describe, Deserialize)]
pub struct UpdateWidgetRequest {
    pub id: i32,
    pub parts: Vec<Part>,
}

#[derive(Debug, Describe, Serialize)]
pub struct UpdateWidgetResponse {
    pub updated: bool,
}

pub struct UpdateWidget;

impl Handler for UpdateWidget {
    type Request = UpdateWidgetRequest;
    type Response = UpdateWidgetResponse;

    fn method(&self) -> HttpMethod {
        HttpMethod::Put
    }

    fn route(&self) -> &str {
        "/widgets/{id}"
    }

    fn authentication_claims(&self) -> AuthenticationClaims {
        AuthenticationClaims::ALLOW_AUTHENTICATED
    }

    fn permission_claims(&self) -> Vec<PermissionClaim> {
        vec![PermissionClaim::new("widgets.write")]
    }

    fn handle(
        &self,
        ctx: &mut Context,
        _req: UpdateWidgetRequest,
    ) -> anyhow::Result<UpdateWidgetResponse> {
        Ok(UpdateWidgetResponse {
            updated: ctx.user().is_some(),
        })
    }
}
