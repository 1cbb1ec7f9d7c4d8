//! # Security Module
//!
//! Authentication and permission contracts consumed by handlers.
//!
//! ## Overview
//!
//! Handlers declare what they require; backends decide whether a request
//! satisfies it:
//!
//! - [`AuthenticationClaims`] - who may call the handler at all
//! - [`PermissionClaim`] - named capabilities the caller must hold
//!
//! Both are passed through the schema generator untouched. They are only
//! evaluated by [`App::call`](crate::App::call), against the
//! [`AuthenticationBackend`] and [`PermissionBackend`] registered on the app.
//!
//! ## Example
//!
//! ```rust
//! use protoroot::context::Context;
//! use protoroot::security::{AuthDecision, AuthenticationBackend, AuthenticationClaims, SecurityError, User};
//!
//! struct AdminsOnly;
//!
//! impl AuthenticationBackend for AdminsOnly {
//!     fn authenticate(
//!         &self,
//!         _ctx: &Context,
//!         claims: AuthenticationClaims,
//!     ) -> Result<AuthDecision, SecurityError> {
//!         if claims.contains(AuthenticationClaims::ALLOW_ADMIN) {
//!             Ok(AuthDecision::Allow(Some(User::new(1, "root"))))
//!         } else {
//!             Ok(AuthDecision::Deny)
//!         }
//!     }
//! }
//! ```

mod permission;

pub use permission::{PermissionBackend, PermissionClaim};

use crate::context::Context;
use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Who may invoke a handler.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AuthenticationClaims: u8 {
        const ALLOW_ANY = 1 << 0;
        const ALLOW_AUTHENTICATED = 1 << 1;
        const ALLOW_ADMIN = 1 << 2;
        const ALLOW_OWNER = 1 << 3;
    }
}

impl Default for AuthenticationClaims {
    fn default() -> Self {
        AuthenticationClaims::ALLOW_ANY
    }
}

impl AuthenticationClaims {
    /// Parse a single claim name (`any`, `authenticated`, `admin`, `owner`).
    pub fn from_claim_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "any" => Some(AuthenticationClaims::ALLOW_ANY),
            "authenticated" => Some(AuthenticationClaims::ALLOW_AUTHENTICATED),
            "admin" => Some(AuthenticationClaims::ALLOW_ADMIN),
            "owner" => Some(AuthenticationClaims::ALLOW_OWNER),
            _ => None,
        }
    }
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
}

impl User {
    pub fn new(id: u64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }
}

/// Outcome of an authentication check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    /// The caller may proceed, optionally identified.
    Allow(Option<User>),
    Deny,
}

/// Failure inside a security backend, as opposed to a denial.
#[derive(Debug, thiserror::Error)]
pub enum SecurityError {
    #[error("authentication backend unavailable: {0}")]
    Unavailable(String),
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
}

/// Decides whether the caller described by a [`Context`] satisfies a
/// handler's [`AuthenticationClaims`].
pub trait AuthenticationBackend: Send + Sync {
    fn authenticate(
        &self,
        ctx: &Context,
        claims: AuthenticationClaims,
    ) -> Result<AuthDecision, SecurityError>;
}
