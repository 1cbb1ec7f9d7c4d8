use crate::context::Context;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named capability, e.g. `widgets.write`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionClaim(pub String);

impl PermissionClaim {
    pub fn new(claim: impl Into<String>) -> Self {
        Self(claim.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PermissionClaim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PermissionClaim {
    fn from(claim: &str) -> Self {
        Self::new(claim)
    }
}

/// Source of truth for the permissions held by the current caller.
pub trait PermissionBackend: Send + Sync {
    /// Permissions granted to the caller in `ctx`.
    fn permission_claims(&self, ctx: &Context) -> Vec<PermissionClaim>;

    /// True when the caller holds every claim in `required`.
    fn has_permissions(&self, ctx: &Context, required: &[PermissionClaim]) -> bool {
        let granted = self.permission_claims(ctx);
        required.iter().all(|claim| granted.contains(claim))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<PermissionClaim>);

    impl PermissionBackend for Fixed {
        fn permission_claims(&self, _ctx: &Context) -> Vec<PermissionClaim> {
            self.0.clone()
        }
    }

    #[test]
    fn test_has_permissions_requires_all() {
        let backend = Fixed(vec!["widgets.read".into(), "widgets.write".into()]);
        let ctx = Context::new();
        assert!(backend.has_permissions(&ctx, &["widgets.read".into()]));
        assert!(backend.has_permissions(&ctx, &[]));
        assert!(!backend.has_permissions(
            &ctx,
            &["widgets.read".into(), "widgets.delete".into()]
        ));
    }
}
