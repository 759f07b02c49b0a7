//! # Caller authorization context
//!
//! The core carries the caller's granted scopes so adapters and callers
//! can consult them, but never enforces them itself. Token verification
//! and role-to-scope mapping live in the surrounding service.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Scopes granted to the caller of a core operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub scopes: HashSet<String>,
}

impl AuthContext {
    pub fn new(scopes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            scopes: scopes.into_iter().map(Into::into).collect(),
        }
    }

    /// An anonymous caller with no granted scopes.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_membership() {
        let ctx = AuthContext::new(["teams:read", "events:read"]);
        assert!(ctx.has_scope("teams:read"));
        assert!(!ctx.has_scope("matches:read"));
        assert!(!AuthContext::anonymous().has_scope("teams:read"));
    }
}
