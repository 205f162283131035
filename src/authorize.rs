//! Post-validation profile decoration with roles and permissions.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Result;

use crate::context::RequestContext;
use crate::profile::Profile;

/// Role/permission sets looked up for a verified identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDetails {
    pub roles: BTreeSet<String>,
    pub permissions: BTreeSet<String>,
}

/// Lookup of stored user details keyed by profile id.
pub trait UserDetailsService: Send + Sync {
    /// # Errors
    /// Fails when the backing store cannot be reached; an unknown id is
    /// `Ok(None)`, not an error.
    fn load_by_id(&self, id: &str) -> Result<Option<UserDetails>>;
}

/// Decorates freshly validated profiles before they reach the caller.
pub trait AuthorizationGenerator: Send + Sync {
    /// # Errors
    /// Fails when the decoration source is unavailable.
    fn generate(&self, ctx: &RequestContext, profile: &mut Profile) -> Result<()>;
}

/// Generator that merges roles/permissions from a [`UserDetailsService`].
///
/// An identity with no stored details keeps an empty role set.
#[derive(Clone)]
pub struct UserDetailsAuthorizer {
    service: Arc<dyn UserDetailsService>,
}

impl UserDetailsAuthorizer {
    pub fn new(service: Arc<dyn UserDetailsService>) -> Self {
        Self { service }
    }
}

impl AuthorizationGenerator for UserDetailsAuthorizer {
    fn generate(&self, _ctx: &RequestContext, profile: &mut Profile) -> Result<()> {
        let Some(details) = self.service.load_by_id(profile.id())? else {
            return Ok(());
        };
        for role in details.roles {
            profile.add_role(role);
        }
        for permission in details.permissions {
            profile.add_permission(permission);
        }
        Ok(())
    }
}
