//! Server-side authorization.
//!
//! Roles come from the `admin_roles` table on every check; nothing the
//! client sends about its own role is ever trusted.

use medmatch_core::{Error, Result};
use medmatch_db::{AdminRole, MatchStore};

/// Role gate in front of every admin operation.
#[derive(Clone)]
pub struct AccessPolicy {
	store: MatchStore,
}

impl AccessPolicy {
	pub fn new(store: MatchStore) -> Self {
		Self { store }
	}

	/// Requires any admin role; returns which one the user holds.
	pub async fn require_admin(&self, user_id: &str) -> Result<AdminRole> {
		match self.store.role_of(user_id).await? {
			Some(role) => Ok(role),
			None => {
				tracing::warn!(user_id, "admin access denied");
				Err(Error::Authorization("Access denied".to_string()))
			}
		}
	}

	/// Requires the super-admin role.
	pub async fn require_super_admin(&self, user_id: &str) -> Result<()> {
		match self.require_admin(user_id).await? {
			AdminRole::SuperAdmin => Ok(()),
			AdminRole::Admin => Err(Error::Authorization("Access denied".to_string())),
		}
	}
}
