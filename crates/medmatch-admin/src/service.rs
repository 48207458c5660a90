//! The admin back-office operations.

use medmatch_core::Result;
use medmatch_db::{AdminRole, MatchStore, NewNotification, ProfileSummary, UserFilter};
use serde::{Deserialize, Serialize};

use crate::pagination::{LimitOffset, PaginatedResponse};
use crate::policy::AccessPolicy;

/// The dashboard counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
	pub total_profiles: i64,
	pub onboarded: i64,
	pub matchable: i64,
	pub unread_notifications: i64,
}

/// Role-checked façade over the admin store operations.
///
/// Every method takes the acting user's id and re-verifies their role
/// before touching anything.
#[derive(Clone)]
pub struct AdminService {
	store: MatchStore,
	policy: AccessPolicy,
}

impl AdminService {
	pub fn new(store: MatchStore) -> Self {
		let policy = AccessPolicy::new(store.clone());
		Self { store, policy }
	}

	pub fn policy(&self) -> &AccessPolicy {
		&self.policy
	}

	/// The paginated user listing.
	pub async fn list_users(
		&self,
		acting: &str,
		filter: &UserFilter,
		window: LimitOffset,
	) -> Result<PaginatedResponse<ProfileSummary>> {
		self.policy.require_admin(acting).await?;
		let (results, total) = self
			.store
			.list_profiles(filter, window.limit, window.offset)
			.await?;
		Ok(PaginatedResponse::new(
			"/admin/users",
			window,
			total as usize,
			results,
		))
	}

	/// Removes a user's profile and collection data; their login stays.
	pub async fn delete_user(&self, acting: &str, target: &str) -> Result<()> {
		self.policy.require_admin(acting).await?;
		self.store.delete_profile(target).await
	}

	/// Grants an admin role. Super-admin only.
	pub async fn grant_role(&self, acting: &str, target: &str, role: AdminRole) -> Result<()> {
		self.policy.require_super_admin(acting).await?;
		self.store.grant_role(target, role).await?;
		tracing::info!(acting, target, role = role.as_str(), "admin role granted");
		Ok(())
	}

	/// Sends a notification to every profile; returns how many were sent.
	pub async fn broadcast(&self, acting: &str, notification: &NewNotification) -> Result<usize> {
		self.policy.require_admin(acting).await?;
		let recipients = self.store.profile_ids().await?;
		for user_id in &recipients {
			self.store.add_notification(user_id, notification).await?;
		}
		tracing::info!(acting, count = recipients.len(), title = %notification.title, "broadcast sent");
		Ok(recipients.len())
	}

	/// Deletes any user's notification.
	pub async fn delete_notification(&self, acting: &str, id: &str) -> Result<()> {
		self.policy.require_admin(acting).await?;
		self.store.delete_notification(id, None).await
	}

	/// The dashboard counters, gathered concurrently.
	pub async fn stats(&self, acting: &str) -> Result<DashboardStats> {
		self.policy.require_admin(acting).await?;
		let (total_profiles, onboarded, matchable, unread_notifications) = tokio::try_join!(
			self.store.count_profiles(),
			self.store.count_onboarded(),
			self.store.count_matchable(),
			self.store.count_unread_notifications(),
		)?;
		Ok(DashboardStats {
			total_profiles,
			onboarded,
			matchable,
			unread_notifications,
		})
	}
}

#[cfg(test)]
mod tests {
	use medmatch_core::Error;

	use super::*;

	async fn service() -> AdminService {
		let store = MatchStore::in_memory().await.unwrap();
		store.grant_role("admin", AdminRole::Admin).await.unwrap();
		store
			.grant_role("root", AdminRole::SuperAdmin)
			.await
			.unwrap();
		store.ensure_profile("u1", Some("Dr. Chen")).await.unwrap();
		store.ensure_profile("u2", Some("Dr. Park")).await.unwrap();
		AdminService::new(store)
	}

	#[tokio::test]
	async fn non_admins_are_denied() {
		let service = service().await;
		for result in [
			service
				.list_users("u1", &UserFilter::default(), LimitOffset::default())
				.await
				.map(|_| ()),
			service.delete_user("u1", "u2").await,
			service.stats("u1").await.map(|_| ()),
		] {
			assert!(matches!(result, Err(Error::Authorization(_))));
		}
	}

	#[tokio::test]
	async fn role_grants_are_super_admin_only() {
		let service = service().await;
		assert!(matches!(
			service.grant_role("admin", "u1", AdminRole::Admin).await,
			Err(Error::Authorization(_))
		));
		service
			.grant_role("root", "u1", AdminRole::Admin)
			.await
			.unwrap();
		assert!(service.list_users("u1", &UserFilter::default(), LimitOffset::default()).await.is_ok());
	}

	#[tokio::test]
	async fn listing_and_delete() {
		let service = service().await;
		let page = service
			.list_users("admin", &UserFilter::default(), LimitOffset::default())
			.await
			.unwrap();
		assert_eq!(page.count, 2);

		service.delete_user("admin", "u1").await.unwrap();
		let page = service
			.list_users("admin", &UserFilter::default(), LimitOffset::default())
			.await
			.unwrap();
		assert_eq!(page.count, 1);
		assert_eq!(page.results[0].display_name.as_deref(), Some("Dr. Park"));
	}

	#[tokio::test]
	async fn broadcast_reaches_every_profile() {
		let service = service().await;
		let sent = service
			.broadcast(
				"admin",
				&NewNotification {
					title: "Maintenance".to_string(),
					message: "Down at midnight".to_string(),
					kind: "system".to_string(),
					link: None,
				},
			)
			.await
			.unwrap();
		assert_eq!(sent, 2);
		let stats = service.stats("admin").await.unwrap();
		assert_eq!(stats.unread_notifications, 2);
		assert_eq!(stats.total_profiles, 2);
		assert_eq!(stats.onboarded, 0);
	}
}
