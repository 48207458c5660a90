//! The application router: every route of the HTTP surface.
//!
//! Authentication happens in the middleware (the router only reads
//! `request.user`); authorization for the admin routes happens inside
//! [`AdminService`], which re-checks the acting user's role per call.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use medmatch_admin::{AdminService, LimitOffset};
use medmatch_core::steps::OnboardingRecord;
use medmatch_core::validation::validate_for_submit;
use medmatch_core::{Error, Result};
use medmatch_db::{MatchStore, NewNotification, UserFilter};
use medmatch_profile::ProfileService;
use medmatch_wizard::{DraftSnapshot, DraftStore, InMemoryDraftStore, SubmitGateway};
use serde::Deserialize;
use validator::Validate;

use crate::http::{Handler, MiddlewareChain, Request, Response, error_response};
use crate::middleware::{SessionAuthMiddleware, TracingMiddleware};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginPayload {
	username: String,
	password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftPayload {
	data: OnboardingRecord,
	current_step: u8,
	#[serde(default)]
	completed_steps: BTreeSet<u8>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdminNotificationPayload {
	/// Absent means broadcast to every profile.
	user_id: Option<String>,
	title: String,
	message: String,
	kind: String,
	#[serde(default)]
	link: Option<String>,
}

/// Routes requests to the domain services.
pub struct AppRouter {
	store: MatchStore,
	profiles: ProfileService,
	admin: AdminService,
	drafts: Arc<dyn DraftStore>,
}

impl AppRouter {
	pub fn new(store: MatchStore) -> Self {
		Self {
			profiles: ProfileService::new(store.clone()),
			admin: AdminService::new(store.clone()),
			drafts: Arc::new(InMemoryDraftStore::new()),
			store,
		}
	}

	pub fn with_draft_store(mut self, drafts: Arc<dyn DraftStore>) -> Self {
		self.drafts = drafts;
		self
	}

	/// The fully assembled application handler: router wrapped in the
	/// standard middleware stack (request logging, session auth).
	pub fn handler(store: MatchStore) -> Arc<dyn Handler> {
		let router = Arc::new(Self::new(store.clone()));
		let mut chain = MiddlewareChain::new(router);
		chain.add_middleware(Arc::new(TracingMiddleware));
		chain.add_middleware(Arc::new(SessionAuthMiddleware::new(store)));
		Arc::new(chain)
	}

	async fn route(&self, request: &Request) -> Result<Response> {
		let path = request.path().trim_matches('/').to_string();
		let segments: Vec<&str> = path.split('/').collect();

		// `Method`'s constants are not usable as patterns, so match on
		// the method name.
		match (request.method.as_str(), segments.as_slice()) {
			("GET", ["health"]) => {
				Ok(Response::ok().with_json(&serde_json::json!({"status": "ok"})))
			}

			("POST", ["auth", "login"]) => self.login(request).await,
			("POST", ["auth", "logout"]) => self.logout(request).await,

			("POST", ["onboarding"]) => self.submit_onboarding(request).await,
			("GET", ["onboarding"]) => self.read_onboarding(request).await,
			("GET", ["onboarding", "draft"]) => self.read_draft(request).await,
			("PUT", ["onboarding", "draft"]) => self.save_draft(request).await,
			("DELETE", ["onboarding", "draft"]) => self.delete_draft(request).await,

			("GET", ["profile"]) => self.read_profile(request).await,
			("POST", ["profile"]) => self.update_profile(request).await,

			("GET", ["notifications"]) => self.list_notifications(request).await,
			("POST", ["notifications", "read-all"]) => self.read_all_notifications(request).await,
			("POST", ["notifications", id, "read"]) => self.read_notification(request, id).await,
			("DELETE", ["notifications", id]) => self.delete_notification(request, id).await,

			("GET", ["admin", "users"]) => self.admin_list_users(request).await,
			("DELETE", ["admin", "users", id]) => self.admin_delete_user(request, id).await,
			("GET", ["admin", "stats"]) => self.admin_stats(request).await,
			("POST", ["admin", "notifications"]) => self.admin_notify(request).await,
			("DELETE", ["admin", "notifications", id]) => {
				self.admin_delete_notification(request, id).await
			}

			(_, segments) if Self::known_path(segments) => Ok(Response::method_not_allowed()
				.with_json(&serde_json::json!({"error": "Method not allowed"}))),

			_ => Ok(Response::not_found()
				.with_json(&serde_json::json!({"error": "Not found"}))),
		}
	}

	/// Paths the router serves under some method; a request to one of
	/// these with the wrong method is a 405, not a 404.
	fn known_path(segments: &[&str]) -> bool {
		matches!(
			segments,
			["health"]
				| ["auth", "login" | "logout"]
				| ["onboarding"]
				| ["onboarding", "draft"]
				| ["profile"]
				| ["notifications"]
				| ["notifications", "read-all"]
				| ["notifications", _]
				| ["notifications", _, "read"]
				| ["admin", "users"]
				| ["admin", "users", _]
				| ["admin", "stats"]
				| ["admin", "notifications"]
				| ["admin", "notifications", _]
		)
	}

	async fn login(&self, request: &Request) -> Result<Response> {
		let payload: LoginPayload = request.json()?;
		let user = self
			.store
			.verify_credentials(&payload.username, &payload.password)
			.await?;
		let token = self.store.create_session(&user.id).await?;
		Ok(Response::ok().with_json(&serde_json::json!({"token": token, "user": user})))
	}

	async fn logout(&self, request: &Request) -> Result<Response> {
		request.require_user()?;
		if let Some(token) = request.bearer_token() {
			self.store.delete_session(token).await?;
		}
		Ok(Response::no_content())
	}

	/// The final onboarding submit: two validation passes, then the
	/// atomic eight-collection write, then draft cleanup.
	async fn submit_onboarding(&self, request: &Request) -> Result<Response> {
		let user = request.require_user()?;
		let record: OnboardingRecord = request.json()?;

		// The field-specific pass runs first: an empty required array must
		// name its field, not fall through to the generic shape error.
		let completed: BTreeSet<u8> = record.supplied_steps().into_iter().collect();
		if let Err(fields) = validate_for_submit(&record, &completed) {
			return Ok(Response::bad_request().with_json(&serde_json::json!({
				"error": "Validation failed",
				"fields": fields,
			})));
		}
		record
			.validate()
			.map_err(|_| Error::Validation("Invalid data format".to_string()))?;

		SubmitGateway::submit(&self.store, &user.id, &record).await?;
		if let Err(error) = self.drafts.clear(&user.id).await {
			tracing::warn!(user_id = %user.id, %error, "draft cleanup failed after submit");
		}
		self.store
			.add_notification(
				&user.id,
				&NewNotification {
					title: "Welcome!".to_string(),
					message: "Your profile is complete. Matching starts with the next round."
						.to_string(),
					kind: "system".to_string(),
					link: None,
				},
			)
			.await?;
		Ok(Response::ok().with_json(&serde_json::json!({"success": true})))
	}

	/// The wizard's resume read: the draft when one exists, otherwise
	/// the profile reconstructed from storage.
	async fn read_onboarding(&self, request: &Request) -> Result<Response> {
		let user = request.require_user()?;
		if let Some(draft) = self.drafts.load(&user.id).await? {
			return Ok(Response::ok().with_json(&serde_json::json!({
				"draft": true,
				"record": draft.data,
				"currentStep": draft.current_step,
				"completedSteps": draft.completed_steps,
			})));
		}
		let view = self.profiles.load(&user.id).await?;
		Ok(Response::ok().with_json(&serde_json::json!({
			"draft": false,
			"record": view.record,
			"flags": view.flags,
		})))
	}

	async fn read_draft(&self, request: &Request) -> Result<Response> {
		let user = request.require_user()?;
		match self.drafts.load(&user.id).await? {
			Some(draft) => Ok(Response::ok().with_json(&draft)),
			None => Err(Error::NotFound("draft".to_string())),
		}
	}

	async fn save_draft(&self, request: &Request) -> Result<Response> {
		let user = request.require_user()?;
		let payload: DraftPayload = request.json()?;
		let snapshot = DraftSnapshot::new(
			payload.data,
			payload.current_step.clamp(1, medmatch_wizard::TOTAL_STEPS),
			payload.completed_steps,
		);
		self.drafts.save(&user.id, &snapshot).await?;
		Ok(Response::ok().with_json(&snapshot))
	}

	async fn delete_draft(&self, request: &Request) -> Result<Response> {
		let user = request.require_user()?;
		self.drafts.clear(&user.id).await?;
		Ok(Response::no_content())
	}

	async fn read_profile(&self, request: &Request) -> Result<Response> {
		let user = request.require_user()?;
		let view = self.profiles.load(&user.id).await?;
		Ok(Response::ok().with_json(&view))
	}

	async fn update_profile(&self, request: &Request) -> Result<Response> {
		let user = request.require_user()?;
		let record: OnboardingRecord = request.json()?;
		let view = self.profiles.update(&user.id, &record).await?;
		Ok(Response::ok().with_json(&view))
	}

	async fn list_notifications(&self, request: &Request) -> Result<Response> {
		let user = request.require_user()?;
		let notifications = self.store.list_notifications(&user.id).await?;
		Ok(Response::ok().with_json(&notifications))
	}

	async fn read_notification(&self, request: &Request, id: &str) -> Result<Response> {
		let user = request.require_user()?;
		self.store.mark_notification_read(&user.id, id).await?;
		Ok(Response::no_content())
	}

	async fn read_all_notifications(&self, request: &Request) -> Result<Response> {
		let user = request.require_user()?;
		let updated = self.store.mark_all_notifications_read(&user.id).await?;
		Ok(Response::ok().with_json(&serde_json::json!({"updated": updated})))
	}

	async fn delete_notification(&self, request: &Request, id: &str) -> Result<Response> {
		let user = request.require_user()?;
		self.store.delete_notification(id, Some(&user.id)).await?;
		Ok(Response::no_content())
	}

	async fn admin_list_users(&self, request: &Request) -> Result<Response> {
		let user = request.require_user()?;
		let params = request.query_params();
		let filter = UserFilter {
			search: params.get("search").filter(|s| !s.is_empty()).cloned(),
			onboarding_complete: params.get("onboarded").and_then(|v| v.parse().ok()),
		};
		let window = LimitOffset::from_params(
			params.get("limit").map(String::as_str),
			params.get("offset").map(String::as_str),
		);
		let page = self.admin.list_users(&user.id, &filter, window).await?;
		Ok(Response::ok().with_json(&page))
	}

	async fn admin_delete_user(&self, request: &Request, id: &str) -> Result<Response> {
		let user = request.require_user()?;
		self.admin.delete_user(&user.id, id).await?;
		Ok(Response::no_content())
	}

	async fn admin_stats(&self, request: &Request) -> Result<Response> {
		let user = request.require_user()?;
		let stats = self.admin.stats(&user.id).await?;
		Ok(Response::ok().with_json(&stats))
	}

	async fn admin_notify(&self, request: &Request) -> Result<Response> {
		let user = request.require_user()?;
		let payload: AdminNotificationPayload = request.json()?;
		let notification = NewNotification {
			title: payload.title,
			message: payload.message,
			kind: payload.kind,
			link: payload.link,
		};
		let sent = match payload.user_id {
			Some(target) => {
				self.admin.policy().require_admin(&user.id).await?;
				self.store.add_notification(&target, &notification).await?;
				1
			}
			None => self.admin.broadcast(&user.id, &notification).await?,
		};
		Ok(Response::created().with_json(&serde_json::json!({"sent": sent})))
	}

	async fn admin_delete_notification(&self, request: &Request, id: &str) -> Result<Response> {
		let user = request.require_user()?;
		self.admin.delete_notification(&user.id, id).await?;
		Ok(Response::no_content())
	}
}

#[async_trait]
impl Handler for AppRouter {
	async fn handle(&self, request: Request) -> Result<Response> {
		// Errors become HTTP responses here; nothing bubbles past the
		// router except middleware failures.
		match self.route(&request).await {
			Ok(response) => Ok(response),
			Err(error) => Ok(error_response(&error)),
		}
	}
}
