//! The server's standard middleware stack.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use medmatch_core::Result;
use medmatch_db::MatchStore;

use crate::http::{Handler, Middleware, Request, Response};

/// Logs one line per request with method, path, status and latency.
pub struct TracingMiddleware;

#[async_trait]
impl Middleware for TracingMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let method = request.method.clone();
		let path = request.path().to_string();
		let start = Instant::now();
		let result = next.handle(request).await;
		let elapsed = start.elapsed();
		match &result {
			Ok(response) => {
				tracing::info!(%method, path, status = %response.status, ?elapsed, "request");
			}
			Err(error) => {
				tracing::warn!(%method, path, %error, ?elapsed, "request failed");
			}
		}
		result
	}
}

/// Resolves the bearer session key to an identity, once, up front.
///
/// Handlers downstream read `request.user`; no route does its own
/// session lookup. Requests without a valid session pass through
/// unauthenticated and fail later at `require_user`, so public routes
/// (login, health) need no special casing here.
pub struct SessionAuthMiddleware {
	store: MatchStore,
}

impl SessionAuthMiddleware {
	pub fn new(store: MatchStore) -> Self {
		Self { store }
	}
}

#[async_trait]
impl Middleware for SessionAuthMiddleware {
	async fn process(&self, mut request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		if let Some(token) = request.bearer_token() {
			let token = token.to_string();
			request.user = self.store.load_session(&token).await?;
			if request.user.is_none() {
				tracing::debug!("stale or unknown session key");
			}
		}
		next.handle(request).await
	}
}
