//! Request/response types and the handler/middleware abstractions.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use hyper::{HeaderMap, Method, StatusCode, Uri, Version};
use medmatch_core::{Error, Result};
use medmatch_db::AuthUser;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// An in-flight HTTP request, body already collected.
#[derive(Debug, Clone)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	pub body: Bytes,
	pub remote_addr: Option<SocketAddr>,
	/// Set by the session middleware once the bearer key resolves.
	pub user: Option<AuthUser>,
}

impl Request {
	pub fn new(method: Method, uri: Uri, version: Version, headers: HeaderMap, body: Bytes) -> Self {
		Self {
			method,
			uri,
			version,
			headers,
			body,
			remote_addr: None,
			user: None,
		}
	}

	pub fn path(&self) -> &str {
		self.uri.path()
	}

	/// Query string parameters, last value wins for duplicates.
	pub fn query_params(&self) -> HashMap<String, String> {
		let mut params = HashMap::new();
		if let Some(query) = self.uri.query() {
			for pair in query.split('&') {
				let mut parts = pair.splitn(2, '=');
				if let Some(key) = parts.next() {
					let value = parts.next().unwrap_or("");
					params.insert(key.to_string(), value.to_string());
				}
			}
		}
		params
	}

	/// Deserializes the body as JSON.
	pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
		serde_json::from_slice(&self.body)
			.map_err(|_| Error::Validation("Invalid data format".to_string()))
	}

	/// The bearer token from the `Authorization` header, if any.
	pub fn bearer_token(&self) -> Option<&str> {
		self.headers
			.get(hyper::header::AUTHORIZATION)
			.and_then(|h| h.to_str().ok())
			.and_then(|h| h.strip_prefix("Bearer "))
			.map(str::trim)
	}

	/// The authenticated identity, or a 401-mapped error.
	pub fn require_user(&self) -> Result<&AuthUser> {
		self.user
			.as_ref()
			.ok_or_else(|| Error::Authentication("Authentication required".to_string()))
	}
}

/// An outgoing HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Response {
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	pub fn created() -> Self {
		Self::new(StatusCode::CREATED)
	}

	pub fn no_content() -> Self {
		Self::new(StatusCode::NO_CONTENT)
	}

	pub fn bad_request() -> Self {
		Self::new(StatusCode::BAD_REQUEST)
	}

	pub fn unauthorized() -> Self {
		Self::new(StatusCode::UNAUTHORIZED)
	}

	pub fn forbidden() -> Self {
		Self::new(StatusCode::FORBIDDEN)
	}

	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND)
	}

	pub fn method_not_allowed() -> Self {
		Self::new(StatusCode::METHOD_NOT_ALLOWED)
	}

	pub fn internal_server_error() -> Self {
		Self::new(StatusCode::INTERNAL_SERVER_ERROR)
	}

	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Serializes the value as the JSON body and sets the content type.
	pub fn with_json<T: Serialize>(mut self, value: &T) -> Self {
		match serde_json::to_vec(value) {
			Ok(body) => {
				self.headers.insert(
					hyper::header::CONTENT_TYPE,
					hyper::header::HeaderValue::from_static("application/json"),
				);
				self.body = Bytes::from(body);
				self
			}
			Err(e) => {
				tracing::error!(error = %e, "response serialization failed");
				Self::internal_server_error()
					.with_json(&serde_json::json!({"error": "Internal server error"}))
			}
		}
	}
}

/// Maps the application error taxonomy onto HTTP statuses.
///
/// Storage details never leak to the client; the collection name stays
/// in the log line only.
pub fn error_response(error: &Error) -> Response {
	match error {
		Error::Validation(message) => {
			Response::bad_request().with_json(&serde_json::json!({"error": message}))
		}
		Error::Authentication(message) => {
			Response::unauthorized().with_json(&serde_json::json!({"error": message}))
		}
		Error::Authorization(_) => {
			Response::forbidden().with_json(&serde_json::json!({"error": "Access denied"}))
		}
		Error::NotFound(what) => {
			Response::not_found().with_json(&serde_json::json!({"error": format!("Not found: {}", what)}))
		}
		Error::Database(detail) => {
			tracing::error!(detail, "database error");
			Response::internal_server_error()
				.with_json(&serde_json::json!({"error": "Internal server error"}))
		}
		Error::Http(detail) => {
			tracing::error!(detail, "http error");
			Response::internal_server_error()
				.with_json(&serde_json::json!({"error": "Internal server error"}))
		}
		Error::Other(e) => {
			tracing::error!(error = %e, "unhandled error");
			Response::internal_server_error()
				.with_json(&serde_json::json!({"error": "Internal server error"}))
		}
	}
}

/// Core request-processing abstraction; every route target and the
/// composed application implement this.
#[async_trait]
pub trait Handler: Send + Sync {
	async fn handle(&self, request: Request) -> Result<Response>;
}

#[async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
	async fn handle(&self, request: Request) -> Result<Response> {
		(**self).handle(request).await
	}
}

/// Wraps a handler; composition, not inheritance.
#[async_trait]
pub trait Middleware: Send + Sync {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response>;
}

/// Composes middlewares around a terminal handler, outermost first.
pub struct MiddlewareChain {
	middlewares: Vec<Arc<dyn Middleware>>,
	handler: Arc<dyn Handler>,
}

impl MiddlewareChain {
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			middlewares: Vec::new(),
			handler,
		}
	}

	pub fn add_middleware(&mut self, middleware: Arc<dyn Middleware>) {
		self.middlewares.push(middleware);
	}
}

struct ChainLink {
	middleware: Arc<dyn Middleware>,
	next: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for ChainLink {
	async fn handle(&self, request: Request) -> Result<Response> {
		self.middleware.process(request, self.next.clone()).await
	}
}

#[async_trait]
impl Handler for MiddlewareChain {
	async fn handle(&self, request: Request) -> Result<Response> {
		let mut current: Arc<dyn Handler> = self.handler.clone();
		for middleware in self.middlewares.iter().rev() {
			current = Arc::new(ChainLink {
				middleware: middleware.clone(),
				next: current,
			});
		}
		current.handle(request).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Echo;

	#[async_trait]
	impl Handler for Echo {
		async fn handle(&self, request: Request) -> Result<Response> {
			Ok(Response::ok().with_body(request.body))
		}
	}

	struct Prefix(&'static str);

	#[async_trait]
	impl Middleware for Prefix {
		async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
			let response = next.handle(request).await?;
			let body = format!("{}{}", self.0, String::from_utf8_lossy(&response.body));
			Ok(Response::ok().with_body(body))
		}
	}

	fn request(method: Method, path: &str, body: &str) -> Request {
		Request::new(
			method,
			path.parse().unwrap(),
			Version::HTTP_11,
			HeaderMap::new(),
			Bytes::from(body.to_string()),
		)
	}

	#[tokio::test]
	async fn middlewares_run_in_registration_order() {
		let mut chain = MiddlewareChain::new(Arc::new(Echo));
		chain.add_middleware(Arc::new(Prefix("first:")));
		chain.add_middleware(Arc::new(Prefix("second:")));

		let response = chain
			.handle(request(Method::GET, "/", "body"))
			.await
			.unwrap();
		assert_eq!(&response.body[..], b"first:second:body");
	}

	#[test]
	fn query_params_and_bearer() {
		let mut req = request(Method::GET, "/admin/users?limit=5&search=chen", "");
		assert_eq!(req.query_params().get("limit").map(String::as_str), Some("5"));
		assert_eq!(
			req.query_params().get("search").map(String::as_str),
			Some("chen")
		);
		assert!(req.bearer_token().is_none());
		req.headers.insert(
			hyper::header::AUTHORIZATION,
			"Bearer abc123".parse().unwrap(),
		);
		assert_eq!(req.bearer_token(), Some("abc123"));
	}

	#[test]
	fn error_statuses() {
		assert_eq!(
			error_response(&Error::Validation("bad".into())).status,
			StatusCode::BAD_REQUEST
		);
		assert_eq!(
			error_response(&Error::Authentication("no".into())).status,
			StatusCode::UNAUTHORIZED
		);
		assert_eq!(
			error_response(&Error::Authorization("no".into())).status,
			StatusCode::FORBIDDEN
		);
		assert_eq!(
			error_response(&Error::NotFound("x".into())).status,
			StatusCode::NOT_FOUND
		);
		assert_eq!(
			error_response(&Error::Database("collection profiles: oops".into())).status,
			StatusCode::INTERNAL_SERVER_ERROR
		);
	}
}
