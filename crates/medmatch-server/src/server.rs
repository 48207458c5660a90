//! The hyper HTTP/1.1 server loop.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

use crate::http::{Handler, Middleware, MiddlewareChain, Request, Response};

/// Fans a shutdown signal out to the accept loop and every live
/// connection.
#[derive(Clone)]
pub struct ShutdownCoordinator {
	tx: broadcast::Sender<()>,
	done_tx: broadcast::Sender<()>,
	grace: Duration,
}

impl ShutdownCoordinator {
	pub fn new(grace: Duration) -> Self {
		let (tx, _) = broadcast::channel(1);
		let (done_tx, _) = broadcast::channel(1);
		Self { tx, done_tx, grace }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<()> {
		self.tx.subscribe()
	}

	/// Starts the shutdown.
	pub fn shutdown(&self) {
		let _ = self.tx.send(());
	}

	pub(crate) fn notify_shutdown_complete(&self) {
		let _ = self.done_tx.send(());
	}

	/// Waits until the server reports it stopped accepting, or the
	/// grace period runs out.
	pub async fn wait_for_shutdown(&self) {
		let mut done = self.done_tx.subscribe();
		let _ = tokio::time::timeout(self.grace, done.recv()).await;
	}
}

/// Resolves when the process receives SIGINT.
pub async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %e, "failed to install signal handler");
	}
}

/// HTTP server with middleware support.
pub struct HttpServer {
	handler: Arc<dyn Handler>,
	middlewares: Vec<Arc<dyn Middleware>>,
}

impl HttpServer {
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			handler,
			middlewares: Vec::new(),
		}
	}

	/// Adds a middleware; middlewares run in the order they are added.
	pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
		self.middlewares.push(middleware);
		self
	}

	fn build_handler(&self) -> Arc<dyn Handler> {
		if self.middlewares.is_empty() {
			return self.handler.clone();
		}
		let mut chain = MiddlewareChain::new(self.handler.clone());
		for middleware in &self.middlewares {
			chain.add_middleware(middleware.clone());
		}
		Arc::new(chain)
	}

	/// Accept loop without shutdown handling; runs until an error.
	pub async fn listen(self, addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
		let listener = TcpListener::bind(addr).await?;
		tracing::info!(%addr, "listening");

		let handler = self.build_handler();
		loop {
			let (stream, socket_addr) = listener.accept().await?;
			let handler = handler.clone();
			tokio::task::spawn(async move {
				if let Err(err) = Self::handle_connection(stream, socket_addr, handler).await {
					tracing::warn!(error = %err, "connection error");
				}
			});
		}
	}

	/// Accept loop that drains on a shutdown signal.
	pub async fn listen_with_shutdown(
		self,
		addr: SocketAddr,
		coordinator: ShutdownCoordinator,
	) -> Result<(), Box<dyn std::error::Error>> {
		let listener = TcpListener::bind(addr).await?;
		tracing::info!(%addr, "listening");

		let handler = self.build_handler();
		let mut shutdown_rx = coordinator.subscribe();

		loop {
			tokio::select! {
				result = listener.accept() => {
					let (stream, socket_addr) = result?;
					let handler = handler.clone();
					let mut conn_shutdown = coordinator.subscribe();
					tokio::task::spawn(async move {
						tokio::select! {
							result = Self::handle_connection(stream, socket_addr, handler) => {
								if let Err(err) = result {
									tracing::warn!(error = %err, "connection error");
								}
							}
							_ = conn_shutdown.recv() => {}
						}
					});
				}
				_ = shutdown_rx.recv() => {
					tracing::info!("shutdown signal received, draining");
					break;
				}
			}
		}

		coordinator.notify_shutdown_complete();
		Ok(())
	}

	async fn handle_connection(
		stream: TcpStream,
		socket_addr: SocketAddr,
		handler: Arc<dyn Handler>,
	) -> Result<(), Box<dyn std::error::Error>> {
		let io = TokioIo::new(stream);
		let service = RequestService {
			handler,
			remote_addr: socket_addr,
		};
		http1::Builder::new().serve_connection(io, service).await?;
		Ok(())
	}
}

/// Adapter between hyper's `Service` and our [`Handler`].
struct RequestService {
	handler: Arc<dyn Handler>,
	remote_addr: SocketAddr,
}

impl Service<hyper::Request<Incoming>> for RequestService {
	type Response = hyper::Response<Full<Bytes>>;
	type Error = Box<dyn std::error::Error + Send + Sync>;
	type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

	fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
		let handler = self.handler.clone();
		let remote_addr = self.remote_addr;

		Box::pin(async move {
			let (parts, body) = req.into_parts();
			let body_bytes = body.collect().await?.to_bytes();

			let mut request = Request::new(
				parts.method,
				parts.uri,
				parts.version,
				parts.headers,
				body_bytes,
			);
			request.remote_addr = Some(remote_addr);

			let response = handler
				.handle(request)
				.await
				.unwrap_or_else(|_| Response::internal_server_error());

			let mut hyper_response = hyper::Response::builder().status(response.status);
			for (key, value) in response.headers.iter() {
				hyper_response = hyper_response.header(key, value);
			}
			Ok(hyper_response.body(Full::new(response.body))?)
		})
	}
}
