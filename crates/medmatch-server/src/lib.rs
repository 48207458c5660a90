//! The HTTP surface.
//!
//! A small hyper 1.x server: [`HttpServer`] owns the accept loop,
//! [`AppRouter`] maps routes to the domain services, and the
//! [`Middleware`] chain handles request logging and session auth before
//! any route runs.
//!
//! ```rust,no_run
//! use medmatch_db::MatchStore;
//! use medmatch_server::{AppRouter, HttpServer};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MatchStore::connect("sqlite:medmatch.db").await?;
//! store.create_schema().await?;
//! let handler = AppRouter::handler(store);
//! HttpServer::new(handler).listen("127.0.0.1:8000".parse()?).await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod http;
mod middleware;
mod router;
mod server;

pub use config::ServerConfig;
pub use http::{Handler, Middleware, MiddlewareChain, Request, Response, error_response};
pub use middleware::{SessionAuthMiddleware, TracingMiddleware};
pub use router::AppRouter;
pub use server::{HttpServer, ShutdownCoordinator, shutdown_signal};
