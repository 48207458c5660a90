//! # medmatch
//!
//! Server side of a social-matching application for medical professionals.
//!
//! The crate is a thin facade over the workspace members:
//!
//! - [`core`] - error taxonomy, the eight-domain field codec, wire payload types
//! - [`db`] - sqlx-backed stores and the transactional onboarding submit
//! - [`wizard`] - the onboarding state machine with resumable drafts
//! - [`profile`] - the profile reconciler (fan-out reads, partial updates)
//! - [`admin`] - role gating and paginated back-office queries
//! - [`server`] - the hyper HTTP surface
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use medmatch::db::MatchStore;
//! use medmatch::server::{AppRouter, HttpServer};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MatchStore::connect("sqlite::memory:").await?;
//! store.create_schema().await?;
//!
//! let router = AppRouter::handler(store);
//! HttpServer::new(router).listen("127.0.0.1:8000".parse()?).await?;
//! # Ok(())
//! # }
//! ```

pub use medmatch_admin as admin;
pub use medmatch_core as core;
pub use medmatch_db as db;
pub use medmatch_profile as profile;
pub use medmatch_server as server;
pub use medmatch_wizard as wizard;
