//! The back office.
//!
//! Everything here is gated by [`AccessPolicy`], which re-reads the
//! acting user's role from storage on every call. The HTTP layer only
//! supplies an authenticated identity; authorization lives here.

mod pagination;
mod policy;
mod service;

pub use pagination::{DEFAULT_LIMIT, LimitOffset, MAX_LIMIT, PaginatedResponse};
pub use policy::AccessPolicy;
pub use service::{AdminService, DashboardStats};
