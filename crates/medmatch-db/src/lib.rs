//! Persistence layer for medmatch.
//!
//! Everything is keyed by the owning user id. Singleton collections
//! (medical profile, activity level, social preferences, availability,
//! lifestyle) hold at most one row per user, enforced by a unique index
//! on the owner column; list collections (sports, interests) are always
//! fully replaced on write. The eight-collection onboarding submit runs
//! inside a single transaction, so a failed submit leaves no partial
//! state behind.
//!
//! SQL is built with sea-query and executed through a sqlx [`sqlx::AnyPool`],
//! which keeps SQLite (tests, local development) and PostgreSQL
//! (production) behind the same store.

mod admin;
mod auth;
mod notifications;
mod onboarding;
mod schema;
mod store;

pub use admin::{AdminRole, ProfileSummary, UserFilter};
pub use auth::{AuthUser, SESSION_TTL_SECONDS, hash_password};
pub use notifications::{NewNotification, Notification};
pub use onboarding::{MedicalRow, ProfileFlags, ProfileRow, SocialRow};
pub use store::MatchStore;
