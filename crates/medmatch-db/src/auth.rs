//! Identity and session store.
//!
//! Passwords are hashed with Argon2id. Sessions are opaque keys handed
//! out at login and resolved per request; expired rows are dropped
//! lazily on lookup.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use medmatch_core::{Error, Result};
use sea_query::{Alias, Expr, ExprTrait, Query, SqliteQueryBuilder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::onboarding::{get_int, get_text};
use crate::store::{MatchStore, now_rfc3339};

/// How long a session stays valid: two weeks.
pub const SESSION_TTL_SECONDS: i64 = 60 * 60 * 24 * 14;

/// A stored identity, without the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
	pub id: String,
	pub username: String,
	pub email: String,
	pub is_active: bool,
	pub created_at: String,
}

/// Hashes a password with Argon2id and a fresh salt.
pub fn hash_password(password: &str) -> Result<String> {
	let salt = SaltString::generate(&mut OsRng);
	Argon2::default()
		.hash_password(password.as_bytes(), &salt)
		.map(|hash| hash.to_string())
		.map_err(|e| Error::Other(anyhow::anyhow!("password hashing failed: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> bool {
	PasswordHash::new(hash)
		.map(|parsed| {
			Argon2::default()
				.verify_password(password.as_bytes(), &parsed)
				.is_ok()
		})
		.unwrap_or(false)
}

fn user_from_row(row: &sqlx::any::AnyRow) -> Result<AuthUser> {
	Ok(AuthUser {
		id: get_text(row, "id")?,
		username: get_text(row, "username")?,
		email: get_text(row, "email")?,
		is_active: get_int(row, "is_active")? != 0,
		created_at: get_text(row, "created_at")?,
	})
}

const USER_COLUMNS: [&str; 5] = ["id", "username", "email", "is_active", "created_at"];

impl MatchStore {
	/// Creates an identity with a hashed password.
	///
	/// Fails with [`Error::Validation`] when the username is taken.
	pub async fn create_user(&self, username: &str, email: &str, password: &str) -> Result<AuthUser> {
		if self.find_user(username).await?.is_some() {
			return Err(Error::Validation(format!(
				"username '{}' is already taken",
				username
			)));
		}
		let user = AuthUser {
			id: Uuid::new_v4().to_string(),
			username: username.to_string(),
			email: email.to_string(),
			is_active: true,
			created_at: now_rfc3339(),
		};
		let hash = hash_password(password)?;
		let sql = Query::insert()
			.into_table(Alias::new("auth_users"))
			.columns([
				Alias::new("id"),
				Alias::new("username"),
				Alias::new("email"),
				Alias::new("password_hash"),
				Alias::new("is_active"),
				Alias::new("created_at"),
			])
			.values([
				Expr::val(user.id.clone()),
				Expr::val(user.username.clone()),
				Expr::val(user.email.clone()),
				Expr::val(hash),
				Expr::val(1),
				Expr::val(user.created_at.clone()),
			])
			.map_err(|e| Error::database("auth_users", e))?
			.to_string(SqliteQueryBuilder);
		self.exec(&sql, "auth_users").await?;
		tracing::info!(username, "user created");
		Ok(user)
	}

	/// Looks an identity up by username.
	pub async fn find_user(&self, username: &str) -> Result<Option<AuthUser>> {
		let sql = Query::select()
			.columns(USER_COLUMNS.map(Alias::new))
			.from(Alias::new("auth_users"))
			.and_where(Expr::col(Alias::new("username")).eq(username))
			.to_string(SqliteQueryBuilder);
		let row = self.fetch_optional(&sql, "auth_users").await?;
		row.as_ref().map(user_from_row).transpose()
	}

	/// Checks a username/password pair against the stored hash.
	///
	/// Inactive accounts and unknown usernames fail the same way as a
	/// wrong password.
	pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<AuthUser> {
		let sql = Query::select()
			.columns(
				USER_COLUMNS
					.iter()
					.copied()
					.chain(["password_hash"])
					.map(Alias::new)
					.collect::<Vec<_>>(),
			)
			.from(Alias::new("auth_users"))
			.and_where(Expr::col(Alias::new("username")).eq(username))
			.to_string(SqliteQueryBuilder);
		let Some(row) = self.fetch_optional(&sql, "auth_users").await? else {
			return Err(Error::Authentication("invalid credentials".to_string()));
		};
		let user = user_from_row(&row)?;
		let hash = get_text(&row, "password_hash")?;
		if !user.is_active || !verify_password(password, &hash) {
			return Err(Error::Authentication("invalid credentials".to_string()));
		}
		Ok(user)
	}

	/// Opens a session for a user and returns the opaque session key.
	pub async fn create_session(&self, user_id: &str) -> Result<String> {
		let key = Uuid::new_v4().to_string();
		let expires = chrono::Utc::now() + chrono::Duration::seconds(SESSION_TTL_SECONDS);
		let sql = Query::insert()
			.into_table(Alias::new("sessions"))
			.columns([
				Alias::new("session_key"),
				Alias::new("user_id"),
				Alias::new("expires_at"),
			])
			.values([
				Expr::val(key.clone()),
				Expr::val(user_id),
				Expr::val(expires.to_rfc3339()),
			])
			.map_err(|e| Error::database("sessions", e))?
			.to_string(SqliteQueryBuilder);
		self.exec(&sql, "sessions").await?;
		Ok(key)
	}

	/// Resolves a session key to its identity.
	///
	/// Expired sessions are deleted on sight and resolve to `None`.
	pub async fn load_session(&self, session_key: &str) -> Result<Option<AuthUser>> {
		let sql = Query::select()
			.columns([Alias::new("user_id"), Alias::new("expires_at")])
			.from(Alias::new("sessions"))
			.and_where(Expr::col(Alias::new("session_key")).eq(session_key))
			.to_string(SqliteQueryBuilder);
		let Some(row) = self.fetch_optional(&sql, "sessions").await? else {
			return Ok(None);
		};
		let expires_at = get_text(&row, "expires_at")?;
		let expired = chrono::DateTime::parse_from_rfc3339(&expires_at)
			.map(|when| when < chrono::Utc::now())
			.unwrap_or(true);
		if expired {
			self.delete_session(session_key).await?;
			return Ok(None);
		}
		let user_id = get_text(&row, "user_id")?;
		let sql = Query::select()
			.columns(USER_COLUMNS.map(Alias::new))
			.from(Alias::new("auth_users"))
			.and_where(Expr::col(Alias::new("id")).eq(user_id))
			.to_string(SqliteQueryBuilder);
		let row = self.fetch_optional(&sql, "auth_users").await?;
		row.as_ref().map(user_from_row).transpose()
	}

	/// Removes a session, if it exists.
	pub async fn delete_session(&self, session_key: &str) -> Result<()> {
		let sql = Query::delete()
			.from_table(Alias::new("sessions"))
			.and_where(Expr::col(Alias::new("session_key")).eq(session_key))
			.to_string(SqliteQueryBuilder);
		self.exec(&sql, "sessions").await?;
		Ok(())
	}

	/// Wipes every identity without an admin role, along with all of its
	/// data. Used by the seed tool before repopulating.
	pub async fn delete_non_admin_users(&self) -> Result<u64> {
		let keep = "SELECT user_id FROM admin_roles";
		for table in [
			"sessions",
			"profiles",
			"medical_profiles",
			"activity_levels",
			"user_activities",
			"user_interests",
			"social_preferences",
			"availability",
			"lifestyles",
			"notifications",
		] {
			let sql = format!("DELETE FROM {} WHERE user_id NOT IN ({})", table, keep);
			self.exec(&sql, table).await?;
		}
		let sql = format!("DELETE FROM auth_users WHERE id NOT IN ({})", keep);
		let result = self.exec(&sql, "auth_users").await?;
		Ok(result.rows_affected())
	}
}
