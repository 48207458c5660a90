//! Admin-side store: roles, paginated user listings, row deletes.
//!
//! Role lookups are the source of truth for authorization - callers
//! re-derive the role per mutating call instead of trusting anything
//! client-supplied.

use medmatch_core::{Error, Result};
use sea_query::{Alias, Condition, Expr, ExprTrait, Order, Query, SqliteQueryBuilder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::onboarding::{delete_profile_data, get_int, get_text, get_text_opt};
use crate::store::{MatchStore, commit};

/// Back-office role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
	Admin,
	SuperAdmin,
}

impl AdminRole {
	/// Storage value for the role column.
	pub fn as_str(self) -> &'static str {
		match self {
			AdminRole::Admin => "admin",
			AdminRole::SuperAdmin => "super_admin",
		}
	}

	fn from_str(raw: &str) -> Option<Self> {
		match raw {
			"admin" => Some(AdminRole::Admin),
			"super_admin" => Some(AdminRole::SuperAdmin),
			_ => None,
		}
	}
}

/// Filters for the paginated user listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
	/// Substring match against display name and city.
	pub search: Option<String>,
	/// Restrict to profiles with the given onboarding-complete flag.
	pub onboarding_complete: Option<bool>,
}

/// One row of the admin user listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
	pub user_id: String,
	pub display_name: Option<String>,
	pub city: Option<String>,
	pub is_onboarding_complete: bool,
	pub is_matchable: bool,
	pub created_at: String,
}

impl MatchStore {
	/// Looks up the admin role of an identity, if any.
	pub async fn role_of(&self, user_id: &str) -> Result<Option<AdminRole>> {
		let sql = Query::select()
			.column(Alias::new("role"))
			.from(Alias::new("admin_roles"))
			.and_where(Expr::col(Alias::new("user_id")).eq(user_id))
			.to_string(SqliteQueryBuilder);
		let row = self.fetch_optional(&sql, "admin_roles").await?;
		Ok(row
			.map(|row| get_text(&row, "role"))
			.transpose()?
			.and_then(|raw| AdminRole::from_str(&raw)))
	}

	/// Grants (or replaces) an identity's admin role.
	pub async fn grant_role(&self, user_id: &str, role: AdminRole) -> Result<()> {
		let delete = Query::delete()
			.from_table(Alias::new("admin_roles"))
			.and_where(Expr::col(Alias::new("user_id")).eq(user_id))
			.to_string(SqliteQueryBuilder);
		self.exec(&delete, "admin_roles").await?;
		let sql = Query::insert()
			.into_table(Alias::new("admin_roles"))
			.columns([Alias::new("id"), Alias::new("user_id"), Alias::new("role")])
			.values([
				Expr::val(Uuid::new_v4().to_string()),
				Expr::val(user_id),
				Expr::val(role.as_str()),
			])
			.map_err(|e| Error::database("admin_roles", e))?
			.to_string(SqliteQueryBuilder);
		self.exec(&sql, "admin_roles").await?;
		Ok(())
	}

	/// Paginated profile listing with substring search and an
	/// onboarding filter. Returns the page plus the total row count.
	pub async fn list_profiles(
		&self,
		filter: &UserFilter,
		limit: u64,
		offset: u64,
	) -> Result<(Vec<ProfileSummary>, i64)> {
		// Conditions are not Send; render both statements before awaiting.
		let (count_sql, sql) = {
			let mut condition = Condition::all();
			if let Some(search) = filter.search.as_deref() {
				let pattern = format!("%{}%", search);
				condition = condition.add(
					Condition::any()
						.add(Expr::col(Alias::new("display_name")).like(pattern.clone()))
						.add(Expr::col(Alias::new("city")).like(pattern)),
				);
			}
			if let Some(complete) = filter.onboarding_complete {
				condition = condition.add(
					Expr::col(Alias::new("is_onboarding_complete"))
						.eq(if complete { 1 } else { 0 }),
				);
			}

			let count_sql = Query::select()
				.expr_as(Expr::cust("COUNT(*)"), Alias::new("cnt"))
				.from(Alias::new("profiles"))
				.cond_where(condition.clone())
				.to_string(SqliteQueryBuilder);
			let sql = Query::select()
				.columns([
					Alias::new("user_id"),
					Alias::new("display_name"),
					Alias::new("city"),
					Alias::new("is_onboarding_complete"),
					Alias::new("is_matchable"),
					Alias::new("created_at"),
				])
				.from(Alias::new("profiles"))
				.cond_where(condition)
				.order_by(Alias::new("created_at"), Order::Desc)
				.limit(limit)
				.offset(offset)
				.to_string(SqliteQueryBuilder);
			(count_sql, sql)
		};
		let count_row = self
			.fetch_optional(&count_sql, "profiles")
			.await?
			.ok_or_else(|| Error::Database("count query returned no row".to_string()))?;
		let total = get_int(&count_row, "cnt")?;
		let rows = self.fetch_all(&sql, "profiles").await?;
		let summaries = rows
			.into_iter()
			.map(|row| {
				Ok(ProfileSummary {
					user_id: get_text(&row, "user_id")?,
					display_name: get_text_opt(&row, "display_name")?,
					city: get_text_opt(&row, "city")?,
					is_onboarding_complete: get_int(&row, "is_onboarding_complete")? != 0,
					is_matchable: get_int(&row, "is_matchable")? != 0,
					created_at: get_text(&row, "created_at")?,
				})
			})
			.collect::<Result<Vec<_>>>()?;
		Ok((summaries, total))
	}

	/// Deletes a user's profile and every related collection row.
	///
	/// The auth identity is left in place, matching the back-office
	/// behavior of the original system.
	pub async fn delete_profile(&self, user_id: &str) -> Result<()> {
		let mut tx = self.begin().await?;
		delete_profile_data(&mut tx, user_id).await?;
		commit(tx).await?;
		tracing::info!(user_id, "profile deleted by admin");
		Ok(())
	}

	/// Every profile's owner id. Drives notification broadcasts.
	pub async fn profile_ids(&self) -> Result<Vec<String>> {
		let sql = Query::select()
			.column(Alias::new("user_id"))
			.from(Alias::new("profiles"))
			.to_string(SqliteQueryBuilder);
		let rows = self.fetch_all(&sql, "profiles").await?;
		rows.iter().map(|row| get_text(row, "user_id")).collect()
	}

	/// Total number of profiles.
	pub async fn count_profiles(&self) -> Result<i64> {
		self.count_where("SELECT COUNT(*) AS cnt FROM profiles").await
	}

	/// Number of profiles that finished onboarding.
	pub async fn count_onboarded(&self) -> Result<i64> {
		self.count_where("SELECT COUNT(*) AS cnt FROM profiles WHERE is_onboarding_complete = 1")
			.await
	}

	/// Number of matchable profiles.
	pub async fn count_matchable(&self) -> Result<i64> {
		self.count_where("SELECT COUNT(*) AS cnt FROM profiles WHERE is_matchable = 1")
			.await
	}

	async fn count_where(&self, sql: &str) -> Result<i64> {
		let row = self
			.fetch_optional(sql, "profiles")
			.await?
			.ok_or_else(|| Error::Database("count query returned no row".to_string()))?;
		get_int(&row, "cnt")
	}
}
