//! Schema creation.
//!
//! Every singleton collection carries a unique index on `user_id`, so
//! delete-then-insert upserts cannot leave duplicate rows behind even
//! under a double-submit. Timestamps are RFC 3339 TEXT, set-valued
//! fields are JSON arrays in TEXT, booleans are 0/1 INTEGER - the same
//! portable column shapes on SQLite and PostgreSQL.

use medmatch_core::Result;
use sea_query::{Alias, ColumnDef, Index, SqliteQueryBuilder, Table};

use crate::store::MatchStore;

fn text(name: &str) -> ColumnDef {
	let mut col = ColumnDef::new(Alias::new(name));
	col.text().not_null();
	col
}

fn text_null(name: &str) -> ColumnDef {
	let mut col = ColumnDef::new(Alias::new(name));
	col.text();
	col
}

fn flag(name: &str) -> ColumnDef {
	let mut col = ColumnDef::new(Alias::new(name));
	col.integer().not_null().default(0);
	col
}

impl MatchStore {
	/// Creates every table and index, skipping ones that already exist.
	pub async fn create_schema(&self) -> Result<()> {
		let statements: Vec<(String, &str)> = vec![
			(
				Table::create()
					.table(Alias::new("auth_users"))
					.if_not_exists()
					.col(text("id").primary_key())
					.col(text("username").unique_key())
					.col(text("email"))
					.col(text("password_hash"))
					.col(
						ColumnDef::new(Alias::new("is_active"))
							.integer()
							.not_null()
							.default(1),
					)
					.col(text("created_at"))
					.to_string(SqliteQueryBuilder),
				"auth_users",
			),
			(
				Table::create()
					.table(Alias::new("sessions"))
					.if_not_exists()
					.col(text("session_key").primary_key())
					.col(text("user_id"))
					.col(text("expires_at"))
					.to_string(SqliteQueryBuilder),
				"sessions",
			),
			(
				Table::create()
					.table(Alias::new("profiles"))
					.if_not_exists()
					.col(text("user_id").primary_key())
					.col(text_null("display_name"))
					.col(text_null("avatar_ref"))
					.col(text_null("city"))
					.col(text_null("nationality"))
					.col(text_null("gender"))
					.col(flag("is_onboarding_complete"))
					.col(flag("is_matchable"))
					.col(text("created_at"))
					.col(text("updated_at"))
					.to_string(SqliteQueryBuilder),
				"profiles",
			),
			(
				Table::create()
					.table(Alias::new("medical_profiles"))
					.if_not_exists()
					.col(text("id").primary_key())
					.col(text("user_id"))
					.col(text("specialties"))
					.col(text("career_stage"))
					.col(text("specialty_preference"))
					.col(text("gender_preference"))
					.to_string(SqliteQueryBuilder),
				"medical_profiles",
			),
			(
				Table::create()
					.table(Alias::new("activity_levels"))
					.if_not_exists()
					.col(text("id").primary_key())
					.col(text("user_id"))
					.col(text("level"))
					.to_string(SqliteQueryBuilder),
				"activity_levels",
			),
			(
				Table::create()
					.table(Alias::new("user_activities"))
					.if_not_exists()
					.col(text("id").primary_key())
					.col(text("user_id"))
					.col(text("sport"))
					.col(
						ColumnDef::new(Alias::new("interest_level"))
							.integer()
							.not_null(),
					)
					.to_string(SqliteQueryBuilder),
				"user_activities",
			),
			(
				Table::create()
					.table(Alias::new("user_interests"))
					.if_not_exists()
					.col(text("id").primary_key())
					.col(text("user_id"))
					.col(text("category"))
					.col(text("value"))
					.to_string(SqliteQueryBuilder),
				"user_interests",
			),
			(
				Table::create()
					.table(Alias::new("social_preferences"))
					.if_not_exists()
					.col(text("id").primary_key())
					.col(text("user_id"))
					.col(text("meeting_activities"))
					.col(text("social_energy"))
					.col(text("conversation_style"))
					.col(text_null("ideal_weekend"))
					.col(text("looking_for"))
					.to_string(SqliteQueryBuilder),
				"social_preferences",
			),
			(
				Table::create()
					.table(Alias::new("availability"))
					.if_not_exists()
					.col(text("id").primary_key())
					.col(text("user_id"))
					.col(text("meeting_times"))
					.col(text("frequency"))
					.to_string(SqliteQueryBuilder),
				"availability",
			),
			(
				Table::create()
					.table(Alias::new("lifestyles"))
					.if_not_exists()
					.col(text("id").primary_key())
					.col(text("user_id"))
					.col(text_null("dietary_restriction"))
					.col(text("life_stage"))
					.to_string(SqliteQueryBuilder),
				"lifestyles",
			),
			(
				Table::create()
					.table(Alias::new("notifications"))
					.if_not_exists()
					.col(text("id").primary_key())
					.col(text("user_id"))
					.col(text("title"))
					.col(text("message"))
					.col(text("kind"))
					.col(flag("is_read"))
					.col(text_null("read_at"))
					.col(text_null("link"))
					.col(text("created_at"))
					.to_string(SqliteQueryBuilder),
				"notifications",
			),
			(
				Table::create()
					.table(Alias::new("admin_roles"))
					.if_not_exists()
					.col(text("id").primary_key())
					.col(text("user_id"))
					.col(text("role"))
					.to_string(SqliteQueryBuilder),
				"admin_roles",
			),
		];

		for (sql, collection) in statements {
			self.exec(&sql, collection).await?;
		}

		// Unique owner index per singleton collection.
		for table in [
			"medical_profiles",
			"activity_levels",
			"social_preferences",
			"availability",
			"lifestyles",
			"admin_roles",
		] {
			let sql = Index::create()
				.if_not_exists()
				.name(format!("idx_{}_user", table))
				.table(Alias::new(table))
				.col(Alias::new("user_id"))
				.unique()
				.to_string(SqliteQueryBuilder);
			self.exec(&sql, table).await?;
		}

		// Lookup indexes for the list collections.
		for table in ["user_activities", "user_interests", "notifications", "sessions"] {
			let sql = Index::create()
				.if_not_exists()
				.name(format!("idx_{}_user", table))
				.table(Alias::new(table))
				.col(Alias::new("user_id"))
				.to_string(SqliteQueryBuilder);
			self.exec(&sql, table).await?;
		}

		Ok(())
	}
}
