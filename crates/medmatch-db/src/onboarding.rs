//! The onboarding/profile repositories.
//!
//! Writes take *encoded* records (storage codes, produced by
//! `medmatch_core::mapper::encode_record`); reads hand encoded rows back.
//! Display translation is the caller's concern.
//!
//! Write granularity follows the product rules exactly: each step is
//! independently optional in a partial update, but within a supplied
//! step the array-valued sub-resources (sports, interests) are fully
//! replaced, never diffed. Two steps share the `social_preferences` row
//! (step 5 carries the style fields, step 7 the looking-for fields), so
//! each side preserves the other's columns on write.

use medmatch_core::codec::Domain;
use medmatch_core::steps::{
	BasicInfo, InterestCategory, Interests, LifestyleInfo, LookingFor, MedicalBackground,
	OnboardingRecord, PhysicalActivity, SocialStyle, SportInterest, WeeklySlots,
};
use medmatch_core::{Error, Result};
use sea_query::{Alias, Expr, ExprTrait, Query, SqliteQueryBuilder};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::any::AnyRow;
use uuid::Uuid;

use crate::store::{MatchStore, Tx, commit, exec_tx, fetch_optional_tx, now_rfc3339};

/// Onboarding flags on the profile row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileFlags {
	pub is_onboarding_complete: bool,
	pub is_matchable: bool,
}

/// The profile row, as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRow {
	pub user_id: String,
	pub display_name: Option<String>,
	pub avatar_ref: Option<String>,
	pub city: Option<String>,
	pub nationality: Option<String>,
	pub gender: Option<String>,
	pub flags: ProfileFlags,
	pub created_at: String,
	pub updated_at: String,
}

/// The medical profile row, as stored (codes, not display strings).
#[derive(Debug, Clone, PartialEq)]
pub struct MedicalRow {
	pub specialties: Vec<String>,
	pub career_stage: String,
	pub specialty_preference: String,
	pub gender_preference: String,
}

/// The social preferences row, shared by steps 5 and 7.
#[derive(Debug, Clone, PartialEq)]
pub struct SocialRow {
	pub meeting_activities: Vec<String>,
	pub social_energy: String,
	pub conversation_style: String,
	pub ideal_weekend: Option<String>,
	pub looking_for: Vec<String>,
}

fn json_list(values: &[String]) -> String {
	serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

fn parse_list(raw: &str) -> Vec<String> {
	serde_json::from_str(raw).unwrap_or_default()
}

fn delete_by_user(table: &str, user_id: &str) -> String {
	Query::delete()
		.from_table(Alias::new(table))
		.and_where(Expr::col(Alias::new("user_id")).eq(user_id))
		.to_string(SqliteQueryBuilder)
}

fn select_by_user(table: &str, columns: &[&str], user_id: &str) -> String {
	Query::select()
		.columns(columns.iter().map(|c| Alias::new(*c)).collect::<Vec<_>>())
		.from(Alias::new(table))
		.and_where(Expr::col(Alias::new("user_id")).eq(user_id))
		.to_string(SqliteQueryBuilder)
}

impl MatchStore {
	/// Creates the profile row for a new identity if it does not exist.
	///
	/// Mirrors the signup trigger of the hosted platform: every identity
	/// gets a profile shell before onboarding starts.
	pub async fn ensure_profile(&self, user_id: &str, display_name: Option<&str>) -> Result<()> {
		let mut tx = self.begin().await?;
		ensure_profile_tx(&mut tx, user_id, display_name).await?;
		commit(tx).await
	}

	/// The atomic eight-collection onboarding submit.
	///
	/// Expects an *encoded* record whose required steps (1, 2, 5, 6, 7)
	/// are present; absent optional steps (3, 4, 8) are written with
	/// their documented defaults so every singleton collection ends up
	/// with exactly one row. Sets `is_onboarding_complete` and
	/// `is_matchable` in the same transaction. Fails as a unit.
	pub async fn submit_onboarding(&self, user_id: &str, record: &OnboardingRecord) -> Result<()> {
		let (Some(step1), Some(step2), Some(step5), Some(step6), Some(step7)) = (
			record.step1.as_ref(),
			record.step2.as_ref(),
			record.step5.as_ref(),
			record.step6.as_ref(),
			record.step7.as_ref(),
		) else {
			return Err(Error::Validation("Invalid data format".to_string()));
		};

		let default_step3 = PhysicalActivity {
			activity_level: Domain::ActivityLevel.default_code().to_string(),
			sports: Vec::new(),
		};
		let default_step4 = Interests::default();
		let default_step8 = LifestyleInfo {
			dietary_restriction: None,
			life_stage: Domain::LifeStage.default_code().to_string(),
		};
		let step3 = record.step3.as_ref().unwrap_or(&default_step3);
		let step4 = record.step4.as_ref().unwrap_or(&default_step4);
		let step8 = record.step8.as_ref().unwrap_or(&default_step8);

		let mut tx = self.begin().await?;
		ensure_profile_tx(&mut tx, user_id, step1.display_name.as_deref()).await?;
		write_profile_basics(&mut tx, user_id, step1).await?;
		write_medical(&mut tx, user_id, step2, Some(&step1.gender_preference)).await?;
		write_activity_level(&mut tx, user_id, &step3.activity_level).await?;
		replace_sports(&mut tx, user_id, &step3.sports).await?;
		replace_interests(&mut tx, user_id, step4).await?;
		write_social_style(&mut tx, user_id, step5).await?;
		write_availability(&mut tx, user_id, step6).await?;
		write_looking_for(&mut tx, user_id, step7).await?;
		write_lifestyle(&mut tx, user_id, step8).await?;
		set_flags(&mut tx, user_id, true, true).await?;
		commit(tx).await?;

		tracing::info!(user_id, "onboarding submitted");
		Ok(())
	}

	/// Applies a partial (per-step) update.
	///
	/// Only supplied steps touch their collections; unsupplied steps are
	/// left byte-for-byte unchanged. Within a supplied step, sports and
	/// interests are fully replaced.
	pub async fn apply_partial(&self, user_id: &str, record: &OnboardingRecord) -> Result<()> {
		if record.is_empty() {
			return Err(Error::Validation("Invalid data format".to_string()));
		}

		let mut tx = self.begin().await?;
		ensure_profile_tx(&mut tx, user_id, None).await?;
		if let Some(step1) = record.step1.as_ref() {
			write_profile_basics(&mut tx, user_id, step1).await?;
			write_gender_preference(&mut tx, user_id, &step1.gender_preference).await?;
		}
		if let Some(step2) = record.step2.as_ref() {
			write_medical(&mut tx, user_id, step2, None).await?;
		}
		if let Some(step3) = record.step3.as_ref() {
			write_activity_level(&mut tx, user_id, &step3.activity_level).await?;
			replace_sports(&mut tx, user_id, &step3.sports).await?;
		}
		if let Some(step4) = record.step4.as_ref() {
			replace_interests(&mut tx, user_id, step4).await?;
		}
		if let Some(step5) = record.step5.as_ref() {
			write_social_style(&mut tx, user_id, step5).await?;
		}
		if let Some(step6) = record.step6.as_ref() {
			write_availability(&mut tx, user_id, step6).await?;
		}
		if let Some(step7) = record.step7.as_ref() {
			write_looking_for(&mut tx, user_id, step7).await?;
		}
		if let Some(step8) = record.step8.as_ref() {
			write_lifestyle(&mut tx, user_id, step8).await?;
		}
		touch_profile(&mut tx, user_id).await?;
		commit(tx).await?;

		tracing::debug!(user_id, steps = ?record.supplied_steps(), "partial profile update applied");
		Ok(())
	}

	/// Point read of the profile row.
	pub async fn read_profile(&self, user_id: &str) -> Result<Option<ProfileRow>> {
		let sql = select_by_user(
			"profiles",
			&[
				"user_id",
				"display_name",
				"avatar_ref",
				"city",
				"nationality",
				"gender",
				"is_onboarding_complete",
				"is_matchable",
				"created_at",
				"updated_at",
			],
			user_id,
		);
		let row = self.fetch_optional(&sql, "profiles").await?;
		row.map(parse_profile_row).transpose()
	}

	/// Point read of the medical profile row.
	pub async fn read_medical(&self, user_id: &str) -> Result<Option<MedicalRow>> {
		let sql = select_by_user(
			"medical_profiles",
			&["specialties", "career_stage", "specialty_preference", "gender_preference"],
			user_id,
		);
		let row = self.fetch_optional(&sql, "medical_profiles").await?;
		row.map(|row| {
			Ok(MedicalRow {
				specialties: parse_list(&get_text(&row, "specialties")?),
				career_stage: get_text(&row, "career_stage")?,
				specialty_preference: get_text(&row, "specialty_preference")?,
				gender_preference: get_text(&row, "gender_preference")?,
			})
		})
		.transpose()
	}

	/// Point read of the activity level code.
	pub async fn read_activity_level(&self, user_id: &str) -> Result<Option<String>> {
		let sql = select_by_user("activity_levels", &["level"], user_id);
		let row = self.fetch_optional(&sql, "activity_levels").await?;
		row.map(|row| get_text(&row, "level")).transpose()
	}

	/// All sports rows for the user.
	pub async fn read_sports(&self, user_id: &str) -> Result<Vec<SportInterest>> {
		let sql = select_by_user("user_activities", &["sport", "interest_level"], user_id);
		let rows = self.fetch_all(&sql, "user_activities").await?;
		rows.into_iter()
			.map(|row| {
				Ok(SportInterest {
					name: get_text(&row, "sport")?,
					interest_level: get_int(&row, "interest_level")? as u8,
				})
			})
			.collect()
	}

	/// All interests for the user, grouped by category.
	pub async fn read_interests(&self, user_id: &str) -> Result<Interests> {
		let sql = select_by_user("user_interests", &["category", "value"], user_id);
		let rows = self.fetch_all(&sql, "user_interests").await?;
		let mut interests = Interests::default();
		for row in rows {
			let value = get_text(&row, "value")?;
			match get_text(&row, "category")?.as_str() {
				"music" => interests.music.push(value),
				"movies_tv" => interests.movies_tv.push(value),
				_ => interests.other.push(value),
			}
		}
		Ok(interests)
	}

	/// Point read of the social preferences row.
	pub async fn read_social(&self, user_id: &str) -> Result<Option<SocialRow>> {
		let sql = select_by_user(
			"social_preferences",
			&[
				"meeting_activities",
				"social_energy",
				"conversation_style",
				"ideal_weekend",
				"looking_for",
			],
			user_id,
		);
		let row = self.fetch_optional(&sql, "social_preferences").await?;
		row.map(|row| {
			Ok(SocialRow {
				meeting_activities: parse_list(&get_text(&row, "meeting_activities")?),
				social_energy: get_text(&row, "social_energy")?,
				conversation_style: get_text(&row, "conversation_style")?,
				ideal_weekend: get_text_opt(&row, "ideal_weekend")?,
				looking_for: parse_list(&get_text(&row, "looking_for")?),
			})
		})
		.transpose()
	}

	/// Point read of the availability row.
	pub async fn read_availability(&self, user_id: &str) -> Result<Option<WeeklySlots>> {
		let sql = select_by_user("availability", &["meeting_times", "frequency"], user_id);
		let row = self.fetch_optional(&sql, "availability").await?;
		row.map(|row| {
			Ok(WeeklySlots {
				meeting_times: parse_list(&get_text(&row, "meeting_times")?),
				frequency: get_text(&row, "frequency")?,
			})
		})
		.transpose()
	}

	/// Point read of the lifestyle row.
	pub async fn read_lifestyle(&self, user_id: &str) -> Result<Option<LifestyleInfo>> {
		let sql = select_by_user("lifestyles", &["dietary_restriction", "life_stage"], user_id);
		let row = self.fetch_optional(&sql, "lifestyles").await?;
		row.map(|row| {
			Ok(LifestyleInfo {
				dietary_restriction: get_text_opt(&row, "dietary_restriction")?,
				life_stage: get_text(&row, "life_stage")?,
			})
		})
		.transpose()
	}
}

pub(crate) fn get_text(row: &AnyRow, column: &str) -> Result<String> {
	row.try_get::<String, _>(column)
		.map_err(|e| Error::Database(format!("column {}: {}", column, e)))
}

pub(crate) fn get_text_opt(row: &AnyRow, column: &str) -> Result<Option<String>> {
	row.try_get::<Option<String>, _>(column)
		.map_err(|e| Error::Database(format!("column {}: {}", column, e)))
}

pub(crate) fn get_int(row: &AnyRow, column: &str) -> Result<i64> {
	row.try_get::<i64, _>(column)
		.map_err(|e| Error::Database(format!("column {}: {}", column, e)))
}

fn parse_profile_row(row: AnyRow) -> Result<ProfileRow> {
	Ok(ProfileRow {
		user_id: get_text(&row, "user_id")?,
		display_name: get_text_opt(&row, "display_name")?,
		avatar_ref: get_text_opt(&row, "avatar_ref")?,
		city: get_text_opt(&row, "city")?,
		nationality: get_text_opt(&row, "nationality")?,
		gender: get_text_opt(&row, "gender")?,
		flags: ProfileFlags {
			is_onboarding_complete: get_int(&row, "is_onboarding_complete")? != 0,
			is_matchable: get_int(&row, "is_matchable")? != 0,
		},
		created_at: get_text(&row, "created_at")?,
		updated_at: get_text(&row, "updated_at")?,
	})
}

async fn ensure_profile_tx(tx: &mut Tx<'_>, user_id: &str, display_name: Option<&str>) -> Result<()> {
	let exists = fetch_optional_tx(
		tx,
		&select_by_user("profiles", &["user_id"], user_id),
		"profiles",
	)
	.await?
	.is_some();
	if exists {
		return Ok(());
	}
	let now = now_rfc3339();
	let sql = Query::insert()
		.into_table(Alias::new("profiles"))
		.columns([
			Alias::new("user_id"),
			Alias::new("display_name"),
			Alias::new("is_onboarding_complete"),
			Alias::new("is_matchable"),
			Alias::new("created_at"),
			Alias::new("updated_at"),
		])
		.values([
			Expr::val(user_id),
			Expr::val(display_name.map(str::to_string)),
			Expr::val(0),
			Expr::val(0),
			Expr::val(now.clone()),
			Expr::val(now),
		])
		.map_err(|e| Error::database("profiles", e))?
		.to_string(SqliteQueryBuilder);
	exec_tx(tx, &sql, "profiles").await?;
	Ok(())
}

async fn write_profile_basics(tx: &mut Tx<'_>, user_id: &str, step: &BasicInfo) -> Result<()> {
	// Statement values are not Send; render the SQL before awaiting.
	let sql = {
		let mut update = Query::update();
		update
			.table(Alias::new("profiles"))
			.value(Alias::new("gender"), Expr::val(step.gender.clone()))
			.value(Alias::new("city"), Expr::val(step.city.clone()))
			.value(Alias::new("updated_at"), Expr::val(now_rfc3339()))
			.and_where(Expr::col(Alias::new("user_id")).eq(user_id));
		if let Some(name) = step.display_name.as_deref() {
			update.value(Alias::new("display_name"), Expr::val(name));
		}
		if let Some(nationality) = step.nationality.as_deref() {
			update.value(Alias::new("nationality"), Expr::val(nationality));
		}
		update.to_string(SqliteQueryBuilder)
	};
	exec_tx(tx, &sql, "profiles").await?;
	Ok(())
}

async fn touch_profile(tx: &mut Tx<'_>, user_id: &str) -> Result<()> {
	let sql = Query::update()
		.table(Alias::new("profiles"))
		.value(Alias::new("updated_at"), Expr::val(now_rfc3339()))
		.and_where(Expr::col(Alias::new("user_id")).eq(user_id))
		.to_string(SqliteQueryBuilder);
	exec_tx(tx, &sql, "profiles").await?;
	Ok(())
}

async fn set_flags(tx: &mut Tx<'_>, user_id: &str, complete: bool, matchable: bool) -> Result<()> {
	let sql = Query::update()
		.table(Alias::new("profiles"))
		.value(
			Alias::new("is_onboarding_complete"),
			Expr::val(if complete { 1 } else { 0 }),
		)
		.value(Alias::new("is_matchable"), Expr::val(if matchable { 1 } else { 0 }))
		.value(Alias::new("updated_at"), Expr::val(now_rfc3339()))
		.and_where(Expr::col(Alias::new("user_id")).eq(user_id))
		.to_string(SqliteQueryBuilder);
	exec_tx(tx, &sql, "profiles").await?;
	Ok(())
}

async fn read_medical_tx(tx: &mut Tx<'_>, user_id: &str) -> Result<Option<MedicalRow>> {
	let sql = select_by_user(
		"medical_profiles",
		&["specialties", "career_stage", "specialty_preference", "gender_preference"],
		user_id,
	);
	let row = fetch_optional_tx(tx, &sql, "medical_profiles").await?;
	row.map(|row| {
		Ok(MedicalRow {
			specialties: parse_list(&get_text(&row, "specialties")?),
			career_stage: get_text(&row, "career_stage")?,
			specialty_preference: get_text(&row, "specialty_preference")?,
			gender_preference: get_text(&row, "gender_preference")?,
		})
	})
	.transpose()
}

async fn insert_medical(tx: &mut Tx<'_>, user_id: &str, row: &MedicalRow) -> Result<()> {
	let sql = Query::insert()
		.into_table(Alias::new("medical_profiles"))
		.columns([
			Alias::new("id"),
			Alias::new("user_id"),
			Alias::new("specialties"),
			Alias::new("career_stage"),
			Alias::new("specialty_preference"),
			Alias::new("gender_preference"),
		])
		.values([
			Expr::val(Uuid::new_v4().to_string()),
			Expr::val(user_id),
			Expr::val(json_list(&row.specialties)),
			Expr::val(row.career_stage.clone()),
			Expr::val(row.specialty_preference.clone()),
			Expr::val(row.gender_preference.clone()),
		])
		.map_err(|e| Error::database("medical_profiles", e))?
		.to_string(SqliteQueryBuilder);
	exec_tx(tx, &sql, "medical_profiles").await?;
	Ok(())
}

/// Delete-then-insert upsert of the medical row, preserving the stored
/// gender preference unless the caller supplies a new one.
async fn write_medical(
	tx: &mut Tx<'_>,
	user_id: &str,
	step: &MedicalBackground,
	gender_preference: Option<&str>,
) -> Result<()> {
	let preserved = match gender_preference {
		Some(code) => code.to_string(),
		None => read_medical_tx(tx, user_id)
			.await?
			.map(|row| row.gender_preference)
			.unwrap_or_else(|| Domain::GenderPreference.default_code().to_string()),
	};
	exec_tx(tx, &delete_by_user("medical_profiles", user_id), "medical_profiles").await?;
	insert_medical(
		tx,
		user_id,
		&MedicalRow {
			specialties: step.medical_specialties.clone(),
			career_stage: step.career_stage.clone(),
			specialty_preference: step.specialty_preference.clone(),
			gender_preference: preserved,
		},
	)
	.await
}

/// Updates only the gender preference column, creating a default-shaped
/// medical row when none exists yet (step 1 can arrive before step 2).
async fn write_gender_preference(tx: &mut Tx<'_>, user_id: &str, code: &str) -> Result<()> {
	match read_medical_tx(tx, user_id).await? {
		Some(row) => {
			exec_tx(tx, &delete_by_user("medical_profiles", user_id), "medical_profiles").await?;
			insert_medical(
				tx,
				user_id,
				&MedicalRow {
					gender_preference: code.to_string(),
					..row
				},
			)
			.await
		}
		None => {
			insert_medical(
				tx,
				user_id,
				&MedicalRow {
					specialties: Vec::new(),
					career_stage: Domain::CareerStage.default_code().to_string(),
					specialty_preference: Domain::SpecialtyPreference.default_code().to_string(),
					gender_preference: code.to_string(),
				},
			)
			.await
		}
	}
}

async fn write_activity_level(tx: &mut Tx<'_>, user_id: &str, level: &str) -> Result<()> {
	exec_tx(tx, &delete_by_user("activity_levels", user_id), "activity_levels").await?;
	let sql = Query::insert()
		.into_table(Alias::new("activity_levels"))
		.columns([Alias::new("id"), Alias::new("user_id"), Alias::new("level")])
		.values([
			Expr::val(Uuid::new_v4().to_string()),
			Expr::val(user_id),
			Expr::val(level),
		])
		.map_err(|e| Error::database("activity_levels", e))?
		.to_string(SqliteQueryBuilder);
	exec_tx(tx, &sql, "activity_levels").await?;
	Ok(())
}

async fn replace_sports(tx: &mut Tx<'_>, user_id: &str, sports: &[SportInterest]) -> Result<()> {
	exec_tx(tx, &delete_by_user("user_activities", user_id), "user_activities").await?;
	for sport in sports {
		let sql = Query::insert()
			.into_table(Alias::new("user_activities"))
			.columns([
				Alias::new("id"),
				Alias::new("user_id"),
				Alias::new("sport"),
				Alias::new("interest_level"),
			])
			.values([
				Expr::val(Uuid::new_v4().to_string()),
				Expr::val(user_id),
				Expr::val(sport.name.clone()),
				Expr::val(sport.interest_level as i64),
			])
			.map_err(|e| Error::database("user_activities", e))?
			.to_string(SqliteQueryBuilder);
		exec_tx(tx, &sql, "user_activities").await?;
	}
	Ok(())
}

async fn replace_interests(tx: &mut Tx<'_>, user_id: &str, interests: &Interests) -> Result<()> {
	exec_tx(tx, &delete_by_user("user_interests", user_id), "user_interests").await?;
	let tagged = [
		(InterestCategory::Music, &interests.music),
		(InterestCategory::MoviesTv, &interests.movies_tv),
		(InterestCategory::Other, &interests.other),
	];
	for (category, values) in tagged {
		for value in values {
			let sql = Query::insert()
				.into_table(Alias::new("user_interests"))
				.columns([
					Alias::new("id"),
					Alias::new("user_id"),
					Alias::new("category"),
					Alias::new("value"),
				])
				.values([
					Expr::val(Uuid::new_v4().to_string()),
					Expr::val(user_id),
					Expr::val(category.as_str()),
					Expr::val(value.clone()),
				])
				.map_err(|e| Error::database("user_interests", e))?
				.to_string(SqliteQueryBuilder);
			exec_tx(tx, &sql, "user_interests").await?;
		}
	}
	Ok(())
}

async fn read_social_tx(tx: &mut Tx<'_>, user_id: &str) -> Result<Option<SocialRow>> {
	let sql = select_by_user(
		"social_preferences",
		&[
			"meeting_activities",
			"social_energy",
			"conversation_style",
			"ideal_weekend",
			"looking_for",
		],
		user_id,
	);
	let row = fetch_optional_tx(tx, &sql, "social_preferences").await?;
	row.map(|row| {
		Ok(SocialRow {
			meeting_activities: parse_list(&get_text(&row, "meeting_activities")?),
			social_energy: get_text(&row, "social_energy")?,
			conversation_style: get_text(&row, "conversation_style")?,
			ideal_weekend: get_text_opt(&row, "ideal_weekend")?,
			looking_for: parse_list(&get_text(&row, "looking_for")?),
		})
	})
	.transpose()
}

async fn insert_social(tx: &mut Tx<'_>, user_id: &str, row: &SocialRow) -> Result<()> {
	// Statement values are not Send; render the SQL before awaiting.
	let sql = {
		let mut insert = Query::insert();
		insert
			.into_table(Alias::new("social_preferences"))
			.columns([
				Alias::new("id"),
				Alias::new("user_id"),
				Alias::new("meeting_activities"),
				Alias::new("social_energy"),
				Alias::new("conversation_style"),
				Alias::new("ideal_weekend"),
				Alias::new("looking_for"),
			])
			.values([
				Expr::val(Uuid::new_v4().to_string()),
				Expr::val(user_id),
				Expr::val(json_list(&row.meeting_activities)),
				Expr::val(row.social_energy.clone()),
				Expr::val(row.conversation_style.clone()),
				row.ideal_weekend
					.as_deref()
					.map(Expr::val)
					.unwrap_or(Expr::val(Option::<String>::None)),
				Expr::val(json_list(&row.looking_for)),
			])
			.map_err(|e| Error::database("social_preferences", e))?;
		insert.to_string(SqliteQueryBuilder)
	};
	exec_tx(tx, &sql, "social_preferences").await?;
	Ok(())
}

async fn write_social_style(tx: &mut Tx<'_>, user_id: &str, step: &SocialStyle) -> Result<()> {
	let existing = read_social_tx(tx, user_id).await?;
	exec_tx(tx, &delete_by_user("social_preferences", user_id), "social_preferences").await?;
	let (ideal_weekend, looking_for) = existing
		.map(|row| (row.ideal_weekend, row.looking_for))
		.unwrap_or((None, Vec::new()));
	insert_social(
		tx,
		user_id,
		&SocialRow {
			meeting_activities: step.meeting_activities.clone(),
			social_energy: step.social_energy.clone(),
			conversation_style: step.conversation_style.clone(),
			ideal_weekend,
			looking_for,
		},
	)
	.await
}

async fn write_looking_for(tx: &mut Tx<'_>, user_id: &str, step: &LookingFor) -> Result<()> {
	let existing = read_social_tx(tx, user_id).await?;
	exec_tx(tx, &delete_by_user("social_preferences", user_id), "social_preferences").await?;
	let (meeting_activities, social_energy, conversation_style) = existing
		.map(|row| (row.meeting_activities, row.social_energy, row.conversation_style))
		.unwrap_or_else(|| {
			(
				Vec::new(),
				Domain::SocialEnergy.default_code().to_string(),
				Domain::ConversationStyle.default_code().to_string(),
			)
		});
	insert_social(
		tx,
		user_id,
		&SocialRow {
			meeting_activities,
			social_energy,
			conversation_style,
			ideal_weekend: step.ideal_weekend.clone(),
			looking_for: step.looking_for.clone(),
		},
	)
	.await
}

async fn write_availability(tx: &mut Tx<'_>, user_id: &str, step: &WeeklySlots) -> Result<()> {
	exec_tx(tx, &delete_by_user("availability", user_id), "availability").await?;
	let sql = Query::insert()
		.into_table(Alias::new("availability"))
		.columns([
			Alias::new("id"),
			Alias::new("user_id"),
			Alias::new("meeting_times"),
			Alias::new("frequency"),
		])
		.values([
			Expr::val(Uuid::new_v4().to_string()),
			Expr::val(user_id),
			Expr::val(json_list(&step.meeting_times)),
			Expr::val(step.frequency.clone()),
		])
		.map_err(|e| Error::database("availability", e))?
		.to_string(SqliteQueryBuilder);
	exec_tx(tx, &sql, "availability").await?;
	Ok(())
}

async fn write_lifestyle(tx: &mut Tx<'_>, user_id: &str, step: &LifestyleInfo) -> Result<()> {
	exec_tx(tx, &delete_by_user("lifestyles", user_id), "lifestyles").await?;
	let sql = Query::insert()
		.into_table(Alias::new("lifestyles"))
		.columns([
			Alias::new("id"),
			Alias::new("user_id"),
			Alias::new("dietary_restriction"),
			Alias::new("life_stage"),
		])
		.values([
			Expr::val(Uuid::new_v4().to_string()),
			Expr::val(user_id),
			step.dietary_restriction
				.as_deref()
				.map(Expr::val)
				.unwrap_or(Expr::val(Option::<String>::None)),
			Expr::val(step.life_stage.clone()),
		])
		.map_err(|e| Error::database("lifestyles", e))?
		.to_string(SqliteQueryBuilder);
	exec_tx(tx, &sql, "lifestyles").await?;
	Ok(())
}

/// Deletes every onboarding collection row for the user. Used by the
/// admin delete path; the auth identity row is left in place.
pub(crate) async fn delete_profile_data(tx: &mut Tx<'_>, user_id: &str) -> Result<()> {
	for table in [
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
		exec_tx(tx, &delete_by_user(table, user_id), table).await?;
	}
	Ok(())
}
