//! Profile reconciliation.
//!
//! A profile is spread across eight storage collections. [`ProfileService`]
//! reads them concurrently, fills per-field defaults for anything a user
//! never provided, and hands back one display-form record; the update
//! path runs the same translation in reverse and touches only the steps
//! the caller supplied.

use medmatch_core::codec::Domain;
use medmatch_core::mapper::{decode_record, encode_record};
use medmatch_core::steps::{
	BasicInfo, LifestyleInfo, LookingFor, MedicalBackground, OnboardingRecord, PhysicalActivity,
	SocialStyle, WeeklySlots,
};
use medmatch_core::{Error, Result};
use medmatch_db::{MatchStore, ProfileFlags};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A fully reconciled profile in display form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
	pub user_id: String,
	pub flags: ProfileFlags,
	pub updated_at: String,
	/// Every step present, defaults filled in, display strings throughout.
	pub record: OnboardingRecord,
}

/// Read and update façade over the per-collection stores.
#[derive(Clone)]
pub struct ProfileService {
	store: MatchStore,
}

impl ProfileService {
	pub fn new(store: MatchStore) -> Self {
		Self { store }
	}

	/// Loads the complete profile.
	///
	/// The seven collection reads run concurrently. A missing collection
	/// row never fails the load; each absent field resolves to its
	/// domain default (or stays empty, for the free-form arrays), so the
	/// returned record always has all eight steps populated.
	pub async fn load(&self, user_id: &str) -> Result<ProfileView> {
		let profile = self
			.store
			.read_profile(user_id)
			.await?
			.ok_or_else(|| Error::NotFound(format!("profile {}", user_id)))?;

		let (medical, activity_level, sports, interests, social, availability, lifestyle) = tokio::try_join!(
			self.store.read_medical(user_id),
			self.store.read_activity_level(user_id),
			self.store.read_sports(user_id),
			self.store.read_interests(user_id),
			self.store.read_social(user_id),
			self.store.read_availability(user_id),
			self.store.read_lifestyle(user_id),
		)?;

		let gender_preference = medical
			.as_ref()
			.map(|row| row.gender_preference.clone())
			.unwrap_or_else(|| Domain::GenderPreference.default_code().to_string());

		let encoded = OnboardingRecord {
			step1: Some(BasicInfo {
				display_name: profile.display_name.clone(),
				gender: profile.gender.clone().unwrap_or_default(),
				city: profile.city.clone().unwrap_or_default(),
				nationality: profile.nationality.clone(),
				gender_preference,
			}),
			step2: Some(match medical {
				Some(row) => MedicalBackground {
					medical_specialties: row.specialties,
					career_stage: row.career_stage,
					specialty_preference: row.specialty_preference,
				},
				None => MedicalBackground {
					medical_specialties: Vec::new(),
					career_stage: Domain::CareerStage.default_code().to_string(),
					specialty_preference: Domain::SpecialtyPreference.default_code().to_string(),
				},
			}),
			step3: Some(PhysicalActivity {
				activity_level: activity_level
					.unwrap_or_else(|| Domain::ActivityLevel.default_code().to_string()),
				sports,
			}),
			step4: Some(interests),
			step5: Some(match social.as_ref() {
				Some(row) => SocialStyle {
					meeting_activities: row.meeting_activities.clone(),
					social_energy: row.social_energy.clone(),
					conversation_style: row.conversation_style.clone(),
				},
				None => SocialStyle {
					meeting_activities: Vec::new(),
					social_energy: Domain::SocialEnergy.default_code().to_string(),
					conversation_style: Domain::ConversationStyle.default_code().to_string(),
				},
			}),
			step6: Some(availability.unwrap_or_else(|| WeeklySlots {
				meeting_times: Vec::new(),
				frequency: Domain::MeetingFrequency.default_code().to_string(),
			})),
			step7: Some(match social {
				Some(row) => LookingFor {
					looking_for: row.looking_for,
					ideal_weekend: row.ideal_weekend,
				},
				None => LookingFor {
					looking_for: Vec::new(),
					ideal_weekend: None,
				},
			}),
			step8: Some(lifestyle.unwrap_or_else(|| LifestyleInfo {
				dietary_restriction: None,
				life_stage: Domain::LifeStage.default_code().to_string(),
			})),
		};

		Ok(ProfileView {
			user_id: profile.user_id,
			flags: profile.flags,
			updated_at: profile.updated_at,
			record: decode_record(&encoded),
		})
	}

	/// Applies a partial, display-form update and returns the profile as
	/// it now reads.
	///
	/// Supplied steps are validated individually; anything not supplied
	/// is untouched.
	pub async fn update(&self, user_id: &str, record: &OnboardingRecord) -> Result<ProfileView> {
		if record.is_empty() {
			return Err(Error::Validation("Invalid data format".to_string()));
		}
		validate_supplied(record)?;
		self.store
			.apply_partial(user_id, &encode_record(record))
			.await?;
		tracing::debug!(user_id, steps = ?record.supplied_steps(), "profile updated");
		self.load(user_id).await
	}
}

fn validate_supplied(record: &OnboardingRecord) -> Result<()> {
	record
		.validate()
		.map_err(|e| Error::Validation(e.to_string()))
}
