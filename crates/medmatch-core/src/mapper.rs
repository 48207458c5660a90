//! Record-level application of the field codec.
//!
//! The wire carries display strings, storage carries codes. These helpers
//! rewrite a whole [`OnboardingRecord`] in one direction so the write path
//! (submit, partial update) and the read path (reconcile) cannot drift in
//! which fields they translate. Free-text and array-valued fields pass
//! through untouched.

use crate::codec::{Domain, decode, encode, slugify, unslugify};
use crate::steps::OnboardingRecord;

/// Rewrites every display-valued field of the record into storage codes.
///
/// # Examples
///
/// ```
/// use medmatch_core::mapper::encode_record;
/// use medmatch_core::steps::{MedicalBackground, OnboardingRecord};
///
/// let mut record = OnboardingRecord::default();
/// record.step2 = Some(MedicalBackground {
///     medical_specialties: vec!["Cardiology".into()],
///     career_stage: "Fellow".into(),
///     specialty_preference: "No preference".into(),
/// });
/// let coded = encode_record(&record);
/// assert_eq!(coded.step2.unwrap().career_stage, "fellow");
/// ```
pub fn encode_record(record: &OnboardingRecord) -> OnboardingRecord {
	let mut coded = record.clone();
	if let Some(step) = coded.step1.as_mut() {
		step.gender = slugify(&step.gender);
		step.gender_preference = encode(Domain::GenderPreference, &step.gender_preference).to_string();
	}
	if let Some(step) = coded.step2.as_mut() {
		step.career_stage = encode(Domain::CareerStage, &step.career_stage).to_string();
		step.specialty_preference =
			encode(Domain::SpecialtyPreference, &step.specialty_preference).to_string();
	}
	if let Some(step) = coded.step3.as_mut() {
		step.activity_level = encode(Domain::ActivityLevel, &step.activity_level).to_string();
	}
	if let Some(step) = coded.step5.as_mut() {
		step.social_energy = encode(Domain::SocialEnergy, &step.social_energy).to_string();
		step.conversation_style =
			encode(Domain::ConversationStyle, &step.conversation_style).to_string();
	}
	if let Some(step) = coded.step6.as_mut() {
		step.frequency = encode(Domain::MeetingFrequency, &step.frequency).to_string();
	}
	if let Some(step) = coded.step8.as_mut() {
		step.life_stage = encode(Domain::LifeStage, &step.life_stage).to_string();
	}
	coded
}

/// Rewrites every code-valued field of the record back into display form.
///
/// Unknown codes resolve to the per-domain default, never an error.
pub fn decode_record(record: &OnboardingRecord) -> OnboardingRecord {
	let mut displayed = record.clone();
	if let Some(step) = displayed.step1.as_mut() {
		step.gender = unslugify(&step.gender);
		step.gender_preference = decode(Domain::GenderPreference, &step.gender_preference).to_string();
	}
	if let Some(step) = displayed.step2.as_mut() {
		step.career_stage = decode(Domain::CareerStage, &step.career_stage).to_string();
		step.specialty_preference =
			decode(Domain::SpecialtyPreference, &step.specialty_preference).to_string();
	}
	if let Some(step) = displayed.step3.as_mut() {
		step.activity_level = decode(Domain::ActivityLevel, &step.activity_level).to_string();
	}
	if let Some(step) = displayed.step5.as_mut() {
		step.social_energy = decode(Domain::SocialEnergy, &step.social_energy).to_string();
		step.conversation_style =
			decode(Domain::ConversationStyle, &step.conversation_style).to_string();
	}
	if let Some(step) = displayed.step6.as_mut() {
		step.frequency = decode(Domain::MeetingFrequency, &step.frequency).to_string();
	}
	if let Some(step) = displayed.step8.as_mut() {
		step.life_stage = decode(Domain::LifeStage, &step.life_stage).to_string();
	}
	displayed
}
