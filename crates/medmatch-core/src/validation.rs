//! Pre-submit validation for the onboarding wizard.
//!
//! Two passes run before a submit is allowed, and both are required:
//!
//! 1. the required steps (1, 2, 5, 6, 7) must be present in the
//!    completed-step set, and
//! 2. the four array-valued fields (medical specialties, meeting
//!    activities, meeting times, looking-for) must be non-empty even when
//!    every step is individually marked complete.
//!
//! Step-level completion alone would not catch an array a user emptied
//! after completing the step, which is why the second pass exists.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::steps::OnboardingRecord;

/// Steps that must be completed before submit.
pub const REQUIRED_STEPS: [u8; 5] = [1, 2, 5, 6, 7];

/// A field-specific validation failure, surfaced verbatim to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
	pub field: String,
	pub message: String,
}

impl FieldError {
	fn new(field: &str, message: &str) -> Self {
		Self {
			field: field.to_string(),
			message: message.to_string(),
		}
	}
}

/// Runs both validation passes over a record about to be submitted.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use medmatch_core::steps::OnboardingRecord;
/// use medmatch_core::validation::validate_for_submit;
///
/// let record = OnboardingRecord::default();
/// let completed = BTreeSet::new();
/// let errors = validate_for_submit(&record, &completed).unwrap_err();
/// assert!(errors.iter().any(|e| e.field == "step1"));
/// ```
pub fn validate_for_submit(
	record: &OnboardingRecord,
	completed: &BTreeSet<u8>,
) -> Result<(), Vec<FieldError>> {
	let mut errors = Vec::new();

	for step in REQUIRED_STEPS {
		if !completed.contains(&step) {
			errors.push(FieldError::new(
				&format!("step{}", step),
				&format!("Step {} must be completed before submitting", step),
			));
		}
	}

	// Second pass: the four array fields, independent of step completion.
	match &record.step2 {
		Some(step) if !step.medical_specialties.is_empty() => {}
		_ => errors.push(FieldError::new(
			"medicalSpecialties",
			"Please select at least one medical specialty",
		)),
	}
	match &record.step5 {
		Some(step) if !step.meeting_activities.is_empty() => {}
		_ => errors.push(FieldError::new(
			"meetingActivities",
			"Please select at least one meeting activity",
		)),
	}
	match &record.step6 {
		Some(step) if !step.meeting_times.is_empty() => {}
		_ => errors.push(FieldError::new(
			"meetingTimes",
			"Please select at least one meeting time",
		)),
	}
	match &record.step7 {
		Some(step) if !step.looking_for.is_empty() => {}
		_ => errors.push(FieldError::new(
			"lookingFor",
			"Please select at least one option for looking for",
		)),
	}

	if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::steps::{
		BasicInfo, LookingFor, MedicalBackground, SocialStyle, WeeklySlots,
	};

	fn complete_record() -> OnboardingRecord {
		OnboardingRecord {
			step1: Some(BasicInfo {
				display_name: None,
				gender: "Male".into(),
				city: "Berlin".into(),
				nationality: None,
				gender_preference: "No preference".into(),
			}),
			step2: Some(MedicalBackground {
				medical_specialties: vec!["Cardiology".into()],
				career_stage: "Fellow".into(),
				specialty_preference: "No preference".into(),
			}),
			step5: Some(SocialStyle {
				meeting_activities: vec!["Coffee".into()],
				social_energy: "Balanced".into(),
				conversation_style: "Mix of both".into(),
			}),
			step6: Some(WeeklySlots {
				meeting_times: vec!["Weekend mornings".into()],
				frequency: "Monthly".into(),
			}),
			step7: Some(LookingFor {
				looking_for: vec!["Friendship".into()],
				ideal_weekend: None,
			}),
			..Default::default()
		}
	}

	fn all_completed() -> BTreeSet<u8> {
		(1..=8).collect()
	}

	#[test]
	fn accepts_a_complete_record() {
		assert!(validate_for_submit(&complete_record(), &all_completed()).is_ok());
	}

	#[test]
	fn missing_required_step_is_reported_by_name() {
		let mut completed = all_completed();
		completed.remove(&6);
		let errors = validate_for_submit(&complete_record(), &completed).unwrap_err();
		assert!(errors.iter().any(|e| e.field == "step6"));
	}

	#[test]
	fn optional_steps_are_not_required() {
		let mut completed = all_completed();
		completed.remove(&3);
		completed.remove(&4);
		completed.remove(&8);
		assert!(validate_for_submit(&complete_record(), &completed).is_ok());
	}

	#[test]
	fn empty_array_rejected_even_when_steps_complete() {
		let mut record = complete_record();
		record.step2.as_mut().unwrap().medical_specialties.clear();
		let errors = validate_for_submit(&record, &all_completed()).unwrap_err();
		assert_eq!(errors.len(), 1);
		assert_eq!(errors[0].field, "medicalSpecialties");
		assert_eq!(errors[0].message, "Please select at least one medical specialty");
	}

	#[test]
	fn each_of_the_four_arrays_gets_its_own_message() {
		let mut record = complete_record();
		record.step5.as_mut().unwrap().meeting_activities.clear();
		record.step6.as_mut().unwrap().meeting_times.clear();
		record.step7.as_mut().unwrap().looking_for.clear();
		let errors = validate_for_submit(&record, &all_completed()).unwrap_err();
		let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
		assert_eq!(fields, vec!["meetingActivities", "meetingTimes", "lookingFor"]);
	}
}
