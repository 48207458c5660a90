//! Wire payloads for the eight onboarding wizard steps.
//!
//! Each step carries its own validated shape and the steps combine into a
//! tagged union, so callers never pass loosely-typed payload objects
//! between surfaces. All string-valued preference fields hold *display*
//! values on the wire; [`crate::mapper`] translates to and from storage
//! codes.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Step 1 - identity basics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub display_name: Option<String>,
	#[validate(length(min = 1, message = "Gender is required"))]
	pub gender: String,
	#[validate(length(min = 1, message = "City is required"))]
	pub city: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub nationality: Option<String>,
	#[validate(length(min = 1, message = "Gender preference is required"))]
	pub gender_preference: String,
}

/// Step 2 - medical background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MedicalBackground {
	#[validate(length(min = 1, message = "Please select at least one medical specialty"))]
	pub medical_specialties: Vec<String>,
	#[validate(length(min = 1, message = "Career stage is required"))]
	pub career_stage: String,
	#[validate(length(min = 1, message = "Specialty preference is required"))]
	pub specialty_preference: String,
}

/// A single sport with a 1-5 interest level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SportInterest {
	#[validate(length(min = 1, message = "Sport name is required"))]
	pub name: String,
	#[validate(range(min = 1, max = 5, message = "Interest level must be between 1 and 5"))]
	pub interest_level: u8,
}

/// Step 3 - physical activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalActivity {
	#[validate(length(min = 1, message = "Activity level is required"))]
	pub activity_level: String,
	#[serde(default)]
	#[validate(nested)]
	pub sports: Vec<SportInterest>,
}

/// Tag for the three interest categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestCategory {
	Music,
	MoviesTv,
	Other,
}

impl InterestCategory {
	/// Storage tag for the category column.
	pub fn as_str(self) -> &'static str {
		match self {
			InterestCategory::Music => "music",
			InterestCategory::MoviesTv => "movies_tv",
			InterestCategory::Other => "other",
		}
	}
}

/// Step 4 - cultural interests, tagged by category.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Interests {
	#[serde(default)]
	pub music: Vec<String>,
	#[serde(default)]
	pub movies_tv: Vec<String>,
	#[serde(default)]
	pub other: Vec<String>,
}

/// Step 5 - social style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SocialStyle {
	#[validate(length(min = 1, message = "Please select at least one meeting activity"))]
	pub meeting_activities: Vec<String>,
	#[validate(length(min = 1, message = "Social energy is required"))]
	pub social_energy: String,
	#[validate(length(min = 1, message = "Conversation style is required"))]
	pub conversation_style: String,
}

/// Step 6 - availability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySlots {
	#[validate(length(min = 1, message = "Please select at least one meeting time"))]
	pub meeting_times: Vec<String>,
	#[validate(length(min = 1, message = "Meeting frequency is required"))]
	pub frequency: String,
}

/// Step 7 - what the user is looking for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LookingFor {
	#[validate(length(min = 1, message = "Please select at least one option for looking for"))]
	pub looking_for: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ideal_weekend: Option<String>,
}

/// Step 8 - lifestyle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LifestyleInfo {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub dietary_restriction: Option<String>,
	#[validate(length(min = 1, message = "Life stage is required"))]
	pub life_stage: String,
}

/// A single wizard step as a tagged union.
///
/// The wizard records steps through this enum so a step number and its
/// payload can never drift apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OnboardingStep {
	Step1(BasicInfo),
	Step2(MedicalBackground),
	Step3(PhysicalActivity),
	Step4(Interests),
	Step5(SocialStyle),
	Step6(WeeklySlots),
	Step7(LookingFor),
	Step8(LifestyleInfo),
}

impl OnboardingStep {
	/// 1-based step number of this variant.
	pub fn number(&self) -> u8 {
		match self {
			OnboardingStep::Step1(_) => 1,
			OnboardingStep::Step2(_) => 2,
			OnboardingStep::Step3(_) => 3,
			OnboardingStep::Step4(_) => 4,
			OnboardingStep::Step5(_) => 5,
			OnboardingStep::Step6(_) => 6,
			OnboardingStep::Step7(_) => 7,
			OnboardingStep::Step8(_) => 8,
		}
	}

	/// Validates the payload of this step.
	pub fn validate(&self) -> Result<(), validator::ValidationErrors> {
		match self {
			OnboardingStep::Step1(s) => s.validate(),
			OnboardingStep::Step2(s) => s.validate(),
			OnboardingStep::Step3(s) => s.validate(),
			OnboardingStep::Step4(s) => s.validate(),
			OnboardingStep::Step5(s) => s.validate(),
			OnboardingStep::Step6(s) => s.validate(),
			OnboardingStep::Step7(s) => s.validate(),
			OnboardingStep::Step8(s) => s.validate(),
		}
	}
}

/// The full onboarding-shaped record: eight optional steps.
///
/// The same shape serves the full submit (`POST /onboarding`), the
/// reconstructed read (`GET /onboarding`, `GET /profile`) and the partial
/// update (`POST /profile`, any subset of steps supplied).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
pub struct OnboardingRecord {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	#[validate(nested)]
	pub step1: Option<BasicInfo>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	#[validate(nested)]
	pub step2: Option<MedicalBackground>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	#[validate(nested)]
	pub step3: Option<PhysicalActivity>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	#[validate(nested)]
	pub step4: Option<Interests>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	#[validate(nested)]
	pub step5: Option<SocialStyle>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	#[validate(nested)]
	pub step6: Option<WeeklySlots>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	#[validate(nested)]
	pub step7: Option<LookingFor>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	#[validate(nested)]
	pub step8: Option<LifestyleInfo>,
}

impl OnboardingRecord {
	/// True when no step is supplied at all.
	pub fn is_empty(&self) -> bool {
		self.step1.is_none()
			&& self.step2.is_none()
			&& self.step3.is_none()
			&& self.step4.is_none()
			&& self.step5.is_none()
			&& self.step6.is_none()
			&& self.step7.is_none()
			&& self.step8.is_none()
	}

	/// Merges one step into the record, replacing any previous payload
	/// for that step.
	pub fn apply(&mut self, step: OnboardingStep) {
		match step {
			OnboardingStep::Step1(s) => self.step1 = Some(s),
			OnboardingStep::Step2(s) => self.step2 = Some(s),
			OnboardingStep::Step3(s) => self.step3 = Some(s),
			OnboardingStep::Step4(s) => self.step4 = Some(s),
			OnboardingStep::Step5(s) => self.step5 = Some(s),
			OnboardingStep::Step6(s) => self.step6 = Some(s),
			OnboardingStep::Step7(s) => self.step7 = Some(s),
			OnboardingStep::Step8(s) => self.step8 = Some(s),
		}
	}

	/// Step numbers present in this record.
	pub fn supplied_steps(&self) -> Vec<u8> {
		let mut present = Vec::new();
		if self.step1.is_some() {
			present.push(1);
		}
		if self.step2.is_some() {
			present.push(2);
		}
		if self.step3.is_some() {
			present.push(3);
		}
		if self.step4.is_some() {
			present.push(4);
		}
		if self.step5.is_some() {
			present.push(5);
		}
		if self.step6.is_some() {
			present.push(6);
		}
		if self.step7.is_some() {
			present.push(7);
		}
		if self.step8.is_some() {
			present.push(8);
		}
		present
	}
}
