//! Bidirectional field codec for the eight enumerated preference domains.
//!
//! Form surfaces work with human-readable display strings
//! ("Resident (1st-2nd year)"); storage works with normalized codes
//! (`resident_1-2`). Both directions are total functions: unknown input
//! resolves to a fixed per-domain default and is never an error. The
//! leniency is deliberate - a stored code from an older vocabulary still
//! renders as something sensible instead of failing the whole page.
//!
//! There is exactly one canonical table per domain. Every caller
//! (onboarding submit, profile read, profile edit, seeding) goes through
//! this module.

use serde::{Deserialize, Serialize};

/// One of the eight enumerated preference categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
	CareerStage,
	SpecialtyPreference,
	GenderPreference,
	SocialEnergy,
	ConversationStyle,
	ActivityLevel,
	MeetingFrequency,
	LifeStage,
}

/// `(display, code)` pairs per domain. The first entry marked by
/// `default_index` is the fallback for unknown input in either direction.
struct DomainTable {
	entries: &'static [(&'static str, &'static str)],
	default_index: usize,
}

const CAREER_STAGE: DomainTable = DomainTable {
	entries: &[
		("Medical student", "medical_student"),
		("Resident (1st-2nd year)", "resident_1-2"),
		("Resident (3rd+ year)", "resident_3+"),
		("Fellow", "fellow"),
		("Attending/Consultant", "attending"),
		("Other healthcare professional", "other"),
	],
	default_index: 0,
};

const SPECIALTY_PREFERENCE: DomainTable = DomainTable {
	entries: &[
		("Same specialty", "same"),
		("Different specialties preferred", "different"),
		("No preference", "no_preference"),
	],
	default_index: 2,
};

const GENDER_PREFERENCE: DomainTable = DomainTable {
	entries: &[
		("Same gender", "same"),
		("No preference", "no_preference"),
	],
	default_index: 1,
};

const SOCIAL_ENERGY: DomainTable = DomainTable {
	entries: &[
		("Very introverted", "very_introverted"),
		("Somewhat introverted", "somewhat_introverted"),
		("Balanced", "balanced"),
		("Somewhat extroverted", "somewhat_extroverted"),
		("Very extroverted", "very_extroverted"),
	],
	default_index: 2,
};

const CONVERSATION_STYLE: DomainTable = DomainTable {
	entries: &[
		("Deep, meaningful conversations", "deep"),
		("Light, fun banter", "light"),
		("Mix of both", "mixed"),
	],
	default_index: 2,
};

const ACTIVITY_LEVEL: DomainTable = DomainTable {
	entries: &[
		("Mostly sedentary", "sedentary"),
		("Lightly active (1-2 times/month)", "lightly_active"),
		("Moderately active (1-2 times/week)", "moderately_active"),
		("Very active (3+ times/week)", "very_active"),
	],
	default_index: 2,
};

const MEETING_FREQUENCY: DomainTable = DomainTable {
	entries: &[
		("Weekly", "weekly"),
		("Every two weeks", "biweekly"),
		("Monthly", "monthly"),
		("As schedules allow", "flexible"),
	],
	default_index: 2,
};

const LIFE_STAGE: DomainTable = DomainTable {
	entries: &[
		("Single", "single"),
		("In a relationship", "relationship"),
		("Married", "married"),
		("Parent", "parent"),
		("Prefer not to say", "prefer_not_to_say"),
	],
	default_index: 4,
};

impl Domain {
	fn table(self) -> &'static DomainTable {
		match self {
			Domain::CareerStage => &CAREER_STAGE,
			Domain::SpecialtyPreference => &SPECIALTY_PREFERENCE,
			Domain::GenderPreference => &GENDER_PREFERENCE,
			Domain::SocialEnergy => &SOCIAL_ENERGY,
			Domain::ConversationStyle => &CONVERSATION_STYLE,
			Domain::ActivityLevel => &ACTIVITY_LEVEL,
			Domain::MeetingFrequency => &MEETING_FREQUENCY,
			Domain::LifeStage => &LIFE_STAGE,
		}
	}

	/// All documented display values for this domain.
	pub fn display_values(self) -> impl Iterator<Item = &'static str> {
		self.table().entries.iter().map(|(display, _)| *display)
	}

	/// All documented storage codes for this domain.
	pub fn codes(self) -> impl Iterator<Item = &'static str> {
		self.table().entries.iter().map(|(_, code)| *code)
	}

	/// The fallback storage code for unknown input.
	pub fn default_code(self) -> &'static str {
		let table = self.table();
		table.entries[table.default_index].1
	}

	/// The fallback display value for unknown input.
	pub fn default_display(self) -> &'static str {
		let table = self.table();
		table.entries[table.default_index].0
	}
}

/// Maps a display value onto its storage code.
///
/// Unknown display values resolve to the domain default.
///
/// # Examples
///
/// ```
/// use medmatch_core::codec::{Domain, encode};
///
/// assert_eq!(encode(Domain::CareerStage, "Resident (1st-2nd year)"), "resident_1-2");
/// assert_eq!(encode(Domain::CareerStage, "something unexpected"), "medical_student");
/// ```
pub fn encode(domain: Domain, display: &str) -> &'static str {
	let table = domain.table();
	table
		.entries
		.iter()
		.find(|(d, _)| *d == display)
		.map(|(_, code)| *code)
		.unwrap_or(domain.default_code())
}

/// Maps a storage code back onto its display value.
///
/// Unknown codes resolve to the domain default; this is never an error.
///
/// # Examples
///
/// ```
/// use medmatch_core::codec::{Domain, decode};
///
/// assert_eq!(decode(Domain::CareerStage, "fellow"), "Fellow");
/// assert_eq!(
///     decode(Domain::ActivityLevel, "retired_vocabulary"),
///     "Moderately active (1-2 times/week)"
/// );
/// ```
pub fn decode(domain: Domain, code: &str) -> &'static str {
	let table = domain.table();
	table
		.entries
		.iter()
		.find(|(_, c)| *c == code)
		.map(|(display, _)| *display)
		.unwrap_or(domain.default_display())
}

/// Normalizes a free-form value into a storage slug.
///
/// Gender is stored as a slug but is not one of the eight codec domains,
/// so it goes through this helper instead of a fixed table.
///
/// # Examples
///
/// ```
/// use medmatch_core::codec::slugify;
///
/// assert_eq!(slugify("Male"), "male");
/// assert_eq!(slugify("Non-binary"), "non_binary");
/// assert_eq!(slugify("Prefer not to say"), "prefer_not_to_say");
/// ```
pub fn slugify(value: &str) -> String {
	let mut slug = String::with_capacity(value.len());
	let mut last_was_sep = false;
	for ch in value.trim().chars() {
		if ch.is_ascii_alphanumeric() {
			slug.push(ch.to_ascii_lowercase());
			last_was_sep = false;
		} else if !last_was_sep && !slug.is_empty() {
			slug.push('_');
			last_was_sep = true;
		}
	}
	if slug.ends_with('_') {
		slug.pop();
	}
	slug
}

/// Re-expands a slug into a display form ("non_binary" -> "Non binary").
pub fn unslugify(slug: &str) -> String {
	let mut display = String::with_capacity(slug.len());
	for (i, part) in slug.split('_').enumerate() {
		if i > 0 {
			display.push(' ');
		}
		if i == 0 {
			let mut chars = part.chars();
			if let Some(first) = chars.next() {
				display.push(first.to_ascii_uppercase());
				display.extend(chars);
			}
		} else {
			display.push_str(part);
		}
	}
	display
}

/// All eight domains, in the order the wizard presents them.
pub const ALL_DOMAINS: [Domain; 8] = [
	Domain::CareerStage,
	Domain::SpecialtyPreference,
	Domain::GenderPreference,
	Domain::SocialEnergy,
	Domain::ConversationStyle,
	Domain::ActivityLevel,
	Domain::MeetingFrequency,
	Domain::LifeStage,
];

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[test]
	fn round_trips_every_documented_display_value() {
		for domain in ALL_DOMAINS {
			for display in domain.display_values() {
				let code = encode(domain, display);
				assert_eq!(decode(domain, code), display, "domain {:?}", domain);
			}
		}
	}

	#[test]
	fn round_trips_every_documented_code() {
		for domain in ALL_DOMAINS {
			for code in domain.codes() {
				let display = decode(domain, code);
				assert_eq!(encode(domain, display), code, "domain {:?}", domain);
			}
		}
	}

	#[rstest]
	#[case(Domain::CareerStage, "astronaut", "Medical student")]
	#[case(Domain::SpecialtyPreference, "", "No preference")]
	#[case(Domain::GenderPreference, "???", "No preference")]
	#[case(Domain::SocialEnergy, "loud", "Balanced")]
	#[case(Domain::ConversationStyle, "x", "Mix of both")]
	#[case(Domain::ActivityLevel, "marathon", "Moderately active (1-2 times/week)")]
	#[case(Domain::MeetingFrequency, "daily", "Monthly")]
	#[case(Domain::LifeStage, "unknown", "Prefer not to say")]
	fn unknown_code_resolves_to_domain_default(
		#[case] domain: Domain,
		#[case] code: &str,
		#[case] expected: &str,
	) {
		assert_eq!(decode(domain, code), expected);
	}

	#[test]
	fn unknown_display_encodes_to_domain_default() {
		assert_eq!(encode(Domain::CareerStage, "Janitor"), "medical_student");
		assert_eq!(encode(Domain::ActivityLevel, ""), "moderately_active");
	}

	#[test]
	fn fellow_encodes_to_fellow() {
		assert_eq!(encode(Domain::CareerStage, "Fellow"), "fellow");
		assert_eq!(decode(Domain::CareerStage, "fellow"), "Fellow");
	}

	#[test]
	fn slugify_normalizes_gender_values() {
		assert_eq!(slugify("Female"), "female");
		assert_eq!(slugify("  Non-Binary  "), "non_binary");
		assert_eq!(slugify(""), "");
	}

	#[test]
	fn slugify_then_unslugify_keeps_words() {
		assert_eq!(unslugify(&slugify("Prefer not to say")), "Prefer not to say");
	}
}
