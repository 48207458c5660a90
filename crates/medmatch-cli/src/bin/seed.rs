//! Seeds the database with synthetic onboarded users and forms
//! compatibility-scored matching groups.
//!
//! Wipes every non-admin identity first, so repeated runs start from a
//! clean slate while admin accounts survive.

use clap::Parser;
use console::style;
use dialoguer::Confirm;
use medmatch_core::codec::Domain;
use medmatch_core::mapper::encode_record;
use medmatch_core::steps::{
	BasicInfo, Interests, LifestyleInfo, LookingFor, MedicalBackground, OnboardingRecord,
	PhysicalActivity, SocialStyle, SportInterest, WeeklySlots,
};
use medmatch_db::{MatchStore, NewNotification};
use rand::prelude::*;
use rand::rngs::StdRng;

#[derive(Parser, Debug)]
#[command(name = "medmatch-seed")]
#[command(about = "Seeds synthetic users and matching groups", long_about = None)]
struct Args {
	/// How many users to create
	#[arg(long, default_value_t = 24)]
	count: usize,

	/// RNG seed, for reproducible datasets
	#[arg(long, default_value_t = 42)]
	seed: u64,

	/// Skip the confirmation prompt
	#[arg(long)]
	yes: bool,

	/// Database connection string
	#[arg(long, value_name = "DATABASE", default_value = "sqlite:medmatch.db")]
	database: String,
}

const FIRST_NAMES: &[&str] = &[
	"Aisha", "Chen", "Diego", "Emma", "Felix", "Hana", "Ivan", "Julia", "Kwame", "Lena", "Marco",
	"Nadia", "Omar", "Priya", "Quinn", "Rosa", "Sven", "Tara", "Umar", "Vera", "Wei", "Yuki",
	"Zara", "Noah",
];
const CITIES: &[&str] = &["Berlin", "Boston", "London", "Madrid", "Toronto", "Zurich"];
const SPECIALTIES: &[&str] = &[
	"Anesthesiology",
	"Cardiology",
	"Emergency Medicine",
	"Internal Medicine",
	"Neurology",
	"Pediatrics",
	"Psychiatry",
	"Surgery",
];
const SPORTS: &[&str] = &["Climbing", "Cycling", "Running", "Swimming", "Tennis", "Yoga"];
const MUSIC: &[&str] = &["Classical", "Electronic", "Hip hop", "Jazz", "Rock"];
const MOVIES: &[&str] = &["Comedies", "Documentaries", "Sci-fi", "Thrillers"];
const MEETING_ACTIVITIES: &[&str] = &["Coffee", "Dinner", "Museum visits", "Outdoor sports"];
const MEETING_TIMES: &[&str] = &[
	"weekday_evening",
	"weekday_lunch",
	"weekend_afternoon",
	"weekend_morning",
];
const LOOKING_FOR: &[&str] = &["Friendship", "Mentorship", "Study partners", "Workout buddies"];
const GENDERS: &[&str] = &["Female", "Male", "Non-binary"];

fn pick<'a>(rng: &mut StdRng, values: &[&'a str]) -> &'a str {
	values.choose(rng).copied().unwrap_or(values[0])
}

fn pick_many(rng: &mut StdRng, values: &[&str], max: usize) -> Vec<String> {
	let n = rng.gen_range(1..=max.min(values.len()));
	let mut shuffled: Vec<&str> = values.to_vec();
	shuffled.shuffle(rng);
	shuffled.truncate(n);
	shuffled.into_iter().map(str::to_string).collect()
}

fn pick_domain(rng: &mut StdRng, domain: Domain) -> String {
	let values: Vec<&str> = domain.display_values().collect();
	pick(rng, &values).to_string()
}

/// A full display-form record drawn from the seed vocabulary.
fn synthetic_record(rng: &mut StdRng, name: &str) -> OnboardingRecord {
	OnboardingRecord {
		step1: Some(BasicInfo {
			display_name: Some(format!("Dr. {}", name)),
			gender: pick(rng, GENDERS).to_string(),
			city: pick(rng, CITIES).to_string(),
			nationality: None,
			gender_preference: pick_domain(rng, Domain::GenderPreference),
		}),
		step2: Some(MedicalBackground {
			medical_specialties: pick_many(rng, SPECIALTIES, 2),
			career_stage: pick_domain(rng, Domain::CareerStage),
			specialty_preference: pick_domain(rng, Domain::SpecialtyPreference),
		}),
		step3: Some(PhysicalActivity {
			activity_level: pick_domain(rng, Domain::ActivityLevel),
			sports: pick_many(rng, SPORTS, 3)
				.into_iter()
				.map(|name| SportInterest {
					name,
					interest_level: rng.gen_range(1..=5),
				})
				.collect(),
		}),
		step4: Some(Interests {
			music: pick_many(rng, MUSIC, 2),
			movies_tv: pick_many(rng, MOVIES, 2),
			other: Vec::new(),
		}),
		step5: Some(SocialStyle {
			meeting_activities: pick_many(rng, MEETING_ACTIVITIES, 2),
			social_energy: pick_domain(rng, Domain::SocialEnergy),
			conversation_style: pick_domain(rng, Domain::ConversationStyle),
		}),
		step6: Some(WeeklySlots {
			meeting_times: pick_many(rng, MEETING_TIMES, 3),
			frequency: pick_domain(rng, Domain::MeetingFrequency),
		}),
		step7: Some(LookingFor {
			looking_for: pick_many(rng, LOOKING_FOR, 2),
			ideal_weekend: None,
		}),
		step8: Some(LifestyleInfo {
			dietary_restriction: None,
			life_stage: pick_domain(rng, Domain::LifeStage),
		}),
	}
}

fn overlap(a: &[String], b: &[String]) -> usize {
	a.iter().filter(|v| b.contains(v)).count()
}

/// Pairwise compatibility: shared availability weighs most, then shared
/// goals and interests, then matching stage and energy.
fn compatibility(a: &OnboardingRecord, b: &OnboardingRecord) -> u32 {
	let mut score = 0;
	if let (Some(a6), Some(b6)) = (&a.step6, &b.step6) {
		score += 3 * overlap(&a6.meeting_times, &b6.meeting_times) as u32;
	}
	if let (Some(a7), Some(b7)) = (&a.step7, &b.step7) {
		score += 2 * overlap(&a7.looking_for, &b7.looking_for) as u32;
	}
	if let (Some(a5), Some(b5)) = (&a.step5, &b.step5) {
		score += overlap(&a5.meeting_activities, &b5.meeting_activities) as u32;
		if a5.social_energy == b5.social_energy {
			score += 1;
		}
	}
	if let (Some(a2), Some(b2)) = (&a.step2, &b.step2) {
		if a2.career_stage == b2.career_stage {
			score += 2;
		}
		score += overlap(&a2.medical_specialties, &b2.medical_specialties) as u32;
	}
	if let (Some(a3), Some(b3)) = (&a.step3, &b.step3) {
		if a3.activity_level == b3.activity_level {
			score += 1;
		}
	}
	score
}

/// Greedy grouping into parties of 3-4: seed with the first unassigned
/// user, fill with their highest-scoring matches.
fn form_groups(records: &[(String, OnboardingRecord)]) -> Vec<Vec<String>> {
	let mut unassigned: Vec<usize> = (0..records.len()).collect();
	let mut groups = Vec::new();

	while !unassigned.is_empty() {
		let anchor = unassigned.remove(0);
		let mut scored: Vec<(u32, usize)> = unassigned
			.iter()
			.map(|&i| (compatibility(&records[anchor].1, &records[i].1), i))
			.collect();
		scored.sort_by(|a, b| b.0.cmp(&a.0));

		// Take three partners where possible; a final short group of
		// fewer members is acceptable.
		let take = scored.len().min(3);
		let mut group = vec![records[anchor].0.clone()];
		for &(_, i) in scored.iter().take(take) {
			group.push(records[i].0.clone());
			unassigned.retain(|&j| j != i);
		}
		groups.push(group);
	}

	groups
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	println!("{}", style("medmatch seed").cyan().bold());
	println!(
		"  {} users into {}",
		style(args.count).yellow(),
		style(&args.database).dim()
	);
	println!();

	if !args.yes {
		let confirmed = Confirm::new()
			.with_prompt("This deletes every non-admin user. Continue?")
			.default(false)
			.interact()?;
		if !confirmed {
			println!("{}", style("Seeding cancelled").yellow());
			return Ok(());
		}
	}

	let store = MatchStore::connect(&args.database).await?;
	store.create_schema().await?;

	let removed = store.delete_non_admin_users().await?;
	println!("  {} existing users removed", style(removed).yellow());

	let mut rng = StdRng::seed_from_u64(args.seed);
	let mut seeded: Vec<(String, OnboardingRecord)> = Vec::new();

	for i in 0..args.count {
		let name = FIRST_NAMES[i % FIRST_NAMES.len()];
		let username = format!("seed_{}_{:02}", name.to_lowercase(), i);
		let user = store
			.create_user(&username, &format!("{}@example.org", username), "seed-password")
			.await?;
		let record = synthetic_record(&mut rng, name);
		store
			.submit_onboarding(&user.id, &encode_record(&record))
			.await?;
		seeded.push((user.id, record));
	}
	println!("  {} users created and onboarded", style(seeded.len()).green());

	let groups = form_groups(&seeded);
	for (n, group) in groups.iter().enumerate() {
		for user_id in group {
			store
				.add_notification(
					user_id,
					&NewNotification {
						title: "You have a new group!".to_string(),
						message: format!(
							"You've been matched into a group of {}. Say hello!",
							group.len()
						),
						kind: "match".to_string(),
						link: Some(format!("/groups/{}", n + 1)),
					},
				)
				.await?;
		}
	}
	println!(
		"  {} groups formed ({})",
		style(groups.len()).green(),
		groups
			.iter()
			.map(|g| g.len().to_string())
			.collect::<Vec<_>>()
			.join("+")
	);

	println!();
	println!("{}", style("✓ Seeding complete").green().bold());
	Ok(())
}
