//! Store integration tests against in-memory SQLite.

use medmatch_core::steps::{
	BasicInfo, Interests, LifestyleInfo, LookingFor, MedicalBackground, OnboardingRecord,
	PhysicalActivity, SocialStyle, SportInterest, WeeklySlots,
};
use medmatch_db::{AdminRole, MatchStore, NewNotification, UserFilter};

/// A complete, already-encoded record (storage codes, not display strings).
fn encoded_record() -> OnboardingRecord {
	OnboardingRecord {
		step1: Some(BasicInfo {
			display_name: Some("Dr. Chen".to_string()),
			gender: "female".to_string(),
			city: "Boston".to_string(),
			nationality: Some("US".to_string()),
			gender_preference: "same".to_string(),
		}),
		step2: Some(MedicalBackground {
			medical_specialties: vec!["Cardiology".to_string()],
			career_stage: "resident_1-2".to_string(),
			specialty_preference: "no_preference".to_string(),
		}),
		step3: Some(PhysicalActivity {
			activity_level: "moderately_active".to_string(),
			sports: vec![SportInterest {
				name: "Climbing".to_string(),
				interest_level: 4,
			}],
		}),
		step4: Some(Interests {
			music: vec!["Jazz".to_string()],
			movies_tv: vec!["Documentaries".to_string()],
			other: vec![],
		}),
		step5: Some(SocialStyle {
			meeting_activities: vec!["Coffee".to_string()],
			social_energy: "balanced".to_string(),
			conversation_style: "deep".to_string(),
		}),
		step6: Some(WeeklySlots {
			meeting_times: vec!["weekday_evening".to_string()],
			frequency: "monthly".to_string(),
		}),
		step7: Some(LookingFor {
			looking_for: vec!["friendship".to_string()],
			ideal_weekend: Some("Hiking and a long brunch".to_string()),
		}),
		step8: Some(LifestyleInfo {
			dietary_restriction: Some("Vegetarian".to_string()),
			life_stage: "single".to_string(),
		}),
	}
}

#[tokio::test]
async fn submit_populates_every_collection_and_sets_flags() {
	let store = MatchStore::in_memory().await.unwrap();
	store.submit_onboarding("u1", &encoded_record()).await.unwrap();

	let profile = store.read_profile("u1").await.unwrap().unwrap();
	assert_eq!(profile.display_name.as_deref(), Some("Dr. Chen"));
	assert_eq!(profile.city.as_deref(), Some("Boston"));
	assert!(profile.flags.is_onboarding_complete);
	assert!(profile.flags.is_matchable);

	let medical = store.read_medical("u1").await.unwrap().unwrap();
	assert_eq!(medical.specialties, vec!["Cardiology"]);
	assert_eq!(medical.career_stage, "resident_1-2");
	assert_eq!(medical.gender_preference, "same");

	assert_eq!(
		store.read_activity_level("u1").await.unwrap().as_deref(),
		Some("moderately_active")
	);
	assert_eq!(store.read_sports("u1").await.unwrap().len(), 1);
	assert_eq!(store.read_interests("u1").await.unwrap().music, vec!["Jazz"]);

	let social = store.read_social("u1").await.unwrap().unwrap();
	assert_eq!(social.social_energy, "balanced");
	assert_eq!(social.looking_for, vec!["friendship"]);
	assert_eq!(social.ideal_weekend.as_deref(), Some("Hiking and a long brunch"));

	let slots = store.read_availability("u1").await.unwrap().unwrap();
	assert_eq!(slots.frequency, "monthly");
	let lifestyle = store.read_lifestyle("u1").await.unwrap().unwrap();
	assert_eq!(lifestyle.life_stage, "single");
}

#[tokio::test]
async fn submit_without_a_required_step_is_rejected() {
	let store = MatchStore::in_memory().await.unwrap();
	let mut record = encoded_record();
	record.step2 = None;
	let err = store.submit_onboarding("u1", &record).await.unwrap_err();
	assert!(matches!(err, medmatch_core::Error::Validation(_)));
	// Nothing was written.
	assert!(store.read_profile("u1").await.unwrap().is_none());
}

#[tokio::test]
async fn submit_defaults_absent_optional_steps() {
	let store = MatchStore::in_memory().await.unwrap();
	let mut record = encoded_record();
	record.step3 = None;
	record.step4 = None;
	record.step8 = None;
	store.submit_onboarding("u1", &record).await.unwrap();

	assert_eq!(
		store.read_activity_level("u1").await.unwrap().as_deref(),
		Some("moderately_active")
	);
	assert!(store.read_sports("u1").await.unwrap().is_empty());
	let lifestyle = store.read_lifestyle("u1").await.unwrap().unwrap();
	assert_eq!(lifestyle.life_stage, "prefer_not_to_say");
	assert!(lifestyle.dietary_restriction.is_none());
}

#[tokio::test]
async fn double_submit_keeps_one_row_per_singleton() {
	let store = MatchStore::in_memory().await.unwrap();
	store.submit_onboarding("u1", &encoded_record()).await.unwrap();

	let mut record = encoded_record();
	record.step2.as_mut().unwrap().career_stage = "fellow".to_string();
	store.submit_onboarding("u1", &record).await.unwrap();

	let medical = store.read_medical("u1").await.unwrap().unwrap();
	assert_eq!(medical.career_stage, "fellow");
	// Sports were replaced, not appended.
	assert_eq!(store.read_sports("u1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn partial_update_touches_only_supplied_steps() {
	let store = MatchStore::in_memory().await.unwrap();
	store.submit_onboarding("u1", &encoded_record()).await.unwrap();

	let update = OnboardingRecord {
		step3: Some(PhysicalActivity {
			activity_level: "very_active".to_string(),
			sports: vec![],
		}),
		..Default::default()
	};
	store.apply_partial("u1", &update).await.unwrap();

	assert_eq!(
		store.read_activity_level("u1").await.unwrap().as_deref(),
		Some("very_active")
	);
	assert!(store.read_sports("u1").await.unwrap().is_empty());
	// Untouched collections keep their values.
	let medical = store.read_medical("u1").await.unwrap().unwrap();
	assert_eq!(medical.career_stage, "resident_1-2");
	let profile = store.read_profile("u1").await.unwrap().unwrap();
	assert_eq!(profile.city.as_deref(), Some("Boston"));
}

#[tokio::test]
async fn empty_partial_update_is_rejected() {
	let store = MatchStore::in_memory().await.unwrap();
	let err = store
		.apply_partial("u1", &OnboardingRecord::default())
		.await
		.unwrap_err();
	assert!(matches!(err, medmatch_core::Error::Validation(_)));
}

#[tokio::test]
async fn social_row_writes_preserve_the_other_sides_columns() {
	let store = MatchStore::in_memory().await.unwrap();
	store.submit_onboarding("u1", &encoded_record()).await.unwrap();

	// Step 5 alone must not clobber the looking-for fields.
	let style_only = OnboardingRecord {
		step5: Some(SocialStyle {
			meeting_activities: vec!["Dinner".to_string()],
			social_energy: "somewhat_extroverted".to_string(),
			conversation_style: "mixed".to_string(),
		}),
		..Default::default()
	};
	store.apply_partial("u1", &style_only).await.unwrap();
	let social = store.read_social("u1").await.unwrap().unwrap();
	assert_eq!(social.social_energy, "somewhat_extroverted");
	assert_eq!(social.looking_for, vec!["friendship"]);
	assert_eq!(social.ideal_weekend.as_deref(), Some("Hiking and a long brunch"));

	// And step 7 alone must not clobber the style fields.
	let looking_only = OnboardingRecord {
		step7: Some(LookingFor {
			looking_for: vec!["mentorship".to_string()],
			ideal_weekend: None,
		}),
		..Default::default()
	};
	store.apply_partial("u1", &looking_only).await.unwrap();
	let social = store.read_social("u1").await.unwrap().unwrap();
	assert_eq!(social.social_energy, "somewhat_extroverted");
	assert_eq!(social.meeting_activities, vec!["Dinner"]);
	assert_eq!(social.looking_for, vec!["mentorship"]);
}

#[tokio::test]
async fn step1_update_preserves_medical_background() {
	let store = MatchStore::in_memory().await.unwrap();
	store.submit_onboarding("u1", &encoded_record()).await.unwrap();

	let update = OnboardingRecord {
		step1: Some(BasicInfo {
			display_name: None,
			gender: "female".to_string(),
			city: "Cambridge".to_string(),
			nationality: None,
			gender_preference: "no_preference".to_string(),
		}),
		..Default::default()
	};
	store.apply_partial("u1", &update).await.unwrap();

	let medical = store.read_medical("u1").await.unwrap().unwrap();
	assert_eq!(medical.gender_preference, "no_preference");
	assert_eq!(medical.specialties, vec!["Cardiology"]);
	let profile = store.read_profile("u1").await.unwrap().unwrap();
	assert_eq!(profile.city.as_deref(), Some("Cambridge"));
	// Absent optional fields are left alone, not nulled.
	assert_eq!(profile.display_name.as_deref(), Some("Dr. Chen"));
}

#[tokio::test]
async fn notifications_list_unread_first_and_mark_read() {
	let store = MatchStore::in_memory().await.unwrap();
	store.ensure_profile("u1", None).await.unwrap();

	let first = store
		.add_notification(
			"u1",
			&NewNotification {
				title: "Welcome".to_string(),
				message: "Your profile is live".to_string(),
				kind: "system".to_string(),
				link: None,
			},
		)
		.await
		.unwrap();
	store
		.add_notification(
			"u1",
			&NewNotification {
				title: "New group".to_string(),
				message: "You have been matched".to_string(),
				kind: "match".to_string(),
				link: Some("/groups/g1".to_string()),
			},
		)
		.await
		.unwrap();

	store.mark_notification_read("u1", &first.id).await.unwrap();
	let listed = store.list_notifications("u1").await.unwrap();
	assert_eq!(listed.len(), 2);
	assert!(!listed[0].is_read);
	assert_eq!(listed[0].title, "New group");
	assert!(listed[1].is_read);
	assert!(listed[1].read_at.is_some());

	assert_eq!(store.mark_all_notifications_read("u1").await.unwrap(), 1);
	assert_eq!(store.count_unread_notifications().await.unwrap(), 0);
}

#[tokio::test]
async fn notification_owner_scoping() {
	let store = MatchStore::in_memory().await.unwrap();
	let row = store
		.add_notification(
			"u1",
			&NewNotification {
				title: "t".to_string(),
				message: "m".to_string(),
				kind: "system".to_string(),
				link: None,
			},
		)
		.await
		.unwrap();

	// Someone else cannot mark or delete it.
	assert!(store.mark_notification_read("u2", &row.id).await.is_err());
	assert!(store.delete_notification(&row.id, Some("u2")).await.is_err());
	// The admin path (no owner) can.
	store.delete_notification(&row.id, None).await.unwrap();
}

#[tokio::test]
async fn auth_roundtrip_and_session_lifecycle() {
	let store = MatchStore::in_memory().await.unwrap();
	let user = store
		.create_user("chen", "chen@example.org", "hunter2hunter2")
		.await
		.unwrap();
	assert!(user.is_active);

	// Duplicate usernames are rejected.
	assert!(store.create_user("chen", "x@example.org", "pw").await.is_err());

	// Wrong password and unknown user fail identically.
	assert!(store.verify_credentials("chen", "wrong").await.is_err());
	assert!(store.verify_credentials("nobody", "pw").await.is_err());
	let verified = store
		.verify_credentials("chen", "hunter2hunter2")
		.await
		.unwrap();
	assert_eq!(verified.id, user.id);

	let key = store.create_session(&user.id).await.unwrap();
	let loaded = store.load_session(&key).await.unwrap().unwrap();
	assert_eq!(loaded.username, "chen");
	store.delete_session(&key).await.unwrap();
	assert!(store.load_session(&key).await.unwrap().is_none());
}

#[tokio::test]
async fn admin_roles_and_listing() {
	let store = MatchStore::in_memory().await.unwrap();
	assert!(store.role_of("u1").await.unwrap().is_none());
	store.grant_role("u1", AdminRole::Admin).await.unwrap();
	assert_eq!(store.role_of("u1").await.unwrap(), Some(AdminRole::Admin));
	store.grant_role("u1", AdminRole::SuperAdmin).await.unwrap();
	assert_eq!(store.role_of("u1").await.unwrap(), Some(AdminRole::SuperAdmin));

	store.submit_onboarding("u2", &encoded_record()).await.unwrap();
	store.ensure_profile("u3", Some("Dr. Park")).await.unwrap();

	let (all, total) = store
		.list_profiles(&UserFilter::default(), 10, 0)
		.await
		.unwrap();
	assert_eq!(total, 2);
	assert_eq!(all.len(), 2);

	let filter = UserFilter {
		search: Some("Chen".to_string()),
		onboarding_complete: Some(true),
	};
	let (found, total) = store.list_profiles(&filter, 10, 0).await.unwrap();
	assert_eq!(total, 1);
	assert_eq!(found[0].display_name.as_deref(), Some("Dr. Chen"));

	assert_eq!(store.count_profiles().await.unwrap(), 2);
	assert_eq!(store.count_onboarded().await.unwrap(), 1);
	assert_eq!(store.count_matchable().await.unwrap(), 1);
}

// Spawning moves the futures to another task, so this compiles only if
// every store call stays Send end to end.
#[tokio::test]
async fn store_calls_run_from_spawned_tasks() {
	let store = MatchStore::in_memory().await.unwrap();
	let handle = tokio::spawn({
		let store = store.clone();
		async move {
			store.submit_onboarding("u1", &encoded_record()).await?;
			let filter = UserFilter {
				search: Some("Chen".to_string()),
				onboarding_complete: Some(true),
			};
			let (found, total) = store.list_profiles(&filter, 10, 0).await?;
			assert_eq!((found.len(), total), (1, 1));
			let row = store
				.add_notification(
					"u1",
					&NewNotification {
						title: "t".to_string(),
						message: "m".to_string(),
						kind: "system".to_string(),
						link: None,
					},
				)
				.await?;
			store.delete_notification(&row.id, Some("u1")).await?;
			Ok::<_, medmatch_core::Error>(())
		}
	});
	handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn admin_delete_removes_profile_but_keeps_identity() {
	let store = MatchStore::in_memory().await.unwrap();
	let user = store
		.create_user("chen", "chen@example.org", "hunter2hunter2")
		.await
		.unwrap();
	store.submit_onboarding(&user.id, &encoded_record()).await.unwrap();

	store.delete_profile(&user.id).await.unwrap();
	assert!(store.read_profile(&user.id).await.unwrap().is_none());
	assert!(store.read_medical(&user.id).await.unwrap().is_none());
	assert!(store.find_user("chen").await.unwrap().is_some());
}
