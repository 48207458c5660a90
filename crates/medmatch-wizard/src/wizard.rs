//! The onboarding wizard.
//!
//! The wizard owns the in-flight record and the navigation rules: eight
//! steps, forward movement gated on completing the current step (the
//! optional ones may be skipped), backward movement always allowed,
//! jumps only into territory the user has already visited. Every
//! recorded step writes a draft; the draft is cleared only by a
//! successful submit.

use std::collections::BTreeSet;

use async_trait::async_trait;
use medmatch_core::mapper::encode_record;
use medmatch_core::steps::{OnboardingRecord, OnboardingStep};
use medmatch_core::validation::{FieldError, validate_for_submit};
use medmatch_core::{Error, Result};
use medmatch_db::MatchStore;

use crate::draft::{DraftSnapshot, DraftStore};

pub const TOTAL_STEPS: u8 = 8;

/// Steps the user may skip past without filling in.
pub const OPTIONAL_STEPS: [u8; 3] = [3, 4, 8];

/// Where the wizard is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardState {
	/// Collecting input on the given step.
	Step(u8),
	Submitting,
	Complete,
	/// The last submit failed; the draft is still intact.
	Error(String),
}

/// The downstream side of a submit.
///
/// Takes a *display-form* record that already passed the two-pass
/// validation; implementations encode and persist it.
#[async_trait]
pub trait SubmitGateway: Send + Sync {
	async fn submit(&self, user_id: &str, record: &OnboardingRecord) -> Result<()>;
}

#[async_trait]
impl SubmitGateway for MatchStore {
	async fn submit(&self, user_id: &str, record: &OnboardingRecord) -> Result<()> {
		self.submit_onboarding(user_id, &encode_record(record)).await
	}
}

/// A user's onboarding session.
pub struct OnboardingWizard<G, D> {
	user_id: String,
	record: OnboardingRecord,
	current_step: u8,
	completed: BTreeSet<u8>,
	state: WizardState,
	gateway: G,
	drafts: D,
}

impl<G: SubmitGateway, D: DraftStore> OnboardingWizard<G, D> {
	/// Starts a fresh wizard at step 1.
	pub fn new(user_id: impl Into<String>, gateway: G, drafts: D) -> Self {
		Self {
			user_id: user_id.into(),
			record: OnboardingRecord::default(),
			current_step: 1,
			completed: BTreeSet::new(),
			state: WizardState::Step(1),
			gateway,
			drafts,
		}
	}

	/// Starts a wizard, restoring the user's draft if one exists.
	pub async fn resume(user_id: impl Into<String>, gateway: G, drafts: D) -> Result<Self> {
		let mut wizard = Self::new(user_id, gateway, drafts);
		if let Some(draft) = wizard.drafts.load(&wizard.user_id).await? {
			wizard.record = draft.data;
			wizard.current_step = draft.current_step.clamp(1, TOTAL_STEPS);
			wizard.completed = draft.completed_steps;
			wizard.state = WizardState::Step(wizard.current_step);
			tracing::debug!(user_id = %wizard.user_id, step = wizard.current_step, "draft resumed");
		}
		Ok(wizard)
	}

	pub fn current_step(&self) -> u8 {
		self.current_step
	}

	pub fn state(&self) -> &WizardState {
		&self.state
	}

	pub fn completed_steps(&self) -> &BTreeSet<u8> {
		&self.completed
	}

	pub fn record(&self) -> &OnboardingRecord {
		&self.record
	}

	/// Records the payload for its step, marks the step completed and
	/// saves a draft. The wizard does not move; call [`Self::next`].
	pub async fn record_step(&mut self, step: OnboardingStep) -> Result<()> {
		step.validate()
			.map_err(|e| Error::Validation(e.to_string()))?;
		let number = step.number();
		self.record.apply(step);
		self.completed.insert(number);
		self.save_draft().await
	}

	/// Moves forward one step.
	///
	/// Allowed when the current step is completed or optional. The last
	/// step has no next; submitting is a separate call.
	pub async fn next(&mut self) -> Result<u8> {
		if self.current_step >= TOTAL_STEPS {
			return Err(Error::Validation("Already on the last step".to_string()));
		}
		if !self.completed.contains(&self.current_step)
			&& !OPTIONAL_STEPS.contains(&self.current_step)
		{
			return Err(Error::Validation(format!(
				"Step {} must be completed first",
				self.current_step
			)));
		}
		self.current_step += 1;
		self.state = WizardState::Step(self.current_step);
		self.save_draft().await?;
		Ok(self.current_step)
	}

	/// Moves back one step; always allowed above step 1.
	pub async fn previous(&mut self) -> Result<u8> {
		if self.current_step <= 1 {
			return Err(Error::Validation("Already on the first step".to_string()));
		}
		self.current_step -= 1;
		self.state = WizardState::Step(self.current_step);
		self.save_draft().await?;
		Ok(self.current_step)
	}

	/// Jumps straight to a step the user has already visited: any
	/// completed step, anything before the current step, or the step
	/// right after the furthest completed one.
	pub async fn jump(&mut self, step: u8) -> Result<u8> {
		if step < 1 || step > TOTAL_STEPS {
			return Err(Error::Validation(format!("No such step: {}", step)));
		}
		let frontier = self.completed.iter().max().copied().unwrap_or(0) + 1;
		if step > self.current_step && !self.completed.contains(&step) && step > frontier {
			return Err(Error::Validation(format!(
				"Step {} has not been reached yet",
				step
			)));
		}
		self.current_step = step;
		self.state = WizardState::Step(step);
		self.save_draft().await?;
		Ok(step)
	}

	/// The full submit: two-pass validation, then the atomic write.
	///
	/// On validation failure the field errors come back and the draft is
	/// untouched; on a gateway failure the draft also survives, so the
	/// user can retry without re-entering anything. Only a successful
	/// submit clears the draft.
	pub async fn submit(&mut self) -> std::result::Result<(), SubmitError> {
		self.state = WizardState::Submitting;
		if let Err(fields) = validate_for_submit(&self.record, &self.completed) {
			self.state = WizardState::Step(self.current_step);
			return Err(SubmitError::Invalid(fields));
		}
		match self.gateway.submit(&self.user_id, &self.record).await {
			Ok(()) => {
				// The data is committed; a leftover draft is only stale
				// cleanup, not a submit failure.
				if let Err(error) = self.drafts.clear(&self.user_id).await {
					tracing::warn!(user_id = %self.user_id, %error, "draft cleanup failed after submit");
				}
				self.state = WizardState::Complete;
				tracing::info!(user_id = %self.user_id, "onboarding complete");
				Ok(())
			}
			Err(e) => {
				self.state = WizardState::Error(e.to_string());
				Err(SubmitError::Failed(e))
			}
		}
	}

	async fn save_draft(&self) -> Result<()> {
		let draft = DraftSnapshot::new(self.record.clone(), self.current_step, self.completed.clone());
		self.drafts.save(&self.user_id, &draft).await
	}
}

/// Why a submit did not go through.
#[derive(Debug)]
pub enum SubmitError {
	/// Validation failed; per-field messages for the client.
	Invalid(Vec<FieldError>),
	/// The write itself failed; the draft is retained.
	Failed(Error),
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

	use medmatch_core::steps::{
		BasicInfo, LookingFor, MedicalBackground, SocialStyle, WeeklySlots,
	};

	use super::*;
	use crate::draft::InMemoryDraftStore;

	/// Gateway that records calls and can be told to fail.
	#[derive(Default)]
	struct FakeGateway {
		calls: AtomicUsize,
		fail: AtomicBool,
	}

	#[async_trait]
	impl SubmitGateway for Arc<FakeGateway> {
		async fn submit(&self, _user_id: &str, _record: &OnboardingRecord) -> Result<()> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			if self.fail.load(Ordering::SeqCst) {
				return Err(Error::Database("boom".to_string()));
			}
			Ok(())
		}
	}

	/// Draft store whose clear always fails.
	#[derive(Default)]
	struct LeakyDrafts {
		inner: InMemoryDraftStore,
	}

	#[async_trait]
	impl DraftStore for LeakyDrafts {
		async fn save(&self, user_id: &str, draft: &DraftSnapshot) -> Result<()> {
			self.inner.save(user_id, draft).await
		}

		async fn load(&self, user_id: &str) -> Result<Option<DraftSnapshot>> {
			self.inner.load(user_id).await
		}

		async fn clear(&self, _user_id: &str) -> Result<()> {
			Err(Error::Database("spool directory is read-only".to_string()))
		}
	}

	fn step1() -> OnboardingStep {
		OnboardingStep::Step1(BasicInfo {
			display_name: Some("Dr. Chen".to_string()),
			gender: "Female".to_string(),
			city: "Boston".to_string(),
			nationality: None,
			gender_preference: "Same gender".to_string(),
		})
	}

	fn step2() -> OnboardingStep {
		OnboardingStep::Step2(MedicalBackground {
			medical_specialties: vec!["Cardiology".to_string()],
			career_stage: "Fellow".to_string(),
			specialty_preference: "No preference".to_string(),
		})
	}

	fn step5() -> OnboardingStep {
		OnboardingStep::Step5(SocialStyle {
			meeting_activities: vec!["Coffee".to_string()],
			social_energy: "Balanced".to_string(),
			conversation_style: "Mix of both".to_string(),
		})
	}

	fn step6() -> OnboardingStep {
		OnboardingStep::Step6(WeeklySlots {
			meeting_times: vec!["weekday_evening".to_string()],
			frequency: "Monthly".to_string(),
		})
	}

	fn step7() -> OnboardingStep {
		OnboardingStep::Step7(LookingFor {
			looking_for: vec!["Friendship".to_string()],
			ideal_weekend: None,
		})
	}

	async fn completed_wizard(
		gateway: Arc<FakeGateway>,
		drafts: Arc<InMemoryDraftStore>,
	) -> OnboardingWizard<Arc<FakeGateway>, Arc<InMemoryDraftStore>> {
		let mut wizard = OnboardingWizard::new("u1", gateway, drafts);
		for step in [step1(), step2(), step5(), step6(), step7()] {
			wizard.record_step(step).await.unwrap();
		}
		wizard
	}

	#[tokio::test]
	async fn forward_is_gated_on_required_steps() {
		let drafts = Arc::new(InMemoryDraftStore::new());
		let mut wizard = OnboardingWizard::new("u1", Arc::new(FakeGateway::default()), drafts);
		// Step 1 is required and not yet filled in.
		assert!(wizard.next().await.is_err());
		wizard.record_step(step1()).await.unwrap();
		assert_eq!(wizard.next().await.unwrap(), 2);
		wizard.record_step(step2()).await.unwrap();
		assert_eq!(wizard.next().await.unwrap(), 3);
		// Step 3 is optional; skipping is allowed.
		assert_eq!(wizard.next().await.unwrap(), 4);
	}

	#[tokio::test]
	async fn backward_and_jump_rules() {
		let drafts = Arc::new(InMemoryDraftStore::new());
		let mut wizard = OnboardingWizard::new("u1", Arc::new(FakeGateway::default()), drafts);
		assert!(wizard.previous().await.is_err());
		wizard.record_step(step1()).await.unwrap();
		wizard.next().await.unwrap();
		assert_eq!(wizard.previous().await.unwrap(), 1);
		// Completed + the step right after the frontier are reachable.
		assert_eq!(wizard.jump(2).await.unwrap(), 2);
		assert!(wizard.jump(5).await.is_err());
		assert!(wizard.jump(9).await.is_err());
	}

	#[tokio::test]
	async fn record_step_rejects_invalid_payloads() {
		let drafts = Arc::new(InMemoryDraftStore::new());
		let mut wizard = OnboardingWizard::new("u1", Arc::new(FakeGateway::default()), drafts);
		let bad = OnboardingStep::Step2(MedicalBackground {
			medical_specialties: vec![],
			career_stage: "Fellow".to_string(),
			specialty_preference: "No preference".to_string(),
		});
		assert!(wizard.record_step(bad).await.is_err());
		assert!(wizard.completed_steps().is_empty());
	}

	#[tokio::test]
	async fn drafts_persist_and_resume() {
		let drafts = Arc::new(InMemoryDraftStore::new());
		let gateway = Arc::new(FakeGateway::default());
		let mut wizard = OnboardingWizard::new("u1", gateway.clone(), drafts.clone());
		wizard.record_step(step1()).await.unwrap();
		wizard.next().await.unwrap();

		let resumed = OnboardingWizard::resume("u1", gateway, drafts)
			.await
			.unwrap();
		assert_eq!(resumed.current_step(), 2);
		assert!(resumed.completed_steps().contains(&1));
		assert!(resumed.record().step1.is_some());
	}

	#[tokio::test]
	async fn submit_requires_all_required_steps() {
		let drafts = Arc::new(InMemoryDraftStore::new());
		let gateway = Arc::new(FakeGateway::default());
		let mut wizard = OnboardingWizard::new("u1", gateway.clone(), drafts);
		wizard.record_step(step1()).await.unwrap();
		match wizard.submit().await {
			Err(SubmitError::Invalid(fields)) => {
				assert!(fields.iter().any(|f| f.field == "step2"));
			}
			other => panic!("expected validation failure, got {:?}", other.is_ok()),
		}
		// The gateway was never reached.
		assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn successful_submit_clears_the_draft() {
		let drafts = Arc::new(InMemoryDraftStore::new());
		let gateway = Arc::new(FakeGateway::default());
		let mut wizard = completed_wizard(gateway.clone(), drafts.clone()).await;
		assert!(drafts.load("u1").await.unwrap().is_some());
		wizard.submit().await.unwrap();
		assert_eq!(*wizard.state(), WizardState::Complete);
		assert!(drafts.load("u1").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn submit_completes_even_when_draft_cleanup_fails() {
		let drafts = Arc::new(LeakyDrafts::default());
		let gateway = Arc::new(FakeGateway::default());
		let mut wizard = OnboardingWizard::new("u1", gateway.clone(), drafts.clone());
		for step in [step1(), step2(), step5(), step6(), step7()] {
			wizard.record_step(step).await.unwrap();
		}
		wizard.submit().await.unwrap();
		// The write went through; the stale draft is only a cleanup leak.
		assert_eq!(*wizard.state(), WizardState::Complete);
		assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
		assert!(drafts.load("u1").await.unwrap().is_some());
	}

	#[tokio::test]
	async fn failed_submit_keeps_the_draft() {
		let drafts = Arc::new(InMemoryDraftStore::new());
		let gateway = Arc::new(FakeGateway::default());
		gateway.fail.store(true, Ordering::SeqCst);
		let mut wizard = completed_wizard(gateway.clone(), drafts.clone()).await;
		assert!(wizard.submit().await.is_err());
		assert!(matches!(wizard.state(), WizardState::Error(_)));
		assert!(drafts.load("u1").await.unwrap().is_some());

		// Retry after the backend recovers.
		gateway.fail.store(false, Ordering::SeqCst);
		wizard.submit().await.unwrap();
		assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);
	}
}
