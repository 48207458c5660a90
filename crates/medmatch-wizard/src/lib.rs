//! The eight-step onboarding wizard.
//!
//! [`OnboardingWizard`] drives a single user's onboarding session:
//! step-by-step input with per-step validation, gated navigation, a
//! draft written after every interaction so the session survives a
//! disconnect, and the final two-pass submit that hands a complete
//! record to the store in one transaction.
//!
//! Draft persistence is pluggable through [`DraftStore`]; the crate
//! ships a process-local [`InMemoryDraftStore`] and a JSON-file-backed
//! [`FileDraftStore`].

mod draft;
mod wizard;

pub use draft::{DraftSnapshot, DraftStore, FileDraftStore, InMemoryDraftStore};
pub use wizard::{
	OPTIONAL_STEPS, OnboardingWizard, SubmitError, SubmitGateway, TOTAL_STEPS, WizardState,
};
