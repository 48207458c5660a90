//! Core types for the medmatch application.
//!
//! This crate carries everything the other members agree on: the error
//! taxonomy, the eight-domain field codec that translates between
//! human-readable form values and normalized storage codes, and the
//! validated wire payloads for the onboarding wizard steps.

pub mod codec;
pub mod error;
pub mod mapper;
pub mod steps;
pub mod validation;

pub use codec::{Domain, decode, encode, slugify, unslugify};
pub use error::{Error, Result};
pub use steps::{
	BasicInfo, InterestCategory, Interests, LifestyleInfo, LookingFor, MedicalBackground,
	OnboardingRecord, OnboardingStep, PhysicalActivity, SocialStyle, SportInterest, WeeklySlots,
};
pub use validation::{FieldError, validate_for_submit};
