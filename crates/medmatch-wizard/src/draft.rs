//! Draft persistence.
//!
//! A draft is the wizard's whole working state: the partially-filled
//! record, the step the user is on, and which steps they have completed.
//! Saving after every step is what makes onboarding resumable across
//! sessions.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use medmatch_core::steps::OnboardingRecord;
use medmatch_core::{Error, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// A saved wizard state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
	pub data: OnboardingRecord,
	pub current_step: u8,
	pub completed_steps: BTreeSet<u8>,
	/// RFC 3339; when the draft was last written.
	pub timestamp: String,
}

impl DraftSnapshot {
	pub fn new(data: OnboardingRecord, current_step: u8, completed_steps: BTreeSet<u8>) -> Self {
		Self {
			data,
			current_step,
			completed_steps,
			timestamp: chrono::Utc::now().to_rfc3339(),
		}
	}
}

/// Where drafts live.
///
/// One snapshot per user; `save` overwrites, `clear` is idempotent.
#[async_trait]
pub trait DraftStore: Send + Sync {
	async fn save(&self, user_id: &str, draft: &DraftSnapshot) -> Result<()>;
	async fn load(&self, user_id: &str) -> Result<Option<DraftSnapshot>>;
	async fn clear(&self, user_id: &str) -> Result<()>;
}

#[async_trait]
impl<S: DraftStore + ?Sized> DraftStore for Arc<S> {
	async fn save(&self, user_id: &str, draft: &DraftSnapshot) -> Result<()> {
		(**self).save(user_id, draft).await
	}

	async fn load(&self, user_id: &str) -> Result<Option<DraftSnapshot>> {
		(**self).load(user_id).await
	}

	async fn clear(&self, user_id: &str) -> Result<()> {
		(**self).clear(user_id).await
	}
}

/// Process-local draft store. The server default; drafts do not survive
/// a restart, which matches the disposable nature of a draft.
#[derive(Default)]
pub struct InMemoryDraftStore {
	drafts: RwLock<HashMap<String, DraftSnapshot>>,
}

impl InMemoryDraftStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl DraftStore for InMemoryDraftStore {
	async fn save(&self, user_id: &str, draft: &DraftSnapshot) -> Result<()> {
		self.drafts
			.write()
			.insert(user_id.to_string(), draft.clone());
		Ok(())
	}

	async fn load(&self, user_id: &str) -> Result<Option<DraftSnapshot>> {
		Ok(self.drafts.read().get(user_id).cloned())
	}

	async fn clear(&self, user_id: &str) -> Result<()> {
		self.drafts.write().remove(user_id);
		Ok(())
	}
}

/// Draft store backed by one JSON file per user under a spool directory.
pub struct FileDraftStore {
	dir: PathBuf,
}

impl FileDraftStore {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	fn path_for(&self, user_id: &str) -> Result<PathBuf> {
		// User ids are UUIDs; anything that could escape the spool
		// directory is rejected outright.
		if user_id.is_empty()
			|| !user_id
				.chars()
				.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
		{
			return Err(Error::Validation(format!("invalid user id '{}'", user_id)));
		}
		Ok(self.dir.join(format!("{}.json", user_id)))
	}
}

#[async_trait]
impl DraftStore for FileDraftStore {
	async fn save(&self, user_id: &str, draft: &DraftSnapshot) -> Result<()> {
		let path = self.path_for(user_id)?;
		tokio::fs::create_dir_all(&self.dir)
			.await
			.map_err(|e| Error::Other(e.into()))?;
		let json = serde_json::to_vec_pretty(draft).map_err(|e| Error::Other(e.into()))?;
		tokio::fs::write(&path, json)
			.await
			.map_err(|e| Error::Other(e.into()))?;
		tracing::debug!(user_id, path = %path.display(), "draft saved");
		Ok(())
	}

	async fn load(&self, user_id: &str) -> Result<Option<DraftSnapshot>> {
		let path = self.path_for(user_id)?;
		let raw = match tokio::fs::read(&path).await {
			Ok(raw) => raw,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
			Err(e) => return Err(Error::Other(e.into())),
		};
		let draft = serde_json::from_slice(&raw).map_err(|e| Error::Other(e.into()))?;
		Ok(Some(draft))
	}

	async fn clear(&self, user_id: &str) -> Result<()> {
		let path = self.path_for(user_id)?;
		match tokio::fs::remove_file(&path).await {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(Error::Other(e.into())),
		}
	}
}
