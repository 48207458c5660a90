//! Application-wide error taxonomy.
//!
//! Every member crate converges on this enum so HTTP handlers can map a
//! failure onto a status code in one place: validation to 400,
//! authentication to 401, authorization to 403, not-found to 404 and
//! storage failures to 500.

use thiserror::Error;

/// Application error type
#[derive(Debug, Error)]
pub enum Error {
	/// Payload failed schema or business validation
	#[error("Validation error: {0}")]
	Validation(String),

	/// Missing or expired session
	#[error("Authentication required: {0}")]
	Authentication(String),

	/// Authenticated identity lacks the required role
	#[error("Access denied: {0}")]
	Authorization(String),

	/// Requested row does not exist
	#[error("Not found: {0}")]
	NotFound(String),

	/// Storage layer failure
	#[error("Database error: {0}")]
	Database(String),

	/// Malformed request at the HTTP layer
	#[error("Bad request: {0}")]
	Http(String),

	/// Anything that does not fit the taxonomy
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

/// Result type for medmatch operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
	/// Shorthand for a database error wrapping another error's message.
	///
	/// # Examples
	///
	/// ```
	/// use medmatch_core::Error;
	///
	/// let err = Error::database("profiles", "connection reset");
	/// assert_eq!(err.to_string(), "Database error: profiles: connection reset");
	/// ```
	pub fn database(collection: &str, cause: impl std::fmt::Display) -> Self {
		Error::Database(format!("{}: {}", collection, cause))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display_includes_taxonomy_prefix() {
		assert_eq!(
			Error::Validation("bad".into()).to_string(),
			"Validation error: bad"
		);
		assert_eq!(
			Error::Authorization("not an admin".into()).to_string(),
			"Access denied: not an admin"
		);
	}

	#[test]
	fn database_helper_names_the_collection() {
		let err = Error::database("user_interests", "disk full");
		assert!(err.to_string().contains("user_interests"));
	}
}
