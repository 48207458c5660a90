//! Limit/offset pagination for the admin listings.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_LIMIT: u64 = 100;

/// A window into a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitOffset {
	pub limit: u64,
	pub offset: u64,
}

impl Default for LimitOffset {
	fn default() -> Self {
		Self {
			limit: DEFAULT_LIMIT,
			offset: 0,
		}
	}
}

impl LimitOffset {
	/// Builds a window from raw query-string values, clamping the limit
	/// to [1, [`MAX_LIMIT`]] and treating garbage as the defaults.
	pub fn from_params(limit: Option<&str>, offset: Option<&str>) -> Self {
		let limit = limit
			.and_then(|v| v.parse::<u64>().ok())
			.unwrap_or(DEFAULT_LIMIT)
			.clamp(1, MAX_LIMIT);
		let offset = offset.and_then(|v| v.parse::<u64>().ok()).unwrap_or(0);
		Self { limit, offset }
	}
}

/// The standard list envelope: total count plus links to the adjacent
/// windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
	pub count: usize,
	pub next: Option<String>,
	pub previous: Option<String>,
	pub results: Vec<T>,
}

impl<T> PaginatedResponse<T> {
	/// Wraps one window of results, deriving the `next`/`previous` links
	/// from the window's position in the total.
	pub fn new(path: &str, window: LimitOffset, total: usize, results: Vec<T>) -> Self {
		let next = if window.offset + window.limit < total as u64 {
			Some(format!(
				"{}?limit={}&offset={}",
				path,
				window.limit,
				window.offset + window.limit
			))
		} else {
			None
		};
		let previous = if window.offset > 0 {
			Some(format!(
				"{}?limit={}&offset={}",
				path,
				window.limit,
				window.offset.saturating_sub(window.limit)
			))
		} else {
			None
		};
		Self {
			count: total,
			next,
			previous,
			results,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn params_are_clamped() {
		let window = LimitOffset::from_params(Some("500"), Some("40"));
		assert_eq!(window.limit, MAX_LIMIT);
		assert_eq!(window.offset, 40);
		let window = LimitOffset::from_params(Some("junk"), None);
		assert_eq!(window, LimitOffset::default());
		assert_eq!(LimitOffset::from_params(Some("0"), None).limit, 1);
	}

	#[test]
	fn links_reflect_position() {
		let window = LimitOffset { limit: 10, offset: 10 };
		let page = PaginatedResponse::new("/admin/users", window, 25, vec![1, 2, 3]);
		assert_eq!(page.count, 25);
		assert_eq!(page.next.as_deref(), Some("/admin/users?limit=10&offset=20"));
		assert_eq!(
			page.previous.as_deref(),
			Some("/admin/users?limit=10&offset=0")
		);

		let last = PaginatedResponse::new(
			"/admin/users",
			LimitOffset { limit: 10, offset: 20 },
			25,
			vec![1],
		);
		assert!(last.next.is_none());

		let first = PaginatedResponse::new("/admin/users", LimitOffset::default(), 5, vec![1]);
		assert!(first.previous.is_none());
		assert!(first.next.is_none());
	}
}
