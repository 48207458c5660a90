//! Server configuration from the environment.

use std::net::SocketAddr;

use medmatch_core::{Error, Result};

const DEFAULT_DATABASE_URL: &str = "sqlite:medmatch.db";

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
	pub addr: SocketAddr,
	pub database_url: String,
	pub max_connections: u32,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
			database_url: DEFAULT_DATABASE_URL.to_string(),
			max_connections: 5,
		}
	}
}

impl ServerConfig {
	/// Reads `MEDMATCH_ADDR`, `MEDMATCH_DATABASE_URL` and
	/// `MEDMATCH_MAX_CONNECTIONS`, falling back to the defaults for
	/// anything unset.
	pub fn from_env() -> Result<Self> {
		let mut config = Self::default();
		if let Ok(addr) = std::env::var("MEDMATCH_ADDR") {
			config.addr = addr
				.parse()
				.map_err(|_| Error::Validation(format!("invalid MEDMATCH_ADDR '{}'", addr)))?;
		}
		if let Ok(url) = std::env::var("MEDMATCH_DATABASE_URL") {
			config.database_url = url;
		}
		if let Ok(max) = std::env::var("MEDMATCH_MAX_CONNECTIONS") {
			config.max_connections = max.parse().map_err(|_| {
				Error::Validation(format!("invalid MEDMATCH_MAX_CONNECTIONS '{}'", max))
			})?;
		}
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_are_sane() {
		let config = ServerConfig::default();
		assert_eq!(config.addr.port(), 8000);
		assert_eq!(config.database_url, "sqlite:medmatch.db");
		assert_eq!(config.max_connections, 5);
	}
}
