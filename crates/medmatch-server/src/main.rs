use std::time::Duration;

use medmatch_db::MatchStore;
use medmatch_server::{AppRouter, HttpServer, ServerConfig, ShutdownCoordinator, shutdown_signal};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.init();

	let config = ServerConfig::from_env()?;
	let store = MatchStore::connect_with(&config.database_url, config.max_connections).await?;
	store.create_schema().await?;

	let handler = AppRouter::handler(store);
	let server = HttpServer::new(handler);
	let coordinator = ShutdownCoordinator::new(Duration::from_secs(30));

	tokio::select! {
		result = server.listen_with_shutdown(config.addr, coordinator.clone()) => {
			result?;
		}
		_ = shutdown_signal() => {
			coordinator.shutdown();
			coordinator.wait_for_shutdown().await;
		}
	}

	Ok(())
}
