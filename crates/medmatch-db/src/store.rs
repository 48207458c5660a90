//! The shared store handle and its low-level query helpers.

use medmatch_core::{Error, Result};
use sqlx::any::{AnyPoolOptions, AnyQueryResult, AnyRow};
use sqlx::{Any, AnyPool, Transaction};

/// Shorthand for a transaction over the `Any` driver.
pub(crate) type Tx<'a> = Transaction<'a, Any>;

/// Handle to the medmatch database.
///
/// Cheap to clone; all repositories hang off this type as `impl` blocks
/// in their own modules.
///
/// # Examples
///
/// ```rust,no_run
/// use medmatch_db::MatchStore;
///
/// # async fn example() -> medmatch_core::Result<()> {
/// let store = MatchStore::connect("sqlite::memory:").await?;
/// store.create_schema().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MatchStore {
	pub(crate) pool: AnyPool,
}

impl MatchStore {
	/// Connects to the given database URL.
	///
	/// Supports `postgres://...` and `sqlite:...` URLs through sqlx's
	/// `Any` driver.
	pub async fn connect(database_url: &str) -> Result<Self> {
		Self::connect_with(database_url, 5).await
	}

	/// Connects with an explicit pool size.
	///
	/// Tests against `sqlite::memory:` must use a pool size of 1 (see
	/// [`MatchStore::in_memory`]): every new SQLite connection to
	/// `:memory:` opens a fresh, empty database.
	pub async fn connect_with(database_url: &str, max_connections: u32) -> Result<Self> {
		sqlx::any::install_default_drivers();
		let pool = AnyPoolOptions::new()
			.max_connections(max_connections)
			.min_connections(1)
			.connect(database_url)
			.await
			.map_err(|e| Error::Database(format!("connection failed: {}", e)))?;
		Ok(Self { pool })
	}

	/// Opens a single-connection in-memory SQLite store with the schema
	/// already created. Intended for tests and the seed tool's dry runs.
	pub async fn in_memory() -> Result<Self> {
		let store = Self::connect_with("sqlite::memory:", 1).await?;
		store.create_schema().await?;
		Ok(store)
	}

	/// Begins a transaction.
	pub(crate) async fn begin(&self) -> Result<Tx<'static>> {
		self.pool
			.begin()
			.await
			.map_err(|e| Error::Database(format!("failed to begin transaction: {}", e)))
	}

	/// Executes a statement on the pool, naming the collection on failure.
	pub(crate) async fn exec(&self, sql: &str, collection: &str) -> Result<AnyQueryResult> {
		sqlx::query(sql)
			.execute(&self.pool)
			.await
			.map_err(|e| Error::database(collection, e))
	}

	/// Fetches at most one row from the pool.
	pub(crate) async fn fetch_optional(&self, sql: &str, collection: &str) -> Result<Option<AnyRow>> {
		sqlx::query(sql)
			.fetch_optional(&self.pool)
			.await
			.map_err(|e| Error::database(collection, e))
	}

	/// Fetches all rows from the pool.
	pub(crate) async fn fetch_all(&self, sql: &str, collection: &str) -> Result<Vec<AnyRow>> {
		sqlx::query(sql)
			.fetch_all(&self.pool)
			.await
			.map_err(|e| Error::database(collection, e))
	}
}

/// Executes a statement inside a transaction, naming the collection on
/// failure.
pub(crate) async fn exec_tx(tx: &mut Tx<'_>, sql: &str, collection: &str) -> Result<AnyQueryResult> {
	sqlx::query(sql)
		.execute(&mut **tx)
		.await
		.map_err(|e| Error::database(collection, e))
}

/// Fetches at most one row inside a transaction.
pub(crate) async fn fetch_optional_tx(
	tx: &mut Tx<'_>,
	sql: &str,
	collection: &str,
) -> Result<Option<AnyRow>> {
	sqlx::query(sql)
		.fetch_optional(&mut **tx)
		.await
		.map_err(|e| Error::database(collection, e))
}

/// Commits a transaction.
pub(crate) async fn commit(tx: Tx<'_>) -> Result<()> {
	tx.commit()
		.await
		.map_err(|e| Error::Database(format!("commit failed: {}", e)))
}

/// Current timestamp in the RFC 3339 form used for every timestamp column.
pub(crate) fn now_rfc3339() -> String {
	chrono::Utc::now().to_rfc3339()
}
