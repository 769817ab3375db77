use diesel::{
    SqliteConnection,
    r2d2::{self, ConnectionManager},
};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = r2d2::PooledConnection<ConnectionManager<SqliteConnection>>;

#[derive(Debug)]
pub enum DatabaseError {
    ConnectionError(String),
    PoolError(String),
    ConfigurationError(String),
}

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/");

impl std::fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseError::ConnectionError(msg) => write!(f, "Connection error: {}", msg),
            DatabaseError::PoolError(msg) => write!(f, "Pool error: {}", msg),
            DatabaseError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for DatabaseError {}

/// Open a pool over the embedded SQLite store.
///
/// Serving requires the store to exist already; only the offline batch
/// entry points pass `create_if_missing` so a first run can seed the file.
pub fn create_connection_pool(
    database_path: &str,
    create_if_missing: bool,
) -> Result<DbPool, DatabaseError> {
    if !create_if_missing
        && database_path != ":memory:"
        && !std::path::Path::new(database_path).exists()
    {
        return Err(DatabaseError::ConfigurationError(format!(
            "Database file not found: {}",
            database_path
        )));
    }

    let manager = ConnectionManager::<SqliteConnection>::new(database_path);

    r2d2::Pool::builder()
        .max_size(10)
        .min_idle(Some(1))
        .build(manager)
        .map_err(|e| DatabaseError::PoolError(e.to_string()))
}

pub fn get_connection_from_pool(pool: &DbPool) -> Result<DbConnection, DatabaseError> {
    pool.get().map_err(|e| DatabaseError::PoolError(e.to_string()))
}

pub fn run_migrations(conn: &mut SqliteConnection) -> Result<(), DatabaseError> {
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;
    Ok(())
}

/// Single-connection in-memory pool with migrations applied, for tests.
/// SQLite gives every `:memory:` connection its own database, so the pool
/// is capped at one connection.
#[cfg(test)]
pub fn create_test_pool() -> DbPool {
    let manager = ConnectionManager::<SqliteConnection>::new(":memory:");
    let pool = r2d2::Pool::builder()
        .max_size(1)
        .build(manager)
        .expect("in-memory pool must build");
    let mut conn = pool.get().expect("in-memory connection must be available");
    run_migrations(&mut conn).expect("migrations must run on in-memory database");
    pool
}
