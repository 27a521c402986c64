//! migrate
//!
//! Database migration seam for the `update` command.
//!
//! # Design
//!
//! The migration engine is a black-box collaborator behind the
//! [`Migrator`] trait; the CLI validates inputs and delegates. All
//! validation happens before any side effect: the database URL must
//! parse as a postgres URL and every migration path must exist on
//! disk, otherwise the command fails with a typed error and nothing
//! has been touched.
//!
//! The production implementation drives sqlx's migrator over a
//! Postgres pool, applying each path's migrations in the order the
//! paths were given. The CLI never retries; retry policy lives in the
//! server.

use std::path::PathBuf;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use url::Url;

use crate::core::errors::{causes, Error};

/// Environment variable carrying the database URL.
pub const CAPE_DB_URL: &str = "CAPE_DB_URL";

/// Default migrations directory when no paths are given.
pub const DEFAULT_MIGRATIONS_PATH: &str = "migrations";

/// The migration engine capability.
#[async_trait]
pub trait Migrator: Send + Sync {
    /// Apply the migrations under each path, in path order.
    async fn migrate(&self, db_url: &str, paths: &[PathBuf]) -> Result<(), Error>;
}

/// Validate a database URL without connecting.
///
/// # Errors
///
/// Bad-request with cause `invalid_db_url` when the value is empty,
/// unparseable, or not a postgres URL.
pub fn validate_db_url(value: &str) -> Result<(), Error> {
    if value.is_empty() {
        return Err(Error::bad_request(
            causes::INVALID_DB_URL,
            "database url cannot be empty",
        ));
    }
    let url = Url::parse(value).map_err(|e| {
        Error::bad_request(causes::INVALID_DB_URL, format!("invalid database url: {}", e))
    })?;
    match url.scheme() {
        "postgres" | "postgresql" => Ok(()),
        other => Err(Error::bad_request(
            causes::INVALID_DB_URL,
            format!("unsupported database scheme '{}'", other),
        )),
    }
}

/// Check that every migration path exists and is a directory.
///
/// Called before any database connection is opened so a bad path has
/// no side effects.
pub fn validate_paths(paths: &[PathBuf]) -> Result<(), Error> {
    for path in paths {
        if !path.is_dir() {
            return Err(Error::bad_request(
                causes::INVALID_MIGRATIONS_PATH,
                format!("migrations path '{}' does not exist", path.display()),
            ));
        }
    }
    Ok(())
}

/// sqlx-backed migration engine.
#[derive(Debug, Default)]
pub struct SqlxMigrator;

#[async_trait]
impl Migrator for SqlxMigrator {
    async fn migrate(&self, db_url: &str, paths: &[PathBuf]) -> Result<(), Error> {
        validate_db_url(db_url)?;
        validate_paths(paths)?;

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(db_url)
            .await
            .map_err(|e| {
                Error::internal(
                    causes::NETWORK_FAILURE,
                    format!("failed to connect to database: {}", e),
                )
            })?;

        for path in paths {
            info!(path = %path.display(), "applying migrations");
            let migrator = sqlx::migrate::Migrator::new(path.as_path())
                .await
                .map_err(|e| {
                    Error::bad_request(
                        causes::INVALID_MIGRATIONS_PATH,
                        format!("failed to load migrations from '{}': {}", path.display(), e),
                    )
                })?;
            migrator.run(&pool).await.map_err(|e| {
                Error::internal(causes::COMMAND_FAILED, format!("migration failed: {}", e))
            })?;
        }
        Ok(())
    }
}

/// Recording mock migrator for command tests.
#[derive(Debug, Default)]
pub struct MockMigrator {
    calls: std::sync::Mutex<Vec<(String, Vec<PathBuf>)>>,
    fail_with: std::sync::Mutex<Option<Error>>,
}

impl MockMigrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the next call to fail.
    pub fn fail_with(&self, error: Error) {
        *self.fail_with.lock().unwrap() = Some(error);
    }

    /// Snapshot of recorded calls.
    pub fn calls(&self) -> Vec<(String, Vec<PathBuf>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Migrator for MockMigrator {
    async fn migrate(&self, db_url: &str, paths: &[PathBuf]) -> Result<(), Error> {
        validate_db_url(db_url)?;
        validate_paths(paths)?;
        self.calls
            .lock()
            .unwrap()
            .push((db_url.to_string(), paths.to_vec()));
        match self.fail_with.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
