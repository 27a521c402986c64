//! cli::commands::update
//!
//! Handler for `update`: apply database migrations against the
//! cluster's coordinator database.
//!
//! The database URL is never a positional; it comes from the
//! `CAPE_DB_URL` environment variable so it stays out of shell
//! history. All inputs are validated before the migrator is invoked.

use std::path::PathBuf;

use serde_json::json;

use crate::cli::provider::Provider;
use crate::core::errors::Error;
use crate::migrate::{
    validate_db_url, validate_paths, Migrator, CAPE_DB_URL, DEFAULT_MIGRATIONS_PATH,
};
use crate::ui::Ui;

/// `cape update [paths...]`
pub async fn run(provider: &Provider, paths: Vec<PathBuf>) -> Result<(), Error> {
    let db_url = match std::env::var(CAPE_DB_URL) {
        Ok(value) if !value.is_empty() => value,
        _ => return Err(Error::missing_env_var(CAPE_DB_URL)),
    };
    validate_db_url(&db_url)?;

    let paths = if paths.is_empty() {
        vec![PathBuf::from(DEFAULT_MIGRATIONS_PATH)]
    } else {
        paths
    };
    validate_paths(&paths)?;

    provider.migrator().migrate(&db_url, &paths).await?;

    provider.ui().template(
        "Applied migrations from {{count}} paths",
        &json!({ "count": paths.len() }),
    )
}
