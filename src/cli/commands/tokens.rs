//! cli::commands::tokens
//!
//! Handlers for `tokens {create, list, remove}`.
//!
//! Token secrets exist client-side only in the create response; they
//! are rendered once and dropped.

use serde_json::json;

use crate::cli::commands::require_arg;
use crate::cli::provider::Provider;
use crate::client::requests::{CreateToken, ListTokens, RemoveToken};
use crate::client::send;
use crate::core::errors::Error;
use crate::ui::{NotifyKind, Ui};

/// `cape tokens create`
pub async fn create(provider: &Provider) -> Result<(), Error> {
    let transport = provider.transport()?;
    let created = send(transport.as_ref(), &CreateToken).await?;

    provider.ui().notify(
        NotifyKind::Remember,
        "Save this token secret; it will not be shown again.",
    );
    provider.ui().details(vec![
        ("Token ID".to_string(), created.id),
        ("Secret".to_string(), created.secret),
    ]);
    Ok(())
}

/// `cape tokens list`
pub async fn list(provider: &Provider) -> Result<(), Error> {
    let transport = provider.transport()?;
    let ids = send(transport.as_ref(), &ListTokens).await?;

    let rows = ids.iter().map(|id| vec![id.clone()]).collect();
    provider.ui().table(vec!["Token ID".to_string()], rows);
    provider.ui().template(
        "Found {{count}} tokens",
        &json!({ "count": ids.len() }),
    )
}

/// `cape tokens remove <id>`
pub async fn remove(provider: &Provider, id: Option<String>) -> Result<(), Error> {
    let id = require_arg(id, "id")?;
    let transport = provider.transport()?;

    send(transport.as_ref(), &RemoveToken { id: id.clone() }).await?;
    provider
        .ui()
        .template("Removed token {{id}}", &json!({ "id": id }))
}
