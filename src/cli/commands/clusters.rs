//! cli::commands::clusters
//!
//! Handlers for `config view` and `config clusters {add, remove, use}`.
//!
//! These are the only handlers that mutate the persisted config
//! directly; every mutation is followed by a save so the file on disk
//! always reflects the last acknowledged operation.

use serde_json::json;

use crate::cli::commands::require_arg;
use crate::cli::provider::Provider;
use crate::core::errors::Error;
use crate::core::types::{ClusterUrl, Label};
use crate::ui::{NotifyKind, Ui};

/// Hint shown whenever an operation leaves no current cluster.
const NO_CLUSTER_HINT: &str =
    "No current cluster set; run 'cape config clusters use <label>' to select one.";

/// `cape config view`
pub fn view(provider: &Provider) -> Result<(), Error> {
    let rendered = provider.config().render()?;
    provider.ui().notify(NotifyKind::Info, &rendered);
    Ok(())
}

/// `cape config clusters add <label> <url> [--use]`
pub fn add(
    provider: &mut Provider,
    label: Option<String>,
    url: Option<String>,
    use_cluster: bool,
) -> Result<(), Error> {
    let label = Label::new(require_arg(label, "label")?)?;
    let url = ClusterUrl::new(&require_arg(url, "url")?)?;

    provider.config_mut().add_cluster(label.clone(), url.clone())?;
    if use_cluster {
        provider.config_mut().use_cluster(Some(label.clone()))?;
    }
    provider.save()?;

    provider.ui().template(
        "Added cluster {{label}} at {{url}}",
        &json!({ "label": label.as_str(), "url": url.as_str() }),
    )?;
    if use_cluster {
        provider.ui().template(
            "Your current cluster has been set to {{label}}",
            &json!({ "label": label.as_str() }),
        )?;
    }
    Ok(())
}

/// `cape config clusters remove <label> [-y]`
pub fn remove(provider: &mut Provider, label: Option<String>, yes: bool) -> Result<(), Error> {
    let label = Label::new(require_arg(label, "label")?)?;

    // Resolve before confirming so unknown labels fail without a prompt.
    provider.config().get_cluster(&label)?;

    if !yes {
        let confirmed = provider
            .ui()
            .confirm(&format!("Remove cluster '{}'?", label))?;
        if !confirmed {
            provider.ui().notify(NotifyKind::Info, "Aborted.");
            return Ok(());
        }
    }

    provider.config_mut().remove_cluster(&label)?;
    provider.save()?;

    provider.ui().template(
        "Removed cluster {{label}}",
        &json!({ "label": label.as_str() }),
    )?;
    if provider.config().context.cluster.is_none() {
        provider.ui().notify(NotifyKind::Info, NO_CLUSTER_HINT);
    }
    Ok(())
}

/// `cape config clusters use <label>`
pub fn use_cluster(provider: &mut Provider, label: Option<String>) -> Result<(), Error> {
    let label = Label::new(require_arg(label, "label")?)?;

    provider.config_mut().use_cluster(Some(label.clone()))?;
    provider.save()?;

    provider.ui().template(
        "Your current cluster has been set to {{label}}",
        &json!({ "label": label.as_str() }),
    )?;
    Ok(())
}
