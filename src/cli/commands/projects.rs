//! cli::commands::projects
//!
//! Handlers for `projects {create, list}`.

use serde_json::json;

use crate::cli::commands::require_arg;
use crate::cli::provider::Provider;
use crate::client::requests::{CreateProject, ListProjects};
use crate::client::send;
use crate::core::errors::Error;
use crate::core::types::Label;
use crate::ui::Ui;

/// `cape projects create <label> [description]`
pub async fn create(
    provider: &Provider,
    label: Option<String>,
    description: Option<String>,
) -> Result<(), Error> {
    let label = Label::new(require_arg(label, "label")?)?;
    let transport = provider.transport()?;

    let project = send(
        transport.as_ref(),
        &CreateProject {
            label,
            description,
        },
    )
    .await?;

    provider.ui().template(
        "Created project {{label}}",
        &json!({ "label": project.label }),
    )
}

/// `cape projects list`
pub async fn list(provider: &Provider) -> Result<(), Error> {
    let transport = provider.transport()?;
    let projects = send(transport.as_ref(), &ListProjects).await?;

    let rows = projects
        .iter()
        .map(|p| {
            vec![
                p.label.clone(),
                p.description.clone().unwrap_or_default(),
            ]
        })
        .collect();
    provider
        .ui()
        .table(vec!["Label".to_string(), "Description".to_string()], rows);
    provider.ui().template(
        "Found {{count}} projects",
        &json!({ "count": projects.len() }),
    )
}
