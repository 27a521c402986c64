//! cli::commands::roles
//!
//! Handlers for `roles me` and `roles set`.
//!
//! Role labels are validated against the static system role sets
//! before any network call; `--project` routes to the project-scoped
//! variants.

use serde_json::json;

use crate::cli::commands::require_arg;
use crate::cli::provider::Provider;
use crate::client::requests::{MyProjectRole, MyRole, SetOrgRole, SetProjectRole};
use crate::client::send;
use crate::core::errors::Error;
use crate::core::types::{Email, Label, OrgRole, ProjectRole};
use crate::ui::Ui;

/// `cape roles me [--project <label>]`
pub async fn me(provider: &Provider, project: Option<String>) -> Result<(), Error> {
    let project = project.map(Label::new).transpose()?;
    let transport = provider.transport()?;

    let role = match &project {
        Some(project) => {
            send(
                transport.as_ref(),
                &MyProjectRole {
                    project: project.clone(),
                },
            )
            .await?
        }
        None => send(transport.as_ref(), &MyRole).await?,
    };

    match project {
        Some(project) => provider.ui().template(
            "You have the {{role}} role in {{project}}",
            &json!({ "role": role.label, "project": project.as_str() }),
        ),
        None => provider.ui().template(
            "You have the {{role}} role",
            &json!({ "role": role.label }),
        ),
    }
}

/// `cape roles set <email> <role> [--project <label>]`
pub async fn set(
    provider: &Provider,
    email: Option<String>,
    role: Option<String>,
    project: Option<String>,
) -> Result<(), Error> {
    // Presence first so a short invocation fails with missing_argument
    // before any value parsing or network activity.
    let email_raw = require_arg(email, "email")?;
    let role_raw = require_arg(role, "role")?;

    let email = Email::new(email_raw)?;
    let project = project.map(Label::new).transpose()?;

    match project {
        Some(project) => {
            let role: ProjectRole = role_raw.parse()?;
            let transport = provider.transport()?;
            send(
                transport.as_ref(),
                &SetProjectRole {
                    email: email.clone(),
                    role,
                    project: project.clone(),
                },
            )
            .await?;
            provider.ui().template(
                "Role for {{email}} in {{project}} is now {{role}}",
                &json!({
                    "email": email.as_str(),
                    "project": project.as_str(),
                    "role": role.label(),
                }),
            )
        }
        None => {
            let role: OrgRole = role_raw.parse()?;
            let transport = provider.transport()?;
            send(
                transport.as_ref(),
                &SetOrgRole {
                    email: email.clone(),
                    role,
                },
            )
            .await?;
            provider.ui().template(
                "Role for {{email}} is now {{role}}",
                &json!({ "email": email.as_str(), "role": role.label() }),
            )
        }
    }
}
