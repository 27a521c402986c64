//! cli::commands::users
//!
//! Handler for `users create`.
//!
//! The coordinator generates the new user's credentials; they are
//! rendered exactly once, behind a remember notification, and never
//! persisted locally.

use crate::cli::commands::require_arg;
use crate::cli::provider::Provider;
use crate::client::requests::CreateUser;
use crate::client::send;
use crate::core::errors::{causes, Error};
use crate::core::types::Email;
use crate::ui::{NotifyKind, Ui};

fn non_empty(value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        Err(Error::bad_request(
            causes::MISSING_ARGUMENT,
            "a name is required",
        ))
    } else {
        Ok(())
    }
}

/// `cape users create <email>`
pub async fn create(provider: &mut Provider, email: Option<String>) -> Result<(), Error> {
    let email = Email::new(require_arg(email, "email")?)?;
    let transport = provider.transport()?;

    let name = provider.ui().question("Name", &non_empty)?;
    let created = send(
        transport.as_ref(),
        &CreateUser {
            email,
            name,
        },
    )
    .await?;

    provider.ui().notify(
        NotifyKind::Remember,
        "Save the following credentials; they will not be shown again.",
    );
    provider.ui().details(vec![
        ("Email".to_string(), created.email),
        ("Password".to_string(), created.password),
    ]);
    Ok(())
}
