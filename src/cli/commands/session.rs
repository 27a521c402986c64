//! cli::commands::session
//!
//! Handlers for `login` and `logout`.
//!
//! A successful login stores the session token on the target cluster's
//! config record; logout clears it. `CAPE_PASSWORD` substitutes for
//! the interactive secret prompt so scripted logins never touch a tty.

use serde_json::json;

use crate::cli::provider::Provider;
use crate::client::requests::CreateSession;
use crate::client::send;
use crate::core::errors::Error;
use crate::core::types::{AuthToken, Email, Password};
use crate::ui::{NotifyKind, Ui};

/// Environment variable substituting for the password prompt.
pub const CAPE_PASSWORD: &str = "CAPE_PASSWORD";

/// `cape login [email]`
pub async fn login(provider: &mut Provider, email: Option<String>) -> Result<(), Error> {
    // Resolve the target up front so login without a cluster fails
    // before any prompting.
    let label = provider.current_cluster()?.label.clone();

    let email = match email {
        Some(value) => Email::new(value)?,
        None => Email::new(provider.ui().question("Email", &Email::validate)?)?,
    };
    let password = match std::env::var(CAPE_PASSWORD) {
        Ok(value) if !value.is_empty() => Password::new(value)?,
        _ => Password::new(provider.ui().secret("Password", &Password::validate)?)?,
    };

    let transport = provider.transport()?;
    let session = send(transport.as_ref(), &CreateSession { email, password }).await?;

    provider
        .config_mut()
        .get_cluster_mut(&label)?
        .auth_token = AuthToken::new(session.token);
    provider.save()?;

    provider.ui().template(
        "Logged in to {{label}} as user {{user}}",
        &json!({ "label": label.as_str(), "user": session.user_id }),
    )
}

/// `cape logout`
pub fn logout(provider: &mut Provider) -> Result<(), Error> {
    let label = provider.current_cluster()?.label.clone();

    provider
        .config_mut()
        .get_cluster_mut(&label)?
        .auth_token = AuthToken::empty();
    provider.save()?;

    provider
        .ui()
        .notify(NotifyKind::Info, &format!("Logged out of {}", label));
    Ok(())
}
