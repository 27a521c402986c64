//! cli::commands
//!
//! One handler per user-facing verb. Handlers validate their inputs
//! first, then obtain the UI and transport through the provider, then
//! perform their exchanges and render output. Nothing here prints
//! directly; all output flows through the [`crate::ui::Ui`] port.

pub mod clusters;
pub mod projects;
pub mod roles;
pub mod session;
pub mod tokens;
pub mod update;
pub mod users;

use super::args::{
    ClustersCommand, Command, ConfigCommand, ProjectsCommand, RolesCommand, TokensCommand,
    UsersCommand,
};
use super::provider::Provider;
use crate::core::errors::Error;

/// Dispatch a parsed command to its handler.
pub async fn dispatch(command: Command, provider: &mut Provider) -> Result<(), Error> {
    match command {
        Command::Config { command } => match command {
            ConfigCommand::View => clusters::view(provider),
            ConfigCommand::Clusters { command } => match command {
                ClustersCommand::Add {
                    label,
                    url,
                    use_cluster,
                } => clusters::add(provider, label, url, use_cluster),
                ClustersCommand::Remove { label, yes } => clusters::remove(provider, label, yes),
                ClustersCommand::Use { label } => clusters::use_cluster(provider, label),
            },
        },
        Command::Users { command } => match command {
            UsersCommand::Create { email } => users::create(provider, email).await,
        },
        Command::Roles { command } => match command {
            RolesCommand::Me { project } => roles::me(provider, project).await,
            RolesCommand::Set {
                email,
                role,
                project,
            } => roles::set(provider, email, role, project).await,
        },
        Command::Tokens { command } => match command {
            TokensCommand::Create => tokens::create(provider).await,
            TokensCommand::List => tokens::list(provider).await,
            TokensCommand::Remove { id } => tokens::remove(provider, id).await,
        },
        Command::Projects { command } => match command {
            ProjectsCommand::Create { label, description } => {
                projects::create(provider, label, description).await
            }
            ProjectsCommand::List => projects::list(provider).await,
        },
        Command::Login { email } => session::login(provider, email).await,
        Command::Logout => session::logout(provider),
        Command::Update { paths } => update::run(provider, paths).await,
    }
}

/// Presence check for an optional positional, yielding the typed
/// `missing_argument` error naming the argument.
pub(crate) fn require_arg(value: Option<String>, name: &str) -> Result<String, Error> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::missing_argument(name)),
    }
}
