//! cli
//!
//! Command-line surface and invocation wiring.
//!
//! # Design
//!
//! `run` owns the whole lifecycle of one invocation: parse arguments,
//! assemble the production [`provider::Provider`], dispatch to the
//! handler, and map the outcome to an exit code. Errors never escape
//! as panics; every failure path renders a single error notification
//! and returns a non-zero code.
//!
//! Unknown commands exit 1 with a short message rather than clap's
//! usage dump; help and version requests exit 0.

pub mod args;
pub mod commands;
pub mod provider;

use std::sync::Arc;

use clap::error::ErrorKind;
use tracing::debug;

use crate::client::http::HttpTransportFactory;
use crate::core::errors::Error;
use crate::core::types::Label;
use crate::migrate::SqlxMigrator;
use crate::ui::{NotifyKind, TerminalUi, Ui};

use args::Cli;
use provider::Provider;

/// Run one CLI invocation and return the process exit code.
pub async fn run() -> i32 {
    let ui = Arc::new(TerminalUi::new());

    let cli = match Cli::try_parse_args() {
        Ok(cli) => cli,
        Err(err) => return render_parse_error(ui.as_ref(), err),
    };

    match execute(cli, ui.clone()).await {
        Ok(()) => 0,
        Err(err) => {
            debug!(cause = err.cause().tag(), "command failed");
            ui.notify(NotifyKind::Error, &err.to_string());
            1
        }
    }
}

async fn execute(cli: Cli, ui: Arc<dyn Ui>) -> Result<(), Error> {
    let cluster_override = cli.cluster.map(Label::new).transpose()?;

    let mut provider = Provider::from_env(
        ui,
        Arc::new(HttpTransportFactory),
        Arc::new(SqlxMigrator),
    )?
    .with_cluster_override(cluster_override);

    commands::dispatch(cli.command, &mut provider).await
}

/// Map a clap parse outcome to output and an exit code.
///
/// Help and version are successful outcomes. Unknown commands get a
/// one-line error instead of a usage dump.
fn render_parse_error(ui: &dyn Ui, err: clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{}", err);
            0
        }
        ErrorKind::InvalidSubcommand | ErrorKind::UnknownArgument => {
            ui.notify(
                NotifyKind::Error,
                "no such command; run 'cape --help' for usage",
            );
            1
        }
        _ => {
            ui.notify(NotifyKind::Error, &err.to_string());
            1
        }
    }
}
