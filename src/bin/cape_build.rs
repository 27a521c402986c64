//! Entry point for the `cape-build` binary: the build harness driver.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cape::core::errors::Error;
use cape::harness::{registry::Registry, targets, Tracker};

/// Build automation for the Cape repository
#[derive(Parser, Debug)]
#[command(name = "cape-build")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify every required tool is present
    Check,

    /// Prepare every required tool
    Setup,

    /// Remove build state and reverse every tracked artifact
    Clean,

    /// Build the release binary
    Build,

    /// Run all code generators
    Generate,

    /// Build container images
    Containers,

    /// Manage the local development cluster
    Cluster {
        #[command(subcommand)]
        command: ClusterCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ClusterCommand {
    /// Create the local development cluster
    Create,
    /// Destroy the local development cluster
    Destroy,
}

const ALL_DEPS: &[&str] = &["rust", "docker", "graphql-codegen"];

async fn run(command: Command) -> Result<(), Error> {
    let registry = Registry::with_defaults()?;
    let tracker = Arc::new(Tracker::new());

    match command {
        Command::Check => targets::check(&registry, ALL_DEPS).await,
        Command::Setup => targets::setup(&registry, ALL_DEPS).await,
        Command::Clean => targets::clean(&registry, ALL_DEPS, &tracker).await,
        Command::Build => targets::build(&registry, &tracker).await,
        Command::Generate => targets::generate(&registry, tracker.clone()).await,
        Command::Containers => targets::containers(&registry, &tracker).await,
        Command::Cluster { command } => match command {
            ClusterCommand::Create => targets::cluster_create(&tracker).await,
            ClusterCommand::Destroy => targets::cluster_destroy().await,
        },
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli.command).await {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
