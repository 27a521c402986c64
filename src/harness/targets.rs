//! harness::targets
//!
//! High-level build targets composing dependencies through the runner.
//!
//! Every target follows the same shape: check the required
//! dependencies in parallel, then perform the target-specific work,
//! registering each produced artifact with the tracker.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::core::errors::{causes, Error};

use super::deps::{run_tool, Kind};
use super::registry::Registry;
use super::runner;
use super::tracker::Tracker;
use super::Dependency;

/// Build-time version override consulted before shelling out to git.
pub const VERSION_ENV: &str = "VERSION";

/// Name of the local development cluster.
pub const DEV_CLUSTER: &str = "cape-dev";

/// Label for one service instance within a cluster.
pub fn instance_label(service: &str, instance: &str) -> String {
    format!("cape-{}-{}", service, instance)
}

/// Resolve the build version: `VERSION` env when set, else
/// `git describe --always --dirty`.
pub async fn resolve_version() -> Result<String, Error> {
    if let Ok(version) = std::env::var(VERSION_ENV) {
        if !version.is_empty() {
            return Ok(version);
        }
    }
    let described = run_tool("git", &["describe", "--always", "--dirty"]).await?;
    if described.is_empty() {
        return Err(Error::internal(
            causes::INVALID_VERSION,
            "git describe produced no version",
        ));
    }
    Ok(described)
}

/// Run `check` across the named dependencies in parallel.
pub async fn check(registry: &Registry, names: &[&str]) -> Result<(), Error> {
    let deps = registry.get(names)?;
    runner::run(deps, |dep| async move { dep.check().await })
        .await
        .map_err(Error::from)
}

/// Run `setup` across the named dependencies in parallel.
pub async fn setup(registry: &Registry, names: &[&str]) -> Result<(), Error> {
    let deps = registry.get(names)?;
    runner::run(deps, |dep| async move { dep.setup().await })
        .await
        .map_err(Error::from)
}

/// Run every dependency's `clean` in parallel, then drain the tracker.
pub async fn clean(registry: &Registry, names: &[&str], tracker: &Tracker) -> Result<(), Error> {
    let deps = registry.get(names)?;
    runner::run(deps, |dep| async move { dep.clean().await })
        .await
        .map_err(Error::from)?;
    tracker.clean().await.map_err(Error::from)
}

/// Build the release binary, stamping the resolved version.
pub async fn build(registry: &Registry, tracker: &Tracker) -> Result<(), Error> {
    check(registry, &["rust"]).await?;

    let version = resolve_version().await?;
    info!(%version, "building release binary");

    let output = tokio::process::Command::new("cargo")
        .args(["build", "--release"])
        .env(VERSION_ENV, &version)
        .output()
        .await
        .map_err(|e| {
            Error::internal(causes::COMMAND_FAILED, format!("failed to run cargo: {}", e))
        })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::internal(
            causes::COMMAND_FAILED,
            format!("cargo build failed: {}", stderr.trim()),
        ));
    }

    let binary = PathBuf::from("target/release/cape");
    let id = format!("file://{}", binary.display());
    tracker.add(id, move || async move {
        match tokio::fs::remove_file(&binary).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::internal(
                causes::IO_FAILURE,
                format!("failed to remove '{}': {}", binary.display(), e),
            )),
        }
    })?;
    Ok(())
}

/// Run every registered generator in parallel through the runner.
pub async fn generate(registry: &Registry, tracker: Arc<Tracker>) -> Result<(), Error> {
    let generators: Vec<_> = registry.generators().to_vec();

    let mut tasks = tokio::task::JoinSet::new();
    for gen in generators {
        let tracker = tracker.clone();
        tasks.spawn(async move {
            gen.check().await?;
            gen.generate(tracker.as_ref()).await
        });
    }

    let mut errors = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => errors.push(err),
            Err(_) => errors.push(Error::internal(
                causes::COMMAND_FAILED,
                "a generator task panicked",
            )),
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(super::runner::AggregateError::new(errors).into())
    }
}

/// Build the coordinator container image, registering it for reversal.
pub async fn containers(registry: &Registry, tracker: &Tracker) -> Result<(), Error> {
    check(registry, &["docker"]).await?;

    let version = resolve_version().await?;
    let tag = format!("cape/coordinator:{}", version);
    info!(%tag, "building container image");

    run_tool("docker", &["build", "-t", &tag, "."]).await?;

    let id = format!("docker://{}", tag);
    let image = tag.clone();
    tracker.add(id, move || async move {
        run_tool("docker", &["rmi", &image]).await?;
        Ok(())
    })?;
    Ok(())
}

/// Create the local development cluster.
pub async fn cluster_create(tracker: &Tracker) -> Result<(), Error> {
    let kind = Kind::new();
    kind.check().await?;

    if kind.cluster_exists(DEV_CLUSTER).await? {
        info!(cluster = DEV_CLUSTER, "cluster already exists");
        return Ok(());
    }

    run_tool("kind", &["create", "cluster", "--name", DEV_CLUSTER]).await?;

    tracker.add(format!("kind://{}", DEV_CLUSTER), || async {
        run_tool("kind", &["delete", "cluster", "--name", DEV_CLUSTER]).await?;
        Ok(())
    })?;
    Ok(())
}

/// Destroy the local development cluster.
pub async fn cluster_destroy() -> Result<(), Error> {
    let kind = Kind::new();
    kind.check().await?;

    if !kind.cluster_exists(DEV_CLUSTER).await? {
        info!(cluster = DEV_CLUSTER, "no cluster to destroy");
        return Ok(());
    }
    run_tool("kind", &["delete", "cluster", "--name", DEV_CLUSTER]).await?;
    Ok(())
}
