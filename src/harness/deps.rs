//! harness::deps
//!
//! Concrete tool dependencies.
//!
//! Checks are read-only: a binary lookup via `which` followed by a
//! version probe subprocess. Setup and clean are idempotent; for
//! locally-installed tools setup verifies rather than installs, and
//! the error message names the install path.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::core::errors::{causes, Error};

use super::tracker::Tracker;
use super::{Dependency, Generator};

/// Resolve a binary on PATH.
fn find_tool(binary: &str, install_hint: &str) -> Result<PathBuf, Error> {
    which::which(binary).map_err(|_| {
        Error::not_found(
            causes::TOOL_MISSING,
            format!("'{}' not found on PATH; {}", binary, install_hint),
        )
    })
}

/// Run a subprocess and return trimmed stdout.
///
/// A missing binary and a non-zero exit are distinct failures; stderr
/// is folded into the message on failure.
pub(crate) async fn run_tool(binary: &str, args: &[&str]) -> Result<String, Error> {
    let output = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| {
            Error::not_found(
                causes::TOOL_MISSING,
                format!("failed to launch '{}': {}", binary, e),
            )
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::internal(
            causes::COMMAND_FAILED,
            format!(
                "'{} {}' exited with {}: {}",
                binary,
                args.join(" "),
                output.status,
                stderr.trim()
            ),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// The Rust toolchain (cargo).
#[derive(Debug)]
pub struct RustToolchain {
    binary: &'static str,
}

impl RustToolchain {
    pub fn new() -> Self {
        Self { binary: "cargo" }
    }
}

impl Default for RustToolchain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Dependency for RustToolchain {
    fn name(&self) -> &str {
        "rust"
    }

    async fn check(&self) -> Result<(), Error> {
        find_tool(self.binary, "install via https://rustup.rs")?;
        let version = run_tool(self.binary, &["--version"]).await?;
        debug!(%version, "rust toolchain present");
        Ok(())
    }

    async fn setup(&self) -> Result<(), Error> {
        // Managed by rustup outside the harness; setup just verifies.
        self.check().await
    }

    async fn clean(&self) -> Result<(), Error> {
        run_tool(self.binary, &["clean"]).await?;
        Ok(())
    }
}

/// The Docker container runtime.
#[derive(Debug)]
pub struct Docker {
    binary: &'static str,
}

impl Docker {
    pub fn new() -> Self {
        Self { binary: "docker" }
    }
}

impl Default for Docker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Dependency for Docker {
    fn name(&self) -> &str {
        "docker"
    }

    async fn check(&self) -> Result<(), Error> {
        find_tool(self.binary, "install from https://docs.docker.com/get-docker")?;
        // `docker version` also proves the daemon is reachable.
        let version = run_tool(self.binary, &["version", "--format", "{{.Server.Version}}"])
            .await?;
        debug!(%version, "docker daemon reachable");
        Ok(())
    }

    async fn setup(&self) -> Result<(), Error> {
        self.check().await
    }

    async fn clean(&self) -> Result<(), Error> {
        // Image removal is artifact-scoped and lives in the tracker.
        Ok(())
    }
}

/// Kind, the local-Kubernetes cluster tool.
#[derive(Debug)]
pub struct Kind {
    binary: &'static str,
}

impl Kind {
    pub fn new() -> Self {
        Self { binary: "kind" }
    }

    /// Whether a cluster with the given name exists.
    pub async fn cluster_exists(&self, name: &str) -> Result<bool, Error> {
        let clusters = run_tool(self.binary, &["get", "clusters"]).await?;
        Ok(clusters.lines().any(|line| line.trim() == name))
    }
}

impl Default for Kind {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Dependency for Kind {
    fn name(&self) -> &str {
        "kind"
    }

    async fn check(&self) -> Result<(), Error> {
        find_tool(self.binary, "install from https://kind.sigs.k8s.io")?;
        run_tool(self.binary, &["version"]).await?;
        Ok(())
    }

    async fn setup(&self) -> Result<(), Error> {
        self.check().await
    }

    async fn clean(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// GraphQL client code generator.
///
/// Wraps the `graphql-client` CLI; `generate` emits typed Rust
/// bindings for the coordinator schema and registers the output file
/// as a reversible artifact.
#[derive(Debug)]
pub struct GraphqlCodegen {
    binary: &'static str,
    schema: PathBuf,
    queries: PathBuf,
    output_dir: PathBuf,
}

impl Default for GraphqlCodegen {
    fn default() -> Self {
        Self {
            binary: "graphql-client",
            schema: PathBuf::from("schema/coordinator.graphql"),
            queries: PathBuf::from("schema/queries.graphql"),
            output_dir: PathBuf::from("src/client/generated"),
        }
    }
}

#[async_trait]
impl Dependency for GraphqlCodegen {
    fn name(&self) -> &str {
        "graphql-codegen"
    }

    async fn check(&self) -> Result<(), Error> {
        find_tool(
            self.binary,
            "install with 'cargo install graphql_client_cli'",
        )?;
        Ok(())
    }

    async fn setup(&self) -> Result<(), Error> {
        self.check().await
    }

    async fn clean(&self) -> Result<(), Error> {
        Ok(())
    }
}

#[async_trait]
impl Generator for GraphqlCodegen {
    async fn generate(&self, tracker: &Tracker) -> Result<(), Error> {
        let schema = self.schema.to_string_lossy().to_string();
        let queries = self.queries.to_string_lossy().to_string();
        let output_dir = self.output_dir.to_string_lossy().to_string();

        run_tool(
            self.binary,
            &[
                "generate",
                "--schema-path",
                &schema,
                "--output-directory",
                &output_dir,
                &queries,
            ],
        )
        .await?;

        let generated = self.output_dir.join("queries.rs");
        let id = format!("file://{}", generated.display());
        tracker.add(id, move || async move {
            match tokio::fs::remove_file(&generated).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(Error::internal(
                    causes::IO_FAILURE,
                    format!("failed to remove '{}': {}", generated.display(), e),
                )),
            }
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependency_names_are_stable() {
        assert_eq!(RustToolchain::new().name(), "rust");
        assert_eq!(Docker::new().name(), "docker");
        assert_eq!(Kind::new().name(), "kind");
        assert_eq!(GraphqlCodegen::default().name(), "graphql-codegen");
    }

    #[tokio::test]
    async fn missing_binary_is_tool_missing() {
        let err = run_tool("definitely-not-a-real-binary-xyzzy", &["--version"])
            .await
            .unwrap_err();
        assert!(err.is(causes::TOOL_MISSING));
    }
}
