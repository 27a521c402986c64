//! harness
//!
//! Build-automation harness.
//!
//! # Design
//!
//! External tools (the Rust toolchain, Docker, Kind, code generators)
//! are modeled as named [`Dependency`] values in a [`registry::Registry`].
//! Each exposes the same lifecycle: `check` (read-only presence and
//! version probe), `setup` (idempotent install/prepare), `clean`
//! (idempotent removal). Generators additionally expose `generate`.
//!
//! Lifecycle phases fan out one task per dependency through
//! [`runner::run`]; every failure is kept and reported through an
//! [`runner::AggregateError`], with the first failure deciding the
//! exit. Side effects register scheme-qualified artifacts in the
//! [`tracker::Tracker`], which guarantees a reversal path for each one
//! on a global clean.

pub mod deps;
pub mod registry;
pub mod runner;
pub mod targets;
pub mod tracker;

pub use registry::Registry;
pub use runner::{AggregateError, Buffer};
pub use tracker::Tracker;

use async_trait::async_trait;

use crate::core::errors::Error;

/// A named external tool with a uniform lifecycle.
#[async_trait]
pub trait Dependency: Send + Sync + std::fmt::Debug {
    /// Unique registry name.
    fn name(&self) -> &str;

    /// Verify presence and minimum version. Read-only.
    async fn check(&self) -> Result<(), Error>;

    /// Idempotently install or prepare the tool.
    async fn setup(&self) -> Result<(), Error>;

    /// Idempotently remove installed state.
    async fn clean(&self) -> Result<(), Error>;
}

/// A dependency that emits source artifacts.
#[async_trait]
pub trait Generator: Dependency {
    /// Idempotently produce source artifacts, registering each one
    /// with the tracker.
    async fn generate(&self, tracker: &Tracker) -> Result<(), Error>;
}
