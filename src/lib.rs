//! Cape - administration client and build tooling for a Cape cluster
//!
//! Cape is a command-line client for operating a privacy/policy
//! platform: registering and selecting coordinator clusters,
//! authenticating, and managing users, roles, API tokens, and
//! projects over the coordinator's HTTPS query API. A second binary,
//! `cape-build`, drives the build-automation harness.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line surface, dispatch, and the per-invocation provider
//! - [`core`] - Domain primitives and the structured error model
//! - [`config`] - Persisted per-user configuration (clusters, current cluster)
//! - [`ui`] - User interaction port with terminal and recording-mock backends
//! - [`client`] - Typed request/transport port with HTTP and mock backends
//! - [`migrate`] - Database migration seam for the `update` command
//! - [`harness`] - Build-automation registry, runner, and artifact tracker
//!
//! # Correctness Invariants
//!
//! 1. Library code never prints; errors are returned and rendered once
//!    at the top of the CLI
//! 2. Handlers validate arguments and environment before touching the
//!    UI or the network
//! 3. The stored auth token leaves the config only through a transport
//! 4. Every artifact a build step produces has a registered reversal
//!    path drained by the global clean

pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod harness;
pub mod migrate;
pub mod ui;
