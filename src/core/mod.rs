//! core
//!
//! Domain primitives and the structured error model.
//!
//! Everything above this layer (config, client, cli, harness) builds on
//! these types; nothing here performs I/O.

pub mod errors;
pub mod types;

pub use errors::{causes, Category, Cause, Error};
pub use types::{AuthToken, ClusterUrl, Email, Label, OrgRole, Password, ProjectRole};
