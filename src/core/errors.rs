//! core::errors
//!
//! Structured errors shared by every layer of the crate.
//!
//! # Design
//!
//! Every failure the CLI can surface is either a [`Error`] carrying a
//! category, a stable cause tag, and one or more human messages, or an
//! unstructured wrapping error at an I/O boundary. Library code never
//! prints; the CLI error hook renders the joined messages and nothing
//! else, so cause tags stay out of user-visible output.
//!
//! Flow-control errors (no cluster configured, mock response queue
//! exhausted) are distinguished by their cause tag. Callers branch with
//! [`Error::is`] rather than matching on message text.
//!
//! # Example
//!
//! ```
//! use cape::core::errors::{causes, Error};
//!
//! let err = Error::bad_request(causes::INVALID_LABEL, "labels must be lowercase");
//! assert!(err.is(causes::INVALID_LABEL));
//! assert_eq!(err.to_string(), "labels must be lowercase");
//! ```

use thiserror::Error as ThisError;

/// Coarse error categories mirrored from the coordinator's error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// The request was malformed or failed validation.
    BadRequest,
    /// Authentication was missing or rejected.
    Unauthorized,
    /// The referenced entity does not exist.
    NotFound,
    /// The operation conflicts with existing state.
    Conflict,
    /// The operation is recognized but not implemented.
    NotImplemented,
    /// An internal failure that is not the caller's fault.
    Internal,
}

impl Category {
    /// The wire tag used by the coordinator for this category.
    pub fn tag(&self) -> &'static str {
        match self {
            Category::BadRequest => "bad_request",
            Category::Unauthorized => "unauthorized",
            Category::NotFound => "not_found",
            Category::Conflict => "conflict",
            Category::NotImplemented => "not_implemented",
            Category::Internal => "internal",
        }
    }

    /// Parse a wire tag back into a category.
    ///
    /// Unknown tags map to `Internal` so a newer coordinator cannot
    /// crash an older client.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "bad_request" => Category::BadRequest,
            "unauthorized" => Category::Unauthorized,
            "not_found" => Category::NotFound,
            "conflict" => Category::Conflict,
            "not_implemented" => Category::NotImplemented,
            _ => Category::Internal,
        }
    }
}

/// A short stable identifier for a specific failure.
///
/// Cause tags are compared by value and never rendered to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cause(&'static str);

impl Cause {
    /// Create a cause tag. Prefer the constants in [`causes`].
    pub const fn new(tag: &'static str) -> Self {
        Self(tag)
    }

    /// The underlying tag string.
    pub fn tag(&self) -> &'static str {
        self.0
    }
}

/// The stable cause tags used across the crate.
pub mod causes {
    use super::Cause;

    pub const INVALID_LABEL: Cause = Cause::new("invalid_label");
    pub const INVALID_URL: Cause = Cause::new("invalid_url");
    pub const INVALID_EMAIL: Cause = Cause::new("invalid_email");
    pub const INVALID_PASSWORD: Cause = Cause::new("invalid_password");
    pub const INVALID_TOKEN: Cause = Cause::new("invalid_token");
    pub const INVALID_ROLE: Cause = Cause::new("invalid_role");
    pub const INVALID_VERSION: Cause = Cause::new("invalid_version");
    pub const INVALID_CONFIG: Cause = Cause::new("invalid_config");
    pub const INVALID_DB_URL: Cause = Cause::new("invalid_db_url");
    pub const INVALID_MIGRATIONS_PATH: Cause = Cause::new("invalid_migrations_path");
    pub const MISSING_ARGUMENT: Cause = Cause::new("missing_argument");
    pub const MISSING_ENVIRONMENT_VARIABLE: Cause = Cause::new("missing_environment_variable");
    pub const CLUSTER_NOT_FOUND: Cause = Cause::new("cluster_not_found");
    pub const DUPLICATE_CLUSTER: Cause = Cause::new("duplicate_cluster");
    pub const NO_CLUSTER: Cause = Cause::new("no_cluster");
    pub const AUTHENTICATION_FAILURE: Cause = Cause::new("authentication_failure");
    pub const PROMPT_CANCELLED: Cause = Cause::new("prompt_cancelled");
    pub const NETWORK_FAILURE: Cause = Cause::new("network_failure");
    pub const MOCK_EXHAUSTED: Cause = Cause::new("mock_exhausted");
    pub const DUPLICATE_DEPENDENCY: Cause = Cause::new("duplicate_dependency");
    pub const UNKNOWN_DEPENDENCY: Cause = Cause::new("unknown_dependency");
    pub const DUPLICATE_ARTIFACT: Cause = Cause::new("duplicate_artifact");
    pub const TOOL_MISSING: Cause = Cause::new("tool_missing");
    pub const COMMAND_FAILED: Cause = Cause::new("command_failed");
    pub const IO_FAILURE: Cause = Cause::new("io_failure");
    pub const UNKNOWN: Cause = Cause::new("unknown");
}

/// A structured error: category, cause tag, and human messages.
///
/// `Display` joins the messages with `", "`; the cause tag is available
/// to callers but never part of the rendered output.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("{}", .messages.join(", "))]
pub struct Error {
    category: Category,
    cause: Cause,
    messages: Vec<String>,
}

impl Error {
    /// Create an error with a single message.
    pub fn new(category: Category, cause: Cause, message: impl Into<String>) -> Self {
        Self {
            category,
            cause,
            messages: vec![message.into()],
        }
    }

    /// Append a further message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.messages.push(message.into());
        self
    }

    /// Shorthand for a bad-request error.
    pub fn bad_request(cause: Cause, message: impl Into<String>) -> Self {
        Self::new(Category::BadRequest, cause, message)
    }

    /// Shorthand for a not-found error.
    pub fn not_found(cause: Cause, message: impl Into<String>) -> Self {
        Self::new(Category::NotFound, cause, message)
    }

    /// Shorthand for an unauthorized error.
    pub fn unauthorized(cause: Cause, message: impl Into<String>) -> Self {
        Self::new(Category::Unauthorized, cause, message)
    }

    /// Shorthand for a conflict error.
    pub fn conflict(cause: Cause, message: impl Into<String>) -> Self {
        Self::new(Category::Conflict, cause, message)
    }

    /// Shorthand for an internal error.
    pub fn internal(cause: Cause, message: impl Into<String>) -> Self {
        Self::new(Category::Internal, cause, message)
    }

    /// The sentinel returned when no current cluster is configured.
    pub fn no_cluster() -> Self {
        Self::new(
            Category::NotFound,
            causes::NO_CLUSTER,
            "no cluster is configured; run 'cape config clusters use <label>'",
        )
    }

    /// A missing required positional argument.
    pub fn missing_argument(name: &str) -> Self {
        Self::bad_request(
            causes::MISSING_ARGUMENT,
            format!("missing required argument '{}'", name),
        )
    }

    /// A missing or empty required environment variable.
    pub fn missing_env_var(name: &str) -> Self {
        Self::bad_request(
            causes::MISSING_ENVIRONMENT_VARIABLE,
            format!("missing required environment variable '{}'", name),
        )
    }

    /// The error category.
    pub fn category(&self) -> Category {
        self.category
    }

    /// The stable cause tag.
    pub fn cause(&self) -> Cause {
        self.cause
    }

    /// The human-readable messages, in order.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Check whether this error carries the given cause tag.
    pub fn is(&self, cause: Cause) -> bool {
        self.cause == cause
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::internal(causes::IO_FAILURE, err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::bad_request(causes::INVALID_URL, err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::internal(causes::NETWORK_FAILURE, err.to_string())
    }
}
