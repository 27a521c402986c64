//! ui
//!
//! User interaction port.
//!
//! # Design
//!
//! Everything a command handler says to the operator goes through the
//! [`Ui`] trait: notifications, prompts, secret entry, confirmations,
//! tables, templated lines, and key/value detail blocks. Handlers never
//! touch stdout/stderr directly, which keeps them testable against the
//! recording [`mock::MockUi`].
//!
//! Prompt validators are plain functions; the prompt loop re-prompts
//! until a validator accepts or the operator cancels, and cancellation
//! surfaces as an error with cause `prompt_cancelled`.

pub mod mock;
pub mod terminal;

pub use terminal::TerminalUi;

use std::fmt;

use crate::core::errors::Error;

/// Notification severity/kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    /// Routine informational output.
    Info,
    /// Output the operator must save (one-time credentials).
    Remember,
    /// Non-fatal warning.
    Warn,
    /// Error output.
    Error,
}

impl fmt::Display for NotifyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyKind::Info => write!(f, "info"),
            NotifyKind::Remember => write!(f, "remember"),
            NotifyKind::Warn => write!(f, "warn"),
            NotifyKind::Error => write!(f, "error"),
        }
    }
}

/// A prompt validator: accepts the candidate or explains the rejection.
pub type Validator<'a> = &'a dyn Fn(&str) -> Result<(), Error>;

/// Validator that accepts any input.
pub fn accept_any(_: &str) -> Result<(), Error> {
    Ok(())
}

/// The UI capability surface.
///
/// Implementations must be `Send + Sync`; the provider hands a shared
/// reference to every handler in an invocation.
pub trait Ui: Send + Sync {
    /// Emit a one-line notification.
    fn notify(&self, kind: NotifyKind, message: &str);

    /// Prompt for a secret (input not echoed), re-prompting until the
    /// validator accepts.
    fn secret(&self, prompt: &str, validate: Validator<'_>) -> Result<String, Error>;

    /// Prompt for a line of text, re-prompting until the validator
    /// accepts.
    fn question(&self, prompt: &str, validate: Validator<'_>) -> Result<String, Error>;

    /// Ask a yes/no question.
    fn confirm(&self, prompt: &str) -> Result<bool, Error>;

    /// Render a table with a header row.
    fn table(&self, header: Vec<String>, rows: Vec<Vec<String>>);

    /// Render a `{{key}}` template against a JSON object and emit the
    /// result as one line.
    fn template(&self, template: &str, data: &serde_json::Value) -> Result<(), Error>;

    /// Render an ordered key/value detail block.
    fn details(&self, pairs: Vec<(String, String)>);
}

/// Substitute `{{key}}` placeholders from a JSON object.
///
/// Unknown placeholders are left untouched; non-string values render
/// via their JSON form.
pub(crate) fn render_template(template: &str, data: &serde_json::Value) -> String {
    let mut out = template.to_string();
    if let Some(map) = data.as_object() {
        for (key, value) in map {
            let needle = format!("{{{{{}}}}}", key);
            let replacement = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            out = out.replace(&needle, &replacement);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn template_substitutes_string_values() {
        let out = render_template(
            "Role for {{email}} is now {{role}}",
            &json!({"email": "friend@cape.com", "role": "admin"}),
        );
        assert_eq!(out, "Role for friend@cape.com is now admin");
    }

    #[test]
    fn template_renders_numbers_bare() {
        let out = render_template("Found {{count}} tokens", &json!({"count": 4}));
        assert_eq!(out, "Found 4 tokens");
    }

    #[test]
    fn template_leaves_unknown_placeholders() {
        let out = render_template("{{missing}} stays", &json!({}));
        assert_eq!(out, "{{missing}} stays");
    }

    #[test]
    fn notify_kind_display() {
        assert_eq!(NotifyKind::Info.to_string(), "info");
        assert_eq!(NotifyKind::Remember.to_string(), "remember");
        assert_eq!(NotifyKind::Error.to_string(), "error");
    }
}
