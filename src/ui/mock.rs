//! ui::mock
//!
//! Recording mock for deterministic UI tests.
//!
//! # Design
//!
//! `MockUi` records every call (name plus arguments) in order and
//! returns canned answers from queues, so end-to-end command tests run
//! without a TTY and can assert the exact interaction sequence. An
//! exhausted answer queue fails with cause `mock_exhausted` so tests
//! catch missing expectations instead of hanging.
//!
//! # Example
//!
//! ```
//! use cape::ui::mock::{MockUi, UiCall};
//! use cape::ui::{accept_any, NotifyKind, Ui};
//!
//! let ui = MockUi::new();
//! ui.push_answer("Jane Operator");
//!
//! let name = ui.question("Name", &accept_any).unwrap();
//! ui.notify(NotifyKind::Info, "done");
//!
//! assert_eq!(name, "Jane Operator");
//! let calls = ui.calls();
//! assert!(matches!(&calls[0], UiCall::Question { prompt } if prompt == "Name"));
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::{render_template, NotifyKind, Ui, Validator};
use crate::core::errors::{causes, Error};

/// One recorded UI interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum UiCall {
    Notify {
        kind: NotifyKind,
        message: String,
    },
    Secret {
        prompt: String,
    },
    Question {
        prompt: String,
    },
    Confirm {
        prompt: String,
    },
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Template {
        template: String,
        rendered: String,
    },
    Details {
        pairs: Vec<(String, String)>,
    },
}

#[derive(Debug, Default)]
struct MockUiInner {
    calls: Vec<UiCall>,
    answers: VecDeque<String>,
    confirms: VecDeque<bool>,
}

/// Recording mock UI.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share
/// state so a test can keep a handle while the provider owns another.
#[derive(Debug, Clone, Default)]
pub struct MockUi {
    inner: Arc<Mutex<MockUiInner>>,
}

impl MockUi {
    /// Create an empty mock with no canned answers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer for the next `question` or `secret` call.
    pub fn push_answer(&self, answer: impl Into<String>) {
        self.inner.lock().unwrap().answers.push_back(answer.into());
    }

    /// Queue an answer for the next `confirm` call.
    pub fn push_confirm(&self, answer: bool) {
        self.inner.lock().unwrap().confirms.push_back(answer);
    }

    /// Snapshot of all recorded calls, in order.
    pub fn calls(&self) -> Vec<UiCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// All rendered template lines, in order.
    pub fn templates(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                UiCall::Template { rendered, .. } => Some(rendered),
                _ => None,
            })
            .collect()
    }

    /// All notifications, in order.
    pub fn notifications(&self) -> Vec<(NotifyKind, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                UiCall::Notify { kind, message } => Some((kind, message)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: UiCall) {
        self.inner.lock().unwrap().calls.push(call);
    }

    fn next_answer(&self, prompt: &str) -> Result<String, Error> {
        self.inner.lock().unwrap().answers.pop_front().ok_or_else(|| {
            Error::internal(
                causes::MOCK_EXHAUSTED,
                format!("no canned answer for prompt '{}'", prompt),
            )
        })
    }
}

impl Ui for MockUi {
    fn notify(&self, kind: NotifyKind, message: &str) {
        self.record(UiCall::Notify {
            kind,
            message: message.to_string(),
        });
    }

    fn secret(&self, prompt: &str, validate: Validator<'_>) -> Result<String, Error> {
        self.record(UiCall::Secret {
            prompt: prompt.to_string(),
        });
        let answer = self.next_answer(prompt)?;
        validate(&answer)?;
        Ok(answer)
    }

    fn question(&self, prompt: &str, validate: Validator<'_>) -> Result<String, Error> {
        self.record(UiCall::Question {
            prompt: prompt.to_string(),
        });
        let answer = self.next_answer(prompt)?;
        validate(&answer)?;
        Ok(answer)
    }

    fn confirm(&self, prompt: &str) -> Result<bool, Error> {
        self.record(UiCall::Confirm {
            prompt: prompt.to_string(),
        });
        // Unqueued confirmations default to yes.
        Ok(self.inner.lock().unwrap().confirms.pop_front().unwrap_or(true))
    }

    fn table(&self, header: Vec<String>, rows: Vec<Vec<String>>) {
        self.record(UiCall::Table { header, rows });
    }

    fn template(&self, template: &str, data: &serde_json::Value) -> Result<(), Error> {
        let rendered = render_template(template, data);
        self.record(UiCall::Template {
            template: template.to_string(),
            rendered,
        });
        Ok(())
    }

    fn details(&self, pairs: Vec<(String, String)>) {
        self.record(UiCall::Details { pairs });
    }
}
