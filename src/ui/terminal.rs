//! ui::terminal
//!
//! Terminal implementation of the [`Ui`] trait.
//!
//! # Design
//!
//! Plain line-oriented output on stdout, errors on stderr. Secrets are
//! read through `rpassword` so they are never echoed. Tables render via
//! `tabled`. EOF on stdin during a prompt counts as cancellation.

use std::io::{self, BufRead, Write};

use tabled::builder::Builder;
use tabled::settings::Style;

use super::{render_template, NotifyKind, Ui, Validator};
use crate::core::errors::{causes, Error};

/// Line-oriented terminal UI.
#[derive(Debug, Default)]
pub struct TerminalUi;

impl TerminalUi {
    pub fn new() -> Self {
        Self
    }

    fn read_line(&self) -> Result<String, Error> {
        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| Error::internal(causes::IO_FAILURE, e.to_string()))?;
        if read == 0 {
            return Err(Error::bad_request(
                causes::PROMPT_CANCELLED,
                "prompt cancelled",
            ));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl Ui for TerminalUi {
    fn notify(&self, kind: NotifyKind, message: &str) {
        match kind {
            NotifyKind::Info => println!("{}", message),
            NotifyKind::Remember => println!("Important! {}", message),
            NotifyKind::Warn => eprintln!("warning: {}", message),
            NotifyKind::Error => eprintln!("error: {}", message),
        }
    }

    fn secret(&self, prompt: &str, validate: Validator<'_>) -> Result<String, Error> {
        loop {
            let value = rpassword::prompt_password(format!("{}: ", prompt)).map_err(|e| {
                if e.kind() == io::ErrorKind::UnexpectedEof {
                    Error::bad_request(causes::PROMPT_CANCELLED, "prompt cancelled")
                } else {
                    Error::internal(causes::IO_FAILURE, e.to_string())
                }
            })?;
            match validate(&value) {
                Ok(()) => return Ok(value),
                Err(err) => eprintln!("error: {}", err),
            }
        }
    }

    fn question(&self, prompt: &str, validate: Validator<'_>) -> Result<String, Error> {
        loop {
            print!("{}: ", prompt);
            io::stdout()
                .flush()
                .map_err(|e| Error::internal(causes::IO_FAILURE, e.to_string()))?;
            let value = self.read_line()?;
            match validate(&value) {
                Ok(()) => return Ok(value),
                Err(err) => eprintln!("error: {}", err),
            }
        }
    }

    fn confirm(&self, prompt: &str) -> Result<bool, Error> {
        print!("{} [y/N]: ", prompt);
        io::stdout()
            .flush()
            .map_err(|e| Error::internal(causes::IO_FAILURE, e.to_string()))?;
        let answer = self.read_line()?;
        Ok(matches!(answer.as_str(), "y" | "Y" | "yes" | "Yes"))
    }

    fn table(&self, header: Vec<String>, rows: Vec<Vec<String>>) {
        let mut builder = Builder::default();
        builder.push_record(header);
        for row in rows {
            builder.push_record(row);
        }
        let mut table = builder.build();
        table.with(Style::sharp());
        println!("{}", table);
    }

    fn template(&self, template: &str, data: &serde_json::Value) -> Result<(), Error> {
        println!("{}", render_template(template, data));
        Ok(())
    }

    fn details(&self, pairs: Vec<(String, String)>) {
        let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, value) in pairs {
            println!("{:width$}  {}", key, value, width = width);
        }
    }
}
