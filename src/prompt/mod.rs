// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interactive resolution of missing login fields.
//!
//! The login flow asks a [`CredentialResolver`] for every field the caller
//! left empty. [`TerminalResolver`] prompts on the controlling terminal;
//! tests pass a closure instead.
//!
//! ```
//! use kubectl_rancher::prompt::CredentialResolver;
//!
//! let resolver = |field: &str, _secret: bool| -> kubectl_rancher::error::Result<String> {
//!     Ok(format!("value-for-{field}"))
//! };
//! assert_eq!(resolver.resolve("RANCHER_USER", false).unwrap(), "value-for-RANCHER_USER");
//! ```

use crate::error::{RancherError, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, BufRead, Write};

/// Supplies a value for a named credential field.
pub trait CredentialResolver {
    /// Return a value for `field`. `secret` fields must not be echoed.
    ///
    /// # Errors
    ///
    /// Returns an error if no value can be obtained.
    #[allow(clippy::result_large_err)]
    fn resolve(&self, field: &str, secret: bool) -> Result<String>;
}

impl<F> CredentialResolver for F
where
    F: Fn(&str, bool) -> Result<String>,
{
    fn resolve(&self, field: &str, secret: bool) -> Result<String> {
        self(field, secret)
    }
}

/// Return `value` if non-empty, otherwise ask `resolver` for it.
///
/// The result is trimmed; a value that is still empty is an error.
#[allow(clippy::result_large_err)]
pub fn check_and_prompt(
    value: &str,
    field: &str,
    secret: bool,
    resolver: &dyn CredentialResolver,
) -> Result<String> {
    if !value.is_empty() {
        return Ok(value.to_string());
    }
    let resolved = resolver.resolve(field, secret)?;
    let resolved = resolved.trim();
    if resolved.is_empty() {
        return Err(RancherError::Prompt(format!("no value entered for {field}")));
    }
    Ok(resolved.to_string())
}

/// Prompts on stdin/stdout. Secret fields are read with echo disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalResolver;

impl TerminalResolver {
    fn read_line() -> io::Result<String> {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
        }
        Ok(line)
    }

    fn read_hidden() -> io::Result<String> {
        enable_raw_mode()?;
        let result = Self::read_hidden_raw();
        disable_raw_mode()?;
        println!();
        result
    }

    fn read_hidden_raw() -> io::Result<String> {
        let mut value = String::new();
        loop {
            if let Event::Key(KeyEvent {
                code,
                modifiers,
                kind: KeyEventKind::Press,
                ..
            }) = event::read()?
            {
                match code {
                    KeyCode::Enter => return Ok(value),
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        return Err(io::Error::new(io::ErrorKind::Interrupted, "interrupted"));
                    }
                    KeyCode::Char(c) => value.push(c),
                    KeyCode::Backspace => {
                        value.pop();
                    }
                    KeyCode::Esc => {
                        return Err(io::Error::new(io::ErrorKind::Interrupted, "cancelled"));
                    }
                    _ => {}
                }
            }
        }
    }
}

impl CredentialResolver for TerminalResolver {
    fn resolve(&self, field: &str, secret: bool) -> Result<String> {
        print!("Enter {field}:");
        io::stdout().flush()?;

        let value = if secret {
            Self::read_hidden()
        } else {
            Self::read_line()
        };
        value.map_err(|e| RancherError::Prompt(format!("{field}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_present_value_skips_resolver() {
        let resolver = |_: &str, _: bool| -> Result<String> { panic!("should not prompt") };
        let value = check_and_prompt("admin", "RANCHER_USER", false, &resolver).unwrap();
        assert_eq!(value, "admin");
    }

    #[test]
    fn test_missing_value_is_prompted_and_trimmed() {
        let asked = RefCell::new(Vec::new());
        let resolver = |field: &str, secret: bool| -> Result<String> {
            asked.borrow_mut().push((field.to_string(), secret));
            Ok("  hunter2\n".to_string())
        };

        let value = check_and_prompt("", "RANCHER_PASSWORD", true, &resolver).unwrap();
        assert_eq!(value, "hunter2");
        assert_eq!(
            asked.into_inner(),
            vec![("RANCHER_PASSWORD".to_string(), true)]
        );
    }

    #[test]
    fn test_blank_answer_is_an_error() {
        let resolver = |_: &str, _: bool| -> Result<String> { Ok("\n".to_string()) };
        let err = check_and_prompt("", "RANCHER_USER", false, &resolver).unwrap_err();
        assert!(matches!(err, RancherError::Prompt(_)));
    }

    #[test]
    fn test_resolver_error_propagates() {
        let resolver =
            |_: &str, _: bool| -> Result<String> { Err(RancherError::Prompt("eof".to_string())) };
        let err = check_and_prompt("", "RANCHER_LOGIN_METHOD", false, &resolver).unwrap_err();
        assert!(matches!(err, RancherError::Prompt(m) if m == "eof"));
    }
}
