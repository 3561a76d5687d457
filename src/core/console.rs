//! Console access for prompts and diff output.
//!
//! The cryptor never talks to the terminal directly; it goes through a
//! [`Console`] so interactive and scripted sessions behave the same.

use std::collections::VecDeque;
use std::io;

use console::Term;
use dialoguer::{Input, Password};
use parking_lot::Mutex;

/// Reader/writer used for passphrase prompts and diff confirmation.
pub trait Console: Send + Sync {
    /// Print one line of output.
    fn println(&self, line: &str);

    /// Ask for a line of input.
    fn read_line(&self, prompt: &str) -> io::Result<String>;

    /// Ask for hidden input.
    fn read_password(&self, prompt: &str) -> io::Result<String>;
}

/// Interactive terminal console.
#[derive(Debug, Default)]
pub struct Terminal;

impl Console for Terminal {
    fn println(&self, line: &str) {
        let _ = Term::stderr().write_line(line);
    }

    fn read_line(&self, prompt: &str) -> io::Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }

    fn read_password(&self, prompt: &str) -> io::Result<String> {
        Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }
}

/// Non-interactive console answering from a preset queue.
///
/// Output is captured instead of printed. Running out of answers is an
/// `UnexpectedEof` error.
#[derive(Debug, Default)]
pub struct Scripted {
    answers: Mutex<VecDeque<String>>,
    output: Mutex<Vec<String>>,
}

impl Scripted {
    /// Console that answers prompts in order.
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            output: Mutex::new(Vec::new()),
        }
    }

    /// Lines printed so far.
    pub fn output(&self) -> Vec<String> {
        self.output.lock().clone()
    }

    /// Answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.answers.lock().len()
    }

    fn next(&self, prompt: &str) -> io::Result<String> {
        self.output.lock().push(prompt.to_string());
        self.answers.lock().pop_front().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("no scripted answer for prompt: {}", prompt),
            )
        })
    }
}

impl Console for Scripted {
    fn println(&self, line: &str) {
        self.output.lock().push(line.to_string());
    }

    fn read_line(&self, prompt: &str) -> io::Result<String> {
        self.next(prompt)
    }

    fn read_password(&self, prompt: &str) -> io::Result<String> {
        self.next(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_answers_in_order() {
        let console = Scripted::new(["first", "second"]);

        assert_eq!(console.read_line("a?").unwrap(), "first");
        assert_eq!(console.read_password("b?").unwrap(), "second");
        assert_eq!(console.remaining(), 0);
        assert_eq!(console.output(), vec!["a?", "b?"]);
    }

    #[test]
    fn test_scripted_exhausted_is_eof() {
        let console = Scripted::default();
        let err = console.read_line("anything?").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
