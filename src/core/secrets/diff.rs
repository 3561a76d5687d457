//! Line diff and change confirmation.
//!
//! Compares the previously stored plaintext of a secret file with the new
//! one and asks the user to accept the change before it is written.

use std::collections::HashSet;

use console::style;
use tracing::debug;

use super::Cryptor;
use crate::core::constants::CONFIRM_ATTEMPTS;
use crate::error::{Result, SecretsError};

/// Which side of the comparison a line appears on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    /// Present in the old content only.
    Removed,
    /// Present in the new content only.
    Added,
}

/// A single changed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    line: String,
    status: LineStatus,
}

impl DiffEntry {
    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn status(&self) -> LineStatus {
        self.status
    }
}

/// Line-level set difference between two texts.
///
/// Lines are compared as a set, so reordering alone is not a change.
/// Removed lines come first, each group in original order.
#[derive(Debug, Default)]
pub struct Diff {
    entries: Vec<DiffEntry>,
}

impl Diff {
    pub fn compute(old: &str, new: &str) -> Self {
        let old_lines: HashSet<&str> = old.lines().collect();
        let new_lines: HashSet<&str> = new.lines().collect();

        let removed = old
            .lines()
            .filter(|l| !new_lines.contains(l))
            .map(|l| DiffEntry {
                line: l.to_string(),
                status: LineStatus::Removed,
            });
        let added = new
            .lines()
            .filter(|l| !old_lines.contains(l))
            .map(|l| DiffEntry {
                line: l.to_string(),
                status: LineStatus::Added,
            });

        Self {
            entries: removed.chain(added).collect(),
        }
    }

    pub fn entries(&self) -> &[DiffEntry] {
        &self.entries
    }

    pub fn removed(&self) -> Vec<&DiffEntry> {
        self.entries
            .iter()
            .filter(|e| e.status == LineStatus::Removed)
            .collect()
    }

    pub fn added(&self) -> Vec<&DiffEntry> {
        self.entries
            .iter()
            .filter(|e| e.status == LineStatus::Added)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Cryptor {
    /// Show the diff for `file` and ask the user to accept it.
    ///
    /// Succeeds immediately when `skip_check` is set or nothing changed.
    ///
    /// # Errors
    ///
    /// `SecretsError::ChangeNotAccepted` on "N", `SecretsError::NoAnswer`
    /// after [`CONFIRM_ATTEMPTS`] invalid answers.
    pub(super) fn ensure_diff_acceptable(
        &self,
        file: &str,
        old: &[u8],
        new: &[u8],
        skip_check: bool,
    ) -> Result<()> {
        if skip_check {
            return Ok(());
        }

        let diff = Diff::compute(&String::from_utf8_lossy(old), &String::from_utf8_lossy(new));
        if diff.is_empty() {
            return Ok(());
        }

        debug!(file, lines = diff.entries().len(), "asking to confirm change");
        self.console.println(&format!("File {} has changed:", file));
        for entry in diff.entries() {
            let line = match entry.status() {
                LineStatus::Removed => style(format!("- {}", entry.line())).red(),
                LineStatus::Added => style(format!("+ {}", entry.line())).green(),
            };
            self.console.println(&line.to_string());
        }

        for _ in 0..CONFIRM_ATTEMPTS {
            let answer = self.console.read_line("Accept change? (Y/N)")?;
            match answer.trim().to_ascii_uppercase().as_str() {
                "Y" => return Ok(()),
                "N" => return Err(SecretsError::ChangeNotAccepted.into()),
                _ => self.console.println("Please answer Y or N"),
            }
        }
        Err(SecretsError::NoAnswer(file.to_string(), CONFIRM_ATTEMPTS).into())
    }
}
