//! # Confirmation Prompts
//!
//! Destructive commands (deletes, cart clear, restore, clear-all) ask before
//! acting. The router owns one `Prompt` and lends it to handlers through
//! the context, so tests can answer for the operator.

use std::io::{self, Write};

pub trait Prompt {
    /// Asks a yes/no question. Anything but an explicit yes is a no.
    fn confirm(&mut self, question: &str) -> bool;
}

/// Asks on stdout and reads the answer from stdin.
///
/// Reads one line per question through `Stdin::read_line`, which takes the
/// stdin lock only for that call, so the shell can read its own lines in
/// between.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn confirm(&mut self, question: &str) -> bool {
        print!("{} [y/N] ", question);
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                tracing::warn!("Could not read confirmation: {}", e);
                false
            }
        }
    }
}

/// Gives the same answer every time. Used for `--yes` and in tests.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Prompt for AutoConfirm {
    fn confirm(&mut self, _question: &str) -> bool {
        self.0
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
