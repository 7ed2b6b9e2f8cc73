//! # Interactive Shell
//!
//! A read-eval-print loop over the same commands as the one-shot CLI. The
//! session, and with it the cart, lives as long as the shell.
//!
//! ```text
//! tally:pos> pos add 3
//!   │
//!   ├─ exit / quit ─────────────► stop
//!   ├─ help ────────────────────► command list
//!   ├─ tokenize ("quoted args")
//!   ├─ ShellLine::try_parse_from ─► clap error printed, loop continues
//!   └─ router.dispatch ─────────► output, or "✗ message"
//! ```
//!
//! Input lines come from an iterator so confirmations can keep reading
//! stdin between lines, and so tests can script a session.

use std::io::{self, Write};

use clap::{CommandFactory, Parser};
use tracing::debug;

use crate::cli::ShellLine;
use crate::router::Router;
use crate::view::{self, Tone};

pub struct Shell<'r, I, W> {
    router: &'r mut Router,
    lines: I,
    out: W,
}

impl<'r, I, W> Shell<'r, I, W>
where
    I: Iterator<Item = io::Result<String>>,
    W: Write,
{
    pub fn new(router: &'r mut Router, lines: I, out: W) -> Self {
        Shell { router, lines, out }
    }

    /// Runs until `exit`, `quit` or end of input.
    pub async fn run(&mut self) -> io::Result<()> {
        writeln!(
            self.out,
            "Tally POS shell. Type `help` for commands, `exit` to leave."
        )?;

        loop {
            write!(self.out, "tally:{}> ", self.router.session().view)?;
            self.out.flush()?;

            let Some(line) = self.lines.next() else {
                writeln!(self.out)?;
                break;
            };
            let line = line?;
            let line = line.trim();

            match line {
                "" => continue,
                "exit" | "quit" => break,
                "help" => {
                    writeln!(self.out, "{}", ShellLine::command().render_help())?;
                    continue;
                }
                _ => {}
            }

            let words = match tokenize(line) {
                Ok(words) => words,
                Err(message) => {
                    writeln!(self.out, "{}", view::alert(Tone::Danger, message))?;
                    continue;
                }
            };

            let parsed = match ShellLine::try_parse_from(words) {
                Ok(parsed) => parsed,
                Err(err) => {
                    write!(self.out, "{}", err.render())?;
                    continue;
                }
            };

            debug!(command = ?parsed.command, "shell command");
            match self.router.dispatch(parsed.command, parsed.yes).await {
                Ok(output) => writeln!(self.out, "{}", output)?,
                Err(err) => writeln!(self.out, "{}", view::alert(Tone::Danger, err.message))?,
            }
        }

        Ok(())
    }
}

/// Splits on whitespace, keeping single- or double-quoted runs together.
fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => word.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            None => {
                word.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(format!("Unclosed {} quote", q));
    }
    if in_word {
        words.push(word);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::AutoConfirm;
    use crate::state::SessionOptions;
    use pretty_assertions::assert_eq;
    use tally_db::{Database, DbConfig};

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize(r#"products add --name "Green Tea" --price 2.50"#).unwrap(),
            vec!["products", "add", "--name", "Green Tea", "--price", "2.50"]
        );
        assert_eq!(
            tokenize("customers edit 1 --notes ''").unwrap(),
            vec!["customers", "edit", "1", "--notes", ""]
        );
        assert!(tokenize(r#"products add --name "Tea"#).is_err());
    }

    async fn session(script: &[&str], answer: bool) -> (Router, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut router =
            Router::bootstrap(db, SessionOptions::default(), Box::new(AutoConfirm(answer)))
                .await
                .unwrap();

        let lines = script
            .iter()
            .map(|l| Ok(l.to_string()))
            .collect::<Vec<_>>()
            .into_iter();
        let mut out = Vec::new();
        Shell::new(&mut router, lines, &mut out).run().await.unwrap();

        (router, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_sale_in_one_session() {
        let (router, out) = session(
            &[
                r#"products add --name "Green Tea" --price 10 --stock 5 --tax 10"#,
                "pos add 1",
                "pos qty 1 2",
                "pos checkout cash",
                "exit",
                "dashboard",
            ],
            true,
        )
        .await;

        assert!(out.contains("Sale #1 completed: $22.00 (CASH)"));
        assert!(out.contains("tally:pos> "));
        assert!(!out.contains("Recent Sales"));
        assert_eq!(router.session().last_sale, Some(1));
        assert!(router.session().cart.is_empty());

        let tea = router.database().products().get_by_id(1).await.unwrap().unwrap();
        assert_eq!(tea.stock, tally_core::Quantity::from_units(3));
    }

    #[tokio::test]
    async fn test_errors_keep_the_session() {
        let (router, out) = session(
            &["pos checkout cash", "frobnicate", "categories add Toys"],
            true,
        )
        .await;

        assert!(out.contains("✗ Cart is empty"));
        assert!(out.contains("unrecognized subcommand 'frobnicate'"));
        assert!(out.contains("'Toys' added"));
        assert_eq!(router.session().view, crate::state::View::Categories);
    }

    #[tokio::test]
    async fn test_yes_flag_per_line() {
        let (router, out) = session(&["data clear", "data clear --yes"], false).await;

        assert!(out.contains("Cancelled"));
        assert!(out.contains("All data cleared"));
        assert!(router
            .database()
            .categories()
            .list_all()
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_help_lists_commands() {
        let (_, out) = session(&["help"], true).await;
        assert!(out.contains("dashboard"));
        assert!(out.contains("reports"));
    }
}
