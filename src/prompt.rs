//! Interactive option menus for targets given without an option string.

use std::io::{self, BufRead, Stderr, StdinLock, Write};
use std::path::Path;

use filegrade_core::{EntityKind, Flag, OptionError, Options};
use filegrade_worker::OptionSource;

/// Prompts on `output` and reads answers from `input`, one line each.
///
/// Invalid answers are explained and asked again. End of input gives up
/// with the matching [`OptionError`].
pub struct PromptOptions<R, W> {
    input: R,
    output: W,
}

impl PromptOptions<StdinLock<'static>, Stderr> {
    /// Prompt on stderr, read from stdin. Stdout is left to the reports.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> PromptOptions<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, question: &str) -> Option<String> {
        write!(self.output, "{question}").ok()?;
        self.output.flush().ok()?;

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn show_menu(&mut self, path: &Path, kind: EntityKind) {
        let mut menu = format!("{} is a {kind}. Available options:\n", path.display());
        for flag in Flag::menu(kind) {
            if let Some(text) = flag.describe(kind) {
                menu.push_str(&format!("  -{}: {text}\n", flag.as_char()));
            }
        }
        let _ = self.output.write_all(menu.as_bytes());
    }
}

impl<R: BufRead, W: Write> OptionSource for PromptOptions<R, W> {
    fn options_for(&mut self, path: &Path, kind: EntityKind) -> Result<Options, OptionError> {
        self.show_menu(path, kind);
        loop {
            let Some(answer) = self.ask("Enter options (e.g. -na): ") else {
                return Err(OptionError::MissingOptions {
                    path: path.to_path_buf(),
                });
            };
            match Options::parse(&answer, kind) {
                Ok(options) => return Ok(options),
                Err(e) => {
                    let _ = writeln!(self.output, "{e}. Please try again.");
                }
            }
        }
    }

    fn link_name_for(&mut self, path: &Path) -> Result<String, OptionError> {
        let question = format!("Name of the symbolic link to {}: ", path.display());
        loop {
            match self.ask(&question) {
                None => return Err(OptionError::MissingLinkName),
                Some(name) if name.is_empty() => {
                    let _ = writeln!(self.output, "Link name cannot be empty.");
                }
                Some(name) => return Ok(name),
            }
        }
    }
}
