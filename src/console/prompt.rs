use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};
use std::io::{BufRead, Write};

use crate::error::{HelperError, Result};
use crate::output::cyan;

/// Source of the answers the console asks for.
pub trait Prompter {
    /// Reads a menu selection. `None` means the input is exhausted.
    fn selection(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Reads free text; an empty answer gives `default`.
    fn text(&mut self, prompt: &str, default: &str) -> Result<String>;

    /// Reads an integer; an empty answer gives `default` when there is one.
    fn number(&mut self, prompt: &str, default: Option<u64>) -> Result<u64>;

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool>;
}

/// Prompts on the attended terminal through `dialoguer`.
#[derive(Default)]
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl Prompter for TerminalPrompter {
    fn selection(&mut self, prompt: &str) -> Result<Option<String>> {
        let answer: String = Input::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(Some(answer.trim().to_string()))
    }

    fn text(&mut self, prompt: &str, default: &str) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if !default.is_empty() {
            input = input.default(default.to_string());
        }
        Ok(input.interact_text()?.trim().to_string())
    }

    fn number(&mut self, prompt: &str, default: Option<u64>) -> Result<u64> {
        let mut input = Input::<u64>::with_theme(&self.theme).with_prompt(prompt);
        if let Some(default) = default {
            input = input.default(default);
        }
        Ok(input.interact_text()?)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }
}

/// Line-based prompts for piped input. Each label is echoed to `echo` before
/// a line is read from `input`.
pub struct LinePrompter<R, W> {
    input: R,
    echo: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, echo: W) -> Self {
        Self { input, echo }
    }

    fn read_line(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.echo, "{}", cyan(label))?;
        self.echo.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.echo)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn answer(&mut self, label: &str) -> Result<String> {
        self.read_line(label)?
            .ok_or_else(|| HelperError::Argument("no input".to_string()))
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn selection(&mut self, prompt: &str) -> Result<Option<String>> {
        self.read_line(&format!("{prompt}> "))
    }

    fn text(&mut self, prompt: &str, default: &str) -> Result<String> {
        let label = if default.is_empty() {
            format!("{prompt}: ")
        } else {
            format!("{prompt} [{default}]: ")
        };

        let answer = self.answer(&label)?;
        if answer.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(answer)
        }
    }

    fn number(&mut self, prompt: &str, default: Option<u64>) -> Result<u64> {
        let label = match default {
            Some(default) => format!("{prompt} [{default}]: "),
            None => format!("{prompt}: "),
        };

        let answer = self.answer(&label)?;
        match (answer.as_str(), default) {
            ("", Some(default)) => Ok(default),
            ("", None) => Err(HelperError::Argument("a value is required".to_string())),
            (text, _) => text
                .parse()
                .map_err(|_| HelperError::Argument(format!("'{text}' is not a valid integer"))),
        }
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        let answer = self.answer(&format!("{prompt} {hint}: "))?;

        match answer.to_lowercase().as_str() {
            "" => Ok(default),
            "y" | "yes" => Ok(true),
            "n" | "no" => Ok(false),
            other => Err(HelperError::Argument(format!(
                "'{other}' is not a yes/no answer"
            ))),
        }
    }
}
