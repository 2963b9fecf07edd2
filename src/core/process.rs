//! External command execution
//!
//! Fetching, unpacking and packaging are delegated to system programs. Each
//! is described by an argument template from the configuration; placeholders
//! such as `{url}` are substituted before spawning. Every invocation:
//! - runs with an explicit working directory (never `std::env::set_current_dir`)
//! - captures stdout/stderr (stdout is only logged at debug level)
//! - has its exit status checked

use crate::core::error::{CommandError, NightlyError, NightlyResult};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// A fully substituted command line, ready to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
  program: String,
  args: Vec<String>,
  current_dir: Option<PathBuf>,
}

impl ExternalCommand {
  /// Build a command from a template, replacing `{name}` placeholders
  pub fn from_template(template: &[String], vars: &[(&str, &str)]) -> NightlyResult<Self> {
    let mut words = template.iter().map(|word| substitute(word, vars));
    let program = words
      .next()
      .filter(|p| !p.trim().is_empty())
      .ok_or_else(|| NightlyError::message("Command template is empty"))?;

    Ok(Self {
      program,
      args: words.collect(),
      current_dir: None,
    })
  }

  /// Run the command from `dir` instead of the tool's own working directory
  pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.current_dir = Some(dir.into());
    self
  }

  pub fn program(&self) -> &str {
    &self.program
  }

  pub fn args(&self) -> &[String] {
    &self.args
  }

  /// Human-readable command line for messages
  pub fn display(&self) -> String {
    std::iter::once(self.program())
      .chain(self.args().iter().map(String::as_str))
      .collect::<Vec<_>>()
      .join(" ")
  }

  /// Run to completion, failing on spawn errors and non-zero exits
  pub fn run(&self) -> NightlyResult<Output> {
    let mut cmd = Command::new(&self.program);
    cmd.args(&self.args);
    if let Some(dir) = &self.current_dir {
      cmd.current_dir(dir);
    }

    tracing::debug!(
      "running `{}`{}",
      self.display(),
      self
        .current_dir
        .as_deref()
        .map(|d| format!(" in {}", d.display()))
        .unwrap_or_default()
    );

    let output = cmd.output().map_err(|source| {
      NightlyError::Command(CommandError::Spawn {
        command: self.display(),
        source,
      })
    })?;

    log_stream("stdout", &output.stdout);
    log_stream("stderr", &output.stderr);

    if !output.status.success() {
      return Err(NightlyError::Command(CommandError::Failed {
        command: self.display(),
        status: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
      }));
    }

    Ok(output)
  }

  /// Run, then require that `path` exists afterwards
  pub fn run_expecting(&self, path: &Path) -> NightlyResult<Output> {
    let output = self.run()?;
    if !path.exists() {
      return Err(NightlyError::Command(CommandError::OutputMissing {
        command: self.display(),
        path: path.to_path_buf(),
      }));
    }
    Ok(output)
  }
}

/// Replace `{name}` tokens of the template word in one left-to-right pass
///
/// Substituted values are never rescanned. Unknown names and unmatched braces
/// are kept as written.
fn substitute(word: &str, vars: &[(&str, &str)]) -> String {
  let mut out = String::with_capacity(word.len());
  let mut rest = word;

  while let Some(open) = rest.find('{') {
    out.push_str(&rest[..open]);
    let token = &rest[open..];
    let value = token[1..].find('}').and_then(|close| {
      let name = &token[1..=close];
      vars
        .iter()
        .find(|(var, _)| *var == name)
        .map(|(_, value)| (*value, close + 2))
    });

    match value {
      Some((value, len)) => {
        out.push_str(value);
        rest = &token[len..];
      }
      None => {
        out.push('{');
        rest = &token[1..];
      }
    }
  }

  out.push_str(rest);
  out
}

fn log_stream(name: &str, bytes: &[u8]) {
  let text = String::from_utf8_lossy(bytes);
  let text = text.trim_end();
  if !text.is_empty() {
    tracing::debug!("{}: {}", name, text);
  }
}
