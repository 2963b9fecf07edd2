//! Error types for nightly-publish with contextual messages
//!
//! Every failure the tool can report funnels into [`NightlyError`]. Each
//! category may carry a help message that `print_error` shows under the
//! error itself. All errors end the run with exit status 1.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit status for any failed run (usage errors included)
pub const EXIT_FAILURE: i32 = 1;

/// Main error type for nightly-publish
#[derive(Debug)]
pub enum NightlyError {
  /// Configuration errors
  Config(ConfigError),

  /// Release build errors (version metadata, source tree layout)
  Build(BuildError),

  /// External command errors (fetch, unpack, packaging script)
  Command(CommandError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl NightlyError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    NightlyError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    NightlyError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  ///
  /// Typed errors already describe themselves; only plain messages and I/O
  /// errors pick up the extra context line.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      NightlyError::Message { message, context, help } => NightlyError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      NightlyError::Io(err) => NightlyError::Message {
        message: ctx_str,
        context: Some(format!("I/O error: {}", err)),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the process exit status for this error
  pub fn exit_code(&self) -> i32 {
    EXIT_FAILURE
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      NightlyError::Config(e) => e.help_message(),
      NightlyError::Build(e) => e.help_message(),
      NightlyError::Command(e) => e.help_message(),
      NightlyError::Message { help, .. } => help.clone(),
      NightlyError::Io(_) => None,
    }
  }
}

impl fmt::Display for NightlyError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      NightlyError::Config(e) => write!(f, "{}", e),
      NightlyError::Build(e) => write!(f, "{}", e),
      NightlyError::Command(e) => write!(f, "{}", e),
      NightlyError::Io(e) => write!(f, "I/O error: {}", e),
      NightlyError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for NightlyError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      NightlyError::Io(e) => Some(e),
      NightlyError::Command(CommandError::Spawn { source, .. }) => Some(source),
      _ => None,
    }
  }
}

impl From<io::Error> for NightlyError {
  fn from(err: io::Error) -> Self {
    NightlyError::Io(err)
  }
}

impl From<String> for NightlyError {
  fn from(msg: String) -> Self {
    NightlyError::message(msg)
  }
}

impl From<&str> for NightlyError {
  fn from(msg: &str) -> Self {
    NightlyError::message(msg)
  }
}

impl From<ConfigError> for NightlyError {
  fn from(err: ConfigError) -> Self {
    NightlyError::Config(err)
  }
}

impl From<BuildError> for NightlyError {
  fn from(err: BuildError) -> Self {
    NightlyError::Build(err)
  }
}

impl From<CommandError> for NightlyError {
  fn from(err: CommandError) -> Self {
    NightlyError::Command(err)
  }
}

impl From<toml_edit::de::Error> for NightlyError {
  fn from(err: toml_edit::de::Error) -> Self {
    NightlyError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for NightlyError {
  fn from(err: serde_json::Error) -> Self {
    NightlyError::message(format!("JSON error: {}", err))
  }
}

impl From<regex::Error> for NightlyError {
  fn from(err: regex::Error) -> Self {
    NightlyError::message(format!("Pattern error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Explicitly requested config file does not exist
  NotFound { path: PathBuf },

  /// A field holds a value the tool cannot use
  Invalid { field: String, reason: String },

  /// A command template lacks a placeholder the tool must fill in
  MissingPlaceholder { field: String, placeholder: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => Some(
        "Check the --config path, or omit it to use nightly.toml from the current directory.".to_string(),
      ),
      ConfigError::MissingPlaceholder { placeholder, .. } => Some(format!(
        "Add an argument containing {} to the command template.",
        placeholder
      )),
      ConfigError::Invalid { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { path } => {
        write!(f, "Configuration file not found: {}", path.display())
      }
      ConfigError::Invalid { field, reason } => {
        write!(f, "Invalid configuration value for {}: {}", field, reason)
      }
      ConfigError::MissingPlaceholder { field, placeholder } => {
        write!(f, "Command template {} never uses {}", field, placeholder)
      }
    }
  }
}

/// Release build errors
#[derive(Debug)]
pub enum BuildError {
  /// The file expected to declare the version does not exist
  VersionFileMissing { path: PathBuf },

  /// The version file exists but declares no version
  VersionNotFound { path: PathBuf, variable: String },

  /// The unpacked archive did not contain a source tree
  SourceTreeMissing { path: PathBuf },
}

impl BuildError {
  fn help_message(&self) -> Option<String> {
    match self {
      BuildError::VersionFileMissing { .. } => {
        Some("Set source.version_file in nightly.toml to the file declaring the version.".to_string())
      }
      BuildError::VersionNotFound { variable, .. } => Some(format!(
        "Expected a line such as: {} = \"1.2.3\" (or set source.version_variable)",
        variable
      )),
      BuildError::SourceTreeMissing { .. } => {
        Some("Check that the branch exists and the unpack command produces a directory.".to_string())
      }
    }
  }
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildError::VersionFileMissing { path } => {
        write!(f, "Version file not found: {}", path.display())
      }
      BuildError::VersionNotFound { path, variable } => {
        write!(f, "Unable to find {} in {}", variable, path.display())
      }
      BuildError::SourceTreeMissing { path } => {
        write!(f, "No source tree found in {}", path.display())
      }
    }
  }
}

/// External command errors
#[derive(Debug)]
pub enum CommandError {
  /// The program could not be started at all
  Spawn { command: String, source: io::Error },

  /// The program ran and exited unsuccessfully
  Failed {
    command: String,
    status: Option<i32>,
    stderr: String,
  },

  /// The program succeeded but did not produce the file it was asked for
  OutputMissing { command: String, path: PathBuf },
}

impl CommandError {
  fn help_message(&self) -> Option<String> {
    match self {
      CommandError::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound => {
        Some("Make sure the program is installed and on PATH, or change it in nightly.toml.".to_string())
      }
      CommandError::Failed { stderr, .. } if stderr.contains("404") => {
        Some("The branch archive was not found. Check the branch name and source.root_url.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for CommandError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CommandError::Spawn { command, source } => {
        write!(f, "Failed to run {}: {}", command, source)
      }
      CommandError::Failed { command, status, stderr } => {
        match status {
          Some(code) => write!(f, "Command failed with exit status {}: {}", code, command)?,
          None => write!(f, "Command terminated by signal: {}", command)?,
        }
        let stderr = stderr.trim();
        if !stderr.is_empty() {
          write!(f, "\n{}", stderr)?;
        }
        Ok(())
      }
      CommandError::OutputMissing { command, path } => {
        write!(f, "{} did not produce {}", command, path.display())
      }
    }
  }
}

/// Result type alias for nightly-publish
pub type NightlyResult<T> = Result<T, NightlyError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> NightlyResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> NightlyResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<NightlyError>,
{
  fn context(self, ctx: impl Into<String>) -> NightlyResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> NightlyResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &NightlyError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
