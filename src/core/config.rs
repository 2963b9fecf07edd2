use crate::core::error::{ConfigError, NightlyError, NightlyResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "nightly.toml";

/// Configuration for nightly-publish, read from nightly.toml
///
/// Every section is optional; a missing file yields the built-in defaults,
/// which describe the ViewVC project hosted on GitHub.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NightlyConfig {
  #[serde(default)]
  pub source: SourceConfig,
  #[serde(default)]
  pub commands: CommandsConfig,
  #[serde(default)]
  pub build: BuildConfig,
  #[serde(default)]
  pub index: IndexConfig,
}

/// Where snapshots come from and how their version is declared
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
  /// Project name, the first component of every distribution name
  #[serde(default = "default_project")]
  pub project: String,

  /// Repository root; archives are fetched from `{root_url}/archive/{branch}.zip`
  #[serde(default = "default_root_url")]
  pub root_url: String,

  /// File (relative to the source tree) declaring the version
  #[serde(default = "default_version_file")]
  pub version_file: PathBuf,

  /// Name assigned the version string in `version_file`
  #[serde(default = "default_version_variable")]
  pub version_variable: String,
}

fn default_project() -> String {
  "viewvc".to_string()
}

fn default_root_url() -> String {
  "https://github.com/viewvc/viewvc".to_string()
}

fn default_version_file() -> PathBuf {
  PathBuf::from("lib").join("viewvc.py")
}

fn default_version_variable() -> String {
  "__version__".to_string()
}

impl Default for SourceConfig {
  fn default() -> Self {
    Self {
      project: default_project(),
      root_url: default_root_url(),
      version_file: default_version_file(),
      version_variable: default_version_variable(),
    }
  }
}

/// Argument templates for the fetch and unpack steps
///
/// Placeholders: fetch takes `{url}` and `{output}`, unpack takes `{archive}` and `{dest}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandsConfig {
  #[serde(default = "default_fetch_command")]
  pub fetch: Vec<String>,
  #[serde(default = "default_unpack_command")]
  pub unpack: Vec<String>,
}

fn default_fetch_command() -> Vec<String> {
  to_args(&[
    "curl",
    "--fail",
    "--silent",
    "--show-error",
    "--location",
    "--output",
    "{output}",
    "{url}",
  ])
}

fn default_unpack_command() -> Vec<String> {
  to_args(&["unzip", "-q", "{archive}", "-d", "{dest}"])
}

impl Default for CommandsConfig {
  fn default() -> Self {
    Self {
      fetch: default_fetch_command(),
      unpack: default_unpack_command(),
    }
  }
}

/// How the packaging script is run inside the source tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
  /// Working directory of the packaging command, relative to the source tree
  #[serde(default = "default_build_directory")]
  pub directory: PathBuf,

  /// Packaging command template (`{distname}`, `{branch}`, `{version}`)
  #[serde(default = "default_build_command")]
  pub command: Vec<String>,

  /// Directory (relative to the source tree) the archives are written to
  #[serde(default = "default_build_directory")]
  pub output_directory: PathBuf,
}

fn default_build_directory() -> PathBuf {
  PathBuf::from("tools")
}

fn default_build_command() -> Vec<String> {
  to_args(&["./make-release", "{distname}", "{branch}"])
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self {
      directory: default_build_directory(),
      command: default_build_command(),
      output_directory: default_build_directory(),
    }
  }
}

/// Index page settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
  /// Page title used by the built-in header
  #[serde(default = "default_index_title")]
  pub title: String,

  /// Replaces the built-in header (path relative to the config file)
  #[serde(default)]
  pub header: Option<PathBuf>,

  /// Replaces the built-in footer (path relative to the config file)
  #[serde(default)]
  pub footer: Option<PathBuf>,
}

fn default_index_title() -> String {
  "Nightly Snapshots".to_string()
}

impl Default for IndexConfig {
  fn default() -> Self {
    Self {
      title: default_index_title(),
      header: None,
      footer: None,
    }
  }
}

fn to_args(args: &[&str]) -> Vec<String> {
  args.iter().map(|a| a.to_string()).collect()
}

impl NightlyConfig {
  /// `nightly.toml` in `path`, if there is one
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    Some(path.join(CONFIG_FILE)).filter(|p| p.is_file())
  }

  /// Load the configuration
  ///
  /// An explicit path must exist. Without one `nightly.toml` in `search_root`
  /// is used if present, otherwise the built-in defaults.
  pub fn load(explicit: Option<&Path>, search_root: &Path) -> NightlyResult<Self> {
    let config_path = match explicit {
      Some(path) if !path.is_file() => {
        return Err(NightlyError::Config(ConfigError::NotFound {
          path: path.to_path_buf(),
        }));
      }
      Some(path) => path.to_path_buf(),
      None => match Self::find_config_path(search_root) {
        Some(path) => path,
        None => {
          tracing::debug!("no nightly.toml found under {}, using defaults", search_root.display());
          let config = Self::default();
          config.validate()?;
          return Ok(config);
        }
      },
    };

    tracing::debug!("loading configuration from {}", config_path.display());
    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let mut config =
      Self::parse(&content).with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    if let Some(base) = config_path.parent() {
      config.index.resolve_templates(base);
    }
    config.validate()?;

    Ok(config)
  }

  /// Parse configuration from TOML text
  pub fn parse(content: &str) -> NightlyResult<Self> {
    Ok(toml_edit::de::from_str(content)?)
  }

  /// Check that the configuration can drive a run
  pub fn validate(&self) -> NightlyResult<()> {
    if self.source.project.trim().is_empty() {
      return Err(invalid("source.project", "must not be empty"));
    }
    if self.source.root_url.trim().is_empty() {
      return Err(invalid("source.root_url", "must not be empty"));
    }
    if self.source.version_variable.trim().is_empty() {
      return Err(invalid("source.version_variable", "must not be empty"));
    }

    require_placeholders("commands.fetch", &self.commands.fetch, &["{output}"])?;
    require_placeholders("commands.unpack", &self.commands.unpack, &["{archive}", "{dest}"])?;
    require_placeholders("build.command", &self.build.command, &[])?;

    Ok(())
  }
}

impl IndexConfig {
  fn resolve_templates(&mut self, base: &Path) {
    for template in [&mut self.header, &mut self.footer].into_iter().flatten() {
      if template.is_relative() {
        *template = base.join(&*template);
      }
    }
  }
}

fn invalid(field: &str, reason: &str) -> NightlyError {
  NightlyError::Config(ConfigError::Invalid {
    field: field.to_string(),
    reason: reason.to_string(),
  })
}

fn require_placeholders(field: &str, template: &[String], placeholders: &[&str]) -> NightlyResult<()> {
  if template.is_empty() || template[0].trim().is_empty() {
    return Err(invalid(field, "must name a program to run"));
  }

  for placeholder in placeholders {
    if !template.iter().any(|arg| arg.contains(placeholder)) {
      return Err(NightlyError::Config(ConfigError::MissingPlaceholder {
        field: field.to_string(),
        placeholder: placeholder.to_string(),
      }));
    }
  }

  Ok(())
}
