//! Reading the release version from a source file
//!
//! The version is declared as a plain assignment, e.g. `__version__ = '1.2.3'`.
//! The file is scanned line by line and the first declaration wins.

use crate::core::error::{BuildError, NightlyError, NightlyResult, ResultExt};
use regex::Regex;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Matcher for `name = "value"` / `name = 'value'` declarations
#[derive(Debug, Clone)]
pub struct VersionPattern {
  variable: String,
  regex: Regex,
}

impl VersionPattern {
  /// Build a matcher for assignments to `variable`
  pub fn for_variable(variable: &str) -> NightlyResult<Self> {
    let pattern = format!(
      r#"^\s*{}\s*=\s*(?:"([^"]*)"|'([^']*)')"#,
      regex::escape(variable)
    );
    Ok(Self {
      variable: variable.to_string(),
      regex: Regex::new(&pattern)?,
    })
  }

  pub fn variable(&self) -> &str {
    &self.variable
  }

  /// Value declared on `line`, if the line is a declaration
  pub fn match_line<'a>(&self, line: &'a str) -> Option<&'a str> {
    let caps = self.regex.captures(line)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
  }
}

/// Return the first declared version in `path`
pub fn extract_version(path: &Path, pattern: &VersionPattern) -> NightlyResult<String> {
  let file = match File::open(path) {
    Ok(file) => file,
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      return Err(NightlyError::Build(BuildError::VersionFileMissing {
        path: path.to_path_buf(),
      }));
    }
    Err(e) => return Err(NightlyError::Io(e).context(format!("Failed to open {}", path.display()))),
  };

  for line in BufReader::new(file).lines() {
    let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
    if let Some(version) = pattern.match_line(&line) {
      return Ok(version.to_string());
    }
  }

  Err(NightlyError::Build(BuildError::VersionNotFound {
    path: path.to_path_buf(),
    variable: pattern.variable().to_string(),
  }))
}
