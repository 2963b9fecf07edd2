//! Running the packaging script and collecting its archives

use crate::core::config::BuildConfig;
use crate::core::error::NightlyResult;
use crate::core::process::ExternalCommand;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// The two archive formats a release is published in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArchiveKind {
  TarGz,
  Zip,
}

impl ArchiveKind {
  /// All kinds, in the order they are built, published and linked
  pub const ALL: [ArchiveKind; 2] = [ArchiveKind::TarGz, ArchiveKind::Zip];

  /// File extension, including the leading dot
  pub fn extension(self) -> &'static str {
    match self {
      ArchiveKind::TarGz => ".tar.gz",
      ArchiveKind::Zip => ".zip",
    }
  }
}

impl fmt::Display for ArchiveKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.extension()[1..])
  }
}

/// Identity of one nightly build: `{project}-{version}-{date}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
  pub project: String,
  pub version: String,
  pub date: String,
}

impl Distribution {
  pub fn new(project: impl Into<String>, version: impl Into<String>, date: impl Into<String>) -> Self {
    Self {
      project: project.into(),
      version: version.into(),
      date: date.into(),
    }
  }

  /// Distribution base name shared by both archives
  pub fn name(&self) -> String {
    format!("{}-{}-{}", self.project, self.version, self.date)
  }

  /// Whether a published `kind` archive named `file_name` is replaced by this build
  ///
  /// That is any name starting with this distribution's base name, plus older
  /// nightlies of the same version: `{project}-{version}-` followed by exactly
  /// eight digits and the extension. Other versions never match, even when
  /// their version string extends this one (`1.3-dev` for `1.3`).
  pub fn supersedes(&self, file_name: &str, kind: ArchiveKind) -> bool {
    let Some(stem) = file_name.strip_suffix(kind.extension()) else {
      return false;
    };
    if stem.starts_with(&self.name()) {
      return true;
    }
    stem
      .strip_prefix(&format!("{}-{}-", self.project, self.version))
      .is_some_and(|date| date.len() == 8 && date.bytes().all(|b| b.is_ascii_digit()))
  }

  pub fn archive_name(&self, kind: ArchiveKind) -> String {
    format!("{}{}", self.name(), kind.extension())
  }
}

/// An archive the packaging script left in the source tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltArchive {
  pub kind: ArchiveKind,
  pub path: PathBuf,
}

/// Run the packaging command for `distribution` inside `tree`
///
/// Returns the archives that exist afterwards. Either may be missing; that is
/// not an error here, the caller decides what an empty build means.
pub fn build_release(
  tree: &Path,
  branch: &str,
  distribution: &Distribution,
  config: &BuildConfig,
) -> NightlyResult<Vec<BuiltArchive>> {
  let distname = distribution.name();

  ExternalCommand::from_template(&config.command, &[
    ("distname", distname.as_str()),
    ("branch", branch),
    ("version", distribution.version.as_str()),
  ])?
  .current_dir(tree.join(&config.directory))
  .run()?;

  Ok(collect_archives(&tree.join(&config.output_directory), distribution))
}

/// Archives for `distribution` present in `output_dir`
pub fn collect_archives(output_dir: &Path, distribution: &Distribution) -> Vec<BuiltArchive> {
  ArchiveKind::ALL
    .iter()
    .filter_map(|&kind| {
      let path = output_dir.join(distribution.archive_name(kind));
      if path.is_file() {
        Some(BuiltArchive { kind, path })
      } else {
        tracing::debug!("no {} archive at {}", kind, path.display());
        None
      }
    })
    .collect()
}
