//! Installing built archives into the publish directory
//!
//! A new nightly supersedes every older nightly of the same version: before
//! an archive is moved in, published files it supersedes (see
//! [`Distribution::supersedes`]) are deleted. Only the same archive kind is
//! touched and other versions are never removed.

use crate::core::error::{NightlyResult, ResultExt};
use crate::release::build::{ArchiveKind, BuiltArchive, Distribution};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;

/// An archive installed in the publish directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedArchive {
  pub kind: ArchiveKind,
  pub file_name: String,
  pub size: u64,
}

/// Result of publishing one build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishOutcome {
  pub archives: Vec<PublishedArchive>,
  /// Superseded file names that were deleted
  pub removed: Vec<String>,
}

/// Supersede and install every archive of one build
pub fn publish_archives(
  publish_dir: &Path,
  distribution: &Distribution,
  built: &[BuiltArchive],
) -> NightlyResult<PublishOutcome> {
  fs::create_dir_all(publish_dir).with_context(|| format!("Failed to create {}", publish_dir.display()))?;

  let mut outcome = PublishOutcome::default();

  for archive in built {
    outcome
      .removed
      .extend(remove_superseded(publish_dir, distribution, archive.kind)?);

    let file_name = distribution.archive_name(archive.kind);
    let target = publish_dir.join(&file_name);
    move_file(&archive.path, &target)
      .with_context(|| format!("Failed to move {} to {}", archive.path.display(), target.display()))?;

    let size = fs::metadata(&target)?.len();
    tracing::debug!("published {} ({} bytes)", file_name, size);

    outcome.archives.push(PublishedArchive {
      kind: archive.kind,
      file_name,
      size,
    });
  }

  Ok(outcome)
}

/// Delete the `kind` archives in `publish_dir` that `distribution` supersedes
///
/// Returns the deleted file names, sorted.
pub fn remove_superseded(
  publish_dir: &Path,
  distribution: &Distribution,
  kind: ArchiveKind,
) -> NightlyResult<Vec<String>> {
  let mut removed = Vec::new();

  for entry in fs::read_dir(publish_dir).with_context(|| format!("Failed to list {}", publish_dir.display()))? {
    let entry = entry?;
    let name = entry.file_name();
    let Some(name) = name.to_str() else {
      continue;
    };
    if !distribution.supersedes(name, kind) || !entry.file_type()?.is_file() {
      continue;
    }

    fs::remove_file(entry.path()).with_context(|| format!("Failed to remove superseded {}", name))?;
    tracing::debug!("removed superseded {}", name);
    removed.push(name.to_string());
  }

  removed.sort();
  Ok(removed)
}

/// Rename, falling back to copy + delete when crossing filesystems
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
  match fs::rename(from, to) {
    Ok(()) => Ok(()),
    Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
      tracing::debug!("{} is on another filesystem, copying", from.display());
      fs::copy(from, to)?;
      fs::remove_file(from)
    }
    Err(e) => Err(e),
  }
}
