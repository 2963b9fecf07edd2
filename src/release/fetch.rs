//! Fetching and unpacking branch snapshots

use crate::core::config::NightlyConfig;
use crate::core::error::{BuildError, NightlyError, NightlyResult, ResultExt};
use crate::core::process::ExternalCommand;
use crate::utils::{branch_file_stem, escape_url_path};
use std::fs;
use std::path::{Path, PathBuf};

/// Subdirectory of the scratch directory the archive is unpacked into
pub const UNPACK_DIR: &str = "source";

/// Download URL of a branch archive: `{root_url}/archive/{branch}.zip`
pub fn archive_url(root_url: &str, branch: &str) -> String {
  format!(
    "{}/archive/{}.zip",
    root_url.trim_end_matches('/'),
    escape_url_path(branch)
  )
}

/// Download and unpack `branch` into `scratch`, returning the source tree root
pub fn fetch_source(config: &NightlyConfig, branch: &str, scratch: &Path) -> NightlyResult<PathBuf> {
  let url = archive_url(&config.source.root_url, branch);
  let archive = scratch.join(format!("{}.zip", branch_file_stem(branch)));
  let archive_str = archive.to_string_lossy();

  ExternalCommand::from_template(&config.commands.fetch, &[("url", url.as_str()), ("output", &*archive_str)])?
    .current_dir(scratch)
    .run_expecting(&archive)?;

  let dest = scratch.join(UNPACK_DIR);
  fs::create_dir_all(&dest).with_context(|| format!("Failed to create {}", dest.display()))?;
  let dest_str = dest.to_string_lossy();

  ExternalCommand::from_template(&config.commands.unpack, &[("archive", &*archive_str), ("dest", &*dest_str)])?
    .current_dir(scratch)
    .run()?;

  locate_source_tree(&dest)
}

/// Find the root of an unpacked archive
///
/// Hosted branch archives wrap everything in one `{repo}-{branch}` directory;
/// when the unpacked directory holds exactly one subdirectory and nothing else,
/// that subdirectory is the tree. Otherwise the unpacked directory itself is.
pub fn locate_source_tree(dest: &Path) -> NightlyResult<PathBuf> {
  let entries = fs::read_dir(dest)
    .with_context(|| format!("Failed to list {}", dest.display()))?
    .collect::<Result<Vec<_>, _>>()?;

  if entries.is_empty() {
    return Err(NightlyError::Build(BuildError::SourceTreeMissing {
      path: dest.to_path_buf(),
    }));
  }

  if let [only] = entries.as_slice()
    && only.file_type()?.is_dir()
  {
    return Ok(only.path());
  }

  Ok(dest.to_path_buf())
}
