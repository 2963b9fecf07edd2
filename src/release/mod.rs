//! Nightly snapshot pipeline
//!
//! One branch goes through these stages, strictly in order:
//!
//! 1. **fetch**: download `{root_url}/archive/{branch}.zip` and unpack it
//! 2. **version**: read the declared version from the source tree
//! 3. **build**: run the packaging script for `{project}-{version}-{date}`
//! 4. **publish**: supersede older nightlies and move the archives in
//!
//! Everything fetched or built lives in a per-branch scratch directory that is
//! removed before [`release_branch`] returns, whether it succeeded or not.
//! The **index** module renders the page linking every branch of a run.

pub mod build;
pub mod fetch;
pub mod index;
pub mod publish;
pub mod version;

use crate::core::config::NightlyConfig;
use crate::core::error::{NightlyError, NightlyResult, ResultExt};
use serde::Serialize;
use std::path::Path;

pub use build::Distribution;
pub use publish::PublishedArchive;

/// Prefix of per-branch scratch directory names
pub const SCRATCH_PREFIX: &str = "nightly-";

/// What one branch contributed to a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchRelease {
  pub branch: String,
  pub version: String,
  pub distname: String,
  pub archives: Vec<PublishedArchive>,
  pub removed: Vec<String>,
}

/// Where and when a run publishes
#[derive(Debug, Clone)]
pub struct PublishTarget<'a> {
  pub publish_dir: &'a Path,
  /// YYYYMMDD stamp used in distribution names
  pub date: &'a str,
  /// Parent directory for scratch directories
  pub scratch_root: &'a Path,
}

/// Fetch, build and publish one branch inside a fresh scratch directory
pub fn release_branch(
  config: &NightlyConfig,
  target: &PublishTarget<'_>,
  branch: &str,
) -> NightlyResult<BranchRelease> {
  let scratch = tempfile::Builder::new()
    .prefix(SCRATCH_PREFIX)
    .tempdir_in(target.scratch_root)
    .with_context(|| format!("Failed to create scratch directory in {}", target.scratch_root.display()))?;
  let scratch_path = scratch.path().to_path_buf();
  tracing::debug!("branch {}: scratch directory {}", branch, scratch_path.display());

  let result = release_in(config, target, branch, &scratch_path);

  match (scratch.close(), result) {
    (Ok(()), result) => result,
    (Err(e), Ok(_)) => Err(NightlyError::Io(e).context(format!(
      "Failed to remove scratch directory {}",
      scratch_path.display()
    ))),
    (Err(e), Err(err)) => {
      tracing::warn!("failed to remove scratch directory {}: {}", scratch_path.display(), e);
      Err(err)
    }
  }
}

fn release_in(
  config: &NightlyConfig,
  target: &PublishTarget<'_>,
  branch: &str,
  scratch: &Path,
) -> NightlyResult<BranchRelease> {
  let tree = fetch::fetch_source(config, branch, scratch)?;
  tracing::debug!("branch {}: source tree at {}", branch, tree.display());

  let pattern = version::VersionPattern::for_variable(&config.source.version_variable)?;
  let version = version::extract_version(&tree.join(&config.source.version_file), &pattern)?;
  let distribution = Distribution::new(&config.source.project, &version, target.date);
  tracing::debug!("branch {}: building {}", branch, distribution.name());

  let built = build::build_release(&tree, branch, &distribution, &config.build)?;
  if built.is_empty() {
    tracing::warn!("branch {}: packaging produced no archives for {}", branch, distribution.name());
  }

  let outcome = publish::publish_archives(target.publish_dir, &distribution, &built)?;

  Ok(BranchRelease {
    branch: branch.to_string(),
    version,
    distname: distribution.name(),
    archives: outcome.archives,
    removed: outcome.removed,
  })
}
