//! Test helpers for integration tests
//!
//! Nothing touches the network: the "upstream" is a local directory laid out
//! as `{root}/archive/{branch}.zip/{project}-{branch}/...` (a directory that
//! stands in for the zip), fetched and unpacked with `cp`, and packaged by a
//! small `sh` script.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Packaging script: `$1` is the distribution name, `$2` the branch.
/// `SKIP_TGZ` / `SKIP_ZIP` marker files suppress one of the archives.
const MAKE_RELEASE: &str = r#"#!/bin/sh
set -e
if [ ! -f SKIP_TGZ ]; then echo "$2 tarball" > "$1.tar.gz"; fi
if [ ! -f SKIP_ZIP ]; then echo "$2 zipfile" > "$1.zip"; fi
"#;

/// A fake upstream repository plus a working directory holding nightly.toml
pub struct TestUpstream {
  _root: TempDir,
  pub upstream: PathBuf,
  pub workdir: PathBuf,
  pub publish_dir: PathBuf,
  /// TMPDIR of the tool, so leftover scratch directories are visible
  pub scratch_root: PathBuf,
}

impl TestUpstream {
  /// Create an upstream with no branches and a matching nightly.toml
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let upstream = root.path().join("upstream");
    let workdir = root.path().join("work");
    let publish_dir = root.path().join("www");
    let scratch_root = root.path().join("tmp");
    std::fs::create_dir_all(upstream.join("archive"))?;
    std::fs::create_dir_all(&workdir)?;
    std::fs::create_dir_all(&scratch_root)?;

    let config = format!(
      r#"[source]
project = "viewvc"
root_url = "{}"

[commands]
fetch = ["cp", "-R", "{{url}}", "{{output}}"]
unpack = ["cp", "-R", "{{archive}}/.", "{{dest}}"]

[build]
command = ["sh", "make-release", "{{distname}}", "{{branch}}"]
"#,
      upstream.display()
    );
    std::fs::write(workdir.join("nightly.toml"), config)?;

    Ok(Self {
      _root: root,
      upstream,
      workdir,
      publish_dir,
      scratch_root,
    })
  }

  /// Add a branch whose lib/viewvc.py declares `version`
  pub fn add_branch(&self, branch: &str, version: &str) -> Result<PathBuf> {
    self.add_branch_with_source(branch, &format!("import sys\n__version__ = \"{}\"\n", version))
  }

  /// Add a branch with arbitrary lib/viewvc.py contents
  pub fn add_branch_with_source(&self, branch: &str, viewvc_py: &str) -> Result<PathBuf> {
    let tree = self
      .upstream
      .join("archive")
      .join(format!("{}.zip", branch))
      .join(format!("viewvc-{}", branch));
    std::fs::create_dir_all(tree.join("lib"))?;
    std::fs::create_dir_all(tree.join("tools"))?;
    std::fs::write(tree.join("lib").join("viewvc.py"), viewvc_py)?;
    std::fs::write(tree.join("tools").join("make-release"), MAKE_RELEASE)?;
    Ok(tree)
  }

  /// Make a branch's packaging script skip one archive ("tgz" or "zip")
  pub fn skip_archive(&self, branch: &str, kind: &str) -> Result<()> {
    let marker = format!("SKIP_{}", kind.to_uppercase());
    let tools = self
      .upstream
      .join("archive")
      .join(format!("{}.zip", branch))
      .join(format!("viewvc-{}", branch))
      .join("tools");
    std::fs::write(tools.join(marker), "")?;
    Ok(())
  }

  /// Names in the publish directory, sorted
  pub fn published(&self) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(&self.publish_dir).context("publish dir missing")? {
      names.push(entry?.file_name().to_string_lossy().to_string());
    }
    names.sort();
    Ok(names)
  }

  /// Read a file from the publish directory
  pub fn read_published(&self, name: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.publish_dir.join(name))?)
  }

  /// Scratch directories left behind in the tool's TMPDIR
  pub fn leftover_scratch(&self) -> Result<usize> {
    Ok(std::fs::read_dir(&self.scratch_root)?.count())
  }

  /// Run the tool for `branches`, dated 2026-10-16, failing on a non-zero exit
  pub fn run(&self, branches: &[&str]) -> Result<Output> {
    self.run_dated("20261016", branches)
  }

  /// Run the tool for `branches` with the given date stamp
  pub fn run_dated(&self, date: &str, branches: &[&str]) -> Result<Output> {
    let output = self.run_raw(&["--date", date], branches)?;
    check_success(&output, branches)?;
    Ok(output)
  }

  /// Run the tool with extra options and return its output whatever the exit status
  pub fn run_raw(&self, options: &[&str], branches: &[&str]) -> Result<Output> {
    let publish = self.publish_dir.to_string_lossy().to_string();
    let mut args: Vec<&str> = options.to_vec();
    args.push(publish.as_str());
    args.extend_from_slice(branches);

    Command::new(env!("CARGO_BIN_EXE_nightly-publish"))
      .current_dir(&self.workdir)
      .env("TMPDIR", &self.scratch_root)
      .args(&args)
      .output()
      .context("Failed to run nightly-publish")
  }
}

fn check_success(output: &Output, args: &[&str]) -> Result<()> {
  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "nightly-publish failed: nightly-publish {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }
  Ok(())
}

/// Run nightly-publish, failing unless it exits successfully
pub fn run_nightly(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_nightly_raw(cwd, args)?;
  check_success(&output, args)?;
  Ok(output)
}

/// Run nightly-publish and return its output whatever the exit status
pub fn run_nightly_raw(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_nightly-publish");

  Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run nightly-publish")
}
