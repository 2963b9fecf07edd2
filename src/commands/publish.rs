//! The nightly publish run: every branch, then the index page

use crate::core::config::NightlyConfig;
use crate::core::error::{NightlyError, NightlyResult, ResultExt};
use crate::release::index::{IndexTemplate, write_index};
use crate::release::{BranchRelease, PublishTarget, release_branch};
use crate::utils::today_stamp;
use std::env;
use std::path::PathBuf;

/// Options for one run, as given on the command line
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
  pub publish_dir: PathBuf,
  pub branches: Vec<String>,
  pub config_path: Option<PathBuf>,
  pub root_url: Option<String>,
  pub project: Option<String>,
  pub date: Option<String>,
  pub json: bool,
}

/// Run the publish command
pub fn run_publish(options: PublishOptions) -> NightlyResult<()> {
  let cwd = env::current_dir().context("Failed to get current directory")?;

  let mut config = NightlyConfig::load(options.config_path.as_deref(), &cwd)?;
  if let Some(root_url) = options.root_url {
    config.source.root_url = root_url;
  }
  if let Some(project) = options.project {
    config.source.project = project;
  }
  config.validate()?;

  if options.publish_dir.exists() && !options.publish_dir.is_dir() {
    return Err(NightlyError::with_help(
      format!("Publish directory {} is not a directory", options.publish_dir.display()),
      "Pass the directory the archives and index.html should be written to.",
    ));
  }

  // Read templates before any branch is built
  let template = IndexTemplate::from_config(&config.index)?;

  let date = options.date.unwrap_or_else(today_stamp);
  let scratch_root = env::temp_dir();
  let target = PublishTarget {
    publish_dir: &options.publish_dir,
    date: &date,
    scratch_root: &scratch_root,
  };

  let quiet = options.json;
  let total = options.branches.len();
  let mut releases = Vec::with_capacity(total);

  for (idx, branch) in options.branches.iter().enumerate() {
    if !quiet {
      println!("📦 [{}/{}] {}", idx + 1, total, branch);
    }

    let release = release_branch(&config, &target, branch)?;

    if !quiet {
      print_release(&release);
    }
    releases.push(release);
  }

  let index_path = write_index(&options.publish_dir, &template.render(&releases))?;

  if quiet {
    println!("{}", serde_json::to_string_pretty(&releases)?);
  } else {
    println!("📝 Wrote {}", index_path.display());
    println!();
    println!(
      "🎉 Published {} archive(s) for {} branch(es)",
      releases.iter().map(|r| r.archives.len()).sum::<usize>(),
      releases.len()
    );
  }

  Ok(())
}

fn print_release(release: &BranchRelease) {
  println!("   Version: {} ({})", release.version, release.distname);
  for name in &release.removed {
    println!("   🗑️  Superseded {}", name);
  }
  if release.archives.is_empty() {
    println!("   ⚠️  No archives were produced");
  }
  for archive in &release.archives {
    println!("   ✅ {} ({})", archive.file_name, format_size(archive.size));
  }
  println!();
}

fn format_size(bytes: u64) -> String {
  const KIB: f64 = 1024.0;
  const MIB: f64 = KIB * 1024.0;
  let b = bytes as f64;
  if b >= MIB {
    format!("{:.1} MiB", b / MIB)
  } else if b >= KIB {
    format!("{:.1} KiB", b / KIB)
  } else {
    format!("{} B", bytes)
  }
}
