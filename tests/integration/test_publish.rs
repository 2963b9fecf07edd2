//! Integration tests for full publish runs

use crate::helpers::TestUpstream;
use anyhow::Result;

#[test]
fn test_single_branch_end_to_end() -> Result<()> {
  let up = TestUpstream::new()?;
  up.add_branch("trunk", "1.2.3")?;

  let output = up.run(&["trunk"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("viewvc-1.2.3-20261016"), "got: {}", stdout);

  assert_eq!(
    up.published()?,
    vec!["index.html", "viewvc-1.2.3-20261016.tar.gz", "viewvc-1.2.3-20261016.zip"]
  );
  assert_eq!(up.read_published("viewvc-1.2.3-20261016.tar.gz")?.trim(), "trunk tarball");
  assert_eq!(up.leftover_scratch()?, 0);

  Ok(())
}

#[test]
fn test_two_branches_index() -> Result<()> {
  let up = TestUpstream::new()?;
  up.add_branch("trunk", "1.3.0-dev")?;
  up.add_branch("1.2.x", "1.2.4-dev")?;

  up.run(&["trunk", "1.2.x"])?;

  let index = up.read_published("index.html")?;
  assert_eq!(index.matches("<!DOCTYPE html>").count(), 1);
  assert_eq!(index.matches("</html>").count(), 1);
  assert_eq!(index.matches("class=\"branch\"").count(), 2);
  assert_eq!(index.matches("<li><a href=").count(), 4);

  let trunk = index.find("<strong>trunk</strong>").expect("trunk fragment");
  let maint = index.find("<strong>1.2.x</strong>").expect("1.2.x fragment");
  assert!(trunk < maint, "fragments should follow argument order");
  assert!(index.contains("href=\"viewvc-1.3.0-dev-20261016.zip\""));
  assert!(index.contains("href=\"viewvc-1.2.4-dev-20261016.tar.gz\""));
  assert_eq!(up.leftover_scratch()?, 0);

  Ok(())
}

#[test]
fn test_next_nightly_supersedes_previous() -> Result<()> {
  let up = TestUpstream::new()?;
  up.add_branch("trunk", "1.3.0-dev")?;
  up.add_branch("1.2.x", "1.2.4-dev")?;

  up.run_dated("20261015", &["trunk", "1.2.x"])?;
  up.run_dated("20261016", &["trunk"])?;

  assert_eq!(
    up.published()?,
    vec![
      "index.html",
      "viewvc-1.2.4-dev-20261015.tar.gz",
      "viewvc-1.2.4-dev-20261015.zip",
      "viewvc-1.3.0-dev-20261016.tar.gz",
      "viewvc-1.3.0-dev-20261016.zip",
    ]
  );

  // the index only describes the latest run
  let index = up.read_published("index.html")?;
  assert!(index.contains("<strong>trunk</strong>"));
  assert!(!index.contains("<strong>1.2.x</strong>"));

  Ok(())
}

#[test]
fn test_version_extending_another_is_not_superseded() -> Result<()> {
  let up = TestUpstream::new()?;
  up.add_branch("trunk", "1.3-dev")?;
  up.add_branch("1.3.x", "1.3")?;

  up.run_dated("20261015", &["1.3.x"])?;
  up.run(&["trunk", "1.3.x"])?;

  assert_eq!(
    up.published()?,
    vec![
      "index.html",
      "viewvc-1.3-20261016.tar.gz",
      "viewvc-1.3-20261016.zip",
      "viewvc-1.3-dev-20261016.tar.gz",
      "viewvc-1.3-dev-20261016.zip",
    ]
  );

  // every link in the index still resolves
  let index = up.read_published("index.html")?;
  assert!(index.contains("href=\"viewvc-1.3-dev-20261016.tar.gz\""));
  assert!(index.contains("href=\"viewvc-1.3-20261016.zip\""));

  Ok(())
}

#[test]
fn test_missing_archive_only_supersedes_built_kind() -> Result<()> {
  let up = TestUpstream::new()?;
  up.add_branch("trunk", "1.3.0-dev")?;
  up.run_dated("20261015", &["trunk"])?;

  up.skip_archive("trunk", "zip")?;
  up.run_dated("20261016", &["trunk"])?;

  assert_eq!(
    up.published()?,
    vec![
      "index.html",
      "viewvc-1.3.0-dev-20261015.zip",
      "viewvc-1.3.0-dev-20261016.tar.gz",
    ]
  );

  let index = up.read_published("index.html")?;
  assert_eq!(index.matches("<li><a href=").count(), 1);
  assert!(index.contains("viewvc-1.3.0-dev-20261016.tar.gz"));
  assert!(!index.contains("viewvc-1.3.0-dev-20261016.zip"));

  Ok(())
}

#[test]
fn test_no_archives_produced() -> Result<()> {
  let up = TestUpstream::new()?;
  up.add_branch("trunk", "1.3.0-dev")?;
  up.skip_archive("trunk", "tgz")?;
  up.skip_archive("trunk", "zip")?;

  let output = up.run(&["trunk"])?;
  assert!(String::from_utf8_lossy(&output.stdout).contains("No archives were produced"));

  assert_eq!(up.published()?, vec!["index.html"]);
  let index = up.read_published("index.html")?;
  assert!(index.contains("<strong>trunk</strong>"));
  assert!(!index.contains("<li>"));

  Ok(())
}

#[test]
fn test_missing_version_aborts_run() -> Result<()> {
  let up = TestUpstream::new()?;
  up.add_branch("trunk", "1.3.0-dev")?;
  up.add_branch_with_source("broken", "import sys\nVERSION = None\n")?;
  up.add_branch("1.2.x", "1.2.4-dev")?;

  let output = up.run_raw(&["--date", "20261016"], &["trunk", "broken", "1.2.x"])?;

  assert_eq!(output.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("Unable to find"), "got: {}", stderr);

  // trunk was published before the abort, 1.2.x never ran, no index written
  assert_eq!(
    up.published()?,
    vec!["viewvc-1.3.0-dev-20261016.tar.gz", "viewvc-1.3.0-dev-20261016.zip"]
  );
  assert_eq!(up.leftover_scratch()?, 0);

  Ok(())
}

#[test]
fn test_unknown_branch_reports_fetch_failure() -> Result<()> {
  let up = TestUpstream::new()?;

  let output = up.run_raw(&["--date", "20261016"], &["no-such-branch"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("Command failed"));
  assert_eq!(up.leftover_scratch()?, 0);

  Ok(())
}

#[test]
fn test_json_report() -> Result<()> {
  let up = TestUpstream::new()?;
  up.add_branch("trunk", "1.2.3")?;

  let output = up.run_raw(&["--date", "20261016", "--json"], &["trunk"])?;
  assert!(output.status.success());

  let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  let releases = report.as_array().expect("report should be an array");
  assert_eq!(releases.len(), 1);
  assert_eq!(releases[0]["branch"], "trunk");
  assert_eq!(releases[0]["version"], "1.2.3");
  assert_eq!(releases[0]["distname"], "viewvc-1.2.3-20261016");

  let archives = releases[0]["archives"].as_array().expect("archives array");
  assert_eq!(archives.len(), 2);
  assert_eq!(archives[0]["kind"], "tar-gz");
  assert_eq!(archives[1]["file_name"], "viewvc-1.2.3-20261016.zip");
  assert_eq!(archives[1]["size"].as_u64(), Some("trunk zipfile\n".len() as u64));

  Ok(())
}

#[test]
fn test_project_override() -> Result<()> {
  let up = TestUpstream::new()?;
  up.add_branch("trunk", "1.2.3")?;

  let output = up.run_raw(&["--date", "20261016", "--project", "vvc"], &["trunk"])?;
  assert!(output.status.success());
  assert!(up.published()?.contains(&"vvc-1.2.3-20261016.zip".to_string()));

  Ok(())
}
