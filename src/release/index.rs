//! The generated index.html of the publish directory
//!
//! The page is rebuilt from scratch every run: header, one fragment per
//! branch processed in this run (in argument order), footer.

use crate::core::config::IndexConfig;
use crate::core::error::{NightlyResult, ResultExt};
use crate::release::BranchRelease;
use crate::utils::escape_url_path;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use v_htmlescape::escape;

/// File name of the generated page
pub const INDEX_FILE: &str = "index.html";

const BUILTIN_FOOTER: &str = "</section>\n</body>\n</html>\n";

/// Header and footer wrapped around the branch fragments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexTemplate {
  pub header: String,
  pub footer: String,
}

impl IndexTemplate {
  /// The built-in page layout
  pub fn builtin(title: &str) -> Self {
    let title = escape(title);
    let header = format!(
      "<!DOCTYPE html>\n\
       <html lang=\"en\">\n\
       <head>\n\
       <meta charset=\"utf-8\">\n\
       <title>{title}</title>\n\
       </head>\n\
       <body>\n\
       <nav>\n\
       <a href=\"../\">Home</a> | <a href=\"./\">{title}</a>\n\
       </nav>\n\
       <section>\n\
       <h1>{title}</h1>\n\
       <p>These archives are built every night from the tip of each branch. \
       They are untested snapshots, not releases.</p>\n"
    );
    Self {
      header,
      footer: BUILTIN_FOOTER.to_string(),
    }
  }

  /// Built-in layout with any header/footer template files from the config
  pub fn from_config(config: &IndexConfig) -> NightlyResult<Self> {
    let mut template = Self::builtin(&config.title);
    if let Some(path) = &config.header {
      template.header = read_template(path)?;
    }
    if let Some(path) = &config.footer {
      template.footer = read_template(path)?;
    }
    Ok(template)
  }

  /// Render the complete page
  pub fn render(&self, releases: &[BranchRelease]) -> String {
    let mut html = self.header.clone();
    for release in releases {
      html.push_str(&render_fragment(release));
    }
    html.push_str(&self.footer);
    html
  }
}

fn read_template(path: &Path) -> NightlyResult<String> {
  fs::read_to_string(path).with_context(|| format!("Failed to read index template {}", path.display()))
}

/// HTML for one branch: a paragraph naming it and a list of its archives
///
/// Only archives that were actually published are linked.
pub fn render_fragment(release: &BranchRelease) -> String {
  let mut html = String::new();
  let _ = writeln!(
    html,
    "<p class=\"branch\">Latest <strong>{}</strong> snapshot ({}):</p>",
    escape(&release.branch),
    escape(&release.version)
  );

  if release.archives.is_empty() {
    html.push_str("<p class=\"missing\">No snapshot archives were produced.</p>\n");
    return html;
  }

  html.push_str("<ul>\n");
  for archive in &release.archives {
    let _ = writeln!(
      html,
      "<li><a href=\"{}\">{}</a></li>",
      escape(&escape_url_path(&archive.file_name)),
      escape(&archive.file_name)
    );
  }
  html.push_str("</ul>\n");
  html
}

/// Write `html` as the publish directory's index, replacing the old one
pub fn write_index(publish_dir: &Path, html: &str) -> NightlyResult<PathBuf> {
  fs::create_dir_all(publish_dir).with_context(|| format!("Failed to create {}", publish_dir.display()))?;
  let path = publish_dir.join(INDEX_FILE);
  fs::write(&path, html).with_context(|| format!("Failed to write {}", path.display()))?;
  Ok(path)
}
