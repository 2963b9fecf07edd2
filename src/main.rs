mod commands;
mod core;
mod release;
mod utils;

use clap::{ArgAction, Parser, error::ErrorKind};
use commands::PublishOptions;
use crate::core::error::{EXIT_FAILURE, NightlyError, print_error};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// Build nightly snapshot archives from source branches and publish them
#[derive(Parser)]
#[command(name = "nightly-publish")]
#[command(version, about, long_about = None)]
#[command(disable_help_flag = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Print help
  #[arg(short = 'h', long = "help", short_alias = '?', action = ArgAction::Help)]
  help: Option<bool>,

  /// Directory receiving the archives and index.html
  #[arg(value_name = "PUBLISH-DIR")]
  publish_dir: PathBuf,

  /// Branches to build, in order
  #[arg(value_name = "BRANCH", required = true, num_args = 1..)]
  branches: Vec<String>,

  /// Configuration file (default: nightly.toml in the current directory)
  #[arg(long, value_name = "PATH")]
  config: Option<PathBuf>,

  /// Repository root URL (overrides source.root_url)
  #[arg(long, value_name = "URL")]
  root_url: Option<String>,

  /// Project name used in archive names (overrides source.project)
  #[arg(long, value_name = "NAME")]
  project: Option<String>,

  /// Date stamp for archive names (default: today)
  #[arg(long, value_name = "YYYYMMDD", value_parser = utils::parse_date_stamp)]
  date: Option<String>,

  /// Print a JSON report instead of progress output
  #[arg(long)]
  json: bool,

  /// Log every external command and its output to stderr
  #[arg(short, long)]
  verbose: bool,
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn init_tracing(verbose: bool) {
  use tracing_subscriber::{Registry, fmt::layer, layer::SubscriberExt, util::SubscriberInitExt};

  let level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
  Registry::default()
    .with(level)
    .with(layer().with_writer(std::io::stderr).with_target(false).without_time())
    .init();
}

fn main() {
  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(err) => match err.kind() {
      ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
      _ => {
        // Usage errors go to stderr like clap's, but with our exit status
        let _ = err.print();
        std::process::exit(EXIT_FAILURE);
      }
    },
  };

  init_tracing(cli.verbose);

  let result = commands::run_publish(PublishOptions {
    publish_dir: cli.publish_dir,
    branches: cli.branches,
    config_path: cli.config,
    root_url: cli.root_url,
    project: cli.project,
    date: cli.date,
    json: cli.json,
  });

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: NightlyError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code());
}
