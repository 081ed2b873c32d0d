mod artifact;
mod commands;
mod core;
mod manifest;
mod release;
mod ui;

use artifact::{BuildKind, Destination};
use clap::{ArgAction, Parser, Subcommand};
use commands::{BuildOptions, ReleaseOptions, version_intent};
use crate::core::context::{PlatformDirs, ProjectContext};
use crate::core::error::{ShipError, print_error};
use std::path::PathBuf;
use ui::{DefaultsPrompter, Prompter, TerminalPrompter};

/// Package, version and release game mods
#[derive(Parser)]
#[command(name = "modship")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Accept every default without prompting
  #[arg(short = 'y', long, global = true)]
  yes: bool,

  /// More diagnostic output (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = ArgAction::Count, global = true)]
  verbose: u8,

  /// Mod project root (default: current directory)
  #[arg(short = 'C', long = "root", global = true, value_name = "PATH")]
  root: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build a zip, folder or symlink of the mod
  Build {
    /// Destination: dist, deploy (the mod manager folder) or an existing path
    #[arg(long, value_name = "DIR")]
    dir: Option<String>,
    /// Build kind: zip, folder, symlink
    #[arg(long)]
    kind: Option<String>,
    /// Use this version instead of choosing one
    #[arg(long, value_name = "VERSION", conflicts_with = "skip_version")]
    set_version: Option<String>,
    /// Keep the current version
    #[arg(long)]
    skip_version: bool,
    /// Start the game after building (needs [launch] in modship.toml)
    #[arg(long)]
    launch: bool,
  },

  /// Commit, tag and push a new version with its patch notes
  Release {
    /// Use this version instead of choosing one
    #[arg(long, value_name = "VERSION", conflicts_with = "skip_version")]
    set_version: Option<String>,
    /// Keep the current version
    #[arg(long)]
    skip_version: bool,
  },
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

fn init_tracing(verbose: u8) {
  let level = match verbose {
    0 => tracing::Level::WARN,
    1 => tracing::Level::INFO,
    2 => tracing::Level::DEBUG,
    _ => tracing::Level::TRACE,
  };
  tracing_subscriber::fmt()
    .with_max_level(level)
    .with_target(false)
    .with_writer(std::io::stderr)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  // Environment and working directory are read here only
  let dirs = PlatformDirs::from_env();
  let root = match cli.root {
    Some(root) => root,
    None => match std::env::current_dir() {
      Ok(dir) => dir,
      Err(e) => handle_error(ShipError::from(e).context("Failed to get current directory")),
    },
  };

  let ctx = match ProjectContext::build(&root, &dirs) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let mut prompter: Box<dyn Prompter> = if cli.yes {
    Box::new(DefaultsPrompter)
  } else {
    Box::new(TerminalPrompter::stdio())
  };

  let result = match cli.command {
    Commands::Build {
      dir,
      kind,
      set_version,
      skip_version,
      launch,
    } => parse_kind(kind).and_then(|kind| {
      let options = BuildOptions {
        destination: dir.as_deref().map(Destination::parse),
        kind,
        version: version_intent(set_version, skip_version),
        launch,
        show_progress: !cli.yes,
      };
      commands::run_build(&ctx, &options, prompter.as_mut()).map(|_| ())
    }),
    Commands::Release {
      set_version,
      skip_version,
    } => {
      let options = ReleaseOptions {
        version: version_intent(set_version, skip_version),
        today: chrono::Local::now().date_naive(),
      };
      commands::run_release(&ctx, &options, prompter.as_mut()).map(|_| ())
    }
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn parse_kind(kind: Option<String>) -> Result<Option<BuildKind>, ShipError> {
  kind.map(|k| k.parse::<BuildKind>()).transpose().map_err(ShipError::from)
}

fn handle_error(err: ShipError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
