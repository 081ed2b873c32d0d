//! `modship build`: resolve the version, then produce one artifact

use crate::artifact::{BuildKind, BuildReport, Destination, build_artifact};
use crate::core::context::ProjectContext;
use crate::core::error::{ResultExt, ShipError, ShipResult, ValidationError};
use crate::manifest::ModMetadata;
use crate::release::version::{VersionIntent, resolve_version};
use crate::ui::prompt::{Prompter, text_until_valid};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Build invocation, resolved from the command line
#[derive(Debug, Clone)]
pub struct BuildOptions {
  /// Destination chosen up front; prompted for otherwise
  pub destination: Option<Destination>,
  /// Build kind chosen up front; prompted for otherwise
  pub kind: Option<BuildKind>,
  pub version: VersionIntent,
  /// Launch the game without asking
  pub launch: bool,
  pub show_progress: bool,
}

/// Run a build
pub fn run_build(ctx: &ProjectContext, options: &BuildOptions, prompter: &mut dyn Prompter) -> ShipResult<BuildReport> {
  let mut metadata = ModMetadata::load(ctx)?;
  let current = metadata.version()?;
  let resolved = resolve_version(&current, &ctx.info_path, &options.version, prompter)?;

  let destination = match &options.destination {
    Some(destination) => destination.clone(),
    None => choose_destination(ctx, prompter)?,
  };
  let kind = match options.kind {
    Some(kind) => kind,
    None => choose_kind(prompter)?,
  };

  metadata.persist(&resolved)?;
  let descriptor = metadata.descriptor(&resolved)?;

  let output = destination.prepare(ctx)?;
  let report = build_artifact(&ctx.source_dir, &descriptor, &output, kind, options.show_progress)?;

  if should_launch(ctx, options, prompter)? {
    launch_game(ctx)?;
  }

  Ok(report)
}

/// Mod manager folder, local dist folder, or a custom existing path
fn choose_destination(ctx: &ProjectContext, prompter: &mut dyn Prompter) -> ShipResult<Destination> {
  let mut options: Vec<(String, Option<Destination>)> = Vec::new();
  if let Some(deploy) = &ctx.deploy_dir {
    options.push((format!("Mod manager folder ({})", deploy.display()), Some(Destination::Deploy)));
  }
  let dist_index = options.len();
  options.push((format!("Local dist folder ({})", ctx.dist_dir.display()), Some(Destination::Dist)));
  options.push(("Custom path".to_string(), None));

  let labels: Vec<String> = options.iter().map(|(label, _)| label.clone()).collect();
  let choice = prompter.select("Build destination", &labels, dist_index)?;

  match options.into_iter().nth(choice).and_then(|(_, destination)| destination) {
    Some(destination) => Ok(destination),
    None => prompt_custom_dir(ctx, prompter).map(Destination::Custom),
  }
}

fn prompt_custom_dir(ctx: &ProjectContext, prompter: &mut dyn Prompter) -> ShipResult<PathBuf> {
  let initial = ctx
    .home_dir
    .as_ref()
    .map(|h| h.display().to_string())
    .unwrap_or_default();

  text_until_valid(prompter, "Custom path", &initial, |input| {
    let path = expand_path(input.trim(), &ctx.root, ctx.home_dir.as_deref());
    if path.is_dir() {
      Ok(path)
    } else {
      Err(ValidationError::PathNotFound { path })
    }
  })
}

/// Resolve `~` and relative paths against the home dir and project root
fn expand_path(input: &str, root: &Path, home: Option<&Path>) -> PathBuf {
  if let Some(home) = home {
    if input == "~" {
      return home.to_path_buf();
    }
    if let Some(rest) = input.strip_prefix("~/") {
      return home.join(rest);
    }
  }
  let path = PathBuf::from(input);
  if path.is_absolute() { path } else { root.join(path) }
}

fn choose_kind(prompter: &mut dyn Prompter) -> ShipResult<BuildKind> {
  let labels: Vec<String> = BuildKind::ALL.iter().map(|k| k.label().to_string()).collect();
  let choice = prompter.select("Build kind", &labels, 0)?;
  BuildKind::ALL
    .get(choice)
    .copied()
    .ok_or_else(|| ShipError::message(format!("No build kind at position {}", choice + 1)))
}

fn should_launch(ctx: &ProjectContext, options: &BuildOptions, prompter: &mut dyn Prompter) -> ShipResult<bool> {
  if options.launch {
    return Ok(true);
  }
  // Unattended runs only launch on request
  match ctx.launch() {
    Some(_) if prompter.is_interactive() => prompter.confirm("Launch the game?", true),
    _ => Ok(false),
  }
}

/// Start the configured game command without waiting for it
fn launch_game(ctx: &ProjectContext) -> ShipResult<()> {
  let launch = ctx.launch().ok_or_else(|| {
    ShipError::with_help(
      "No launch command configured",
      "Add a [launch] section with `command` (and optional `args`) to modship.toml.",
    )
  })?;

  println!("🎮 Launching {}", launch.command);
  let child = Command::new(&launch.command)
    .args(&launch.args)
    .current_dir(&ctx.root)
    .spawn()
    .with_context(|| format!("Failed to start {}", launch.command))?;
  tracing::info!(pid = child.id(), command = %launch.command, "game started");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::config::{LaunchConfig, ShipConfig};
  use crate::core::context::PlatformDirs;
  use crate::ui::prompt::DefaultsPrompter;
  use crate::ui::prompt::testing::{Answer, ScriptedPrompter};
  use std::fs;
  use tempfile::TempDir;

  fn mod_project(config: ShipConfig, deploy: Option<PathBuf>) -> (TempDir, ProjectContext) {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(
      root.join("src/info.json"),
      "{\n  \"name\": \"rail-tools\",\n  \"version\": \"1.2.0\",\n  \"title\": \"Rail Tools\"\n}\n",
    )
    .unwrap();
    fs::write(root.join("src/control.lua"), "script.on_init(function() end)\n").unwrap();
    fs::write(root.join("package.json"), "{\n  \"name\": \"rail-tools\",\n  \"version\": \"1.2.0\"\n}\n").unwrap();

    let mut ctx = ProjectContext::from_config(root.to_path_buf(), config, &PlatformDirs::default());
    ctx.deploy_dir = deploy;
    (dir, ctx)
  }

  fn interactive() -> BuildOptions {
    BuildOptions {
      destination: None,
      kind: None,
      version: VersionIntent::Interactive,
      launch: false,
      show_progress: false,
    }
  }

  #[test]
  fn test_minor_bump_directory_build_end_to_end() {
    let (dir, ctx) = mod_project(ShipConfig::default(), None);
    let mut p = ScriptedPrompter::new([
      Answer::Select(2), // Minor
      Answer::Select(0), // dist
      Answer::Select(1), // folder
    ]);

    let report = run_build(&ctx, &interactive(), &mut p).unwrap();

    assert_eq!(report.artifact.kind, BuildKind::Directory);
    assert_eq!(report.artifact.path, dir.path().join("dist/rail-tools_1.3.0"));
    assert!(report.artifact.path.join("control.lua").is_file());
    assert_eq!(p.remaining(), 0);

    let info = fs::read_to_string(&ctx.info_path).unwrap();
    assert!(info.contains("\"version\": \"1.3.0\""));
    let package = fs::read_to_string(&ctx.package_path).unwrap();
    assert!(package.contains("\"version\": \"1.3.0\""));
  }

  #[test]
  fn test_flags_skip_prompts() {
    let (dir, ctx) = mod_project(ShipConfig::default(), None);
    let options = BuildOptions {
      destination: Some(Destination::Dist),
      kind: Some(BuildKind::Archive),
      version: VersionIntent::Skip,
      launch: false,
      show_progress: false,
    };
    let mut p = ScriptedPrompter::new([]);

    let report = run_build(&ctx, &options, &mut p).unwrap();

    assert_eq!(report.artifact.path, dir.path().join("dist/rail-tools_1.2.0.zip"));
    assert!(report.bytes.unwrap() > 0);
    assert!(p.asked.is_empty());
  }

  #[test]
  fn test_defaults_build_into_dist_as_zip() {
    let mods = TempDir::new().unwrap();
    let (dir, ctx) = mod_project(ShipConfig::default(), Some(mods.path().to_path_buf()));
    let mut options = interactive();
    options.version = VersionIntent::Skip;

    let report = run_build(&ctx, &options, &mut DefaultsPrompter).unwrap();

    assert_eq!(report.artifact.path, dir.path().join("dist/rail-tools_1.2.0.zip"));
    assert_eq!(fs::read_dir(mods.path()).unwrap().count(), 0);
  }

  #[test]
  fn test_deploy_choice_is_offered_first() {
    let mods = TempDir::new().unwrap();
    fs::write(mods.path().join("rail-tools_1.1.0.zip"), "stale").unwrap();
    let (_dir, ctx) = mod_project(ShipConfig::default(), Some(mods.path().to_path_buf()));
    let mut options = interactive();
    options.version = VersionIntent::Skip;
    let mut p = ScriptedPrompter::new([Answer::Select(0), Answer::Select(0)]);

    let report = run_build(&ctx, &options, &mut p).unwrap();

    assert_eq!(report.removed, vec![mods.path().join("rail-tools_1.1.0.zip")]);
    assert!(mods.path().join("rail-tools_1.2.0.zip").is_file());
  }

  #[test]
  fn test_custom_path_must_exist() {
    let (dir, ctx) = mod_project(ShipConfig::default(), None);
    fs::create_dir(dir.path().join("out")).unwrap();
    let mut options = interactive();
    options.version = VersionIntent::Skip;
    let mut p = ScriptedPrompter::new([
      Answer::Select(1),
      Answer::Text("missing".into()),
      Answer::Text("out".into()),
      Answer::Select(1),
    ]);

    let report = run_build(&ctx, &options, &mut p).unwrap();

    assert_eq!(p.warnings.len(), 1);
    assert!(p.warnings[0].starts_with("Path not valid"));
    assert_eq!(report.artifact.path, dir.path().join("out/rail-tools_1.2.0"));
  }

  #[test]
  fn test_cancel_before_build_writes_nothing() {
    let (dir, ctx) = mod_project(ShipConfig::default(), None);
    let mut p = ScriptedPrompter::new([Answer::Select(1), Answer::Cancel]);

    let err = run_build(&ctx, &interactive(), &mut p).unwrap_err();

    assert!(err.is_abort());
    assert!(!dir.path().join("dist").exists());
    assert!(fs::read_to_string(&ctx.info_path).unwrap().contains("1.2.0"));
  }

  #[test]
  fn test_launch_prompt_only_when_configured() {
    let config = ShipConfig {
      launch: Some(LaunchConfig {
        command: "factorio".to_string(),
        args: vec![],
      }),
      ..ShipConfig::default()
    };
    let (_dir, ctx) = mod_project(config, None);
    let options = BuildOptions {
      destination: Some(Destination::Dist),
      kind: Some(BuildKind::Directory),
      version: VersionIntent::Skip,
      launch: false,
      show_progress: false,
    };
    let mut p = ScriptedPrompter::new([Answer::Confirm(false)]);

    run_build(&ctx, &options, &mut p).unwrap();
    assert_eq!(p.asked, vec!["Launch the game?".to_string()]);
  }

  #[test]
  fn test_launch_prompt_defaults_to_yes_when_asked() {
    let config = ShipConfig {
      launch: Some(LaunchConfig {
        command: "factorio".to_string(),
        args: vec![],
      }),
      ..ShipConfig::default()
    };
    let (_dir, ctx) = mod_project(config, None);
    let options = interactive();

    let mut p = ScriptedPrompter::new([Answer::Default]);
    assert!(should_launch(&ctx, &options, &mut p).unwrap());

    assert!(!should_launch(&ctx, &options, &mut DefaultsPrompter).unwrap());

    let (_dir, bare) = mod_project(ShipConfig::default(), None);
    let mut p = ScriptedPrompter::new([]);
    assert!(!should_launch(&bare, &options, &mut p).unwrap());
    assert!(p.asked.is_empty());
  }

  #[test]
  fn test_expand_path() {
    let root = Path::new("/work/mod");
    let home = Path::new("/home/modder");
    assert_eq!(expand_path("~/mods", root, Some(home)), PathBuf::from("/home/modder/mods"));
    assert_eq!(expand_path("out", root, Some(home)), PathBuf::from("/work/mod/out"));
    assert_eq!(expand_path("/abs", root, None), PathBuf::from("/abs"));
  }
}
