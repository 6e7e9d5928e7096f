//! `svgguard config`: write a starter config file or print the effective one.

use anyhow::{bail, Context};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;

use crate::cli::args::ConfigAction;
use crate::config::settings::Config;

/// `config_path` is the global `--config` flag; `show` reads from it.
pub fn cmd_config(action: ConfigAction, config_path: Option<&Path>) -> anyhow::Result<ExitCode> {
    match action {
        ConfigAction::Init { path, force } => {
            let target = path.unwrap_or_else(Config::default_config_path);
            init_config(&target, force)?;
            println!("Created config at: {}", target.display());
        }
        ConfigAction::Show => show_config(config_path)?,
    }
    Ok(ExitCode::SUCCESS)
}

fn init_config(target: &Path, force: bool) -> anyhow::Result<()> {
    if target.exists() && !force {
        bail!(
            "Config file '{}' already exists (use --force to overwrite)",
            target.display()
        );
    }
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create config directory '{}'", parent.display())
        })?;
    }

    let toml = Config::default()
        .to_toml()
        .context("Failed to serialize default config")?;
    std::fs::write(target, toml)
        .with_context(|| format!("Failed to write config file '{}'", target.display()))?;
    debug!(path = %target.display(), force, "Config file created");
    Ok(())
}

fn show_config(explicit: Option<&Path>) -> anyhow::Result<()> {
    let source: PathBuf = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::default_config_path);

    let config = if source.exists() {
        println!("# Loaded from {}", source.display());
        Config::from_file(&source)
            .with_context(|| format!("Failed to load config file '{}'", source.display()))?
    } else if explicit.is_some() {
        bail!("Config file '{}' not found", source.display());
    } else {
        println!("No config file found at: {}", source.display());
        println!("Run 'svgguard config init' to create one. Built-in defaults:");
        println!();
        Config::default()
    };

    // Defaults are filled in, so this is the effective configuration
    print!("{}", config.to_toml()?);
    Ok(())
}
