use clap::Parser;
use colored::*;
use std::process::ExitCode;
use svgguard::cli::args::{Cli, ColorMode, Commands, EXIT_ERROR};
use svgguard::cli::commands::{
    cmd_config, cmd_report, cmd_rules, cmd_sanitize, cmd_scan, ReportOptions, ScanOptions,
};
use svgguard::config::settings::Config;

fn main() -> ExitCode {
    let cli = Cli::parse();

    apply_color_mode(cli.color);

    // Logging goes up before any command runs; only the command and config path are forwarded.
    if let Err(e) = svgguard::logging::init(cli.log_level.into(), cli.log_format) {
        eprintln!("{}: Failed to initialize logging: {}", "Error".red().bold(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    match run(cli.command, cli.config.as_deref()) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn apply_color_mode(mode: ColorMode) {
    match mode {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {
            if std::env::var_os("NO_COLOR").is_some() {
                colored::control::set_override(false);
            }
        }
    }
}

fn run(command: Commands, config_path: Option<&std::path::Path>) -> anyhow::Result<ExitCode> {
    if let Commands::Config { action } = command {
        return cmd_config(action, config_path);
    }

    let config = Config::load_or_default(config_path)?;

    match command {
        Commands::Scan {
            path,
            level,
            recursive,
            format,
            quiet,
        } => cmd_scan(
            &config,
            &path,
            ScanOptions {
                level: level.unwrap_or(config.scan.level),
                recursive: recursive || config.scan.recursive,
                format,
                quiet,
            },
        ),
        Commands::Sanitize {
            input,
            output,
            removal,
        } => cmd_sanitize(&config, &input, &output, removal),
        Commands::Report {
            path,
            recursive,
            level,
            project,
            report_version,
            output,
        } => cmd_report(
            &config,
            &path,
            ReportOptions {
                recursive,
                level,
                project,
                version: report_version,
            },
            output.as_deref(),
        ),
        Commands::Rules { action } => cmd_rules(action),
        Commands::Config { action } => cmd_config(action, config_path),
    }
}
