pub mod cli_args;
pub mod report;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, warn};
use unschedule_core::{
    Analysis, ConfigSource, FileConfig, analyze, config_path, load_config, save_config,
};

pub use cli_args::{AnalyzeArgs, Cli, Command, ConfigCommand, ConfigSetArgs};

/// Run one CLI invocation.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Command::Config(cmd)) => {
            if !cli.analyze.is_empty() {
                bail!("Analysis flags cannot be combined with config commands.");
            }
            handle_config_command(cmd)
        }
        None => run_analysis(cli.analyze),
    }
}

fn run_analysis(args: AnalyzeArgs) -> Result<()> {
    let load = load_config();
    for warning in &load.warnings {
        eprintln!("Warning: {warning}");
    }
    let mut config = load.config;

    let (path, from_memory) = resolve_schedule_path(args.schedule_file.as_deref(), &config)?;
    if from_memory {
        eprintln!("Using last schedule file: {}", path.display());
    }

    let analysis = analyze_file(&path)?;
    remember_schedule_file(&mut config, &path);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else if args.agenda {
        print!(
            "{}",
            report::render_agenda(&analysis, &config.calendar, args.week)
        );
    } else {
        print!("{}", report::render_report(&analysis));
    }
    Ok(())
}

/// Pick the schedule to analyze: the argument (with `~` expanded) or the
/// remembered last file. The flag reports whether memory was used.
pub fn resolve_schedule_path(argument: Option<&str>, config: &FileConfig) -> Result<(PathBuf, bool)> {
    if let Some(raw) = argument.map(str::trim).filter(|raw| !raw.is_empty()) {
        return Ok((PathBuf::from(shellexpand::tilde(raw).as_ref()), false));
    }
    match config.last_schedule_file.as_deref() {
        Some(last) => Ok((PathBuf::from(last), true)),
        None => bail!("No schedule file specified and no previous file found."),
    }
}

/// Read and analyze a schedule file.
pub fn analyze_file(path: &Path) -> Result<Analysis> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("File '{}' could not be read", path.display()))?;
    info!(path = %path.display(), bytes = text.len(), "schedule loaded");
    Ok(analyze(&text)?)
}

fn remember_schedule_file(config: &mut FileConfig, path: &Path) {
    let absolute = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let absolute = absolute.to_string_lossy().into_owned();
    if config.last_schedule_file.as_deref() == Some(absolute.as_str()) {
        return;
    }
    config.last_schedule_file = Some(absolute);
    if let Err(err) = save_config(config) {
        warn!(error = %err, "could not remember schedule file");
    }
}

fn handle_config_command(command: ConfigCommand) -> Result<()> {
    let load = load_config();
    for warning in &load.warnings {
        eprintln!("Warning: {warning}");
    }
    let mut config = load.config;

    match command {
        ConfigCommand::Show => {
            let origin = match load.source {
                ConfigSource::File => "file",
                ConfigSource::Default => "defaults",
            };
            println!("Config: {} ({origin})", config_path().display());
            print!("{}", describe_config(&config));
            Ok(())
        }
        ConfigCommand::Set(args) => {
            args.apply_to(&mut config.calendar)
                .map_err(anyhow::Error::msg)?;
            save_config(&config)?;
            println!("Saved {}", config_path().display());
            print!("{}", describe_config(&config));
            Ok(())
        }
    }
}

/// `key = value` listing of the settings a user can change.
pub fn describe_config(config: &FileConfig) -> String {
    let last = config.last_schedule_file.as_deref().unwrap_or("(none)");
    format!(
        "last_schedule_file = {last}\n\
         calendar.start_hour = {}\n\
         calendar.end_hour = {}\n\
         calendar.time_format = {}\n",
        config.calendar.start_hour, config.calendar.end_hour, config.calendar.time_format
    )
}
