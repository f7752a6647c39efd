use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use unschedule_core::{CalendarPreferences, TimeFormat, WeekVariant};

/// Analyze a plain-text weekly schedule: overlaps, time allocation and agenda.
#[derive(Parser, Debug, Clone)]
#[command(name = "unschedule", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub analyze: AnalyzeArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Supported subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Configuration subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum ConfigCommand {
    /// Print the active configuration and where it came from.
    Show,
    /// Update calendar preferences in config.toml.
    Set(ConfigSetArgs),
}

/// Arguments for the default analysis flow.
#[derive(Debug, Clone, Args, Default)]
pub struct AnalyzeArgs {
    /// Schedule file; defaults to the last one analyzed.
    #[arg(value_name = "SCHEDULE_FILE", value_hint = ValueHint::FilePath)]
    pub schedule_file: Option<String>,

    /// Print the full analysis as JSON instead of the text report.
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "agenda")]
    pub json: bool,

    /// List occurrences per day, clipped to the configured hour window.
    #[arg(long, action = ArgAction::SetTrue)]
    pub agenda: bool,

    /// Limit the agenda to one week of the rotation (A or B).
    #[arg(long, value_name = "A|B", requires = "agenda")]
    pub week: Option<WeekVariant>,
}

impl AnalyzeArgs {
    /// Returns true when no analysis flags or file were provided.
    pub fn is_empty(&self) -> bool {
        self.schedule_file.is_none() && !self.json && !self.agenda && self.week.is_none()
    }
}

/// Arguments for `config set`.
#[derive(Debug, Clone, Args, Default)]
pub struct ConfigSetArgs {
    /// First visible hour of the day (0-23).
    #[arg(long = "start-hour", value_name = "HOUR")]
    pub start_hour: Option<u32>,

    /// Hour the visible window ends (1-24).
    #[arg(long = "end-hour", value_name = "HOUR")]
    pub end_hour: Option<u32>,

    /// Clock style for labels: 24h or 12h.
    #[arg(long = "time-format", value_name = "FORMAT")]
    pub time_format: Option<TimeFormat>,
}

impl ConfigSetArgs {
    pub fn is_empty(&self) -> bool {
        self.start_hour.is_none() && self.end_hour.is_none() && self.time_format.is_none()
    }

    /// Apply the requested changes, rejecting a window that would be invalid.
    pub fn apply_to(&self, calendar: &mut CalendarPreferences) -> Result<(), String> {
        if self.is_empty() {
            return Err(
                "Nothing to set; pass --start-hour, --end-hour or --time-format.".into(),
            );
        }

        let start_hour = self.start_hour.unwrap_or(calendar.start_hour);
        let end_hour = self.end_hour.unwrap_or(calendar.end_hour);
        CalendarPreferences::validate_window(start_hour, end_hour)?;

        calendar.start_hour = start_hour;
        calendar.end_hour = end_hour;
        if let Some(time_format) = self.time_format {
            calendar.time_format = time_format;
        }
        Ok(())
    }
}
