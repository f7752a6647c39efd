//! Core library for the unschedule tool: parses a plain-text weekly
//! schedule, expands it into concrete time blocks for a two-week rotation,
//! flags conflicts and totals time per category.

pub mod analysis;
pub mod category;
pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod overlap;
pub mod parser;
pub mod recurrence;
pub mod stats;
pub mod time;

pub use analysis::{Analysis, analyze};
pub use category::{COLOR_PALETTE, Category, CategoryRegistry, Color};
pub use config::{
    CalendarPreferences, ConfigError, ConfigLoadResult, ConfigSource, FileConfig,
    config_directory, config_path, load_config, save_config,
};
pub use error::{ParseError, ParseErrorKind, TimeFormatError};
pub use event::{RawEvent, Recurrence, WeekVariant};
pub use logging::{LoggingDestination, LoggingError, init_logging};
pub use overlap::{OverlapWarning, detect_overlaps};
pub use parser::{ParsedSchedule, parse_schedule};
pub use recurrence::{Occurrence, OccurrenceKind, SpanPart, expand, expand_all};
pub use stats::{CategoryAverage, StatsReport, VariantStats, compute_stats};
pub use time::{TimeFormat, format_minute, parse_time};
