//! Flexible time-of-day tokens.
//!
//! Accepted forms (case-insensitive): `9a`, `9am`, `5p`, `5pm`, `9:30a`,
//! `12:15pm`, `14:30`, and a bare hour such as `7` or `17`. A bare hour with
//! no meridiem and no minutes is read on the 24-hour clock (`7` is 07:00,
//! `17` is 17:00).

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::TimeFormatError;

pub const MINUTES_PER_HOUR: u16 = 60;
pub const MINUTES_PER_DAY: u16 = 24 * MINUTES_PER_HOUR;

static TIME_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(?::(\d+))?([a-z]*)$").expect("time token regex"));

/// Parse a time token into a minute of the day in `[0, 1440)`.
pub fn parse_time(token: &str) -> Result<u16, TimeFormatError> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Err(TimeFormatError::Empty);
    }
    let lowered = trimmed.to_ascii_lowercase();

    let Some(caps) = TIME_TOKEN.captures(&lowered) else {
        return if lowered.starts_with(|c: char| c.is_ascii_digit()) {
            Err(TimeFormatError::BadSuffix(trimmed.to_string()))
        } else {
            Err(TimeFormatError::NoDigits(trimmed.to_string()))
        };
    };

    let hour_digits = &caps[1];
    if hour_digits.len() > 2 {
        return Err(TimeFormatError::HourOutOfRange(trimmed.to_string()));
    }
    let hour: u16 = hour_digits
        .parse()
        .map_err(|_| TimeFormatError::HourOutOfRange(trimmed.to_string()))?;

    let minute: u16 = match caps.get(2) {
        Some(m) if m.as_str().len() == 2 => m
            .as_str()
            .parse()
            .map_err(|_| TimeFormatError::MinuteOutOfRange(trimmed.to_string()))?,
        Some(_) => return Err(TimeFormatError::MinuteOutOfRange(trimmed.to_string())),
        None => 0,
    };
    if minute >= MINUTES_PER_HOUR {
        return Err(TimeFormatError::MinuteOutOfRange(trimmed.to_string()));
    }

    let hour = match &caps[3] {
        "" => {
            if hour >= 24 {
                return Err(TimeFormatError::HourOutOfRange(trimmed.to_string()));
            }
            hour
        }
        "a" | "am" => meridiem_hour(hour, false, trimmed)?,
        "p" | "pm" => meridiem_hour(hour, true, trimmed)?,
        _ => return Err(TimeFormatError::BadSuffix(trimmed.to_string())),
    };

    Ok(hour * MINUTES_PER_HOUR + minute)
}

fn meridiem_hour(hour: u16, pm: bool, token: &str) -> Result<u16, TimeFormatError> {
    if !(1..=12).contains(&hour) {
        return Err(TimeFormatError::HourOutOfRange(token.to_string()));
    }
    Ok(match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    })
}

/// Clock style for rendering minutes back to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeFormat {
    #[default]
    #[serde(rename = "24h")]
    TwentyFourHour,
    #[serde(rename = "12h")]
    TwelveHour,
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeFormat::TwentyFourHour => write!(f, "24h"),
            TimeFormat::TwelveHour => write!(f, "12h"),
        }
    }
}

impl FromStr for TimeFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "24h" | "24" => Ok(TimeFormat::TwentyFourHour),
            "12h" | "12" => Ok(TimeFormat::TwelveHour),
            other => Err(format!("unknown time format '{other}' (expected 24h or 12h)")),
        }
    }
}

/// Render a minute offset (`0..=1440`) as a clock label.
///
/// `1440` is the end-of-day boundary used by split overnight blocks and
/// renders as `24:00` (or `12:00 AM`).
pub fn format_minute(minute: u16, format: TimeFormat) -> String {
    let minute = minute.min(MINUTES_PER_DAY);
    if minute == MINUTES_PER_DAY {
        return match format {
            TimeFormat::TwentyFourHour => "24:00".to_string(),
            TimeFormat::TwelveHour => "12:00 AM".to_string(),
        };
    }
    let Some(time) = NaiveTime::from_num_seconds_from_midnight_opt(u32::from(minute) * 60, 0)
    else {
        return format!("{:02}:{:02}", minute / 60, minute % 60);
    };
    match format {
        TimeFormat::TwentyFourHour => time.format("%H:%M").to_string(),
        TimeFormat::TwelveHour => time.format("%-I:%M %p").to_string(),
    }
}
