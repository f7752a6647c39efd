//! Parsed event records, before recurrence expansion.

use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::Serialize;

/// Day codes in calendar order, Monday first.
pub const DAY_CODES: &str = "MTWRFSU";

/// Map a day code (`M T W R F S U`) to its weekday.
pub fn weekday_from_code(code: char) -> Option<Weekday> {
    match code {
        'M' => Some(Weekday::Mon),
        'T' => Some(Weekday::Tue),
        'W' => Some(Weekday::Wed),
        'R' => Some(Weekday::Thu),
        'F' => Some(Weekday::Fri),
        'S' => Some(Weekday::Sat),
        'U' => Some(Weekday::Sun),
        _ => None,
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// One half of the biweekly rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum WeekVariant {
    A,
    B,
}

impl WeekVariant {
    pub const ALL: [WeekVariant; 2] = [WeekVariant::A, WeekVariant::B];
}

impl fmt::Display for WeekVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekVariant::A => write!(f, "Week A"),
            WeekVariant::B => write!(f, "Week B"),
        }
    }
}

impl FromStr for WeekVariant {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "A" | "WEEKA" => Ok(WeekVariant::A),
            "B" | "WEEKB" => Ok(WeekVariant::B),
            other => Err(format!("unknown week '{other}' (expected A or B)")),
        }
    }
}

/// How often an event repeats across the two-week rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Recurrence {
    Weekly,
    WeekA,
    WeekB,
}

impl Recurrence {
    /// Parse the leading token of an event line. Case-sensitive.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "Weekly" => Some(Recurrence::Weekly),
            "WeekA" => Some(Recurrence::WeekA),
            "WeekB" => Some(Recurrence::WeekB),
            _ => None,
        }
    }

    /// Week variants this recurrence materializes into.
    pub fn variants(self) -> &'static [WeekVariant] {
        match self {
            Recurrence::Weekly => &WeekVariant::ALL,
            Recurrence::WeekA => &[WeekVariant::A],
            Recurrence::WeekB => &[WeekVariant::B],
        }
    }
}

/// An event line as written, with its category already resolved.
///
/// `end_minute` is `None` for a trigger (an instant). For a block whose end
/// is numerically before its start, the block runs past midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawEvent {
    pub recurrence: Recurrence,
    /// One entry per day code, duplicates kept.
    pub days: Vec<Weekday>,
    pub start_minute: u16,
    pub end_minute: Option<u16>,
    pub description: String,
    pub category: String,
    /// 1-based source line.
    pub line: usize,
}

impl RawEvent {
    pub fn is_trigger(&self) -> bool {
        self.end_minute.is_none()
    }

    pub fn is_overnight(&self) -> bool {
        self.end_minute.is_some_and(|end| end < self.start_minute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_codes_map_monday_first() {
        let days: Vec<u32> = DAY_CODES
            .chars()
            .filter_map(weekday_from_code)
            .map(|day| day.num_days_from_monday())
            .collect();
        assert_eq!(days, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(weekday_from_code('m'), None);
        assert_eq!(weekday_from_code('X'), None);
    }

    #[test]
    fn recurrence_tokens_are_case_sensitive() {
        assert_eq!(Recurrence::from_token("Weekly"), Some(Recurrence::Weekly));
        assert_eq!(Recurrence::from_token("weekly"), None);
        assert_eq!(Recurrence::from_token("WeekC"), None);
        assert_eq!(Recurrence::Weekly.variants(), &[WeekVariant::A, WeekVariant::B]);
        assert_eq!(Recurrence::WeekB.variants(), &[WeekVariant::B]);
    }
}
