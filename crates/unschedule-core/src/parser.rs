//! Line-oriented schedule grammar.
//!
//! ```text
//! # comment
//! @Teaching: #AEC7E8          define a color (and make it active)
//! @Research                   switch the active category
//! [NON-WORK-DEFINITION]
//! non_work_categories = Sleep, Family
//! Weekly MWF 9a 10:30a Lecture
//! WeekA R 10p 6a Sleep @Sleep
//! WeekB U 8p Call home @Family
//! ```
//!
//! Parsing is a fold over the lines with an explicit [`ParseContext`]; the
//! first bad line aborts the whole run.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::category::{Category, CategoryRegistry, Color};
use crate::error::{ParseError, ParseErrorKind};
use crate::event::{DAY_CODES, RawEvent, Recurrence, weekday_from_code};
use crate::time::parse_time;

pub const NON_WORK_HEADER: &str = "[NON-WORK-DEFINITION]";
pub const NON_WORK_KEY: &str = "non_work_categories";

static INLINE_CATEGORY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@(\w+)$").expect("inline category regex"));

/// Result of a successful parse.
#[derive(Debug, Clone)]
pub struct ParsedSchedule {
    pub events: Vec<RawEvent>,
    pub registry: CategoryRegistry,
}

impl ParsedSchedule {
    pub fn non_work(&self) -> BTreeSet<String> {
        self.registry.non_work()
    }

    pub fn categories(&self) -> Vec<Category> {
        self.registry.categories()
    }
}

/// Mutable state threaded through the line fold.
#[derive(Debug, Default)]
struct ParseContext {
    registry: CategoryRegistry,
    in_non_work_section: bool,
    events: Vec<RawEvent>,
}

/// Shape of a single trimmed line.
#[derive(Debug, PartialEq, Eq)]
enum LineKind<'a> {
    Skip,
    NonWorkHeader,
    Definition { name: &'a str, color: &'a str },
    Activate(&'a str),
    Other(&'a str),
}

fn classify(line: &str) -> LineKind<'_> {
    if line.is_empty() || line.starts_with('#') {
        return LineKind::Skip;
    }
    if line.eq_ignore_ascii_case(NON_WORK_HEADER) {
        return LineKind::NonWorkHeader;
    }
    if let Some(rest) = line.strip_prefix('@') {
        return match rest.split_once(':') {
            Some((name, color)) => LineKind::Definition {
                name: name.trim(),
                color: color.trim(),
            },
            None => LineKind::Activate(rest.trim()),
        };
    }
    LineKind::Other(line)
}

/// Parse a whole schedule text.
pub fn parse_schedule(text: &str) -> Result<ParsedSchedule, ParseError> {
    let context = text
        .lines()
        .enumerate()
        .try_fold(ParseContext::default(), |context, (index, raw)| {
            let line = raw.trim();
            context
                .consume(index + 1, line)
                .map_err(|kind| ParseError::new(index + 1, raw, kind))
        })?;

    info!(
        events = context.events.len(),
        categories = context.registry.categories().len(),
        "schedule parsed"
    );

    Ok(ParsedSchedule {
        events: context.events,
        registry: context.registry,
    })
}

impl ParseContext {
    fn consume(mut self, number: usize, line: &str) -> Result<Self, ParseErrorKind> {
        let kind = classify(line);
        match kind {
            LineKind::Skip => {}
            LineKind::NonWorkHeader => {
                self.in_non_work_section = true;
            }
            LineKind::Definition { name, color } => {
                self.in_non_work_section = false;
                let name = require_name(name)?;
                if color.is_empty() {
                    return Err(ParseErrorKind::syntax(format!(
                        "missing color for category '{name}'"
                    )));
                }
                let color = Color::parse(color).map_err(ParseErrorKind::Syntax)?;
                self.registry.define(name, color)?;
                self.registry.set_active(name);
            }
            LineKind::Activate(name) => {
                self.in_non_work_section = false;
                let name = require_name(name)?;
                self.registry.set_active(name);
            }
            LineKind::Other(line) if self.in_non_work_section => {
                self.read_non_work_assignment(line)?;
                self.in_non_work_section = false;
            }
            LineKind::Other(line) => {
                let event = self.read_event(number, line)?;
                debug!(
                    line = number,
                    category = %event.category,
                    days = event.days.len(),
                    trigger = event.is_trigger(),
                    "event parsed"
                );
                self.events.push(event);
            }
        }
        Ok(self)
    }

    fn read_non_work_assignment(&mut self, line: &str) -> Result<(), ParseErrorKind> {
        let Some((key, value)) = line.split_once('=') else {
            return Err(ParseErrorKind::syntax(format!(
                "expected '{NON_WORK_KEY} = ...' after {NON_WORK_HEADER}"
            )));
        };
        let key = key.trim();
        if key != NON_WORK_KEY {
            return Err(ParseErrorKind::syntax(format!(
                "unknown key '{key}' in {NON_WORK_HEADER} (expected '{NON_WORK_KEY}')"
            )));
        }
        let names = value
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty());
        self.registry.mark_non_work(names)
    }

    fn read_event(&mut self, number: usize, line: &str) -> Result<RawEvent, ParseErrorKind> {
        let mut tokens: Vec<&str> = line.split_whitespace().collect();

        let inline_category = match tokens.last() {
            Some(last) if tokens.len() > 3 => INLINE_CATEGORY
                .captures(last)
                .and_then(|caps| caps.get(1))
                .map(|name| name.as_str().to_string()),
            _ => None,
        };
        if inline_category.is_some() {
            tokens.pop();
        }

        let recurrence_token = tokens.first().copied().unwrap_or_default();
        let recurrence = Recurrence::from_token(recurrence_token).ok_or_else(|| {
            ParseErrorKind::syntax(format!(
                "unknown recurrence '{recurrence_token}' (expected Weekly, WeekA or WeekB)"
            ))
        })?;

        let day_token = tokens
            .get(1)
            .ok_or_else(|| ParseErrorKind::syntax("missing day codes"))?;
        let days = day_token
            .chars()
            .map(|code| {
                weekday_from_code(code).ok_or_else(|| {
                    ParseErrorKind::syntax(format!(
                        "invalid day code '{code}' in '{day_token}' (use {DAY_CODES})"
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let start_token = tokens
            .get(2)
            .ok_or_else(|| ParseErrorKind::syntax("missing start time"))?;
        let start_minute = parse_time(start_token)?;

        // A second token that reads as a time makes this a block; otherwise
        // the description starts there.
        let end_minute = tokens.get(3).and_then(|token| parse_time(token).ok());
        let description_start = if end_minute.is_some() { 4 } else { 3 };
        let description = tokens.get(description_start..).unwrap_or_default().join(" ");

        let category = inline_category
            .or_else(|| self.registry.active().map(str::to_string))
            .ok_or(ParseErrorKind::MissingCategory)?;
        self.registry.resolve(&category);

        Ok(RawEvent {
            recurrence,
            days,
            start_minute,
            end_minute,
            description,
            category,
            line: number,
        })
    }
}

fn require_name(name: &str) -> Result<&str, ParseErrorKind> {
    if name.is_empty() {
        Err(ParseErrorKind::syntax("missing category name after '@'"))
    } else {
        Ok(name)
    }
}
