//! Console rendering of an [`Analysis`].

use chrono::Weekday;
use unschedule_core::event::weekday_name;
use unschedule_core::{
    Analysis, CalendarPreferences, Occurrence, OccurrenceKind, OverlapWarning, StatsReport,
    WeekVariant, format_minute,
};

const RULE_WIDTH: usize = 52;
const AVAILABLE_LABEL: &str = "Work+Unscheduled";

/// Overlap section followed by the allocation table.
pub fn render_report(analysis: &Analysis) -> String {
    let mut out = render_overlaps(&analysis.overlaps);
    out.push('\n');
    out.push_str(&render_stats(&analysis.stats));
    out
}

pub fn render_overlaps(overlaps: &[OverlapWarning]) -> String {
    let mut lines = vec!["--- Checking for overlaps ---".to_string()];
    if overlaps.is_empty() {
        lines.push("  No overlaps found.".to_string());
    }
    lines.extend(overlaps.iter().map(|warning| format!("  Warning: {warning}")));
    join_lines(lines)
}

pub fn render_stats(stats: &StatsReport) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let mut lines = vec![
        "--- Weekly Time Allocation Analysis ---".to_string(),
        format!("NON-WORK Categories: {}", list_or_none(&stats.non_work_categories)),
        format!("WORK Categories:     {}", list_or_none(&stats.work_categories)),
        rule.clone(),
        format!(
            "{:<15} | {:<15} | {:<15}",
            "Category", "Avg. Hours/Wk", "Avg. Hours/Day"
        ),
        rule.clone(),
    ];
    lines.extend(stats.categories.iter().map(|row| {
        format!(
            "{:<15} | {:<15.1} | {:<15.1}",
            row.name, row.hours_per_week, row.hours_per_day
        )
    }));
    lines.push(rule);
    lines.push(format!(
        "{:<15} | {:<15.1} | {:<15.1}",
        AVAILABLE_LABEL, stats.available_hours_per_week, stats.available_hours_per_day
    ));
    join_lines(lines)
}

/// Day-by-day listing, clipped to the calendar window.
///
/// Blocks are trimmed to the window and dropped when nothing remains; triggers
/// are kept when they fall inside it.
pub fn render_agenda(
    analysis: &Analysis,
    calendar: &CalendarPreferences,
    week: Option<WeekVariant>,
) -> String {
    let (window_start, window_end) = calendar.window_minutes();
    let variants: Vec<WeekVariant> = match week {
        Some(variant) => vec![variant],
        None => WeekVariant::ALL.to_vec(),
    };

    let mut lines = Vec::new();
    for variant in variants {
        lines.push(format!(
            "=== {variant} ({}-{}) ===",
            format_minute(window_start, calendar.time_format),
            format_minute(window_end, calendar.time_format)
        ));
        let occurrences = analysis.occurrences_for(variant);
        for day in week_days() {
            lines.push(weekday_name(day).to_string());
            let mut entries: Vec<(u16, u16, &Occurrence)> = occurrences
                .iter()
                .filter(|occurrence| occurrence.weekday == day)
                .filter_map(|occurrence| {
                    clip(occurrence, window_start, window_end)
                        .map(|(start, end)| (start, end, *occurrence))
                })
                .collect();
            entries.sort_by_key(|(start, end, _)| (*start, *end));

            if entries.is_empty() {
                lines.push("  (nothing scheduled)".to_string());
            }
            for (start, end, occurrence) in entries {
                lines.push(agenda_line(occurrence, start, end, calendar));
            }
        }
    }
    join_lines(lines)
}

fn agenda_line(
    occurrence: &Occurrence,
    start: u16,
    end: u16,
    calendar: &CalendarPreferences,
) -> String {
    let format = calendar.time_format;
    let span = match occurrence.kind {
        OccurrenceKind::Block => format!(
            "{}-{}",
            format_minute(start, format),
            format_minute(end, format)
        ),
        OccurrenceKind::Trigger => format_minute(start, format),
    };
    format!(
        "  {span:<19} {} [{}]",
        occurrence.description, occurrence.category
    )
}

fn clip(occurrence: &Occurrence, window_start: u16, window_end: u16) -> Option<(u16, u16)> {
    let inside = |minute: u16| window_start <= minute && minute < window_end;
    if occurrence.kind == OccurrenceKind::Trigger || occurrence.start_minute == occurrence.end_minute
    {
        return inside(occurrence.start_minute)
            .then_some((occurrence.start_minute, occurrence.end_minute));
    }
    let start = occurrence.start_minute.max(window_start);
    let end = occurrence.end_minute.min(window_end);
    (start < end).then_some((start, end))
}

fn week_days() -> impl Iterator<Item = Weekday> {
    std::iter::successors(Some(Weekday::Mon), |day| Some(day.succ())).take(7)
}

fn list_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "None defined".to_string()
    } else {
        names.join(", ")
    }
}

fn join_lines(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use unschedule_core::{TimeFormat, analyze};

    #[test]
    fn clip_trims_blocks_to_window() {
        let analysis = analyze("Weekly M 1a 5a Early @Sleep\nWeekly M 11p 12a Late @Sleep\n")
            .expect("parses");
        let early = &analysis.occurrences[0];
        assert_eq!(clip(early, 180, 1320), Some((180, 300)));
        let late = analysis
            .occurrences
            .iter()
            .find(|o| o.description == "Late")
            .expect("late block");
        assert_eq!(clip(late, 180, 1320), None);
        assert_eq!(clip(late, 180, 1440), Some((1380, 1440)));
    }

    #[test]
    fn trigger_on_window_end_is_hidden() {
        let analysis = analyze("Weekly T 10p Alarm @Home\n").expect("parses");
        let alarm = &analysis.occurrences[0];
        assert_eq!(clip(alarm, 180, 1320), None);
        assert_eq!(clip(alarm, 180, 1380), Some((1320, 1320)));
    }

    #[test]
    fn agenda_uses_configured_time_format() {
        let analysis = analyze("WeekB W 1:30p 3p Seminar @Talks\n").expect("parses");
        let calendar = CalendarPreferences {
            time_format: TimeFormat::TwelveHour,
            ..CalendarPreferences::default()
        };
        let agenda = render_agenda(&analysis, &calendar, Some(WeekVariant::B));
        assert!(agenda.starts_with("=== Week B (3:00 AM-10:00 PM) ==="), "{agenda}");
        assert!(agenda.contains("1:30 PM-3:00 PM"), "{agenda}");
        assert!(agenda.contains("Seminar [Talks]"), "{agenda}");
        assert!(!agenda.contains("Week A"));
    }
}
