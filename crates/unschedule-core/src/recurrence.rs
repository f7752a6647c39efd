//! Expansion of raw events into concrete per-day occurrences.

use chrono::Weekday;
use serde::Serialize;

use crate::event::{RawEvent, WeekVariant};
use crate::time::MINUTES_PER_DAY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OccurrenceKind {
    Block,
    Trigger,
}

/// Which piece of the source event an occurrence covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpanPart {
    Whole,
    /// Evening half of an overnight block, ending at midnight.
    BeforeMidnight,
    /// Morning half of an overnight block, starting at midnight.
    AfterMidnight,
}

/// A same-day, non-wrapping time span (or instant) in one week variant.
///
/// Invariants: `start_minute < 1440` and `start_minute <= end_minute <= 1440`.
/// Triggers have `end_minute == start_minute`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub week_variant: WeekVariant,
    pub weekday: Weekday,
    pub start_minute: u16,
    pub end_minute: u16,
    pub kind: OccurrenceKind,
    pub part: SpanPart,
    pub category: String,
    pub description: String,
    pub line: usize,
}

impl Occurrence {
    pub fn is_block(&self) -> bool {
        self.kind == OccurrenceKind::Block
    }

    /// Minutes covered; zero for triggers and zero-length blocks.
    pub fn duration_minutes(&self) -> u32 {
        match self.kind {
            OccurrenceKind::Block => u32::from(self.end_minute - self.start_minute),
            OccurrenceKind::Trigger => 0,
        }
    }
}

/// Expand one raw event.
///
/// Output order is week variant, then day code as written. Duplicate day
/// codes yield duplicate occurrences. Overnight blocks become two pieces; the
/// morning piece is dropped when the block ends exactly at midnight.
pub fn expand(event: &RawEvent) -> Vec<Occurrence> {
    let mut occurrences = Vec::new();
    for &variant in event.recurrence.variants() {
        for &day in &event.days {
            push_day(&mut occurrences, event, variant, day);
        }
    }
    occurrences
}

/// Expand every event, preserving source order.
pub fn expand_all(events: &[RawEvent]) -> Vec<Occurrence> {
    events.iter().flat_map(expand).collect()
}

/// Occurrences belonging to one week variant.
pub fn for_variant(occurrences: &[Occurrence], variant: WeekVariant) -> Vec<&Occurrence> {
    occurrences
        .iter()
        .filter(|occurrence| occurrence.week_variant == variant)
        .collect()
}

fn push_day(out: &mut Vec<Occurrence>, event: &RawEvent, variant: WeekVariant, day: Weekday) {
    let piece = |weekday, start, end, kind, part| Occurrence {
        week_variant: variant,
        weekday,
        start_minute: start,
        end_minute: end,
        kind,
        part,
        category: event.category.clone(),
        description: event.description.clone(),
        line: event.line,
    };

    let start = event.start_minute;
    match event.end_minute {
        None => out.push(piece(
            day,
            start,
            start,
            OccurrenceKind::Trigger,
            SpanPart::Whole,
        )),
        Some(end) if end >= start => out.push(piece(
            day,
            start,
            end,
            OccurrenceKind::Block,
            SpanPart::Whole,
        )),
        Some(end) => {
            out.push(piece(
                day,
                start,
                MINUTES_PER_DAY,
                OccurrenceKind::Block,
                SpanPart::BeforeMidnight,
            ));
            if end > 0 {
                out.push(piece(
                    day.succ(),
                    0,
                    end,
                    OccurrenceKind::Block,
                    SpanPart::AfterMidnight,
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Recurrence;

    fn raw(recurrence: Recurrence, days: &[Weekday], start: u16, end: Option<u16>) -> RawEvent {
        RawEvent {
            recurrence,
            days: days.to_vec(),
            start_minute: start,
            end_minute: end,
            description: "X".into(),
            category: "Work".into(),
            line: 1,
        }
    }

    fn spans(occurrences: &[Occurrence]) -> Vec<(WeekVariant, Weekday, u16, u16)> {
        occurrences
            .iter()
            .map(|o| (o.week_variant, o.weekday, o.start_minute, o.end_minute))
            .collect()
    }

    #[test]
    fn weekly_block_lands_in_both_variants() {
        let event = raw(
            Recurrence::Weekly,
            &[Weekday::Mon, Weekday::Wed, Weekday::Fri],
            540,
            Some(630),
        );
        let occurrences = expand(&event);
        assert_eq!(occurrences.len(), 6);
        assert!(
            occurrences
                .iter()
                .all(|o| o.start_minute == 540 && o.end_minute == 630)
        );
        assert_eq!(for_variant(&occurrences, WeekVariant::A).len(), 3);
        assert_eq!(for_variant(&occurrences, WeekVariant::B).len(), 3);
    }

    #[test]
    fn single_variant_events_stay_put() {
        let a = expand(&raw(Recurrence::WeekA, &[Weekday::Tue], 60, Some(120)));
        let b = expand(&raw(Recurrence::WeekB, &[Weekday::Tue], 60, Some(120)));
        assert_eq!(spans(&a), vec![(WeekVariant::A, Weekday::Tue, 60, 120)]);
        assert_eq!(spans(&b), vec![(WeekVariant::B, Weekday::Tue, 60, 120)]);
    }

    #[test]
    fn overnight_block_splits_across_midnight() {
        let event = raw(Recurrence::Weekly, &[Weekday::Sun], 1320, Some(240));
        let occurrences = expand(&event);
        assert_eq!(
            spans(&occurrences),
            vec![
                (WeekVariant::A, Weekday::Sun, 1320, 1440),
                (WeekVariant::A, Weekday::Mon, 0, 240),
                (WeekVariant::B, Weekday::Sun, 1320, 1440),
                (WeekVariant::B, Weekday::Mon, 0, 240),
            ]
        );
        assert_eq!(occurrences[0].part, SpanPart::BeforeMidnight);
        assert_eq!(occurrences[1].part, SpanPart::AfterMidnight);
    }

    #[test]
    fn block_ending_at_midnight_has_no_morning_piece() {
        let occurrences = expand(&raw(Recurrence::WeekA, &[Weekday::Fri], 1320, Some(0)));
        assert_eq!(spans(&occurrences), vec![(WeekVariant::A, Weekday::Fri, 1320, 1440)]);
        assert_eq!(occurrences[0].duration_minutes(), 120);
    }

    #[test]
    fn block_starting_at_midnight_is_not_overnight() {
        let occurrences = expand(&raw(Recurrence::WeekA, &[Weekday::Sat], 0, Some(60)));
        assert_eq!(spans(&occurrences), vec![(WeekVariant::A, Weekday::Sat, 0, 60)]);
        assert_eq!(occurrences[0].part, SpanPart::Whole);
    }

    #[test]
    fn duplicate_day_codes_are_kept() {
        let occurrences = expand(&raw(
            Recurrence::WeekB,
            &[Weekday::Mon, Weekday::Mon],
            60,
            Some(90),
        ));
        assert_eq!(occurrences.len(), 2);
        assert_eq!(occurrences[0], occurrences[1]);
    }

    #[test]
    fn triggers_and_zero_length_blocks_have_no_duration() {
        let trigger = expand(&raw(Recurrence::WeekA, &[Weekday::Thu], 600, None));
        assert_eq!(trigger[0].kind, OccurrenceKind::Trigger);
        assert_eq!(trigger[0].end_minute, 600);
        assert_eq!(trigger[0].duration_minutes(), 0);

        let empty = expand(&raw(Recurrence::WeekA, &[Weekday::Thu], 600, Some(600)));
        assert_eq!(empty.len(), 1);
        assert_eq!(empty[0].kind, OccurrenceKind::Block);
        assert_eq!(empty[0].duration_minutes(), 0);
    }
}
