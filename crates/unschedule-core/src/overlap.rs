//! Conflict detection between occurrences sharing a day.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::event::{WeekVariant, weekday_name};
use crate::recurrence::{Occurrence, OccurrenceKind};
use crate::time::{TimeFormat, format_minute};

/// Two occurrences on the same day of the same week variant that collide.
///
/// `first` always starts no later than `second`. For a trigger landing inside
/// a block, `overlap_minutes` is zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlapWarning {
    pub first: Occurrence,
    pub second: Occurrence,
    pub overlap_minutes: u16,
}

impl fmt::Display for OverlapWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Overlap on {} ({}) -> {} and {}",
            weekday_name(self.first.weekday),
            self.first.week_variant,
            Labelled(&self.first),
            Labelled(&self.second)
        )
    }
}

struct Labelled<'a>(&'a Occurrence);

impl fmt::Display for Labelled<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let occurrence = self.0;
        let start = format_minute(occurrence.start_minute, TimeFormat::TwentyFourHour);
        match occurrence.kind {
            OccurrenceKind::Trigger => write!(f, "'{}' ({start})", occurrence.description),
            OccurrenceKind::Block => write!(
                f,
                "'{}' ({start}-{})",
                occurrence.description,
                format_minute(occurrence.end_minute, TimeFormat::TwentyFourHour)
            ),
        }
    }
}

/// Every conflicting pair, bucketed by week variant then weekday (Monday
/// first), ordered by start time within a bucket.
///
/// Blocks conflict when `[s1, e1)` and `[s2, e2)` share at least one minute, so
/// touching blocks and zero-length blocks never conflict. A trigger at `t`
/// conflicts with a block when `s <= t < e`. Triggers never conflict with
/// each other.
pub fn detect_overlaps(occurrences: &[Occurrence]) -> Vec<OverlapWarning> {
    let mut buckets: BTreeMap<(WeekVariant, u32), Vec<&Occurrence>> = BTreeMap::new();
    for occurrence in occurrences {
        buckets
            .entry((
                occurrence.week_variant,
                occurrence.weekday.num_days_from_monday(),
            ))
            .or_default()
            .push(occurrence);
    }

    let mut warnings = Vec::new();
    for bucket in buckets.values_mut() {
        bucket.sort_by_key(|occurrence| (occurrence.start_minute, occurrence.end_minute));
        for (index, first) in bucket.iter().enumerate() {
            for second in &bucket[index + 1..] {
                if let Some(overlap_minutes) = conflict(first, second) {
                    warnings.push(OverlapWarning {
                        first: (*first).clone(),
                        second: (*second).clone(),
                        overlap_minutes,
                    });
                }
            }
        }
    }
    warnings
}

fn conflict(a: &Occurrence, b: &Occurrence) -> Option<u16> {
    use OccurrenceKind::{Block, Trigger};

    match (a.kind, b.kind) {
        (Block, Block) => {
            if a.start_minute == a.end_minute || b.start_minute == b.end_minute {
                return None;
            }
            let start = a.start_minute.max(b.start_minute);
            let end = a.end_minute.min(b.end_minute);
            (start < end).then(|| end - start)
        }
        (Block, Trigger) => contains(a, b.start_minute).then_some(0),
        (Trigger, Block) => contains(b, a.start_minute).then_some(0),
        (Trigger, Trigger) => None,
    }
}

fn contains(block: &Occurrence, instant: u16) -> bool {
    block.start_minute <= instant && instant < block.end_minute
}
