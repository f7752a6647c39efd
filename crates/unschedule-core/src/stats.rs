//! Time-allocation totals per week variant.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::event::WeekVariant;
use crate::recurrence::Occurrence;
use crate::time::{MINUTES_PER_DAY, MINUTES_PER_HOUR};

pub const MINUTES_PER_WEEK: u32 = MINUTES_PER_DAY as u32 * 7;
pub const UNSCHEDULED: &str = "Unscheduled";

/// Totals for one week of the rotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantStats {
    pub week_variant: WeekVariant,
    pub category_minutes: BTreeMap<String, u64>,
    pub work_minutes: u64,
    pub non_work_minutes: u64,
    pub scheduled_minutes: u64,
    /// `10080 - scheduled_minutes`; negative when overlapping blocks book
    /// more than the whole week.
    pub free_minutes: i64,
}

/// One row of the averaged allocation table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAverage {
    pub name: String,
    pub hours_per_week: f64,
    pub hours_per_day: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    /// Week A then week B.
    pub weeks: Vec<VariantStats>,
    pub average_free_hours: f64,
    /// Averaged across both weeks, largest first, including an
    /// `Unscheduled` row.
    pub categories: Vec<CategoryAverage>,
    pub work_categories: Vec<String>,
    pub non_work_categories: Vec<String>,
    /// Work time plus unscheduled time, averaged per week.
    pub available_hours_per_week: f64,
    pub available_hours_per_day: f64,
}

impl StatsReport {
    pub fn week(&self, variant: WeekVariant) -> Option<&VariantStats> {
        self.weeks.iter().find(|week| week.week_variant == variant)
    }
}

/// Sum block durations by category and by work/non-work classification.
/// Triggers contribute nothing.
///
/// `known_categories` names every category found in the schedule, so a
/// category with only triggers still appears in the work list.
pub fn compute_stats(
    occurrences: &[Occurrence],
    known_categories: &[String],
    non_work: &BTreeSet<String>,
) -> StatsReport {
    let weeks: Vec<VariantStats> = WeekVariant::ALL
        .iter()
        .map(|&variant| {
            let in_variant = occurrences
                .iter()
                .filter(move |occurrence| occurrence.week_variant == variant);
            tally(in_variant, non_work, variant)
        })
        .collect();

    let week_count = weeks.len();
    let average_minutes = |total: i64| -> f64 {
        if week_count == 0 {
            0.0
        } else {
            total as f64 / week_count as f64
        }
    };

    let total_free = weeks
        .iter()
        .fold(0i64, |total, week| total.saturating_add(week.free_minutes));
    let average_free_hours = to_hours(average_minutes(total_free));

    let mut category_totals: BTreeMap<&str, i64> = BTreeMap::new();
    for week in &weeks {
        for (name, minutes) in &week.category_minutes {
            let total = category_totals.entry(name.as_str()).or_default();
            *total = total.saturating_add(to_signed(*minutes));
        }
    }

    let work_categories: Vec<String> = known_categories
        .iter()
        .map(String::as_str)
        .chain(category_totals.keys().copied())
        .filter(|name| !non_work.contains(*name))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let non_work_categories: Vec<String> = non_work.iter().cloned().collect();

    let total_work = weeks
        .iter()
        .fold(0i64, |total, week| total.saturating_add(to_signed(week.work_minutes)));
    let available_hours_per_week =
        to_hours(average_minutes(total_work.saturating_add(total_free)));

    let mut categories: Vec<CategoryAverage> = category_totals
        .iter()
        .map(|(name, total)| averaged(name, average_minutes(*total)))
        .collect();
    categories.push(averaged(UNSCHEDULED, average_minutes(total_free)));
    categories.sort_by(|a, b| {
        b.hours_per_week
            .total_cmp(&a.hours_per_week)
            .then_with(|| a.name.cmp(&b.name))
    });

    StatsReport {
        weeks,
        average_free_hours,
        categories,
        work_categories,
        non_work_categories,
        available_hours_per_week,
        available_hours_per_day: available_hours_per_week / 7.0,
    }
}

/// Totals for the occurrences of one week variant. Sums saturate rather
/// than wrap.
fn tally<'a>(
    occurrences: impl IntoIterator<Item = &'a Occurrence>,
    non_work: &BTreeSet<String>,
    variant: WeekVariant,
) -> VariantStats {
    let mut category_minutes: BTreeMap<String, u64> = BTreeMap::new();
    let mut work_minutes: u64 = 0;
    let mut non_work_minutes: u64 = 0;

    for occurrence in occurrences.into_iter().filter(|occurrence| occurrence.is_block()) {
        let minutes = u64::from(occurrence.duration_minutes());
        let total = category_minutes
            .entry(occurrence.category.clone())
            .or_default();
        *total = total.saturating_add(minutes);
        if non_work.contains(&occurrence.category) {
            non_work_minutes = non_work_minutes.saturating_add(minutes);
        } else {
            work_minutes = work_minutes.saturating_add(minutes);
        }
    }

    let scheduled_minutes = work_minutes.saturating_add(non_work_minutes);
    VariantStats {
        week_variant: variant,
        category_minutes,
        work_minutes,
        non_work_minutes,
        scheduled_minutes,
        free_minutes: i64::from(MINUTES_PER_WEEK).saturating_sub(to_signed(scheduled_minutes)),
    }
}

fn to_signed(minutes: u64) -> i64 {
    i64::try_from(minutes).unwrap_or(i64::MAX)
}

fn averaged(name: &str, minutes_per_week: f64) -> CategoryAverage {
    let hours_per_week = to_hours(minutes_per_week);
    CategoryAverage {
        name: name.to_string(),
        hours_per_week,
        hours_per_day: hours_per_week / 7.0,
    }
}

fn to_hours(minutes: f64) -> f64 {
    minutes / f64::from(MINUTES_PER_HOUR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{RawEvent, Recurrence};
    use crate::recurrence::expand_all;
    use chrono::Weekday;

    fn raw(
        recurrence: Recurrence,
        days: &[Weekday],
        start: u16,
        end: Option<u16>,
        category: &str,
    ) -> RawEvent {
        RawEvent {
            recurrence,
            days: days.to_vec(),
            start_minute: start,
            end_minute: end,
            description: category.into(),
            category: category.into(),
            line: 1,
        }
    }

    fn non_work(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn empty_schedule_is_all_free() {
        let report = compute_stats(&[], &[], &BTreeSet::new());
        assert_eq!(report.weeks.len(), 2);
        for week in &report.weeks {
            assert_eq!(week.scheduled_minutes, 0);
            assert_eq!(week.work_minutes, 0);
            assert_eq!(week.non_work_minutes, 0);
            assert_eq!(week.free_minutes, 10_080);
        }
        assert_eq!(report.average_free_hours, 168.0);
        assert_eq!(report.categories.len(), 1);
        assert_eq!(report.categories[0].name, UNSCHEDULED);
        assert!(report.work_categories.is_empty());
    }

    #[test]
    fn totals_split_by_week_and_classification() {
        let events = vec![
            raw(Recurrence::Weekly, &[Weekday::Sun], 1320, Some(240), "Sleep"),
            raw(Recurrence::WeekA, &[Weekday::Mon, Weekday::Wed], 540, Some(630), "Teaching"),
            raw(Recurrence::WeekB, &[Weekday::Fri], 780, None, "Teaching"),
        ];
        let occurrences = expand_all(&events);
        let report = compute_stats(&occurrences, &[], &non_work(&["Sleep"]));

        let a = report.week(WeekVariant::A).unwrap();
        assert_eq!(a.category_minutes["Sleep"], 360);
        assert_eq!(a.category_minutes["Teaching"], 180);
        assert_eq!(a.non_work_minutes, 360);
        assert_eq!(a.work_minutes, 180);
        assert_eq!(a.free_minutes, 10_080 - 540);

        let b = report.week(WeekVariant::B).unwrap();
        assert_eq!(b.category_minutes.get("Teaching"), None);
        assert_eq!(b.scheduled_minutes, 360);

        assert_eq!(report.work_categories, vec!["Teaching".to_string()]);
        assert_eq!(report.non_work_categories, vec!["Sleep".to_string()]);
        assert_eq!(report.average_free_hours, (10_080.0 * 2.0 - 900.0) / 2.0 / 60.0);
    }

    #[test]
    fn free_time_balances_block_durations() {
        let events = vec![
            raw(Recurrence::Weekly, &[Weekday::Mon, Weekday::Tue], 0, Some(720), "A"),
            raw(Recurrence::WeekB, &[Weekday::Sat], 1380, Some(60), "B"),
            raw(Recurrence::WeekA, &[Weekday::Thu], 600, Some(600), "C"),
        ];
        let occurrences = expand_all(&events);
        let report = compute_stats(&occurrences, &[], &BTreeSet::new());
        for week in &report.weeks {
            let blocks: u32 = occurrences
                .iter()
                .filter(|o| o.week_variant == week.week_variant)
                .map(|o| o.duration_minutes())
                .sum();
            assert_eq!(week.free_minutes + i64::from(blocks), 10_080);
        }
    }

    #[test]
    fn category_rows_are_sorted_largest_first() {
        let events = vec![
            raw(Recurrence::Weekly, &[Weekday::Mon], 0, Some(60), "Short"),
            raw(Recurrence::Weekly, &[Weekday::Mon], 60, Some(300), "Long"),
        ];
        let report = compute_stats(&expand_all(&events), &[], &BTreeSet::new());
        let names: Vec<&str> = report.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec![UNSCHEDULED, "Long", "Short"]);
        let long = &report.categories[1];
        assert_eq!(long.hours_per_week, 4.0);
        assert_eq!(long.hours_per_day, 4.0 / 7.0);
    }

    #[test]
    fn trigger_only_and_defined_categories_are_work() {
        let events = vec![
            raw(Recurrence::Weekly, &[Weekday::Mon], 540, None, "Errands"),
            raw(Recurrence::Weekly, &[Weekday::Mon], 540, Some(600), "Work"),
        ];
        let known = vec![
            "Errands".to_string(),
            "Work".to_string(),
            "Unused".to_string(),
            "Sleep".to_string(),
        ];
        let report = compute_stats(&expand_all(&events), &known, &non_work(&["Sleep"]));
        assert_eq!(report.work_categories, vec!["Errands", "Unused", "Work"]);
        assert_eq!(report.non_work_categories, vec!["Sleep"]);
        let week = report.week(WeekVariant::A).unwrap();
        assert_eq!(week.category_minutes.get("Errands"), None);
        assert_eq!(week.work_minutes, 60);
    }

    #[test]
    fn huge_totals_do_not_wrap() {
        let block = Occurrence {
            week_variant: WeekVariant::A,
            weekday: Weekday::Mon,
            start_minute: 0,
            end_minute: 1439,
            kind: crate::recurrence::OccurrenceKind::Block,
            part: crate::recurrence::SpanPart::Whole,
            category: "Work".into(),
            description: "Marathon".into(),
            line: 1,
        };
        let repeats: u64 = 3_000_000;
        let week = tally(
            std::iter::repeat_n(&block, repeats as usize),
            &BTreeSet::new(),
            WeekVariant::A,
        );
        assert_eq!(week.work_minutes, repeats * 1439);
        assert!(week.work_minutes > u64::from(u32::MAX));
        assert_eq!(week.category_minutes["Work"], repeats * 1439);
        assert_eq!(
            week.free_minutes,
            i64::from(MINUTES_PER_WEEK) - (repeats * 1439) as i64
        );
    }

    #[test]
    fn available_time_counts_work_and_free() {
        let events = vec![
            raw(Recurrence::Weekly, &[Weekday::Mon], 0, Some(600), "Sleep"),
            raw(Recurrence::Weekly, &[Weekday::Mon], 600, Some(720), "Work"),
        ];
        let report = compute_stats(&expand_all(&events), &[], &non_work(&["Sleep"]));
        assert_eq!(report.available_hours_per_week, 168.0 - 10.0);
        assert_eq!(report.available_hours_per_day, (168.0 - 10.0) / 7.0);
    }
}
