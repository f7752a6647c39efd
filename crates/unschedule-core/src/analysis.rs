use serde::Serialize;
use tracing::info;

use crate::category::Category;
use crate::error::ParseError;
use crate::event::WeekVariant;
use crate::overlap::{OverlapWarning, detect_overlaps};
use crate::parser::parse_schedule;
use crate::recurrence::{Occurrence, expand_all, for_variant};
use crate::stats::{StatsReport, compute_stats};

/// Everything downstream consumers need from one schedule text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub occurrences: Vec<Occurrence>,
    pub overlaps: Vec<OverlapWarning>,
    pub stats: StatsReport,
    pub categories: Vec<Category>,
}

impl Analysis {
    pub fn occurrences_for(&self, variant: WeekVariant) -> Vec<&Occurrence> {
        for_variant(&self.occurrences, variant)
    }
}

/// Parse, expand, check overlaps and aggregate in one pass.
///
/// Pure over `text`: the same input always produces the same analysis.
pub fn analyze(text: &str) -> Result<Analysis, ParseError> {
    let parsed = parse_schedule(text)?;
    let occurrences = expand_all(&parsed.events);
    let overlaps = detect_overlaps(&occurrences);
    let categories = parsed.categories();
    let names: Vec<String> = categories
        .iter()
        .map(|category| category.name.clone())
        .collect();
    let stats = compute_stats(&occurrences, &names, &parsed.non_work());

    info!(
        events = parsed.events.len(),
        occurrences = occurrences.len(),
        overlaps = overlaps.len(),
        "schedule analyzed"
    );

    Ok(Analysis {
        occurrences,
        overlaps,
        stats,
        categories,
    })
}
