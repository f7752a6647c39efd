//! Category names, their colors, and the work/non-work split.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ParseErrorKind;

/// Fill colors handed out, in order, to categories that were never given one.
pub const COLOR_PALETTE: [&str; 10] = [
    "#AEC7E8", "#FFBB78", "#98DF8A", "#FF9896", "#C5B0D5", "#C49C94", "#F7B6D2", "#DBDB8D",
    "#9EDAE5", "#AD494A",
];

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("hex color regex"));
static NAMED_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]+$").expect("named color regex"));

/// A display color: `#RRGGBB` or a named color word such as `teal`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if HEX_COLOR.is_match(trimmed) {
            Ok(Color(trimmed.to_ascii_uppercase()))
        } else if NAMED_COLOR.is_match(trimmed) {
            Ok(Color(trimmed.to_ascii_lowercase()))
        } else {
            Err(format!(
                "invalid color '{trimmed}' (use #RRGGBB or a color name)"
            ))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Red, green and blue channels for hex colors.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        let hex = self.0.strip_prefix('#')?;
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
        Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Label color that stays readable on top of this fill.
    pub fn text_color(&self) -> &'static str {
        match self.rgb() {
            Some((r, g, b)) => {
                let luminance =
                    (0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)) / 255.0;
                if luminance > 0.5 { "black" } else { "white" }
            }
            None => "black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resolved category as exposed to renderers and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
    pub color: Color,
    /// `black` or `white`, whichever reads better on `color`.
    pub text_color: &'static str,
    pub is_non_work: bool,
}

/// Tracks explicit colors, auto-assigned colors, the active category and the
/// non-work set for a single parse run.
#[derive(Debug, Clone, Default)]
pub struct CategoryRegistry {
    explicit: HashMap<String, Color>,
    auto: HashMap<String, Color>,
    /// Names in first-encounter order (definition or use).
    order: Vec<String>,
    next_palette_index: usize,
    palette_wrapped: bool,
    active: Option<String>,
    non_work: Option<BTreeSet<String>>,
}

impl CategoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an explicit color.
    ///
    /// A color is fixed once set, whether it was defined or auto-assigned:
    /// repeating the same color is a no-op and any other color is rejected.
    pub fn define(&mut self, name: &str, color: Color) -> Result<(), ParseErrorKind> {
        if let Some(existing) = self.color_of(name) {
            if *existing == color {
                return Ok(());
            }
            return Err(ParseErrorKind::DuplicateDefinition {
                name: name.to_string(),
                existing: existing.to_string(),
                requested: color.to_string(),
            });
        }
        debug!(category = name, color = %color, "category defined");
        self.remember(name);
        self.explicit.insert(name.to_string(), color);
        Ok(())
    }

    /// Make `name` the category for following events that carry no inline override.
    pub fn set_active(&mut self, name: &str) {
        debug!(category = name, "active category switched");
        self.active = Some(name.to_string());
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Color for `name`, auto-assigning the next palette entry on first use.
    pub fn resolve(&mut self, name: &str) -> Color {
        if let Some(color) = self.explicit.get(name).or_else(|| self.auto.get(name)) {
            return color.clone();
        }

        if !self.palette_wrapped && self.next_palette_index >= COLOR_PALETTE.len() {
            warn!(
                palette_size = COLOR_PALETTE.len(),
                "Reached end of color palette; colors will be reused"
            );
            self.palette_wrapped = true;
        }
        let color = Color(COLOR_PALETTE[self.next_palette_index % COLOR_PALETTE.len()].to_string());
        self.next_palette_index += 1;
        debug!(category = name, color = %color, "color auto-assigned");

        self.remember(name);
        self.auto.insert(name.to_string(), color.clone());
        color
    }

    /// Record the non-work category set. It can only be declared once.
    pub fn mark_non_work<I, S>(&mut self, names: I) -> Result<(), ParseErrorKind>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let requested: BTreeSet<String> = names
            .into_iter()
            .map(Into::into)
            .filter(|name: &String| !name.is_empty())
            .collect();

        if let Some(existing) = &self.non_work {
            return Err(ParseErrorKind::DuplicateDefinition {
                name: "non_work_categories".to_string(),
                existing: join(existing),
                requested: join(&requested),
            });
        }
        debug!(categories = %join(&requested), "non-work categories declared");
        self.non_work = Some(requested);
        Ok(())
    }

    pub fn is_non_work(&self, name: &str) -> bool {
        self.non_work
            .as_ref()
            .is_some_and(|set| set.contains(name))
    }

    /// The declared non-work names, sorted. Empty when no section was given.
    pub fn non_work(&self) -> BTreeSet<String> {
        self.non_work.clone().unwrap_or_default()
    }

    /// Current color for `name` without assigning one.
    pub fn color_of(&self, name: &str) -> Option<&Color> {
        self.explicit.get(name).or_else(|| self.auto.get(name))
    }

    /// Every defined or used category in first-encounter order.
    pub fn categories(&self) -> Vec<Category> {
        self.order
            .iter()
            .filter_map(|name| {
                self.color_of(name).map(|color| Category {
                    name: name.clone(),
                    color: color.clone(),
                    text_color: color.text_color(),
                    is_non_work: self.is_non_work(name),
                })
            })
            .collect()
    }

    fn remember(&mut self, name: &str) {
        if !self.order.iter().any(|known| known == name) {
            self.order.push(name.to_string());
        }
    }
}

fn join(names: &BTreeSet<String>) -> String {
    names.iter().cloned().collect::<Vec<_>>().join(", ")
}
