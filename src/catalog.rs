//! Title canonicalization and the class catalog.
//!
//! Free-text presentation listings carry enumeration prefixes ("3. Robotics
//! Basics"), inconsistent whitespace, and multi-line category labels with
//! time ranges ("1 Academics\n9:00-9:35"). This module normalizes both into
//! a stable, lexicographically sorted catalog of class titles with per-class
//! capacity bounds.

use crate::error::{Error, Result};
use crate::table::{SchemaConfig, Table};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Default minimum class occupancy.
pub const DEFAULT_MIN_CAPACITY: usize = 9;
/// Default maximum class occupancy.
pub const DEFAULT_MAX_CAPACITY: usize = 20;

/// Per-class minimum/maximum occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityBounds {
    /// Fewest students the class may run with.
    pub min: usize,
    /// Most students the class may hold.
    pub max: usize,
}

impl Default for CapacityBounds {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_CAPACITY,
            max: DEFAULT_MAX_CAPACITY,
        }
    }
}

/// Partial capacity override for a single class; unset fields keep the
/// run-wide defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityOverride {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

/// One class in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Canonical class title.
    pub title: String,
    /// Fewest students the class may run with.
    pub min_capacity: usize,
    /// Most students the class may hold.
    pub max_capacity: usize,
}

/// The immutable set of classes available for one category's solve.
///
/// Titles are canonical, deduplicated, and lexicographically sorted; the
/// entry index is the class index used throughout the cost matrix and the
/// LP formulation.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassCatalog {
    entries: Vec<CatalogEntry>,
}

impl ClassCatalog {
    /// Builds the catalog from the presentation listing.
    ///
    /// Keeps rows whose normalized category label matches `category`
    /// (both sides singularized, compared case-insensitively), canonicalizes
    /// their titles, drops absent titles, dedups, and sorts.
    ///
    /// Fails with [`Error::EmptyCatalog`] when no titles match: that is a
    /// data/category-name mismatch, fatal and never retried.
    pub fn from_presentations(
        presentations: &Table,
        schema: &SchemaConfig,
        category: &str,
        defaults: CapacityBounds,
        overrides: &BTreeMap<String, CapacityOverride>,
    ) -> Result<Self> {
        let cat_col = presentations.require_column(&schema.presentation_category)?;
        let title_col = presentations.require_column(&schema.presentation_title)?;

        let want = singularize(category);
        let mut titles = BTreeSet::new();
        for row in presentations.iter_rows() {
            let label = row[cat_col].as_str();
            if normalize_category(label).to_lowercase() != want {
                continue;
            }
            if let Some(title) = parse_title(&row[title_col]) {
                titles.insert(title);
            }
        }

        if titles.is_empty() {
            return Err(Error::EmptyCatalog {
                category: category.to_string(),
            });
        }
        info!(category, classes = titles.len(), "built class catalog");

        Self::from_titles(titles.into_iter().collect(), defaults, overrides)
    }

    /// Builds a catalog from already-canonical titles.
    ///
    /// Titles are sorted and deduplicated; capacities come from `defaults`
    /// patched by `overrides` (matched by exact canonical title).
    pub fn from_titles(
        mut titles: Vec<String>,
        defaults: CapacityBounds,
        overrides: &BTreeMap<String, CapacityOverride>,
    ) -> Result<Self> {
        titles.sort();
        titles.dedup();

        let mut entries = Vec::with_capacity(titles.len());
        for title in titles {
            let mut min = defaults.min;
            let mut max = defaults.max;
            if let Some(over) = overrides.get(&title) {
                if let Some(m) = over.min {
                    min = m;
                }
                if let Some(m) = over.max {
                    max = m;
                }
            }
            if max < min {
                return Err(Error::Config(format!(
                    "class '{title}': max capacity {max} is below min capacity {min}"
                )));
            }
            entries.push(CatalogEntry {
                title,
                min_capacity: min,
                max_capacity: max,
            });
        }

        Ok(Self { entries })
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no classes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Catalog entries in title order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// The class index of a canonical title, if present.
    pub fn index_of(&self, title: &str) -> Option<usize> {
        self.entries
            .binary_search_by(|e| e.title.as_str().cmp(title))
            .ok()
    }

    /// Whether the canonical title is a catalog member.
    pub fn contains(&self, title: &str) -> bool {
        self.index_of(title).is_some()
    }
}

/// Normalizes a free-text category label to a singular, title-cased word.
///
/// Extracts the first alphabetic token (labels may look like
/// `"1 Academics\n9:00-9:35"`), lower-cases it, strips one trailing `s`,
/// and upper-cases the first letter.
pub fn normalize_category(raw: &str) -> String {
    let token: String = raw
        .chars()
        .skip_while(|c| !c.is_ascii_alphabetic())
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if token.is_empty() {
        return String::new();
    }
    let mut word = token.to_lowercase();
    if word.ends_with('s') {
        word.pop();
    }
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-cases a requested category name and trims every trailing `s`.
fn singularize(name: &str) -> String {
    name.to_lowercase().trim_end_matches('s').to_string()
}

/// Canonicalizes a title: strips a leading enumeration prefix
/// (`<digits><. or )><spaces>`) and collapses runs of whitespace.
pub fn canonical_title(raw: &str) -> String {
    collapse_whitespace(strip_enumeration_prefix(raw.trim()))
}

/// Parses a raw title cell: empty strings and the literal token `NONE`
/// (case-insensitive) mean "no title".
pub fn parse_title(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return None;
    }
    let canonical = canonical_title(trimmed);
    if canonical.is_empty() {
        None
    } else {
        Some(canonical)
    }
}

/// Strips one leading `<digits><. or )><spaces>` enumeration prefix.
///
/// The prefix must leave a non-empty remainder; otherwise the input is
/// returned unchanged. Spaces are permitted between the digits and the
/// punctuation.
pub(crate) fn strip_enumeration_prefix(s: &str) -> &str {
    let after_space = s.trim_start();
    let digits_end = after_space
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(after_space.len());
    if digits_end == 0 {
        return s;
    }
    let rest = after_space[digits_end..].trim_start();
    let Some(stripped) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) else {
        return s;
    };
    let remainder = stripped.trim_start();
    if remainder.is_empty() {
        s
    } else {
        remainder
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
