//! Student record construction.
//!
//! Merges the roster, presenter-exclusion, and preference-survey tables
//! into canonical student records. Presenters never compete for slots;
//! roster members who skipped the survey become fillers. All joins are on
//! trimmed, lower-cased email addresses.

use crate::catalog::strip_enumeration_prefix;
use crate::error::{Error, Result};
use crate::table::{SchemaConfig, Table};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// High-school grade band, used only to perturb costs for deterministic
/// tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GradeBand {
    Freshman,
    Sophomore,
    Junior,
    Senior,
}

impl GradeBand {
    /// Stable index into per-band tables (0 = Freshman .. 3 = Senior).
    pub fn index(self) -> usize {
        match self {
            GradeBand::Freshman => 0,
            GradeBand::Sophomore => 1,
            GradeBand::Junior => 2,
            GradeBand::Senior => 3,
        }
    }

    /// Maps a free-text grade value onto a band.
    ///
    /// Recognizes common spellings (`"9"`, `"9th"`, `"freshman"`, ...); for
    /// anything else the first embedded digit run is re-interpreted the same
    /// way. Unrecognized values default to Senior.
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim().to_lowercase();
        if let Some(band) = Self::from_spelling(&s) {
            return band;
        }
        let digits: String = s
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        Self::from_spelling(&digits).unwrap_or(GradeBand::Senior)
    }

    fn from_spelling(s: &str) -> Option<Self> {
        match s {
            "9" | "9th" | "freshman" => Some(GradeBand::Freshman),
            "10" | "10th" | "sophomore" => Some(GradeBand::Sophomore),
            "11" | "11th" | "junior" => Some(GradeBand::Junior),
            "12" | "12th" | "senior" => Some(GradeBand::Senior),
            _ => None,
        }
    }
}

impl std::fmt::Display for GradeBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GradeBand::Freshman => "Freshman",
            GradeBand::Sophomore => "Sophomore",
            GradeBand::Junior => "Junior",
            GradeBand::Senior => "Senior",
        };
        f.write_str(s)
    }
}

/// A canonical student record.
///
/// Invariant: a filler always has an empty choice list; a non-filler may end
/// up with an empty list only when none of its stated preferences survives
/// mapping to the class catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Stable identifier (the normalized email).
    pub id: String,
    /// Normalized email address, unique across the run.
    pub email: String,
    /// Display name; defaults to the email when the roster has no name.
    pub display_name: String,
    /// Grade band for cost tie-breaking.
    pub grade_band: GradeBand,
    /// Ordered class choices, most preferred first, no duplicates.
    pub choices: Vec<String>,
    /// Whether this record was synthesized for a roster member who never
    /// signed up.
    pub is_filler: bool,
}

impl Student {
    /// Returns a copy of this record with a new choice list.
    ///
    /// The mapping passes produce new records rather than mutating in
    /// place.
    pub(crate) fn with_choices(&self, choices: Vec<String>) -> Self {
        Self {
            choices,
            ..self.clone()
        }
    }
}

/// Trims and lower-cases an email address.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

const ORDINALS: [&str; 5] = ["first", "second", "third", "fourth", "fifth"];

/// Finds the survey's five choice columns for `category`.
///
/// A header matches when its whitespace-collapsed, case-insensitive form
/// (trailing `?` ignored) equals
/// `"which presentation is your <ordinal> choice for the <category> block"`.
/// Returns the column indices ordered first..fifth, or a schema error if the
/// survey does not contain exactly one column per ordinal.
fn match_choice_columns(signups: &Table, category: &str) -> Result<[usize; 5]> {
    let category_norm = collapse_lower(category);
    let mut matches: [Vec<usize>; 5] = Default::default();

    for (idx, header) in signups.columns().iter().enumerate() {
        let mut normalized = collapse_lower(header);
        if let Some(stripped) = normalized.strip_suffix('?') {
            normalized = stripped.trim_end().to_string();
        }
        for (ord_idx, ordinal) in ORDINALS.iter().enumerate() {
            let expected = format!(
                "which presentation is your {ordinal} choice for the {category_norm} block"
            );
            if normalized == expected {
                matches[ord_idx].push(idx);
            }
        }
    }

    let total: usize = matches.iter().map(Vec::len).sum();
    let all_single = matches.iter().all(|m| m.len() == 1);
    if total != 5 || !all_single {
        let found: Vec<&str> = matches
            .iter()
            .flatten()
            .map(|&i| signups.columns()[i].as_str())
            .collect();
        return Err(Error::schema(
            signups.name(),
            format!(
                "expected exactly 5 choice columns for category '{category}', found {}: {found:?}",
                total
            ),
        ));
    }

    let cols = [
        matches[0][0],
        matches[1][0],
        matches[2][0],
        matches[3][0],
        matches[4][0],
    ];
    debug!(?cols, category, "matched survey choice columns");
    Ok(cols)
}

fn collapse_lower(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Parses one raw survey choice cell.
///
/// Empty cells and the literal token `NONE` mean "no choice"; otherwise the
/// enumeration prefix is stripped and the text kept verbatim (canonical
/// whitespace handling happens later, in the mapping passes).
fn parse_choice(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return None;
    }
    Some(strip_enumeration_prefix(trimmed).to_string())
}

/// Builds the full student list for one category.
///
/// Signup rows come first (survey order, deduplicated by email, first
/// submission wins), followed by filler records for roster members who never
/// signed up (roster order). Rows with an empty email and anyone in the
/// presenter table are skipped.
pub fn build_students(
    roster: &Table,
    presenters: &Table,
    signups: &Table,
    schema: &SchemaConfig,
    category: &str,
) -> Result<Vec<Student>> {
    let presenter_col = presenters.require_column(&schema.presenter_email)?;
    let presenter_set: HashSet<String> = presenters
        .iter_rows()
        .map(|row| normalize_email(&row[presenter_col]))
        .filter(|e| !e.is_empty())
        .collect();

    let roster_email_col = roster.require_column(&schema.roster_email)?;
    let roster_name_col = roster.column_index(&schema.roster_name);
    let roster_grade_col = roster.column_index(&schema.roster_grade);

    // First roster occurrence wins for both identity fields and filler order.
    let mut roster_order: Vec<String> = Vec::new();
    let mut roster_info: HashMap<String, (String, String)> = HashMap::new();
    for row in roster.iter_rows() {
        let email = normalize_email(&row[roster_email_col]);
        if email.is_empty() || presenter_set.contains(&email) {
            continue;
        }
        if roster_info.contains_key(&email) {
            continue;
        }
        let name = roster_name_col
            .map(|c| row[c].trim().to_string())
            .unwrap_or_default();
        let grade = roster_grade_col
            .map(|c| row[c].clone())
            .unwrap_or_default();
        roster_order.push(email.clone());
        roster_info.insert(email, (name, grade));
    }

    let signup_email_col = signups.require_column(&schema.signup_email)?;
    let choice_cols = match_choice_columns(signups, category)?;

    let mut students = Vec::new();
    let mut signed_up: HashSet<String> = HashSet::new();
    for row in signups.iter_rows() {
        let email = normalize_email(&row[signup_email_col]);
        if email.is_empty() || presenter_set.contains(&email) {
            continue;
        }
        if !signed_up.insert(email.clone()) {
            continue;
        }

        let mut choices = Vec::new();
        for &col in &choice_cols {
            if let Some(choice) = parse_choice(&row[col]) {
                if !choices.contains(&choice) {
                    choices.push(choice);
                }
            }
        }

        let (name, grade) = roster_info
            .get(&email)
            .cloned()
            .unwrap_or_default();
        students.push(Student {
            id: email.clone(),
            email: email.clone(),
            display_name: if name.is_empty() { email.clone() } else { name },
            grade_band: GradeBand::parse(&grade),
            choices,
            is_filler: false,
        });
    }

    let signup_count = students.len();
    for email in &roster_order {
        if signed_up.contains(email) {
            continue;
        }
        let (name, grade) = roster_info[email].clone();
        students.push(Student {
            id: email.clone(),
            email: email.clone(),
            display_name: if name.is_empty() { email.clone() } else { name },
            grade_band: GradeBand::parse(&grade),
            choices: Vec::new(),
            is_filler: true,
        });
    }

    info!(
        total = students.len(),
        signed_up = signup_count,
        fillers = students.len() - signup_count,
        presenters_excluded = presenter_set.len(),
        "built student records"
    );
    Ok(students)
}
