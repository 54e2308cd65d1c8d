//! Assignment result types.

use crate::students::GradeBand;
use serde::{Deserialize, Serialize};

/// Rank reported for a class absent from the student's choice list (and
/// for fillers, who have no list at all).
pub const UNLISTED_RANK: u8 = 6;

/// One student's final placement.
///
/// Serialized field names match the downstream spreadsheet headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRow {
    /// Normalized email address.
    #[serde(rename = "Email")]
    pub email: String,
    /// Display name.
    #[serde(rename = "Student")]
    pub display_name: String,
    /// Grade band.
    #[serde(rename = "GradeBand")]
    pub grade_band: GradeBand,
    /// Whether this record was a filler.
    #[serde(rename = "IsFiller")]
    pub is_filler: bool,
    /// Canonical title of the assigned class.
    #[serde(rename = "AssignedClass")]
    pub assigned_class: String,
    /// 1-based rank of the assigned class in the student's choice list;
    /// [`UNLISTED_RANK`] when the class was not chosen.
    #[serde(rename = "AssignedRank")]
    pub assigned_rank: u8,
}

/// One class's occupancy summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRosterRow {
    /// Canonical class title.
    #[serde(rename = "Class")]
    pub class: String,
    /// Students placed in the class by the decoded assignment.
    #[serde(rename = "AssignedCount")]
    pub assigned_count: usize,
    /// Configured minimum occupancy.
    #[serde(rename = "MinCap")]
    pub min_capacity: usize,
    /// Configured maximum occupancy.
    #[serde(rename = "MaxCap")]
    pub max_capacity: usize,
    /// Whether the decoded count reaches the minimum.
    #[serde(rename = "MeetsMin")]
    pub meets_minimum: bool,
}

/// Solve statistics and quality signals.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveDiagnostics {
    /// LP objective value at the optimum.
    pub objective: f64,
    /// Wall-clock solve time in milliseconds.
    pub solve_time_ms: u64,
    /// Simplex pivots performed.
    pub iterations: usize,
    /// Histogram of assigned ranks 1..=6 (index 0 = rank 1).
    pub rank_counts: [usize; 6],
    /// Per-class rounded column sums of the *fractional* LP solution.
    ///
    /// When the optimum is vertex-integral these equal the decoded
    /// per-class counts in [`ClassRosterRow::assigned_count`]; a mismatch
    /// means the decode step moved fractional mass and is logged as a
    /// warning.
    pub fractional_counts: Vec<usize>,
}

/// Full result of one category's solve.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentOutcome {
    /// One row per student, in student order.
    pub assignments: Vec<AssignmentRow>,
    /// One row per class, in catalog (title) order.
    pub rosters: Vec<ClassRosterRow>,
    /// Solve statistics.
    pub diagnostics: SolveDiagnostics,
}
