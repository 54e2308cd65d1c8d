//! Satisfaction reporting.
//!
//! Consumes decoded assignment rows only; nothing here feeds back into the
//! solve.

use crate::assign::AssignmentRow;
use serde::{Deserialize, Serialize};

/// Per-rank weights for the preference satisfaction index.
///
/// Index 0 = rank 1 (full credit) through index 5 = rank 6 (off-list, no
/// credit).
pub const PSI_WEIGHTS: [f64; 6] = [1.00, 0.85, 0.70, 0.50, 0.30, 0.00];

/// Aggregate quality metrics for one solved category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatisfactionSummary {
    /// Students counted.
    pub total: usize,
    /// Histogram of assigned ranks 1..=6 (index 0 = rank 1).
    pub rank_counts: [usize; 6],
    /// Fraction of students who got their first choice.
    pub top1: f64,
    /// Fraction who got a top-two choice.
    pub top2: f64,
    /// Fraction who got a top-three choice.
    pub top3: f64,
    /// Mean assigned rank (1 best, 6 = off-list).
    pub mean_rank: f64,
    /// Preference satisfaction index in [0, 1].
    pub psi: f64,
}

/// Summarizes assignment rows with the default [`PSI_WEIGHTS`].
pub fn summarize(assignments: &[AssignmentRow]) -> SatisfactionSummary {
    summarize_weighted(assignments, &PSI_WEIGHTS)
}

/// Summarizes assignment rows with custom PSI weights.
pub fn summarize_weighted(
    assignments: &[AssignmentRow],
    psi_weights: &[f64; 6],
) -> SatisfactionSummary {
    let total = assignments.len();
    let mut rank_counts = [0usize; 6];
    for row in assignments {
        let rank = row.assigned_rank.clamp(1, 6) as usize;
        rank_counts[rank - 1] += 1;
    }

    if total == 0 {
        return SatisfactionSummary {
            total,
            rank_counts,
            top1: 0.0,
            top2: 0.0,
            top3: 0.0,
            mean_rank: 0.0,
            psi: 0.0,
        };
    }

    let t = total as f64;
    let cumulative =
        |k: usize| rank_counts.iter().take(k).sum::<usize>() as f64 / t;
    let mean_rank = rank_counts
        .iter()
        .enumerate()
        .map(|(idx, &count)| (idx + 1) * count)
        .sum::<usize>() as f64
        / t;
    let psi = rank_counts
        .iter()
        .zip(psi_weights)
        .map(|(&count, &w)| w * count as f64)
        .sum::<f64>()
        / t;

    SatisfactionSummary {
        total,
        rank_counts,
        top1: cumulative(1),
        top2: cumulative(2),
        top3: cumulative(3),
        mean_rank,
        psi,
    }
}

impl std::fmt::Display for SatisfactionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let c = &self.rank_counts;
        writeln!(f, "=== Satisfaction ===")?;
        writeln!(f, "Top-1: {:.3}  ({}/{})", self.top1, c[0], self.total)?;
        writeln!(f, "Top-2: {:.3}  ({}/{})", self.top2, c[0] + c[1], self.total)?;
        writeln!(
            f,
            "Top-3: {:.3}  ({}/{})",
            self.top3,
            c[0] + c[1] + c[2],
            self.total
        )?;
        writeln!(f, "Mean rank: {:.2}  (1 best, 6 = off-list)", self.mean_rank)?;
        write!(f, "PSI (0-1): {:.3}", self.psi)
    }
}
