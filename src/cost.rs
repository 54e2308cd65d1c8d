//! Cost model over (student, class) pairs.
//!
//! [`CostConfig`] holds every numeric policy table as data — rank costs,
//! the unlisted and filler costs, and the per-grade tie-break epsilons —
//! so alternate policies can be substituted without touching the solver.

use crate::catalog::ClassCatalog;
use crate::matrix::DenseMatrix;
use crate::students::{GradeBand, Student};
use serde::{Deserialize, Serialize};

/// Cost tables for the assignment objective.
///
/// Rank costs grow strictly with rank (diminishing desirability); the
/// unlisted cost exceeds every rank cost, and the filler cost sits strictly
/// between the worst rank cost and the unlisted cost — a filler has no
/// stated preference to violate, so placing one is cheaper than overriding
/// a real preference. Grade epsilons are sub-unit perturbations whose only
/// job is to break LP ties deterministically (by default, younger-grade
/// demand fills first); the ordering is policy and stays configurable.
///
/// # Defaults
///
/// ```
/// use seatflow::cost::CostConfig;
///
/// let config = CostConfig::default();
/// assert_eq!(config.rank_costs, [0.0, 2.0, 5.0, 9.0, 14.0]);
/// assert_eq!(config.unlisted_cost, 18.0);
/// assert_eq!(config.filler_cost, 12.0);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use seatflow::cost::CostConfig;
///
/// let config = CostConfig::default()
///     .with_unlisted_cost(25.0)
///     .with_grade_epsilons([0.003, 0.002, 0.001, 0.000]);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    /// Cost of landing a student's rank-1..rank-5 choice.
    pub rank_costs: [f64; 5],

    /// Cost of assigning a non-filler to a class absent from their list.
    pub unlisted_cost: f64,

    /// Base cost of assigning a filler to any class.
    pub filler_cost: f64,

    /// Tie-break perturbation per grade band, indexed Freshman..Senior.
    pub grade_epsilons: [f64; 4],
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            rank_costs: [0.0, 2.0, 5.0, 9.0, 14.0],
            unlisted_cost: 18.0,
            filler_cost: 12.0,
            grade_epsilons: [0.000, 0.001, 0.002, 0.003],
        }
    }
}

impl CostConfig {
    /// Sets the rank cost table.
    pub fn with_rank_costs(mut self, costs: [f64; 5]) -> Self {
        self.rank_costs = costs;
        self
    }

    /// Sets the unlisted-class cost.
    pub fn with_unlisted_cost(mut self, cost: f64) -> Self {
        self.unlisted_cost = cost;
        self
    }

    /// Sets the filler base cost.
    pub fn with_filler_cost(mut self, cost: f64) -> Self {
        self.filler_cost = cost;
        self
    }

    /// Sets the per-grade tie-break epsilons (Freshman..Senior order).
    pub fn with_grade_epsilons(mut self, epsilons: [f64; 4]) -> Self {
        self.grade_epsilons = epsilons;
        self
    }

    /// Validates the tables.
    ///
    /// Returns `Err` with a description if rank costs are not strictly
    /// increasing, the unlisted cost does not dominate them, the filler
    /// cost falls outside `(rank_costs[4], unlisted_cost)`, or any epsilon
    /// is negative or reaches 1.0 (epsilons must stay sub-unit so they can
    /// never override the rank-based ordering).
    pub fn validate(&self) -> Result<(), String> {
        if self.rank_costs.windows(2).any(|w| w[0] >= w[1]) {
            return Err("rank_costs must be strictly increasing".into());
        }
        if self.unlisted_cost <= self.rank_costs[4] {
            return Err("unlisted_cost must exceed the worst rank cost".into());
        }
        if self.filler_cost <= self.rank_costs[4] || self.filler_cost >= self.unlisted_cost {
            return Err(
                "filler_cost must lie strictly between the worst rank cost and unlisted_cost"
                    .into(),
            );
        }
        if self.grade_epsilons.iter().any(|&e| e < 0.0 || e >= 1.0) {
            return Err("grade_epsilons must lie in [0.0, 1.0)".into());
        }
        Ok(())
    }

    /// The tie-break epsilon for a grade band.
    pub fn grade_epsilon(&self, band: GradeBand) -> f64 {
        self.grade_epsilons[band.index()]
    }

    /// Cost of assigning `student` to the class titled `title`.
    ///
    /// Fillers pay the filler cost regardless of class; otherwise the cost
    /// follows the 1-based rank of `title` in the student's choice list,
    /// falling back to the unlisted cost when `title` is absent (or the
    /// rank exceeds the table). The grade epsilon is always added.
    pub fn cost(&self, student: &Student, title: &str) -> f64 {
        let eps = self.grade_epsilon(student.grade_band);
        if student.is_filler {
            return self.filler_cost + eps;
        }
        match student.choices.iter().position(|c| c == title) {
            Some(idx) => self.rank_costs.get(idx).copied().unwrap_or(self.unlisted_cost) + eps,
            None => self.unlisted_cost + eps,
        }
    }
}

/// Builds the n×m cost matrix (students × catalog classes, row-major).
pub fn cost_matrix(
    students: &[Student],
    catalog: &ClassCatalog,
    config: &CostConfig,
) -> DenseMatrix {
    let mut matrix = DenseMatrix::zeros(students.len(), catalog.len());
    for (i, student) in students.iter().enumerate() {
        for (j, entry) in catalog.entries().iter().enumerate() {
            matrix.set(i, j, config.cost(student, &entry.title));
        }
    }
    matrix
}
