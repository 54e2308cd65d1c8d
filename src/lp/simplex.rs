//! Dense two-phase tableau simplex.
//!
//! [`DenseSimplex`] is the default [`LpSolver`] implementation: a textbook
//! two-phase primal simplex over a dense tableau, using Bland's rule for
//! both the entering and the leaving variable. Bland's rule guarantees
//! termination without cycling and makes every pivot — and therefore the
//! returned vertex — fully deterministic, which the assignment decoder
//! relies on for reproducible tie-breaking.
//!
//! The implementation favors clarity over speed; assignment instances
//! (hundreds of students, tens of classes) solve comfortably. Callers with
//! larger problems can substitute any other [`LpSolver`].

use super::{LpProblem, LpSolution, LpSolver, LpStatus};

/// Deterministic two-phase dense simplex solver.
///
/// # Algorithm
///
/// 1. Inequality rows receive slack variables; rows with a negative
///    right-hand side are negated; equality rows and negated inequality
///    rows receive artificial variables.
/// 2. Phase 1 minimizes the sum of artificials; a positive optimum means
///    the problem is infeasible. Residual basic artificials are pivoted
///    out (or their rows dropped as redundant).
/// 3. Phase 2 minimizes the real objective with artificial columns barred
///    from entering.
///
/// Finite variable upper bounds are folded in as extra inequality rows
/// before standardization.
#[derive(Debug, Clone)]
pub struct DenseSimplex {
    /// Smallest magnitude accepted for a pivot element.
    pivot_tolerance: f64,
    /// Largest phase-1 residual still considered feasible.
    feasibility_tolerance: f64,
    /// Pivot cap across both phases.
    max_iterations: usize,
}

impl Default for DenseSimplex {
    fn default() -> Self {
        Self {
            pivot_tolerance: 1e-9,
            feasibility_tolerance: 1e-7,
            max_iterations: 100_000,
        }
    }
}

enum PivotOutcome {
    Optimal,
    Unbounded,
    IterationLimit,
}

impl DenseSimplex {
    /// Creates a solver with default tolerances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the smallest magnitude accepted for a pivot element.
    pub fn with_pivot_tolerance(mut self, tol: f64) -> Self {
        self.pivot_tolerance = tol;
        self
    }

    /// Sets the largest phase-1 residual still considered feasible.
    pub fn with_feasibility_tolerance(mut self, tol: f64) -> Self {
        self.feasibility_tolerance = tol;
        self
    }

    /// Sets the pivot cap across both phases.
    pub fn with_max_iterations(mut self, cap: usize) -> Self {
        self.max_iterations = cap;
        self
    }

    /// Normalizes the pivot row and eliminates the pivot column from every
    /// other row.
    fn pivot(
        tab: &mut [Vec<f64>],
        basis: &mut [usize],
        prow: usize,
        pcol: usize,
        total_cols: usize,
    ) {
        let piv = tab[prow][pcol];
        for j in 0..=total_cols {
            tab[prow][j] /= piv;
        }
        let pivot_row = tab[prow].clone();
        for (r, row) in tab.iter_mut().enumerate() {
            if r == prow {
                continue;
            }
            let factor = row[pcol];
            if factor != 0.0 {
                for j in 0..=total_cols {
                    row[j] -= factor * pivot_row[j];
                }
            }
        }
        basis[prow] = pcol;
    }

    /// Runs Bland-rule pivots until the reduced costs are non-negative.
    ///
    /// `entering_limit` bars columns at or beyond it from entering (used in
    /// phase 2 to keep artificials out of the basis).
    fn pivot_loop(
        &self,
        tab: &mut [Vec<f64>],
        basis: &mut [usize],
        reduced: &mut [f64],
        total_cols: usize,
        entering_limit: usize,
        iterations: &mut usize,
    ) -> PivotOutcome {
        loop {
            if *iterations >= self.max_iterations {
                return PivotOutcome::IterationLimit;
            }

            // Entering: smallest column index with a negative reduced cost.
            let Some(pcol) =
                (0..entering_limit).find(|&j| reduced[j] < -self.pivot_tolerance)
            else {
                return PivotOutcome::Optimal;
            };

            // Leaving: minimum ratio; ties go to the smallest basic index.
            let mut prow: Option<usize> = None;
            let mut best = f64::INFINITY;
            for r in 0..tab.len() {
                let a = tab[r][pcol];
                if a <= self.pivot_tolerance {
                    continue;
                }
                let ratio = tab[r][total_cols].max(0.0) / a;
                let better = match prow {
                    None => true,
                    Some(cur) => {
                        ratio < best - 1e-12
                            || ((ratio - best).abs() <= 1e-12 && basis[r] < basis[cur])
                    }
                };
                if better {
                    prow = Some(r);
                    best = ratio;
                }
            }
            let Some(prow) = prow else {
                return PivotOutcome::Unbounded;
            };

            Self::pivot(tab, basis, prow, pcol, total_cols);
            let factor = reduced[pcol];
            for j in 0..total_cols {
                reduced[j] -= factor * tab[prow][j];
            }
            *iterations += 1;
        }
    }
}

impl LpSolver for DenseSimplex {
    /// Solves the problem with the two-phase method.
    ///
    /// # Panics
    /// Panics if the problem shapes are inconsistent (see
    /// [`LpProblem::validate`]).
    fn solve(&self, problem: &LpProblem) -> LpSolution {
        problem.validate().expect("invalid LpProblem");

        let n = problem.num_vars();

        // Gather inequality rows; finite upper bounds become extra rows.
        let mut ineq: Vec<(Vec<f64>, f64)> = (0..problem.a_ub.rows())
            .map(|r| (problem.a_ub.row(r).to_vec(), problem.b_ub[r]))
            .collect();
        if let Some(bounds) = &problem.upper_bounds {
            for (j, &ub) in bounds.iter().enumerate() {
                if ub.is_finite() {
                    let mut row = vec![0.0; n];
                    row[j] = 1.0;
                    ineq.push((row, ub));
                }
            }
        }

        let p = problem.a_eq.rows();
        let q = ineq.len();

        // Column layout: structural [0, n), slack [n, n+q), artificial
        // [n+q, total_cols). Every equality row and every sign-flipped
        // inequality row gets an artificial.
        let num_art = p + ineq.iter().filter(|(_, b)| *b < 0.0).count();
        let art_start = n + q;
        let total_cols = art_start + num_art;

        let mut tab: Vec<Vec<f64>> = vec![vec![0.0; total_cols + 1]; p + q];
        let mut basis = vec![0usize; p + q];
        let mut next_art = art_start;

        for r in 0..p {
            let sign = if problem.b_eq[r] < 0.0 { -1.0 } else { 1.0 };
            for j in 0..n {
                tab[r][j] = sign * problem.a_eq.get(r, j);
            }
            tab[r][total_cols] = sign * problem.b_eq[r];
            tab[r][next_art] = 1.0;
            basis[r] = next_art;
            next_art += 1;
        }
        for (i, (coeffs, rhs)) in ineq.iter().enumerate() {
            let r = p + i;
            let sign = if *rhs < 0.0 { -1.0 } else { 1.0 };
            for j in 0..n {
                tab[r][j] = sign * coeffs[j];
            }
            tab[r][n + i] = sign;
            tab[r][total_cols] = sign * rhs;
            if sign > 0.0 {
                basis[r] = n + i;
            } else {
                tab[r][next_art] = 1.0;
                basis[r] = next_art;
                next_art += 1;
            }
        }

        let mut iterations = 0usize;

        // Phase 1: minimize the sum of artificials.
        if num_art > 0 {
            let mut reduced = vec![0.0; total_cols];
            for d in reduced.iter_mut().skip(art_start) {
                *d = 1.0;
            }
            for r in 0..tab.len() {
                if basis[r] >= art_start {
                    for j in 0..total_cols {
                        reduced[j] -= tab[r][j];
                    }
                }
            }

            match self.pivot_loop(
                &mut tab,
                &mut basis,
                &mut reduced,
                total_cols,
                total_cols,
                &mut iterations,
            ) {
                PivotOutcome::Optimal => {}
                // The phase-1 objective is bounded below by zero, so an
                // unbounded report here can only be numerical noise.
                PivotOutcome::Unbounded => {
                    return LpSolution {
                        iterations,
                        ..LpSolution::empty(LpStatus::Infeasible)
                    }
                }
                PivotOutcome::IterationLimit => {
                    return LpSolution {
                        iterations,
                        ..LpSolution::empty(LpStatus::IterationLimit)
                    }
                }
            }

            let residual: f64 = (0..tab.len())
                .filter(|&r| basis[r] >= art_start)
                .map(|r| tab[r][total_cols])
                .sum();
            if residual > self.feasibility_tolerance {
                return LpSolution {
                    iterations,
                    ..LpSolution::empty(LpStatus::Infeasible)
                };
            }

            // Pivot residual artificials out of the basis; rows that offer
            // no pivot are redundant constraints and are dropped.
            let mut r = 0;
            while r < tab.len() {
                if basis[r] >= art_start {
                    let pcol =
                        (0..art_start).find(|&j| tab[r][j].abs() > self.pivot_tolerance);
                    match pcol {
                        Some(j) => {
                            Self::pivot(&mut tab, &mut basis, r, j, total_cols);
                            r += 1;
                        }
                        None => {
                            tab.remove(r);
                            basis.remove(r);
                        }
                    }
                } else {
                    r += 1;
                }
            }
        }

        // Phase 2: minimize the real objective; artificials may not enter.
        let mut reduced = vec![0.0; total_cols];
        reduced[..n].copy_from_slice(&problem.objective);
        for r in 0..tab.len() {
            let b = basis[r];
            let cb = if b < n { problem.objective[b] } else { 0.0 };
            if cb != 0.0 {
                for j in 0..total_cols {
                    reduced[j] -= cb * tab[r][j];
                }
            }
        }

        match self.pivot_loop(
            &mut tab,
            &mut basis,
            &mut reduced,
            total_cols,
            art_start,
            &mut iterations,
        ) {
            PivotOutcome::Optimal => {}
            PivotOutcome::Unbounded => {
                return LpSolution {
                    iterations,
                    ..LpSolution::empty(LpStatus::Unbounded)
                }
            }
            PivotOutcome::IterationLimit => {
                return LpSolution {
                    iterations,
                    ..LpSolution::empty(LpStatus::IterationLimit)
                }
            }
        }

        let mut x = vec![0.0; n];
        for r in 0..tab.len() {
            if basis[r] < n {
                x[basis[r]] = tab[r][total_cols].max(0.0);
            }
        }
        let objective = x
            .iter()
            .zip(&problem.objective)
            .map(|(xi, ci)| xi * ci)
            .sum();

        LpSolution {
            status: LpStatus::Optimal,
            x,
            objective,
            iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::DenseMatrix;
    use proptest::prelude::*;

    fn matrix(rows: &[&[f64]], cols: usize) -> DenseMatrix {
        let mut m = DenseMatrix::zeros(rows.len(), cols);
        for (r, row) in rows.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                m.set(r, c, v);
            }
        }
        m
    }

    #[test]
    fn test_trivial_minimum_at_origin() {
        let solution = DenseSimplex::new().solve(&LpProblem::new(vec![1.0, 2.0]));
        assert!(solution.is_optimal());
        assert_eq!(solution.x, vec![0.0, 0.0]);
        assert_eq!(solution.objective, 0.0);
    }

    #[test]
    fn test_single_equality() {
        // min 2a + b  s.t.  a + b = 1
        let problem = LpProblem::new(vec![2.0, 1.0])
            .with_equalities(matrix(&[&[1.0, 1.0]], 2), vec![1.0]);
        let solution = DenseSimplex::new().solve(&problem);
        assert!(solution.is_optimal());
        assert!((solution.x[0] - 0.0).abs() < 1e-9);
        assert!((solution.x[1] - 1.0).abs() < 1e-9);
        assert!((solution.objective - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_inequality_binds() {
        // min -a  s.t.  a <= 5
        let problem = LpProblem::new(vec![-1.0])
            .with_inequalities(matrix(&[&[1.0]], 1), vec![5.0]);
        let solution = DenseSimplex::new().solve(&problem);
        assert!(solution.is_optimal());
        assert!((solution.x[0] - 5.0).abs() < 1e-9);
        assert!((solution.objective + 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_lower_bound_row_forces_value() {
        // min a  s.t.  -a <= -3  (i.e. a >= 3)
        let problem = LpProblem::new(vec![1.0])
            .with_inequalities(matrix(&[&[-1.0]], 1), vec![-3.0]);
        let solution = DenseSimplex::new().solve(&problem);
        assert!(solution.is_optimal());
        assert!((solution.x[0] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_upper_bounds_fold_in() {
        let problem = LpProblem::new(vec![-1.0, -1.0]).with_upper_bounds(vec![3.0, f64::INFINITY]);
        // Second variable unbounded above with a negative cost: unbounded.
        let solution = DenseSimplex::new().solve(&problem);
        assert_eq!(solution.status, LpStatus::Unbounded);

        let problem = LpProblem::new(vec![-1.0, 1.0]).with_upper_bounds(vec![3.0, 7.0]);
        let solution = DenseSimplex::new().solve(&problem);
        assert!(solution.is_optimal());
        assert!((solution.x[0] - 3.0).abs() < 1e-9);
        assert!((solution.x[1] - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_unbounded_detected() {
        let solution = DenseSimplex::new().solve(&LpProblem::new(vec![-1.0]));
        assert_eq!(solution.status, LpStatus::Unbounded);
    }

    #[test]
    fn test_infeasible_equalities() {
        // a + b = 1 and a + b = 2 cannot both hold.
        let problem = LpProblem::new(vec![1.0, 1.0]).with_equalities(
            matrix(&[&[1.0, 1.0], &[1.0, 1.0]], 2),
            vec![1.0, 2.0],
        );
        let solution = DenseSimplex::new().solve(&problem);
        assert_eq!(solution.status, LpStatus::Infeasible);
    }

    #[test]
    fn test_infeasible_bounds() {
        // a <= 1 and a >= 3.
        let problem = LpProblem::new(vec![0.0]).with_inequalities(
            matrix(&[&[1.0], &[-1.0]], 1),
            vec![1.0, -3.0],
        );
        let solution = DenseSimplex::new().solve(&problem);
        assert_eq!(solution.status, LpStatus::Infeasible);
    }

    #[test]
    fn test_redundant_equality_dropped() {
        // The duplicated row leaves an artificial stuck at zero; the solver
        // must drop it rather than stall.
        let problem = LpProblem::new(vec![2.0, 1.0]).with_equalities(
            matrix(&[&[1.0, 1.0], &[1.0, 1.0]], 2),
            vec![1.0, 1.0],
        );
        let solution = DenseSimplex::new().solve(&problem);
        assert!(solution.is_optimal());
        assert!((solution.objective - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_small_transportation_instance() {
        // Two students, two classes; both prefer class 0, which holds one.
        // Variables x00 x01 x10 x11; rows sum to 1; columns at most 1.
        let problem = LpProblem::new(vec![0.0, 2.0, 0.0, 2.0])
            .with_equalities(
                matrix(&[&[1.0, 1.0, 0.0, 0.0], &[0.0, 0.0, 1.0, 1.0]], 4),
                vec![1.0, 1.0],
            )
            .with_inequalities(
                matrix(&[&[1.0, 0.0, 1.0, 0.0], &[0.0, 1.0, 0.0, 1.0]], 4),
                vec![1.0, 2.0],
            );
        let solution = DenseSimplex::new().solve(&problem);
        assert!(solution.is_optimal());
        assert!((solution.objective - 2.0).abs() < 1e-9);
        let x = &solution.x;
        assert!((x[0] + x[1] - 1.0).abs() < 1e-9);
        assert!((x[2] + x[3] - 1.0).abs() < 1e-9);
        assert!(x[0] + x[2] <= 1.0 + 1e-9);
    }

    #[test]
    fn test_iteration_limit_surfaces() {
        let problem = LpProblem::new(vec![2.0, 1.0])
            .with_equalities(matrix(&[&[1.0, 1.0]], 2), vec![1.0]);
        let solution = DenseSimplex::new().with_max_iterations(0).solve(&problem);
        assert_eq!(solution.status, LpStatus::IterationLimit);
    }

    proptest! {
        // Random transportation polytopes stay feasible and keep unit row
        // sums when capacities are slack.
        #[test]
        fn prop_row_sums_hold(
            (n, m, costs) in (1usize..5, 1usize..4).prop_flat_map(|(n, m)| {
                (
                    Just(n),
                    Just(m),
                    proptest::collection::vec(0.0f64..20.0, n * m),
                )
            })
        ) {
            let mut a_eq = DenseMatrix::zeros(n, n * m);
            for i in 0..n {
                for j in 0..m {
                    a_eq.set(i, i * m + j, 1.0);
                }
            }
            let mut a_ub = DenseMatrix::zeros(m, n * m);
            for j in 0..m {
                for i in 0..n {
                    a_ub.set(j, i * m + j, 1.0);
                }
            }
            let problem = LpProblem::new(costs)
                .with_equalities(a_eq, vec![1.0; n])
                .with_inequalities(a_ub, vec![n as f64; m]);
            let solution = DenseSimplex::new().solve(&problem);
            prop_assert!(solution.is_optimal());
            for i in 0..n {
                let row_sum: f64 = (0..m).map(|j| solution.x[i * m + j]).sum();
                prop_assert!((row_sum - 1.0).abs() < 1e-6);
            }
            for &v in &solution.x {
                prop_assert!((-1e-9..=1.0 + 1e-6).contains(&v));
            }
        }
    }
}
