//! LP formulation, solve, and decode.

use super::types::{
    AssignmentOutcome, AssignmentRow, ClassRosterRow, SolveDiagnostics, UNLISTED_RANK,
};
use crate::catalog::ClassCatalog;
use crate::cost::{cost_matrix, CostConfig};
use crate::error::{Error, Result};
use crate::lp::{LpProblem, LpSolver};
use crate::matrix::DenseMatrix;
use crate::students::Student;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Solves one category's assignment.
///
/// Builds the cost matrix, formulates the transportation LP, solves it
/// through `solver`, and decodes a discrete one-class-per-student
/// assignment. Per-class counts in the roster rows are recomputed from the
/// decoded assignment; the fractional column sums are kept in the
/// diagnostics and a warning is logged when the two disagree.
///
/// # Errors
///
/// [`Error::Config`] when the cost tables fail validation, and
/// [`Error::Solver`] when the LP is infeasible or the solver reports any
/// non-optimal status — e.g. when the capacity minimums sum past the
/// student count, or the maximums sum below it. No partial assignment is
/// ever produced.
pub fn solve_assignment(
    students: &[Student],
    catalog: &ClassCatalog,
    config: &CostConfig,
    solver: &dyn LpSolver,
) -> Result<AssignmentOutcome> {
    config.validate().map_err(Error::Config)?;

    let n = students.len();
    let m = catalog.len();
    let costs = cost_matrix(students, catalog, config);
    let problem = formulate(&costs, catalog);
    debug!(
        students = n,
        classes = m,
        variables = problem.num_vars(),
        "formulated assignment LP"
    );

    let start = Instant::now();
    let solution = solver.solve(&problem);
    let solve_time_ms = start.elapsed().as_millis() as u64;

    if !solution.is_optimal() {
        return Err(Error::Solver(format!(
            "linear program is {} ({n} students, {m} classes)",
            solution.status
        )));
    }
    info!(
        objective = solution.objective,
        iterations = solution.iterations,
        solve_time_ms,
        "assignment LP solved"
    );

    // Decode: per student, the class with the largest fractional weight;
    // ties go to the lowest class index.
    let mut decoded_counts = vec![0usize; m];
    let mut assignments = Vec::with_capacity(n);
    let mut rank_counts = [0usize; 6];
    for (i, student) in students.iter().enumerate() {
        let row = &solution.x[i * m..(i + 1) * m];
        let mut best = 0usize;
        for (j, &weight) in row.iter().enumerate() {
            if weight > row[best] {
                best = j;
            }
        }
        let title = catalog.entries()[best].title.clone();
        let rank = rank_of(student, &title);
        rank_counts[(rank - 1) as usize] += 1;
        decoded_counts[best] += 1;
        assignments.push(AssignmentRow {
            email: student.email.clone(),
            display_name: student.display_name.clone(),
            grade_band: student.grade_band,
            is_filler: student.is_filler,
            assigned_class: title,
            assigned_rank: rank,
        });
    }

    let fractional_counts: Vec<usize> = (0..m)
        .map(|j| {
            (0..n)
                .map(|i| solution.x[i * m + j])
                .sum::<f64>()
                .round() as usize
        })
        .collect();
    if fractional_counts != decoded_counts {
        warn!(
            ?fractional_counts,
            ?decoded_counts,
            "LP optimum was not vertex-integral; decoded counts differ from fractional sums"
        );
    }

    let rosters: Vec<ClassRosterRow> = catalog
        .entries()
        .iter()
        .enumerate()
        .map(|(j, entry)| ClassRosterRow {
            class: entry.title.clone(),
            assigned_count: decoded_counts[j],
            min_capacity: entry.min_capacity,
            max_capacity: entry.max_capacity,
            meets_minimum: decoded_counts[j] >= entry.min_capacity,
        })
        .collect();

    Ok(AssignmentOutcome {
        assignments,
        rosters,
        diagnostics: SolveDiagnostics {
            objective: solution.objective,
            solve_time_ms,
            iterations: solution.iterations,
            rank_counts,
            fractional_counts,
        },
    })
}

/// 1-based rank of `title` in the student's choice list, or
/// [`UNLISTED_RANK`].
fn rank_of(student: &Student, title: &str) -> u8 {
    match student.choices.iter().position(|c| c == title) {
        Some(idx) => (idx + 1) as u8,
        None => UNLISTED_RANK,
    }
}

/// Builds the transportation LP.
///
/// Variables are flattened student-major: variable `i * m + j` is
/// (student `i`, class `j`), matching the cost matrix's row-major layout.
/// Row sums are pinned to 1; each class contributes a `≤ max` row and a
/// negated `≤ -min` row. The unit upper bound on each variable is implied
/// by its row-sum equality and non-negativity, so no explicit bounds are
/// passed.
fn formulate(costs: &DenseMatrix, catalog: &ClassCatalog) -> LpProblem {
    let n = costs.rows();
    let m = costs.cols();
    let nm = n * m;

    let mut a_eq = DenseMatrix::zeros(n, nm);
    for i in 0..n {
        for j in 0..m {
            a_eq.set(i, i * m + j, 1.0);
        }
    }

    let mut a_ub = DenseMatrix::zeros(2 * m, nm);
    let mut b_ub = vec![0.0; 2 * m];
    for (j, entry) in catalog.entries().iter().enumerate() {
        for i in 0..n {
            a_ub.set(j, i * m + j, 1.0);
            a_ub.set(m + j, i * m + j, -1.0);
        }
        b_ub[j] = entry.max_capacity as f64;
        b_ub[m + j] = -(entry.min_capacity as f64);
    }

    LpProblem::new(costs.as_slice().to_vec())
        .with_equalities(a_eq, vec![1.0; n])
        .with_inequalities(a_ub, b_ub)
}
