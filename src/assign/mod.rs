//! Capacitated assignment solving.
//!
//! Formulates the one-class-per-student problem as a transportation-style
//! linear program — unit row sums per student, min/max column sums per
//! class — hands it to an [`LpSolver`](crate::lp::LpSolver), and decodes
//! the fractional optimum into a discrete assignment.

mod solver;
mod types;

pub use solver::solve_assignment;
pub use types::{
    AssignmentOutcome, AssignmentRow, ClassRosterRow, SolveDiagnostics, UNLISTED_RANK,
};
