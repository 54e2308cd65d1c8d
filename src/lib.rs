//! Capacity-constrained preference assignment for presentation days.
//!
//! Places every student in exactly one presentation class within a
//! category, honoring per-class minimum and maximum occupancy while
//! maximizing satisfaction of ranked sign-up choices:
//!
//! - **Preprocessing**: free-text titles, categories, grades, and emails
//!   from the roster, presenter, sign-up, and presentation tables are
//!   normalized into canonical student records and a class catalog
//!   ([`table`], [`catalog`], [`students`], [`alias`]).
//! - **Cost model**: every (student, class) pair gets a scalar cost from
//!   choice rank, filler status, and a per-grade tie-break perturbation,
//!   all driven by configurable tables ([`cost`]).
//! - **Solving**: a transportation-style linear program — unit row sums,
//!   min/max column sums — is formulated generically and handed to a
//!   pluggable LP solver, then decoded into a discrete assignment
//!   ([`lp`], [`assign`]).
//! - **Reporting**: Top-k rates, mean rank, and the preference
//!   satisfaction index are derived from the decoded rows ([`metrics`]).
//!
//! # Architecture
//!
//! The pipeline is strictly layered and synchronous: each stage consumes
//! its predecessor's output and produces new immutable values. The LP
//! solver sits behind the [`lp::LpSolver`] trait; [`lp::DenseSimplex`] is
//! the shipped implementation, and any correct LP solver can be
//! substituted without touching the formulation. Every fatal condition
//! aborts the run — a partial assignment would leave students unplaced.
//!
//! # Example
//!
//! ```no_run
//! use seatflow::pipeline::{run_category, RunConfig};
//! use seatflow::table::Table;
//!
//! # fn main() -> Result<(), seatflow::error::Error> {
//! let roster = Table::from_csv_path("Roster", "roster.csv")?;
//! let presenters = Table::from_csv_path("Presenters", "presenters.csv")?;
//! let signups = Table::from_csv_path("Signups", "signups.csv")?;
//! let presentations = Table::from_csv_path("Presentations", "presentations.csv")?;
//!
//! let config = RunConfig::new("Academic");
//! let outcome = run_category(&roster, &presenters, &signups, &presentations, &config)?;
//! println!("{}", seatflow::metrics::summarize(&outcome.assignments));
//! # Ok(())
//! # }
//! ```

pub mod alias;
pub mod assign;
pub mod catalog;
pub mod cost;
pub mod error;
pub mod lp;
pub mod matrix;
pub mod metrics;
pub mod pipeline;
pub mod students;
pub mod table;
