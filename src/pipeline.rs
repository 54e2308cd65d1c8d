//! End-to-end orchestration for one category.
//!
//! Wires the stages together in their fixed order: student records and the
//! class catalog are built from the input tables, choices are alias-mapped
//! and restricted to the catalog, and the result is handed to the
//! capacitated solver. Each stage fully consumes its predecessor's output;
//! the whole run is synchronous and shares no mutable state.

use crate::alias::{apply_aliases, restrict_to_catalog};
use crate::assign::{solve_assignment, AssignmentOutcome};
use crate::catalog::{CapacityBounds, CapacityOverride, ClassCatalog};
use crate::cost::CostConfig;
use crate::error::{Error, Result};
use crate::lp::{DenseSimplex, LpSolver};
use crate::students::build_students;
use crate::table::{SchemaConfig, Table};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Everything one category run needs beyond the four input tables.
///
/// Loadable from TOML; every field but the category has usable defaults.
///
/// ```
/// use seatflow::pipeline::RunConfig;
///
/// let config: RunConfig = RunConfig::from_toml_str(r#"
///     category = "Academic"
///
///     [capacity_overrides."Robotics Basics"]
///     max = 24
///
///     [aliases]
///     "Robots!" = "Robotics Basics"
/// "#).unwrap();
/// assert_eq!(config.category, "Academic");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Category to assign (matched against the presentation listing).
    pub category: String,
    /// Run-wide capacity defaults.
    pub capacity_defaults: CapacityBounds,
    /// Per-class capacity overrides, keyed by canonical title.
    pub capacity_overrides: BTreeMap<String, CapacityOverride>,
    /// Choice alias table (variant spelling → canonical title).
    pub aliases: BTreeMap<String, String>,
    /// Cost tables.
    pub cost: CostConfig,
    /// Input column names.
    pub schema: SchemaConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            category: "Academic".into(),
            capacity_defaults: CapacityBounds::default(),
            capacity_overrides: BTreeMap::new(),
            aliases: BTreeMap::new(),
            cost: CostConfig::default(),
            schema: SchemaConfig::default(),
        }
    }
}

impl RunConfig {
    /// Creates a config for `category` with all defaults.
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Self::default()
        }
    }

    /// Parses a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Loads a config from a TOML file.
    pub fn from_toml_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.category.trim().is_empty() {
            return Err(Error::Config("category must not be empty".into()));
        }
        if self.capacity_defaults.max < self.capacity_defaults.min {
            return Err(Error::Config(format!(
                "default max capacity {} is below min capacity {}",
                self.capacity_defaults.max, self.capacity_defaults.min
            )));
        }
        self.cost.validate().map_err(Error::Config)
    }
}

/// Runs one category's assignment with the built-in simplex solver.
pub fn run_category(
    roster: &Table,
    presenters: &Table,
    signups: &Table,
    presentations: &Table,
    config: &RunConfig,
) -> Result<AssignmentOutcome> {
    run_category_with_solver(
        roster,
        presenters,
        signups,
        presentations,
        config,
        &DenseSimplex::new(),
    )
}

/// Runs one category's assignment through a caller-supplied LP solver.
pub fn run_category_with_solver(
    roster: &Table,
    presenters: &Table,
    signups: &Table,
    presentations: &Table,
    config: &RunConfig,
    solver: &dyn LpSolver,
) -> Result<AssignmentOutcome> {
    config.validate()?;
    info!(category = %config.category, "starting category assignment");

    let students = build_students(roster, presenters, signups, &config.schema, &config.category)?;
    let catalog = ClassCatalog::from_presentations(
        presentations,
        &config.schema,
        &config.category,
        config.capacity_defaults,
        &config.capacity_overrides,
    )?;

    let students = apply_aliases(&students, &config.aliases);
    let students = restrict_to_catalog(&students, &catalog);

    solve_assignment(&students, &catalog, &config.cost, solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assign::UNLISTED_RANK;
    use std::io::Cursor;

    fn table(name: &str, csv: &str) -> Table {
        Table::from_csv_reader(name, Cursor::new(csv.to_string())).expect("parse")
    }

    fn choice_header(category: &str) -> String {
        ["first", "second", "third", "fourth", "fifth"]
            .iter()
            .map(|o| {
                format!("Which presentation is your {o} choice for the {category} block?")
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    fn presentations() -> Table {
        table(
            "Presentations",
            "Presentation Category (choose the best fit),\"Name of your presentation: \"\"Creative Title: Descriptive Title\"\"  (15 words max)\"\n\
             \"1 Academics\",1. Chess Openings\n\
             \"1 Academics\",2. Robotics Basics\n\
             \"1 Academics\",3. Model Rockets\n",
        )
    }

    fn run_config() -> RunConfig {
        let mut config = RunConfig::new("Academic");
        config.capacity_defaults = CapacityBounds { min: 1, max: 2 };
        config
            .aliases
            .insert("Robots!".into(), "2. Robotics Basics".into());
        config
    }

    #[test]
    fn test_full_pipeline() {
        let roster = table(
            "Roster",
            "Email,Student name,Grade level\n\
             s1@x.org,One,9\n\
             s2@x.org,Two,10\n\
             s3@x.org,Three,11\n\
             s4@x.org,Four,12\n\
             pres@x.org,Presenter,12\n",
        );
        let presenters = table("Presenters", "E-mail 1 - Value\npres@x.org\n");
        // s1 wants Chess then Robotics (via alias); s2 wants Chess; s3 wants
        // Rockets; s4 never signed up and becomes a filler.
        let signups = table(
            "Signups",
            &format!(
                "Email Address,{}\n\
                 s1@x.org,1. Chess Openings,Robots!,,,\n\
                 s2@x.org,Chess   Openings,,,,\n\
                 s3@x.org,Model Rockets,,,,\n",
                choice_header("Academic")
            ),
        );

        let outcome = run_category(&roster, &presenters, &signups, &presentations(), &run_config())
            .expect("run");

        assert_eq!(outcome.assignments.len(), 4);
        // Every class must reach its minimum of one, so the filler covers
        // whichever class the sign-ups leave empty.
        let total: usize = outcome.rosters.iter().map(|r| r.assigned_count).sum();
        assert_eq!(total, 4);
        for roster_row in &outcome.rosters {
            assert!(roster_row.meets_minimum);
            assert!(roster_row.assigned_count <= roster_row.max_capacity);
        }

        let by_email = |email: &str| {
            outcome
                .assignments
                .iter()
                .find(|a| a.email == email)
                .expect("assigned")
        };
        // s2 and s3 have unique first choices and nothing competes for them.
        assert_eq!(by_email("s2@x.org").assigned_class, "Chess Openings");
        assert_eq!(by_email("s2@x.org").assigned_rank, 1);
        assert_eq!(by_email("s3@x.org").assigned_class, "Model Rockets");
        // s1 yields Chess to s2 (Chess max 2 is not binding, but Robotics
        // needs a body) or keeps Chess; either way their rank is 1 or 2.
        assert!(by_email("s1@x.org").assigned_rank <= 2);
        let filler = by_email("s4@x.org");
        assert!(filler.is_filler);
        assert_eq!(filler.assigned_rank, UNLISTED_RANK);
        // The presenter never appears.
        assert!(outcome.assignments.iter().all(|a| a.email != "pres@x.org"));
    }

    #[test]
    fn test_unknown_category_fails_with_catalog_error() {
        let roster = table("Roster", "Email,Student name,Grade level\ns1@x.org,One,9\n");
        let presenters = table("Presenters", "E-mail 1 - Value\n");
        let signups = table(
            "Signups",
            &format!("Email Address,{}\ns1@x.org,A,,,,\n", choice_header("Music")),
        );
        let err = run_category(
            &roster,
            &presenters,
            &signups,
            &presentations(),
            &RunConfig::new("Music"),
        )
        .expect_err("no such category");
        assert!(matches!(err, Error::EmptyCatalog { .. }));
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = RunConfig::from_toml_str(
            r#"
            category = "Sports"

            [capacity_defaults]
            min = 5
            max = 12

            [capacity_overrides."Free Climbing"]
            min = 2

            [cost]
            unlisted_cost = 25.0

            [schema]
            roster_email = "School Email"
            "#,
        )
        .expect("parse");

        assert_eq!(config.category, "Sports");
        assert_eq!(config.capacity_defaults, CapacityBounds { min: 5, max: 12 });
        assert_eq!(
            config.capacity_overrides["Free Climbing"],
            CapacityOverride {
                min: Some(2),
                max: None
            }
        );
        assert_eq!(config.cost.unlisted_cost, 25.0);
        assert_eq!(config.schema.roster_email, "School Email");
        // Unset sections keep their defaults.
        assert_eq!(config.cost.rank_costs, CostConfig::default().rank_costs);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(RunConfig::new("  ").validate().is_err());

        let mut config = RunConfig::new("Academic");
        config.capacity_defaults = CapacityBounds { min: 10, max: 5 };
        assert!(config.validate().is_err());

        let mut config = RunConfig::new("Academic");
        config.cost = CostConfig::default().with_filler_cost(99.0);
        assert!(config.validate().is_err());
    }
}
