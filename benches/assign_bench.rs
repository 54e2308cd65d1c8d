//! Criterion benchmarks for the assignment solve.
//!
//! Uses seeded synthetic populations so runs are reproducible and measure
//! formulation plus simplex cost, independent of any real sign-up data.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use seatflow::assign::solve_assignment;
use seatflow::catalog::{CapacityBounds, ClassCatalog};
use seatflow::cost::CostConfig;
use seatflow::lp::DenseSimplex;
use seatflow::students::{GradeBand, Student};
use std::collections::BTreeMap;

const BANDS: [GradeBand; 4] = [
    GradeBand::Freshman,
    GradeBand::Sophomore,
    GradeBand::Junior,
    GradeBand::Senior,
];

fn synthetic_instance(n: usize, m: usize, seed: u64) -> (Vec<Student>, ClassCatalog) {
    let mut rng = StdRng::seed_from_u64(seed);
    let titles: Vec<String> = (0..m).map(|j| format!("Class {j:02}")).collect();
    let catalog = ClassCatalog::from_titles(
        titles.clone(),
        CapacityBounds {
            min: n / (2 * m),
            max: 2 * n / m + 1,
        },
        &BTreeMap::new(),
    )
    .expect("catalog");

    let choice_count = 5.min(m);
    let students = (0..n)
        .map(|i| {
            let is_filler = rng.random_range(0..10) == 0;
            let mut choices = Vec::new();
            if !is_filler {
                while choices.len() < choice_count {
                    let title = titles[rng.random_range(0..m)].clone();
                    if !choices.contains(&title) {
                        choices.push(title);
                    }
                }
            }
            let email = format!("s{i}@bench.org");
            Student {
                id: email.clone(),
                email: email.clone(),
                display_name: email,
                grade_band: BANDS[rng.random_range(0..BANDS.len())],
                choices,
                is_filler,
            }
        })
        .collect();

    (students, catalog)
}

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve_assignment");
    for &(n, m) in &[(40usize, 6usize), (100, 8)] {
        let (students, catalog) = synthetic_instance(n, m, 42);
        let config = CostConfig::default();
        let solver = DenseSimplex::new();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{n}x{m}")),
            &(students, catalog),
            |b, (students, catalog)| {
                b.iter(|| {
                    solve_assignment(students, catalog, &config, &solver).expect("solve")
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_solve);
criterion_main!(benches);
