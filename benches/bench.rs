use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::time::Duration;
use watchsat::sat::cnf::Cnf;
use watchsat::sat::configs::{Algorithm, Polarity, SolverConfig};
use watchsat::sat::solver::Solver;

/// Random 3-SAT at the given clause/variable ratio, reproducible per seed.
fn random_3sat(rng: &mut fastrand::Rng, num_vars: i32, num_clauses: usize) -> Cnf {
    Cnf::new((0..num_clauses).map(|_| {
        (0..3)
            .map(|_| {
                let var = rng.i32(1..=num_vars);
                if rng.bool() { var } else { -var }
            })
            .collect::<Vec<_>>()
    }))
}

fn instances(num_vars: i32, num_clauses: usize, count: usize) -> Vec<Cnf> {
    let mut rng = fastrand::Rng::with_seed(0x5a7);
    (0..count)
        .map(|_| random_3sat(&mut rng, num_vars, num_clauses))
        .collect()
}

fn solve_all(cnfs: &[Cnf], config: SolverConfig) {
    for cnf in cnfs {
        let mut solver = Solver::new(cnf.clone(), config);
        black_box(solver.solve());
    }
}

fn bench_algorithms(c: &mut Criterion) {
    // Small enough for plain enumeration to finish.
    let cnfs = instances(14, 60, 50);

    let mut group = c.benchmark_group("random 3-sat - algorithm");
    group.sample_size(30);
    group.measurement_time(Duration::from_secs(10));

    for algorithm in Algorithm::ALL {
        group.bench_function(algorithm.to_string(), |b| {
            b.iter(|| solve_all(&cnfs, SolverConfig::new(algorithm)));
        });
    }

    group.finish();
}

fn bench_preprocessing(c: &mut Criterion) {
    let cnfs = instances(40, 170, 50);

    let mut group = c.benchmark_group("random 3-sat - preprocessing");
    group.sample_size(30);
    group.measurement_time(Duration::from_secs(10));

    for algorithm in [Algorithm::Active, Algorithm::Dpll] {
        for preprocess in [false, true] {
            let config = SolverConfig::new(algorithm).with_preprocessing(preprocess);
            let name = if preprocess {
                format!("{algorithm} + unit propagation")
            } else {
                algorithm.to_string()
            };
            group.bench_function(name, |b| b.iter(|| solve_all(&cnfs, config)));
        }
    }

    group.finish();
}

fn bench_polarity(c: &mut Criterion) {
    let cnfs = instances(40, 170, 50);

    let mut group = c.benchmark_group("random 3-sat - polarity");
    group.sample_size(30);
    group.measurement_time(Duration::from_secs(10));

    for polarity in [Polarity::Watch, Polarity::True, Polarity::False, Polarity::Random] {
        let config = SolverConfig::new(Algorithm::Dpll).with_polarity(polarity);
        group.bench_function(polarity.to_string(), |b| {
            b.iter(|| solve_all(&cnfs, config));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_algorithms, bench_preprocessing, bench_polarity);

criterion_main!(benches);
