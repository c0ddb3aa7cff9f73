use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dirstats::{
    log_bingham_const, BinghamSampler, BinghamWishartModel, ComplexBinghamSampler, Config,
    EigenGibbsSampler, Matrix, Vector,
};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

fn parameter_matrix(dims: usize) -> Matrix {
    Matrix::from_fn(dims, dims, |i, j| {
        if i == j {
            -(i as f64) * 1.5
        } else {
            0.1 / (1.0 + (i + j) as f64)
        }
    })
}

fn bench_constant(c: &mut Criterion) {
    let mut group = c.benchmark_group("bingham_constant");
    group.bench_function("saddlepoint_k5", |b| {
        let lambdas = [8.0, 4.0, 2.0, 1.0];
        b.iter(|| black_box(log_bingham_const(black_box(&lambdas)).ok()));
    });
    group.finish();
}

fn bench_bingham(c: &mut Criterion) {
    let mut group = c.benchmark_group("bingham");
    let a = parameter_matrix(5);

    group.bench_function("real_thin10_k5", |b| {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mut sampler = BinghamSampler::from_matrix(&a).unwrap();
        b.iter(|| black_box(sampler.sample(&mut rng, 10)));
    });

    group.bench_function("complex_k5", |b| {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
        let sampler = ComplexBinghamSampler::from_matrix(&a).unwrap();
        b.iter(|| black_box(sampler.sample(&mut rng).ok()));
    });
    group.finish();
}

fn bench_posterior(c: &mut Criterion) {
    let mut group = c.benchmark_group("posterior");
    group.sample_size(20);

    let scatter = Matrix::from_diagonal(&Vector::from_row_slice(&[0.4, 0.3, 0.2, 0.1]));
    let model = BinghamWishartModel::empty(4).incremented_dof(&scatter, 8.0).unwrap();

    group.bench_function("eigen_gibbs_step_p4", |b| {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let mut sampler =
            EigenGibbsSampler::new(model.inv_scale_l().clone(), model.dof(), &Config::default()).unwrap();
        b.iter(|| black_box(sampler.step(&mut rng).ok()));
    });

    group.bench_function("posterior_success_p4", |b| {
        let x = Vector::from_row_slice(&[0.5, 0.5, 0.5, 0.5]);
        b.iter(|| black_box(model.posterior_success(black_box(&x)).ok()));
    });
    group.finish();
}

criterion_group!(benches, bench_constant, bench_bingham, bench_posterior);
criterion_main!(benches);
