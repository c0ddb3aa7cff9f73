//! Bingham-Wishart model workflow: prior, updates and posterior sampling.

use std::sync::{Arc, Mutex};

use dirstats::{BinghamWishartModel, Config, Matrix, ModelEvent, Vector};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn prior_leans_toward_first_axis() {
    init_tracing();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(201);
    let model = BinghamWishartModel::with_prior(3, 5.0, 6.0, &mut rng, &Config::quick()).unwrap();

    // Pseudo-observations near e₁ make the inverse scale largest there.
    let inv_scale = model.inv_scale();
    assert!(inv_scale[(0, 0)] > inv_scale[(1, 1)]);
    assert!((inv_scale.trace() - 6.0).abs() < 1e-9);
    assert!((inv_scale[(1, 1)] - inv_scale[(2, 2)]).abs() < 1e-12);
}

#[test]
fn wishart_draws_average_to_mean() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(202);
    let model = BinghamWishartModel::empty(2)
        .incremented_dof(&Matrix::from_row_slice(2, 2, &[0.7, 0.1, 0.1, 0.3]), 6.0)
        .unwrap();

    let n = 4_000;
    let mut sum = Matrix::zeros(2, 2);
    for _ in 0..n {
        sum += model.sample_wishart(&mut rng).unwrap();
    }
    let mean = model.wishart_mean().unwrap();
    let err = (sum / n as f64 - &mean).amax();
    assert!(err < 0.1 * mean.amax(), "error {} against {}", err, mean);
}

#[test]
fn observations_accumulate() {
    init_tracing();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(203);
    let config = Config::quick();
    let events = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&events);

    let mut model = BinghamWishartModel::with_prior(3, 1.0, 4.0, &mut rng, &config)
        .unwrap()
        .with_observer(move |event| {
            if matches!(event, ModelEvent::Success { .. }) {
                *counter.lock().unwrap() += 1;
            }
        });

    for _ in 0..10 {
        let x = model.sample_success(&mut rng, config.thin).unwrap();
        assert!((x.norm() - 1.0).abs() < 1e-10);
        model = model.posterior_success(&x).unwrap();
    }

    assert_eq!(model.dof(), 14.0);
    assert_eq!(*events.lock().unwrap(), 10);
}

#[test]
fn failure_undoes_success_through_public_api() {
    let model = BinghamWishartModel::new(Matrix::identity(3, 3) * 2.0, 5.0).unwrap();
    let x = Vector::from_row_slice(&[0.0, 0.6, 0.8]);
    let back = model.posterior_success(&x).unwrap().posterior_failure(&x).unwrap();
    assert_eq!(back.dof(), 5.0);
    assert!((back.inv_scale() - model.inv_scale()).amax() < 1e-12);
}

#[test]
fn posterior_chains_run_from_model() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(204);
    let config = Config::quick();
    let model = BinghamWishartModel::with_prior(3, 2.0, 5.0, &mut rng, &config).unwrap();

    let mut gibbs = model.eigen_sampler(&config).unwrap();
    for sample in gibbs.iter(&mut rng).take(10) {
        assert_eq!(sample.unwrap().eigvals.len(), 3);
    }

    let mut metropolis = model.metropolis_sampler().unwrap();
    for m in metropolis.iter(&mut rng).take(10) {
        let m = m.unwrap();
        assert_eq!(m.clone(), m.transpose());
    }
    assert!(metropolis.acceptance_rate().unwrap() > 0.0);
}

#[test]
fn success_given_matrix_uses_it() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(205);
    let model = BinghamWishartModel::new(Matrix::identity(3, 3), 4.0).unwrap();
    // Bingham(−A/2) with A = diag(0, 0, 60) concentrates on the plane x₃ = 0.
    let a = Matrix::from_diagonal(&Vector::from_row_slice(&[0.0, 1.0, 60.0]));
    let n = 500;
    let mean: f64 = (0..n)
        .map(|_| model.sample_success_given(&a, &mut rng, 5).unwrap()[2].powi(2))
        .sum::<f64>()
        / n as f64;
    assert!(mean < 0.1, "E[x₃²] = {}", mean);
}
