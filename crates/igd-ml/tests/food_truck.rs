//! Training on the food truck profit dataset.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use common::{assert_close, food_truck, EXPECTED_INTERCEPT, EXPECTED_SLOPE, TOLERANCE};
use igd_ml::accumulator::{GradientAccumulator, ReservoirAccumulator, Strategy};
use igd_ml::driver::{fit_source, run_pass, TrainingOptions};
use igd_ml::estimator::LinearRegression;
use igd_ml::source::{MemoryRowSource, RowSource};

fn options() -> TrainingOptions {
    TrainingOptions {
        learning_rate: 0.01,
        max_passes: 1500,
        strategy: Strategy::FullBatch,
        seed: 42,
    }
}

#[test]
fn test_full_batch_golden_values() {
    let (features, labels) = food_truck();
    let mut source = MemoryRowSource::from_columns(&labels, &features).unwrap();
    assert_eq!(source.rows(), 97);
    assert_eq!(source.cols(), 2);

    for _ in 0..20 {
        let outcome = fit_source(&mut source, &options()).unwrap();
        assert_eq!(outcome.passes, 1500);
        assert_close(outcome.theta[0], EXPECTED_INTERCEPT, TOLERANCE);
        assert_close(outcome.theta[1], EXPECTED_SLOPE, TOLERANCE);
    }
}

#[test]
fn test_estimator_golden_values() {
    let (features, labels) = food_truck();
    let model = LinearRegression::with_options(options())
        .fit(&features, &labels)
        .unwrap();
    assert_close(model.intercept(), EXPECTED_INTERCEPT, TOLERANCE);
    assert_close(model.coefficients()[0], EXPECTED_SLOPE, TOLERANCE);
}

#[test]
fn test_large_reservoir_golden_values() {
    let (features, labels) = food_truck();
    let mut source = MemoryRowSource::from_columns(&labels, &features).unwrap();
    let options = TrainingOptions {
        strategy: Strategy::Reservoir { capacity: 100 },
        ..options()
    };
    let outcome = fit_source(&mut source, &options).unwrap();
    assert_close(outcome.theta[0], EXPECTED_INTERCEPT, TOLERANCE);
    assert_close(outcome.theta[1], EXPECTED_SLOPE, TOLERANCE);
}

#[test]
fn test_small_reservoir_is_reproducible() {
    let (features, labels) = food_truck();
    let mut source = MemoryRowSource::from_columns(&labels, &features).unwrap();
    let options = TrainingOptions {
        strategy: Strategy::Reservoir { capacity: 20 },
        max_passes: 200,
        seed: 7,
        ..options()
    };
    let first = fit_source(&mut source, &options).unwrap();
    let second = fit_source(&mut source, &options).unwrap();
    assert_eq!(first, second);
    assert!(first.theta.iter().all(|t| t.is_finite()));
}

#[test]
fn test_reservoir_resamples_each_pass() {
    let (features, labels) = food_truck();
    let mut source = MemoryRowSource::from_columns(&labels, &features).unwrap();
    let params = options().params(source.rows(), source.cols());
    let mut accumulator = ReservoirAccumulator::seeded(params, 10, 11).unwrap();

    source.reset();
    while source.advance() {
        accumulator.consume(source.current().unwrap()).unwrap();
    }
    assert_eq!(accumulator.observed(), 97);
    assert_eq!(accumulator.sample().len(), 10);
    accumulator.finalize_pass();
    assert!(accumulator.sample().is_empty());

    assert_eq!(run_pass(&mut source, &mut accumulator).unwrap(), 97);
    assert_eq!(accumulator.passes(), 2);
}
