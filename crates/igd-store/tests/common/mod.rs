#![allow(dead_code)]

use std::sync::Arc;

use datafusion::arrow::array::{Array, ArrayRef, Float64Array};
use datafusion::arrow::datatypes::{Field, Schema};
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::datasource::MemTable;
use datafusion::prelude::SessionContext;
use igd_common::config::StoreConfig;
use igd_store::session::create_session_context;

const FOOD_TRUCK_CSV: &str = include_str!("../../../igd-ml/tests/data/food_truck.csv");

pub const EXPECTED_INTERCEPT: f64 = -3.630291;
pub const EXPECTED_SLOPE: f64 = 1.166362;
pub const TOLERANCE: f64 = 1e-6;

pub fn session_context(batch_size: usize) -> SessionContext {
    create_session_context(&StoreConfig {
        batch_size,
        pass_mode: igd_common::config::PassModeKind::Aggregate,
        bias_column: "intercept".to_string(),
    })
}

/// Returns the populations and the profits of the food truck dataset.
pub fn food_truck() -> (Vec<f64>, Vec<f64>) {
    FOOD_TRUCK_CSV
        .lines()
        .skip(1)
        .map(|line| {
            let (x, y) = line.split_once(',').expect("invalid line");
            (
                x.trim().parse::<f64>().expect("invalid population"),
                y.trim().parse::<f64>().expect("invalid profit"),
            )
        })
        .unzip()
}

/// Registers a table with the given columns.
pub fn register_table(ctx: &SessionContext, name: &str, columns: Vec<(&str, ArrayRef)>) {
    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, array)| Field::new(*name, array.data_type().clone(), true))
            .collect::<Vec<_>>(),
    ));
    let batch = RecordBatch::try_new(
        Arc::clone(&schema),
        columns.into_iter().map(|(_, array)| array).collect(),
    )
    .expect("invalid record batch");
    let table = MemTable::try_new(schema, vec![vec![batch]]).expect("invalid table");
    ctx.register_table(name, Arc::new(table))
        .expect("failed to register table");
}

/// Registers the food truck dataset as table `food` with columns `x1` and `y1`.
pub fn register_food_truck(ctx: &SessionContext) {
    let (x, y) = food_truck();
    register_table(
        ctx,
        "food",
        vec![
            ("y1", Arc::new(Float64Array::from(y)) as ArrayRef),
            ("x1", Arc::new(Float64Array::from(x)) as ArrayRef),
        ],
    );
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} within {tolerance}, got {actual}"
    );
}
