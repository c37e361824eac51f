#![allow(dead_code)]

/// The food truck profit dataset: city population (in 10,000s) and profit
/// (in $10,000s) for 97 cities.
pub const FOOD_TRUCK_CSV: &str = include_str!("../data/food_truck.csv");

pub const EXPECTED_INTERCEPT: f64 = -3.630291;
pub const EXPECTED_SLOPE: f64 = 1.166362;
pub const TOLERANCE: f64 = 1e-6;

/// Returns the raw feature rows and the labels of the dataset.
pub fn food_truck() -> (Vec<Vec<f64>>, Vec<f64>) {
    let mut features = vec![];
    let mut labels = vec![];
    for line in FOOD_TRUCK_CSV.lines().skip(1) {
        let Some((x, y)) = line.split_once(',') else {
            panic!("invalid line: {line}");
        };
        let (Ok(x), Ok(y)) = (x.trim().parse::<f64>(), y.trim().parse::<f64>()) else {
            panic!("invalid line: {line}");
        };
        features.push(vec![x]);
        labels.push(y);
    }
    (features, labels)
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} within {tolerance}, got {actual}"
    );
}
