//! Histogram bucketing tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use iotmetrics_core::histogram::{
    bucket_index, cumulative_counts, validate_boundaries, Histogram, DEFAULT_BOUNDARIES,
};

#[test]
fn boundary_value_lands_in_its_own_bucket() {
    let b = [0.0, 5.0, 10.0];
    assert_eq!(bucket_index(0.0, &b), 0);
    assert_eq!(bucket_index(5.0, &b), 1);
    assert_eq!(bucket_index(5.000001, &b), 2);
    assert_eq!(bucket_index(10.0, &b), 2);
    assert_eq!(bucket_index(10.5, &b), 3);
    assert_eq!(bucket_index(-3.0, &b), 0);
}

#[test]
fn observations_update_count_sum_min_max() {
    let mut h = Histogram::new(vec![0.0, 5.0, 10.0]);
    for v in [2.0, 7.0, 2.0] {
        h.observe(v);
    }
    let p = h.point();
    assert_eq!(p.count, 3);
    assert_eq!(p.sum, 11.0);
    assert_eq!(p.min, 2.0);
    assert_eq!(p.max, 7.0);
    assert_eq!(p.bucket_counts, vec![0, 2, 1, 0]);
    assert_eq!(p.cumulative_counts, vec![0, 2, 3, 3]);
}

#[test]
fn empty_histogram_uses_sentinels() {
    let p = Histogram::default().point();
    assert_eq!(p.count, 0);
    assert_eq!(p.min, f64::INFINITY);
    assert_eq!(p.max, f64::NEG_INFINITY);
    assert_eq!(p.boundaries, DEFAULT_BOUNDARIES.to_vec());
    assert_eq!(p.bucket_counts.len(), DEFAULT_BOUNDARIES.len() + 1);
}

#[test]
fn first_negative_observation_sets_both_extremes() {
    let mut h = Histogram::new(vec![1.0]);
    h.observe(-4.5);
    let p = h.point();
    assert_eq!(p.min, -4.5);
    assert_eq!(p.max, -4.5);
}

#[test]
fn cumulative_last_equals_count_for_mixed_values() {
    let mut h = Histogram::default();
    let values = [0.0, 3.0, 12.5, 99.0, 100.0, 480.0, 10_000.0, 10_001.0, 1e9, -1.0];
    for v in values {
        h.observe(v);
    }
    let p = h.point();
    assert_eq!(*p.cumulative_counts.last().unwrap(), p.count);
    assert_eq!(p.count, values.len() as u64);
    assert!(p.cumulative_counts.windows(2).all(|w| w[0] <= w[1]));
    // 10_001 and 1e9 overflow into +Inf
    assert_eq!(*p.bucket_counts.last().unwrap(), 2);
}

#[test]
fn prefix_sums() {
    assert_eq!(cumulative_counts(&[1, 0, 4, 2]), vec![1, 1, 5, 7]);
    assert!(cumulative_counts(&[]).is_empty());
}

#[test]
fn boundary_validation() {
    assert!(validate_boundaries(&DEFAULT_BOUNDARIES).is_ok());
    assert!(validate_boundaries(&[]).is_err());
    assert!(validate_boundaries(&[1.0, 1.0]).is_err());
    assert!(validate_boundaries(&[5.0, 1.0]).is_err());
    assert!(validate_boundaries(&[1.0, f64::INFINITY]).is_err());
    let err = validate_boundaries(&[f64::NAN]).expect_err("nan must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}
