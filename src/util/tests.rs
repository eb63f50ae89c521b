#![allow(clippy::unwrap_used, reason = "allow in test files")]

use super::*;

#[test]
fn round_half_away_from_zero_positive() {
    assert_eq!(round_half_away_from_zero(2.5), 3);
    assert_eq!(round_half_away_from_zero(2.4), 2);
    assert_eq!(round_half_away_from_zero(2.6), 3);
    assert_eq!(round_half_away_from_zero(0.5), 1);
}

#[test]
fn round_half_away_from_zero_negative() {
    assert_eq!(round_half_away_from_zero(-2.5), -3);
    assert_eq!(round_half_away_from_zero(-2.4), -2);
    assert_eq!(round_half_away_from_zero(-2.6), -3);
    assert_eq!(round_half_away_from_zero(-0.5), -1);
}

#[test]
fn round_half_away_from_zero_zero() {
    assert_eq!(round_half_away_from_zero(0.0), 0);
}

#[test]
fn median_distinct_values() {
    assert_eq!(median(1, 2, 3), 2);
    assert_eq!(median(3, 2, 1), 2);
    assert_eq!(median(2, 3, 1), 2);
}

#[test]
fn median_duplicate_values() {
    assert_eq!(median(1, 1, 2), 1);
    assert_eq!(median(5, 3, 5), 5);
}
