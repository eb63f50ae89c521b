#![allow(clippy::unwrap_used, reason = "allow in test files")]

use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use super::*;

fn constant_plane(width: usize, height: usize, value: Sample) -> Plane {
    let mut p = Plane::new(width, height);
    for y in 0..height {
        for x in 0..width {
            p.set_pixel(x, y, value);
        }
    }
    p
}

fn checkerboard(size: usize, square: usize) -> Plane {
    let mut p = Plane::new(size, size);
    for y in 0..size {
        for x in 0..size {
            let on = ((x / square) + (y / square)) % 2 == 0;
            p.set_pixel(x, y, if on { 0xFFFF } else { 0x0000 });
        }
    }
    p
}

#[test]
fn diff_zero_self() {
    let p = checkerboard(16, 4);
    assert_eq!(p.diff(&p, 0, 0, 1, DiffVariant::Plain), 0.0);
}

#[test]
fn diff_symmetry() {
    let a = checkerboard(16, 4);
    let mut b = constant_plane(16, 16, 0x1234);
    for y in 0..16 {
        for x in 0..16 {
            b.set_pixel(x, y, a.pixel((x + 3) % 16, y));
        }
    }
    let fwd = a.diff(&b, 2, -1, 1, DiffVariant::Plain);
    let rev = b.diff(&a, -2, 1, 1, DiffVariant::Plain);
    assert_eq!(fwd, rev);
}

#[test]
fn diff_non_negative() {
    let a = checkerboard(16, 4);
    let b = checkerboard(16, 3);
    let d = a.diff(&b, 1, 1, 1, DiffVariant::Plain);
    assert!(d.is_finite());
    assert!(d >= 0.0);
}

#[test]
fn diff_no_overlap_is_infinite() {
    let a = Plane::new(4, 4);
    let b = Plane::new(4, 4);
    assert_eq!(a.diff(&b, 10, 10, 1, DiffVariant::Plain), f64::INFINITY);
}

#[test]
fn diff_thresholded_suppresses_small_noise() {
    let a = constant_plane(4, 4, 1000);
    let b = constant_plane(4, 4, 1005);
    assert_eq!(a.diff(&b, 0, 0, 1, DiffVariant::Thresholded), 0.0);
    assert!(a.diff(&b, 0, 0, 1, DiffVariant::Plain) > 0.0);
}

#[test]
fn scale_nearest_identity() {
    let p = checkerboard(8, 2);
    let scaled = p.scale_nearest(8, 8).unwrap();
    for y in 0..8 {
        for x in 0..8 {
            assert_eq!(scaled.pixel(x, y), p.pixel(x, y));
        }
    }
}

#[test]
fn scale_nearest_rejects_degenerate_target() {
    let p = Plane::new(4, 4);
    assert!(p.scale_nearest(1, 4).is_err());
    assert!(p.scale_nearest(4, 0).is_err());
}

#[test]
fn scale_generic_cubic_constant_color_is_unity() {
    let p = constant_plane(8, 8, 30000);
    let scaled = p
        .scale_generic(16, 16, 2.0, Filter::Cubic { b: 1.0 / 3.0, c: 1.0 / 3.0 })
        .unwrap();
    for y in 0..16 {
        for x in 0..16 {
            let v = i64::from(scaled.pixel(x, y));
            assert!((v - 30000).abs() <= 1, "pixel ({x},{y}) = {v}");
        }
    }
}

#[test]
fn scale_generic_linear_constant_color() {
    let p = constant_plane(8, 8, 128);
    let scaled = p.scale_generic(16, 16, 1.0, Filter::Linear).unwrap();
    for y in 0..16 {
        for x in 0..16 {
            let v = i64::from(scaled.pixel(x, y));
            assert!((v - 128).abs() <= 1);
        }
    }
}

#[test]
fn overlap_rect_empty_when_disjoint() {
    assert!(overlap_rect(4, 4, 4, 4, 10, 0).is_none());
    assert!(overlap_rect(4, 4, 4, 4, 0, -10).is_none());
}

#[test]
fn overlap_rect_full_when_aligned() {
    let o = overlap_rect(8, 8, 8, 8, 0, 0).unwrap();
    assert_eq!(o.width, 8);
    assert_eq!(o.height, 8);
    assert_eq!(o.self_left, 0);
    assert_eq!(o.other_left, 0);
}

fn plane_from_seed(seed: u8, size: usize) -> Plane {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(u64::from(seed));
    let mut p = Plane::new(size, size);
    for y in 0..size {
        for x in 0..size {
            p.set_pixel(x, y, rng.random::<Sample>());
        }
    }
    p
}

#[quickcheck]
fn prop_diff_zero_self(seed: u8) -> TestResult {
    let p = plane_from_seed(seed, 12);
    TestResult::from_bool(p.diff(&p, 0, 0, 1, DiffVariant::Plain) == 0.0)
}

#[quickcheck]
fn prop_diff_symmetry(seed_a: u8, seed_b: u8, dx: i8, dy: i8) -> TestResult {
    let a = plane_from_seed(seed_a, 12);
    let b = plane_from_seed(seed_b, 12);
    let (dx, dy) = (i64::from(dx), i64::from(dy));
    TestResult::from_bool(a.diff(&b, dx, dy, 1, DiffVariant::Plain) == b.diff(&a, -dx, -dy, 1, DiffVariant::Plain))
}

#[quickcheck]
fn prop_diff_non_negative(seed_a: u8, seed_b: u8, dx: i8, dy: i8) -> TestResult {
    let a = plane_from_seed(seed_a, 12);
    let b = plane_from_seed(seed_b, 12);
    let d = a.diff(&b, i64::from(dx), i64::from(dy), 1, DiffVariant::Plain);
    TestResult::from_bool(d.is_infinite() || d >= 0.0)
}

#[quickcheck]
fn prop_scale_nearest_identity(seed: u8) -> TestResult {
    let p = plane_from_seed(seed, 9);
    let scaled = p.scale_nearest(p.width(), p.height()).unwrap();
    for y in 0..p.height() {
        for x in 0..p.width() {
            if scaled.pixel(x, y) != p.pixel(x, y) {
                return TestResult::failed();
            }
        }
    }
    TestResult::passed()
}
