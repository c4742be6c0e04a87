//! Tests for interval reduction

use barsched::core::{gcd, reduce_period, Interval};
use rand::Rng;

#[test]
fn test_reduce_period_no_periodic_blocks() {
    assert_eq!(reduce_period([]), 0);
    assert_eq!(
        reduce_period([Interval::Never, Interval::Once, Interval::Persist]),
        0
    );
}

#[test]
fn test_reduce_period_single_and_identical() {
    assert_eq!(reduce_period([Interval::Every(7)]), 7);
    assert_eq!(
        reduce_period([Interval::Every(30), Interval::Once, Interval::Every(30)]),
        30
    );
}

#[test]
fn test_reduce_period_coprime() {
    assert_eq!(reduce_period([Interval::Every(3), Interval::Every(5)]), 1);
}

#[test]
fn test_reduce_period_divides_every_interval() {
    let mut rng = rand::rng();
    for _ in 0..200 {
        let count = rng.random_range(1..8);
        let intervals: Vec<Interval> = (0..count)
            .map(|_| match rng.random_range(0..5) {
                0 => Interval::Never,
                1 => Interval::Once,
                2 => Interval::Persist,
                _ => Interval::Every(rng.random_range(1..=3600)),
            })
            .collect();
        let secs: Vec<u32> = intervals.iter().filter_map(|i| i.secs()).collect();
        let period = reduce_period(intervals.iter().copied());

        if secs.is_empty() {
            assert_eq!(period, 0);
            continue;
        }
        assert!(period > 0);
        assert!(secs.iter().all(|s| s % period == 0), "{period} vs {secs:?}");
        // No larger common divisor exists.
        let smallest = secs.iter().copied().min().unwrap_or(period);
        for larger in (period + 1)..=smallest {
            assert!(secs.iter().any(|s| s % larger != 0));
        }
    }
}

#[test]
fn test_gcd_is_symmetric() {
    let mut rng = rand::rng();
    for _ in 0..500 {
        let a = rng.random_range(0..10_000);
        let b = rng.random_range(0..10_000);
        assert_eq!(gcd(a, b), gcd(b, a));
    }
}
