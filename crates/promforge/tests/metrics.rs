//! Per-kind metric behavior tests.

use std::sync::Arc;
use std::time::Duration;

use promforge::atomics::AtomicDouble;
use promforge::{
    CollectorRegistry, ErrorKind, MetricFactory, QuantileEpsilonPair,
};

fn factory() -> MetricFactory {
    MetricFactory::new(Arc::new(CollectorRegistry::new()))
}

#[test]
fn counter_rejects_negative_increment() {
    let factory = factory();
    let counter = factory.counter("test", "help", &[]).unwrap();
    counter.inc_by(3.5).unwrap();

    let err = counter.inc_by(-1.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MonotonicityViolation);
    assert_eq!(counter.value(), 3.5);
}

#[test]
fn int_counter_rejects_negative_increment() {
    let factory = factory();
    let counter = factory.int_counter("test", "help", &[]).unwrap();
    counter.inc_by(7).unwrap();

    let err = counter.inc_by(-2).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MonotonicityViolation);
    assert_eq!(counter.value(), 7);
}

#[test]
fn counter_reset_zeroes_every_series() {
    let factory = factory();
    let counter = factory.counter("test", "help", &["label"]).unwrap();
    let labelled = counter.with_labels(&["a"]).unwrap();
    counter.inc();
    labelled.inc_by(4.0).unwrap();

    counter.reset();
    assert_eq!(counter.value(), 0.0);
    assert_eq!(labelled.value(), 0.0);
}

#[test]
fn gauge_moves_both_ways() {
    let factory = factory();
    let gauge = factory.gauge("test", "help", &[]).unwrap();

    gauge.inc();
    gauge.inc_by(2.5);
    assert_eq!(gauge.value(), 3.5);

    gauge.dec_by(1.5);
    gauge.dec();
    assert_eq!(gauge.value(), 1.0);

    gauge.set(-4.0);
    assert_eq!(gauge.value(), -4.0);
}

#[test]
fn gauge_inc_to_and_dec_to_are_one_sided() {
    let factory = factory();
    let gauge = factory.gauge("test", "help", &[]).unwrap();
    let instance = gauge.with_labels(&[]).unwrap();

    instance.set(5.0);
    instance.inc_to(3.0);
    assert_eq!(instance.value(), 5.0);
    instance.inc_to(8.0);
    assert_eq!(instance.value(), 8.0);

    instance.dec_to(10.0);
    assert_eq!(instance.value(), 8.0);
    instance.dec_to(2.0);
    assert_eq!(instance.value(), 2.0);
}

#[test]
fn int_gauge_moves_both_ways() {
    let factory = factory();
    let gauge = factory.int_gauge("test", "help", &[]).unwrap();

    gauge.inc();
    gauge.set(10);
    gauge.dec();
    assert_eq!(gauge.value(), 9);
}

#[test]
fn untyped_holds_any_value() {
    let factory = factory();
    let untyped = factory.untyped("test", "help", &[]).unwrap();

    untyped.set(-7.5);
    assert_eq!(untyped.value(), -7.5);
    untyped.set(f64::INFINITY);
    assert_eq!(untyped.value(), f64::INFINITY);
}

#[test]
fn histogram_counts_and_sums() {
    let factory = factory();
    let hist = factory
        .histogram_with_buckets("hist", "help", &[], &[1.0, 5.0])
        .unwrap();
    let instance = hist.with_labels(&[]).unwrap();

    instance.observe(0.5);
    instance.observe(3.0);
    instance.observe(100.0);

    assert_eq!(instance.count(), 3);
    assert_eq!(instance.sum(), 103.5);
}

#[test]
fn summary_quantiles_over_window() {
    let factory = factory();
    let summary = factory.summary("s", "help", &[]).unwrap();
    let instance = summary.with_labels(&[]).unwrap();

    assert!(instance.quantile(0.5).is_nan());

    for v in 1..=100 {
        instance.observe(v as f64);
    }
    assert_eq!(instance.quantile(0.5), 50.0);
    assert_eq!(instance.quantile(0.99), 99.0);
    assert_eq!(instance.count(), 100);
    assert_eq!(instance.sum(), 5050.0);
}

#[test]
fn summary_objectives_validation() {
    let factory = factory();
    let err = factory
        .summary_with_objectives(
            "s",
            "help",
            &[],
            vec![QuantileEpsilonPair::new(1.5, 0.01)],
            None,
            None,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);

    let err = factory
        .summary_with_objectives(
            "s2",
            "help",
            &[],
            vec![QuantileEpsilonPair::new(0.5, 1.0)],
            None,
            None,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);

    let err = factory
        .summary_with_objectives(
            "s3",
            "help",
            &[],
            vec![QuantileEpsilonPair::new(0.5, 0.05)],
            Some(Duration::ZERO),
            None,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
}

#[test]
fn atomic_double_concurrent_adds_are_exact() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 10_000;

    let cell = AtomicDouble::new(0.0);
    std::thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                for _ in 0..PER_THREAD {
                    cell.add(1.0);
                }
            });
        }
    });

    assert_eq!(cell.get(), (THREADS * PER_THREAD) as f64);
}
