//! Registry contract tests.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use common::{CountingWriter, DummyCollector};
use promforge::{Collector, CollectorRegistry, ErrorKind, MetricFactory};

#[test]
fn cannot_add_duplicated_collectors() {
    let registry = CollectorRegistry::new();
    registry
        .add(DummyCollector::new("testName", &["metric"]))
        .unwrap();

    let err = registry
        .add(DummyCollector::new("testName", &["metric2"]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateCollectorName);
}

#[test]
fn add_then_try_get_returns_same_collector() {
    let registry = CollectorRegistry::new();
    let collector = DummyCollector::new("testName", &["metric"]);
    registry.add(collector.clone()).unwrap();

    let found = registry.try_get("testName").unwrap();
    assert!(Arc::ptr_eq(
        &found,
        &(collector as Arc<dyn Collector>)
    ));
}

#[test]
fn do_not_call_factory_if_collector_exists() {
    let registry = CollectorRegistry::new();
    let original = DummyCollector::new("testName", &["metric"]);
    registry.add(original.clone()).unwrap();

    let calls = AtomicUsize::new(0);
    let result = registry
        .get_or_add::<DummyCollector, _>("testName", || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(DummyCollector::new("testName", &["metric"]))
        })
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(Arc::ptr_eq(&result, &original));
}

#[test]
fn factory_runs_at_most_once_under_concurrent_get_or_add() {
    let registry = Arc::new(CollectorRegistry::new());
    let calls = Arc::new(AtomicUsize::new(0));

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let registry = registry.clone();
            let calls = calls.clone();
            scope.spawn(move || {
                registry
                    .get_or_add::<DummyCollector, _>("racy", || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(DummyCollector::new("racy", &["racy_metric"]))
                    })
                    .unwrap();
            });
        }
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn get_or_add_with_wrong_type_is_duplicate_name() {
    let registry = Arc::new(CollectorRegistry::new());
    let factory = MetricFactory::new(registry.clone());
    factory.counter("typed", "help", &[]).unwrap();

    let err = registry
        .get_or_add::<DummyCollector, _>("typed", || {
            Ok(DummyCollector::new("typed", &["other"]))
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateCollectorName);
}

#[test]
fn collector_should_define_metric_names() {
    let registry = CollectorRegistry::new();
    let err = registry
        .add(DummyCollector::new("test", &[]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingMetricNames);
}

#[test]
fn metric_name_should_be_valid() {
    for bad in ["my-metric", "my!metric", "my metric", "my%metric", "my/metric", "5a"] {
        let registry = CollectorRegistry::new();
        let err = registry
            .add(DummyCollector::new("testName", &[bad]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidMetricName, "name={bad}");
    }
}

#[test]
fn cannot_add_with_duplicated_metric_names() {
    let cases: [(&[&str], &[&str]); 4] = [
        (&["metric"], &["metric"]),
        (&["metric"], &["metric1", "metric"]),
        (&["metric1", "metric"], &["metric"]),
        (&["metric1", "metric"], &["metric2", "metric"]),
    ];

    for (first, second) in cases {
        let registry = CollectorRegistry::new();
        registry.add(DummyCollector::new("testName1", first)).unwrap();
        let err = registry
            .add(DummyCollector::new("testName2", second))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateMetricName);
    }
}

#[test]
fn sample_names_are_reserved_case_insensitively() {
    let registry = CollectorRegistry::new();
    registry.add(DummyCollector::new("a", &["Metric"])).unwrap();
    let err = registry
        .add(DummyCollector::new("b", &["metric"]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateMetricName);
}

#[test]
fn can_remove_collector_by_name() {
    let registry = CollectorRegistry::new();
    let collector = DummyCollector::new("collector", &["metric"]);
    registry.add(collector).unwrap();
    let collector1 = DummyCollector::new("collector1", &["metric1"]);
    registry.add(collector1.clone()).unwrap();

    let removed = registry.remove("collector1").unwrap();
    assert!(Arc::ptr_eq(&removed, &(collector1 as Arc<dyn Collector>)));
    assert!(registry.try_get("collector1").is_none());
    assert!(registry.try_get("collector").is_some());
}

#[test]
fn can_remove_collector_by_reference() {
    let registry = CollectorRegistry::new();
    registry
        .add(DummyCollector::new("collector", &["metric"]))
        .unwrap();
    let collector1: Arc<dyn Collector> = DummyCollector::new("collector1", &["metric1"]);
    registry.add(collector1.clone()).unwrap();

    assert!(registry.remove_collector(&collector1));
    assert!(registry.try_get("collector1").is_none());
    assert!(registry.try_get("collector").is_some());
}

#[test]
fn remove_non_registered_collector_is_noop() {
    let registry = CollectorRegistry::new();
    let stranger: Arc<dyn Collector> = DummyCollector::new("collector", &["metric"]);

    assert!(!registry.remove_collector(&stranger));
    assert!(registry.remove("").is_none());
    assert!(registry.remove("collector1").is_none());
}

#[test]
fn removing_releases_reserved_sample_names() {
    let registry = CollectorRegistry::new();
    registry
        .add(DummyCollector::new("collector", &["metric"]))
        .unwrap();
    registry.remove("collector").unwrap();

    // Both the registry name and the sample name are free again.
    registry
        .add(DummyCollector::new("collector", &["metric"]))
        .unwrap();
}

#[tokio::test]
async fn cancelled_pass_flushes_nothing_more() {
    let registry = CollectorRegistry::new();
    registry.add(DummyCollector::new("a", &["m1"])).unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut writer = CountingWriter::new();
    let err = registry.collect_to(&mut writer, &cancel).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(writer.flush_count(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn add_and_enum_in_parallel() {
    const INITIAL: usize = 1000;
    const ADDITIONAL: usize = 20;

    let registry = Arc::new(CollectorRegistry::new());
    for i in 0..INITIAL {
        let metric = format!("metric{i}");
        registry
            .add(DummyCollector::new(&format!("{i}collector"), &[&metric]))
            .unwrap();
    }

    let mut tasks = Vec::new();
    for i in 0..ADDITIONAL {
        let registry = registry.clone();
        tasks.push(tokio::spawn(async move {
            tokio::task::yield_now().await;
            let metric = format!("metric_add{i}");
            registry
                .add(DummyCollector::new(&format!("{i}collector_add"), &[&metric]))
                .unwrap();
        }));
    }

    let collecting = {
        let registry = registry.clone();
        tokio::spawn(async move {
            let mut writer = CountingWriter::new();
            registry
                .collect_to(&mut writer, &CancellationToken::new())
                .await
                .unwrap();
        })
    };

    for task in tasks {
        task.await.unwrap();
    }
    collecting.await.unwrap();

    // Once settled, a fresh pass sees exactly the union of all families.
    let mut writer = CountingWriter::new();
    registry
        .collect_to(&mut writer, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(writer.flush_count(), INITIAL + ADDITIONAL);
}
