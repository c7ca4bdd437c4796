//! Stress tests for segwin
//!
//! Run with: cargo test --release stress -- --ignored

use segwin::*;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

#[test]
#[ignore] // Run manually with --ignored
fn stress_test_ingest() {
    let mut engine = MetricsEngine::new(DEFAULT_WINDOW_SIZE).unwrap();

    let iterations = 1_000_000;
    let start = Instant::now();

    for i in 0..iterations {
        engine.ingest(50.0 + (i as f64 * 0.01).sin() * 30.0).unwrap();
    }

    let elapsed = start.elapsed();
    let rate = iterations as f64 / elapsed.as_secs_f64();

    println!("Ingested {} samples in {:?}", iterations, elapsed);
    println!("Rate: {:.0} samples/second", rate);

    assert!(
        rate > 500_000.0,
        "Should ingest at least 500k samples/s, got {:.0}",
        rate
    );
}

#[test]
#[ignore]
fn stress_test_wraparound_queries() {
    let mut engine = MetricsEngine::new(DEFAULT_WINDOW_SIZE).unwrap();
    for i in 0..(DEFAULT_WINDOW_SIZE + DEFAULT_WINDOW_SIZE / 2) {
        engine.ingest(i as f64).unwrap();
    }

    let iterations = 200_000;
    let start = Instant::now();

    for i in 0..iterations {
        let start_offset = DEFAULT_WINDOW_SIZE - 1 - (i % 100);
        let summary = engine.query_range(start_offset, i % 50).unwrap();
        assert!(
            summary.count > 0 && summary.min <= summary.max,
            "Inconsistent summary at iteration {}: {:?}",
            i,
            summary
        );
    }

    let elapsed = start.elapsed();
    let rate = iterations as f64 / elapsed.as_secs_f64();

    println!("Answered {} queries in {:?}", iterations, elapsed);
    println!("Rate: {:.0} queries/second", rate);

    assert!(
        rate > 100_000.0,
        "Should answer at least 100k queries/s, got {:.0}",
        rate
    );
}

#[test]
#[ignore]
fn stress_test_registry_contention() {
    let registry = Arc::new(MetricRegistry::new(&RegistryConfig::default()).unwrap());
    let start = Instant::now();

    let handles: Vec<_> = DEFAULT_METRICS
        .iter()
        .flat_map(|&metric| {
            let writer = {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for i in 0..100_000 {
                        registry.ingest(metric, (i % 100) as f64).unwrap();
                    }
                })
            };
            let reader = {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for i in 0..100_000 {
                        let summary = registry.query_range(metric, 3599, i % 60).unwrap();
                        assert!(summary.max <= 99.0);
                    }
                })
            };
            [writer, reader]
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    println!("Contended run finished in {:?}", start.elapsed());

    for metric in DEFAULT_METRICS {
        let ingested = registry
            .with_engine(metric, |engine| engine.samples_ingested())
            .unwrap();
        assert_eq!(ingested, 100_000);
    }
}
