//! 동시성 테스트 - 여러 스레드가 하나의 catalog를 공유
//!
//! `cargo test -p pulse-core --test concurrency_test`

use pulse_core::{parse_namespace, MetricCatalog, LoadedPlugin};
use pulse_foundation::{ConfigPolicy, MetricDefinition, PluginKey};
use std::sync::Arc;
use std::thread;

const THREADS: usize = 8;
const ROUNDS: usize = 50;

fn plugin(id: usize) -> LoadedPlugin {
    LoadedPlugin::new(
        PluginKey::collector(format!("worker{}", id), 1),
        Some(ConfigPolicy::new()),
    )
}

#[test]
fn test_concurrent_subscribe_unsubscribe() {
    let catalog = Arc::new(MetricCatalog::new());
    let shared = parse_namespace("/intel/shared/foo");
    catalog
        .add_loaded_metric_type(&plugin(0), &MetricDefinition::new(shared.clone(), 1))
        .unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let catalog = Arc::clone(&catalog);
            let shared = shared.clone();
            thread::spawn(move || {
                for _ in 0..ROUNDS {
                    catalog.subscribe(&shared, 1).unwrap();
                }
                for _ in 0..ROUNDS {
                    catalog.unsubscribe(&shared, 1).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(catalog.subscription_count(&shared, 1).unwrap(), 0);
    assert!(catalog.unsubscribe(&shared, 1).is_err());
}

#[test]
fn test_concurrent_load_query_unload() {
    let catalog = Arc::new(MetricCatalog::new());
    let query = parse_namespace("/intel/*");

    let handles: Vec<_> = (0..THREADS)
        .map(|id| {
            let catalog = Arc::clone(&catalog);
            let query = query.clone();
            thread::spawn(move || {
                let p = plugin(id);
                for round in 0..ROUNDS {
                    let ns = parse_namespace(&format!("/intel/w{}/m{}", id, round));
                    catalog
                        .add_loaded_metric_type(&p, &MetricDefinition::new(ns.clone(), 1))
                        .unwrap();

                    // 방금 추가한 namespace는 반드시 보인다
                    let matched = catalog.match_query(&query).unwrap();
                    assert!(matched.contains(&ns));

                    catalog.subscribe(&ns, 0).unwrap();
                    catalog.unsubscribe(&ns, 0).unwrap();
                }

                // 짝수 워커는 언로드
                if id % 2 == 0 {
                    catalog.rm_unloaded_plugin_metrics(&p.key);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let remaining = THREADS / 2 * ROUNDS;
    assert_eq!(catalog.len(), remaining);

    let cached = catalog.get_queried_namespaces(&query).unwrap();
    assert_eq!(cached.len(), remaining);
    assert!(cached.iter().all(|ns| {
        let worker: usize = ns[1].trim_start_matches('w').parse().unwrap();
        worker % 2 == 1
    }));

    let stats = catalog.stats();
    assert_eq!(stats.entries, remaining);
    assert_eq!(stats.subscriptions, 0);
}
