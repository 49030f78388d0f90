//! Catalog 통합 테스트 - 플러그인 로드/언로드와 쿼리 캐시 일관성
//!
//! `cargo test -p pulse-core --test catalog_test`

use pulse_core::{
    metric_key, metric_namespace, parse_namespace, ControlPlane, LoadedPlugin, MetricCatalog,
    PluginManifest,
};
use pulse_foundation::{
    ConfigDataNode, ConfigPolicy, ConfigPolicyNode, ConfigRule, ConfigValue, Error,
    MetricDefinition, PluginKey, RuleKind,
};
use std::sync::Arc;

fn ns(s: &str) -> Vec<String> {
    parse_namespace(s)
}

fn mock_plugin(name: &str, version: i32) -> LoadedPlugin {
    let mut policy = ConfigPolicy::new();
    policy.add(
        ["intel"],
        ConfigPolicyNode::new().with_rule(
            ConfigRule::new("name", RuleKind::String).with_default(ConfigValue::Str("bob".into())),
        ),
    );
    policy.add(
        ["intel", "mock"],
        ConfigPolicyNode::new()
            .with_rule(ConfigRule::new("password", RuleKind::String).required()),
    );
    LoadedPlugin::new(PluginKey::collector(name, version), Some(policy))
}

fn defs(list: &[(&str, i32)]) -> Vec<MetricDefinition> {
    list.iter().map(|(n, v)| MetricDefinition::new(ns(n), *v)).collect()
}

#[test]
fn test_load_fetch_match_unload_scenario() {
    let catalog = Arc::new(MetricCatalog::new());
    let control = ControlPlane::new(Arc::clone(&catalog));
    let key = PluginKey::collector("mock", 1);

    control
        .load(mock_plugin("mock", 1), &defs(&[("/intel/mock/foo", 1), ("/intel/mock/foo", 2)]))
        .unwrap();

    let fetched = catalog.fetch(&ns("/intel/mock")).unwrap();
    assert_eq!(fetched.len(), 2);

    let query = ns("/intel/mock/*");
    assert_eq!(catalog.match_query(&query).unwrap(), vec![ns("/intel/mock/foo")]);

    control.unload(&key).unwrap();

    let err = catalog.get_queried_namespaces(&query).unwrap_err();
    assert!(matches!(err, Error::MetricNotFound { .. }));
    assert!(catalog.fetch(&ns("/intel/mock")).is_err());
}

#[test]
fn test_subscribe_round_trip() {
    let catalog = MetricCatalog::new();
    let plugin = mock_plugin("mock", 1);
    for def in defs(&[("/intel/mock/foo", 1), ("/intel/mock/foo", 2)]) {
        catalog.add_loaded_metric_type(&plugin, &def).unwrap();
    }

    let foo = ns("/intel/mock/foo");
    let before = catalog.subscription_count(&foo, 2).unwrap();

    catalog.subscribe(&foo, 2).unwrap();
    assert_eq!(catalog.subscription_count(&foo, 2).unwrap(), before + 1);
    assert_eq!(catalog.subscription_count(&foo, 1).unwrap(), 0);

    catalog.unsubscribe(&foo, 2).unwrap();
    assert_eq!(catalog.subscription_count(&foo, 2).unwrap(), before);

    let err = catalog.unsubscribe(&foo, 2).unwrap_err();
    assert!(matches!(err, Error::NegativeSubscriptionCount { version: 2, .. }));
    assert_eq!(catalog.subscription_count(&foo, 2).unwrap(), 0);

    // 버전 0은 최신 버전을 구독
    catalog.subscribe(&foo, 0).unwrap();
    assert_eq!(catalog.subscription_count(&foo, 2).unwrap(), 1);
}

#[test]
fn test_add_is_idempotent_per_version() {
    let catalog = MetricCatalog::new();
    let plugin = mock_plugin("mock", 1);
    let def = MetricDefinition::new(ns("/intel/mock/foo"), 1);

    catalog.add_loaded_metric_type(&plugin, &def).unwrap();
    catalog.add_loaded_metric_type(&plugin, &def).unwrap();

    assert_eq!(catalog.get_versions(&ns("/intel/mock/foo")).unwrap().len(), 1);
    assert_eq!(catalog.keys(), vec![metric_key(&ns("/intel/mock/foo"))]);
    assert_eq!(catalog.stats().entries, 1);
}

#[test]
fn test_validation_errors() {
    let catalog = MetricCatalog::new();
    let plugin = mock_plugin("mock", 1);

    for bad in ["/intel/mock/foo*", "/intel/mock (foo)"] {
        let def = MetricDefinition::new(ns(bad), 1);
        let err = catalog.add_loaded_metric_type(&plugin, &def).unwrap_err();
        assert!(matches!(err, Error::InvalidNamespace { .. }), "{}", bad);
    }
    assert!(catalog.is_empty());
}

#[test]
fn test_entry_carries_merged_policy() {
    let catalog = MetricCatalog::new();
    let plugin = mock_plugin("mock", 1);
    catalog
        .add_loaded_metric_type(&plugin, &MetricDefinition::new(ns("/intel/mock/foo"), 1))
        .unwrap();

    let mut mt = catalog.get(&ns("/intel/mock/foo"), 1).unwrap();
    let rules: Vec<String> = mt.policy().rules().map(|r| r.key.clone()).collect();
    assert_eq!(rules, vec!["name", "password"]);

    // password 누락
    assert!(matches!(
        mt.apply_config(&ConfigDataNode::new()),
        Err(Error::Policy(_))
    ));

    let config = ConfigDataNode::new().with("password", ConfigValue::Str("secret".into()));
    mt.apply_config(&config).unwrap();
    assert_eq!(
        mt.config().and_then(|c| c.get("name")),
        Some(&ConfigValue::Str("bob".into()))
    );
}

#[test]
fn test_wildcard_cache_consistency() {
    let catalog = MetricCatalog::new();
    let a = mock_plugin("a", 1);
    let b = mock_plugin("b", 1);

    catalog
        .add_loaded_metric_type(&a, &MetricDefinition::new(ns("/intel/mock/foo"), 1))
        .unwrap();

    let queries = [ns("/intel/*"), ns("/intel/mock/(foo|bar)"), ns("/intel/*/bar")];
    catalog.match_query(&queries[0]).unwrap();
    catalog.match_query(&queries[1]).unwrap();
    assert!(catalog.match_query(&queries[2]).is_err());

    catalog
        .add_loaded_metric_type(&b, &MetricDefinition::new(ns("/intel/mock/bar"), 1))
        .unwrap();
    catalog
        .add_loaded_metric_type(&b, &MetricDefinition::new(ns("/intel/other/baz"), 1))
        .unwrap();

    let check = |catalog: &MetricCatalog| {
        let keys = catalog.keys();
        for query in &queries[..2] {
            let pattern = pulse_core::QueryPattern::compile(query).unwrap();
            let expected: Vec<Vec<String>> = keys
                .iter()
                .filter(|k| pattern.is_match(k))
                .map(|k| metric_namespace(k))
                .collect();
            match catalog.get_queried_namespaces(query) {
                Ok(found) => assert_eq!(found, expected),
                Err(_) => assert!(expected.is_empty()),
            }
        }
    };

    check(&catalog);
    assert_eq!(catalog.get_queried_namespaces(&queries[0]).unwrap().len(), 3);

    catalog.remove(&ns("/intel/mock/foo")).unwrap();
    check(&catalog);

    catalog.rm_unloaded_plugin_metrics(&b.key);
    check(&catalog);
    assert!(catalog.get_queried_namespaces(&queries[0]).is_err());
    assert!(catalog.get_queried_namespaces(&queries[1]).is_err());
}

#[test]
fn test_wildcard_spans_segments() {
    let catalog = MetricCatalog::new();
    let plugin = mock_plugin("mock", 1);
    catalog
        .add_loaded_metric_type(&plugin, &MetricDefinition::new(ns("/intel/mock/deep/foo"), 1))
        .unwrap();

    assert_eq!(
        catalog.match_query(&ns("/intel/*")).unwrap(),
        vec![ns("/intel/mock/deep/foo")]
    );
}

#[test]
fn test_manifest_round_into_catalog() {
    let manifest = PluginManifest::from_toml_str(
        r#"
[[plugin]]
name = "mock"
version = 2

[[plugin.metric]]
namespace = "/intel/mock/foo"

[[plugin.metric]]
namespace = "/intel/mock/bar"
version = 1

[[plugin]]
name = "bare"
without_policy = true

[[plugin.metric]]
namespace = "/intel/bare/foo"
"#,
    )
    .unwrap();

    let catalog = Arc::new(MetricCatalog::new());
    let control = ControlPlane::new(Arc::clone(&catalog));
    let reports = manifest.apply(&control).unwrap();

    assert_eq!(reports.len(), 2);
    assert!(reports[0].is_clean());
    assert!(matches!(
        reports[1].rejected[0].1,
        Error::MissingConfigPolicy { .. }
    ));

    assert_eq!(catalog.get(&ns("/intel/mock/foo"), 0).unwrap().version(), 2);
    assert_eq!(catalog.get(&ns("/intel/mock/bar"), 0).unwrap().version(), 1);
    assert!(catalog.get(&ns("/intel/bare/foo"), 0).is_err());
    assert_eq!(control.plugin_count(), 2);
}

#[test]
fn test_missing_entries_report_not_found() {
    let catalog = MetricCatalog::new();
    let plugin = mock_plugin("mock", 1);
    catalog
        .add_loaded_metric_type(&plugin, &MetricDefinition::new(ns("/intel/mock/foo"), 1))
        .unwrap();

    let unknown = ns("/intel/mock/nope");
    let foo = ns("/intel/mock/foo");

    assert!(matches!(
        catalog.get_versions(&unknown).unwrap_err(),
        Error::MetricNotFound { .. }
    ));
    assert!(matches!(
        catalog.subscribe(&unknown, 1).unwrap_err(),
        Error::MetricNotFound { .. }
    ));
    assert!(matches!(
        catalog.subscribe(&foo, 7).unwrap_err(),
        Error::MetricNotFound { version: Some(7), .. }
    ));
    assert!(matches!(
        catalog.unsubscribe(&unknown, 0).unwrap_err(),
        Error::MetricNotFound { .. }
    ));
    assert!(matches!(
        catalog.match_query(&[]).unwrap_err(),
        Error::MetricNotFound { .. }
    ));
    assert_eq!(catalog.subscription_count(&foo, 1).unwrap(), 0);
}

#[test]
fn test_queries_sharing_a_key_share_matches() {
    let catalog = MetricCatalog::new();
    let plugin = mock_plugin("mock", 1);
    catalog
        .add_loaded_metric_type(&plugin, &MetricDefinition::new(ns("/intel/c"), 1))
        .unwrap();

    // 두 쿼리의 catalog 키는 모두 `intel.(a.b|c)`
    let joined: Vec<String> = vec!["intel".into(), "(a.b|c)".into()];
    let split: Vec<String> = vec!["intel".into(), "(a".into(), "b|c)".into()];
    assert_eq!(metric_key(&joined), metric_key(&split));

    assert!(matches!(
        catalog.match_query(&split).unwrap_err(),
        Error::MetricNotFound { .. }
    ));
    assert!(matches!(
        catalog.match_query(&joined).unwrap_err(),
        Error::MetricNotFound { .. }
    ));
    assert!(catalog.get_queried_namespaces(&split).is_err());
}
