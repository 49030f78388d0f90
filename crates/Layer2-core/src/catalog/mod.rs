//! Metric Catalog - 로드된 플러그인이 광고한 모든 metric의 색인
//!
//! ## 구성
//!
//! ```text
//! MetricCatalog
//!   └── Mutex<CatalogState>
//!         ├── tree    : MetricTrie   (namespace -> 버전 -> MetricType)
//!         ├── keys    : Vec<String>  (버전이 하나 이상 있는 catalog 키)
//!         └── matches : MatchCache   (쿼리 키 -> 매칭된 catalog 키)
//! ```
//!
//! 세 구성요소는 하나의 잠금으로 보호된다. 변경 연산은 캐시 갱신까지
//! 끝낸 뒤 잠금을 해제하므로, 변경 이후의 쿼리는 항상 최신 상태를 본다.
//! 로깅과 정규식 컴파일은 잠금 밖에서 수행한다.

mod entry;
mod matching;
mod snapshot;
mod trie;

pub use entry::MetricType;
pub use matching::{MatchCache, QueryPattern};
pub use snapshot::{CatalogItem, CatalogSnapshot, CatalogStats};
pub use trie::MetricTrie;

use crate::namespace::{
    format_namespace, keys_to_namespaces, metric_key, metric_namespace,
    validate_metric_namespace,
};
use crate::plugin::LoadedPlugin;
use parking_lot::Mutex;
use pulse_foundation::{Error, Metric, PluginKey, Result};
use std::collections::BTreeMap;
use tracing::{debug, error, warn};

#[derive(Debug, Default)]
struct CatalogState {
    tree: MetricTrie,
    keys: Vec<String>,
    matches: MatchCache,
}

impl CatalogState {
    /// 버전 선택: `version > 0`이면 정확히 그 버전, 아니면 가장 높은 버전
    fn resolve<'a>(
        versions: &'a mut BTreeMap<i32, MetricType>,
        namespace: &[String],
        version: i32,
    ) -> Result<&'a mut MetricType> {
        let found = if version > 0 {
            versions.get_mut(&version)
        } else {
            versions.values_mut().next_back()
        };
        found.ok_or_else(|| Error::metric_not_found(format_namespace(namespace), explicit(version)))
    }

    fn remove_key(&mut self, key: &str) {
        self.keys.retain(|k| k != key);
    }
}

/// 플러그인 metric -> 검증된 catalog 항목
fn loaded_metric_type(plugin: &LoadedPlugin, metric: &dyn Metric) -> Result<MetricType> {
    let namespace = metric.namespace();
    validate_metric_namespace(namespace)?;
    let policy = plugin
        .config_policy
        .as_ref()
        .ok_or_else(|| Error::MissingConfigPolicy {
            plugin: plugin.key.full_id(),
            namespace: format_namespace(namespace),
        })?;

    Ok(MetricType::new(
        namespace.iter().cloned(),
        metric.last_advertised_time(),
        Some(plugin.key.clone()),
    )
    .with_version(metric.version())
    .with_policy(policy.get(namespace))
    .with_tags(metric.tags().clone())
    .with_labels(metric.labels().to_vec())
    .with_source(plugin.key.full_id()))
}

fn explicit(version: i32) -> Option<i32> {
    (version > 0).then_some(version)
}

/// 실패 시 구조화 로그를 남기고 그대로 반환
fn logged<T>(block: &'static str, namespace: &[String], result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        let namespace = format_namespace(namespace);
        if e.is_retryable() {
            warn!(block, namespace = %namespace, "{}", e);
        } else {
            error!(block, namespace = %namespace, "{}", e);
        }
    }
    result
}

/// Metric Catalog
///
/// `Arc<MetricCatalog>`로 플러그인 관리, 스케줄러, CLI가 공유한다.
#[derive(Debug, Default)]
pub struct MetricCatalog {
    state: Mutex<CatalogState>,
}

impl MetricCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // 등록
    // ========================================================================

    /// 플러그인이 광고한 metric 등록
    ///
    /// namespace 검증 후 플러그인의 설정 정책에서 해당 namespace의
    /// 규칙을 가져와 항목을 만든다. 정책이 없는 플러그인은 거부.
    pub fn add_loaded_metric_type(&self, plugin: &LoadedPlugin, metric: &dyn Metric) -> Result<()> {
        let result = loaded_metric_type(plugin, metric).map(|mt| self.insert(mt));
        logged("add_loaded_metric_type", metric.namespace(), result)
    }

    /// 플러그인의 metric 일괄 등록
    ///
    /// 모두 검증을 통과해야 등록한다. 하나라도 거부되면 catalog는 그대로다.
    pub fn add_loaded_metric_types<M: Metric>(&self, plugin: &LoadedPlugin, metrics: &[M]) -> Result<()> {
        let mut entries = Vec::with_capacity(metrics.len());
        for metric in metrics {
            let mt = logged(
                "add_loaded_metric_types",
                metric.namespace(),
                loaded_metric_type(plugin, metric),
            )?;
            entries.push(mt);
        }

        for mt in entries {
            self.insert(mt);
        }
        Ok(())
    }

    /// 항목 등록 (같은 namespace + 버전은 덮어쓰기)
    pub fn add(&self, mt: MetricType) -> Result<()> {
        let namespace = mt.namespace().to_vec();
        let result = validate_metric_namespace(&namespace).map(|_| self.insert(mt));
        logged("add", &namespace, result)
    }

    fn insert(&self, mt: MetricType) {
        let key = metric_key(mt.namespace());
        let version = mt.version();

        let new_key = {
            let mut state = self.state.lock();
            state.tree.add(mt);
            let new_key = !state.keys.contains(&key);
            if new_key {
                state.keys.push(key.clone());
                state.matches.on_key_added(&key);
            }
            new_key
        };

        debug!(block = "add", key = %key, version, new_key, "Metric added to catalog");
    }

    // ========================================================================
    // 조회
    // ========================================================================

    /// namespace + 버전으로 항목 조회 (`version <= 0`이면 최신)
    pub fn get(&self, namespace: &[String], version: i32) -> Result<MetricType> {
        let result = {
            let mut state = self.state.lock();
            state
                .tree
                .get_mut(namespace)
                .and_then(|versions| CatalogState::resolve(versions, namespace, version))
                .map(|mt| mt.clone())
        };
        logged("get", namespace, result.map_err(|e| with_version(e, version)))
    }

    /// namespace의 모든 버전 (버전 오름차순)
    pub fn get_versions(&self, namespace: &[String]) -> Result<Vec<MetricType>> {
        let result = {
            let state = self.state.lock();
            state
                .tree
                .get(namespace)
                .map(|versions| versions.values().cloned().collect())
        };
        logged("get_versions", namespace, result)
    }

    /// namespace 이하의 모든 항목
    pub fn fetch(&self, namespace: &[String]) -> Result<Vec<MetricType>> {
        let result = {
            let state = self.state.lock();
            state
                .tree
                .fetch(namespace)
                .map(|found| found.into_iter().cloned().collect())
        };
        logged("fetch", namespace, result)
    }

    /// 항목을 소유한 플러그인
    pub fn get_plugin(&self, namespace: &[String], version: i32) -> Result<PluginKey> {
        let mt = self.get(namespace, version)?;
        let result = mt.plugin().cloned().ok_or_else(|| {
            Error::PluginNotFound(format!("no plugin owns {}", mt.key()))
        });
        logged("get_plugin", namespace, result)
    }

    // ========================================================================
    // 삭제
    // ========================================================================

    /// namespace의 모든 버전 삭제
    pub fn remove(&self, namespace: &[String]) -> Result<()> {
        let key = metric_key(namespace);
        let result = {
            let mut state = self.state.lock();
            state.tree.remove(namespace).map(|removed| {
                state.remove_key(&key);
                state.matches.purge_key(&key);
                removed.len()
            })
        };

        if let Ok(removed) = &result {
            debug!(block = "remove", key = %key, removed, "Metric removed from catalog");
        }
        logged("remove", namespace, result.map(|_| ()))
    }

    /// 언로드된 플러그인의 모든 항목 삭제
    ///
    /// 카탈로그에서 완전히 사라진 namespace 목록을 반환한다.
    pub fn rm_unloaded_plugin_metrics(&self, plugin: &PluginKey) -> Vec<Vec<String>> {
        let emptied = {
            let mut state = self.state.lock();
            let emptied = state.tree.delete_by_plugin(plugin);
            for namespace in &emptied {
                state.remove_key(&metric_key(namespace));
            }
            let CatalogState { keys, matches, .. } = &mut *state;
            matches.refresh_all(keys);
            emptied
        };

        debug!(
            block = "rm_unloaded_plugin_metrics",
            plugin = %plugin,
            removed = emptied.len(),
            "Removed metrics of unloaded plugin"
        );
        emptied
    }

    // ========================================================================
    // 구독
    // ========================================================================

    pub fn subscribe(&self, namespace: &[String], version: i32) -> Result<()> {
        let result = self.with_entry(namespace, version, |mt| {
            mt.subscribe();
            Ok(mt.subscription_count())
        });
        if let Ok(count) = &result {
            debug!(block = "subscribe", namespace = %format_namespace(namespace), version, count, "Subscribed");
        }
        logged("subscribe", namespace, result.map(|_| ()))
    }

    /// 구독 해제 (0에서는 `NegativeSubscriptionCount`, 카운트 유지)
    pub fn unsubscribe(&self, namespace: &[String], version: i32) -> Result<()> {
        let result = self.with_entry(namespace, version, |mt| {
            mt.unsubscribe()?;
            Ok(mt.subscription_count())
        });
        if let Ok(count) = &result {
            debug!(block = "unsubscribe", namespace = %format_namespace(namespace), version, count, "Unsubscribed");
        }
        logged("unsubscribe", namespace, result.map(|_| ()))
    }

    pub fn subscription_count(&self, namespace: &[String], version: i32) -> Result<u32> {
        let result = self.with_entry(namespace, version, |mt| Ok(mt.subscription_count()));
        logged("subscription_count", namespace, result)
    }

    fn with_entry<T>(
        &self,
        namespace: &[String],
        version: i32,
        f: impl FnOnce(&mut MetricType) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.state.lock();
        let versions = state
            .tree
            .get_mut(namespace)
            .map_err(|e| with_version(e, version))?;
        let mt = CatalogState::resolve(versions, namespace, version)?;
        f(mt)
    }

    // ========================================================================
    // 쿼리
    // ========================================================================

    /// 와일드카드/튜플 쿼리에 매칭되는 namespace 목록
    ///
    /// 결과는 쿼리 키로 캐시되고, 이후 변경 연산마다 갱신된다.
    pub fn match_query(&self, namespace: &[String]) -> Result<Vec<Vec<String>>> {
        let query_key = metric_key(namespace);

        if let Some(cached) = self.state.lock().matches.get(&query_key) {
            return Ok(keys_to_namespaces(cached));
        }

        let result = QueryPattern::compile(namespace).and_then(|pattern| {
            let matched = {
                let mut state = self.state.lock();
                let CatalogState { keys, matches, .. } = &mut *state;
                matches.refresh(pattern, keys)
            };
            if matched.is_empty() {
                return Err(Error::metric_not_found(format_namespace(namespace), None));
            }
            Ok(keys_to_namespaces(&matched))
        });
        logged("match_query", namespace, result)
    }

    /// 이미 캐시된 쿼리의 매칭 결과 (재계산 없음)
    pub fn get_queried_namespaces(&self, namespace: &[String]) -> Result<Vec<Vec<String>>> {
        let query_key = metric_key(namespace);
        let result = {
            let state = self.state.lock();
            state
                .matches
                .get(&query_key)
                .map(keys_to_namespaces)
                .ok_or_else(|| Error::metric_not_found(format_namespace(namespace), None))
        };
        logged("get_queried_namespaces", namespace, result)
    }

    /// 목록 조회: 쿼리 매칭 후 각 namespace의 버전들
    ///
    /// `version <= 0`이면 모든 버전, 아니면 그 버전이 있는 namespace만.
    pub fn fetch_metrics(&self, query: &[String], version: i32) -> Result<Vec<MetricType>> {
        let namespaces = self.match_query(query)?;

        let found: Vec<MetricType> = {
            let state = self.state.lock();
            namespaces
                .iter()
                .filter_map(|ns| state.tree.get(ns).ok())
                .flat_map(|versions| {
                    versions
                        .iter()
                        .filter(|(v, _)| version <= 0 || **v == version)
                        .map(|(_, mt)| mt.clone())
                })
                .collect()
        };

        if found.is_empty() {
            return logged(
                "fetch_metrics",
                query,
                Err(Error::metric_not_found(format_namespace(query), explicit(version))),
            );
        }
        Ok(found)
    }

    // ========================================================================
    // 스냅샷
    // ========================================================================

    /// 현재 키 목록 (등록 순서)
    pub fn keys(&self) -> Vec<String> {
        self.state.lock().keys.clone()
    }

    /// 키 목록 순서의 catalog 복사본
    pub fn snapshot(&self) -> CatalogSnapshot {
        let state = self.state.lock();
        let items = state
            .keys
            .iter()
            .filter_map(|key| {
                let namespace = metric_namespace(key);
                let versions = state.tree.get(&namespace).ok()?.clone();
                Some(CatalogItem {
                    key: key.clone(),
                    namespace,
                    versions,
                })
            })
            .collect();
        CatalogSnapshot::new(items)
    }

    /// 등록된 namespace 수
    pub fn len(&self) -> usize {
        self.state.lock().keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().keys.is_empty()
    }

    pub fn stats(&self) -> CatalogStats {
        let state = self.state.lock();
        let subscriptions = state
            .tree
            .fetch(&[])
            .map(|all| all.iter().map(|mt| u64::from(mt.subscription_count())).sum::<u64>())
            .unwrap_or(0);

        CatalogStats {
            namespaces: state.keys.len(),
            entries: state.tree.len(),
            cached_queries: state.matches.len(),
            subscriptions,
        }
    }
}

/// 버전 지정 조회 실패 시 에러에 버전 정보 추가
fn with_version(e: Error, version: i32) -> Error {
    match e {
        Error::MetricNotFound { namespace, version: None } => Error::MetricNotFound {
            namespace,
            version: explicit(version),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pulse_foundation::{ConfigPolicy, ConfigPolicyNode, MetricDefinition};

    fn ns(s: &str) -> Vec<String> {
        crate::namespace::parse_namespace(s)
    }

    fn plugin(name: &str, version: i32) -> LoadedPlugin {
        let mut policy = ConfigPolicy::new();
        policy.add(["intel"], ConfigPolicyNode::new());
        LoadedPlugin::new(PluginKey::collector(name, version), Some(policy))
    }

    fn add(catalog: &MetricCatalog, p: &LoadedPlugin, namespace: &str, version: i32) {
        let def = MetricDefinition::new(ns(namespace), version);
        catalog.add_loaded_metric_type(p, &def).unwrap();
    }

    #[test]
    fn test_get_exact_and_latest() {
        let catalog = MetricCatalog::new();
        let p = plugin("mock", 1);
        add(&catalog, &p, "/intel/mock/foo", 1);
        add(&catalog, &p, "/intel/mock/foo", 2);

        assert_eq!(catalog.get(&ns("/intel/mock/foo"), 1).unwrap().version(), 1);
        assert_eq!(catalog.get(&ns("/intel/mock/foo"), 2).unwrap().version(), 2);
        assert_eq!(catalog.get(&ns("/intel/mock/foo"), 0).unwrap().version(), 2);
        assert_eq!(catalog.get(&ns("/intel/mock/foo"), -1).unwrap().version(), 2);

        let err = catalog.get(&ns("/intel/mock/foo"), 3).unwrap_err();
        assert!(matches!(err, Error::MetricNotFound { version: Some(3), .. }));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_unset_version_uses_plugin_version() {
        let catalog = MetricCatalog::new();
        let p = plugin("mock", 4);
        add(&catalog, &p, "/intel/mock/bar", 0);

        let mt = catalog.get(&ns("/intel/mock/bar"), 0).unwrap();
        assert_eq!(mt.version(), 4);
        assert!(catalog.get(&ns("/intel/mock/bar"), 4).is_ok());
    }

    #[test]
    fn test_missing_config_policy() {
        let catalog = MetricCatalog::new();
        let p = LoadedPlugin::new(PluginKey::collector("bare", 1), None);
        let def = MetricDefinition::new(ns("/intel/bare/foo"), 1);

        let err = catalog.add_loaded_metric_type(&p, &def).unwrap_err();
        assert!(matches!(err, Error::MissingConfigPolicy { .. }));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_add_rejects_invalid_namespace() {
        let catalog = MetricCatalog::new();
        let mt = MetricType::new(ns("/intel/mock/foo*"), Utc::now(), None);
        assert!(matches!(catalog.add(mt).unwrap_err(), Error::InvalidNamespace { .. }));
        assert!(catalog.keys().is_empty());
    }

    #[test]
    fn test_remove_purges_cache() {
        let catalog = MetricCatalog::new();
        let p = plugin("mock", 1);
        add(&catalog, &p, "/intel/mock/foo", 1);
        add(&catalog, &p, "/intel/mock/bar", 1);

        let query = ns("/intel/mock/*");
        assert_eq!(catalog.match_query(&query).unwrap().len(), 2);

        catalog.remove(&ns("/intel/mock/foo")).unwrap();
        assert_eq!(
            catalog.get_queried_namespaces(&query).unwrap(),
            vec![ns("/intel/mock/bar")]
        );
        assert_eq!(catalog.keys(), vec!["intel.mock.bar".to_string()]);

        catalog.remove(&ns("/intel/mock/bar")).unwrap();
        assert!(catalog.get_queried_namespaces(&query).is_err());
        assert!(catalog.remove(&ns("/intel/mock/bar")).is_err());
    }

    #[test]
    fn test_add_extends_cached_queries() {
        let catalog = MetricCatalog::new();
        let p = plugin("mock", 1);
        add(&catalog, &p, "/intel/mock/foo", 1);

        let query = ns("/intel/mock/*");
        catalog.match_query(&query).unwrap();
        add(&catalog, &p, "/intel/mock/bar", 1);

        assert_eq!(
            catalog.get_queried_namespaces(&query).unwrap(),
            vec![ns("/intel/mock/foo"), ns("/intel/mock/bar")]
        );
    }

    #[test]
    fn test_get_queried_namespaces_requires_match_query() {
        let catalog = MetricCatalog::new();
        let p = plugin("mock", 1);
        add(&catalog, &p, "/intel/mock/foo", 1);

        assert!(catalog.get_queried_namespaces(&ns("/intel/*")).is_err());
        catalog.match_query(&ns("/intel/*")).unwrap();
        assert!(catalog.get_queried_namespaces(&ns("/intel/*")).is_ok());
    }

    #[test]
    fn test_fetch_metrics_filters_version() {
        let catalog = MetricCatalog::new();
        let p = plugin("mock", 1);
        add(&catalog, &p, "/intel/mock/foo", 1);
        add(&catalog, &p, "/intel/mock/foo", 2);
        add(&catalog, &p, "/intel/mock/bar", 1);

        let all = catalog.fetch_metrics(&ns("/intel/mock/*"), 0).unwrap();
        assert_eq!(all.len(), 3);

        let v2 = catalog.fetch_metrics(&ns("/intel/mock/*"), 2).unwrap();
        assert_eq!(v2.len(), 1);
        assert_eq!(v2[0].namespace_as_string(), "/intel/mock/foo");

        assert!(catalog.fetch_metrics(&ns("/intel/mock/*"), 9).is_err());
    }

    #[test]
    fn test_get_plugin_and_stats() {
        let catalog = MetricCatalog::new();
        let p = plugin("mock", 1);
        add(&catalog, &p, "/intel/mock/foo", 1);
        add(&catalog, &p, "/intel/mock/foo", 2);

        assert_eq!(catalog.get_plugin(&ns("/intel/mock/foo"), 2).unwrap(), p.key);

        catalog.subscribe(&ns("/intel/mock/foo"), 2).unwrap();
        catalog.match_query(&ns("/intel/*")).unwrap();

        let stats = catalog.stats();
        assert_eq!(
            stats,
            CatalogStats {
                namespaces: 1,
                entries: 2,
                cached_queries: 1,
                subscriptions: 1,
            }
        );
    }

    #[test]
    fn test_snapshot_follows_key_order() {
        let catalog = MetricCatalog::new();
        let p = plugin("mock", 1);
        add(&catalog, &p, "/intel/mock/zeta", 1);
        add(&catalog, &p, "/intel/mock/alpha", 1);
        add(&catalog, &p, "/intel/mock/alpha", 3);

        let snapshot = catalog.snapshot();
        assert_eq!(
            snapshot.keys().collect::<Vec<_>>(),
            vec!["intel.mock.zeta", "intel.mock.alpha"]
        );
        let alpha = snapshot.get("intel.mock.alpha").unwrap();
        assert_eq!(alpha.latest().map(|mt| mt.version()), Some(3));

        // 스냅샷은 이후 변경에 영향받지 않음
        catalog.remove(&ns("/intel/mock/zeta")).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(catalog.snapshot().len(), 1);
    }

    #[test]
    fn test_add_keeps_payload() {
        let catalog = MetricCatalog::new();
        let mt = MetricType::new(["intel", "mock", "raw"], Utc::now(), None)
            .with_version(1)
            .with_source("collector:raw:1")
            .with_data(serde_json::json!({ "unit": "bytes" }));
        catalog.add(mt).unwrap();

        let stored = catalog.get(&ns("/intel/mock/raw"), 1).unwrap();
        assert_eq!(stored.data(), Some(&serde_json::json!({ "unit": "bytes" })));
        assert_eq!(stored.source(), "collector:raw:1");
    }
}
