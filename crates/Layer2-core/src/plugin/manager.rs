//! Control Plane - 플러그인 로드/언로드와 catalog 연동
//!
//! 로드 시 플러그인이 광고한 metric을 catalog에 등록하고,
//! 언로드 시 해당 플러그인의 항목을 catalog에서 제거한다.

use super::loaded::LoadedPlugin;
use super::registry::PluginRegistry;
use crate::catalog::MetricCatalog;
use crate::namespace::format_namespace;
use pulse_foundation::{CatalogConfig, Error, Metric, PluginKey, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// 플러그인 로드 결과
#[derive(Debug)]
pub struct LoadReport {
    pub plugin: PluginKey,

    /// 등록된 metric (`/intel/mock/foo/1` 형식)
    pub added: Vec<String>,

    /// 거부된 metric namespace와 사유
    pub rejected: Vec<(String, Error)>,
}

impl LoadReport {
    fn new(plugin: PluginKey) -> Self {
        Self {
            plugin,
            added: vec![],
            rejected: vec![],
        }
    }

    /// 거부된 metric 없이 로드됨
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// 플러그인 관리와 catalog를 묶는 제어 평면
pub struct ControlPlane {
    catalog: Arc<MetricCatalog>,
    registry: Arc<PluginRegistry>,
    config: CatalogConfig,
}

impl ControlPlane {
    pub fn new(catalog: Arc<MetricCatalog>) -> Self {
        Self::with_config(catalog, CatalogConfig::default())
    }

    pub fn with_config(catalog: Arc<MetricCatalog>, config: CatalogConfig) -> Self {
        Self {
            catalog,
            registry: Arc::new(PluginRegistry::new()),
            config,
        }
    }

    /// 외부 레지스트리 공유
    pub fn with_registry(mut self, registry: Arc<PluginRegistry>) -> Self {
        self.registry = registry;
        self
    }

    // ========================================================================
    // 플러그인 로드/언로드
    // ========================================================================

    /// 플러그인 로드
    ///
    /// metric 하나가 거부되어도 나머지는 계속 등록한다.
    /// `strict_add`가 켜져 있으면 전체를 먼저 검증하고, 거부가 있으면
    /// 아무것도 등록하지 않은 채 플러그인 등록을 취소하고 에러를 반환한다.
    pub fn load<M: Metric>(&self, plugin: LoadedPlugin, metrics: &[M]) -> Result<LoadReport> {
        let key = plugin.key.clone();
        info!("Loading plugin: {} ({} metrics)", key, metrics.len());

        let plugin = Arc::new(plugin);
        if !self.registry.register(Arc::clone(&plugin)) {
            return Err(Error::PluginAlreadyLoaded(key.full_id()));
        }

        let mut report = LoadReport::new(key.clone());
        if self.config.strict_add {
            if let Err(e) = self.catalog.add_loaded_metric_types(&plugin, metrics) {
                warn!("Plugin {} rejected, load cancelled: {}", key, e);
                self.registry.unregister(&key);
                return Err(e);
            }
            report.added = metrics.iter().map(added_key).collect();
        } else {
            for metric in metrics {
                match self.catalog.add_loaded_metric_type(&plugin, metric) {
                    Ok(()) => report.added.push(added_key(metric)),
                    Err(e) => {
                        let namespace = format_namespace(metric.namespace());
                        warn!("Skipping metric {} from plugin {}: {}", namespace, key, e);
                        report.rejected.push((namespace, e));
                    }
                }
            }
        }

        info!(
            "Plugin {} loaded: {} metrics added, {} rejected",
            key,
            report.added.len(),
            report.rejected.len()
        );
        Ok(report)
    }

    /// 플러그인 언로드
    ///
    /// catalog에서 완전히 사라진 namespace 목록을 반환한다.
    pub fn unload(&self, key: &PluginKey) -> Result<Vec<Vec<String>>> {
        info!("Unloading plugin: {}", key);

        self.registry
            .unregister(key)
            .ok_or_else(|| Error::PluginNotFound(key.full_id()))?;

        let removed = self.catalog.rm_unloaded_plugin_metrics(key);
        info!("Plugin {} unloaded, {} namespaces removed", key, removed.len());
        Ok(removed)
    }

    /// namespace + 버전을 제공하는 플러그인
    pub fn resolve_plugin(&self, namespace: &[String], version: i32) -> Result<Arc<LoadedPlugin>> {
        let key = self.catalog.get_plugin(namespace, version)?;
        self.registry
            .get(&key)
            .ok_or_else(|| Error::PluginNotFound(key.full_id()))
    }

    // ========================================================================
    // 접근자
    // ========================================================================

    pub fn catalog(&self) -> &Arc<MetricCatalog> {
        &self.catalog
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    pub fn plugin_count(&self) -> usize {
        self.registry.len()
    }
}

fn added_key<M: Metric>(metric: &M) -> String {
    format!("{}/{}", format_namespace(metric.namespace()), metric.version())
}
