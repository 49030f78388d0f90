//! pulse-core: Metric Catalog for Pulse
//!
//! Layer2 - 플러그인이 광고한 metric의 색인과 쿼리
//!
//! # 주요 모듈
//!
//! - `namespace`: namespace <-> catalog 키 변환, 등록 namespace 검증
//! - `catalog`: trie 기반 MetricCatalog, 와일드카드 쿼리 캐시, 구독 카운트
//! - `plugin`: 플러그인 레지스트리, 로드/언로드 제어, TOML 매니페스트
//!
//! # 사용 예시
//!
//! ```ignore
//! use pulse_core::{ControlPlane, MetricCatalog, PluginManifest, parse_namespace};
//!
//! let catalog = Arc::new(MetricCatalog::new());
//! let control = ControlPlane::new(Arc::clone(&catalog));
//!
//! PluginManifest::load(Path::new("plugins.toml"))?.apply(&control)?;
//!
//! // 와일드카드 쿼리
//! let matched = catalog.match_query(&parse_namespace("/intel/mock/*"))?;
//!
//! // 구독 (version 0 = 최신)
//! catalog.subscribe(&parse_namespace("/intel/mock/foo"), 0)?;
//! ```

pub mod catalog;
pub mod namespace;
pub mod plugin;

// Re-exports: Catalog
pub use catalog::{
    CatalogItem, CatalogSnapshot, CatalogStats, MatchCache, MetricCatalog, MetricTrie,
    MetricType, QueryPattern,
};

// Re-exports: Namespace
pub use namespace::{
    format_namespace, keys_to_namespaces, list_query, metric_key, metric_namespace,
    not_allowed_chars_hint, parse_namespace, validate_metric_namespace,
};

// Re-exports: Plugin
pub use plugin::{
    ControlPlane, LoadReport, LoadedPlugin, MetricSpec, PluginManifest, PluginRegistry,
    PluginSpec, PolicySpec,
};
