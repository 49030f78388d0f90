//! Metric commands - catalog 조회 결과 출력

use anyhow::Context;
use pulse_core::{list_query, parse_namespace, ControlPlane, MetricCatalog, PluginManifest};
use pulse_foundation::CatalogConfig;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// 매니페스트의 플러그인을 모두 로드한 catalog
pub fn load_catalog(path: &Path, config: &CatalogConfig) -> anyhow::Result<Arc<MetricCatalog>> {
    let manifest = PluginManifest::load(path)
        .with_context(|| format!("Failed to load plugin manifest {}", path.display()))?;

    let catalog = Arc::new(MetricCatalog::new());
    let control = ControlPlane::with_config(Arc::clone(&catalog), config.clone());

    for report in manifest.apply(&control)? {
        for (namespace, e) in &report.rejected {
            eprintln!("Warning: {} skipped {}: {}", report.plugin, namespace, e);
        }
    }

    debug!(
        "Catalog ready: {} namespaces from {}",
        catalog.len(),
        path.display()
    );
    Ok(catalog)
}

/// `metric list` - namespace별 버전 목록
pub fn list(catalog: &MetricCatalog, namespace: Option<&str>, version: i32) -> anyhow::Result<String> {
    let query = list_query(namespace.unwrap_or(""));
    let metrics = catalog.fetch_metrics(&parse_namespace(&query), version)?;

    let mut grouped: BTreeMap<String, Vec<i32>> = BTreeMap::new();
    for mt in &metrics {
        grouped
            .entry(mt.namespace_as_string())
            .or_default()
            .push(mt.version());
    }

    let width = grouped
        .keys()
        .map(String::len)
        .chain(std::iter::once("NAMESPACE".len()))
        .max()
        .unwrap_or(0)
        + 2;

    let mut out = String::new();
    writeln!(out, "{:<width$}{}", "NAMESPACE", "VERSIONS", width = width)?;
    for (ns, mut versions) in grouped {
        versions.sort_unstable();
        versions.dedup();
        let joined: Vec<String> = versions.iter().map(i32::to_string).collect();
        writeln!(out, "{:<width$}{}", ns, joined.join(","), width = width)?;
    }
    Ok(out)
}

/// `metric get` - 단일 metric과 수집 규칙
pub fn get(catalog: &MetricCatalog, namespace: &str, version: i32) -> anyhow::Result<String> {
    let mt = catalog.get(&parse_namespace(namespace), version)?;
    let ns = mt.namespace_as_string();

    let mut out = String::new();
    let width = ns.len().max("NAMESPACE".len()) + 2;
    writeln!(out, "{:<width$}{:<9}{}", "NAMESPACE", "VERSION", "LAST ADVERTISED TIME", width = width)?;
    writeln!(
        out,
        "{:<width$}{:<9}{}",
        ns,
        mt.version(),
        mt.last_advertised_time().to_rfc2822(),
        width = width
    )?;

    let policy = mt.policy();
    if policy.has_rules() {
        writeln!(out)?;
        writeln!(out, "  Rules for collecting {}:", ns)?;
        writeln!(out)?;
        writeln!(
            out,
            "    {:<16}{:<9}{:<10}{:<10}{:<9}{}",
            "NAME", "TYPE", "DEFAULT", "REQUIRED", "MINIMUM", "MAXIMUM"
        )?;
        for rule in policy.rules() {
            writeln!(
                out,
                "    {:<16}{:<9}{:<10}{:<10}{:<9}{}",
                rule.key,
                rule.kind.to_string(),
                display_or_empty(rule.default.as_ref()),
                rule.required,
                display_or_empty(rule.minimum.as_ref()),
                display_or_empty(rule.maximum.as_ref()),
            )?;
        }
    }
    Ok(out)
}

fn display_or_empty<T: std::fmt::Display>(value: Option<&T>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}
