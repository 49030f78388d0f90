//! Plugin Manifest - 플러그인과 광고 metric의 TOML 정의
//!
//! ```toml
//! [[plugin]]
//! name = "mock"
//! type = "collector"
//! version = 1
//!
//! [[plugin.metric]]
//! namespace = "/intel/mock/foo"
//! version = 1
//! tags = { unit = "bytes" }
//!
//! [[plugin.policy]]
//! namespace = "/intel/mock"
//!
//! [[plugin.policy.rule]]
//! key = "password"
//! type = "string"
//! required = true
//! ```

use super::loaded::LoadedPlugin;
use super::manager::{ControlPlane, LoadReport};
use crate::namespace::parse_namespace;
use chrono::{DateTime, Utc};
use pulse_foundation::{
    load_toml, ConfigPolicy, ConfigPolicyNode, ConfigRule, Label, MetricDefinition, PluginKey,
    PluginType, Result,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

fn default_version() -> i32 {
    1
}

/// 광고 metric
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSpec {
    /// `/intel/mock/foo` 형식
    pub namespace: String,

    /// 0이면 플러그인 버전 사용
    #[serde(default)]
    pub version: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_advertised_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
}

impl MetricSpec {
    pub fn to_definition(&self) -> MetricDefinition {
        let mut def = MetricDefinition::new(parse_namespace(&self.namespace), self.version);
        if let Some(time) = self.last_advertised_time {
            def = def.with_last_advertised_time(time);
        }
        def.tags = self.tags.clone();
        def.labels = self.labels.clone();
        def
    }
}

/// namespace prefix에 적용되는 규칙
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicySpec {
    pub namespace: String,

    #[serde(default, rename = "rule")]
    pub rules: Vec<ConfigRule>,
}

/// 플러그인 하나
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginSpec {
    pub name: String,

    #[serde(rename = "type", default)]
    pub kind: PluginType,

    #[serde(default = "default_version")]
    pub version: i32,

    /// 설정 정책이 없는 플러그인 (metric 등록이 모두 거부됨)
    #[serde(default)]
    pub without_policy: bool,

    #[serde(default, rename = "metric")]
    pub metrics: Vec<MetricSpec>,

    #[serde(default, rename = "policy")]
    pub policies: Vec<PolicySpec>,
}

impl PluginSpec {
    pub fn key(&self) -> PluginKey {
        PluginKey::new(self.kind, self.name.clone(), self.version)
    }

    pub fn config_policy(&self) -> Option<ConfigPolicy> {
        if self.without_policy {
            return None;
        }

        let mut policy = ConfigPolicy::new();
        for spec in &self.policies {
            let node = spec
                .rules
                .iter()
                .cloned()
                .fold(ConfigPolicyNode::new(), ConfigPolicyNode::with_rule);
            policy.add(parse_namespace(&spec.namespace), node);
        }
        Some(policy)
    }

    pub fn to_loaded(&self) -> (LoadedPlugin, Vec<MetricDefinition>) {
        let plugin = LoadedPlugin::new(self.key(), self.config_policy());
        let metrics = self.metrics.iter().map(MetricSpec::to_definition).collect();
        (plugin, metrics)
    }
}

/// 플러그인 매니페스트 파일
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginManifest {
    #[serde(default, rename = "plugin")]
    pub plugins: Vec<PluginSpec>,
}

impl PluginManifest {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        load_toml(path)
    }

    /// 모든 플러그인을 제어 평면에 로드
    pub fn apply(&self, control: &ControlPlane) -> Result<Vec<LoadReport>> {
        self.plugins
            .iter()
            .map(|spec| {
                let (plugin, metrics) = spec.to_loaded();
                control.load(plugin, &metrics)
            })
            .collect()
    }
}
