//! Metric Entry - (namespace, version) 단위 catalog 항목

use crate::namespace::format_namespace;
use chrono::{DateTime, Utc};
use pulse_foundation::{
    ConfigDataNode, ConfigPolicyNode, Error, Label, PluginKey, Result,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// catalog 항목 - 하나의 플러그인이 광고한 하나의 (namespace, version)
///
/// 플러그인은 소유하지 않고 `PluginKey`만 보관한다.
#[derive(Debug, Clone)]
pub struct MetricType {
    plugin: Option<PluginKey>,

    namespace: Vec<String>,
    version: i32,
    last_advertised_time: DateTime<Utc>,
    subscriptions: u32,

    policy: ConfigPolicyNode,
    config: Option<ConfigDataNode>,

    data: Option<Value>,
    source: String,
    labels: Vec<Label>,
    tags: BTreeMap<String, String>,
    timestamp: DateTime<Utc>,
}

impl MetricType {
    pub fn new<S: Into<String>>(
        namespace: impl IntoIterator<Item = S>,
        last_advertised_time: DateTime<Utc>,
        plugin: Option<PluginKey>,
    ) -> Self {
        Self {
            plugin,
            namespace: namespace.into_iter().map(Into::into).collect(),
            version: 0,
            last_advertised_time,
            subscriptions: 0,
            policy: ConfigPolicyNode::default(),
            config: None,
            data: None,
            source: String::new(),
            labels: vec![],
            tags: BTreeMap::new(),
            timestamp: Utc::now(),
        }
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn with_version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    pub fn with_policy(mut self, policy: ConfigPolicyNode) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_labels(mut self, labels: Vec<Label>) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    // ========================================================================
    // 조회
    // ========================================================================

    /// `/intel/mock/foo/2` 형식 키
    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace_as_string(), self.version())
    }

    pub fn namespace(&self) -> &[String] {
        &self.namespace
    }

    pub fn namespace_as_string(&self) -> String {
        format_namespace(&self.namespace)
    }

    /// 유효 버전
    ///
    /// 명시된 버전이 없으면 플러그인 버전, 플러그인도 없으면 -1.
    pub fn version(&self) -> i32 {
        if self.version > 0 {
            return self.version;
        }
        match &self.plugin {
            Some(plugin) => plugin.version,
            None => -1,
        }
    }

    pub fn plugin(&self) -> Option<&PluginKey> {
        self.plugin.as_ref()
    }

    pub fn last_advertised_time(&self) -> DateTime<Utc> {
        self.last_advertised_time
    }

    pub fn subscription_count(&self) -> u32 {
        self.subscriptions
    }

    pub fn policy(&self) -> &ConfigPolicyNode {
        &self.policy
    }

    pub fn config(&self) -> Option<&ConfigDataNode> {
        self.config.as_ref()
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    // ========================================================================
    // 변경
    // ========================================================================

    pub(crate) fn subscribe(&mut self) {
        self.subscriptions += 1;
    }

    /// 0에서 감소 시도는 에러, 카운트는 그대로
    pub(crate) fn unsubscribe(&mut self) -> Result<()> {
        if self.subscriptions == 0 {
            return Err(Error::NegativeSubscriptionCount {
                namespace: self.namespace_as_string(),
                version: self.version(),
            });
        }
        self.subscriptions -= 1;
        Ok(())
    }

    /// 정책으로 설정 처리 후 항목에 적용
    pub fn apply_config(&mut self, config: &ConfigDataNode) -> Result<()> {
        let processed = self.policy.process(config)?;
        self.config = Some(processed);
        Ok(())
    }
}
