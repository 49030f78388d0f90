//! Core Traits - 플러그인이 광고하는 metric 정의 인터페이스

use super::types::Label;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Metric - 플러그인 측 metric 정의
// ============================================================================

/// 플러그인이 로드 시점에 광고하는 metric 정의
///
/// Catalog는 이 정보로 항목을 만들고 이후로는 참조하지 않는다.
pub trait Metric: Send + Sync {
    /// namespace segment 목록
    fn namespace(&self) -> &[String];

    /// 광고된 버전 (0 이하 = 플러그인 버전 사용)
    fn version(&self) -> i32;

    fn last_advertised_time(&self) -> DateTime<Utc>;

    fn tags(&self) -> &BTreeMap<String, String>;

    fn labels(&self) -> &[Label];
}

// ============================================================================
// MetricDefinition - 기본 구현
// ============================================================================

/// 단순 metric 정의
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub namespace: Vec<String>,

    #[serde(default)]
    pub version: i32,

    #[serde(default = "chrono::Utc::now")]
    pub last_advertised_time: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
}

impl MetricDefinition {
    pub fn new<S: Into<String>>(namespace: impl IntoIterator<Item = S>, version: i32) -> Self {
        Self {
            namespace: namespace.into_iter().map(Into::into).collect(),
            version,
            last_advertised_time: Utc::now(),
            tags: BTreeMap::new(),
            labels: vec![],
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    pub fn with_last_advertised_time(mut self, time: DateTime<Utc>) -> Self {
        self.last_advertised_time = time;
        self
    }
}

impl Metric for MetricDefinition {
    fn namespace(&self) -> &[String] {
        &self.namespace
    }

    fn version(&self) -> i32 {
        self.version
    }

    fn last_advertised_time(&self) -> DateTime<Utc> {
        self.last_advertised_time
    }

    fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    fn labels(&self) -> &[Label] {
        &self.labels
    }
}
