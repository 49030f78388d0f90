//! Core Types - 공용 타입 정의
//!
//! 모든 레이어에서 공통으로 사용하는 타입들

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// PluginType / PluginKey - 플러그인 식별
// ============================================================================

/// 플러그인 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginType {
    Collector,
    Processor,
    Publisher,
}

impl Default for PluginType {
    fn default() -> Self {
        Self::Collector
    }
}

impl fmt::Display for PluginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collector => write!(f, "collector"),
            Self::Processor => write!(f, "processor"),
            Self::Publisher => write!(f, "publisher"),
        }
    }
}

/// 플러그인 조회 키
///
/// Catalog 항목은 플러그인을 소유하지 않고 이 키만 보관한다.
/// 실제 플러그인은 외부 레지스트리에서 키로 조회.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PluginKey {
    #[serde(rename = "type", default)]
    pub kind: PluginType,
    pub name: String,
    pub version: i32,
}

impl PluginKey {
    pub fn new(kind: PluginType, name: impl Into<String>, version: i32) -> Self {
        Self {
            kind,
            name: name.into(),
            version,
        }
    }

    pub fn collector(name: impl Into<String>, version: i32) -> Self {
        Self::new(PluginType::Collector, name, version)
    }

    /// 전체 식별자 (e.g. `collector:mock:1`)
    pub fn full_id(&self) -> String {
        format!("{}:{}:{}", self.kind, self.name, self.version)
    }
}

impl fmt::Display for PluginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_id())
    }
}

// ============================================================================
// Label
// ============================================================================

/// 동적 namespace 요소 설명 (index 위치의 segment 이름)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub index: usize,
    pub name: String,
}

impl Label {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }
}

// ============================================================================
// ConfigValue / ConfigDataNode - 수집 설정 값
// ============================================================================

/// 설정 값
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ConfigValue {
    /// 타입 이름 (rule 표시용)
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
        }
    }

    /// 숫자 값 (범위 검사용)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{}", v),
            Self::Str(s) => write!(f, "{}", s),
        }
    }
}

/// 적용된 수집 설정 (key -> value)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDataNode {
    #[serde(flatten)]
    pub values: BTreeMap<String, ConfigValue>,
}

impl ConfigDataNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: ConfigValue) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: ConfigValue) {
        self.values.insert(key.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
