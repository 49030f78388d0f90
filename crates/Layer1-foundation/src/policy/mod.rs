//! Config Policy - metric 수집 설정 규칙
//!
//! 플러그인은 namespace 별로 설정 규칙(ConfigPolicyNode)을 등록한다.
//! `ConfigPolicy::get`은 namespace의 모든 prefix에 등록된 규칙을 병합하며
//! 더 구체적인 prefix의 규칙이 우선한다.

use crate::core::{ConfigDataNode, ConfigValue};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// RuleKind
// ============================================================================

/// 규칙 값 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    String,
    Integer,
    Float,
    Bool,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::Bool => write!(f, "bool"),
        }
    }
}

// ============================================================================
// ConfigRule
// ============================================================================

/// 단일 설정 규칙
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigRule {
    pub key: String,

    #[serde(rename = "type")]
    pub kind: RuleKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ConfigValue>,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
}

impl ConfigRule {
    pub fn new(key: impl Into<String>, kind: RuleKind) -> Self {
        Self {
            key: key.into(),
            kind,
            default: None,
            required: false,
            minimum: None,
            maximum: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: ConfigValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_range(mut self, minimum: Option<f64>, maximum: Option<f64>) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self
    }

    /// 값을 규칙 타입에 맞게 검사/변환
    fn check(&self, value: &ConfigValue) -> std::result::Result<ConfigValue, String> {
        let coerced = match (self.kind, value) {
            (RuleKind::String, ConfigValue::Str(_))
            | (RuleKind::Integer, ConfigValue::Int(_))
            | (RuleKind::Float, ConfigValue::Float(_))
            | (RuleKind::Bool, ConfigValue::Bool(_)) => value.clone(),
            (RuleKind::Float, ConfigValue::Int(i)) => ConfigValue::Float(*i as f64),
            _ => {
                return Err(format!(
                    "{} expects {} but got {}",
                    self.key,
                    self.kind,
                    value.type_name()
                ))
            }
        };

        if let Some(n) = coerced.as_f64() {
            if let Some(min) = self.minimum {
                if n < min {
                    return Err(format!("{} value {} is below minimum {}", self.key, n, min));
                }
            }
            if let Some(max) = self.maximum {
                if n > max {
                    return Err(format!("{} value {} is above maximum {}", self.key, n, max));
                }
            }
        }

        Ok(coerced)
    }
}

// ============================================================================
// ConfigPolicyNode
// ============================================================================

/// 하나의 namespace에 적용되는 규칙 묶음
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigPolicyNode {
    #[serde(default)]
    pub rules: BTreeMap<String, ConfigRule>,
}

impl ConfigPolicyNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, rule: ConfigRule) -> Self {
        self.add_rule(rule);
        self
    }

    pub fn add_rule(&mut self, rule: ConfigRule) {
        self.rules.insert(rule.key.clone(), rule);
    }

    pub fn has_rules(&self) -> bool {
        !self.rules.is_empty()
    }

    /// 규칙 목록 (key 순)
    pub fn rules(&self) -> impl Iterator<Item = &ConfigRule> {
        self.rules.values()
    }

    /// 다른 노드의 규칙으로 덮어쓰기
    fn merge(&mut self, other: &ConfigPolicyNode) {
        for rule in other.rules.values() {
            self.rules.insert(rule.key.clone(), rule.clone());
        }
    }

    /// 설정 처리 - 기본값 채우기 + 검증
    ///
    /// 규칙에 없는 key는 그대로 통과한다. 위반 사항은 모두 모아서 반환.
    pub fn process(&self, config: &ConfigDataNode) -> Result<ConfigDataNode> {
        let mut out = config.clone();
        let mut violations = Vec::new();

        for rule in self.rules.values() {
            match config.get(&rule.key) {
                Some(value) => match rule.check(value) {
                    Ok(v) => out.insert(rule.key.clone(), v),
                    Err(e) => violations.push(e),
                },
                None => match &rule.default {
                    Some(default) => out.insert(rule.key.clone(), default.clone()),
                    None if rule.required => {
                        violations.push(format!("{} is required", rule.key))
                    }
                    None => {}
                },
            }
        }

        if violations.is_empty() {
            Ok(out)
        } else {
            Err(Error::Policy(violations))
        }
    }
}

// ============================================================================
// ConfigPolicy
// ============================================================================

/// 플러그인 전체 설정 정책 (namespace prefix -> 규칙)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigPolicy {
    nodes: BTreeMap<Vec<String>, ConfigPolicyNode>,
}

impl ConfigPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// namespace prefix에 노드 등록 (기존 규칙과 병합)
    pub fn add<S: Into<String>>(
        &mut self,
        prefix: impl IntoIterator<Item = S>,
        node: ConfigPolicyNode,
    ) {
        let prefix: Vec<String> = prefix.into_iter().map(Into::into).collect();
        self.nodes.entry(prefix).or_default().merge(&node);
    }

    /// namespace에 적용되는 병합 노드
    pub fn get(&self, namespace: &[String]) -> ConfigPolicyNode {
        let mut merged = ConfigPolicyNode::new();
        for depth in 0..=namespace.len() {
            if let Some(node) = self.nodes.get(&namespace[..depth]) {
                merged.merge(node);
            }
        }
        merged
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
