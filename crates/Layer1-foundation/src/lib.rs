//! # pulse-foundation
//!
//! Foundation layer for Pulse:
//! - Core: 공용 타입 (PluginKey, Label, ConfigValue) 및 Metric 정의 인터페이스
//! - Policy: metric 수집 설정 규칙 (ConfigPolicy)
//! - Config: 통합 설정 (PulseConfig, TribeConfig)
//! - Storage: TOML 설정 파일 로드/저장
//! - Error: 중앙 에러 타입
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Layer4  pulsectl (CLI)                                 │
//! │                     │                                   │
//! │  Layer2  pulse-core ▼                                   │
//! │          ├── MetricCatalog (trie + match cache)         │
//! │          └── ControlPlane  (plugin registry)            │
//! │                     │                                   │
//! │  Layer1  pulse-foundation (this crate)                  │
//! │          ├── Metric / PluginKey / ConfigPolicy          │
//! │          └── PulseConfig / Error                        │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod policy;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, ErrorKind, Result};

// ============================================================================
// Core (핵심 타입 및 Trait)
// ============================================================================
pub use self::core::{
    ConfigDataNode, ConfigValue, Label, Metric, MetricDefinition, PluginKey, PluginType,
};

// ============================================================================
// Policy (수집 설정 규칙)
// ============================================================================
pub use policy::{ConfigPolicy, ConfigPolicyNode, ConfigRule, RuleKind};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{CatalogConfig, LogConfig, PulseConfig, TribeConfig, PULSE_CONFIG_FILE};

// ============================================================================
// Storage
// ============================================================================
pub use storage::{load_toml, TomlStore};
