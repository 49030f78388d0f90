//! Pulse Config - 통합 설정
//!
//! 글로벌(<config_dir>/pulse/pulse.toml) + 프로젝트(.pulse/pulse.toml) 병합

use crate::storage::{load_toml, TomlStore};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::TribeConfig;

/// 설정 파일명
pub const PULSE_CONFIG_FILE: &str = "pulse.toml";

// ============================================================================
// Pulse Config (통합)
// ============================================================================

/// Pulse 통합 설정
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PulseConfig {
    /// 버전 (마이그레이션용)
    #[serde(default = "default_version")]
    pub version: u32,

    /// 로깅 설정
    #[serde(default)]
    pub log: LogConfig,

    /// Catalog 설정
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// 클러스터 멤버십 설정
    #[serde(default)]
    pub tribe: TribeConfig,
}

impl PulseConfig {
    pub fn new() -> Self {
        Self {
            version: default_version(),
            ..Default::default()
        }
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드
    pub fn load() -> Result<Self> {
        let mut config = Self::new();

        // 1. 글로벌 설정
        if let Ok(global) = TomlStore::global() {
            if let Some(global_config) = global.load_optional::<PulseConfig>(PULSE_CONFIG_FILE)? {
                config.merge(global_config);
            }
        }

        // 2. 프로젝트 설정
        if let Ok(project) = TomlStore::current_project() {
            if let Some(project_config) =
                project.load_optional::<PulseConfig>(PULSE_CONFIG_FILE)?
            {
                config.merge(project_config);
            }
        }

        Ok(config)
    }

    /// 지정한 파일 로드 (기본값 위에 병합)
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::new();
        config.merge(load_toml(path)?);
        Ok(config)
    }

    // ========================================================================
    // Merge
    // ========================================================================

    /// 다른 설정과 병합 (other가 우선)
    pub fn merge(&mut self, other: PulseConfig) {
        self.log.merge(other.log);
        self.catalog.merge(other.catalog);
        self.tribe.merge(other.tribe);
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log.level = level.into();
        self
    }

    pub fn strict_add(mut self, strict: bool) -> Self {
        self.catalog.strict_add = strict;
        self
    }
}

// ============================================================================
// Log Config
// ============================================================================

/// 로깅 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// tracing EnvFilter 지시어 (e.g. "info", "pulse_core=debug")
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LogConfig {
    fn merge(&mut self, other: LogConfig) {
        if other.level != default_log_level() {
            self.level = other.level;
        }
    }
}

// ============================================================================
// Catalog Config
// ============================================================================

/// Catalog 설정
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// true면 플러그인 로드 시 첫 번째 거부된 metric에서 로드 전체를 중단
    #[serde(default)]
    pub strict_add: bool,
}

impl CatalogConfig {
    fn merge(&mut self, other: CatalogConfig) {
        if other.strict_add {
            self.strict_add = true;
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn default_version() -> u32 {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}
