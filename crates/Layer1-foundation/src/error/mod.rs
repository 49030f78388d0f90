//! Error types for Pulse
//!
//! 모든 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// 에러 종류 - 메시지와 무관하게 의미만 구분
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidNamespace,
    MissingConfigPolicy,
    MetricNotFound,
    NegativeSubscriptionCount,
    PluginNotFound,
    PluginAlreadyLoaded,
    InvalidQuery,
    Policy,
    Config,
    InvalidInput,
    Io,
    Parse,
}

/// Pulse 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Catalog 관련
    // ========================================================================
    #[error("Metric namespace {namespace} is invalid: {reason}")]
    InvalidNamespace { namespace: String, reason: String },

    #[error("Config policy is missing for plugin {plugin} (metric {namespace})")]
    MissingConfigPolicy { plugin: String, namespace: String },

    #[error("Metric not found: {namespace}{}", version_suffix(.version))]
    MetricNotFound {
        namespace: String,
        version: Option<i32>,
    },

    #[error("Subscription count cannot be < 0: {namespace} (version: {version})")]
    NegativeSubscriptionCount { namespace: String, version: i32 },

    #[error("Invalid query {query}: {reason}")]
    InvalidQuery { query: String, reason: String },

    // ========================================================================
    // Plugin 관련
    // ========================================================================
    #[error("Plugin not found: {0}")]
    PluginNotFound(String),

    #[error("Plugin already loaded: {0}")]
    PluginAlreadyLoaded(String),

    // ========================================================================
    // Config policy 관련
    // ========================================================================
    #[error("Config policy violation: {}", .0.join("; "))]
    Policy(Vec<String>),

    // ========================================================================
    // 설정 / 입력
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

fn version_suffix(version: &Option<i32>) -> String {
    match version {
        Some(v) => format!(" (version: {})", v),
        None => String::new(),
    }
}

impl Error {
    /// 에러 종류
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidNamespace { .. } => ErrorKind::InvalidNamespace,
            Error::MissingConfigPolicy { .. } => ErrorKind::MissingConfigPolicy,
            Error::MetricNotFound { .. } => ErrorKind::MetricNotFound,
            Error::NegativeSubscriptionCount { .. } => ErrorKind::NegativeSubscriptionCount,
            Error::InvalidQuery { .. } => ErrorKind::InvalidQuery,
            Error::PluginNotFound(_) => ErrorKind::PluginNotFound,
            Error::PluginAlreadyLoaded(_) => ErrorKind::PluginAlreadyLoaded,
            Error::Policy(_) => ErrorKind::Policy,
            Error::Config(_) => ErrorKind::Config,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::Io(_) => ErrorKind::Io,
            Error::Json(_) | Error::Toml(_) => ErrorKind::Parse,
        }
    }

    /// 재시도 가능한 에러인지 확인
    ///
    /// 플러그인이 아직 로드되지 않은 경우만 해당 (scheduler가 재시도 여부 결정)
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::MetricNotFound { .. })
    }

    /// 사용자에게 보여줄 수 있는 에러인지 확인
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::InvalidNamespace { .. }
                | Error::MetricNotFound { .. }
                | Error::InvalidQuery { .. }
                | Error::InvalidInput(_)
                | Error::Policy(_)
        )
    }

    /// MetricNotFound 생성 헬퍼
    pub fn metric_not_found(namespace: impl Into<String>, version: Option<i32>) -> Self {
        Error::MetricNotFound {
            namespace: namespace.into(),
            version,
        }
    }

    /// InvalidNamespace 생성 헬퍼
    pub fn invalid_namespace(namespace: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidNamespace {
            namespace: namespace.into(),
            reason: reason.into(),
        }
    }
}
