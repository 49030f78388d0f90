//! Loaded Plugin - 로드된 플러그인 정보

use chrono::{DateTime, Utc};
use pulse_foundation::{ConfigPolicy, PluginKey};

/// 로드 완료된 플러그인
///
/// 프로세스/RPC 수명주기는 외부에서 관리하고, catalog는 `key`만 참조한다.
#[derive(Debug, Clone)]
pub struct LoadedPlugin {
    pub key: PluginKey,

    /// 수집 설정 정책 (없으면 metric 등록 불가)
    pub config_policy: Option<ConfigPolicy>,

    pub loaded_at: DateTime<Utc>,
}

impl LoadedPlugin {
    pub fn new(key: PluginKey, config_policy: Option<ConfigPolicy>) -> Self {
        Self {
            key,
            config_policy,
            loaded_at: Utc::now(),
        }
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn version(&self) -> i32 {
        self.key.version
    }
}
