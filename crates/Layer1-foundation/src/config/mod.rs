//! Config - 통합 설정 관리
//!
//! - `pulse.rs` - PulseConfig 통합 설정 (log, catalog)
//! - `tribe.rs` - 클러스터 멤버십 기본값

mod pulse;
mod tribe;

pub use pulse::{CatalogConfig, LogConfig, PulseConfig, PULSE_CONFIG_FILE};
pub use tribe::TribeConfig;
