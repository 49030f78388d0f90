//! Storage module for Pulse
//!
//! - `store`: TOML - 설정 파일 저장/로드

mod store;

pub use store::{load_toml, TomlStore, PROJECT_DIR, PULSE_DIR};
