//! # Plugin
//!
//! 로드된 플러그인과 catalog 사이의 연결
//!
//! ## 아키텍처
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      ControlPlane                        │
//! │  ┌──────────────────────┐     ┌────────────────────────┐ │
//! │  │    PluginRegistry    │     │     MetricCatalog      │ │
//! │  │  PluginKey ->        │◄────│  MetricType.plugin     │ │
//! │  │    Arc<LoadedPlugin> │ key │    = Some(PluginKey)   │ │
//! │  └──────────────────────┘     └────────────────────────┘ │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! - `load`: 레지스트리 등록 후 광고된 metric을 catalog에 등록
//! - `unload`: 레지스트리 해제 후 catalog에서 플러그인 항목 삭제
//!
//! `PluginManifest`는 플러그인/metric/설정 규칙을 TOML로 기술한다.

mod loaded;
mod manager;
mod manifest;
mod registry;

pub use loaded::LoadedPlugin;
pub use manager::{ControlPlane, LoadReport};
pub use manifest::{MetricSpec, PluginManifest, PluginSpec, PolicySpec};
pub use registry::PluginRegistry;
