//! Core Module - 핵심 인터페이스 및 타입
//!
//! - `types.rs`: 데이터 타입 (PluginKey, Label, ConfigValue 등)
//! - `traits.rs`: 인터페이스 (Metric)

pub mod traits;
pub mod types;

pub use traits::{Metric, MetricDefinition};
pub use types::{ConfigDataNode, ConfigValue, Label, PluginKey, PluginType};
