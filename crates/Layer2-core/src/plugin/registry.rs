//! Plugin Registry - 로드된 플러그인 저장소
//!
//! catalog 항목은 `PluginKey`만 가지고 있으므로, 실제 플러그인 정보는
//! 이 레지스트리에서 찾는다. catalog 잠금을 잡은 채로 접근하지 않는다.

use super::loaded::LoadedPlugin;
use parking_lot::RwLock;
use pulse_foundation::PluginKey;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

struct PluginInfo {
    plugin: Arc<LoadedPlugin>,

    /// 로드 순서
    load_order: usize,
}

/// 플러그인 레지스트리
#[derive(Default)]
pub struct PluginRegistry {
    plugins: RwLock<HashMap<PluginKey, PluginInfo>>,
    load_counter: RwLock<usize>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 플러그인 등록 (이미 있으면 false)
    pub fn register(&self, plugin: Arc<LoadedPlugin>) -> bool {
        let key = plugin.key.clone();
        let mut plugins = self.plugins.write();

        if plugins.contains_key(&key) {
            warn!("Plugin {} is already registered", key);
            return false;
        }

        let mut counter = self.load_counter.write();
        *counter += 1;
        let load_order = *counter;

        plugins.insert(key.clone(), PluginInfo { plugin, load_order });

        info!("Registered plugin: {}", key);
        true
    }

    /// 플러그인 등록 해제
    pub fn unregister(&self, key: &PluginKey) -> Option<Arc<LoadedPlugin>> {
        let removed = self.plugins.write().remove(key);
        if removed.is_some() {
            info!("Unregistered plugin: {}", key);
        }
        removed.map(|info| info.plugin)
    }

    pub fn get(&self, key: &PluginKey) -> Option<Arc<LoadedPlugin>> {
        self.plugins.read().get(key).map(|info| Arc::clone(&info.plugin))
    }

    pub fn contains(&self, key: &PluginKey) -> bool {
        self.plugins.read().contains_key(key)
    }

    /// 모든 플러그인 (로드 순서대로)
    pub fn list(&self) -> Vec<Arc<LoadedPlugin>> {
        let plugins = self.plugins.read();
        let mut all: Vec<_> = plugins.values().collect();
        all.sort_by_key(|info| info.load_order);
        all.iter().map(|info| Arc::clone(&info.plugin)).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.read().is_empty()
    }
}
