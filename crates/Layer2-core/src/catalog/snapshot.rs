//! Catalog Snapshot - 잠금 밖에서 순회하기 위한 catalog 복사본

use super::entry::MetricType;
use serde::Serialize;
use std::collections::BTreeMap;

/// 하나의 catalog 키와 그 키의 모든 버전
#[derive(Debug, Clone)]
pub struct CatalogItem {
    pub key: String,
    pub namespace: Vec<String>,
    pub versions: BTreeMap<i32, MetricType>,
}

impl CatalogItem {
    /// 가장 높은 버전
    pub fn latest(&self) -> Option<&MetricType> {
        self.versions.values().next_back()
    }
}

/// 키 목록 순서의 catalog 복사본
///
/// 내부 커서가 없으므로 여러 호출자가 각자 순회해도 된다.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    items: Vec<CatalogItem>,
}

impl CatalogSnapshot {
    pub(crate) fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogItem> {
        self.items.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.key.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.key == key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IntoIterator for CatalogSnapshot {
    type Item = CatalogItem;
    type IntoIter = std::vec::IntoIter<CatalogItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a CatalogSnapshot {
    type Item = &'a CatalogItem;
    type IntoIter = std::slice::Iter<'a, CatalogItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Catalog 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    /// 버전이 하나 이상 있는 namespace 수
    pub namespaces: usize,
    /// (namespace, 버전) 항목 수
    pub entries: usize,
    pub cached_queries: usize,
    /// 전체 구독 수 합계
    pub subscriptions: u64,
}
