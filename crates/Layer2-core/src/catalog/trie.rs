//! Metric Trie - namespace segment 단위 prefix tree
//!
//! 각 노드는 하위 segment 노드와, 해당 경로에서 끝나는 namespace의
//! 버전별 항목을 가진다. 잠금은 catalog가 담당한다.

use super::entry::MetricType;
use crate::namespace::format_namespace;
use pulse_foundation::{Error, PluginKey, Result};
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct Node {
    children: BTreeMap<String, Node>,
    versions: BTreeMap<i32, MetricType>,
}

impl Node {
    fn is_empty(&self) -> bool {
        self.children.is_empty() && self.versions.is_empty()
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a MetricType>) {
        out.extend(self.versions.values());
        for child in self.children.values() {
            child.collect(out);
        }
    }

    fn count(&self) -> usize {
        self.versions.len() + self.children.values().map(Node::count).sum::<usize>()
    }

    /// 플러그인 소유 항목 삭제 후 빈 하위 노드 정리
    ///
    /// 버전이 모두 사라진 경로는 `emptied`에 기록한다.
    fn delete_by_plugin(&mut self, plugin: &PluginKey, path: &mut Vec<String>, emptied: &mut Vec<Vec<String>>) {
        let had_versions = !self.versions.is_empty();
        self.versions.retain(|_, mt| mt.plugin() != Some(plugin));
        if had_versions && self.versions.is_empty() {
            emptied.push(path.clone());
        }

        self.children.retain(|segment, child| {
            path.push(segment.clone());
            child.delete_by_plugin(plugin, path, emptied);
            path.pop();
            !child.is_empty()
        });
    }
}

/// namespace -> 버전별 MetricType 저장소
#[derive(Debug, Default)]
pub struct MetricTrie {
    root: Node,
}

impl MetricTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// 항목 추가 (같은 namespace + 버전은 덮어쓰기)
    pub fn add(&mut self, mt: MetricType) {
        let mut node = &mut self.root;
        for segment in mt.namespace() {
            node = node.children.entry(segment.clone()).or_default();
        }
        node.versions.insert(mt.version(), mt);
    }

    /// 정확한 경로의 모든 버전
    pub fn get(&self, namespace: &[String]) -> Result<&BTreeMap<i32, MetricType>> {
        match self.node(namespace) {
            Some(node) if !node.versions.is_empty() => Ok(&node.versions),
            _ => Err(Error::metric_not_found(format_namespace(namespace), None)),
        }
    }

    pub fn get_mut(&mut self, namespace: &[String]) -> Result<&mut BTreeMap<i32, MetricType>> {
        let mut node = &mut self.root;
        for segment in namespace {
            node = match node.children.get_mut(segment) {
                Some(child) => child,
                None => return Err(Error::metric_not_found(format_namespace(namespace), None)),
            };
        }
        if node.versions.is_empty() {
            return Err(Error::metric_not_found(format_namespace(namespace), None));
        }
        Ok(&mut node.versions)
    }

    /// 경로 이하의 모든 항목 (빈 namespace는 전체)
    pub fn fetch(&self, namespace: &[String]) -> Result<Vec<&MetricType>> {
        let mut out = Vec::new();
        if let Some(node) = self.node(namespace) {
            node.collect(&mut out);
        }
        if out.is_empty() {
            return Err(Error::metric_not_found(format_namespace(namespace), None));
        }
        Ok(out)
    }

    /// 정확한 경로의 모든 버전 삭제
    ///
    /// 하위 노드는 유지하고, 비게 된 노드만 정리한다.
    pub fn remove(&mut self, namespace: &[String]) -> Result<Vec<MetricType>> {
        fn remove_at(node: &mut Node, path: &[String]) -> Option<Vec<MetricType>> {
            match path.split_first() {
                None => {
                    if node.versions.is_empty() {
                        return None;
                    }
                    Some(std::mem::take(&mut node.versions).into_values().collect())
                }
                Some((segment, rest)) => {
                    let child = node.children.get_mut(segment)?;
                    let removed = remove_at(child, rest);
                    if child.is_empty() {
                        node.children.remove(segment);
                    }
                    removed
                }
            }
        }

        remove_at(&mut self.root, namespace)
            .ok_or_else(|| Error::metric_not_found(format_namespace(namespace), None))
    }

    /// 플러그인이 소유한 모든 항목 삭제
    ///
    /// 버전이 하나도 남지 않게 된 namespace 목록을 반환한다.
    pub fn delete_by_plugin(&mut self, plugin: &PluginKey) -> Vec<Vec<String>> {
        let mut emptied = Vec::new();
        let mut path = Vec::new();
        self.root.delete_by_plugin(plugin, &mut path, &mut emptied);
        emptied
    }

    /// 전체 항목 수 (namespace x 버전)
    pub fn len(&self) -> usize {
        self.root.count()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    fn node(&self, namespace: &[String]) -> Option<&Node> {
        let mut node = &self.root;
        for segment in namespace {
            node = node.children.get(segment)?;
        }
        Some(node)
    }
}
