//! Query Matching - 와일드카드/튜플 쿼리 -> 정규식, 매칭 결과 캐시
//!
//! 쿼리 문법 (segment 단위):
//! - `*`       : 임의의 문자열 (구분자 포함)
//! - `(a|b|c)` : 나열된 값 중 하나
//! - 그 외     : 문자 그대로

use crate::namespace::{metric_key, metric_namespace, SEPARATOR, WILDCARD};
use pulse_foundation::{Error, Result};
use regex::Regex;
use std::collections::HashMap;

const TUPLE_START: char = '(';
const TUPLE_END: char = ')';
const TUPLE_SEPARATOR: char = '|';

// ============================================================================
// QueryPattern
// ============================================================================

/// 컴파일된 쿼리
#[derive(Debug, Clone)]
pub struct QueryPattern {
    key: String,
    regex: Regex,
}

impl QueryPattern {
    /// 쿼리 namespace 컴파일
    ///
    /// 정규식은 캐시 키를 다시 segment로 나눈 결과로 만든다. 구분자를 품은
    /// segment도 키와 같은 방식으로 해석되므로 키가 같으면 패턴도 같다.
    pub fn compile<S: AsRef<str>>(namespace: &[S]) -> Result<Self> {
        let key = metric_key(namespace);
        let mut pattern = String::from("^");

        for (i, segment) in metric_namespace(&key).iter().enumerate() {
            if i > 0 {
                pattern.push('[');
                pattern.push(SEPARATOR);
                pattern.push(']');
            }
            pattern.push_str(&segment_pattern(&key, segment)?);
        }
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|e| Error::InvalidQuery {
            query: key.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self { key, regex })
    }

    /// 캐시 키 (`intel.mock.*`)
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_match(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }

    /// 키 목록 중 매칭되는 키 (입력 순서 유지)
    pub fn matching<'a, I>(&self, keys: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        keys.into_iter().filter(|k| self.is_match(k)).cloned().collect()
    }
}

fn segment_pattern(query: &str, segment: &str) -> Result<String> {
    if let Some(inner) = segment
        .strip_prefix(TUPLE_START)
        .and_then(|s| s.strip_suffix(TUPLE_END))
    {
        let mut alternatives = Vec::new();
        for alt in inner.split(TUPLE_SEPARATOR) {
            if alt.is_empty() {
                return Err(Error::InvalidQuery {
                    query: query.to_string(),
                    reason: format!("empty alternative in tuple {}", segment),
                });
            }
            alternatives.push(literal_pattern(alt));
        }
        return Ok(format!("(?:{})", alternatives.join("|")));
    }

    Ok(literal_pattern(segment))
}

fn literal_pattern(segment: &str) -> String {
    let mut out = String::new();
    for c in segment.chars() {
        if c == WILDCARD {
            out.push_str(".*");
        } else {
            out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
        }
    }
    out
}

// ============================================================================
// MatchCache
// ============================================================================

#[derive(Debug, Clone)]
struct CachedMatch {
    pattern: QueryPattern,
    keys: Vec<String>,
}

/// 쿼리 키 -> 현재 매칭되는 catalog 키
///
/// 매칭 결과가 비게 된 쿼리는 캐시에서 제거된다.
#[derive(Debug, Default)]
pub struct MatchCache {
    entries: HashMap<String, CachedMatch>,
}

impl MatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, query_key: &str) -> Option<&[String]> {
        self.entries.get(query_key).map(|m| m.keys.as_slice())
    }

    /// 현재 키 목록으로 쿼리 매칭 후 저장
    ///
    /// 매칭 결과를 반환한다. 비어 있으면 저장하지 않는다.
    pub fn refresh(&mut self, pattern: QueryPattern, keys: &[String]) -> Vec<String> {
        let matched = pattern.matching(keys);
        if matched.is_empty() {
            self.entries.remove(pattern.key());
        } else {
            self.entries.insert(
                pattern.key().to_string(),
                CachedMatch {
                    pattern,
                    keys: matched.clone(),
                },
            );
        }
        matched
    }

    /// 모든 캐시 항목 재계산
    pub fn refresh_all(&mut self, keys: &[String]) {
        self.entries.retain(|_, cached| {
            cached.keys = cached.pattern.matching(keys);
            !cached.keys.is_empty()
        });
    }

    /// 새 키 추가 반영
    ///
    /// 키 목록 순서를 유지하기 위해 매칭되는 쿼리는 뒤에 추가한다.
    pub fn on_key_added(&mut self, key: &str) {
        for cached in self.entries.values_mut() {
            if cached.pattern.is_match(key) && !cached.keys.iter().any(|k| k == key) {
                cached.keys.push(key.to_string());
            }
        }
    }

    /// 삭제된 키를 모든 쿼리에서 제거
    pub fn purge_key(&mut self, key: &str) {
        self.entries.retain(|_, cached| {
            cached.keys.retain(|k| k != key);
            !cached.keys.is_empty()
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn compile(q: &str) -> QueryPattern {
        let ns: Vec<&str> = q.split('.').collect();
        QueryPattern::compile(&ns).unwrap()
    }

    #[test]
    fn test_literal_dot_is_escaped() {
        let p = compile("intel.mock.foo");
        assert!(p.is_match("intel.mock.foo"));
        assert!(!p.is_match("intelxmock.foo"));
        assert!(!p.is_match("intel.mock.foobar"));
    }

    #[test]
    fn test_wildcard_is_permissive() {
        let p = compile("intel.mock.*");
        assert!(p.is_match("intel.mock.foo"));
        assert!(p.is_match("intel.mock.foo.bar"));
        assert!(!p.is_match("intel.other.foo"));

        let p = compile("intel.*.foo");
        assert!(p.is_match("intel.mock.foo"));
        assert!(p.is_match("intel.a.b.foo"));
    }

    #[test]
    fn test_tuple_segment() {
        let p = compile("intel.mock.(foo|bar)");
        assert!(p.is_match("intel.mock.foo"));
        assert!(p.is_match("intel.mock.bar"));
        assert!(!p.is_match("intel.mock.baz"));

        let err = QueryPattern::compile(&["intel", "(foo|)"]).unwrap_err();
        assert!(matches!(err, Error::InvalidQuery { .. }));
    }

    #[test]
    fn test_same_key_same_pattern() {
        // 두 쿼리는 같은 키 `intel.(a.b|c)`로 합쳐진다
        let joined = QueryPattern::compile(&["intel", "(a.b|c)"]).unwrap();
        let split = QueryPattern::compile(&["intel", "(a", "b|c)"]).unwrap();
        assert_eq!(joined.key(), split.key());

        for key in ["intel.c", "intel.a.b", "intel.(a.b|c)"] {
            assert_eq!(joined.is_match(key), split.is_match(key), "{}", key);
        }
        assert!(!joined.is_match("intel.c"));
    }

    #[test]
    fn test_regex_metachars_are_literal() {
        let p = compile("intel.a+b");
        assert!(p.is_match("intel.a+b"));
        assert!(!p.is_match("intel.aab"));
    }

    #[test]
    fn test_cache_refresh_drops_empty() {
        let mut cache = MatchCache::new();
        let all = keys(&["intel.mock.foo", "intel.mock.bar"]);

        let matched = cache.refresh(compile("intel.mock.*"), &all);
        assert_eq!(matched.len(), 2);
        assert_eq!(cache.get("intel.mock.*").unwrap().len(), 2);

        assert!(cache.refresh(compile("nope.*"), &all).is_empty());
        assert!(cache.get("nope.*").is_none());

        cache.refresh_all(&keys(&["intel.mock.bar"]));
        assert_eq!(cache.get("intel.mock.*").unwrap(), &keys(&["intel.mock.bar"])[..]);

        cache.refresh_all(&[]);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_incremental_updates() {
        let mut cache = MatchCache::new();
        cache.refresh(compile("intel.*"), &keys(&["intel.a"]));

        cache.on_key_added("intel.b");
        cache.on_key_added("other.c");
        cache.on_key_added("intel.b");
        assert_eq!(cache.get("intel.*").unwrap(), &keys(&["intel.a", "intel.b"])[..]);

        cache.purge_key("intel.a");
        cache.purge_key("intel.b");
        assert!(cache.get("intel.*").is_none());
        assert_eq!(cache.len(), 0);
    }
}
