//! Namespace - metric namespace 키 변환 및 검증
//!
//! - 키 변환: segment 목록 <-> catalog 키 (`intel.mock.foo`)
//! - 검증: 등록 시 허용되지 않는 문자 / `*`로 끝나는 namespace 거부
//! - 표시: `/intel/mock/foo` 형식 파싱 및 출력

use pulse_foundation::{Error, Result};

/// Catalog 키 구분자 (segment 안에는 허용되지 않음)
pub const SEPARATOR: char = '.';

/// 표시용 구분자
pub const DISPLAY_SEPARATOR: char = '/';

/// 와일드카드 segment
pub const WILDCARD: char = '*';

/// 등록 namespace에 허용되지 않는 문자 그룹
pub const NOT_ALLOWED_CHARS: &[(&str, &[char])] = &[
    ("brackets", &['(', ')', '[', ']', '{', '}']),
    ("spaces", &[' ', '\t', '\n', '\r']),
    ("punctuations", &['.', ',', ';', '?', '!']),
    ("slashes", &['|', '\\', '/']),
    ("carets", &['^']),
    ("quotations", &['"', '`', '\'']),
];

// ============================================================================
// 키 변환
// ============================================================================

/// namespace -> catalog 키
pub fn metric_key<S: AsRef<str>>(namespace: &[S]) -> String {
    let mut key = String::new();
    for (i, segment) in namespace.iter().enumerate() {
        if i > 0 {
            key.push(SEPARATOR);
        }
        key.push_str(segment.as_ref());
    }
    key
}

/// catalog 키 -> namespace
pub fn metric_namespace(key: &str) -> Vec<String> {
    if key.is_empty() {
        return vec![];
    }
    key.split(SEPARATOR).map(str::to_string).collect()
}

/// 키 목록 -> namespace 목록 (빈 키는 제외)
pub fn keys_to_namespaces<S: AsRef<str>>(keys: &[S]) -> Vec<Vec<String>> {
    keys.iter()
        .map(|k| metric_namespace(k.as_ref()))
        .filter(|ns| !ns.is_empty())
        .collect()
}

// ============================================================================
// 표시 형식
// ============================================================================

/// `/intel/mock/foo` -> `["intel", "mock", "foo"]`
///
/// 앞의 `/`는 선택. 빈 segment는 그대로 유지되어 검증에서 걸러진다.
pub fn parse_namespace(s: &str) -> Vec<String> {
    let trimmed = s.strip_prefix(DISPLAY_SEPARATOR).unwrap_or(s);
    if trimmed.is_empty() {
        return vec![];
    }
    trimmed.split(DISPLAY_SEPARATOR).map(str::to_string).collect()
}

/// `["intel", "mock", "foo"]` -> `/intel/mock/foo`
pub fn format_namespace<S: AsRef<str>>(namespace: &[S]) -> String {
    let mut out = String::new();
    for segment in namespace {
        out.push(DISPLAY_SEPARATOR);
        out.push_str(segment.as_ref());
    }
    out
}

/// 목록 조회용 쿼리 정규화
///
/// - 빈 문자열 -> `/*`
/// - `/`로 끝나면 `*` 추가
/// - `/*`로 끝나지 않으면 `/*` 추가
pub fn list_query(namespace: &str) -> String {
    if namespace.is_empty() {
        return "/*".to_string();
    }
    if namespace.ends_with("/*") {
        namespace.to_string()
    } else if namespace.ends_with(DISPLAY_SEPARATOR) {
        format!("{}*", namespace)
    } else {
        format!("{}/*", namespace)
    }
}

// ============================================================================
// 검증
// ============================================================================

/// 허용되지 않는 문자 안내 문구
///
/// e.g. `brackets [( ) [ ] { }], spaces [ ], ...`
pub fn not_allowed_chars_hint() -> String {
    NOT_ALLOWED_CHARS
        .iter()
        .map(|(group, chars)| {
            let listed: Vec<String> = chars
                .iter()
                .filter(|c| !c.is_whitespace() || **c == ' ')
                .map(|c| c.to_string())
                .collect();
            format!("{} [{}]", group, listed.join(" "))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// 등록용 namespace 검증
///
/// 비어있는 namespace/segment, 허용되지 않는 문자, `*`로 끝나는 namespace를 거부한다.
/// 와일드카드는 쿼리에서만 허용.
pub fn validate_metric_namespace<S: AsRef<str>>(namespace: &[S]) -> Result<()> {
    let display = format_namespace(namespace);

    if namespace.is_empty() || namespace.iter().any(|s| s.as_ref().is_empty()) {
        return Err(Error::invalid_namespace(display, "namespace segments must not be empty"));
    }

    let joined: String = namespace.iter().map(|s| s.as_ref()).collect();

    let contains_not_allowed = NOT_ALLOWED_CHARS
        .iter()
        .any(|(_, chars)| joined.chars().any(|c| chars.contains(&c) || c.is_whitespace()));
    if contains_not_allowed {
        return Err(Error::invalid_namespace(
            display,
            format!(
                "contains not allowed characters. Avoid using {}",
                not_allowed_chars_hint()
            ),
        ));
    }

    if joined.ends_with(WILDCARD) {
        return Err(Error::invalid_namespace(
            display,
            "ends with an asterisk, which is not allowed",
        ));
    }

    Ok(())
}
