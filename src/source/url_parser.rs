//! Locator string grammar helpers
//!
//! Small, pure string functions shared by [`super::Locator::parse`].

use crate::error::{Result, SpmError};

/// Split a trailing `@ref` off a repository specifier.
///
/// The ref is whatever follows the last `@`, provided it contains no `/`
/// and is not empty. Returns (`main_part`, `optional_ref`).
pub fn split_ref(input: &str) -> (&str, Option<&str>) {
    match input.rfind('@') {
        Some(at_pos) if at_pos > 0 => {
            let candidate = &input[at_pos + 1..];
            if candidate.is_empty() || candidate.contains('/') {
                (input, None)
            } else {
                (&input[..at_pos], Some(candidate))
            }
        }
        _ => (input, None),
    }
}

/// Check if a specifier uses the `owner/repo[/path]` shorthand (no scheme)
pub fn is_shorthand(input: &str) -> bool {
    !input.contains("://") && !input.starts_with('/') && input.contains('/')
}

/// Split `host/owner/repo[/sub/path]` into its segments.
///
/// Returns (host, owner, repo, `sub_path`) with an empty `sub_path` when the
/// specifier names the repository root.
pub fn split_repository_path(path: &str) -> Option<(&str, &str, &str, String)> {
    let mut parts = path.splitn(4, '/');
    let host = parts.next().filter(|s| !s.is_empty())?;
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let repo = parts.next().filter(|s| !s.is_empty())?;
    let sub_path = parts
        .next()
        .map(|rest| rest.trim_matches('/').to_string())
        .unwrap_or_default();
    Some((host, owner, repo, sub_path))
}

/// Query parameters understood by the retrieval form
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RetrievalQuery {
    pub path: Option<String>,
    pub version: Option<String>,
}

/// Parse `key=value&key=value` into the retrieval query parameters.
///
/// Unknown keys are ignored. A pair without `=`, an empty key or a broken
/// percent escape is an `InvalidQuery` error. Empty values count as unset.
pub fn parse_query(query: &str) -> Result<RetrievalQuery> {
    let mut parsed = RetrievalQuery::default();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(invalid_query(query, format!("missing '=' in '{pair}'")));
        };
        if key.is_empty() {
            return Err(invalid_query(query, format!("empty key in '{pair}'")));
        }
        let value = percent_decode(value).ok_or_else(|| {
            invalid_query(query, format!("invalid percent-encoding in '{pair}'"))
        })?;
        if value.is_empty() {
            continue;
        }
        match key {
            "path" => parsed.path = Some(value),
            "version" => parsed.version = Some(value),
            other => tracing::debug!("ignoring unknown query parameter '{other}'"),
        }
    }
    Ok(parsed)
}

fn invalid_query(query: &str, reason: String) -> SpmError {
    SpmError::InvalidQuery {
        query: query.to_string(),
        reason,
    }
}

/// Decode `%XX` escapes and `+` (space) in a query value
fn percent_decode(value: &str) -> Option<String> {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = value.get(i + 1..i + 3)?;
                if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                    return None;
                }
                out.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).ok()
}
