//! Callback query-string parsing
//!
//! Providers hand their results back as URL query parameters (`code`,
//! `state`, `error`, ...). The adapter does not validate them; it only
//! decodes them into a flat map. Decoding is strict: a malformed percent
//! escape or a value that is not UTF-8 after decoding is an error rather than
//! being silently replaced.

use std::collections::BTreeMap;

/// Flat key/value view of a query string. On duplicate keys the first value
/// wins.
pub type QueryMap = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("invalid URL escape {0:?}")]
    InvalidEscape(String),

    #[error("invalid semicolon separator in query")]
    Semicolon,

    #[error("query value is not valid UTF-8: {0}")]
    InvalidUtf8(String),
}

/// Parse a raw query string (without the leading `?`).
///
/// `+` decodes to a space, empty segments (`a=1&&b=2`) are skipped and a
/// segment without `=` maps to an empty value.
pub fn parse_query(raw: &str) -> Result<QueryMap, QueryError> {
    let mut map = QueryMap::new();
    for segment in raw.split('&') {
        if segment.is_empty() {
            continue;
        }
        if segment.contains(';') {
            return Err(QueryError::Semicolon);
        }
        let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
        let key = decode_component(key)?;
        let value = decode_component(value)?;
        map.entry(key).or_insert(value);
    }
    Ok(map)
}

fn decode_component(raw: &str) -> Result<String, QueryError> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let end = (i + 3).min(bytes.len());
            let well_formed = end - i == 3
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !well_formed {
                let escape = String::from_utf8_lossy(&bytes[i..end]).into_owned();
                return Err(QueryError::InvalidEscape(escape));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| QueryError::InvalidUtf8(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_code_and_state() {
        let query = parse_query("code=abc&state=xyz").unwrap();
        assert_eq!(query.len(), 2);
        assert_eq!(query["code"], "abc");
        assert_eq!(query["state"], "xyz");
    }

    #[test]
    fn decodes_percent_escapes_and_plus() {
        let query = parse_query("error_description=The+user%20denied%2Baccess").unwrap();
        assert_eq!(query["error_description"], "The user denied+access");
    }

    #[test]
    fn empty_query_is_empty_map() {
        assert!(parse_query("").unwrap().is_empty());
    }

    #[test]
    fn skips_empty_segments_and_keeps_bare_keys() {
        let query = parse_query("a=1&&flag").unwrap();
        assert_eq!(query["a"], "1");
        assert_eq!(query["flag"], "");
    }

    #[test]
    fn first_value_wins_on_duplicates() {
        let query = parse_query("code=first&code=second").unwrap();
        assert_eq!(query["code"], "first");
    }

    #[test]
    fn rejects_malformed_escape() {
        let err = parse_query("code=%zz").unwrap_err();
        assert_eq!(err, QueryError::InvalidEscape("%zz".into()));
        assert_eq!(err.to_string(), "invalid URL escape \"%zz\"");
    }

    #[test]
    fn rejects_truncated_escape() {
        let err = parse_query("code=ab%4").unwrap_err();
        assert_eq!(err, QueryError::InvalidEscape("%4".into()));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = parse_query("name=%ff%fe").unwrap_err();
        assert!(matches!(err, QueryError::InvalidUtf8(_)), "got: {err:?}");
    }

    #[test]
    fn rejects_semicolon_separator() {
        assert_eq!(
            parse_query("code=abc;state=xyz").unwrap_err(),
            QueryError::Semicolon
        );
    }

    #[test]
    fn escape_next_to_multibyte_char_does_not_panic() {
        let err = parse_query("q=%é").unwrap_err();
        assert!(matches!(err, QueryError::InvalidEscape(_)));
    }
}
