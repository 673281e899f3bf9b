//! Semicolon-delimited `key=value` connection strings.
//!
//! ```text
//! server=localhost;database=mydb;user id=sa;password=secret
//! ```
//!
//! There is no escaping: a value cannot contain `;`, and only the first `=`
//! of a segment separates key from value.

use crate::params::RawParams;

/// Split a semicolon-format connection string into raw parameters.
///
/// This never fails. Empty segments and segments with an empty key are
/// skipped, and a segment without `=` yields the key with an empty value.
#[must_use]
pub fn split_connection_string(dsn: &str) -> RawParams {
    let mut params = RawParams::new();

    for part in dsn.split(';') {
        if part.is_empty() {
            continue;
        }

        let (key, value) = part.split_once('=').unwrap_or((part, ""));
        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        params.insert(key, value.trim());
    }

    params
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_pairs() {
        let params = split_connection_string("Server=localhost;Database=foo");
        assert_eq!(params.get("server"), Some("localhost"));
        assert_eq!(params.get("database"), Some("foo"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let params = split_connection_string("  User Id  =  sa  ; password= x ");
        assert_eq!(params.get("user id"), Some("sa"));
        assert_eq!(params.get("password"), Some("x"));
    }

    #[test]
    fn test_only_first_equals_splits() {
        let params = split_connection_string("password=pass=word=with=equals");
        assert_eq!(params.get("password"), Some("pass=word=with=equals"));
    }

    #[test]
    fn test_key_without_equals() {
        let params = split_connection_string("encrypt;database=x");
        assert_eq!(params.get("encrypt"), Some(""));
        assert_eq!(params.get("database"), Some("x"));
    }

    #[test]
    fn test_empty_segments_skipped() {
        let params = split_connection_string(";;server=a;;;");
        assert_eq!(params.len(), 1);

        assert!(split_connection_string("").is_empty());
        assert!(split_connection_string(";").is_empty());
        assert!(split_connection_string(" = orphan").is_empty());
    }

    #[test]
    fn test_last_key_wins() {
        let params = split_connection_string("database=a;DATABASE=b");
        assert_eq!(params.get("database"), Some("b"));
    }
}
