//! ODBC-format connection strings.
//!
//! ```text
//! odbc:server=localhost;user id=sa;password={foo;bar}}baz}
//! ```
//!
//! Values are either bare or braced. A bare value runs up to the next `;`
//! and loses its trailing whitespace. A braced value is taken verbatim up to
//! the matching `}`; a literal `}` is written as `}}`. Everything else,
//! including `{`, `;` and `=`, is literal inside braces.
//!
//! The tokenizer is a character-level state machine. Each [`OdbcState`]
//! variant owns the buffers it needs, and [`OdbcState::step`] dispatches to
//! one transition function per state.

use crate::error::{DsnError, Result};
use crate::params::RawParams;

/// A committed `(key, value)` pair.
pub type Pair = (String, String);

/// Tokenizer state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OdbcState {
    /// Before the start of a key.
    #[default]
    BeforeKey,
    /// Inside a key.
    Key(String),
    /// After `=`, the value may be bare or braced.
    BeginValue {
        /// Normalized key.
        key: String,
    },
    /// Inside a bare value.
    BareValue {
        /// Normalized key.
        key: String,
        /// Value read so far.
        value: String,
    },
    /// Inside a braced value.
    BracedValue {
        /// Normalized key.
        key: String,
        /// Value read so far.
        value: String,
    },
    /// A `}` inside a braced value: either the end of the value or the first
    /// half of an escaped `}}`.
    BracedValueClosingBrace {
        /// Normalized key.
        key: String,
        /// Value read so far.
        value: String,
    },
    /// After a braced value; only `;` or whitespace may follow.
    EndValue,
}

/// Result of feeding one character to the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State to continue in.
    pub state: OdbcState,
    /// Pair committed by this character, if any.
    pub pair: Option<Pair>,
}

impl Transition {
    fn to(state: OdbcState) -> Self {
        Self { state, pair: None }
    }

    fn commit(state: OdbcState, key: String, value: String) -> Self {
        Self {
            state,
            pair: Some((key, value)),
        }
    }
}

impl OdbcState {
    /// Feed the character `ch`, found at byte offset `index`.
    pub fn step(self, ch: char, index: usize) -> Result<Transition> {
        match self {
            Self::BeforeKey => before_key(ch, index),
            Self::Key(key) => in_key(key, ch),
            Self::BeginValue { key } => begin_value(key, ch),
            Self::BareValue { key, value } => bare_value(key, value, ch),
            Self::BracedValue { key, value } => braced_value(key, value, ch),
            Self::BracedValueClosingBrace { key, value } => {
                braced_value_closing_brace(key, value, ch, index)
            }
            Self::EndValue => end_value(ch, index),
        }
    }

    /// Finish tokenizing at end of input, whose length is `len` bytes.
    pub fn finish(self, len: usize) -> Result<Option<Pair>> {
        match self {
            Self::BeforeKey | Self::EndValue => Ok(None),
            Self::Key(key) => Ok(Some((normalize_key(&key), String::new()))),
            Self::BeginValue { key } => Ok(Some((key, String::new()))),
            Self::BareValue { key, value } => Ok(Some((key, trim_value(value)))),
            Self::BracedValue { .. } => Err(DsnError::UnterminatedBrace { index: len }),
            Self::BracedValueClosingBrace { key, value } => Ok(Some((key, value))),
        }
    }
}

fn before_key(ch: char, index: usize) -> Result<Transition> {
    match ch {
        '=' => Err(DsnError::UnexpectedChar {
            ch,
            index,
            expected: "start of key or semi-colon or whitespace",
        }),
        ';' => Ok(Transition::to(OdbcState::BeforeKey)),
        c if c.is_whitespace() => Ok(Transition::to(OdbcState::BeforeKey)),
        c => Ok(Transition::to(OdbcState::Key(c.to_string()))),
    }
}

fn in_key(mut key: String, ch: char) -> Result<Transition> {
    match ch {
        '=' => Ok(Transition::to(OdbcState::BeginValue {
            key: normalize_key(&key),
        })),
        ';' => Ok(Transition::commit(
            OdbcState::BeforeKey,
            normalize_key(&key),
            String::new(),
        )),
        c => {
            key.push(c);
            Ok(Transition::to(OdbcState::Key(key)))
        }
    }
}

fn begin_value(key: String, ch: char) -> Result<Transition> {
    match ch {
        '{' => Ok(Transition::to(OdbcState::BracedValue {
            key,
            value: String::new(),
        })),
        ';' => Ok(Transition::commit(OdbcState::BeforeKey, key, String::new())),
        c if c.is_whitespace() => Ok(Transition::to(OdbcState::BeginValue { key })),
        c => Ok(Transition::to(OdbcState::BareValue {
            key,
            value: c.to_string(),
        })),
    }
}

fn bare_value(key: String, mut value: String, ch: char) -> Result<Transition> {
    if ch == ';' {
        return Ok(Transition::commit(
            OdbcState::BeforeKey,
            key,
            trim_value(value),
        ));
    }
    value.push(ch);
    Ok(Transition::to(OdbcState::BareValue { key, value }))
}

fn braced_value(key: String, mut value: String, ch: char) -> Result<Transition> {
    if ch == '}' {
        return Ok(Transition::to(OdbcState::BracedValueClosingBrace {
            key,
            value,
        }));
    }
    value.push(ch);
    Ok(Transition::to(OdbcState::BracedValue { key, value }))
}

fn braced_value_closing_brace(
    key: String,
    mut value: String,
    ch: char,
    index: usize,
) -> Result<Transition> {
    if ch == '}' {
        value.push('}');
        return Ok(Transition::to(OdbcState::BracedValue { key, value }));
    }

    // The value is complete; this character is the first one after it.
    let after = end_value(ch, index)?;
    Ok(Transition::commit(after.state, key, value))
}

fn end_value(ch: char, index: usize) -> Result<Transition> {
    match ch {
        ';' => Ok(Transition::to(OdbcState::BeforeKey)),
        c if c.is_whitespace() => Ok(Transition::to(OdbcState::EndValue)),
        c => Err(DsnError::UnexpectedChar {
            ch: c,
            index,
            expected: "semi-colon or whitespace",
        }),
    }
}

fn normalize_key(key: &str) -> String {
    RawParams::normalize_key(key.trim_end())
}

fn trim_value(value: String) -> String {
    let trimmed = value.trim_end();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

/// Split an ODBC-format connection string (without the `odbc:` prefix)
/// into raw parameters.
pub fn split_connection_string_odbc(dsn: &str) -> Result<RawParams> {
    let mut params = RawParams::new();
    let mut state = OdbcState::default();

    for (index, ch) in dsn.char_indices() {
        let Transition { state: next, pair } = state.step(ch, index)?;
        if let Some((key, value)) = pair {
            tracing::trace!(key = %key, "odbc pair");
            params.insert(&key, value);
        }
        state = next;
    }

    if let Some((key, value)) = state.finish(dsn.len())? {
        tracing::trace!(key = %key, "odbc pair");
        params.insert(&key, value);
    }

    Ok(params)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn run(dsn: &str) -> RawParams {
        split_connection_string_odbc(dsn).unwrap()
    }

    // State-by-state transitions

    #[test]
    fn test_before_key_transitions() {
        let t = OdbcState::BeforeKey.step(' ', 0).unwrap();
        assert_eq!(t.state, OdbcState::BeforeKey);
        let t = OdbcState::BeforeKey.step(';', 0).unwrap();
        assert_eq!(t.state, OdbcState::BeforeKey);
        let t = OdbcState::BeforeKey.step('S', 0).unwrap();
        assert_eq!(t.state, OdbcState::Key("S".into()));
        assert!(t.pair.is_none());

        let err = OdbcState::BeforeKey.step('=', 3).unwrap_err();
        assert!(matches!(err, DsnError::UnexpectedChar { ch: '=', index: 3, .. }));
    }

    #[test]
    fn test_key_transitions() {
        let t = OdbcState::Key("User".into()).step(' ', 0).unwrap();
        assert_eq!(t.state, OdbcState::Key("User ".into()));

        let t = OdbcState::Key("User Id  ".into()).step('=', 0).unwrap();
        assert_eq!(
            t.state,
            OdbcState::BeginValue {
                key: "user id".into()
            }
        );

        let t = OdbcState::Key("Flag".into()).step(';', 0).unwrap();
        assert_eq!(t.state, OdbcState::BeforeKey);
        assert_eq!(t.pair, Some(("flag".into(), String::new())));
    }

    #[test]
    fn test_begin_value_transitions() {
        let begin = || OdbcState::BeginValue { key: "k".into() };

        let t = begin().step('{', 0).unwrap();
        assert_eq!(
            t.state,
            OdbcState::BracedValue {
                key: "k".into(),
                value: String::new()
            }
        );

        let t = begin().step(';', 0).unwrap();
        assert_eq!(t.state, OdbcState::BeforeKey);
        assert_eq!(t.pair, Some(("k".into(), String::new())));

        let t = begin().step('\t', 0).unwrap();
        assert_eq!(t.state, begin());

        let t = begin().step('v', 0).unwrap();
        assert_eq!(
            t.state,
            OdbcState::BareValue {
                key: "k".into(),
                value: "v".into()
            }
        );
    }

    #[test]
    fn test_bare_value_transitions() {
        let bare = |v: &str| OdbcState::BareValue {
            key: "k".into(),
            value: v.into(),
        };

        assert_eq!(bare("a").step('=', 0).unwrap().state, bare("a="));
        assert_eq!(bare("a").step('{', 0).unwrap().state, bare("a{"));

        let t = bare("abc  ").step(';', 0).unwrap();
        assert_eq!(t.state, OdbcState::BeforeKey);
        assert_eq!(t.pair, Some(("k".into(), "abc".into())));
    }

    #[test]
    fn test_braced_value_transitions() {
        let braced = |v: &str| OdbcState::BracedValue {
            key: "k".into(),
            value: v.into(),
        };
        let closing = |v: &str| OdbcState::BracedValueClosingBrace {
            key: "k".into(),
            value: v.into(),
        };

        assert_eq!(braced(" a").step(';', 0).unwrap().state, braced(" a;"));
        assert_eq!(braced("a").step('}', 0).unwrap().state, closing("a"));

        // escaped brace
        assert_eq!(closing("a").step('}', 0).unwrap().state, braced("a}"));

        let t = closing("a ").step(';', 0).unwrap();
        assert_eq!(t.state, OdbcState::BeforeKey);
        assert_eq!(t.pair, Some(("k".into(), "a ".into())));

        let t = closing("a").step(' ', 0).unwrap();
        assert_eq!(t.state, OdbcState::EndValue);
        assert_eq!(t.pair, Some(("k".into(), "a".into())));

        let err = closing("a").step('x', 9).unwrap_err();
        assert!(matches!(err, DsnError::UnexpectedChar { ch: 'x', index: 9, .. }));
    }

    #[test]
    fn test_end_value_transitions() {
        assert_eq!(
            OdbcState::EndValue.step(' ', 0).unwrap().state,
            OdbcState::EndValue
        );
        assert_eq!(
            OdbcState::EndValue.step(';', 0).unwrap().state,
            OdbcState::BeforeKey
        );
        assert!(OdbcState::EndValue.step('a', 0).is_err());
    }

    #[test]
    fn test_finish_per_state() {
        assert_eq!(OdbcState::BeforeKey.finish(0).unwrap(), None);
        assert_eq!(OdbcState::EndValue.finish(0).unwrap(), None);
        assert_eq!(
            OdbcState::Key("Trailing ".into()).finish(0).unwrap(),
            Some(("trailing".into(), String::new()))
        );
        assert_eq!(
            OdbcState::BeginValue { key: "k".into() }.finish(0).unwrap(),
            Some(("k".into(), String::new()))
        );
        assert_eq!(
            OdbcState::BareValue {
                key: "k".into(),
                value: "v \t".into()
            }
            .finish(0)
            .unwrap(),
            Some(("k".into(), "v".into()))
        );
        assert_eq!(
            OdbcState::BracedValueClosingBrace {
                key: "k".into(),
                value: " v ".into()
            }
            .finish(0)
            .unwrap(),
            Some(("k".into(), " v ".into()))
        );

        let err = OdbcState::BracedValue {
            key: "k".into(),
            value: "abc".into(),
        }
        .finish(6)
        .unwrap_err();
        assert!(matches!(err, DsnError::UnterminatedBrace { index: 6 }));
    }

    // Whole-string tokenizing

    #[test]
    fn test_bare_values() {
        let params = run("server=localhost;database=foo");
        assert_eq!(params.get("server"), Some("localhost"));
        assert_eq!(params.get("database"), Some("foo"));
    }

    #[test]
    fn test_escaped_closing_brace() {
        let params = run("password={a}}b}");
        assert_eq!(params.get("password"), Some("a}b"));
    }

    #[test]
    fn test_braced_value_keeps_everything() {
        let params = run("password={ ;={x} ;user id=sa");
        assert_eq!(params.get("password"), Some(" ;={x"));
        assert_eq!(params.get("user id"), Some("sa"));
    }

    #[test]
    fn test_unterminated_brace() {
        let err = split_connection_string_odbc("password={abc").unwrap_err();
        assert!(matches!(err, DsnError::UnterminatedBrace { index: 13 }));
    }

    #[test]
    fn test_garbage_after_braced_value() {
        let err = split_connection_string_odbc("password={abc}x").unwrap_err();
        assert!(matches!(err, DsnError::UnexpectedChar { ch: 'x', index: 14, .. }));

        let err = split_connection_string_odbc("password={abc}  x").unwrap_err();
        assert!(matches!(err, DsnError::UnexpectedChar { ch: 'x', index: 16, .. }));
    }

    #[test]
    fn test_leading_equals_is_an_error() {
        assert!(split_connection_string_odbc("=value").is_err());
        assert!(split_connection_string_odbc("a=b; =c").is_err());
    }

    #[test]
    fn test_whitespace_handling() {
        let params = run("  Server  =   host name   ;  App Name = x ");
        assert_eq!(params.get("server"), Some("host name"));
        assert_eq!(params.get("app name"), Some("x"));
    }

    #[test]
    fn test_keys_without_values() {
        let params = run("flag;other=;last");
        assert_eq!(params.get("flag"), Some(""));
        assert_eq!(params.get("other"), Some(""));
        assert_eq!(params.get("last"), Some(""));
    }

    #[test]
    fn test_last_key_wins() {
        let params = run("database=a;Database={b}");
        assert_eq!(params.get("database"), Some("b"));
    }

    #[test]
    fn test_empty_input() {
        assert!(run("").is_empty());
        assert!(run(" ; ;; ").is_empty());
    }

    #[test]
    fn test_multibyte_index() {
        let err = split_connection_string_odbc("k={é}x").unwrap_err();
        assert!(matches!(err, DsnError::UnexpectedChar { ch: 'x', index: 6, .. }));
    }
}
