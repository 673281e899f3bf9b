//! DSN error types.

use thiserror::Error;

/// Errors that can occur while parsing or resolving a DSN.
///
/// Variants fall into three groups, see [`DsnError::is_syntax`],
/// [`DsnError::is_value`] and [`DsnError::is_semantic`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DsnError {
    /// Unexpected character in an ODBC-format connection string.
    #[error("unexpected character {ch:?} at index {index}, expected {expected}")]
    UnexpectedChar {
        /// The offending character.
        ch: char,
        /// Byte offset in the input (after the `odbc:` prefix).
        index: usize,
        /// What the tokenizer was expecting instead.
        expected: &'static str,
    },

    /// A braced ODBC value was never closed.
    #[error("unexpected end of braced value at index {index}")]
    UnterminatedBrace {
        /// Length of the input in bytes.
        index: usize,
    },

    /// URL-format DSN could not be parsed.
    #[error("invalid connection URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// URL-format DSN used a scheme other than `sqlserver`.
    #[error("scheme {0} is not recognized")]
    UnsupportedScheme(String),

    /// A URL query key appeared more than once.
    #[error("key {0} provided more than once")]
    DuplicateQueryKey(String),

    /// A parameter value failed to parse as its target type.
    #[error("invalid {param} '{value}': {reason}")]
    InvalidValue {
        /// Parameter name as it appears in the DSN (lower-cased).
        param: &'static str,
        /// Raw value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// `ApplicationIntent=ReadOnly` was requested without a database.
    #[error("database must be specified when ApplicationIntent is ReadOnly")]
    MissingDatabaseForReadOnly,

    /// `KeyStoreLocation` was present but empty.
    #[error("invalid keystore location provided: ''")]
    EmptyKeyStoreLocation,

    /// `KeyStoreLocation` does not name an existing path.
    #[error("unable to find keystore {path}: {source}")]
    KeyStoreNotFound {
        /// The configured path.
        path: String,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },

    /// `KeyStoreAuthentication` named an unsupported method.
    #[error("invalid keyStoreAuthentication '{0}'")]
    UnknownKeyStoreAuthentication(String),
}

impl DsnError {
    pub(crate) fn invalid_value(
        param: &'static str,
        value: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::InvalidValue {
            param,
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if this error comes from malformed DSN syntax.
    #[must_use]
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedChar { .. }
                | Self::UnterminatedBrace { .. }
                | Self::InvalidUrl(_)
                | Self::UnsupportedScheme(_)
                | Self::DuplicateQueryKey(_)
        )
    }

    /// Check if this error comes from a single value failing to parse.
    #[must_use]
    pub fn is_value(&self) -> bool {
        matches!(self, Self::InvalidValue { .. })
    }

    /// Check if this error comes from a cross-field or environment check.
    #[must_use]
    pub fn is_semantic(&self) -> bool {
        matches!(
            self,
            Self::MissingDatabaseForReadOnly
                | Self::EmptyKeyStoreLocation
                | Self::KeyStoreNotFound { .. }
                | Self::UnknownKeyStoreAuthentication(_)
        )
    }

    /// Name of the parameter this error refers to, if any.
    #[must_use]
    pub fn param(&self) -> Option<&str> {
        match self {
            Self::InvalidValue { param, .. } => Some(*param),
            Self::DuplicateQueryKey(key) => Some(key.as_str()),
            Self::MissingDatabaseForReadOnly => Some("applicationintent"),
            Self::EmptyKeyStoreLocation | Self::KeyStoreNotFound { .. } => {
                Some("keystorelocation")
            }
            Self::UnknownKeyStoreAuthentication(_) => Some("keystoreauthentication"),
            _ => None,
        }
    }
}

/// Result type for DSN operations.
pub type Result<T> = std::result::Result<T, DsnError>;
