//! Handle - short numeric pseudonymous user identifier
//!
//! The relay issues 7-digit handles (1000000-9999999). Anything made of 1 to
//! 16 ASCII digits is accepted so the client does not break if the range grows.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Maximum number of digits accepted in a handle
const MAX_HANDLE_LEN: usize = 16;

/// Pseudonymous user handle
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(String);

impl Handle {
    /// Parse a handle from its string form
    ///
    /// Strict: surrounding whitespace is rejected. Callers reading user input
    /// trim before parsing.
    pub fn parse(s: &str) -> Result<Self, HandleParseError> {
        if s.is_empty() {
            return Err(HandleParseError::Empty);
        }
        if s.len() > MAX_HANDLE_LEN {
            return Err(HandleParseError::TooLong { max: MAX_HANDLE_LEN });
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(HandleParseError::NotNumeric);
        }
        Ok(Self(s.to_string()))
    }

    /// Get the handle as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the handle and return the inner string
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Error when parsing a handle from string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HandleParseError {
    #[error("handle is empty")]
    Empty,

    #[error("handle is longer than {max} digits")]
    TooLong { max: usize },

    #[error("handle must contain only digits")]
    NotNumeric,
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Handle {
    type Err = HandleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Handle::parse(s)
    }
}

impl TryFrom<String> for Handle {
    type Error = HandleParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Handle::parse(&s)
    }
}

impl AsRef<str> for Handle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Handle {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

// Deserialize from string or number; the relay always sends strings but
// hand-written test payloads often use bare numbers.
impl<'de> Deserialize<'de> for Handle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct HandleVisitor;

        impl Visitor<'_> for HandleVisitor {
            type Value = Handle;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a numeric handle as string or integer")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Handle, E>
            where
                E: de::Error,
            {
                Handle::parse(&value.to_string()).map_err(de::Error::custom)
            }

            fn visit_i64<E>(self, value: i64) -> Result<Handle, E>
            where
                E: de::Error,
            {
                Handle::parse(&value.to_string()).map_err(de::Error::custom)
            }

            fn visit_str<E>(self, value: &str) -> Result<Handle, E>
            where
                E: de::Error,
            {
                Handle::parse(value).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_any(HandleVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let handle = Handle::parse("1234567").unwrap();
        assert_eq!(handle.as_str(), "1234567");
        assert_eq!(handle.to_string(), "1234567");
    }

    #[test]
    fn test_parse_rejects_surrounding_whitespace() {
        assert_eq!(" 7654321".parse::<Handle>(), Err(HandleParseError::NotNumeric));
        assert_eq!(Handle::parse("7654321\n"), Err(HandleParseError::NotNumeric));
        assert_eq!(Handle::parse(" "), Err(HandleParseError::NotNumeric));
        assert!(serde_json::from_str::<Handle>("\" 1234567\"").is_err());
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(Handle::parse(""), Err(HandleParseError::Empty));
        assert_eq!(Handle::parse("12a4"), Err(HandleParseError::NotNumeric));
        assert_eq!(Handle::parse("-123"), Err(HandleParseError::NotNumeric));
        assert_eq!(
            Handle::parse("12345678901234567"),
            Err(HandleParseError::TooLong { max: 16 })
        );
    }

    #[test]
    fn test_serde() {
        let handle = Handle::parse("1234567").unwrap();
        assert_eq!(serde_json::to_string(&handle).unwrap(), "\"1234567\"");

        let from_str: Handle = serde_json::from_str("\"1234567\"").unwrap();
        let from_num: Handle = serde_json::from_str("1234567").unwrap();
        assert_eq!(from_str, handle);
        assert_eq!(from_num, handle);

        assert!(serde_json::from_str::<Handle>("\"test_user\"").is_err());
    }
}
