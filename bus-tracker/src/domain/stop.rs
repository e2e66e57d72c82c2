//! Stop identifier type.

use std::fmt;

/// Error returned when parsing an invalid stop identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop id: {reason}")]
pub struct InvalidStopId {
    reason: &'static str,
}

/// Identifier of a bus stop, as used by the remote API.
///
/// Stop ids are opaque to us, but must be non-empty and must not contain
/// whitespace or `/`, since they are embedded in request paths.
///
/// # Examples
///
/// ```
/// use bus_tracker::domain::StopId;
///
/// let stop = StopId::parse(" 1042 ").unwrap();
/// assert_eq!(stop.as_str(), "1042");
///
/// assert!(StopId::parse("").is_err());
/// assert!(StopId::parse("a/b").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StopId(String);

impl StopId {
    /// Parse a stop id, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidStopId> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(InvalidStopId {
                reason: "must not be empty",
            });
        }

        if trimmed.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(InvalidStopId {
                reason: "must not contain whitespace or '/'",
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Returns the stop id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
