//! Bus line types.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Numeric identifier of a bus line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(pub u32);

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when parsing an invalid line colour.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid line colour: {reason}")]
pub struct InvalidLineColor {
    reason: &'static str,
}

/// A 32-bit ARGB colour used to paint a line badge.
///
/// # Examples
///
/// ```
/// use bus_tracker::domain::LineColor;
///
/// let opaque = LineColor::parse_hex("#0055AA").unwrap();
/// assert_eq!(opaque.argb(), 0xFF0055AA);
///
/// let translucent = LineColor::parse_hex("#800055AA").unwrap();
/// assert_eq!(translucent.alpha(), 0x80);
///
/// assert!(LineColor::parse_hex("0055AA").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineColor(u32);

impl LineColor {
    /// Wrap a raw ARGB value.
    pub const fn from_argb(argb: u32) -> Self {
        Self(argb)
    }

    /// Parse `#RRGGBB` (fully opaque) or `#AARRGGBB`.
    pub fn parse_hex(s: &str) -> Result<Self, InvalidLineColor> {
        let digits = s.strip_prefix('#').ok_or(InvalidLineColor {
            reason: "must start with '#'",
        })?;

        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(InvalidLineColor {
                reason: "must contain only hex digits",
            });
        }

        let value = u32::from_str_radix(digits, 16).map_err(|_| InvalidLineColor {
            reason: "must contain only hex digits",
        })?;

        match digits.len() {
            6 => Ok(Self(0xFF00_0000 | value)),
            8 => Ok(Self(value)),
            _ => Err(InvalidLineColor {
                reason: "must have 6 or 8 hex digits",
            }),
        }
    }

    /// The raw ARGB value.
    pub fn argb(&self) -> u32 {
        self.0
    }

    /// The alpha channel.
    pub fn alpha(&self) -> u8 {
        (self.0 >> 24) as u8
    }
}

impl fmt::Debug for LineColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineColor(#{:08X})", self.0)
    }
}

impl fmt::Display for LineColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

/// A bus line as served by the network.
///
/// Identity is the [`LineId`]: two lines with the same id compare equal even
/// if their label or colour differ.
#[derive(Debug, Clone)]
pub struct Line {
    pub id: LineId,
    pub label: String,
    pub color: Option<LineColor>,
}

impl Line {
    /// Create a new line.
    pub fn new(id: LineId, label: impl Into<String>, color: Option<LineColor>) -> Self {
        Self {
            id,
            label: label.into(),
            color,
        }
    }
}

impl PartialEq for Line {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Line {}

impl Hash for Line {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
