//! Signed byte offsets used by pointer chains and field tables

use super::error::ProbeError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A signed byte offset relative to some base address.
///
/// Serialized as a hex string (`"0x18"`, `"-0x10"`); deserialized from
/// either an integer or such a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Offset(i64);

impl Offset {
    pub const fn new(value: i64) -> Self {
        Offset(value)
    }

    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for Offset {
    fn from(value: i64) -> Self {
        Offset(value)
    }
}

impl FromStr for Offset {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let magnitude = match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
            Some(hex) => i64::from_str_radix(hex, 16),
            None => body.parse::<i64>(),
        }
        .map_err(|_| ProbeError::InvalidAddress(format!("invalid offset: {trimmed}")))?;

        Ok(Offset(if negative { -magnitude } else { magnitude }))
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            write!(f, "-0x{:X}", self.0.unsigned_abs())
        } else {
            write!(f, "+0x{:X}", self.0)
        }
    }
}

impl Serialize for Offset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let text = if self.0 < 0 {
            format!("-0x{:X}", self.0.unsigned_abs())
        } else {
            format!("0x{:X}", self.0)
        };
        serializer.serialize_str(&text)
    }
}

struct OffsetVisitor;

impl<'de> Visitor<'de> for OffsetVisitor {
    type Value = Offset;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or a hex string such as \"0x18\"")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Offset, E> {
        Ok(Offset(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Offset, E> {
        i64::try_from(v)
            .map(Offset)
            .map_err(|_| E::custom(format!("offset {v:#x} out of range")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Offset, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Offset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(OffsetVisitor)
    }
}
