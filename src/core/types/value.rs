//! Integer field values read from target memory

use serde::{Deserialize, Serialize};
use std::fmt;

/// The declared type of a field in the target's memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    I8,
    I16,
    #[default]
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl ValueType {
    /// Width of the value in bytes
    pub const fn size(&self) -> usize {
        match self {
            ValueType::I8 | ValueType::U8 => 1,
            ValueType::I16 | ValueType::U16 => 2,
            ValueType::I32 | ValueType::U32 => 4,
            ValueType::I64 | ValueType::U64 => 8,
        }
    }

    pub const fn is_signed(&self) -> bool {
        matches!(
            self,
            ValueType::I8 | ValueType::I16 | ValueType::I32 | ValueType::I64
        )
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::I8 => "i8",
            ValueType::I16 => "i16",
            ValueType::I32 => "i32",
            ValueType::I64 => "i64",
            ValueType::U8 => "u8",
            ValueType::U16 => "u16",
            ValueType::U32 => "u32",
            ValueType::U64 => "u64",
        };
        f.write_str(name)
    }
}

/// A value observed in target memory.
///
/// Serializes as a bare number. The width is not recoverable from that
/// number alone, so reading one back goes through [`FieldValue::from_i128`]
/// with the declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
}

impl FieldValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            FieldValue::I8(_) => ValueType::I8,
            FieldValue::I16(_) => ValueType::I16,
            FieldValue::I32(_) => ValueType::I32,
            FieldValue::I64(_) => ValueType::I64,
            FieldValue::U8(_) => ValueType::U8,
            FieldValue::U16(_) => ValueType::U16,
            FieldValue::U32(_) => ValueType::U32,
            FieldValue::U64(_) => ValueType::U64,
        }
    }

    /// Decodes a little-endian value of `value_type`.
    ///
    /// Returns `None` unless `bytes` is exactly the type's width.
    pub fn from_le_bytes(bytes: &[u8], value_type: ValueType) -> Option<Self> {
        if bytes.len() != value_type.size() {
            return None;
        }
        let value = match value_type {
            ValueType::I8 => FieldValue::I8(i8::from_le_bytes(bytes.try_into().ok()?)),
            ValueType::I16 => FieldValue::I16(i16::from_le_bytes(bytes.try_into().ok()?)),
            ValueType::I32 => FieldValue::I32(i32::from_le_bytes(bytes.try_into().ok()?)),
            ValueType::I64 => FieldValue::I64(i64::from_le_bytes(bytes.try_into().ok()?)),
            ValueType::U8 => FieldValue::U8(u8::from_le_bytes(bytes.try_into().ok()?)),
            ValueType::U16 => FieldValue::U16(u16::from_le_bytes(bytes.try_into().ok()?)),
            ValueType::U32 => FieldValue::U32(u32::from_le_bytes(bytes.try_into().ok()?)),
            ValueType::U64 => FieldValue::U64(u64::from_le_bytes(bytes.try_into().ok()?)),
        };
        Some(value)
    }

    /// Narrows `value` to `value_type`, `None` if it does not fit
    pub fn from_i128(value: i128, value_type: ValueType) -> Option<Self> {
        let value = match value_type {
            ValueType::I8 => FieldValue::I8(value.try_into().ok()?),
            ValueType::I16 => FieldValue::I16(value.try_into().ok()?),
            ValueType::I32 => FieldValue::I32(value.try_into().ok()?),
            ValueType::I64 => FieldValue::I64(value.try_into().ok()?),
            ValueType::U8 => FieldValue::U8(value.try_into().ok()?),
            ValueType::U16 => FieldValue::U16(value.try_into().ok()?),
            ValueType::U32 => FieldValue::U32(value.try_into().ok()?),
            ValueType::U64 => FieldValue::U64(value.try_into().ok()?),
        };
        Some(value)
    }

    /// Little-endian byte representation
    pub fn to_le_bytes(&self) -> Vec<u8> {
        match self {
            FieldValue::I8(v) => v.to_le_bytes().to_vec(),
            FieldValue::I16(v) => v.to_le_bytes().to_vec(),
            FieldValue::I32(v) => v.to_le_bytes().to_vec(),
            FieldValue::I64(v) => v.to_le_bytes().to_vec(),
            FieldValue::U8(v) => v.to_le_bytes().to_vec(),
            FieldValue::U16(v) => v.to_le_bytes().to_vec(),
            FieldValue::U32(v) => v.to_le_bytes().to_vec(),
            FieldValue::U64(v) => v.to_le_bytes().to_vec(),
        }
    }

    /// The value widened to i128, which holds every supported type
    pub fn as_i128(&self) -> i128 {
        match *self {
            FieldValue::I8(v) => v.into(),
            FieldValue::I16(v) => v.into(),
            FieldValue::I32(v) => v.into(),
            FieldValue::I64(v) => v.into(),
            FieldValue::U8(v) => v.into(),
            FieldValue::U16(v) => v.into(),
            FieldValue::U32(v) => v.into(),
            FieldValue::U64(v) => v.into(),
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        i32::try_from(self.as_i128()).ok()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i128())
    }
}
