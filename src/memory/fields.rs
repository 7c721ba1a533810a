//! Field tables and snapshot extraction
//!
//! All offsets in a [`FieldTable`] are measured from the same final base
//! address, so one chain resolution serves every field of a snapshot.
//! Each field is read independently: a failure is recorded on that field
//! alone and extraction carries on with the rest.

use crate::core::types::{Address, FieldValue, Offset, ProbeError, ProbeResult, ValueType};
use crate::memory::reader::ReadMemory;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::SystemTime;
use tracing::warn;

/// One named field at a fixed offset from the final base address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub offset: Offset,
    #[serde(rename = "type", default)]
    pub value_type: ValueType,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, offset: i64, value_type: ValueType) -> Self {
        FieldSpec {
            name: name.into(),
            offset: Offset::new(offset),
            value_type,
        }
    }

    /// A signed 32-bit field, the common case
    pub fn i32(name: impl Into<String>, offset: i64) -> Self {
        Self::new(name, offset, ValueType::I32)
    }
}

/// Ordered, name-unique list of fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTable {
    fields: Vec<FieldSpec>,
}

impl FieldTable {
    /// Builds a table, rejecting duplicate field names.
    pub fn new(fields: Vec<FieldSpec>) -> ProbeResult<Self> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(ProbeError::InvalidFieldTable(format!(
                    "duplicate field name: {}",
                    field.name
                )));
            }
        }
        Ok(FieldTable { fields })
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// The outcome of reading one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFieldReading")]
pub struct FieldReading {
    pub name: String,
    pub offset: Offset,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    /// Address that was read, absent if it could not be computed
    pub address: Option<Address>,
    pub value: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A JSON number before it is narrowed to the field's declared type
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Signed(i64),
    Unsigned(u64),
}

impl From<RawNumber> for i128 {
    fn from(raw: RawNumber) -> Self {
        match raw {
            RawNumber::Signed(v) => v.into(),
            RawNumber::Unsigned(v) => v.into(),
        }
    }
}

#[derive(Deserialize)]
struct RawFieldReading {
    name: String,
    offset: Offset,
    #[serde(rename = "type", default)]
    value_type: ValueType,
    address: Option<Address>,
    value: Option<RawNumber>,
    #[serde(default)]
    error: Option<String>,
}

impl TryFrom<RawFieldReading> for FieldReading {
    type Error = String;

    fn try_from(raw: RawFieldReading) -> Result<Self, Self::Error> {
        let value = match raw.value {
            Some(number) => {
                let number = i128::from(number);
                let value = FieldValue::from_i128(number, raw.value_type).ok_or_else(|| {
                    format!("{number} does not fit field {} of type {}", raw.name, raw.value_type)
                })?;
                Some(value)
            }
            None => None,
        };

        Ok(FieldReading {
            name: raw.name,
            offset: raw.offset,
            value_type: raw.value_type,
            address: raw.address,
            value,
            error: raw.error,
        })
    }
}

impl FieldReading {
    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }
}

/// All field readings taken in one polling cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub sequence: u64,
    pub captured_at: SystemTime,
    pub base: Address,
    pub fields: Vec<FieldReading>,
    pub complete: bool,
}

impl Snapshot {
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    /// Value of the named field, `None` if unknown or unavailable
    pub fn get(&self, name: &str) -> Option<FieldValue> {
        self.reading(name).and_then(|r| r.value)
    }

    pub fn reading(&self, name: &str) -> Option<&FieldReading> {
        self.fields.iter().find(|r| r.name == name)
    }

    pub fn is_valid(&self, name: &str) -> bool {
        self.reading(name).is_some_and(FieldReading::is_valid)
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn failed_fields(&self) -> impl Iterator<Item = &FieldReading> {
        self.fields.iter().filter(|r| !r.is_valid())
    }
}

/// Reads every field of `table` relative to `base`.
///
/// Always produces a snapshot; `complete` is false when any field failed.
pub fn extract<R>(reader: &R, base: Address, table: &FieldTable) -> Snapshot
where
    R: ReadMemory + ?Sized,
{
    let mut complete = true;

    let fields = table
        .fields
        .iter()
        .map(|field| {
            let address = base.apply(field.offset);
            let result = address
                .as_ref()
                .map_err(|e| e.to_string())
                .and_then(|&addr| {
                    reader
                        .read_value(addr, field.value_type)
                        .map_err(|e| e.to_string())
                });

            match result {
                Ok(value) => FieldReading {
                    name: field.name.clone(),
                    offset: field.offset,
                    value_type: field.value_type,
                    address: address.ok(),
                    value: Some(value),
                    error: None,
                },
                Err(error) => {
                    complete = false;
                    warn!(
                        field = %field.name,
                        offset = %field.offset,
                        address = ?address.as_ref().ok(),
                        %error,
                        "field read failed"
                    );
                    FieldReading {
                        name: field.name.clone(),
                        offset: field.offset,
                        value_type: field.value_type,
                        address: address.ok(),
                        value: None,
                        error: Some(error),
                    }
                }
            }
        })
        .collect();

    Snapshot {
        sequence: 0,
        captured_at: SystemTime::now(),
        base,
        fields,
        complete,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Severity;
    use crate::memory::MemoryImage;

    #[test]
    fn test_duplicate_names_rejected() {
        let err = FieldTable::new(vec![FieldSpec::i32("hp", 0x4), FieldSpec::i32("hp", 0x8)])
            .unwrap_err();
        assert!(matches!(err, ProbeError::InvalidFieldTable(_)));
        assert!(err.to_string().contains("hp"));
        assert_eq!(err.severity(), Severity::Configuration);
    }

    #[test]
    fn test_extract_mixed_types() {
        let mut image = MemoryImage::new();
        image.map_zeroed(Address::new(0x3000), 0x20);
        image.write_value(Address::new(0x3000), FieldValue::U8(200));
        image.write_value(Address::new(0x3008), FieldValue::I64(-5));

        let table = FieldTable::new(vec![
            FieldSpec::new("flag", 0x0, ValueType::U8),
            FieldSpec::new("big", 0x8, ValueType::I64),
        ])
        .unwrap();

        let snapshot = extract(&image, Address::new(0x3000), &table);
        assert!(snapshot.is_complete());
        assert_eq!(snapshot.get("flag"), Some(FieldValue::U8(200)));
        assert_eq!(snapshot.get("big"), Some(FieldValue::I64(-5)));
    }

    #[test]
    fn test_negative_one_is_a_real_value() {
        let mut image = MemoryImage::new();
        image.write_i32(Address::new(0x3010), -1);

        let table = FieldTable::new(vec![FieldSpec::i32("class", 0x10)]).unwrap();
        let snapshot = extract(&image, Address::new(0x3000), &table);

        assert!(snapshot.is_valid("class"));
        assert_eq!(snapshot.get("class"), Some(FieldValue::I32(-1)));
    }

    #[test]
    fn test_failed_field_keeps_error_and_address() {
        let image = MemoryImage::new();
        let table = FieldTable::new(vec![FieldSpec::i32("mana", 0x20)]).unwrap();
        let snapshot = extract(&image, Address::new(0x3000), &table);

        let reading = snapshot.reading("mana").unwrap();
        assert!(!reading.is_valid());
        assert_eq!(reading.address, Some(Address::new(0x3020)));
        assert!(reading.error.as_deref().unwrap().contains("0x3020"));
        assert!(!snapshot.is_complete());
        assert_eq!(snapshot.failed_fields().count(), 1);
    }

    #[test]
    fn test_snapshot_json_keeps_field_widths() {
        let mut image = MemoryImage::new();
        image.map_zeroed(Address::new(0x3000), 0x20);
        image.write_i32(Address::new(0x3004), 77);
        image.write_value(Address::new(0x3008), FieldValue::U64(u64::MAX));

        let table = FieldTable::new(vec![
            FieldSpec::i32("hp", 0x4),
            FieldSpec::new("gold", 0x8, ValueType::U64),
            FieldSpec::i32("missing", 0x40),
        ])
        .unwrap();
        let snapshot = extract(&image, Address::new(0x3000), &table);

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains(r#""type":"i32""#));
        let back: Snapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(back, snapshot);
        assert_eq!(back.get("hp"), Some(FieldValue::I32(77)));
        assert_eq!(back.get("gold"), Some(FieldValue::U64(u64::MAX)));
        assert!(!back.is_valid("missing"));
    }

    #[test]
    fn test_out_of_range_value_rejected() {
        let json = r#"{"name":"hp","offset":"0x4","type":"u8","address":null,"value":-1}"#;
        let err = serde_json::from_str::<FieldReading>(json).unwrap_err();
        assert!(err.to_string().contains("does not fit field hp"));
    }

    #[test]
    fn test_empty_table_is_complete() {
        let image = MemoryImage::new();
        let snapshot = extract(&image, Address::new(0x3000), &FieldTable::default());
        assert!(snapshot.is_complete());
        assert!(snapshot.fields.is_empty());
        assert!(image.read_log().is_empty());
    }
}
