//! Built-in reference layout and timing

use crate::core::types::ValueType;
use crate::memory::FieldSpec;

use super::loader::Config;

pub const DEFAULT_CONFIG_FILE: &str = "probe.toml";

pub const DEFAULT_WINDOW_CLASS: &str = "UnityWndClass";
pub const DEFAULT_WINDOW_TITLE: &str = "月圆之夜";
pub const DEFAULT_MODULE: &str = "GameAssembly.dll";

/// First offset is relative to the module base
pub const DEFAULT_CHAIN: [i64; 5] = [0x018C_9098, 0x40, 0xB8, 0x10, 0x20];
pub const DEFAULT_POINTER_WIDTH: u8 = 8;

pub const DEFAULT_SEARCH_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_ATTACH_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_PID_RETRY_MS: u64 = 1000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 1000;
pub const DEFAULT_STALE_AFTER: u32 = 5;

pub const DEFAULT_LOG_LEVEL: &str = "info";

const REFERENCE_FIELDS: [(&str, i64); 9] = [
    ("maxHP", 0x18),
    ("currentHP", 0x1C),
    ("class", 0x10),
    ("mana", 0x20),
    ("experience", 0x24),
    ("money", 0x2C),
    ("cardDraws", 0x30),
    ("level", 0x34),
    ("actionPoints", 0x38),
];

/// The reference field table, all signed 32-bit
pub fn reference_fields() -> Vec<FieldSpec> {
    REFERENCE_FIELDS
        .iter()
        .map(|&(name, offset)| FieldSpec::new(name, offset, ValueType::I32))
        .collect()
}

pub fn default_config() -> Config {
    Config::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_fields() {
        let fields = reference_fields();
        assert_eq!(fields.len(), 9);
        assert_eq!(fields[0].name, "maxHP");
        assert_eq!(fields[0].offset.value(), 0x18);
        assert!(fields.iter().all(|f| f.value_type == ValueType::I32));
    }

    #[test]
    fn test_default_config_uses_reference_layout() {
        let config = default_config();
        assert_eq!(config.target.window_class, DEFAULT_WINDOW_CLASS);
        assert_eq!(config.target.module, DEFAULT_MODULE);
        assert_eq!(config.chain.offsets.len(), DEFAULT_CHAIN.len());
        assert_eq!(config.polling.stale_after, DEFAULT_STALE_AFTER);
        assert!(!config.polling.restart_on_exit);
    }
}
