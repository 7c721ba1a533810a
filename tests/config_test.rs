//! Integration tests for configuration loading

use memory_probe::config::{default_config, validate_config, ConfigError, ConfigLoader};
use memory_probe::probe::ProbeSettings;
use memory_probe::{Offset, PointerWidth, ValueType};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_default_config_round_trips_through_toml() {
    let temp_dir = TempDir::new().unwrap();
    let loader = ConfigLoader::new(temp_dir.path().join("probe.toml"));

    loader.save(&default_config()).unwrap();
    let text = fs::read_to_string(loader.path()).unwrap();
    assert!(text.contains("GameAssembly.dll"));
    assert!(text.contains("0x18C9098"));
    assert!(text.contains("[[fields]]"));

    assert_eq!(loader.load().unwrap(), default_config());
}

#[test]
fn test_custom_layout_to_settings() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("probe.toml");
    fs::write(
        &path,
        r#"
[target]
window_class = "GameWindow"
window_title = "Some Game"
module = "engine.dll"

[chain]
offsets = ["0x00ABCDEF", "0x18", "-0x8"]
pointer_width = 4

[polling]
poll_interval_ms = 250
stale_after = 2
restart_on_exit = true

[logging]
level = "debug"

[[fields]]
name = "health"
offset = "0x10"

[[fields]]
name = "flags"
offset = "0x14"
type = "u8"
"#,
    )
    .unwrap();

    let config = ConfigLoader::new(&path).load().unwrap();
    validate_config(&config).unwrap();
    let settings = ProbeSettings::from_config(&config).unwrap();

    assert_eq!(settings.identity.class_name, "GameWindow");
    assert_eq!(settings.module, "engine.dll");
    assert_eq!(
        settings.chain.offsets(),
        &[Offset::new(0xABCDEF), Offset::new(0x18), Offset::new(-8)]
    );
    assert_eq!(settings.chain.width(), PointerWidth::Four);
    assert_eq!(settings.timing.poll_interval.as_millis(), 250);
    assert_eq!(settings.timing.search_interval.as_millis(), 2000);
    assert_eq!(settings.stale_after, 2);
    assert!(settings.restart_on_exit);
    assert_eq!(settings.fields.fields()[1].value_type, ValueType::U8);
}

#[test]
fn test_duplicate_field_names_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("probe.toml");
    fs::write(
        &path,
        "[[fields]]\nname = \"hp\"\noffset = 4\n\n[[fields]]\nname = \"hp\"\noffset = 8\n",
    )
    .unwrap();

    let config = ConfigLoader::new(&path).load().unwrap();
    assert!(matches!(
        ProbeSettings::from_config(&config),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_unknown_value_type_is_a_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("probe.toml");
    fs::write(&path, "[[fields]]\nname = \"hp\"\noffset = 4\ntype = \"f32\"\n").unwrap();

    assert!(matches!(
        ConfigLoader::new(&path).load(),
        Err(ConfigError::TomlParse(_))
    ));
}
