//! Integration tests for module base resolution

use memory_probe::process::find_module;
use memory_probe::{Address, ModuleInfo};

fn loaded() -> Vec<ModuleInfo> {
    vec![
        ModuleInfo::new("Game.exe", Address::new(0x1_4000_0000), 0x10_0000),
        ModuleInfo::new("GameAssembly.dll", Address::new(0x7FF9_1000_0000), 0x300_0000),
        ModuleInfo::new("KERNEL32.DLL", Address::new(0x7FFC_0000_0000), 0xC_0000),
    ]
}

#[test]
fn test_case_insensitive_match() {
    let modules = loaded();
    for name in ["GameAssembly.dll", "GameAssembly.DLL", "gameassembly.dll"] {
        let module = find_module(&modules, name).unwrap();
        assert_eq!(module.base_address, Address::new(0x7FF9_1000_0000));
    }
    assert!(find_module(&modules, "kernel32.dll").is_some());
}

#[test]
fn test_absent_module_is_none() {
    assert!(find_module(&loaded(), "UnityPlayer.dll").is_none());
    assert!(find_module(&[], "GameAssembly.dll").is_none());
}

#[cfg(windows)]
mod live {
    use memory_probe::process::modules::{enumerate_modules, resolve_module_base};
    use std::process;

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_resolve_system_dll_in_current_process() {
        let base = resolve_module_base(process::id(), "KERNEL32.dll")
            .expect("module snapshot failed");
        let base = base.expect("kernel32.dll not loaded");
        assert!(!base.is_null());

        let modules = enumerate_modules(process::id()).unwrap();
        let kernel32 = modules.iter().find(|m| m.name_matches("kernel32.dll")).unwrap();
        assert_eq!(kernel32.base_address, base);
        assert!(kernel32.size > 0);
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_unloaded_module_is_none() {
        let base = resolve_module_base(process::id(), "GameAssembly.dll").unwrap();
        assert!(base.is_none());
    }
}
