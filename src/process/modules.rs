//! Module base resolution

use crate::core::types::ModuleInfo;

#[cfg(windows)]
use crate::core::types::{Address, ProbeResult, ProcessId};
#[cfg(windows)]
use crate::windows::bindings::toolhelp32;
#[cfg(windows)]
use tracing::debug;

/// First module whose file name equals `name`, ignoring case
pub fn find_module<'a>(modules: &'a [ModuleInfo], name: &str) -> Option<&'a ModuleInfo> {
    modules.iter().find(|module| module.name_matches(name))
}

/// All modules loaded in `pid`
#[cfg(windows)]
pub fn enumerate_modules(pid: ProcessId) -> ProbeResult<Vec<ModuleInfo>> {
    toolhelp32::snapshot_modules(pid)
}

/// Load address of `name` in `pid`.
///
/// `Ok(None)` means the module is not loaded yet, which is normal while the
/// target starts up.
#[cfg(windows)]
pub fn resolve_module_base(pid: ProcessId, name: &str) -> ProbeResult<Option<Address>> {
    let modules = enumerate_modules(pid)?;
    debug!(pid, count = modules.len(), "enumerated modules");
    Ok(find_module(&modules, name).map(|module| module.base_address))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Address;

    fn modules() -> Vec<ModuleInfo> {
        vec![
            ModuleInfo::new("Game.exe", Address::new(0x1_4000_0000), 0x10_0000),
            ModuleInfo::new("UnityPlayer.dll", Address::new(0x7FF8_0000_0000), 0x200_0000),
            ModuleInfo::new("GameAssembly.dll", Address::new(0x7FF9_1000_0000), 0x300_0000),
        ]
    }

    #[test]
    fn test_find_module_ignores_case() {
        let modules = modules();
        let found = find_module(&modules, "GameAssembly.DLL").unwrap();
        assert_eq!(found.base_address, Address::new(0x7FF9_1000_0000));
    }

    #[test]
    fn test_find_module_is_not_substring() {
        assert!(find_module(&modules(), "Assembly.dll").is_none());
        assert!(find_module(&modules(), "GameAssembly").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let mut modules = modules();
        modules.push(ModuleInfo::new("gameassembly.dll", Address::new(0x5000), 0x10));
        let found = find_module(&modules, "GameAssembly.dll").unwrap();
        assert_eq!(found.base_address, Address::new(0x7FF9_1000_0000));
    }

    #[test]
    fn test_absent_module() {
        assert!(find_module(&[], "GameAssembly.dll").is_none());
    }
}
