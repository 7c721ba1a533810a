//! Toolhelp32 module snapshots

use crate::core::types::{Address, ErrorCode, ModuleInfo, ProbeError, ProbeResult, ProcessId};
use crate::windows::types::Handle;
use crate::windows::utils::{last_os_error, wide_to_string};
use std::mem;
use std::path::PathBuf;
use winapi::shared::minwindef::{DWORD, FALSE};
use winapi::um::tlhelp32::{
    CreateToolhelp32Snapshot, Module32FirstW, Module32NextW, MODULEENTRY32W, TH32CS_SNAPMODULE,
    TH32CS_SNAPMODULE32,
};

/// Lists every module loaded in `pid`, 32-bit modules included.
///
/// Failing to create the snapshot is an error; a snapshot with no
/// entries is an empty list.
pub fn snapshot_modules(pid: ProcessId) -> ProbeResult<Vec<ModuleInfo>> {
    let snapshot =
        Handle::new(unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPMODULE | TH32CS_SNAPMODULE32, pid) });
    if snapshot.is_null() {
        return Err(ProbeError::ModuleSnapshotFailed {
            pid,
            os: last_os_error(),
        });
    }

    let mut entry: MODULEENTRY32W = unsafe { mem::zeroed() };
    entry.dwSize = mem::size_of::<MODULEENTRY32W>() as DWORD;

    let mut modules = Vec::new();
    let mut ok = unsafe { Module32FirstW(snapshot.raw(), &mut entry) };
    if ok == FALSE {
        let os = last_os_error();
        if os.kind() == ErrorCode::NoMoreFiles {
            return Ok(modules);
        }
        return Err(ProbeError::ModuleSnapshotFailed { pid, os });
    }

    while ok != FALSE {
        let mut module = ModuleInfo::new(
            wide_to_string(&entry.szModule),
            Address::new(entry.modBaseAddr as usize),
            entry.modBaseSize as usize,
        );
        let path = wide_to_string(&entry.szExePath);
        if !path.is_empty() {
            module.path = Some(PathBuf::from(path));
        }
        modules.push(module);

        ok = unsafe { Module32NextW(snapshot.raw(), &mut entry) };
    }

    Ok(modules)
}
