//! Kernel32.dll bindings for process handles and remote reads

use crate::core::types::{Address, ProbeError, ProbeResult, ProcessId};
use crate::windows::utils::last_os_error;
use winapi::shared::minwindef::{DWORD, FALSE, LPCVOID, LPVOID};
use winapi::um::handleapi::{CloseHandle, INVALID_HANDLE_VALUE};
use winapi::um::memoryapi::ReadProcessMemory;
use winapi::um::processthreadsapi::{GetExitCodeProcess, OpenProcess};
use winapi::um::winnt::HANDLE;

/// Exit code reported for a process that has not terminated
pub const STILL_ACTIVE: DWORD = 0x103;

/// Opens `pid` with `desired_access`.
///
/// The OS error is captured on failure; access denied usually means the
/// probe lacks the privileges the target runs with.
pub fn open_process(pid: ProcessId, desired_access: DWORD) -> ProbeResult<HANDLE> {
    let handle = unsafe { OpenProcess(desired_access, FALSE, pid) };
    if handle.is_null() {
        Err(ProbeError::OpenProcessFailed {
            pid,
            os: last_os_error(),
        })
    } else {
        Ok(handle)
    }
}

/// Closes a handle; null and `INVALID_HANDLE_VALUE` are ignored.
///
/// # Safety
/// The handle must be owned by the caller and not closed elsewhere
pub unsafe fn close_handle(handle: HANDLE) -> ProbeResult<()> {
    if handle.is_null() || handle == INVALID_HANDLE_VALUE {
        return Ok(());
    }

    if CloseHandle(handle) == FALSE {
        Err(ProbeError::WindowsApi(format!(
            "CloseHandle failed: {}",
            last_os_error()
        )))
    } else {
        Ok(())
    }
}

/// Reads remote memory into `buffer` and returns the bytes copied.
///
/// Any failure, a partial copy included, is an error carrying the OS code.
/// Bytes copied before a partial copy failed are left in `buffer`.
///
/// # Safety
/// The handle must be a valid process handle with `PROCESS_VM_READ`
pub unsafe fn read_process_memory(
    handle: HANDLE,
    address: Address,
    buffer: &mut [u8],
) -> ProbeResult<usize> {
    let mut bytes_read = 0;

    let result = ReadProcessMemory(
        handle,
        address.as_usize() as LPCVOID,
        buffer.as_mut_ptr() as LPVOID,
        buffer.len(),
        &mut bytes_read,
    );

    if result != FALSE {
        return Ok(bytes_read);
    }

    Err(ProbeError::RemoteReadFailed {
        address,
        size: buffer.len(),
        os: last_os_error(),
    })
}

/// Returns the process exit code, `STILL_ACTIVE` while it runs.
///
/// # Safety
/// The handle must carry `PROCESS_QUERY_INFORMATION`
pub unsafe fn get_exit_code_process(handle: HANDLE) -> ProbeResult<DWORD> {
    let mut code: DWORD = 0;
    if GetExitCodeProcess(handle, &mut code) == FALSE {
        return Err(ProbeError::InvalidHandle(format!(
            "GetExitCodeProcess failed: {}",
            last_os_error()
        )));
    }
    Ok(code)
}
