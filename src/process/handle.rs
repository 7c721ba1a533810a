//! Read-only process handle with RAII semantics

use crate::core::types::{Address, ProbeError, ProbeResult, ProcessId};
use crate::memory::ReadMemory;
use crate::process::platform::TargetProcess;
use crate::windows::bindings::kernel32::{self, STILL_ACTIVE};
use crate::windows::types::Handle;
use std::fmt;

/// Access rights for process handles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessAccess {
    value: u32,
}

impl ProcessAccess {
    /// Query information access
    pub const QUERY_INFORMATION: Self = Self { value: 0x0400 };
    /// Read memory access
    pub const VM_READ: Self = Self { value: 0x0010 };
    /// Address-space operations
    pub const VM_OPERATION: Self = Self { value: 0x0008 };
    /// Everything the probe needs and nothing more
    pub const INSPECT: Self = Self {
        value: 0x0010 | 0x0400 | 0x0008,
    };

    pub fn combine(rights: &[Self]) -> Self {
        let value = rights.iter().fold(0, |acc, right| acc | right.value);
        Self { value }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn contains(&self, other: Self) -> bool {
        self.value & other.value == other.value
    }
}

/// An open handle to the target process.
///
/// Closed exactly once, when the value is dropped.
pub struct ProcessHandle {
    handle: Handle,
    pid: ProcessId,
    access: ProcessAccess,
}

impl ProcessHandle {
    pub fn open(pid: ProcessId, access: ProcessAccess) -> ProbeResult<Self> {
        let raw_handle = kernel32::open_process(pid, access.value())?;
        Ok(ProcessHandle {
            handle: Handle::new(raw_handle),
            pid,
            access,
        })
    }

    /// Opens with read and query rights only
    pub fn open_for_inspection(pid: ProcessId) -> ProbeResult<Self> {
        Self::open(pid, ProcessAccess::INSPECT)
    }

    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    pub fn access(&self) -> ProcessAccess {
        self.access
    }

    pub fn is_valid(&self) -> bool {
        !self.handle.is_null()
    }

    pub fn read_memory(&self, address: Address, buffer: &mut [u8]) -> ProbeResult<usize> {
        if !self.is_valid() {
            return Err(ProbeError::InvalidHandle(
                "Process handle is null".to_string(),
            ));
        }
        unsafe { kernel32::read_process_memory(self.handle.raw(), address, buffer) }
    }

    /// Whether the process is still running, independent of memory reads
    pub fn is_alive(&self) -> ProbeResult<bool> {
        if !self.is_valid() {
            return Err(ProbeError::InvalidHandle(
                "Process handle is null".to_string(),
            ));
        }
        let code = unsafe { kernel32::get_exit_code_process(self.handle.raw())? };
        Ok(code == STILL_ACTIVE)
    }
}

impl ReadMemory for ProcessHandle {
    fn read_memory(&self, address: Address, buffer: &mut [u8]) -> ProbeResult<usize> {
        ProcessHandle::read_memory(self, address, buffer)
    }
}

impl TargetProcess for ProcessHandle {
    fn pid(&self) -> ProcessId {
        self.pid
    }

    fn is_alive(&self) -> ProbeResult<bool> {
        ProcessHandle::is_alive(self)
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid)
            .field("access", &format_args!("0x{:X}", self.access.value))
            .field("valid", &self.is_valid())
            .finish()
    }
}

impl fmt::Display for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "process {}", self.pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{FieldValue, ValueType};
    use winapi::um::processthreadsapi::GetCurrentProcessId;

    #[test]
    fn test_inspect_rights_are_minimal() {
        let combined = ProcessAccess::combine(&[
            ProcessAccess::VM_READ,
            ProcessAccess::QUERY_INFORMATION,
            ProcessAccess::VM_OPERATION,
        ]);
        assert_eq!(combined, ProcessAccess::INSPECT);
        assert_eq!(ProcessAccess::INSPECT.value(), 0x0418);
        assert!(ProcessAccess::INSPECT.contains(ProcessAccess::VM_READ));
        assert!(!ProcessAccess::INSPECT.contains(ProcessAccess { value: 0x0020 }));
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_inspect_current_process() {
        let pid = unsafe { GetCurrentProcessId() };
        let handle = ProcessHandle::open_for_inspection(pid).unwrap();
        assert_eq!(handle.pid(), pid);
        assert!(handle.is_alive().unwrap());

        let value: i32 = -1;
        let address = Address::new(&value as *const i32 as usize);
        assert_eq!(
            handle.read_value(address, ValueType::I32).unwrap(),
            FieldValue::I32(-1)
        );
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_open_missing_process() {
        assert!(ProcessHandle::open_for_inspection(0).is_err());
    }
}
