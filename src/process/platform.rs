//! Operating system seam for the poll loop

use crate::core::types::{Address, ProbeError, ProbeResult, ProcessId};
use crate::memory::ReadMemory;
use crate::process::locator::WindowIdentity;

/// An attached target whose memory can be read
pub trait TargetProcess: ReadMemory {
    fn pid(&self) -> ProcessId;

    /// Liveness check that does not depend on memory reads
    fn is_alive(&self) -> ProbeResult<bool>;

    /// Fails with `ProcessExited` once the target has terminated
    fn ensure_alive(&self) -> ProbeResult<()> {
        if self.is_alive()? {
            Ok(())
        } else {
            Err(ProbeError::ProcessExited(self.pid()))
        }
    }
}

/// Process discovery and module resolution.
///
/// Dropping a located process must release whatever it holds.
pub trait Platform {
    type Process: TargetProcess;

    /// Finds the target by window identity and opens it
    fn locate(&mut self, identity: &WindowIdentity) -> ProbeResult<Self::Process>;

    /// Load address of `module` in `pid`, `None` while not loaded
    fn resolve_module_base(&mut self, pid: ProcessId, module: &str)
        -> ProbeResult<Option<Address>>;
}

/// The live Windows implementation
#[cfg(windows)]
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsPlatform;

#[cfg(windows)]
impl Platform for WindowsPlatform {
    type Process = crate::process::handle::ProcessHandle;

    fn locate(&mut self, identity: &WindowIdentity) -> ProbeResult<Self::Process> {
        crate::process::locator::locate_process(identity)
    }

    fn resolve_module_base(
        &mut self,
        pid: ProcessId,
        module: &str,
    ) -> ProbeResult<Option<Address>> {
        crate::process::modules::resolve_module_base(pid, module)
    }
}
