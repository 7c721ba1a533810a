//! Scripted stand-in for a live target
//!
//! Each call to `locate` consumes the next [`LocateOutcome`]; once the
//! script runs out the target is always found. Module resolution works the
//! same way over a script of optional base addresses. Every located
//! process reads from one shared [`MemoryImage`] and reports itself alive
//! for a fixed number of liveness checks. Faults are keyed on the number of
//! liveness checks a process has seen, which is one per poll cycle.

use crate::core::types::{Address, OsError, ProbeError, ProbeResult, ProcessId};
use crate::memory::{MemoryImage, ReadMemory};
use crate::process::locator::WindowIdentity;
use crate::process::platform::{Platform, TargetProcess};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// What a single `locate` call does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateOutcome {
    NotFound,
    PidUnresolved,
    AccessDenied,
    Found,
}

/// Call and handle counts, shared with every process the platform hands out
#[derive(Debug, Default)]
pub struct SimulatedCounters {
    locate_calls: AtomicUsize,
    resolve_calls: AtomicUsize,
    liveness_checks: AtomicUsize,
    handles_opened: AtomicUsize,
    handles_released: AtomicUsize,
}

impl SimulatedCounters {
    pub fn locate_calls(&self) -> usize {
        self.locate_calls.load(Ordering::SeqCst)
    }

    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    pub fn liveness_checks(&self) -> usize {
        self.liveness_checks.load(Ordering::SeqCst)
    }

    pub fn handles_opened(&self) -> usize {
        self.handles_opened.load(Ordering::SeqCst)
    }

    pub fn handles_released(&self) -> usize {
        self.handles_released.load(Ordering::SeqCst)
    }

    /// Handles opened but not yet released
    pub fn handles_open(&self) -> usize {
        self.handles_opened() - self.handles_released()
    }
}

#[derive(Debug)]
pub struct SimulatedPlatform {
    pid: ProcessId,
    locate_script: VecDeque<LocateOutcome>,
    module_script: VecDeque<Option<Address>>,
    module_base: Option<Address>,
    lifetime: usize,
    access_lost_after: Option<usize>,
    read_faults: Arc<HashSet<usize>>,
    image: Arc<MemoryImage>,
    counters: Arc<SimulatedCounters>,
}

impl SimulatedPlatform {
    /// A target that is found at once, has `module_base` loaded and never
    /// exits.
    pub fn new(image: MemoryImage, module_base: Address) -> Self {
        SimulatedPlatform {
            pid: 4242,
            locate_script: VecDeque::new(),
            module_script: VecDeque::new(),
            module_base: Some(module_base),
            lifetime: usize::MAX,
            access_lost_after: None,
            read_faults: Arc::new(HashSet::new()),
            image: Arc::new(image),
            counters: Arc::new(SimulatedCounters::default()),
        }
    }

    pub fn with_pid(mut self, pid: ProcessId) -> Self {
        self.pid = pid;
        self
    }

    /// Outcomes for the first `locate` calls
    pub fn with_locate_script(mut self, script: impl IntoIterator<Item = LocateOutcome>) -> Self {
        self.locate_script = script.into_iter().collect();
        self
    }

    /// Results for the first module resolutions
    pub fn with_module_script(mut self, script: impl IntoIterator<Item = Option<Address>>) -> Self {
        self.module_script = script.into_iter().collect();
        self
    }

    /// Each located process passes `checks` liveness checks, then exits
    pub fn alive_for(mut self, checks: usize) -> Self {
        self.lifetime = checks;
        self
    }

    /// After `checks` liveness checks the handle stops working: every
    /// further check fails with `InvalidHandle`
    pub fn access_lost_after(mut self, checks: usize) -> Self {
        self.access_lost_after = Some(checks);
        self
    }

    /// Every read fails while a process is on one of these liveness checks
    /// (1-based), so the matching poll cycles see a broken chain
    pub fn with_read_faults(mut self, checks: impl IntoIterator<Item = usize>) -> Self {
        self.read_faults = Arc::new(checks.into_iter().collect());
        self
    }

    pub fn counters(&self) -> Arc<SimulatedCounters> {
        Arc::clone(&self.counters)
    }

    pub fn image(&self) -> &MemoryImage {
        &self.image
    }
}

impl Platform for SimulatedPlatform {
    type Process = SimulatedProcess;

    fn locate(&mut self, identity: &WindowIdentity) -> ProbeResult<SimulatedProcess> {
        self.counters.locate_calls.fetch_add(1, Ordering::SeqCst);

        match self.locate_script.pop_front().unwrap_or(LocateOutcome::Found) {
            LocateOutcome::NotFound => Err(ProbeError::WindowNotFound {
                class: identity.class_name.clone(),
                title: identity.title.clone(),
            }),
            LocateOutcome::PidUnresolved => Err(ProbeError::ProcessIdUnresolved {
                title: identity.title.clone(),
            }),
            LocateOutcome::AccessDenied => Err(ProbeError::OpenProcessFailed {
                pid: self.pid,
                os: OsError::from_code(5),
            }),
            LocateOutcome::Found => {
                self.counters.handles_opened.fetch_add(1, Ordering::SeqCst);
                Ok(SimulatedProcess {
                    pid: self.pid,
                    remaining_alive: AtomicUsize::new(self.lifetime),
                    checks: AtomicUsize::new(0),
                    access_lost_after: self.access_lost_after,
                    read_faults: Arc::clone(&self.read_faults),
                    image: Arc::clone(&self.image),
                    counters: Arc::clone(&self.counters),
                })
            }
        }
    }

    fn resolve_module_base(
        &mut self,
        _pid: ProcessId,
        _module: &str,
    ) -> ProbeResult<Option<Address>> {
        self.counters.resolve_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.module_script.pop_front().unwrap_or(self.module_base))
    }
}

/// A located simulated target; counts as released when dropped
#[derive(Debug)]
pub struct SimulatedProcess {
    pid: ProcessId,
    remaining_alive: AtomicUsize,
    checks: AtomicUsize,
    access_lost_after: Option<usize>,
    read_faults: Arc<HashSet<usize>>,
    image: Arc<MemoryImage>,
    counters: Arc<SimulatedCounters>,
}

impl ReadMemory for SimulatedProcess {
    fn read_memory(&self, address: Address, buffer: &mut [u8]) -> ProbeResult<usize> {
        if self.read_faults.contains(&self.checks.load(Ordering::SeqCst)) {
            return Err(ProbeError::read_failed(address, buffer.len(), "simulated fault"));
        }
        self.image.read_memory(address, buffer)
    }
}

impl TargetProcess for SimulatedProcess {
    fn pid(&self) -> ProcessId {
        self.pid
    }

    fn is_alive(&self) -> ProbeResult<bool> {
        self.counters.liveness_checks.fetch_add(1, Ordering::SeqCst);
        let check = self.checks.fetch_add(1, Ordering::SeqCst) + 1;
        if self.access_lost_after.is_some_and(|limit| check > limit) {
            return Err(ProbeError::InvalidHandle(format!(
                "simulated access loss for process {}",
                self.pid
            )));
        }

        let previous = self
            .remaining_alive
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        Ok(previous.is_ok())
    }
}

impl Drop for SimulatedProcess {
    fn drop(&mut self) {
        self.counters.handles_released.fetch_add(1, Ordering::SeqCst);
    }
}
