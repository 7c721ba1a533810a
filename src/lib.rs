//! memory-probe: read-only pointer-chain telemetry for a running process
//!
//! Finds a target by its main window, resolves a module's load address,
//! walks a configured pointer chain from it and reads a table of fields on
//! a fixed cadence. The pure parts (chain resolution, field extraction, the
//! poll loop state machine) are portable and run against an in-memory
//! image; the live process access is Windows only.

pub mod config;
pub mod core;
pub mod memory;
pub mod probe;
pub mod process;

#[cfg(windows)]
pub mod windows;

pub use crate::core::types::{
    Address, ErrorCode, FieldValue, ModuleInfo, Offset, OsError, ProbeError, ProbeResult,
    ProcessId, Severity, ValueType,
};
pub use crate::core::{AUTHORS, VERSION};
pub use crate::memory::{
    extract, resolve_chain, FieldReading, FieldSpec, FieldTable, MemoryImage, PointerChain,
    PointerWidth, ReadMemory, Snapshot,
};
pub use crate::probe::{PollLoop, ProbeOutcome, ProbeSettings, ProbeState, SnapshotSink};
