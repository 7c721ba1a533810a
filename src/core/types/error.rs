//! Custom error types for memory-probe

use super::address::Address;
use super::offset::Offset;
use super::os_error::OsError;
use super::ProcessId;
use thiserror::Error;

/// Main error type for probe operations
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Window not found: class {class:?}, title {title:?}")]
    WindowNotFound { class: String, title: String },

    #[error("Window {title:?} has no owning process id")]
    ProcessIdUnresolved { title: String },

    #[error("Failed to open process {pid}: {os}")]
    OpenProcessFailed { pid: ProcessId, os: OsError },

    #[error("Failed to snapshot modules of process {pid}: {os}")]
    ModuleSnapshotFailed { pid: ProcessId, os: OsError },

    #[error("Failed to read {size} bytes at {address}: {reason}")]
    ReadFailed {
        address: Address,
        size: usize,
        reason: String,
    },

    #[error("Failed to read {size} bytes at {address}: {os}")]
    RemoteReadFailed {
        address: Address,
        size: usize,
        os: OsError,
    },

    #[error("Short read at {address}: expected {expected} bytes, got {actual}")]
    ShortRead {
        address: Address,
        expected: usize,
        actual: usize,
    },

    #[error("Pointer chain broken at step {step} (address {address}): {source}")]
    PointerChainBroken {
        step: usize,
        address: Address,
        #[source]
        source: Box<ProbeError>,
    },

    #[error("Address overflow: {base} {offset}")]
    AddressOverflow { base: Address, offset: Offset },

    #[error("Invalid pointer chain: {0}")]
    InvalidChain(String),

    #[error("Invalid field table: {0}")]
    InvalidFieldTable(String),

    #[error("Invalid memory address: {0}")]
    InvalidAddress(String),

    #[error("Process {0} has exited")]
    ProcessExited(ProcessId),

    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    #[error("Windows API: {0}")]
    WindowsApi(String),
}

/// Result type alias for probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// How the poll loop treats an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Logged and retried at the next cadence point
    Transient,
    /// Ends the current attachment session
    SessionFatal,
    /// Cannot be fixed by retrying; the configuration is wrong
    Configuration,
}

impl ProbeError {
    /// Creates a read failed error
    pub fn read_failed(address: Address, size: usize, reason: impl Into<String>) -> Self {
        ProbeError::ReadFailed {
            address,
            size,
            reason: reason.into(),
        }
    }

    /// Creates a short read error
    pub fn short_read(address: Address, expected: usize, actual: usize) -> Self {
        ProbeError::ShortRead {
            address,
            expected,
            actual,
        }
    }

    /// Wraps a failed dereference as a broken chain at `step`
    pub fn pointer_chain_broken(step: usize, address: Address, source: ProbeError) -> Self {
        ProbeError::PointerChainBroken {
            step,
            address,
            source: Box::new(source),
        }
    }

    /// The chain step that failed, if this is a chain error
    pub fn chain_step(&self) -> Option<usize> {
        match self {
            ProbeError::PointerChainBroken { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// The OS error behind this failure, when one was captured
    pub fn os_error(&self) -> Option<&OsError> {
        match self {
            ProbeError::OpenProcessFailed { os, .. }
            | ProbeError::ModuleSnapshotFailed { os, .. }
            | ProbeError::RemoteReadFailed { os, .. } => Some(os),
            ProbeError::PointerChainBroken { source, .. } => source.os_error(),
            _ => None,
        }
    }

    /// Decides whether the poll loop retries, ends the session, or cannot
    /// recover at all
    pub fn severity(&self) -> Severity {
        match self {
            ProbeError::ProcessExited(_) | ProbeError::InvalidHandle(_) => Severity::SessionFatal,
            ProbeError::InvalidChain(_)
            | ProbeError::InvalidFieldTable(_)
            | ProbeError::InvalidAddress(_) => Severity::Configuration,
            _ => Severity::Transient,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.severity() == Severity::Transient
    }
}
