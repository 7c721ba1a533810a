//! Core module containing fundamental types for memory-probe
//!
//! This module provides the foundational building blocks used throughout
//! the probe: address and offset arithmetic, field values, module
//! descriptions, OS error details and the crate error type.

pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    Address, ErrorCode, FieldValue, ModuleInfo, Offset, OsError, ProbeError, ProbeResult,
    ProcessId, Severity, ValueType,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
