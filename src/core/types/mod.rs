//! Core type definitions for memory-probe
//!
//! This module contains all fundamental types used throughout the probe,
//! including address wrappers, signed offsets, field values, module info
//! and error types.

mod address;
mod error;
mod module_info;
mod offset;
mod os_error;
mod value;

// Re-export all public types
pub use address::Address;
pub use error::{ProbeError, ProbeResult, Severity};
pub use module_info::ModuleInfo;
pub use offset::Offset;
pub use os_error::{ErrorCode, OsError};
pub use value::{FieldValue, ValueType};

// Common type aliases
pub type ProcessId = u32;
