//! Windows API layer
//!
//! Safe wrappers around the handful of Win32 calls the probe needs:
//! window lookup, process handles, module snapshots and remote reads.
//! All unsafe FFI is contained here.

pub mod bindings;
pub mod types;
pub mod utils;

pub use types::Handle;
pub use utils::{last_os_error, string_to_wide, wide_to_string};
