//! Low-level FFI bindings to Windows system libraries

pub mod kernel32;
pub mod toolhelp32;
pub mod user32;
