//! Windows utility functions

pub mod error_codes;
pub mod string_conv;

pub use error_codes::{last_os_error, system_message};
pub use string_conv::{string_to_wide, wide_to_string};
