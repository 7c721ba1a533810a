//! Last-error capture with system messages

use crate::core::types::OsError;
use winapi::um::errhandlingapi::GetLastError;
use ::windows::core::HRESULT;

/// Captures `GetLastError` together with its system message.
///
/// Must be called immediately after the failing API call.
pub fn last_os_error() -> OsError {
    let code = unsafe { GetLastError() };
    OsError::new(code, system_message(code))
}

/// Looks up the system description of a Win32 error code
pub fn system_message(code: u32) -> String {
    let message = HRESULT::from_win32(code).message().to_string_lossy();
    let message = message.trim();
    if message.is_empty() {
        OsError::from_code(code).message
    } else {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_system_message_for_access_denied() {
        let message = system_message(5);
        assert!(!message.is_empty());
        assert!(!message.ends_with('\n'));
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_unknown_code_still_has_text() {
        assert!(!system_message(0xDEAD_BEEF).is_empty());
    }
}
