//! Owned HANDLE with close-on-drop

use crate::windows::bindings::kernel32;
use std::ptr;
use winapi::um::handleapi::INVALID_HANDLE_VALUE;
use winapi::um::winnt::HANDLE;

/// Owned Windows handle, closed exactly once when dropped
pub struct Handle {
    handle: HANDLE,
}

impl Handle {
    pub fn new(handle: HANDLE) -> Self {
        Handle { handle }
    }

    /// True for both null and `INVALID_HANDLE_VALUE`
    pub fn is_null(&self) -> bool {
        self.handle.is_null() || self.handle == INVALID_HANDLE_VALUE
    }

    pub fn raw(&self) -> HANDLE {
        self.handle
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if !self.is_null() {
            unsafe {
                let _ = kernel32::close_handle(self.handle);
            }
            self.handle = ptr::null_mut();
        }
    }
}

// HANDLE values are process-wide and usable from any thread
unsafe impl Send for Handle {}
unsafe impl Sync for Handle {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_and_invalid_are_empty() {
        let null = Handle::new(ptr::null_mut());
        assert!(null.is_null());
        assert!(null.raw().is_null());

        let invalid = Handle::new(INVALID_HANDLE_VALUE);
        assert!(invalid.is_null());
        drop(invalid);
    }
}
