//! User32.dll bindings for top-level window lookup

use crate::core::types::ProcessId;
use crate::windows::utils::string_to_wide;
use winapi::shared::windef::HWND;
use winapi::um::winuser::{FindWindowW, GetWindowThreadProcessId};

/// Finds a top-level window by exact class name and title
pub fn find_window(class_name: &str, title: &str) -> Option<HWND> {
    let class = string_to_wide(class_name);
    let title = string_to_wide(title);
    let hwnd = unsafe { FindWindowW(class.as_ptr(), title.as_ptr()) };
    if hwnd.is_null() {
        None
    } else {
        Some(hwnd)
    }
}

/// Owning process of `hwnd`; `None` when the window reports pid 0
pub fn window_process_id(hwnd: HWND) -> Option<ProcessId> {
    let mut pid: ProcessId = 0;
    unsafe {
        GetWindowThreadProcessId(hwnd, &mut pid);
    }
    if pid == 0 {
        None
    } else {
        Some(pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_missing_window() {
        assert!(find_window("NoSuchWindowClass_7f3a", "no such window").is_none());
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_null_window_has_no_process() {
        assert_eq!(window_process_id(std::ptr::null_mut()), None);
    }
}
