//! Finding the target process by its main window

use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(windows)]
use crate::core::types::{ProbeError, ProbeResult, ProcessId};
#[cfg(windows)]
use crate::process::handle::ProcessHandle;
#[cfg(windows)]
use crate::windows::bindings::user32;
#[cfg(windows)]
use tracing::debug;

/// Exact window class and title of the target's top-level window
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowIdentity {
    pub class_name: String,
    pub title: String,
}

impl WindowIdentity {
    pub fn new(class_name: impl Into<String>, title: impl Into<String>) -> Self {
        WindowIdentity {
            class_name: class_name.into(),
            title: title.into(),
        }
    }
}

impl fmt::Display for WindowIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self.title, self.class_name)
    }
}

/// Resolves the window to its owning process id
#[cfg(windows)]
pub fn find_window_pid(identity: &WindowIdentity) -> ProbeResult<ProcessId> {
    let hwnd = user32::find_window(&identity.class_name, &identity.title).ok_or_else(|| {
        ProbeError::WindowNotFound {
            class: identity.class_name.clone(),
            title: identity.title.clone(),
        }
    })?;

    user32::window_process_id(hwnd).ok_or_else(|| ProbeError::ProcessIdUnresolved {
        title: identity.title.clone(),
    })
}

/// Finds the window and opens its process for inspection.
#[cfg(windows)]
pub fn locate_process(identity: &WindowIdentity) -> ProbeResult<ProcessHandle> {
    let pid = find_window_pid(identity)?;
    debug!(pid, window = %identity, "window found");
    ProcessHandle::open_for_inspection(pid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let identity = WindowIdentity::new("UnityWndClass", "月圆之夜");
        assert_eq!(identity.to_string(), "\"月圆之夜\" (UnityWndClass)");
    }

    #[cfg(windows)]
    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_locate_missing_window() {
        let identity = WindowIdentity::new("NoSuchWindowClass_7f3a", "no such window");
        match locate_process(&identity) {
            Err(ProbeError::WindowNotFound { class, .. }) => {
                assert_eq!(class, "NoSuchWindowClass_7f3a")
            }
            other => panic!("Expected WindowNotFound, got {other:?}"),
        }
    }
}
