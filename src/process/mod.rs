//! Target process discovery and module resolution
//!
//! [`Platform`] is the seam between the poll loop and the operating
//! system. [`WindowsPlatform`] talks to the live target; the
//! [`SimulatedPlatform`] replays a scripted target for tests.

pub mod locator;
pub mod modules;
pub mod platform;
pub mod simulated;

#[cfg(windows)]
pub mod handle;

pub use locator::WindowIdentity;
pub use modules::find_module;
pub use platform::{Platform, TargetProcess};
pub use simulated::{LocateOutcome, SimulatedCounters, SimulatedPlatform, SimulatedProcess};

#[cfg(windows)]
pub use handle::{ProcessAccess, ProcessHandle};
#[cfg(windows)]
pub use platform::WindowsPlatform;
