//! The polling state machine and its observers

pub mod poll_loop;
pub mod settings;
pub mod shutdown;
pub mod sink;
pub mod state;

pub use poll_loop::{PollLoop, ProbeOutcome};
pub use settings::{ProbeSettings, Timing};
pub use shutdown::{shutdown_channel, ShutdownSignal, ShutdownTrigger};
pub use sink::{ConsoleSink, OutputFormat, RecordingSink, SnapshotSink, StaleSignal};
pub use state::ProbeState;
