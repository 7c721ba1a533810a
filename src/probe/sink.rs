//! Consumers of poll loop output

use crate::core::types::ProbeError;
use crate::memory::Snapshot;
use crate::probe::state::ProbeState;
use serde::Serialize;
use std::io::Write;
use tracing::error;

/// Raised when the pointer chain keeps failing and the configured layout
/// probably no longer matches the target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleSignal {
    pub consecutive_failures: u32,
    /// Step of the most recent failure
    pub step: Option<usize>,
    pub last_error: String,
}

/// Receives everything the poll loop produces.
///
/// Only snapshots are mandatory; the other callbacks default to no-ops.
pub trait SnapshotSink {
    fn on_snapshot(&mut self, snapshot: Snapshot);

    fn on_state(&mut self, _from: ProbeState, _to: ProbeState) {}

    fn on_chain_failure(&mut self, _error: &ProbeError) {}

    fn on_stale_configuration(&mut self, _signal: &StaleSignal) {}
}

impl<S: SnapshotSink + ?Sized> SnapshotSink for &mut S {
    fn on_snapshot(&mut self, snapshot: Snapshot) {
        (**self).on_snapshot(snapshot)
    }

    fn on_state(&mut self, from: ProbeState, to: ProbeState) {
        (**self).on_state(from, to)
    }

    fn on_chain_failure(&mut self, error: &ProbeError) {
        (**self).on_chain_failure(error)
    }

    fn on_stale_configuration(&mut self, signal: &StaleSignal) {
        (**self).on_stale_configuration(signal)
    }
}

/// Keeps everything it is given
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub snapshots: Vec<Snapshot>,
    pub transitions: Vec<(ProbeState, ProbeState)>,
    pub chain_failures: Vec<String>,
    pub stale_signals: Vec<StaleSignal>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// States entered, in order
    pub fn visited(&self) -> Vec<ProbeState> {
        self.transitions.iter().map(|&(_, to)| to).collect()
    }
}

impl SnapshotSink for RecordingSink {
    fn on_snapshot(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    fn on_state(&mut self, from: ProbeState, to: ProbeState) {
        self.transitions.push((from, to));
    }

    fn on_chain_failure(&mut self, error: &ProbeError) {
        self.chain_failures.push(error.to_string());
    }

    fn on_stale_configuration(&mut self, signal: &StaleSignal) {
        self.stale_signals.push(signal.clone());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    /// One JSON object per line
    Json,
}

/// Writes snapshots and stale signals to a stream
pub struct ConsoleSink<W: Write> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        ConsoleSink { out, format }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_snapshot(&mut self, snapshot: &Snapshot) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, snapshot)?;
                writeln!(self.out)?;
            }
            OutputFormat::Text => {
                let status = if snapshot.complete { "complete" } else { "partial" };
                writeln!(
                    self.out,
                    "snapshot #{} ({status}) base {}",
                    snapshot.sequence, snapshot.base
                )?;
                let width = snapshot.fields.iter().map(|r| r.name.len()).max().unwrap_or(0);
                for reading in &snapshot.fields {
                    match (&reading.value, &reading.error) {
                        (Some(value), _) => {
                            writeln!(self.out, "  {:<width$}  {value}", reading.name)?
                        }
                        (None, Some(error)) => writeln!(
                            self.out,
                            "  {:<width$}  unavailable ({error})",
                            reading.name
                        )?,
                        (None, None) => {
                            writeln!(self.out, "  {:<width$}  unavailable", reading.name)?
                        }
                    }
                }
            }
        }
        self.out.flush()
    }

    fn write_stale(&mut self, signal: &StaleSignal) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer(
                    &mut self.out,
                    &serde_json::json!({ "stale_configuration": signal }),
                )?;
                writeln!(self.out)?;
            }
            OutputFormat::Text => writeln!(
                self.out,
                "pointer chain failed {} times in a row; offsets may be out of date",
                signal.consecutive_failures
            )?,
        }
        self.out.flush()
    }
}

impl<W: Write> SnapshotSink for ConsoleSink<W> {
    fn on_snapshot(&mut self, snapshot: Snapshot) {
        if let Err(e) = self.write_snapshot(&snapshot) {
            error!(error = %e, "failed to write snapshot");
        }
    }

    fn on_stale_configuration(&mut self, signal: &StaleSignal) {
        if let Err(e) = self.write_stale(signal) {
            error!(error = %e, "failed to write stale configuration notice");
        }
    }
}
