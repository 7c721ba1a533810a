//! Memory access for the probe
//!
//! The [`ReadMemory`] trait is the seam between the live target and the
//! pure logic that walks pointer chains and extracts field snapshots.

pub mod chain;
pub mod fields;
pub mod image;
mod reader;

pub use chain::{resolve_chain, PointerChain, PointerWidth};
pub use fields::{extract, FieldReading, FieldSpec, FieldTable, Snapshot};
pub use image::MemoryImage;
pub use reader::ReadMemory;
