//! In-memory address space image
//!
//! A sparse set of mapped byte regions that implements [`ReadMemory`]. Used
//! to exercise chain resolution and field extraction without a live target,
//! and by the simulated platform that drives the poll loop in tests.

use crate::core::types::{Address, FieldValue, ProbeError, ProbeResult};
use crate::memory::chain::PointerWidth;
use crate::memory::reader::ReadMemory;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Sparse little-endian memory image with a read log
#[derive(Debug, Default)]
pub struct MemoryImage {
    regions: BTreeMap<usize, Vec<u8>>,
    denied: Vec<(usize, usize)>,
    reads: Mutex<Vec<Address>>,
}

impl MemoryImage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `bytes` at `address`, extending into a fresh region when the
    /// range is not already covered by one.
    pub fn write_bytes(&mut self, address: Address, bytes: &[u8]) {
        let start = address.as_usize();
        if let Some((&region_start, region)) = self.regions.range_mut(..=start).next_back() {
            let offset = start - region_start;
            if offset + bytes.len() <= region.len() {
                region[offset..offset + bytes.len()].copy_from_slice(bytes);
                return;
            }
        }
        self.regions.insert(start, bytes.to_vec());
    }

    /// Maps `len` zeroed bytes at `address`
    pub fn map_zeroed(&mut self, address: Address, len: usize) {
        self.regions.insert(address.as_usize(), vec![0; len]);
    }

    pub fn write_pointer(&mut self, address: Address, value: Address, width: PointerWidth) {
        let bytes = (value.as_usize() as u64).to_le_bytes();
        self.write_bytes(address, &bytes[..width.bytes()]);
    }

    pub fn write_value(&mut self, address: Address, value: FieldValue) {
        self.write_bytes(address, &value.to_le_bytes());
    }

    pub fn write_i32(&mut self, address: Address, value: i32) {
        self.write_value(address, FieldValue::I32(value));
    }

    /// Makes `[address, address + len)` unreadable even if it is mapped
    pub fn deny(&mut self, address: Address, len: usize) {
        self.denied.push((address.as_usize(), len));
    }

    /// Addresses of every read attempted so far, in order
    pub fn read_log(&self) -> Vec<Address> {
        self.reads.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn clear_read_log(&self) {
        if let Ok(mut log) = self.reads.lock() {
            log.clear();
        }
    }

    fn is_denied(&self, start: usize, len: usize) -> bool {
        let end = start.saturating_add(len);
        self.denied
            .iter()
            .any(|&(d_start, d_len)| start < d_start.saturating_add(d_len) && d_start < end)
    }
}

impl ReadMemory for MemoryImage {
    fn read_memory(&self, address: Address, buffer: &mut [u8]) -> ProbeResult<usize> {
        if let Ok(mut log) = self.reads.lock() {
            log.push(address);
        }

        let start = address.as_usize();
        if self.is_denied(start, buffer.len()) {
            return Err(ProbeError::read_failed(
                address,
                buffer.len(),
                "access denied",
            ));
        }

        let (&region_start, region) = self
            .regions
            .range(..=start)
            .next_back()
            .filter(|(region_start, region)| start - **region_start < region.len())
            .ok_or_else(|| ProbeError::read_failed(address, buffer.len(), "unmapped"))?;

        let offset = start - region_start;
        let available = &region[offset..];
        let n = available.len().min(buffer.len());
        buffer[..n].copy_from_slice(&available[..n]);
        Ok(n)
    }
}
