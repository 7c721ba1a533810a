//! Remote memory read seam

use crate::core::types::{Address, FieldValue, ProbeError, ProbeResult, ValueType};
use crate::memory::chain::PointerWidth;

/// Read access to another address space.
///
/// Implemented by the live Windows process handle and by [`MemoryImage`]
/// for offline use. Only `read_memory` is required; the typed helpers
/// build on it and turn short reads into errors.
///
/// [`MemoryImage`]: crate::memory::MemoryImage
pub trait ReadMemory {
    /// Copies up to `buffer.len()` bytes starting at `address` and returns
    /// how many bytes were copied.
    fn read_memory(&self, address: Address, buffer: &mut [u8]) -> ProbeResult<usize>;

    /// Fills `buffer` completely or fails with `ShortRead`
    fn read_exact(&self, address: Address, buffer: &mut [u8]) -> ProbeResult<()> {
        let read = self.read_memory(address, buffer)?;
        if read != buffer.len() {
            return Err(ProbeError::short_read(address, buffer.len(), read));
        }
        Ok(())
    }

    /// Reads a little-endian pointer of the given width
    fn read_pointer(&self, address: Address, width: PointerWidth) -> ProbeResult<Address> {
        let mut raw = [0u8; 8];
        self.read_exact(address, &mut raw[..width.bytes()])?;
        let value = u64::from_le_bytes(raw);
        usize::try_from(value)
            .map(Address::new)
            .map_err(|_| ProbeError::InvalidAddress(format!("0x{value:X} read at {address}")))
    }

    /// Reads one value of `value_type`
    fn read_value(&self, address: Address, value_type: ValueType) -> ProbeResult<FieldValue> {
        let mut raw = [0u8; 8];
        let bytes = &mut raw[..value_type.size()];
        self.read_exact(address, bytes)?;
        FieldValue::from_le_bytes(bytes, value_type)
            .ok_or_else(|| ProbeError::short_read(address, value_type.size(), bytes.len()))
    }
}

impl<T: ReadMemory + ?Sized> ReadMemory for &T {
    fn read_memory(&self, address: Address, buffer: &mut [u8]) -> ProbeResult<usize> {
        (**self).read_memory(address, buffer)
    }
}

impl<T: ReadMemory + ?Sized> ReadMemory for Box<T> {
    fn read_memory(&self, address: Address, buffer: &mut [u8]) -> ProbeResult<usize> {
        (**self).read_memory(address, buffer)
    }
}
