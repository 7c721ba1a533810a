//! Pointer chain specification and resolution
//!
//! A chain `[o0, o1, ..., on]` rooted at a module base `B` is resolved as
//! `[[[B + o0] + o1] ... + on]`: every offset is added to the current
//! address and the result is dereferenced, so a chain of `n + 1` offsets
//! performs exactly `n + 1` pointer reads. The value read by the last step
//! is the final base address that field offsets are measured from.

use crate::core::types::{Address, Offset, ProbeError, ProbeResult};
use crate::memory::reader::ReadMemory;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Width of a pointer in the target process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PointerWidth {
    Four,
    #[default]
    Eight,
}

impl PointerWidth {
    pub const fn bytes(&self) -> usize {
        match self {
            PointerWidth::Four => 4,
            PointerWidth::Eight => 8,
        }
    }
}

impl TryFrom<u8> for PointerWidth {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(PointerWidth::Four),
            8 => Ok(PointerWidth::Eight),
            other => Err(format!("pointer width must be 4 or 8, got {other}")),
        }
    }
}

impl From<PointerWidth> for u8 {
    fn from(width: PointerWidth) -> Self {
        width.bytes() as u8
    }
}

/// A static pointer path from a module base to a structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerChain {
    offsets: Vec<Offset>,
    width: PointerWidth,
}

impl PointerChain {
    /// Creates a chain; at least one offset is required.
    pub fn new(offsets: Vec<Offset>, width: PointerWidth) -> ProbeResult<Self> {
        if offsets.is_empty() {
            return Err(ProbeError::InvalidChain(
                "a pointer chain needs at least one offset".to_string(),
            ));
        }
        Ok(PointerChain { offsets, width })
    }

    /// Convenience constructor from raw integers
    pub fn from_raw(offsets: &[i64], width: PointerWidth) -> ProbeResult<Self> {
        Self::new(offsets.iter().copied().map(Offset::new).collect(), width)
    }

    pub fn offsets(&self) -> &[Offset] {
        &self.offsets
    }

    pub fn width(&self) -> PointerWidth {
        self.width
    }

    /// The module-relative first offset
    pub fn root(&self) -> Offset {
        self.offsets[0]
    }

    /// Number of dereferences a full resolution performs
    pub fn steps(&self) -> usize {
        self.offsets.len()
    }
}

impl fmt::Display for PointerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "base")?;
        for offset in &self.offsets {
            write!(f, " {offset} ->")?;
        }
        write!(f, " *")
    }
}

/// Walks `chain` starting at `base` and returns the final base address.
///
/// Each step is a single read with no retry. The first failing step is
/// reported as `PointerChainBroken` carrying the step index and the address
/// that was being dereferenced; no further reads are issued after it.
pub fn resolve_chain<R>(reader: &R, base: Address, chain: &PointerChain) -> ProbeResult<Address>
where
    R: ReadMemory + ?Sized,
{
    let mut current = base;

    for (step, &offset) in chain.offsets.iter().enumerate() {
        let address = current
            .apply(offset)
            .map_err(|e| ProbeError::pointer_chain_broken(step, current, e))?;

        current = reader
            .read_pointer(address, chain.width)
            .map_err(|e| ProbeError::pointer_chain_broken(step, address, e))?;

        debug!(step, %address, value = %current, "dereferenced pointer");
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::OsError;
    use crate::memory::MemoryImage;

    /// Copies nothing and fails like an interrupted remote copy
    struct PartialCopy;

    impl ReadMemory for PartialCopy {
        fn read_memory(&self, address: Address, buffer: &mut [u8]) -> ProbeResult<usize> {
            Err(ProbeError::RemoteReadFailed {
                address,
                size: buffer.len(),
                os: OsError::from_code(299),
            })
        }
    }

    #[test]
    fn test_broken_chain_carries_os_code() {
        let chain = PointerChain::from_raw(&[0x20], PointerWidth::Eight).unwrap();
        let err = resolve_chain(&PartialCopy, Address::new(0x1000), &chain).unwrap_err();

        assert_eq!(err.chain_step(), Some(0));
        assert_eq!(err.os_error().map(|os| os.code), Some(299));
        assert!(err.to_string().contains("OS error 299"));
    }

    #[test]
    fn test_empty_chain_rejected() {
        let err = PointerChain::new(Vec::new(), PointerWidth::Eight).unwrap_err();
        assert!(matches!(err, ProbeError::InvalidChain(_)));
    }

    #[test]
    fn test_pointer_width_conversion() {
        assert_eq!(PointerWidth::try_from(4).unwrap(), PointerWidth::Four);
        assert_eq!(PointerWidth::try_from(8).unwrap(), PointerWidth::Eight);
        assert!(PointerWidth::try_from(2).is_err());
        assert_eq!(u8::from(PointerWidth::Four), 4);
    }

    #[test]
    fn test_single_step_chain() {
        let mut image = MemoryImage::new();
        image.write_pointer(Address::new(0x1010), Address::new(0xAAA0), PointerWidth::Eight);

        let chain = PointerChain::from_raw(&[0x10], PointerWidth::Eight).unwrap();
        let resolved = resolve_chain(&image, Address::new(0x1000), &chain).unwrap();
        assert_eq!(resolved, Address::new(0xAAA0));
    }

    #[test]
    fn test_negative_offsets() {
        let mut image = MemoryImage::new();
        image.write_pointer(Address::new(0x0FF8), Address::new(0x5010), PointerWidth::Eight);
        image.write_pointer(Address::new(0x5000), Address::new(0x6000), PointerWidth::Eight);

        let chain = PointerChain::from_raw(&[-0x8, -0x10], PointerWidth::Eight).unwrap();
        let resolved = resolve_chain(&image, Address::new(0x1000), &chain).unwrap();
        assert_eq!(resolved, Address::new(0x6000));
    }

    #[test]
    fn test_four_byte_pointers() {
        let mut image = MemoryImage::new();
        image.write_pointer(Address::new(0x400), Address::new(0x800), PointerWidth::Four);
        image.write_pointer(Address::new(0x804), Address::new(0xC00), PointerWidth::Four);

        let chain = PointerChain::from_raw(&[0x0, 0x4], PointerWidth::Four).unwrap();
        let resolved = resolve_chain(&image, Address::new(0x400), &chain).unwrap();
        assert_eq!(resolved, Address::new(0xC00));
    }

    #[test]
    fn test_overflow_is_a_step_failure() {
        let image = MemoryImage::new();
        let chain = PointerChain::from_raw(&[-0x20], PointerWidth::Eight).unwrap();
        let err = resolve_chain(&image, Address::new(0x10), &chain).unwrap_err();

        assert_eq!(err.chain_step(), Some(0));
        assert!(image.read_log().is_empty());
    }

    #[test]
    fn test_display() {
        let chain = PointerChain::from_raw(&[0x20, 0x8], PointerWidth::Eight).unwrap();
        assert_eq!(chain.to_string(), "base +0x20 -> +0x8 -> *");
    }
}
