//! Capturing the value read by a load.

use std::collections::*;

/// Interface to the memory of the analyzed program.
///
/// Implementations must never fault: a copy from an unmapped address simply
/// comes up short.
pub trait MemorySource {
    /// Copy bytes starting at `addr` into `buf`.
    /// Returns the number of bytes that could actually be read.
    fn copy(&self, addr: u64, buf: &mut [u8]) -> usize;
}

impl<M: MemorySource + ?Sized> MemorySource for &M {
    fn copy(&self, addr: u64, buf: &mut [u8]) -> usize {
        (**self).copy(addr, buf)
    }
}

/// Read `width` bytes at `addr` as a little-endian, zero-extended word.
///
/// Bytes that cannot be read are treated as zero. Only the first 8 bytes
/// are ever read.
pub fn load_value(mem: &impl MemorySource, addr: u64, width: u32) -> u64 {
    let mut buf = [0u8; 8];
    let len = (width as usize).min(buf.len());
    let copied = mem.copy(addr, &mut buf[..len]);
    buf[copied.min(len)..].fill(0);
    u64::from_le_bytes(buf)
}

/// Truncate a value to the low `width` bytes.
pub fn truncate_value(value: u64, width: u32) -> u64 {
    if width >= 8 {
        value
    } else {
        value & ((1u64 << (width * 8)) - 1)
    }
}

/// A sparse, byte-addressed memory image.
///
/// Unwritten bytes are unmapped; reads stop at the first unmapped byte.
#[derive(Clone, Debug, Default)]
pub struct SparseMemory {
    data: BTreeMap<u64, u8>,
}
impl SparseMemory {
    pub fn new() -> Self {
        Self { data: BTreeMap::new() }
    }

    /// Write `bytes` starting at `addr`.
    pub fn write(&mut self, addr: u64, bytes: &[u8]) {
        for (off, b) in bytes.iter().enumerate() {
            self.data.insert(addr.wrapping_add(off as u64), *b);
        }
    }

    /// Write a little-endian 64-bit word at `addr`.
    pub fn write_u64(&mut self, addr: u64, value: u64) {
        self.write(addr, &value.to_le_bytes());
    }
}

impl MemorySource for SparseMemory {
    fn copy(&self, addr: u64, buf: &mut [u8]) -> usize {
        for (off, slot) in buf.iter_mut().enumerate() {
            match self.data.get(&addr.wrapping_add(off as u64)) {
                Some(b) => *slot = *b,
                None => return off,
            }
        }
        buf.len()
    }
}
