//! Linear Memory Implementation
//!
//! A module's linear memory is a contiguous, zero-initialised byte buffer
//! that grows in whole pages and never shrinks.
//!
//! # Address stability
//!
//! Growing may reallocate the buffer. Every address derived from
//! [`MemoryInstance::as_mut_ptr`] before a [`MemoryInstance::grow`] is
//! invalid afterwards; the engine hands generated code a fresh base address
//! on every trampoline entry for that reason.
//!
//! # Usage
//!
//! ```
//! use wjit_runtime::memory::{MemoryInstance, PAGE_SIZE};
//!
//! let mut memory = MemoryInstance::new();
//! memory.write(0, &[1, 2, 3, 4]).unwrap();
//!
//! let old_pages = memory.grow(2).unwrap();
//! assert_eq!(old_pages, 1);
//! assert_eq!(memory.size_in_bytes(), 3 * PAGE_SIZE);
//!
//! let mut buffer = [0; 4];
//! memory.read(0, &mut buffer).unwrap();
//! assert_eq!(buffer, [1, 2, 3, 4]);
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use wjit_error::{Error, Result};

/// Size of one memory page in bytes
pub const PAGE_SIZE: usize = 1024;

/// A memory shared by the compiled functions of one module.
///
/// The engine holds the lock for the duration of each trampoline entry.
pub type SharedMemory = Arc<Mutex<MemoryInstance>>;

/// A growable linear memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryInstance {
    buf: Vec<u8>,
}

impl Default for MemoryInstance {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryInstance {
    /// A memory of one page
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: vec![0; PAGE_SIZE],
        }
    }

    /// A memory of `pages` pages
    pub fn with_pages(pages: u64) -> Result<Self> {
        let mut memory = Self { buf: Vec::new() };
        memory.grow(pages)?;
        Ok(memory)
    }

    /// Wrap this memory for sharing between compiled functions
    #[must_use]
    pub fn into_shared(self) -> SharedMemory {
        Arc::new(Mutex::new(self))
    }

    /// Current size in pages
    pub fn pages(&self) -> u64 {
        (self.buf.len() / PAGE_SIZE) as u64
    }

    /// Current size in bytes
    pub fn size_in_bytes(&self) -> usize {
        self.buf.len()
    }

    /// Append `pages` zeroed pages, returning the previous size in pages.
    ///
    /// Existing bytes keep their offsets. The base address may change.
    pub fn grow(&mut self, pages: u64) -> Result<u64> {
        self.grow_bounded(pages, None)
    }

    /// Like [`MemoryInstance::grow`], failing with `OUT_OF_MEMORY` if the
    /// result would exceed `max_pages`.
    pub fn grow_bounded(&mut self, pages: u64, max_pages: Option<u64>) -> Result<u64> {
        let old_pages = self.pages();
        if pages == 0 {
            return Ok(old_pages);
        }

        let new_pages = old_pages
            .checked_add(pages)
            .ok_or(Error::out_of_memory("Memory page count overflow"))?;
        if max_pages.is_some_and(|max| new_pages > max) {
            return Err(Error::out_of_memory("Memory grow exceeds configured maximum"));
        }

        let additional = usize::try_from(pages)
            .ok()
            .and_then(|pages| pages.checked_mul(PAGE_SIZE))
            .ok_or(Error::out_of_memory("Memory size overflow"))?;
        self.buf
            .try_reserve_exact(additional)
            .map_err(|_| Error::out_of_memory("Memory allocation failed"))?;
        self.buf.resize(self.buf.len() + additional, 0);

        tracing::debug!(old_pages, new_pages, "memory grown");
        Ok(old_pages)
    }

    /// Copy bytes out of memory starting at `offset`
    pub fn read(&self, offset: usize, buffer: &mut [u8]) -> Result<()> {
        let range = self.checked_range(offset, buffer.len())?;
        buffer.copy_from_slice(&self.buf[range]);
        Ok(())
    }

    /// Copy bytes into memory starting at `offset`
    pub fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let range = self.checked_range(offset, bytes.len())?;
        self.buf[range].copy_from_slice(bytes);
        Ok(())
    }

    /// The whole buffer
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Base address handed to generated code.
    ///
    /// Invalidated by the next grow.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.buf.as_mut_ptr()
    }

    fn checked_range(&self, offset: usize, len: usize) -> Result<core::ops::Range<usize>> {
        let end = offset
            .checked_add(len)
            .filter(|end| *end <= self.buf.len())
            .ok_or(Error::memory_out_of_bounds("Memory access out of bounds"))?;
        Ok(offset..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_memory_is_one_zeroed_page() {
        let memory = MemoryInstance::new();
        assert_eq!(memory.pages(), 1);
        assert!(memory.as_slice().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_grow_zero_pages_is_noop() {
        let mut memory = MemoryInstance::new();
        assert_eq!(memory.grow(0).unwrap(), 1);
        assert_eq!(memory.size_in_bytes(), PAGE_SIZE);
    }

    #[test]
    fn test_grow_preserves_contents() {
        let mut memory = MemoryInstance::new();
        memory.write(PAGE_SIZE - 2, &[0xAB, 0xCD]).unwrap();

        memory.grow(3).unwrap();

        let mut bytes = [0; 4];
        memory.read(PAGE_SIZE - 2, &mut bytes).unwrap();
        assert_eq!(bytes, [0xAB, 0xCD, 0, 0]);
        assert_eq!(memory.pages(), 4);
    }

    #[test]
    fn test_grow_bounded_rejects_past_limit() {
        let mut memory = MemoryInstance::new();
        assert_eq!(memory.grow_bounded(1, Some(2)).unwrap(), 1);

        let err = memory.grow_bounded(1, Some(2)).unwrap_err();
        assert_eq!(err.code, wjit_error::codes::OUT_OF_MEMORY);
        assert_eq!(memory.pages(), 2);
    }

    #[test]
    fn test_grow_overflow_is_out_of_memory() {
        let mut memory = MemoryInstance::new();
        assert!(memory.grow(u64::MAX).unwrap_err().is_resource_error());
        assert_eq!(memory.pages(), 1);
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut memory = MemoryInstance::with_pages(1).unwrap();
        assert!(memory.write(PAGE_SIZE, &[1]).is_err());
        assert!(memory.write(usize::MAX, &[1]).is_err());

        let mut buffer = [0; 2];
        assert!(memory.read(PAGE_SIZE - 1, &mut buffer).unwrap_err().is_memory_error());
    }

    #[test]
    fn test_with_zero_pages() {
        let memory = MemoryInstance::with_pages(0).unwrap();
        assert_eq!(memory.size_in_bytes(), 0);
    }
}
