//! Compiled function representation.
//!
//! A compiled function pairs a native code segment with the linear memory
//! it operates on. The code segment is allocated once and never moved, so
//! its entry address stays valid for the lifetime of the function.
//!
//! The engine does not map the segment executable; the loader that produces
//! it owns that concern and the trampoline is what finally jumps into it.

use core::fmt;

use wjit_error::{Error, Result};

use crate::memory::SharedMemory;

/// Immutable native code plus the memory it runs against
pub struct CompiledFunction {
    code:   Box<[u8]>,
    memory: SharedMemory,
}

impl CompiledFunction {
    /// Create a compiled function.
    ///
    /// Fails if `code` is empty, since an empty segment has no entry address.
    pub fn new(code: impl Into<Box<[u8]>>, memory: SharedMemory) -> Result<Self> {
        let code = code.into();
        if code.is_empty() {
            return Err(Error::empty_code_segment("Compiled function has no code"));
        }
        Ok(Self { code, memory })
    }

    /// Address of the first byte of the code segment
    pub fn initial_address(&self) -> usize {
        self.code.as_ptr() as usize
    }

    /// Absolute address of `offset` bytes past the entry, if that lies
    /// inside the code segment
    pub fn address_at(&self, offset: u64) -> Option<usize> {
        let offset = usize::try_from(offset).ok()?;
        (offset < self.code.len()).then(|| self.initial_address() + offset)
    }

    /// Offset of an absolute address from the entry, if it lies inside the
    /// code segment
    pub fn offset_of(&self, address: usize) -> Option<u64> {
        let offset = address.checked_sub(self.initial_address())?;
        (offset < self.code.len()).then_some(offset as u64)
    }

    /// The code segment
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// The memory this function operates on
    pub fn memory(&self) -> &SharedMemory {
        &self.memory
    }
}

impl fmt::Debug for CompiledFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledFunction")
            .field("initial_address", &format_args!("{:#x}", self.initial_address()))
            .field("code_len", &self.code.len())
            .field("memory_pages", &self.memory.try_lock().map(|memory| memory.pages()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::memory::MemoryInstance;

    #[test]
    fn test_empty_code_is_rejected() {
        let err = CompiledFunction::new(Vec::<u8>::new(), MemoryInstance::new().into_shared()).unwrap_err();
        assert_eq!(err.code, wjit_error::codes::EMPTY_CODE_SEGMENT);
    }

    #[test]
    fn test_addresses_are_relative_to_entry() {
        let f = CompiledFunction::new(vec![0x90; 16], MemoryInstance::new().into_shared()).unwrap();
        let entry = f.initial_address();

        assert_eq!(f.address_at(0), Some(entry));
        assert_eq!(f.address_at(15), Some(entry + 15));
        assert_eq!(f.address_at(16), None);
        assert_eq!(f.address_at(u64::MAX), None);

        assert_eq!(f.offset_of(entry + 3), Some(3));
        assert_eq!(f.offset_of(entry + 16), None);
        assert_eq!(f.offset_of(entry.wrapping_sub(1)), None);
    }

    #[test]
    fn test_entry_address_is_stable() {
        let f = CompiledFunction::new(vec![1, 2, 3], MemoryInstance::new().into_shared()).unwrap();
        let before = f.initial_address();

        f.memory().lock().grow(8).unwrap();
        let moved = Arc::new(f);

        assert_eq!(moved.initial_address(), before);
    }

    #[test]
    fn test_functions_can_share_memory() {
        let memory = MemoryInstance::new().into_shared();
        let a = CompiledFunction::new(vec![1], Arc::clone(&memory)).unwrap();
        let b = CompiledFunction::new(vec![2], Arc::clone(&memory)).unwrap();

        a.memory().lock().grow(1).unwrap();

        assert_eq!(b.memory().lock().pages(), 2);
        assert!(Arc::ptr_eq(a.memory(), b.memory()));
    }
}
