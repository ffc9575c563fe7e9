//! Value stack storage.
//!
//! The stack pointer itself lives in [`EngineState`](crate::abi::EngineState)
//! because generated code owns it while running; this type only owns the
//! slots.

use wjit_error::{Error, Result};

/// Growable buffer of 64-bit value slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueStack {
    slots: Vec<u64>,
}

impl ValueStack {
    /// Create a zeroed stack of `capacity` slots.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::invalid_argument("Value stack capacity must be non-zero"));
        }
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| Error::out_of_memory("Value stack allocation failed"))?;
        slots.resize(capacity, 0);
        Ok(Self { slots })
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Double the number of slots, returning the new capacity.
    ///
    /// Slot values keep their indices. The buffer may move, invalidating
    /// every address previously derived from [`ValueStack::as_mut_ptr`].
    pub fn grow(&mut self, max_slots: Option<usize>) -> Result<usize> {
        let old_capacity = self.capacity();
        let new_capacity = old_capacity
            .checked_mul(2)
            .ok_or(Error::stack_overflow("Value stack size overflow"))?;
        if max_slots.is_some_and(|max| new_capacity > max) {
            return Err(Error::stack_overflow("Value stack exceeds configured maximum"));
        }

        self.slots
            .try_reserve_exact(old_capacity)
            .map_err(|_| Error::out_of_memory("Value stack allocation failed"))?;
        self.slots.resize(new_capacity, 0);

        tracing::debug!(old_capacity, new_capacity, "value stack grown");
        Ok(new_capacity)
    }

    /// All slots
    pub fn as_slice(&self) -> &[u64] {
        &self.slots
    }

    /// All slots, mutably
    pub fn as_mut_slice(&mut self) -> &mut [u64] {
        &mut self.slots
    }

    /// Address of slot 0. Invalidated by the next grow.
    pub fn as_mut_ptr(&mut self) -> *mut u64 {
        self.slots.as_mut_ptr()
    }
}
