//! The control-transfer seam between the engine and native code.
//!
//! The primitive that actually jumps to a raw address is supplied by the
//! embedder (typically a few instructions of assembly linked into the final
//! binary). The engine only needs it to honour the contract in
//! [`crate::abi`].

use crate::abi::EngineState;

/// Transfers control into generated code.
pub trait Trampoline {
    /// Jump to `entry` and return once the code there has written a status
    /// into `*state`.
    ///
    /// # Safety
    ///
    /// - `entry` must be the address of code generated against the current
    ///   [`ABI_VERSION`](crate::abi::ABI_VERSION).
    /// - `state` is valid for reads and writes for the duration of the call
    ///   and must not be retained afterwards.
    /// - `memory` is the current base of the live function's linear memory,
    ///   valid only until the call returns.
    unsafe fn enter(&mut self, entry: usize, state: *mut EngineState, memory: *mut u8);
}

/// Signature of the external trampoline primitive.
pub type NativeEntry = unsafe extern "C" fn(entry: usize, state: *mut EngineState, memory: *mut u8);

/// Trampoline backed by an external `extern "C"` primitive
#[derive(Debug, Clone, Copy)]
pub struct NativeTrampoline {
    primitive: NativeEntry,
}

impl NativeTrampoline {
    /// Wrap the embedder's primitive.
    ///
    /// # Safety
    ///
    /// `primitive` must jump to its first argument with the remaining two
    /// arguments available to the target code as described in
    /// [`crate::abi`], and must return to its caller when that code returns.
    pub const unsafe fn new(primitive: NativeEntry) -> Self {
        Self { primitive }
    }
}

impl Trampoline for NativeTrampoline {
    unsafe fn enter(&mut self, entry: usize, state: *mut EngineState, memory: *mut u8) {
        // SAFETY: the caller upholds `Trampoline::enter`; `new` guarantees the
        // primitive forwards those arguments unchanged.
        unsafe { (self.primitive)(entry, state, memory) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::StatusCode;

    unsafe extern "C" fn return_immediately(_entry: usize, state: *mut EngineState, _memory: *mut u8) {
        // SAFETY: `enter` guarantees `state` is valid for writes.
        unsafe { (*state).status = StatusCode::Returned as u32 };
    }

    #[test]
    fn test_native_trampoline_forwards_to_primitive() {
        // SAFETY: the primitive above writes only the status register.
        let mut trampoline = unsafe { NativeTrampoline::new(return_immediately) };
        let mut state = EngineState {
            status: u32::MAX,
            ..EngineState::default()
        };

        // SAFETY: `state` outlives the call and is not retained.
        unsafe { trampoline.enter(0x1000, &mut state, core::ptr::null_mut()) };

        assert_eq!(state.status, StatusCode::Returned as u32);
    }
}
