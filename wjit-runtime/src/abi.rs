//! Shared state layout between the engine and generated code.
//!
//! Generated code addresses [`EngineState`] through the raw pointer the
//! trampoline passes it, at the byte offsets exported below. The code
//! generator compiles those offsets in as constants, so any change to the
//! layout must bump [`ABI_VERSION`] and invalidates every existing
//! [`CompiledFunction`](crate::func::CompiledFunction).
//!
//! # Contract with generated code
//!
//! - On every entry, `stack_base` and `stack_len` describe the current value
//!   stack buffer. Generated code must re-derive slot addresses from them and
//!   must not keep an address across an exit, since the `growStack` built-in
//!   moves the buffer.
//! - The same rule applies to the linear-memory base passed as the third
//!   trampoline argument; `growMemory` may move it.
//! - Before returning to the trampoline, generated code writes `status`.
//!   For the three call statuses it also writes `call_target_index` and
//!   `continuation_offset`, the latter relative to the function's own entry.
//! - `sp` is owned by generated code while it runs and must be left within
//!   `0..=stack_len`.
//!
//! Slot and memory accesses made by generated code are not bounds checked by
//! the engine.

use core::{fmt, mem::offset_of};

/// Version of the layout described by this module.
pub const ABI_VERSION: u32 = 1;

/// Registers shared with generated code.
///
/// Addresses are stored as `u64` so the layout is identical on every target.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EngineState {
    /// Address of value-stack slot 0
    pub stack_base:          u64,
    /// Number of slots in the value-stack buffer
    pub stack_len:           u64,
    /// Index of the next free slot
    pub sp:                  u64,
    /// Why generated code handed control back, see [`StatusCode`]
    pub status:              u32,
    /// Function, built-in or host index for call statuses
    pub call_target_index:   u32,
    /// Resume point relative to the calling function's entry address
    pub continuation_offset: u64,
}

/// Byte offset of [`EngineState::stack_base`]
pub const STACK_BASE_OFFSET: usize = offset_of!(EngineState, stack_base);
/// Byte offset of [`EngineState::stack_len`]
pub const STACK_LEN_OFFSET: usize = offset_of!(EngineState, stack_len);
/// Byte offset of [`EngineState::sp`]
pub const SP_OFFSET: usize = offset_of!(EngineState, sp);
/// Byte offset of [`EngineState::status`]
pub const STATUS_OFFSET: usize = offset_of!(EngineState, status);
/// Byte offset of [`EngineState::call_target_index`]
pub const CALL_TARGET_INDEX_OFFSET: usize = offset_of!(EngineState, call_target_index);
/// Byte offset of [`EngineState::continuation_offset`]
pub const CONTINUATION_OFFSET_OFFSET: usize = offset_of!(EngineState, continuation_offset);

// ABI v1. Changing any of these requires recompiling all generated code.
const _: () = assert!(STACK_BASE_OFFSET == 0);
const _: () = assert!(STACK_LEN_OFFSET == 8);
const _: () = assert!(SP_OFFSET == 16);
const _: () = assert!(STATUS_OFFSET == 24);
const _: () = assert!(CALL_TARGET_INDEX_OFFSET == 28);
const _: () = assert!(CONTINUATION_OFFSET_OFFSET == 32);
const _: () = assert!(core::mem::size_of::<EngineState>() == 40);

/// Status values generated code writes into [`EngineState::status`]
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// The current function finished
    Returned            = 0,
    /// Call the compiled function at `call_target_index`
    CallFunction        = 1,
    /// Run the built-in service at `call_target_index`
    CallBuiltInFunction = 2,
    /// Run the host callback at `call_target_index`
    CallHostFunction    = 3,
}

impl TryFrom<u32> for StatusCode {
    type Error = u32;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::Returned),
            1 => Ok(Self::CallFunction),
            2 => Ok(Self::CallBuiltInFunction),
            3 => Ok(Self::CallHostFunction),
            other => Err(other),
        }
    }
}

/// Built-in runtime services, addressed by a fixed index
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// Pop a page count and grow the current function's memory by it
    GrowMemory = 0,
    /// Double the value-stack capacity
    GrowStack  = 1,
}

impl TryFrom<u32> for Builtin {
    type Error = u32;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::GrowMemory),
            1 => Ok(Self::GrowStack),
            other => Err(other),
        }
    }
}

/// Decoded reason for an exit from generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The live frame finished
    Returned,
    /// Call another compiled function
    CallFunction {
        /// Index into the engine's function table
        index:               u32,
        /// Caller's resume point relative to its entry
        continuation_offset: u64,
    },
    /// Call a built-in service
    CallBuiltin {
        /// Requested service
        builtin:             Builtin,
        /// Caller's resume point relative to its entry
        continuation_offset: u64,
    },
    /// Call a host callback
    CallHost {
        /// Index into the host function table
        index:               u32,
        /// Caller's resume point relative to its entry
        continuation_offset: u64,
    },
}

impl Exit {
    /// Read the status registers.
    ///
    /// Index and offset registers are only looked at for call statuses.
    pub fn decode(state: &EngineState) -> Result<Self, ProtocolViolation> {
        let status = StatusCode::try_from(state.status).map_err(ProtocolViolation::InvalidStatus)?;
        let index = state.call_target_index;
        let continuation_offset = state.continuation_offset;

        Ok(match status {
            StatusCode::Returned => Self::Returned,
            StatusCode::CallFunction => Self::CallFunction {
                index,
                continuation_offset,
            },
            StatusCode::CallBuiltInFunction => Self::CallBuiltin {
                builtin: Builtin::try_from(index).map_err(ProtocolViolation::UnknownBuiltin)?,
                continuation_offset,
            },
            StatusCode::CallHostFunction => Self::CallHost {
                index,
                continuation_offset,
            },
        })
    }
}

/// A breach of the contract between generated code and the engine.
///
/// These are never returned to the caller of `exec`; the engine aborts on
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolViolation {
    /// `status` held a value outside [`StatusCode`]
    InvalidStatus(u32),
    /// `CallBuiltInFunction` named an index outside [`Builtin`]
    UnknownBuiltin(u32),
    /// `CallFunction` named a function that is not registered
    FunctionIndexOutOfRange {
        /// Requested index
        index: u32,
        /// Table length
        len:   usize,
    },
    /// `CallHostFunction` named a host function that is not registered
    HostIndexOutOfRange {
        /// Requested index
        index: u32,
        /// Table length
        len:   usize,
    },
    /// A continuation offset pointing outside the function's code
    ContinuationOutOfRange {
        /// Offset written by generated code
        offset:   u64,
        /// Length of the code segment
        code_len: usize,
    },
    /// `sp` was left beyond the value-stack buffer
    StackPointerOutOfRange {
        /// Value of `sp`
        sp:        u64,
        /// Buffer length
        stack_len: u64,
    },
    /// `growMemory` found no page count on the value stack
    MissingGrowMemoryOperand,
}

impl fmt::Display for ProtocolViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStatus(raw) => write!(f, "invalid status code: {raw}"),
            Self::UnknownBuiltin(raw) => write!(f, "unknown built-in function index: {raw}"),
            Self::FunctionIndexOutOfRange { index, len } => {
                write!(f, "function index {index} out of range for {len} compiled functions")
            }
            Self::HostIndexOutOfRange { index, len } => {
                write!(f, "host function index {index} out of range for {len} host functions")
            }
            Self::ContinuationOutOfRange { offset, code_len } => {
                write!(f, "continuation offset {offset} outside code segment of {code_len} bytes")
            }
            Self::StackPointerOutOfRange { sp, stack_len } => {
                write!(f, "stack pointer {sp} beyond value stack of {stack_len} slots")
            }
            Self::MissingGrowMemoryOperand => {
                write!(f, "growMemory called with an empty value stack")
            }
        }
    }
}
