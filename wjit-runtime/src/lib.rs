// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! WJIT Runtime - Execution Core
//!
//! Drives natively generated function bodies without ever recursing into
//! them. Generated code runs until it needs something (a call, a built-in
//! service, a host callback, or simply returns), records the reason in a
//! shared register block and returns to the engine's trampoline loop, which
//! services the request and re-enters at the recorded continuation.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wjit_runtime::{
//!     CompiledFunction, Engine, EngineState, MemoryInstance, NativeTrampoline,
//! };
//!
//! unsafe extern "C" {
//!     fn wjit_jump(entry: usize, state: *mut EngineState, memory: *mut u8);
//! }
//!
//! // SAFETY: `wjit_jump` is the embedder's assembly trampoline.
//! let trampoline = unsafe { NativeTrampoline::new(wjit_jump) };
//! let mut engine = Engine::new(trampoline)?;
//!
//! let memory = MemoryInstance::new().into_shared();
//! let entry = engine.register_function(CompiledFunction::new(code, memory)?);
//! engine.exec(entry)?;
//! ```

#![warn(missing_docs)]

pub mod abi;
pub mod config;
pub mod engine;
pub mod frame;
pub mod func;
pub mod memory;
pub mod stack;
pub mod trampoline;

pub use abi::{ABI_VERSION, Builtin, EngineState, Exit, ProtocolViolation, StatusCode};
pub use config::{DEFAULT_STACK_SLOTS, EngineConfig};
pub use engine::{Engine, ExecutionStats};
pub use frame::{CallFrame, CallStack};
pub use func::CompiledFunction;
pub use memory::{MemoryInstance, PAGE_SIZE, SharedMemory};
pub use stack::ValueStack;
pub use trampoline::{NativeEntry, NativeTrampoline, Trampoline};
pub use wjit_error::{Error, Result};
pub use wjit_host::{HostContext, HostFunction, HostFunctionTable};
