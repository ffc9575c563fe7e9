//! Trampoline-driven execution engine
//!
//! The engine never recurses into generated code. It enters the live frame
//! through the [`Trampoline`], decodes why control came back, updates the
//! frame chain, and loops until the root frame returns:
//!
//! | Exit | Action |
//! |---|---|
//! | `Returned` | pop the live frame |
//! | `CallFunction` | save the caller's resume point, push a frame for the callee |
//! | `CallBuiltin` | run the service, save the resume point, stay on the frame |
//! | `CallHost` | run the host callback, save the resume point, stay on the frame |
//!
//! Any other exit is a [`ProtocolViolation`] and aborts the process via
//! panic: it means the code generator and the engine disagree about the
//! contract, which no caller can recover from.

use std::sync::Arc;

use wjit_error::{Error, Result};
use wjit_host::{HostContext, HostFunction, HostFunctionTable};

use crate::{
    abi::{Builtin, EngineState, Exit, ProtocolViolation},
    config::EngineConfig,
    frame::CallStack,
    func::CompiledFunction,
    stack::ValueStack,
    trampoline::Trampoline,
};

/// Simple execution statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionStats {
    /// Number of trampoline entries
    pub trampoline_entries: u64,
    /// Number of compiled function calls
    pub function_calls:     u64,
    /// Number of built-in service calls
    pub builtin_calls:      u64,
    /// Number of host function calls
    pub host_calls:         u64,
    /// Number of frames popped by `Returned`
    pub returns:            u64,
    /// Number of value-stack doublings
    pub stack_grows:        u64,
    /// Number of successful memory grows
    pub memory_grows:       u64,
    /// Deepest frame chain observed
    pub max_frame_depth:    usize,
}

/// Execution engine for compiled functions
pub struct Engine<T: Trampoline> {
    state:          EngineState,
    stack:          ValueStack,
    frames:         CallStack,
    functions:      Vec<Arc<CompiledFunction>>,
    host_functions: HostFunctionTable,
    trampoline:     T,
    config:         EngineConfig,
    stats:          ExecutionStats,
}

impl<T: Trampoline> Engine<T> {
    /// Create an engine with the default configuration.
    ///
    /// The host table starts out as
    /// [`HostFunctionTable::with_scaling_placeholders`]; further functions are
    /// appended after them, or the table can be swapped with
    /// [`Engine::set_host_functions`].
    pub fn new(trampoline: T) -> Result<Self> {
        Self::with_config(trampoline, EngineConfig::default())
    }

    /// Create an engine with `config`
    pub fn with_config(trampoline: T, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let stack = ValueStack::new(config.initial_stack_slots)?;
        tracing::debug!(
            stack_slots = config.initial_stack_slots,
            max_stack_slots = ?config.max_stack_slots,
            max_memory_pages = ?config.max_memory_pages,
            "engine created"
        );

        Ok(Self {
            state: EngineState::default(),
            stack,
            frames: CallStack::new(),
            functions: Vec::new(),
            host_functions: HostFunctionTable::with_scaling_placeholders(),
            trampoline,
            config,
            stats: ExecutionStats::default(),
        })
    }

    /// Append a compiled function and return its index
    pub fn register_function(&mut self, function: impl Into<Arc<CompiledFunction>>) -> usize {
        self.functions.push(function.into());
        self.functions.len() - 1
    }

    /// Compiled function at `index`
    pub fn function(&self, index: usize) -> Option<&Arc<CompiledFunction>> {
        self.functions.get(index)
    }

    /// Append a host function and return its index
    pub fn register_host_function(&mut self, function: HostFunction) -> usize {
        self.host_functions.register(function)
    }

    /// Replace the host function table
    pub fn set_host_functions(&mut self, table: HostFunctionTable) {
        self.host_functions = table;
    }

    /// The host function table
    pub fn host_functions(&self) -> &HostFunctionTable {
        &self.host_functions
    }

    /// Run the function at `entry` until it returns.
    ///
    /// Any frames left over from a previous `exec` that ended in an error
    /// are discarded first.
    ///
    /// # Errors
    ///
    /// Returns an error if `entry` is not registered, if growing the value
    /// stack or a memory runs out of room, or if a host function fails.
    /// Execution stops at the failing step.
    ///
    /// # Panics
    ///
    /// Panics on any [`ProtocolViolation`] reported through the status
    /// registers.
    pub fn exec(&mut self, entry: usize) -> Result<()> {
        let function = self
            .functions
            .get(entry)
            .cloned()
            .ok_or(Error::invalid_function_index("Entry function index out of range"))?;

        self.frames.clear();
        self.frames.push(function);
        self.note_depth();
        tracing::debug!(entry, "exec started");

        while let Some(frame) = self.frames.live() {
            let function = Arc::clone(frame.function());
            let continuation = frame.continuation_address;

            self.enter(&function, continuation);

            let exit = Exit::decode(&self.state).unwrap_or_else(|violation| self.fatal(violation));
            self.check_stack_pointer();
            tracing::trace!(
                ?exit,
                depth = self.frames.depth(),
                continuation,
                offset = ?function.offset_of(continuation),
                "trampoline exit"
            );
            self.dispatch(exit, &function)?;
        }

        tracing::debug!(entry, "exec finished");
        Ok(())
    }

    fn enter(&mut self, function: &CompiledFunction, continuation: usize) {
        self.state.stack_base = self.stack.as_mut_ptr() as u64;
        self.state.stack_len = self.stack.capacity() as u64;

        let mut memory = function.memory().lock();
        let memory_base = memory.as_mut_ptr();
        let state: *mut EngineState = &mut self.state;
        self.stats.trampoline_entries += 1;

        // SAFETY: `continuation` is the entry or an in-range resume point of
        // `function`; `state` points at our own registers and `memory_base`
        // at the locked memory, both of which outlive the call and are
        // re-derived on every entry.
        unsafe { self.trampoline.enter(continuation, state, memory_base) };
    }

    fn dispatch(&mut self, exit: Exit, function: &Arc<CompiledFunction>) -> Result<()> {
        match exit {
            Exit::Returned => {
                self.frames.pop();
                self.stats.returns += 1;
            }
            Exit::CallFunction {
                index,
                continuation_offset,
            } => {
                let callee = self.functions.get(index as usize).cloned().unwrap_or_else(|| {
                    self.fatal(ProtocolViolation::FunctionIndexOutOfRange {
                        index,
                        len: self.functions.len(),
                    })
                });
                self.resume_at(function, continuation_offset);
                self.frames.push(callee);
                self.stats.function_calls += 1;
                self.note_depth();
            }
            Exit::CallBuiltin {
                builtin,
                continuation_offset,
            } => {
                self.stats.builtin_calls += 1;
                match builtin {
                    Builtin::GrowMemory => self.builtin_grow_memory(function)?,
                    Builtin::GrowStack => self.stack_grow()?,
                }
                self.resume_at(function, continuation_offset);
            }
            Exit::CallHost {
                index,
                continuation_offset,
            } => {
                let host = self.host_functions.get(index as usize).cloned().unwrap_or_else(|| {
                    self.fatal(ProtocolViolation::HostIndexOutOfRange {
                        index,
                        len: self.host_functions.len(),
                    })
                });
                self.stats.host_calls += 1;
                self.call_host(&host)?;
                self.resume_at(function, continuation_offset);
            }
        }
        Ok(())
    }

    /// Point the live frame at `offset` bytes past its function's entry.
    fn resume_at(&mut self, function: &CompiledFunction, offset: u64) {
        let address = function.address_at(offset).unwrap_or_else(|| {
            self.fatal(ProtocolViolation::ContinuationOutOfRange {
                offset,
                code_len: function.code().len(),
            })
        });
        if let Some(frame) = self.frames.live_mut() {
            frame.continuation_address = address;
        }
    }

    /// Run a host callback against the value stack.
    ///
    /// A callback that leaves `sp` beyond the stack fails the call and `sp`
    /// is put back where it was, whatever the callback returned.
    fn call_host(&mut self, host: &HostFunction) -> Result<()> {
        let sp_before = self.state.sp;
        let result = host.call(&mut StackView {
            slots: self.stack.as_mut_slice(),
            sp:    &mut self.state.sp,
        });

        if self.state.sp > self.stack.capacity() as u64 {
            tracing::warn!(
                host = host.name(),
                sp = self.state.sp,
                stack_len = self.stack.capacity(),
                "host function moved sp beyond the value stack"
            );
            self.state.sp = sp_before;
            return Err(Error::host_function_error(
                "Host function moved the stack pointer beyond the value stack",
            ));
        }
        result
    }

    /// The page count is popped before growing, so it is consumed even when
    /// the grow fails.
    fn builtin_grow_memory(&mut self, function: &CompiledFunction) -> Result<()> {
        let sp = self.sp();
        if sp == 0 {
            self.fatal(ProtocolViolation::MissingGrowMemoryOperand);
        }
        let pages = self.stack.as_slice()[sp - 1];
        self.state.sp -= 1;

        function.memory().lock().grow_bounded(pages, self.config.max_memory_pages)?;
        self.stats.memory_grows += 1;
        Ok(())
    }

    /// Double the value-stack capacity, keeping every slot and `sp`.
    pub fn stack_grow(&mut self) -> Result<()> {
        let capacity = self.stack.grow(self.config.max_stack_slots)?;
        self.state.stack_base = self.stack.as_mut_ptr() as u64;
        self.state.stack_len = capacity as u64;
        self.stats.stack_grows += 1;
        Ok(())
    }

    /// Push a value from the managed side, growing the stack when full
    pub fn push_value(&mut self, value: u64) -> Result<()> {
        if self.sp() == self.stack.capacity() {
            self.stack_grow()?;
        }
        let sp = self.sp();
        self.stack.as_mut_slice()[sp] = value;
        self.state.sp += 1;
        Ok(())
    }

    /// Pop a value from the managed side
    pub fn pop_value(&mut self) -> Result<u64> {
        let sp = self.sp();
        if sp == 0 {
            return Err(Error::stack_underflow("Value stack is empty"));
        }
        self.state.sp -= 1;
        Ok(self.stack.as_slice()[sp - 1])
    }

    /// Live slots, `[0, sp)`
    pub fn value_stack(&self) -> &[u64] {
        &self.stack.as_slice()[..self.sp()]
    }

    /// Value-stack capacity in slots
    pub fn stack_capacity(&self) -> usize {
        self.stack.capacity()
    }

    /// Index of the next free slot
    pub fn sp(&self) -> usize {
        self.state.sp as usize
    }

    /// Move the stack pointer
    pub fn set_sp(&mut self, sp: usize) -> Result<()> {
        if sp > self.stack.capacity() {
            return Err(Error::invalid_argument("Stack pointer beyond value stack"));
        }
        self.state.sp = sp as u64;
        Ok(())
    }

    /// The registers shared with generated code
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Number of live frames
    pub fn frame_depth(&self) -> usize {
        self.frames.depth()
    }

    /// Counters accumulated across every `exec`
    pub fn stats(&self) -> &ExecutionStats {
        &self.stats
    }

    /// The configuration in use
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The trampoline
    pub fn trampoline(&self) -> &T {
        &self.trampoline
    }

    /// The trampoline, mutably
    pub fn trampoline_mut(&mut self) -> &mut T {
        &mut self.trampoline
    }

    fn note_depth(&mut self) {
        self.stats.max_frame_depth = self.stats.max_frame_depth.max(self.frames.depth());
    }

    fn check_stack_pointer(&self) {
        if self.state.sp > self.stack.capacity() as u64 {
            self.fatal(ProtocolViolation::StackPointerOutOfRange {
                sp:        self.state.sp,
                stack_len: self.stack.capacity() as u64,
            });
        }
    }

    fn fatal(&self, violation: ProtocolViolation) -> ! {
        tracing::error!(%violation, depth = self.frames.depth(), "protocol violation");
        panic!("protocol violation: {violation}");
    }
}

impl<T: Trampoline> core::fmt::Debug for Engine<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .field("stack_capacity", &self.stack.capacity())
            .field("frame_depth", &self.frames.depth())
            .field("functions", &self.functions.len())
            .field("host_functions", &self.host_functions)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// Host callbacks see the engine's slots and stack pointer directly.
struct StackView<'a> {
    slots: &'a mut [u64],
    sp:    &'a mut u64,
}

impl HostContext for StackView<'_> {
    fn stack(&self) -> &[u64] {
        &*self.slots
    }

    fn stack_mut(&mut self) -> &mut [u64] {
        &mut *self.slots
    }

    fn sp(&self) -> usize {
        *self.sp as usize
    }

    fn set_sp(&mut self, sp: usize) {
        *self.sp = sp as u64;
    }
}
