//! Scripted stand-in for generated code.
//!
//! Instead of jumping to native code, [`ScriptedTrampoline`] looks the entry
//! address up in a table of actions. Actions talk to the engine only through
//! the raw register pointer and memory base, the way real generated code
//! would.

#![allow(dead_code)]

use std::collections::HashMap;

use wjit_runtime::{
    Builtin, CompiledFunction, Engine, EngineConfig, EngineState, MemoryInstance, SharedMemory,
    StatusCode, Trampoline,
};

/// Register access for one scripted step
pub struct Registers<'a> {
    pub state:  &'a mut EngineState,
    pub memory: *mut u8,
}

impl Registers<'_> {
    pub fn ret(&mut self) {
        self.state.status = StatusCode::Returned as u32;
    }

    pub fn call(&mut self, index: u32, resume: u64) {
        self.exit(StatusCode::CallFunction, index, resume);
    }

    pub fn builtin(&mut self, builtin: Builtin, resume: u64) {
        self.exit(StatusCode::CallBuiltInFunction, builtin as u32, resume);
    }

    pub fn host(&mut self, index: u32, resume: u64) {
        self.exit(StatusCode::CallHostFunction, index, resume);
    }

    fn exit(&mut self, status: StatusCode, index: u32, resume: u64) {
        self.state.status = status as u32;
        self.state.call_target_index = index;
        self.state.continuation_offset = resume;
    }

    pub fn push(&mut self, value: u64) {
        let sp = self.state.sp;
        assert!(sp < self.state.stack_len, "scripted push onto a full value stack");
        // SAFETY: `stack_base` addresses `stack_len` slots for this entry.
        unsafe { (self.state.stack_base as *mut u64).add(sp as usize).write(value) };
        self.state.sp += 1;
    }

    pub fn slots(&self) -> Vec<u64> {
        // SAFETY: as in `push`; slots below `sp` are initialised.
        unsafe {
            core::slice::from_raw_parts(self.state.stack_base as *const u64, self.state.sp as usize)
        }
        .to_vec()
    }

    /// # Safety
    ///
    /// `offset` must be inside the live function's memory.
    pub unsafe fn store_byte(&mut self, offset: usize, value: u8) {
        // SAFETY: upheld by the caller.
        unsafe { self.memory.add(offset).write(value) };
    }
}

type Action = Box<dyn FnMut(&mut Registers<'_>)>;

/// Trampoline that runs scripted actions keyed by address
#[derive(Default)]
pub struct ScriptedTrampoline {
    actions:     HashMap<usize, Action>,
    /// Every address entered, in order
    pub entries: Vec<usize>,
}

impl ScriptedTrampoline {
    pub fn on(
        &mut self,
        address: usize,
        action: impl FnMut(&mut Registers<'_>) + 'static,
    ) -> &mut Self {
        self.actions.insert(address, Box::new(action));
        self
    }
}

impl Trampoline for ScriptedTrampoline {
    unsafe fn enter(&mut self, entry: usize, state: *mut EngineState, memory: *mut u8) {
        self.entries.push(entry);
        let action = self
            .actions
            .get_mut(&entry)
            .unwrap_or_else(|| panic!("no scripted action at {entry:#x}"));
        // SAFETY: `enter` guarantees `state` is valid and unaliased for the call.
        let state = unsafe { &mut *state };
        action(&mut Registers { state, memory });
    }
}

pub fn engine() -> Engine<ScriptedTrampoline> {
    Engine::new(ScriptedTrampoline::default()).unwrap()
}

pub fn engine_with(config: EngineConfig) -> Engine<ScriptedTrampoline> {
    Engine::with_config(ScriptedTrampoline::default(), config).unwrap()
}

/// Register a function of `code_len` bytes with its own memory, returning
/// its index, entry address and memory.
pub fn add_function(
    engine: &mut Engine<ScriptedTrampoline>,
    code_len: usize,
) -> (usize, usize, SharedMemory) {
    let memory = MemoryInstance::new().into_shared();
    let function = CompiledFunction::new(vec![0xCC; code_len], memory.clone()).unwrap();
    let index = engine.register_function(function);
    let entry = engine.function(index).unwrap().initial_address();
    (index, entry, memory)
}
