//! Call frames for the trampoline loop
//!
//! Frames live in one growable array. Each frame records the index of the
//! frame that was live when it was pushed, so the chain is strictly LIFO and
//! acyclic by construction.

use std::sync::Arc;

use crate::func::CompiledFunction;

/// One activation record
#[derive(Debug, Clone)]
pub struct CallFrame {
    /// Absolute address to resume at on the next trampoline entry
    pub continuation_address: usize,
    function:                 Arc<CompiledFunction>,
    parent:                   Option<usize>,
}

impl CallFrame {
    /// The compiled function this frame executes
    pub fn function(&self) -> &Arc<CompiledFunction> {
        &self.function
    }

    /// Index of the calling frame, `None` for the root frame
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }
}

/// The live frame chain
#[derive(Debug, Default)]
pub struct CallStack {
    frames: Vec<CallFrame>,
}

impl CallStack {
    /// Create an empty call stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a frame that starts at `function`'s entry and make it live.
    pub fn push(&mut self, function: Arc<CompiledFunction>) -> &mut CallFrame {
        let parent = self.frames.len().checked_sub(1);
        self.frames.push(CallFrame {
            continuation_address: function.initial_address(),
            function,
            parent,
        });

        let index = self.frames.len() - 1;
        &mut self.frames[index]
    }

    /// Unlink the live frame; its parent becomes live.
    pub fn pop(&mut self) -> Option<CallFrame> {
        let frame = self.frames.pop()?;
        debug_assert_eq!(frame.parent, self.frames.len().checked_sub(1));
        Some(frame)
    }

    /// The live frame
    pub fn live(&self) -> Option<&CallFrame> {
        self.frames.last()
    }

    /// The live frame, mutably
    pub fn live_mut(&mut self) -> Option<&mut CallFrame> {
        self.frames.last_mut()
    }

    /// Number of live frames
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Whether no frame is live
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Drop every frame
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}
