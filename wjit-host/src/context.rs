//! Value-stack access handed to host callbacks.

use wjit_error::{Error, Result};

/// The view of the engine a host callback runs against.
///
/// `stack_mut` exposes the whole backing buffer, not just the live slots, so
/// callbacks see exactly what generated code sees. Slots at and above
/// [`HostContext::sp`] hold stale values.
pub trait HostContext {
    /// All slots of the value stack.
    fn stack(&self) -> &[u64];

    /// All slots of the value stack, mutably.
    fn stack_mut(&mut self) -> &mut [u64];

    /// Index of the next free slot.
    fn sp(&self) -> usize;

    /// Move the stack pointer. Must not exceed `stack().len()`.
    fn set_sp(&mut self, sp: usize);

    /// Value on top of the stack.
    fn peek(&self) -> Result<u64> {
        match self.sp() {
            0 => Err(Error::stack_underflow("Host function read an empty value stack")),
            sp => Ok(self.stack()[sp - 1]),
        }
    }

    /// Overwrite the value on top of the stack.
    fn set_top(&mut self, value: u64) -> Result<()> {
        match self.sp() {
            0 => Err(Error::stack_underflow("Host function wrote an empty value stack")),
            sp => {
                self.stack_mut()[sp - 1] = value;
                Ok(())
            }
        }
    }

    /// Remove and return the value on top of the stack.
    fn pop(&mut self) -> Result<u64> {
        let value = self.peek()?;
        self.set_sp(self.sp() - 1);
        Ok(value)
    }

    /// Push a value. Fails instead of growing when the stack is full.
    fn push(&mut self, value: u64) -> Result<()> {
        let sp = self.sp();
        if sp >= self.stack().len() {
            return Err(Error::stack_overflow("Host function pushed onto a full value stack"));
        }
        self.stack_mut()[sp] = value;
        self.set_sp(sp + 1);
        Ok(())
    }
}
