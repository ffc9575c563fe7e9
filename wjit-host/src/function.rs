//! Host function implementation for the execution core.
//!
//! This module provides the callback type stored in the host table.

use std::{fmt, sync::Arc};

use wjit_error::Result;

use crate::context::HostContext;

/// Signature every host callback is erased to.
type Handler = dyn Fn(&mut dyn HostContext) -> Result<()> + Send + Sync;

/// A named, cheaply cloneable host callback.
#[derive(Clone)]
pub struct HostFunction {
    name:    String,
    handler: Arc<Handler>,
}

impl HostFunction {
    /// Creates a new `HostFunction` from a closure.
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut dyn HostContext) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name:    name.into(),
            handler: Arc::new(handler),
        }
    }

    /// Callback that multiplies the top of the value stack by `factor`.
    ///
    /// Multiplication wraps, matching 64-bit integer semantics of the slots.
    pub fn multiply_top(name: impl Into<String>, factor: u64) -> Self {
        Self::new(name, move |ctx| {
            let value = ctx.peek()?;
            ctx.set_top(value.wrapping_mul(factor))
        })
    }

    /// Name the function was registered under
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calls the wrapped function.
    pub fn call(&self, ctx: &mut dyn HostContext) -> Result<()> {
        (self.handler)(ctx)
    }
}

impl fmt::Debug for HostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostFunction").field("name", &self.name).finish_non_exhaustive()
    }
}
