// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Index-addressed host function table.
//!
//! Generated code names a host function only by its position in this table,
//! so registration order is part of the contract with the code generator.

use std::fmt;

use crate::function::HostFunction;

/// Ordered table of host callbacks
#[derive(Default, Clone)]
pub struct HostFunctionTable {
    functions: Vec<HostFunction>,
}

impl fmt::Debug for HostFunctionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostFunctionTable")
            .field("registered_functions", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

impl HostFunctionTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self { functions: Vec::new() }
    }

    /// The stand-in table used until a real host-call ABI exists:
    /// index 0 multiplies the top of stack by 100, index 1 by 200.
    #[must_use]
    pub fn with_scaling_placeholders() -> Self {
        let mut table = Self::new();
        table.register(HostFunction::multiply_top("multiply_by_100", 100));
        table.register(HostFunction::multiply_top("multiply_by_200", 200));
        table
    }

    /// Append a host function and return its index
    pub fn register(&mut self, function: HostFunction) -> usize {
        let index = self.functions.len();
        tracing::debug!(index, name = function.name(), "registered host function");
        self.functions.push(function);
        index
    }

    /// Host function at `index`, if registered
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&HostFunction> {
        self.functions.get(index)
    }

    /// Registered names in index order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().map(HostFunction::name)
    }

    /// Number of registered functions
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether no function is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
