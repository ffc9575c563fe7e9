// WJIT - wjit-error
// Module: WJIT Error Types
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

/// Unified error type for the execution core
use core::fmt;

use crate::codes;

/// `Error` categories for WJIT operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCategory {
    /// Core execution errors
    Core       = 1,
    /// Resource errors (allocation, limits)
    Resource   = 3,
    /// Memory errors
    Memory     = 4,
    /// Validation errors
    Validation = 5,
    /// Runtime errors (general)
    Runtime    = 7,
    /// Parameter-related errors (invalid arguments, malformed configuration)
    Parameter  = 18,
}

/// WJIT `Error` type
///
/// Categorised errors with a numeric code and a static message.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Error {
    /// `Error` category
    pub category: ErrorCategory,
    /// `Error` code
    pub code:     u16,
    /// `Error` message
    pub message:  &'static str,
}

impl Error {
    /// Create a new error.
    #[must_use]
    pub const fn new(category: ErrorCategory, code: u16, message: &'static str) -> Self {
        Self {
            category,
            code,
            message,
        }
    }

    /// Check if this is a resource error
    #[must_use]
    pub fn is_resource_error(&self) -> bool {
        self.category == ErrorCategory::Resource
    }

    /// Check if this is a memory error
    #[must_use]
    pub fn is_memory_error(&self) -> bool {
        self.category == ErrorCategory::Memory
    }

    /// Check if this is a validation error
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        self.category == ErrorCategory::Validation
    }

    /// Check if this is a runtime error
    #[must_use]
    pub fn is_runtime_error(&self) -> bool {
        self.category == ErrorCategory::Runtime
    }

    /// Allocation failed or a configured size limit was reached
    #[must_use]
    pub const fn out_of_memory(message: &'static str) -> Self {
        Self::new(ErrorCategory::Resource, codes::OUT_OF_MEMORY, message)
    }

    /// The value stack may not grow any further
    #[must_use]
    pub const fn stack_overflow(message: &'static str) -> Self {
        Self::new(ErrorCategory::Runtime, codes::STACK_OVERFLOW, message)
    }

    /// Create a memory out of bounds error
    #[must_use]
    pub const fn memory_out_of_bounds(message: &'static str) -> Self {
        Self::new(ErrorCategory::Memory, codes::MEMORY_OUT_OF_BOUNDS, message)
    }

    /// Create an invalid function index error
    #[must_use]
    pub const fn invalid_function_index(message: &'static str) -> Self {
        Self::new(ErrorCategory::Runtime, codes::INVALID_FUNCTION_INDEX, message)
    }

    /// Create a host function error
    #[must_use]
    pub const fn host_function_error(message: &'static str) -> Self {
        Self::new(ErrorCategory::Runtime, codes::HOST_FUNCTION_ERROR, message)
    }

    /// Create a runtime stack underflow error
    #[must_use]
    pub const fn stack_underflow(message: &'static str) -> Self {
        Self::new(ErrorCategory::Core, codes::STACK_UNDERFLOW, message)
    }

    /// Create an empty code segment error
    #[must_use]
    pub const fn empty_code_segment(message: &'static str) -> Self {
        Self::new(ErrorCategory::Validation, codes::EMPTY_CODE_SEGMENT, message)
    }

    /// Create an invalid argument error
    #[must_use]
    pub const fn invalid_argument(message: &'static str) -> Self {
        Self::new(ErrorCategory::Parameter, codes::INVALID_ARGUMENT, message)
    }

    /// Create a configuration error
    #[must_use]
    pub const fn config_error(message: &'static str) -> Self {
        Self::new(ErrorCategory::Parameter, codes::CONFIG_ERROR, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}][E{:04X}] {}", self.category, self.code, self.message)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = Error::out_of_memory("Memory grow failed");
        assert_eq!(error.to_string(), "[Resource][E0BC2] Memory grow failed");
    }

    #[test]
    fn test_error_category_predicates() {
        assert!(Error::out_of_memory("oom").is_resource_error());
        assert!(Error::stack_overflow("full").is_runtime_error());
        assert!(Error::memory_out_of_bounds("oob").is_memory_error());
        assert!(Error::empty_code_segment("empty").is_validation_error());
        assert!(!Error::config_error("bad").is_runtime_error());
    }
}
