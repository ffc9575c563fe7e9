// WJIT - wjit-error
// Module: WJIT Error Codes
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Error codes for WJIT

// Core error codes (1000-1999)
/// Stack underflow error
pub const STACK_UNDERFLOW: u16 = 1000;
/// Stack overflow error
pub const STACK_OVERFLOW: u16 = 1001;

// Function error codes (2000-2999)
/// Invalid function index error
pub const INVALID_FUNCTION_INDEX: u16 = 2000;
/// Host function failed
pub const HOST_FUNCTION_ERROR: u16 = 2010;

// Resource error codes (3000-3999)
/// Out of memory error
pub const OUT_OF_MEMORY: u16 = 3010;

// Memory error codes (4000-4999)
/// Memory out of bounds error
pub const MEMORY_OUT_OF_BOUNDS: u16 = 4000;

// Validation error codes (5000-5999)
/// Invalid argument error
pub const INVALID_ARGUMENT: u16 = 5002;
/// Compiled function has no code
pub const EMPTY_CODE_SEGMENT: u16 = 5030;

// Configuration error codes (8000-8999)
/// Configuration value could not be parsed or is inconsistent
pub const CONFIG_ERROR: u16 = 8000;
