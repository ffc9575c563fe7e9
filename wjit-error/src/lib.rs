// WJIT - wjit-error
// Module: WJIT Error Handling
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! WJIT Error handling library
//!
//! Every crate in the workspace reports failures through the single
//! [`Error`] type defined here. An error carries a category, a numeric code
//! and a static message, so it is `Copy` and never allocates.
//!
//! # Error Categories
//!
//! ## Memory Errors (4000-4999)
//! - Linear memory growth failures
//! - Managed-side out-of-bounds reads and writes
//!
//! ## Resource Errors (3000-3999)
//! - Allocation failure while growing the value stack or a memory
//! - Configured limits exceeded
//!
//! ## Runtime Errors (1000-1999, 2000-2999)
//! - Stack overflow past the configured maximum
//! - Invalid function index supplied to `exec`
//!
//! ## Validation Errors (5000-5999)
//! - Empty code segments
//! - Invalid configuration
//!
//! Protocol violations between generated code and the engine are *not*
//! represented here: they are bugs, and the engine panics on them.
//!
//! # Usage
//!
//! ```
//! use wjit_error::{codes, Error, ErrorCategory};
//!
//! let error = Error::new(
//!     ErrorCategory::Runtime,
//!     codes::INVALID_FUNCTION_INDEX,
//!     "Invalid function index",
//! );
//! assert!(error.is_runtime_error());
//!
//! let oom = Error::out_of_memory("Value stack allocation failed");
//! assert_eq!(oom.code, codes::OUT_OF_MEMORY);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Error codes for wjit
pub mod codes;
/// Error and error handling types
pub mod errors;

pub use errors::{Error, ErrorCategory};

/// A specialized `Result` type for WJIT operations.
pub type Result<T> = core::result::Result<T, Error>;
