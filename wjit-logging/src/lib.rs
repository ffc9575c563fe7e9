//! # WJIT Logging
//!
//! Logging infrastructure for the WJIT execution core.
//!
//! The runtime emits structured events through `tracing`; this crate owns
//! the level vocabulary shared with configuration and the one-call
//! subscriber setup an embedder uses to see those events.

// WJIT - wjit-logging
// Module: Logging Infrastructure
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use wjit_error::{Error, Result};

/// Log level definitions for categorizing message severity.
pub mod level;

/// Subscriber installation and output formats.
pub mod subscriber;

pub use level::LogLevel;
pub use subscriber::{init_tracing, LogFormat};
