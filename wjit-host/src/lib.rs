// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![forbid(unsafe_code)]

//! Host function infrastructure for the WJIT execution core.
//!
//! Generated code reaches the embedding application through an ordered
//! table of host callbacks addressed purely by index. A callback takes no
//! typed arguments; it reads and writes the engine's value stack through
//! [`HostContext`] instead.
//!
//! ## Usage
//!
//! ```rust
//! use wjit_host::{HostFunction, HostFunctionTable};
//!
//! let mut table = HostFunctionTable::new();
//! let index = table.register(HostFunction::multiply_top("scale", 3));
//! assert_eq!(index, 0);
//! assert_eq!(table.names().collect::<Vec<_>>(), vec!["scale"]);
//! ```

#![warn(missing_docs)]

pub mod context;
pub mod function;
pub mod table;

pub use context::HostContext;
pub use function::HostFunction;
pub use table::HostFunctionTable;
