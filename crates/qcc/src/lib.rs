// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The gmqcc-rs contributors
// SPDX-FileName: crates/qcc/src/lib.rs
// SPDX-FileType: SOURCE
// SPDX-License-Identifier: Apache-2.0
// -------------------------------------------------------------------------
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
// -------------------------------------------------------------------------
//! AST and lowering pass for a QuakeC-style stack/register bytecode
//! compiler.
//!
//! This crate provides the tree the (out-of-scope) parser builds, and the
//! pass that walks it to drive an [`ir::IrBuilder`] toward an in-memory
//! control-flow graph: function declarations and control flow (`if`,
//! ternary, composite `for`/`while`/`do-while` loops).

/// Version of the qcc crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod ast;
pub mod common;
pub mod driver;
pub mod ir;
pub mod lower;
