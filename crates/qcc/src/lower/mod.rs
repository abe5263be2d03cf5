// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The gmqcc-rs contributors
// SPDX-FileName: crates/qcc/src/lower/mod.rs
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
//! The lowering pass (component G): the traversal that consumes the AST
//! and drives an [`crate::ir::IrBuilder`], one routine per node kind, all
//! sharing the `(node, function, want_lvalue) -> out_value` shape spec
//! §4.G describes.

pub mod context;
pub mod control_flow;
pub mod error;
pub mod expressions;
pub mod function;
pub mod operations;
pub mod statements;
pub mod values;

pub use context::LowerCx;
pub use error::{LowerError, LowerResult};
pub use function::lower_function;
pub use values::lower_global;

use crate::ast::Expr;
use crate::ir::{IrBuilder, ValueId};

/// Lowers a single expression node, dispatching on its concrete kind.
/// `want_lvalue` is honored only by the node kinds whose semantics
/// actually distinguish an assignable location from a materialized
/// value (`Store`, `EntField`, `Member`); every other kind lowers its
/// children as rvalues regardless, per spec §4.G.
pub fn lower_expr<B: IrBuilder>(cx: &mut LowerCx<'_, B>, expr: &Expr, want_lvalue: bool) -> LowerResult<ValueId> {
    match expr {
        Expr::Binary(e) => operations::lower_binary(cx, e),
        Expr::Unary(e) => operations::lower_unary(cx, e),
        Expr::Store(e) => expressions::lower_store(cx, e, want_lvalue),
        Expr::Return(e) => expressions::lower_return(cx, e),
        Expr::EntField(e) => expressions::lower_ent_field(cx, e, want_lvalue),
        Expr::Member(e) => expressions::lower_member(cx, e),
        Expr::Call(e) => expressions::lower_call(cx, e),
        Expr::Block(e) => statements::lower_block(cx, e),
        Expr::IfThen(e) => control_flow::lower_if_then(cx, e),
        Expr::Ternary(e) => control_flow::lower_ternary(cx, e),
        Expr::Loop(e) => control_flow::lower_loop(cx, e),
        Expr::Value(v) => values::read_value(v),
    }
}
