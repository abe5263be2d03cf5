// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The gmqcc-rs contributors
// SPDX-FileName: crates/qcc/src/lower/operations.rs
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
//! Binary/Unary lowering (spec §4.G): children always lower as rvalues,
//! the lvalue flag plays no role here.

use crate::ast::{BinaryExpr, UnaryExpr};
use crate::ir::{IrBuilder, ValueId};

use super::error::LowerResult;
use super::{lower_expr, LowerCx};

pub fn lower_binary<B: IrBuilder>(cx: &mut LowerCx<'_, B>, expr: &BinaryExpr) -> LowerResult<ValueId> {
    let lhs = lower_expr(cx, &expr.lhs, false)?;
    let rhs = lower_expr(cx, &expr.rhs, false)?;
    log::trace!("lowering {}", cx.label("bin"));
    Ok(cx.ir.emit_binop(cx.current_block, expr.op, lhs, rhs, expr.base.result_type)?)
}

pub fn lower_unary<B: IrBuilder>(cx: &mut LowerCx<'_, B>, expr: &UnaryExpr) -> LowerResult<ValueId> {
    let operand = lower_expr(cx, &expr.operand, false)?;
    log::trace!("lowering {}", cx.label("unary"));
    Ok(cx.ir.emit_unary(cx.current_block, expr.op, operand, expr.base.result_type)?)
}
