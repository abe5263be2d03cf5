// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The gmqcc-rs contributors
// SPDX-FileName: crates/qcc/src/lower/expressions.rs
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
//! Store/Return/EntField/Member/Call lowering (spec §4.G).

use crate::ast::{CallExpr, EntFieldExpr, MemberExpr, ReturnExpr, ResultType, StoreExpr};
use crate::ir::{IrBuilder, ValueId};

use super::error::{LowerError, LowerResult};
use super::{lower_expr, LowerCx};

/// Lowers destination as an lvalue and source as an rvalue, emits the
/// declared store opcode, and returns whichever the caller asked for.
pub fn lower_store<B: IrBuilder>(cx: &mut LowerCx<'_, B>, expr: &StoreExpr, want_lvalue: bool) -> LowerResult<ValueId> {
    let dest = lower_expr(cx, &expr.dest, true)?;
    let src = lower_expr(cx, &expr.src, false)?;
    cx.ir.emit_store(cx.current_block, expr.op, dest, src)?;
    Ok(if want_lvalue { dest } else { src })
}

/// Lowers the operand as an rvalue and emits a return terminator on the
/// current block. `want_lvalue` plays no role: a `return` is always a
/// statement.
pub fn lower_return<B: IrBuilder>(cx: &mut LowerCx<'_, B>, expr: &ReturnExpr) -> LowerResult<ValueId> {
    let operand = match &expr.operand {
        Some(e) => Some(lower_expr(cx, e, false)?),
        None => None,
    };
    cx.ir.emit_return(cx.current_block, operand)?;
    match operand {
        Some(v) => Ok(v),
        None => Ok(cx.void_value()?),
    }
}

/// Lowers entity and field as rvalues; emits a field-address instruction
/// if the caller wants an lvalue, else a load-from-entity using the
/// node's declared result type (spec §4.G).
pub fn lower_ent_field<B: IrBuilder>(cx: &mut LowerCx<'_, B>, expr: &EntFieldExpr, want_lvalue: bool) -> LowerResult<ValueId> {
    let entity = lower_expr(cx, &expr.entity, false)?;
    let field = lower_expr(cx, &expr.field, false)?;
    log::trace!("lowering {}", cx.label(if want_lvalue { "efa" } else { "efv" }));
    if want_lvalue {
        Ok(cx.ir.emit_field_address(cx.current_block, entity, field, expr.base.result_type)?)
    } else {
        Ok(cx.ir.emit_load_from_entity(cx.current_block, entity, field, expr.base.result_type)?)
    }
}

/// Lowers owner as an lvalue, verifies its IR type is vector or
/// field-of-vector, and produces a synthetic vector-component value. No
/// instruction is emitted for this node kind (spec §4.G).
pub fn lower_member<B: IrBuilder>(cx: &mut LowerCx<'_, B>, expr: &MemberExpr) -> LowerResult<ValueId> {
    let owner = lower_expr(cx, &expr.owner, true)?;
    let owner_type = cx.ir.value_type(owner)?;
    if !matches!(owner_type, ResultType::Vector | ResultType::Field) {
        return Err(LowerError::UnsupportedFeature("member access on a non-vector/field-of-vector IR value"));
    }
    Ok(cx.ir.extract_vector_component(owner, expr.index, expr.base.result_type)?)
}

/// Lowers callee and arguments as rvalues, emits a call instruction, and
/// attaches each argument in order. On any failure the partially built
/// call is deleted before the error propagates, so a failed call never
/// leaves a half-wired instruction in the IR.
pub fn lower_call<B: IrBuilder>(cx: &mut LowerCx<'_, B>, expr: &CallExpr) -> LowerResult<ValueId> {
    let callee = lower_expr(cx, &expr.callee, false)?;
    let mut args = Vec::with_capacity(expr.args.len());
    for arg in &expr.args {
        args.push(lower_expr(cx, arg, false)?);
    }
    log::trace!("lowering {}", cx.label("call"));
    let call = cx.ir.emit_call(cx.current_block, callee, expr.base.result_type)?;
    for arg in args {
        if let Err(err) = cx.ir.attach_argument(call, arg) {
            let _ = cx.ir.delete_value(call);
            return Err(err.into());
        }
    }
    Ok(call)
}
