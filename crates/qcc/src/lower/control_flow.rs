// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The gmqcc-rs contributors
// SPDX-FileName: crates/qcc/src/lower/control_flow.rs
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
//! IfThen, Ternary, and Loop lowering (spec §4.G) — the hardest
//! subsystem: correct basic-block construction, phi insertion, and block
//! reordering for composite loops.

use crate::ast::{IfThenExpr, LoopExpr, TernaryExpr};
use crate::ir::{BlockId, IrBuilder, ValueId};

use super::error::{LowerError, LowerResult};
use super::{lower_expr, LowerCx};

/// Emits a jump from `from` to `target` unless `from` is already
/// terminated (a branch that ended in `return` must not also jump to the
/// merge block — spec §8 scenario 2: "`endif` is unreachable but
/// present").
fn jump_unless_terminated<B: IrBuilder>(cx: &mut LowerCx<'_, B>, from: BlockId, target: BlockId) -> LowerResult<()> {
    if !cx.ir.is_terminated(from)? {
        cx.ir.emit_jump(from, target)?;
    }
    Ok(())
}

pub fn lower_if_then<B: IrBuilder>(cx: &mut LowerCx<'_, B>, expr: &IfThenExpr) -> LowerResult<ValueId> {
    let cond = lower_expr(cx, &expr.condition, false)?;
    let cond_block = cx.current_block;

    let lower_branch = |cx: &mut LowerCx<'_, B>, prefix: &str, branch: &Option<Box<crate::ast::Expr>>| {
        branch.as_ref().map_or(Ok(None), |b| -> LowerResult<_> {
            let label = cx.label(prefix);
            let block = cx.ir.create_block(cx.function_id, &label)?;
            cx.current_block = block;
            lower_expr(cx, b, false)?;
            Ok(Some((block, cx.current_block)))
        })
    };

    let true_branch = lower_branch(cx, "ontrue", &expr.on_true)?;
    let false_branch = lower_branch(cx, "onfalse", &expr.on_false)?;

    let merge_label = cx.label("endif");
    let merge = cx.ir.create_block(cx.function_id, &merge_label)?;

    if let Some((_, end)) = true_branch {
        jump_unless_terminated(cx, end, merge)?;
    }
    if let Some((_, end)) = false_branch {
        jump_unless_terminated(cx, end, merge)?;
    }

    let true_target = true_branch.map_or(merge, |(start, _)| start);
    let false_target = false_branch.map_or(merge, |(start, _)| start);
    cx.ir.emit_conditional_branch(cond_block, cond, true_target, false_target)?;

    cx.current_block = merge;
    Ok(cx.void_value()?)
}

pub fn lower_ternary<B: IrBuilder>(cx: &mut LowerCx<'_, B>, expr: &TernaryExpr) -> LowerResult<ValueId> {
    if let Some(cached) = expr.base.out_l.get() {
        return Ok(cached);
    }

    let cond = lower_expr(cx, &expr.condition, false)?;
    let cond_block = cx.current_block;

    let true_block = cx.ir.create_block(cx.function_id, &cx.label("tern_T"))?;
    cx.current_block = true_block;
    let true_val = lower_expr(cx, &expr.on_true, false)?;
    let end_true = cx.current_block;

    let false_block = cx.ir.create_block(cx.function_id, &cx.label("tern_F"))?;
    cx.current_block = false_block;
    let false_val = lower_expr(cx, &expr.on_false, false)?;
    let end_false = cx.current_block;

    let true_type = cx.ir.value_type(true_val)?;
    let false_type = cx.ir.value_type(false_val)?;
    if true_type != false_type {
        return Err(LowerError::TypeMismatchAtPhi { location: expr.base.source_info, on_true: true_type, on_false: false_type });
    }

    let merge = cx.ir.create_block(cx.function_id, &cx.label("tern_out"))?;
    jump_unless_terminated(cx, end_true, merge)?;
    jump_unless_terminated(cx, end_false, merge)?;
    cx.ir.emit_conditional_branch(cond_block, cond, true_block, false_block)?;

    let phi = cx.ir.create_phi(merge, true_type)?;
    cx.ir.add_incoming(phi, end_true, true_val)?;
    cx.ir.add_incoming(phi, end_false, false_val)?;

    cx.current_block = merge;
    expr.base.out_l.set(Some(phi));
    Ok(phi)
}

pub fn lower_loop<B: IrBuilder>(cx: &mut LowerCx<'_, B>, expr: &LoopExpr) -> LowerResult<ValueId> {
    if let Some(init) = &expr.init {
        lower_expr(cx, init, false)?;
    }
    let bin = cx.current_block;

    let bprecond = expr.precond.is_some().then(|| cx.ir.create_block(cx.function_id, &cx.label("pre_loop_cond"))).transpose()?;
    let bbody = expr.body.is_some().then(|| cx.ir.create_block(cx.function_id, &cx.label("loop_body"))).transpose()?;
    let bincrement = expr.increment.is_some().then(|| cx.ir.create_block(cx.function_id, &cx.label("loop_increment"))).transpose()?;
    let bpostcond = expr.postcond.is_some().then(|| cx.ir.create_block(cx.function_id, &cx.label("post_loop_cond"))).transpose()?;
    let bout = cx.ir.create_block(cx.function_id, &cx.label("after_loop"))?;

    let bbreak = bout;
    let bcontinue = bpostcond.or(bincrement).or(bprecond).unwrap_or(bout);

    let (end_bprecond, precond_val) = if let (Some(block), Some(precond)) = (bprecond, &expr.precond) {
        cx.current_block = block;
        let v = lower_expr(cx, precond, false)?;
        (Some(cx.current_block), Some(v))
    } else {
        (None, None)
    };

    let end_bbody = if let (Some(block), Some(body)) = (bbody, &expr.body) {
        cx.current_block = block;
        cx.with_loop_targets(bbreak, bcontinue, |cx| -> LowerResult<BlockId> {
            lower_expr(cx, body, false)?;
            Ok(cx.current_block)
        })
        .map(Some)?
    } else {
        None
    };

    let end_bincrement = if let (Some(block), Some(increment)) = (bincrement, &expr.increment) {
        cx.current_block = block;
        lower_expr(cx, increment, false)?;
        Some(cx.current_block)
    } else {
        None
    };

    let (end_bpostcond, postcond_val) = if let (Some(block), Some(postcond)) = (bpostcond, &expr.postcond) {
        cx.current_block = block;
        let v = lower_expr(cx, postcond, false)?;
        (Some(cx.current_block), Some(v))
    } else {
        (None, None)
    };

    let bin_target = bprecond.or(bbody).or(bpostcond).unwrap_or(bout);
    cx.ir.emit_jump(bin, bin_target)?;

    if let Some(end) = end_bprecond {
        let true_target = bbody.or(bincrement).or(bpostcond).or(bprecond).unwrap_or(bout);
        cx.ir.emit_conditional_branch(end, precond_val.expect("precond lowered alongside end_bprecond"), true_target, bout)?;
    }
    if let Some(end) = end_bbody {
        jump_unless_terminated(cx, end, bincrement.or(bpostcond).or(bprecond).unwrap_or(bout))?;
    }
    if let Some(end) = end_bincrement {
        jump_unless_terminated(cx, end, bpostcond.or(bprecond).or(bbody).unwrap_or(bout))?;
    }
    if let Some(end) = end_bpostcond {
        let true_target = bprecond.or(bbody).or(bincrement).or(bpostcond).unwrap_or(bout);
        cx.ir.emit_conditional_branch(end, postcond_val.expect("postcond lowered alongside end_bpostcond"), true_target, bout)?;
    }

    // Move `bout` to the end of the function's block list so layout
    // matches textual flow (spec §4.G step 7) — lowering the body slot
    // above may have created its own nested blocks that now sit after
    // `bout` in creation order.
    let bout_index = cx.ir.block_position(cx.function_id, bout)?;
    let removed = cx.ir.remove_block_at_index(cx.function_id, bout_index)?;
    cx.ir.append_block(cx.function_id, removed)?;

    cx.current_block = bout;
    Ok(cx.void_value()?)
}
