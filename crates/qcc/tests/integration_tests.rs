// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The gmqcc-rs contributors
// SPDX-FileName: crates/qcc/tests/integration_tests.rs
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
//! End-to-end lowering scenarios, exercised through the public AST and
//! `IrBuilder` surface rather than any internal module.

use qcc::ast::{
    BinOpcode,
    BinaryExpr,
    CallExpr,
    ConstPayload,
    Expr,
    FunctionNode,
    IfThenExpr,
    LoopExpr,
    ReturnExpr,
    ResultType,
    StoreExpr,
    StoreOpcode,
    TernaryExpr,
    ValueNode,
};
use qcc::common::SourceInfo;
use qcc::ir::memory::MemoryIr;
use qcc::ir::IrBuilder;
use qcc::lower::{lower_expr, lower_global, LowerCx};

fn float_const(name: &str, v: f64) -> qcc::ast::ValueRef {
    let value = ValueNode::new(SourceInfo::synthetic(), Some(name.into()), ResultType::Float);
    value.borrow_mut().is_const = true;
    value.borrow_mut().constant = Some(ConstPayload::Float(v));
    value
}

fn float_var(name: &str) -> qcc::ast::ValueRef {
    ValueNode::new(SourceInfo::synthetic(), Some(name.into()), ResultType::Float)
}

/// Builds a fresh function with one block and returns everything a test
/// needs to lower expressions into it.
fn harness(ir: &mut MemoryIr) -> (qcc::ir::FunctionId, LowerCx<'_, MemoryIr>) {
    let fv = ir.create_function("f", ResultType::Void).unwrap();
    let function_id = ir.function_of(fv).unwrap();
    let entry = ir.create_block(function_id, "entry").unwrap();
    let sig = ValueNode::new(SourceInfo::synthetic(), Some("f".into()), ResultType::Function);
    let function = FunctionNode::new("f", sig, SourceInfo::synthetic()).unwrap();
    (function_id, LowerCx::new(ir, function_id, function, entry))
}

#[test]
fn scenario_1_simple_assignment() {
    let mut ir = MemoryIr::new();
    let (function_id, mut cx) = harness(&mut ir);

    let a = float_var("a");
    let b = float_var("b");
    let c = float_var("c");
    lower_global(cx.ir, &a).unwrap();
    lower_global(cx.ir, &b).unwrap();
    lower_global(cx.ir, &c).unwrap();

    let sum = BinaryExpr::new(SourceInfo::synthetic(), BinOpcode::Add, Box::new(Expr::Value(b)), Box::new(Expr::Value(c)));
    let store = StoreExpr::new(SourceInfo::synthetic(), StoreOpcode::Assign, Box::new(Expr::Value(a.clone())), Box::new(Expr::Binary(sum)));

    let out_lvalue = lower_expr(&mut cx, &Expr::Store(store), true).unwrap();
    assert_eq!(out_lvalue, a.borrow().ir_value.unwrap());
    assert_eq!(cx.ir.block_order(function_id).unwrap().len(), 1); // a straight-line block, no branching
}

#[test]
fn scenario_2_if_with_both_branches() {
    let mut ir = MemoryIr::new();
    let (function_id, mut cx) = harness(&mut ir);

    let cond = float_var("cond");
    lower_global(cx.ir, &cond).unwrap();

    let one = float_const("", 1.0);
    let two = float_const("", 2.0);
    let if_then = IfThenExpr::new(
        SourceInfo::synthetic(),
        Box::new(Expr::Value(cond)),
        Some(Box::new(Expr::Return(ReturnExpr::new(SourceInfo::synthetic(), Some(Box::new(Expr::Value(one))))))),
        Some(Box::new(Expr::Return(ReturnExpr::new(SourceInfo::synthetic(), Some(Box::new(Expr::Value(two))))))),
    )
    .unwrap();

    lower_expr(&mut cx, &Expr::IfThen(if_then), false).unwrap();

    let order = cx.ir.block_order(function_id).unwrap();
    assert_eq!(order.len(), 4); // cond, ontrue, onfalse, endif
    let (cond_block, ontrue, onfalse, endif) = (order[0], order[1], order[2], order[3]);
    for block in [ontrue, onfalse] {
        assert!(cx.ir.is_terminated(block).unwrap()); // each branch returns
    }
    assert!(!cx.ir.is_terminated(endif).unwrap()); // unreachable, but present
    assert!(cx.ir.is_terminated(cond_block).unwrap()); // the conditional branch itself
}

#[test]
fn scenario_3_if_with_only_on_true() {
    let mut ir = MemoryIr::new();
    let (function_id, mut cx) = harness(&mut ir);

    let cond = float_var("cond");
    let a = float_var("a");
    lower_global(cx.ir, &cond).unwrap();
    lower_global(cx.ir, &a).unwrap();
    let one = float_const("", 1.0);

    let store = StoreExpr::new(SourceInfo::synthetic(), StoreOpcode::Assign, Box::new(Expr::Value(a)), Box::new(Expr::Value(one)));
    let if_then = IfThenExpr::new(SourceInfo::synthetic(), Box::new(Expr::Value(cond)), Some(Box::new(Expr::Store(store))), None).unwrap();

    lower_expr(&mut cx, &Expr::IfThen(if_then), false).unwrap();

    let order = cx.ir.block_order(function_id).unwrap();
    assert_eq!(order.len(), 3); // cond, ontrue, endif
    assert!(cx.ir.is_terminated(order[1]).unwrap()); // ontrue jumps to endif
}

#[test]
fn scenario_4_ternary_caches_its_phi() {
    let mut ir = MemoryIr::new();
    let (function_id, mut cx) = harness(&mut ir);

    let cond = float_var("cond");
    let x = float_var("x");
    let y = float_var("y");
    lower_global(cx.ir, &cond).unwrap();
    lower_global(cx.ir, &x).unwrap();
    lower_global(cx.ir, &y).unwrap();

    let ternary = TernaryExpr::new(
        SourceInfo::synthetic(),
        Box::new(Expr::Value(cond)),
        Some(Box::new(Expr::Value(x))),
        Some(Box::new(Expr::Value(y))),
    )
    .unwrap();
    let ternary = Expr::Ternary(ternary);

    let first = lower_expr(&mut cx, &ternary, false).unwrap();
    let second = lower_expr(&mut cx, &ternary, false).unwrap();
    assert_eq!(first, second); // idempotent via the phi cache

    let order = cx.ir.block_order(function_id).unwrap();
    assert_eq!(order.len(), 4); // cond, tern_T, tern_F, tern_out
}

#[test]
fn scenario_5_for_like_loop_reorders_blocks() {
    let mut ir = MemoryIr::new();
    let (function_id, mut cx) = harness(&mut ir);

    let i = float_var("i");
    lower_global(cx.ir, &i).unwrap();
    let zero = float_const("", 0.0);
    let ten = float_const("", 10.0);
    let one = float_const("", 1.0);
    let print = ValueNode::new(SourceInfo::synthetic(), Some("print".into()), ResultType::Function);
    lower_global(cx.ir, &print).unwrap();

    let init = Box::new(Expr::Store(StoreExpr::new(
        SourceInfo::synthetic(),
        StoreOpcode::Assign,
        Box::new(Expr::Value(i.clone())),
        Box::new(Expr::Value(zero)),
    )));
    let precond = Box::new(Expr::Binary(BinaryExpr::new(
        SourceInfo::synthetic(),
        BinOpcode::Lt,
        Box::new(Expr::Value(i.clone())),
        Box::new(Expr::Value(ten)),
    )));
    let increment = Box::new(Expr::Store(StoreExpr::new(
        SourceInfo::synthetic(),
        StoreOpcode::Assign,
        Box::new(Expr::Value(i.clone())),
        Box::new(Expr::Binary(BinaryExpr::new(SourceInfo::synthetic(), BinOpcode::Add, Box::new(Expr::Value(i)), Box::new(Expr::Value(one))))),
    )));
    let body = Box::new(Expr::Call(CallExpr::new(SourceInfo::synthetic(), Box::new(Expr::Value(print)), Vec::new())));

    let loop_expr = Expr::Loop(LoopExpr::new(SourceInfo::synthetic(), Some(init), Some(precond), Some(body), Some(increment), None));
    lower_expr(&mut cx, &loop_expr, false).unwrap();

    let order = cx.ir.block_order(function_id).unwrap();
    // entry (bin), pre_loop_cond, loop_body, loop_increment, after_loop
    assert_eq!(order.len(), 5);
    let (bin, pre_loop_cond, loop_body, loop_increment, after_loop) = (order[0], order[1], order[2], order[3], order[4]);

    assert!(cx.ir.is_terminated(bin).unwrap());
    assert!(cx.ir.is_terminated(pre_loop_cond).unwrap());
    assert!(cx.ir.is_terminated(loop_body).unwrap());
    assert!(cx.ir.is_terminated(loop_increment).unwrap());
    assert!(!cx.ir.is_terminated(after_loop).unwrap());
    assert_eq!(cx.current_block, after_loop);
}

#[test]
fn scenario_6_nested_loop_restores_break_continue_targets() {
    let mut ir = MemoryIr::new();
    let (function_id, mut cx) = harness(&mut ir);

    let print = ValueNode::new(SourceInfo::synthetic(), Some("print".into()), ResultType::Function);
    lower_global(cx.ir, &print).unwrap();
    let inner_body = Box::new(Expr::Call(CallExpr::new(SourceInfo::synthetic(), Box::new(Expr::Value(print)), Vec::new())));
    let inner_loop = Expr::Loop(LoopExpr::new(SourceInfo::synthetic(), None, None, Some(inner_body), None, None));

    let outer_break = cx.ir.create_block(function_id, "outer_break").unwrap();
    let outer_continue = cx.ir.create_block(function_id, "outer_continue").unwrap();

    cx.with_loop_targets(outer_break, outer_continue, |cx| {
        lower_expr(cx, &inner_loop, false).unwrap();
        assert_eq!(cx.break_target, Some(outer_break));
        assert_eq!(cx.continue_target, Some(outer_continue));
    });
}

#[test]
fn loop_with_no_slots_is_a_trivial_cfg() {
    let mut ir = MemoryIr::new();
    let (function_id, mut cx) = harness(&mut ir);

    let loop_expr = Expr::Loop(LoopExpr::new(SourceInfo::synthetic(), None, None, None, None, None));
    lower_expr(&mut cx, &loop_expr, false).unwrap();

    let order = cx.ir.block_order(function_id).unwrap();
    assert_eq!(order.len(), 2); // entry (bin), after_loop
    assert!(cx.ir.is_terminated(order[0]).unwrap());
    assert!(!cx.ir.is_terminated(order[1]).unwrap());
}
