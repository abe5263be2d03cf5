// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The gmqcc-rs contributors
// SPDX-FileName: crates/qcc/src/lower/function.rs
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
//! Function-body lowering (spec §4.G "Function body lowering"):
//! parameters, the entry block, top-level blocks in sequence, and the
//! implicit-return / missing-return check.

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::{FunctionNode, ResultType};
use crate::ir::{FunctionId, IrBuilder};

use super::error::{LowerError, LowerResult};
use super::{statements, values, LowerCx};

/// Lowers a whole function: appends each signature parameter's IR type,
/// short-circuits for builtins (spec §4.G: a builtin has no body to
/// lower, only its index matters), otherwise creates a fresh entry
/// block, lowers every top-level block against it in order, and inserts
/// an implicit `return` if control falls off the end of a void-returning
/// function. A non-void function that falls off the end is rejected
/// (spec §9 Open Questions: kept conservative rather than inferring a
/// reachable-return analysis).
pub fn lower_function<B: IrBuilder>(ir: &mut B, function_id: FunctionId, function: Rc<RefCell<FunctionNode>>) -> LowerResult<()> {
    let (name, return_type, params, is_builtin) = {
        let f = function.borrow();
        let sig = f.signature.borrow();
        let return_type = sig.base.next_type.as_ref().map_or(ResultType::Void, |t| t.result_type);
        (f.name.clone(), return_type, sig.base.params.clone(), f.is_builtin())
    };

    for param in &params {
        ir.append_parameter_type(function_id, param.borrow().base.result_type)?;
    }

    if is_builtin {
        log::debug!("function `{name}` is a builtin, skipping body lowering");
        return Ok(());
    }

    let entry = ir.create_block(function_id, "entry")?;
    for param in &params {
        values::lower_local(ir, function_id, param, true)?;
    }

    let mut cx = LowerCx::new(ir, function_id, Rc::clone(&function), entry);
    {
        let f = function.borrow();
        for block in &f.body {
            statements::lower_block(&mut cx, block)?;
        }
    }

    if !cx.ir.is_terminated(cx.current_block)? {
        if return_type == ResultType::Void {
            cx.ir.emit_return(cx.current_block, None)?;
        } else {
            let location = function.borrow().source_info;
            return Err(LowerError::MissingReturn { name, location });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BlockExpr, Expr, ReturnExpr, ResultType as RT, TypeSkeleton, ValueNode};
    use crate::common::SourceInfo;
    use crate::ir::memory::MemoryIr;

    fn signature(return_type: Option<RT>) -> crate::ast::ValueRef {
        let sig = ValueNode::new(SourceInfo::synthetic(), Some("f".into()), RT::Function);
        sig.borrow_mut().base.next_type = return_type.map(|t| Box::new(TypeSkeleton::new(t, None, Vec::new())));
        sig
    }

    #[test]
    fn builtin_skips_body_and_only_records_parameter_types() {
        let mut ir = MemoryIr::new();
        let fv = ir.create_function("len", RT::Float).unwrap();
        let function_id = ir.function_of(fv).unwrap();

        let sig = signature(Some(RT::Float));
        let param = ValueNode::new(SourceInfo::synthetic(), Some("s".into()), RT::String);
        sig.borrow_mut().params_add(param);
        let function = crate::ast::FunctionNode::new("len", sig, SourceInfo::synthetic()).unwrap();
        function.borrow_mut().set_builtin_index(7);

        lower_function(&mut ir, function_id, function).unwrap();
        // No blocks were ever created for a builtin.
        assert_eq!(ir.block_order(function_id).unwrap().len(), 0);
    }

    #[test]
    fn void_function_falling_off_the_end_gets_an_implicit_return() {
        let mut ir = MemoryIr::new();
        let fv = ir.create_function("tick", RT::Void).unwrap();
        let function_id = ir.function_of(fv).unwrap();

        let sig = signature(None);
        let function = crate::ast::FunctionNode::new("tick", sig, SourceInfo::synthetic()).unwrap();
        let mut block = BlockExpr::new(SourceInfo::synthetic());
        let local = ValueNode::new(SourceInfo::synthetic(), Some("x".into()), RT::Float);
        block.declare_local(local.clone());
        block.push_child(Box::new(Expr::Value(local)));
        function.borrow_mut().push_block(block);

        lower_function(&mut ir, function_id, Rc::clone(&function)).unwrap();
        let entry = ir.block_order(function_id).unwrap()[0];
        assert!(ir.is_terminated(entry).unwrap());
    }

    #[test]
    fn non_void_function_falling_off_the_end_is_rejected() {
        let mut ir = MemoryIr::new();
        let fv = ir.create_function("speed", RT::Float).unwrap();
        let function_id = ir.function_of(fv).unwrap();

        let sig = signature(Some(RT::Float));
        let function = crate::ast::FunctionNode::new("speed", sig, SourceInfo::synthetic()).unwrap();
        function.borrow_mut().push_block(BlockExpr::new(SourceInfo::synthetic()));

        let err = lower_function(&mut ir, function_id, function).unwrap_err();
        assert!(matches!(err, LowerError::MissingReturn { .. }));
    }

    #[test]
    fn explicit_return_suppresses_the_implicit_one() {
        let mut ir = MemoryIr::new();
        let fv = ir.create_function("speed", RT::Float).unwrap();
        let function_id = ir.function_of(fv).unwrap();

        let sig = signature(Some(RT::Float));
        let function = crate::ast::FunctionNode::new("speed", sig, SourceInfo::synthetic()).unwrap();
        let operand = ValueNode::new(SourceInfo::synthetic(), Some("k".into()), RT::Float);
        crate::lower::values::lower_global(&mut ir, &operand).unwrap();
        let mut block = BlockExpr::new(SourceInfo::synthetic());
        block.push_child(Box::new(Expr::Return(ReturnExpr::new(SourceInfo::synthetic(), Some(Box::new(Expr::Value(operand)))))));
        function.borrow_mut().push_block(block);

        lower_function(&mut ir, function_id, function).unwrap();
        let entry = ir.block_order(function_id).unwrap()[0];
        assert!(ir.is_terminated(entry).unwrap());
    }
}
