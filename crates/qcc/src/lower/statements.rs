// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The gmqcc-rs contributors
// SPDX-FileName: crates/qcc/src/lower/statements.rs
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
//! Block lowering (spec §4.G): locals first, then children in order,
//! comma-sequence semantics (the block's value is its last child's).

use crate::ast::BlockExpr;
use crate::ir::{IrBuilder, ValueId};

use super::error::LowerResult;
use super::{lower_expr, values, LowerCx};

pub fn lower_block<B: IrBuilder>(cx: &mut LowerCx<'_, B>, expr: &BlockExpr) -> LowerResult<ValueId> {
    for local in &expr.locals {
        values::lower_local(cx.ir, cx.function_id, local, false)?;
    }

    let mut out = cx.void_value()?;
    for child in &expr.children {
        out = lower_expr(cx, child, false)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, FunctionNode, ResultType, ValueNode};
    use crate::common::SourceInfo;
    use crate::ir::memory::MemoryIr;

    #[test]
    fn block_result_is_last_child_and_locals_are_lowered() {
        let mut ir = MemoryIr::new();
        let fv = ir.create_function("f", ResultType::Void).unwrap();
        let function = ir.function_of(fv).unwrap();
        let entry = ir.create_block(function, "entry").unwrap();
        let sig = ValueNode::new(SourceInfo::synthetic(), Some("f".into()), ResultType::Function);
        let fnode = FunctionNode::new("f", sig, SourceInfo::synthetic()).unwrap();
        let mut cx = LowerCx::new(&mut ir, function, fnode, entry);

        let local = ValueNode::new(SourceInfo::synthetic(), Some("i".into()), ResultType::Float);
        let lowered_before = local.borrow().is_lowered();
        let mut block = BlockExpr::new(SourceInfo::synthetic());
        block.declare_local(local.clone());
        block.push_child(Box::new(Expr::Value(local.clone())));

        let out = lower_block(&mut cx, &block).unwrap();
        assert!(!lowered_before);
        assert!(local.borrow().is_lowered());
        assert_eq!(out, local.borrow().ir_value.unwrap());
    }
}
