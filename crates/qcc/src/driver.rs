// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The gmqcc-rs contributors
// SPDX-FileName: crates/qcc/src/driver.rs
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
//! Top-level coordination of the lowering pass over a whole program.

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::{FunctionNode, ValueRef};
use crate::ir::IrBuilder;
use crate::lower::{lower_function, lower_global, LowerResult};

/// Coordinates the lowering pass (spec §6): every global Value is lowered
/// before any function body, so a function referencing another function
/// or a global declared later in the program always finds it already
/// backed by an IR value.
#[derive(Debug, Default)]
pub struct Driver;

impl Driver {
    #[must_use]
    pub fn new() -> Self { Self }

    /// Lowers an entire program against `ir`: first every top-level
    /// global Value, then every function's signature and body.
    pub fn lower_program<B: IrBuilder>(
        &self,
        ir: &mut B,
        globals: &[ValueRef],
        functions: &[Rc<RefCell<FunctionNode>>],
    ) -> LowerResult<()> {
        log::info!("lowering {} global(s) and {} function(s)", globals.len(), functions.len());

        for global in globals {
            lower_global(ir, global)?;
        }

        for function in functions {
            self.lower_one_function(ir, function)?;
        }

        Ok(())
    }

    /// Lowers a single function, first ensuring its signature Value is
    /// lowered (idempotent: a no-op if the caller already lowered it as
    /// part of the global pass).
    fn lower_one_function<B: IrBuilder>(&self, ir: &mut B, function: &Rc<RefCell<FunctionNode>>) -> LowerResult<()> {
        let signature = Rc::clone(&function.borrow().signature);
        lower_global(ir, &signature)?;

        let signature_value = signature.borrow().ir_value.expect("lower_global always sets ir_value on success");
        let function_id = ir.function_of(signature_value)?;
        lower_function(ir, function_id, Rc::clone(function))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BlockExpr, ConstPayload, Expr, ReturnExpr, ResultType, ValueNode};
    use crate::common::SourceInfo;
    use crate::ir::memory::MemoryIr;

    #[test]
    fn lowers_a_global_then_a_function_that_reads_it() {
        let mut ir = MemoryIr::new();
        let driver = Driver::new();

        let speed = ValueNode::new(SourceInfo::synthetic(), Some("speed".into()), ResultType::Float);
        speed.borrow_mut().is_const = true;
        speed.borrow_mut().constant = Some(ConstPayload::Float(320.0));

        let sig = ValueNode::new(SourceInfo::synthetic(), Some("main".into()), ResultType::Function);
        let function = FunctionNode::new("main", sig, SourceInfo::synthetic()).unwrap();
        let mut block = BlockExpr::new(SourceInfo::synthetic());
        block.push_child(Box::new(Expr::Return(ReturnExpr::new(SourceInfo::synthetic(), Some(Box::new(Expr::Value(speed.clone())))))));
        function.borrow_mut().push_block(block);

        driver.lower_program(&mut ir, &[speed.clone()], &[function]).unwrap();

        assert!(speed.borrow().is_lowered());
    }

    #[test]
    fn lowering_a_function_lowers_its_own_signature_even_if_omitted_from_globals() {
        let mut ir = MemoryIr::new();
        let driver = Driver::new();

        let sig = ValueNode::new(SourceInfo::synthetic(), Some("tick".into()), ResultType::Function);
        let function = FunctionNode::new("tick", sig.clone(), SourceInfo::synthetic()).unwrap();

        driver.lower_program(&mut ir, &[], &[function]).unwrap();

        assert!(sig.borrow().is_lowered());
    }
}
