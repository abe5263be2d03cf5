// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The gmqcc-rs contributors
// SPDX-FileName: crates/qcc/src/lower/context.rs
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
//! The cursor state threaded through a single function's lowering (spec
//! §4.G: "The `function` argument carries the cursor state: current IR
//! block, break/continue targets, label counter"). The label counter
//! itself lives on [`FunctionNode`] (`next_label`); everything else that
//! changes as the traversal forks across blocks lives here.

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::FunctionNode;
use crate::ir::{BlockId, FunctionId, IrBuilder};

pub struct LowerCx<'ir, B: IrBuilder> {
    pub ir: &'ir mut B,
    pub function_id: FunctionId,
    pub function_node: Rc<RefCell<FunctionNode>>,
    pub current_block: BlockId,
    pub break_target: Option<BlockId>,
    pub continue_target: Option<BlockId>,
    /// Lazily created unused dummy value for statement-like nodes whose
    /// `out_value` spec §4.G says is otherwise unused (e.g. `Return`,
    /// bare `IfThen`).
    void_value: Option<crate::ir::ValueId>,
}

impl<'ir, B: IrBuilder> LowerCx<'ir, B> {
    pub fn new(ir: &'ir mut B, function_id: FunctionId, function_node: Rc<RefCell<FunctionNode>>, entry_block: BlockId) -> Self {
        Self {
            ir,
            function_id,
            function_node,
            current_block: entry_block,
            break_target: None,
            continue_target: None,
            void_value: None,
        }
    }

    /// Returns the cached unused dummy value for this function, creating
    /// it on first use.
    pub fn void_value(&mut self) -> crate::ir::IrResult<crate::ir::ValueId> {
        if let Some(v) = self.void_value {
            return Ok(v);
        }
        let v = self.ir.create_local(self.function_id, "$void", crate::ast::ResultType::Void, false)?;
        self.void_value = Some(v);
        Ok(v)
    }

    /// A unique-per-function diagnostic label with the given prefix
    /// (spec §4.G's "Label generation"; realizes `ast_function_label`).
    pub fn label(&self, prefix: &str) -> String { self.function_node.borrow().next_label(prefix) }

    /// Runs `f` with `break_target`/`continue_target` swapped to the
    /// given block, restoring the previous targets afterward — "nested
    /// loops compose" (spec §4.G Loop step 5).
    pub fn with_loop_targets<T>(&mut self, break_target: BlockId, continue_target: BlockId, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved_break = self.break_target.replace(break_target);
        let saved_continue = self.continue_target.replace(continue_target);
        let result = f(self);
        self.break_target = saved_break;
        self.continue_target = saved_continue;
        result
    }
}
