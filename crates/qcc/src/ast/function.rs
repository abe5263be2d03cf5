// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The gmqcc-rs contributors
// SPDX-FileName: crates/qcc/src/ast/function.rs
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
//! Function node (component E): an ordered list of blocks, a back-link to
//! its signature Value, and the state the lowering pass threads through a
//! single function body.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

use super::expr::BlockExpr;
use super::value::ValueRef;
use super::{ConstPayload, ConstructError, ConstructResult, ResultType};
use crate::common::SourceInfo;

/// A Function implemented by the runtime rather than compiled. Zero means
/// "not a builtin".
pub type BuiltinIndex = u32;

#[derive(Debug)]
pub struct FunctionNode {
    pub name: String,
    /// Strong owning reference to this function's signature Value. The
    /// signature's constant payload holds the matching `Weak` back to
    /// this node — see [`crate::ast::value::ConstPayload::Function`].
    pub signature: ValueRef,
    pub body: Vec<BlockExpr>,
    pub builtin_index: BuiltinIndex,
    pub source_info: SourceInfo,
    label_counter: Cell<u32>,
}

impl FunctionNode {
    /// Constructs a function from a non-const, function-typed signature
    /// Value, installing the bidirectional link on success. Mirrors
    /// `SPEC_FULL.md` §4.D's Function construction rule.
    pub fn new(name: impl Into<String>, signature: ValueRef, source_info: SourceInfo) -> ConstructResult<Rc<std::cell::RefCell<Self>>> {
        {
            let sig = signature.borrow();
            if sig.is_const || sig.base.result_type != ResultType::Function {
                return Err(ConstructError::FunctionBadSignature);
            }
        }

        let function = Rc::new_cyclic(|weak_self| {
            {
                let mut sig = signature.borrow_mut();
                sig.is_const = true;
                sig.constant = Some(ConstPayload::Function(weak_self.clone()));
            }
            std::cell::RefCell::new(Self {
                name: name.into(),
                signature: Rc::clone(&signature),
                body: Vec::new(),
                builtin_index: 0,
                source_info,
                label_counter: Cell::new(0),
            })
        });

        Ok(function)
    }

    pub fn push_block(&mut self, block: BlockExpr) { self.body.push(block); }

    #[must_use]
    pub fn is_builtin(&self) -> bool { self.builtin_index != 0 }

    pub fn set_builtin_index(&mut self, index: BuiltinIndex) { self.builtin_index = index; }

    /// Returns a unique-per-function label with the given textual prefix.
    /// Labels are diagnostic only, but must not collide within a function,
    /// including across repeated calls with the same prefix (e.g. two
    /// sibling `if` statements both requesting `"endif"`).
    pub fn next_label(&self, prefix: &str) -> String {
        let n = self.label_counter.get();
        self.label_counter.set(n.wrapping_add(1));
        format!("{prefix}_{n}")
    }
}

/// Process-wide counter used only to give anonymous synthetic signature
/// Values distinct names in tests/examples; not part of the lowering
/// pass's own state.
pub(crate) static ANON_COUNTER: AtomicU32 = AtomicU32::new(0);

#[must_use]
pub(crate) fn anon_name(prefix: &str) -> String {
    format!("{prefix}{}", ANON_COUNTER.fetch_add(1, Ordering::Relaxed))
}
