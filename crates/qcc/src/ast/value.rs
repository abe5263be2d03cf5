// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The gmqcc-rs contributors
// SPDX-FileName: crates/qcc/src/ast/value.rs
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
//! Value nodes: named storage for variables, parameters, constants, and
//! function descriptors (component C).

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::ExprBase;
use super::function::FunctionNode;
use crate::common::SourceInfo;
use crate::ir::ValueId;

/// Shared handle to a [`ValueNode`]. Values are always shared (the source's
/// `keep = true` default for this node kind): a parser's symbol table and
/// the AST children that reference the same variable both hold a clone of
/// this `Rc`. Dropping one clone is exactly `ast_unref` honoring `keep` —
/// the node only goes away once every owner has dropped theirs.
pub type ValueRef = Rc<RefCell<ValueNode>>;

/// The constant payload of a `const` Value, tagged by the value's type.
#[derive(Debug, Clone)]
pub enum ConstPayload {
    Float(f64),
    Vector([f64; 3]),
    String(String),
    /// Back-reference to the Function this value is the signature of.
    /// `Weak` rather than `Rc` so the Function ↔ signature pair never
    /// forms a reference cycle; see `DESIGN.md` for why this replaces the
    /// source's manual null-out-the-other-side dance.
    Function(Weak<RefCell<FunctionNode>>),
}

impl PartialEq for ConstPayload {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Vector(a), Self::Vector(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => Weak::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Named storage: a variable, parameter, constant, or function descriptor.
#[derive(Debug)]
pub struct ValueNode {
    pub base: ExprBase,
    pub name: Option<String>,
    pub is_const: bool,
    pub constant: Option<ConstPayload>,
    /// Set once this value has been lowered (globally or locally); reading
    /// a Value before this is populated is a `UseBeforeDefinition` error.
    pub ir_value: Option<ValueId>,
}

impl ValueNode {
    /// Allocates a new, shared Value node.
    #[must_use]
    pub fn new(source_info: SourceInfo, name: Option<String>, result_type: super::ResultType) -> ValueRef {
        Rc::new(RefCell::new(Self {
            base: ExprBase::with_type(source_info, result_type),
            name,
            is_const: false,
            constant: None,
            ir_value: None,
        }))
    }

    pub fn set_name(&mut self, name: impl Into<String>) { self.name = Some(name.into()); }

    /// Appends `param` to this value's signature parameter list (valid
    /// when this Value describes a function type).
    pub fn params_add(&mut self, param: ValueRef) { self.base.params.push(param); }

    #[must_use]
    pub fn is_lowered(&self) -> bool { self.ir_value.is_some() }
}
