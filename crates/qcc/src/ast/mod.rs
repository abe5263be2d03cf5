// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The gmqcc-rs contributors
// SPDX-FileName: crates/qcc/src/ast/mod.rs
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
//! Abstract syntax tree for the language: expressions, statements,
//! functions, and the small amount of type-skeleton bookkeeping needed to
//! thread result types through the tree without a separate inference pass.
//!
//! See `SPEC_FULL.md` §3/§4 for the data model and construction rules this
//! module implements.

pub mod expr;
pub mod function;
pub mod value;

use std::cell::Cell;

pub use expr::{
    BinOpcode,
    BinaryExpr,
    BlockExpr,
    CallExpr,
    EntFieldExpr,
    Expr,
    IfThenExpr,
    LoopExpr,
    MemberExpr,
    ReturnExpr,
    StoreExpr,
    StoreOpcode,
    TernaryExpr,
    UnOpcode,
    UnaryExpr,
};
pub use function::FunctionNode;
pub use value::{
    ConstPayload,
    ValueNode,
    ValueRef,
};

use crate::common::SourceInfo;
use crate::ir::ValueId;

/// Closed tag identifying the concrete kind of an AST node. Rust's enum
/// discriminant already dispatches `Drop` and pattern matches for us; this
/// tag exists purely so diagnostics and the odd piece of generic tooling
/// can ask "what kind of node is this" without matching on the full
/// `Expr`, mirroring how `typhon-ast`'s `NodeKind` sits alongside (not
/// instead of) a plain Rust enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Binary,
    Unary,
    Store,
    Return,
    EntField,
    Member,
    Call,
    Block,
    IfThen,
    Ternary,
    Loop,
    Value,
}

/// The result type of an expression. Closed enum — types are assigned at
/// construction, never inferred (`SPEC_FULL.md` §1 Non-goals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultType {
    Void,
    Float,
    Vector,
    String,
    Entity,
    Field,
    Function,
    Pointer,
}

/// A deep-copyable description of a node's type shape: its own result
/// type, an optional payload/return type (`next`), and the types of its
/// parameters in order. Produced by [`TypeSkeleton::deep_clone`] (component
/// F); never carries a codegen routine, so a clone can never accidentally
/// be lowered as if it were a real expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSkeleton {
    pub result_type: ResultType,
    pub next: Option<Box<TypeSkeleton>>,
    pub params: Vec<ResultType>,
}

impl TypeSkeleton {
    #[must_use]
    pub fn new(result_type: ResultType, next: Option<Box<TypeSkeleton>>, params: Vec<ResultType>) -> Self {
        Self { result_type, next, params }
    }

    /// Structural deep copy. `c.deep_clone() ≡ c` by construction: the
    /// recursion bottoms out on `None`, and every field is value-typed.
    #[must_use]
    pub fn deep_clone(&self) -> Self {
        Self {
            result_type: self.result_type,
            next: self.next.as_ref().map(|n| Box::new(n.deep_clone())),
            params: self.params.clone(),
        }
    }
}

/// Fields common to every expression node (component B). Embedded as
/// `base` in each structural node and in [`ValueNode`], mirroring the
/// C-header-first layout the source used, realized here as plain struct
/// composition rather than manual offsetof tricks.
#[derive(Debug)]
pub struct ExprBase {
    pub source_info: SourceInfo,
    pub result_type: ResultType,
    pub next_type: Option<Box<TypeSkeleton>>,
    /// Parameter Values for function-typed nodes (arities/signatures).
    pub params: Vec<ValueRef>,
    /// Cached materializations from a previous lowering of this node.
    /// Used by [`TernaryExpr`] to memoize its phi result; left generic
    /// enough (`outl`/`outr`) to match the two-sided shape the source
    /// keeps, even though structural nodes besides ternary currently
    /// leave one or both empty.
    pub out_l: Cell<Option<ValueId>>,
    pub out_r: Cell<Option<ValueId>>,
}

impl ExprBase {
    #[must_use]
    pub fn new(source_info: SourceInfo) -> Self {
        Self {
            source_info,
            result_type: ResultType::Void,
            next_type: None,
            params: Vec::new(),
            out_l: Cell::new(None),
            out_r: Cell::new(None),
        }
    }

    #[must_use]
    pub fn with_type(source_info: SourceInfo, result_type: ResultType) -> Self {
        Self { result_type, ..Self::new(source_info) }
    }

    /// Produce a type skeleton describing this node's type shape, for
    /// use by callers that need to copy it onto another node (component F).
    #[must_use]
    pub fn type_skeleton(&self) -> TypeSkeleton {
        TypeSkeleton::new(
            self.result_type,
            self.next_type.clone(),
            self.params.iter().map(|p| p.borrow().base.result_type).collect(),
        )
    }
}

/// Invariant violations detected at construction time. Returned in-band
/// (`Result`, not a null pointer) per `SPEC_FULL.md` §4.D/§7.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ConstructError {
    #[error("IfThen requires at least one of on-true/on-false")]
    IfThenMissingBranch,
    #[error("Ternary requires both on-true and on-false")]
    TernaryMissingBranch,
    #[error("Member field index {0} is out of range (must be 0, 1, or 2)")]
    MemberBadIndex(u8),
    #[error("Member owner must be a vector or a field-of-vector")]
    MemberBadOwner,
    #[error("EntField's field operand must have result type `field`")]
    EntFieldNotAField,
    #[error("EntField's field operand is missing its payload (next) type")]
    EntFieldMissingPayload,
    #[error("Function requires a non-const signature Value of function type")]
    FunctionBadSignature,
}

pub type ConstructResult<T> = Result<T, ConstructError>;
