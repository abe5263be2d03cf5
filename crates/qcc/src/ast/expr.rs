// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The gmqcc-rs contributors
// SPDX-FileName: crates/qcc/src/ast/expr.rs
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
//! Structural expression/statement nodes (component D): the eleven
//! concrete kinds besides the Value node itself, each with its own child
//! ownership and construction rule (spec §3/§4.D).

use super::value::ValueRef;
use super::{ConstructError, ConstructResult, ExprBase, NodeKind, ResultType, TypeSkeleton};
use crate::common::SourceInfo;

/// The full set of concrete AST nodes. Structural nodes own their
/// children outright via `Box`; only [`Expr::Value`] is shared (an
/// `Rc<RefCell<ValueNode>>`), matching the source's `keep` flag being set
/// for exactly that node kind.
#[derive(Debug)]
pub enum Expr {
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Store(StoreExpr),
    Return(ReturnExpr),
    EntField(EntFieldExpr),
    Member(MemberExpr),
    Call(CallExpr),
    Block(BlockExpr),
    IfThen(IfThenExpr),
    Ternary(TernaryExpr),
    Loop(LoopExpr),
    Value(ValueRef),
}

impl Expr {
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Binary(_) => NodeKind::Binary,
            Self::Unary(_) => NodeKind::Unary,
            Self::Store(_) => NodeKind::Store,
            Self::Return(_) => NodeKind::Return,
            Self::EntField(_) => NodeKind::EntField,
            Self::Member(_) => NodeKind::Member,
            Self::Call(_) => NodeKind::Call,
            Self::Block(_) => NodeKind::Block,
            Self::IfThen(_) => NodeKind::IfThen,
            Self::Ternary(_) => NodeKind::Ternary,
            Self::Loop(_) => NodeKind::Loop,
            Self::Value(_) => NodeKind::Value,
        }
    }

    #[must_use]
    pub fn result_type(&self) -> ResultType {
        match self {
            Self::Binary(e) => e.base.result_type,
            Self::Unary(e) => e.base.result_type,
            Self::Store(e) => e.base.result_type,
            Self::Return(e) => e.base.result_type,
            Self::EntField(e) => e.base.result_type,
            Self::Member(e) => e.base.result_type,
            Self::Call(e) => e.base.result_type,
            Self::Block(e) => e.base.result_type,
            Self::IfThen(e) => e.base.result_type,
            Self::Ternary(e) => e.base.result_type,
            Self::Loop(e) => e.base.result_type,
            Self::Value(v) => v.borrow().base.result_type,
        }
    }

    /// The node's `next` type (return type / field payload / pointee),
    /// deep-cloned so the caller owns an independent skeleton (component
    /// F — a clone must never carry a codegen pointer, which is trivially
    /// true here since `TypeSkeleton` has no such field).
    #[must_use]
    pub fn next_type(&self) -> Option<TypeSkeleton> {
        match self {
            Self::Binary(e) => e.base.next_type.as_deref().map(TypeSkeleton::deep_clone),
            Self::Unary(e) => e.base.next_type.as_deref().map(TypeSkeleton::deep_clone),
            Self::Store(e) => e.base.next_type.as_deref().map(TypeSkeleton::deep_clone),
            Self::Return(e) => e.base.next_type.as_deref().map(TypeSkeleton::deep_clone),
            Self::EntField(e) => e.base.next_type.as_deref().map(TypeSkeleton::deep_clone),
            Self::Member(e) => e.base.next_type.as_deref().map(TypeSkeleton::deep_clone),
            Self::Call(e) => e.base.next_type.as_deref().map(TypeSkeleton::deep_clone),
            Self::Block(e) => e.base.next_type.as_deref().map(TypeSkeleton::deep_clone),
            Self::IfThen(e) => e.base.next_type.as_deref().map(TypeSkeleton::deep_clone),
            Self::Ternary(e) => e.base.next_type.as_deref().map(TypeSkeleton::deep_clone),
            Self::Loop(e) => e.base.next_type.as_deref().map(TypeSkeleton::deep_clone),
            Self::Value(v) => v.borrow().base.next_type.as_deref().map(TypeSkeleton::deep_clone),
        }
    }

    #[must_use]
    pub fn source_info(&self) -> SourceInfo {
        match self {
            Self::Binary(e) => e.base.source_info,
            Self::Unary(e) => e.base.source_info,
            Self::Store(e) => e.base.source_info,
            Self::Return(e) => e.base.source_info,
            Self::EntField(e) => e.base.source_info,
            Self::Member(e) => e.base.source_info,
            Self::Call(e) => e.base.source_info,
            Self::Block(e) => e.base.source_info,
            Self::IfThen(e) => e.base.source_info,
            Self::Ternary(e) => e.base.source_info,
            Self::Loop(e) => e.base.source_info,
            Self::Value(v) => v.borrow().base.source_info,
        }
    }
}

/// Binary operators. Comparisons and the logical pair always yield
/// `float` (the language has no distinct boolean type); arithmetic
/// operators fall back to the left operand's type except for a handful
/// of vector/float mixes, mirroring the classic QuakeC table where
/// `vector * vector` is a dot product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOpcode {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinOpcode {
    #[must_use]
    pub fn is_comparison(self) -> bool {
        matches!(self, Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge | Self::And | Self::Or)
    }

    /// The opcode table from spec §3/§4.D: comparisons -> float, a few
    /// vector/float mixes -> vector or float, default -> left operand.
    #[must_use]
    pub fn result_type(self, lhs: ResultType, rhs: ResultType) -> ResultType {
        if self.is_comparison() {
            return ResultType::Float;
        }
        match (self, lhs, rhs) {
            (Self::Mul, ResultType::Vector, ResultType::Vector) => ResultType::Float,
            (Self::Mul | Self::Div, ResultType::Vector, ResultType::Float) => ResultType::Vector,
            (Self::Mul, ResultType::Float, ResultType::Vector) => ResultType::Vector,
            _ => lhs,
        }
    }
}

#[derive(Debug)]
pub struct BinaryExpr {
    pub base: ExprBase,
    pub op: BinOpcode,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
}

impl BinaryExpr {
    #[must_use]
    pub fn new(source_info: SourceInfo, op: BinOpcode, lhs: Box<Expr>, rhs: Box<Expr>) -> Self {
        let result_type = op.result_type(lhs.result_type(), rhs.result_type());
        Self { base: ExprBase::with_type(source_info, result_type), op, lhs, rhs }
    }
}

/// Unary operators. `Neg` preserves the operand's type; `Not` always
/// yields `float` (logical negation of the implicit float/vector bool).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnOpcode {
    Neg,
    Not,
}

#[derive(Debug)]
pub struct UnaryExpr {
    pub base: ExprBase,
    pub op: UnOpcode,
    pub operand: Box<Expr>,
}

impl UnaryExpr {
    #[must_use]
    pub fn new(source_info: SourceInfo, op: UnOpcode, operand: Box<Expr>) -> Self {
        let result_type = match op {
            UnOpcode::Neg => operand.result_type(),
            UnOpcode::Not => ResultType::Float,
        };
        Self { base: ExprBase::with_type(source_info, result_type), op, operand }
    }
}

/// Store opcodes. `Assign` is a plain store; the compound variants carry
/// the same binary operator the source applies before storing (`a += b`
/// lowers as a read-modify-write through the same `emit_store` call).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOpcode {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
}

#[derive(Debug)]
pub struct StoreExpr {
    pub base: ExprBase,
    pub op: StoreOpcode,
    pub dest: Box<Expr>,
    pub src: Box<Expr>,
}

impl StoreExpr {
    #[must_use]
    pub fn new(source_info: SourceInfo, op: StoreOpcode, dest: Box<Expr>, src: Box<Expr>) -> Self {
        let result_type = dest.result_type();
        Self { base: ExprBase::with_type(source_info, result_type), op, dest, src }
    }
}

#[derive(Debug)]
pub struct ReturnExpr {
    pub base: ExprBase,
    pub operand: Option<Box<Expr>>,
}

impl ReturnExpr {
    #[must_use]
    pub fn new(source_info: SourceInfo, operand: Option<Box<Expr>>) -> Self {
        Self { base: ExprBase::new(source_info), operand }
    }
}

#[derive(Debug)]
pub struct EntFieldExpr {
    pub base: ExprBase,
    pub entity: Box<Expr>,
    pub field: Box<Expr>,
}

impl EntFieldExpr {
    /// Validates that `field`'s result type is `field` and that it
    /// carries a payload (`next`) type, then copies that payload onto
    /// `self` (component F deep clone), per spec §4.D.
    pub fn new(source_info: SourceInfo, entity: Box<Expr>, field: Box<Expr>) -> ConstructResult<Self> {
        if field.result_type() != ResultType::Field {
            return Err(ConstructError::EntFieldNotAField);
        }
        let payload = field.next_type().ok_or(ConstructError::EntFieldMissingPayload)?;
        let mut base = ExprBase::with_type(source_info, payload.result_type);
        base.next_type = payload.next;
        Ok(Self { base, entity, field })
    }
}

#[derive(Debug)]
pub struct MemberExpr {
    pub base: ExprBase,
    pub owner: Box<Expr>,
    pub index: u8,
}

impl MemberExpr {
    /// Rejects field indices >= 3 and owner types other than vector /
    /// field-of-vector (spec §4.D). A vector owner yields `float`; a
    /// field-of-vector owner yields `field` whose payload is `float`.
    pub fn new(source_info: SourceInfo, owner: Box<Expr>, index: u8) -> ConstructResult<Self> {
        if index >= 3 {
            return Err(ConstructError::MemberBadIndex(index));
        }
        let base = match owner.result_type() {
            ResultType::Vector => ExprBase::with_type(source_info, ResultType::Float),
            ResultType::Field if owner.next_type().map(|t| t.result_type) == Some(ResultType::Vector) => {
                let mut base = ExprBase::with_type(source_info, ResultType::Field);
                base.next_type = Some(Box::new(TypeSkeleton::new(ResultType::Float, None, Vec::new())));
                base
            }
            _ => return Err(ConstructError::MemberBadOwner),
        };
        Ok(Self { base, owner, index })
    }
}

#[derive(Debug)]
pub struct CallExpr {
    pub base: ExprBase,
    pub callee: Box<Expr>,
    pub args: Vec<Box<Expr>>,
}

impl CallExpr {
    #[must_use]
    pub fn new(source_info: SourceInfo, callee: Box<Expr>, args: Vec<Box<Expr>>) -> Self {
        let result_type = callee.next_type().map_or(ResultType::Void, |t| t.result_type);
        Self { base: ExprBase::with_type(source_info, result_type), callee, args }
    }
}

#[derive(Debug)]
pub struct BlockExpr {
    pub base: ExprBase,
    /// Local Value declarations this block owns, in declaration order.
    pub locals: Vec<ValueRef>,
    /// Child expressions, in evaluation order. The block's own result
    /// type tracks the last child (comma-sequence semantics).
    pub children: Vec<Box<Expr>>,
}

impl BlockExpr {
    #[must_use]
    pub fn new(source_info: SourceInfo) -> Self {
        Self { base: ExprBase::new(source_info), locals: Vec::new(), children: Vec::new() }
    }

    pub fn declare_local(&mut self, local: ValueRef) { self.locals.push(local); }

    /// Appends a child expression and updates the block's result type to
    /// track it, giving the block comma-sequence ("last value wins")
    /// semantics without a separate pass.
    pub fn push_child(&mut self, child: Box<Expr>) {
        self.base.result_type = child.result_type();
        self.base.next_type = child.next_type().map(Box::new);
        self.children.push(child);
    }

    /// Copies type metadata from `other` onto this block, for callers
    /// that build a block's type ahead of populating its children.
    pub fn set_type(&mut self, other: &Expr) {
        self.base.result_type = other.result_type();
        self.base.next_type = other.next_type().map(Box::new);
    }
}

#[derive(Debug)]
pub struct IfThenExpr {
    pub base: ExprBase,
    pub condition: Box<Expr>,
    pub on_true: Option<Box<Expr>>,
    pub on_false: Option<Box<Expr>>,
}

impl IfThenExpr {
    /// Fails if both branches are absent (spec §4.D / §8 boundary
    /// behavior: only one-branch-or-both constructions succeed).
    pub fn new(
        source_info: SourceInfo,
        condition: Box<Expr>,
        on_true: Option<Box<Expr>>,
        on_false: Option<Box<Expr>>,
    ) -> ConstructResult<Self> {
        if on_true.is_none() && on_false.is_none() {
            return Err(ConstructError::IfThenMissingBranch);
        }
        Ok(Self { base: ExprBase::new(source_info), condition, on_true, on_false })
    }
}

#[derive(Debug)]
pub struct TernaryExpr {
    pub base: ExprBase,
    pub condition: Box<Expr>,
    pub on_true: Box<Expr>,
    pub on_false: Box<Expr>,
}

impl TernaryExpr {
    /// Both branches are mandatory (unlike `IfThen`); the result type
    /// tracks `on_true`'s (the lowering pass separately verifies the IR
    /// types of both branches match before building the phi).
    ///
    /// The node's cached phi value lives in `base.out_l` — the same
    /// `outl`/`outr` cache slot spec §3 describes generically, reused
    /// here for ternary phi memoization specifically (spec §9).
    pub fn new(
        source_info: SourceInfo,
        condition: Box<Expr>,
        on_true: Option<Box<Expr>>,
        on_false: Option<Box<Expr>>,
    ) -> ConstructResult<Self> {
        let (Some(on_true), Some(on_false)) = (on_true, on_false) else {
            return Err(ConstructError::TernaryMissingBranch);
        };
        let result_type = on_true.result_type();
        Ok(Self { base: ExprBase::with_type(source_info, result_type), condition, on_true, on_false })
    }
}

#[derive(Debug)]
pub struct LoopExpr {
    pub base: ExprBase,
    pub init: Option<Box<Expr>>,
    pub precond: Option<Box<Expr>>,
    pub body: Option<Box<Expr>>,
    pub increment: Option<Box<Expr>>,
    pub postcond: Option<Box<Expr>>,
}

impl LoopExpr {
    /// All five slots are independently optional (spec §3/§4.G): a loop
    /// with every slot absent is a legal, trivial CFG (`bin` jumps
    /// straight to `bout`).
    #[must_use]
    pub fn new(
        source_info: SourceInfo,
        init: Option<Box<Expr>>,
        precond: Option<Box<Expr>>,
        body: Option<Box<Expr>>,
        increment: Option<Box<Expr>>,
        postcond: Option<Box<Expr>>,
    ) -> Self {
        Self { base: ExprBase::new(source_info), init, precond, body, increment, postcond }
    }
}
