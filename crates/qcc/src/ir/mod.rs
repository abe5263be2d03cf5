// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The gmqcc-rs contributors
// SPDX-FileName: crates/qcc/src/ir/mod.rs
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
//! Abstract IR-builder interface consumed by the lowering pass (`lower::*`).
//!
//! The spec this crate implements treats block/instruction/value creation
//! as an external collaborator's concern; `IrBuilder` is that collaborator,
//! encoded as a trait so the lowering pass never depends on a concrete
//! backend. [`memory::MemoryIr`] is the one concrete implementation this
//! crate ships, used by every test and by [`crate::driver::Driver`].

pub mod memory;

use std::fmt;

use crate::ast::{BinOpcode, ResultType, StoreOpcode, UnOpcode};

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", stringify!($name), self.0)
            }
        }
    };
}

id_type!(ValueId);
id_type!(BlockId);
id_type!(FunctionId);

/// Failures an IR primitive can report. The lowering pass treats any of
/// these as `LowerError::IrBuilderFailure` (spec §7's `IRBuilderFailure`).
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum IrError {
    #[error("unknown function {0}")]
    UnknownFunction(FunctionId),
    #[error("unknown block {0}")]
    UnknownBlock(BlockId),
    #[error("unknown value {0}")]
    UnknownValue(ValueId),
    #[error("block {0} does not belong to function {1}")]
    BlockNotInFunction(BlockId, FunctionId),
    #[error("block index {index} out of range (function {function} has {len} blocks)")]
    BlockIndexOutOfRange { function: FunctionId, index: usize, len: usize },
    #[error("value {0} is not a call instruction, cannot attach an argument")]
    NotACall(ValueId),
    #[error("value {0} is not a phi instruction, cannot add an incoming edge")]
    NotAPhi(ValueId),
    #[error("value {0} does not represent a function")]
    NotAFunctionValue(ValueId),
}

pub type IrResult<T> = Result<T, IrError>;

/// The abstract IR-builder interface consumed by the lowering pass (spec
/// §6 "Consumed from the IR builder"). Every method corresponds 1:1 to a
/// bullet in that list.
pub trait IrBuilder {
    /// Creates an IR function and returns the `ValueId` that represents
    /// it as a first-class, callable value (what a `Call`'s callee
    /// ultimately resolves to). Use [`IrBuilder::function_of`] to recover
    /// the `FunctionId` needed for block/parameter operations below.
    fn create_function(&mut self, name: &str, return_type: ResultType) -> IrResult<ValueId>;
    fn function_of(&self, value: ValueId) -> IrResult<FunctionId>;
    fn create_global(&mut self, name: &str, ty: ResultType) -> IrResult<ValueId>;
    fn create_field(&mut self, name: &str, payload_type: ResultType) -> IrResult<ValueId>;
    fn create_local(&mut self, function: FunctionId, name: &str, ty: ResultType, is_parameter: bool) -> IrResult<ValueId>;
    fn append_parameter_type(&mut self, function: FunctionId, ty: ResultType) -> IrResult<()>;

    fn create_block(&mut self, function: FunctionId, label: &str) -> IrResult<BlockId>;
    fn append_block(&mut self, function: FunctionId, block: BlockId) -> IrResult<()>;
    fn remove_block_at_index(&mut self, function: FunctionId, index: usize) -> IrResult<BlockId>;
    fn block_position(&self, function: FunctionId, block: BlockId) -> IrResult<usize>;
    fn block_order(&self, function: FunctionId) -> IrResult<Vec<BlockId>>;
    fn is_terminated(&self, block: BlockId) -> IrResult<bool>;

    fn emit_binop(&mut self, block: BlockId, op: BinOpcode, lhs: ValueId, rhs: ValueId, result_type: ResultType) -> IrResult<ValueId>;
    fn emit_unary(&mut self, block: BlockId, op: UnOpcode, operand: ValueId, result_type: ResultType) -> IrResult<ValueId>;
    fn emit_store(&mut self, block: BlockId, op: StoreOpcode, dest: ValueId, src: ValueId) -> IrResult<()>;
    fn emit_return(&mut self, block: BlockId, value: Option<ValueId>) -> IrResult<()>;
    fn emit_jump(&mut self, block: BlockId, target: BlockId) -> IrResult<()>;
    fn emit_conditional_branch(&mut self, block: BlockId, cond: ValueId, if_true: BlockId, if_false: BlockId) -> IrResult<()>;

    fn emit_call(&mut self, block: BlockId, callee: ValueId, result_type: ResultType) -> IrResult<ValueId>;
    fn attach_argument(&mut self, call: ValueId, arg: ValueId) -> IrResult<()>;

    fn emit_field_address(&mut self, block: BlockId, entity: ValueId, field: ValueId, result_type: ResultType) -> IrResult<ValueId>;
    fn emit_load_from_entity(&mut self, block: BlockId, entity: ValueId, field: ValueId, result_type: ResultType) -> IrResult<ValueId>;

    fn create_phi(&mut self, block: BlockId, result_type: ResultType) -> IrResult<ValueId>;
    fn add_incoming(&mut self, phi: ValueId, from_block: BlockId, value: ValueId) -> IrResult<()>;
    fn extract_vector_component(&mut self, owner: ValueId, index: u8, result_type: ResultType) -> IrResult<ValueId>;

    fn set_float_constant(&mut self, value: ValueId, v: f64) -> IrResult<()>;
    fn set_vector_constant(&mut self, value: ValueId, v: [f64; 3]) -> IrResult<()>;
    fn set_string_constant(&mut self, value: ValueId, v: String) -> IrResult<()>;

    fn delete_value(&mut self, value: ValueId) -> IrResult<()>;
    fn delete_block(&mut self, function: FunctionId, block: BlockId) -> IrResult<()>;

    fn value_type(&self, value: ValueId) -> IrResult<ResultType>;
}
