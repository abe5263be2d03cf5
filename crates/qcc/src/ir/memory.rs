// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The gmqcc-rs contributors
// SPDX-FileName: crates/qcc/src/ir/memory.rs
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
//! A fully in-process [`IrBuilder`] implementation: plain `Vec`-backed
//! slabs of blocks and values, no backend dependency. This is the
//! reference builder every test in this crate lowers against; it plays
//! the role a real LLVM/bytecode backend would play downstream, which is
//! explicitly out of scope here (spec.md §1's "final bytecode emitter").
//!
//! Structurally this mirrors `typhon-analyzer`'s `ControlFlowGraph`/
//! `BasicBlock` (id-indexed blocks with explicit successor bookkeeping),
//! adapted to also own instruction/value storage since there is no
//! separate AST-node table to point back into here.

use rustc_hash::FxHashMap;

use super::{BlockId, FunctionId, IrBuilder, IrError, IrResult, ValueId};
use crate::ast::{BinOpcode, ResultType, StoreOpcode, UnOpcode};

#[derive(Debug, Clone)]
enum ConstantPayload {
    Float(f64),
    Vector([f64; 3]),
    String(String),
}

#[derive(Debug, Clone)]
enum Instruction {
    Binop { op: BinOpcode, lhs: ValueId, rhs: ValueId },
    Unary { op: UnOpcode, operand: ValueId },
    Call { callee: ValueId, args: Vec<ValueId> },
    FieldAddress { entity: ValueId, field: ValueId },
    LoadFromEntity { entity: ValueId, field: ValueId },
    Phi { incoming: Vec<(BlockId, ValueId)> },
    ExtractVectorComponent { owner: ValueId, index: u8 },
}

#[derive(Debug, Clone)]
enum ValueKind {
    Global,
    Field,
    Local { is_parameter: bool },
    /// The callable value representing an IR function (see
    /// `IrBuilder::create_function`'s doc comment for why functions are
    /// modeled as values rather than returning a bare `FunctionId`).
    Function(FunctionId),
    Instruction(Instruction),
}

#[derive(Debug, Clone)]
struct ValueSlot {
    kind: ValueKind,
    result_type: ResultType,
    constant: Option<ConstantPayload>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
    Return(Option<ValueId>),
    Jump(BlockId),
    CondBranch { cond: ValueId, if_true: BlockId, if_false: BlockId },
}

#[derive(Debug, Clone)]
struct BlockData {
    function: FunctionId,
    #[allow(dead_code)] // carried for debugging/diagnostics parity with the label spec calls out
    label: String,
    instructions: Vec<ValueId>,
    terminator: Option<Terminator>,
}

#[derive(Debug, Clone)]
struct FunctionData {
    #[allow(dead_code)]
    name: String,
    #[allow(dead_code)]
    return_type: ResultType,
    parameters: Vec<ResultType>,
    /// Block layout order — what spec.md calls "the function's block list".
    blocks: Vec<BlockId>,
}

/// In-memory `IrBuilder`. Globals are keyed by name for `create_global`
/// idempotence diagnostics only; nothing here is an optimization.
#[derive(Debug, Default)]
pub struct MemoryIr {
    values: Vec<Option<ValueSlot>>,
    blocks: Vec<Option<BlockData>>,
    functions: Vec<Option<FunctionData>>,
    global_names: FxHashMap<String, ValueId>,
}

impl MemoryIr {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    fn function(&self, id: FunctionId) -> IrResult<&FunctionData> {
        self.functions.get(id.0 as usize).and_then(Option::as_ref).ok_or(IrError::UnknownFunction(id))
    }

    fn function_mut(&mut self, id: FunctionId) -> IrResult<&mut FunctionData> {
        self.functions.get_mut(id.0 as usize).and_then(Option::as_mut).ok_or(IrError::UnknownFunction(id))
    }

    fn block(&self, id: BlockId) -> IrResult<&BlockData> {
        self.blocks.get(id.0 as usize).and_then(Option::as_ref).ok_or(IrError::UnknownBlock(id))
    }

    fn block_mut(&mut self, id: BlockId) -> IrResult<&mut BlockData> {
        self.blocks.get_mut(id.0 as usize).and_then(Option::as_mut).ok_or(IrError::UnknownBlock(id))
    }

    fn value(&self, id: ValueId) -> IrResult<&ValueSlot> {
        self.values.get(id.0 as usize).and_then(Option::as_ref).ok_or(IrError::UnknownValue(id))
    }

    fn value_mut(&mut self, id: ValueId) -> IrResult<&mut ValueSlot> {
        self.values.get_mut(id.0 as usize).and_then(Option::as_mut).ok_or(IrError::UnknownValue(id))
    }

    /// Validates existence without borrowing the slot further, for callers
    /// that only need to confirm a `ValueId` is live (e.g. `emit_store`'s
    /// operands, which carry no result of their own).
    fn check_value(&self, id: ValueId) -> IrResult<()> { self.value(id).map(|_| ()) }

    fn push_value(&mut self, kind: ValueKind, result_type: ResultType) -> ValueId {
        let id = ValueId(self.values.len() as u32);
        self.values.push(Some(ValueSlot { kind, result_type, constant: None }));
        id
    }

    fn push_instruction(&mut self, block: BlockId, instruction: Instruction, result_type: ResultType) -> IrResult<ValueId> {
        self.block(block)?;
        let id = self.push_value(ValueKind::Instruction(instruction), result_type);
        self.block_mut(block)?.instructions.push(id);
        Ok(id)
    }
}

impl IrBuilder for MemoryIr {
    fn create_function(&mut self, name: &str, return_type: ResultType) -> IrResult<ValueId> {
        let function_id = FunctionId(self.functions.len() as u32);
        self.functions.push(Some(FunctionData {
            name: name.to_string(),
            return_type,
            parameters: Vec::new(),
            blocks: Vec::new(),
        }));
        Ok(self.push_value(ValueKind::Function(function_id), return_type))
    }

    fn function_of(&self, value: ValueId) -> IrResult<FunctionId> {
        match self.value(value)?.kind {
            ValueKind::Function(function_id) => Ok(function_id),
            _ => Err(IrError::NotAFunctionValue(value)),
        }
    }

    fn create_global(&mut self, name: &str, ty: ResultType) -> IrResult<ValueId> {
        let id = self.push_value(ValueKind::Global, ty);
        self.global_names.insert(name.to_string(), id);
        Ok(id)
    }

    fn create_field(&mut self, _name: &str, payload_type: ResultType) -> IrResult<ValueId> {
        Ok(self.push_value(ValueKind::Field, payload_type))
    }

    fn create_local(&mut self, function: FunctionId, _name: &str, ty: ResultType, is_parameter: bool) -> IrResult<ValueId> {
        self.function(function)?;
        Ok(self.push_value(ValueKind::Local { is_parameter }, ty))
    }

    fn append_parameter_type(&mut self, function: FunctionId, ty: ResultType) -> IrResult<()> {
        self.function_mut(function)?.parameters.push(ty);
        Ok(())
    }

    fn create_block(&mut self, function: FunctionId, label: &str) -> IrResult<BlockId> {
        self.function(function)?;
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(Some(BlockData {
            function,
            label: label.to_string(),
            instructions: Vec::new(),
            terminator: None,
        }));
        self.function_mut(function)?.blocks.push(id);
        Ok(id)
    }

    fn append_block(&mut self, function: FunctionId, block: BlockId) -> IrResult<()> {
        if self.block(block)?.function != function {
            return Err(IrError::BlockNotInFunction(block, function));
        }
        self.function_mut(function)?.blocks.push(block);
        Ok(())
    }

    fn remove_block_at_index(&mut self, function: FunctionId, index: usize) -> IrResult<BlockId> {
        let f = self.function_mut(function)?;
        if index >= f.blocks.len() {
            return Err(IrError::BlockIndexOutOfRange { function, index, len: f.blocks.len() });
        }
        Ok(f.blocks.remove(index))
    }

    fn block_position(&self, function: FunctionId, block: BlockId) -> IrResult<usize> {
        let f = self.function(function)?;
        f.blocks
            .iter()
            .position(|&b| b == block)
            .ok_or(IrError::BlockNotInFunction(block, function))
    }

    fn block_order(&self, function: FunctionId) -> IrResult<Vec<BlockId>> { Ok(self.function(function)?.blocks.clone()) }

    fn is_terminated(&self, block: BlockId) -> IrResult<bool> { Ok(self.block(block)?.terminator.is_some()) }

    fn emit_binop(&mut self, block: BlockId, op: BinOpcode, lhs: ValueId, rhs: ValueId, result_type: ResultType) -> IrResult<ValueId> {
        self.check_value(lhs)?;
        self.check_value(rhs)?;
        self.push_instruction(block, Instruction::Binop { op, lhs, rhs }, result_type)
    }

    fn emit_unary(&mut self, block: BlockId, op: UnOpcode, operand: ValueId, result_type: ResultType) -> IrResult<ValueId> {
        self.check_value(operand)?;
        self.push_instruction(block, Instruction::Unary { op, operand }, result_type)
    }

    fn emit_store(&mut self, block: BlockId, _op: StoreOpcode, dest: ValueId, src: ValueId) -> IrResult<()> {
        self.block(block)?;
        self.check_value(dest)?;
        self.check_value(src)?;
        Ok(())
    }

    fn emit_return(&mut self, block: BlockId, value: Option<ValueId>) -> IrResult<()> {
        if let Some(v) = value {
            self.check_value(v)?;
        }
        self.block_mut(block)?.terminator = Some(Terminator::Return(value));
        Ok(())
    }

    fn emit_jump(&mut self, block: BlockId, target: BlockId) -> IrResult<()> {
        self.block(target)?;
        self.block_mut(block)?.terminator = Some(Terminator::Jump(target));
        Ok(())
    }

    fn emit_conditional_branch(&mut self, block: BlockId, cond: ValueId, if_true: BlockId, if_false: BlockId) -> IrResult<()> {
        self.check_value(cond)?;
        self.block(if_true)?;
        self.block(if_false)?;
        self.block_mut(block)?.terminator = Some(Terminator::CondBranch { cond, if_true, if_false });
        Ok(())
    }

    fn emit_call(&mut self, block: BlockId, callee: ValueId, result_type: ResultType) -> IrResult<ValueId> {
        self.check_value(callee)?;
        self.push_instruction(block, Instruction::Call { callee, args: Vec::new() }, result_type)
    }

    fn attach_argument(&mut self, call: ValueId, arg: ValueId) -> IrResult<()> {
        self.check_value(arg)?;
        match &mut self.value_mut(call)?.kind {
            ValueKind::Instruction(Instruction::Call { args, .. }) => {
                args.push(arg);
                Ok(())
            }
            _ => Err(IrError::NotACall(call)),
        }
    }

    fn emit_field_address(&mut self, block: BlockId, entity: ValueId, field: ValueId, result_type: ResultType) -> IrResult<ValueId> {
        self.check_value(entity)?;
        self.check_value(field)?;
        self.push_instruction(block, Instruction::FieldAddress { entity, field }, result_type)
    }

    fn emit_load_from_entity(&mut self, block: BlockId, entity: ValueId, field: ValueId, result_type: ResultType) -> IrResult<ValueId> {
        self.check_value(entity)?;
        self.check_value(field)?;
        self.push_instruction(block, Instruction::LoadFromEntity { entity, field }, result_type)
    }

    fn create_phi(&mut self, block: BlockId, result_type: ResultType) -> IrResult<ValueId> {
        self.push_instruction(block, Instruction::Phi { incoming: Vec::new() }, result_type)
    }

    fn add_incoming(&mut self, phi: ValueId, from_block: BlockId, value: ValueId) -> IrResult<()> {
        self.check_value(value)?;
        self.block(from_block)?;
        match &mut self.value_mut(phi)?.kind {
            ValueKind::Instruction(Instruction::Phi { incoming }) => {
                incoming.push((from_block, value));
                Ok(())
            }
            _ => Err(IrError::NotAPhi(phi)),
        }
    }

    fn extract_vector_component(&mut self, owner: ValueId, index: u8, result_type: ResultType) -> IrResult<ValueId> {
        self.check_value(owner)?;
        Ok(self.push_value(ValueKind::Instruction(Instruction::ExtractVectorComponent { owner, index }), result_type))
    }

    fn set_float_constant(&mut self, value: ValueId, v: f64) -> IrResult<()> {
        self.value_mut(value)?.constant = Some(ConstantPayload::Float(v));
        Ok(())
    }

    fn set_vector_constant(&mut self, value: ValueId, v: [f64; 3]) -> IrResult<()> {
        self.value_mut(value)?.constant = Some(ConstantPayload::Vector(v));
        Ok(())
    }

    fn set_string_constant(&mut self, value: ValueId, v: String) -> IrResult<()> {
        self.value_mut(value)?.constant = Some(ConstantPayload::String(v));
        Ok(())
    }

    fn delete_value(&mut self, value: ValueId) -> IrResult<()> {
        self.value(value)?;
        self.values[value.0 as usize] = None;
        Ok(())
    }

    fn delete_block(&mut self, function: FunctionId, block: BlockId) -> IrResult<()> {
        self.block(block)?;
        let f = self.function_mut(function)?;
        f.blocks.retain(|&b| b != block);
        self.blocks[block.0 as usize] = None;
        Ok(())
    }

    fn value_type(&self, value: ValueId) -> IrResult<ResultType> { Ok(self.value(value)?.result_type) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ResultType;

    #[test]
    fn create_block_appends_to_function_order() {
        let mut ir = MemoryIr::new();
        let f_val = ir.create_function("main", ResultType::Void).unwrap();
        let f = ir.function_of(f_val).unwrap();
        let b0 = ir.create_block(f, "entry").unwrap();
        let b1 = ir.create_block(f, "next").unwrap();
        assert_eq!(ir.block_order(f).unwrap(), vec![b0, b1]);
    }

    #[test]
    fn remove_then_append_moves_block_to_end() {
        let mut ir = MemoryIr::new();
        let f_val = ir.create_function("main", ResultType::Void).unwrap();
        let f = ir.function_of(f_val).unwrap();
        let b0 = ir.create_block(f, "a").unwrap();
        let b1 = ir.create_block(f, "b").unwrap();
        let b2 = ir.create_block(f, "c").unwrap();
        let idx = ir.block_position(f, b1).unwrap();
        let removed = ir.remove_block_at_index(f, idx).unwrap();
        ir.append_block(f, removed).unwrap();
        assert_eq!(ir.block_order(f).unwrap(), vec![b0, b2, b1]);
    }

    #[test]
    fn block_is_terminated_after_return() {
        let mut ir = MemoryIr::new();
        let f_val = ir.create_function("main", ResultType::Void).unwrap();
        let f = ir.function_of(f_val).unwrap();
        let b0 = ir.create_block(f, "entry").unwrap();
        assert!(!ir.is_terminated(b0).unwrap());
        ir.emit_return(b0, None).unwrap();
        assert!(ir.is_terminated(b0).unwrap());
    }

    #[test]
    fn phi_accumulates_two_incoming_edges() {
        let mut ir = MemoryIr::new();
        let f_val = ir.create_function("main", ResultType::Float).unwrap();
        let f = ir.function_of(f_val).unwrap();
        let b0 = ir.create_block(f, "tern_T").unwrap();
        let b1 = ir.create_block(f, "tern_F").unwrap();
        let merge = ir.create_block(f, "tern_out").unwrap();
        let v0 = ir.create_global("x", ResultType::Float).unwrap();
        let v1 = ir.create_global("y", ResultType::Float).unwrap();
        let phi = ir.create_phi(merge, ResultType::Float).unwrap();
        ir.add_incoming(phi, b0, v0).unwrap();
        ir.add_incoming(phi, b1, v1).unwrap();
        match &ir.value(phi).unwrap().kind {
            ValueKind::Instruction(Instruction::Phi { incoming }) => assert_eq!(incoming.len(), 2),
            other => panic!("expected phi, got {other:?}"),
        }
    }

    #[test]
    fn attach_argument_rejects_non_call_value() {
        let mut ir = MemoryIr::new();
        let v = ir.create_global("x", ResultType::Float).unwrap();
        assert!(ir.attach_argument(v, v).is_err());
    }
}
