// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The gmqcc-rs contributors
// SPDX-FileName: crates/qcc/src/lower/values.rs
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
//! Global and local Value lowering (spec §4.G "Global vs local Value
//! lowering") and the use-before-definition check every read goes
//! through.

use crate::ast::{ConstPayload, ResultType, ValueRef};
use crate::ir::IrBuilder;

use super::error::{LowerError, LowerResult};

/// Lowers a single global Value, dispatching on its concrete type
/// (spec §4.G): function-typed const Values create an IR function;
/// field-typed Values create an IR field; everything else becomes an IR
/// global, populated with its constant payload when present. Installs
/// the Value's IR back-link on success; a no-op if the Value was already
/// lowered (driver may revisit a shared Value through two owners).
pub fn lower_global(ir: &mut impl IrBuilder, value: &ValueRef) -> LowerResult<()> {
    if value.borrow().is_lowered() {
        return Ok(());
    }

    let (result_type, is_const, constant, name) = {
        let v = value.borrow();
        (v.base.result_type, v.is_const, v.constant.clone(), v.name.clone().unwrap_or_default())
    };

    let ir_value = match result_type {
        ResultType::Function if is_const => ir.create_function(&name, return_type_of(value))?,
        ResultType::Field => {
            if matches!(constant, Some(ConstPayload::Function(_))) {
                return Err(LowerError::UnsupportedFeature("constant field pointer"));
            }
            ir.create_field(&name, payload_type_of(value))?
        }
        _ => {
            let global = ir.create_global(&name, result_type)?;
            apply_constant(ir, global, constant.as_ref())?;
            global
        }
    };

    value.borrow_mut().ir_value = Some(ir_value);
    Ok(())
}

/// Lowers a single local Value inside the function currently being
/// lowered. Function-typed locals are rejected (closures/nested function
/// values are out of this language's scope); everything else becomes an
/// IR local, with the parameter flag threaded through for signature
/// slots and the constant payload applied for const locals.
pub fn lower_local(
    ir: &mut impl IrBuilder,
    function: crate::ir::FunctionId,
    value: &ValueRef,
    is_parameter: bool,
) -> LowerResult<()> {
    if value.borrow().is_lowered() {
        return Ok(());
    }

    let (result_type, is_const, constant, name) = {
        let v = value.borrow();
        (v.base.result_type, v.is_const, v.constant.clone(), v.name.clone().unwrap_or_default())
    };

    if result_type == ResultType::Function {
        return Err(LowerError::UnsupportedFeature("function-typed local value"));
    }

    let local = ir.create_local(function, &name, result_type, is_parameter)?;
    if is_const {
        apply_constant(ir, local, constant.as_ref())?;
    }
    value.borrow_mut().ir_value = Some(local);
    Ok(())
}

/// Reads a Value that must already have been lowered (spec §4.G "Value
/// use (reads)"). Logs at debug level and fails otherwise, matching
/// spec §7's "reported to stderr at debug level" (routed through `log`
/// rather than written directly).
pub fn read_value(value: &ValueRef) -> LowerResult<crate::ir::ValueId> {
    let v = value.borrow();
    v.ir_value.ok_or_else(|| {
        let name = v.name.clone().unwrap_or_else(|| "<anonymous>".to_string());
        log::debug!("use of `{name}` at {} before it was lowered", v.base.source_info);
        LowerError::UseBeforeDefinition { name, location: v.base.source_info }
    })
}

fn apply_constant(ir: &mut impl IrBuilder, value: crate::ir::ValueId, constant: Option<&ConstPayload>) -> LowerResult<()> {
    match constant {
        Some(ConstPayload::Float(f)) => ir.set_float_constant(value, *f)?,
        Some(ConstPayload::Vector(v)) => ir.set_vector_constant(value, *v)?,
        Some(ConstPayload::String(s)) => ir.set_string_constant(value, s.clone())?,
        Some(ConstPayload::Function(_)) | None => {}
    }
    Ok(())
}

fn return_type_of(value: &ValueRef) -> ResultType {
    value.borrow().base.next_type.as_ref().map_or(ResultType::Void, |t| t.result_type)
}

fn payload_type_of(value: &ValueRef) -> ResultType {
    value.borrow().base.next_type.as_ref().map_or(ResultType::Void, |t| t.result_type)
}
