// -------------------------------------------------------------------------
// SPDX-FileCopyrightText: Copyright © 2025 The gmqcc-rs contributors
// SPDX-FileName: crates/qcc/src/lower/error.rs
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
//! Errors produced by the lowering pass (spec §7's error taxonomy).

use crate::ast::ConstructError;
use crate::common::SourceInfo;
use crate::ir::IrError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum LowerError {
    #[error("{location}: use of `{name}` before it was lowered")]
    UseBeforeDefinition { name: String, location: SourceInfo },

    #[error("{location}: ternary branches produced mismatched IR types ({on_true:?} vs {on_false:?})")]
    TypeMismatchAtPhi { location: SourceInfo, on_true: crate::ast::ResultType, on_false: crate::ast::ResultType },

    #[error("{location}: function `{name}` has a non-void return type but its body does not return on all paths")]
    MissingReturn { name: String, location: SourceInfo },

    #[error("unsupported feature: {0}")]
    UnsupportedFeature(&'static str),

    #[error(transparent)]
    IrBuilderFailure(#[from] IrError),

    #[error(transparent)]
    Construct(#[from] ConstructError),
}

pub type LowerResult<T> = Result<T, LowerError>;
