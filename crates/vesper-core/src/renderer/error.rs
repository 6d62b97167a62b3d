// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Errors reported by collaborator services to the recording layer.
//!
//! Misuse of the recording API itself (binding by name with no shader bound,
//! using a stale sub-pass reference) is a programming error and panics. The
//! errors here are conditions owned by the services, which a caller can react to.

use crate::renderer::handles::MaterialId;
use std::fmt;

/// An error raised by a collaborator while a pass is being recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// The material evaluator does not know this material.
    MaterialNotFound {
        /// The material that was requested.
        id: MaterialId,
    },
    /// The material exists but its shader failed to compile or is still compiling.
    MaterialNotCompiled {
        /// The material that was requested.
        id: MaterialId,
        /// Evaluator-provided reason.
        reason: String,
    },
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractError::MaterialNotFound { id } => {
                write!(f, "Material not found for ID: {id:?}")
            }
            ContractError::MaterialNotCompiled { id, reason } => {
                write!(f, "Material {id:?} is not compiled: {reason}")
            }
        }
    }
}

impl std::error::Error for ContractError {}
