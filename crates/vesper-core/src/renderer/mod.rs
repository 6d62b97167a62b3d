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

//! Backend-agnostic rendering contracts for the recording layer.
//!
//! This module defines the vocabulary shared by everything that records or
//! replays draw passes: opaque resource handles, pipeline state masks, push
//! constant payloads and the collaborator traits a device backend implements.
//! The recording layer only ever sees these types; the 'how' of executing them
//! belongs to whatever implements [`CommandExecutor`].

pub mod constants;
pub mod error;
pub mod handles;
pub mod state;
pub mod traits;

pub use self::constants::{ConstantCell, ConstantKind, PushConstantData, PushConstantValue};
pub use self::error::ContractError;
pub use self::handles::*;
pub use self::state::*;
pub use self::traits::{
    CommandExecutor, CompiledMaterial, DrawArgs, MaterialEvaluator, MaterialTexture,
    MaterialTextureSource, ResolvedBinding, ResourceAcquirer, ShaderReflection,
};
