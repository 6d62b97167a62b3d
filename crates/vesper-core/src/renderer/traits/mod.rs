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

//! Collaborator contracts of the recording layer.
//!
//! - [`CommandExecutor`]: the device backend that replays commands.
//! - [`ShaderReflection`]: resolves binding names to slots for a shader.
//! - [`MaterialEvaluator`]: turns a compiled material into shader + bindings.
//! - [`ResourceAcquirer`]: keeps textures referenced for the current frame.

mod command_executor;
mod material;
mod shader_reflection;

pub use self::command_executor::{CommandExecutor, DrawArgs, ResolvedBinding};
pub use self::material::{
    CompiledMaterial, MaterialEvaluator, MaterialTexture, MaterialTextureSource, ResourceAcquirer,
};
pub use self::shader_reflection::ShaderReflection;
