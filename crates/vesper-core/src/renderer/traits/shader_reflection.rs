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

use crate::renderer::handles::ShaderId;

/// Shader interface queries, answered at record time.
///
/// Every lookup returns `-1` when the shader has no such binding, mirroring
/// what graphics APIs report for inactive uniforms. The value is recorded as is.
pub trait ShaderReflection: Send + Sync {
    /// Location of a plain uniform.
    fn uniform_location(&self, shader: ShaderId, name: &str) -> i32;

    /// Binding point of a uniform block.
    fn uniform_block_binding(&self, shader: ShaderId, name: &str) -> i32;

    /// Binding point of a shader storage block.
    fn storage_block_binding(&self, shader: ShaderId, name: &str) -> i32;

    /// Binding point of a sampler or image.
    fn texture_binding(&self, shader: ShaderId, name: &str) -> i32;

    /// Human readable shader name, used by pass serialization.
    fn shader_name(&self, shader: ShaderId) -> String {
        format!("shader{shader}")
    }
}
