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

use crate::renderer::constants::PushConstantData;
use crate::renderer::handles::{
    BatchId, ResourceHandle, ShaderId, StorageBufferId, TextureId, UniformBufferId,
};
use crate::renderer::state::{BarrierFlags, ClearPlanes, DrawState, SamplerState};

/// A resource binding with every deferred reference already dereferenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedBinding {
    /// A sampled texture.
    Texture {
        /// The texture to sample.
        texture: TextureId,
        /// The sampler to use.
        sampler: SamplerState,
    },
    /// A texture bound for image load/store.
    Image(TextureId),
    /// A uniform buffer.
    UniformBuffer(UniformBufferId),
    /// A storage buffer.
    StorageBuffer(StorageBufferId),
}

/// Arguments of a single draw, as seen by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawArgs {
    /// Number of instances, at least 1.
    pub instance_len: u32,
    /// Number of vertices, `None` to draw the whole batch.
    pub vertex_len: Option<u32>,
    /// First vertex, `None` to use the batch's own.
    pub vertex_first: Option<u32>,
    /// Per-draw resource set.
    pub handle: ResourceHandle,
}

/// The device backend a pass is replayed against.
///
/// There is one entry point per command kind. Calls are assumed infallible at
/// this layer: a backend that can fail reports it through its own channel.
/// Redundant shader and pipeline state changes are filtered out by the replay
/// state before they reach the executor.
pub trait CommandExecutor {
    /// Opens a named debug group. Called once per pass when debug groups are enabled.
    fn debug_group_begin(&mut self, _name: &str) {}

    /// Closes the last debug group opened by [`CommandExecutor::debug_group_begin`].
    fn debug_group_end(&mut self) {}

    /// Binds a shader program.
    fn bind_shader(&mut self, shader: ShaderId);

    /// Binds a resource to `slot`. Bindings whose name did not resolve when they
    /// were recorded are skipped and never reach the executor.
    fn bind_resource(&mut self, slot: i32, binding: ResolvedBinding);

    /// Uploads `array_len` uniform values to `location`, each made of
    /// `data.len() / array_len` components. Never called for unresolved locations.
    fn push_constant(&mut self, location: i32, array_len: usize, data: PushConstantData<'_>);

    /// Applies fixed-function pipeline state.
    fn set_state(&mut self, state: DrawState);

    /// Sets stencil masks and reference value.
    fn set_stencil(&mut self, write_mask: u8, reference: u8, compare_mask: u8);

    /// Flips the front-face winding for mirrored geometry.
    fn set_front_face_inverted(&mut self, inverted: bool);

    /// Draws a batch.
    fn draw(&mut self, batch: BatchId, args: &DrawArgs);

    /// Draws several instance sets of the same batch and vertex range at once.
    fn draw_multi(&mut self, batch: BatchId, draws: &[DrawArgs]);

    /// Draws a batch with arguments read from `buffer` on the device.
    fn draw_indirect(&mut self, batch: BatchId, buffer: StorageBufferId, handle: ResourceHandle);

    /// Dispatches compute work groups.
    fn dispatch(&mut self, group_count: [u32; 3]);

    /// Dispatches compute work groups with counts read from `buffer` on the device.
    fn dispatch_indirect(&mut self, buffer: StorageBufferId);

    /// Inserts a memory barrier.
    fn barrier(&mut self, barrier: BarrierFlags);

    /// Clears the bound frame-buffer planes.
    fn clear(&mut self, planes: ClearPlanes, color: [f32; 4], depth: f32, stencil: u8);
}
