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

use crate::renderer::error::ContractError;
use crate::renderer::handles::{MaterialId, ShaderId, TextureId, UniformBufferId};
use crate::renderer::state::SamplerState;

/// Where the texture of a material slot comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterialTextureSource {
    /// An image texture. Must be acquired for the frame before binding.
    Image(TextureId),
    /// A tiled (UDIM) image: a texture array of tiles plus a tile mapping texture
    /// bound under its own sampler name.
    Tiled {
        /// The texture array holding the tiles.
        tiles: TextureId,
        /// The lookup texture mapping UVs to tiles.
        tile_map: TextureId,
        /// Sampler name of the tile mapping.
        tile_map_name: String,
    },
    /// A color ramp baked by the material system. Owned by the material, never acquired.
    ColorBand(TextureId),
}

/// One texture input of a compiled material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialTexture {
    /// Sampler name in the material shader.
    pub sampler_name: String,
    /// Sampler state requested by the material.
    pub sampler: SamplerState,
    /// Texture source.
    pub source: MaterialTextureSource,
}

/// A compiled material, ready to be bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledMaterial {
    /// The material's shader program.
    pub shader: ShaderId,
    /// Texture inputs, in binding order.
    pub textures: Vec<MaterialTexture>,
    /// Material parameters block, bound under [`CompiledMaterial::UBO_BLOCK_NAME`].
    pub uniform_buffer: Option<UniformBufferId>,
}

impl CompiledMaterial {
    /// Name of the uniform block holding the material parameters.
    pub const UBO_BLOCK_NAME: &'static str = "node_tree";
}

/// The material system, as seen by the recording layer.
pub trait MaterialEvaluator {
    /// Returns the shader and bindings of a compiled material.
    fn evaluate(&self, material: MaterialId) -> Result<CompiledMaterial, ContractError>;
}

/// Frame-scoped texture acquisition.
///
/// Acquired textures stay alive at least until the frame that recorded them
/// has been submitted. The exact policy belongs to the implementor.
pub trait ResourceAcquirer {
    /// Marks `texture` as referenced by the current frame.
    fn acquire_texture(&mut self, texture: TextureId);
}
