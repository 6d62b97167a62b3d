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

//! Fixed-function pipeline state, barrier and clear masks recorded by passes.

use crate::vesper_bitflags;
use std::fmt;

vesper_bitflags! {
    /// Fixed-function pipeline state applied by a `StateSet` command.
    ///
    /// Replay starts every submission from [`DrawState::NO_DRAW`]. Stencil
    /// reference and masks are not part of this state; they are recorded
    /// separately with a `StencilSet` command.
    pub struct DrawState: u64 {
        /// Write depth to the depth buffer.
        const WRITE_DEPTH = 1 << 0;
        /// Write color to the color targets.
        const WRITE_COLOR = 1 << 1;
        /// Write to the stencil buffer.
        const WRITE_STENCIL = 1 << 2;
        /// Stencil writes for shadow volumes, depth-pass variant.
        const WRITE_STENCIL_SHADOW_PASS = 1 << 3;
        /// Stencil writes for shadow volumes, depth-fail variant.
        const WRITE_STENCIL_SHADOW_FAIL = 1 << 4;

        /// Depth test always passes.
        const DEPTH_ALWAYS = 1 << 5;
        /// Depth test passes when the fragment is closer.
        const DEPTH_LESS = 1 << 6;
        /// Depth test passes when the fragment is closer or equal.
        const DEPTH_LESS_EQUAL = 1 << 7;
        /// Depth test passes on equal depth.
        const DEPTH_EQUAL = 1 << 8;
        /// Depth test passes when the fragment is farther.
        const DEPTH_GREATER = 1 << 9;
        /// Depth test passes when the fragment is farther or equal.
        const DEPTH_GREATER_EQUAL = 1 << 10;

        /// Stencil test always passes.
        const STENCIL_ALWAYS = 1 << 11;
        /// Stencil test passes when the masked values are equal.
        const STENCIL_EQUAL = 1 << 12;
        /// Stencil test passes when the masked values differ.
        const STENCIL_NEQUAL = 1 << 13;

        /// Cull back faces.
        const CULL_BACK = 1 << 14;
        /// Cull front faces.
        const CULL_FRONT = 1 << 15;

        /// Additive blending weighted by source alpha.
        const BLEND_ADD = 1 << 16;
        /// Additive blending ignoring alpha.
        const BLEND_ADD_FULL = 1 << 17;
        /// Standard alpha blending.
        const BLEND_ALPHA = 1 << 18;
        /// Alpha blending with premultiplied source.
        const BLEND_ALPHA_PREMUL = 1 << 19;
        /// Multiplicative blending.
        const BLEND_MUL = 1 << 20;
        /// Subtractive blending.
        const BLEND_SUB = 1 << 21;
        /// Dual-source blending driven by the shader.
        const BLEND_CUSTOM = 1 << 22;
        /// Invert the destination color.
        const LOGIC_INVERT = 1 << 23;

        /// Draw in front of everything for selection.
        const IN_FRONT_SELECT = 1 << 24;
        /// Apply the polygon offset used by shadow maps.
        const SHADOW_OFFSET = 1 << 25;
        /// Enable user clip planes.
        const CLIP_PLANES = 1 << 26;
        /// Use the first vertex as provoking vertex.
        const FIRST_VERTEX_CONVENTION = 1 << 27;
        /// Let the vertex shader write the point size.
        const PROGRAM_POINT_SIZE = 1 << 28;
    }
}

impl DrawState {
    /// The state every submission starts from: nothing is written.
    pub const NO_DRAW: Self = Self::EMPTY;

    const WRITE_MASK: Self = Self::from_bits_retain(
        Self::WRITE_DEPTH.bits()
            | Self::WRITE_COLOR.bits()
            | Self::WRITE_STENCIL.bits()
            | Self::WRITE_STENCIL_SHADOW_PASS.bits()
            | Self::WRITE_STENCIL_SHADOW_FAIL.bits(),
    );

    const DEPTH_TEST_MASK: Self = Self::from_bits_retain(
        Self::DEPTH_ALWAYS.bits()
            | Self::DEPTH_LESS.bits()
            | Self::DEPTH_LESS_EQUAL.bits()
            | Self::DEPTH_EQUAL.bits()
            | Self::DEPTH_GREATER.bits()
            | Self::DEPTH_GREATER_EQUAL.bits(),
    );

    /// Returns `true` when at least one write flag is set.
    pub const fn writes_anything(&self) -> bool {
        self.intersects(Self::WRITE_MASK)
    }

    /// Returns `true` when a depth comparison is enabled.
    pub const fn has_depth_test(&self) -> bool {
        self.intersects(Self::DEPTH_TEST_MASK)
    }
}

vesper_bitflags! {
    /// Memory barriers between draws or dispatches.
    pub struct BarrierFlags: u32 {
        /// Shader image load/store.
        const SHADER_IMAGE_ACCESS = 1 << 0;
        /// Texture fetches after image writes.
        const TEXTURE_FETCH = 1 << 1;
        /// Texture updates from the host.
        const TEXTURE_UPDATE = 1 << 2;
        /// Indirect command buffers written by shaders.
        const COMMAND = 1 << 3;
        /// Frame-buffer attachments.
        const FRAMEBUFFER = 1 << 4;
        /// Shader storage buffer access.
        const SHADER_STORAGE = 1 << 5;
        /// Index buffers written by shaders.
        const ELEMENT_ARRAY = 1 << 6;
        /// Uniform buffers written by shaders.
        const UNIFORM = 1 << 7;
        /// Buffer updates from the host.
        const BUFFER_UPDATE = 1 << 8;
        /// Vertex buffers written by shaders.
        const VERTEX_ATTRIB_ARRAY = 1 << 9;
    }
}

vesper_bitflags! {
    /// Frame-buffer planes touched by a `Clear` command.
    pub struct ClearPlanes: u8 {
        /// Color attachments.
        const COLOR = 1 << 0;
        /// Depth attachment.
        const DEPTH = 1 << 1;
        /// Stencil attachment.
        const STENCIL = 1 << 2;
    }
}

vesper_bitflags! {
    /// Sampling parameters of an explicit [`SamplerState`].
    pub struct SamplerFlags: u16 {
        /// Linear filtering.
        const FILTER = 1 << 0;
        /// Mip-mapped sampling.
        const MIPMAP = 1 << 1;
        /// Repeat along S.
        const REPEAT_S = 1 << 2;
        /// Repeat along T.
        const REPEAT_T = 1 << 3;
        /// Repeat along R.
        const REPEAT_R = 1 << 4;
        /// Clamp to the border color instead of the edge.
        const CLAMP_BORDER = 1 << 5;
        /// Depth comparison sampling.
        const COMPARE = 1 << 6;
        /// Anisotropic filtering.
        const ANISO = 1 << 7;
    }
}

/// Sampler used when binding a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SamplerState {
    /// Keep the sampler state stored on the texture itself.
    #[default]
    Auto,
    /// Override with explicit parameters.
    Explicit(SamplerFlags),
}

impl fmt::Display for SamplerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplerState::Auto => write!(f, "auto"),
            SamplerState::Explicit(flags) => write!(f, "{flags}"),
        }
    }
}

/// Primitive topology of the built-in procedural batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// One vertex per point.
    Points,
    /// Two vertices per line.
    Lines,
    /// Three vertices per triangle.
    Triangles,
    /// Triangle strip.
    TriangleStrip,
}
