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

//! The pass hierarchy.
//!
//! A root [`Pass`] owns every piece of storage of its tree: its own command
//! stream, the arena of sub-passes and the draw buffer. Sub-passes are reached
//! through [`SubPassRef`], a plain index tagged with the root's init epoch, and
//! recorded into through a [`PassRecorder`] view borrowing the root.
//!
//! Name based bindings are resolved while recording, against the shader bound
//! at that point of the pass. Nothing touches the device until
//! [`Pass::submit`].

use super::command::{
    Barrier, BindResource, Bound, Clear, Command, CommandType, Dispatch, DispatchIndirect,
    DrawIndirect, GroupCount, Header, PushConstant, ResourceBind, ShaderBind, StateSet,
    StencilSet,
};
use super::draw_buf::{DrawCommandBuf, DrawCommandBuffer, DrawMultiBuf};
use super::state::RecordingState;
use super::stream::CommandStream;
use std::fmt::{self, Write};
use std::sync::Arc;
use vesper_core::renderer::{
    BarrierFlags, BatchId, ClearPlanes, CompiledMaterial, ConstantCell, ContractError, DrawArgs,
    DrawState, GroupCountCell, MaterialEvaluator, MaterialId, MaterialTextureSource,
    PrimitiveType, PushConstantValue, ResourceAcquirer, ResourceHandle, SamplerState, ShaderId,
    ShaderReflection, StorageBufferId, TextureId, UniformBufferId,
};
use vesper_core::PassConfig;
use vesper_data::BlockArena;

/// Built-in batches used by procedural draws, one per primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProceduralBatches {
    /// Point list.
    pub points: BatchId,
    /// Line list.
    pub lines: BatchId,
    /// Triangle list.
    pub triangles: BatchId,
    /// Triangle strip.
    pub triangle_strips: BatchId,
}

impl ProceduralBatches {
    /// The batch drawing `primitive`.
    pub fn get(&self, primitive: PrimitiveType) -> BatchId {
        match primitive {
            PrimitiveType::Points => self.points,
            PrimitiveType::Lines => self.lines,
            PrimitiveType::Triangles => self.triangles,
            PrimitiveType::TriangleStrip => self.triangle_strips,
        }
    }
}

/// Services consulted while recording.
#[derive(Clone)]
pub struct PassContext {
    reflection: Arc<dyn ShaderReflection>,
    procedural: ProceduralBatches,
}

impl PassContext {
    /// Bundles the shader reflection service and the procedural batches.
    pub fn new(reflection: Arc<dyn ShaderReflection>, procedural: ProceduralBatches) -> Self {
        Self {
            reflection,
            procedural,
        }
    }

    /// The shader reflection service.
    pub fn reflection(&self) -> &dyn ShaderReflection {
        self.reflection.as_ref()
    }

    /// The procedural batches.
    pub fn procedural(&self) -> &ProceduralBatches {
        &self.procedural
    }
}

impl fmt::Debug for PassContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassContext")
            .field("procedural", &self.procedural)
            .finish_non_exhaustive()
    }
}

/// Parameters of a draw call.
///
/// `None` counts use the batch's own values. A count of zero drops the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawParams {
    /// Number of instances, 1 when `None`.
    pub instance_len: Option<u32>,
    /// Number of vertices.
    pub vertex_len: Option<u32>,
    /// First vertex.
    pub vertex_first: Option<u32>,
    /// Per-draw resource set.
    pub handle: ResourceHandle,
}

impl DrawParams {
    /// Draws the whole batch `instance_len` times.
    pub fn instances(instance_len: u32) -> Self {
        Self {
            instance_len: Some(instance_len),
            ..Self::default()
        }
    }

    /// Restricts the draw to a vertex range.
    pub fn with_vertices(mut self, vertex_len: u32, vertex_first: Option<u32>) -> Self {
        self.vertex_len = Some(vertex_len);
        self.vertex_first = vertex_first;
        self
    }

    /// Sets the resource handle.
    pub fn with_handle(mut self, handle: ResourceHandle) -> Self {
        self.handle = handle;
        self
    }

    fn is_empty(&self) -> bool {
        self.instance_len == Some(0) || self.vertex_len == Some(0)
    }

    fn to_args(self) -> DrawArgs {
        DrawArgs {
            instance_len: self.instance_len.unwrap_or(1),
            vertex_len: self.vertex_len,
            vertex_first: self.vertex_first,
            handle: self.handle,
        }
    }
}

/// A binding target: an explicit slot, or a name looked up in the bound shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingSlot<'n> {
    /// Explicit slot. Usable before any shader is bound.
    Index(i32),
    /// Name resolved through the shader reflection service.
    Name(&'n str),
}

impl From<i32> for BindingSlot<'_> {
    fn from(slot: i32) -> Self {
        BindingSlot::Index(slot)
    }
}

impl<'n> From<&'n str> for BindingSlot<'n> {
    fn from(name: &'n str) -> Self {
        BindingSlot::Name(name)
    }
}

/// Reference to a sub-pass, valid until the next [`Pass::init`] of its root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubPassRef {
    index: u32,
    epoch: u32,
}

impl SubPassRef {
    /// Position of the sub-pass in its root's arena.
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

#[derive(Debug)]
struct PassData {
    name: String,
    stream: CommandStream,
    shader: Option<ShaderId>,
}

impl PassData {
    fn new(name: String, shader: Option<ShaderId>) -> Self {
        Self {
            name,
            stream: CommandStream::new(),
            shader,
        }
    }
}

/// Per-type command counts of a pass tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassStats {
    counts: [usize; CommandType::ALL.len()],
    draws: usize,
}

impl PassStats {
    /// Number of headers tagged `ty`.
    pub fn count(&self, ty: CommandType) -> usize {
        self.counts[ty.ordinal()]
    }

    /// Number of executable commands: spill slots and sub-pass headers excluded.
    pub fn commands(&self) -> usize {
        CommandType::ALL
            .iter()
            .filter(|ty| !matches!(ty, CommandType::None | CommandType::SubPass))
            .map(|ty| self.count(*ty))
            .sum()
    }

    /// Number of individual draws, merged or not.
    pub fn draws(&self) -> usize {
        self.draws
    }
}

impl fmt::Display for PassStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for ty in CommandType::ALL {
            let count = self.count(ty);
            if count == 0 {
                continue;
            }
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{ty:?}: {count}")?;
            first = false;
        }
        if first {
            write!(f, "empty")?;
        }
        Ok(())
    }
}

/// A root pass: a replayable tree of recorded commands.
///
/// A pass can be recorded once and submitted any number of times. Passes with
/// resource handles or by-reference bindings must be re-recorded when what they
/// point to goes away.
#[derive(Debug)]
pub struct Pass<B: DrawCommandBuffer> {
    root: PassData,
    sub_passes: BlockArena<PassData>,
    draw_buf: B,
    context: PassContext,
    config: PassConfig,
    epoch: u32,
}

/// Pass with strictly ordered draws.
pub type PassSimple = Pass<DrawCommandBuf>;

/// Pass tuned for many draws: consecutive draws are merged and grouped.
pub type PassMain = Pass<DrawMultiBuf>;

impl<B: DrawCommandBuffer> Pass<B> {
    /// Creates an empty pass.
    pub fn new(name: impl Into<String>, context: PassContext) -> Self {
        Self {
            root: PassData::new(name.into(), None),
            sub_passes: BlockArena::new(),
            draw_buf: B::default(),
            context,
            config: PassConfig::default(),
            epoch: 0,
        }
    }

    /// Replaces the pass options.
    pub fn with_config(mut self, config: PassConfig) -> Self {
        self.config = config;
        self
    }

    /// Debug name of the pass.
    pub fn name(&self) -> &str {
        &self.root.name
    }

    /// The draw buffer shared by the whole tree.
    pub fn draw_buffer(&self) -> &B {
        &self.draw_buf
    }

    /// Number of sub-passes in the tree, at any depth.
    pub fn sub_pass_len(&self) -> usize {
        self.sub_passes.len()
    }

    /// Clears the whole tree. Every [`SubPassRef`] handed out so far becomes stale.
    pub fn init(&mut self) {
        self.root.stream.clear();
        self.root.shader = None;
        self.sub_passes.clear();
        self.draw_buf.clear();
        self.epoch = self.epoch.wrapping_add(1);
        log::debug!("Initialized pass '{}'", self.root.name);
    }

    /// Records into the root.
    pub fn root(&mut self) -> PassRecorder<'_, B> {
        PassRecorder {
            pass: self,
            target: None,
        }
    }

    /// Records into a sub-pass.
    ///
    /// # Panics
    ///
    /// When `sub` was created before the last [`Pass::init`].
    pub fn at(&mut self, sub: SubPassRef) -> PassRecorder<'_, B> {
        assert_eq!(
            sub.epoch, self.epoch,
            "sub-pass reference used after its root pass was re-initialized"
        );
        assert!(
            sub.index() < self.sub_passes.len(),
            "sub-pass reference {} out of range",
            sub.index()
        );
        PassRecorder {
            pass: self,
            target: Some(sub.index()),
        }
    }

    /// Creates a sub-pass at the end of the root. Shorthand for `root().sub(name)`.
    pub fn sub(&mut self, name: impl Into<String>) -> SubPassRef {
        self.root().sub(name)
    }

    /// Replays the tree depth-first in record order.
    pub fn submit(&self, state: &mut RecordingState<'_>) {
        self.submit_root(self.root.stream.headers().iter().copied(), state);
    }

    /// Human readable dump of the tree, deterministic for a given recording.
    pub fn serialize(&self, prefix: &str) -> String {
        let mut out = String::new();
        self.serialize_pass(
            &self.root,
            self.root.stream.headers().iter().copied(),
            prefix,
            &mut out,
        );
        out
    }

    /// Per-type command counts over the whole tree.
    pub fn stats(&self) -> PassStats {
        let mut stats = PassStats {
            draws: self.draw_buf.draw_len(),
            ..PassStats::default()
        };
        for data in std::iter::once(&self.root).chain(self.sub_passes.iter()) {
            for header in data.stream.headers() {
                stats.counts[header.ty.ordinal()] += 1;
            }
        }
        stats
    }

    pub(crate) fn root_headers(&self) -> &[Header] {
        self.root.stream.headers()
    }

    pub(crate) fn sub_pass_ref(&self, index: u32) -> SubPassRef {
        SubPassRef {
            index,
            epoch: self.epoch,
        }
    }

    /// Replays the root with its headers in the given order.
    pub(crate) fn submit_root(
        &self,
        headers: impl Iterator<Item = Header>,
        state: &mut RecordingState<'_>,
    ) {
        log::debug!(
            "Submitting pass '{}' ({} sub-passes, {} draws)",
            self.root.name,
            self.sub_passes.len(),
            self.draw_buf.draw_len()
        );
        self.submit_pass(&self.root, headers, state);
        state.cleanup();
    }

    fn submit_pass(
        &self,
        data: &PassData,
        headers: impl Iterator<Item = Header>,
        state: &mut RecordingState<'_>,
    ) {
        if self.config.debug_groups {
            state.debug_group_begin(&data.name);
        }
        for header in headers {
            if header.ty != CommandType::SubPass {
                data.stream.execute(header, &self.draw_buf, state);
                continue;
            }
            match self.sub_passes.get(header.index as usize) {
                Some(sub) => self.submit_pass(sub, sub.stream.headers().iter().copied(), state),
                None => log::warn!("Pass '{}' refers to a missing sub-pass", data.name),
            }
        }
        if self.config.debug_groups {
            state.debug_group_end();
        }
    }

    /// Serializes the root with its headers in the given order.
    pub(crate) fn serialize_root(&self, headers: impl Iterator<Item = Header>, prefix: &str) -> String {
        let mut out = String::new();
        self.serialize_pass(&self.root, headers, prefix, &mut out);
        out
    }

    fn serialize_pass(
        &self,
        data: &PassData,
        headers: impl Iterator<Item = Header>,
        prefix: &str,
        out: &mut String,
    ) {
        let _ = writeln!(out, "{prefix}.{}", data.name);
        let inner = format!("{prefix}  ");
        for header in headers {
            if header.ty != CommandType::SubPass {
                data.stream.describe(
                    header,
                    &self.draw_buf,
                    self.context.reflection(),
                    &inner,
                    out,
                );
                continue;
            }
            if let Some(sub) = self.sub_passes.get(header.index as usize) {
                self.serialize_pass(sub, sub.stream.headers().iter().copied(), &inner, out);
            }
        }
    }
}

/// Records into one pass of a tree: the root or one of its sub-passes.
///
/// Every recording method returns the recorder so calls can be chained.
pub struct PassRecorder<'a, B: DrawCommandBuffer> {
    pass: &'a mut Pass<B>,
    target: Option<usize>,
}

impl<'a, B: DrawCommandBuffer> PassRecorder<'a, B> {
    fn data(&self) -> &PassData {
        match self.target {
            None => &self.pass.root,
            Some(index) => &self.pass.sub_passes[index],
        }
    }

    fn data_mut(&mut self) -> &mut PassData {
        match self.target {
            None => &mut self.pass.root,
            Some(index) => &mut self.pass.sub_passes[index],
        }
    }

    fn record(&mut self, command: Command) -> &mut Self {
        self.data_mut().stream.record(command);
        self
    }

    /// Debug name of the pass being recorded.
    pub fn name(&self) -> &str {
        &self.data().name
    }

    /// The shader used for name lookups, if any.
    pub fn shader(&self) -> Option<ShaderId> {
        self.data().shader
    }

    /// Number of headers recorded into this pass.
    pub fn len(&self) -> usize {
        self.data().stream.len()
    }

    /// Returns `true` if nothing was recorded into this pass.
    pub fn is_empty(&self) -> bool {
        self.data().stream.is_empty()
    }

    /// Appends a sub-pass inheriting the currently bound shader.
    pub fn sub(&mut self, name: impl Into<String>) -> SubPassRef {
        let shader = self.data().shader;
        let index = self.pass.sub_passes.push(PassData::new(name.into(), shader));
        self.data_mut().stream.record_sub_pass(index);
        self.pass.sub_pass_ref(index as u32)
    }

    /// Appends a sub-pass and continues recording inside it.
    pub fn into_sub(mut self, name: impl Into<String>) -> PassRecorder<'a, B> {
        let sub = self.sub(name);
        PassRecorder {
            pass: self.pass,
            target: Some(sub.index()),
        }
    }

    /// Records a fixed-function state change. Stencil values are separate,
    /// see [`PassRecorder::state_stencil`].
    pub fn state_set(&mut self, state: DrawState) -> &mut Self {
        self.record(Command::StateSet(StateSet { state }))
    }

    /// Records stencil masks and reference value.
    ///
    /// `compare_mask & reference` is tested against `compare_mask & stored`,
    /// and `write_mask & reference` is written when the test passes.
    pub fn state_stencil(&mut self, write_mask: u8, reference: u8, compare_mask: u8) -> &mut Self {
        self.record(Command::StencilSet(StencilSet {
            write_mask,
            reference,
            compare_mask,
        }))
    }

    /// Binds a shader. Following name based bindings use its interface.
    pub fn shader_set(&mut self, shader: ShaderId) -> &mut Self {
        self.data_mut().shader = Some(shader);
        self.record(Command::ShaderBind(ShaderBind { shader }))
    }

    /// Binds a compiled material's shader and resources.
    ///
    /// Image textures are acquired for the frame through `resources`. Nothing is
    /// recorded when the material cannot be evaluated.
    pub fn material_set(
        &mut self,
        materials: &dyn MaterialEvaluator,
        resources: &mut dyn ResourceAcquirer,
        material: MaterialId,
    ) -> Result<&mut Self, ContractError> {
        let compiled = materials.evaluate(material)?;
        self.shader_set(compiled.shader);

        for texture in &compiled.textures {
            let name = texture.sampler_name.as_str();
            match &texture.source {
                MaterialTextureSource::Image(image) => {
                    resources.acquire_texture(*image);
                    self.bind_texture(name, *image, texture.sampler);
                }
                MaterialTextureSource::Tiled {
                    tiles,
                    tile_map,
                    tile_map_name,
                } => {
                    resources.acquire_texture(*tiles);
                    self.bind_texture(name, *tiles, texture.sampler);
                    resources.acquire_texture(*tile_map);
                    self.bind_texture(tile_map_name.as_str(), *tile_map, texture.sampler);
                }
                MaterialTextureSource::ColorBand(band) => {
                    self.bind_texture(name, *band, SamplerState::Auto);
                }
            }
        }

        if let Some(ubo) = compiled.uniform_buffer {
            self.bind_ubo(CompiledMaterial::UBO_BLOCK_NAME, ubo);
        }
        Ok(self)
    }

    fn clear(&mut self, planes: ClearPlanes, color: [f32; 4], depth: f32, stencil: u8) -> &mut Self {
        self.record(Command::Clear(Clear {
            planes,
            color,
            depth,
            stencil,
        }))
    }

    /// Clears the color targets.
    pub fn clear_color(&mut self, color: [f32; 4]) -> &mut Self {
        self.clear(ClearPlanes::COLOR, color, 0.0, 0)
    }

    /// Clears the depth buffer.
    pub fn clear_depth(&mut self, depth: f32) -> &mut Self {
        self.clear(ClearPlanes::DEPTH, [0.0; 4], depth, 0)
    }

    /// Clears the stencil buffer.
    pub fn clear_stencil(&mut self, stencil: u8) -> &mut Self {
        self.clear(ClearPlanes::STENCIL, [0.0; 4], 0.0, stencil)
    }

    /// Clears depth and stencil.
    pub fn clear_depth_stencil(&mut self, depth: f32, stencil: u8) -> &mut Self {
        self.clear(ClearPlanes::DEPTH | ClearPlanes::STENCIL, [0.0; 4], depth, stencil)
    }

    /// Clears color, depth and stencil.
    pub fn clear_color_depth_stencil(&mut self, color: [f32; 4], depth: f32, stencil: u8) -> &mut Self {
        self.clear(
            ClearPlanes::COLOR | ClearPlanes::DEPTH | ClearPlanes::STENCIL,
            color,
            depth,
            stencil,
        )
    }

    /// Records a draw. Dropped when the instance or vertex count is zero.
    pub fn draw(&mut self, batch: BatchId, params: DrawParams) -> &mut Self {
        if params.is_empty() {
            log::trace!("Dropping empty draw of batch {batch}");
            return self;
        }
        debug_assert!(
            self.data().shader.is_some(),
            "draw recorded in pass '{}' with no shader bound",
            self.data().name
        );
        let Pass {
            root,
            sub_passes,
            draw_buf,
            ..
        } = &mut *self.pass;
        let data = match self.target {
            None => root,
            Some(index) => &mut sub_passes[index],
        };
        draw_buf.append_draw(&mut data.stream, batch, params.to_args());
        self
    }

    /// Records a draw of a built-in procedural batch. Dropped when a count is zero.
    pub fn draw_procedural(
        &mut self,
        primitive: PrimitiveType,
        instance_len: u32,
        vertex_len: u32,
        vertex_first: Option<u32>,
        handle: ResourceHandle,
    ) -> &mut Self {
        let batch = self.pass.context.procedural.get(primitive);
        let params = DrawParams::instances(instance_len)
            .with_vertices(vertex_len, vertex_first)
            .with_handle(handle);
        self.draw(batch, params)
    }

    /// Records a draw with arguments read from `buffer` on the device.
    pub fn draw_indirect(
        &mut self,
        batch: BatchId,
        buffer: StorageBufferId,
        handle: ResourceHandle,
    ) -> &mut Self {
        debug_assert!(self.data().shader.is_some(), "indirect draw with no shader bound");
        self.record(Command::DrawIndirect(DrawIndirect {
            batch,
            buffer,
            handle,
        }))
    }

    /// Indirect draw of a built-in procedural batch.
    pub fn draw_procedural_indirect(
        &mut self,
        primitive: PrimitiveType,
        buffer: StorageBufferId,
        handle: ResourceHandle,
    ) -> &mut Self {
        let batch = self.pass.context.procedural.get(primitive);
        self.draw_indirect(batch, buffer, handle)
    }

    /// Records a compute dispatch. Dropped when any group count is zero.
    pub fn dispatch(&mut self, group_count: [u32; 3]) -> &mut Self {
        if group_count.contains(&0) {
            log::trace!("Dropping empty dispatch {group_count:?}");
            return self;
        }
        debug_assert!(self.data().shader.is_some(), "dispatch with no shader bound");
        self.record(Command::Dispatch(Dispatch {
            group_count: GroupCount::Direct(group_count),
        }))
    }

    /// Records a compute dispatch whose group counts are read at replay.
    pub fn dispatch_ref(&mut self, group_count: &GroupCountCell) -> &mut Self {
        debug_assert!(self.data().shader.is_some(), "dispatch with no shader bound");
        self.record(Command::Dispatch(Dispatch {
            group_count: GroupCount::Reference(group_count.clone()),
        }))
    }

    /// Records a compute dispatch with group counts read from `buffer` on the device.
    pub fn dispatch_indirect(&mut self, buffer: StorageBufferId) -> &mut Self {
        debug_assert!(self.data().shader.is_some(), "dispatch with no shader bound");
        self.record(Command::DispatchIndirect(DispatchIndirect { buffer }))
    }

    /// Records a memory barrier between load/store operations.
    pub fn barrier(&mut self, flags: BarrierFlags) -> &mut Self {
        self.record(Command::Barrier(Barrier { flags }))
    }

    /// Binds a sampled texture. [`SamplerState::Auto`] keeps the texture's own sampler.
    pub fn bind_texture<'n>(
        &mut self,
        slot: impl Into<BindingSlot<'n>>,
        texture: impl Into<Bound<TextureId>>,
        sampler: SamplerState,
    ) -> &mut Self {
        let slot = self.resolve_slot(slot.into(), |r, shader, name| r.texture_binding(shader, name));
        self.record(Command::ResourceBind(ResourceBind {
            slot,
            resource: BindResource::Texture {
                texture: texture.into(),
                sampler,
            },
        }))
    }

    /// Binds a texture for image load/store.
    pub fn bind_image<'n>(
        &mut self,
        slot: impl Into<BindingSlot<'n>>,
        image: impl Into<Bound<TextureId>>,
    ) -> &mut Self {
        let slot = self.resolve_slot(slot.into(), |r, shader, name| r.texture_binding(shader, name));
        self.record(Command::ResourceBind(ResourceBind {
            slot,
            resource: BindResource::Image(image.into()),
        }))
    }

    /// Binds a uniform buffer.
    pub fn bind_ubo<'n>(
        &mut self,
        slot: impl Into<BindingSlot<'n>>,
        buffer: impl Into<Bound<UniformBufferId>>,
    ) -> &mut Self {
        let slot = self.resolve_slot(slot.into(), |r, shader, name| {
            r.uniform_block_binding(shader, name)
        });
        self.record(Command::ResourceBind(ResourceBind {
            slot,
            resource: BindResource::UniformBuffer(buffer.into()),
        }))
    }

    /// Binds a storage buffer.
    pub fn bind_ssbo<'n>(
        &mut self,
        slot: impl Into<BindingSlot<'n>>,
        buffer: impl Into<Bound<StorageBufferId>>,
    ) -> &mut Self {
        let slot = self.resolve_slot(slot.into(), |r, shader, name| {
            r.storage_block_binding(shader, name)
        });
        self.record(Command::ResourceBind(ResourceBind {
            slot,
            resource: BindResource::StorageBuffer(buffer.into()),
        }))
    }

    /// Uploads a uniform value by name. A `mat4` takes three storage slots.
    pub fn push_constant(&mut self, name: &str, value: impl Into<PushConstantValue>) -> &mut Self {
        let location = self.resolve_slot(BindingSlot::Name(name), |r, shader, name| {
            r.uniform_location(shader, name)
        });
        self.data_mut()
            .stream
            .record_push_constant(location, value.into());
        self
    }

    /// Uploads by name whatever `cell` holds when the pass is submitted.
    /// Arrays upload every element of the cell.
    pub fn push_constant_ref(&mut self, name: &str, cell: &ConstantCell) -> &mut Self {
        let location = self.resolve_slot(BindingSlot::Name(name), |r, shader, name| {
            r.uniform_location(shader, name)
        });
        self.record(Command::PushConstant(PushConstant::reference(location, cell)))
    }

    fn resolve_slot<F>(&self, slot: BindingSlot<'_>, lookup: F) -> i32
    where
        F: Fn(&dyn ShaderReflection, ShaderId, &str) -> i32,
    {
        match slot {
            BindingSlot::Index(slot) => slot,
            BindingSlot::Name(name) => {
                let data = self.data();
                let Some(shader) = data.shader else {
                    panic!(
                        "binding '{name}' by name in pass '{}' with no shader bound",
                        data.name
                    );
                };
                lookup(self.pass.context.reflection(), shader, name)
            }
        }
    }
}
