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

//! Command records.
//!
//! Each command kind has its own payload struct holding only handles, slots and
//! values. [`Command`] is the closed sum over them, and a [`Header`] tags the
//! position of a command (or of a sub-pass) in the replay order.

use std::fmt;
use vesper_core::renderer::{
    BarrierFlags, BatchId, ClearPlanes, ConstantCell, ConstantKind, DrawArgs, DrawState,
    GroupCountCell, PushConstantValue, RawHandle, ResolvedBinding, ResourceCell, ResourceHandle,
    SamplerState, ShaderId, StorageBufferId, TextureId, UniformBufferId,
};

/// Tag of a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    /// Spill slot of a matrix push constant. Never executed.
    None,
    /// The header points at a sub-pass instead of a command.
    SubPass,
    /// Shader program binding.
    ShaderBind,
    /// Texture, image or buffer binding.
    ResourceBind,
    /// Uniform value upload.
    PushConstant,
    /// Single draw.
    Draw,
    /// Merged run of draws.
    DrawMulti,
    /// Draw with device-side arguments.
    DrawIndirect,
    /// Compute dispatch.
    Dispatch,
    /// Compute dispatch with device-side group counts.
    DispatchIndirect,
    /// Memory barrier.
    Barrier,
    /// Frame-buffer clear.
    Clear,
    /// Fixed-function pipeline state.
    StateSet,
    /// Stencil masks and reference.
    StencilSet,
}

impl CommandType {
    /// Every tag, in declaration order.
    pub const ALL: [CommandType; 14] = [
        CommandType::None,
        CommandType::SubPass,
        CommandType::ShaderBind,
        CommandType::ResourceBind,
        CommandType::PushConstant,
        CommandType::Draw,
        CommandType::DrawMulti,
        CommandType::DrawIndirect,
        CommandType::Dispatch,
        CommandType::DispatchIndirect,
        CommandType::Barrier,
        CommandType::Clear,
        CommandType::StateSet,
        CommandType::StencilSet,
    ];

    /// Position of the tag in [`CommandType::ALL`].
    pub fn ordinal(self) -> usize {
        self as usize
    }
}

/// One entry of the replay order.
///
/// `index` points into the owning stream's command storage, or into the root
/// pass's sub-pass arena for [`CommandType::SubPass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// What `index` refers to.
    pub ty: CommandType,
    /// Storage index.
    pub index: u32,
}

/// A handle recorded by value, or a shared slot read at replay.
#[derive(Debug, Clone)]
pub enum Bound<H: RawHandle> {
    /// The handle itself.
    Direct(H),
    /// A slot dereferenced when the command is replayed.
    Reference(ResourceCell<H>),
}

impl<H: RawHandle> Bound<H> {
    /// The handle to use now. `None` when a referenced slot is empty.
    pub fn resolve(&self) -> Option<H> {
        match self {
            Bound::Direct(handle) => Some(*handle),
            Bound::Reference(cell) => cell.get(),
        }
    }

    fn is_reference(&self) -> bool {
        matches!(self, Bound::Reference(_))
    }
}

impl<H: RawHandle> From<H> for Bound<H> {
    fn from(handle: H) -> Self {
        Bound::Direct(handle)
    }
}

impl<H: RawHandle> From<ResourceCell<H>> for Bound<H> {
    fn from(cell: ResourceCell<H>) -> Self {
        Bound::Reference(cell)
    }
}

impl<H: RawHandle> From<&ResourceCell<H>> for Bound<H> {
    fn from(cell: &ResourceCell<H>) -> Self {
        Bound::Reference(cell.clone())
    }
}

/// Binds a shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderBind {
    /// The shader to bind.
    pub shader: ShaderId,
}

/// The resource of a [`ResourceBind`].
#[derive(Debug, Clone)]
pub enum BindResource {
    /// Sampled texture.
    Texture {
        /// The texture.
        texture: Bound<TextureId>,
        /// Sampler override.
        sampler: SamplerState,
    },
    /// Texture bound for image load/store.
    Image(Bound<TextureId>),
    /// Uniform buffer.
    UniformBuffer(Bound<UniformBufferId>),
    /// Storage buffer.
    StorageBuffer(Bound<StorageBufferId>),
}

/// Binds a resource to a slot.
#[derive(Debug, Clone)]
pub struct ResourceBind {
    /// Binding slot, `-1` when the name did not resolve.
    pub slot: i32,
    /// What to bind.
    pub resource: BindResource,
}

impl ResourceBind {
    /// Dereferences the recorded handles. `None` if a referenced slot is empty.
    pub fn resolve(&self) -> Option<ResolvedBinding> {
        Some(match &self.resource {
            BindResource::Texture { texture, sampler } => ResolvedBinding::Texture {
                texture: texture.resolve()?,
                sampler: *sampler,
            },
            BindResource::Image(image) => ResolvedBinding::Image(image.resolve()?),
            BindResource::UniformBuffer(buffer) => ResolvedBinding::UniformBuffer(buffer.resolve()?),
            BindResource::StorageBuffer(buffer) => ResolvedBinding::StorageBuffer(buffer.resolve()?),
        })
    }
}

impl fmt::Display for ResourceBind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn target<H: RawHandle + fmt::Display>(bound: &Bound<H>) -> String {
            match bound.resolve() {
                Some(handle) => handle.to_string(),
                None => "null".to_string(),
            }
        }
        fn suffix<H: RawHandle>(bound: &Bound<H>) -> &'static str {
            if bound.is_reference() {
                "_ref"
            } else {
                ""
            }
        }

        match &self.resource {
            BindResource::Texture { texture, sampler } => write!(
                f,
                ".bind_texture{}({}, {}, sampler={})",
                suffix(texture),
                self.slot,
                target(texture),
                sampler
            ),
            BindResource::Image(image) => write!(
                f,
                ".bind_image{}({}, {})",
                suffix(image),
                self.slot,
                target(image)
            ),
            BindResource::UniformBuffer(buffer) => write!(
                f,
                ".bind_uniform_buf{}({}, {})",
                suffix(buffer),
                self.slot,
                target(buffer)
            ),
            BindResource::StorageBuffer(buffer) => write!(
                f,
                ".bind_storage_buf{}({}, {})",
                suffix(buffer),
                self.slot,
                target(buffer)
            ),
        }
    }
}

/// Where the words of a [`PushConstant`] come from.
#[derive(Debug, Clone)]
pub enum ConstantSource {
    /// First four words of a value copied at record time.
    Inline([u32; 4]),
    /// A shared cell read when the command is replayed.
    Reference(ConstantCell),
}

/// Uploads a uniform value, or a uniform array read from a [`ConstantCell`].
///
/// An inline value holds its first four words. A `mat4` spills its remaining
/// twelve words into the two [`Spill`] commands recorded right after it.
#[derive(Debug, Clone)]
pub struct PushConstant {
    /// Uniform location, `-1` when the name did not resolve.
    pub location: i32,
    /// Scalar type.
    pub kind: ConstantKind,
    /// Components per element, 16 for a matrix.
    pub comp_len: u8,
    /// Number of elements, 1 for inline values.
    pub array_len: u32,
    /// The words to upload.
    pub source: ConstantSource,
}

impl PushConstant {
    /// Words stored in the command itself.
    pub const INLINE_WORDS: usize = 4;
    /// Spill commands following a matrix.
    pub const MATRIX_SPILLS: usize = 2;

    /// Builds the command and the spill slots `value` needs.
    pub fn split(location: i32, value: PushConstantValue) -> (Self, Option<[Spill; 2]>) {
        let words = value.to_words();
        let mut inline = [0u32; Self::INLINE_WORDS];
        inline.copy_from_slice(&words[..Self::INLINE_WORDS]);

        let command = Self {
            location,
            kind: value.kind(),
            comp_len: value.component_len() as u8,
            array_len: 1,
            source: ConstantSource::Inline(inline),
        };
        let spills = if value.component_len() > Self::INLINE_WORDS {
            let mut first = [0u32; Spill::WORDS];
            let mut second = [0u32; Spill::WORDS];
            first.copy_from_slice(&words[4..10]);
            second.copy_from_slice(&words[10..16]);
            Some([Spill { words: first }, Spill { words: second }])
        } else {
            None
        };
        (command, spills)
    }

    /// Builds a command uploading whatever `cell` holds at replay.
    pub fn reference(location: i32, cell: &ConstantCell) -> Self {
        Self {
            location,
            kind: cell.kind(),
            comp_len: cell.component_len() as u8,
            array_len: cell.array_len() as u32,
            source: ConstantSource::Reference(cell.clone()),
        }
    }

    /// Returns `true` when the value continues in spill slots.
    pub fn is_spilled(&self) -> bool {
        matches!(self.source, ConstantSource::Inline(_))
            && usize::from(self.comp_len) > Self::INLINE_WORDS
    }

    /// Returns `true` when the words are read at replay.
    pub fn is_reference(&self) -> bool {
        matches!(self.source, ConstantSource::Reference(_))
    }
}

/// Storage of a spill slot. Recorded under a [`CommandType::None`] header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spill {
    /// Continuation words of the preceding push constant.
    pub words: [u32; 6],
}

impl Spill {
    /// Words held by one spill slot.
    pub const WORDS: usize = 6;
}

/// A single draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Draw {
    /// Geometry to draw.
    pub batch: BatchId,
    /// Instance count, vertex range and resource handle.
    pub args: DrawArgs,
}

impl fmt::Display for Draw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".draw(batch={}, ", self.batch)?;
        write_draw_args(f, &self.args)?;
        write!(f, ")")
    }
}

/// Writes the arguments of a draw, without parentheses.
pub(crate) fn write_draw_args(f: &mut impl fmt::Write, args: &DrawArgs) -> fmt::Result {
    write!(f, "inst_len={}, vert_len=", args.instance_len)?;
    match args.vertex_len {
        Some(len) => write!(f, "{len}")?,
        None => write!(f, "from_batch")?,
    }
    write!(f, ", vert_first=")?;
    match args.vertex_first {
        Some(first) => write!(f, "{first}")?,
        None => write!(f, "from_batch")?,
    }
    write!(f, ", res_id={}", args.handle.resource_index())?;
    if args.handle.has_inverted_handedness() {
        write!(f, ", inverted")?;
    }
    Ok(())
}

/// A run of consecutive draws merged by a
/// [`DrawMultiBuf`](super::draw_buf::DrawMultiBuf).
///
/// The draws themselves live in the draw buffer, chained from `group_first`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawMulti {
    /// Identifies the run inside its draw buffer.
    pub uuid: u32,
    /// First group of the chain.
    pub group_first: Option<u32>,
    /// Last group of the chain, where new groups are linked.
    pub group_last: Option<u32>,
    /// Number of draws in the run.
    pub draw_len: u32,
}

impl DrawMulti {
    /// An empty run.
    pub fn new(uuid: u32) -> Self {
        Self {
            uuid,
            group_first: None,
            group_last: None,
            draw_len: 0,
        }
    }
}

/// A draw whose arguments live in a storage buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawIndirect {
    /// Geometry to draw.
    pub batch: BatchId,
    /// Buffer holding the draw arguments.
    pub buffer: StorageBufferId,
    /// Resource handle of the draw.
    pub handle: ResourceHandle,
}

impl fmt::Display for DrawIndirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            ".draw_indirect(batch={}, buf={}, res_id={})",
            self.batch,
            self.buffer,
            self.handle.resource_index()
        )
    }
}

/// Group counts of a dispatch.
#[derive(Debug, Clone)]
pub enum GroupCount {
    /// Counts known at record time.
    Direct([u32; 3]),
    /// Counts read at replay.
    Reference(GroupCountCell),
}

impl GroupCount {
    /// The counts to dispatch now.
    pub fn resolve(&self) -> [u32; 3] {
        match self {
            GroupCount::Direct(counts) => *counts,
            GroupCount::Reference(cell) => cell.get(),
        }
    }
}

/// A compute dispatch.
#[derive(Debug, Clone)]
pub struct Dispatch {
    /// Work group counts.
    pub group_count: GroupCount,
}

impl fmt::Display for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.group_count.resolve();
        match self.group_count {
            GroupCount::Direct(_) => write!(f, ".dispatch({x}, {y}, {z})"),
            GroupCount::Reference(_) => write!(f, ".dispatch_ref({x}, {y}, {z})"),
        }
    }
}

/// A compute dispatch with counts in a storage buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchIndirect {
    /// Buffer holding the group counts.
    pub buffer: StorageBufferId,
}

impl fmt::Display for DispatchIndirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".dispatch_indirect(buf={})", self.buffer)
    }
}

/// A memory barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Barrier {
    /// Operations to synchronize.
    pub flags: BarrierFlags,
}

impl fmt::Display for Barrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".barrier({})", self.flags)
    }
}

/// Clears planes of the bound frame-buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clear {
    /// Planes to clear.
    pub planes: ClearPlanes,
    /// Clear color, used with [`ClearPlanes::COLOR`].
    pub color: [f32; 4],
    /// Clear depth, used with [`ClearPlanes::DEPTH`].
    pub depth: f32,
    /// Clear stencil, used with [`ClearPlanes::STENCIL`].
    pub stencil: u8,
}

impl fmt::Display for Clear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".clear({}", self.planes)?;
        if self.planes.contains(ClearPlanes::COLOR) {
            let [r, g, b, a] = self.color;
            write!(f, ", color=({r}, {g}, {b}, {a})")?;
        }
        if self.planes.contains(ClearPlanes::DEPTH) {
            write!(f, ", depth={}", self.depth)?;
        }
        if self.planes.contains(ClearPlanes::STENCIL) {
            write!(f, ", stencil={:#010b}", self.stencil)?;
        }
        write!(f, ")")
    }
}

/// Sets the fixed-function pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSet {
    /// The new state.
    pub state: DrawState,
}

impl fmt::Display for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".state_set({})", self.state)
    }
}

/// Sets stencil masks and reference value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilSet {
    /// Bits written when the test passes.
    pub write_mask: u8,
    /// Reference value.
    pub reference: u8,
    /// Bits compared by the test.
    pub compare_mask: u8,
}

impl fmt::Display for StencilSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            ".stencil_set(write_mask={:#010b}, reference={:#010b}, compare_mask={:#010b})",
            self.write_mask, self.reference, self.compare_mask
        )
    }
}

/// A recorded command.
#[derive(Debug, Clone)]
pub enum Command {
    /// Spill slot of a matrix push constant.
    None(Spill),
    /// See [`ShaderBind`].
    ShaderBind(ShaderBind),
    /// See [`ResourceBind`].
    ResourceBind(ResourceBind),
    /// See [`PushConstant`].
    PushConstant(PushConstant),
    /// See [`Draw`].
    Draw(Draw),
    /// See [`DrawMulti`].
    DrawMulti(DrawMulti),
    /// See [`DrawIndirect`].
    DrawIndirect(DrawIndirect),
    /// See [`Dispatch`].
    Dispatch(Dispatch),
    /// See [`DispatchIndirect`].
    DispatchIndirect(DispatchIndirect),
    /// See [`Barrier`].
    Barrier(Barrier),
    /// See [`Clear`].
    Clear(Clear),
    /// See [`StateSet`].
    StateSet(StateSet),
    /// See [`StencilSet`].
    StencilSet(StencilSet),
}

impl Command {
    /// Header tag of the command.
    pub fn ty(&self) -> CommandType {
        match self {
            Command::None(_) => CommandType::None,
            Command::ShaderBind(_) => CommandType::ShaderBind,
            Command::ResourceBind(_) => CommandType::ResourceBind,
            Command::PushConstant(_) => CommandType::PushConstant,
            Command::Draw(_) => CommandType::Draw,
            Command::DrawMulti(_) => CommandType::DrawMulti,
            Command::DrawIndirect(_) => CommandType::DrawIndirect,
            Command::Dispatch(_) => CommandType::Dispatch,
            Command::DispatchIndirect(_) => CommandType::DispatchIndirect,
            Command::Barrier(_) => CommandType::Barrier,
            Command::Clear(_) => CommandType::Clear,
            Command::StateSet(_) => CommandType::StateSet,
            Command::StencilSet(_) => CommandType::StencilSet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_follow_declaration_order() {
        for (i, ty) in CommandType::ALL.iter().enumerate() {
            assert_eq!(ty.ordinal(), i);
        }
    }

    #[test]
    fn matrix_splits_into_two_spills() {
        let mut m = [[0.0f32; 4]; 4];
        m[3][3] = 1.0;
        let (command, spills) = PushConstant::split(2, PushConstantValue::Mat4(m));
        assert!(command.is_spilled());
        assert_eq!(command.comp_len, 16);
        let spills = spills.unwrap();
        assert_eq!(spills[1].words[5], 1.0f32.to_bits());

        let (scalar, none) = PushConstant::split(0, PushConstantValue::Int(-4));
        assert!(!scalar.is_spilled());
        assert!(none.is_none());
        assert!(matches!(
            scalar.source,
            ConstantSource::Inline([w, 0, 0, 0]) if w == (-4i32) as u32
        ));

        let cell = ConstantCell::array(&[PushConstantValue::Mat4(m), PushConstantValue::Mat4(m)]);
        let referenced = PushConstant::reference(5, &cell);
        assert!(referenced.is_reference());
        assert!(!referenced.is_spilled());
        assert_eq!((referenced.comp_len, referenced.array_len), (16, 2));
    }

    #[test]
    fn referenced_binding_reads_latest_handle() {
        let cell = ResourceCell::new(TextureId(1));
        let bind = ResourceBind {
            slot: 3,
            resource: BindResource::Texture {
                texture: Bound::from(&cell),
                sampler: SamplerState::Auto,
            },
        };
        cell.set(TextureId(8));
        assert_eq!(
            bind.resolve(),
            Some(ResolvedBinding::Texture {
                texture: TextureId(8),
                sampler: SamplerState::Auto
            })
        );
        assert_eq!(bind.to_string(), ".bind_texture_ref(3, #8, sampler=auto)");

        cell.clear();
        assert_eq!(bind.resolve(), None);
    }

    #[test]
    fn clear_prints_only_cleared_planes() {
        let clear = Clear {
            planes: ClearPlanes::DEPTH | ClearPlanes::STENCIL,
            color: [0.0; 4],
            depth: 1.0,
            stencil: 0xFF,
        };
        assert_eq!(
            clear.to_string(),
            ".clear(DEPTH | STENCIL, depth=1, stencil=0b11111111)"
        );
    }
}
