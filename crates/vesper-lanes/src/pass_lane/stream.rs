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

//! Header-ordered command storage of one pass.

use super::command::{Command, CommandType, ConstantSource, Header, PushConstant, Spill};
use super::draw_buf::DrawCommandBuffer;
use super::state::RecordingState;
use bytemuck::cast_slice;
use std::fmt::Write;
use vesper_core::renderer::{ConstantKind, PushConstantData, PushConstantValue, ShaderReflection};

/// Index of a recorded command, valid until its stream is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandRef(pub u32);

/// Headers in replay order plus the commands they point at.
///
/// Commands are never reordered. A matrix push constant and its two spill
/// slots always occupy three consecutive storage slots.
#[derive(Debug, Clone, Default)]
pub struct CommandStream {
    headers: Vec<Header>,
    commands: Vec<Command>,
}

impl CommandStream {
    /// Creates an empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `command` at the end of the replay order.
    pub fn record(&mut self, command: Command) -> CommandRef {
        let index = self.commands.len() as u32;
        self.headers.push(Header {
            ty: command.ty(),
            index,
        });
        self.commands.push(command);
        CommandRef(index)
    }

    /// Appends a uniform upload, followed by its spill slots for a matrix.
    pub fn record_push_constant(&mut self, location: i32, value: PushConstantValue) -> CommandRef {
        let (command, spills) = PushConstant::split(location, value);
        let primary = self.record(Command::PushConstant(command));
        for spill in spills.into_iter().flatten() {
            self.record(Command::None(spill));
        }
        primary
    }

    /// Appends a header splicing the sub-pass at `arena_index` into the replay order.
    pub fn record_sub_pass(&mut self, arena_index: usize) {
        self.headers.push(Header {
            ty: CommandType::SubPass,
            index: arena_index as u32,
        });
    }

    /// The command behind `command`.
    pub fn get(&self, command: CommandRef) -> Option<&Command> {
        self.commands.get(command.0 as usize)
    }

    /// Headers in replay order.
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// Number of headers, sub-passes and spill slots included.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Drops every header and command.
    pub fn clear(&mut self) {
        self.headers.clear();
        self.commands.clear();
    }

    /// The last recorded command, if the last header is a command.
    pub(crate) fn last_command(&self) -> Option<&Command> {
        let header = self.headers.last()?;
        if header.ty == CommandType::SubPass {
            return None;
        }
        self.commands.get(header.index as usize)
    }

    /// Mutable access to the last recorded command, if the last header is a command.
    pub(crate) fn last_command_mut(&mut self) -> Option<&mut Command> {
        let header = *self.headers.last()?;
        if header.ty == CommandType::SubPass {
            return None;
        }
        self.commands.get_mut(header.index as usize)
    }

    /// Hands the words of the push constant stored at `index` to `f`: the
    /// inline value with its spill slots, or what its cell holds right now.
    fn with_constant_words<R>(
        &self,
        index: usize,
        constant: &PushConstant,
        f: impl FnOnce(&[u32]) -> R,
    ) -> R {
        let inline = match &constant.source {
            ConstantSource::Reference(cell) => return f(&cell.read()),
            ConstantSource::Inline(inline) => inline,
        };
        let mut words = [0u32; 16];
        words[..PushConstant::INLINE_WORDS].copy_from_slice(inline);
        if constant.is_spilled() {
            let spilled = words[PushConstant::INLINE_WORDS..].chunks_mut(Spill::WORDS);
            for (offset, chunk) in spilled.enumerate() {
                let slot = self.commands.get(index + 1 + offset);
                debug_assert!(
                    matches!(slot, Some(Command::None(_))),
                    "matrix push constant lost its spill slots"
                );
                if let Some(Command::None(spill)) = slot {
                    chunk.copy_from_slice(&spill.words);
                }
            }
        }
        f(&words[..usize::from(constant.comp_len)])
    }

    /// Replays the command behind `header`. Spill slots and sub-pass headers
    /// are left to the caller.
    pub(crate) fn execute<B: DrawCommandBuffer>(
        &self,
        header: Header,
        draw_buf: &B,
        state: &mut RecordingState<'_>,
    ) {
        if matches!(header.ty, CommandType::None | CommandType::SubPass) {
            return;
        }
        let index = header.index as usize;
        let Some(command) = self.commands.get(index) else {
            log::warn!("Header {header:?} points past the command storage");
            return;
        };
        log::trace!("Replaying {:?}", header.ty);

        match command {
            Command::None(_) => {}
            Command::ShaderBind(bind) => state.bind_shader(bind.shader),
            Command::ResourceBind(bind) => {
                if bind.slot < 0 {
                    log::trace!("Skipping binding with unresolved slot");
                    return;
                }
                match bind.resolve() {
                    Some(binding) => state.executor().bind_resource(bind.slot, binding),
                    None => log::warn!("Binding at slot {} resolved to a null handle", bind.slot),
                }
            }
            Command::PushConstant(constant) => {
                if constant.location < 0 {
                    log::trace!("Skipping push constant with unresolved location");
                    return;
                }
                let array_len = constant.array_len as usize;
                self.with_constant_words(index, constant, |words| {
                    let data = PushConstantData::from_words(constant.kind, words);
                    state
                        .executor()
                        .push_constant(constant.location, array_len, data);
                });
            }
            Command::Draw(draw) => {
                state.front_facing_set(draw.args.handle);
                state.executor().draw(draw.batch, &draw.args);
            }
            Command::DrawMulti(multi) => draw_buf.execute_multi(multi, state),
            Command::DrawIndirect(draw) => {
                state.front_facing_set(draw.handle);
                state
                    .executor()
                    .draw_indirect(draw.batch, draw.buffer, draw.handle);
            }
            Command::Dispatch(dispatch) => {
                let counts = dispatch.group_count.resolve();
                if counts.contains(&0) {
                    log::trace!("Skipping empty dispatch {counts:?}");
                } else {
                    state.executor().dispatch(counts);
                }
            }
            Command::DispatchIndirect(dispatch) => state.executor().dispatch_indirect(dispatch.buffer),
            Command::Barrier(barrier) => state.executor().barrier(barrier.flags),
            Command::Clear(clear) => {
                state
                    .executor()
                    .clear(clear.planes, clear.color, clear.depth, clear.stencil)
            }
            Command::StateSet(set) => state.set_pipeline_state(set.state),
            Command::StencilSet(set) => {
                state
                    .executor()
                    .set_stencil(set.write_mask, set.reference, set.compare_mask)
            }
        }
    }

    /// Appends the debug line(s) of the command behind `header` to `out`.
    pub(crate) fn describe<B: DrawCommandBuffer>(
        &self,
        header: Header,
        draw_buf: &B,
        reflection: &dyn ShaderReflection,
        prefix: &str,
        out: &mut String,
    ) {
        if matches!(header.ty, CommandType::None | CommandType::SubPass) {
            return;
        }
        let index = header.index as usize;
        let Some(command) = self.commands.get(index) else {
            return;
        };

        // Writing into a String cannot fail.
        let _ = match command {
            Command::None(_) => Ok(()),
            Command::ShaderBind(bind) => writeln!(
                out,
                "{prefix}.shader_bind({})",
                reflection.shader_name(bind.shader)
            ),
            Command::PushConstant(constant) => {
                let data = self.with_constant_words(index, constant, |words| {
                    format_constant(constant.kind, words)
                });
                let suffix = if constant.is_reference() { "_ref" } else { "" };
                if constant.array_len > 1 {
                    writeln!(
                        out,
                        "{prefix}.push_constant{suffix}({}, data=({}), array_len={})",
                        constant.location, data, constant.array_len
                    )
                } else {
                    writeln!(
                        out,
                        "{prefix}.push_constant{suffix}({}, data=({}))",
                        constant.location, data
                    )
                }
            }
            Command::DrawMulti(multi) => {
                draw_buf.describe_multi(multi, prefix, out);
                Ok(())
            }
            Command::ResourceBind(bind) => writeln!(out, "{prefix}{bind}"),
            Command::Draw(draw) => writeln!(out, "{prefix}{draw}"),
            Command::DrawIndirect(draw) => writeln!(out, "{prefix}{draw}"),
            Command::Dispatch(dispatch) => writeln!(out, "{prefix}{dispatch}"),
            Command::DispatchIndirect(dispatch) => writeln!(out, "{prefix}{dispatch}"),
            Command::Barrier(barrier) => writeln!(out, "{prefix}{barrier}"),
            Command::Clear(clear) => writeln!(out, "{prefix}{clear}"),
            Command::StateSet(set) => writeln!(out, "{prefix}{set}"),
            Command::StencilSet(set) => writeln!(out, "{prefix}{set}"),
        };
    }
}

fn format_constant(kind: ConstantKind, words: &[u32]) -> String {
    let values: Vec<String> = match kind {
        ConstantKind::Float => cast_slice::<u32, f32>(words)
            .iter()
            .map(ToString::to_string)
            .collect(),
        ConstantKind::Int => cast_slice::<u32, i32>(words)
            .iter()
            .map(ToString::to_string)
            .collect(),
    };
    values.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pass_lane::command::{Barrier, ShaderBind, StateSet};
    use crate::pass_lane::draw_buf::DrawCommandBuf;
    use crate::pass_lane::trace::{ConstantValues, DeviceCall, TraceExecutor};
    use approx::assert_relative_eq;
    use vesper_core::renderer::{BarrierFlags, ConstantCell, DrawState, ShaderId};

    fn replay(stream: &CommandStream) -> Vec<DeviceCall> {
        let buf = DrawCommandBuf::default();
        let mut trace = TraceExecutor::default();
        {
            let mut state = RecordingState::new(&mut trace);
            for header in stream.headers() {
                stream.execute(*header, &buf, &mut state);
            }
        }
        trace.take()
    }

    #[test]
    fn headers_follow_record_order() {
        let mut stream = CommandStream::new();
        let a = stream.record(Command::ShaderBind(ShaderBind {
            shader: ShaderId(1),
        }));
        stream.record_sub_pass(0);
        let b = stream.record(Command::Barrier(Barrier {
            flags: BarrierFlags::SHADER_STORAGE,
        }));

        let tags: Vec<_> = stream.headers().iter().map(|h| h.ty).collect();
        assert_eq!(
            tags,
            vec![
                CommandType::ShaderBind,
                CommandType::SubPass,
                CommandType::Barrier
            ]
        );
        assert_eq!((a, b), (CommandRef(0), CommandRef(1)));
        assert!(matches!(stream.get(b), Some(Command::Barrier(_))));
    }

    #[test]
    fn matrix_takes_three_slots_and_replays_once() {
        let mut m = [[0.0f32; 4]; 4];
        for (c, column) in m.iter_mut().enumerate() {
            for (r, value) in column.iter_mut().enumerate() {
                *value = (c * 4 + r) as f32 * 0.5;
            }
        }

        let mut stream = CommandStream::new();
        stream.record_push_constant(7, PushConstantValue::Mat4(m));
        stream.record(Command::StateSet(StateSet {
            state: DrawState::WRITE_COLOR,
        }));

        let tags: Vec<_> = stream.headers().iter().map(|h| h.ty).collect();
        assert_eq!(
            tags,
            vec![
                CommandType::PushConstant,
                CommandType::None,
                CommandType::None,
                CommandType::StateSet
            ]
        );

        let calls = replay(&stream);
        assert_eq!(calls.len(), 2);
        match &calls[0] {
            DeviceCall::PushConstant {
                location: 7,
                array_len: 1,
                values: ConstantValues::Float(values),
            } => {
                assert_eq!(values.len(), 16);
                for (i, value) in values.iter().enumerate() {
                    assert_relative_eq!(*value, i as f32 * 0.5);
                }
            }
            other => panic!("unexpected call {other:?}"),
        }
        assert_eq!(calls[1], DeviceCall::SetState(DrawState::WRITE_COLOR));
    }

    #[test]
    fn unresolved_locations_are_skipped() {
        let mut stream = CommandStream::new();
        stream.record_push_constant(-1, PushConstantValue::Float(1.0));
        stream.record_push_constant(0, PushConstantValue::IVec2([3, -4]));

        let calls = replay(&stream);
        assert_eq!(
            calls,
            vec![DeviceCall::PushConstant {
                location: 0,
                array_len: 1,
                values: ConstantValues::Int(vec![3, -4]),
            }]
        );
    }

    #[test]
    fn last_command_stops_at_sub_pass() {
        let mut stream = CommandStream::new();
        stream.record(Command::StateSet(StateSet {
            state: DrawState::WRITE_DEPTH,
        }));
        assert!(stream.last_command_mut().is_some());
        stream.record_sub_pass(3);
        assert!(stream.last_command().is_none());
        assert!(stream.last_command_mut().is_none());

        stream.clear();
        assert!(stream.is_empty());
    }

    #[test]
    fn referenced_constants_are_read_at_replay() {
        let cell = ConstantCell::array(&[
            PushConstantValue::IVec2([1, 2]),
            PushConstantValue::IVec2([3, 4]),
        ]);
        let mut stream = CommandStream::new();
        stream.record(Command::PushConstant(PushConstant::reference(2, &cell)));

        cell.set_element(0, [9i32, 8]);
        assert_eq!(
            replay(&stream),
            vec![DeviceCall::PushConstant {
                location: 2,
                array_len: 2,
                values: ConstantValues::Int(vec![9, 8, 3, 4]),
            }]
        );

        let mut out = String::new();
        let buf = DrawCommandBuf::default();
        stream.describe(stream.headers()[0], &buf, &NoNames, "", &mut out);
        assert_eq!(out, ".push_constant_ref(2, data=(9, 8, 3, 4), array_len=2)\n");
    }

    struct NoNames;

    impl ShaderReflection for NoNames {
        fn uniform_location(&self, _: ShaderId, _: &str) -> i32 {
            -1
        }
        fn uniform_block_binding(&self, _: ShaderId, _: &str) -> i32 {
            -1
        }
        fn storage_block_binding(&self, _: ShaderId, _: &str) -> i32 {
            -1
        }
        fn texture_binding(&self, _: ShaderId, _: &str) -> i32 {
            -1
        }
    }
}
