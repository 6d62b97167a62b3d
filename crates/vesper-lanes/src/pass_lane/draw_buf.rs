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

//! Draw recording strategies.
//!
//! A pass is generic over how it records draws. [`DrawCommandBuf`] records one
//! [`Draw`] command per call and keeps strict order. [`DrawMultiBuf`] merges
//! consecutive draws into a [`DrawMulti`] command and groups them by geometry so
//! each group is a single multi-draw at replay.

use super::command::{write_draw_args, Command, Draw, DrawMulti};
use super::state::RecordingState;
use super::stream::CommandStream;
use ahash::AHashMap;
use std::fmt::Write;
use vesper_core::renderer::{BatchId, DrawArgs};

/// How a pass turns draw calls into commands.
///
/// Every sub-pass of a tree records into the buffer owned by its root.
pub trait DrawCommandBuffer: Default + Send + Sync {
    /// Forgets every recorded draw.
    fn clear(&mut self);

    /// Records a draw at the end of `stream`.
    fn append_draw(&mut self, stream: &mut CommandStream, batch: BatchId, args: DrawArgs);

    /// Number of draws recorded since the last clear.
    fn draw_len(&self) -> usize;

    /// Replays a merged run of draws.
    fn execute_multi(&self, _multi: &DrawMulti, _state: &mut RecordingState<'_>) {}

    /// Appends the debug lines of a merged run of draws.
    fn describe_multi(&self, _multi: &DrawMulti, _prefix: &str, _out: &mut String) {}
}

/// One [`Draw`] command per draw call.
#[derive(Debug, Default)]
pub struct DrawCommandBuf {
    draw_len: usize,
}

impl DrawCommandBuffer for DrawCommandBuf {
    fn clear(&mut self) {
        self.draw_len = 0;
    }

    fn append_draw(&mut self, stream: &mut CommandStream, batch: BatchId, args: DrawArgs) {
        stream.record(Command::Draw(Draw { batch, args }));
        self.draw_len += 1;
    }

    fn draw_len(&self) -> usize {
        self.draw_len
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct GroupKey {
    multi: u32,
    batch: BatchId,
    vertex_len: Option<u32>,
    vertex_first: Option<u32>,
    inverted: bool,
}

#[derive(Debug)]
struct DrawGroup {
    batch: BatchId,
    next: Option<u32>,
    draws: Vec<DrawArgs>,
}

/// Merges consecutive draws and groups them by batch, vertex range and winding.
///
/// Groups replay in the order they were first seen. Inside a group, draws keep
/// their record order. Any other command recorded in between starts a new run.
#[derive(Debug, Default)]
pub struct DrawMultiBuf {
    groups: Vec<DrawGroup>,
    group_ids: AHashMap<GroupKey, u32>,
    next_uuid: u32,
    draw_len: usize,
}

impl DrawMultiBuf {
    /// Number of groups across every run.
    pub fn group_len(&self) -> usize {
        self.groups.len()
    }

    fn push_into(&mut self, multi: &mut DrawMulti, batch: BatchId, args: DrawArgs) {
        let key = GroupKey {
            multi: multi.uuid,
            batch,
            vertex_len: args.vertex_len,
            vertex_first: args.vertex_first,
            inverted: args.handle.has_inverted_handedness(),
        };

        let group = match self.group_ids.get(&key) {
            Some(&group) => group,
            None => {
                let group = self.groups.len() as u32;
                self.groups.push(DrawGroup {
                    batch,
                    next: None,
                    draws: Vec::new(),
                });
                self.group_ids.insert(key, group);
                match multi.group_last {
                    Some(last) => self.groups[last as usize].next = Some(group),
                    None => multi.group_first = Some(group),
                }
                multi.group_last = Some(group);
                group
            }
        };

        self.groups[group as usize].draws.push(args);
        multi.draw_len += 1;
        self.draw_len += 1;
    }

    fn chain(&self, multi: &DrawMulti) -> impl Iterator<Item = &DrawGroup> {
        std::iter::successors(
            multi
                .group_first
                .and_then(|first| self.groups.get(first as usize)),
            |group| group.next.and_then(|next| self.groups.get(next as usize)),
        )
    }
}

impl DrawCommandBuffer for DrawMultiBuf {
    fn clear(&mut self) {
        self.groups.clear();
        self.group_ids.clear();
        self.next_uuid = 0;
        self.draw_len = 0;
    }

    fn append_draw(&mut self, stream: &mut CommandStream, batch: BatchId, args: DrawArgs) {
        if let Some(Command::DrawMulti(multi)) = stream.last_command_mut() {
            self.push_into(multi, batch, args);
            return;
        }
        let mut multi = DrawMulti::new(self.next_uuid);
        self.next_uuid += 1;
        self.push_into(&mut multi, batch, args);
        stream.record(Command::DrawMulti(multi));
    }

    fn draw_len(&self) -> usize {
        self.draw_len
    }

    fn execute_multi(&self, multi: &DrawMulti, state: &mut RecordingState<'_>) {
        for group in self.chain(multi) {
            let Some(first) = group.draws.first() else {
                continue;
            };
            state.front_facing_set(first.handle);
            state.executor().draw_multi(group.batch, &group.draws);
        }
    }

    fn describe_multi(&self, multi: &DrawMulti, prefix: &str, out: &mut String) {
        let _ = writeln!(out, "{prefix}.draw_multi({})", multi.draw_len);
        for group in self.chain(multi) {
            let _ = writeln!(
                out,
                "{prefix}  .group(batch={}, len={})",
                group.batch,
                group.draws.len()
            );
            for args in &group.draws {
                let _ = write!(out, "{prefix}    .draw(");
                let _ = write_draw_args(out, args);
                let _ = writeln!(out, ")");
            }
        }
    }
}
