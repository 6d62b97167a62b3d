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

//! A root pass whose sub-passes replay in key order.

use super::command::{CommandType, Header};
use super::draw_buf::DrawMultiBuf;
use super::pass::{PassContext, PassMain, PassRecorder, PassStats, SubPassRef};
use super::state::RecordingState;
use std::sync::OnceLock;
use vesper_core::PassConfig;

/// A [`PassMain`] whose direct children are sorted by an `f32` key before replay.
///
/// Children with equal keys keep their creation order. The order is computed on
/// the first submission or serialization after a change, then cached. Commands
/// must be recorded inside the children, never at the sortable level.
#[derive(Debug)]
pub struct SortablePass {
    pass: PassMain,
    keys: Vec<(u32, f32)>,
    order: OnceLock<Vec<u32>>,
}

impl SortablePass {
    /// Creates an empty sortable pass.
    pub fn new(name: impl Into<String>, context: PassContext) -> Self {
        Self {
            pass: PassMain::new(name, context),
            keys: Vec::new(),
            order: OnceLock::new(),
        }
    }

    /// Replaces the pass options.
    pub fn with_config(mut self, config: PassConfig) -> Self {
        self.pass = self.pass.with_config(config);
        self
    }

    /// Debug name of the pass.
    pub fn name(&self) -> &str {
        self.pass.name()
    }

    /// Clears every child. References handed out so far become stale.
    pub fn init(&mut self) {
        self.pass.init();
        self.keys.clear();
        self.order = OnceLock::new();
    }

    /// Appends a child replayed according to `sorting_value`.
    ///
    /// `-0.0` and `0.0` are the same key.
    pub fn sub(&mut self, name: impl Into<String>, sorting_value: f32) -> SubPassRef {
        let sub = self.pass.root().sub(name);
        // Adding zero turns -0.0 into 0.0, which `total_cmp` would order first.
        self.keys.push((sub.index() as u32, sorting_value + 0.0));
        self.order = OnceLock::new();
        sub
    }

    /// Records into a child.
    ///
    /// # Panics
    ///
    /// When `sub` was created before the last [`SortablePass::init`].
    pub fn at(&mut self, sub: SubPassRef) -> PassRecorder<'_, DrawMultiBuf> {
        self.pass.at(sub)
    }

    /// Children in replay order.
    pub fn sorted(&self) -> Vec<SubPassRef> {
        self.order()
            .iter()
            .map(|&index| self.pass.sub_pass_ref(index))
            .collect()
    }

    /// Replays the children in ascending key order.
    pub fn submit(&self, state: &mut RecordingState<'_>) {
        self.pass.submit_root(self.ordered_headers(), state);
    }

    /// Human readable dump, children in replay order.
    pub fn serialize(&self, prefix: &str) -> String {
        self.pass.serialize_root(self.ordered_headers(), prefix)
    }

    /// Per-type command counts over the whole tree.
    pub fn stats(&self) -> PassStats {
        self.pass.stats()
    }

    fn ordered_headers(&self) -> impl Iterator<Item = Header> + '_ {
        debug_assert!(
            self.pass
                .root_headers()
                .iter()
                .all(|header| header.ty == CommandType::SubPass),
            "commands recorded at the level of sortable pass '{}'",
            self.pass.name()
        );
        self.order().iter().map(|&index| Header {
            ty: CommandType::SubPass,
            index,
        })
    }

    fn order(&self) -> &[u32] {
        self.order.get_or_init(|| {
            let mut keys = self.keys.clone();
            keys.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
            log::trace!("Sorted {} sub-passes of '{}'", keys.len(), self.pass.name());
            keys.into_iter().map(|(index, _)| index).collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pass_lane::pass::{DrawParams, ProceduralBatches};
    use crate::pass_lane::trace::{DeviceCall, TraceExecutor};
    use std::sync::Arc;
    use vesper_core::renderer::{BatchId, ShaderId, ShaderReflection};

    struct NoReflection;

    impl ShaderReflection for NoReflection {
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

    fn sortable() -> SortablePass {
        let batch = BatchId(0);
        let context = PassContext::new(
            Arc::new(NoReflection),
            ProceduralBatches {
                points: batch,
                lines: batch,
                triangles: batch,
                triangle_strips: batch,
            },
        );
        SortablePass::new("transparent", context).with_config(PassConfig {
            debug_groups: false,
        })
    }

    fn add(pass: &mut SortablePass, name: &str, key: f32, shader: u32) -> SubPassRef {
        let sub = pass.sub(name, key);
        pass.at(sub)
            .shader_set(ShaderId(shader))
            .draw(BatchId(shader), DrawParams::instances(1));
        sub
    }

    fn shaders(pass: &SortablePass) -> Vec<u32> {
        let mut trace = TraceExecutor::default();
        pass.submit(&mut RecordingState::new(&mut trace));
        trace
            .take()
            .into_iter()
            .filter_map(|call| match call {
                DeviceCall::BindShader(shader) => Some(shader.0),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn children_replay_by_key_then_creation_order() {
        let mut pass = sortable();
        add(&mut pass, "a", 2.0, 1);
        add(&mut pass, "b", -1.0, 2);
        add(&mut pass, "c", 2.0, 3);
        add(&mut pass, "d", 0.5, 4);

        assert_eq!(shaders(&pass), vec![2, 4, 1, 3]);
    }

    #[test]
    fn signed_zero_keys_tie_in_creation_order() {
        let mut pass = sortable();
        let a = pass.sub("a", 0.0);
        let b = pass.sub("b", -0.0);
        assert_eq!(pass.sorted(), vec![a, b]);
        assert_eq!(pass.serialize(""), ".transparent\n  .a\n  .b\n");
    }

    #[test]
    fn order_is_recomputed_after_new_children() {
        let mut pass = sortable();
        add(&mut pass, "a", 1.0, 1);
        assert_eq!(shaders(&pass), vec![1]);

        add(&mut pass, "b", 0.0, 2);
        assert_eq!(shaders(&pass), vec![2, 1]);

        pass.init();
        assert!(shaders(&pass).is_empty());
        assert!(pass.sorted().is_empty());
    }

    #[test]
    fn serialize_follows_replay_order() {
        let mut pass = sortable();
        let far = pass.sub("far", 10.0);
        let near = pass.sub("near", 1.0);
        assert_eq!(pass.sorted(), vec![near, far]);

        assert_eq!(pass.serialize(""), ".transparent\n  .near\n  .far\n");
    }
}
