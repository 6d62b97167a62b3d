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

//! Replay state shared by every command of one submission.

use vesper_core::renderer::{CommandExecutor, DrawState, ResourceHandle, ShaderId};

/// Device-facing state threaded through a submission.
///
/// It remembers what was last sent to the executor so redundant shader binds,
/// pipeline state changes and front-face flips are filtered out.
pub struct RecordingState<'a> {
    executor: &'a mut dyn CommandExecutor,
    shader: Option<ShaderId>,
    pipeline_state: DrawState,
    front_face_inverted: bool,
    inverted_view: bool,
}

impl<'a> RecordingState<'a> {
    /// Starts a submission against `executor`, from [`DrawState::NO_DRAW`].
    pub fn new(executor: &'a mut dyn CommandExecutor) -> Self {
        Self {
            executor,
            shader: None,
            pipeline_state: DrawState::NO_DRAW,
            front_face_inverted: false,
            inverted_view: false,
        }
    }

    /// Declares that the view matrix mirrors the scene. Every draw then flips
    /// its front-face winding.
    pub fn with_inverted_view(mut self, inverted_view: bool) -> Self {
        self.inverted_view = inverted_view;
        self
    }

    /// The shader bound on the device, if any.
    pub fn shader(&self) -> Option<ShaderId> {
        self.shader
    }

    /// The pipeline state set on the device.
    pub fn pipeline_state(&self) -> DrawState {
        self.pipeline_state
    }

    /// Direct access to the executor.
    pub fn executor(&mut self) -> &mut dyn CommandExecutor {
        &mut *self.executor
    }

    /// Binds `shader` unless it is already bound.
    pub fn bind_shader(&mut self, shader: ShaderId) {
        if self.shader != Some(shader) {
            self.shader = Some(shader);
            self.executor.bind_shader(shader);
        }
    }

    /// Applies `state` unless it is already applied.
    pub fn set_pipeline_state(&mut self, state: DrawState) {
        if self.pipeline_state != state {
            self.pipeline_state = state;
            self.executor.set_state(state);
        }
    }

    /// Updates the front-face winding for a draw using `handle`.
    pub fn front_facing_set(&mut self, handle: ResourceHandle) {
        self.set_front_face_inverted(handle.has_inverted_handedness() ^ self.inverted_view);
    }

    pub(crate) fn debug_group_begin(&mut self, name: &str) {
        self.executor.debug_group_begin(name);
    }

    pub(crate) fn debug_group_end(&mut self) {
        self.executor.debug_group_end();
    }

    /// Restores the default winding at the end of a submission.
    pub(crate) fn cleanup(&mut self) {
        self.set_front_face_inverted(false);
    }

    fn set_front_face_inverted(&mut self, inverted: bool) {
        if self.front_face_inverted != inverted {
            self.front_face_inverted = inverted;
            self.executor.set_front_face_inverted(inverted);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pass_lane::trace::{DeviceCall, TraceExecutor};

    #[test]
    fn redundant_changes_are_elided() {
        let mut trace = TraceExecutor::default();
        {
            let mut state = RecordingState::new(&mut trace);
            state.bind_shader(ShaderId(1));
            state.bind_shader(ShaderId(1));
            state.set_pipeline_state(DrawState::NO_DRAW);
            state.set_pipeline_state(DrawState::WRITE_COLOR);
            state.set_pipeline_state(DrawState::WRITE_COLOR);
            state.bind_shader(ShaderId(2));
        }
        assert_eq!(
            trace.calls(),
            &[
                DeviceCall::BindShader(ShaderId(1)),
                DeviceCall::SetState(DrawState::WRITE_COLOR),
                DeviceCall::BindShader(ShaderId(2)),
            ]
        );
    }

    #[test]
    fn inverted_view_flips_winding() {
        let mut trace = TraceExecutor::default();
        {
            let mut state = RecordingState::new(&mut trace).with_inverted_view(true);
            // Mirrored object in a mirrored view: back to the default winding.
            state.front_facing_set(ResourceHandle::new(1, true));
            state.front_facing_set(ResourceHandle::new(2, false));
            state.front_facing_set(ResourceHandle::new(3, false));
            state.cleanup();
        }
        assert_eq!(
            trace.calls(),
            &[
                DeviceCall::FrontFaceInverted(true),
                DeviceCall::FrontFaceInverted(false),
            ]
        );
    }
}
