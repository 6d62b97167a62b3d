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

//! An executor that records device calls instead of issuing them.

use vesper_core::renderer::{
    BarrierFlags, BatchId, ClearPlanes, CommandExecutor, DrawArgs, DrawState, PushConstantData,
    ResolvedBinding, ResourceHandle, ShaderId, StorageBufferId,
};

/// Owned copy of push constant data.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValues {
    /// Float components.
    Float(Vec<f32>),
    /// Integer components.
    Int(Vec<i32>),
}

/// One call received by a [`TraceExecutor`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    /// A debug group was opened.
    DebugGroupBegin(String),
    /// The last debug group was closed.
    DebugGroupEnd,
    /// [`CommandExecutor::bind_shader`]
    BindShader(ShaderId),
    /// [`CommandExecutor::bind_resource`]
    BindResource {
        /// Binding slot.
        slot: i32,
        /// Bound resource.
        binding: ResolvedBinding,
    },
    /// [`CommandExecutor::push_constant`]
    PushConstant {
        /// Uniform location.
        location: i32,
        /// Number of array elements, 1 for a single value.
        array_len: usize,
        /// Uploaded components.
        values: ConstantValues,
    },
    /// [`CommandExecutor::set_state`]
    SetState(DrawState),
    /// [`CommandExecutor::set_stencil`]
    SetStencil {
        /// Write mask.
        write_mask: u8,
        /// Reference value.
        reference: u8,
        /// Compare mask.
        compare_mask: u8,
    },
    /// [`CommandExecutor::set_front_face_inverted`]
    FrontFaceInverted(bool),
    /// [`CommandExecutor::draw`]
    Draw {
        /// Drawn batch.
        batch: BatchId,
        /// Draw arguments.
        args: DrawArgs,
    },
    /// [`CommandExecutor::draw_multi`]
    DrawMulti {
        /// Drawn batch.
        batch: BatchId,
        /// Arguments of every draw.
        draws: Vec<DrawArgs>,
    },
    /// [`CommandExecutor::draw_indirect`]
    DrawIndirect {
        /// Drawn batch.
        batch: BatchId,
        /// Argument buffer.
        buffer: StorageBufferId,
        /// Resource handle.
        handle: ResourceHandle,
    },
    /// [`CommandExecutor::dispatch`]
    Dispatch([u32; 3]),
    /// [`CommandExecutor::dispatch_indirect`]
    DispatchIndirect(StorageBufferId),
    /// [`CommandExecutor::barrier`]
    Barrier(BarrierFlags),
    /// [`CommandExecutor::clear`]
    Clear {
        /// Cleared planes.
        planes: ClearPlanes,
        /// Clear color.
        color: [f32; 4],
        /// Clear depth.
        depth: f32,
        /// Clear stencil.
        stencil: u8,
    },
}

impl DeviceCall {
    /// Returns `true` for debug group markers.
    pub fn is_debug_group(&self) -> bool {
        matches!(self, DeviceCall::DebugGroupBegin(_) | DeviceCall::DebugGroupEnd)
    }
}

/// A [`CommandExecutor`] that appends every call to a list.
#[derive(Debug, Default, Clone)]
pub struct TraceExecutor {
    calls: Vec<DeviceCall>,
}

impl TraceExecutor {
    /// Every call received so far, in order.
    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    /// The calls that are not debug group markers.
    pub fn device_calls(&self) -> Vec<&DeviceCall> {
        self.calls.iter().filter(|call| !call.is_debug_group()).collect()
    }

    /// Empties the trace and returns what it held.
    pub fn take(&mut self) -> Vec<DeviceCall> {
        std::mem::take(&mut self.calls)
    }
}

impl CommandExecutor for TraceExecutor {
    fn debug_group_begin(&mut self, name: &str) {
        self.calls.push(DeviceCall::DebugGroupBegin(name.to_string()));
    }

    fn debug_group_end(&mut self) {
        self.calls.push(DeviceCall::DebugGroupEnd);
    }

    fn bind_shader(&mut self, shader: ShaderId) {
        self.calls.push(DeviceCall::BindShader(shader));
    }

    fn bind_resource(&mut self, slot: i32, binding: ResolvedBinding) {
        self.calls.push(DeviceCall::BindResource { slot, binding });
    }

    fn push_constant(&mut self, location: i32, array_len: usize, data: PushConstantData<'_>) {
        let values = match data {
            PushConstantData::Float(values) => ConstantValues::Float(values.to_vec()),
            PushConstantData::Int(values) => ConstantValues::Int(values.to_vec()),
        };
        self.calls.push(DeviceCall::PushConstant {
            location,
            array_len,
            values,
        });
    }

    fn set_state(&mut self, state: DrawState) {
        self.calls.push(DeviceCall::SetState(state));
    }

    fn set_stencil(&mut self, write_mask: u8, reference: u8, compare_mask: u8) {
        self.calls.push(DeviceCall::SetStencil {
            write_mask,
            reference,
            compare_mask,
        });
    }

    fn set_front_face_inverted(&mut self, inverted: bool) {
        self.calls.push(DeviceCall::FrontFaceInverted(inverted));
    }

    fn draw(&mut self, batch: BatchId, args: &DrawArgs) {
        self.calls.push(DeviceCall::Draw { batch, args: *args });
    }

    fn draw_multi(&mut self, batch: BatchId, draws: &[DrawArgs]) {
        self.calls.push(DeviceCall::DrawMulti {
            batch,
            draws: draws.to_vec(),
        });
    }

    fn draw_indirect(&mut self, batch: BatchId, buffer: StorageBufferId, handle: ResourceHandle) {
        self.calls.push(DeviceCall::DrawIndirect {
            batch,
            buffer,
            handle,
        });
    }

    fn dispatch(&mut self, group_count: [u32; 3]) {
        self.calls.push(DeviceCall::Dispatch(group_count));
    }

    fn dispatch_indirect(&mut self, buffer: StorageBufferId) {
        self.calls.push(DeviceCall::DispatchIndirect(buffer));
    }

    fn barrier(&mut self, barrier: BarrierFlags) {
        self.calls.push(DeviceCall::Barrier(barrier));
    }

    fn clear(&mut self, planes: ClearPlanes, color: [f32; 4], depth: f32, stencil: u8) {
        self.calls.push(DeviceCall::Clear {
            planes,
            color,
            depth,
            stencil,
        });
    }
}
