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

//! # Vesper Lanes
//!
//! The hot path of the recording layer: command records, command streams,
//! draw buffers, the pass hierarchy, sortable passes, and their replay against
//! a [`CommandExecutor`](vesper_core::renderer::CommandExecutor).

#![warn(missing_docs)]

pub mod pass_lane;

pub use pass_lane::*;
