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

//! # Vesper Core
//!
//! Foundational crate containing the handles, pipeline state types and
//! collaborator contracts shared by the recording layer (`vesper-lanes`) and
//! the element data layouts (`vesper-data`).
//!
//! Nothing in this crate talks to a graphics device. The device, the shader
//! reflection service and the material system are reached only through the
//! traits in [`renderer::traits`].

#![warn(missing_docs)]

pub mod config;
pub mod mesh;
pub mod renderer;
pub mod utils;

pub use config::{ConfigError, IdMapConfig, PassConfig, VesperConfig};
