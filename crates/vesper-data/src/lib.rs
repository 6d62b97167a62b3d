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

//! # Vesper Data
//!
//! Storage layouts used by the recording layer and by mesh element systems:
//!
//! - [`arena::BlockArena`]: append-only storage whose elements never move.
//! - [`idmap::IdMap`]: dense, reusable integer ids for mesh elements.
//! - [`element_pool::ElementPool`]: a compacting element container kept in sync
//!   with an [`idmap::IdMap`].

#![warn(missing_docs)]

pub mod arena;
pub mod element_pool;
pub mod idmap;

pub use arena::BlockArena;
pub use element_pool::{ElementKey, ElementPool, PoolElement};
pub use idmap::{FreeIdList, IdMap, IdMapError};
