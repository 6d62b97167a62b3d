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

//! Mesh element identity.
//!
//! The element container is not part of this workspace. These types describe
//! the little the identifier map needs from it: each element carries an integer
//! id attribute and belongs to one element category.

use crate::vesper_bitflags;
use std::fmt;

/// Integer id stored in an element's id attribute.
///
/// Ids are dense and start at 1. [`ElemId::NONE`] (0) means "unassigned";
/// negative values never denote an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ElemId(pub i32);

impl ElemId {
    /// The unassigned id.
    pub const NONE: Self = Self(0);

    /// Returns `true` for ids that can name an element.
    pub fn is_valid(self) -> bool {
        self.0 > 0
    }

    /// Position of the id in a dense table, `None` for invalid ids.
    pub fn index(self) -> Option<usize> {
        if self.is_valid() {
            Some(self.0 as usize)
        } else {
            None
        }
    }
}

impl fmt::Display for ElemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

vesper_bitflags! {
    /// Element categories of a polygon mesh.
    pub struct ElemCategory: u8 {
        /// Vertices.
        const VERT = 1 << 0;
        /// Edges.
        const EDGE = 1 << 1;
        /// Face corners.
        const LOOP = 1 << 2;
        /// Faces.
        const FACE = 1 << 3;
    }
}

impl ElemCategory {
    /// Every category.
    pub const ALL: Self = Self::from_bits_retain(0b1111);
}

/// Access to the id attribute of the elements of a container.
///
/// `K` is the container's element reference: an opaque, copyable key that
/// stays meaningful until the container moves the element.
pub trait IdAttribute<K: Copy> {
    /// Category of the element.
    fn category(&self, elem: K) -> ElemCategory;

    /// Current value of the element's id attribute.
    fn elem_id(&self, elem: K) -> ElemId;

    /// Overwrites the element's id attribute.
    fn set_elem_id(&mut self, elem: K, id: ElemId);
}
