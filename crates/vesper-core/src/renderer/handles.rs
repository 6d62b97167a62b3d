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

//! Opaque handles to device-side objects and deferred handle slots.
//!
//! Handles are plain integers owned by the device backend. The recording layer
//! stores them by value, or through a [`ResourceCell`] when the caller wants the
//! handle to be read at submission time instead of record time.

use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

/// Conversion between a handle and the raw integer stored in a [`ResourceCell`].
pub trait RawHandle: Copy {
    /// Returns the raw value of the handle.
    fn to_raw(self) -> u32;
    /// Rebuilds a handle from a raw value produced by [`RawHandle::to_raw`].
    fn from_raw(raw: u32) -> Self;
}

macro_rules! raw_handle {
    ($($name:ident),* $(,)?) => {
        $(
            impl RawHandle for $name {
                fn to_raw(self) -> u32 {
                    self.0
                }
                fn from_raw(raw: u32) -> Self {
                    Self(raw)
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "#{}", self.0)
                }
            }
        )*
    };
}

/// An opaque handle to a compiled shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderId(pub u32);

/// An opaque handle to a batch: vertex/index buffers plus primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchId(pub u32);

/// An opaque handle to a texture, sampled or bound as an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// An opaque handle to a uniform buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniformBufferId(pub u32);

/// An opaque handle to a storage buffer. Indirect draw and dispatch arguments
/// live in storage buffers too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageBufferId(pub u32);

/// An opaque handle to a compiled material, resolved by a
/// [`MaterialEvaluator`](crate::renderer::MaterialEvaluator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u32);

raw_handle!(
    ShaderId,
    BatchId,
    TextureId,
    UniformBufferId,
    StorageBufferId,
    MaterialId
);

/// Per-draw resource handle.
///
/// The low 31 bits index the per-instance resource set (matrices, bounds,
/// object infos). The top bit is set when the object transform has negative
/// determinant, which flips the front-face winding at replay. `ResourceHandle(0)`
/// is the default resource set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ResourceHandle(pub u32);

impl ResourceHandle {
    const INVERTED_BIT: u32 = 1 << 31;

    /// Builds a handle from a resource index and the handedness of the transform.
    pub fn new(index: u32, inverted_handedness: bool) -> Self {
        debug_assert!(index < Self::INVERTED_BIT, "resource index overflow");
        let bit = if inverted_handedness {
            Self::INVERTED_BIT
        } else {
            0
        };
        Self(index | bit)
    }

    /// Index of the resource set.
    pub fn resource_index(self) -> u32 {
        self.0 & !Self::INVERTED_BIT
    }

    /// Returns `true` when the object transform mirrors geometry.
    pub fn has_inverted_handedness(self) -> bool {
        self.0 & Self::INVERTED_BIT != 0
    }
}

/// A shared slot holding a handle that is dereferenced at submission time.
///
/// Use it when the bound resource may be recreated (resized, reallocated)
/// between recording and submission. Cloning shares the slot. The owner of the
/// slot is responsible for keeping the handle it stores alive for every
/// submission that replays it.
#[derive(Clone)]
pub struct ResourceCell<H: RawHandle> {
    slot: Arc<AtomicU64>,
    _marker: std::marker::PhantomData<fn() -> H>,
}

impl<H: RawHandle> ResourceCell<H> {
    const EMPTY: u64 = u64::MAX;

    /// Creates a slot holding `handle`.
    pub fn new(handle: H) -> Self {
        let cell = Self::empty();
        cell.set(handle);
        cell
    }

    /// Creates a slot holding no handle.
    pub fn empty() -> Self {
        Self {
            slot: Arc::new(AtomicU64::new(Self::EMPTY)),
            _marker: std::marker::PhantomData,
        }
    }

    /// Stores `handle`, visible to every clone of this cell.
    pub fn set(&self, handle: H) {
        self.slot.store(u64::from(handle.to_raw()), Ordering::Release);
    }

    /// Empties the slot.
    pub fn clear(&self) {
        self.slot.store(Self::EMPTY, Ordering::Release);
    }

    /// Reads the current handle.
    pub fn get(&self) -> Option<H> {
        match self.slot.load(Ordering::Acquire) {
            Self::EMPTY => None,
            raw => Some(H::from_raw(raw as u32)),
        }
    }
}

impl<H: RawHandle + fmt::Debug> fmt::Debug for ResourceCell<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResourceCell").field(&self.get()).finish()
    }
}

/// A shared compute group count, read when the dispatch is replayed.
#[derive(Clone, Default)]
pub struct GroupCountCell {
    counts: Arc<[AtomicU32; 3]>,
}

impl GroupCountCell {
    /// Creates a cell holding `counts`.
    pub fn new(counts: [u32; 3]) -> Self {
        let cell = Self::default();
        cell.set(counts);
        cell
    }

    /// Updates the group counts.
    pub fn set(&self, counts: [u32; 3]) {
        for (slot, value) in self.counts.iter().zip(counts) {
            slot.store(value, Ordering::Release);
        }
    }

    /// Reads the group counts.
    pub fn get(&self) -> [u32; 3] {
        [
            self.counts[0].load(Ordering::Acquire),
            self.counts[1].load(Ordering::Acquire),
            self.counts[2].load(Ordering::Acquire),
        ]
    }
}

impl fmt::Debug for GroupCountCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GroupCountCell").field(&self.get()).finish()
    }
}
