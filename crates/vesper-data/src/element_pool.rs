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

//! A compacting element container kept in sync with an [`IdMap`].

use crate::idmap::{IdMap, IdMapError};
use std::fmt;
use vesper_core::mesh::{ElemCategory, ElemId, IdAttribute};
use vesper_core::IdMapConfig;

/// An element stored in an [`ElementPool`].
pub trait PoolElement {
    /// Category of the element.
    fn category(&self) -> ElemCategory;
    /// The element's id attribute.
    fn elem_id(&self) -> ElemId;
    /// Overwrites the element's id attribute.
    fn set_elem_id(&mut self, id: ElemId);
}

/// Slot of an element inside an [`ElementPool`]. Invalidated by
/// [`ElementPool::compact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementKey(pub u32);

impl fmt::Display for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Slots<T>(Vec<Option<T>>);

impl<T: PoolElement> IdAttribute<ElementKey> for Slots<T> {
    fn category(&self, elem: ElementKey) -> ElemCategory {
        self.0
            .get(elem.0 as usize)
            .and_then(Option::as_ref)
            .map_or(ElemCategory::EMPTY, PoolElement::category)
    }

    fn elem_id(&self, elem: ElementKey) -> ElemId {
        self.0
            .get(elem.0 as usize)
            .and_then(Option::as_ref)
            .map_or(ElemId::NONE, PoolElement::elem_id)
    }

    fn set_elem_id(&mut self, elem: ElementKey, id: ElemId) {
        if let Some(Some(element)) = self.0.get_mut(elem.0 as usize) {
            element.set_elem_id(id);
        }
    }
}

/// Owning storage for mesh elements.
///
/// Removal leaves a hole; [`ElementPool::compact`] closes the holes by moving
/// live elements down and reports every move to the bound id map, so ids keep
/// resolving to the right element.
#[derive(Debug, Clone)]
pub struct ElementPool<T: PoolElement> {
    slots: Slots<T>,
    live: usize,
    id_map: Option<IdMap<ElementKey>>,
}

impl<T: PoolElement> Default for ElementPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PoolElement> ElementPool<T> {
    /// Creates a pool with no id map.
    pub fn new() -> Self {
        Self {
            slots: Slots(Vec::new()),
            live: 0,
            id_map: None,
        }
    }

    /// Creates a pool whose elements of `categories` get ids.
    ///
    /// Fails when `config` is rejected by [`IdMap::new`].
    pub fn with_id_map(
        categories: ElemCategory,
        config: IdMapConfig,
    ) -> Result<Self, IdMapError> {
        Ok(Self {
            id_map: Some(IdMap::new(categories, config)?),
            ..Self::new()
        })
    }

    /// The bound id map, if any.
    pub fn id_map(&self) -> Option<&IdMap<ElementKey>> {
        self.id_map.as_ref()
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if the pool holds no element.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of slots, holes included.
    pub fn slot_count(&self) -> usize {
        self.slots.0.len()
    }

    /// Stores `element` and registers it with the id map.
    ///
    /// An id already set on the element is kept when it is free.
    pub fn insert(&mut self, element: T) -> ElementKey {
        let key = ElementKey(self.slots.0.len() as u32);
        let tracked = self
            .id_map
            .as_ref()
            .is_some_and(|map| map.categories().intersects(element.category()));
        self.slots.0.push(Some(element));
        self.live += 1;

        if tracked {
            if let Some(map) = &mut self.id_map {
                map.check_assign(&mut self.slots, key);
            }
        }
        key
    }

    /// Removes the element at `key`, releasing its id.
    pub fn remove(&mut self, key: ElementKey) -> Option<T> {
        if self.get(key).is_none() {
            return None;
        }
        if let Some(map) = &mut self.id_map {
            if map.categories().intersects(self.slots.category(key)) {
                map.release(&mut self.slots, key, true);
            }
        }
        self.live -= 1;
        self.slots.0.get_mut(key.0 as usize).and_then(Option::take)
    }

    /// The element at `key`.
    pub fn get(&self, key: ElementKey) -> Option<&T> {
        self.slots.0.get(key.0 as usize).and_then(Option::as_ref)
    }

    /// The element at `key`, mutably. Changing its id attribute directly leaves
    /// the map stale until [`ElementPool::rebuild_ids`].
    pub fn get_mut(&mut self, key: ElementKey) -> Option<&mut T> {
        self.slots.0.get_mut(key.0 as usize).and_then(Option::as_mut)
    }

    /// Resolves an id to its element.
    pub fn lookup(&self, id: ElemId) -> Option<(ElementKey, &T)> {
        let key = self.id_map.as_ref()?.lookup(id)?;
        self.get(key).map(|element| (key, element))
    }

    /// Iterates over the live elements in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ElementKey, &T)> {
        self.slots
            .0
            .iter()
            .enumerate()
            .filter_map(|(slot, element)| Some((ElementKey(slot as u32), element.as_ref()?)))
    }

    /// Moves live elements down over the holes. Returns how many moved.
    pub fn compact(&mut self) -> usize {
        let mut write = 0usize;
        let mut moved = 0;
        for read in 0..self.slots.0.len() {
            if self.slots.0[read].is_none() {
                continue;
            }
            if read != write {
                self.slots.0.swap(read, write);
                let (old, new) = (ElementKey(read as u32), ElementKey(write as u32));
                if let Some(map) = &mut self.id_map {
                    if map.categories().intersects(self.slots.category(new)) {
                        map.on_elem_moved(&self.slots, old, new);
                    }
                }
                moved += 1;
            }
            write += 1;
        }
        self.slots.0.truncate(write);
        log::trace!("Compacted element pool: {moved} moved, {write} live");
        moved
    }

    /// Rebuilds the id map from the ids stored on the elements. Returns how many
    /// elements got a new id.
    pub fn rebuild_ids(&mut self) -> usize {
        let keys: Vec<ElementKey> = self.iter().map(|(key, _)| key).collect();
        match &mut self.id_map {
            Some(map) => map.rebuild(&mut self.slots, keys),
            None => 0,
        }
    }
}
