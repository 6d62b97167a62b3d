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

//! Dense, reusable integer ids for mesh elements.
//!
//! An [`IdMap`] hands out small positive ids to the elements of a container
//! and resolves them back to element references in O(1). Released ids are
//! reused before new ones are minted, so the id range stays dense across
//! topology edits.
//!
//! The map does not own elements. Each element stores its own id in an
//! attribute reached through [`IdAttribute`], and the container notifies the
//! map when it relocates an element.

mod free_list;

pub use self::free_list::FreeIdList;

use thiserror::Error;
use vesper_core::mesh::{ElemCategory, ElemId, IdAttribute};
use vesper_core::IdMapConfig;

/// Errors raised by [`IdMap`] operations that take a caller-provided id.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdMapError {
    /// Ids start at 1; zero and negative values never name an element.
    #[error("Invalid element id {0}: ids must be positive")]
    InvalidId(ElemId),

    /// The element belongs to a category this map does not track.
    #[error("Element category {0} is not tracked by this id map")]
    UntrackedCategory(ElemCategory),

    /// The free-list thresholds would make the hash index flap.
    #[error("Invalid id map thresholds: low ({low}) must be below high ({high})")]
    InvalidThresholds {
        /// Demotion threshold.
        low: usize,
        /// Promotion threshold.
        high: usize,
    },
}

/// Maps integer ids to element references of type `K`.
///
/// `K` is the owning container's element reference (a slot index, a key).
/// It must stay meaningful until the container reports a move through
/// [`IdMap::on_elem_moved`].
#[derive(Debug, Clone)]
pub struct IdMap<K: Copy + Eq> {
    categories: ElemCategory,
    map: Vec<Option<K>>,
    next_id: i32,
    free_list: FreeIdList,
    config: IdMapConfig,
}

impl<K: Copy + Eq> IdMap<K> {
    /// Creates a map tracking elements of `categories`.
    ///
    /// Fails when the free-list thresholds of `config` are not ordered.
    pub fn new(categories: ElemCategory, config: IdMapConfig) -> Result<Self, IdMapError> {
        if let Err(err) = config.validate() {
            log::error!("Rejecting id map configuration: {err}");
            return Err(IdMapError::InvalidThresholds {
                low: config.hashmap_threshold_low,
                high: config.hashmap_threshold_high,
            });
        }
        let mut map = Vec::with_capacity(config.initial_capacity.max(1));
        map.push(None);
        Ok(Self {
            categories,
            map,
            next_id: 1,
            free_list: FreeIdList::new(config.hashmap_threshold_high, config.hashmap_threshold_low),
            config,
        })
    }

    /// Categories tracked by the map.
    pub fn categories(&self) -> ElemCategory {
        self.categories
    }

    /// The next id minted when the free list is empty.
    pub fn next_id(&self) -> ElemId {
        ElemId(self.next_id)
    }

    /// Ids waiting to be reused.
    pub fn free_ids(&self) -> &FreeIdList {
        &self.free_list
    }

    /// Number of id slots, including the unused slot of id 0.
    pub fn capacity(&self) -> usize {
        self.map.len()
    }

    /// Gives `elem` a fresh id and writes it to the element's id attribute.
    ///
    /// The most recently released id is reused first; otherwise the next
    /// never-used id is minted. An id already bound to `elem` is released
    /// beforehand.
    pub fn allocate<A: IdAttribute<K>>(&mut self, attrs: &mut A, elem: K) -> ElemId {
        debug_assert!(
            self.categories.intersects(attrs.category(elem)),
            "allocating an id for an untracked element category"
        );
        self.unbind_current(attrs, elem);
        let id = match self.free_list.pop() {
            Some(id) => id,
            None => {
                let id = self.next_id;
                self.next_id += 1;
                id
            }
        };
        let id = ElemId(id);
        self.bind(id, elem);
        attrs.set_elem_id(elem, id);
        id
    }

    /// Binds `elem` to a caller-chosen `id`, taking it off the free list.
    ///
    /// Whatever element `id` pointed to before is forgotten without touching
    /// its attribute. The id `elem` held before, if bound to it, is released.
    pub fn assign<A: IdAttribute<K>>(
        &mut self,
        attrs: &mut A,
        elem: K,
        id: ElemId,
    ) -> Result<(), IdMapError> {
        if !id.is_valid() {
            return Err(IdMapError::InvalidId(id));
        }
        let category = attrs.category(elem);
        if !self.categories.intersects(category) {
            return Err(IdMapError::UntrackedCategory(category));
        }

        self.unbind_current(attrs, elem);
        self.free_list.remove(id.0);
        if id.0 >= self.next_id {
            self.next_id = id.0 + 1;
        }
        self.bind(id, elem);
        attrs.set_elem_id(elem, id);
        Ok(())
    }

    /// Registers `elem`, keeping the id already stored in its attribute when
    /// that id is valid and not claimed by another element.
    pub fn check_assign<A: IdAttribute<K>>(&mut self, attrs: &mut A, elem: K) -> ElemId {
        let id = attrs.elem_id(elem);
        let claimed_elsewhere = matches!(self.lookup(id), Some(other) if other != elem);
        if id.is_valid() && !claimed_elsewhere && self.assign(attrs, elem, id).is_ok() {
            return id;
        }
        self.allocate(attrs, elem)
    }

    /// Unbinds `elem` and makes its id available for reuse.
    ///
    /// With `clear_id` the element's attribute is reset to [`ElemId::NONE`].
    pub fn release<A: IdAttribute<K>>(&mut self, attrs: &mut A, elem: K, clear_id: bool) {
        let id = attrs.elem_id(elem);
        match id.index().and_then(|index| self.map.get_mut(index)) {
            Some(slot) if *slot == Some(elem) => {
                *slot = None;
                self.free_list.push(id.0);
            }
            _ => {
                log::warn!("Releasing element with unmapped id {id}");
            }
        }
        if clear_id {
            attrs.set_elem_id(elem, ElemId::NONE);
        }
    }

    /// Resolves an id. `None` for zero, negative, unbound or out-of-range ids.
    pub fn lookup(&self, id: ElemId) -> Option<K> {
        id.index()
            .and_then(|index| self.map.get(index))
            .copied()
            .flatten()
    }

    /// Repoints the id of an element the container moved from `old` to `new`.
    ///
    /// The id is read from the element at its new location.
    pub fn on_elem_moved<A: IdAttribute<K>>(&mut self, attrs: &A, old: K, new: K) {
        let id = attrs.elem_id(new);
        let slot = id.index().and_then(|index| self.map.get_mut(index));

        if cfg!(debug_assertions) && !matches!(slot.as_deref(), Some(Some(recorded)) if *recorded == old)
        {
            log::warn!("Possible id map corruption: id {id} was not bound to the moved element");
        }

        if let Some(slot) = slot {
            *slot = Some(new);
        }
    }

    /// Rebuilds the map from the ids stored on `elems`.
    ///
    /// The first element carrying a given valid id keeps it. Elements with no
    /// id, an invalid id or a duplicate get fresh ids once every hole below the
    /// highest kept id is back on the free list, lowest first. Elements of
    /// untracked categories are skipped. Returns how many elements got a new id.
    pub fn rebuild<A, I>(&mut self, attrs: &mut A, elems: I) -> usize
    where
        A: IdAttribute<K>,
        I: IntoIterator<Item = K>,
    {
        self.map.clear();
        self.map.push(None);
        self.free_list.clear();

        let mut max_id = 0;
        let mut needs_id = Vec::new();
        for elem in elems {
            if !self.categories.intersects(attrs.category(elem)) {
                continue;
            }
            let id = attrs.elem_id(elem);
            if id.is_valid() && self.lookup(id).is_none() {
                self.bind(id, elem);
                max_id = max_id.max(id.0);
            } else {
                needs_id.push(elem);
            }
        }

        self.next_id = max_id + 1;
        for hole in (1..self.next_id).rev() {
            if self.map[hole as usize].is_none() {
                self.free_list.push(hole);
            }
        }

        for &elem in &needs_id {
            self.allocate(attrs, elem);
        }

        if !needs_id.is_empty() {
            log::debug!("Id map rebuild reassigned {} element ids", needs_id.len());
        }
        needs_id.len()
    }

    /// The configuration the map was created with.
    pub fn config(&self) -> &IdMapConfig {
        &self.config
    }

    /// Frees the id stored on `elem` when the map still binds it to `elem`.
    fn unbind_current<A: IdAttribute<K>>(&mut self, attrs: &A, elem: K) {
        let id = attrs.elem_id(elem);
        if let Some(slot) = id.index().and_then(|index| self.map.get_mut(index)) {
            if *slot == Some(elem) {
                *slot = None;
                self.free_list.push(id.0);
            }
        }
    }

    fn bind(&mut self, id: ElemId, elem: K) {
        let index = id.0 as usize;
        if index >= self.map.len() {
            let target = (index + 1).max(self.map.len() * 2);
            self.map.resize(target, None);
        }
        self.map[index] = Some(elem);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Elems {
        ids: Vec<ElemId>,
        category: Vec<ElemCategory>,
    }

    impl Elems {
        fn with_verts(count: usize) -> Self {
            Self {
                ids: vec![ElemId::NONE; count],
                category: vec![ElemCategory::VERT; count],
            }
        }
    }

    impl IdAttribute<usize> for Elems {
        fn category(&self, elem: usize) -> ElemCategory {
            self.category[elem]
        }
        fn elem_id(&self, elem: usize) -> ElemId {
            self.ids[elem]
        }
        fn set_elem_id(&mut self, elem: usize, id: ElemId) {
            self.ids[elem] = id;
        }
    }

    fn verts_map() -> IdMap<usize> {
        IdMap::new(ElemCategory::VERT, IdMapConfig::default()).unwrap()
    }

    #[test]
    fn allocation_starts_at_one() {
        let mut elems = Elems::with_verts(3);
        let mut map = verts_map();

        let ids: Vec<_> = (0..3).map(|e| map.allocate(&mut elems, e)).collect();
        assert_eq!(ids, vec![ElemId(1), ElemId(2), ElemId(3)]);
        assert_eq!(elems.ids, ids);
        assert_eq!(map.lookup(ElemId(2)), Some(1));
        assert_eq!(map.next_id(), ElemId(4));
    }

    #[test]
    fn lookup_rejects_out_of_range_ids() {
        let map = verts_map();
        assert_eq!(map.lookup(ElemId(-1)), None);
        assert_eq!(map.lookup(ElemId::NONE), None);
        assert_eq!(map.lookup(ElemId(1_000_000)), None);
    }

    #[test]
    fn released_ids_are_reused_first() {
        let mut elems = Elems::with_verts(4);
        let mut map = verts_map();
        for e in 0..3 {
            map.allocate(&mut elems, e);
        }

        map.release(&mut elems, 1, true);
        assert_eq!(elems.ids[1], ElemId::NONE);
        assert_eq!(map.lookup(ElemId(2)), None);

        assert_eq!(map.allocate(&mut elems, 3), ElemId(2));
        assert_eq!(map.lookup(ElemId(2)), Some(3));
    }

    #[test]
    fn release_keeping_id_leaves_attribute() {
        let mut elems = Elems::with_verts(1);
        let mut map = verts_map();
        map.allocate(&mut elems, 0);
        map.release(&mut elems, 0, false);
        assert_eq!(elems.ids[0], ElemId(1));
        assert!(map.free_ids().contains(1));
    }

    #[test]
    fn assign_skips_ahead_and_leaves_free_list() {
        let mut elems = Elems::with_verts(3);
        let mut map = verts_map();
        map.allocate(&mut elems, 0);
        map.allocate(&mut elems, 1);
        map.release(&mut elems, 1, true);

        map.assign(&mut elems, 2, ElemId(2)).unwrap();
        assert!(!map.free_ids().contains(2));
        assert_eq!(map.lookup(ElemId(2)), Some(2));

        map.assign(&mut elems, 1, ElemId(40)).unwrap();
        assert_eq!(map.next_id(), ElemId(41));
        assert!(map.capacity() > 40);
    }

    #[test]
    fn reallocating_a_mapped_element_frees_its_old_id() {
        let mut elems = Elems::with_verts(2);
        let mut map = verts_map();
        map.allocate(&mut elems, 0);
        map.allocate(&mut elems, 1);

        map.assign(&mut elems, 0, ElemId(7)).unwrap();
        assert_eq!(map.lookup(ElemId(1)), None);
        assert!(map.free_ids().contains(1));
        assert_eq!(map.lookup(ElemId(7)), Some(0));

        // The freed id comes straight back, nothing else points at the element.
        assert_eq!(map.allocate(&mut elems, 1), ElemId(2));
        assert_eq!(map.lookup(ElemId(2)), Some(1));
        let bound: Vec<i32> = (1..9)
            .filter(|&id| map.lookup(ElemId(id)).is_some())
            .collect();
        assert_eq!(bound, vec![2, 7]);

        map.assign(&mut elems, 1, ElemId(2)).unwrap();
        assert_eq!(map.lookup(ElemId(2)), Some(1));
        assert!(!map.free_ids().contains(2));
    }

    #[test]
    fn unordered_thresholds_are_rejected() {
        let config = IdMapConfig {
            hashmap_threshold_high: 8,
            hashmap_threshold_low: 8,
            ..IdMapConfig::default()
        };
        let map = IdMap::<usize>::new(ElemCategory::VERT, config);
        assert_eq!(
            map.err(),
            Some(IdMapError::InvalidThresholds { low: 8, high: 8 })
        );
    }

    #[test]
    fn assign_rejects_non_positive_ids() {
        let mut elems = Elems::with_verts(1);
        let mut map = verts_map();
        assert_eq!(
            map.assign(&mut elems, 0, ElemId(0)),
            Err(IdMapError::InvalidId(ElemId(0)))
        );
        assert_eq!(
            map.assign(&mut elems, 0, ElemId(-3)),
            Err(IdMapError::InvalidId(ElemId(-3)))
        );
    }

    #[test]
    fn assign_rejects_untracked_category() {
        let mut elems = Elems::with_verts(1);
        elems.category[0] = ElemCategory::FACE;
        let mut map = verts_map();
        assert_eq!(
            map.assign(&mut elems, 0, ElemId(1)),
            Err(IdMapError::UntrackedCategory(ElemCategory::FACE))
        );
    }

    #[test]
    fn check_assign_keeps_unclaimed_ids() {
        let mut elems = Elems::with_verts(3);
        elems.ids = vec![ElemId(5), ElemId(5), ElemId(-2)];
        let mut map = verts_map();

        assert_eq!(map.check_assign(&mut elems, 0), ElemId(5));
        // Duplicate of an id already bound elsewhere.
        let second = map.check_assign(&mut elems, 1);
        assert_ne!(second, ElemId(5));
        assert_eq!(elems.ids[1], second);
        // Invalid id.
        let third = map.check_assign(&mut elems, 2);
        assert!(third.is_valid());
        assert_eq!(map.lookup(ElemId(5)), Some(0));
    }

    #[test]
    fn element_move_repoints_id() {
        let mut elems = Elems::with_verts(2);
        let mut map = verts_map();
        let id = map.allocate(&mut elems, 0);

        // The container copied element 0 into slot 1.
        elems.ids[1] = elems.ids[0];
        map.on_elem_moved(&elems, 0, 1);
        assert_eq!(map.lookup(id), Some(1));
    }

    #[test]
    fn rebuild_fixes_duplicates_and_fills_holes() {
        let mut elems = Elems::with_verts(4);
        elems.ids = vec![ElemId(1), ElemId(4), ElemId(4), ElemId::NONE];
        let mut map = verts_map();

        let reassigned = map.rebuild(&mut elems, 0..4);
        assert_eq!(reassigned, 2);
        // Holes 2 and 3 are handed out lowest first.
        assert_eq!(elems.ids[2], ElemId(2));
        assert_eq!(elems.ids[3], ElemId(3));
        assert_eq!(map.lookup(ElemId(4)), Some(1));
        assert!(map.free_ids().is_empty());
        assert_eq!(map.next_id(), ElemId(5));
    }
}
