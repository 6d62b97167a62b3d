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

//! Free-id list with an on-demand position index.

use ahash::AHashMap;

/// Ids released by an [`IdMap`](super::IdMap), waiting to be reused.
///
/// Small lists are a plain vector: `contains` and `remove` scan it. When the
/// list grows past the high threshold an `id -> position` index is built so
/// both become O(1); it is dropped again once the list shrinks below the low
/// threshold. The two thresholds are apart so the index does not flap.
#[derive(Debug, Clone)]
pub struct FreeIdList {
    ids: Vec<i32>,
    index: Option<AHashMap<i32, usize>>,
    threshold_high: usize,
    threshold_low: usize,
}

impl FreeIdList {
    /// Creates an empty list with the given promotion and demotion thresholds.
    pub fn new(threshold_high: usize, threshold_low: usize) -> Self {
        debug_assert!(threshold_low < threshold_high);
        Self {
            ids: Vec::new(),
            index: None,
            threshold_high,
            threshold_low,
        }
    }

    /// Number of free ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if no id is free.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns `true` while the position index is built.
    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// Adds `id` to the list. It is the next id returned by [`FreeIdList::pop`].
    pub fn push(&mut self, id: i32) {
        self.ids.push(id);
        let position = self.ids.len() - 1;
        if let Some(index) = &mut self.index {
            index.insert(id, position);
        } else if self.ids.len() > self.threshold_high {
            self.build_index();
        }
    }

    /// Takes the most recently pushed id.
    pub fn pop(&mut self) -> Option<i32> {
        let id = self.ids.pop()?;
        if let Some(index) = &mut self.index {
            index.remove(&id);
        }
        self.demote_if_small();
        Some(id)
    }

    /// Removes `id` wherever it is. Returns `false` if it was not free.
    ///
    /// The last id takes the removed id's place, so the pop order of the other
    /// ids may change.
    pub fn remove(&mut self, id: i32) -> bool {
        let position = match &self.index {
            Some(index) => index.get(&id).copied(),
            None => self.ids.iter().position(|&free| free == id),
        };
        let Some(position) = position else {
            return false;
        };

        self.ids.swap_remove(position);
        if let Some(index) = &mut self.index {
            index.remove(&id);
            if let Some(&moved) = self.ids.get(position) {
                index.insert(moved, position);
            }
        }
        self.demote_if_small();
        true
    }

    /// Returns `true` if `id` is free.
    pub fn contains(&self, id: i32) -> bool {
        match &self.index {
            Some(index) => index.contains_key(&id),
            None => self.ids.contains(&id),
        }
    }

    /// Drops every id, and the index with them.
    pub fn clear(&mut self) {
        self.ids.clear();
        self.index = None;
    }

    /// Iterates over the free ids, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.ids.iter().copied()
    }

    fn build_index(&mut self) {
        log::debug!(
            "Free id list reached {} entries, building position index",
            self.ids.len()
        );
        let index = self
            .ids
            .iter()
            .enumerate()
            .map(|(position, &id)| (id, position))
            .collect();
        self.index = Some(index);
    }

    fn demote_if_small(&mut self) {
        if self.index.is_some() && self.ids.len() < self.threshold_low {
            log::debug!(
                "Free id list shrank to {} entries, dropping position index",
                self.ids.len()
            );
            self.index = None;
        }
    }
}
