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

//! Append-only storage with stable element addresses.

use std::ops::{Index, IndexMut};

/// Append-only storage split into fixed-size blocks.
///
/// Elements are addressed by a flat index that maps to `(index / BLOCK,
/// index % BLOCK)`. Every block is allocated with room for exactly `BLOCK`
/// elements and never grows past it, so pushing never moves an element that is
/// already stored.
#[derive(Debug, Clone)]
pub struct BlockArena<T, const BLOCK: usize = 16> {
    blocks: Vec<Vec<T>>,
    len: usize,
}

impl<T, const BLOCK: usize> Default for BlockArena<T, BLOCK> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const BLOCK: usize> BlockArena<T, BLOCK> {
    /// Creates an empty arena. No block is allocated until the first push.
    pub const fn new() -> Self {
        assert!(BLOCK > 0, "block size must be non-zero");
        Self {
            blocks: Vec::new(),
            len: 0,
        }
    }

    /// Appends `value` and returns its index.
    pub fn push(&mut self, value: T) -> usize {
        let index = self.len;
        let block = index / BLOCK;
        if block == self.blocks.len() {
            self.blocks.push(Vec::with_capacity(BLOCK));
        }
        let storage = &mut self.blocks[block];
        debug_assert!(storage.len() < BLOCK);
        storage.push(value);
        self.len += 1;
        index
    }

    /// Returns the element at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.blocks.get(index / BLOCK)?.get(index % BLOCK)
    }

    /// Returns the element at `index` mutably.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.blocks.get_mut(index / BLOCK)?.get_mut(index % BLOCK)
    }

    /// Number of stored elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every element. Allocated blocks are kept for reuse.
    pub fn clear(&mut self) {
        for block in &mut self.blocks {
            block.clear();
        }
        self.len = 0;
    }

    /// Iterates over the elements in index order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.blocks.iter().flat_map(|block| block.iter())
    }
}

impl<T, const BLOCK: usize> Index<usize> for BlockArena<T, BLOCK> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => panic!("arena index {index} out of bounds (len {})", self.len),
        }
    }
}

impl<T, const BLOCK: usize> IndexMut<usize> for BlockArena<T, BLOCK> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;
        match self.get_mut(index) {
            Some(value) => value,
            None => panic!("arena index {index} out of bounds (len {len})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_sequential_across_blocks() {
        let mut arena: BlockArena<u32, 4> = BlockArena::new();
        for i in 0..10 {
            assert_eq!(arena.push(i * 10), i as usize);
        }
        assert_eq!(arena.len(), 10);
        assert_eq!(arena[9], 90);
        assert_eq!(arena.get(10), None);
        assert_eq!(arena.iter().copied().collect::<Vec<_>>()[4..6], [40, 50]);
    }

    #[test]
    fn push_never_moves_stored_elements() {
        let mut arena: BlockArena<String> = BlockArena::new();
        arena.push("first".to_string());
        let before = &arena[0] as *const String;
        for i in 0..100 {
            arena.push(i.to_string());
        }
        let after = &arena[0] as *const String;
        assert_eq!(before, after);
        assert_eq!(arena[0], "first");
    }

    #[test]
    fn clear_resets_indices() {
        let mut arena: BlockArena<u8, 2> = BlockArena::new();
        arena.push(1);
        arena.push(2);
        arena.push(3);
        arena.clear();
        assert!(arena.is_empty());
        assert_eq!(arena.push(7), 0);
        assert_eq!(arena[0], 7);
        assert_eq!(arena.get(1), None);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn indexing_past_the_end_panics() {
        let arena: BlockArena<u8> = BlockArena::new();
        let _ = arena[0];
    }
}
