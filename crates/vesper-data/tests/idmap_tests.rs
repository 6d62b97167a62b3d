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

//! Integration tests for the identifier map through the public API.

use anyhow::Result;
use vesper_core::mesh::{ElemCategory, ElemId, IdAttribute};
use vesper_core::{IdMapConfig, VesperConfig};
use vesper_data::{ElementKey, ElementPool, IdMap, PoolElement};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A minimal mesh: every element is a vertex, edge or face with an id slot.
#[derive(Default)]
struct Mesh {
    elems: Vec<(ElemCategory, ElemId)>,
}

impl Mesh {
    fn add(&mut self, category: ElemCategory) -> usize {
        self.elems.push((category, ElemId::NONE));
        self.elems.len() - 1
    }
}

impl IdAttribute<usize> for Mesh {
    fn category(&self, elem: usize) -> ElemCategory {
        self.elems[elem].0
    }
    fn elem_id(&self, elem: usize) -> ElemId {
        self.elems[elem].1
    }
    fn set_elem_id(&mut self, elem: usize, id: ElemId) {
        self.elems[elem].1 = id;
    }
}

#[test]
fn release_then_allocate_reuses_id() -> Result<()> {
    init_logging();
    let mut mesh = Mesh::default();
    let mut map = IdMap::new(ElemCategory::ALL, IdMapConfig::default())?;

    let a = mesh.add(ElemCategory::VERT);
    let b = mesh.add(ElemCategory::EDGE);
    let c = mesh.add(ElemCategory::FACE);
    let ids: Vec<_> = [a, b, c]
        .into_iter()
        .map(|e| map.allocate(&mut mesh, e))
        .collect();
    assert_eq!(ids, vec![ElemId(1), ElemId(2), ElemId(3)]);

    map.release(&mut mesh, b, true);
    let d = mesh.add(ElemCategory::VERT);
    assert_eq!(map.allocate(&mut mesh, d), ElemId(2));
    assert_eq!(map.lookup(ElemId(2)), Some(d));
    assert_eq!(map.lookup(ElemId(1)), Some(a));
    assert_eq!(map.lookup(ElemId(3)), Some(c));
    Ok(())
}

#[test]
fn free_list_promotion_survives_mass_release() -> Result<()> {
    init_logging();
    let config = VesperConfig::from_ron_str(
        "(id_map: (hashmap_threshold_high: 32, hashmap_threshold_low: 8))",
    )?;
    let mut mesh = Mesh::default();
    let mut map = IdMap::new(ElemCategory::VERT, config.id_map)?;

    let elems: Vec<usize> = (0..100).map(|_| mesh.add(ElemCategory::VERT)).collect();
    for &e in &elems {
        map.allocate(&mut mesh, e);
    }

    // Release every even element: 50 free ids, past the promotion threshold.
    for &e in elems.iter().step_by(2) {
        map.release(&mut mesh, e, true);
    }
    assert!(map.free_ids().is_indexed());
    assert_eq!(map.free_ids().len(), 50);

    // Forcing ids out of the middle of the list goes through the index.
    map.assign(&mut mesh, elems[0], ElemId(51))?;
    assert!(!map.free_ids().contains(51));
    assert_eq!(map.free_ids().len(), 49);

    // Drain below the demotion threshold: every id comes back exactly once.
    let mut reused = Vec::new();
    for &e in elems.iter().step_by(2).skip(1) {
        reused.push(map.allocate(&mut mesh, e).0);
    }
    assert!(!map.free_ids().is_indexed());
    reused.sort_unstable();
    reused.dedup();
    assert_eq!(reused.len(), 49);
    assert!(reused.iter().all(|&id| id % 2 == 1 && id != 51));
    Ok(())
}

#[test]
fn rebuild_after_external_edit() -> Result<()> {
    init_logging();
    let mut mesh = Mesh::default();
    let mut map = IdMap::new(
        ElemCategory::VERT | ElemCategory::FACE,
        IdMapConfig::default(),
    )?;

    for _ in 0..4 {
        let e = mesh.add(ElemCategory::VERT);
        map.allocate(&mut mesh, e);
    }
    let edge = mesh.add(ElemCategory::EDGE);

    // Somebody copied ids around without telling the map.
    mesh.elems[3].1 = ElemId(1);
    mesh.elems[1].1 = ElemId(-7);

    let count = mesh.elems.len();
    let reassigned = map.rebuild(&mut mesh, 0..count);
    assert_eq!(reassigned, 2);
    assert_eq!(mesh.elem_id(edge), ElemId::NONE);

    let mut ids: Vec<i32> = (0..4).map(|e| mesh.elem_id(e).0).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    for e in 0..4 {
        assert_eq!(map.lookup(mesh.elem_id(e)), Some(e));
    }
    Ok(())
}

#[derive(Debug)]
struct Face {
    id: ElemId,
    sides: u32,
}

impl PoolElement for Face {
    fn category(&self) -> ElemCategory {
        ElemCategory::FACE
    }
    fn elem_id(&self) -> ElemId {
        self.id
    }
    fn set_elem_id(&mut self, id: ElemId) {
        self.id = id;
    }
}

#[test]
fn pool_edit_cycle_keeps_ids_dense() -> Result<()> {
    init_logging();
    let mut pool = ElementPool::with_id_map(ElemCategory::FACE, IdMapConfig::default())?;
    let keys: Vec<ElementKey> = (0..8)
        .map(|sides| pool.insert(Face { id: ElemId::NONE, sides }))
        .collect();

    for key in keys.iter().skip(1).step_by(2) {
        pool.remove(*key);
    }
    pool.compact();
    for sides in 10..14 {
        pool.insert(Face { id: ElemId::NONE, sides });
    }

    let mut ids: Vec<i32> = pool.iter().map(|(_, face)| face.id.0).collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=8).collect::<Vec<_>>());
    for (key, face) in pool.iter() {
        let (found, same) = pool.lookup(face.id).unwrap();
        assert_eq!(found, key);
        assert_eq!(same.sides, face.sides);
    }
    assert_eq!(pool.rebuild_ids(), 0);
    Ok(())
}
