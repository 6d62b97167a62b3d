use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use vesper_core::mesh::{ElemCategory, ElemId, IdAttribute};
use vesper_core::IdMapConfig;
use vesper_data::IdMap;

struct Ids(Vec<ElemId>);

impl IdAttribute<usize> for Ids {
    fn category(&self, _elem: usize) -> ElemCategory {
        ElemCategory::VERT
    }
    fn elem_id(&self, elem: usize) -> ElemId {
        self.0[elem]
    }
    fn set_elem_id(&mut self, elem: usize, id: ElemId) {
        self.0[elem] = id;
    }
}

fn bench_idmap(c: &mut Criterion) {
    const COUNT: usize = 10_000;

    let mut group = c.benchmark_group("IdMap");

    group.bench_function("Allocate 10k", |b| {
        b.iter(|| {
            let mut attrs = Ids(vec![ElemId::NONE; COUNT]);
            let mut map = IdMap::new(ElemCategory::VERT, IdMapConfig::default()).unwrap();
            for e in 0..COUNT {
                black_box(map.allocate(&mut attrs, e));
            }
        });
    });

    // Release half the ids so the free list is indexed, then force-assign
    // from the middle of it.
    group.bench_function("Assign from indexed free list", |b| {
        b.iter(|| {
            let mut attrs = Ids(vec![ElemId::NONE; COUNT]);
            let mut map = IdMap::new(ElemCategory::VERT, IdMapConfig::default()).unwrap();
            for e in 0..COUNT {
                map.allocate(&mut attrs, e);
            }
            for e in (0..COUNT).step_by(2) {
                map.release(&mut attrs, e, true);
            }
            for e in (0..COUNT).step_by(2) {
                let _ = map.assign(&mut attrs, e, ElemId(e as i32 + 1));
            }
            black_box(map.free_ids().len());
        });
    });

    group.bench_function("Lookup 10k", |b| {
        let mut attrs = Ids(vec![ElemId::NONE; COUNT]);
        let mut map = IdMap::new(ElemCategory::VERT, IdMapConfig::default()).unwrap();
        for e in 0..COUNT {
            map.allocate(&mut attrs, e);
        }
        b.iter(|| {
            let mut hits = 0usize;
            for id in 1..=COUNT as i32 {
                hits += map.lookup(ElemId(id)).is_some() as usize;
            }
            black_box(hits);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_idmap);
criterion_main!(benches);
