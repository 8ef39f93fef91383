use core::hint::black_box;

use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;
use criterion::Throughput;
use hashbrown::HashSet as HashbrownSet;
use rand::rngs::OsRng;
use rand::TryRngCore;
use swiss_set::xxhash;
use swiss_set::SwissSet;
use swiss_set::U64SwissSet;

const SIZES: &[usize] = &[
    ((1 << 10) as f32 * 0.87) as usize,
    ((1 << 15) as f32 * 0.87) as usize,
    ((1 << 19) as f32 * 0.87) as usize,
];

fn random_values(count: usize) -> Vec<u64> {
    let mut rng = OsRng;
    let mut values = Vec::with_capacity(count);
    while values.len() < count {
        values.push(rng.try_next_u64().unwrap());
    }
    values
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    for &size in SIZES {
        let values = random_values(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("u64_swiss_set/{}", size), |b| {
            b.iter(|| {
                let mut set = U64SwissSet::new(size).unwrap();
                for &value in &values {
                    black_box(set.insert(value).unwrap());
                }
                black_box(set)
            })
        });

        group.bench_function(format!("swiss_set_bytes/{}", size), |b| {
            b.iter(|| {
                let mut set = SwissSet::new(8, size).unwrap();
                for &value in &values {
                    let entry = value.to_le_bytes();
                    black_box(set.insert(xxhash::hash(&entry), &entry).unwrap());
                }
                black_box(set)
            })
        });

        group.bench_function(format!("hashbrown/{}", size), |b| {
            b.iter(|| {
                let mut set = HashbrownSet::with_capacity(size);
                for &value in &values {
                    black_box(set.insert(value));
                }
                black_box(set)
            })
        });
    }

    group.finish();
}

fn bench_lookup_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup_hit");

    for &size in SIZES {
        let values = random_values(size);
        group.throughput(Throughput::Elements(size as u64));

        let mut swiss = U64SwissSet::new(size).unwrap();
        let mut brown = HashbrownSet::with_capacity(size);
        for &value in &values {
            swiss.insert(value).unwrap();
            brown.insert(value);
        }

        group.bench_function(format!("u64_swiss_set/{}", size), |b| {
            b.iter(|| {
                for &value in &values {
                    black_box(swiss.contains(value));
                }
            })
        });

        group.bench_function(format!("hashbrown/{}", size), |b| {
            b.iter(|| {
                for &value in &values {
                    black_box(brown.contains(&value));
                }
            })
        });
    }

    group.finish();
}

fn bench_lookup_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup_miss");

    for &size in SIZES {
        let values = random_values(size);
        let probes = random_values(size);
        group.throughput(Throughput::Elements(size as u64));

        let mut swiss = U64SwissSet::new(size).unwrap();
        let mut brown = HashbrownSet::with_capacity(size);
        for &value in &values {
            swiss.insert(value).unwrap();
            brown.insert(value);
        }

        group.bench_function(format!("u64_swiss_set/{}", size), |b| {
            b.iter(|| {
                for &probe in &probes {
                    black_box(swiss.contains(probe));
                }
            })
        });

        group.bench_function(format!("hashbrown/{}", size), |b| {
            b.iter(|| {
                for &probe in &probes {
                    black_box(brown.contains(&probe));
                }
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_insert, bench_lookup_hit, bench_lookup_miss);
criterion_main!(benches);
