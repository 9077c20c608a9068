use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use tempfile::TempDir;

use healthlog::records::Activity;
use healthlog::{EntityStore, FileStore, MemoryStore};

fn activities(count: usize) -> Vec<Activity> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 7, 0, 0).unwrap();
    (0..count)
        .map(|i| Activity {
            id: (1_704_092_400_000 + i as i64).to_string(),
            user_id: "bench".to_string(),
            date: start + Duration::hours(i as i64),
            activity_type: "Running".to_string(),
            duration: 30,
            calories: Some(300),
            notes: None,
        })
        .collect()
}

fn bench_memory(c: &mut Criterion) {
    let store = EntityStore::new(Arc::new(MemoryStore::new()));
    let records = activities(500);
    store.save("bench", &records).unwrap();

    c.bench_function("memory_save_500", |b| {
        b.iter(|| store.save("bench", black_box(&records)).unwrap())
    });
    c.bench_function("memory_load_500", |b| {
        b.iter(|| black_box(store.load::<Activity>("bench").unwrap()))
    });
}

fn bench_file(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let store = EntityStore::new(Arc::new(FileStore::new(dir.path()).unwrap()));
    let records = activities(500);
    store.save("bench", &records).unwrap();

    c.bench_function("file_save_500", |b| {
        b.iter(|| store.save("bench", black_box(&records)).unwrap())
    });
    c.bench_function("file_load_500", |b| {
        b.iter(|| black_box(store.load::<Activity>("bench").unwrap()))
    });
    c.bench_function("file_append_one", |b| {
        b.iter_batched(
            || {
                store.save("bench", &records).unwrap();
                activities(1).remove(0)
            },
            |activity| {
                let mut current: Vec<Activity> = store.load("bench").unwrap();
                current.insert(0, activity);
                store.save("bench", &current).unwrap();
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_memory, bench_file);
criterion_main!(benches);
