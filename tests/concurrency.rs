use std::collections::HashMap;
use std::sync::{Arc, Barrier};
use std::thread;
use tag_registry::TagStore;

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "tag_registry_test_{}_{}.json",
        name,
        std::process::id()
    ))
}

const THREADS: i64 = 8;
const PER_THREAD: i64 = 200;

#[test]
fn concurrent_distinct_keys_visible_on_return() {
    let path = temp_path("conc_distinct");
    let _ = std::fs::remove_file(&path);
    let store = Arc::new(TagStore::open(&path).unwrap());
    let barrier = Arc::new(Barrier::new(THREADS as usize));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..PER_THREAD {
                    let id = t * PER_THREAD + i;
                    let tag = format!("t{t}-{i}");
                    store.set(id, tag.clone());
                    assert_eq!(store.get(id), tag);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(store.len(), (THREADS * PER_THREAD) as usize);
    let store = Arc::try_unwrap(store).unwrap();
    drop(store);

    let reloaded = TagStore::open(&path).unwrap();
    assert_eq!(reloaded.len(), (THREADS * PER_THREAD) as usize);
    for t in 0..THREADS {
        for i in 0..PER_THREAD {
            assert_eq!(reloaded.get(t * PER_THREAD + i), format!("t{t}-{i}"));
        }
    }
    drop(reloaded);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn file_converges_to_final_memory_state() {
    let path = temp_path("conc_same_keys");
    let _ = std::fs::remove_file(&path);
    let store = Arc::new(TagStore::open(&path).unwrap());

    // every thread hammers the same small key space
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    store.set(i % 16, format!("t{t}-{i}"));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let final_state = store.entries();
    let store = Arc::try_unwrap(store).unwrap();
    drop(store);

    let raw = std::fs::read(&path).unwrap();
    let on_disk: HashMap<i64, String> = serde_json::from_slice(&raw).unwrap();
    assert_eq!(on_disk, final_state);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn readers_never_see_torn_file_while_writers_run() {
    let path = temp_path("conc_readers");
    let _ = std::fs::remove_file(&path);
    let store = Arc::new(TagStore::open(&path).unwrap());
    store.set(0, "seed");
    store.flush().unwrap();

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 0..500 {
                store.set(i, format!("tag-{i}"));
            }
        })
    };

    // whatever is on disk at any instant must parse as a full map
    for _ in 0..200 {
        let raw = std::fs::read(&path).unwrap();
        let parsed: HashMap<i64, String> = serde_json::from_slice(&raw).unwrap();
        assert!(parsed.contains_key(&0));
    }
    writer.join().unwrap();

    let store = Arc::try_unwrap(store).unwrap();
    drop(store);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn flush_and_background_passes_serialize() {
    let path = temp_path("conc_flush");
    let _ = std::fs::remove_file(&path);
    let store = Arc::new(TagStore::open(&path).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..50 {
                    store.set(t * 50 + i, "x");
                    if i % 10 == 0 {
                        store.flush().unwrap();
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    store.flush().unwrap();

    let raw = std::fs::read(&path).unwrap();
    let on_disk: HashMap<i64, String> = serde_json::from_slice(&raw).unwrap();
    assert_eq!(on_disk.len(), 200);

    let store = Arc::try_unwrap(store).unwrap();
    drop(store);
    let _ = std::fs::remove_file(&path);
}
