use heapstore::{create_policy, HeapFile, LruPolicy, Record, RecordResult, SLOT_COUNT};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use simplelog::{Config, LevelFilter, SimpleLogger};
use std::path::{Path, PathBuf};

fn main() {
    SimpleLogger::init(LevelFilter::Info, Config::default()).expect("logger init");

    let data_dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./data".to_string());
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        eprintln!("Failed to create data directory {}: {}", data_dir, e);
        std::process::exit(1);
    }

    let dir = PathBuf::from(&data_dir);
    if let Err(e) = run_buffer_demo(&dir) {
        eprintln!("Buffer demo failed: {}", e);
        std::process::exit(1);
    }
    if let Err(e) = run_policy_comparison(&dir) {
        eprintln!("Policy comparison failed: {}", e);
        std::process::exit(1);
    }
}

/// Walk through insertion, searching, eviction and dirty-page write-back on
/// a tiny pool, printing the counters at each step.
fn run_buffer_demo(dir: &Path) -> RecordResult<()> {
    let data_path = dir.join("buffer_demo.dat");
    let directory_path = dir.join("buffer_demo.pd");
    remove_stale(&data_path);
    remove_stale(&directory_path);

    println!("=== Buffer manager demo (LRU, pool size 2) ===");
    let mut heap = HeapFile::new(&data_path, &directory_path, 2, Box::new(LruPolicy::new()))?;

    // Two pages worth of records.
    for key in 1..=(2 * SLOT_COUNT as i32) {
        heap.insert_record(&Record::new(key, format!("record-{}", key))?)?;
    }
    println!("Heap contents after inserting 32 records:");
    heap.print_all_pages()?;

    heap.reset_hit_miss_counters();
    for key in [1, 17] {
        match heap.search_record(key)? {
            Some(record) => println!("Found key {}: {}", key, record.payload()),
            None => println!("Key {} not found", key),
        }
        println!("  hits: {}, misses: {}", heap.hit_count(), heap.miss_count());
    }

    println!("Inserting key 33 (allocates a third page, evicts one)");
    heap.insert_record(&Record::new(33, "record-33")?)?;
    println!(
        "  hits: {}, misses: {}, pool size: {}",
        heap.hit_count(),
        heap.miss_count(),
        heap.current_pool_size()
    );

    heap.search_record(1)?;
    println!(
        "After searching the evicted page again: hits: {}, misses: {}",
        heap.hit_count(),
        heap.miss_count()
    );

    // Deletions reach disk through eviction or an explicit flush.
    for key in 8..=16 {
        heap.delete_record(key)?;
    }
    heap.flush_all()?;
    drop(heap);

    let mut heap = HeapFile::new(&data_path, &directory_path, 2, Box::new(LruPolicy::new()))?;
    println!("Heap contents after deleting keys 8..=16 and reopening:");
    heap.print_all_pages()?;
    println!();
    Ok(())
}

/// Compare hit ratios of the three policies on a hot-key loop and on a
/// skewed workload.
fn run_policy_comparison(dir: &Path) -> RecordResult<()> {
    let data_path = dir.join("policy_demo.dat");
    let directory_path = dir.join("policy_demo.pd");
    remove_stale(&data_path);
    remove_stale(&directory_path);

    let pool_size = 16;
    {
        let mut heap =
            HeapFile::new(&data_path, &directory_path, pool_size, Box::new(LruPolicy::new()))?;
        for key in 1..=1152 {
            heap.insert_record(&Record::new(key, format!("record-{}", key))?)?;
        }
        heap.flush_all()?;
    }

    println!("=== Task 1: repeated hot-key lookups (LRU vs MRU) ===");
    for name in ["LRU", "MRU"] {
        let policy = create_policy(name, pool_size).expect("known policy");
        let mut heap = HeapFile::new(&data_path, &directory_path, pool_size, policy)?;
        heap.search_record(512)?;
        heap.reset_hit_miss_counters();
        for _ in 0..100 {
            heap.search_record(256)?;
        }
        print_stats(&heap);
    }
    println!();

    println!("=== Task 2: skewed workload (80% hot over 128 keys) ===");
    for name in ["LRU", "MRU", "CLOCK"] {
        let policy = create_policy(name, pool_size).expect("known policy");
        let mut heap = HeapFile::new(&data_path, &directory_path, pool_size, policy)?;
        heap.reset_hit_miss_counters();

        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..1000 {
            let key = if rng.gen::<f64>() < 0.8 {
                1 + rng.gen_range(0..128)
            } else {
                129 + rng.gen_range(0..1024)
            };
            heap.search_record_with_hash(key)?;
        }
        print_stats(&heap);
    }
    Ok(())
}

fn print_stats(heap: &HeapFile) {
    println!(
        "- {} hits: {}, misses: {}, hit ratio: {:.2}",
        heap.replacement_policy_name(),
        heap.hit_count(),
        heap.miss_count(),
        heap.hit_ratio()
    );
}

fn remove_stale(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            log::warn!("Failed to remove stale file {}: {}", path.display(), e);
        }
    }
}
