use std::time::Instant;

use clap::Parser;
use rand::rngs::OsRng;
use rand::TryRngCore;
use swiss_set::U64SwissSet;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'n', long = "max_size", default_value_t = 1_000_000)]
    max_size: usize,

    #[arg(short = 'l', long = "load_factor", default_value_t = 0.875)]
    load_factor: f64,
}

fn main() {
    let args = Args::parse();

    let mut set = U64SwissSet::with_load_factor(args.max_size, args.load_factor)
        .expect("invalid arguments");

    println!(
        "Created set: max_size={}, capacity={}, load_factor={}",
        set.max_size(),
        set.capacity(),
        args.load_factor
    );

    let mut rng = OsRng;
    let mut values = Vec::with_capacity(args.max_size);
    while values.len() < args.max_size {
        values.push(rng.try_next_u64().unwrap());
    }

    let start = Instant::now();
    let mut inserted = 0usize;
    for &value in &values {
        if set.insert(value).expect("set reported full") {
            inserted += 1;
        }
    }
    let insert_time = start.elapsed();

    println!(
        "Inserted {} values ({} duplicates) in {:?} ({:.0} ns/insert)",
        inserted,
        values.len() - inserted,
        insert_time,
        insert_time.as_nanos() as f64 / values.len() as f64
    );
    println!(
        "Fill: {}/{} slots ({:.2}%)",
        set.len(),
        set.capacity(),
        set.len() as f64 / set.capacity() as f64 * 100.0
    );

    let start = Instant::now();
    let mut hits = 0usize;
    for &value in &values {
        if set.contains(value) {
            hits += 1;
        }
    }
    let hit_time = start.elapsed();
    println!(
        "Probed {} present values in {:?} ({:.0} ns/probe, {} hits)",
        values.len(),
        hit_time,
        hit_time.as_nanos() as f64 / values.len() as f64,
        hits
    );

    let start = Instant::now();
    let mut misses = 0usize;
    for i in 0..values.len() {
        if !set.contains(i as u64 ^ 0xDEAD_BEEF_0000_0000) {
            misses += 1;
        }
    }
    let miss_time = start.elapsed();
    println!(
        "Probed {} mostly-absent values in {:?} ({:.0} ns/probe, {} misses)",
        values.len(),
        miss_time,
        miss_time.as_nanos() as f64 / values.len() as f64,
        misses
    );
}
