use clap::Parser;
use phimap::IntMap;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    #[arg(short = 'f', long = "fill_factor", default_value_t = phimap::DEFAULT_FILL_FACTOR)]
    fill_factor: f64,

    /// Use random keys instead of 1..=n.
    #[arg(short = 'r', long = "random")]
    random: bool,

    /// Remove every other key after filling, to show the effect of
    /// backward-shift deletion on probe lengths.
    #[arg(short = 'd', long = "delete_half")]
    delete_half: bool,
}

fn main() -> Result<(), phimap::Error> {
    let args = Args::parse();

    println!(
        "Creating IntMap with target capacity {} and fill factor {}",
        args.target_capacity, args.fill_factor
    );

    let mut map = IntMap::new(args.target_capacity, args.fill_factor)?;

    println!("Slots: {}, threshold: {}", map.capacity(), map.threshold());
    println!("Filling map up to its threshold...");

    let mut rng = SmallRng::seed_from_u64(0);
    let keys = (1..=map.threshold() as u64)
        .map(|k| if args.random { rng.random::<u64>() | 1 } else { k })
        .collect::<Vec<u64>>();
    for &key in &keys {
        map.insert(key, key)?;
    }

    println!("Inserted {} values into map", map.len());
    println!(
        "Final load factor: {:.2}%",
        (map.len() as f64 / map.capacity() as f64) * 100.0
    );

    map.print_probe_histogram();
    map.debug_stats().print();

    if args.delete_half {
        for &key in keys.iter().step_by(2) {
            map.remove(key);
        }
        println!("Removed every other key, {} remain", map.len());
        map.print_probe_histogram();
        map.debug_stats().print();
    }

    Ok(())
}
