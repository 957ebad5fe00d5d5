//! # Tofu Open-Y Rank Map Explorer
//!
//! Maps one rank of a simulated open-Y job and prints its logical placement,
//! neighbours and TNI selection.
//!
//! ## Usage
//!
//! ```bash
//! # Rank 0 of a job with Y=4 and Z=3x4
//! cargo run --bin tofu-rankmap -- --y-extent 4 --depth 4
//!
//! # Another rank, with a configuration file
//! cargo run --bin tofu-rankmap -- --rank 1234 --config rankmap.json
//!
//! # Print the default configuration
//! cargo run --bin tofu-rankmap -- --dump-config
//! ```

use clap::Parser;
use tofu_rankmap::{Direction, LogicalAxis, RankMapConfig, SimulatedJob};

/// Tofu open-Y rank map explorer
#[derive(Parser, Debug)]
#[command(name = "tofu-rankmap")]
#[command(about = "Map a rank of a simulated open-Y Tofu job onto the logical 4D torus")]
struct Args {
    /// Physical Y extent of the job (open axis)
    #[arg(long, short = 'y', default_value = "2")]
    y_extent: usize,

    /// Open Z depth; the physical Z extent is three times this
    #[arg(long, short = 'd', default_value = "2")]
    depth: usize,

    /// Rank to map
    #[arg(long, short = 'r', default_value = "0")]
    rank: usize,

    /// JSON configuration file
    #[arg(long, short = 'c')]
    config: Option<String>,

    /// Print the effective configuration and exit
    #[arg(long)]
    dump_config: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match args.config {
        Some(ref path) => RankMapConfig::from_json_file(path)?,
        None => RankMapConfig::default(),
    };
    if args.dump_config {
        println!("{}", config.to_json_string()?);
        return Ok(());
    }

    let job = SimulatedJob::new(args.y_extent, args.depth, &config)?;
    println!(
        "Simulated job: {} nodes, {} ranks, T extent {}",
        job.num_nodes(),
        job.num_ranks(),
        job.t_extent()
    );

    let map = job.map_rank(args.rank, &config)?;
    let placement = &map.placement;

    println!("\nRank {} (status {})", args.rank, map.status());
    if let Some(coords) = job.coords_of(args.rank) {
        println!("  physical: {}", coords);
    }
    for axis in LogicalAxis::all() {
        println!(
            "  Q{}: {:>2} / {}",
            axis,
            placement.coord(axis),
            placement.size(axis)
        );
    }

    println!("\nNeighbours:");
    for dir in Direction::all() {
        let n = placement.neighbor(dir);
        println!(
            "  {}  tni={}  coords={}  rank_in_node={}",
            dir,
            map.tni_list.get(dir),
            n.coords,
            n.rank_in_node
        );
    }

    println!("\ntni list: {:?}", map.tni_list.ids());
    Ok(())
}
