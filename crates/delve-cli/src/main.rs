//! Command-line front end for the level generator.
//!
//! Generates one or more levels headlessly, prints per-pass statistics,
//! and can render the result as an ASCII map or dump stats as JSON.

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use delve_core::{GenConfig, GenerationStats, Generator, RecordingMaterializer, RoomTemplate};

#[derive(Parser)]
#[command(name = "delve", version, about = "Seeded room-and-corridor level generator")]
struct Args {
    /// JSON configuration file; omitted, a built-in catalog is used
    config: Option<PathBuf>,

    /// Seed for the first pass; 0 draws a random seed
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Number of consecutive levels to generate
    #[arg(long, default_value_t = 1)]
    sweep: u32,

    /// Print each level as an ASCII map
    #[arg(long)]
    map: bool,

    /// Emit per-pass stats as JSON lines instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let cfg = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            serde_json::from_str(&text)
                .map_err(|e| format!("cannot parse {}: {e}", path.display()))?
        }
        None => built_in_config(),
    };
    log::debug!(
        "catalog has {} templates on a {}x{} board",
        cfg.catalog.len(),
        cfg.board_size,
        cfg.board_size
    );

    let mut generator = Generator::new(cfg, RecordingMaterializer::new());
    let mut all_stats = Vec::new();

    for pass in 0..args.sweep.max(1) {
        let stats = if pass == 0 && args.seed != 0 {
            generator.generate(args.seed)?
        } else {
            generator.generate_new()?
        };
        if args.json {
            println!("{}", serde_json::to_string(stats)?);
        } else {
            println!("{stats}");
        }
        all_stats.push(stats.clone());
        if args.map {
            print!("{}", generator.render_map());
        }
    }

    if all_stats.len() > 1 && !args.json {
        print_averages(&all_stats);
    }
    Ok(())
}

/// Default catalog: a spread of room shapes plus one guaranteed
/// entrance routed to a board edge.
fn built_in_config() -> GenConfig {
    let mut entrance = RoomTemplate::new("entrance", 4, 4);
    entrance.guaranteed_spawn = true;
    entrance.connect_to_edge = true;

    let mut hall = RoomTemplate::new("hall", 7, 5);
    hall.weight = 2;
    let mut chamber = RoomTemplate::new("chamber", 5, 5);
    chamber.weight = 3;
    let mut closet = RoomTemplate::new("closet", 2, 2);
    closet.single_connection_only = true;

    GenConfig {
        catalog: vec![entrance, hall, chamber, closet],
        ..GenConfig::default()
    }
}

fn print_averages(all: &[GenerationStats]) {
    let n = all.len() as f64;
    let rooms: f64 = all.iter().map(|s| s.rooms_placed as f64).sum::<f64>() / n;
    let corridors: f64 = all.iter().map(|s| s.corridor_tiles as f64).sum::<f64>() / n;
    let markers: f64 = all.iter().map(|s| s.markers_placed as f64).sum::<f64>() / n;
    let relaxed: f64 = all.iter().map(|s| s.relaxed_connections as f64).sum::<f64>() / n;
    let time: Duration = all.iter().map(|s| s.generation_time).sum::<Duration>() / all.len() as u32;
    println!(
        "average over {} passes: {rooms:.1} rooms, {corridors:.1} corridor tiles, \
         {markers:.1} markers, {relaxed:.2} relaxed links, {time:.2?}",
        all.len()
    );
}
