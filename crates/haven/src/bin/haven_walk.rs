//! # HAVEN Walk
//!
//! Headless demo. Walks an observer around a loop of chunks and reports what
//! the streaming manager and its pools did along the way.
//!
//! ```bash
//! # Default world
//! ./haven_walk
//!
//! # Custom world, with per-chunk logging
//! RUST_LOG=haven=debug ./haven_walk haven.toml
//! ```

use std::env;
use std::process::ExitCode;

use haven::shared::WorldPosition;
use haven::{PositionFeed, StreamingManager, WorldConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Loop corners, in chunks.
const WAYPOINTS: [(f64, f64); 5] = [(0.5, 0.5), (4.5, 0.5), (4.5, 3.5), (-2.5, 3.5), (0.5, 0.5)];

/// Positions published per chunk travelled.
const STEPS_PER_CHUNK: u32 = 8;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match env::args_os().nth(1) {
        Some(path) => match WorldConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                error!(%err, "cannot load world config");
                return ExitCode::FAILURE;
            }
        },
        None => WorldConfig::default(),
    };
    info!(seed = %config.seed, generation = ?config.generation, "world config loaded");

    let mut manager = StreamingManager::from_config(&config);
    let feed = PositionFeed::new();
    let subscription = manager.attach_feed(&feed);

    let chunk = f64::from(config.constants.chunk_pixel_size());
    let mut published = 0_u32;
    let mut recomputes = 0_usize;

    for pair in WAYPOINTS.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        let steps = ((x1 - x0).abs().max((y1 - y0).abs()) * f64::from(STEPS_PER_CHUNK)).ceil() as u32;
        for step in 0..=steps {
            let t = f64::from(step) / f64::from(steps.max(1));
            feed.publish(WorldPosition::new(
                (x0 + (x1 - x0) * t) * chunk,
                (y0 + (y1 - y0) * t) * chunk,
            ));
            published += 1;
            recomputes += manager.pump().iter().filter(|u| u.recomputed).count();
        }
    }

    subscription.unsubscribe();

    let stats = manager.stats();
    let textures = manager.texture_pool().stats();
    let allocator = manager.texture_pool().factory();
    let sprites = manager.builder().sprites().stats();
    let store = manager.store().stats();

    println!("═══════════════════════════════════════════════════════════════════");
    println!("                       HAVEN WALK REPORT");
    println!("═══════════════════════════════════════════════════════════════════");
    println!();
    println!("  Positions:    {published} published, {recomputes} window recomputes");
    println!("  Resident:     {} chunks", manager.registry().len());
    println!(
        "  Streaming:    {} loaded, {} unloaded, {} failures, {} fallbacks",
        stats.loaded, stats.unloaded, stats.failures, stats.fallbacks
    );
    println!(
        "  Store:        {} chunks generated, {} attached objects",
        store.chunk_count, store.total_attached_objects
    );
    println!(
        "  Textures:     {} created, {} reused, {} evicted, {} freed, {} live",
        textures.created,
        textures.reused,
        textures.evicted,
        allocator.freed(),
        allocator.live()
    );
    println!(
        "  Sprites:      {} created, {} reused",
        sprites.created, sprites.reused
    );

    manager.shutdown();
    let borrowed = manager.texture_pool().borrowed_count();
    let idle = manager.texture_pool().factory().live();
    println!("  Shutdown:     {borrowed} textures still borrowed, {idle} kept idle");
    println!();

    if borrowed == 0 {
        ExitCode::SUCCESS
    } else {
        error!(borrowed, "textures leaked past shutdown");
        ExitCode::FAILURE
    }
}
