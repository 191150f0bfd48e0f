//! # Luma
//!
//! Lights a small walled room, streams the change batches to a renderer thread and prints one
//! horizontal slice of the resulting light field.

use std::{env, path::PathBuf, process::ExitCode, sync::Arc, thread};

use crossbeam::channel::unbounded;
use luma_core::{
    LightConfig, LightWorld, Occupant, SectionBlocks, SectionLightUpdate, WorldError,
};
use luma_utils::{BlockPos, ChunkPos, locks::SyncRwLock, logger};

const DEFAULT_CONFIG_PATH: &str = "config/luma_config.json5";
const RADIUS: i32 = 1;

fn main() -> ExitCode {
    if let Err(err) = logger::init("info") {
        eprintln!("Failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    let path = env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = match LightConfig::load_or_create(&path) {
        Ok(config) => config,
        Err(err) => {
            log::error!("Failed to load {}: {err}", path.display());
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "Starting luma with sections {}..={}, sky light {}",
        config.min_section,
        config.max_section,
        config.sky_light
    );

    let world = match LightWorld::new(&config) {
        Ok(world) => Arc::new(SyncRwLock::new(world)),
        Err(err) => {
            log::error!("Invalid config {}: {err}", path.display());
            return ExitCode::FAILURE;
        }
    };
    let (tx, rx) = unbounded::<Vec<SectionLightUpdate>>();
    world.write().add_listener(tx);

    let renderer = thread::spawn(move || {
        let mut batches = 0usize;
        let mut sections = 0usize;
        for batch in rx {
            batches += 1;
            sections += batch.len();
            for update in &batch {
                log::debug!(
                    "Section {} @ {} changed{}",
                    update.chunk,
                    update.section_height,
                    if update.origin { " (origin)" } else { "" }
                );
            }
        }
        (batches, sections)
    });

    let floor = match build_scene(&world) {
        Ok(floor) => floor,
        Err(err) => {
            log::error!("Failed to build the scene: {err}");
            return ExitCode::FAILURE;
        }
    };
    print_slice(&world.read(), floor + 1);

    // Dropping the last handle drops the listener, which ends the renderer loop.
    drop(world);
    match renderer.join() {
        Ok((batches, sections)) => {
            log::info!("Renderer received {batches} batches covering {sections} sections");
            ExitCode::SUCCESS
        }
        Err(_) => {
            log::error!("Renderer thread panicked");
            ExitCode::FAILURE
        }
    }
}

/// Loads a 3x3 grid with a stone floor in the lowest section, then builds a roofed room with a
/// doorway and a torch inside. Returns the y of the floor surface.
fn build_scene(world: &SyncRwLock<LightWorld>) -> Result<i32, WorldError> {
    let mut world = world.write();
    let dimension = world.dimension();
    let floor = dimension.min_y() + 15;

    for x in -RADIUS..=RADIUS {
        for z in -RADIUS..=RADIUS {
            let blocks = (dimension.min_section..=dimension.max_section)
                .map(|height| {
                    if height == dimension.min_section {
                        SectionBlocks::filled(Occupant::opaque())
                    } else {
                        SectionBlocks::empty()
                    }
                })
                .collect();
            world.load_chunk(ChunkPos::new(x, z), blocks)?;
        }
    }

    let roof = floor + 5;
    for x in 3..=12 {
        for z in 3..=12 {
            world.set_block(BlockPos::new(x, roof, z), Occupant::opaque())?;
            let edge = x == 3 || x == 12 || z == 3 || z == 12;
            let doorway = x == 7 && z == 12;
            if edge && !doorway {
                for y in floor + 1..roof {
                    world.set_block(BlockPos::new(x, y, z), Occupant::opaque())?;
                }
            }
        }
    }
    world.set_block(BlockPos::new(6, floor + 1, 6), Occupant::light_source(14))?;
    Ok(floor)
}

fn print_slice(world: &LightWorld, y: i32) {
    println!("block light at y = {y}");
    print_grid(|x, z| world.get_light(BlockPos::new(x, y, z)).block());
    println!("sky light at y = {y}");
    print_grid(|x, z| world.get_light(BlockPos::new(x, y, z)).sky());
}

fn print_grid(level: impl Fn(i32, i32) -> u8) {
    for z in 0..16 {
        let row: String = (0..16)
            .map(|x| char::from_digit(u32::from(level(x, z)), 16).unwrap_or('?'))
            .collect();
        println!("  {row}");
    }
}
