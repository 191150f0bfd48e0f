#![allow(clippy::unwrap_used)]

use crossbeam::channel::{Receiver, unbounded};
use luma_utils::{BlockPos, ChunkPos, InSectionPos};

use super::*;

fn config(min_section: i32, max_section: i32, sky_light: bool) -> LightConfig {
    LightConfig {
        min_section,
        max_section,
        sky_light,
        queue_capacity: 64,
    }
}

fn air(world: &LightWorld) -> Vec<SectionBlocks> {
    vec![SectionBlocks::empty(); world.dimension().section_count()]
}

fn world_with_chunks(config: &LightConfig, radius: i32) -> LightWorld {
    let mut world = LightWorld::new(config).unwrap();
    for x in -radius..=radius {
        for z in -radius..=radius {
            let blocks = air(&world);
            world.load_chunk(ChunkPos::new(x, z), blocks).unwrap();
        }
    }
    world
}

fn listen(world: &mut LightWorld) -> Receiver<Vec<SectionLightUpdate>> {
    let (tx, rx) = unbounded();
    world.add_listener(tx);
    rx
}

fn block(world: &LightWorld, x: i32, y: i32, z: i32) -> u8 {
    world.get_light(BlockPos::new(x, y, z)).block()
}

fn sky(world: &LightWorld, x: i32, y: i32, z: i32) -> u8 {
    world.get_light(BlockPos::new(x, y, z)).sky()
}

/// Every light byte of a chunk, planes included.
fn light_field(world: &LightWorld, chunk: ChunkPos) -> Vec<LightLevel> {
    let dimension = world.dimension();
    let mut field = Vec::new();
    for y in dimension.min_y() - 1..=dimension.max_y() + 1 {
        for z in 0..16 {
            for x in 0..16 {
                let pos = BlockPos::new(chunk.min_block_x() + x, y, chunk.min_block_z() + z);
                field.push(world.get_light(pos));
            }
        }
    }
    field
}

#[test]
fn test_torch_falls_off_with_manhattan_distance() {
    let mut world = world_with_chunks(&config(0, 0, false), 0);
    let previous = world
        .set_block(BlockPos::new(0, 0, 0), Occupant::light_source(14))
        .unwrap();
    assert_eq!(previous, Occupant::AIR);

    assert_eq!(block(&world, 0, 0, 0), 14);
    assert_eq!(block(&world, 1, 0, 0), 13);
    assert_eq!(block(&world, 0, 1, 0), 13);
    assert_eq!(block(&world, 0, 0, 1), 13);
    assert_eq!(block(&world, 13, 0, 0), 1);
    assert_eq!(block(&world, 5, 5, 3), 1);
    assert_eq!(block(&world, 14, 0, 0), 0);
    assert_eq!(block(&world, 5, 5, 4), 0);
    assert_eq!(block(&world, 15, 15, 15), 0);
    // Leaks into the plane below the section stack.
    assert_eq!(block(&world, 0, -1, 0), 13);
    assert_eq!(block(&world, 2, -1, 0), 11);
}

#[test]
fn test_removing_the_only_source_darkens_everything() {
    let mut world = world_with_chunks(&config(0, 0, false), 0);
    let pos = BlockPos::new(0, 0, 0);
    world.set_block(pos, Occupant::light_source(14)).unwrap();
    world.set_block(pos, Occupant::AIR).unwrap();

    assert!(
        light_field(&world, ChunkPos::new(0, 0))
            .iter()
            .all(|level| level.block() == 0)
    );
}

#[test]
fn test_place_then_remove_restores_previous_field() {
    let mut world = world_with_chunks(&config(0, 0, false), 0);
    world
        .set_block(BlockPos::new(3, 3, 3), Occupant::light_source(14))
        .unwrap();
    world
        .set_block(BlockPos::new(10, 8, 12), Occupant::light_source(12))
        .unwrap();
    let before = light_field(&world, ChunkPos::new(0, 0));

    world
        .set_block(BlockPos::new(6, 5, 7), Occupant::light_source(15))
        .unwrap();
    world.set_block(BlockPos::new(4, 3, 3), Occupant::opaque()).unwrap();
    world.set_block(BlockPos::new(9, 8, 12), Occupant::opaque()).unwrap();
    assert_ne!(light_field(&world, ChunkPos::new(0, 0)), before);

    world.set_block(BlockPos::new(9, 8, 12), Occupant::AIR).unwrap();
    world.set_block(BlockPos::new(4, 3, 3), Occupant::AIR).unwrap();
    world.set_block(BlockPos::new(6, 5, 7), Occupant::AIR).unwrap();
    assert_eq!(light_field(&world, ChunkPos::new(0, 0)), before);
}

#[test]
fn test_opaque_block_routes_light_around_it() {
    let mut world = world_with_chunks(&config(0, 0, false), 0);
    world
        .set_block(BlockPos::new(8, 8, 8), Occupant::light_source(14))
        .unwrap();
    assert_eq!(block(&world, 8, 8, 10), 12);

    world.set_block(BlockPos::new(8, 8, 9), Occupant::opaque()).unwrap();
    assert_eq!(block(&world, 8, 8, 9), 0);
    assert_eq!(block(&world, 8, 8, 10), 10);

    // Same occupants loaded at once.
    let mut fresh = LightWorld::new(&config(0, 0, false)).unwrap();
    let mut blocks = SectionBlocks::empty();
    blocks.set(InSectionPos::new(8, 8, 8), Occupant::light_source(14));
    blocks.set(InSectionPos::new(8, 8, 9), Occupant::opaque());
    fresh.load_chunk(ChunkPos::new(0, 0), vec![blocks]).unwrap();

    assert_eq!(
        light_field(&world, ChunkPos::new(0, 0)),
        light_field(&fresh, ChunkPos::new(0, 0))
    );
}

#[test]
fn test_overlapping_sources_take_the_maximum() {
    let mut world = world_with_chunks(&config(0, 0, false), 0);
    world
        .set_block(BlockPos::new(8, 8, 7), Occupant::light_source(10))
        .unwrap();
    world
        .set_block(BlockPos::new(8, 8, 9), Occupant::light_source(12))
        .unwrap();
    assert_eq!(block(&world, 8, 8, 8), 11);

    world.set_block(BlockPos::new(8, 8, 9), Occupant::AIR).unwrap();
    assert_eq!(block(&world, 8, 8, 8), 9);
}

#[test]
fn test_dimmer_source_does_not_override_brighter_light() {
    let mut world = world_with_chunks(&config(0, 0, false), 0);
    world
        .set_block(BlockPos::new(8, 8, 8), Occupant::light_source(14))
        .unwrap();
    world
        .set_block(BlockPos::new(8, 8, 10), Occupant::light_source(5))
        .unwrap();
    assert_eq!(block(&world, 8, 8, 10), 12);

    world.set_block(BlockPos::new(8, 8, 8), Occupant::AIR).unwrap();
    assert_eq!(block(&world, 8, 8, 10), 5);
    assert_eq!(block(&world, 8, 8, 8), 3);
}

#[test]
fn test_open_sky_is_composited_and_never_stored() {
    let mut world = world_with_chunks(&config(0, 1, true), 0);
    assert_eq!(sky(&world, 5, 10, 5), 15);
    assert_eq!(sky(&world, 5, -1, 5), 15);
    assert_eq!(sky(&world, 5, 100, 5), 15);
    assert_eq!(sky(&world, 5, -30, 5), 15);

    world.set_block(BlockPos::new(5, 20, 5), Occupant::opaque()).unwrap();
    assert_eq!(sky(&world, 5, 21, 5), 15);
    assert_eq!(sky(&world, 5, 20, 5), 0);
    assert_eq!(sky(&world, 5, 19, 5), 14);
    assert_eq!(sky(&world, 5, 10, 5), 14);
    assert_eq!(sky(&world, 5, -1, 5), 14);

    world.set_block(BlockPos::new(5, 20, 5), Occupant::AIR).unwrap();
    assert_eq!(sky(&world, 5, 10, 5), 15);
    let key = SectionKey {
        chunk: ChunkPos::new(0, 0),
        height: 0,
    };
    let section = world.chunks().section(key).unwrap();
    assert!(section.light.array().is_dark());
}

#[test]
fn test_hole_in_roof_lets_sky_in_and_closing_it_removes_it() {
    let mut world = LightWorld::new(&config(0, 1, true)).unwrap();
    let mut roof = SectionBlocks::empty();
    for x in 0..16 {
        for z in 0..16 {
            roof.set(InSectionPos::new(x, 4, z), Occupant::opaque());
        }
    }
    world
        .load_chunk(ChunkPos::new(0, 0), vec![SectionBlocks::empty(), roof])
        .unwrap();
    assert_eq!(sky(&world, 8, 21, 8), 15);
    assert_eq!(sky(&world, 8, 5, 8), 0);

    world.set_block(BlockPos::new(8, 20, 8), Occupant::AIR).unwrap();
    assert_eq!(sky(&world, 8, 20, 8), 15);
    assert_eq!(sky(&world, 8, 5, 8), 15);
    assert_eq!(sky(&world, 9, 5, 8), 14);
    assert_eq!(sky(&world, 10, 5, 8), 13);
    assert_eq!(sky(&world, 9, 19, 8), 14);
    assert_eq!(sky(&world, 8, -1, 8), 15);
    assert_eq!(sky(&world, 9, -1, 8), 14);

    world.set_block(BlockPos::new(8, 20, 8), Occupant::opaque()).unwrap();
    assert_eq!(sky(&world, 8, 5, 8), 0);
    assert_eq!(sky(&world, 10, 5, 8), 0);
    assert_eq!(sky(&world, 8, -1, 8), 0);
    assert_eq!(sky(&world, 8, 21, 8), 15);
}

#[test]
fn test_light_crosses_into_chunk_loaded_later() {
    let mut world = world_with_chunks(&config(0, 0, false), 0);
    world
        .set_block(BlockPos::new(15, 8, 8), Occupant::light_source(14))
        .unwrap();
    assert_eq!(block(&world, 16, 8, 8), 0);

    let blocks = air(&world);
    world.load_chunk(ChunkPos::new(1, 0), blocks).unwrap();
    assert_eq!(block(&world, 16, 8, 8), 13);
    assert_eq!(block(&world, 17, 8, 8), 12);

    // And back out of it once the source moves across the edge.
    world.set_block(BlockPos::new(15, 8, 8), Occupant::AIR).unwrap();
    world
        .set_block(BlockPos::new(16, 8, 8), Occupant::light_source(14))
        .unwrap();
    assert_eq!(block(&world, 15, 8, 8), 13);
    assert_eq!(block(&world, 14, 8, 8), 12);
}

#[test]
fn test_unload_keeps_the_remaining_chunk_intact() {
    let mut world = world_with_chunks(&config(0, 0, false), 0);
    let blocks = air(&world);
    world.load_chunk(ChunkPos::new(1, 0), blocks).unwrap();
    world
        .set_block(BlockPos::new(15, 8, 8), Occupant::light_source(14))
        .unwrap();
    assert_eq!(block(&world, 16, 8, 8), 13);

    world.unload_chunk(ChunkPos::new(1, 0)).unwrap();
    assert_eq!(block(&world, 16, 8, 8), 0);
    assert_eq!(block(&world, 15, 8, 8), 14);
    assert_eq!(block(&world, 12, 8, 8), 11);
    assert!(!world.chunks().contains(ChunkPos::new(1, 0)));
}

#[test]
fn test_new_rejects_inverted_section_range() {
    let inverted = config(3, 1, true);
    assert!(matches!(
        LightWorld::new(&inverted),
        Err(ConfigError::Invalid(_))
    ));
    let empty_queue = LightConfig {
        queue_capacity: 0,
        ..config(0, 0, false)
    };
    assert!(LightWorld::new(&empty_queue).is_err());
}

#[test]
fn test_facade_errors() {
    let mut world = world_with_chunks(&config(0, 1, true), 0);
    let blocks = air(&world);
    assert_eq!(
        world.load_chunk(ChunkPos::new(0, 0), blocks),
        Err(WorldError::ChunkAlreadyLoaded(ChunkPos::new(0, 0)))
    );
    assert_eq!(
        world.load_chunk(ChunkPos::new(3, 3), vec![SectionBlocks::empty()]),
        Err(WorldError::SectionCount {
            expected: 2,
            actual: 1
        })
    );
    assert_eq!(
        world.set_block(BlockPos::new(40, 0, 0), Occupant::opaque()),
        Err(WorldError::ChunkNotLoaded(ChunkPos::new(2, 0)))
    );
    assert_eq!(
        world.set_block(BlockPos::new(0, 32, 0), Occupant::opaque()),
        Err(WorldError::OutOfRange { y: 32 })
    );
    assert_eq!(
        world.unload_chunk(ChunkPos::new(5, 5)),
        Err(WorldError::ChunkNotLoaded(ChunkPos::new(5, 5)))
    );
    assert_eq!(
        world.replace_section(ChunkPos::new(0, 0), 2, SectionBlocks::empty()),
        Err(WorldError::OutOfRange { y: 32 })
    );
    assert_eq!(world.occupant(BlockPos::new(40, 0, 0)), None);
    assert_eq!(world.get_light(BlockPos::new(40, 0, 0)), LightLevel::DARK);
}

#[test]
fn test_notifications_wait_for_a_complete_neighbourhood() {
    let config = config(0, 0, false);
    let mut world = LightWorld::new(&config).unwrap();
    let rx = listen(&mut world);

    for x in -1..=1 {
        for z in -1..=1 {
            let blocks = air(&world);
            world.load_chunk(ChunkPos::new(x, z), blocks).unwrap();
        }
    }
    let loaded: Vec<SectionLightUpdate> = rx.try_iter().flatten().collect();
    assert!(loaded.iter().any(|update| update.chunk == ChunkPos::new(0, 0)));
    assert!(loaded.iter().all(|update| update.chunk == ChunkPos::new(0, 0)));

    world
        .set_block(BlockPos::new(8, 8, 8), Occupant::light_source(4))
        .unwrap();
    let batches: Vec<Vec<SectionLightUpdate>> = rx.try_iter().collect();
    assert_eq!(batches.len(), 1);
    let batch = &batches[0];
    assert_eq!(batch.len(), 1);
    assert!(batch[0].origin);
    assert_eq!(batch[0].chunk, ChunkPos::new(0, 0));
    assert_eq!(batch[0].section_height, 0);
    assert_eq!(batch[0].snapshot.get(InSectionPos::new(8, 8, 8)).block(), 4);

    // The east neighbour also changes but is missing neighbours of its own.
    world
        .set_block(BlockPos::new(15, 8, 8), Occupant::light_source(14))
        .unwrap();
    let batches: Vec<Vec<SectionLightUpdate>> = rx.try_iter().collect();
    assert_eq!(batches.len(), 1);
    assert!(batches[0].iter().all(|update| update.chunk == ChunkPos::new(0, 0)));
    assert!(batches[0][0].origin);
}

#[test]
fn test_unchanged_light_sends_nothing() {
    let mut world = world_with_chunks(&config(0, 0, false), 1);
    let rx = listen(&mut world);
    world.set_block(BlockPos::new(4, 4, 4), Occupant::opaque()).unwrap();
    assert_eq!(rx.try_iter().count(), 0);
    // Same occupant again is a no-op.
    world.set_block(BlockPos::new(4, 4, 4), Occupant::opaque()).unwrap();
    assert_eq!(rx.try_iter().count(), 0);
}

#[test]
fn test_snapshot_is_replaced_only_when_notified() {
    let key = SectionKey {
        chunk: ChunkPos::new(0, 0),
        height: 0,
    };
    let pos = BlockPos::new(8, 8, 8);

    let mut lonely = world_with_chunks(&config(0, 0, false), 0);
    let handle = lonely.section_snapshot(key).unwrap();
    lonely.set_block(pos, Occupant::light_source(9)).unwrap();
    assert_eq!(block(&lonely, 8, 8, 8), 9);
    assert_eq!(handle.load().get(pos.in_section()).block(), 0);

    let mut world = world_with_chunks(&config(0, 0, false), 1);
    let handle = world.section_snapshot(key).unwrap();
    let before = handle.load_full();
    world.set_block(pos, Occupant::light_source(9)).unwrap();
    assert_eq!(before.get(pos.in_section()).block(), 0);
    assert_eq!(handle.load().get(pos.in_section()).block(), 9);
    assert_eq!(handle.load().get(InSectionPos::new(8, 8, 12)).block(), 5);
}

#[test]
fn test_snapshot_composites_sky() {
    let mut world = world_with_chunks(&config(0, 0, true), 1);
    world.set_block(BlockPos::new(3, 10, 3), Occupant::opaque()).unwrap();
    let key = SectionKey {
        chunk: ChunkPos::new(0, 0),
        height: 0,
    };
    let snapshot = world.section_snapshot(key).unwrap().load_full();
    assert_eq!(snapshot.get(InSectionPos::new(3, 11, 3)).sky(), 15);
    assert_eq!(snapshot.get(InSectionPos::new(3, 10, 3)).sky(), 0);
    assert_eq!(snapshot.get(InSectionPos::new(3, 9, 3)).sky(), 14);
    assert_eq!(snapshot.raw(InSectionPos::new(3, 11, 3)).sky(), 0);
}

/// Asserts that the published snapshots of column (8, 8) of chunk (0, 0) match the live light.
fn assert_snapshots_match_column(world: &LightWorld) {
    let dimension = world.dimension();
    for y in dimension.min_y()..=dimension.max_y() {
        let key = SectionKey {
            chunk: ChunkPos::new(0, 0),
            height: y >> 4,
        };
        let snapshot = world.section_snapshot(key).unwrap().load_full();
        assert_eq!(
            snapshot.get(InSectionPos::new(8, (y & 15) as u8, 8)),
            world.get_light(BlockPos::new(8, y, 8)),
            "y = {y}"
        );
    }
}

#[test]
fn test_capping_a_shaft_notifies_and_refreshes_snapshots() {
    let mut world = world_with_chunks(&config(0, 1, true), 1);
    for y in 0..=20 {
        for (x, z) in [(7, 8), (9, 8), (8, 7), (8, 9)] {
            world.set_block(BlockPos::new(x, y, z), Occupant::opaque()).unwrap();
        }
    }
    let rx = listen(&mut world);
    assert_eq!(sky(&world, 8, 5, 8), 15);

    world.set_block(BlockPos::new(8, 20, 8), Occupant::opaque()).unwrap();
    let updates: Vec<SectionLightUpdate> = rx.try_iter().flatten().collect();
    assert!(updates.iter().any(|update| update.chunk == ChunkPos::new(0, 0)
        && update.section_height == 0));
    assert!(sky(&world, 8, 5, 8) < 15);
    assert_snapshots_match_column(&world);

    world.set_block(BlockPos::new(8, 20, 8), Occupant::AIR).unwrap();
    let updates: Vec<SectionLightUpdate> = rx.try_iter().flatten().collect();
    assert!(updates.iter().any(|update| update.chunk == ChunkPos::new(0, 0)
        && update.section_height == 0));
    assert_eq!(sky(&world, 8, 5, 8), 15);
    assert_snapshots_match_column(&world);
}

#[test]
fn test_recalculate_matches_incremental_result() {
    let mut world = world_with_chunks(&config(0, 1, true), 1);
    for x in 6..10 {
        for z in 6..10 {
            world.set_block(BlockPos::new(x, 20, z), Occupant::opaque()).unwrap();
        }
    }
    world
        .set_block(BlockPos::new(7, 18, 7), Occupant::light_source(13))
        .unwrap();
    world
        .set_block(BlockPos::new(14, 3, 1), Occupant::light_source(15))
        .unwrap();
    world.set_block(BlockPos::new(13, 3, 1), Occupant::opaque()).unwrap();
    let incremental = light_field(&world, ChunkPos::new(0, 0));
    assert_eq!(sky(&world, 7, 19, 7), 13);

    world.recalculate_chunk(ChunkPos::new(0, 0)).unwrap();
    assert_eq!(light_field(&world, ChunkPos::new(0, 0)), incremental);

    world.propagate_from_neighbours(ChunkPos::new(0, 0)).unwrap();
    assert_eq!(light_field(&world, ChunkPos::new(0, 0)), incremental);
}

#[test]
fn test_replace_section_relights_from_new_contents() {
    let mut world = world_with_chunks(&config(0, 0, false), 0);
    world
        .set_block(BlockPos::new(1, 1, 1), Occupant::light_source(14))
        .unwrap();

    let mut blocks = SectionBlocks::empty();
    blocks.set(InSectionPos::new(4, 4, 4), Occupant::light_source(10));
    world
        .replace_section(ChunkPos::new(0, 0), 0, blocks)
        .unwrap();
    assert_eq!(block(&world, 4, 4, 4), 10);
    assert_eq!(block(&world, 4, 4, 7), 7);
    assert_eq!(block(&world, 1, 1, 1), 1);
    assert_eq!(world.occupant(BlockPos::new(1, 1, 1)), Some(Occupant::AIR));

    world
        .replace_section(ChunkPos::new(0, 0), 0, SectionBlocks::filled(Occupant::opaque()))
        .unwrap();
    assert!(
        light_field(&world, ChunkPos::new(0, 0))
            .iter()
            .all(|level| level.block() == 0)
    );
}

#[test]
fn test_shared_world_is_readable_from_another_thread() {
    use std::{sync::Arc, thread};

    use luma_utils::locks::SyncRwLock;

    let world = Arc::new(SyncRwLock::new(world_with_chunks(&config(0, 0, false), 0)));
    world
        .write()
        .set_block(BlockPos::new(2, 2, 2), Occupant::light_source(7))
        .unwrap();

    let reader = Arc::clone(&world);
    let level = thread::spawn(move || reader.read().get_light(BlockPos::new(2, 2, 3)).block())
        .join()
        .unwrap();
    assert_eq!(level, 6);
}
