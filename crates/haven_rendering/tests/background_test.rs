//! # Background Pipeline Integration Tests
//!
//! Generated terrain through the builder, into resident chunks, and back
//! into the texture pool.

use haven_procedural::{ChunkGenerator, GenerationMode, TerrainGenerator};
use haven_rendering::{
    texture_pool, Chunk, ChunkRegistry, RenderTexture, TextureBuilder, TextureOrigin, TextureSize,
};
use haven_shared::{ChunkCoord, ObjectId, TileFill, WorldConstants};

fn constants() -> WorldConstants {
    WorldConstants::new(8, 4)
}

/// Test: grayscale tiles land on the right pixels.
#[test]
fn test_grayscale_background_matches_tiles() {
    let constants = constants();
    let gen = ChunkGenerator::from_name("haven-world-seed", constants, GenerationMode::Grayscale);
    let record = gen.generate(ChunkCoord::new(2, -1));

    let mut builder = TextureBuilder::new(constants, constants.tiles_per_chunk());
    let mut textures = texture_pool(4);
    let texture = builder.build_background(&record.tiles, &mut textures);

    assert_eq!(texture.size(), TextureSize::square(32));
    for tile in record.tiles.iter() {
        let TileFill::Color { color } = tile.fill else {
            panic!("grayscale generator produced a sprite tile");
        };
        // every pixel of the cell carries the tile colour
        for (dx, dy) in [(0, 0), (7, 0), (0, 7), (7, 7), (3, 4)] {
            assert_eq!(texture.pixel(tile.x + dx, tile.y + dy), Some(color.to_rgba()));
        }
    }

    textures.release(texture);
}

/// Test: biome backgrounds are fully opaque.
#[test]
fn test_biome_background_is_opaque() {
    let constants = constants();
    let gen = ChunkGenerator::from_name("haven-world-seed", constants, GenerationMode::Biome);
    let record = gen.generate(ChunkCoord::new(0, 0));

    let mut builder = TextureBuilder::new(constants, constants.tiles_per_chunk());
    let mut textures = texture_pool(4);
    let texture = builder.build_background(&record.tiles, &mut textures);

    assert!(texture.pixels().iter().all(|p| p[3] == 255));
    assert_ne!(texture.pixel(0, 0), Some(RenderTexture::CLEAR));
    textures.release(texture);
}

/// Test: loading and unloading many chunks keeps the texture pool bounded
/// and reuses freed textures.
#[test]
fn test_chunk_churn_reuses_textures() {
    let constants = constants();
    let gen = ChunkGenerator::from_name("haven-world-seed", constants, GenerationMode::Grayscale);
    let mut builder = TextureBuilder::new(constants, constants.tiles_per_chunk());
    let mut textures = texture_pool(3);
    let mut registry = ChunkRegistry::new();

    for x in 0..20 {
        let coord = ChunkCoord::new(x, 0);
        let record = gen.generate(coord);
        let texture = builder.build_background(&record.tiles, &mut textures);

        let mut chunk = Chunk::new(coord, constants.chunk_pixel_size());
        assert!(chunk.set_background(texture, TextureOrigin::Pooled).is_none());
        chunk.add_child(ObjectId(x as u64), haven_shared::LocalPosition::new(1.0, 1.0));
        assert!(registry.add(coord.key(), chunk).is_none());

        // keep a window of three resident chunks
        if x >= 3 {
            let old = ChunkCoord::new(x - 3, 0).key();
            let chunk = registry.remove(old).expect("resident");
            assert_eq!(chunk.destroy(&mut textures), vec![ObjectId((x - 3) as u64)]);
        }

        assert!(textures.idle_count() <= textures.max_idle());
        assert_eq!(textures.borrowed_count(), registry.len());
    }

    // three resident plus at most one idle at any time
    assert!(textures.factory().allocated() <= 4);
    assert!(textures.stats().reused >= 16);

    for (_, chunk) in registry.clear() {
        chunk.destroy(&mut textures);
    }
    assert_eq!(textures.borrowed_count(), 0);
}
