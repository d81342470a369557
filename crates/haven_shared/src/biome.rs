//! # Biomes
//!
//! The closed set of terrain biomes and the sprite sheet each one draws from.
//!
//! Sheet lookup is an exhaustive `match`, so adding a biome without a sheet
//! does not compile.

use serde::{Deserialize, Serialize};

/// Metadata for one terrain sprite sheet.
#[derive(Debug, PartialEq, Eq)]
pub struct SheetMeta {
    /// Sheet name.
    pub name: &'static str,
    /// Edge length of one frame in texels.
    pub native_size: u32,
    /// Frame names, indexed by sprite index.
    pub frames: &'static [&'static str],
    /// Base RGB colour of the sheet.
    pub base_color: [u8; 3],
}

impl SheetMeta {
    /// Number of frames on the sheet.
    #[inline]
    #[must_use]
    pub const fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

const DEEP_WATER: SheetMeta = SheetMeta {
    name: "deep_water",
    native_size: 16,
    frames: &["deep_water_0", "deep_water_1"],
    base_color: [18, 46, 110],
};

const SHALLOW_WATER: SheetMeta = SheetMeta {
    name: "shallow_water",
    native_size: 16,
    frames: &["shallow_water_0", "shallow_water_1", "shallow_water_2"],
    base_color: [48, 110, 180],
};

const BEACH: SheetMeta = SheetMeta {
    name: "beach",
    native_size: 16,
    frames: &["beach_0", "beach_1", "beach_2"],
    base_color: [222, 204, 148],
};

const DESERT: SheetMeta = SheetMeta {
    name: "desert",
    native_size: 16,
    frames: &["desert_0", "desert_1", "desert_2", "desert_3"],
    base_color: [214, 176, 98],
};

const GRASSLAND: SheetMeta = SheetMeta {
    name: "grassland",
    native_size: 16,
    frames: &["grass_0", "grass_1", "grass_2", "grass_3"],
    base_color: [104, 164, 64],
};

const FOREST: SheetMeta = SheetMeta {
    name: "forest",
    native_size: 16,
    frames: &["forest_0", "forest_1", "forest_2"],
    base_color: [44, 110, 48],
};

const RAINFOREST: SheetMeta = SheetMeta {
    name: "rainforest",
    native_size: 16,
    frames: &["rainforest_0", "rainforest_1"],
    base_color: [24, 88, 40],
};

const TUNDRA: SheetMeta = SheetMeta {
    name: "tundra",
    native_size: 16,
    frames: &["tundra_0", "tundra_1", "tundra_2"],
    base_color: [150, 156, 132],
};

const SNOW: SheetMeta = SheetMeta {
    name: "snow",
    native_size: 16,
    frames: &["snow_0", "snow_1"],
    base_color: [236, 240, 246],
};

/// Biome types in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Biome {
    /// Open deep water.
    DeepWater,
    /// Coastal water.
    ShallowWater,
    /// Coastline.
    Beach,
    /// Hot and dry.
    Desert,
    /// Temperate, moderate rain.
    Grassland,
    /// Temperate, wet.
    Forest,
    /// Hot and wet.
    Rainforest,
    /// Cold and dry.
    Tundra,
    /// Cold and wet.
    Snow,
}

impl Biome {
    /// Every biome, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::DeepWater,
        Self::ShallowWater,
        Self::Beach,
        Self::Desert,
        Self::Grassland,
        Self::Forest,
        Self::Rainforest,
        Self::Tundra,
        Self::Snow,
    ];

    /// The sprite sheet this biome draws from.
    #[must_use]
    pub const fn sheet(self) -> &'static SheetMeta {
        match self {
            Self::DeepWater => &DEEP_WATER,
            Self::ShallowWater => &SHALLOW_WATER,
            Self::Beach => &BEACH,
            Self::Desert => &DESERT,
            Self::Grassland => &GRASSLAND,
            Self::Forest => &FOREST,
            Self::Rainforest => &RAINFOREST,
            Self::Tundra => &TUNDRA,
            Self::Snow => &SNOW,
        }
    }

    /// Returns whether this biome is water.
    #[must_use]
    pub const fn is_water(self) -> bool {
        matches!(self, Self::DeepWater | Self::ShallowWater)
    }
}
