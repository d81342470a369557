//! # Biome Classification
//!
//! Determines the biome of a tile from a small climate model:
//! - Elevation (the base terrain sample)
//! - Temperature (its own noise field)
//! - Precipitation (its own noise field)
//!
//! Temperature, precipitation and sprite detail are read from the same noise
//! instance at fixed, far-apart noise-space offsets, so the fields are
//! decorrelated while the generator still seeds only one permutation table.

use haven_shared::Biome;

use crate::noise::SimplexNoise;

/// Climate values at one sample point, each in `[0, 1)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Climate {
    /// Terrain elevation.
    pub elevation: f64,
    /// Temperature, cold to hot.
    pub temperature: f64,
    /// Precipitation, dry to wet.
    pub precipitation: f64,
}

/// Biome classifier over a shared noise source.
pub struct BiomeClassifier {
    /// Shared noise source.
    noise: SimplexNoise,
}

impl BiomeClassifier {
    /// Noise-space offset of the temperature field.
    const TEMPERATURE_OFFSET: (f64, f64) = (5_123.7, -3_301.1);
    /// Noise-space offset of the precipitation field.
    const PRECIPITATION_OFFSET: (f64, f64) = (-7_919.3, 4_447.9);
    /// Noise-space offset of the sprite detail field.
    const DETAIL_OFFSET: (f64, f64) = (12_011.5, 9_973.1);
    /// Climate varies more slowly than terrain.
    const CLIMATE_SCALE: f64 = 0.5;
    /// Sprite detail varies faster than terrain.
    const DETAIL_SCALE: f64 = 8.0;

    /// Elevation below which tiles are deep water.
    pub const DEEP_WATER_LEVEL: f64 = 0.28;
    /// Elevation below which tiles are shallow water.
    pub const SHALLOW_WATER_LEVEL: f64 = 0.38;
    /// Elevation below which tiles are beach.
    pub const BEACH_LEVEL: f64 = 0.42;

    /// Creates a classifier reading from `noise`.
    #[must_use]
    pub const fn new(noise: SimplexNoise) -> Self {
        Self { noise }
    }

    /// The underlying noise source.
    #[must_use]
    pub const fn noise(&self) -> &SimplexNoise {
        &self.noise
    }

    /// Terrain elevation at a noise-space point.
    #[must_use]
    pub fn elevation(&self, nx: f64, ny: f64) -> f64 {
        self.noise.octaved_unit(nx, ny, 3)
    }

    /// Full climate at a noise-space point.
    #[must_use]
    pub fn climate(&self, nx: f64, ny: f64) -> Climate {
        let (tx, ty) = Self::TEMPERATURE_OFFSET;
        let (px, py) = Self::PRECIPITATION_OFFSET;
        Climate {
            elevation: self.elevation(nx, ny),
            temperature: self
                .noise
                .sample_unit(nx * Self::CLIMATE_SCALE + tx, ny * Self::CLIMATE_SCALE + ty),
            precipitation: self
                .noise
                .sample_unit(nx * Self::CLIMATE_SCALE + px, ny * Self::CLIMATE_SCALE + py),
        }
    }

    /// Per-tile detail sample, used to pick a frame on the biome's sheet.
    #[must_use]
    pub fn detail(&self, nx: f64, ny: f64) -> f64 {
        let (dx, dy) = Self::DETAIL_OFFSET;
        self.noise
            .sample_unit(nx * Self::DETAIL_SCALE + dx, ny * Self::DETAIL_SCALE + dy)
    }

    /// Classifies the biome at a noise-space point.
    #[must_use]
    pub fn classify(&self, nx: f64, ny: f64) -> Biome {
        Self::classify_climate(self.climate(nx, ny))
    }

    /// Classifies a biome from climate values.
    #[must_use]
    pub fn classify_climate(climate: Climate) -> Biome {
        let Climate {
            elevation,
            temperature,
            precipitation,
        } = climate;

        if elevation < Self::DEEP_WATER_LEVEL {
            return Biome::DeepWater;
        }
        if elevation < Self::SHALLOW_WATER_LEVEL {
            return Biome::ShallowWater;
        }
        if elevation < Self::BEACH_LEVEL {
            return Biome::Beach;
        }

        match (temperature, precipitation) {
            (t, p) if t < 0.3 && p < 0.5 => Biome::Tundra,
            (t, _) if t < 0.3 => Biome::Snow,
            (t, p) if t > 0.65 && p < 0.35 => Biome::Desert,
            (t, p) if t > 0.65 && p > 0.6 => Biome::Rainforest,
            (t, _) if t > 0.65 => Biome::Grassland,
            (_, p) if p > 0.55 => Biome::Forest,
            _ => Biome::Grassland,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::WorldSeed;

    fn climate(elevation: f64, temperature: f64, precipitation: f64) -> Climate {
        Climate {
            elevation,
            temperature,
            precipitation,
        }
    }

    #[test]
    fn test_water_at_low_elevation() {
        assert_eq!(BiomeClassifier::classify_climate(climate(0.1, 0.5, 0.5)), Biome::DeepWater);
        assert_eq!(BiomeClassifier::classify_climate(climate(0.3, 0.9, 0.1)), Biome::ShallowWater);
        assert_eq!(BiomeClassifier::classify_climate(climate(0.4, 0.1, 0.9)), Biome::Beach);
    }

    #[test]
    fn test_land_biomes() {
        let land = 0.6;
        assert_eq!(BiomeClassifier::classify_climate(climate(land, 0.1, 0.2)), Biome::Tundra);
        assert_eq!(BiomeClassifier::classify_climate(climate(land, 0.1, 0.8)), Biome::Snow);
        assert_eq!(BiomeClassifier::classify_climate(climate(land, 0.9, 0.1)), Biome::Desert);
        assert_eq!(BiomeClassifier::classify_climate(climate(land, 0.9, 0.9)), Biome::Rainforest);
        assert_eq!(BiomeClassifier::classify_climate(climate(land, 0.5, 0.8)), Biome::Forest);
        assert_eq!(BiomeClassifier::classify_climate(climate(land, 0.5, 0.2)), Biome::Grassland);
    }

    #[test]
    fn test_fields_are_decorrelated() {
        let classifier = BiomeClassifier::new(SimplexNoise::new(WorldSeed::new(7)));
        let differs = (0..200).any(|i| {
            let x = f64::from(i) * 0.173;
            let c = classifier.climate(x, -x * 0.7);
            (c.temperature - c.precipitation).abs() > 0.05
        });
        assert!(differs, "temperature and precipitation must not track each other");
    }

    #[test]
    fn test_classification_determinism() {
        let a = BiomeClassifier::new(SimplexNoise::new(WorldSeed::new(42)));
        let b = BiomeClassifier::new(SimplexNoise::new(WorldSeed::new(42)));
        for i in 0..100 {
            let x = f64::from(i) * 0.31;
            let y = f64::from(i) * -0.17;
            assert_eq!(a.classify(x, y), b.classify(x, y));
            assert_eq!(a.detail(x, y), b.detail(x, y));
        }
    }
}
