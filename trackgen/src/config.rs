//! Track generation parameters

use serde::{Deserialize, Serialize};

use crate::constants::{
    MAX_CHUNK_COUNT, METER_IN_GAME_UNITS, MIN_CHUNK_COUNT, RADIUS_MAX_METER, RADIUS_MIN_METER,
};
use crate::error::{Result, TrackGenError};

/// Input of the track generator
///
/// ```toml
/// chunk_count = 100
/// width = 12.0
/// chaos = 0.8
/// radius_min_meter = 80.0
/// radius_max_meter = 200.0
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationInfo {
    /// Number of chunks to generate (3-1000)
    pub chunk_count: u32,
    /// Nominal track width. Per-chunk widths are sampled independently.
    pub width: f32,
    /// Scales the random turn and roll angles, 0.0 gives a straight track
    pub chaos: f32,
    /// Lower bound of the sampled chunk radius, in meters
    pub radius_min_meter: Option<f32>,
    /// Upper bound of the sampled chunk radius, in meters
    pub radius_max_meter: Option<f32>,
}

impl Default for GenerationInfo {
    fn default() -> Self {
        Self {
            chunk_count: 100,
            width: 12.0,
            chaos: 1.0,
            radius_min_meter: None,
            radius_max_meter: None,
        }
    }
}

impl GenerationInfo {
    /// Check every parameter against the generator's bounds
    pub fn validate(&self) -> Result<()> {
        if !(MIN_CHUNK_COUNT..=MAX_CHUNK_COUNT).contains(&self.chunk_count) {
            return Err(TrackGenError::InvalidChunkCount {
                count: self.chunk_count,
                min: MIN_CHUNK_COUNT,
                max: MAX_CHUNK_COUNT,
            });
        }

        if !(0.0..=1.0).contains(&self.chaos) {
            return Err(TrackGenError::InvalidChaos(self.chaos));
        }

        self.radius_range().map(|_| ())
    }

    /// Chunk radius range in game units
    pub fn radius_range(&self) -> Result<(f32, f32)> {
        let min = self.radius_min_meter.unwrap_or(RADIUS_MIN_METER);
        let max = self.radius_max_meter.unwrap_or(RADIUS_MAX_METER);

        // Written so that NaN bounds are rejected too
        if !(min > 0.0 && min <= max && max.is_finite()) {
            return Err(TrackGenError::InvalidRadiusRange { min, max });
        }

        Ok((min * METER_IN_GAME_UNITS, max * METER_IN_GAME_UNITS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let info = GenerationInfo::default();
        assert!(info.validate().is_ok());
        assert_eq!(info.radius_range(), Ok((100.0, 300.0)));
    }

    #[test]
    fn test_chunk_count_bounds() {
        for count in [3, 500, 1000] {
            let info = GenerationInfo {
                chunk_count: count,
                ..Default::default()
            };
            assert!(info.validate().is_ok(), "count {count} should be valid");
        }

        for count in [0, 2, 1001] {
            let info = GenerationInfo {
                chunk_count: count,
                ..Default::default()
            };
            assert_eq!(
                info.validate(),
                Err(TrackGenError::InvalidChunkCount {
                    count,
                    min: 3,
                    max: 1000
                })
            );
        }
    }

    #[test]
    fn test_chaos_out_of_range() {
        let info = GenerationInfo {
            chaos: 1.5,
            ..Default::default()
        };
        assert_eq!(info.validate(), Err(TrackGenError::InvalidChaos(1.5)));

        let info = GenerationInfo {
            chaos: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(info.validate(), Err(TrackGenError::InvalidChaos(_))));
    }

    #[test]
    fn test_custom_radius_range() {
        let info = GenerationInfo {
            radius_min_meter: Some(10.0),
            radius_max_meter: Some(20.0),
            ..Default::default()
        };
        assert_eq!(info.radius_range(), Ok((10.0, 20.0)));

        let inverted = GenerationInfo {
            radius_min_meter: Some(50.0),
            radius_max_meter: Some(20.0),
            ..Default::default()
        };
        assert!(matches!(
            inverted.validate(),
            Err(TrackGenError::InvalidRadiusRange { .. })
        ));

        let negative = GenerationInfo {
            radius_min_meter: Some(-1.0),
            ..Default::default()
        };
        assert!(negative.radius_range().is_err());
    }
}
