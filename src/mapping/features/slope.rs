//! Slope feature
//!
//! Penalizes the inclination of the surface normal. Cells flatter than the flat
//! threshold are free, cells steeper than the steep threshold get the maximum
//! cost, and in between the cost grows logarithmically.

use super::{Feature, TerrainInfo};

/// Configuration for the slope feature
#[derive(Debug, Clone)]
pub struct SlopeFeatureConfig {
    /// Inclination below which the terrain counts as flat [rad]
    pub flat_threshold: f64,
    /// Inclination above which the terrain is not traversable [rad]
    pub steep_threshold: f64,
    /// Cost of non-traversable terrain
    pub max_cost: f64,
    pub weight: f64,
}

impl Default for SlopeFeatureConfig {
    fn default() -> Self {
        Self {
            flat_threshold: 15.0_f64.to_radians(),
            steep_threshold: 70.0_f64.to_radians(),
            max_cost: 4.0,
            weight: 1.0,
        }
    }
}

pub struct SlopeFeature {
    config: SlopeFeatureConfig,
}

impl SlopeFeature {
    pub fn new(config: SlopeFeatureConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(SlopeFeatureConfig::default())
    }

    pub fn config(&self) -> &SlopeFeatureConfig {
        &self.config
    }

    /// Cost of an inclination angle [rad]
    pub fn slope_cost(&self, angle: f64) -> f64 {
        let flat = self.config.flat_threshold;
        let steep = self.config.steep_threshold;
        if angle < flat {
            0.0
        } else if angle < steep {
            let ratio = (steep - angle) / (steep - flat);
            (-ratio.ln()).min(self.config.max_cost)
        } else {
            self.config.max_cost
        }
    }
}

impl Feature for SlopeFeature {
    fn name(&self) -> &str {
        "Slope"
    }

    fn weight(&self) -> f64 {
        self.config.weight
    }

    fn set_weight(&mut self, weight: f64) {
        self.config.weight = weight;
    }

    fn compute_cost(&self, info: &TerrainInfo<'_>) -> f64 {
        let nz = info.surface_normal.z.max(-1.0).min(1.0);
        self.slope_cost(nz.acos().abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::HeightMap;
    use crate::mapping::features::test_utils::flat_info;
    use crate::utils::SpaceDiscretization;
    use nalgebra::Vector3;

    #[test]
    fn test_flat_terrain_is_free() {
        let feature = SlopeFeature::with_defaults();
        let height_map = HeightMap::new();
        let space = SpaceDiscretization::default();
        let info = flat_info(&height_map, &space);
        assert_eq!(feature.compute_cost(&info), 0.0);
    }

    #[test]
    fn test_cost_grows_with_inclination() {
        let feature = SlopeFeature::with_defaults();
        let low = feature.slope_cost(20.0_f64.to_radians());
        let high = feature.slope_cost(50.0_f64.to_radians());
        assert!(low > 0.0);
        assert!(high > low);
        assert!(high <= feature.config().max_cost);
    }

    #[test]
    fn test_steep_terrain_gets_max_cost() {
        let feature = SlopeFeature::with_defaults();
        let height_map = HeightMap::new();
        let space = SpaceDiscretization::default();
        let mut info = flat_info(&height_map, &space);
        // 80 degrees from vertical
        let angle = 80.0_f64.to_radians();
        info.surface_normal = Vector3::new(angle.sin(), 0.0, angle.cos());
        assert!((feature.compute_cost(&info) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_weight_is_configurable() {
        let mut feature = SlopeFeature::with_defaults();
        feature.set_weight(2.5);
        assert_eq!(feature.weight(), 2.5);
        assert_eq!(feature.name(), "Slope");
    }
}
