//! Terrain mapping
//!
//! Builds a 2.5D height map and a cost-annotated terrain map from a volumetric
//! occupancy structure. Every cycle:
//!
//! 1. cells outside the interest region around the robot are forgotten,
//! 2. each search area is rasterized around the robot and a ray is cast
//!    downwards through the occupancy structure to find the surface,
//! 3. the local surface (normal, curvature) of every height-map cell is
//!    estimated from the occupied voxels around it,
//! 4. the registered features score the cell.

use log::{debug, error, info, warn};
use nalgebra::Vector3;

use crate::common::error::{TerrainError, TerrainResult};
use crate::common::traits::{OccupancyMap, TerrainEnvironment};
use crate::common::types::*;
use crate::mapping::features::{Feature, TerrainInfo};
use crate::utils::math::{compute_mean_and_covariance, solve_plane_parameters};
use crate::utils::SpaceDiscretization;

/// Minimum number of points for a plane fit
const MIN_PLANE_POINTS: usize = 3;

/// Configuration for the terrain mapper
#[derive(Debug, Clone)]
pub struct TerrainMappingConfig {
    /// Discretization depth used for occupancy queries
    pub depth: u32,
    /// Use the neighbourhood mean instead of the voxel centre as sample position
    pub using_cloud_mean: bool,
    /// Keep terrain cells whose height key did not change instead of rescoring them
    pub skip_unchanged_terrain: bool,
    /// Global minimum height reported with the terrain summary [m]
    pub min_height: f64,
    /// Lateral semi-axis of the interest region, and radius behind the robot [m]
    pub interest_radius_x: f64,
    /// Forward semi-axis of the interest region [m]
    pub interest_radius_y: f64,
    pub neighboring_area: NeighboringArea,
}

impl Default for TerrainMappingConfig {
    fn default() -> Self {
        Self {
            depth: 16,
            using_cloud_mean: false,
            skip_unchanged_terrain: false,
            min_height: f64::NEG_INFINITY,
            interest_radius_x: f64::INFINITY,
            interest_radius_y: f64::INFINITY,
            neighboring_area: NeighboringArea::default(),
        }
    }
}

/// Snapshot of the terrain exposed after every cycle
#[derive(Debug, Clone, Default)]
pub struct TerrainSummary {
    pub height_map: HeightMap,
    pub resolution: f64,
    pub min_height: f64,
}

pub struct TerrainMapping {
    config: TerrainMappingConfig,
    space: SpaceDiscretization,
    search_areas: Vec<SearchArea>,
    features: Vec<Box<dyn Feature>>,
    height_map: HeightMap,
    terrain_map: TerrainMap,
    summary: TerrainSummary,
    terrain_information: bool,
}

impl TerrainMapping {
    pub fn new(config: TerrainMappingConfig) -> Self {
        let space = SpaceDiscretization::default();
        let summary = TerrainSummary {
            height_map: HeightMap::new(),
            resolution: space.environment_resolution(),
            min_height: config.min_height,
        };
        Self {
            config,
            space,
            search_areas: Vec::new(),
            features: Vec::new(),
            height_map: HeightMap::new(),
            terrain_map: TerrainMap::new(),
            summary,
            terrain_information: false,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(TerrainMappingConfig::default())
    }

    pub fn config(&self) -> &TerrainMappingConfig {
        &self.config
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Register a robot-relative search area.
    ///
    /// The finest resolution among all areas becomes the resolution of the
    /// terrain grid and of the planning states.
    pub fn add_search_area(&mut self, area: SearchArea) -> TerrainResult<()> {
        if self.search_areas.is_empty() || area.resolution < self.space.environment_resolution() {
            self.space.set_environment_resolution(area.resolution)?;
            self.space.set_state_resolution(area.resolution)?;
        }
        self.search_areas.push(area);
        Ok(())
    }

    pub fn search_areas(&self) -> &[SearchArea] {
        &self.search_areas
    }

    pub fn set_neighboring_area(&mut self, area: NeighboringArea) {
        self.config.neighboring_area = area;
    }

    pub fn neighboring_area(&self) -> &NeighboringArea {
        &self.config.neighboring_area
    }

    pub fn set_interest_region(&mut self, radius_x: f64, radius_y: f64) -> TerrainResult<()> {
        if !(radius_x > 0.0 && radius_y > 0.0) {
            return Err(TerrainError::InvalidParameter(format!(
                "interest radii must be positive, got ({}, {})",
                radius_x, radius_y
            )));
        }
        self.config.interest_radius_x = radius_x;
        self.config.interest_radius_y = radius_y;
        Ok(())
    }

    pub fn add_feature(&mut self, feature: Box<dyn Feature>) {
        info!("Adding the {} feature with a weight of {}", feature.name(), feature.weight());
        self.features.push(feature);
    }

    /// Drop the first feature called `name`. Returns false if there was none.
    pub fn remove_feature(&mut self, name: &str) -> bool {
        match self.features.iter().position(|f| f.name() == name) {
            Some(index) => {
                info!("Removing the {} feature", name);
                self.features.remove(index);
                true
            }
            None => {
                warn!("Could not remove the {} feature", name);
                false
            }
        }
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name()).collect()
    }

    pub fn resolution(&self) -> f64 {
        self.space.environment_resolution()
    }

    pub fn set_resolution(&mut self, resolution: f64) -> TerrainResult<()> {
        self.space.set_environment_resolution(resolution)
    }

    // ========================================================================
    // Outputs
    // ========================================================================

    pub fn height_map(&self) -> &HeightMap {
        &self.height_map
    }

    pub fn terrain_map(&self) -> &TerrainMap {
        &self.terrain_map
    }

    pub fn terrain_summary(&self) -> &TerrainSummary {
        &self.summary
    }

    // ========================================================================
    // Mapping cycle
    // ========================================================================

    /// Run one mapping cycle around the robot.
    ///
    /// Fails with [`TerrainError::OutOfBounds`] as soon as a sample leaves the
    /// occupancy structure. The cycle is abandoned at that point; cells
    /// already updated in it are kept.
    pub fn compute<M>(&mut self, occupancy: &M, robot: &RobotState) -> TerrainResult<()>
    where
        M: OccupancyMap + ?Sized,
    {
        if self.search_areas.is_empty() {
            warn!("Adding a default search area");
            self.add_search_area(SearchArea::default_terrain_area())?;
        }

        let pose = robot.pose();
        if self.terrain_information {
            self.remove_terrain_outside_interest_region(&pose);
        }

        let areas = self.search_areas.clone();
        for area in &areas {
            self.scan_search_area(occupancy, robot, area)?;
        }

        self.summary = TerrainSummary {
            height_map: self.height_map.clone(),
            resolution: self.space.environment_resolution(),
            min_height: self.config.min_height,
        };

        if self.features.is_empty() {
            warn!("Could not compute the cost of the terrain, at least one feature is needed");
        }

        let cells: Vec<(PlanarVertex, f64)> = self.height_map.iter().map(|(v, h)| (*v, *h)).collect();
        let mut computed = 0;
        for (vertex, height) in cells {
            let height_key = self.space.height_to_key(height);
            let unchanged = self.terrain_map.get(&vertex).map(|cell| cell.key.z) == Some(height_key);
            if unchanged && self.config.skip_unchanged_terrain {
                continue;
            }
            // A failed recompute must not leave the previous score behind
            self.terrain_map.remove(&vertex);

            let xy = self.space.planar_vertex_to_coord(vertex);
            let surface_key = occupancy.coord_to_key(&Vector3::new(xy.x, xy.y, height), self.config.depth);
            if self.compute_terrain_data(occupancy, &surface_key, vertex, pose.yaw)? {
                computed += 1;
            }
        }

        debug!(
            "Terrain cycle: {} height cells, {} terrain cells, {} scored",
            self.height_map.len(),
            self.terrain_map.len(),
            computed
        );

        self.terrain_information = true;
        Ok(())
    }

    /// Cast one ray per rasterized sample and record the surface heights
    fn scan_search_area<M>(&mut self, occupancy: &M, robot: &RobotState, area: &SearchArea) -> TerrainResult<()>
    where
        M: OccupancyMap + ?Sized,
    {
        let depth = self.config.depth;
        let z_top = area.max_z + robot.z;
        let z_bottom = area.min_z + robot.z;

        for sample in area.rasterize(&robot.pose(), true) {
            let top = Vector3::new(sample.x, sample.y, z_top);
            let init_key = match occupancy.coord_to_key_checked(&top, depth) {
                Some(key) => key,
                None => {
                    error!("Cell out of bounds: ({:.3}, {:.3}, {:.3})", top.x, top.y, top.z);
                    return Err(TerrainError::out_of_bounds(top.x, top.y, top.z));
                }
            };

            if let Some(surface) = find_surface(occupancy, &init_key, z_bottom, depth) {
                self.update_height(&surface)?;
            }
        }
        Ok(())
    }

    /// Insert a surface point, invalidating the cell if its height key changed
    fn update_height(&mut self, surface: &Vector3<f64>) -> TerrainResult<()> {
        let key = self.space.coord_to_key_checked(surface)?;
        let vertex = self.space.key_to_planar_vertex(&key);

        if let Some(&old_height) = self.height_map.get(&vertex) {
            if self.space.height_to_key(old_height) == key.z {
                return Ok(());
            }
            self.terrain_map.remove(&vertex);
            self.height_map.remove(&vertex);
        }
        self.height_map.insert(vertex, surface.z);
        Ok(())
    }

    /// Estimate the local surface around `surface_key` and score it.
    ///
    /// Returns whether a terrain cell was written.
    fn compute_terrain_data<M>(
        &mut self,
        occupancy: &M,
        surface_key: &GridKey,
        vertex: PlanarVertex,
        yaw: f64,
    ) -> TerrainResult<bool>
    where
        M: OccupancyMap + ?Sized,
    {
        let depth = self.config.depth;
        let centre = occupancy.key_to_coord(surface_key, depth);

        let mut points = vec![centre];
        for (dx, dy, dz) in self.config.neighboring_area.offsets() {
            if let Some(neighbor) = surface_key.offset(dx, dy, dz) {
                if occupancy.is_occupied(&neighbor, depth) {
                    points.push(occupancy.key_to_coord(&neighbor, depth));
                }
            }
        }

        if points.len() < MIN_PLANE_POINTS {
            debug!("Not enough neighbors around ({:.3}, {:.3})", centre.x, centre.y);
            return Ok(false);
        }
        let (mean, covariance) = match compute_mean_and_covariance(&points) {
            Some(stats) => stats,
            None => return Ok(false),
        };
        let position = if self.config.using_cloud_mean { mean } else { centre };
        let (normal, curvature) = solve_plane_parameters(&covariance);

        if self.features.is_empty() {
            return Ok(false);
        }

        let info = TerrainInfo {
            position,
            surface_normal: normal,
            curvature,
            pose: Pose2D::new(position.x, position.y, yaw),
            height_map: &self.height_map,
            space: &self.space,
            min_height: self.config.min_height,
        };
        let total_cost: f64 = self
            .features
            .iter()
            .map(|feature| feature.weight() * feature.compute_cost(&info))
            .sum();

        let key = self.space.coord_to_key_checked(&centre)?;
        let cell = TerrainCell::new(key, self.space.environment_resolution(), total_cost, centre.z)
            .with_geometry(normal, curvature);
        self.terrain_map.insert(vertex, cell);
        Ok(true)
    }

    /// Forget every cell outside the interest region of `pose`.
    ///
    /// The region is an ellipse in front of the robot (forward semi-axis
    /// `interest_radius_y`, lateral `interest_radius_x`) and a circle of
    /// radius `interest_radius_x` behind it.
    pub fn remove_terrain_outside_interest_region(&mut self, pose: &Pose2D) {
        let outside: Vec<PlanarVertex> = self
            .height_map
            .keys()
            .chain(self.terrain_map.keys())
            .copied()
            .filter(|v| !self.is_inside_interest_region(pose, &self.space.planar_vertex_to_coord(*v)))
            .collect();

        for vertex in outside {
            self.terrain_map.remove(&vertex);
            self.height_map.remove(&vertex);
        }
    }

    pub fn is_inside_interest_region(&self, pose: &Pose2D, point: &Point2D) -> bool {
        let rx = self.config.interest_radius_x;
        let ry = self.config.interest_radius_y;
        let xc = point.x - pose.x;
        let yc = point.y - pose.y;
        let (sin_yaw, cos_yaw) = pose.yaw.sin_cos();

        let along = xc * cos_yaw + yc * sin_yaw;
        if along >= 0.0 {
            let lateral = xc * sin_yaw - yc * cos_yaw;
            along.powi(2) / ry.powi(2) + lateral.powi(2) / rx.powi(2) <= 1.0
        } else {
            xc.powi(2) + yc.powi(2) <= rx.powi(2)
        }
    }
}

/// First occupied voxel below `init_key` whose centre is not under `z_bottom`
fn find_surface<M>(occupancy: &M, init_key: &GridKey, z_bottom: f64, depth: u32) -> Option<Vector3<f64>>
where
    M: OccupancyMap + ?Sized,
{
    for r in 0..=init_key.z as i32 {
        let key = init_key.offset(0, 0, -r)?;
        let point = occupancy.key_to_coord(&key, depth);
        if point.z < z_bottom {
            return None;
        }
        if occupancy.is_occupied(&key, depth) {
            return Some(point);
        }
    }
    None
}

impl TerrainEnvironment for TerrainMapping {
    fn is_terrain_information(&self) -> bool {
        self.terrain_information
    }

    fn space_discretization(&self) -> &SpaceDiscretization {
        &self.space
    }

    fn terrain_cost_map(&self) -> CostMap {
        self.terrain_map.iter().map(|(v, cell)| (*v, cell.cost)).collect()
    }

    fn average_terrain_cost(&self) -> f64 {
        if self.terrain_map.is_empty() {
            return 0.0;
        }
        self.terrain_map.values().map(|cell| cell.cost).sum::<f64>() / self.terrain_map.len() as f64
    }
}
