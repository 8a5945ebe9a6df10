//! In-memory occupancy structure
//!
//! A single-level hashed voxel grid implementing [`OccupancyMap`]. Every
//! discretization depth resolves at leaf resolution.

use std::collections::HashMap;

use nalgebra::Vector3;

use crate::common::error::TerrainResult;
use crate::common::traits::{Occupancy, OccupancyMap};
use crate::common::types::GridKey;
use crate::utils::space_discretization::SpaceDiscretization;

#[derive(Debug, Clone)]
pub struct VoxelGrid {
    space: SpaceDiscretization,
    nodes: HashMap<GridKey, Occupancy>,
}

impl VoxelGrid {
    pub fn new(resolution: f64) -> TerrainResult<Self> {
        Ok(Self {
            space: SpaceDiscretization::new(resolution, resolution)?,
            nodes: HashMap::new(),
        })
    }

    pub fn resolution(&self) -> f64 {
        self.space.environment_resolution()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn set_occupancy(&mut self, point: &Vector3<f64>, occupancy: Occupancy) -> TerrainResult<()> {
        let key = self.space.coord_to_key_checked(point)?;
        self.nodes.insert(key, occupancy);
        Ok(())
    }

    pub fn mark_occupied(&mut self, point: &Vector3<f64>) -> TerrainResult<()> {
        self.set_occupancy(point, Occupancy::Occupied)
    }

    pub fn mark_free(&mut self, point: &Vector3<f64>) -> TerrainResult<()> {
        self.set_occupancy(point, Occupancy::Free)
    }

    /// Forget a voxel entirely
    pub fn remove(&mut self, point: &Vector3<f64>) -> TerrainResult<()> {
        let key = self.space.coord_to_key_checked(point)?;
        self.nodes.remove(&key);
        Ok(())
    }

    /// Mark a flat patch `[min_x, max_x] x [min_y, max_y]` occupied at `height`
    pub fn add_ground_patch(
        &mut self,
        min_x: f64,
        max_x: f64,
        min_y: f64,
        max_y: f64,
        height: f64,
    ) -> TerrainResult<()> {
        self.add_surface(min_x, max_x, min_y, max_y, |_, _| height)
    }

    /// Mark the surface `z = f(x, y)` occupied over every column touching a rectangle.
    ///
    /// `f` is evaluated at the column centres.
    pub fn add_surface<F>(&mut self, min_x: f64, max_x: f64, min_y: f64, max_y: f64, f: F) -> TerrainResult<()>
    where
        F: Fn(f64, f64) -> f64,
    {
        let lower = self.space.coord_to_key_checked(&Vector3::new(min_x, min_y, 0.0))?;
        let upper = self.space.coord_to_key_checked(&Vector3::new(max_x, max_y, 0.0))?;
        for ky in lower.y..=upper.y {
            for kx in lower.x..=upper.x {
                let centre = self.space.key_to_coord(&GridKey::new(kx, ky, lower.z));
                self.mark_occupied(&Vector3::new(centre.x, centre.y, f(centre.x, centre.y)))?;
            }
        }
        Ok(())
    }
}

impl OccupancyMap for VoxelGrid {
    fn coord_to_key_checked(&self, point: &Vector3<f64>, _depth: u32) -> Option<GridKey> {
        self.space.coord_to_key_checked(point).ok()
    }

    fn coord_to_key(&self, point: &Vector3<f64>, _depth: u32) -> GridKey {
        self.space.coord_to_key(point)
    }

    fn key_to_coord(&self, key: &GridKey, _depth: u32) -> Vector3<f64> {
        self.space.key_to_coord(key)
    }

    fn search(&self, key: &GridKey, _depth: u32) -> Option<Occupancy> {
        self.nodes.get(key).copied()
    }
}
