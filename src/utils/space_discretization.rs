//! Space discretization
//!
//! Conversions between continuous coordinates, grid keys, and the flat vertex
//! identifiers used as keys of every persisted map. Keys are 16 bit per axis
//! and centred on the origin, so the representable range along each axis is
//! `[-32768, 32768) * resolution` around it.

use std::f64::consts::PI;

use nalgebra::Vector3;

use crate::common::error::{TerrainError, TerrainResult};
use crate::common::types::{GridKey, PlanarVertex, Point2D, Pose2D, SpatialVertex, StateVertex};

/// Number of keys per axis
const KEY_COUNT: u64 = 1 << 16;
/// Key of the cell whose lower corner is the origin
const KEY_OFFSET: i64 = 1 << 15;

#[derive(Debug, Clone, PartialEq)]
pub struct SpaceDiscretization {
    environment_resolution: f64,
    state_resolution: f64,
    angular_resolution: f64,
    origin: Vector3<f64>,
}

impl SpaceDiscretization {
    pub fn new(environment_resolution: f64, state_resolution: f64) -> TerrainResult<Self> {
        let mut space = Self::default();
        space.set_environment_resolution(environment_resolution)?;
        space.set_state_resolution(state_resolution)?;
        Ok(space)
    }

    pub fn with_origin(mut self, origin: Vector3<f64>) -> Self {
        self.origin = origin;
        self
    }

    pub fn environment_resolution(&self) -> f64 {
        self.environment_resolution
    }

    pub fn state_resolution(&self) -> f64 {
        self.state_resolution
    }

    pub fn angular_resolution(&self) -> f64 {
        self.angular_resolution
    }

    pub fn origin(&self) -> Vector3<f64> {
        self.origin
    }

    pub fn set_environment_resolution(&mut self, resolution: f64) -> TerrainResult<()> {
        self.environment_resolution = validate_resolution(resolution, "environment")?;
        Ok(())
    }

    pub fn set_state_resolution(&mut self, resolution: f64) -> TerrainResult<()> {
        self.state_resolution = validate_resolution(resolution, "state")?;
        Ok(())
    }

    /// Yaw keys share the 16 bit key range, so at most `KEY_COUNT` headings fit
    pub fn set_angular_resolution(&mut self, resolution: f64) -> TerrainResult<()> {
        let resolution = validate_resolution(resolution, "angular")?;
        let min_resolution = 2.0 * PI / KEY_COUNT as f64;
        if resolution < min_resolution {
            return Err(TerrainError::InvalidParameter(format!(
                "angular resolution must be at least {:e} rad, got {:e}",
                min_resolution, resolution
            )));
        }
        self.angular_resolution = resolution;
        Ok(())
    }

    // ========================================================================
    // Coordinates <-> keys
    // ========================================================================

    /// Key of the voxel containing `coord`, failing outside the key range
    pub fn coord_to_key_checked(&self, coord: &Vector3<f64>) -> TerrainResult<GridKey> {
        let res = self.environment_resolution;
        let x = checked_axis_key(coord.x, self.origin.x, res);
        let y = checked_axis_key(coord.y, self.origin.y, res);
        let z = checked_axis_key(coord.z, self.origin.z, res);
        match (x, y, z) {
            (Some(x), Some(y), Some(z)) => Ok(GridKey::new(x, y, z)),
            _ => Err(TerrainError::out_of_bounds(coord.x, coord.y, coord.z)),
        }
    }

    /// Key of the voxel containing `coord`, clamped to the key range
    pub fn coord_to_key(&self, coord: &Vector3<f64>) -> GridKey {
        let res = self.environment_resolution;
        GridKey::new(
            clamped_axis_key(coord.x, self.origin.x, res),
            clamped_axis_key(coord.y, self.origin.y, res),
            clamped_axis_key(coord.z, self.origin.z, res),
        )
    }

    /// Vertical key of a height value
    pub fn height_to_key(&self, z: f64) -> u16 {
        clamped_axis_key(z, self.origin.z, self.environment_resolution)
    }

    /// Centre of the voxel addressed by `key`
    pub fn key_to_coord(&self, key: &GridKey) -> Vector3<f64> {
        let res = self.environment_resolution;
        Vector3::new(
            axis_coord(key.x, self.origin.x, res),
            axis_coord(key.y, self.origin.y, res),
            axis_coord(key.z, self.origin.z, res),
        )
    }

    // ========================================================================
    // Keys <-> vertices
    // ========================================================================

    pub fn key_to_planar_vertex(&self, key: &GridKey) -> PlanarVertex {
        PlanarVertex(key.x as u64 + key.y as u64 * KEY_COUNT)
    }

    pub fn key_to_spatial_vertex(&self, key: &GridKey) -> SpatialVertex {
        SpatialVertex(key.x as u64 + key.y as u64 * KEY_COUNT + key.z as u64 * KEY_COUNT * KEY_COUNT)
    }

    pub fn spatial_vertex_to_key(&self, vertex: SpatialVertex) -> GridKey {
        let v = vertex.0;
        GridKey::new(
            (v % KEY_COUNT) as u16,
            ((v / KEY_COUNT) % KEY_COUNT) as u16,
            ((v / (KEY_COUNT * KEY_COUNT)) % KEY_COUNT) as u16,
        )
    }

    /// Planar vertex of the cell containing `coord`
    pub fn coord_to_planar_vertex(&self, coord: &Point2D) -> PlanarVertex {
        let res = self.environment_resolution;
        let x = clamped_axis_key(coord.x, self.origin.x, res) as u64;
        let y = clamped_axis_key(coord.y, self.origin.y, res) as u64;
        PlanarVertex(x + y * KEY_COUNT)
    }

    /// Centre of the cell addressed by a planar vertex
    pub fn planar_vertex_to_coord(&self, vertex: PlanarVertex) -> Point2D {
        let res = self.environment_resolution;
        let x = (vertex.0 % KEY_COUNT) as u16;
        let y = ((vertex.0 / KEY_COUNT) % KEY_COUNT) as u16;
        Point2D::new(axis_coord(x, self.origin.x, res), axis_coord(y, self.origin.y, res))
    }

    pub fn spatial_vertex_to_coord(&self, vertex: SpatialVertex) -> Vector3<f64> {
        self.key_to_coord(&self.spatial_vertex_to_key(vertex))
    }

    // ========================================================================
    // States <-> vertices
    // ========================================================================

    fn yaw_key_count(&self) -> u64 {
        ((2.0 * PI / self.angular_resolution).round() as u64).max(1)
    }

    /// Vertex of a planning state (x, y at state resolution, yaw at angular resolution)
    pub fn state_to_vertex(&self, state: &Pose2D) -> StateVertex {
        let res = self.state_resolution;
        let x = clamped_axis_key(state.x, self.origin.x, res) as u64;
        let y = clamped_axis_key(state.y, self.origin.y, res) as u64;

        let yaw = state.yaw.rem_euclid(2.0 * PI);
        let yaw_key = (yaw / self.angular_resolution).round() as u64 % self.yaw_key_count();

        StateVertex(x + y * KEY_COUNT + yaw_key * KEY_COUNT * KEY_COUNT)
    }

    /// Planning state at the centre of the cell addressed by `vertex`
    pub fn vertex_to_state(&self, vertex: StateVertex) -> Pose2D {
        let res = self.state_resolution;
        let v = vertex.0;
        let x = (v % KEY_COUNT) as u16;
        let y = ((v / KEY_COUNT) % KEY_COUNT) as u16;
        let yaw_key = v / (KEY_COUNT * KEY_COUNT);

        let mut pose = Pose2D::new(
            axis_coord(x, self.origin.x, res),
            axis_coord(y, self.origin.y, res),
            yaw_key as f64 * self.angular_resolution,
        );
        pose.normalize_yaw();
        pose
    }

    /// Planar environment vertex under the position of a state vertex
    pub fn state_vertex_to_environment_vertex(&self, vertex: StateVertex) -> PlanarVertex {
        self.coord_to_planar_vertex(&self.vertex_to_state(vertex).position())
    }
}

impl Default for SpaceDiscretization {
    fn default() -> Self {
        Self {
            environment_resolution: 0.04,
            state_resolution: 0.04,
            angular_resolution: PI / 8.0,
            origin: Vector3::zeros(),
        }
    }
}

fn validate_resolution(resolution: f64, what: &str) -> TerrainResult<f64> {
    if resolution.is_finite() && resolution > 0.0 {
        Ok(resolution)
    } else {
        Err(TerrainError::InvalidParameter(format!(
            "{} resolution must be positive, got {}",
            what, resolution
        )))
    }
}

fn raw_axis_key(value: f64, origin: f64, resolution: f64) -> f64 {
    ((value - origin) / resolution).floor() + KEY_OFFSET as f64
}

fn checked_axis_key(value: f64, origin: f64, resolution: f64) -> Option<u16> {
    let key = raw_axis_key(value, origin, resolution);
    if key >= 0.0 && key < KEY_COUNT as f64 {
        Some(key as u16)
    } else {
        None
    }
}

fn clamped_axis_key(value: f64, origin: f64, resolution: f64) -> u16 {
    let key = raw_axis_key(value, origin, resolution);
    key.max(0.0).min((KEY_COUNT - 1) as f64) as u16
}

fn axis_coord(key: u16, origin: f64, resolution: f64) -> f64 {
    (key as i64 - KEY_OFFSET) as f64 * resolution + 0.5 * resolution + origin
}
