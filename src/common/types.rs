//! Common types used throughout terrain_lattice

use std::collections::BTreeMap;

use nalgebra::Vector3;

/// 2D point representation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 2D pose (position + orientation)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self { x, y, yaw }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0, yaw: 0.0 }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Normalize yaw to [-pi, pi]
    pub fn normalize_yaw(&mut self) {
        while self.yaw > std::f64::consts::PI {
            self.yaw -= 2.0 * std::f64::consts::PI;
        }
        while self.yaw < -std::f64::consts::PI {
            self.yaw += 2.0 * std::f64::consts::PI;
        }
    }

    /// Rotate a world point about this pose's position by its yaw.
    ///
    /// Robot-relative boxes are rasterized axis-aligned around the pose and
    /// then swung into the body heading with this.
    pub fn rotate_about(&self, x: f64, y: f64) -> Point2D {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let dx = x - self.x;
        let dy = y - self.y;
        Point2D::new(
            dx * cos_yaw - dy * sin_yaw + self.x,
            dx * sin_yaw + dy * cos_yaw + self.y,
        )
    }
}

/// Robot state used by the mapping cycle: position plus heading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotState {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f64,
}

impl RobotState {
    pub fn new(x: f64, y: f64, z: f64, yaw: f64) -> Self {
        Self { x, y, z, yaw }
    }

    pub fn pose(&self) -> Pose2D {
        Pose2D::new(self.x, self.y, self.yaw)
    }
}

/// Discrete 3D voxel index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridKey {
    pub x: u16,
    pub y: u16,
    pub z: u16,
}

impl GridKey {
    pub fn new(x: u16, y: u16, z: u16) -> Self {
        Self { x, y, z }
    }

    /// Key shifted by a signed voxel offset, `None` if it leaves the u16 range
    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Option<GridKey> {
        let shift = |k: u16, d: i32| {
            let v = k as i32 + d;
            if v < 0 || v > u16::MAX as i32 {
                None
            } else {
                Some(v as u16)
            }
        };
        Some(GridKey::new(shift(self.x, dx)?, shift(self.y, dy)?, shift(self.z, dz)?))
    }
}

/// Vertex of the 2D (x, y) projection of a grid key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlanarVertex(pub u64);

/// Vertex of a full 3D grid key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpatialVertex(pub u64);

/// Vertex of a planning state (x, y, yaw)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateVertex(pub u64);

/// Robot-relative scan box with its own grid resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchArea {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub min_z: f64,
    pub max_z: f64,
    pub resolution: f64,
}

impl SearchArea {
    pub fn new(
        min_x: f64,
        max_x: f64,
        min_y: f64,
        max_y: f64,
        min_z: f64,
        max_z: f64,
        resolution: f64,
    ) -> Self {
        Self { min_x, max_x, min_y, max_y, min_z, max_z, resolution }
    }

    /// Area scanned when nothing else was registered
    pub fn default_terrain_area() -> Self {
        Self::new(1.5, 4.0, -1.25, 1.25, -0.8, -0.2, 0.04)
    }

    /// World samples of this box placed at `pose` and rotated by its yaw.
    ///
    /// `inclusive` keeps samples landing exactly on the max boundary.
    pub fn rasterize(&self, pose: &Pose2D, inclusive: bool) -> Vec<Point2D> {
        let xs = axis_samples(self.min_x + pose.x, self.max_x + pose.x, self.resolution, inclusive);
        let ys = axis_samples(self.min_y + pose.y, self.max_y + pose.y, self.resolution, inclusive);

        let mut samples = Vec::with_capacity(xs.len() * ys.len());
        for &y in &ys {
            for &x in &xs {
                samples.push(pose.rotate_about(x, y));
            }
        }
        samples
    }
}

fn axis_samples(min: f64, max: f64, step: f64, inclusive: bool) -> Vec<f64> {
    if step <= 0.0 || max < min {
        return Vec::new();
    }
    let eps = step * 1e-9;
    (0..)
        .map(|i| min + i as f64 * step)
        .take_while(|&v| if inclusive { v <= max + eps } else { v < max - eps })
        .collect()
}

/// Voxel offset window sampled around a height-map cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighboringArea {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
    pub min_z: i32,
    pub max_z: i32,
}

impl NeighboringArea {
    pub fn new(min_x: i32, max_x: i32, min_y: i32, max_y: i32, min_z: i32, max_z: i32) -> Self {
        Self { min_x, max_x, min_y, max_y, min_z, max_z }
    }

    /// All offsets of the window except the centre voxel
    pub fn offsets(&self) -> impl Iterator<Item = (i32, i32, i32)> + '_ {
        itertools::iproduct!(self.min_z..=self.max_z, self.min_y..=self.max_y, self.min_x..=self.max_x)
            .map(|(dz, dy, dx)| (dx, dy, dz))
            .filter(|&offset| offset != (0, 0, 0))
    }
}

impl Default for NeighboringArea {
    fn default() -> Self {
        Self::new(-2, 2, -2, 2, -2, 2)
    }
}

/// Persisted terrain data of one height-map cell
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainCell {
    pub key: GridKey,
    /// Edge length of the cell [m]
    pub size: f64,
    pub cost: f64,
    pub height: f64,
    pub normal: Option<Vector3<f64>>,
    pub curvature: Option<f64>,
}

impl TerrainCell {
    pub fn new(key: GridKey, size: f64, cost: f64, height: f64) -> Self {
        Self { key, size, cost, height, normal: None, curvature: None }
    }

    pub fn with_geometry(mut self, normal: Vector3<f64>, curvature: f64) -> Self {
        self.normal = Some(normal);
        self.curvature = Some(curvature);
        self
    }
}

/// Vertex -> surface height
pub type HeightMap = BTreeMap<PlanarVertex, f64>;

/// Vertex -> terrain cell
pub type TerrainMap = BTreeMap<PlanarVertex, TerrainCell>;

/// Vertex -> terrain cost
pub type CostMap = BTreeMap<PlanarVertex, f64>;

/// Candidate motion produced by a motion primitive generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Action {
    pub pose: Pose2D,
    pub cost: f64,
}

impl Action {
    pub fn new(pose: Pose2D, cost: f64) -> Self {
        Self { pose, cost }
    }
}

/// Weighted directed edge handed to the graph search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub vertex: StateVertex,
    pub cost: f64,
}

impl Edge {
    pub fn new(vertex: StateVertex, cost: f64) -> Self {
        Self { vertex, cost }
    }
}
