//! Lattice-based body adjacency
//!
//! Successor generator for a graph search over body states (x, y, yaw). The
//! candidate motions come from a motion primitive generator; every candidate
//! becomes one weighted edge, costed from the terrain map either directly at
//! the body position or by averaging the cheapest cells under each stance area.

use itertools::Itertools;
use log::{error, warn};
use ordered_float::OrderedFloat;

use crate::common::traits::{MotionPrimitiveGenerator, RobotModel, TerrainEnvironment};
use crate::common::types::*;

/// Configuration for the lattice adjacency
#[derive(Debug, Clone)]
pub struct LatticeAdjacencyConfig {
    /// Cost edges from the stance areas instead of the body cell
    pub stance_adjacency: bool,
    /// Number of cheapest cells averaged per stance area
    pub number_top_reward: usize,
    /// Multiplier of the average terrain cost charged for unmapped cells
    pub uncertainty_factor: f64,
    /// Weight of the intrinsic primitive cost added to each edge
    pub action_cost_weight: f64,
}

impl Default for LatticeAdjacencyConfig {
    fn default() -> Self {
        Self {
            stance_adjacency: true,
            number_top_reward: 5,
            uncertainty_factor: 1.15,
            action_cost_weight: 0.0,
        }
    }
}

pub struct LatticeBodyAdjacency<G> {
    config: LatticeAdjacencyConfig,
    behavior: G,
    stance_areas: Vec<SearchArea>,
}

impl<G: MotionPrimitiveGenerator> LatticeBodyAdjacency<G> {
    pub fn new(config: LatticeAdjacencyConfig, behavior: G, robot: &dyn RobotModel) -> Self {
        Self {
            config,
            behavior,
            stance_areas: robot.stance_areas().to_vec(),
        }
    }

    pub fn config(&self) -> &LatticeAdjacencyConfig {
        &self.config
    }

    pub fn is_stance_adjacency(&self) -> bool {
        self.config.stance_adjacency
    }

    pub fn stance_areas(&self) -> &[SearchArea] {
        &self.stance_areas
    }

    /// Weighted successors of `state_vertex`, in primitive order.
    ///
    /// Returns no successor when the terrain has never been computed.
    pub fn get_successors<E>(&self, environment: &E, state_vertex: StateVertex) -> Vec<Edge>
    where
        E: TerrainEnvironment + ?Sized,
    {
        if !environment.is_terrain_information() {
            error!("Could not compute the successors because there is no terrain information");
            return Vec::new();
        }

        let space = environment.space_discretization();
        let current_pose = space.vertex_to_state(state_vertex);
        let actions = self.behavior.generate_actions(&current_pose);

        let cost_map = environment.terrain_cost_map();
        let unknown_cost = self.unknown_terrain_cost(environment);

        actions
            .iter()
            .map(|action| {
                let action_vertex = space.state_to_vertex(&action.pose);
                let terrain_cost = if self.config.stance_adjacency {
                    let body_state = space.vertex_to_state(action_vertex);
                    self.compute_body_cost(environment, &cost_map, &body_state, unknown_cost)
                } else {
                    let environment_vertex = space.state_vertex_to_environment_vertex(action_vertex);
                    cost_map.get(&environment_vertex).copied().unwrap_or(unknown_cost)
                };
                Edge::new(action_vertex, terrain_cost + self.config.action_cost_weight * action.cost)
            })
            .collect()
    }

    /// Mean of the stance costs of every stance area placed at `pose`
    pub fn compute_body_cost<E>(&self, environment: &E, cost_map: &CostMap, pose: &Pose2D, unknown_cost: f64) -> f64
    where
        E: TerrainEnvironment + ?Sized,
    {
        if self.stance_areas.is_empty() {
            warn!("No stance areas defined, charging the uncertainty cost");
            return unknown_cost;
        }

        let total: f64 = self
            .stance_areas
            .iter()
            .map(|area| self.compute_stance_cost(environment, cost_map, area, pose, unknown_cost))
            .sum();
        total / self.stance_areas.len() as f64
    }

    /// Mean of the `number_top_reward` cheapest mapped cells inside `area`.
    ///
    /// Falls back to `unknown_cost` when no cell of the area is mapped.
    pub fn compute_stance_cost<E>(
        &self,
        environment: &E,
        cost_map: &CostMap,
        area: &SearchArea,
        pose: &Pose2D,
        unknown_cost: f64,
    ) -> f64
    where
        E: TerrainEnvironment + ?Sized,
    {
        let space = environment.space_discretization();
        let cells: Vec<OrderedFloat<f64>> = area
            .rasterize(pose, false)
            .iter()
            .map(|point| space.coord_to_planar_vertex(point))
            .unique()
            .filter_map(|vertex| cost_map.get(&vertex).copied().map(OrderedFloat))
            .collect();

        let best: Vec<f64> = cells
            .into_iter()
            .k_smallest(self.config.number_top_reward)
            .map(|cost| cost.into_inner())
            .collect();

        if best.is_empty() {
            unknown_cost
        } else {
            best.iter().sum::<f64>() / best.len() as f64
        }
    }

    /// Conservative cost of a cell without terrain information
    pub fn unknown_terrain_cost<E>(&self, environment: &E) -> f64
    where
        E: TerrainEnvironment + ?Sized,
    {
        self.config.uncertainty_factor * environment.average_terrain_cost()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_planning::motion_primitives::{BodyMotionPrimitives, MotionPrimitive};
    use crate::path_planning::robot::RobotGeometry;
    use crate::utils::SpaceDiscretization;

    struct SyntheticTerrain {
        space: SpaceDiscretization,
        costs: CostMap,
        average: f64,
        computed: bool,
    }

    impl SyntheticTerrain {
        fn new(average: f64) -> Self {
            Self {
                space: SpaceDiscretization::new(0.1, 0.1).unwrap(),
                costs: CostMap::new(),
                average,
                computed: true,
            }
        }

        fn set_cost(&mut self, x: f64, y: f64, cost: f64) {
            let vertex = self.space.coord_to_planar_vertex(&Point2D::new(x, y));
            self.costs.insert(vertex, cost);
        }
    }

    impl TerrainEnvironment for SyntheticTerrain {
        fn is_terrain_information(&self) -> bool {
            self.computed
        }

        fn space_discretization(&self) -> &SpaceDiscretization {
            &self.space
        }

        fn terrain_cost_map(&self) -> CostMap {
            self.costs.clone()
        }

        fn average_terrain_cost(&self) -> f64 {
            self.average
        }
    }

    /// One stance area of 10 x 1 cells in front of the body
    fn strip() -> SearchArea {
        SearchArea::new(0.05, 1.05, 0.05, 0.15, -1.0, 1.0, 0.1)
    }

    fn adjacency(config: LatticeAdjacencyConfig) -> LatticeBodyAdjacency<BodyMotionPrimitives> {
        let robot = RobotGeometry::new(vec![strip()], vec![strip()]);
        LatticeBodyAdjacency::new(config, BodyMotionPrimitives::with_defaults(), &robot)
    }

    #[test]
    fn test_stance_cost_averages_five_cheapest() {
        let mut terrain = SyntheticTerrain::new(2.0);
        let costs = [9.0, 3.0, 7.0, 1.0, 8.0, 2.0, 10.0, 4.0, 6.0, 5.0];
        for (i, cost) in costs.iter().enumerate() {
            terrain.set_cost(0.05 + 0.1 * i as f64, 0.05, *cost);
        }
        let adjacency = adjacency(LatticeAdjacencyConfig::default());
        let cost_map = terrain.terrain_cost_map();
        let unknown = adjacency.unknown_terrain_cost(&terrain);

        let cost = adjacency.compute_stance_cost(&terrain, &cost_map, &strip(), &Pose2D::origin(), unknown);
        assert!((cost - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_stance_cost_follows_heading() {
        let mut terrain = SyntheticTerrain::new(2.0);
        let costs = [9.0, 3.0, 7.0, 1.0, 8.0, 2.0, 10.0, 4.0, 6.0, 5.0];
        for (i, cost) in costs.iter().enumerate() {
            // Facing +y, the strip lies along +y just left of the body
            terrain.set_cost(-0.05, 0.05 + 0.1 * i as f64, *cost);
            // Cells under the unrotated strip must be ignored
            terrain.set_cost(0.05 + 0.1 * i as f64, 0.05, 0.0);
        }
        let adjacency = adjacency(LatticeAdjacencyConfig::default());
        let cost_map = terrain.terrain_cost_map();
        let facing_left = Pose2D::new(0.0, 0.0, std::f64::consts::FRAC_PI_2);

        let cost = adjacency.compute_stance_cost(&terrain, &cost_map, &strip(), &facing_left, 99.0);
        assert!((cost - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_stance_cost_with_few_cells() {
        let mut terrain = SyntheticTerrain::new(2.0);
        terrain.set_cost(0.25, 0.05, 1.0);
        terrain.set_cost(0.65, 0.05, 4.0);
        let adjacency = adjacency(LatticeAdjacencyConfig::default());
        let cost_map = terrain.terrain_cost_map();

        let cost = adjacency.compute_stance_cost(&terrain, &cost_map, &strip(), &Pose2D::origin(), 99.0);
        assert!((cost - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_stance_cost_without_cells() {
        let terrain = SyntheticTerrain::new(2.0);
        let adjacency = adjacency(LatticeAdjacencyConfig::default());
        let cost_map = terrain.terrain_cost_map();
        let unknown = adjacency.unknown_terrain_cost(&terrain);
        assert!((unknown - 2.3).abs() < 1e-10);

        let cost = adjacency.compute_stance_cost(&terrain, &cost_map, &strip(), &Pose2D::origin(), unknown);
        assert!((cost - 2.3).abs() < 1e-10);
    }

    #[test]
    fn test_body_cost_averages_stance_areas() {
        let mut terrain = SyntheticTerrain::new(0.0);
        let left = SearchArea::new(0.05, 0.15, 0.05, 0.15, -1.0, 1.0, 0.1);
        let right = SearchArea::new(0.05, 0.15, -0.15, -0.05, -1.0, 1.0, 0.1);
        terrain.set_cost(0.05, 0.05, 2.0);
        terrain.set_cost(0.05, -0.15, 4.0);
        let robot = RobotGeometry::new(vec![], vec![left, right]);
        let adjacency =
            LatticeBodyAdjacency::new(LatticeAdjacencyConfig::default(), BodyMotionPrimitives::with_defaults(), &robot);

        let cost_map = terrain.terrain_cost_map();
        let cost = adjacency.compute_body_cost(&terrain, &cost_map, &Pose2D::origin(), 0.0);
        assert!((cost - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_direct_mode_missing_cell_fallback() {
        let mut terrain = SyntheticTerrain::new(2.0);
        let config = LatticeAdjacencyConfig {
            stance_adjacency: false,
            ..LatticeAdjacencyConfig::default()
        };
        let primitives = BodyMotionPrimitives::new(vec![
            MotionPrimitive::new(0.2, 0.0, 0.0, 1.0),
            MotionPrimitive::new(0.0, 0.2, 0.0, 1.0),
        ]);
        let robot = RobotGeometry::new(vec![], vec![strip()]);
        let adjacency = LatticeBodyAdjacency::new(config, primitives, &robot);

        let start = terrain.space.state_to_vertex(&Pose2D::new(0.05, 0.05, 0.0));
        let start_pose = terrain.space.vertex_to_state(start);
        terrain.set_cost(start_pose.x + 0.2, start_pose.y, 0.7);

        let edges = adjacency.get_successors(&terrain, start);
        assert_eq!(edges.len(), 2);
        assert!((edges[0].cost - 0.7).abs() < 1e-10);
        assert!((edges[1].cost - 2.3).abs() < 1e-10);
    }

    #[test]
    fn test_edges_follow_primitive_order() {
        let terrain = SyntheticTerrain::new(1.0);
        let adjacency = adjacency(LatticeAdjacencyConfig::default());
        let start_pose = Pose2D::new(0.05, 0.05, 0.0);
        let start = terrain.space.state_to_vertex(&start_pose);

        let edges = adjacency.get_successors(&terrain, start);
        let decoded = terrain.space.vertex_to_state(start);
        let expected: Vec<StateVertex> = BodyMotionPrimitives::with_defaults()
            .generate_actions(&decoded)
            .iter()
            .map(|action| terrain.space.state_to_vertex(&action.pose))
            .collect();
        let vertices: Vec<StateVertex> = edges.iter().map(|edge| edge.vertex).collect();
        assert_eq!(vertices, expected);
    }

    #[test]
    fn test_action_cost_weight() {
        let terrain = SyntheticTerrain::new(1.0);
        let config = LatticeAdjacencyConfig {
            action_cost_weight: 2.0,
            ..LatticeAdjacencyConfig::default()
        };
        let primitives = BodyMotionPrimitives::new(vec![MotionPrimitive::new(0.1, 0.0, 0.0, 0.5)]);
        let robot = RobotGeometry::new(vec![], vec![strip()]);
        let adjacency = LatticeBodyAdjacency::new(config, primitives, &robot);

        let start = terrain.space.state_to_vertex(&Pose2D::origin());
        let edges = adjacency.get_successors(&terrain, start);
        // unmapped stance area: 1.15 * 1.0, plus 2.0 * 0.5
        assert!((edges[0].cost - 2.15).abs() < 1e-10);
    }

    #[test]
    fn test_no_successors_without_terrain() {
        let mut terrain = SyntheticTerrain::new(1.0);
        terrain.computed = false;
        let adjacency = adjacency(LatticeAdjacencyConfig::default());
        let start = terrain.space.state_to_vertex(&Pose2D::origin());
        assert!(adjacency.get_successors(&terrain, start).is_empty());
    }

    #[test]
    fn test_successors_over_mapped_ground() {
        use crate::common::types::RobotState;
        use crate::mapping::features::test_utils::ConstantFeature;
        use crate::mapping::TerrainMapping;
        use crate::utils::VoxelGrid;

        let mut grid = VoxelGrid::new(0.1).unwrap();
        grid.add_ground_patch(-0.95, 0.95, -0.95, 0.95, 0.05).unwrap();
        let mut mapping = TerrainMapping::with_defaults();
        mapping
            .add_search_area(SearchArea::new(-0.45, 0.45, -0.45, 0.45, -0.5, 0.5, 0.1))
            .unwrap();
        mapping.add_feature(Box::new(ConstantFeature::new("flat", 1.0, 2.0)));
        mapping.compute(&grid, &RobotState::new(0.0, 0.0, 0.0, 0.0)).unwrap();

        let primitives = || {
            BodyMotionPrimitives::new(vec![
                MotionPrimitive::new(0.1, 0.0, 0.0, 1.0),
                MotionPrimitive::new(2.0, 0.0, 0.0, 1.0),
            ])
        };
        let footprint = SearchArea::new(-0.02, 0.02, -0.02, 0.02, -1.0, 1.0, 0.1);
        let robot = RobotGeometry::new(vec![], vec![footprint]);
        let start = mapping.space_discretization().state_to_vertex(&Pose2D::new(0.05, 0.05, 0.0));

        let direct = LatticeBodyAdjacency::new(
            LatticeAdjacencyConfig {
                stance_adjacency: false,
                ..LatticeAdjacencyConfig::default()
            },
            primitives(),
            &robot,
        );
        let edges = direct.get_successors(&mapping, start);
        assert_eq!(edges.len(), 2);
        assert!((edges[0].cost - 2.0).abs() < 1e-10);
        assert!((edges[1].cost - 2.3).abs() < 1e-10);

        let stance = LatticeBodyAdjacency::new(LatticeAdjacencyConfig::default(), primitives(), &robot);
        let edges = stance.get_successors(&mapping, start);
        assert!((edges[0].cost - 2.0).abs() < 1e-10);
        assert!((edges[1].cost - 2.3).abs() < 1e-10);
    }
}
