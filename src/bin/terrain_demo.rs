// Terrain mapping and lattice expansion demo
//
// Builds a rough synthetic terrain with a step, maps it while the robot walks
// forward, and expands the lattice successors of the final pose.

use nalgebra::Vector3;
use rand_distr::{Distribution, Normal};

use terrain_lattice::mapping::{LegPotentialCollisionFeature, SlopeFeature};
use terrain_lattice::path_planning::{BodyMotionPrimitives, RobotGeometry};
use terrain_lattice::utils::{CostBands, Visualizer};
use terrain_lattice::{
    LatticeAdjacencyConfig, LatticeBodyAdjacency, RobotState, SearchArea, TerrainEnvironment, TerrainError,
    TerrainMapping, TerrainResult, VoxelGrid,
};

const RESOLUTION: f64 = 0.04; // [m]
const SHOW_ANIMATION: bool = true;

fn build_terrain() -> TerrainResult<VoxelGrid> {
    let mut grid = VoxelGrid::new(RESOLUTION)?;
    let noise = Normal::new(0.0, 0.01).map_err(|e| TerrainError::InvalidParameter(e.to_string()))?;
    let mut rng = rand::thread_rng();

    // Gentle rolling ground with a 0.15 m step beyond x = 2.5
    let heights: Vec<(f64, f64, f64)> = {
        let mut cells = Vec::new();
        let n = (6.0 / RESOLUTION) as i32;
        for iy in -n / 2..n / 2 {
            for ix in -10..n {
                let x = (ix as f64 + 0.5) * RESOLUTION;
                let y = (iy as f64 + 0.5) * RESOLUTION;
                let step = if x > 2.5 { 0.15 } else { 0.0 };
                let z = 0.05 * (x * 1.5).sin() + step + noise.sample(&mut rng) - 0.5;
                cells.push((x, y, z));
            }
        }
        cells
    };
    for (x, y, z) in heights {
        grid.mark_occupied(&Vector3::new(x, y, z))?;
    }
    Ok(grid)
}

fn main() -> TerrainResult<()> {
    env_logger::init();
    println!("Terrain lattice demo start!!");

    let grid = build_terrain()?;
    println!("Occupancy grid with {} voxels", grid.len());

    let robot = RobotGeometry::quadruped();
    let mut mapping = TerrainMapping::with_defaults();
    mapping.add_search_area(SearchArea::new(-0.75, 2.0, -0.75, 0.75, -0.8, -0.2, RESOLUTION))?;
    mapping.set_interest_region(2.0, 3.0)?;
    mapping.add_feature(Box::new(SlopeFeature::with_defaults()));
    mapping.add_feature(Box::new(LegPotentialCollisionFeature::new(&robot)));

    let mut state = RobotState::new(0.0, 0.0, 0.0, 0.0);
    for _ in 0..5 {
        mapping.compute(&grid, &state)?;
        println!(
            "Robot at ({:.2}, {:.2}): {} height cells, {} terrain cells, average cost {:.3}",
            state.x,
            state.y,
            mapping.height_map().len(),
            mapping.terrain_map().len(),
            mapping.average_terrain_cost()
        );
        state.x += 0.3;
    }

    let adjacency = LatticeBodyAdjacency::new(
        LatticeAdjacencyConfig::default(),
        BodyMotionPrimitives::with_defaults(),
        &robot,
    );
    let space = mapping.space_discretization().clone();
    let start = space.state_to_vertex(&state.pose());
    let successors = adjacency.get_successors(&mapping, start);
    for edge in &successors {
        let pose = space.vertex_to_state(edge.vertex);
        println!(
            "  successor ({:.2}, {:.2}, {:.2} rad) cost {:.3}",
            pose.x, pose.y, pose.yaw, edge.cost
        );
    }

    if SHOW_ANIMATION {
        let bands = CostBands::classify(mapping.height_map(), mapping.terrain_map(), &space, 0.5, 2.0);
        let mut vis = Visualizer::new();
        vis.set_title("Terrain cost map")
            .plot_cost_bands(&bands)
            .plot_robot(&state.pose(), 1.5)
            .plot_successors(&successors, &space);
        let crate_dir = option_env!("CARGO_MANIFEST_DIR").unwrap_or(".");
        let img_dir = format!("{}/img", crate_dir);
        std::fs::create_dir_all(&img_dir).map_err(|e| TerrainError::VisualizationError(e.to_string()))?;
        let path = format!("{}/terrain_demo.svg", img_dir);
        vis.save_svg(&path)?;
        println!("Plot saved to {}", path);
    }

    println!("Terrain lattice demo finish!!");
    Ok(())
}
