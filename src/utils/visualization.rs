//! Visualization utilities for terrain_lattice
//!
//! Renders terrain maps, robot poses and lattice successors with gnuplot.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::error::{TerrainError, TerrainResult};
use crate::common::types::{Edge, HeightMap, Point2D, Pose2D, TerrainMap};
use crate::utils::SpaceDiscretization;

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const GREEN: &str = "#00FF00";
    pub const BLUE: &str = "#0000FF";
    pub const CYAN: &str = "#00FFFF";
    pub const ORANGE: &str = "#FFA500";
    pub const GRAY: &str = "#808080";

    // Semantic colors
    pub const LOW_COST: &str = GREEN;
    pub const MEDIUM_COST: &str = ORANGE;
    pub const HIGH_COST: &str = RED;
    pub const UNSCORED: &str = GRAY;
    pub const ROBOT: &str = CYAN;
    pub const SUCCESSOR: &str = BLUE;
}

/// Style for point rendering
#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.0,
            symbol: 'O',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_symbol(mut self, symbol: char) -> Self {
        self.symbol = symbol;
        self
    }
}

/// Terrain cells split by cost
#[derive(Debug, Clone, Default)]
pub struct CostBands {
    pub low: Vec<Point2D>,
    pub medium: Vec<Point2D>,
    pub high: Vec<Point2D>,
    /// Height-map cells without a terrain cell
    pub unscored: Vec<Point2D>,
}

impl CostBands {
    /// Sort every height-map cell into a band; `low_max` and `medium_max` are
    /// the upper cost bounds of the first two bands.
    pub fn classify(
        height_map: &HeightMap,
        terrain_map: &TerrainMap,
        space: &SpaceDiscretization,
        low_max: f64,
        medium_max: f64,
    ) -> Self {
        let mut bands = CostBands::default();
        for vertex in height_map.keys() {
            let point = space.planar_vertex_to_coord(*vertex);
            match terrain_map.get(vertex) {
                Some(cell) if cell.cost <= low_max => bands.low.push(point),
                Some(cell) if cell.cost <= medium_max => bands.medium.push(point),
                Some(_) => bands.high.push(point),
                None => bands.unscored.push(point),
            }
        }
        bands
    }
}

/// Main visualizer struct
pub struct Visualizer {
    figure: Figure,
    title: String,
    x_label: String,
    y_label: String,
    aspect_ratio: f64,
}

impl Visualizer {
    pub fn new() -> Self {
        Self {
            figure: Figure::new(),
            title: String::new(),
            x_label: "X [m]".to_string(),
            y_label: "Y [m]".to_string(),
            aspect_ratio: 1.0,
        }
    }

    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    pub fn plot_points(&mut self, points: &[Point2D], style: &PointStyle) -> &mut Self {
        if points.is_empty() {
            return self;
        }
        let x: Vec<f64> = points.iter().map(|p| p.x).collect();
        let y: Vec<f64> = points.iter().map(|p| p.y).collect();

        self.figure.axes2d().points(
            &x,
            &y,
            &[
                Caption(&style.caption),
                Color(&style.color),
                PointSymbol(style.symbol),
                PointSize(style.size),
            ],
        );
        self
    }

    /// Plot terrain cells colored by cost band
    pub fn plot_cost_bands(&mut self, bands: &CostBands) -> &mut Self {
        self.plot_points(&bands.unscored, &PointStyle::new(colors::UNSCORED, "Unscored").with_symbol('S').with_size(0.5))
            .plot_points(&bands.low, &PointStyle::new(colors::LOW_COST, "Low cost").with_symbol('S').with_size(0.5))
            .plot_points(&bands.medium, &PointStyle::new(colors::MEDIUM_COST, "Medium cost").with_symbol('S').with_size(0.5))
            .plot_points(&bands.high, &PointStyle::new(colors::HIGH_COST, "High cost").with_symbol('S').with_size(0.5))
    }

    /// Plot the target positions of lattice successors
    pub fn plot_successors(&mut self, edges: &[Edge], space: &SpaceDiscretization) -> &mut Self {
        let targets: Vec<Point2D> = edges.iter().map(|e| space.vertex_to_state(e.vertex).position()).collect();
        self.plot_points(&targets, &PointStyle::new(colors::SUCCESSOR, "Successors").with_symbol('x'))
    }

    /// Plot robot pose with direction indicator
    pub fn plot_robot(&mut self, pose: &Pose2D, size: f64) -> &mut Self {
        self.figure.axes2d().points(
            &[pose.x],
            &[pose.y],
            &[Caption("Robot"), Color(colors::ROBOT), PointSymbol('O'), PointSize(size)],
        );

        let arrow_len = size * 0.2;
        let end_x = pose.x + arrow_len * pose.yaw.cos();
        let end_y = pose.y + arrow_len * pose.yaw.sin();
        self.figure
            .axes2d()
            .lines(&[pose.x, end_x], &[pose.y, end_y], &[Color(colors::ROBOT), LineWidth(2.0)]);
        self
    }

    pub fn save_svg(&mut self, path: &str) -> TerrainResult<()> {
        self.apply_settings();
        self.figure
            .save_to_svg(path, 800, 600)
            .map_err(|e| TerrainError::VisualizationError(e.to_string()))
    }

    fn apply_settings(&mut self) {
        let axes = self.figure.axes2d();

        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label(&self.x_label, &[]);
        axes.set_y_label(&self.y_label, &[]);

        axes.set_aspect_ratio(AutoOption::Fix(self.aspect_ratio));
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}
