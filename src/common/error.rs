//! Error types for terrain_lattice

use thiserror::Error;

/// Main error type for terrain mapping and lattice expansion
#[derive(Debug, Error)]
pub enum TerrainError {
    /// A sample fell outside the representable range of a grid
    #[error("Coordinate out of bounds: ({x:.3}, {y:.3}, {z:.3})")]
    OutOfBounds { x: f64, y: f64, z: f64 },
    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Visualization error
    #[error("Visualization error: {0}")]
    VisualizationError(String),
}

impl TerrainError {
    pub fn out_of_bounds(x: f64, y: f64, z: f64) -> Self {
        TerrainError::OutOfBounds { x, y, z }
    }
}

/// Result type alias for terrain operations
pub type TerrainResult<T> = Result<T, TerrainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TerrainError::InvalidParameter("resolution must be positive".to_string());
        assert_eq!(format!("{}", err), "Invalid parameter: resolution must be positive");
    }

    #[test]
    fn test_out_of_bounds_display() {
        let err = TerrainError::out_of_bounds(1.0, -2.5, 0.25);
        assert_eq!(format!("{}", err), "Coordinate out of bounds: (1.000, -2.500, 0.250)");
    }
}
