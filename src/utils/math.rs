//! Local surface estimation from point neighbourhoods

use nalgebra::{Matrix3, SymmetricEigen, Vector3};

/// Mean position and 3x3 covariance of a point cloud.
///
/// Returns `None` for an empty cloud. The covariance is normalized by the
/// number of points.
pub fn compute_mean_and_covariance(points: &[Vector3<f64>]) -> Option<(Vector3<f64>, Matrix3<f64>)> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let mean = points.iter().fold(Vector3::<f64>::zeros(), |acc, p| acc + p) / n;

    let mut covariance = Matrix3::<f64>::zeros();
    for p in points {
        let d = p - mean;
        covariance += d * d.transpose();
    }
    covariance /= n;

    Some((mean, covariance))
}

/// Plane fit of a covariance matrix: (unit normal, curvature).
///
/// The normal is the eigenvector of the smallest eigenvalue, flipped to point
/// upwards. Curvature is the smallest eigenvalue over the eigenvalue sum.
pub fn solve_plane_parameters(covariance: &Matrix3<f64>) -> (Vector3<f64>, f64) {
    let eigen = SymmetricEigen::new(*covariance);

    let mut min_index = 0;
    for i in 1..3 {
        if eigen.eigenvalues[i] < eigen.eigenvalues[min_index] {
            min_index = i;
        }
    }

    let mut normal: Vector3<f64> = eigen.eigenvectors.column(min_index).into_owned();
    let norm = normal.norm();
    if norm > 0.0 {
        normal /= norm;
    } else {
        normal = Vector3::z();
    }
    if normal.z < 0.0 {
        normal = -normal;
    }

    let eigen_sum = eigen.eigenvalues.sum();
    let curvature = if eigen_sum.abs() > f64::EPSILON {
        (eigen.eigenvalues[min_index] / eigen_sum).abs()
    } else {
        0.0
    };

    (normal, curvature)
}
