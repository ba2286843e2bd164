//! Connectivity matrix derivation

use ndarray::{Array1, Array2, Axis, Zip};

use crate::config::Config;
use crate::error::{NetworkError, Result};
use crate::network::matrix::ensure_finite;

/// Thresholded copy of an adjacency matrix with derived degree data.
///
/// The diagonal is always zero. Recomputed whenever threshold parameters
/// change; never persisted independently of the adjacency matrix.
#[derive(Debug, Clone)]
pub struct ConnectivityMatrix {
    /// Connectivity values
    pub matrix: Array2<f64>,

    /// Per-node sums of connectivity rows
    pub degrees: Array1<f64>,

    /// Total edge weight m = half the degree sum
    pub num_edges: f64,
}

/// Derive a connectivity matrix from an adjacency matrix.
///
/// Zeroes the diagonal; when thresholding is enabled, entries whose value
/// (absolute value if `threshold_absolute`) is at or below the threshold
/// are zeroed and survivors are optionally binarized to 1.0. The degree
/// vector and edge count are always recomputed from the result.
pub fn build_connectivity(adjacency: &Array2<f64>, config: &Config) -> Result<ConnectivityMatrix> {
    let (rows, cols) = adjacency.dim();
    if rows == 0 || cols == 0 {
        return Err(NetworkError::EmptyMatrix);
    }
    if rows != cols {
        return Err(NetworkError::NonSquare { rows, cols });
    }

    let mut matrix = adjacency.clone();
    matrix.diag_mut().fill(0.0);

    if config.use_threshold {
        let threshold = config.connectivity_threshold;
        let absolute = config.threshold_absolute;
        let binary = config.binary_threshold;
        // elementwise and order-independent, safe to run data-parallel
        Zip::from(&mut matrix).par_for_each(|value| {
            let edge = if absolute { value.abs() } else { *value };
            if edge <= threshold {
                *value = 0.0;
            } else if binary {
                *value = 1.0;
            }
        });
    }

    ensure_finite(&matrix, "connectivity thresholding")?;

    let degrees = matrix.sum_axis(Axis(0));
    let num_edges = 0.5 * degrees.sum();

    Ok(ConnectivityMatrix {
        matrix,
        degrees,
        num_edges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn zeroes_diagonal_and_counts_edges() {
        let adjacency = array![[5.0, 1.0, 0.0], [1.0, 5.0, 1.0], [0.0, 1.0, 5.0]];
        let config = Config::default();
        let connectivity = build_connectivity(&adjacency, &config).unwrap();
        assert_eq!(connectivity.matrix[[0, 0]], 0.0);
        assert_eq!(connectivity.matrix[[1, 1]], 0.0);
        assert_eq!(connectivity.degrees[[1]], 2.0);
        assert!((connectivity.num_edges - 2.0).abs() < 1e-12);
    }

    #[test]
    fn binary_threshold_keeps_strong_edges_only() {
        let adjacency = array![
            [0.0, 0.2, -0.8],
            [0.2, 0.0, 0.3],
            [-0.8, 0.3, 0.0]
        ];
        let mut config = Config::default();
        config.use_threshold = true;
        config.connectivity_threshold = 0.25;
        config.threshold_absolute = true;
        config.binary_threshold = true;
        let connectivity = build_connectivity(&adjacency, &config).unwrap();
        assert_eq!(connectivity.matrix[[0, 1]], 0.0);
        assert_eq!(connectivity.matrix[[0, 2]], 1.0);
        assert_eq!(connectivity.matrix[[1, 2]], 1.0);
        assert!((connectivity.num_edges - 2.0).abs() < 1e-12);
    }

    #[test]
    fn signed_threshold_drops_negative_edges() {
        let adjacency = array![
            [0.0, 0.2, -0.8],
            [0.2, 0.0, 0.3],
            [-0.8, 0.3, 0.0]
        ];
        let mut config = Config::default();
        config.use_threshold = true;
        config.connectivity_threshold = 0.25;
        config.threshold_absolute = false;
        config.binary_threshold = false;
        let connectivity = build_connectivity(&adjacency, &config).unwrap();
        // -0.8 <= 0.25 without the absolute-value comparison
        assert_eq!(connectivity.matrix[[0, 2]], 0.0);
        // surviving weights are kept, not binarized
        assert_eq!(connectivity.matrix[[1, 2]], 0.3);
    }

    #[test]
    fn rejects_non_square() {
        let adjacency = Array2::zeros((2, 3));
        let result = build_connectivity(&adjacency, &Config::default());
        assert!(matches!(result, Err(NetworkError::NonSquare { .. })));
    }

    #[test]
    fn rejects_empty() {
        let adjacency = Array2::zeros((0, 0));
        let result = build_connectivity(&adjacency, &Config::default());
        assert!(matches!(result, Err(NetworkError::EmptyMatrix)));
    }
}
