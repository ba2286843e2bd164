//! Network deconvolution via eigenvalue rescaling
//!
//! Separates direct edge weights from correlation induced by indirect
//! (multi-hop) paths. Independent of the partitioning pipeline: consumes a
//! raw adjacency matrix and produces a deconvolved matrix of the same
//! shape, rescaled to [0, 1].

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::Array2;
use statrs::statistics::{Data, OrderStatistics};

use crate::error::{NetworkError, Result};
use crate::network::matrix::ensure_finite;

/// Remove indirect-path contamination from an adjacency matrix.
///
/// `alpha` in (0, 1] is the fraction of strongest edges kept by the
/// quantile threshold; `beta` in (0, 1) bounds the spectral radius of the
/// reconstructed direct-dependency matrix; `control` selects the output
/// mode: 0 preserves original scaled values on non-edges, 1 shifts all
/// reconstructed values to be non-negative. Parameters are validated
/// before any computation.
pub fn deconvolve(
    adjacency: &Array2<f64>,
    alpha: f64,
    beta: f64,
    control: u8,
) -> Result<Array2<f64>> {
    if !(alpha > 0.0 && alpha <= 1.0) {
        return Err(NetworkError::InvalidParameter {
            name: "alpha",
            message: format!("{} must be in (0, 1]", alpha),
        });
    }
    if !(beta > 0.0 && beta < 1.0) {
        return Err(NetworkError::InvalidParameter {
            name: "beta",
            message: format!("{} must be in (0, 1)", beta),
        });
    }
    if control > 1 {
        return Err(NetworkError::InvalidParameter {
            name: "control",
            message: format!("{} must be 0 or 1", control),
        });
    }

    let (rows, cols) = adjacency.dim();
    if rows == 0 || cols == 0 {
        return Err(NetworkError::EmptyMatrix);
    }
    if rows != cols {
        return Err(NetworkError::NonSquare { rows, cols });
    }
    let n = rows;
    if n < 2 {
        return Err(NetworkError::InvalidParameter {
            name: "adjacency",
            message: "matrix must have at least two nodes".to_string(),
        });
    }

    // linear mapping to [0, 1]
    let lowest = adjacency.fold(f64::INFINITY, |acc, &value| acc.min(value));
    let highest = adjacency.fold(f64::NEG_INFINITY, |acc, &value| acc.max(value));
    let range = highest - lowest;
    if range == 0.0 {
        return Err(NetworkError::InvalidParameter {
            name: "adjacency",
            message: "matrix is constant and cannot be rescaled".to_string(),
        });
    }
    let mut scaled = adjacency.mapv(|value| (value - lowest) / range);
    scaled.diag_mut().fill(0.0);

    // quantile threshold: keep the top alpha-fraction of off-diagonal values
    let mut off_diagonal = Vec::with_capacity(n * (n - 1));
    for i in 0..n {
        for j in 0..n {
            if i != j {
                off_diagonal.push(scaled[[i, j]]);
            }
        }
    }
    let mut samples = Data::new(off_diagonal);
    let cut = samples.quantile(1.0 - alpha);
    log::debug!("deconvolution: quantile threshold {:.6}", cut);

    let mut thresholded = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            if i != j && scaled[[i, j]] >= cut {
                thresholded[[i, j]] = scaled[[i, j]];
            }
        }
    }

    // symmetrize before the eigendecomposition
    let symmetric = {
        let transposed = thresholded.t().to_owned();
        (&thresholded + &transposed).mapv(|value| value / 2.0)
    };

    let eigen = SymmetricEigen::new(DMatrix::from_fn(n, n, |i, j| symmetric[[i, j]]));
    let lam_p = eigen
        .eigenvalues
        .iter()
        .fold(f64::NEG_INFINITY, |acc, &value| acc.max(value))
        .abs();
    let lam_n = eigen
        .eigenvalues
        .iter()
        .fold(f64::INFINITY, |acc, &value| acc.min(value))
        .abs();
    let scale = (lam_p * (1.0 - beta) / beta).max(lam_n * (1.0 + beta) / beta);
    log::debug!(
        "deconvolution: lam_p {:.6}, lam_n {:.6}, scale {:.6}",
        lam_p,
        lam_n,
        scale
    );

    // rescale each eigenvalue and reconstruct; the eigenvector matrix of a
    // real symmetric matrix is orthonormal, so its transpose replaces the
    // general inverse
    let mut rescaled = DMatrix::zeros(n, n);
    for i in 0..n {
        rescaled[(i, i)] = eigen.eigenvalues[i] / (scale + eigen.eigenvalues[i]);
    }
    let reconstructed_na = &eigen.eigenvectors * rescaled * eigen.eigenvectors.transpose();
    let reconstructed = Array2::from_shape_fn((n, n), |(i, j)| reconstructed_na[(i, j)]);

    let shifted = if control == 0 {
        // preserve original scaled values on non-edges and lift edge values
        // above the strongest non-edge
        let mut max_non_edge = f64::NEG_INFINITY;
        for i in 0..n {
            for j in 0..n {
                if symmetric[[i, j]] == 0.0 {
                    max_non_edge = max_non_edge.max(scaled[[i, j]]);
                }
            }
        }
        let min_reconstructed = reconstructed.fold(f64::INFINITY, |acc, &value| acc.min(value));
        let shift = (max_non_edge - min_reconstructed).max(0.0);
        Array2::from_shape_fn((n, n), |(i, j)| {
            if symmetric[[i, j]] > 0.0 {
                reconstructed[[i, j]] + shift
            } else {
                scaled[[i, j]]
            }
        })
    } else {
        let min_reconstructed = reconstructed.fold(f64::INFINITY, |acc, &value| acc.min(value));
        let shift = (-min_reconstructed).max(0.0);
        reconstructed.mapv(|value| value + shift)
    };

    // final linear mapping to [0, 1]
    let out_lowest = shifted.fold(f64::INFINITY, |acc, &value| acc.min(value));
    let out_highest = shifted.fold(f64::NEG_INFINITY, |acc, &value| acc.max(value));
    let out_range = out_highest - out_lowest;
    if out_range == 0.0 {
        return Err(NetworkError::NonFinite {
            operation: "deconvolution rescale",
        });
    }
    let result = shifted.mapv(|value| (value - out_lowest) / out_range);
    ensure_finite(&result, "deconvolution")?;

    Ok(result)
}
