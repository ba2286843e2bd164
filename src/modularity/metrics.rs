//! Partition quality metrics: homophily and recomputed modularity

use serde::Serialize;

use crate::error::{NetworkError, Result};
use crate::modularity::Partition;
use crate::network::connectivity::ConnectivityMatrix;

/// Global and per-module homophily of a partition.
#[derive(Debug, Clone, Serialize)]
pub struct HomophilyResult {
    /// Sum of the per-module values
    pub global: f64,

    /// Size-scaled homophily per module, in module order
    pub per_module: Vec<f64>,
}

/// Score how strongly nodes connect within their modules versus across.
///
/// For each module, the internal weight is the upper-triangular sum of the
/// module submatrix (each internal edge counted once) and the external
/// weight is the full sum of the module-by-complement submatrix. A module
/// with zero internal or zero external weight scores exactly 0 (no
/// homophily signal, not a signed extreme). The per-module value is scaled
/// by module size over total node count; the global value is their sum.
pub fn homophily(
    connectivity: &ConnectivityMatrix,
    partition: &Partition,
) -> Result<HomophilyResult> {
    if partition.is_empty() {
        return Err(NetworkError::EmptyPartition);
    }

    let matrix = &connectivity.matrix;
    let total_nodes = matrix.nrows();
    let mut per_module = Vec::with_capacity(partition.len());
    let mut global = 0.0;

    for (index, module) in partition.modules.iter().enumerate() {
        // complement of the module, drawn from the other modules
        let complement: Vec<usize> = partition
            .modules
            .iter()
            .enumerate()
            .filter(|&(other, _)| other != index)
            .flat_map(|(_, other_module)| other_module.iter().copied())
            .collect();

        let mut internal = 0.0;
        for (position, &i) in module.iter().enumerate() {
            for &j in module.iter().skip(position) {
                internal += matrix[[i, j]];
            }
        }

        let mut external = 0.0;
        for &i in module {
            for &j in &complement {
                external += matrix[[i, j]];
            }
        }

        let score = if internal != 0.0 && external != 0.0 {
            (internal - external) / (internal + external)
        } else {
            0.0
        };
        let local = module.len() as f64 * score / total_nodes as f64;

        per_module.push(local);
        global += local;
    }

    Ok(HomophilyResult { global, per_module })
}

/// Recompute the modularity score from a finished module assignment.
///
/// Uses the degree sequence and the +/-1 same/different-module convention:
/// q = sum over all pairs of (C_ij - k_i k_j / 2m) * (2 delta - 1) / (4m).
/// Errors on an empty partition; a single-module partition has no
/// community structure and scores 0.
pub fn compute_q(connectivity: &ConnectivityMatrix, partition: &Partition) -> Result<f64> {
    if partition.is_empty() {
        return Err(NetworkError::EmptyPartition);
    }
    if partition.len() < 2 {
        log::warn!("only one module detected, Q = 0");
        return Ok(0.0);
    }

    let matrix = &connectivity.matrix;
    let degrees = &connectivity.degrees;
    let n = matrix.nrows();
    let assignments = partition.assignments(n);
    let m = 0.5 * matrix.sum();

    let mut q = 0.0;
    for i in 0..n {
        for j in 0..n {
            let delta = if assignments[i] == assignments[j] {
                1.0
            } else {
                -1.0
            };
            q += (matrix[[i, j]] - degrees[i] * degrees[j] / (2.0 * m)) * delta;
        }
    }

    Ok(q / (4.0 * m))
}
