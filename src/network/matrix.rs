//! Symmetric interaction-network matrix and its transforms

use std::collections::HashMap;

use ndarray::Array2;

use crate::config::Config;
use crate::error::{NetworkError, Result};
use crate::modularity::Partition;
use crate::network::connectivity::{build_connectivity, ConnectivityMatrix};

/// Tolerance for the symmetry invariant A(i, j) == A(j, i).
const SYMMETRY_TOLERANCE: f64 = 1e-8;

/// A weighted, symmetric node-interaction network.
///
/// Owns the adjacency matrix and the node name/index mapping. The matrix is
/// mutable only through the explicit transforms below, each of which leaves
/// it finite and symmetric. The derived connectivity matrix and the current
/// module assignment are stored here until replaced.
#[derive(Debug, Clone)]
pub struct NetworkMatrix {
    /// Node names in index order
    node_names: Vec<String>,

    /// Reverse lookup from node name to index
    name_index: HashMap<String, usize>,

    /// Symmetric adjacency matrix
    adjacency: Array2<f64>,

    /// Connectivity matrix derived from the adjacency matrix
    connectivity: Option<ConnectivityMatrix>,

    /// Current module assignment, if a partition has been computed or loaded
    modules: Option<Partition>,
}

impl NetworkMatrix {
    /// Create a network from node names and a symmetric adjacency matrix.
    ///
    /// Fails on empty or non-square matrices, a name list of the wrong
    /// length, duplicate names, non-finite values, or asymmetry.
    pub fn new(node_names: Vec<String>, adjacency: Array2<f64>) -> Result<Self> {
        let (rows, cols) = adjacency.dim();
        if rows == 0 || cols == 0 {
            return Err(NetworkError::EmptyMatrix);
        }
        if rows != cols {
            return Err(NetworkError::NonSquare { rows, cols });
        }
        if node_names.len() != rows {
            return Err(NetworkError::DimensionMismatch {
                expected: rows,
                found: node_names.len(),
            });
        }

        let mut name_index = HashMap::with_capacity(node_names.len());
        for (index, name) in node_names.iter().enumerate() {
            if name_index.insert(name.clone(), index).is_some() {
                return Err(NetworkError::InvalidParameter {
                    name: "node_names",
                    message: format!("duplicate node name '{}'", name),
                });
            }
        }

        ensure_finite(&adjacency, "construction")?;
        ensure_symmetric(&adjacency)?;

        Ok(Self {
            node_names,
            name_index,
            adjacency,
            connectivity: None,
            modules: None,
        })
    }

    /// Number of nodes in the network.
    pub fn num_nodes(&self) -> usize {
        self.adjacency.nrows()
    }

    /// Node names in index order.
    pub fn node_names(&self) -> &[String] {
        &self.node_names
    }

    /// Index of a node by name.
    pub fn node_index(&self, name: &str) -> Option<usize> {
        self.name_index.get(name).copied()
    }

    /// The adjacency matrix.
    pub fn adjacency(&self) -> &Array2<f64> {
        &self.adjacency
    }

    /// The derived connectivity matrix, if prepared.
    pub fn connectivity(&self) -> Option<&ConnectivityMatrix> {
        self.connectivity.as_ref()
    }

    /// Derive (or re-derive) the connectivity matrix from the adjacency
    /// matrix using the given threshold configuration.
    pub fn prepare_connectivity(&mut self, config: &Config) -> Result<&ConnectivityMatrix> {
        let connectivity = build_connectivity(&self.adjacency, config)?;
        log::info!(
            "Connectivity matrix finalized: {} nodes, {:.1} edges",
            self.num_nodes(),
            connectivity.num_edges
        );
        Ok(self.connectivity.insert(connectivity))
    }

    /// The current module assignment, if any.
    pub fn modules(&self) -> Option<&Partition> {
        self.modules.as_ref()
    }

    /// Replace the current module assignment.
    pub fn set_modules(&mut self, partition: Partition) {
        self.modules = Some(partition);
    }

    /// Node-index -> module-number mapping for the current partition.
    pub fn module_assignments(&self) -> Option<Vec<usize>> {
        self.modules
            .as_ref()
            .map(|partition| partition.assignments(self.num_nodes()))
    }

    /// Raise every adjacency entry to `exponent`.
    pub fn apply_power_transform(&mut self, exponent: f64) -> Result<()> {
        self.adjacency.par_mapv_inplace(|value| value.powf(exponent));
        ensure_finite(&self.adjacency, "power transform")?;
        self.connectivity = None;
        Ok(())
    }

    /// Fisher-transform correlation values: r -> ln((1 + r) / (1 - r)),
    /// with r clamped to +/- `cutoff` to keep the result finite.
    pub fn apply_fisher_transform(&mut self, cutoff: f64) -> Result<()> {
        if !(0.0 < cutoff && cutoff < 1.0) {
            return Err(NetworkError::InvalidParameter {
                name: "cutoff",
                message: format!("{} must be in (0, 1)", cutoff),
            });
        }
        self.adjacency.par_mapv_inplace(|value| {
            let r = value.clamp(-cutoff, cutoff);
            ((1.0 + r) / (1.0 - r)).ln()
        });
        ensure_finite(&self.adjacency, "Fisher transform")?;
        self.connectivity = None;
        Ok(())
    }

    /// Merge edge evidence from another network of the same dimension.
    ///
    /// Each pair of weights is converted to a posterior edge probability
    /// p * (1 + ln(1/p)) with p the product of the per-network edge
    /// likelihoods alpha * (1 - e^(-omega * w)) and the prior. Posteriors
    /// above `threshold` replace the edge weight; all others are zeroed.
    pub fn merge_posterior(
        &mut self,
        other: &NetworkMatrix,
        prior_prob_edges: f64,
        alpha: f64,
        omega: f64,
        threshold: f64,
    ) -> Result<()> {
        if other.num_nodes() != self.num_nodes() {
            return Err(NetworkError::DimensionMismatch {
                expected: self.num_nodes(),
                found: other.num_nodes(),
            });
        }
        let n = self.num_nodes();
        let other_adjacency = other.adjacency();
        for i in 0..n {
            for j in i..n {
                let beta_1 = self.adjacency[[i, j]];
                let beta_2 = other_adjacency[[i, j]];
                let prob_edge_1 = alpha * (1.0 - (-omega * beta_1).exp());
                let prob_edge_2 = alpha * (1.0 - (-omega * beta_2).exp());
                let p = prob_edge_1 * prob_edge_2 * prior_prob_edges;
                let posterior = p * (1.0 + (1.0 / p).ln());
                // NaN posteriors (p == 0) fail the comparison and zero the edge
                let value = if posterior > threshold { posterior } else { 0.0 };
                self.adjacency[[i, j]] = value;
                self.adjacency[[j, i]] = value;
            }
        }
        ensure_finite(&self.adjacency, "posterior merge")?;
        self.connectivity = None;
        Ok(())
    }
}

/// Check that every entry of `matrix` is finite.
pub(crate) fn ensure_finite(matrix: &Array2<f64>, operation: &'static str) -> Result<()> {
    if matrix.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(NetworkError::NonFinite { operation })
    }
}

fn ensure_symmetric(matrix: &Array2<f64>) -> Result<()> {
    let n = matrix.nrows();
    for i in 0..n {
        for j in (i + 1)..n {
            let upper = matrix[[i, j]];
            let lower = matrix[[j, i]];
            if (upper - lower).abs() > SYMMETRY_TOLERANCE {
                return Err(NetworkError::NotSymmetric {
                    row: i,
                    col: j,
                    upper,
                    lower,
                });
            }
        }
    }
    Ok(())
}
