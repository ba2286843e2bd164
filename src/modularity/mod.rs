//! Modularity-based module detection

pub mod bisect;
pub mod metrics;
pub mod partition;
pub mod refine;

use serde::{Deserialize, Serialize};

/// An ordered set of node indices forming one module.
pub type Module = Vec<usize>;

/// A list of modules over a network.
///
/// A finalized partition is complete and disjoint: every node index in
/// [0, N) appears in exactly one module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partition {
    /// Modules as ordered lists of node indices
    pub modules: Vec<Module>,
}

impl Partition {
    /// Number of modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// True when no modules exist.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Sizes of the modules, in module order.
    pub fn module_sizes(&self) -> Vec<usize> {
        self.modules.iter().map(|module| module.len()).collect()
    }

    /// Total number of nodes covered by the partition.
    pub fn total_nodes(&self) -> usize {
        self.modules.iter().map(|module| module.len()).sum()
    }

    /// Node-index -> module-number mapping, one entry per node.
    pub fn assignments(&self, num_nodes: usize) -> Vec<usize> {
        let mut assignments = vec![0; num_nodes];
        for (module_number, module) in self.modules.iter().enumerate() {
            for &node in module {
                assignments[node] = module_number;
            }
        }
        assignments
    }
}

/// Modularity score together with the partition it was computed from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModularityResult {
    /// Accumulated modularity Q
    pub q: f64,

    /// The partition the score belongs to
    pub partition: Partition,
}
