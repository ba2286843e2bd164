//! Recursive indirect-paths modularity (rip-M) and small-module merging

use ndarray::{Array2, Axis};

use crate::config::Config;
use crate::error::{NetworkError, Result};
use crate::modularity::refine::refine;
use crate::modularity::{Module, Partition};
use crate::network::connectivity::ConnectivityMatrix;

/// Partition the whole network with the rip-M algorithm.
///
/// Runs the local refiner over the full node set, recurses into modules
/// larger than `max_module_size` and hands everything else to the merger.
/// A module that cannot be split or merged is kept as-is; that is a logged,
/// recoverable outcome, not an error.
pub fn rip_m(connectivity: &ConnectivityMatrix, config: &Config) -> Result<Partition> {
    log::info!(
        "rip-M: merge orders {}..={}, module size policy [{}, {}]",
        config.start_merge_order,
        config.max_merge_order,
        config.min_module_size,
        config.max_module_size
    );

    let n = connectivity.matrix.nrows();
    let seed: Module = (0..n).collect();
    let modules = partition_module(&connectivity.matrix, &seed, config)?;
    let partition = Partition { modules };

    log::info!("rip-M: found {} modules", partition.len());
    for (index, module) in partition.modules.iter().enumerate() {
        log::debug!("rip-M: module {} size {}", index, module.len());
    }

    Ok(partition)
}

/// One level of the rip-M recursion.
///
/// Returned module indices stay in `matrix`'s index space; the recursion
/// depth is bounded by O(log(N / max_module_size)).
fn partition_module(
    matrix: &Array2<f64>,
    indices: &[usize],
    config: &Config,
) -> Result<Vec<Module>> {
    log::debug!("rip-M: refining module of size {}", indices.len());
    let result = match refine(matrix, indices) {
        Ok(result) => result,
        Err(NetworkError::ModuleTooSmall { size }) => {
            log::warn!("rip-M: cannot split module of size {}, keeping as is", size);
            return Ok(vec![indices.to_vec()]);
        }
        Err(other) => return Err(other),
    };

    log::debug!(
        "rip-M: modularity Q = {:.6} over {} modules",
        result.q,
        result.partition.len()
    );

    if result.partition.len() <= 1 {
        return Ok(vec![indices.to_vec()]);
    }

    let mut collected = Vec::new();
    let mut small: Vec<Module> = Vec::new();
    for module in result.partition.modules {
        if module.len() > config.max_module_size {
            log::debug!("rip-M: recursing into module of size {}", module.len());
            collected.extend(partition_module(matrix, &module, config)?);
        } else {
            small.push(module);
        }
    }

    if !small.is_empty() {
        log::debug!("rip-M: attempting merge of {} small modules", small.len());
        match merge_small_modules(matrix, &small, config) {
            Ok(merged) => collected.extend(merged),
            Err(error) => {
                log::warn!(
                    "rip-M: merge failed ({}), keeping {} small modules unchanged",
                    error,
                    small.len()
                );
                collected.extend(small);
            }
        }
    }

    Ok(collected)
}

/// Try to merge small modules through sums of increasing matrix powers.
///
/// Builds the submatrix over the combined index set and, for each merge
/// order, refines the indirect-path matrix P = sum of A_sub^k for
/// k = 1..=order. The first order whose result keeps every module size
/// within [min_module_size, max_module_size] wins; its modules are mapped
/// back to the caller's index space.
pub(crate) fn merge_small_modules(
    matrix: &Array2<f64>,
    small: &[Module],
    config: &Config,
) -> Result<Vec<Module>> {
    let combined: Vec<usize> = small.iter().flatten().copied().collect();
    let sub = matrix
        .select(Axis(0), &combined)
        .select(Axis(1), &combined);
    let local_seed: Vec<usize> = (0..combined.len()).collect();

    for order in config.start_merge_order..=config.max_merge_order {
        log::debug!("rip-M: merge order {}", order);
        let paths = sum_power_series(&sub, order);
        let result = refine(&paths, &local_seed)?;
        if sizes_within_policy(&result.partition, config) {
            log::info!("rip-M: merge successful at order {}", order);
            return Ok(result
                .partition
                .modules
                .into_iter()
                .map(|module| module.into_iter().map(|local| combined[local]).collect())
                .collect());
        }
    }

    Err(NetworkError::MergeExhausted {
        start: config.start_merge_order,
        end: config.max_merge_order,
        min_size: config.min_module_size,
        max_size: config.max_module_size,
    })
}

/// P = sum of A^k for k = 1..=order, by repeated multiplication.
fn sum_power_series(matrix: &Array2<f64>, order: usize) -> Array2<f64> {
    let mut total = matrix.clone();
    let mut power = matrix.clone();
    for _ in 1..order {
        power = power.dot(matrix);
        total += &power;
    }
    total
}

fn sizes_within_policy(partition: &Partition, config: &Config) -> bool {
    partition.modules.iter().all(|module| {
        module.len() >= config.min_module_size && module.len() <= config.max_module_size
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::connectivity::build_connectivity;
    use crate::network::NetworkMatrix;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("n{}", i)).collect()
    }

    /// Two 3-cliques of weight 1 joined by a single 0.01 edge.
    fn bridged_triangles() -> Array2<f64> {
        let mut a = Array2::zeros((6, 6));
        for &(i, j) in &[(0, 1), (0, 2), (1, 2), (3, 4), (3, 5), (4, 5)] {
            a[[i, j]] = 1.0;
            a[[j, i]] = 1.0;
        }
        a[[2, 3]] = 0.01;
        a[[3, 2]] = 0.01;
        a
    }

    /// Two fragments {0, 1} and {2, 3, 4} with no internal edges, bound
    /// only by weak 0.01 cross edges between every cross pair.
    fn weakly_bridged_fragments() -> Array2<f64> {
        let mut a = Array2::zeros((5, 5));
        for &i in &[0, 1] {
            for &j in &[2, 3, 4] {
                a[[i, j]] = 0.01;
                a[[j, i]] = 0.01;
            }
        }
        a
    }

    fn binarized(adjacency: &Array2<f64>) -> ConnectivityMatrix {
        let mut config = Config::default();
        config.use_threshold = true;
        config.connectivity_threshold = 0.0;
        build_connectivity(adjacency, &config).unwrap()
    }

    #[test]
    fn partition_is_complete_and_disjoint() {
        let connectivity = binarized(&bridged_triangles());
        let config = Config::with_size_policy(2, 4, 2, 10);
        let partition = rip_m(&connectivity, &config).unwrap();
        let mut covered: Vec<usize> = partition.modules.concat();
        covered.sort_unstable();
        assert_eq!(covered, (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn merge_exhaustion_keeps_original_small_modules() {
        // the default policy (min 200 > max 10) can never accept a merge
        // over six nodes, so the small modules come back unchanged
        let network = NetworkMatrix::new(names(6), bridged_triangles()).unwrap();
        let config = Config::default();
        let connectivity = build_connectivity(network.adjacency(), &config).unwrap();
        let partition = rip_m(&connectivity, &config).unwrap();
        let mut sizes = partition.module_sizes();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![3, 3]);
        let mut covered: Vec<usize> = partition.modules.concat();
        covered.sort_unstable();
        assert_eq!(covered, (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn oversized_unsplittable_module_is_kept_whole() {
        // max_module_size 2 forces recursion into each triangle, which
        // cannot be split further and is kept as a whole module
        let config = Config::with_size_policy(2, 4, 2, 2);
        let connectivity = build_connectivity(&bridged_triangles(), &config).unwrap();
        let partition = rip_m(&connectivity, &config).unwrap();
        let mut sizes = partition.module_sizes();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![3, 3]);
    }

    #[test]
    fn merge_fails_at_order_one() {
        // at order 1 the fragments refine to a single 5-node module,
        // which the [2, 3] size policy rejects
        let connectivity = binarized(&weakly_bridged_fragments());
        let small = vec![vec![0, 1], vec![2, 3, 4]];
        let config = Config::with_size_policy(1, 1, 2, 3);
        let result = merge_small_modules(&connectivity.matrix, &small, &config);
        assert!(matches!(result, Err(NetworkError::MergeExhausted { .. })));
    }

    #[test]
    fn merge_succeeds_at_order_two() {
        // two-hop paths through the opposite fragment bind each fragment
        // internally, so the order-2 indirect-path matrix splits the five
        // nodes into the two fragments, both within the size policy
        let connectivity = binarized(&weakly_bridged_fragments());
        let small = vec![vec![0, 1], vec![2, 3, 4]];
        let config = Config::with_size_policy(1, 2, 2, 3);
        let merged = merge_small_modules(&connectivity.matrix, &small, &config).unwrap();
        let mut sizes: Vec<usize> = merged.iter().map(|module| module.len()).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![2, 3]);
        let mut covered: Vec<usize> = merged.concat();
        covered.sort_unstable();
        assert_eq!(covered, (0..5).collect::<Vec<_>>());
        // indices map back to the caller's space: the fragments themselves
        for module in &merged {
            let mut module = module.clone();
            module.sort_unstable();
            assert!(module == vec![0, 1] || module == vec![2, 3, 4]);
        }
    }

    #[test]
    fn merge_order_accumulates_indirect_paths() {
        let a = bridged_triangles();
        let p = sum_power_series(&a, 2);
        // order 2 adds the two-hop clique paths on top of the direct edge
        assert!((p[[0, 1]] - (1.0 + 1.0)).abs() < 1e-9);
        // and the self-path diagonal
        assert!(p[[0, 0]] > 1.9);
        // order 1 is the matrix itself
        let p1 = sum_power_series(&a, 1);
        assert_eq!(p1, a);
    }
}
