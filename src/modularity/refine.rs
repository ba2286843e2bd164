//! Worklist-driven local modularity refinement

use ndarray::{Array2, Axis};

use crate::error::{NetworkError, Result};
use crate::modularity::{bisect, ModularityResult, Partition};

/// Repeatedly bisect the subgraph spanned by `seed` until no further split
/// improves modularity.
///
/// Builds the modularity matrix B = A - k k^T / (2m) over the seed subset
/// and drives an explicit worklist of pending subsets. Each popped subset
/// is localized (every row sum subtracted from its own diagonal entry, so
/// the submatrix measures modularity within the subset only) and bisected.
/// A subset is accepted as a terminal module when one side of the split is
/// empty or when deltaQ <= 0; otherwise both sides return to the worklist
/// and deltaQ accumulates into Q.
///
/// Returned module indices are expressed in `matrix`'s index space. No
/// merging or size policy lives here; that is the recursive partitioner's
/// job.
pub fn refine(matrix: &Array2<f64>, seed: &[usize]) -> Result<ModularityResult> {
    let n = seed.len();
    if n < 2 {
        return Err(NetworkError::ModuleTooSmall { size: n });
    }

    let sub = matrix.select(Axis(0), seed).select(Axis(1), seed);
    let degrees = sub.sum_axis(Axis(0));
    let m = 0.5 * degrees.sum();
    if m <= 0.0 {
        // no edge weight in the subgraph: nothing to split
        log::debug!("subgraph of {} nodes has no edge weight, kept whole", n);
        return Ok(ModularityResult {
            q: 0.0,
            partition: Partition {
                modules: vec![seed.to_vec()],
            },
        });
    }

    let two_m = 2.0 * m;
    let mut b = sub;
    for i in 0..n {
        for j in 0..n {
            b[[i, j]] -= degrees[i] * degrees[j] / two_m;
        }
    }

    let mut worklist: Vec<Vec<usize>> = vec![(0..n).collect()];
    let mut accepted: Vec<Vec<usize>> = Vec::new();
    let mut q = 0.0;
    let mut iteration = 0;

    while let Some(current) = worklist.pop() {
        iteration += 1;
        let dim = current.len();

        // submatrix of B over the current subset
        let mut bg = Array2::zeros((dim, dim));
        for (row, &i) in current.iter().enumerate() {
            for (col, &j) in current.iter().enumerate() {
                bg[[row, col]] = b[[i, j]];
            }
        }

        // adjust the diagonal so Bg measures modularity within the subset
        for row in 0..dim {
            let row_sum: f64 = bg.row(row).sum();
            bg[[row, row]] -= row_sum;
        }

        let (delta_q, signs) = bisect::best_split(&bg, m);

        let mut side_1 = Vec::new();
        let mut side_2 = Vec::new();
        for (position, &local) in current.iter().enumerate() {
            if signs[position] > 0.0 {
                side_1.push(local);
            } else {
                side_2.push(local);
            }
        }

        if side_1.is_empty() || side_2.is_empty() {
            accepted.push(current);
            if iteration == 1 {
                q = delta_q;
            }
        } else if delta_q <= 0.0 {
            accepted.push(current);
        } else {
            worklist.push(side_1);
            worklist.push(side_2);
            q += delta_q;
        }
    }

    let modules = accepted
        .into_iter()
        .map(|module| module.into_iter().map(|local| seed[local]).collect())
        .collect();

    Ok(ModularityResult {
        q,
        partition: Partition { modules },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

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

    #[test]
    fn separates_weakly_bridged_cliques() {
        let matrix = bridged_triangles();
        let seed: Vec<usize> = (0..6).collect();
        let result = refine(&matrix, &seed).unwrap();
        assert!(result.q > 0.0);
        let mut sizes = result.partition.module_sizes();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![3, 3]);
        // the split follows the cliques
        for module in &result.partition.modules {
            let mut module = module.clone();
            module.sort_unstable();
            assert!(module == vec![0, 1, 2] || module == vec![3, 4, 5]);
        }
    }

    #[test]
    fn covers_every_seed_index_exactly_once() {
        let matrix = bridged_triangles();
        let seed: Vec<usize> = (0..6).collect();
        let result = refine(&matrix, &seed).unwrap();
        let mut covered: Vec<usize> = result.partition.modules.concat();
        covered.sort_unstable();
        assert_eq!(covered, seed);
    }

    #[test]
    fn maps_results_into_caller_index_space() {
        let matrix = bridged_triangles();
        // refine only the second clique plus the bridge endpoint
        let seed = vec![2, 3, 4, 5];
        let result = refine(&matrix, &seed).unwrap();
        let mut covered: Vec<usize> = result.partition.modules.concat();
        covered.sort_unstable();
        assert_eq!(covered, seed);
    }

    #[test]
    fn single_clique_is_terminal() {
        let mut a = Array2::zeros((3, 3));
        for &(i, j) in &[(0, 1), (0, 2), (1, 2)] {
            a[[i, j]] = 1.0;
            a[[j, i]] = 1.0;
        }
        let result = refine(&a, &[0, 1, 2]).unwrap();
        assert_eq!(result.partition.len(), 1);
        assert!(result.q.abs() < 1e-9);
    }

    #[test]
    fn rejects_undersized_seed() {
        let matrix = bridged_triangles();
        let result = refine(&matrix, &[0]);
        assert!(matches!(
            result,
            Err(NetworkError::ModuleTooSmall { size: 1 })
        ));
    }

    #[test]
    fn zero_weight_subgraph_kept_whole() {
        let matrix: Array2<f64> = Array2::zeros((4, 4));
        let seed: Vec<usize> = (0..4).collect();
        let result = refine(&matrix, &seed).unwrap();
        assert_eq!(result.partition.len(), 1);
        assert_eq!(result.q, 0.0);
        assert!(result.q.is_finite());
    }
}
