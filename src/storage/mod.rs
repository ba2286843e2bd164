//! Results persistence

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use itertools::Itertools;
use ndarray::Array2;
use serde_json::{json, to_string_pretty};

use crate::modularity::metrics::HomophilyResult;
use crate::modularity::Partition;
use crate::network::NetworkMatrix;

/// Save partition results to the output directory.
pub fn save_results(
    network: &NetworkMatrix,
    partition: &Partition,
    q: f64,
    homophily: &HomophilyResult,
    output_dir: &str,
) -> Result<()> {
    log::info!("Saving {} modules to {}", partition.len(), output_dir);

    fs::create_dir_all(output_dir)?;
    save_modules(network, partition, &Path::new(output_dir).join("modules.tsv"))?;
    save_summary(network, partition, q, homophily, output_dir)?;

    log::info!("Results saved successfully");
    Ok(())
}

/// Write one `node-name <TAB> module-number` row per node, with 1-based
/// module numbers.
pub fn save_modules(network: &NetworkMatrix, partition: &Partition, path: &Path) -> Result<()> {
    log::info!("Saving network modules to {}", path.display());
    let mut file = File::create(path)?;
    for (module_number, module) in partition.modules.iter().enumerate() {
        for &node in module {
            writeln!(file, "{}\t{}", network.node_names()[node], module_number + 1)?;
        }
    }
    Ok(())
}

/// Save summary information
fn save_summary(
    network: &NetworkMatrix,
    partition: &Partition,
    q: f64,
    homophily: &HomophilyResult,
    output_dir: &str,
) -> Result<()> {
    log::info!("Saving summary information");

    let path = Path::new(output_dir).join("summary.json");
    let mut file = File::create(path)?;

    let summary = json!({
        "network": {
            "node_count": network.num_nodes(),
            "edge_count": network.connectivity().map(|c| c.num_edges),
        },
        "modularity": {
            "q": q,
            "module_count": partition.len(),
            "module_sizes": partition.module_sizes(),
            "covered_nodes": partition.total_nodes(),
        },
        "homophily": {
            "global": homophily.global,
            "per_module": homophily.per_module,
        }
    });

    file.write_all(to_string_pretty(&summary)?.as_bytes())?;
    Ok(())
}

/// Write a matrix with a header row of node names.
pub fn write_matrix(
    node_names: &[String],
    matrix: &Array2<f64>,
    path: &Path,
    delimiter: &str,
) -> Result<()> {
    log::info!("Saving matrix to {}", path.display());
    let mut file = File::create(path)?;
    writeln!(file, "{}", node_names.iter().join(delimiter))?;
    for row in matrix.rows() {
        writeln!(
            file,
            "{}",
            row.iter().map(|value| format!("{:.8}", value)).join(delimiter)
        )?;
    }
    Ok(())
}

/// Write the network's adjacency matrix in delimited form.
pub fn write_delimited(network: &NetworkMatrix, path: &Path, delimiter: &str) -> Result<()> {
    write_matrix(network.node_names(), network.adjacency(), path, delimiter)
}

/// Write the network's upper-triangle edges in SIF format, omitting zero
/// entries.
pub fn write_sif(network: &NetworkMatrix, path: &Path) -> Result<()> {
    log::info!("Saving SIF file to {}", path.display());
    let adjacency = network.adjacency();
    let names = network.node_names();
    let mut file = File::create(path)?;
    for i in 0..network.num_nodes() {
        for j in (i + 1)..network.num_nodes() {
            if adjacency[[i, j]] != 0.0 {
                writeln!(file, "{}\t{}\t{}", names[i], adjacency[[i, j]], names[j])?;
            }
        }
    }
    Ok(())
}
