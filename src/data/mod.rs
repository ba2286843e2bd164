//! Input parsing for matrix and module files

pub mod matrix_file;
pub mod modules_file;
pub mod sif;

use anyhow::{anyhow, Result};

use crate::network::NetworkMatrix;

/// Load a network from a matrix file in the named format.
///
/// Supported formats: `csv` (comma delimited with a header row of node
/// names), `gain` (tab delimited, full or upper-triangular) and `sif`
/// (tab-separated edge list).
pub fn load_network(path: &str, format: &str, upper_triangular: bool) -> Result<NetworkMatrix> {
    match format {
        "csv" => matrix_file::read_csv(path),
        "gain" => matrix_file::read_gain(path, upper_triangular),
        "sif" => sif::read_sif(path),
        other => Err(anyhow!("unknown matrix format: {}", other)),
    }
}
