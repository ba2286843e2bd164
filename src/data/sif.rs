//! SIF edge-list parsing

use std::collections::{BTreeSet, HashMap};
use std::fs;

use anyhow::{anyhow, Context, Result};
use ndarray::Array2;

use crate::network::NetworkMatrix;

/// Load a network from a SIF file of `node1 <TAB> weight <TAB> node2`
/// lines. Node indices follow the sorted order of the unique node names;
/// blank lines are skipped with a warning.
pub fn read_sif(path: &str) -> Result<NetworkMatrix> {
    log::info!("Reading SIF file: {}", path);
    let content =
        fs::read_to_string(path).with_context(|| format!("could not open SIF file {}", path))?;

    let mut names = BTreeSet::new();
    let mut edges: Vec<(String, String, f64)> = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            log::warn!("blank line skipped");
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 3 {
            return Err(anyhow!("malformed SIF line: {}", line));
        }
        let weight: f64 = fields[1]
            .trim()
            .parse()
            .with_context(|| format!("could not parse edge weight in line: {}", line))?;
        names.insert(fields[0].to_string());
        names.insert(fields[2].to_string());
        edges.push((fields[0].to_string(), fields[2].to_string(), weight));
    }

    let node_names: Vec<String> = names.into_iter().collect();
    if node_names.is_empty() {
        return Err(anyhow!("SIF file {} contains no edges", path));
    }
    let index: HashMap<&str, usize> = node_names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    let dim = node_names.len();
    let mut adjacency = Array2::zeros((dim, dim));
    for (source, target, weight) in &edges {
        let i = index[source.as_str()];
        let j = index[target.as_str()];
        adjacency[[i, j]] = *weight;
        adjacency[[j, i]] = *weight;
    }

    Ok(NetworkMatrix::new(node_names, adjacency)?)
}
