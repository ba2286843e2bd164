//! Module assignment file parsing

use std::collections::BTreeMap;
use std::fs;

use anyhow::{anyhow, Context, Result};

use crate::modularity::{Module, Partition};
use crate::network::NetworkMatrix;

/// Load a saved `node-name <TAB> module-number` mapping as a partition.
///
/// Module numbers may be arbitrary (the writer emits them 1-based); they
/// are compacted into consecutive module indices in ascending number
/// order. Unknown node names are an error.
pub fn read_modules(path: &str, network: &NetworkMatrix) -> Result<Partition> {
    log::info!("Reading modules file: {}", path);
    let content =
        fs::read_to_string(path).with_context(|| format!("could not open modules file {}", path))?;

    let mut grouped: BTreeMap<usize, Module> = BTreeMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            log::warn!("blank line skipped");
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 2 {
            return Err(anyhow!("malformed modules line: {}", line));
        }
        let name = fields[0].trim();
        let number: usize = fields[1]
            .trim()
            .parse()
            .with_context(|| format!("could not parse module number in line: {}", line))?;
        let node = network
            .node_index(name)
            .ok_or_else(|| anyhow!("unknown node name '{}' in modules file", name))?;
        grouped.entry(number).or_default().push(node);
    }

    if grouped.is_empty() {
        return Err(anyhow!("modules file {} contains no assignments", path));
    }

    Ok(Partition {
        modules: grouped.into_values().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use std::io::Write;
    use std::path::PathBuf;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("nma-{}-{}", std::process::id(), name));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn network(names: &[&str]) -> NetworkMatrix {
        let n = names.len();
        NetworkMatrix::new(
            names.iter().map(|s| s.to_string()).collect(),
            Array2::zeros((n, n)),
        )
        .unwrap()
    }

    #[test]
    fn groups_nodes_by_module_number() {
        let path = temp_file("modules.tsv", "a\t1\nb\t1\nc\t2\n");
        let network = network(&["a", "b", "c"]);
        let partition = read_modules(path.to_str().unwrap(), &network).unwrap();
        assert_eq!(partition.modules, vec![vec![0, 1], vec![2]]);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn rejects_unknown_node() {
        let path = temp_file("unknown.tsv", "zz\t1\n");
        let network = network(&["a", "b"]);
        let result = read_modules(path.to_str().unwrap(), &network);
        assert!(result.is_err());
        std::fs::remove_file(path).unwrap();
    }
}
