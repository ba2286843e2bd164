//! Delimited matrix file parsing

use std::fs;

use anyhow::{anyhow, Context, Result};
use ndarray::Array2;

use crate::network::NetworkMatrix;

/// Load a comma-delimited matrix with a header row of node names.
pub fn read_csv(path: &str) -> Result<NetworkMatrix> {
    read_full(path, ",")
}

/// Load a tab-delimited GAIN matrix, optionally stored as an upper
/// triangle (row i carries the values for columns i..N).
pub fn read_gain(path: &str, upper_triangular: bool) -> Result<NetworkMatrix> {
    if upper_triangular {
        read_upper_triangular(path)
    } else {
        read_full(path, "\t")
    }
}

fn read_full(path: &str, delimiter: &str) -> Result<NetworkMatrix> {
    log::info!("Reading matrix file: {}", path);
    let content =
        fs::read_to_string(path).with_context(|| format!("could not open matrix file {}", path))?;
    let mut lines = content.lines();

    let header = lines
        .next()
        .ok_or_else(|| anyhow!("matrix file {} is empty", path))?;
    let node_names = parse_header(header, delimiter)?;
    let dim = node_names.len();

    let mut adjacency = Array2::zeros((dim, dim));
    let mut row = 0;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if row >= dim {
            return Err(anyhow!(
                "matrix file {} has more rows than header columns",
                path
            ));
        }
        let values: Vec<&str> = line.split(delimiter).collect();
        if values.len() != dim {
            return Err(anyhow!(
                "row {}: expected {} values, got {}",
                row + 1,
                dim,
                values.len()
            ));
        }
        for (col, token) in values.iter().enumerate() {
            adjacency[[row, col]] = parse_value(token, row, col)?;
        }
        row += 1;
    }
    if row != dim {
        return Err(anyhow!("expected {} matrix rows, got {}", dim, row));
    }

    Ok(NetworkMatrix::new(node_names, adjacency)?)
}

fn read_upper_triangular(path: &str) -> Result<NetworkMatrix> {
    log::info!("Reading upper-triangular matrix file: {}", path);
    let content =
        fs::read_to_string(path).with_context(|| format!("could not open matrix file {}", path))?;
    let mut lines = content.lines();

    let header = lines
        .next()
        .ok_or_else(|| anyhow!("matrix file {} is empty", path))?;
    let node_names = parse_header(header, "\t")?;
    let dim = node_names.len();

    let mut adjacency = Array2::zeros((dim, dim));
    let mut row = 0;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if row >= dim {
            return Err(anyhow!(
                "matrix file {} has more rows than header columns",
                path
            ));
        }
        let values: Vec<&str> = line.split('\t').collect();
        let expected = dim - row;
        if values.len() != expected {
            return Err(anyhow!(
                "row {}: expected {} values, got {}",
                row + 1,
                expected,
                values.len()
            ));
        }
        for (offset, token) in values.iter().enumerate() {
            let col = row + offset;
            let value = parse_value(token, row, col)?;
            adjacency[[row, col]] = value;
            adjacency[[col, row]] = value;
        }
        row += 1;
    }
    if row != dim {
        return Err(anyhow!("expected {} matrix rows, got {}", dim, row));
    }

    Ok(NetworkMatrix::new(node_names, adjacency)?)
}

fn parse_header(header: &str, delimiter: &str) -> Result<Vec<String>> {
    let names: Vec<String> = header
        .trim()
        .split(delimiter)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        return Err(anyhow!("could not parse node names from header"));
    }
    Ok(names)
}

fn parse_value(token: &str, row: usize, col: usize) -> Result<f64> {
    token.trim().parse::<f64>().with_context(|| {
        format!(
            "could not parse value '{}' at row {} col {}",
            token,
            row + 1,
            col + 1
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("nma-{}-{}", std::process::id(), name));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reads_csv_matrix() {
        let path = temp_file(
            "matrix.csv",
            "a,b,c\n0.0,0.5,0.2\n0.5,0.0,0.8\n0.2,0.8,0.0\n",
        );
        let network = read_csv(path.to_str().unwrap()).unwrap();
        assert_eq!(network.num_nodes(), 3);
        assert_eq!(network.node_names(), &["a", "b", "c"]);
        assert!((network.adjacency()[[1, 2]] - 0.8).abs() < 1e-12);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn reads_upper_triangular_gain_matrix() {
        let path = temp_file("matrix.gain", "x\ty\tz\n1.0\t0.5\t0.2\n1.0\t0.8\n1.0\n");
        let network = read_gain(path.to_str().unwrap(), true).unwrap();
        assert_eq!(network.num_nodes(), 3);
        // values are reflected below the diagonal
        assert!((network.adjacency()[[2, 0]] - 0.2).abs() < 1e-12);
        assert!((network.adjacency()[[2, 1]] - 0.8).abs() < 1e-12);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn rejects_short_row() {
        let path = temp_file("bad.csv", "a,b\n0.0,1.0\n1.0\n");
        let result = read_csv(path.to_str().unwrap());
        assert!(result.is_err());
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn rejects_unparseable_value() {
        let path = temp_file("junk.csv", "a,b\n0.0,oops\noops,0.0\n");
        let result = read_csv(path.to_str().unwrap());
        assert!(result.is_err());
        std::fs::remove_file(path).unwrap();
    }
}
