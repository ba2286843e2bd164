use std::path::Path;

use anyhow::Result;
use clap::Parser;

use network_module_analyzer::data;
use network_module_analyzer::deconvolve;
use network_module_analyzer::modularity::{metrics, partition};
use network_module_analyzer::storage;
use network_module_analyzer::Config;

#[derive(Parser, Debug)]
#[clap(
    name = "network-module-analyzer",
    about = "Modularity-based module detection and deconvolution for interaction networks"
)]
struct Cli {
    /// Path to the input matrix file
    #[clap(long)]
    input: String,

    /// Input format: csv, gain, or sif
    #[clap(long, default_value = "csv")]
    format: String,

    /// Treat a GAIN matrix file as upper triangular
    #[clap(long)]
    upper_triangular: bool,

    /// Output directory for results
    #[clap(long, default_value = "module_results")]
    output_dir: String,

    /// Zero connectivity entries at or below this threshold
    #[clap(long)]
    threshold: Option<f64>,

    /// Compare absolute values against the threshold
    #[clap(long)]
    threshold_abs: bool,

    /// Keep edge weights instead of binarizing thresholded entries
    #[clap(long)]
    weighted: bool,

    /// First indirect-path order tried when merging small modules
    #[clap(long, default_value = "2")]
    start_merge_order: usize,

    /// Last indirect-path order tried when merging small modules
    #[clap(long, default_value = "4")]
    max_merge_order: usize,

    /// Minimum acceptable module size for merge results
    #[clap(long, default_value = "200")]
    min_module_size: usize,

    /// Modules larger than this are recursively split
    #[clap(long, default_value = "10")]
    max_module_size: usize,

    /// Raise every adjacency entry to this exponent before analysis
    #[clap(long)]
    power_transform: Option<f64>,

    /// Apply a Fisher transform to correlation values before analysis
    #[clap(long)]
    fisher_transform: bool,

    /// Clamp correlations to this magnitude for the Fisher transform
    #[clap(long, default_value = "0.999")]
    fisher_cutoff: f64,

    /// Score an existing node/module assignment file instead of partitioning
    #[clap(long)]
    modules: Option<String>,

    /// Run network deconvolution instead of partitioning
    #[clap(long)]
    deconvolve: bool,

    /// Fraction of strongest edges kept by deconvolution, in (0, 1]
    #[clap(long, default_value = "1.0")]
    alpha: f64,

    /// Eigenvalue scaling parameter for deconvolution, in (0, 1)
    #[clap(long, default_value = "0.9")]
    beta: f64,

    /// Deconvolution output mode: 0 keeps non-edge values, 1 shifts all
    #[clap(long, default_value = "0")]
    control: u8,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    // Set number of threads
    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    log::info!("Starting network module analysis");
    log::info!("Input: {}", args.input);
    log::info!("Output: {}", args.output_dir);

    std::fs::create_dir_all(&args.output_dir)?;

    let mut config = Config::default();
    if let Some(threshold) = args.threshold {
        config.use_threshold = true;
        config.connectivity_threshold = threshold;
    }
    config.threshold_absolute = args.threshold_abs;
    config.binary_threshold = !args.weighted;
    config.start_merge_order = args.start_merge_order;
    config.max_merge_order = args.max_merge_order;
    config.min_module_size = args.min_module_size;
    config.max_module_size = args.max_module_size;

    // 1. Load the matrix
    let mut network = data::load_network(&args.input, &args.format, args.upper_triangular)?;
    log::info!("Loaded network with {} nodes", network.num_nodes());

    // 2. Optional adjacency transforms
    if let Some(exponent) = args.power_transform {
        log::info!("Applying power transform with exponent {}", exponent);
        network.apply_power_transform(exponent)?;
    }
    if args.fisher_transform {
        log::info!("Applying Fisher transform");
        network.apply_fisher_transform(args.fisher_cutoff)?;
    }

    // Deconvolution is independent of the partitioning pipeline
    if args.deconvolve {
        log::info!(
            "Deconvolving network: alpha {}, beta {}, control {}",
            args.alpha,
            args.beta,
            args.control
        );
        let deconvolved =
            deconvolve::deconvolve(network.adjacency(), args.alpha, args.beta, args.control)?;
        let path = Path::new(&args.output_dir).join("deconvolved.csv");
        storage::write_matrix(network.node_names(), &deconvolved, &path, ",")?;
        log::info!("Deconvolved matrix saved to {}", path.display());
        return Ok(());
    }

    // 3. Derive the connectivity matrix
    let connectivity = network.prepare_connectivity(&config)?.clone();

    // 4. Partition the network, or load an existing assignment
    let result = if let Some(modules_path) = &args.modules {
        data::modules_file::read_modules(modules_path, &network)?
    } else {
        partition::rip_m(&connectivity, &config)?
    };
    log::info!("Found {} modules", result.len());

    // 5. Score the partition and save results
    let q = metrics::compute_q(&connectivity, &result)?;
    let homophily = metrics::homophily(&connectivity, &result)?;
    log::info!("Q from modules: {:.6}", q);
    log::info!("Total homophily: {:.6}", homophily.global);
    for (index, value) in homophily.per_module.iter().enumerate() {
        log::info!("Homophily for module {}: {:.6}", index + 1, value);
    }

    network.set_modules(result.clone());
    storage::save_results(&network, &result, q, &homophily, &args.output_dir)?;

    log::info!("Analysis complete. Results saved to {}", args.output_dir);

    Ok(())
}
