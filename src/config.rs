//! Configuration for the network module analyzer

/// Analysis parameters shared by the connectivity builder and rip-M.
///
/// The size-policy defaults mirror the values observed in production use;
/// note that `min_module_size` and `max_module_size` are independent knobs
/// and the defaults are not required to satisfy min <= max.
#[derive(Debug, Clone)]
pub struct Config {
    /// Connectivity threshold; entries at or below it are zeroed
    pub connectivity_threshold: f64,

    /// Whether thresholding is applied when deriving connectivity
    pub use_threshold: bool,

    /// Compare absolute values against the threshold
    pub threshold_absolute: bool,

    /// Binarize entries that survive thresholding to 1.0
    pub binary_threshold: bool,

    /// First indirect-path order tried when merging small modules
    pub start_merge_order: usize,

    /// Last indirect-path order tried when merging small modules
    pub max_merge_order: usize,

    /// Minimum acceptable module size for a merge result
    pub min_module_size: usize,

    /// Modules larger than this are recursively re-partitioned
    pub max_module_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connectivity_threshold: 0.0,
            use_threshold: false,
            threshold_absolute: false,
            binary_threshold: true,
            start_merge_order: 2,
            max_merge_order: 4,
            min_module_size: 200,
            max_module_size: 10,
        }
    }
}

impl Config {
    /// Create a configuration with a custom size policy, keeping the
    /// default thresholding behavior.
    pub fn with_size_policy(
        start_merge_order: usize,
        max_merge_order: usize,
        min_module_size: usize,
        max_module_size: usize,
    ) -> Self {
        Self {
            start_merge_order,
            max_merge_order,
            min_module_size,
            max_module_size,
            ..Self::default()
        }
    }
}
