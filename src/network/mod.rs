//! Network matrix ownership and connectivity derivation

pub mod connectivity;
pub mod matrix;

pub use connectivity::ConnectivityMatrix;
pub use matrix::NetworkMatrix;
