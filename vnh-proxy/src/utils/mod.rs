pub mod runner;

/// Helpers for writing tests against the proxy: frame generators and recording injectors.
pub mod test;
