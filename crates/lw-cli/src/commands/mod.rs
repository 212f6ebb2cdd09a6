//! CLI subcommand implementations.

pub mod estimate;
pub mod logwork;
pub mod util;
pub mod week;

#[cfg(test)]
mod fake;
