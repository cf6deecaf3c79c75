//! Rule-driven perturbation of magnitude-frequency distributions and sources.

pub mod mfd;
pub mod source;

use thiserror::Error;

pub use mfd::{apply_b_value_delta, apply_max_magnitude_delta};
pub use source::{apply_rule, apply_rule_to_source_list};

/// Numeric-policy violations raised while deriving a new distribution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error(
        "Uncertainty value {delta} on maximum magnitude for source {source_name} gives maximum magnitude smaller than minimum magnitude"
    )]
    MagnitudeRangeCollapse { source_name: String, delta: f64 },

    #[error("Uncertainty value {delta} on b value for source {source_name} gives b value smaller than 0")]
    NegativeBValue { source_name: String, delta: f64 },
}
