//! Logic-tree samplers, end-branch enumeration and the ensemble runner.

pub mod source_model;
pub mod gmpe;
pub mod end_branch;
pub mod runner;

use rand::SeedableRng;
use rand_pcg::Pcg64;
use thiserror::Error;
use tracing::warn;

use crate::logic_tree::LogicTreeError;
use crate::mutation::MutationError;
use crate::reader::ReaderError;
use crate::types::config::ConfigError;
use crate::types::region::TectonicRegionType;

pub use end_branch::{enumerate_gmpe_end_branches, enumerate_source_model_end_branches, GmpeEndBranch, SourceModelEndBranch};
pub use gmpe::{sample_gmpe_logic_tree, sample_gmpe_logic_tree_with_rng};
pub use runner::{run_ensemble_parallel, EnsembleBatchConfig, EnsembleSampler, Realization};
pub use source_model::{sample_source_model_logic_tree, SourceModelSampler};

/// Errors raised while sampling or enumerating logic trees.
#[derive(Error, Debug)]
pub enum SamplingError {
    #[error(transparent)]
    Tree(#[from] LogicTreeError),

    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error(transparent)]
    Reader(#[from] ReaderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{region} ground-motion logic tree: {source}")]
    Region {
        region: TectonicRegionType,
        source: LogicTreeError,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Generator for a seed, where 0 selects an entropy-seeded, non-reproducible stream.
pub fn rng_from_seed(seed: u64) -> Pcg64 {
    if seed == 0 {
        warn!("seed is 0, sampling with an entropy-seeded generator (not reproducible)");
        Pcg64::from_entropy()
    } else {
        Pcg64::seed_from_u64(seed)
    }
}
