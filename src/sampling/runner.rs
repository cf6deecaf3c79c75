//! Ensemble runner: sequential and rayon-parallel realizations.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::logic_tree::LogicTree;
use crate::reader::SourceModelReader;
use crate::sampling::gmpe::sample_gmpe_logic_tree_with_rng;
use crate::sampling::source_model::SourceModelSampler;
use crate::sampling::{rng_from_seed, SamplingError};
use crate::types::config::SamplerConfig;
use crate::types::region::TectonicRegionType;
use crate::types::source::SeismicSource;

/// One Monte Carlo realization: a sampled source model plus a sampled
/// region→model map. Owns all of its data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Realization<G> {
    /// Position in the ensemble.
    pub index: usize,
    /// Sub-seed the realization was drawn with, when drawn independently.
    pub seed: Option<u64>,
    pub sources: Vec<SeismicSource>,
    pub gmpes: BTreeMap<TectonicRegionType, G>,
}

/// Draws realizations from a source-model tree and per-region GMPE trees.
pub struct EnsembleSampler<'a, R: SourceModelReader + ?Sized, G> {
    source_tree: &'a LogicTree,
    gmpe_trees: &'a BTreeMap<TectonicRegionType, LogicTree<G>>,
    reader: &'a R,
    config: &'a SamplerConfig,
}

impl<'a, R: SourceModelReader + ?Sized, G: Clone> EnsembleSampler<'a, R, G> {
    pub fn new(
        source_tree: &'a LogicTree,
        gmpe_trees: &'a BTreeMap<TectonicRegionType, LogicTree<G>>,
        reader: &'a R,
        config: &'a SamplerConfig,
    ) -> Self {
        Self {
            source_tree,
            gmpe_trees,
            reader,
            config,
        }
    }

    /// Draw one realization, advancing `rng`: source model first, then GMPEs.
    pub fn sample_with_rng<T: Rng + ?Sized>(
        &self,
        index: usize,
        rng: &mut T,
    ) -> Result<Realization<G>, SamplingError> {
        let sources = SourceModelSampler::new(self.reader, self.config)
            .sample_with_rng(self.source_tree, rng)?;
        let gmpes = sample_gmpe_logic_tree_with_rng(self.gmpe_trees, rng)?;
        Ok(Realization {
            index,
            seed: None,
            sources,
            gmpes,
        })
    }

    /// Draw `number_of_samples` realizations in order from a single generator
    /// seeded with the config seed (0 = entropy-seeded).
    pub fn sample_sequential(&self) -> Result<Vec<Realization<G>>, SamplingError> {
        self.config.validate()?;
        let n = self.config.number_of_samples as usize;
        info!(n, seed = self.config.seed, "sampling ensemble sequentially");

        let mut rng = rng_from_seed(self.config.seed);
        (0..n).map(|i| self.sample_with_rng(i, &mut rng)).collect()
    }
}

/// A batch of realizations to draw in parallel.
pub struct EnsembleBatchConfig<'a, R: SourceModelReader + ?Sized, G> {
    pub source_tree: &'a LogicTree,
    pub gmpe_trees: &'a BTreeMap<TectonicRegionType, LogicTree<G>>,
    pub reader: &'a R,
    pub config: &'a SamplerConfig,
}

/// Sub-seeds for each member, drawn in order from the master seed.
pub fn member_seeds(seed: u64, n: usize) -> Vec<u64> {
    let mut master = rng_from_seed(seed);
    (0..n).map(|_| master.gen::<u64>()).collect()
}

/// Draw `number_of_samples` realizations on a rayon pool.
///
/// Each member gets its own generator seeded from a sub-seed taken in order
/// from the master seed, so the output is identical for any worker count.
pub fn run_ensemble_parallel<R, G>(
    batch: EnsembleBatchConfig<'_, R, G>,
) -> Result<Vec<Realization<G>>, SamplingError>
where
    R: SourceModelReader + ?Sized,
    G: Clone + Send + Sync,
{
    batch.config.validate()?;

    let n_workers = batch
        .config
        .n_workers
        .unwrap_or_else(|| rayon::current_num_threads().min(8));

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(n_workers)
        .build()
        .map_err(|e| SamplingError::InvalidConfig(format!("Failed to create thread pool: {}", e)))?;

    let n = batch.config.number_of_samples as usize;
    let seeds = member_seeds(batch.config.seed, n);
    info!(n, n_workers, seed = batch.config.seed, "sampling ensemble in parallel");

    let sampler = EnsembleSampler::new(batch.source_tree, batch.gmpe_trees, batch.reader, batch.config);

    let results: Result<Vec<Realization<G>>, SamplingError> = pool.install(|| {
        seeds
            .into_par_iter()
            .enumerate()
            .map(|(index, seed)| -> Result<Realization<G>, SamplingError> {
                let mut rng = Pcg64::seed_from_u64(seed);
                let mut realization = sampler.sample_with_rng(index, &mut rng)?;
                realization.seed = Some(seed);
                Ok(realization)
            })
            .collect()
    });

    let results = results?;
    info!(n = results.len(), "ensemble complete");
    Ok(results)
}
