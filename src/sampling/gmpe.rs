//! Ground-motion logic-tree sampling.

use std::collections::BTreeMap;

use rand::Rng;
use tracing::debug;

use crate::logic_tree::{LogicTree, LogicTreeError};
use crate::sampling::{rng_from_seed, SamplingError};
use crate::types::region::TectonicRegionType;

/// Pick one ground-motion model per tectonic region.
///
/// A seed of 0 samples from an entropy-seeded generator; results are then not
/// reproducible.
pub fn sample_gmpe_logic_tree<G: Clone>(
    trees: &BTreeMap<TectonicRegionType, LogicTree<G>>,
    seed: u64,
) -> Result<BTreeMap<TectonicRegionType, G>, SamplingError> {
    let mut rng = rng_from_seed(seed);
    sample_gmpe_logic_tree_with_rng(trees, &mut rng)
}

/// Pick one ground-motion model per tectonic region, advancing `rng` once per
/// region in region order.
pub fn sample_gmpe_logic_tree_with_rng<G: Clone, R: Rng + ?Sized>(
    trees: &BTreeMap<TectonicRegionType, LogicTree<G>>,
    rng: &mut R,
) -> Result<BTreeMap<TectonicRegionType, G>, SamplingError> {
    let mut models = BTreeMap::new();
    for (&region, tree) in trees {
        let (branch, model) =
            sample_region(tree, rng).map_err(|source| SamplingError::Region { region, source })?;
        debug!(%region, branch, "sampled ground-motion model");
        models.insert(region, model.clone());
    }
    Ok(models)
}

fn sample_region<'t, G, R: Rng + ?Sized>(
    tree: &'t LogicTree<G>,
    rng: &mut R,
) -> Result<(usize, &'t G), LogicTreeError> {
    let branch = tree.sample_branching_level(0, rng)?;
    let model = tree
        .end_branch(branch)
        .ok_or(LogicTreeError::MissingEndBranch { branch })?;
    Ok((branch, model))
}
