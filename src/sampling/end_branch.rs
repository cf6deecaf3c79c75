//! Full enumeration of logic-tree end branches.
//!
//! Where the samplers draw one path, these walk every path, which is how a
//! full (non Monte Carlo) calculation consumes the trees.

use std::collections::BTreeMap;

use tracing::debug;

use crate::logic_tree::{LogicTree, LogicTreeError};
use crate::mutation::apply_rule_to_source_list;
use crate::reader::SourceModelReader;
use crate::sampling::SamplingError;
use crate::types::config::SamplerConfig;
use crate::types::region::TectonicRegionType;
use crate::types::source::SeismicSource;

/// One complete path through a source-model logic tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceModelEndBranch {
    /// Branch numbers joined with `_`, e.g. `1_2_1`.
    pub label: String,
    /// Product of the normalized branch weights along the path.
    pub weight: f64,
    pub sources: Vec<SeismicSource>,
}

/// One combination of per-region ground-motion models.
#[derive(Debug, Clone, PartialEq)]
pub struct GmpeEndBranch<G> {
    /// `REGION_branch` pairs joined with `-`, in region order.
    pub label: String,
    pub weight: f64,
    pub models: BTreeMap<TectonicRegionType, G>,
}

fn normalized_weights<E>(tree: &LogicTree<E>, level: usize) -> Result<Vec<f64>, LogicTreeError> {
    let branching_level = tree.level(level)?;
    if branching_level.branches.is_empty() {
        return Err(LogicTreeError::EmptyLevel { level });
    }
    for (j, branch) in branching_level.branches.iter().enumerate() {
        if !branch.weight.is_finite() || branch.weight < 0.0 {
            return Err(LogicTreeError::InvalidWeight {
                level,
                branch: j + 1,
                weight: branch.weight,
            });
        }
    }
    let total = branching_level.total_weight();
    if !(total > 0.0) {
        return Err(LogicTreeError::ZeroTotalWeight { level });
    }
    Ok(branching_level.weights().iter().map(|w| w / total).collect())
}

/// Enumerate every end-branch source model of a source-model logic tree.
///
/// Unlike sampling, each rule on a path is applied to every source of the
/// model.
pub fn enumerate_source_model_end_branches<R: SourceModelReader + ?Sized>(
    tree: &LogicTree,
    reader: &R,
    config: &SamplerConfig,
) -> Result<Vec<SourceModelEndBranch>, SamplingError> {
    let weights = normalized_weights(tree, 0)?;
    let mut end_branches = Vec::with_capacity(weights.len());
    for (j, branch) in tree.level(0)?.branches.iter().enumerate() {
        let input_model = branch
            .input_model
            .as_deref()
            .ok_or(LogicTreeError::MissingInputModel { branch: j + 1 })?;
        let path = config.resolve_model_path(input_model);
        end_branches.push(SourceModelEndBranch {
            label: branch.number.to_string(),
            weight: weights[j],
            sources: reader.load(&path, config.mfd_bin_width)?,
        });
    }

    for level in 1..tree.num_levels() {
        let weights = normalized_weights(tree, level)?;
        let branches = &tree.level(level)?.branches;
        let mut next = Vec::with_capacity(end_branches.len() * branches.len());
        for end_branch in &end_branches {
            for (j, branch) in branches.iter().enumerate() {
                let rule = branch
                    .rule
                    .as_ref()
                    .ok_or(LogicTreeError::MissingRule { level, branch: j + 1 })?;
                next.push(SourceModelEndBranch {
                    label: format!("{}_{}", end_branch.label, branch.number),
                    weight: end_branch.weight * weights[j],
                    sources: apply_rule_to_source_list(&end_branch.sources, rule)?,
                });
            }
        }
        end_branches = next;
    }

    debug!(count = end_branches.len(), "enumerated source-model end branches");
    Ok(end_branches)
}

/// Branch number, normalized weight and model for every branch of a
/// single-level ground-motion tree.
fn region_choices<G>(tree: &LogicTree<G>) -> Result<Vec<(u32, f64, &G)>, LogicTreeError> {
    let weights = normalized_weights(tree, 0)?;
    tree.level(0)?
        .branches
        .iter()
        .enumerate()
        .map(|(j, branch)| {
            tree.end_branch(j + 1)
                .map(|model| (branch.number, weights[j], model))
                .ok_or(LogicTreeError::MissingEndBranch { branch: j + 1 })
        })
        .collect()
}

/// Enumerate every combination of ground-motion models across regions.
pub fn enumerate_gmpe_end_branches<G: Clone>(
    trees: &BTreeMap<TectonicRegionType, LogicTree<G>>,
) -> Result<Vec<GmpeEndBranch<G>>, SamplingError> {
    if trees.is_empty() {
        return Ok(Vec::new());
    }

    let mut end_branches = vec![GmpeEndBranch {
        label: String::new(),
        weight: 1.0,
        models: BTreeMap::new(),
    }];

    for (&region, tree) in trees {
        let choices = region_choices(tree).map_err(|source| SamplingError::Region { region, source })?;
        let mut next = Vec::with_capacity(end_branches.len() * choices.len());
        for end_branch in &end_branches {
            for &(number, weight, model) in &choices {
                let label = if end_branch.label.is_empty() {
                    format!("{}_{}", region, number)
                } else {
                    format!("{}-{}_{}", end_branch.label, region, number)
                };
                let mut models = end_branch.models.clone();
                models.insert(region, model.clone());
                next.push(GmpeEndBranch {
                    label,
                    weight: end_branch.weight * weight,
                    models,
                });
            }
        }
        end_branches = next;
    }

    debug!(count = end_branches.len(), "enumerated ground-motion end branches");
    Ok(end_branches)
}
