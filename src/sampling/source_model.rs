//! Source-model logic-tree sampling.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use tracing::debug;

use crate::logic_tree::{LogicTree, LogicTreeError};
use crate::mutation::apply_rule;
use crate::reader::SourceModelReader;
use crate::sampling::SamplingError;
use crate::types::config::SamplerConfig;
use crate::types::source::SeismicSource;

/// Draws source-model ensemble members from a source-model logic tree.
///
/// One member is produced in two stages:
/// 1. Level 0 is sampled once and the chosen branch's input model is loaded.
/// 2. Every source then draws its own branch at each later level, in level
///    order, and is replaced by the result of that branch's rule.
///
/// Draws are taken per (source, level), so two sources of one member can land
/// on different branches of the same level.
pub struct SourceModelSampler<'a, R: SourceModelReader + ?Sized> {
    reader: &'a R,
    config: &'a SamplerConfig,
}

impl<'a, R: SourceModelReader + ?Sized> SourceModelSampler<'a, R> {
    pub fn new(reader: &'a R, config: &'a SamplerConfig) -> Self {
        Self { reader, config }
    }

    /// Sample one member with a generator seeded from `seed`.
    pub fn sample(&self, tree: &LogicTree, seed: u64) -> Result<Vec<SeismicSource>, SamplingError> {
        let mut rng = Pcg64::seed_from_u64(seed);
        self.sample_with_rng(tree, &mut rng)
    }

    /// Sample one member, advancing `rng`. Repeated calls on the same
    /// generator build an ensemble.
    pub fn sample_with_rng<G: Rng + ?Sized>(
        &self,
        tree: &LogicTree,
        rng: &mut G,
    ) -> Result<Vec<SeismicSource>, SamplingError> {
        let mut sources = self.load_base_model(tree, rng)?;

        for source in sources.iter_mut() {
            for level in 1..tree.num_levels() {
                let number = tree.sample_branching_level(level, rng)?;
                let branch = tree.branch(level, number)?;
                let rule = branch
                    .rule
                    .as_ref()
                    .ok_or(LogicTreeError::MissingRule { level, branch: number })?;
                *source = apply_rule(source, rule)?;
            }
        }

        Ok(sources)
    }

    fn load_base_model<G: Rng + ?Sized>(
        &self,
        tree: &LogicTree,
        rng: &mut G,
    ) -> Result<Vec<SeismicSource>, SamplingError> {
        let number = tree.sample_branching_level(0, rng)?;
        let branch = tree.branch(0, number)?;
        let input_model = branch
            .input_model
            .as_deref()
            .ok_or(LogicTreeError::MissingInputModel { branch: number })?;

        let path = self.config.resolve_model_path(input_model);
        let sources = self.reader.load(&path, self.config.mfd_bin_width)?;
        debug!(
            branch = number,
            path = %path.display(),
            num_sources = sources.len(),
            "loaded base source model"
        );
        Ok(sources)
    }
}

/// Sample one source-model ensemble member for `seed`.
pub fn sample_source_model_logic_tree<R: SourceModelReader + ?Sized>(
    tree: &LogicTree,
    reader: &R,
    config: &SamplerConfig,
    seed: u64,
) -> Result<Vec<SeismicSource>, SamplingError> {
    SourceModelSampler::new(reader, config).sample(tree, seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic_tree::{Branch, BranchingLevel, LogicTreeError, Rule, RuleKind};
    use crate::reader::InMemorySourceModelReader;
    use crate::types::mfd::{GutenbergRichterMfd, Mfd};
    use crate::types::region::{Location, TectonicRegionType};
    use crate::types::source::FaultSource;

    fn fault(name: &str) -> SeismicSource {
        SeismicSource::Fault(FaultSource {
            id: name.to_lowercase(),
            name: name.to_string(),
            tectonic_region: TectonicRegionType::ActiveShallow,
            mfd: Mfd::GutenbergRichter(GutenbergRichterMfd::from_moment_rate(
                5.05, 20, 0.1, 6.95, 1.0e17, 1.0,
            )),
            trace: vec![Location::new(45.0, 10.0, 0.0), Location::new(45.3, 10.2, 0.0)],
            dip: 50.0,
            rake: -90.0,
            seismogenic_depth_lower: 12.0,
            seismogenic_depth_upper: 0.0,
            floating_rupture: true,
        })
    }

    fn reader() -> InMemorySourceModelReader {
        let mut reader = InMemorySourceModelReader::new();
        reader.insert("model_a.xml", vec![fault("A"), fault("B")]);
        reader.insert("model_b.xml", vec![fault("C")]);
        reader
    }

    fn tree() -> LogicTree {
        LogicTree::new(vec![
            BranchingLevel::new(
                0,
                "source models",
                vec![
                    Branch::with_input_model(1, 0.5, "model_a.xml"),
                    Branch::with_input_model(2, 0.5, "model_b.xml"),
                ],
            ),
            BranchingLevel::new(
                1,
                "b value",
                vec![
                    Branch::with_rule(1, 0.5, Rule::new(RuleKind::BValueGRRelative, -0.1)),
                    Branch::with_rule(2, 0.5, Rule::new(RuleKind::BValueGRRelative, 0.1)),
                ],
            ),
            BranchingLevel::new(
                2,
                "mmax",
                vec![
                    Branch::with_rule(1, 0.3, Rule::new(RuleKind::MaxMagnitudeGRRelative, -0.2)),
                    Branch::with_rule(2, 0.7, Rule::new(RuleKind::MaxMagnitudeGRRelative, 0.2)),
                ],
            ),
        ])
    }

    #[test]
    fn test_same_seed_same_member() {
        let reader = reader();
        let config = SamplerConfig::default();
        let tree = tree();
        for seed in 1..20 {
            let a = sample_source_model_logic_tree(&tree, &reader, &config, seed).unwrap();
            let b = sample_source_model_logic_tree(&tree, &reader, &config, seed).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_every_source_is_perturbed_by_each_level() {
        let reader = reader();
        let config = SamplerConfig::default();
        let sources = sample_source_model_logic_tree(&tree(), &reader, &config, 11).unwrap();
        for src in &sources {
            let gr = src.mfds()[0].as_gutenberg_richter().unwrap();
            assert!((gr.b_value() - 0.9).abs() < 1e-9 || (gr.b_value() - 1.1).abs() < 1e-9);
            assert!((gr.mag_upper() - 6.75).abs() < 1e-9 || (gr.mag_upper() - 7.15).abs() < 1e-9);
        }
    }

    #[test]
    fn test_base_sources_in_reader_untouched() {
        let reader = reader();
        let config = SamplerConfig::default();
        let _ = sample_source_model_logic_tree(&tree(), &reader, &config, 3).unwrap();
        let base = reader.load(std::path::Path::new("model_a.xml"), 0.1).unwrap();
        assert_eq!(base, vec![fault("A"), fault("B")]);
    }

    #[test]
    fn test_missing_input_model_is_fatal() {
        let mut tree = tree();
        for branch in tree.levels[0].branches.iter_mut() {
            branch.input_model = None;
        }
        let err = sample_source_model_logic_tree(&tree, &reader(), &SamplerConfig::default(), 5)
            .unwrap_err();
        assert!(matches!(
            err,
            SamplingError::Tree(LogicTreeError::MissingInputModel { .. })
        ));
    }

    #[test]
    fn test_missing_rule_is_fatal() {
        let mut tree = tree();
        for branch in tree.levels[2].branches.iter_mut() {
            branch.rule = None;
        }
        let err = sample_source_model_logic_tree(&tree, &reader(), &SamplerConfig::default(), 5)
            .unwrap_err();
        assert!(matches!(
            err,
            SamplingError::Tree(LogicTreeError::MissingRule { level: 2, .. })
        ));
    }

    #[test]
    fn test_zero_weight_level_is_fatal() {
        let mut tree = tree();
        for branch in tree.levels[1].branches.iter_mut() {
            branch.weight = 0.0;
        }
        let err = sample_source_model_logic_tree(&tree, &reader(), &SamplerConfig::default(), 5)
            .unwrap_err();
        assert!(matches!(
            err,
            SamplingError::Tree(LogicTreeError::ZeroTotalWeight { level: 1 })
        ));
    }

    #[test]
    fn test_negative_weight_is_fatal() {
        let mut tree = tree();
        tree.levels[1].branches.push(Branch::with_rule(
            3,
            -0.5,
            Rule::new(RuleKind::BValueGRRelative, 0.2),
        ));
        let err = sample_source_model_logic_tree(&tree, &reader(), &SamplerConfig::default(), 3)
            .unwrap_err();
        assert!(matches!(
            err,
            SamplingError::Tree(LogicTreeError::InvalidWeight { level: 1, branch: 3, .. })
        ));
    }

    #[test]
    fn test_single_level_tree_returns_base_model() {
        let tree = LogicTree::new(vec![BranchingLevel::new(
            0,
            "source models",
            vec![Branch::with_input_model(1, 1.0, "model_b.xml")],
        )]);
        let sources =
            sample_source_model_logic_tree(&tree, &reader(), &SamplerConfig::default(), 9).unwrap();
        assert_eq!(sources, vec![fault("C")]);
    }

    #[test]
    fn test_base_path_is_applied() {
        let mut reader = InMemorySourceModelReader::new();
        let path = std::path::Path::new("models").join("model_b.xml");
        reader.insert(path.to_string_lossy().into_owned(), vec![fault("C")]);
        let config = SamplerConfig {
            base_path: Some("models".to_string()),
            ..SamplerConfig::default()
        };
        let tree = LogicTree::new(vec![BranchingLevel::new(
            0,
            "source models",
            vec![Branch::with_input_model(1, 1.0, "model_b.xml")],
        )]);
        assert_eq!(
            sample_source_model_logic_tree(&tree, &reader, &config, 1).unwrap().len(),
            1
        );
    }
}
