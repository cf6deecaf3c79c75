//! Monte Carlo logic-tree sampling for seismic hazard.
//!
//! Draws ensemble members from a source-model logic tree (base model choice
//! plus per-source parameter perturbations) and from per-region ground-motion
//! logic trees. Parsing of model files and hazard integration live elsewhere;
//! this crate only decides which alternatives a realization uses.

pub mod types;
pub mod logic_tree;
pub mod mutation;
pub mod reader;
pub mod sampling;

pub use logic_tree::{Branch, BranchingLevel, LogicTree, LogicTreeError, Rule, RuleKind};
pub use mutation::{apply_rule, MutationError};
pub use reader::{InMemorySourceModelReader, ReaderError, SourceModelReader};
pub use sampling::{
    sample_gmpe_logic_tree, sample_source_model_logic_tree, Realization, SamplingError,
};
pub use types::{SamplerConfig, SeismicSource, TectonicRegionType};

#[cfg(feature = "python")]
mod python {
    use std::collections::{BTreeMap, HashMap};

    use pyo3::prelude::*;

    use crate::logic_tree::LogicTree;
    use crate::reader::InMemorySourceModelReader;
    use crate::sampling::runner::{run_ensemble_parallel, EnsembleBatchConfig};
    use crate::sampling::{sample_gmpe_logic_tree, sample_source_model_logic_tree};
    use crate::types::config::SamplerConfig;
    use crate::types::region::TectonicRegionType;

    fn runtime_error(e: impl std::fmt::Display) -> PyErr {
        PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(e.to_string())
    }

    fn parse_source_tree(tree_json: &str) -> PyResult<LogicTree> {
        serde_json::from_str(tree_json).map_err(runtime_error)
    }

    fn parse_gmpe_trees(trees_json: &str) -> PyResult<BTreeMap<TectonicRegionType, LogicTree<String>>> {
        serde_json::from_str(trees_json).map_err(runtime_error)
    }

    #[pymethods]
    impl SamplerConfig {
        #[new]
        #[pyo3(signature = (
            mfd_bin_width = 0.1,
            seed = 0,
            number_of_samples = 1,
            base_path = None,
            source_model_logic_tree_file = None,
            gmpe_logic_tree_file = None,
            n_workers = None
        ))]
        fn py_new(
            mfd_bin_width: f64,
            seed: u64,
            number_of_samples: u32,
            base_path: Option<String>,
            source_model_logic_tree_file: Option<String>,
            gmpe_logic_tree_file: Option<String>,
            n_workers: Option<usize>,
        ) -> Self {
            Self {
                mfd_bin_width,
                seed,
                number_of_samples,
                base_path,
                source_model_logic_tree_file,
                gmpe_logic_tree_file,
                n_workers,
            }
        }

        fn __repr__(&self) -> String {
            format!(
                "SamplerConfig(mfd_bin_width={}, seed={}, number_of_samples={})",
                self.mfd_bin_width, self.seed, self.number_of_samples
            )
        }
    }

    /// Sample one source model. Returns the source list as JSON.
    ///
    /// # Arguments
    /// * `tree_json` - Source-model logic tree
    /// * `models_json` - Object mapping input-model references to source lists
    /// * `mfd_bin_width` - Magnitude bin width handed to the reader
    /// * `seed` - Random seed
    #[pyfunction]
    fn sample_source_model(
        tree_json: &str,
        models_json: &str,
        mfd_bin_width: f64,
        seed: u64,
    ) -> PyResult<String> {
        let tree = parse_source_tree(tree_json)?;
        let reader = InMemorySourceModelReader::from_json(models_json).map_err(runtime_error)?;
        let config = SamplerConfig {
            mfd_bin_width,
            ..SamplerConfig::default()
        };
        let sources =
            sample_source_model_logic_tree(&tree, &reader, &config, seed).map_err(runtime_error)?;
        serde_json::to_string(&sources).map_err(runtime_error)
    }

    /// Sample one ground-motion model name per tectonic region.
    #[pyfunction]
    fn sample_gmpe(trees_json: &str, seed: u64) -> PyResult<HashMap<String, String>> {
        let trees = parse_gmpe_trees(trees_json)?;
        let models = sample_gmpe_logic_tree(&trees, seed).map_err(runtime_error)?;
        Ok(models
            .into_iter()
            .map(|(region, model)| (region.to_string(), model))
            .collect())
    }

    /// Draw `config.number_of_samples` realizations in parallel.
    /// Returns one JSON document per realization.
    #[pyfunction]
    fn sample_ensemble(
        tree_json: &str,
        models_json: &str,
        gmpe_json: &str,
        config: SamplerConfig,
    ) -> PyResult<Vec<String>> {
        let source_tree = parse_source_tree(tree_json)?;
        let gmpe_trees = parse_gmpe_trees(gmpe_json)?;
        let reader = InMemorySourceModelReader::from_json(models_json).map_err(runtime_error)?;

        let realizations = run_ensemble_parallel(EnsembleBatchConfig {
            source_tree: &source_tree,
            gmpe_trees: &gmpe_trees,
            reader: &reader,
            config: &config,
        })
        .map_err(runtime_error)?;

        realizations
            .iter()
            .map(|r| serde_json::to_string(r).map_err(runtime_error))
            .collect()
    }

    /// Python module definition
    #[pymodule]
    fn lt_sampler_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(sample_source_model, m)?)?;
        m.add_function(wrap_pyfunction!(sample_gmpe, m)?)?;
        m.add_function(wrap_pyfunction!(sample_ensemble, m)?)?;
        m.add_class::<SamplerConfig>()?;
        Ok(())
    }
}
