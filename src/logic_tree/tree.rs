//! Logic tree, branching levels, branches and rules.

use std::collections::BTreeMap;
use std::str::FromStr;

use derive_more::Display;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::logic_tree::selector::select_branch;
use crate::logic_tree::LogicTreeError;

/// Parameter a rule perturbs. The set is closed.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RuleKind {
    /// Shift the Gutenberg-Richter maximum magnitude.
    #[display("mMaxGRRelative")]
    MaxMagnitudeGRRelative,
    /// Shift the Gutenberg-Richter b-value.
    #[display("bGRRelative")]
    BValueGRRelative,
}

impl FromStr for RuleKind {
    type Err = LogicTreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("mMaxGRRelative") {
            Ok(RuleKind::MaxMagnitudeGRRelative)
        } else if s.eq_ignore_ascii_case("bGRRelative") {
            Ok(RuleKind::BValueGRRelative)
        } else {
            Err(LogicTreeError::UnsupportedRule(s.to_string()))
        }
    }
}

impl TryFrom<String> for RuleKind {
    type Error = LogicTreeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<RuleKind> for String {
    fn from(kind: RuleKind) -> Self {
        kind.to_string()
    }
}

/// A parameter perturbation attached to a branch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub kind: RuleKind,
    pub value: f64,
}

impl Rule {
    pub fn new(kind: RuleKind, value: f64) -> Self {
        Self { kind, value }
    }

    /// Build a rule from its textual kind, rejecting unsupported kinds.
    pub fn parse(kind: &str, value: f64) -> Result<Self, LogicTreeError> {
        Ok(Self {
            kind: kind.parse()?,
            value,
        })
    }
}

/// One discrete choice on a branching level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    /// 1-based ordinal within the level.
    pub number: u32,
    pub weight: f64,
    /// Source-model (or model) reference; used on level 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_model: Option<String>,
    /// Perturbation; used on levels >= 1 of source-model trees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<Rule>,
}

impl Branch {
    pub fn with_input_model(number: u32, weight: f64, input_model: impl Into<String>) -> Self {
        Self {
            number,
            weight,
            input_model: Some(input_model.into()),
            rule: None,
        }
    }

    pub fn with_rule(number: u32, weight: f64, rule: Rule) -> Self {
        Self {
            number,
            weight,
            input_model: None,
            rule: Some(rule),
        }
    }

    /// A branch resolved only through a tree's end-branch map.
    pub fn bare(number: u32, weight: f64) -> Self {
        Self {
            number,
            weight,
            input_model: None,
            rule: None,
        }
    }
}

/// One axis of epistemic uncertainty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchingLevel {
    pub index: usize,
    #[serde(default)]
    pub label: String,
    pub branches: Vec<Branch>,
}

impl BranchingLevel {
    pub fn new(index: usize, label: impl Into<String>, branches: Vec<Branch>) -> Self {
        Self {
            index,
            label: label.into(),
            branches,
        }
    }

    pub fn weights(&self) -> Vec<f64> {
        self.branches.iter().map(|b| b.weight).collect()
    }

    pub fn total_weight(&self) -> f64 {
        self.branches.iter().map(|b| b.weight).sum()
    }

    /// Branch by 1-based number (position in the level).
    pub fn branch(&self, number: usize) -> Option<&Branch> {
        number.checked_sub(1).and_then(|i| self.branches.get(i))
    }
}

/// Ordered branching levels plus, for ground-motion trees, the end-branch map
/// from branch number (as a string) to a concrete model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicTree<E = ()> {
    pub levels: Vec<BranchingLevel>,
    #[serde(default)]
    pub end_branches: BTreeMap<String, E>,
}

impl<E> LogicTree<E> {
    /// A tree with no end-branch map.
    pub fn new(levels: Vec<BranchingLevel>) -> Self {
        Self {
            levels,
            end_branches: BTreeMap::new(),
        }
    }

    pub fn with_end_branches(levels: Vec<BranchingLevel>, end_branches: BTreeMap<String, E>) -> Self {
        Self {
            levels,
            end_branches,
        }
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn level(&self, index: usize) -> Result<&BranchingLevel, LogicTreeError> {
        self.levels.get(index).ok_or(LogicTreeError::LevelOutOfRange {
            level: index,
            num_levels: self.levels.len(),
        })
    }

    /// Branch at a 0-based level with a 1-based number.
    pub fn branch(&self, level: usize, number: usize) -> Result<&Branch, LogicTreeError> {
        self.level(level)?
            .branch(number)
            .ok_or(LogicTreeError::BranchOutOfRange { level, branch: number })
    }

    /// End-branch model selected by a branch number.
    pub fn end_branch(&self, number: usize) -> Option<&E> {
        self.end_branches.get(&number.to_string())
    }

    /// Draw one branch at `level` and return its 1-based number.
    pub fn sample_branching_level<R: Rng + ?Sized>(
        &self,
        level: usize,
        rng: &mut R,
    ) -> Result<usize, LogicTreeError> {
        let branching_level = self.level(level)?;
        let weights = branching_level.weights();
        let total: f64 = weights.iter().sum();
        let draw = rng.gen::<f64>() * total;
        let number = select_branch(&weights, draw, level)?;
        debug!(level, branch = number, draw, "sampled branching level");
        Ok(number)
    }

    /// Check the level and weight invariants shared by every tree.
    pub fn validate_structure(&self) -> Result<(), LogicTreeError> {
        if self.levels.is_empty() {
            return Err(LogicTreeError::NoLevels);
        }
        for (i, level) in self.levels.iter().enumerate() {
            if level.branches.is_empty() {
                return Err(LogicTreeError::EmptyLevel { level: i });
            }
            for (j, branch) in level.branches.iter().enumerate() {
                if !branch.weight.is_finite() || branch.weight < 0.0 {
                    return Err(LogicTreeError::InvalidWeight {
                        level: i,
                        branch: j + 1,
                        weight: branch.weight,
                    });
                }
            }
            if !(level.total_weight() > 0.0) {
                return Err(LogicTreeError::ZeroTotalWeight { level: i });
            }
        }
        Ok(())
    }

    /// Structure check plus the source-model payload layout: level 0 names an
    /// input model, every later level carries a rule.
    pub fn validate_source_model(&self) -> Result<(), LogicTreeError> {
        self.validate_structure()?;
        for (i, level) in self.levels.iter().enumerate() {
            for (j, branch) in level.branches.iter().enumerate() {
                if i == 0 && branch.input_model.is_none() {
                    return Err(LogicTreeError::MissingInputModel { branch: j + 1 });
                }
                if i > 0 && branch.rule.is_none() {
                    return Err(LogicTreeError::MissingRule { level: i, branch: j + 1 });
                }
            }
        }
        Ok(())
    }

    /// Structure check plus an end-branch entry for every level-0 branch.
    pub fn validate_gmpe(&self) -> Result<(), LogicTreeError> {
        self.validate_structure()?;
        for j in 1..=self.levels[0].branches.len() {
            if self.end_branch(j).is_none() {
                return Err(LogicTreeError::MissingEndBranch { branch: j });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn rule_tree() -> LogicTree {
        LogicTree::new(vec![
            BranchingLevel::new(0, "model", vec![Branch::with_input_model(1, 1.0, "model_a.xml")]),
            BranchingLevel::new(
                1,
                "mmax",
                vec![
                    Branch::with_rule(1, 0.2, Rule::new(RuleKind::MaxMagnitudeGRRelative, -0.2)),
                    Branch::with_rule(2, 0.6, Rule::new(RuleKind::MaxMagnitudeGRRelative, 0.0)),
                    Branch::with_rule(3, 0.2, Rule::new(RuleKind::MaxMagnitudeGRRelative, 0.2)),
                ],
            ),
        ])
    }

    #[test]
    fn test_rule_kind_parse_is_case_insensitive() {
        assert_eq!("mmaxgrrelative".parse::<RuleKind>().unwrap(), RuleKind::MaxMagnitudeGRRelative);
        assert_eq!("bGRRelative".parse::<RuleKind>().unwrap(), RuleKind::BValueGRRelative);
    }

    #[test]
    fn test_unsupported_rule_kind_rejected() {
        assert!(matches!(
            Rule::parse("aGRRelative", 0.1),
            Err(LogicTreeError::UnsupportedRule(name)) if name == "aGRRelative"
        ));
        let json = r#"{"kind": "slipRateRelative", "value": 0.5}"#;
        assert!(serde_json::from_str::<Rule>(json).is_err());
    }

    #[test]
    fn test_rule_serde_uses_canonical_name() {
        let rule = Rule::new(RuleKind::BValueGRRelative, 0.1);
        let json = serde_json::to_string(&rule).unwrap();
        assert!(json.contains("\"bGRRelative\""));
        assert_eq!(serde_json::from_str::<Rule>(&json).unwrap(), rule);
    }

    #[test]
    fn test_sample_branching_level_deterministic() {
        let tree = rule_tree();
        let mut rng1 = Pcg64::seed_from_u64(42);
        let mut rng2 = Pcg64::seed_from_u64(42);
        for _ in 0..100 {
            assert_eq!(
                tree.sample_branching_level(1, &mut rng1).unwrap(),
                tree.sample_branching_level(1, &mut rng2).unwrap()
            );
        }
    }

    #[test]
    fn test_sample_branching_level_frequencies() {
        let tree = rule_tree();
        let mut rng = Pcg64::seed_from_u64(7);
        let mut counts = [0usize; 3];
        let n = 20_000;
        for _ in 0..n {
            let b = tree.sample_branching_level(1, &mut rng).unwrap();
            counts[b - 1] += 1;
        }
        let freq_middle = counts[1] as f64 / n as f64;
        assert!((freq_middle - 0.6).abs() < 0.02);
        assert!(counts.iter().all(|&c| c > 0));
    }

    #[test]
    fn test_sample_level_out_of_range() {
        let tree = rule_tree();
        let mut rng = Pcg64::seed_from_u64(1);
        assert!(matches!(
            tree.sample_branching_level(5, &mut rng),
            Err(LogicTreeError::LevelOutOfRange { level: 5, num_levels: 2 })
        ));
    }

    #[test]
    fn test_validate_source_model_layout() {
        let tree = rule_tree();
        assert!(tree.validate_source_model().is_ok());

        let mut missing_rule = tree.clone();
        missing_rule.levels[1].branches[2].rule = None;
        assert!(matches!(
            missing_rule.validate_source_model(),
            Err(LogicTreeError::MissingRule { level: 1, branch: 3 })
        ));

        let mut negative = tree;
        negative.levels[1].branches[0].weight = -0.1;
        assert!(matches!(
            negative.validate_structure(),
            Err(LogicTreeError::InvalidWeight { level: 1, branch: 1, .. })
        ));
    }

    #[test]
    fn test_validate_gmpe_needs_end_branches() {
        let levels = vec![BranchingLevel::new(
            0,
            "gmpe",
            vec![Branch::bare(1, 0.5), Branch::bare(2, 0.5)],
        )];
        let mut end_branches = BTreeMap::new();
        end_branches.insert("1".to_string(), "BA_2008".to_string());
        let tree = LogicTree::with_end_branches(levels, end_branches);
        assert!(matches!(
            tree.validate_gmpe(),
            Err(LogicTreeError::MissingEndBranch { branch: 2 })
        ));
    }

    #[test]
    fn test_tree_json_roundtrip_keeps_end_branches() {
        let json = r#"{
            "levels": [{"index": 0, "branches": [{"number": 1, "weight": 1.0}]}],
            "end_branches": {"1": "CY_2008"}
        }"#;
        let tree: LogicTree<String> = serde_json::from_str(json).unwrap();
        assert_eq!(tree.end_branch(1).map(String::as_str), Some("CY_2008"));
        assert!(tree.end_branch(2).is_none());
    }
}
