//! Logic trees encoding epistemic uncertainty, and weighted branch selection.

pub mod selector;
pub mod tree;

use thiserror::Error;

pub use selector::select_branch;
pub use tree::{Branch, BranchingLevel, LogicTree, Rule, RuleKind};

/// Structural errors in a logic tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LogicTreeError {
    #[error("Logic tree has no branching levels")]
    NoLevels,

    #[error("Branching level {level} has no branches")]
    EmptyLevel { level: usize },

    #[error("Branch weights at branching level {level} sum to zero")]
    ZeroTotalWeight { level: usize },

    #[error("Branch {branch} at branching level {level} has invalid weight {weight}")]
    InvalidWeight { level: usize, branch: usize, weight: f64 },

    #[error("Branching level {level} out of range (tree has {num_levels} levels)")]
    LevelOutOfRange { level: usize, num_levels: usize },

    #[error("Branch {branch} out of range at branching level {level}")]
    BranchOutOfRange { level: usize, branch: usize },

    #[error("Rule: {0} not supported")]
    UnsupportedRule(String),

    #[error("Branch {branch} of the first branching level does not contain a source model")]
    MissingInputModel { branch: usize },

    #[error("No rule is defined for branch {branch} at branching level {level}")]
    MissingRule { level: usize, branch: usize },

    #[error("No end-branch model is defined for branch {branch}")]
    MissingEndBranch { branch: usize },
}
