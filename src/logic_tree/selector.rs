//! Weighted branch selection.

use crate::logic_tree::LogicTreeError;

/// Select a branch given its weights and a draw in `[0, total_weight)`.
///
/// Weights are accumulated in order and the first position whose running sum
/// exceeds `draw` is returned as a 1-based branch number. A draw that overruns
/// the accumulated total through rounding resolves to the last branch.
/// Negative or non-finite weights are rejected.
pub fn select_branch(weights: &[f64], draw: f64, level: usize) -> Result<usize, LogicTreeError> {
    if weights.is_empty() {
        return Err(LogicTreeError::EmptyLevel { level });
    }

    if let Some((i, &weight)) = weights
        .iter()
        .enumerate()
        .find(|(_, w)| !w.is_finite() || **w < 0.0)
    {
        return Err(LogicTreeError::InvalidWeight {
            level,
            branch: i + 1,
            weight,
        });
    }

    let total: f64 = weights.iter().sum();
    if !(total > 0.0) {
        return Err(LogicTreeError::ZeroTotalWeight { level });
    }

    let mut cumulative = 0.0;
    for (i, weight) in weights.iter().enumerate() {
        cumulative += weight;
        if draw < cumulative {
            return Ok(i + 1);
        }
    }

    Ok(weights.len())
}
