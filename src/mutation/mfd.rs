//! Gutenberg-Richter mutations.
//!
//! Both functions derive a fresh distribution from an existing one. The total
//! moment rate of the input is carried over unchanged; rates are re-derived
//! from it.

use crate::mutation::MutationError;
use crate::types::mfd::GutenbergRichterMfd;

/// Shift the maximum magnitude by `delta_mmax`, keeping `mag_upper` on a bin center.
///
/// The upper bin center is moved to its bin edge, shifted, rounded to a
/// multiple of the bin width, and moved back to the bin center. Fails when
/// fewer than two bins would remain.
pub fn apply_max_magnitude_delta(
    mfd: &GutenbergRichterMfd,
    delta_mmax: f64,
    source_name: &str,
) -> Result<GutenbergRichterMfd, MutationError> {
    let min_mag = mfd.min_mag();
    let b_value = mfd.b_value();
    let total_moment_rate = mfd.total_moment_rate();
    let delta = mfd.delta();

    let mut mag_upper = mfd.mag_upper() + delta / 2.0 + delta_mmax;
    mag_upper = (mag_upper / delta).round() * delta;
    mag_upper -= delta / 2.0;

    if mag_upper - min_mag < delta {
        return Err(MutationError::MagnitudeRangeCollapse {
            source_name: source_name.to_string(),
            delta: delta_mmax,
        });
    }

    let num_mag = ((mag_upper - min_mag) / delta + 1.0).round() as usize;

    Ok(GutenbergRichterMfd::from_moment_rate(
        min_mag,
        num_mag,
        delta,
        mag_upper,
        total_moment_rate,
        b_value,
    ))
}

/// Shift the b-value by `delta_b`. Fails when the result is negative.
pub fn apply_b_value_delta(
    mfd: &GutenbergRichterMfd,
    delta_b: f64,
    source_name: &str,
) -> Result<GutenbergRichterMfd, MutationError> {
    let min_mag = mfd.min_mag();
    let mag_upper = mfd.mag_upper();
    let total_moment_rate = mfd.total_moment_rate();
    let delta = mfd.delta();

    let b_value = mfd.b_value() + delta_b;
    if b_value < 0.0 {
        return Err(MutationError::NegativeBValue {
            source_name: source_name.to_string(),
            delta: delta_b,
        });
    }

    let num_mag = ((mag_upper - min_mag) / delta + 1.0).round() as usize;

    Ok(GutenbergRichterMfd::from_moment_rate(
        min_mag,
        num_mag,
        delta,
        mag_upper,
        total_moment_rate,
        b_value,
    ))
}
