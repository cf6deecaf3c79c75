//! Magnitude-frequency distributions.

use serde::{Deserialize, Serialize};

/// Tolerance used when deciding whether a bin center lies below the upper magnitude.
const MAG_TOLERANCE: f64 = 1e-6;

/// Seismic moment (N·m) released by an event of moment magnitude `mag`.
#[inline]
pub fn moment_from_mag(mag: f64) -> f64 {
    10f64.powf(1.5 * mag + 9.05)
}

/// Truncated Gutenberg-Richter distribution over evenly spaced magnitude bins.
///
/// Bin centers are `min_mag + i * delta` for `i in 0..num_mag`. Rates are
/// proportional to `10^(-b * m)` for every bin center up to `mag_upper` and
/// zero above it, scaled so the distribution releases `total_moment_rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GutenbergRichterParams", into = "GutenbergRichterParams")]
pub struct GutenbergRichterMfd {
    min_mag: f64,
    num_mag: usize,
    delta: f64,
    mag_upper: f64,
    b_value: f64,
    total_moment_rate: f64,
    rates: Vec<f64>,
}

/// Serialized form of a [`GutenbergRichterMfd`]; rates are always recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GutenbergRichterParams {
    pub min_mag: f64,
    pub num_mag: usize,
    pub delta: f64,
    pub mag_upper: f64,
    pub b_value: f64,
    pub total_moment_rate: f64,
}

impl GutenbergRichterMfd {
    /// Build a distribution over `[min_mag, num_mag, delta]` whose rates honour
    /// `(mag_lower, mag_upper, total_moment_rate, b_value)`.
    ///
    /// The total moment rate is matched exactly; the cumulative rate follows
    /// from it.
    pub fn from_moment_rate(
        min_mag: f64,
        num_mag: usize,
        delta: f64,
        mag_upper: f64,
        total_moment_rate: f64,
        b_value: f64,
    ) -> Self {
        let mut rates = Vec::with_capacity(num_mag);
        let mut moment = 0.0;
        for i in 0..num_mag {
            let mag = min_mag + i as f64 * delta;
            let rate = if mag <= mag_upper + MAG_TOLERANCE {
                10f64.powf(-b_value * mag)
            } else {
                0.0
            };
            moment += rate * moment_from_mag(mag);
            rates.push(rate);
        }

        if moment > 0.0 {
            let scale = total_moment_rate / moment;
            for rate in rates.iter_mut() {
                *rate *= scale;
            }
        }

        Self {
            min_mag,
            num_mag,
            delta,
            mag_upper,
            b_value,
            total_moment_rate,
            rates,
        }
    }

    /// Lowest bin center.
    #[inline]
    pub fn min_mag(&self) -> f64 {
        self.min_mag
    }

    /// Highest magnitude carrying a non-zero rate.
    #[inline]
    pub fn mag_upper(&self) -> f64 {
        self.mag_upper
    }

    /// Bin width.
    #[inline]
    pub fn delta(&self) -> f64 {
        self.delta
    }

    #[inline]
    pub fn num_mag(&self) -> usize {
        self.num_mag
    }

    #[inline]
    pub fn b_value(&self) -> f64 {
        self.b_value
    }

    /// Total moment rate the distribution was parametrized with.
    #[inline]
    pub fn total_moment_rate(&self) -> f64 {
        self.total_moment_rate
    }

    /// Bin center of the `i`-th bin.
    #[inline]
    pub fn mag(&self, i: usize) -> f64 {
        self.min_mag + i as f64 * self.delta
    }

    /// Incremental (per-bin) annual rates.
    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    pub fn total_cumulative_rate(&self) -> f64 {
        self.rates.iter().sum()
    }

    /// Moment rate summed over the bins, for checking conservation.
    pub fn computed_moment_rate(&self) -> f64 {
        self.rates
            .iter()
            .enumerate()
            .map(|(i, rate)| rate * moment_from_mag(self.mag(i)))
            .sum()
    }
}

impl TryFrom<GutenbergRichterParams> for GutenbergRichterMfd {
    type Error = String;

    fn try_from(p: GutenbergRichterParams) -> Result<Self, Self::Error> {
        if !(p.delta > 0.0) {
            return Err(format!("GR bin width must be positive, got {}", p.delta));
        }
        if p.num_mag == 0 {
            return Err("GR distribution needs at least one bin".to_string());
        }
        if !p.min_mag.is_finite() || !(p.mag_upper >= p.min_mag - MAG_TOLERANCE) {
            return Err(format!(
                "GR upper magnitude {} is below minimum magnitude {}",
                p.mag_upper, p.min_mag
            ));
        }
        if !(p.b_value >= 0.0) || !p.b_value.is_finite() {
            return Err(format!("GR b value must be non-negative, got {}", p.b_value));
        }
        if !(p.total_moment_rate >= 0.0) || !p.total_moment_rate.is_finite() {
            return Err(format!(
                "GR total moment rate must be finite and non-negative, got {}",
                p.total_moment_rate
            ));
        }
        Ok(Self::from_moment_rate(
            p.min_mag,
            p.num_mag,
            p.delta,
            p.mag_upper,
            p.total_moment_rate,
            p.b_value,
        ))
    }
}

impl From<GutenbergRichterMfd> for GutenbergRichterParams {
    fn from(mfd: GutenbergRichterMfd) -> Self {
        Self {
            min_mag: mfd.min_mag,
            num_mag: mfd.num_mag,
            delta: mfd.delta,
            mag_upper: mfd.mag_upper,
            b_value: mfd.b_value,
            total_moment_rate: mfd.total_moment_rate,
        }
    }
}

/// Arbitrary per-bin rates (characteristic, tabulated, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncrementalMfd {
    pub min_mag: f64,
    pub delta: f64,
    pub rates: Vec<f64>,
}

impl IncrementalMfd {
    pub fn new(min_mag: f64, delta: f64, rates: Vec<f64>) -> Self {
        Self { min_mag, delta, rates }
    }
}

/// A magnitude-frequency distribution attached to a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mfd {
    GutenbergRichter(GutenbergRichterMfd),
    Incremental(IncrementalMfd),
}

impl Mfd {
    pub fn as_gutenberg_richter(&self) -> Option<&GutenbergRichterMfd> {
        match self {
            Mfd::GutenbergRichter(gr) => Some(gr),
            Mfd::Incremental(_) => None,
        }
    }
}

impl From<GutenbergRichterMfd> for Mfd {
    fn from(gr: GutenbergRichterMfd) -> Self {
        Mfd::GutenbergRichter(gr)
    }
}

impl From<IncrementalMfd> for Mfd {
    fn from(mfd: IncrementalMfd) -> Self {
        Mfd::Incremental(mfd)
    }
}
