//
// entropy.rs
// EOTRH-Score-rs
//
// 2-D distribution entropy (DistEn2D) backend and the evaluator contract applied
// on top of it: sentinel short-circuit, finite check, 4-decimal rounding.
//

use ndarray::Array2;
use rayon::prelude::*;
use tracing::debug;

use crate::error::EntropyError;
use crate::normalize::NormalizedRoi;

/// Template (embedding) dimension used for every evaluation.
pub const EMBEDDING_DIM: usize = 2;
/// Delay between samples when forming template patches.
pub const TIME_DELAY: usize = 1;

/// Capability seam for the 2-D distribution-entropy algorithm. Availability is
/// resolved once when the analyzer is built, never re-checked per ROI.
pub trait EntropyBackend: Send + Sync {
    /// Backend name, used in logs.
    fn name(&self) -> &'static str;

    /// Returns the textural complexity of a normalized grid; higher values mean
    /// less regular intensity distributions.
    fn distribution_entropy(&self, grid: &Array2<f64>) -> Result<f64, EntropyError>;
}

/// Native DistEn2D: Chebyshev distances between all m x m template patches,
/// histogrammed with Sturges binning and reduced to a Shannon entropy normalized
/// by log2(bins), giving a value in [0, 1].
#[derive(Debug, Default, Clone, Copy)]
pub struct DistEn2d;

impl EntropyBackend for DistEn2d {
    fn name(&self) -> &'static str {
        "DistEn2D"
    }

    fn distribution_entropy(&self, grid: &Array2<f64>) -> Result<f64, EntropyError> {
        dist_en_2d(grid, EMBEDDING_DIM, TIME_DELAY)
    }
}

/// Applies the evaluator contract over a backend result. The homogeneous sentinel
/// yields 0.0 without invoking the backend at all.
pub fn evaluate(backend: &dyn EntropyBackend, roi: &NormalizedRoi) -> Result<f64, EntropyError> {
    match roi {
        NormalizedRoi::Homogeneous => Ok(0.0),
        NormalizedRoi::Grid(grid) => {
            let raw = backend.distribution_entropy(grid)?;
            if !raw.is_finite() {
                return Err(EntropyError::NonFinite);
            }
            Ok(round4(raw))
        }
    }
}

/// Entropy values are reported with 4 decimal digits.
pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn dist_en_2d(grid: &Array2<f64>, m: usize, tau: usize) -> Result<f64, EntropyError> {
    let (rows, cols) = grid.dim();
    let span = (m - 1) * tau;
    if rows <= span || cols <= span {
        return Err(EntropyError::GridTooSmall { rows, cols, m, tau });
    }

    let nh = rows - span;
    let nw = cols - span;
    let template_len = m * m;
    let count = nh * nw;
    if count < 2 {
        return Err(EntropyError::GridTooSmall { rows, cols, m, tau });
    }

    // Flatten every m x m patch (with delay tau) into a row of the template table.
    let mut templates = vec![0.0f64; count * template_len];
    for i in 0..nh {
        for j in 0..nw {
            let base = (i * nw + j) * template_len;
            for a in 0..m {
                for b in 0..m {
                    templates[base + a * m + b] = grid[[i + a * tau, j + b * tau]];
                }
            }
        }
    }

    let template = |idx: usize| &templates[idx * template_len..(idx + 1) * template_len];
    let chebyshev = |a: &[f64], b: &[f64]| {
        a.iter()
            .zip(b)
            .map(|(x, y)| (x - y).abs())
            .fold(0.0f64, f64::max)
    };

    // Pass 1: observed distance range over the upper-triangle pair space.
    let (dist_min, dist_max) = (0..count - 1)
        .into_par_iter()
        .map(|i| {
            let a = template(i);
            let mut local = (f64::INFINITY, f64::NEG_INFINITY);
            for j in (i + 1)..count {
                let d = chebyshev(a, template(j));
                local.0 = local.0.min(d);
                local.1 = local.1.max(d);
            }
            local
        })
        .reduce(
            || (f64::INFINITY, f64::NEG_INFINITY),
            |x, y| (x.0.min(y.0), x.1.max(y.1)),
        );

    let pair_count = count * (count - 1) / 2;
    // Sturges' rule, matching the reference parameterization.
    let bins = ((pair_count as f64).log2() + 1.0).ceil().max(1.0) as usize;

    let range = dist_max - dist_min;
    if bins == 1 || !(range > 0.0) {
        // A point-mass distance distribution has zero entropy by definition.
        return Ok(0.0);
    }
    let width = range / bins as f64;

    // Pass 2: histogram of the same pair space; the fold/sum reduction is
    // deterministic regardless of rayon's scheduling.
    let histogram = (0..count - 1)
        .into_par_iter()
        .fold(
            || vec![0u64; bins],
            |mut acc, i| {
                let a = template(i);
                for j in (i + 1)..count {
                    let d = chebyshev(a, template(j));
                    let idx = (((d - dist_min) / width) as usize).min(bins - 1);
                    acc[idx] += 1;
                }
                acc
            },
        )
        .reduce(
            || vec![0u64; bins],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b) {
                    *x += y;
                }
                a
            },
        );

    let total = pair_count as f64;
    let entropy: f64 = histogram
        .iter()
        .filter(|&&freq| freq > 0)
        .map(|&freq| {
            let p = freq as f64 / total;
            -p * p.log2()
        })
        .sum();
    let normalized = entropy / (bins as f64).log2();
    debug!(bins, pair_count, entropy = normalized, "DistEn2D evaluated");
    Ok(normalized)
}
