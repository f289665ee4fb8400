//
// normalize.rs
// EOTRH-Score-rs
//
// Conditions extracted ROI pixel samples into a fixed-size, zero-mean/unit-variance
// grid for entropy analysis, special-casing near-constant regions.
//

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma};
use ndarray::Array2;
use tracing::{debug, info, warn};

use crate::config::TextureConfig;
use crate::error::RoiFailure;

/// Conditioned pixel grid handed to the entropy backend.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedRoi {
    /// Near-constant region; its distribution entropy is defined as zero and the
    /// backend is never invoked.
    Homogeneous,
    Grid(Array2<f64>),
}

/// Runs the conditioning pipeline over one ROI's samples:
/// homogeneity gate, [0, 1] scaling, square reshape with zero padding,
/// anti-aliased resize to the target size, and Z-score normalization.
///
/// The square reshape does not preserve the ROI's spatial layout; entropy is
/// evaluated on the intensity distribution, not on recovered geometry.
pub fn condition(
    samples: &[u8],
    roi_index: usize,
    config: &TextureConfig,
) -> Result<NormalizedRoi, RoiFailure> {
    if samples.is_empty() {
        return Err(RoiFailure::EmptyRegion);
    }
    if config.target_size == 0 {
        return Err(RoiFailure::Resize(
            "target grid size must be non-zero".to_string(),
        ));
    }

    let (_, std_initial) = mean_std(samples.iter().map(|&v| f64::from(v)));
    if std_initial < config.low_std_threshold {
        info!(roi = roi_index, "homogeneous region, entropy defined as 0");
        return Ok(NormalizedRoi::Homogeneous);
    }

    let scaled: Vec<f32> = samples.iter().map(|&v| f32::from(v) / 255.0).collect();

    // Smallest square that holds every sample, zero-padded at the tail.
    let mut dim = (scaled.len() as f64).sqrt() as usize;
    if dim * dim < scaled.len() {
        dim += 1;
    }
    let mut padded = scaled;
    padded.resize(dim * dim, 0.0);

    let square: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_raw(dim as u32, dim as u32, padded)
            .ok_or_else(|| RoiFailure::Resize("square reshape buffer mismatch".to_string()))?;
    let target = config.target_size as u32;
    let resized = imageops::resize(&square, target, target, FilterType::Triangle);
    debug!(roi = roi_index, from = dim, to = config.target_size, "region resized");

    let values: Vec<f64> = resized.into_raw().into_iter().map(f64::from).collect();
    let (mean, std) = mean_std(values.iter().copied());

    // The resize can flatten what little variance was left; in that case only
    // mean-centering is applied to avoid a division blow-up.
    let normalized: Vec<f64> = if std < config.low_std_threshold_resized {
        warn!(roi = roi_index, std, "near-zero variance after resize, centering only");
        values.into_iter().map(|v| v - mean).collect()
    } else {
        values.into_iter().map(|v| (v - mean) / std).collect()
    };

    if normalized.iter().any(|v| !v.is_finite()) {
        return Err(RoiFailure::NonFiniteGrid);
    }

    let grid = Array2::from_shape_vec((config.target_size, config.target_size), normalized)
        .map_err(|e| RoiFailure::Resize(e.to_string()))?;
    Ok(NormalizedRoi::Grid(grid))
}

fn mean_std(values: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let count = values.clone().count();
    if count == 0 {
        return (0.0, 0.0);
    }
    let n = count as f64;
    let mean = values.clone().sum::<f64>() / n;
    let variance = values.map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
