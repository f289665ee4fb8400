//
// texture.rs
// EOTRH-Score-rs
//
// Sequences extraction, normalization, and entropy over every ROI of one
// radiograph, isolating per-ROI failures, and maps the maximum entropy onto the
// digital score tiers.
//

use std::sync::Arc;

use image::GrayImage;
use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::config::TextureConfig;
use crate::entropy::{self, DistEn2d, EntropyBackend};
use crate::error::{RoiFailure, TextureError};
use crate::models::{RoiDetail, TextureAnalysis};
use crate::normalize;
use crate::prepare;
use crate::roi::{self, RoiPolygon};

/// Runs the digital texture pipeline for one radiograph and its ROI set.
///
/// Per-ROI failures never cross [`TextureAnalyzer::analyze`]; fatal whole-request
/// conditions are reported inside the outcome as an index-0 sentinel record with
/// a forced digital score of 0.
pub struct TextureAnalyzer {
    config: TextureConfig,
    backend: Option<Arc<dyn EntropyBackend>>,
}

impl TextureAnalyzer {
    /// Analyzer backed by the built-in DistEn2D implementation.
    pub fn new(config: TextureConfig) -> Self {
        Self::with_backend(config, Some(Arc::new(DistEn2d)))
    }

    /// Entropy backend availability is decided once, here. `None` marks every
    /// subsequent analysis as fatally degraded (score 0, failure records).
    pub fn with_backend(config: TextureConfig, backend: Option<Arc<dyn EntropyBackend>>) -> Self {
        Self { config, backend }
    }

    pub fn analyze(&self, image_bytes: &[u8], rois: &[RoiPolygon]) -> TextureAnalysis {
        let Some(backend) = self.backend.as_deref() else {
            let message = TextureError::BackendUnavailable.to_string();
            error!("{message}");
            // Every supplied ROI gets its own failure record for transparency;
            // a single index-0 sentinel stands in when there are none.
            let roi_details = if rois.is_empty() {
                vec![RoiDetail::failure(0, message.clone())]
            } else {
                (1..=rois.len())
                    .map(|index| RoiDetail::failure(index, message.clone()))
                    .collect()
            };
            return TextureAnalysis {
                max_entropy: 0.0,
                digital_score: 0,
                roi_details,
            };
        };

        let image = match prepare::decode_radiograph(image_bytes) {
            Ok(image) => image,
            Err(err) => {
                error!("radiograph preparation failed: {err}");
                return TextureAnalysis {
                    max_entropy: 0.0,
                    digital_score: 0,
                    roi_details: vec![RoiDetail::failure(0, err.to_string())],
                };
            }
        };

        if rois.is_empty() {
            warn!("no ROIs supplied; digital score defaults to 0");
            return TextureAnalysis {
                max_entropy: 0.0,
                digital_score: 0,
                roi_details: Vec::new(),
            };
        }

        info!(rois = rois.len(), backend = backend.name(), "analyzing ROI textures");

        // Each ROI's pipeline is independent and reads the same immutable image;
        // the order-preserving collect keeps the report aligned with the input
        // and the max reduction deterministic regardless of scheduling.
        let outcomes: Vec<(RoiDetail, Option<f64>)> = rois
            .par_iter()
            .enumerate()
            .map(|(i, polygon)| {
                let index = i + 1;
                match self.analyze_roi(backend, &image, polygon, index) {
                    Ok(value) => {
                        debug!(roi = index, entropy = value, "ROI analyzed");
                        (RoiDetail::success(index, value), Some(value))
                    }
                    Err(failure) => {
                        warn!(roi = index, %failure, "ROI excluded from aggregation");
                        (RoiDetail::failure(index, failure.to_string()), None)
                    }
                }
            })
            .collect();

        let max_entropy = outcomes
            .iter()
            .filter_map(|(_, value)| *value)
            .fold(0.0f64, f64::max);
        let roi_details: Vec<RoiDetail> = outcomes.into_iter().map(|(detail, _)| detail).collect();
        let digital_score = digital_score_for(max_entropy, &self.config);
        info!(max_entropy, digital_score, "texture analysis complete");

        TextureAnalysis {
            max_entropy: entropy::round4(max_entropy),
            digital_score,
            roi_details,
        }
    }

    fn analyze_roi(
        &self,
        backend: &dyn EntropyBackend,
        image: &GrayImage,
        polygon: &RoiPolygon,
        index: usize,
    ) -> Result<f64, RoiFailure> {
        let pixels = roi::extract_pixels(image, polygon);
        if pixels.is_empty() {
            return Err(RoiFailure::EmptyRegion);
        }
        let conditioned = normalize::condition(&pixels, index, &self.config)?;
        Ok(entropy::evaluate(backend, &conditioned)?)
    }
}

/// Maps the maximum observed entropy onto the configured tier scores. The medium
/// boundary is inclusive on both sides: value > high yields the high tier,
/// medium <= value <= high the medium tier, anything below the low tier.
pub fn digital_score_for(max_entropy: f64, config: &TextureConfig) -> u32 {
    if max_entropy > config.high_threshold {
        config.tier_scores.high
    } else if max_entropy >= config.medium_threshold {
        config.tier_scores.medium
    } else {
        config.tier_scores.low
    }
}
