//
// config.rs
// EOTRH-Score-rs
//
// Recognized configuration surface for the texture pipeline and the integrated
// scoring engine, with serde defaults matching the published scoring scheme.
//

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Integer scores assigned to the three entropy tiers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TierScores {
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl Default for TierScores {
    fn default() -> Self {
        Self {
            high: 10,
            medium: 5,
            low: 0,
        }
    }
}

/// Thresholds and sizes driving the per-ROI texture pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    /// Entropy above this value lands in the high tier.
    pub high_threshold: f64,
    /// Entropy at or above this value (up to the high threshold) lands in the medium tier.
    pub medium_threshold: f64,
    /// Side length of the square grid each ROI is resized to before entropy analysis.
    pub target_size: usize,
    /// Sample standard deviation under which a region counts as homogeneous.
    pub low_std_threshold: f64,
    /// Standard deviation under which the resized grid is only mean-centered.
    pub low_std_threshold_resized: f64,
    pub tier_scores: TierScores,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            high_threshold: 0.95,
            medium_threshold: 0.70,
            target_size: 64,
            low_std_threshold: 1e-6,
            low_std_threshold_resized: 1e-8,
            tier_scores: TierScores::default(),
        }
    }
}

/// Subsystem maxima, weights, and classification band boundaries for the
/// integrated scoring engine. Band boundaries are inclusive upper bounds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub max_clinical: u32,
    pub max_radiographic: u32,
    pub max_digital: u32,
    pub weight_clinical: f64,
    pub weight_radiographic: f64,
    pub weight_digital: f64,
    pub max_integrated: u32,
    pub band_low: u32,
    pub band_moderate: u32,
    pub band_high: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            max_clinical: 17,
            max_radiographic: 14,
            max_digital: 10,
            weight_clinical: 0.40,
            weight_radiographic: 0.40,
            weight_digital: 0.20,
            max_integrated: 41,
            band_low: 12,
            band_moderate: 25,
            band_high: 34,
        }
    }
}

/// Full configuration consumed by the core. All fields are defaulted, so a config
/// file only needs to spell out the values it overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub texture: TextureConfig,
    pub scoring: ScoringConfig,
}

impl AnalysisConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {:?}", path))
    }
}
