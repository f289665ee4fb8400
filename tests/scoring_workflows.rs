//
// scoring_workflows.rs
// EOTRH-Score-rs
//
// Integration-style tests covering the texture pipeline (ROI isolation, sentinel
// records, max aggregation) and the integrated scoring engine's properties.
//

use std::io::Cursor;
use std::sync::Arc;

use eotrh_score::config::{AnalysisConfig, ScoringConfig, TextureConfig};
use eotrh_score::entropy::EntropyBackend;
use eotrh_score::error::EntropyError;
use eotrh_score::models::ManualFindings;
use eotrh_score::roi::RoiSet;
use eotrh_score::scoring;
use eotrh_score::texture::{digital_score_for, TextureAnalyzer};
use image::{GrayImage, Luma};
use ndarray::Array2;

/// Deterministic noise radiograph with a flat patch in the upper-left corner.
fn radiograph_png() -> Vec<u8> {
    let mut state = 0x5eed_u64;
    let img = GrayImage::from_fn(96, 96, |x, y| {
        if x < 40 && y < 40 {
            // Constant region, wide enough that a dilated ROI stays inside it.
            Luma([128])
        } else {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            Luma([(state >> 56) as u8])
        }
    });
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("encode png");
    buf
}

fn small_grid_config() -> TextureConfig {
    // Smaller target grid keeps the pairwise entropy pass fast in tests.
    TextureConfig {
        target_size: 32,
        ..TextureConfig::default()
    }
}

fn findings(values: [u32; 10]) -> ManualFindings {
    ManualFindings {
        fistulae: values[0],
        gingival_recession: values[1],
        subgingival_bulbous_enlargement: values[2],
        gingivitis: values[3],
        bite_angle_not_correlated_with_age: values[4],
        teeth_affected: values[5],
        missing_or_extracted_teeth: values[6],
        tooth_shape: values[7],
        tooth_structure: values[8],
        tooth_surface: values[9],
    }
}

/// Backend stub reporting a fixed entropy for every non-sentinel grid.
struct FixedEntropy(f64);

impl EntropyBackend for FixedEntropy {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn distribution_entropy(&self, _grid: &Array2<f64>) -> Result<f64, EntropyError> {
        Ok(self.0)
    }
}

#[test]
fn homogeneous_roi_reports_entropy_zero_without_error() {
    let analyzer = TextureAnalyzer::new(small_grid_config());
    let rois = RoiSet::from_json("[[[8, 8], [30, 8], [30, 30], [8, 30]]]").expect("rois");

    let outcome = analyzer.analyze(&radiograph_png(), rois.polygons());
    assert_eq!(outcome.roi_details.len(), 1);
    let detail = &outcome.roi_details[0];
    assert_eq!(detail.roi_index, 1);
    assert_eq!(detail.entropy, Some(0.0));
    assert!(detail.error.is_none());
    assert_eq!(outcome.max_entropy, 0.0);
    assert_eq!(outcome.digital_score, 0);
}

#[test]
fn invalid_roi_is_isolated_and_does_not_pollute_the_maximum() {
    let analyzer = TextureAnalyzer::new(small_grid_config());
    // First polygon lies entirely outside the 96x96 image; second is textured.
    let rois = RoiSet::from_json(
        "[[[500, 500], [540, 500], [540, 540]], [[50, 50], [90, 50], [90, 90], [50, 90]]]",
    )
    .expect("rois");

    let outcome = analyzer.analyze(&radiograph_png(), rois.polygons());
    assert_eq!(outcome.roi_details.len(), 2);

    let bad = &outcome.roi_details[0];
    assert_eq!(bad.roi_index, 1);
    assert!(bad.entropy.is_none());
    assert!(bad.error.as_deref().unwrap().contains("no pixels"));

    let good = &outcome.roi_details[1];
    assert_eq!(good.roi_index, 2);
    let entropy = good.entropy.expect("textured ROI succeeds");
    assert!(good.error.is_none());
    assert!(entropy > 0.0 && entropy <= 1.0);
    assert_eq!(outcome.max_entropy, entropy);
    assert_eq!(outcome.digital_score, digital_score_for(entropy, &small_grid_config()));
}

#[test]
fn maximum_entropy_drives_the_medium_tier_score() {
    // One textured ROI (stubbed at 0.80) and one homogeneous ROI (0.0 by
    // definition): the aggregate is the maximum, landing in the medium tier.
    let analyzer = TextureAnalyzer::with_backend(
        small_grid_config(),
        Some(Arc::new(FixedEntropy(0.80))),
    );
    let rois = RoiSet::from_json(
        "[[[50, 50], [90, 50], [90, 90], [50, 90]], [[8, 8], [30, 8], [30, 30], [8, 30]]]",
    )
    .expect("rois");

    let outcome = analyzer.analyze(&radiograph_png(), rois.polygons());
    assert_eq!(outcome.roi_details[0].entropy, Some(0.80));
    assert_eq!(outcome.roi_details[1].entropy, Some(0.0));
    assert_eq!(outcome.max_entropy, 0.80);
    assert_eq!(outcome.digital_score, 5);
}

#[test]
fn entropy_above_the_high_threshold_scores_ten() {
    let analyzer = TextureAnalyzer::with_backend(
        small_grid_config(),
        Some(Arc::new(FixedEntropy(0.97))),
    );
    let rois = RoiSet::from_json("[[[50, 50], [90, 50], [90, 90], [50, 90]]]").expect("rois");

    let outcome = analyzer.analyze(&radiograph_png(), rois.polygons());
    assert_eq!(outcome.max_entropy, 0.97);
    assert_eq!(outcome.digital_score, 10);
}

#[test]
fn unavailable_backend_fails_every_roi_and_forces_score_zero() {
    let analyzer = TextureAnalyzer::with_backend(small_grid_config(), None);
    let rois = RoiSet::from_json(
        "[[[50, 50], [90, 50], [90, 90]], [[8, 8], [30, 8], [30, 30]]]",
    )
    .expect("rois");

    let outcome = analyzer.analyze(&radiograph_png(), rois.polygons());
    assert_eq!(outcome.max_entropy, 0.0);
    assert_eq!(outcome.digital_score, 0);
    assert_eq!(outcome.roi_details.len(), 2);
    let messages: Vec<_> = outcome
        .roi_details
        .iter()
        .map(|d| d.error.clone().expect("failure record"))
        .collect();
    assert_eq!(messages[0], messages[1]);
    assert!(messages[0].contains("not available"));
    assert_eq!(outcome.roi_details[0].roi_index, 1);
    assert_eq!(outcome.roi_details[1].roi_index, 2);
}

#[test]
fn unavailable_backend_without_rois_leaves_a_single_sentinel() {
    let analyzer = TextureAnalyzer::with_backend(small_grid_config(), None);
    let outcome = analyzer.analyze(&radiograph_png(), &[]);

    assert_eq!(outcome.roi_details.len(), 1);
    assert_eq!(outcome.roi_details[0].roi_index, 0);
    assert!(outcome.roi_details[0].error.is_some());
    assert_eq!(outcome.digital_score, 0);
}

#[test]
fn undecodable_image_short_circuits_with_a_sentinel_record() {
    let analyzer = TextureAnalyzer::new(small_grid_config());
    let rois = RoiSet::from_json("[[[0, 0], [10, 0], [10, 10]]]").expect("rois");

    let outcome = analyzer.analyze(b"not an image at all", rois.polygons());
    assert_eq!(outcome.max_entropy, 0.0);
    assert_eq!(outcome.digital_score, 0);
    assert_eq!(outcome.roi_details.len(), 1);
    assert_eq!(outcome.roi_details[0].roi_index, 0);
    assert!(outcome.roi_details[0]
        .error
        .as_deref()
        .unwrap()
        .contains("decode"));
}

#[test]
fn empty_roi_set_yields_score_zero_and_no_details() {
    let analyzer = TextureAnalyzer::new(small_grid_config());
    let outcome = analyzer.analyze(&radiograph_png(), &[]);
    assert_eq!(outcome.max_entropy, 0.0);
    assert_eq!(outcome.digital_score, 0);
    assert!(outcome.roi_details.is_empty());
}

#[test]
fn integrated_score_stays_within_the_configured_scale() {
    let config = ScoringConfig::default();
    for clinical in [0u32, 5, 11, 17] {
        for radio in [0u32, 4, 9, 14] {
            for digital in [0u32, 5, 10] {
                let result =
                    scoring::integrate(clinical, radio, digital, 0.5, Vec::new(), &config);
                assert!(result.integrated_score <= config.max_integrated);
            }
        }
    }
}

#[test]
fn integrated_score_is_monotone_in_every_subsystem() {
    let config = ScoringConfig::default();
    let base = scoring::integrate(6, 6, 5, 0.0, Vec::new(), &config).integrated_score;
    for (c, r, d) in [(7, 6, 5), (6, 7, 5), (6, 6, 10)] {
        let raised = scoring::integrate(c, r, d, 0.0, Vec::new(), &config).integrated_score;
        assert!(raised >= base);
    }
}

#[test]
fn integration_is_idempotent() {
    let config = ScoringConfig::default();
    let first = scoring::integrate(9, 7, 5, 0.8123, Vec::new(), &config);
    let second = scoring::integrate(9, 7, 5, 0.8123, Vec::new(), &config);
    assert_eq!(first, second);
}

#[test]
fn all_maxima_reach_the_top_band() {
    let config = ScoringConfig::default();
    let result = scoring::integrate(17, 14, 10, 0.99, Vec::new(), &config);
    assert_eq!(result.integrated_score, 41);
    assert_eq!(result.classification, "Very high suspicion");
}

#[test]
fn all_zeros_stay_in_the_bottom_band() {
    let config = ScoringConfig::default();
    let result = scoring::integrate(0, 0, 0, 0.0, Vec::new(), &config);
    assert_eq!(result.integrated_score, 0);
    assert_eq!(result.classification, "Low suspicion");
    assert!(!result.interpretation.is_empty());
}

#[test]
fn full_pipeline_produces_a_coherent_result_record() {
    let config = AnalysisConfig {
        texture: small_grid_config(),
        ..AnalysisConfig::default()
    };
    let analyzer = TextureAnalyzer::new(config.texture.clone());
    let rois = RoiSet::from_json("[[[50, 50], [90, 50], [90, 90], [50, 90]]]").expect("rois");

    let texture = analyzer.analyze(&radiograph_png(), rois.polygons());
    assert_eq!(texture.roi_details.len(), rois.len());

    let manual = findings([1, 2, 1, 1, 0, 2, 1, 1, 0, 1]);
    let clinical = scoring::clinical_score(&manual, &config.scoring);
    let radiographic = scoring::radiographic_score(&manual, &config.scoring);
    assert_eq!(clinical, 5);
    assert_eq!(radiographic, 5);

    let result = scoring::integrate(
        clinical,
        radiographic,
        texture.digital_score,
        texture.max_entropy,
        texture.roi_details,
        &config.scoring,
    );
    assert_eq!(result.clinical_score, 5);
    assert_eq!(result.radiographic_score, 5);
    assert_eq!(result.digital_score, texture.digital_score);
    assert_eq!(result.max_entropy, texture.max_entropy);
    assert_eq!(result.roi_details.len(), 1);
    assert!(!result.classification.is_empty());
    assert!(!result.interpretation.is_empty());

    let json = serde_json::to_string(&result).expect("serialize result");
    assert!(json.contains("integrated_score"));
}
