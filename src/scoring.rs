//
// scoring.rs
// EOTRH-Score-rs
//
// Sums and caps the manual subsystem scores and blends clinical, radiographic, and
// digital scores into the weighted 0-41 integrated classification.
//

use tracing::{debug, info};

use crate::config::ScoringConfig;
use crate::entropy;
use crate::models::{IntegratedResult, ManualFindings, RoiDetail};

/// Sum of the five clinical signs, capped at the configured clinical maximum.
pub fn clinical_score(findings: &ManualFindings, config: &ScoringConfig) -> u32 {
    let raw = findings.fistulae
        + findings.gingival_recession
        + findings.subgingival_bulbous_enlargement
        + findings.gingivitis
        + findings.bite_angle_not_correlated_with_age;
    let capped = raw.min(config.max_clinical);
    debug!(raw, capped, "clinical score");
    capped
}

/// Sum of the five radiographic signs, capped at the configured radiographic maximum.
pub fn radiographic_score(findings: &ManualFindings, config: &ScoringConfig) -> u32 {
    let raw = findings.teeth_affected
        + findings.missing_or_extracted_teeth
        + findings.tooth_shape
        + findings.tooth_structure
        + findings.tooth_surface;
    let capped = raw.min(config.max_radiographic);
    debug!(raw, capped, "radiographic score");
    capped
}

/// Blends the three capped subsystem scores into the integrated result.
///
/// Rounding is half-away-from-zero (`f64::round`); classification-band membership
/// is sensitive to the tie rule, so it is fixed here rather than left to a
/// banker's-rounding builtin.
pub fn integrate(
    clinical: u32,
    radiographic: u32,
    digital: u32,
    max_entropy: f64,
    roi_details: Vec<RoiDetail>,
    config: &ScoringConfig,
) -> IntegratedResult {
    let total_max = config.max_integrated;
    let total = weighted(clinical, config.max_clinical, config.weight_clinical, total_max)
        + weighted(
            radiographic,
            config.max_radiographic,
            config.weight_radiographic,
            total_max,
        )
        + weighted(digital, config.max_digital, config.weight_digital, total_max);

    let integrated = (total.round() as u32).min(total_max);
    let (classification, interpretation) = classify(integrated, config);
    info!(
        clinical,
        radiographic, digital, integrated, classification, "integrated score computed"
    );

    IntegratedResult {
        clinical_score: clinical,
        radiographic_score: radiographic,
        digital_score: digital,
        integrated_score: integrated,
        classification: classification.to_string(),
        interpretation: interpretation.to_string(),
        max_entropy: entropy::round4(max_entropy),
        roi_details,
    }
}

fn weighted(score: u32, subsystem_max: u32, weight: f64, total_max: u32) -> f64 {
    // A zero maximum means the subsystem was configured out; it contributes
    // nothing instead of dividing by zero.
    if subsystem_max == 0 {
        return 0.0;
    }
    f64::from(score) / f64::from(subsystem_max) * (f64::from(total_max) * weight)
}

/// Resolves the severity band for an integrated score. Band boundaries are
/// inclusive upper bounds.
pub fn classify(integrated: u32, config: &ScoringConfig) -> (&'static str, &'static str) {
    if integrated <= config.band_low {
        (
            "Low suspicion",
            "Findings are compatible with age-related change. Routine dental follow-up is sufficient.",
        )
    } else if integrated <= config.band_moderate {
        (
            "Moderate suspicion",
            "Early signs consistent with EOTRH. Radiographic re-examination within 6-12 months is recommended.",
        )
    } else if integrated <= config.band_high {
        (
            "High suspicion",
            "Findings strongly suggest EOTRH. A detailed dental examination and treatment planning are recommended.",
        )
    } else {
        (
            "Very high suspicion",
            "Findings indicate advanced EOTRH. Extraction of affected teeth should be considered.",
        )
    }
}
