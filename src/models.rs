//
// models.rs
// EOTRH-Score-rs
//
// Serializable data structures for manual findings, per-ROI analysis details, and
// the texture and integrated scoring results.
//

use serde::{Deserialize, Serialize};

/// Validated answers from the manual examination forms. The frontend submits the
/// numeric score of each selected option directly; option text is never re-parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualFindings {
    // Clinical signs
    pub fistulae: u32,
    pub gingival_recession: u32,
    pub subgingival_bulbous_enlargement: u32,
    pub gingivitis: u32,
    pub bite_angle_not_correlated_with_age: u32,
    // Radiographic signs
    pub teeth_affected: u32,
    pub missing_or_extracted_teeth: u32,
    pub tooth_shape: u32,
    pub tooth_structure: u32,
    pub tooth_surface: u32,
}

/// Outcome of one ROI's pipeline. Exactly one of `entropy` and `error` is set;
/// index 0 is reserved for sentinel records of failures that precede ROI iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiDetail {
    pub roi_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entropy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RoiDetail {
    pub fn success(roi_index: usize, entropy: f64) -> Self {
        Self {
            roi_index,
            entropy: Some(entropy),
            error: None,
        }
    }

    pub fn failure(roi_index: usize, error: impl Into<String>) -> Self {
        Self {
            roi_index,
            entropy: None,
            error: Some(error.into()),
        }
    }
}

/// Aggregate result of the digital texture stage for one radiograph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureAnalysis {
    /// Largest entropy among successfully analyzed ROIs, rounded to 4 decimals.
    pub max_entropy: f64,
    pub digital_score: u32,
    /// One record per supplied ROI, in input order.
    pub roi_details: Vec<RoiDetail>,
}

/// Final record combining the three subsystem scores with the weighted
/// classification. Immutable once constructed; never persisted across requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegratedResult {
    pub clinical_score: u32,
    pub radiographic_score: u32,
    pub digital_score: u32,
    pub integrated_score: u32,
    pub classification: String,
    pub interpretation: String,
    pub max_entropy: f64,
    pub roi_details: Vec<RoiDetail>,
}
