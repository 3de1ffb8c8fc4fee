//! The normalized analysis record produced for every scan.
//!
//! Every field is guaranteed populated by the response normalizer; consumers
//! never see a partially-filled record. Wire names are camelCase to match
//! the JSON the vision model is prompted for and the `api_response` blobs
//! persisted alongside scans.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fully-populated result of one plant analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantAnalysis {
    pub is_plant: bool,
    pub plant_identification: PlantIdentification,
    pub health_assessment: HealthAssessment,
    /// Empty when the plant is healthy.
    pub diseases: Vec<Disease>,
    pub treatments: Treatments,
    pub prevention: Vec<String>,
    pub growth_recommendations: GrowthRecommendations,
    pub additional_notes: String,
    pub urgency_level: Urgency,
    pub follow_up_days: u32,
    /// When the analysis was produced (stamped by the normalizer).
    pub analyzed_at: DateTime<Utc>,
    /// Model identifier the request was sent to.
    pub ai_model: String,
    /// Present only when the raw response could not be parsed and a
    /// fallback record was synthesized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsing_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantIdentification {
    pub common_name: String,
    pub scientific_name: Option<String>,
    pub family: Option<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthAssessment {
    pub is_healthy: bool,
    pub health_score: f64,
    pub overall_condition: Condition,
}

/// One detected disease or issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disease {
    pub name: String,
    pub scientific_name: Option<String>,
    pub confidence: f64,
    pub severity: Severity,
    pub affected_parts: Vec<String>,
    pub symptoms: Vec<String>,
    pub description: String,
    pub causes: Vec<String>,
    pub spread: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Treatments {
    pub immediate: Vec<String>,
    pub chemical: Vec<ChemicalTreatment>,
    pub organic: Vec<OrganicTreatment>,
    pub cultural: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChemicalTreatment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganicTreatment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effectiveness: Option<String>,
}

// ---------------------------------------------------------------------------
// Growth recommendations
// ---------------------------------------------------------------------------

/// Care guidance, one sub-record per concern.
///
/// The normalizer substitutes a complete sub-record when one is wholly
/// absent; a present-but-partial sub-record is kept as-is (no per-field
/// backfill), so inner fields are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthRecommendations {
    pub water: WaterCare,
    pub sunlight: SunlightCare,
    pub soil: SoilCare,
    pub temperature: TemperatureCare,
    pub fertilizer: FertilizerCare,
    pub pruning: PruningCare,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaterCare {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signs_overwatering: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signs_underwatering: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SunlightCare {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoilCare {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub soil_type: Option<String>,
    // The model is prompted for a literal `pH` key.
    #[serde(rename = "pH", default, skip_serializing_if = "Option::is_none")]
    pub ph: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drainage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amendments: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemperatureCare {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FertilizerCare {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub fertilizer_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PruningCare {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub how: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
}

// ---------------------------------------------------------------------------
// Level enums
// ---------------------------------------------------------------------------

/// Disease severity. Unknown wire values are preserved rather than rejected;
/// display code falls back to a generic rendering for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
    #[serde(untagged)]
    Other(String),
}

impl Severity {
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
            Severity::Other(s) => s,
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Medium
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How urgently the plant needs attention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    None,
    Low,
    Medium,
    High,
    Critical,
    #[serde(untagged)]
    Other(String),
}

impl Urgency {
    pub fn as_str(&self) -> &str {
        match self {
            Urgency::None => "none",
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
            Urgency::Critical => "critical",
            Urgency::Other(s) => s,
        }
    }
}

impl Default for Urgency {
    fn default() -> Self {
        Urgency::None
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall plant condition label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
    #[serde(untagged)]
    Other(String),
}

impl Condition {
    pub fn as_str(&self) -> &str {
        match self {
            Condition::Excellent => "Excellent",
            Condition::Good => "Good",
            Condition::Fair => "Fair",
            Condition::Poor => "Poor",
            Condition::Critical => "Critical",
            Condition::Other(s) => s,
        }
    }
}

impl Default for Condition {
    fn default() -> Self {
        Condition::Good
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_roundtrips_known_levels() {
        let s: Severity = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(s, Severity::High);
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"high\"");
    }

    #[test]
    fn severity_preserves_unknown_levels() {
        let s: Severity = serde_json::from_str("\"catastrophic\"").unwrap();
        assert_eq!(s, Severity::Other("catastrophic".to_string()));
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"catastrophic\"");
    }

    #[test]
    fn condition_serializes_capitalized() {
        assert_eq!(serde_json::to_string(&Condition::Good).unwrap(), "\"Good\"");
        let c: Condition = serde_json::from_str("\"Fair\"").unwrap();
        assert_eq!(c, Condition::Fair);
    }

    #[test]
    fn soil_care_uses_literal_ph_key() {
        let soil = SoilCare {
            soil_type: Some("Loam".to_string()),
            ph: Some("6.5".to_string()),
            drainage: None,
            amendments: None,
        };
        let json = serde_json::to_value(&soil).unwrap();
        assert_eq!(json["type"], "Loam");
        assert_eq!(json["pH"], "6.5");
    }

    #[test]
    fn partial_water_record_keeps_gaps() {
        let water: WaterCare = serde_json::from_str(r#"{"frequency":"Daily"}"#).unwrap();
        assert_eq!(water.frequency.as_deref(), Some("Daily"));
        assert!(water.amount.is_none());
        let json = serde_json::to_value(&water).unwrap();
        assert!(json.get("amount").is_none());
    }
}
