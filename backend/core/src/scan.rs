//! Persisted scan records and the query types used against them.
//!
//! Field names are snake_case to match the Postgres columns exactly; the
//! full analysis rides along as an opaque `api_response` blob next to the
//! promoted scalar columns used for querying.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{PlantAnalysis, Severity};

/// A scan row as returned by the `plant_scans` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_url: String,
    pub image_path: String,
    pub plant_name: String,
    pub plant_scientific_name: Option<String>,
    pub is_healthy: bool,
    pub health_score: f64,
    pub status: String,
    pub api_response: PlantAnalysis,
    pub scan_date: DateTime<Utc>,
    #[serde(default)]
    pub is_favorite: bool,
}

/// Insert payload for `plant_scans`; id/scan_date are server-generated.
#[derive(Debug, Clone, Serialize)]
pub struct NewScan {
    pub user_id: Uuid,
    pub image_url: String,
    pub image_path: String,
    pub status: String,
    pub is_healthy: bool,
    pub health_score: f64,
    pub plant_name: String,
    pub plant_scientific_name: Option<String>,
    pub api_response: PlantAnalysis,
}

impl NewScan {
    /// Build the insert payload from an uploaded image and its analysis.
    /// Scans are only persisted once complete, so `status` is fixed.
    pub fn from_analysis(
        user_id: Uuid,
        image_url: impl Into<String>,
        image_path: impl Into<String>,
        analysis: PlantAnalysis,
    ) -> Self {
        Self {
            user_id,
            image_url: image_url.into(),
            image_path: image_path.into(),
            status: "completed".to_string(),
            is_healthy: analysis.health_assessment.is_healthy,
            health_score: analysis.health_assessment.health_score,
            plant_name: analysis.plant_identification.common_name.clone(),
            plant_scientific_name: analysis.plant_identification.scientific_name.clone(),
            api_response: analysis,
        }
    }
}

/// Insert payload for `detected_diseases`, one row per detected disease.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedDiseaseRow {
    pub scan_id: Uuid,
    pub disease_name: String,
    pub scientific_name: Option<String>,
    pub probability: f64,
    pub description: String,
    /// Flattened treatment summary: immediate actions, then chemical
    /// products, then organic methods.
    pub treatment: Vec<String>,
    pub prevention: Vec<String>,
    pub severity: Severity,
}

impl DetectedDiseaseRow {
    /// Flatten the analysis into one row per disease.
    pub fn from_analysis(scan_id: Uuid, analysis: &PlantAnalysis) -> Vec<Self> {
        let mut treatment: Vec<String> = analysis.treatments.immediate.clone();
        treatment.extend(
            analysis
                .treatments
                .chemical
                .iter()
                .filter_map(|t| t.product.clone()),
        );
        treatment.extend(
            analysis
                .treatments
                .organic
                .iter()
                .filter_map(|t| t.method.clone()),
        );

        analysis
            .diseases
            .iter()
            .map(|d| Self {
                scan_id,
                disease_name: d.name.clone(),
                scientific_name: d.scientific_name.clone(),
                probability: d.confidence,
                description: d.description.clone(),
                treatment: treatment.clone(),
                prevention: analysis.prevention.clone(),
                severity: d.severity.clone(),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// History queries
// ---------------------------------------------------------------------------

/// Health filter for history listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthFilter {
    Healthy,
    Diseased,
}

/// Relative date window for history listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    Today,
    Week,
    Month,
}

impl DateRange {
    /// Inclusive lower bound of the window, relative to `now`.
    pub fn start_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            DateRange::Today => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc())
                .unwrap_or(now),
            DateRange::Week => now - chrono::Duration::days(7),
            DateRange::Month => now - chrono::Duration::days(30),
        }
    }
}

/// Combined filter set for a history page.
#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
    pub health: Option<HealthFilter>,
    pub date_range: Option<DateRange>,
    /// Case-insensitive plant-name substring.
    pub search: Option<String>,
}

/// Aggregate counters shown above the history list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub total: usize,
    pub healthy: usize,
    pub diseased: usize,
    pub unique_plants: usize,
}

/// A locally-cached scan summary (the offline history mirror).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub scanned_at: DateTime<Utc>,
    pub plant_name: String,
    pub scientific_name: Option<String>,
    pub is_healthy: bool,
    pub health_score: f64,
    pub image_path: String,
    pub analysis: PlantAnalysis,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::*;

    fn analysis_with_disease() -> PlantAnalysis {
        PlantAnalysis {
            is_plant: true,
            plant_identification: PlantIdentification {
                common_name: "Tomato".to_string(),
                scientific_name: Some("Solanum lycopersicum".to_string()),
                family: Some("Solanaceae".to_string()),
                confidence: 0.9,
            },
            health_assessment: HealthAssessment {
                is_healthy: false,
                health_score: 45.0,
                overall_condition: Condition::Poor,
            },
            diseases: vec![Disease {
                name: "Early blight".to_string(),
                scientific_name: Some("Alternaria solani".to_string()),
                confidence: 0.8,
                severity: Severity::High,
                affected_parts: vec!["leaves".to_string()],
                symptoms: vec!["brown spots".to_string()],
                description: "Fungal disease".to_string(),
                causes: vec!["humidity".to_string()],
                spread: "Spores".to_string(),
            }],
            treatments: Treatments {
                immediate: vec!["Remove affected leaves".to_string()],
                chemical: vec![ChemicalTreatment {
                    product: Some("Copper fungicide".to_string()),
                    application: Some("Spray weekly".to_string()),
                    frequency: Some("Weekly".to_string()),
                }],
                organic: vec![OrganicTreatment {
                    method: Some("Neem oil".to_string()),
                    instructions: Some("Apply at dusk".to_string()),
                    effectiveness: Some("medium".to_string()),
                }],
                cultural: vec![],
            },
            prevention: vec!["Rotate crops".to_string()],
            growth_recommendations: GrowthRecommendations {
                water: WaterCare::default(),
                sunlight: SunlightCare::default(),
                soil: SoilCare::default(),
                temperature: TemperatureCare::default(),
                fertilizer: FertilizerCare::default(),
                pruning: PruningCare::default(),
            },
            additional_notes: String::new(),
            urgency_level: Urgency::High,
            follow_up_days: 7,
            analyzed_at: Utc::now(),
            ai_model: "gemini-1.5-pro".to_string(),
            parsing_note: None,
        }
    }

    #[test]
    fn disease_rows_flatten_treatments_in_order() {
        let analysis = analysis_with_disease();
        let rows = DetectedDiseaseRow::from_analysis(Uuid::new_v4(), &analysis);
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].treatment,
            vec![
                "Remove affected leaves".to_string(),
                "Copper fungicide".to_string(),
                "Neem oil".to_string(),
            ]
        );
        assert_eq!(rows[0].severity, Severity::High);
        assert_eq!(rows[0].probability, 0.8);
    }

    #[test]
    fn new_scan_promotes_scalar_columns() {
        let analysis = analysis_with_disease();
        let scan = NewScan::from_analysis(Uuid::new_v4(), "https://x/img.jpg", "u/img.jpg", analysis);
        assert_eq!(scan.status, "completed");
        assert_eq!(scan.plant_name, "Tomato");
        assert!(!scan.is_healthy);
        assert_eq!(scan.health_score, 45.0);
    }

    #[test]
    fn healthy_analysis_yields_no_disease_rows() {
        let mut analysis = analysis_with_disease();
        analysis.diseases.clear();
        let rows = DetectedDiseaseRow::from_analysis(Uuid::new_v4(), &analysis);
        assert!(rows.is_empty());
    }
}
