//! Response normalizer: raw model text in, complete analysis record out.
//!
//! Vision models return markdown-fenced JSON with missing fields, wrong
//! types, or plain prose. This module absorbs all of that: parse failures
//! synthesize a fallback record, partial parses are filled field-by-field
//! with defaults. It never returns an error.

use chrono::Utc;
use once_cell::sync::Lazy;
use plantdoc_core::{
    ChemicalTreatment, Condition, Disease, FertilizerCare, GrowthRecommendations,
    HealthAssessment, OrganicTreatment, PlantAnalysis, PlantIdentification, PruningCare,
    Severity, SoilCare, SunlightCare, TemperatureCare, Treatments, Urgency, WaterCare,
};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

static JSON_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new("```json\n?").unwrap());
static BARE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new("```\n?").unwrap());

/// Normalize one raw model response into a fully-populated record.
pub fn normalize_analysis(raw: &str, model: &str) -> PlantAnalysis {
    let cleaned = strip_code_fences(raw);
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(Value::Object(map)) => validate_and_enhance(
            serde_json::from_value(Value::Object(map)).unwrap_or_default(),
            model,
        ),
        Ok(other) => {
            warn!(kind = kind_name(&other), "analysis response is not a JSON object");
            validate_and_enhance(RawAnalysis::default(), model)
        }
        Err(err) => {
            warn!(error = %err, "analysis response is not valid JSON, synthesizing fallback");
            fallback_analysis(raw, model)
        }
    }
}

/// Remove markdown code fences so fenced and unfenced payloads parse alike.
pub fn strip_code_fences(text: &str) -> String {
    let no_json_fence = JSON_FENCE.replace_all(text, "");
    let no_fence = BARE_FENCE.replace_all(&no_json_fence, "");
    no_fence.trim().to_string()
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Tolerant wire shapes
// ---------------------------------------------------------------------------

/// Accept a field of any JSON type; a type mismatch reads as absent instead
/// of failing the whole record.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    #[serde(default, deserialize_with = "lenient")]
    is_plant: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    plant_identification: Option<RawIdentification>,
    #[serde(default, deserialize_with = "lenient")]
    health_assessment: Option<RawHealth>,
    #[serde(default, deserialize_with = "lenient")]
    diseases: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    treatments: Option<RawTreatments>,
    #[serde(default, deserialize_with = "lenient")]
    prevention: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    growth_recommendations: Option<RawGrowth>,
    #[serde(default, deserialize_with = "lenient")]
    additional_notes: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    urgency_level: Option<Urgency>,
    #[serde(default, deserialize_with = "lenient")]
    follow_up_days: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIdentification {
    #[serde(default, deserialize_with = "lenient")]
    common_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    scientific_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    family: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    confidence: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHealth {
    #[serde(default, deserialize_with = "lenient")]
    is_healthy: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    health_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    overall_condition: Option<Condition>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDisease {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    scientific_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    severity: Option<Severity>,
    #[serde(default, deserialize_with = "lenient")]
    affected_parts: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    symptoms: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    causes: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    spread: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawTreatments {
    #[serde(default, deserialize_with = "lenient")]
    immediate: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    chemical: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    organic: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    cultural: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawGrowth {
    #[serde(default, deserialize_with = "lenient")]
    water: Option<WaterCare>,
    #[serde(default, deserialize_with = "lenient")]
    sunlight: Option<SunlightCare>,
    #[serde(default, deserialize_with = "lenient")]
    soil: Option<SoilCare>,
    #[serde(default, deserialize_with = "lenient")]
    temperature: Option<TemperatureCare>,
    #[serde(default, deserialize_with = "lenient")]
    fertilizer: Option<FertilizerCare>,
    #[serde(default, deserialize_with = "lenient")]
    pruning: Option<PruningCare>,
}

// ---------------------------------------------------------------------------
// Field-level validation
// ---------------------------------------------------------------------------

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn string_or(value: Option<String>, default: &str) -> String {
    non_empty(value).unwrap_or_else(|| default.to_string())
}

/// Confidence must land in (0, 1]; anything else reads as unknown.
pub(crate) fn valid_confidence(value: Option<f64>) -> f64 {
    match value {
        Some(c) if c.is_finite() && c > 0.0 && c <= 1.0 => c,
        _ => 0.5,
    }
}

/// Health score must land in [0, 100]; zero is a legitimate score.
fn valid_health_score(value: Option<f64>) -> f64 {
    match value {
        Some(s) if s.is_finite() && (0.0..=100.0).contains(&s) => s,
        _ => 70.0,
    }
}

fn valid_follow_up(value: Option<f64>) -> u32 {
    match value {
        Some(d) if d.is_finite() && d > 0.0 => d as u32,
        _ => 14,
    }
}

fn severity_or_default(value: Option<Severity>) -> Severity {
    match value {
        Some(Severity::Other(s)) if s.is_empty() => Severity::default(),
        Some(s) => s,
        None => Severity::default(),
    }
}

fn urgency_or_default(value: Option<Urgency>) -> Urgency {
    match value {
        Some(Urgency::Other(s)) if s.is_empty() => Urgency::default(),
        Some(u) => u,
        None => Urgency::default(),
    }
}

fn condition_or_default(value: Option<Condition>) -> Condition {
    match value {
        Some(Condition::Other(s)) if s.is_empty() => Condition::default(),
        Some(c) => c,
        None => Condition::default(),
    }
}

fn typed_entries<T>(entries: Option<Vec<Value>>) -> Vec<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    entries
        .unwrap_or_default()
        .into_iter()
        .map(|entry| serde_json::from_value(entry).unwrap_or_default())
        .collect()
}

fn normalize_disease(entry: Value) -> Disease {
    let raw: RawDisease = serde_json::from_value(entry).unwrap_or_default();
    Disease {
        name: string_or(raw.name, "Unknown Issue"),
        scientific_name: non_empty(raw.scientific_name),
        confidence: valid_confidence(raw.confidence),
        severity: severity_or_default(raw.severity),
        affected_parts: raw.affected_parts.unwrap_or_default(),
        symptoms: raw.symptoms.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        causes: raw.causes.unwrap_or_default(),
        spread: raw.spread.unwrap_or_default(),
    }
}

fn validate_and_enhance(parsed: RawAnalysis, model: &str) -> PlantAnalysis {
    let identification = parsed.plant_identification.unwrap_or_default();
    let health = parsed.health_assessment.unwrap_or_default();
    let treatments = parsed.treatments.unwrap_or_default();
    let growth = parsed.growth_recommendations.unwrap_or_default();

    PlantAnalysis {
        is_plant: parsed.is_plant.unwrap_or(true),
        plant_identification: PlantIdentification {
            common_name: string_or(identification.common_name, "Unknown Plant"),
            scientific_name: non_empty(identification.scientific_name),
            family: non_empty(identification.family),
            confidence: valid_confidence(identification.confidence),
        },
        health_assessment: HealthAssessment {
            is_healthy: health.is_healthy.unwrap_or(true),
            health_score: valid_health_score(health.health_score),
            overall_condition: condition_or_default(health.overall_condition),
        },
        diseases: parsed
            .diseases
            .unwrap_or_default()
            .into_iter()
            .map(normalize_disease)
            .collect(),
        treatments: Treatments {
            immediate: treatments.immediate.unwrap_or_default(),
            chemical: typed_entries::<ChemicalTreatment>(treatments.chemical),
            organic: typed_entries::<OrganicTreatment>(treatments.organic),
            cultural: treatments.cultural.unwrap_or_default(),
        },
        prevention: parsed.prevention.unwrap_or_default(),
        growth_recommendations: GrowthRecommendations {
            water: growth.water.unwrap_or_else(standard_water),
            sunlight: growth.sunlight.unwrap_or_else(standard_sunlight),
            soil: growth.soil.unwrap_or_else(standard_soil),
            temperature: growth.temperature.unwrap_or_else(standard_temperature),
            fertilizer: growth.fertilizer.unwrap_or_else(standard_fertilizer),
            pruning: growth.pruning.unwrap_or_else(standard_pruning),
        },
        additional_notes: parsed.additional_notes.unwrap_or_default(),
        urgency_level: urgency_or_default(parsed.urgency_level),
        follow_up_days: valid_follow_up(parsed.follow_up_days),
        analyzed_at: Utc::now(),
        ai_model: model.to_string(),
        parsing_note: None,
    }
}

// ---------------------------------------------------------------------------
// Stand-in guidance when the model omits a growth section
// ---------------------------------------------------------------------------

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Complete stand-in guidance set for providers that return none at all.
pub(crate) fn standard_growth_guidance() -> GrowthRecommendations {
    GrowthRecommendations {
        water: standard_water(),
        sunlight: standard_sunlight(),
        soil: standard_soil(),
        temperature: standard_temperature(),
        fertilizer: standard_fertilizer(),
        pruning: standard_pruning(),
    }
}

fn standard_water() -> WaterCare {
    WaterCare {
        frequency: Some("When top inch of soil is dry".to_string()),
        amount: Some("Water thoroughly until drainage".to_string()),
        method: Some("Water at soil level".to_string()),
        signs_overwatering: Some(strings(&["Yellow leaves", "Wilting despite wet soil"])),
        signs_underwatering: Some(strings(&["Dry, crispy leaves", "Drooping"])),
    }
}

fn standard_sunlight() -> SunlightCare {
    SunlightCare {
        requirement: Some("Bright indirect light".to_string()),
        hours: Some("6-8 hours".to_string()),
        intensity: Some("Indirect".to_string()),
        tips: Some(strings(&["Rotate plant regularly"])),
    }
}

fn standard_soil() -> SoilCare {
    SoilCare {
        soil_type: Some("Well-draining potting mix".to_string()),
        ph: Some("6.0-7.0".to_string()),
        drainage: Some("Good drainage required".to_string()),
        amendments: Some(strings(&["Perlite", "Compost"])),
    }
}

fn standard_temperature() -> TemperatureCare {
    TemperatureCare {
        optimal: Some("18-24°C (65-75°F)".to_string()),
        minimum: Some("10°C (50°F)".to_string()),
        maximum: Some("30°C (86°F)".to_string()),
        humidity: Some("Moderate (40-60%)".to_string()),
    }
}

fn standard_fertilizer() -> FertilizerCare {
    FertilizerCare {
        fertilizer_type: Some("Balanced liquid fertilizer".to_string()),
        npk: Some("10-10-10".to_string()),
        frequency: Some("Monthly during growing season".to_string()),
        season: Some("Spring and Summer".to_string()),
    }
}

fn standard_pruning() -> PruningCare {
    PruningCare {
        when: Some("As needed".to_string()),
        how: Some("Remove dead or yellowing leaves".to_string()),
        frequency: Some("Monthly inspection".to_string()),
    }
}

// ---------------------------------------------------------------------------
// Fallback synthesis for unparseable responses
// ---------------------------------------------------------------------------

fn fallback_analysis(raw: &str, model: &str) -> PlantAnalysis {
    let lower = raw.to_lowercase();
    let has_issue = lower.contains("disease") || lower.contains("unhealthy");

    PlantAnalysis {
        is_plant: true,
        plant_identification: PlantIdentification {
            common_name: "Plant (identification pending)".to_string(),
            scientific_name: None,
            family: None,
            confidence: 0.3,
        },
        health_assessment: HealthAssessment {
            is_healthy: !has_issue,
            health_score: if has_issue { 50.0 } else { 75.0 },
            overall_condition: if has_issue { Condition::Fair } else { Condition::Good },
        },
        diseases: Vec::new(),
        treatments: Treatments {
            immediate: strings(&["Please retake the photo with better lighting"]),
            chemical: Vec::new(),
            organic: Vec::new(),
            cultural: Vec::new(),
        },
        prevention: strings(&["Regular monitoring recommended"]),
        growth_recommendations: fallback_growth_guidance(),
        additional_notes: "Analysis was partially successful. Consider retaking the photo \
                           with better lighting and focus."
            .to_string(),
        urgency_level: Urgency::Low,
        follow_up_days: 7,
        analyzed_at: Utc::now(),
        ai_model: model.to_string(),
        parsing_note: Some("Fallback response generated".to_string()),
    }
}

fn fallback_growth_guidance() -> GrowthRecommendations {
    GrowthRecommendations {
        water: WaterCare {
            frequency: Some("Check soil moisture before watering".to_string()),
            amount: Some("Water thoroughly until drainage".to_string()),
            method: Some("Water at soil level, avoid leaves".to_string()),
            signs_overwatering: Some(strings(&["Yellow leaves", "Root rot smell"])),
            signs_underwatering: Some(strings(&["Wilting", "Dry crispy leaves"])),
        },
        sunlight: SunlightCare {
            requirement: Some("Varies by plant type".to_string()),
            hours: Some("4-8 hours depending on species".to_string()),
            intensity: Some("Check plant-specific requirements".to_string()),
            tips: Some(strings(&["Observe leaf color for light stress signs"])),
        },
        soil: SoilCare {
            soil_type: Some("Well-draining potting mix".to_string()),
            ph: Some("6.0-7.0 for most plants".to_string()),
            drainage: Some("Ensure drainage holes".to_string()),
            amendments: Some(strings(&["Perlite for drainage", "Compost for nutrients"])),
        },
        temperature: TemperatureCare {
            optimal: Some("18-24°C (65-75°F)".to_string()),
            minimum: Some("Protect from frost".to_string()),
            maximum: Some("Provide shade in extreme heat".to_string()),
            humidity: Some("Most plants prefer 40-60%".to_string()),
        },
        fertilizer: FertilizerCare {
            fertilizer_type: Some("Balanced fertilizer".to_string()),
            npk: Some("10-10-10 or similar".to_string()),
            frequency: Some("Monthly during growing season".to_string()),
            season: Some("Spring through early fall".to_string()),
        },
        pruning: PruningCare {
            when: Some("Remove dead/damaged parts anytime".to_string()),
            how: Some("Use clean, sharp tools".to_string()),
            frequency: Some("As needed".to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = "gemini-1.5-pro";

    fn equal_modulo_timestamp(mut a: PlantAnalysis, b: &PlantAnalysis) -> bool {
        a.analyzed_at = b.analyzed_at;
        a == *b
    }

    #[test]
    fn full_record_passes_through() {
        let raw = r#"{
            "isPlant": true,
            "plantIdentification": {
                "commonName": "Tomato",
                "scientificName": "Solanum lycopersicum",
                "family": "Solanaceae",
                "confidence": 0.92
            },
            "healthAssessment": {
                "isHealthy": false,
                "healthScore": 45,
                "overallCondition": "Poor"
            },
            "diseases": [{
                "name": "Early blight",
                "scientificName": "Alternaria solani",
                "confidence": 0.81,
                "severity": "high",
                "affectedParts": ["leaves"],
                "symptoms": ["Brown concentric rings"],
                "description": "Fungal leaf spot disease",
                "causes": ["Warm humid weather"],
                "spread": "Splashing water"
            }],
            "treatments": {
                "immediate": ["Remove affected leaves"],
                "chemical": [{"product": "Chlorothalonil", "application": "Foliar spray", "frequency": "Every 7 days"}],
                "organic": [{"method": "Neem oil", "instructions": "Spray weekly", "effectiveness": "medium"}],
                "cultural": ["Improve air circulation"]
            },
            "prevention": ["Rotate crops"],
            "growthRecommendations": {
                "water": {"frequency": "Twice weekly", "amount": "Deep", "method": "Drip", "signs_overwatering": ["Yellowing"], "signs_underwatering": ["Wilt"]},
                "sunlight": {"requirement": "Full sun", "hours": "8+", "intensity": "Direct", "tips": ["Stake plants"]},
                "soil": {"type": "Loam", "pH": "6.2-6.8", "drainage": "Good", "amendments": ["Compost"]},
                "temperature": {"optimal": "21-27°C", "minimum": "10°C", "maximum": "35°C", "humidity": "50%"},
                "fertilizer": {"type": "Tomato feed", "npk": "5-10-10", "frequency": "Biweekly", "season": "Summer"},
                "pruning": {"when": "Early season", "how": "Remove suckers", "frequency": "Weekly"}
            },
            "additionalNotes": "Monitor lower leaves",
            "urgencyLevel": "high",
            "followUpDays": 5
        }"#;

        let record = normalize_analysis(raw, MODEL);
        assert!(record.is_plant);
        assert_eq!(record.plant_identification.common_name, "Tomato");
        assert_eq!(
            record.plant_identification.scientific_name.as_deref(),
            Some("Solanum lycopersicum")
        );
        assert_eq!(record.plant_identification.confidence, 0.92);
        assert!(!record.health_assessment.is_healthy);
        assert_eq!(record.health_assessment.health_score, 45.0);
        assert_eq!(record.health_assessment.overall_condition, Condition::Poor);
        assert_eq!(record.diseases.len(), 1);
        assert_eq!(record.diseases[0].severity, Severity::High);
        assert_eq!(record.treatments.chemical[0].product.as_deref(), Some("Chlorothalonil"));
        assert_eq!(
            record.growth_recommendations.soil.ph.as_deref(),
            Some("6.2-6.8")
        );
        assert_eq!(record.urgency_level, Urgency::High);
        assert_eq!(record.follow_up_days, 5);
        assert_eq!(record.ai_model, MODEL);
        assert!(record.parsing_note.is_none());
    }

    #[test]
    fn empty_object_yields_default_record() {
        let record = normalize_analysis("{}", MODEL);
        assert!(record.is_plant);
        assert_eq!(record.plant_identification.common_name, "Unknown Plant");
        assert!(record.plant_identification.scientific_name.is_none());
        assert_eq!(record.plant_identification.confidence, 0.5);
        assert!(record.health_assessment.is_healthy);
        assert_eq!(record.health_assessment.health_score, 70.0);
        assert_eq!(record.health_assessment.overall_condition, Condition::Good);
        assert!(record.diseases.is_empty());
        assert!(record.treatments.immediate.is_empty());
        assert!(record.prevention.is_empty());
        assert_eq!(
            record.growth_recommendations.water.frequency.as_deref(),
            Some("When top inch of soil is dry")
        );
        assert_eq!(record.additional_notes, "");
        assert_eq!(record.urgency_level, Urgency::None);
        assert_eq!(record.follow_up_days, 14);
        assert!(record.parsing_note.is_none());
    }

    #[test]
    fn prose_falls_back_with_note() {
        let record = normalize_analysis("I can see a plant but cannot tell more.", MODEL);
        assert!(record.is_plant);
        assert_eq!(
            record.plant_identification.common_name,
            "Plant (identification pending)"
        );
        assert_eq!(record.plant_identification.confidence, 0.3);
        assert!(record.health_assessment.is_healthy);
        assert_eq!(record.health_assessment.health_score, 75.0);
        assert!(record.diseases.is_empty());
        assert_eq!(record.treatments.immediate.len(), 1);
        assert_eq!(
            record.treatments.immediate[0],
            "Please retake the photo with better lighting"
        );
        assert_eq!(record.urgency_level, Urgency::Low);
        assert_eq!(record.follow_up_days, 7);
        assert_eq!(
            record.parsing_note.as_deref(),
            Some("Fallback response generated")
        );
        assert_eq!(
            record.growth_recommendations.water.frequency.as_deref(),
            Some("Check soil moisture before watering")
        );
    }

    #[test]
    fn fallback_infers_health_from_keywords() {
        let record = normalize_analysis("The leaves show signs of disease and decay.", MODEL);
        assert!(!record.health_assessment.is_healthy);
        assert_eq!(record.health_assessment.health_score, 50.0);
        assert_eq!(record.health_assessment.overall_condition, Condition::Fair);
    }

    #[test]
    fn fenced_and_unfenced_match() {
        let bare = r#"{"isPlant": true, "plantIdentification": {"commonName": "Basil"}}"#;
        let fenced = format!("```json\n{bare}\n```");
        let a = normalize_analysis(bare, MODEL);
        let b = normalize_analysis(&fenced, MODEL);
        assert!(equal_modulo_timestamp(a, &b));
    }

    #[test]
    fn normalization_is_idempotent() {
        let raw = r#"{
            "plantIdentification": {"commonName": "Fern", "confidence": 0.7},
            "healthAssessment": {"isHealthy": true, "healthScore": 88, "overallCondition": "Excellent"},
            "diseases": [{"name": "Rust"}],
            "urgencyLevel": "low"
        }"#;
        let first = normalize_analysis(raw, MODEL);
        let serialized = serde_json::to_string(&first).unwrap();
        let second = normalize_analysis(&serialized, MODEL);
        assert!(equal_modulo_timestamp(first, &second));
    }

    #[test]
    fn non_plant_record_still_normalized() {
        let record = normalize_analysis(r#"{"isPlant": false}"#, MODEL);
        assert!(!record.is_plant);
        assert_eq!(record.plant_identification.common_name, "Unknown Plant");
        assert_eq!(record.health_assessment.health_score, 70.0);
        assert_eq!(
            record.growth_recommendations.pruning.when.as_deref(),
            Some("As needed")
        );
    }

    #[test]
    fn disease_entry_defaults() {
        let record = normalize_analysis(
            r#"{"diseases": [{"description": "Spots on leaves"}]}"#,
            MODEL,
        );
        let disease = &record.diseases[0];
        assert_eq!(disease.name, "Unknown Issue");
        assert_eq!(disease.confidence, 0.5);
        assert_eq!(disease.severity, Severity::Medium);
        assert_eq!(disease.description, "Spots on leaves");
        assert!(disease.affected_parts.is_empty());
    }

    #[test]
    fn zero_confidence_defaults_but_zero_score_kept() {
        let record = normalize_analysis(
            r#"{
                "plantIdentification": {"commonName": "Cactus", "confidence": 0},
                "healthAssessment": {"isHealthy": false, "healthScore": 0}
            }"#,
            MODEL,
        );
        assert_eq!(record.plant_identification.confidence, 0.5);
        assert!(!record.health_assessment.is_healthy);
        assert_eq!(record.health_assessment.health_score, 0.0);
    }

    #[test]
    fn out_of_range_scores_read_as_unknown() {
        let record = normalize_analysis(
            r#"{
                "plantIdentification": {"commonName": "Ivy", "confidence": 7.5},
                "healthAssessment": {"healthScore": 420}
            }"#,
            MODEL,
        );
        assert_eq!(record.plant_identification.confidence, 0.5);
        assert_eq!(record.health_assessment.health_score, 70.0);
    }

    #[test]
    fn mistyped_fields_keep_valid_siblings() {
        let record = normalize_analysis(
            r#"{
                "isPlant": "yes",
                "plantIdentification": {"commonName": 42, "scientificName": "Ficus lyrata"},
                "diseases": "none",
                "prevention": ["Water regularly", 5],
                "followUpDays": "soon"
            }"#,
            MODEL,
        );
        assert!(record.is_plant);
        assert_eq!(record.plant_identification.common_name, "Unknown Plant");
        assert_eq!(
            record.plant_identification.scientific_name.as_deref(),
            Some("Ficus lyrata")
        );
        assert!(record.diseases.is_empty());
        assert!(record.prevention.is_empty());
        assert_eq!(record.follow_up_days, 14);
    }

    #[test]
    fn non_object_json_yields_default_record_not_fallback() {
        let record = normalize_analysis("[1, 2, 3]", MODEL);
        assert_eq!(record.plant_identification.common_name, "Unknown Plant");
        assert!(record.parsing_note.is_none());
        assert!(record.treatments.immediate.is_empty());
    }

    #[test]
    fn growth_sections_default_independently() {
        let record = normalize_analysis(
            r#"{"growthRecommendations": {"water": {"frequency": "Daily misting"}}}"#,
            MODEL,
        );
        assert_eq!(
            record.growth_recommendations.water.frequency.as_deref(),
            Some("Daily misting")
        );
        // Present-but-partial sections keep their gaps.
        assert!(record.growth_recommendations.water.amount.is_none());
        // Absent sections get the full stand-in.
        assert_eq!(
            record.growth_recommendations.sunlight.requirement.as_deref(),
            Some("Bright indirect light")
        );
    }

    #[test]
    fn empty_strings_read_as_absent() {
        let record = normalize_analysis(
            r#"{
                "plantIdentification": {"commonName": "", "scientificName": ""},
                "healthAssessment": {"overallCondition": ""},
                "urgencyLevel": ""
            }"#,
            MODEL,
        );
        assert_eq!(record.plant_identification.common_name, "Unknown Plant");
        assert!(record.plant_identification.scientific_name.is_none());
        assert_eq!(record.health_assessment.overall_condition, Condition::Good);
        assert_eq!(record.urgency_level, Urgency::None);
    }

    #[test]
    fn unknown_severity_preserved() {
        let record = normalize_analysis(
            r#"{"diseases": [{"name": "Mystery spot", "severity": "catastrophic"}]}"#,
            MODEL,
        );
        assert_eq!(
            record.diseases[0].severity,
            Severity::Other("catastrophic".to_string())
        );
    }

    #[test]
    fn strips_nested_fences_and_whitespace() {
        let cleaned = strip_code_fences("  ```json\n{\"a\": 1}\n```  ");
        assert_eq!(cleaned, "{\"a\": 1}");
    }
}
