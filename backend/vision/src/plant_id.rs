//! Plant.id health-assessment provider.
//!
//! Plant.id covers identification and disease suggestions only; care guides
//! and follow-up questions stay with the Gemini provider.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use chrono::Utc;
use plantdoc_core::{
    ChemicalTreatment, Condition, Disease, HealthAssessment, OrganicTreatment, PlantAnalysis,
    PlantDocError, PlantIdentification, Severity, Treatments, Urgency,
};

use crate::image::ImagePayload;
use crate::normalize::{standard_growth_guidance, valid_confidence};
use crate::provider::{CareGuide, IdentificationDetails, PlantAnalyzer};

const MODEL_LABEL: &str = "plant.id/v2";

pub struct PlantIdProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl PlantIdProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.plant.id/v2".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn submit(&self, image: &ImagePayload) -> Result<IdentifyResult> {
        let body = IdentifyRequest {
            images: vec![image.to_base64()],
            latitude: None,
            longitude: None,
            similar_images: true,
            health: "all".to_string(),
            disease_details: vec![
                "description".to_string(),
                "treatment".to_string(),
                "cause".to_string(),
            ],
        };

        debug!("Sending request to Plant.id");

        let response = self
            .client
            .post(format!("{}/identify", self.base_url))
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Plant.id HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            bail!("Plant.id returned {}: {}", status, error_body);
        }

        let parsed: IdentifyResponse = response
            .json()
            .await
            .context("Failed to parse Plant.id response")?;

        Ok(parsed.result.unwrap_or_default())
    }
}

#[derive(Serialize)]
struct IdentifyRequest {
    images: Vec<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    similar_images: bool,
    health: String,
    disease_details: Vec<String>,
}

#[derive(Deserialize)]
struct IdentifyResponse {
    result: Option<IdentifyResult>,
}

#[derive(Debug, Default, Deserialize)]
struct IdentifyResult {
    #[serde(default)]
    classification: Option<Classification>,
    #[serde(default)]
    is_healthy: Option<HealthVerdict>,
    #[serde(default)]
    disease: Option<DiseaseSection>,
}

#[derive(Debug, Default, Deserialize)]
struct Classification {
    #[serde(default)]
    suggestions: Vec<SpeciesSuggestion>,
}

#[derive(Debug, Default, Deserialize)]
struct SpeciesSuggestion {
    #[serde(default)]
    name: String,
    #[serde(default)]
    probability: f64,
    #[serde(default)]
    details: Option<SpeciesDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct SpeciesDetails {
    #[serde(default)]
    common_names: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct HealthVerdict {
    #[serde(default)]
    binary: Option<bool>,
    #[serde(default)]
    probability: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct DiseaseSection {
    #[serde(default)]
    suggestions: Vec<DiseaseSuggestion>,
}

#[derive(Debug, Default, Deserialize)]
struct DiseaseSuggestion {
    #[serde(default)]
    name: String,
    #[serde(default)]
    probability: f64,
    #[serde(default)]
    details: Option<DiseaseDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct DiseaseDetails {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    treatment: Option<TreatmentDetails>,
    #[serde(default)]
    cause: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TreatmentDetails {
    #[serde(default)]
    biological: Vec<String>,
    #[serde(default)]
    chemical: Vec<String>,
    #[serde(default)]
    prevention: Vec<String>,
}

fn species_common_name(species: &SpeciesSuggestion) -> String {
    species
        .details
        .as_ref()
        .and_then(|d| d.common_names.as_ref())
        .and_then(|names| names.first().cloned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| species.name.clone())
}

/// Translate a Plant.id result into the provider-agnostic record.
fn map_analysis(result: IdentifyResult) -> PlantAnalysis {
    let species = result
        .classification
        .map(|c| c.suggestions)
        .unwrap_or_default()
        .into_iter()
        .next();
    let health = result.is_healthy.unwrap_or_default();
    let suggestions = result.disease.map(|d| d.suggestions).unwrap_or_default();

    let identification = match &species {
        Some(s) => PlantIdentification {
            common_name: {
                let name = species_common_name(s);
                if name.is_empty() { "Unknown Plant".to_string() } else { name }
            },
            scientific_name: Some(s.name.clone()).filter(|n| !n.is_empty()),
            family: None,
            confidence: valid_confidence(Some(s.probability)),
        },
        None => PlantIdentification {
            common_name: "Unknown Plant".to_string(),
            scientific_name: None,
            family: None,
            confidence: 0.5,
        },
    };

    let is_healthy = health.binary.unwrap_or(true);
    let health_score = match health.probability {
        Some(p) if (0.0..=1.0).contains(&p) => (p * 100.0).round(),
        _ => 70.0,
    };

    let mut treatments = Treatments::default();
    let mut prevention = Vec::new();
    for suggestion in &suggestions {
        let Some(details) = &suggestion.details else { continue };
        let Some(treatment) = &details.treatment else { continue };
        treatments.organic.extend(treatment.biological.iter().map(|m| OrganicTreatment {
            method: Some(m.clone()),
            instructions: None,
            effectiveness: None,
        }));
        treatments.chemical.extend(treatment.chemical.iter().map(|p| ChemicalTreatment {
            product: Some(p.clone()),
            application: None,
            frequency: None,
        }));
        prevention.extend(treatment.prevention.iter().cloned());
    }

    let diseases: Vec<Disease> = suggestions
        .into_iter()
        .map(|s| {
            let details = s.details.unwrap_or_default();
            Disease {
                name: if s.name.is_empty() { "Unknown Issue".to_string() } else { s.name },
                scientific_name: None,
                confidence: valid_confidence(Some(s.probability)),
                severity: Severity::Medium,
                affected_parts: Vec::new(),
                symptoms: Vec::new(),
                description: details.description.unwrap_or_default(),
                causes: details.cause.map(|c| vec![c]).unwrap_or_default(),
                spread: String::new(),
            }
        })
        .collect();

    PlantAnalysis {
        is_plant: true,
        plant_identification: identification,
        health_assessment: HealthAssessment {
            is_healthy,
            health_score,
            overall_condition: if is_healthy { Condition::Good } else { Condition::Fair },
        },
        urgency_level: if diseases.is_empty() { Urgency::None } else { Urgency::Medium },
        follow_up_days: if is_healthy { 14 } else { 7 },
        diseases,
        treatments,
        prevention,
        growth_recommendations: standard_growth_guidance(),
        additional_notes: String::new(),
        analyzed_at: Utc::now(),
        ai_model: MODEL_LABEL.to_string(),
        parsing_note: None,
    }
}

#[async_trait]
impl PlantAnalyzer for PlantIdProvider {
    fn name(&self) -> &str {
        "plantid"
    }

    async fn analyze(&self, image: &ImagePayload) -> Result<PlantAnalysis> {
        let result = self.submit(image).await?;
        Ok(map_analysis(result))
    }

    async fn identify(&self, image: &ImagePayload) -> Result<IdentificationDetails> {
        let result = self.submit(image).await?;
        let species = result
            .classification
            .map(|c| c.suggestions)
            .unwrap_or_default()
            .into_iter()
            .next();

        match species {
            Some(s) => Ok(IdentificationDetails {
                common_name: species_common_name(&s),
                scientific_name: Some(s.name.clone()).filter(|n| !n.is_empty()),
                family: None,
                confidence: s.probability,
                description: None,
                native_region: None,
                common_uses: Vec::new(),
            }),
            None => bail!("Plant.id returned no identification"),
        }
    }

    async fn care_tips(&self, _plant_name: &str) -> Result<CareGuide> {
        Err(PlantDocError::VisionError {
            provider: "plantid".to_string(),
            message: "care tips are only available with the gemini provider".to_string(),
        }
        .into())
    }

    async fn ask(&self, _image: &ImagePayload, _question: &str) -> Result<String> {
        Err(PlantDocError::VisionError {
            provider: "plantid".to_string(),
            message: "follow-up questions are only available with the gemini provider".to_string(),
        }
        .into())
    }
}
