//! Provider abstraction so the CLI stays agnostic of which vision backend
//! produced an analysis.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use plantdoc_core::PlantAnalysis;

use crate::image::ImagePayload;

/// A backend able to analyze plant photos.
#[async_trait]
pub trait PlantAnalyzer: Send + Sync {
    fn name(&self) -> &str;

    /// Full health analysis of one photo. Always yields a complete record;
    /// malformed model output is normalized, not surfaced.
    async fn analyze(&self, image: &ImagePayload) -> Result<PlantAnalysis>;

    /// Species identification without the health workup.
    async fn identify(&self, image: &ImagePayload) -> Result<IdentificationDetails>;

    /// Care guide for a plant by name; no image involved.
    async fn care_tips(&self, plant_name: &str) -> Result<CareGuide>;

    /// Free-form question about a photo, answered as prose.
    async fn ask(&self, image: &ImagePayload, question: &str) -> Result<String>;
}

/// Result of a quick identification request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationDetails {
    #[serde(default)]
    pub common_name: String,
    #[serde(default)]
    pub scientific_name: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub native_region: Option<String>,
    #[serde(default)]
    pub common_uses: Vec<String>,
}

/// Care guide for a named plant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareGuide {
    #[serde(default)]
    pub plant_name: String,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub water: Option<WaterTips>,
    #[serde(default)]
    pub sunlight: Option<SunlightTips>,
    #[serde(default)]
    pub soil: Option<SoilTips>,
    #[serde(default)]
    pub temperature: Option<TemperatureTips>,
    #[serde(default)]
    pub fertilizer: Option<FertilizerPlan>,
    #[serde(default)]
    pub common_problems: Vec<CareProblem>,
    #[serde(default)]
    pub seasonal_care: Option<SeasonalCare>,
    #[serde(default)]
    pub propagation: Option<String>,
    #[serde(default)]
    pub toxicity: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaterTips {
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SunlightTips {
    #[serde(default)]
    pub requirement: Option<String>,
    #[serde(default)]
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SoilTips {
    #[serde(rename = "type", default)]
    pub soil_type: Option<String>,
    #[serde(default)]
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemperatureTips {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FertilizerPlan {
    #[serde(rename = "type", default)]
    pub fertilizer_type: Option<String>,
    #[serde(default)]
    pub schedule: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CareProblem {
    #[serde(default)]
    pub problem: String,
    #[serde(default)]
    pub solution: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeasonalCare {
    #[serde(default)]
    pub spring: Option<String>,
    #[serde(default)]
    pub summer: Option<String>,
    #[serde(default)]
    pub fall: Option<String>,
    #[serde(default)]
    pub winter: Option<String>,
}
