//! Google Gemini vision provider.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use plantdoc_core::PlantAnalysis;

use crate::image::ImagePayload;
use crate::normalize::{normalize_analysis, strip_code_fences};
use crate::prompt;
use crate::provider::{CareGuide, IdentificationDetails, PlantAnalyzer};

/// Gemini generateContent provider.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            model: model.into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn vision_request(&self, prompt_text: &str, image: &ImagePayload) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: prompt_text.to_string() },
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: image.mime_type.to_string(),
                            data: image.to_base64(),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: 0.4,
                top_k: Some(32),
                top_p: Some(1.0),
                max_output_tokens: 4096,
            },
            safety_settings: permissive_safety(),
        }
    }

    fn care_request(&self, plant_name: &str) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![Part::Text { text: prompt::care_prompt(plant_name) }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.3,
                top_k: None,
                top_p: None,
                max_output_tokens: 2048,
            },
            safety_settings: Vec::new(),
        }
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        // Key travels as a query parameter; never log the URL.
        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        debug!(model = %self.model, "Sending request to Gemini");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .context("Gemini HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            bail!("Gemini returned {}: {}", status, error_body);
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        let text = parsed
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|p| p.text);

        match text {
            Some(t) if !t.is_empty() => Ok(t),
            _ => bail!("No response from Gemini"),
        }
    }
}

fn permissive_safety() -> Vec<SafetySetting> {
    [
        "HARM_CATEGORY_HARASSMENT",
        "HARM_CATEGORY_HATE_SPEECH",
        "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        "HARM_CATEGORY_DANGEROUS_CONTENT",
    ]
    .into_iter()
    .map(|category| SafetySetting {
        category: category.to_string(),
        threshold: "BLOCK_NONE".to_string(),
    })
    .collect()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    max_output_tokens: u32,
}

#[derive(Serialize)]
struct SafetySetting {
    category: String,
    threshold: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<TextPart>>,
}

#[derive(Deserialize)]
struct TextPart {
    text: Option<String>,
}

#[async_trait]
impl PlantAnalyzer for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn analyze(&self, image: &ImagePayload) -> Result<PlantAnalysis> {
        let request = self.vision_request(prompt::analysis_prompt(), image);
        let text = self.generate(&request).await?;
        Ok(normalize_analysis(&text, &self.model))
    }

    async fn identify(&self, image: &ImagePayload) -> Result<IdentificationDetails> {
        let request = self.vision_request(prompt::identify_prompt(), image);
        let text = self.generate(&request).await?;
        let cleaned = strip_code_fences(&text);
        serde_json::from_str(&cleaned).context("Failed to parse identification response")
    }

    async fn care_tips(&self, plant_name: &str) -> Result<CareGuide> {
        let request = self.care_request(plant_name);
        let text = self.generate(&request).await?;
        let cleaned = strip_code_fences(&text);
        serde_json::from_str(&cleaned).context("Failed to parse care guide response")
    }

    async fn ask(&self, image: &ImagePayload, question: &str) -> Result<String> {
        let request = self.vision_request(&prompt::question_prompt(question), image);
        self.generate(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_image() -> ImagePayload {
        ImagePayload {
            bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
            mime_type: "image/jpeg",
        }
    }

    #[test]
    fn vision_request_wire_shape() {
        let provider = GeminiProvider::new("key", "gemini-1.5-pro");
        let request = provider.vision_request("describe", &sample_image());
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["parts"][0]["text"], "describe");
        assert_eq!(
            json["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "image/jpeg"
        );
        assert_eq!(json["generationConfig"]["temperature"], 0.4);
        assert_eq!(json["generationConfig"]["topK"], 32);
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 4096);
        assert_eq!(json["safetySettings"].as_array().unwrap().len(), 4);
        assert_eq!(json["safetySettings"][0]["threshold"], "BLOCK_NONE");
    }

    #[test]
    fn care_request_is_text_only() {
        let provider = GeminiProvider::new("key", "gemini-1.5-pro");
        let request = provider.care_request("Basil");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["parts"].as_array().unwrap().len(), 1);
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 2048);
        assert!(json.get("safetySettings").is_none());
        assert!(json["generationConfig"].get("topK").is_none());
    }
}
