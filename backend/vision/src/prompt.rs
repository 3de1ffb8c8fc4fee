//! Prompt builders for the vision model.
//!
//! The analysis prompt pins down the exact JSON shape the normalizer
//! expects; changing field names here must be mirrored in the data model.

/// Full plant analysis instruction, asking for the complete JSON record.
pub fn analysis_prompt() -> &'static str {
    r#"You are an expert botanist and plant pathologist. Analyze this plant image and provide a comprehensive assessment.

Please analyze the image and respond with a JSON object in this EXACT format (no markdown, just pure JSON):

{
    "isPlant": true/false,
    "plantIdentification": {
        "commonName": "Plant common name",
        "scientificName": "Scientific name",
        "family": "Plant family",
        "confidence": 0.0 to 1.0
    },
    "healthAssessment": {
        "isHealthy": true/false,
        "healthScore": 0 to 100,
        "overallCondition": "Excellent/Good/Fair/Poor/Critical"
    },
    "diseases": [
        {
            "name": "Disease name",
            "scientificName": "Scientific name if known",
            "confidence": 0.0 to 1.0,
            "severity": "low/medium/high/critical",
            "affectedParts": ["leaves", "stem", etc],
            "symptoms": ["symptom 1", "symptom 2"],
            "description": "Brief description of the disease",
            "causes": ["cause 1", "cause 2"],
            "spread": "How it spreads"
        }
    ],
    "treatments": {
        "immediate": ["Action 1", "Action 2"],
        "chemical": [
            {
                "product": "Product name/type",
                "application": "How to apply",
                "frequency": "How often"
            }
        ],
        "organic": [
            {
                "method": "Organic treatment method",
                "instructions": "How to apply",
                "effectiveness": "high/medium/low"
            }
        ],
        "cultural": ["Cultural practice 1", "Cultural practice 2"]
    },
    "prevention": [
        "Prevention tip 1",
        "Prevention tip 2"
    ],
    "growthRecommendations": {
        "water": {
            "frequency": "How often to water",
            "amount": "How much water",
            "method": "Best watering method",
            "signs_overwatering": ["Sign 1", "Sign 2"],
            "signs_underwatering": ["Sign 1", "Sign 2"]
        },
        "sunlight": {
            "requirement": "Full sun/Partial shade/Shade",
            "hours": "X-Y hours per day",
            "intensity": "Direct/Indirect/Filtered",
            "tips": ["Tip 1", "Tip 2"]
        },
        "soil": {
            "type": "Soil type preference",
            "pH": "pH range",
            "drainage": "Drainage requirement",
            "amendments": ["Amendment 1", "Amendment 2"]
        },
        "temperature": {
            "optimal": "X-Y°C or °F",
            "minimum": "Min temp",
            "maximum": "Max temp",
            "humidity": "Humidity preference"
        },
        "fertilizer": {
            "type": "Fertilizer type",
            "npk": "N-P-K ratio",
            "frequency": "How often",
            "season": "Best season to fertilize"
        },
        "pruning": {
            "when": "When to prune",
            "how": "How to prune",
            "frequency": "How often"
        }
    },
    "additionalNotes": "Any other important observations or recommendations",
    "urgencyLevel": "none/low/medium/high/critical",
    "followUpDays": 7
}

Important instructions:
1. If no plant is detected, set isPlant to false and provide minimal data
2. If plant is healthy, return empty diseases array
3. Be specific with treatments and recommendations
4. Confidence scores should reflect your certainty
5. Always provide growth recommendations even for healthy plants
6. Return ONLY the JSON object, no other text"#
}

/// Quick name-only identification prompt.
pub fn identify_prompt() -> &'static str {
    r#"Identify this plant and provide the response as JSON:
{
    "commonName": "Plant name",
    "scientificName": "Scientific name",
    "family": "Plant family",
    "confidence": 0.0 to 1.0,
    "description": "Brief description",
    "nativeRegion": "Where it's from",
    "commonUses": ["Use 1", "Use 2"]
}

Return ONLY the JSON object."#
}

/// Care-guide prompt for a named plant (no image attached).
pub fn care_prompt(plant_name: &str) -> String {
    format!(
        r#"Provide detailed care tips for {plant_name}. Return as JSON:
{{
    "plantName": "{plant_name}",
    "difficulty": "Easy/Moderate/Hard",
    "water": {{
        "frequency": "How often",
        "tips": ["Tip 1", "Tip 2"]
    }},
    "sunlight": {{
        "requirement": "Light requirement",
        "tips": ["Tip 1", "Tip 2"]
    }},
    "soil": {{
        "type": "Soil type",
        "tips": ["Tip 1", "Tip 2"]
    }},
    "temperature": {{
        "range": "Temperature range",
        "tips": ["Tip 1", "Tip 2"]
    }},
    "fertilizer": {{
        "type": "Fertilizer type",
        "schedule": "When to fertilize"
    }},
    "commonProblems": [
        {{
            "problem": "Problem name",
            "solution": "How to fix"
        }}
    ],
    "seasonalCare": {{
        "spring": "Spring care tips",
        "summer": "Summer care tips",
        "fall": "Fall care tips",
        "winter": "Winter care tips"
    }},
    "propagation": "How to propagate",
    "toxicity": "Toxic to pets/humans?"
}}

Return ONLY the JSON."#
    )
}

/// Follow-up question about a previously analyzed photo.
pub fn question_prompt(question: &str) -> String {
    format!(
        "Looking at this plant image, please answer the following question:\n\n{question}\n\nProvide a helpful, detailed response focused on plant care and health."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_prompt_pins_wire_fields() {
        let p = analysis_prompt();
        assert!(p.contains("\"isPlant\""));
        assert!(p.contains("\"signs_overwatering\""));
        assert!(p.contains("\"pH\""));
        assert!(p.contains("ONLY the JSON object"));
    }

    #[test]
    fn care_prompt_embeds_plant_name() {
        let p = care_prompt("Monstera deliciosa");
        assert!(p.contains("care tips for Monstera deliciosa"));
        assert!(p.contains("\"plantName\": \"Monstera deliciosa\""));
    }
}
