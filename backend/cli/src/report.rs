//! Plain-text analysis reports for `results --report`.

use chrono::{Local, Utc};
use plantdoc_core::{ChemicalTreatment, Disease, OrganicTreatment, PlantAnalysis};

/// Render the downloadable report for one analysis. Missing optional values
/// print as "N/A".
pub fn render_report(analysis: &PlantAnalysis, scan_id: &str) -> String {
    let plant = &analysis.plant_identification;
    let health = &analysis.health_assessment;
    let growth = &analysis.growth_recommendations;

    let status = if health.is_healthy {
        "✅ Healthy"
    } else {
        "⚠️ Issues Detected"
    };

    let report = format!(
        "
Generated: {generated}
Scan ID: {scan_id}


  Common Name: {common_name}
  Scientific Name: {scientific_name}
  Family: {family}
  Confidence: {confidence}%


  Health Score: {health_score}/100
  Status: {status}
  Condition: {condition}


{diseases}


{immediate}
{organic}
{chemical}


  💧 Watering: {watering}
  ☀️ Sunlight: {sunlight}
  🌡️ Temperature: {temperature}
  🧪 Fertilizer: {fertilizer}


{prevention}


{notes}

 Follow-up recommended in {follow_up_days} days

Generated by PlantDoc AI 🌿
Powered by Google Gemini
",
        generated = Local::now().format("%-m/%-d/%Y, %-I:%M:%S %p"),
        scan_id = scan_id,
        common_name = plant.common_name,
        scientific_name = plant.scientific_name.as_deref().unwrap_or("N/A"),
        family = plant.family.as_deref().unwrap_or("N/A"),
        confidence = (plant.confidence * 100.0).round(),
        health_score = health.health_score,
        status = status,
        condition = health.overall_condition,
        diseases = diseases_block(&analysis.diseases),
        immediate = immediate_block(&analysis.treatments.immediate),
        organic = organic_block(&analysis.treatments.organic),
        chemical = chemical_block(&analysis.treatments.chemical),
        watering = or_na(growth.water.frequency.as_deref()),
        sunlight = or_na(growth.sunlight.requirement.as_deref()),
        temperature = or_na(growth.temperature.optimal.as_deref()),
        fertilizer = or_na(growth.fertilizer.frequency.as_deref()),
        prevention = prevention_block(&analysis.prevention),
        notes = notes_block(&analysis.additional_notes),
        follow_up_days = analysis.follow_up_days,
    );
    report.trim().to_string()
}

/// Default file name for a saved report: whitespace runs in the plant name
/// become single dashes.
pub fn default_file_name(common_name: &str) -> String {
    format!(
        "plant-report-{}-{}.txt",
        dash_whitespace(common_name),
        Utc::now().timestamp_millis()
    )
}

fn dash_whitespace(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_run {
                out.push('-');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

fn or_na(value: Option<&str>) -> &str {
    value.unwrap_or("N/A")
}

fn diseases_block(diseases: &[Disease]) -> String {
    if diseases.is_empty() {
        return "  No diseases detected! ✨".to_string();
    }
    diseases
        .iter()
        .map(|d| {
            let description = if d.description.is_empty() {
                String::new()
            } else {
                format!("Description: {}", d.description)
            };
            format!(
                "\n  • {} ({}% confidence)\n    Severity: {}\n    {}\n",
                d.name,
                (d.confidence * 100.0).round(),
                d.severity,
                description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn immediate_block(actions: &[String]) -> String {
    if actions.is_empty() {
        return String::new();
    }
    let lines = actions
        .iter()
        .map(|t| format!("     • {t}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("\n  🚨 Immediate Actions:\n{lines}\n")
}

fn organic_block(treatments: &[OrganicTreatment]) -> String {
    if treatments.is_empty() {
        return String::new();
    }
    let lines = treatments
        .iter()
        .map(|t| {
            format!(
                "     • {}: {}",
                or_na(t.method.as_deref()),
                or_na(t.instructions.as_deref())
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("\n  🌿 Organic Treatments:\n{lines}\n")
}

fn chemical_block(treatments: &[ChemicalTreatment]) -> String {
    if treatments.is_empty() {
        return String::new();
    }
    let lines = treatments
        .iter()
        .map(|t| {
            format!(
                "     • {}: {}",
                or_na(t.product.as_deref()),
                or_na(t.application.as_deref())
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("\n  🧪 Chemical Treatments:\n{lines}\n")
}

fn prevention_block(tips: &[String]) -> String {
    tips.iter()
        .map(|p| format!("  • {p}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn notes_block(notes: &str) -> String {
    if notes.is_empty() {
        String::new()
    } else {
        format!("\n  {notes}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn healthy_analysis() -> PlantAnalysis {
        serde_json::from_value(json!({
            "isPlant": true,
            "plantIdentification": {
                "commonName": "Monstera Deliciosa",
                "scientificName": null,
                "family": "Araceae",
                "confidence": 0.92
            },
            "healthAssessment": {
                "isHealthy": true,
                "healthScore": 88.0,
                "overallCondition": "Good"
            },
            "diseases": [],
            "treatments": { "immediate": [], "chemical": [], "organic": [], "cultural": [] },
            "prevention": ["Keep leaves dry"],
            "growthRecommendations": {
                "water": { "frequency": "Weekly" },
                "sunlight": { "requirement": "Bright indirect" },
                "soil": {},
                "temperature": {},
                "fertilizer": {},
                "pruning": {}
            },
            "additionalNotes": "",
            "urgencyLevel": "none",
            "followUpDays": 30,
            "analyzedAt": "2026-08-21T10:00:00Z",
            "aiModel": "gemini-1.5-pro"
        }))
        .unwrap()
    }

    #[test]
    fn healthy_report_lines() {
        let report = render_report(&healthy_analysis(), "scan-1");
        assert!(report.starts_with("Generated: "));
        assert!(report.contains("Scan ID: scan-1"));
        assert!(report.contains("  Common Name: Monstera Deliciosa"));
        assert!(report.contains("  Scientific Name: N/A"));
        assert!(report.contains("  Confidence: 92%"));
        assert!(report.contains("  Status: ✅ Healthy"));
        assert!(report.contains("  No diseases detected! ✨"));
        assert!(report.contains("  💧 Watering: Weekly"));
        assert!(report.contains("  🌡️ Temperature: N/A"));
        assert!(report.contains("  • Keep leaves dry"));
        assert!(report.contains(" Follow-up recommended in 30 days"));
        assert!(report.ends_with("Powered by Google Gemini"));
    }

    #[test]
    fn diseased_report_lists_treatments() {
        let mut analysis = healthy_analysis();
        analysis.health_assessment.is_healthy = false;
        analysis.diseases = serde_json::from_value(json!([{
            "name": "Leaf Spot",
            "scientificName": null,
            "confidence": 0.75,
            "severity": "high",
            "affectedParts": ["leaves"],
            "symptoms": [],
            "description": "Brown spots",
            "causes": [],
            "spread": ""
        }]))
        .unwrap();
        analysis.treatments.immediate = vec!["Isolate the plant".to_string()];
        analysis.treatments.organic = serde_json::from_value(json!([
            { "method": "Neem oil", "instructions": "Spray weekly" }
        ]))
        .unwrap();

        let report = render_report(&analysis, "scan-2");
        assert!(report.contains("  Status: ⚠️ Issues Detected"));
        assert!(report.contains("  • Leaf Spot (75% confidence)"));
        assert!(report.contains("    Severity: high"));
        assert!(report.contains("    Description: Brown spots"));
        assert!(report.contains("  🚨 Immediate Actions:"));
        assert!(report.contains("     • Isolate the plant"));
        assert!(report.contains("     • Neem oil: Spray weekly"));
    }

    #[test]
    fn file_name_dashes_whitespace() {
        let name = default_file_name("Monstera  Deliciosa Plant");
        assert!(name.starts_with("plant-report-Monstera-Deliciosa-Plant-"));
        assert!(name.ends_with(".txt"));
    }
}
