//! Terminal rendering of analysis results, identifications, and care guides.

use plantdoc_core::{
    Condition, Disease, GrowthRecommendations, PlantAnalysis, Severity, Treatments, Urgency,
};
use plantdoc_vision::{CareGuide, IdentificationDetails};

use crate::i18n::Catalog;
use crate::terminal::{paint, BOLD, CYAN, DIM, GREEN, RED, YELLOW};

// ---------------------------------------------------------------------------
// Lookup tables
// ---------------------------------------------------------------------------

/// Health score band: >=80 excellent, >=60 good, >=40 fair, else critical.
pub fn health_band(score: f64) -> &'static str {
    if score >= 80.0 {
        "excellent"
    } else if score >= 60.0 {
        "good"
    } else if score >= 40.0 {
        "fair"
    } else {
        "critical"
    }
}

fn band_style(band: &str) -> &'static str {
    match band {
        "excellent" => GREEN,
        "good" => CYAN,
        "fair" => YELLOW,
        _ => RED,
    }
}

/// Icon name for a severity tag; unknown levels render the generic icon.
pub fn severity_icon(severity: &Severity) -> &'static str {
    match severity {
        Severity::Critical => "skull-crossbones",
        Severity::High => "exclamation-triangle",
        Severity::Medium => "exclamation-circle",
        Severity::Low => "info-circle",
        Severity::Other(_) => "info-circle",
    }
}

fn urgency_icon(urgency: &Urgency) -> &'static str {
    match urgency {
        Urgency::Critical => "skull-crossbones",
        Urgency::High => "exclamation-triangle",
        Urgency::Medium => "exclamation-circle",
        _ => "info-circle",
    }
}

/// Terminal glyph for an icon name.
fn icon_glyph(icon: &str) -> &'static str {
    match icon {
        "skull-crossbones" => "☠",
        "exclamation-triangle" => "⚠",
        "exclamation-circle" => "❗",
        _ => "ℹ",
    }
}

/// Banner message for an urgency level; unknown levels read as low.
pub fn urgency_message(urgency: &Urgency) -> &'static str {
    match urgency {
        Urgency::Medium => "Requires attention soon",
        Urgency::High => "Urgent attention required",
        Urgency::Critical => "Critical - Immediate action needed",
        _ => "Minor attention needed",
    }
}

fn urgency_style(urgency: &Urgency) -> &'static str {
    match urgency {
        Urgency::Critical | Urgency::High => RED,
        Urgency::Medium => YELLOW,
        _ => CYAN,
    }
}

fn severity_style(severity: &Severity) -> &'static str {
    match severity {
        Severity::Critical | Severity::High => RED,
        Severity::Medium => YELLOW,
        _ => CYAN,
    }
}

/// "medium" -> "Medium Severity".
pub fn severity_label(severity: &Severity) -> String {
    format!("{} Severity", capitalize(severity.as_str()))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn condition_style(condition: &Condition) -> &'static str {
    match condition {
        Condition::Excellent | Condition::Good => GREEN,
        Condition::Fair => YELLOW,
        Condition::Poor | Condition::Critical => RED,
        Condition::Other(_) => CYAN,
    }
}

// ---------------------------------------------------------------------------
// Full analysis
// ---------------------------------------------------------------------------

pub fn print_analysis(analysis: &PlantAnalysis, catalog: &Catalog) {
    let plant = &analysis.plant_identification;
    let health = &analysis.health_assessment;

    println!();
    println!("{}", paint(BOLD, &plant.common_name));
    if let Some(scientific) = &plant.scientific_name {
        println!("{}", paint(DIM, scientific));
    }
    println!("{}% confidence", (plant.confidence * 100.0).round());
    println!();

    if health.is_healthy {
        println!("{}", paint(GREEN, "✓ Healthy"));
    } else {
        println!("{}", paint(YELLOW, "⚠ Issues Found"));
    }

    let band = health_band(health.health_score);
    println!(
        "Health Score: {} ({band})",
        paint(band_style(band), &format!("{}/100", health.health_score))
    );
    println!(
        "Condition: {}",
        paint(condition_style(&health.overall_condition), health.overall_condition.as_str())
    );

    if analysis.urgency_level != Urgency::None {
        let style = urgency_style(&analysis.urgency_level);
        println!();
        println!(
            "{} {}  {}",
            paint(style, icon_glyph(urgency_icon(&analysis.urgency_level))),
            paint(style, urgency_message(&analysis.urgency_level)),
            paint(DIM, &format!("Follow-up scan in {} days", analysis.follow_up_days))
        );
    }

    print_diseases(&analysis.diseases);
    print_treatments(&analysis.treatments);
    print_growth(&analysis.growth_recommendations, catalog);
    print_prevention(&analysis.prevention);

    if !analysis.additional_notes.is_empty() {
        println!();
        println!("{}", paint(BOLD, "Notes"));
        println!("  {}", analysis.additional_notes);
    }

    if let Some(note) = &analysis.parsing_note {
        println!();
        println!("{}", paint(YELLOW, note));
    }
    println!();
}

fn print_diseases(diseases: &[Disease]) {
    println!();
    if diseases.is_empty() {
        println!("{}", paint(GREEN, "No diseases detected! ✨"));
        return;
    }

    println!("{}", paint(BOLD, "Detected Issues"));
    for disease in diseases {
        let style = severity_style(&disease.severity);
        println!();
        println!(
            "  • {} ({}% confidence)",
            paint(BOLD, &disease.name),
            (disease.confidence * 100.0).round()
        );
        if let Some(scientific) = &disease.scientific_name {
            println!("    {}", paint(DIM, scientific));
        }
        println!(
            "    {} {}",
            paint(style, icon_glyph(severity_icon(&disease.severity))),
            paint(style, &severity_label(&disease.severity))
        );
        if !disease.affected_parts.is_empty() {
            println!("    Affected: {}", disease.affected_parts.join(", "));
        }
        if !disease.description.is_empty() {
            println!("    {}", disease.description);
        }
        if !disease.symptoms.is_empty() {
            println!("    Symptoms:");
            for symptom in &disease.symptoms {
                println!("      - {symptom}");
            }
        }
        if !disease.causes.is_empty() {
            println!("    Causes:");
            for cause in &disease.causes {
                println!("      - {cause}");
            }
        }
    }
}

fn print_treatments(treatments: &Treatments) {
    let empty = treatments.immediate.is_empty()
        && treatments.chemical.is_empty()
        && treatments.organic.is_empty()
        && treatments.cultural.is_empty();
    if empty {
        println!();
        println!("No specific treatments needed for healthy plants.");
        return;
    }

    println!();
    println!("{}", paint(BOLD, "Treatments"));
    if !treatments.immediate.is_empty() {
        println!("  {}", paint(RED, "Immediate Actions"));
        for action in &treatments.immediate {
            println!("    • {action}");
        }
    }
    if !treatments.chemical.is_empty() {
        println!("  Chemical Treatments");
        for t in &treatments.chemical {
            let product = t.product.as_deref().unwrap_or("N/A");
            let application = t.application.as_deref().unwrap_or("N/A");
            print!("    • {product}: {application}");
            if let Some(frequency) = &t.frequency {
                print!(" {}", paint(DIM, &format!("({frequency})")));
            }
            println!();
        }
    }
    if !treatments.organic.is_empty() {
        println!("  Organic Treatments");
        for t in &treatments.organic {
            let method = t.method.as_deref().unwrap_or("N/A");
            let instructions = t.instructions.as_deref().unwrap_or("N/A");
            print!("    • {method}: {instructions}");
            if let Some(effectiveness) = &t.effectiveness {
                print!(" {}", paint(DIM, &format!("(effectiveness: {effectiveness})")));
            }
            println!();
        }
    }
    if !treatments.cultural.is_empty() {
        println!("  Cultural Practices");
        for practice in &treatments.cultural {
            println!("    • {practice}");
        }
    }
}

fn print_growth(growth: &GrowthRecommendations, catalog: &Catalog) {
    println!();
    println!("{}", paint(BOLD, "Growth Recommendations"));

    println!("  {}", paint(CYAN, catalog.watering()));
    kv("Frequency", growth.water.frequency.as_deref());
    kv("Amount", growth.water.amount.as_deref());
    kv("Method", growth.water.method.as_deref());
    if let Some(signs) = &growth.water.signs_overwatering {
        if !signs.is_empty() {
            kv("Overwatering signs", Some(&signs.join(", ")));
        }
    }

    println!("  {}", paint(CYAN, "Sunlight"));
    kv("Requirement", growth.sunlight.requirement.as_deref());
    kv("Hours", growth.sunlight.hours.as_deref());
    kv("Intensity", growth.sunlight.intensity.as_deref());
    for tip in growth.sunlight.tips.iter().flatten() {
        println!("      - {tip}");
    }

    println!("  {}", paint(CYAN, "Soil"));
    kv("Type", growth.soil.soil_type.as_deref());
    kv("pH", growth.soil.ph.as_deref());
    kv("Drainage", growth.soil.drainage.as_deref());
    if let Some(amendments) = &growth.soil.amendments {
        if !amendments.is_empty() {
            kv("Amendments", Some(&amendments.join(", ")));
        }
    }

    println!("  {}", paint(CYAN, catalog.temperature()));
    kv("Optimal", growth.temperature.optimal.as_deref());
    kv("Min", growth.temperature.minimum.as_deref());
    kv("Max", growth.temperature.maximum.as_deref());
    kv("Humidity", growth.temperature.humidity.as_deref());

    println!("  {}", paint(CYAN, "Fertilizer"));
    kv("Type", growth.fertilizer.fertilizer_type.as_deref());
    kv("NPK Ratio", growth.fertilizer.npk.as_deref());
    kv("Frequency", growth.fertilizer.frequency.as_deref());
    kv("Season", growth.fertilizer.season.as_deref());

    println!("  {}", paint(CYAN, "Pruning"));
    kv("When", growth.pruning.when.as_deref());
    kv("How", growth.pruning.how.as_deref());
    kv("Frequency", growth.pruning.frequency.as_deref());
}

fn print_prevention(prevention: &[String]) {
    println!();
    println!("{}", paint(BOLD, "Prevention"));
    if prevention.is_empty() {
        println!("  Continue with regular plant care practices.");
        return;
    }
    for tip in prevention {
        println!("  • {tip}");
    }
}

fn kv(label: &str, value: Option<&str>) {
    if let Some(value) = value {
        println!("    {label}: {value}");
    }
}

// ---------------------------------------------------------------------------
// Identification and care guide
// ---------------------------------------------------------------------------

pub fn print_identification(details: &IdentificationDetails, catalog: &Catalog) {
    println!();
    println!("{}", paint(BOLD, &details.common_name));
    if let Some(scientific) = &details.scientific_name {
        println!("{}", paint(DIM, scientific));
    }
    println!(
        "{}: {}%",
        catalog.match_label(),
        (details.confidence * 100.0).round()
    );
    if let Some(family) = &details.family {
        println!("Family: {family}");
    }
    if let Some(description) = &details.description {
        println!();
        println!("{}", paint(BOLD, catalog.description()));
        println!("  {description}");
    }
    if let Some(region) = &details.native_region {
        println!("{}: {region}", catalog.origin());
    }
    if !details.common_uses.is_empty() {
        println!("Common uses:");
        for usage in &details.common_uses {
            println!("  • {usage}");
        }
    }
    println!();
}

pub fn print_care_guide(guide: &CareGuide, catalog: &Catalog) {
    println!();
    println!("{}", paint(BOLD, &format!("{}: {}", catalog.care_guide(), guide.plant_name)));
    if let Some(difficulty) = &guide.difficulty {
        println!("{}: {difficulty}", catalog.care_level());
    }

    if let Some(water) = &guide.water {
        println!();
        println!("{}", paint(CYAN, catalog.watering()));
        kv("Frequency", water.frequency.as_deref());
        for tip in &water.tips {
            println!("    - {tip}");
        }
    }
    if let Some(sunlight) = &guide.sunlight {
        println!();
        println!("{}", paint(CYAN, catalog.light_requirements()));
        kv("Requirement", sunlight.requirement.as_deref());
        for tip in &sunlight.tips {
            println!("    - {tip}");
        }
    }
    if let Some(soil) = &guide.soil {
        println!();
        println!("{}", paint(CYAN, "Soil"));
        kv("Type", soil.soil_type.as_deref());
        for tip in &soil.tips {
            println!("    - {tip}");
        }
    }
    if let Some(temperature) = &guide.temperature {
        println!();
        println!("{}", paint(CYAN, catalog.temperature()));
        kv("Range", temperature.range.as_deref());
        for tip in &temperature.tips {
            println!("    - {tip}");
        }
    }
    if let Some(fertilizer) = &guide.fertilizer {
        println!();
        println!("{}", paint(CYAN, "Fertilizer"));
        kv("Type", fertilizer.fertilizer_type.as_deref());
        kv("Schedule", fertilizer.schedule.as_deref());
    }
    if !guide.common_problems.is_empty() {
        println!();
        println!("{}", paint(BOLD, "Common Problems"));
        for problem in &guide.common_problems {
            println!("  • {}: {}", problem.problem, problem.solution);
        }
    }
    if let Some(seasonal) = &guide.seasonal_care {
        println!();
        println!("{}", paint(BOLD, "Seasonal Care"));
        kv("Spring", seasonal.spring.as_deref());
        kv("Summer", seasonal.summer.as_deref());
        kv("Fall", seasonal.fall.as_deref());
        kv("Winter", seasonal.winter.as_deref());
    }
    if let Some(propagation) = &guide.propagation {
        println!();
        println!("Propagation: {propagation}");
    }
    if let Some(toxicity) = &guide.toxicity {
        println!();
        println!(
            "{} {}",
            paint(YELLOW, &format!("⚠ {}:", catalog.toxicity_warning())),
            toxicity
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_bands() {
        assert_eq!(health_band(95.0), "excellent");
        assert_eq!(health_band(80.0), "excellent");
        assert_eq!(health_band(79.9), "good");
        assert_eq!(health_band(60.0), "good");
        assert_eq!(health_band(45.0), "fair");
        assert_eq!(health_band(39.9), "critical");
    }

    #[test]
    fn unknown_severity_gets_generic_icon() {
        assert_eq!(severity_icon(&Severity::Critical), "skull-crossbones");
        assert_eq!(severity_icon(&Severity::Other("weird".to_string())), "info-circle");
    }

    #[test]
    fn unknown_urgency_reads_as_low() {
        assert_eq!(urgency_message(&Urgency::High), "Urgent attention required");
        assert_eq!(
            urgency_message(&Urgency::Other("odd".to_string())),
            "Minor attention needed"
        );
    }

    #[test]
    fn severity_labels_are_capitalized() {
        assert_eq!(severity_label(&Severity::Medium), "Medium Severity");
        assert_eq!(severity_label(&Severity::Other("mild".to_string())), "Mild Severity");
    }
}
