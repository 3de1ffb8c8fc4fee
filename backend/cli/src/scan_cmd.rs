//! The analysis pipeline commands: analyze, identify, care, ask, results.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use tracing::info;
use uuid::Uuid;

use plantdoc_core::{DetectedDiseaseRow, HistoryEntry, NewScan, PlantAnalysis};
use plantdoc_vision::load_image;

use crate::app::{App, ProviderKind};
use crate::render;
use crate::report;
use crate::terminal::{self, paint, DIM};

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Plant photo to analyze (jpeg, png, or webp)
    pub image: PathBuf,

    /// Vision backend override for this scan
    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    /// Analyze only; skip upload and account sync
    #[arg(long)]
    pub no_save: bool,
}

#[derive(Debug, Args)]
pub struct IdentifyArgs {
    /// Plant photo to identify
    pub image: PathBuf,
}

#[derive(Debug, Args)]
pub struct CareArgs {
    /// Plant name, e.g. "Monstera Deliciosa"
    pub plant_name: String,
}

#[derive(Debug, Args)]
pub struct AskArgs {
    /// Plant photo the question is about
    pub image: PathBuf,

    /// The question
    pub question: String,
}

#[derive(Debug, Args)]
pub struct ResultsArgs {
    /// Write the plain-text report; takes an optional file name
    #[arg(long, value_name = "FILE")]
    pub report: Option<Option<String>>,
}

/// Full pipeline: validate, upload when signed in, analyze, render, persist.
pub async fn analyze(app: &App, args: AnalyzeArgs) -> Result<()> {
    let image = load_image(&args.image, app.max_image_bytes())?;
    let provider = app.provider(args.provider)?;

    let signed = if args.no_save {
        None
    } else {
        match app.session().await? {
            Some(session) => {
                let client = app
                    .supabase()?
                    .with_access_token(session.access_token.clone());
                Some((client, session))
            }
            None => {
                terminal::note_warn("Not signed in; this scan will not sync to your account.");
                None
            }
        }
    };

    let uploaded = match &signed {
        Some((client, session)) => Some(
            client
                .upload_image(
                    session.user.id,
                    &file_name(&args.image),
                    image.bytes.clone(),
                    image.mime_type,
                )
                .await?,
        ),
        None => None,
    };

    terminal::note_info(app.catalog.analyzing());
    info!("Analyzing {} with {}", args.image.display(), provider.name());
    let analysis = provider.analyze(&image).await?;
    render::print_analysis(&analysis, &app.catalog);

    let entry = match (signed, uploaded) {
        (Some((client, session)), Some(stored)) => {
            let scan = client
                .insert_scan(&NewScan::from_analysis(
                    session.user.id,
                    stored.public_url,
                    stored.path.clone(),
                    analysis.clone(),
                ))
                .await?;
            client
                .insert_diseases(&DetectedDiseaseRow::from_analysis(scan.id, &analysis))
                .await?;
            terminal::note_success("Scan saved to your account.");
            println!(
                "{}",
                paint(
                    DIM,
                    &format!("{}: plantdoc plants save", app.catalog.save_collection())
                )
            );
            history_entry(scan.id, scan.scan_date, stored.path, analysis)
        }
        _ => history_entry(
            Uuid::new_v4(),
            Utc::now(),
            args.image.display().to_string(),
            analysis,
        ),
    };

    app.store.push_history(&entry).await?;
    app.store.save_last_scan(&entry).await?;
    Ok(())
}

/// Species identification without the health workup.
pub async fn identify(app: &App, args: IdentifyArgs) -> Result<()> {
    let image = load_image(&args.image, app.max_image_bytes())?;
    let provider = app.provider(None)?;

    terminal::note_info(app.catalog.identifying());
    let details = provider.identify(&image).await?;
    render::print_identification(&details, &app.catalog);
    Ok(())
}

pub async fn care(app: &App, args: CareArgs) -> Result<()> {
    let provider = app.provider(None)?;
    let guide = provider.care_tips(&args.plant_name).await?;
    render::print_care_guide(&guide, &app.catalog);
    Ok(())
}

pub async fn ask(app: &App, args: AskArgs) -> Result<()> {
    let image = load_image(&args.image, app.max_image_bytes())?;
    let provider = app.provider(None)?;
    let answer = provider.ask(&image, &args.question).await?;
    println!();
    println!("{answer}");
    println!();
    Ok(())
}

/// Re-render the most recent analysis; optionally export the text report.
pub async fn results(app: &App, args: ResultsArgs) -> Result<()> {
    let Some(entry) = app.store.load_last_scan().await? else {
        terminal::note_info("No analysis yet. Run `plantdoc analyze <image>` first.");
        return Ok(());
    };
    render::print_analysis(&entry.analysis, &app.catalog);

    if let Some(file) = args.report {
        let file = file.unwrap_or_else(|| {
            report::default_file_name(&entry.analysis.plant_identification.common_name)
        });
        let text = report::render_report(&entry.analysis, &entry.id.to_string());
        std::fs::write(&file, &text).with_context(|| format!("Failed to write {file}"))?;
        terminal::note_success(&format!("Report saved to {file}"));
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

fn history_entry(
    id: Uuid,
    scanned_at: DateTime<Utc>,
    image_path: String,
    analysis: PlantAnalysis,
) -> HistoryEntry {
    HistoryEntry {
        id,
        scanned_at,
        plant_name: analysis.plant_identification.common_name.clone(),
        scientific_name: analysis.plant_identification.scientific_name.clone(),
        is_healthy: analysis.health_assessment.is_healthy,
        health_score: analysis.health_assessment.health_score,
        image_path,
        analysis,
    }
}
