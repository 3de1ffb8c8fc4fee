//! Scan history: listing with filters, stats, favorites, deletion.

use std::collections::BTreeSet;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Subcommand, ValueEnum};
use uuid::Uuid;

use plantdoc_core::{DateRange, HealthFilter, HistoryEntry, ScanFilter, ScanStats};
use plantdoc_supabase::SCANS_PER_PAGE;

use crate::app::App;
use crate::terminal::{self, paint, render_table, Column, GREEN, YELLOW};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum HealthArg {
    Healthy,
    Diseased,
}

impl From<HealthArg> for HealthFilter {
    fn from(arg: HealthArg) -> Self {
        match arg {
            HealthArg::Healthy => HealthFilter::Healthy,
            HealthArg::Diseased => HealthFilter::Diseased,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RangeArg {
    Today,
    Week,
    Month,
}

impl From<RangeArg> for DateRange {
    fn from(arg: RangeArg) -> Self {
        match arg {
            RangeArg::Today => DateRange::Today,
            RangeArg::Week => DateRange::Week,
            RangeArg::Month => DateRange::Month,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommands {
    /// Browse your scans, newest first
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Only healthy or only diseased scans
        #[arg(long, value_enum)]
        health: Option<HealthArg>,

        /// Restrict to a recent window
        #[arg(long, value_enum)]
        range: Option<RangeArg>,

        /// Case-insensitive plant name search
        #[arg(long)]
        search: Option<String>,
    },
    /// Aggregate counters across your scans
    Stats,
    /// Toggle a scan's favorite flag
    Favorite { scan_id: Uuid },
    /// Delete a scan, its stored image, and its disease rows
    Delete { scan_id: Uuid },
    /// Clear the local scan cache
    Clear,
}

pub async fn run(app: &App, cmd: HistoryCommands) -> Result<()> {
    match cmd {
        HistoryCommands::List {
            page,
            health,
            range,
            search,
        } => {
            let filter = ScanFilter {
                health: health.map(Into::into),
                date_range: range.map(Into::into),
                search,
            };
            list(app, &filter, page.max(1)).await
        }
        HistoryCommands::Stats => stats(app).await,
        HistoryCommands::Favorite { scan_id } => favorite(app, scan_id).await,
        HistoryCommands::Delete { scan_id } => delete(app, scan_id).await,
        HistoryCommands::Clear => {
            app.store.clear_history().await?;
            terminal::note_success("Local scan history cleared.");
            Ok(())
        }
    }
}

/// Signed in, the hosted table is queried with server-side filters and
/// pagination; otherwise the same filters run over the local cache.
async fn list(app: &App, filter: &ScanFilter, page: usize) -> Result<()> {
    let (rows, total) = match app.session().await? {
        Some(session) => {
            let client = app
                .supabase()?
                .with_access_token(session.access_token.clone());
            let (scans, total) = client.list_scans(session.user.id, filter, page).await?;
            let rows = scans
                .iter()
                .map(|s| {
                    table_row(
                        s.id,
                        s.scan_date,
                        &s.plant_name,
                        s.is_healthy,
                        s.health_score,
                        s.is_favorite,
                    )
                })
                .collect::<Vec<_>>();
            (rows, total)
        }
        None => {
            terminal::note_info("Not signed in; showing the local scan cache.");
            let entries = filter_local(app.store.history().await?, filter);
            let total = entries.len();
            let rows = entries
                .iter()
                .skip((page - 1) * SCANS_PER_PAGE)
                .take(SCANS_PER_PAGE)
                .map(|e| {
                    table_row(
                        e.id,
                        e.scanned_at,
                        &e.plant_name,
                        e.is_healthy,
                        e.health_score,
                        false,
                    )
                })
                .collect::<Vec<_>>();
            (rows, total)
        }
    };

    if rows.is_empty() {
        terminal::note_info("No scans found.");
        return Ok(());
    }

    let columns = [
        Column::left("Date"),
        Column::left("Plant"),
        Column::left("Health"),
        Column::right("Score"),
        Column::left("Scan ID"),
    ];
    println!("{}", render_table(&columns, &rows));
    let pages = total.div_ceil(SCANS_PER_PAGE).max(1);
    println!("Page {page} of {pages} ({total} scans)");
    Ok(())
}

async fn stats(app: &App) -> Result<()> {
    let stats = match app.session().await? {
        Some(session) => {
            let client = app
                .supabase()?
                .with_access_token(session.access_token.clone());
            client.scan_stats(session.user.id).await?
        }
        None => {
            terminal::note_info("Not signed in; counting the local scan cache.");
            local_stats(&app.store.history().await?)
        }
    };

    println!("Total scans:   {}", stats.total);
    println!("Healthy:       {}", stats.healthy);
    println!("Issues found:  {}", stats.diseased);
    println!("Unique plants: {}", stats.unique_plants);
    Ok(())
}

async fn favorite(app: &App, scan_id: Uuid) -> Result<()> {
    let (client, _) = app.signed_client().await?;
    let scan = client.get_scan(scan_id).await?;
    let now_favorite = !scan.is_favorite;
    client.set_favorite(scan_id, now_favorite).await?;
    if now_favorite {
        terminal::note_success("Added to favorites.");
    } else {
        terminal::note_success("Removed from favorites.");
    }
    Ok(())
}

async fn delete(app: &App, scan_id: Uuid) -> Result<()> {
    let (client, _) = app.signed_client().await?;
    let scan = client.get_scan(scan_id).await?;

    // Image removal is non-fatal; the row delete is what matters.
    if client.remove_image(&scan.image_path).await.is_err() {
        terminal::note_warn("Stored image could not be removed.");
    }
    client.delete_scan(scan_id).await?;
    app.store.remove_history(scan_id).await?;
    terminal::note_success("Scan deleted.");
    Ok(())
}

fn table_row(
    id: Uuid,
    date: DateTime<Utc>,
    plant: &str,
    is_healthy: bool,
    score: f64,
    favorite: bool,
) -> Vec<String> {
    let health = if is_healthy {
        paint(GREEN, "Healthy")
    } else {
        paint(YELLOW, "Issues")
    };
    let name = if favorite {
        format!("{plant} ★")
    } else {
        plant.to_string()
    };
    vec![
        date.format("%Y-%m-%d %H:%M").to_string(),
        name,
        health,
        format!("{score}"),
        id.to_string(),
    ]
}

fn filter_local(entries: Vec<HistoryEntry>, filter: &ScanFilter) -> Vec<HistoryEntry> {
    let now = Utc::now();
    entries
        .into_iter()
        .filter(|e| match filter.health {
            Some(HealthFilter::Healthy) => e.is_healthy,
            Some(HealthFilter::Diseased) => !e.is_healthy,
            None => true,
        })
        .filter(|e| {
            filter
                .date_range
                .map_or(true, |r| e.scanned_at >= r.start_from(now))
        })
        .filter(|e| {
            filter.search.as_ref().map_or(true, |q| {
                e.plant_name.to_lowercase().contains(&q.to_lowercase())
            })
        })
        .collect()
}

fn local_stats(entries: &[HistoryEntry]) -> ScanStats {
    let unique: BTreeSet<&str> = entries.iter().map(|e| e.plant_name.as_str()).collect();
    ScanStats {
        total: entries.len(),
        healthy: entries.iter().filter(|e| e.is_healthy).count(),
        diseased: entries.iter().filter(|e| !e.is_healthy).count(),
        unique_plants: unique.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plantdoc_core::PlantAnalysis;

    fn sample_analysis() -> PlantAnalysis {
        serde_json::from_value(serde_json::json!({
            "isPlant": true,
            "plantIdentification": {
                "commonName": "Tomato",
                "scientificName": null,
                "family": null,
                "confidence": 0.9
            },
            "healthAssessment": {
                "isHealthy": true,
                "healthScore": 90.0,
                "overallCondition": "Good"
            },
            "diseases": [],
            "treatments": { "immediate": [], "chemical": [], "organic": [], "cultural": [] },
            "prevention": [],
            "growthRecommendations": {
                "water": {}, "sunlight": {}, "soil": {},
                "temperature": {}, "fertilizer": {}, "pruning": {}
            },
            "additionalNotes": "",
            "urgencyLevel": "none",
            "followUpDays": 14,
            "analyzedAt": "2026-01-01T00:00:00Z",
            "aiModel": "gemini-1.5-pro"
        }))
        .expect("sample analysis")
    }

    fn entry(name: &str, healthy: bool, days_ago: i64) -> HistoryEntry {
        HistoryEntry {
            id: Uuid::new_v4(),
            scanned_at: Utc::now() - chrono::Duration::days(days_ago),
            plant_name: name.to_string(),
            scientific_name: None,
            is_healthy: healthy,
            health_score: if healthy { 90.0 } else { 40.0 },
            image_path: "p".to_string(),
            analysis: sample_analysis(),
        }
    }

    #[test]
    fn local_filters_compose() {
        let entries = vec![
            entry("Tomato", true, 0),
            entry("Tomato", false, 0),
            entry("Fern", true, 10),
        ];

        let filter = ScanFilter {
            health: Some(HealthFilter::Healthy),
            date_range: Some(DateRange::Week),
            search: Some("toma".to_string()),
        };
        let kept = filter_local(entries, &filter);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].plant_name, "Tomato");
        assert!(kept[0].is_healthy);
    }

    #[test]
    fn local_stats_count_unique_names() {
        let entries = vec![
            entry("Tomato", true, 0),
            entry("Tomato", false, 1),
            entry("Fern", true, 2),
        ];
        let stats = local_stats(&entries);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.healthy, 2);
        assert_eq!(stats.diseased, 1);
        assert_eq!(stats.unique_plants, 2);
    }
}
