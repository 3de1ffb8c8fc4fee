//! The saved plant collection.

use anyhow::Result;
use clap::Subcommand;

use plantdoc_core::PlantDocError;

use crate::app::App;
use crate::terminal::{self, render_table, Column};

#[derive(Debug, Subcommand)]
pub enum PlantsCommands {
    /// Save the last analyzed scan to your collection
    Save,
    /// List your saved plants
    List,
}

pub async fn run(app: &App, cmd: PlantsCommands) -> Result<()> {
    let (client, session) = app.signed_client().await?;
    match cmd {
        PlantsCommands::Save => {
            let Some(entry) = app.store.load_last_scan().await? else {
                terminal::note_info("No analysis yet. Run `plantdoc analyze <image>` first.");
                return Ok(());
            };
            match client.save_plant(session.user.id, entry.id).await {
                Ok(()) => terminal::note_success("Saved to favorites!"),
                Err(err) => match err.downcast_ref::<PlantDocError>() {
                    Some(PlantDocError::AlreadySaved) => {
                        terminal::note_info("Plant already saved!")
                    }
                    _ => return Err(err),
                },
            }
        }
        PlantsCommands::List => {
            let saved = client.list_saved_plants(session.user.id).await?;
            if saved.is_empty() {
                terminal::note_info("No saved plants yet.");
                return Ok(());
            }

            let columns = [
                Column::left("Saved"),
                Column::left("Plant"),
                Column::left("Scientific name"),
                Column::left("Scan ID"),
            ];
            let rows: Vec<Vec<String>> = saved
                .iter()
                .map(|s| {
                    let (plant, scientific) = match &s.plant_scans {
                        Some(scan) => (
                            scan.plant_name.clone(),
                            scan.plant_scientific_name.clone().unwrap_or_default(),
                        ),
                        None => ("(deleted scan)".to_string(), String::new()),
                    };
                    let saved_at = s
                        .created_at
                        .map(|t| t.format("%Y-%m-%d").to_string())
                        .unwrap_or_default();
                    vec![saved_at, plant, scientific, s.scan_id.to_string()]
                })
                .collect();
            println!("{}", render_table(&columns, &rows));
        }
    }
    Ok(())
}
