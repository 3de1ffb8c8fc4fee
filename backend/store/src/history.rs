//! Local scan history cache and the last-analysis handoff row.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::params;
use tracing::warn;
use uuid::Uuid;

use plantdoc_core::HistoryEntry;

use crate::LocalStore;

/// Oldest entries are evicted past this count.
pub const HISTORY_CAP: usize = 50;

impl LocalStore {
    /// Insert a scan at the front of the history, evicting past the cap.
    pub async fn push_history(&self, entry: &HistoryEntry) -> Result<()> {
        let analysis = serde_json::to_string(&entry.analysis)?;
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO scan_history
             (id, scanned_at, plant_name, scientific_name, is_healthy, health_score, image_path, analysis)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                entry.id.to_string(),
                entry.scanned_at.timestamp_millis(),
                entry.plant_name,
                entry.scientific_name,
                entry.is_healthy,
                entry.health_score,
                entry.image_path,
                analysis,
            ],
        )?;
        conn.execute(
            &format!(
                "DELETE FROM scan_history WHERE id NOT IN
                 (SELECT id FROM scan_history ORDER BY scanned_at DESC, rowid DESC LIMIT {HISTORY_CAP})"
            ),
            [],
        )?;
        Ok(())
    }

    /// All cached entries, most recent first. Rows that no longer parse
    /// are skipped.
    pub async fn history(&self) -> Result<Vec<HistoryEntry>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, scanned_at, plant_name, scientific_name, is_healthy, health_score, image_path, analysis
             FROM scan_history ORDER BY scanned_at DESC, rowid DESC",
        )?;
        let rows: Vec<RawHistoryRow> = stmt
            .query_map([], |row| {
                Ok(RawHistoryRow {
                    id: row.get(0)?,
                    scanned_at: row.get(1)?,
                    plant_name: row.get(2)?,
                    scientific_name: row.get(3)?,
                    is_healthy: row.get(4)?,
                    health_score: row.get(5)?,
                    image_path: row.get(6)?,
                    analysis: row.get(7)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(rows.into_iter().filter_map(decode_history_row).collect())
    }

    pub async fn clear_history(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM scan_history", [])?;
        Ok(())
    }

    /// Drop one cached entry, e.g. after its remote row was deleted.
    pub async fn remove_history(&self, id: Uuid) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM scan_history WHERE id = ?1", [id.to_string()])?;
        Ok(())
    }

    /// Stash the most recent analysis so `results` can re-render it.
    pub async fn save_last_scan(&self, entry: &HistoryEntry) -> Result<()> {
        let payload = serde_json::to_string(entry)?;
        self.put_singleton("last_scan", &payload).await
    }

    pub async fn load_last_scan(&self) -> Result<Option<HistoryEntry>> {
        let Some(payload) = self.get_singleton("last_scan").await? else {
            return Ok(None);
        };
        match serde_json::from_str(&payload) {
            Ok(entry) => Ok(Some(entry)),
            Err(err) => {
                warn!("Discarding unreadable last-scan row: {err}");
                Ok(None)
            }
        }
    }
}

struct RawHistoryRow {
    id: String,
    scanned_at: i64,
    plant_name: String,
    scientific_name: Option<String>,
    is_healthy: bool,
    health_score: f64,
    image_path: String,
    analysis: String,
}

fn decode_history_row(row: RawHistoryRow) -> Option<HistoryEntry> {
    let id = match Uuid::parse_str(&row.id) {
        Ok(id) => id,
        Err(err) => {
            warn!("Skipping history row with bad id {}: {err}", row.id);
            return None;
        }
    };
    let Some(scanned_at) = DateTime::<Utc>::from_timestamp_millis(row.scanned_at) else {
        warn!("Skipping history row {} with bad timestamp", row.id);
        return None;
    };
    let analysis = match serde_json::from_str(&row.analysis) {
        Ok(analysis) => analysis,
        Err(err) => {
            warn!("Skipping history row {} with unreadable analysis: {err}", row.id);
            return None;
        }
    };
    Some(HistoryEntry {
        id,
        scanned_at,
        plant_name: row.plant_name,
        scientific_name: row.scientific_name,
        is_healthy: row.is_healthy,
        health_score: row.health_score,
        image_path: row.image_path,
        analysis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use plantdoc_core::PlantAnalysis;

    fn sample_analysis() -> PlantAnalysis {
        serde_json::from_value(serde_json::json!({
            "isPlant": true,
            "plantIdentification": {
                "commonName": "Tomato",
                "scientificName": "Solanum lycopersicum",
                "family": "Solanaceae",
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

    fn entry(n: i64) -> HistoryEntry {
        HistoryEntry {
            id: Uuid::new_v4(),
            scanned_at: Utc::now() + Duration::seconds(n),
            plant_name: format!("Plant {n}"),
            scientific_name: None,
            is_healthy: true,
            health_score: 90.0,
            image_path: format!("user/{n}.jpg"),
            analysis: sample_analysis(),
        }
    }

    #[tokio::test]
    async fn history_is_newest_first_and_capped() {
        let store = LocalStore::in_memory().unwrap();
        for n in 0..55 {
            store.push_history(&entry(n)).await.unwrap();
        }
        let entries = store.history().await.unwrap();
        assert_eq!(entries.len(), HISTORY_CAP);
        assert_eq!(entries[0].plant_name, "Plant 54");
        assert_eq!(entries.last().unwrap().plant_name, "Plant 5");
    }

    #[tokio::test]
    async fn clear_empties_the_cache() {
        let store = LocalStore::in_memory().unwrap();
        store.push_history(&entry(1)).await.unwrap();
        store.clear_history().await.unwrap();
        assert!(store.history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_drops_only_the_given_entry() {
        let store = LocalStore::in_memory().unwrap();
        let first = entry(1);
        let second = entry(2);
        store.push_history(&first).await.unwrap();
        store.push_history(&second).await.unwrap();
        store.remove_history(first.id).await.unwrap();
        let entries = store.history().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, second.id);
    }

    #[tokio::test]
    async fn corrupt_rows_are_skipped() {
        let store = LocalStore::in_memory().unwrap();
        store.push_history(&entry(1)).await.unwrap();
        {
            let conn = store.conn.lock().await;
            conn.execute(
                "INSERT INTO scan_history
                 (id, scanned_at, plant_name, scientific_name, is_healthy, health_score, image_path, analysis)
                 VALUES ('not-a-uuid', 9, 'x', NULL, 1, 50.0, 'p', 'not json')",
                [],
            )
            .unwrap();
        }
        let entries = store.history().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].plant_name, "Plant 1");
    }

    #[tokio::test]
    async fn last_scan_round_trips() {
        let store = LocalStore::in_memory().unwrap();
        assert!(store.load_last_scan().await.unwrap().is_none());

        let e = entry(3);
        store.save_last_scan(&e).await.unwrap();
        let loaded = store.load_last_scan().await.unwrap().unwrap();
        assert_eq!(loaded.id, e.id);
        assert_eq!(loaded.analysis, e.analysis);
    }
}
