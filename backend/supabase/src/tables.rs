//! PostgREST operations on the scan, saved-plant, and profile tables.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Response;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use plantdoc_core::{
    DetectedDiseaseRow, HealthFilter, NewScan, PlantDocError, ScanFilter, ScanRecord, ScanStats,
};

use crate::SupabaseClient;

/// History page size, matching the web client.
pub const SCANS_PER_PAGE: usize = 12;

/// A `saved_plants` row, optionally with its scan embedded.
#[derive(Debug, Clone, Deserialize)]
pub struct SavedPlant {
    pub id: Uuid,
    pub user_id: Uuid,
    pub scan_id: Uuid,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub plant_scans: Option<ScanRecord>,
}

/// A `profiles` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn parse_pg_error(body: &str) -> (Option<String>, String) {
    match serde_json::from_str::<Value>(body) {
        Ok(v) => {
            let code = v.get("code").and_then(Value::as_str).map(str::to_string);
            let message = v
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| body.to_string());
            (code, message)
        }
        Err(_) => (None, body.to_string()),
    }
}

async fn require_db_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let (_, message) = parse_pg_error(&body);
    Err(PlantDocError::DatabaseError(format!("{status}: {message}")).into())
}

/// Total row count from a `Content-Range` header like `0-11/47`.
fn total_from_content_range(header: Option<&reqwest::header::HeaderValue>) -> Option<usize> {
    let raw = header?.to_str().ok()?;
    raw.rsplit('/').next()?.parse().ok()
}

impl SupabaseClient {
    /// Persist a completed scan; returns the stored row with server-side
    /// id and scan_date filled in.
    pub async fn insert_scan(&self, scan: &NewScan) -> Result<ScanRecord> {
        let response = self
            .authed(self.http.post(self.table_endpoint("plant_scans")))
            .header("Prefer", "return=representation")
            .json(scan)
            .send()
            .await
            .context("scan insert request failed")?;
        let response = require_db_success(response).await?;

        let rows: Vec<ScanRecord> = response
            .json()
            .await
            .context("failed to parse inserted scan")?;
        let record = rows
            .into_iter()
            .next()
            .ok_or_else(|| PlantDocError::DatabaseError("scan insert returned no row".to_string()))?;
        info!("[Tables] Stored scan {} ({})", record.id, record.plant_name);
        Ok(record)
    }

    /// Bulk-insert one row per detected disease. No-op for healthy scans.
    pub async fn insert_diseases(&self, rows: &[DetectedDiseaseRow]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let response = self
            .authed(self.http.post(self.table_endpoint("detected_diseases")))
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await
            .context("disease insert request failed")?;
        require_db_success(response).await?;
        debug!("[Tables] Stored {} disease rows", rows.len());
        Ok(())
    }

    /// One page of scan history, newest first, with the total row count.
    pub async fn list_scans(
        &self,
        user_id: Uuid,
        filter: &ScanFilter,
        page: usize,
    ) -> Result<(Vec<ScanRecord>, usize)> {
        let page = page.max(1);
        let from = (page - 1) * SCANS_PER_PAGE;
        let to = from + SCANS_PER_PAGE - 1;

        let mut query: Vec<(&str, String)> = vec![
            ("select", "*".to_string()),
            ("user_id", format!("eq.{user_id}")),
            ("order", "scan_date.desc".to_string()),
        ];
        if let Some(health) = filter.health {
            let healthy = matches!(health, HealthFilter::Healthy);
            query.push(("is_healthy", format!("eq.{healthy}")));
        }
        if let Some(range) = filter.date_range {
            let start = range.start_from(Utc::now());
            query.push(("scan_date", format!("gte.{}", start.to_rfc3339())));
        }
        if let Some(search) = &filter.search {
            query.push(("plant_name", format!("ilike.*{search}*")));
        }

        let response = self
            .authed(self.http.get(self.table_endpoint("plant_scans")))
            .query(&query)
            .header("Range-Unit", "items")
            .header("Range", format!("{from}-{to}"))
            .header("Prefer", "count=exact")
            .send()
            .await
            .context("history request failed")?;
        let response = require_db_success(response).await?;

        let total = total_from_content_range(response.headers().get("content-range"));
        let rows: Vec<ScanRecord> = response
            .json()
            .await
            .context("failed to parse history rows")?;
        let total = total.unwrap_or(rows.len());
        Ok((rows, total))
    }

    /// Fetch one scan by id.
    pub async fn get_scan(&self, scan_id: Uuid) -> Result<ScanRecord> {
        let response = self
            .authed(self.http.get(self.table_endpoint("plant_scans")))
            .query(&[
                ("select", "*".to_string()),
                ("id", format!("eq.{scan_id}")),
                ("limit", "1".to_string()),
            ])
            .send()
            .await
            .context("scan fetch request failed")?;
        let response = require_db_success(response).await?;

        let rows: Vec<ScanRecord> = response.json().await.context("failed to parse scan")?;
        rows.into_iter()
            .next()
            .ok_or_else(|| PlantDocError::DatabaseError(format!("scan {scan_id} not found")).into())
    }

    /// Aggregate counters over the user's whole history.
    pub async fn scan_stats(&self, user_id: Uuid) -> Result<ScanStats> {
        let response = self
            .authed(self.http.get(self.table_endpoint("plant_scans")))
            .query(&[
                ("select", "is_healthy,plant_name".to_string()),
                ("user_id", format!("eq.{user_id}")),
            ])
            .send()
            .await
            .context("stats request failed")?;
        let response = require_db_success(response).await?;

        let rows: Vec<StatRow> = response.json().await.context("failed to parse stat rows")?;
        Ok(stats_from_rows(&rows))
    }

    pub async fn set_favorite(&self, scan_id: Uuid, favorite: bool) -> Result<()> {
        let response = self
            .authed(self.http.patch(self.table_endpoint("plant_scans")))
            .query(&[("id", format!("eq.{scan_id}"))])
            .header("Prefer", "return=minimal")
            .json(&serde_json::json!({ "is_favorite": favorite }))
            .send()
            .await
            .context("favorite update request failed")?;
        require_db_success(response).await?;
        Ok(())
    }

    /// Delete a scan and its disease rows. The caller removes the stored
    /// image first, while the row still names its path.
    pub async fn delete_scan(&self, scan_id: Uuid) -> Result<()> {
        let response = self
            .authed(self.http.delete(self.table_endpoint("detected_diseases")))
            .query(&[("scan_id", format!("eq.{scan_id}"))])
            .send()
            .await
            .context("disease delete request failed")?;
        require_db_success(response).await?;

        let response = self
            .authed(self.http.delete(self.table_endpoint("plant_scans")))
            .query(&[("id", format!("eq.{scan_id}"))])
            .send()
            .await
            .context("scan delete request failed")?;
        require_db_success(response).await?;
        info!("[Tables] Deleted scan {}", scan_id);
        Ok(())
    }

    /// Bookmark a scan in the user's collection.
    pub async fn save_plant(&self, user_id: Uuid, scan_id: Uuid) -> Result<()> {
        let response = self
            .authed(self.http.post(self.table_endpoint("saved_plants")))
            .header("Prefer", "return=minimal")
            .json(&serde_json::json!({ "user_id": user_id, "scan_id": scan_id }))
            .send()
            .await
            .context("save plant request failed")?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        let (code, message) = parse_pg_error(&body);
        if code.as_deref() == Some("23505") {
            return Err(PlantDocError::AlreadySaved.into());
        }
        Err(PlantDocError::DatabaseError(format!("{status}: {message}")).into())
    }

    /// The user's saved plants with their scans embedded, newest first.
    pub async fn list_saved_plants(&self, user_id: Uuid) -> Result<Vec<SavedPlant>> {
        let response = self
            .authed(self.http.get(self.table_endpoint("saved_plants")))
            .query(&[
                ("select", "*,plant_scans(*)".to_string()),
                ("user_id", format!("eq.{user_id}")),
                ("order", "created_at.desc".to_string()),
            ])
            .send()
            .await
            .context("saved plants request failed")?;
        let response = require_db_success(response).await?;
        response
            .json()
            .await
            .context("failed to parse saved plants")
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<Option<ProfileRow>> {
        let response = self
            .authed(self.http.get(self.table_endpoint("profiles")))
            .query(&[
                ("select", "*".to_string()),
                ("id", format!("eq.{user_id}")),
                ("limit", "1".to_string()),
            ])
            .send()
            .await
            .context("profile fetch request failed")?;
        let response = require_db_success(response).await?;

        let rows: Vec<ProfileRow> = response.json().await.context("failed to parse profile")?;
        Ok(rows.into_iter().next())
    }

    pub async fn upsert_profile(&self, profile: &ProfileRow) -> Result<()> {
        let response = self
            .authed(self.http.post(self.table_endpoint("profiles")))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(profile)
            .send()
            .await
            .context("profile upsert request failed")?;
        require_db_success(response).await?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct StatRow {
    is_healthy: bool,
    plant_name: String,
}

fn stats_from_rows(rows: &[StatRow]) -> ScanStats {
    let healthy = rows.iter().filter(|r| r.is_healthy).count();
    let unique_plants = rows
        .iter()
        .map(|r| r.plant_name.as_str())
        .collect::<std::collections::BTreeSet<_>>()
        .len();
    ScanStats {
        total: rows.len(),
        healthy,
        diseased: rows.len() - healthy,
        unique_plants,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_range_total() {
        let header = reqwest::header::HeaderValue::from_static("0-11/47");
        assert_eq!(total_from_content_range(Some(&header)), Some(47));
        let unknown = reqwest::header::HeaderValue::from_static("0-11/*");
        assert_eq!(total_from_content_range(Some(&unknown)), None);
        assert_eq!(total_from_content_range(None), None);
    }

    #[test]
    fn stats_count_health_and_unique_names() {
        let rows = vec![
            StatRow { is_healthy: true, plant_name: "Tomato".to_string() },
            StatRow { is_healthy: false, plant_name: "Tomato".to_string() },
            StatRow { is_healthy: true, plant_name: "Basil".to_string() },
        ];
        let stats = stats_from_rows(&rows);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.healthy, 2);
        assert_eq!(stats.diseased, 1);
        assert_eq!(stats.unique_plants, 2);
    }

    #[test]
    fn pg_error_parsing() {
        let (code, message) =
            parse_pg_error(r#"{"code":"23505","message":"duplicate key value"}"#);
        assert_eq!(code.as_deref(), Some("23505"));
        assert_eq!(message, "duplicate key value");

        let (code, message) = parse_pg_error("gateway timeout");
        assert!(code.is_none());
        assert_eq!(message, "gateway timeout");
    }
}
