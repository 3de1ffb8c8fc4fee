//! Key/value preferences: theme, language, remembered login email.

use anyhow::Result;
use rusqlite::{params, OptionalExtension};
use tracing::warn;

use plantdoc_core::{Language, Theme};

use crate::LocalStore;

const KEY_THEME: &str = "theme";
const KEY_LANGUAGE: &str = "language";
const KEY_REMEMBERED_EMAIL: &str = "remembered_email";
const KEY_REMEMBER_ME: &str = "remember_me";

impl LocalStore {
    async fn pref(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().await;
        let value = conn
            .query_row("SELECT value FROM prefs WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    async fn set_pref(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO prefs (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    async fn remove_pref(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM prefs WHERE key = ?1", [key])?;
        Ok(())
    }

    /// Stored theme, defaulting when unset or unreadable.
    pub async fn theme(&self) -> Result<Theme> {
        Ok(self.pref(KEY_THEME).await?.map_or_else(Theme::default, |raw| {
            raw.parse().unwrap_or_else(|err| {
                warn!("Resetting stored theme: {err}");
                Theme::default()
            })
        }))
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<()> {
        self.set_pref(KEY_THEME, theme.as_str()).await
    }

    /// Stored language, defaulting when unset or unreadable.
    pub async fn language(&self) -> Result<Language> {
        Ok(self.pref(KEY_LANGUAGE).await?.map_or_else(Language::default, |raw| {
            raw.parse().unwrap_or_else(|err| {
                warn!("Resetting stored language: {err}");
                Language::default()
            })
        }))
    }

    pub async fn set_language(&self, language: Language) -> Result<()> {
        self.set_pref(KEY_LANGUAGE, language.as_str()).await
    }

    /// Email to prefill at login, if the user opted in.
    pub async fn remembered_email(&self) -> Result<Option<String>> {
        if self.pref(KEY_REMEMBER_ME).await?.as_deref() != Some("true") {
            return Ok(None);
        }
        self.pref(KEY_REMEMBERED_EMAIL).await
    }

    /// Record the login email for next time, or forget it.
    pub async fn remember_email(&self, email: &str, remember: bool) -> Result<()> {
        if remember {
            self.set_pref(KEY_REMEMBERED_EMAIL, email).await?;
            self.set_pref(KEY_REMEMBER_ME, "true").await
        } else {
            self.remove_pref(KEY_REMEMBERED_EMAIL).await?;
            self.set_pref(KEY_REMEMBER_ME, "false").await
        }
    }
}
