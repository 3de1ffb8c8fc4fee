//! Shared context handed to every command: configuration, the local store,
//! and the message catalog.

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing::{debug, warn};

use plantdoc_config::defaults::{DEFAULT_GEMINI_MODEL, DEFAULT_MAX_IMAGE_BYTES};
use plantdoc_config::{config_dir, PlantDocConfig};
use plantdoc_core::{Language, PlantDocError, Session, Theme};
use plantdoc_store::LocalStore;
use plantdoc_supabase::SupabaseClient;
use plantdoc_vision::{GeminiProvider, PlantAnalyzer, PlantIdProvider};

use crate::i18n::Catalog;

/// Which vision backend to use for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    Gemini,
    #[value(name = "plantid")]
    PlantId,
}

pub struct App {
    pub config: PlantDocConfig,
    pub store: LocalStore,
    pub catalog: Catalog,
}

impl App {
    /// Open the local store and apply stored preferences. Passing `--lang`
    /// or `--theme` persists the choice, like the original toggles did.
    pub async fn from_config(
        config: PlantDocConfig,
        lang: Option<Language>,
        theme: Option<Theme>,
    ) -> Result<Self> {
        let dir = config_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let store = LocalStore::open(dir.join("plantdoc.db"))?;

        if let Some(theme) = theme {
            store.set_theme(theme).await?;
        }
        if let Some(lang) = lang {
            store.set_language(lang).await?;
        }
        let theme = store.theme().await?;
        let language = store.language().await?;
        debug!("Preferences applied: theme={theme} language={language}");

        Ok(Self {
            config,
            store,
            catalog: Catalog::new(language),
        })
    }

    /// Unauthenticated Supabase client from the configured project.
    pub fn supabase(&self) -> Result<SupabaseClient> {
        let supabase = self.config.supabase.as_ref();
        let url = supabase.and_then(|s| s.url.as_deref()).ok_or_else(|| {
            PlantDocError::ConfigError(
                "Supabase URL missing; set supabase.url or SUPABASE_URL".to_string(),
            )
        })?;
        let anon_key = supabase.and_then(|s| s.anon_key.as_deref()).ok_or_else(|| {
            PlantDocError::ConfigError(
                "Supabase anon key missing; set supabase.anonKey or SUPABASE_ANON_KEY".to_string(),
            )
        })?;
        Ok(SupabaseClient::new(url, anon_key))
    }

    /// The stored session, if still usable. An expired session gets one
    /// refresh attempt; a failed refresh clears it.
    pub async fn session(&self) -> Result<Option<Session>> {
        let Some(session) = self.store.load_session().await? else {
            return Ok(None);
        };
        if !session.is_expired() {
            return Ok(Some(session));
        }

        debug!("Stored session expired; attempting refresh");
        let client = self.supabase()?;
        match client.refresh_session(&session.refresh_token).await {
            Ok(fresh) => {
                self.store.save_session(&fresh).await?;
                Ok(Some(fresh))
            }
            Err(err) => {
                warn!("Session refresh failed, signing out: {err}");
                self.store.clear_session().await?;
                Ok(None)
            }
        }
    }

    /// Authenticated client plus the session it was built from. Errors with
    /// `NotSignedIn` when there is no usable session.
    pub async fn signed_client(&self) -> Result<(SupabaseClient, Session)> {
        let session = self.session().await?.ok_or(PlantDocError::NotSignedIn)?;
        let client = self
            .supabase()?
            .with_access_token(session.access_token.clone());
        Ok((client, session))
    }

    /// Build the analysis provider, honoring a `--provider` override.
    pub fn provider(&self, choice: Option<ProviderKind>) -> Result<Box<dyn PlantAnalyzer>> {
        let kind = match choice {
            Some(kind) => kind,
            None => match self.config.provider.as_deref() {
                Some("plantid") => ProviderKind::PlantId,
                _ => ProviderKind::Gemini,
            },
        };

        match kind {
            ProviderKind::Gemini => {
                let gemini = self.config.gemini.as_ref();
                let api_key = gemini.and_then(|g| g.api_key.clone()).ok_or_else(|| {
                    PlantDocError::ConfigError(
                        "Gemini API key missing; set gemini.apiKey or GEMINI_API_KEY".to_string(),
                    )
                })?;
                let model = gemini
                    .and_then(|g| g.model.clone())
                    .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
                let mut provider = GeminiProvider::new(api_key, model);
                if let Some(base_url) = gemini.and_then(|g| g.base_url.clone()) {
                    provider = provider.with_base_url(base_url);
                }
                Ok(Box::new(provider))
            }
            ProviderKind::PlantId => {
                let plant_id = self.config.plant_id.as_ref();
                let api_key = plant_id.and_then(|p| p.api_key.clone()).ok_or_else(|| {
                    PlantDocError::ConfigError(
                        "Plant.id API key missing; set plantId.apiKey or PLANT_ID_API_KEY"
                            .to_string(),
                    )
                })?;
                let mut provider = PlantIdProvider::new(api_key);
                if let Some(base_url) = plant_id.and_then(|p| p.base_url.clone()) {
                    provider = provider.with_base_url(base_url);
                }
                Ok(Box::new(provider))
            }
        }
    }

    pub fn max_image_bytes(&self) -> u64 {
        self.config
            .limits
            .as_ref()
            .and_then(|l| l.max_image_bytes)
            .unwrap_or(DEFAULT_MAX_IMAGE_BYTES)
    }
}
