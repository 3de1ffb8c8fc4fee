//! Persisted auth session, loaded at startup and cleared on sign-out.

use anyhow::Result;
use tracing::warn;

use plantdoc_core::Session;

use crate::LocalStore;

impl LocalStore {
    pub async fn save_session(&self, session: &Session) -> Result<()> {
        let payload = serde_json::to_string(session)?;
        self.put_singleton("session", &payload).await
    }

    /// The stored session, or `None` when signed out or unreadable.
    pub async fn load_session(&self) -> Result<Option<Session>> {
        let Some(payload) = self.get_singleton("session").await? else {
            return Ok(None);
        };
        match serde_json::from_str(&payload) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                warn!("Discarding unreadable session row: {err}");
                Ok(None)
            }
        }
    }

    pub async fn clear_session(&self) -> Result<()> {
        self.clear_singleton("session").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use plantdoc_core::UserProfile;
    use uuid::Uuid;

    fn session() -> Session {
        Session {
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
            expires_at: Utc::now() + chrono::Duration::hours(1),
            user: UserProfile {
                id: Uuid::new_v4(),
                email: "leaf@example.com".to_string(),
                full_name: None,
                avatar_url: None,
                created_at: None,
            },
        }
    }

    #[tokio::test]
    async fn session_round_trips_and_clears() {
        let store = LocalStore::in_memory().unwrap();
        assert!(store.load_session().await.unwrap().is_none());

        let s = session();
        store.save_session(&s).await.unwrap();
        let loaded = store.load_session().await.unwrap().unwrap();
        assert_eq!(loaded.access_token, "at");
        assert_eq!(loaded.user.email, "leaf@example.com");

        store.clear_session().await.unwrap();
        assert!(store.load_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unreadable_session_reads_as_signed_out() {
        let store = LocalStore::in_memory().unwrap();
        store.put_singleton("session", "{not json").await.unwrap();
        assert!(store.load_session().await.unwrap().is_none());
    }
}
