use crate::core::{MatchSession, Matcher, SessionError, SessionState};
use crate::models::{ExhibitorId, Industry, LookingFor, MatchResult, SavedMatch, VisitorPreferences};
use crate::services::catalog::{resolve_industry_names, CatalogSource};
use crate::services::saved_matches::{RepositoryError, SavedMatchRepository};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors surfaced by the matchmaking service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Saved match store error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Retry policy for saved-match writes
#[derive(Debug, Clone, Copy)]
pub struct PersistencePolicy {
    /// Extra attempts after the first failed write
    pub save_retries: u32,
    /// Delay before retry `n` is `n * retry_backoff`
    pub retry_backoff: Duration,
}

impl Default for PersistencePolicy {
    fn default() -> Self {
        Self {
            save_retries: 3,
            retry_backoff: Duration::from_millis(200),
        }
    }
}

/// Raw preference input before industry ids are resolved
#[derive(Debug, Clone, Default)]
pub struct PreferenceSelection {
    pub industry_ids: Vec<String>,
    pub industries: Vec<String>,
    pub interests: Vec<String>,
    pub looking_for: LookingFor,
    pub country: Option<String>,
    /// Used only when nothing else is selected
    pub profile_sector: Option<String>,
}

/// Read-only view of a session after an operation
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub state: SessionState,
    pub generation: u64,
    pub preferences: Option<VisitorPreferences>,
    pub matches: Vec<MatchResult>,
    #[serde(rename = "savedExhibitorIds")]
    pub saved_exhibitor_ids: Vec<ExhibitorId>,
}

impl From<&MatchSession> for SessionSnapshot {
    fn from(session: &MatchSession) -> Self {
        Self {
            user_id: session.user_id().to_string(),
            state: session.state(),
            generation: session.generation(),
            preferences: session.preferences().cloned(),
            matches: session.results().to_vec(),
            saved_exhibitor_ids: session.saved_ids().map(str::to_string).collect(),
        }
    }
}

/// Result of a save request
///
/// The session marks the exhibitor saved before the write; `persisted`
/// reports whether the store accepted it.
#[derive(Debug, Clone, Serialize)]
pub struct SaveOutcome {
    #[serde(rename = "savedMatch")]
    pub saved_match: Option<SavedMatch>,
    pub persisted: bool,
}

/// Per-visitor matchmaking sessions over a shared catalog and store
pub struct MatchmakingService {
    sessions: moka::future::Cache<String, Arc<Mutex<MatchSession>>>,
    matcher: Matcher,
    catalog: CatalogSource,
    repository: Arc<dyn SavedMatchRepository>,
    persistence: PersistencePolicy,
}

impl MatchmakingService {
    pub fn new(
        matcher: Matcher,
        catalog: CatalogSource,
        repository: Arc<dyn SavedMatchRepository>,
        session_ttl: Duration,
        persistence: PersistencePolicy,
    ) -> Self {
        let sessions = moka::future::CacheBuilder::new(10_000)
            .time_to_idle(session_ttl)
            .build();

        Self {
            sessions,
            matcher,
            catalog,
            repository,
            persistence,
        }
    }

    pub fn repository(&self) -> &dyn SavedMatchRepository {
        self.repository.as_ref()
    }

    pub fn active_sessions(&self) -> u64 {
        self.sessions.entry_count()
    }

    async fn session(&self, user_id: &str) -> Arc<Mutex<MatchSession>> {
        self.sessions
            .get_with(user_id.to_string(), async {
                tracing::info!("Starting match session for {}", user_id);
                Arc::new(Mutex::new(MatchSession::new(user_id)))
            })
            .await
    }

    /// Current state of a visitor's session
    pub async fn snapshot(&self, user_id: &str) -> SessionSnapshot {
        let handle = self.session(user_id).await;
        let session = handle.lock().await;
        SessionSnapshot::from(&*session)
    }

    /// Turn a raw selection into preferences, resolving industry ids
    /// through the taxonomy and falling back to the profile sector
    pub async fn resolve_preferences(&self, selection: PreferenceSelection) -> VisitorPreferences {
        let mut selected = Vec::new();
        if !selection.industry_ids.is_empty() {
            let taxonomy = self.catalog.industries().await;
            selected = resolve_industry_names(&taxonomy, &selection.industry_ids);
        }
        selected.extend(selection.industries);

        let prefs = if selected.iter().any(|s| !s.trim().is_empty()) {
            VisitorPreferences::new(selected)
        } else {
            VisitorPreferences::seeded(selection.profile_sector.as_deref())
        };

        let prefs = prefs
            .with_interests(selection.interests)
            .with_looking_for(selection.looking_for);

        match selection.country {
            Some(country) => prefs.with_country(country),
            None => prefs,
        }
    }

    pub async fn set_preferences(
        &self,
        user_id: &str,
        selection: PreferenceSelection,
    ) -> Result<SessionSnapshot, ServiceError> {
        let prefs = self.resolve_preferences(selection).await;
        let handle = self.session(user_id).await;
        let mut session = handle.lock().await;

        session.set_preferences(prefs)?;
        tracing::info!("Preferences set for {}", user_id);
        Ok(SessionSnapshot::from(&*session))
    }

    /// Score the (possibly cached) catalog for a visitor
    pub async fn generate(&self, user_id: &str) -> Result<SessionSnapshot, ServiceError> {
        let catalog = self.catalog.exhibitors().await;
        let handle = self.session(user_id).await;
        let mut session = handle.lock().await;

        session.generate(&self.matcher, &catalog)?;
        tracing::info!(
            "Generated {} matches for {} (pass {})",
            session.results().len(),
            user_id,
            session.generation()
        );
        Ok(SessionSnapshot::from(&*session))
    }

    /// Re-score against a freshly fetched catalog
    pub async fn refresh(&self, user_id: &str) -> Result<SessionSnapshot, ServiceError> {
        let catalog = self.catalog.fresh_exhibitors().await;
        let handle = self.session(user_id).await;
        let mut session = handle.lock().await;

        session.refresh(&self.matcher, &catalog)?;
        tracing::info!(
            "Refreshed matches for {}: {} results (pass {})",
            user_id,
            session.results().len(),
            session.generation()
        );
        Ok(SessionSnapshot::from(&*session))
    }

    pub async fn reopen(&self, user_id: &str) -> Result<SessionSnapshot, ServiceError> {
        let handle = self.session(user_id).await;
        let mut session = handle.lock().await;

        session.reopen_preferences()?;
        Ok(SessionSnapshot::from(&*session))
    }

    /// Hide an exhibitor until the next generation pass
    pub async fn dismiss(
        &self,
        user_id: &str,
        exhibitor_id: &str,
    ) -> Result<SessionSnapshot, ServiceError> {
        let handle = self.session(user_id).await;
        let mut session = handle.lock().await;

        if session.dismiss(exhibitor_id)?.is_none() {
            tracing::debug!("Dismiss for {}: {} not in results", user_id, exhibitor_id);
        }
        Ok(SessionSnapshot::from(&*session))
    }

    /// Mark an exhibitor saved and persist it
    ///
    /// Store failures never fail the call; the optimistic marker stays until
    /// the next `list_saved` reconciles it.
    pub async fn save(&self, user_id: &str, exhibitor_id: &str) -> Result<SaveOutcome, ServiceError> {
        let result = {
            let handle = self.session(user_id).await;
            let mut session = handle.lock().await;
            session.mark_saved(exhibitor_id)?
        };

        let mut attempt = 0;
        loop {
            match self.repository.insert_if_absent(user_id, &result).await {
                Ok(saved) => {
                    tracing::info!("Saved match {} -> {}", user_id, exhibitor_id);
                    return Ok(SaveOutcome {
                        saved_match: Some(saved),
                        persisted: true,
                    });
                }
                Err(e) if e.is_transient() && attempt < self.persistence.save_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "Saving {} -> {} failed (attempt {}), retrying: {}",
                        user_id,
                        exhibitor_id,
                        attempt,
                        e
                    );
                    tokio::time::sleep(self.persistence.retry_backoff * attempt).await;
                }
                Err(e) => {
                    tracing::warn!("Failed to persist saved match {} -> {}: {}", user_id, exhibitor_id, e);
                    return Ok(SaveOutcome {
                        saved_match: None,
                        persisted: false,
                    });
                }
            }
        }
    }

    /// Durable saved matches; also reconciles an existing session's markers
    pub async fn list_saved(&self, user_id: &str) -> Result<Vec<SavedMatch>, ServiceError> {
        let saved = self.repository.query_by_user(user_id).await?;

        if let Some(handle) = self.sessions.get(user_id).await {
            handle.lock().await.reconcile_saved(&saved);
        }

        Ok(saved)
    }

    pub async fn industries(&self) -> Vec<Industry> {
        self.catalog.industries().await
    }
}
