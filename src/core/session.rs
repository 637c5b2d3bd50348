use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::core::matcher::Matcher;
use crate::models::{ExhibitorId, MatchResult, RawExhibitor, SavedMatch, VisitorPreferences};

/// Where a visitor is in the preferences → generation → results workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Unset,
    PreferencesSet,
    ResultsReady,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Unset => "UNSET",
            SessionState::PreferencesSet => "PREFERENCES_SET",
            SessionState::ResultsReady => "RESULTS_READY",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    SetPreferences,
    Generate,
    Refresh,
    ReopenPreferences,
    Dismiss,
    Save,
}

impl fmt::Display for SessionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionAction::SetPreferences => "set preferences",
            SessionAction::Generate => "generate",
            SessionAction::Refresh => "refresh",
            SessionAction::ReopenPreferences => "reopen preferences",
            SessionAction::Dismiss => "dismiss",
            SessionAction::Save => "save",
        };
        f.write_str(label)
    }
}

/// Errors raised by session transitions
///
/// `InvalidTransition` is a caller bug, not a runtime condition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot {action} while session is {from}")]
    InvalidTransition {
        from: SessionState,
        action: SessionAction,
    },

    #[error("at least one industry must be selected before generating matches")]
    EmptySelection,

    #[error("exhibitor {0} is not in the current results")]
    UnknownExhibitor(ExhibitorId),
}

/// Per-visitor matchmaking session
///
/// Dismissals only edit the in-memory list and come back on the next
/// generation; saves are tracked here optimistically and persisted by the
/// saved-match repository.
#[derive(Debug, Clone)]
pub struct MatchSession {
    user_id: String,
    state: SessionState,
    preferences: Option<VisitorPreferences>,
    results: Vec<MatchResult>,
    saved: BTreeSet<ExhibitorId>,
    generation: u64,
}

impl MatchSession {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            state: SessionState::Unset,
            preferences: None,
            results: Vec::new(),
            saved: BTreeSet::new(),
            generation: 0,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn preferences(&self) -> Option<&VisitorPreferences> {
        self.preferences.as_ref()
    }

    /// Current ranked list
    pub fn results(&self) -> &[MatchResult] {
        &self.results
    }

    /// Number of generation passes run so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_saved(&self, exhibitor_id: &str) -> bool {
        self.saved.contains(exhibitor_id)
    }

    pub fn saved_ids(&self) -> impl Iterator<Item = &str> {
        self.saved.iter().map(String::as_str)
    }

    fn ensure(&self, action: SessionAction, allowed: &[SessionState]) -> Result<(), SessionError> {
        if allowed.contains(&self.state) {
            return Ok(());
        }
        tracing::error!(
            "Invalid session transition for {}: {} from {}",
            self.user_id,
            action,
            self.state
        );
        Err(SessionError::InvalidTransition {
            from: self.state,
            action,
        })
    }

    /// Store the visitor's criteria. Valid from UNSET or PREFERENCES_SET.
    pub fn set_preferences(&mut self, prefs: VisitorPreferences) -> Result<(), SessionError> {
        self.ensure(
            SessionAction::SetPreferences,
            &[SessionState::Unset, SessionState::PreferencesSet],
        )?;
        self.preferences = Some(prefs);
        self.state = SessionState::PreferencesSet;
        Ok(())
    }

    /// Run normalization, scoring and ranking over `catalog` and move to
    /// RESULTS_READY. Requires a non-empty industry selection.
    pub fn generate(
        &mut self,
        matcher: &Matcher,
        catalog: &[RawExhibitor],
    ) -> Result<&[MatchResult], SessionError> {
        self.ensure(SessionAction::Generate, &[SessionState::PreferencesSet])?;
        self.run(matcher, catalog)
    }

    /// Re-run generation with unchanged preferences and a freshly fetched catalog
    pub fn refresh(
        &mut self,
        matcher: &Matcher,
        catalog: &[RawExhibitor],
    ) -> Result<&[MatchResult], SessionError> {
        self.ensure(SessionAction::Refresh, &[SessionState::ResultsReady])?;
        self.run(matcher, catalog)
    }

    fn run(&mut self, matcher: &Matcher, catalog: &[RawExhibitor]) -> Result<&[MatchResult], SessionError> {
        let prefs = match self.preferences.as_ref() {
            Some(prefs) if prefs.has_selection() => prefs,
            _ => return Err(SessionError::EmptySelection),
        };

        let outcome = matcher.generate(prefs, catalog);
        tracing::debug!(
            "Generated {} matches for {} from {} exhibitors",
            outcome.matches.len(),
            self.user_id,
            outcome.total_candidates
        );

        self.results = outcome.matches;
        self.generation += 1;
        self.state = SessionState::ResultsReady;
        Ok(&self.results)
    }

    /// Go back to preference selection. The last ranked list stays readable
    /// until the next generation.
    pub fn reopen_preferences(&mut self) -> Result<(), SessionError> {
        self.ensure(SessionAction::ReopenPreferences, &[SessionState::ResultsReady])?;
        self.state = SessionState::PreferencesSet;
        Ok(())
    }

    /// Drop one exhibitor from the in-memory ranked list, keeping the order of
    /// the rest. Never persisted.
    pub fn dismiss(&mut self, exhibitor_id: &str) -> Result<Option<MatchResult>, SessionError> {
        self.ensure(SessionAction::Dismiss, &[SessionState::ResultsReady])?;
        let removed = self
            .results
            .iter()
            .position(|m| m.exhibitor_id == exhibitor_id)
            .map(|index| self.results.remove(index));
        Ok(removed)
    }

    /// Mark an exhibitor as saved and return the result to persist
    pub fn mark_saved(&mut self, exhibitor_id: &str) -> Result<MatchResult, SessionError> {
        self.ensure(SessionAction::Save, &[SessionState::ResultsReady])?;
        let result = self
            .results
            .iter()
            .find(|m| m.exhibitor_id == exhibitor_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownExhibitor(exhibitor_id.to_string()))?;
        self.saved.insert(result.exhibitor_id.clone());
        Ok(result)
    }

    /// Replace the optimistic saved markers with what the store actually holds
    pub fn reconcile_saved(&mut self, saved: &[SavedMatch]) {
        self.saved = saved
            .iter()
            .filter(|m| m.user_id == self.user_id)
            .map(|m| m.exhibitor_id.clone())
            .collect();
    }
}
