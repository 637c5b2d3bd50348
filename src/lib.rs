//! Exhibitor Match - explainable exhibitor recommendations for event visitors
//!
//! Scores an event's exhibitor catalog against a visitor's stated interests,
//! ranks the results, and tracks which recommendations the visitor saved or
//! dismissed during a matchmaking session.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{normalize, rank, score, MatchSession, Matcher, Ranker, SessionError, SessionState};
pub use crate::models::{
    ExhibitorAttributes, MatchResult, RawExhibitor, ReasonCode, SavedMatch, ScoringWeights,
    VisitorPreferences,
};
pub use crate::services::{MatchmakingService, SavedMatchRepository};
