// Model exports
pub mod catalog;
pub mod domain;
pub mod requests;
pub mod responses;

pub use catalog::{LabelEntry, OneOrMany, RawExhibitor, Scalar};
pub use domain::{
    ExhibitorAttributes, ExhibitorId, Industry, LookingFor, MatchResult, MatchStatus, ReasonCode,
    SavedMatch, ScoringWeights, SponsorshipLevel, VisitorPreferences,
};
pub use requests::{ExhibitorActionRequest, SavedMatchesQuery, SessionRequest, SetPreferencesRequest};
pub use responses::{
    ErrorResponse, HealthResponse, IndustriesResponse, MatchesResponse, SaveResponse,
    SavedMatchesResponse,
};
