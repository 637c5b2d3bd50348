// Core algorithm exports
pub mod matcher;
pub mod normalizer;
pub mod ranker;
pub mod scoring;
pub mod session;

pub use matcher::{GenerationOutcome, Matcher};
pub use normalizer::normalize;
pub use ranker::{rank, Ranker, DEFAULT_MAX_RESULTS, DEFAULT_MIN_SCORE};
pub use scoring::{score, score_with_weights, MAX_SCORE};
pub use session::{MatchSession, SessionAction, SessionError, SessionState};
