use crate::core::{normalizer::normalize, ranker::Ranker, scoring::score_with_weights};
use crate::models::{MatchResult, RawExhibitor, ScoringWeights, VisitorPreferences};

/// Result of one generation pass
#[derive(Debug, Clone, Default)]
pub struct GenerationOutcome {
    pub matches: Vec<MatchResult>,
    pub total_candidates: usize,
    /// Records dropped because they carried no id
    pub skipped: usize,
}

/// Runs the matching pipeline over a catalog
///
/// # Pipeline Stages
/// 1. Attribute normalization
/// 2. Scoring
/// 3. Threshold filter, ranking and truncation
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    weights: ScoringWeights,
    ranker: Ranker,
}

impl Matcher {
    pub fn new(weights: ScoringWeights, ranker: Ranker) -> Self {
        Self { weights, ranker }
    }

    /// Score a single raw exhibitor, ignoring the threshold
    pub fn score_one(&self, prefs: &VisitorPreferences, raw: &RawExhibitor) -> Option<MatchResult> {
        let exhibitor_id = raw.exhibitor_id()?;
        let attrs = normalize(raw);
        let (score, reasons) = score_with_weights(prefs, &attrs, &self.weights);

        Some(MatchResult {
            exhibitor_id,
            score,
            reasons,
            name: raw.display_name(),
            country: attrs.country,
            sponsorship_level: attrs.sponsorship_level,
            is_partner: attrs.is_partner,
        })
    }

    /// Score and rank the full catalog for the given preferences
    pub fn generate(&self, prefs: &VisitorPreferences, catalog: &[RawExhibitor]) -> GenerationOutcome {
        let total_candidates = catalog.len();

        let scored: Vec<MatchResult> = catalog
            .iter()
            .filter_map(|raw| self.score_one(prefs, raw))
            .collect();
        let skipped = total_candidates - scored.len();

        if skipped > 0 {
            tracing::debug!("Skipped {} catalog records without an id", skipped);
        }

        GenerationOutcome {
            matches: self.ranker.rank(scored),
            total_candidates,
            skipped,
        }
    }
}
