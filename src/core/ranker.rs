use crate::models::MatchResult;

/// Scores must be strictly above this to be recommended
pub const DEFAULT_MIN_SCORE: u8 = 20;

/// Size of a ranked list
pub const DEFAULT_MAX_RESULTS: usize = 20;

/// Inclusion threshold and result cap for a ranking pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranker {
    /// Exclusive lower bound: a score equal to it is dropped
    pub min_score: u8,
    pub max_results: usize,
}

impl Default for Ranker {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl Ranker {
    pub fn new(min_score: u8, max_results: usize) -> Self {
        Self {
            min_score,
            max_results,
        }
    }

    /// Filter, sort by score descending and truncate
    ///
    /// Equal scores keep their input order (`sort_by` is stable).
    pub fn rank(&self, results: Vec<MatchResult>) -> Vec<MatchResult> {
        let mut ranked: Vec<MatchResult> = results
            .into_iter()
            .filter(|result| result.score > self.min_score)
            .collect();

        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked.truncate(self.max_results);
        ranked
    }
}

/// Rank with the default threshold (> 20) and cap (20)
pub fn rank(results: Vec<MatchResult>) -> Vec<MatchResult> {
    Ranker::default().rank(results)
}
