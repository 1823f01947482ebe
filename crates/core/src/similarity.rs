use serde::{Deserialize, Serialize};

use crate::name::NormalizedName;

/// Outcome of comparing one query against one candidate.
///
/// Scores are in `[0.0, 1.0]` as long as the configured weights sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    /// The candidate exactly as it appeared in the input list.
    pub candidate: String,
    /// Weighted composite used for ranking.
    pub score: f64,
    pub ngram_score: f64,
    pub prefix_score: f64,
    pub edit_score: f64,
    pub normalized_query: NormalizedName,
    pub normalized_candidate: NormalizedName,
}

impl SimilarityResult {
    /// Result for a pair whose normalized forms are identical.
    pub fn identical(
        candidate: String,
        normalized_query: NormalizedName,
        normalized_candidate: NormalizedName,
    ) -> Self {
        Self {
            candidate,
            score: 1.0,
            ngram_score: 1.0,
            prefix_score: 1.0,
            edit_score: 1.0,
            normalized_query,
            normalized_candidate,
        }
    }
}

/// Top-N results, best first. Equal scores keep candidate-list order.
pub type RankedCandidateList = Vec<SimilarityResult>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_sets_every_score_to_one() {
        let n = NormalizedName::new("てすと".to_string());
        let r = SimilarityResult::identical("テスト(株)".to_string(), n.clone(), n);
        assert_eq!(r.score, 1.0);
        assert_eq!(r.ngram_score, 1.0);
        assert_eq!(r.prefix_score, 1.0);
        assert_eq!(r.edit_score, 1.0);
        assert_eq!(r.normalized_query, r.normalized_candidate);
    }

    #[test]
    fn serializes_to_json() {
        let n = NormalizedName::new("abc".to_string());
        let r = SimilarityResult::identical("ABC".to_string(), n.clone(), n);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["candidate"], "ABC");
        assert_eq!(json["normalized_candidate"], "abc");
        assert_eq!(json["score"], 1.0);
    }
}
