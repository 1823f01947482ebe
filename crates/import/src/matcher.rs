use nayose_core::{MasterCandidateSet, MatcherConfig, RankedCandidateList, SimilarityResult};
use rayon::prelude::*;
use std::collections::HashSet;

use crate::normalize::normalize;
use crate::util::levenshtein_chars;

/// Ranks master-list names against a query by a weighted blend of bigram
/// Jaccard, positional prefix overlap, and normalized edit distance.
///
/// Holds only its configuration, so one instance can be shared freely across
/// threads for the duration of a batch.
#[derive(Debug, Clone, Default)]
pub struct NameMatcher {
    config: MatcherConfig,
}

impl NameMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Scores `candidate` against `query`.
    ///
    /// When both normalize to the same text every score is 1.0 and the
    /// sub-scorers are skipped. That includes two blank names.
    pub fn similarity(&self, query: &str, candidate: &str) -> SimilarityResult {
        let norm_query = normalize(query);
        let norm_candidate = normalize(candidate);

        if norm_query == norm_candidate {
            return SimilarityResult::identical(candidate.to_string(), norm_query, norm_candidate);
        }

        let a: Vec<char> = norm_query.as_str().chars().collect();
        let b: Vec<char> = norm_candidate.as_str().chars().collect();

        let ngram_score = ngram_similarity_chars(&a, &b, self.config.ngram_size);
        let prefix_score = prefix_match_chars(&a, &b);
        let edit_score = edit_distance_chars(&a, &b);

        let score = self.config.ngram_weight * ngram_score
            + self.config.prefix_weight * prefix_score
            + self.config.edit_weight * edit_score;

        SimilarityResult {
            candidate: candidate.to_string(),
            score,
            ngram_score,
            prefix_score,
            edit_score,
            normalized_query: norm_query,
            normalized_candidate: norm_candidate,
        }
    }

    /// Returns at most `top_n` candidates scoring at least `threshold`, best
    /// first. Equal scores keep the order they had in `candidates`.
    pub fn find_candidates<I, S>(
        &self,
        query: &str,
        candidates: I,
        top_n: usize,
        threshold: f64,
    ) -> RankedCandidateList
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut results: Vec<SimilarityResult> = candidates
            .into_iter()
            .map(|c| self.similarity(query, c.as_ref()))
            .filter(|r| r.score >= threshold)
            .collect();

        // `sort_by` is stable, which is what keeps ties in input order.
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_n);
        results
    }

    /// `find_candidates` with the configured `top_n` and `threshold`.
    pub fn suggest(&self, query: &str, master: &MasterCandidateSet) -> RankedCandidateList {
        self.find_candidates(query, master.iter(), self.config.top_n, self.config.threshold)
    }

    /// Ranks every query against the same master set. Queries are independent,
    /// so they are scored in parallel; the output lines up with `queries`.
    pub fn rank_all<S>(&self, queries: &[S], master: &MasterCandidateSet) -> Vec<RankedCandidateList>
    where
        S: AsRef<str> + Sync,
    {
        queries
            .par_iter()
            .map(|q| self.suggest(q.as_ref(), master))
            .collect()
    }
}

/// Jaccard similarity of the two strings' character n-gram sets.
///
/// A string shorter than `n` contributes itself as its only n-gram. An `n` of
/// zero is treated as 1.
pub fn ngram_similarity(text1: &str, text2: &str, n: usize) -> f64 {
    let a: Vec<char> = text1.chars().collect();
    let b: Vec<char> = text2.chars().collect();
    ngram_similarity_chars(&a, &b, n)
}

/// Length of the common leading run divided by the shorter length.
pub fn prefix_match_score(text1: &str, text2: &str) -> f64 {
    let a: Vec<char> = text1.chars().collect();
    let b: Vec<char> = text2.chars().collect();
    prefix_match_chars(&a, &b)
}

/// `1 - levenshtein / max_len`, measured in characters.
pub fn edit_distance_score(text1: &str, text2: &str) -> f64 {
    let a: Vec<char> = text1.chars().collect();
    let b: Vec<char> = text2.chars().collect();
    edit_distance_chars(&a, &b)
}

fn ngrams(chars: &[char], n: usize) -> HashSet<&[char]> {
    if chars.len() < n {
        return HashSet::from([chars]);
    }
    chars.windows(n).collect()
}

fn ngram_similarity_chars(a: &[char], b: &[char], n: usize) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let n = n.max(1);
    let grams_a = ngrams(a, n);
    let grams_b = ngrams(b, n);

    let intersection = grams_a.intersection(&grams_b).count();
    let union = grams_a.union(&grams_b).count();

    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

fn prefix_match_chars(a: &[char], b: &[char]) -> f64 {
    let min_len = a.len().min(b.len());
    if min_len == 0 {
        return 0.0;
    }

    let matched = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    matched as f64 / min_len as f64
}

fn edit_distance_chars(a: &[char], b: &[char]) -> f64 {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        _ => {}
    }

    let max_len = a.len().max(b.len());
    1.0 - (levenshtein_chars(a, b) as f64 / max_len as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPS,
            "expected {expected}, got {actual}"
        );
    }

    // ── sub-scorers ───────────────────────────────────────────────────────────

    #[test]
    fn ngram_partial_overlap() {
        assert_close(ngram_similarity("abc", "abd", 2), 1.0 / 3.0);
    }

    #[test]
    fn ngram_identical_and_disjoint() {
        assert_close(ngram_similarity("abcd", "abcd", 2), 1.0);
        assert_close(ngram_similarity("ab", "cd", 2), 0.0);
    }

    #[test]
    fn ngram_short_string_is_its_own_gram() {
        assert_close(ngram_similarity("a", "a", 2), 1.0);
        // {"a"} vs {"ab"}
        assert_close(ngram_similarity("a", "ab", 2), 0.0);
    }

    #[test]
    fn ngram_empty_is_zero() {
        assert_eq!(ngram_similarity("", "abc", 2), 0.0);
        assert_eq!(ngram_similarity("abc", "", 2), 0.0);
        assert_eq!(ngram_similarity("", "", 2), 0.0);
    }

    #[test]
    fn ngram_size_zero_behaves_as_unigrams() {
        assert_close(ngram_similarity("ab", "bc", 0), 1.0 / 3.0);
    }

    #[test]
    fn ngram_trigrams() {
        // {"abc","bcd"} vs {"abc","bce"}
        assert_close(ngram_similarity("abcd", "abce", 3), 1.0 / 3.0);
    }

    #[test]
    fn prefix_is_positional() {
        assert_close(prefix_match_score("abcde", "abxyz"), 0.4);
        assert_close(prefix_match_score("xabc", "abc"), 0.0);
    }

    #[test]
    fn prefix_divides_by_shorter() {
        assert_close(prefix_match_score("ab", "abcdef"), 1.0);
        assert_close(prefix_match_score("やまだ商事", "やまと"), 2.0 / 3.0);
    }

    #[test]
    fn prefix_empty_is_zero() {
        assert_eq!(prefix_match_score("", "abc"), 0.0);
        assert_eq!(prefix_match_score("", ""), 0.0);
    }

    #[test]
    fn edit_distance_kitten_sitting() {
        assert_close(edit_distance_score("kitten", "sitting"), 1.0 - 3.0 / 7.0);
    }

    #[test]
    fn edit_distance_empty_cases() {
        assert_eq!(edit_distance_score("", ""), 1.0);
        assert_eq!(edit_distance_score("", "abc"), 0.0);
        assert_eq!(edit_distance_score("abc", ""), 0.0);
    }

    // ── similarity ────────────────────────────────────────────────────────────

    #[test]
    fn similarity_self_is_perfect() {
        let m = NameMatcher::default();
        let r = m.similarity("山田商事", "山田商事");
        assert_eq!(r.score, 1.0);
        assert_eq!(r.ngram_score, 1.0);
        assert_eq!(r.prefix_score, 1.0);
        assert_eq!(r.edit_score, 1.0);
    }

    #[test]
    fn similarity_legal_form_and_kana_variants_are_identical() {
        let m = NameMatcher::default();
        let r = m.similarity("株式会社テスト", "テスト(株)");
        assert_eq!(r.score, 1.0);
        assert_eq!(r.normalized_query.as_str(), "てすと");
        assert_eq!(r.normalized_candidate.as_str(), "てすと");
        assert_eq!(r.candidate, "テスト(株)");
    }

    #[test]
    fn similarity_both_blank_short_circuits() {
        let m = NameMatcher::default();
        assert_eq!(m.similarity("", "(株)").score, 1.0);
    }

    #[test]
    fn similarity_composite_is_weighted_sum() {
        let m = NameMatcher::default();
        let r = m.similarity("abcde", "abxyz");
        let expected = 0.5 * r.ngram_score + 0.3 * r.prefix_score + 0.2 * r.edit_score;
        assert_close(r.score, expected);
        assert_close(r.prefix_score, 0.4);
        // {"ab","bc","cd","de"} vs {"ab","bx","xy","yz"}
        assert_close(r.ngram_score, 1.0 / 7.0);
        assert_close(r.edit_score, 1.0 - 3.0 / 5.0);
    }

    #[test]
    fn similarity_one_side_blank() {
        let m = NameMatcher::default();
        let r = m.similarity("", "山田商事");
        assert_eq!(r.ngram_score, 0.0);
        assert_eq!(r.prefix_score, 0.0);
        assert_eq!(r.edit_score, 0.0);
        assert_eq!(r.score, 0.0);
    }

    #[test]
    fn similarity_uses_configured_ngram_size() {
        let bigram = NameMatcher::default().similarity("abcd", "abce");
        let trigram = NameMatcher::new(MatcherConfig {
            ngram_size: 3,
            ..MatcherConfig::default()
        })
        .similarity("abcd", "abce");

        // {"ab","bc","cd"} vs {"ab","bc","ce"}
        assert_close(bigram.ngram_score, 2.0 / 4.0);
        // {"abc","bcd"} vs {"abc","bce"}
        assert_close(trigram.ngram_score, 1.0 / 3.0);
        assert_close(trigram.prefix_score, bigram.prefix_score);
        assert_close(trigram.edit_score, bigram.edit_score);
        assert!(trigram.score < bigram.score);
    }

    #[test]
    fn similarity_honours_custom_weights() {
        let m = NameMatcher::new(MatcherConfig::with_weights(0.0, 1.0, 0.0));
        let r = m.similarity("abcde", "abxyz");
        assert_close(r.score, 0.4);
    }

    // ── ranking ───────────────────────────────────────────────────────────────

    #[test]
    fn find_candidates_top_two() {
        let m = NameMatcher::default();
        let candidates = ["山田商事", "山田株式会社", "佐藤商事"];
        let results = m.find_candidates("ヤマダ商事", candidates, 2, 0.0);
        assert_eq!(results.len(), 2);
        assert!(results[0].score >= results[1].score);
        // Both share one bigram and edit distance 3; the tie keeps input order.
        assert_eq!(results[0].candidate, "山田商事");
        assert_eq!(results[1].candidate, "佐藤商事");

        let again = m.find_candidates("ヤマダ商事", candidates, 2, 0.0);
        assert_eq!(results, again);
    }

    #[test]
    fn find_candidates_best_first() {
        let m = NameMatcher::default();
        let results = m.find_candidates(
            "やまだ商事",
            ["全然違う", "やまだ商店", "ヤマダ商事(株)"],
            3,
            0.0,
        );
        assert_eq!(results[0].candidate, "ヤマダ商事(株)");
        assert_eq!(results[0].score, 1.0);
        assert_eq!(results[1].candidate, "やまだ商店");
        assert_eq!(results[2].candidate, "全然違う");
    }

    #[test]
    fn find_candidates_threshold_filters() {
        let m = NameMatcher::default();
        let results = m.find_candidates("abcdef", ["abcdeg", "zzzzzz"], 3, 0.5);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].candidate, "abcdeg");
    }

    #[test]
    fn find_candidates_respects_top_n() {
        let m = NameMatcher::default();
        let candidates = ["a", "b", "c", "d", "e"];
        assert_eq!(m.find_candidates("x", candidates, 3, 0.0).len(), 3);
        assert!(m.find_candidates("x", candidates, 0, 0.0).is_empty());
    }

    #[test]
    fn find_candidates_empty_list() {
        let m = NameMatcher::default();
        let empty: [&str; 0] = [];
        assert!(m.find_candidates("山田", empty, 3, 0.0).is_empty());
    }

    #[test]
    fn suggest_uses_configured_limits() {
        let config = MatcherConfig {
            top_n: 1,
            ..MatcherConfig::default()
        };
        let m = NameMatcher::new(config);
        let master = MasterCandidateSet::new(["山田商事", "佐藤商事", "鈴木商店"]);
        let results = m.suggest("山田商事株式会社", &master);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].candidate, "山田商事");
    }

    #[test]
    fn rank_all_preserves_query_order() {
        let m = NameMatcher::default();
        let master = MasterCandidateSet::new(["山田商事", "佐藤商事"]);
        let queries = ["佐藤商事(株)", "ヤマダ商事", ""];
        let ranked = m.rank_all(&queries[..], &master);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0][0].candidate, "佐藤商事");
        assert_eq!(ranked[0][0].score, 1.0);
        assert_eq!(ranked[1].len(), 2);
        assert_eq!(ranked[2].len(), 2);
    }
}
