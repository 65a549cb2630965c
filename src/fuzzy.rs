//! Fuzzy string matching for short-answer scoring

use serde::{Deserialize, Serialize};
use strsim::levenshtein;

use crate::config::{MatchConfig, DEFAULT_SIMILARITY_THRESHOLD};
use crate::text::normalize_text;

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Shared prefix length that counts as a common stem.
const STEM_LEN: usize = 4;

/// Answer tokens and keyword parts this short or shorter are ignored.
const MIN_WORD_LEN: usize = 3;

/// Outcome of grading a free-text answer against expected keywords
#[cfg_attr(feature = "python", pyclass(get_all))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortAnswerResult {
    pub is_correct: bool,
    pub matched_keywords: Vec<String>,
    pub missed_keywords: Vec<String>,
}

#[cfg(feature = "python")]
#[pymethods]
impl ShortAnswerResult {
    fn __repr__(&self) -> String {
        format!(
            "ShortAnswerResult(is_correct={}, matched={:?}, missed={:?})",
            self.is_correct, self.matched_keywords, self.missed_keywords
        )
    }
}

/// Check if a user word is close enough to an expected word.
///
/// Tries, in order: equality after normalization, inclusion of one word in the
/// other, a shared 4-character stem, then Levenshtein similarity against
/// `threshold`. Symmetric in its two arguments.
pub fn is_similar_word(user_word: &str, expected_word: &str, threshold: f64) -> bool {
    let a = normalize_text(user_word);
    let b = normalize_text(expected_word);

    // Exact match
    if a == b {
        return true;
    }

    // One contains the other ("dette" / "detteur")
    if a.contains(&b) || b.contains(&a) {
        return true;
    }

    // Common stem
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    if len_a >= STEM_LEN
        && len_b >= STEM_LEN
        && a.chars().take(STEM_LEN).eq(b.chars().take(STEM_LEN))
    {
        return true;
    }

    // Typos
    let max_len = len_a.max(len_b);
    if max_len == 0 {
        return true;
    }
    let distance = levenshtein(&a, &b);
    let similarity = 1.0 - distance as f64 / max_len as f64;

    similarity >= threshold
}

/// Grade a free-text answer against expected keywords or phrases.
///
/// A keyword matches when its whole normalized phrase occurs in the answer, or
/// when any of its words is similar to a word of the answer. The answer is
/// correct once `max(1, ceil(n * min_match_ratio))` keywords match, so an empty
/// keyword list is never correct.
pub fn validate_short_answer<S: AsRef<str>>(
    user_answer: &str,
    expected_keywords: &[S],
    min_match_ratio: f64,
) -> ShortAnswerResult {
    validate_with_threshold(
        user_answer,
        expected_keywords,
        min_match_ratio,
        DEFAULT_SIMILARITY_THRESHOLD,
    )
}

/// [`validate_short_answer`] with both thresholds taken from `config`.
pub fn validate_short_answer_with<S: AsRef<str>>(
    user_answer: &str,
    expected_keywords: &[S],
    config: &MatchConfig,
) -> ShortAnswerResult {
    validate_with_threshold(
        user_answer,
        expected_keywords,
        config.min_match_ratio,
        config.similarity_threshold,
    )
}

fn validate_with_threshold<S: AsRef<str>>(
    user_answer: &str,
    expected_keywords: &[S],
    min_match_ratio: f64,
    threshold: f64,
) -> ShortAnswerResult {
    let normalized_user = normalize_text(user_answer);
    let user_words: Vec<&str> = normalized_user
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '.' | ':' | '!' | '?'))
        .filter(|w| w.chars().count() >= MIN_WORD_LEN)
        .collect();

    let mut matched_keywords = Vec::new();
    let mut missed_keywords = Vec::new();

    for keyword in expected_keywords {
        let keyword = keyword.as_ref();
        if keyword_matches(&normalized_user, &user_words, keyword, threshold) {
            matched_keywords.push(keyword.to_string());
        } else {
            missed_keywords.push(keyword.to_string());
        }
    }

    let required = required_matches(expected_keywords.len(), min_match_ratio);
    tracing::trace!(
        matched = matched_keywords.len(),
        required,
        "graded short answer"
    );

    ShortAnswerResult {
        is_correct: matched_keywords.len() >= required,
        matched_keywords,
        missed_keywords,
    }
}

fn keyword_matches(
    normalized_user: &str,
    user_words: &[&str],
    keyword: &str,
    threshold: f64,
) -> bool {
    let normalized_keyword = normalize_text(keyword);
    // A blank keyword would otherwise be a substring of every answer
    if normalized_keyword.is_empty() {
        return false;
    }

    if normalized_user.contains(&normalized_keyword) {
        return true;
    }

    normalized_keyword
        .split_whitespace()
        .filter(|part| part.chars().count() >= MIN_WORD_LEN)
        .any(|part| {
            user_words
                .iter()
                .any(|user_word| is_similar_word(user_word, part, threshold))
        })
}

fn required_matches(keyword_count: usize, min_match_ratio: f64) -> usize {
    let scaled = (keyword_count as f64 * min_match_ratio).ceil() as usize;
    scaled.max(1)
}

// ============= Python Binding =============

/// `threshold` falls back to `PANDORA_SIMILARITY_THRESHOLD`, then to 0.75.
#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "is_similar_word")]
pub fn py_is_similar_word(
    user_word: &str,
    expected_word: &str,
    threshold: Option<f64>,
) -> PyResult<bool> {
    let config = crate::config::py_match_config()?;
    Ok(is_similar_word(
        user_word,
        expected_word,
        threshold.unwrap_or(config.similarity_threshold),
    ))
}

/// `min_match_ratio` falls back to `PANDORA_MIN_MATCH_RATIO`, then to 0.5.
#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "validate_short_answer")]
pub fn py_validate_short_answer(
    user_answer: &str,
    expected_keywords: Vec<String>,
    min_match_ratio: Option<f64>,
) -> PyResult<ShortAnswerResult> {
    let mut config = crate::config::py_match_config()?;
    if let Some(ratio) = min_match_ratio {
        config.min_match_ratio = ratio;
    }
    Ok(validate_short_answer_with(user_answer, &expected_keywords, &config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const T: f64 = DEFAULT_SIMILARITY_THRESHOLD;

    #[test]
    fn exact_match_ignores_case_and_accents() {
        assert!(is_similar_word("Créancier", "creancier", T));
    }

    #[test]
    fn inclusion_matches() {
        assert!(is_similar_word("contractuel", "contrat", T));
        assert!(is_similar_word("contrat", "contractuel", T));
    }

    #[test]
    fn shared_stem_matches() {
        assert!(is_similar_word("responsable", "responsabilité", T));
    }

    #[test]
    fn typo_within_threshold_matches() {
        // transposed letters: distance 2, no shared stem
        assert!(is_similar_word("cerancier", "creancier", T));
        assert!(is_similar_word("dbeiteur", "debiteur", T));
    }

    #[test]
    fn unrelated_words_do_not_match() {
        assert!(!is_similar_word("voir", "creancier", T));
        assert!(!is_similar_word("rien", "debiteur", T));
    }

    #[test]
    fn both_empty_is_a_match() {
        assert!(is_similar_word("", "", T));
        assert!(is_similar_word("  ", "", T));
    }

    #[test]
    fn threshold_controls_typo_tolerance() {
        // "chat" / "chien": distance 3 over 5
        assert!(!is_similar_word("chat", "chien", T));
        assert!(is_similar_word("chat", "chien", 0.35));
    }

    #[test]
    fn partial_credit_scenario() {
        let result = validate_short_answer(
            "créancier et débiteur",
            &["créancier", "débiteur", "prestation"],
            0.5,
        );
        assert!(result.is_correct);
        assert_eq!(result.matched_keywords, vec!["créancier", "débiteur"]);
        assert_eq!(result.missed_keywords, vec!["prestation"]);
    }

    #[test]
    fn unrelated_answer_is_incorrect() {
        let result = validate_short_answer("rien a voir", &["créancier", "débiteur"], 0.5);
        assert!(!result.is_correct);
        assert!(result.matched_keywords.is_empty());
        assert_eq!(result.missed_keywords, vec!["créancier", "débiteur"]);
    }

    #[test]
    fn empty_keyword_list_is_never_correct() {
        let result = validate_short_answer::<&str>("n'importe quoi", &[], 0.5);
        assert!(!result.is_correct);
        assert!(result.matched_keywords.is_empty());
        assert!(result.missed_keywords.is_empty());
    }

    #[test]
    fn blank_keyword_is_missed() {
        let result = validate_short_answer("une réponse", &["   "], 0.5);
        assert!(!result.is_correct);
        assert_eq!(result.missed_keywords, vec!["   "]);
    }

    #[test]
    fn phrase_keyword_matches_as_substring() {
        let result = validate_short_answer(
            "C'est un lien de droit entre deux personnes",
            &["lien de droit"],
            1.0,
        );
        assert!(result.is_correct);
    }

    #[test]
    fn phrase_keyword_matches_on_any_fuzzy_part() {
        let result =
            validate_short_answer("la prestaton due", &["exécution de la prestation"], 1.0);
        assert_eq!(result.matched_keywords, vec!["exécution de la prestation"]);
    }

    #[test]
    fn short_tokens_are_ignored() {
        // "de" and "la" are too short to count as evidence
        let result = validate_short_answer("de la", &["de facto"], 1.0);
        assert!(!result.is_correct);
    }

    #[test]
    fn punctuation_separates_tokens() {
        let result = validate_short_answer(
            "faute,dommage;causalité",
            &["faute", "dommage", "causalité"],
            1.0,
        );
        assert!(result.is_correct);
        assert_eq!(result.matched_keywords.len(), 3);
    }

    #[test]
    fn ratio_sets_required_matches() {
        assert_eq!(required_matches(3, 0.5), 2);
        assert_eq!(required_matches(4, 0.5), 2);
        assert_eq!(required_matches(1, 0.1), 1);
        assert_eq!(required_matches(0, 0.5), 1);
        assert_eq!(required_matches(4, 1.0), 4);
    }

    #[test]
    fn config_threshold_is_honoured() {
        let strict = MatchConfig {
            similarity_threshold: 0.99,
            min_match_ratio: 1.0,
            ..MatchConfig::default()
        };
        let result = validate_short_answer_with("obligasion", &["oblige"], &strict);
        // shares the "obli" stem, which is independent of the threshold
        assert!(result.is_correct);

        let result = validate_short_answer_with("dette", &["detteur"], &strict);
        assert!(result.is_correct);

        let result = validate_short_answer_with("prejudyce", &["préjudice"], &strict);
        assert!(result.is_correct);

        let result = validate_short_answer_with("cuase", &["cause"], &strict);
        assert!(!result.is_correct);
    }

    proptest! {
        #[test]
        fn similarity_is_reflexive(w in "[a-zA-Zéèàç]{1,16}") {
            prop_assert!(is_similar_word(&w, &w, T));
        }

        #[test]
        fn similarity_is_symmetric(
            a in "[a-zéèàç]{0,12}",
            b in "[a-zéèàç]{0,12}",
            t in 0.0f64..=1.0,
        ) {
            prop_assert_eq!(is_similar_word(&a, &b, t), is_similar_word(&b, &a, t));
        }

        #[test]
        fn appending_a_token_never_breaks_a_pass(
            answer in "[a-z ]{0,30}",
            extra in "[a-z]{3,10}",
            keywords in proptest::collection::vec("[a-z]{3,10}", 0..5),
        ) {
            let before = validate_short_answer(&answer, &keywords, 0.5);
            let after = validate_short_answer(&format!("{answer} {extra}"), &keywords, 0.5);
            if before.is_correct {
                prop_assert!(after.is_correct);
            }
            prop_assert!(after.matched_keywords.len() >= before.matched_keywords.len());
        }
    }
}
