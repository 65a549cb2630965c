//! Quiz generation from formatted section content
//!
//! Questions are derived heuristically from emphasis spans and definitional
//! sentences, so every section gets a quiz an author can then review.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::course::QuizQuestion;
use crate::formatter::Emphasis;

static EMPHASIS_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    let classes = Emphasis::ALL.map(Emphasis::class).join("|");
    Regex::new(&format!(r#"<span class="(?:{classes})">([^<]+)</span>"#))
        .expect("valid emphasis span regex")
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));
static DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(.+?)\s+(?:est défini comme|est|désigne|is defined as|is|denotes)\s+(.+?)(?:\.|$)",
    )
    .expect("valid definition regex")
});

const DISTRACTORS: [&str; 3] = [
    "Une procédure judiciaire spéciale",
    "Un document administratif",
    "Une sanction pénale",
];

/// Key terms: text of every emphasis span longer than two characters, first
/// appearance order, without repeats.
pub fn extract_key_terms(html: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    EMPHASIS_SPAN
        .captures_iter(html)
        .map(|caps| caps[1].to_string())
        .filter(|term| term.chars().count() > 2)
        .filter(|term| seen.insert(term.clone()))
        .collect()
}

/// Markup removed, whitespace collapsed.
pub fn strip_markup(html: &str) -> String {
    TAG.replace_all(html, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Generate quiz questions for a section.
///
/// Emits a definition MCQ when a "X est Y" sentence is found, a true/false
/// question on the primary key term when there are at least two key terms, and
/// a short-answer question when there are at least three. Falls back to a single
/// true/false question so the result is never empty.
pub fn synthesize_quiz(formatted_content: &str, section_title: &str) -> Vec<QuizQuestion> {
    let mut quiz = Vec::new();
    let key_terms = extract_key_terms(formatted_content);
    let plain_text = strip_markup(formatted_content);

    if let Some(caps) = DEFINITION.captures(&plain_text) {
        let subject = caps[1].trim();
        let predicate = caps[2].trim();
        let mut choices = vec![predicate.chars().take(100).collect::<String>()];
        choices.extend(DISTRACTORS.iter().map(|d| (*d).to_string()));

        quiz.push(QuizQuestion::Mcq {
            question: format!("Qu'est-ce que {} ?", subject.to_lowercase()),
            choices,
            correct_answer: 0,
            explanation: format!(
                "{subject} {}...",
                predicate.chars().take(150).collect::<String>()
            ),
        });
    }

    if key_terms.len() >= 2 {
        quiz.push(QuizQuestion::TrueFalse {
            question: format!(
                "La section \"{section_title}\" traite principalement de {}.",
                key_terms[0]
            ),
            correct_answer: true,
            explanation: format!(
                "Cette section aborde effectivement la notion de {}.",
                key_terms[0]
            ),
        });
    }

    if key_terms.len() >= 3 {
        let expected: Vec<String> = key_terms.iter().take(4).cloned().collect();
        quiz.push(QuizQuestion::Short {
            question: format!("Citez les notions clés abordées dans \"{section_title}\"."),
            explanation: format!("Les notions clés sont : {}.", expected.join(", ")),
            correct_answer: expected,
        });
    }

    if quiz.is_empty() {
        quiz.push(QuizQuestion::TrueFalse {
            question: format!("Ce chapitre concerne \"{section_title}\"."),
            correct_answer: true,
            explanation: "Question générée automatiquement.".to_string(),
        });
    }

    tracing::debug!(
        section = section_title,
        key_terms = key_terms.len(),
        questions = quiz.len(),
        "synthesized quiz"
    );

    quiz
}
