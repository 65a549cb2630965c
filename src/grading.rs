//! Grading of quiz answers

use serde::{Deserialize, Serialize};

use crate::config::MatchConfig;
use crate::course::QuizQuestion;
use crate::fuzzy::{validate_short_answer_with, ShortAnswerResult};

/// A learner's answer to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Answer {
    Choice(usize),
    TrueFalse(bool),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub is_correct: bool,
    pub explanation: String,
    /// Keyword diagnostics, for short-answer questions only
    pub short_answer: Option<ShortAnswerResult>,
}

impl QuestionOutcome {
    fn exact(question: &QuizQuestion, is_correct: bool) -> Self {
        Self {
            is_correct,
            explanation: question.explanation().to_string(),
            short_answer: None,
        }
    }
}

/// Score of a whole section quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizScore {
    pub score: usize,
    pub total: usize,
    pub passed: bool,
    pub outcomes: Vec<QuestionOutcome>,
}

/// Grade one answer. An answer of the wrong kind for the question is incorrect.
///
/// The outcome carries the question's explanation for feedback.
pub fn grade_question(
    question: &QuizQuestion,
    answer: &Answer,
    config: &MatchConfig,
) -> QuestionOutcome {
    match (question, answer) {
        (QuizQuestion::Mcq { correct_answer, .. }, Answer::Choice(choice)) => {
            QuestionOutcome::exact(question, choice == correct_answer)
        }
        (QuizQuestion::TrueFalse { correct_answer, .. }, Answer::TrueFalse(value)) => {
            QuestionOutcome::exact(question, value == correct_answer)
        }
        (QuizQuestion::Short { correct_answer, .. }, Answer::Text(text)) => {
            let result = validate_short_answer_with(text, correct_answer, config);
            QuestionOutcome {
                is_correct: result.is_correct,
                explanation: question.explanation().to_string(),
                short_answer: Some(result),
            }
        }
        _ => QuestionOutcome::exact(question, false),
    }
}

/// Grade a quiz; `answers[i]` answers `quiz[i]`, missing answers are incorrect.
///
/// The quiz passes when `score / total >= config.pass_ratio`; an empty quiz passes.
pub fn grade_quiz(
    quiz: &[QuizQuestion],
    answers: &[Option<Answer>],
    config: &MatchConfig,
) -> QuizScore {
    let outcomes: Vec<QuestionOutcome> = quiz
        .iter()
        .enumerate()
        .map(|(i, question)| match answers.get(i).and_then(Option::as_ref) {
            Some(answer) => grade_question(question, answer, config),
            None => QuestionOutcome::exact(question, false),
        })
        .collect();

    let score = outcomes.iter().filter(|o| o.is_correct).count();
    let total = quiz.len();

    QuizScore {
        score,
        total,
        passed: is_passing(score, total, config.pass_ratio),
        outcomes,
    }
}

pub(crate) fn is_passing(score: usize, total: usize, pass_ratio: f64) -> bool {
    total == 0 || score as f64 / total as f64 >= pass_ratio
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz() -> Vec<QuizQuestion> {
        vec![
            QuizQuestion::Mcq {
                question: "Qu'est-ce qu'une obligation ?".to_string(),
                choices: vec!["Un lien de droit".to_string(), "Une sanction".to_string()],
                correct_answer: 0,
                explanation: "L'obligation est un lien de droit.".to_string(),
            },
            QuizQuestion::TrueFalse {
                question: "Le débiteur doit la prestation.".to_string(),
                correct_answer: true,
                explanation: String::new(),
            },
            QuizQuestion::Short {
                question: "Citez les parties.".to_string(),
                correct_answer: vec!["créancier".to_string(), "débiteur".to_string()],
                explanation: String::new(),
            },
        ]
    }

    #[test]
    fn exact_kinds_compare_by_equality() {
        let config = MatchConfig::default();
        let quiz = quiz();
        assert!(grade_question(&quiz[0], &Answer::Choice(0), &config).is_correct);
        assert!(!grade_question(&quiz[0], &Answer::Choice(1), &config).is_correct);
        assert!(grade_question(&quiz[1], &Answer::TrueFalse(true), &config).is_correct);
        assert!(!grade_question(&quiz[1], &Answer::TrueFalse(false), &config).is_correct);
    }

    #[test]
    fn short_answers_carry_diagnostics() {
        let answer = Answer::Text("le creancier".to_string());
        let outcome = grade_question(&quiz()[2], &answer, &MatchConfig::default());
        assert!(outcome.is_correct);
        let details = outcome.short_answer.unwrap();
        assert_eq!(details.matched_keywords, vec!["créancier"]);
        assert_eq!(details.missed_keywords, vec!["débiteur"]);
    }

    #[test]
    fn wrong_answer_kind_is_incorrect() {
        let config = MatchConfig::default();
        let quiz = quiz();
        assert!(!grade_question(&quiz[0], &Answer::TrueFalse(true), &config).is_correct);
        assert!(!grade_question(&quiz[1], &Answer::Text("vrai".to_string()), &config).is_correct);
        assert!(!grade_question(&quiz[2], &Answer::Choice(0), &config).is_correct);
    }

    #[test]
    fn quiz_score_and_pass_threshold() {
        let config = MatchConfig::default();
        let answers = vec![
            Some(Answer::Choice(0)),
            Some(Answer::TrueFalse(true)),
            Some(Answer::Text("rien".to_string())),
        ];
        let score = grade_quiz(&quiz(), &answers, &config);
        assert_eq!(score.score, 2);
        assert_eq!(score.total, 3);
        // 2/3 < 0.7
        assert!(!score.passed);

        let all = vec![
            Some(Answer::Choice(0)),
            Some(Answer::TrueFalse(true)),
            Some(Answer::Text("créancier et débiteur".to_string())),
        ];
        assert!(grade_quiz(&quiz(), &all, &config).passed);
    }

    #[test]
    fn outcomes_carry_the_explanation() {
        let config = MatchConfig::default();
        let wrong = grade_question(&quiz()[0], &Answer::Choice(1), &config);
        assert_eq!(wrong.explanation, "L'obligation est un lien de droit.");
        let missing = grade_quiz(&quiz(), &[], &config);
        assert_eq!(missing.outcomes[0].explanation, "L'obligation est un lien de droit.");
    }

    #[test]
    fn missing_answers_count_as_wrong() {
        let score = grade_quiz(&quiz(), &[Some(Answer::Choice(0))], &MatchConfig::default());
        assert_eq!(score.score, 1);
        assert_eq!(score.outcomes.len(), 3);
    }

    #[test]
    fn empty_quiz_passes() {
        assert!(grade_quiz(&[], &[], &MatchConfig::default()).passed);
        assert!(is_passing(7, 10, 0.7));
        assert!(!is_passing(6, 10, 0.7));
    }
}
