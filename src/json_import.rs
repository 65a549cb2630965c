//! JSON course import
//!
//! Accepts a bare array of chapters or a course object, reading every field
//! through an ordered alias list (French and English key names). Quiz items are
//! rebuilt into typed questions by the first matching [`QuestionShape`]; items
//! that fit no shape are dropped, and sections left without questions get a
//! synthesized quiz.

use serde_json::Value;

use crate::course::{ParsedChapter, ParsedCourse, ParsedSection, QuizQuestion};
use crate::error::FormatError;
use crate::formatter::Formatter;
use crate::questions::synthesize_quiz;
use crate::segmenter::DEFAULT_COURSE_TITLE;

const COURSE_TITLE_KEYS: &[&str] = &["title", "titre", "name"];
const CHAPTER_LIST_KEYS: &[&str] = &["chapters", "chapitres", "parts"];
const CHAPTER_TITLE_KEYS: &[&str] = &["title", "titre", "name"];
const SECTION_LIST_KEYS: &[&str] = &["sections", "lessons", "lecons", "parts"];
const SECTION_TITLE_KEYS: &[&str] = &["title", "titre", "name"];
const CONTENT_KEYS: &[&str] = &["content", "contenu", "text", "texte"];
const QUIZ_KEYS: &[&str] = &["quiz", "questions"];
const CHOICE_KEYS: &[&str] = &["choices", "options", "reponses"];
const INDEX_KEYS: &[&str] = &["correctAnswer", "answer", "correct"];
const BOOL_KEYS: &[&str] = &["correctAnswer", "answer"];
const KEYWORD_KEYS: &[&str] = &["keywords", "mots_cles"];
const SHORT_ANSWER_KEYS: &[&str] = &["keywords", "mots_cles", "correctAnswer", "answer"];
const EXPLANATION_KEYS: &[&str] = &["explanation", "explication"];
const TRUE_FALSE_MARKERS: &[&str] = &["tf", "vf"];

const DEFAULT_EXPLANATION: &str = "Voir le cours pour plus de détails.";
const MAX_CHOICES: usize = 4;

/// One way a loosely typed quiz item can be read.
struct QuestionShape {
    name: &'static str,
    matches: fn(&Value) -> bool,
    build: fn(&Value, String, String) -> QuizQuestion,
}

/// Tried top to bottom; the first match wins.
const QUESTION_SHAPES: &[QuestionShape] = &[
    QuestionShape {
        name: "mcq",
        matches: has_choices,
        build: build_mcq,
    },
    QuestionShape {
        name: "tf",
        matches: is_true_false,
        build: build_true_false,
    },
    QuestionShape {
        name: "short",
        matches: is_short_answer,
        build: build_short_answer,
    },
];

/// Parse a JSON course with the built-in formatter.
pub fn parse_json(json_text: &str) -> Result<ParsedCourse, FormatError> {
    parse_json_with(json_text, Formatter::builtin())
}

/// Parse a JSON course document into a course tree.
pub fn parse_json_with(
    json_text: &str,
    formatter: &Formatter,
) -> Result<ParsedCourse, FormatError> {
    let data: Value = serde_json::from_str(json_text)?;

    let (title, chapters) = match &data {
        Value::Array(chapters) => (DEFAULT_COURSE_TITLE.to_string(), chapters.as_slice()),
        Value::Object(_) => (
            text_field(&data, COURSE_TITLE_KEYS)
                .unwrap_or_else(|| DEFAULT_COURSE_TITLE.to_string()),
            list_field(&data, CHAPTER_LIST_KEYS)?,
        ),
        _ => return Err(FormatError::NotACourse),
    };

    let chapters = chapters
        .iter()
        .enumerate()
        .map(|(index, chapter)| normalize_chapter(chapter, index, formatter))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(title = %title, chapters = chapters.len(), "parsed JSON course");

    Ok(ParsedCourse { title, chapters })
}

fn normalize_chapter(
    chapter: &Value,
    index: usize,
    formatter: &Formatter,
) -> Result<ParsedChapter, FormatError> {
    let title = text_field(chapter, CHAPTER_TITLE_KEYS)
        .unwrap_or_else(|| format!("Chapitre {}", index + 1));
    let sections = list_field(chapter, SECTION_LIST_KEYS)?
        .iter()
        .enumerate()
        .map(|(i, section)| normalize_section(section, i, formatter))
        .collect();

    Ok(ParsedChapter { title, sections })
}

fn normalize_section(section: &Value, index: usize, formatter: &Formatter) -> ParsedSection {
    let title = text_field(section, SECTION_TITLE_KEYS)
        .unwrap_or_else(|| format!("Section {}", index + 1));

    let mut content = text_field(section, CONTENT_KEYS).unwrap_or_default();
    // Content that already carries markup is kept as is
    if !content.contains('<') {
        content = formatter.format(&content);
    }

    let supplied = QUIZ_KEYS
        .iter()
        .find_map(|key| section.get(key).and_then(Value::as_array));
    let mut quiz: Vec<QuizQuestion> = supplied
        .map(|items| items.iter().filter_map(normalize_question).collect())
        .unwrap_or_default();

    if quiz.is_empty() {
        if supplied.is_some_and(|items| !items.is_empty()) {
            tracing::debug!(section = %title, "no usable quiz item, synthesizing");
        }
        quiz = synthesize_quiz(&content, &title);
    }

    ParsedSection { title, content, quiz }
}

/// Rebuild one quiz item; `None` when it has no question text or no known shape.
pub(crate) fn normalize_question(item: &Value) -> Option<QuizQuestion> {
    let question = item
        .get("question")
        .and_then(Value::as_str)
        .filter(|q| !q.is_empty())?
        .to_string();
    let explanation =
        text_field(item, EXPLANATION_KEYS).unwrap_or_else(|| DEFAULT_EXPLANATION.to_string());

    let shape = QUESTION_SHAPES.iter().find(|shape| (shape.matches)(item))?;
    tracing::trace!(shape = shape.name, "normalized quiz item");
    Some((shape.build)(item, question, explanation))
}

fn has_choices(item: &Value) -> bool {
    first_truthy(item, CHOICE_KEYS).is_some()
}

fn is_true_false(item: &Value) -> bool {
    BOOL_KEYS
        .iter()
        .any(|key| item.get(key).is_some_and(Value::is_boolean))
        || item
            .get("type")
            .and_then(Value::as_str)
            .is_some_and(|t| TRUE_FALSE_MARKERS.contains(&t))
}

fn is_short_answer(item: &Value) -> bool {
    first_truthy(item, KEYWORD_KEYS).is_some()
        || BOOL_KEYS
            .iter()
            .any(|key| item.get(key).is_some_and(Value::is_array))
}

fn build_mcq(item: &Value, question: String, explanation: String) -> QuizQuestion {
    let choices: Vec<String> = first_truthy(item, CHOICE_KEYS)
        .and_then(Value::as_array)
        .map(|values| values.iter().filter_map(scalar_text).collect())
        .unwrap_or_default();

    let correct_answer = INDEX_KEYS
        .iter()
        .find_map(|key| item.get(key).and_then(as_index))
        .or_else(|| {
            let wanted = item.get("correctAnswer")?.as_str()?.to_lowercase();
            Some(
                choices
                    .iter()
                    .position(|c| c.to_lowercase().contains(&wanted))
                    .unwrap_or(0),
            )
        })
        .unwrap_or(0);

    QuizQuestion::Mcq {
        question,
        choices: choices.into_iter().take(MAX_CHOICES).collect(),
        correct_answer,
        explanation,
    }
}

fn build_true_false(item: &Value, question: String, explanation: String) -> QuizQuestion {
    let correct_answer = BOOL_KEYS
        .iter()
        .find_map(|key| item.get(key).and_then(Value::as_bool))
        .or_else(|| {
            BOOL_KEYS
                .iter()
                .find_map(|key| item.get(key).and_then(Value::as_str).and_then(parse_bool_word))
        })
        .unwrap_or(true);

    QuizQuestion::TrueFalse {
        question,
        correct_answer,
        explanation,
    }
}

fn build_short_answer(item: &Value, question: String, explanation: String) -> QuizQuestion {
    let correct_answer = match first_truthy(item, SHORT_ANSWER_KEYS) {
        Some(Value::Array(values)) => values.iter().filter_map(scalar_text).collect(),
        Some(Value::String(list)) => list
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    QuizQuestion::Short {
        question,
        correct_answer,
        explanation,
    }
}

/// JavaScript-style truthiness: absent, null, false, 0 and "" are falsy.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn first_truthy<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|key| value.get(key)).find(|v| truthy(v))
}

/// First truthy alias rendered as text; numbers are accepted as text.
fn text_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(key))
        .filter(|v| truthy(v))
        .find_map(scalar_text)
}

/// First truthy alias, which must be an array; absent means empty.
fn list_field<'a>(value: &'a Value, keys: &[&str]) -> Result<&'a [Value], FormatError> {
    let Some((key, found)) = keys
        .iter()
        .filter_map(|key| value.get(key).map(|v| (*key, v)))
        .find(|(_, v)| truthy(v))
    else {
        return Ok(&[]);
    };
    found
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| FormatError::NotAnArray { field: key.to_string() })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_index(value: &Value) -> Option<usize> {
    if let Some(index) = value.as_u64() {
        return usize::try_from(index).ok();
    }
    let f = value.as_f64()?;
    (f >= 0.0 && f.fract() == 0.0).then_some(f as usize)
}

fn parse_bool_word(word: &str) -> Option<bool> {
    match word.trim().to_lowercase().as_str() {
        "true" | "vrai" => Some(true),
        "false" | "faux" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::QuestionKind;
    use serde_json::json;

    #[test]
    fn minimal_course_gets_synthesized_quiz() {
        let course = parse_json(
            r#"{"title":"X","chapters":[{"title":"C1","sections":[{"title":"S1","content":"texte"}]}]}"#,
        )
        .unwrap();
        assert_eq!(course.title, "X");
        assert_eq!(course.chapters.len(), 1);
        assert_eq!(course.chapters[0].title, "C1");
        let section = &course.chapters[0].sections[0];
        assert_eq!(section.title, "S1");
        assert!(!section.quiz.is_empty());
        assert_eq!(section.content, "<h4>texte</h4>");
    }

    #[test]
    fn bare_array_and_french_aliases() {
        let course = parse_json(
            r#"[{"titre":"Les contrats","lecons":[{"titre":"Formation","contenu":"<p>déjà formaté</p>"}]}, {}]"#,
        )
        .unwrap();
        assert_eq!(course.title, DEFAULT_COURSE_TITLE);
        assert_eq!(course.chapters[0].title, "Les contrats");
        assert_eq!(course.chapters[0].sections[0].title, "Formation");
        assert_eq!(course.chapters[0].sections[0].content, "<p>déjà formaté</p>");
        assert_eq!(course.chapters[1].title, "Chapitre 2");
        assert!(course.chapters[1].sections.is_empty());
    }

    #[test]
    fn empty_title_falls_through_to_next_alias() {
        let course = parse_json(r#"{"title":"","name":"Nom","chapitres":[]}"#).unwrap();
        assert_eq!(course.title, "Nom");
    }

    #[test]
    fn default_section_titles_are_positional() {
        let course = parse_json(r#"{"chapters":[{"sections":[{}, {"text":"a"}]}]}"#).unwrap();
        let sections = &course.chapters[0].sections;
        assert_eq!(sections[0].title, "Section 1");
        assert_eq!(sections[1].title, "Section 2");
    }

    #[test]
    fn invalid_json_is_a_format_error() {
        assert!(matches!(parse_json("{not json"), Err(FormatError::Json(_))));
        assert!(matches!(parse_json("42"), Err(FormatError::NotACourse)));
        assert!(matches!(
            parse_json(r#"{"chapters":"oops"}"#),
            Err(FormatError::NotAnArray { field }) if field == "chapters"
        ));
    }

    #[test]
    fn mcq_index_resolution_order() {
        let numeric = normalize_question(&json!({
            "question": "Q", "options": ["a", "b", "c"], "answer": 2
        }))
        .unwrap();
        assert!(matches!(numeric, QuizQuestion::Mcq { correct_answer: 2, .. }));

        let by_text = normalize_question(&json!({
            "question": "Q", "choices": ["Le créancier", "Le Débiteur"], "correctAnswer": "débiteur"
        }))
        .unwrap();
        assert!(matches!(by_text, QuizQuestion::Mcq { correct_answer: 1, .. }));

        let unknown = normalize_question(&json!({
            "question": "Q", "reponses": ["a", "b"], "correctAnswer": "z"
        }))
        .unwrap();
        assert!(matches!(unknown, QuizQuestion::Mcq { correct_answer: 0, .. }));

        let via_correct = normalize_question(&json!({
            "question": "Q", "choices": ["a", "b"], "correct": 1
        }))
        .unwrap();
        assert!(matches!(via_correct, QuizQuestion::Mcq { correct_answer: 1, .. }));
    }

    #[test]
    fn mcq_choices_are_truncated_to_four() {
        let q = normalize_question(&json!({
            "question": "Q", "choices": ["a", "b", "c", "d", "e"], "correctAnswer": 0,
            "explication": "Parce que."
        }))
        .unwrap();
        match q {
            QuizQuestion::Mcq { choices, explanation, .. } => {
                assert_eq!(choices, vec!["a", "b", "c", "d"]);
                assert_eq!(explanation, "Parce que.");
            }
            other => panic!("expected MCQ, got {other:?}"),
        }
    }

    #[test]
    fn true_false_answers_are_always_booleans() {
        let q = normalize_question(&json!({"question": "Q", "answer": false})).unwrap();
        assert_eq!(
            q,
            QuizQuestion::TrueFalse {
                question: "Q".to_string(),
                correct_answer: false,
                explanation: DEFAULT_EXPLANATION.to_string(),
            }
        );

        let item = json!({"question": "Q", "type": "vf", "correctAnswer": "faux"});
        let q = normalize_question(&item).unwrap();
        assert!(matches!(q, QuizQuestion::TrueFalse { correct_answer: false, .. }));

        let q = normalize_question(&json!({"question": "Q", "type": "tf"})).unwrap();
        assert!(matches!(q, QuizQuestion::TrueFalse { correct_answer: true, .. }));
    }

    #[test]
    fn short_answer_keywords() {
        let item = json!({"question": "Q", "mots_cles": ["dette", "prestation"]});
        let q = normalize_question(&item).unwrap();
        assert!(matches!(
            &q,
            QuizQuestion::Short { correct_answer, .. } if correct_answer == &["dette", "prestation"]
        ));

        let q = normalize_question(&json!({"question": "Q", "correctAnswer": ["a"]})).unwrap();
        assert_eq!(q.kind(), QuestionKind::Short);

        let item = json!({"question": "Q", "keywords": "faute, dommage"});
        let q = normalize_question(&item).unwrap();
        assert!(matches!(
            &q,
            QuizQuestion::Short { correct_answer, .. } if correct_answer == &["faute", "dommage"]
        ));
    }

    #[test]
    fn unusable_items_are_dropped() {
        assert_eq!(normalize_question(&json!({"choices": ["a"]})), None);
        assert_eq!(normalize_question(&json!({"question": ""})), None);
        assert_eq!(normalize_question(&json!({"question": "Q", "answer": "libre"})), None);
        assert_eq!(normalize_question(&json!(null)), None);
    }

    #[test]
    fn supplied_quiz_is_kept_and_bad_items_filtered() {
        let course = parse_json(
            r#"{"chapters":[{"sections":[{"title":"S","questions":[
                {"question":"Vrai ?","answer":true},
                {"nope":1}
            ]}]}]}"#,
        )
        .unwrap();
        let quiz = &course.chapters[0].sections[0].quiz;
        assert_eq!(quiz.len(), 1);
        assert_eq!(quiz[0].question(), "Vrai ?");
    }

    #[test]
    fn quiz_of_only_invalid_items_is_backfilled() {
        let course = parse_json(
            r#"{"chapters":[{"sections":[{"title":"S","content":"texte","quiz":[{"nope":1}]}]}]}"#,
        )
        .unwrap();
        let quiz = &course.chapters[0].sections[0].quiz;
        assert_eq!(quiz.len(), 1);
        assert_eq!(quiz[0].question(), "Ce chapitre concerne \"S\".");
    }

    #[test]
    fn shape_precedence_prefers_choices() {
        // both choices and a boolean answer: the MCQ rule is listed first
        let item = json!({"question": "Q", "choices": ["a", "b"], "answer": true});
        let q = normalize_question(&item).unwrap();
        assert_eq!(q.kind(), QuestionKind::Mcq);
        let order: Vec<&str> = QUESTION_SHAPES.iter().map(|s| s.name).collect();
        assert_eq!(order, vec!["mcq", "tf", "short"]);
    }
}
