//! Pandora Core - course ingestion and quiz grading for a self-study app
//!
//! Turns loosely formatted study material (plain text, markdown or JSON) into a
//! chapter/section tree with formatted content and generated quizzes, grades
//! answers with a typo-tolerant short-answer matcher, and keeps courses,
//! favorites and progress in a local SQLite file.
//!
//! ```
//! use pandora_core::{parse_course_content, validate_short_answer};
//!
//! let course = parse_course_content(
//!     "Chapitre 1: Les obligations\nSection 1: Définition\nL'obligation est un lien de droit.",
//! );
//! assert_eq!(course.chapters[0].title, "Les obligations");
//!
//! let result = validate_short_answer("le creancier", &["créancier", "débiteur"], 0.5);
//! assert!(result.is_correct);
//! ```
//!
//! With the `python` feature the crate also builds as a Python extension module.

pub mod config;
pub mod course;
pub mod db;
pub mod error;
pub mod formatter;
pub mod fuzzy;
pub mod grading;
pub mod import;
pub mod json_import;
pub mod progress;
pub mod questions;
pub mod segmenter;
pub mod text;

pub use config::MatchConfig;
pub use course::{
    generate_course_id, Chapter, Course, ParsedChapter, ParsedCourse, ParsedSection, QuestionKind,
    QuizQuestion, Section,
};
pub use db::{
    delete_course, get_course, init_database, list_courses, publish_course, save_course,
    CourseSummary,
};
pub use error::{
    ConfigError, FormatError, ImportError, PublishError, PublishOrStoreError, StoreError,
};
pub use formatter::{format_content, Emphasis, Formatter, HighlightRules};
pub use fuzzy::{
    is_similar_word, validate_short_answer, validate_short_answer_with, ShortAnswerResult,
};
pub use grading::{grade_question, grade_quiz, Answer, QuestionOutcome, QuizScore};
pub use import::{import_file, parse_course_content, parse_course_content_with};
pub use json_import::{parse_json, parse_json_with};
pub use progress::{
    get_section_progress, get_stats, is_favorite, list_favorites, record_quiz_score,
    reset_progress, toggle_favorite, update_section_progress, update_section_progress_with,
    ProgressStats, SectionProgress,
};
pub use questions::{extract_key_terms, synthesize_quiz};
pub use segmenter::{parse_text, parse_text_with};
pub use text::{normalize_text, remove_accents};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Pandora Core Python Module
#[cfg(feature = "python")]
#[pymodule]
fn pandora_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // RUST_LOG controls verbosity; a host that already set a subscriber wins
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    // Fail the import on invalid PANDORA_* overrides
    config::py_match_config()?;

    // Text matching
    m.add_function(wrap_pyfunction!(text::py_normalize_text, m)?)?;
    m.add_function(wrap_pyfunction!(fuzzy::py_is_similar_word, m)?)?;
    m.add_function(wrap_pyfunction!(fuzzy::py_validate_short_answer, m)?)?;

    // Ingestion
    m.add_function(wrap_pyfunction!(import::py_parse_course_content, m)?)?;
    m.add_function(wrap_pyfunction!(import::py_import_file, m)?)?;

    // Course store
    m.add_function(wrap_pyfunction!(db::py_init_database, m)?)?;
    m.add_function(wrap_pyfunction!(db::py_publish_course, m)?)?;
    m.add_function(wrap_pyfunction!(db::py_get_course, m)?)?;
    m.add_function(wrap_pyfunction!(db::py_list_courses, m)?)?;
    m.add_function(wrap_pyfunction!(db::py_delete_course, m)?)?;

    // Progress and favorites
    m.add_function(wrap_pyfunction!(progress::py_update_section_progress, m)?)?;
    m.add_function(wrap_pyfunction!(progress::py_get_section_progress, m)?)?;
    m.add_function(wrap_pyfunction!(progress::py_get_stats, m)?)?;
    m.add_function(wrap_pyfunction!(progress::py_reset_progress, m)?)?;
    m.add_function(wrap_pyfunction!(progress::py_toggle_favorite, m)?)?;
    m.add_function(wrap_pyfunction!(progress::py_is_favorite, m)?)?;
    m.add_function(wrap_pyfunction!(progress::py_list_favorites, m)?)?;

    // Register classes
    m.add_class::<fuzzy::ShortAnswerResult>()?;
    m.add_class::<db::CourseSummary>()?;
    m.add_class::<progress::SectionProgress>()?;
    m.add_class::<progress::ProgressStats>()?;

    Ok(())
}
