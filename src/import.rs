//! Course import: format detection and file loading (.txt, .json, .md)

use std::fs;
use std::path::Path;

use crate::course::ParsedCourse;
use crate::error::ImportError;
use crate::formatter::Formatter;
use crate::json_import::parse_json_with;
use crate::segmenter::parse_text_with;

/// Accepted upload extensions; all are read as text.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "json", "md"];

/// Parse raw course material, detecting JSON or free text.
///
/// Input starting with `{` or `[` is tried as JSON first; if that fails it is
/// parsed as free text instead. Never fails, but the result may have no
/// chapters, which callers should reject before publishing.
pub fn parse_course_content(raw: &str) -> ParsedCourse {
    parse_course_content_with(raw, Formatter::builtin())
}

/// [`parse_course_content`] with custom highlight rules.
pub fn parse_course_content_with(raw: &str, formatter: &Formatter) -> ParsedCourse {
    let trimmed = raw.trim();

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        match parse_json_with(trimmed, formatter) {
            Ok(course) => return course,
            Err(e) => tracing::debug!(error = %e, "not a JSON course, parsing as text"),
        }
    }

    parse_text_with(trimmed, formatter)
}

/// Read a course file and parse it.
pub fn import_file(file_path: impl AsRef<Path>) -> Result<ParsedCourse, ImportError> {
    let path = file_path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ImportError::UnsupportedFormat { extension });
    }

    let content = fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let course = parse_course_content(content.trim_start_matches('\u{feff}'));
    tracing::info!(
        path = %path.display(),
        chapters = course.chapters.len(),
        sections = course.section_count(),
        questions = course.question_count(),
        "imported course file"
    );
    Ok(course)
}

// ============= Python Bindings =============

#[cfg(feature = "python")]
#[pyo3::pyfunction]
#[pyo3(name = "parse_course_content")]
pub fn py_parse_course_content(raw: &str) -> pyo3::PyResult<String> {
    serde_json::to_string(&parse_course_content(raw))
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
}

#[cfg(feature = "python")]
#[pyo3::pyfunction]
#[pyo3(name = "import_file")]
pub fn py_import_file(file_path: &str) -> pyo3::PyResult<String> {
    let course = import_file(file_path)
        .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(e.to_string()))?;
    serde_json::to_string(&course)
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
}
