//! Progress tracking - per-section quiz results, favorites and statistics
//!
//! Tables are created by [`crate::db::init_database`].

use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use serde::{Deserialize, Serialize};

use crate::config::{MatchConfig, DEFAULT_PASS_RATIO};
use crate::grading::{is_passing, QuizScore};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Stored result for one section
#[cfg_attr(feature = "python", pyclass(get_all))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionProgress {
    pub section_id: String,
    pub best: u32,
    pub last: u32,
    pub done: bool,
    pub updated_at: String,
}

#[cfg(feature = "python")]
#[pymethods]
impl SectionProgress {
    fn __repr__(&self) -> String {
        format!(
            "SectionProgress(section_id='{}', best={}, last={}, done={})",
            self.section_id, self.best, self.last, self.done
        )
    }
}

/// Overall statistics
#[cfg_attr(feature = "python", pyclass(get_all))]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    /// Sum of best scores over all sections
    pub total_score: u64,
    pub completed_count: u32,
    pub attempted_count: u32,
    pub favorite_count: u32,
}

#[cfg(feature = "python")]
#[pymethods]
impl ProgressStats {
    fn __repr__(&self) -> String {
        format!(
            "ProgressStats(total_score={}, completed={}/{})",
            self.total_score, self.completed_count, self.attempted_count
        )
    }
}

/// Record a quiz result. Returns whether the section is now done.
pub fn update_section_progress(
    conn: &Connection,
    section_id: &str,
    score: u32,
    total: u32,
) -> SqliteResult<bool> {
    update_section_progress_with(conn, section_id, score, total, DEFAULT_PASS_RATIO)
}

/// [`update_section_progress`] with an explicit pass ratio.
///
/// `best` only ever grows; `last` and `done` reflect this attempt.
pub fn update_section_progress_with(
    conn: &Connection,
    section_id: &str,
    score: u32,
    total: u32,
    pass_ratio: f64,
) -> SqliteResult<bool> {
    let done = is_passing(score as usize, total as usize, pass_ratio);
    let now = chrono::Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO section_progress (section_id, best, last, done, updated_at)
         VALUES (?1, ?2, ?2, ?3, ?4)
         ON CONFLICT(section_id) DO UPDATE SET
            best = MAX(best, excluded.best),
            last = excluded.last,
            done = excluded.done,
            updated_at = excluded.updated_at",
        params![section_id, score, done, now],
    )?;

    tracing::info!(section_id, score, total, done, "recorded section progress");
    Ok(done)
}

/// Record a graded quiz.
pub fn record_quiz_score(
    conn: &Connection,
    section_id: &str,
    quiz_score: &QuizScore,
    config: &MatchConfig,
) -> SqliteResult<bool> {
    let to_u32 = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
    update_section_progress_with(
        conn,
        section_id,
        to_u32(quiz_score.score),
        to_u32(quiz_score.total),
        config.pass_ratio,
    )
}

pub fn get_section_progress(
    conn: &Connection,
    section_id: &str,
) -> SqliteResult<Option<SectionProgress>> {
    conn.query_row(
        "SELECT section_id, best, last, done, updated_at
         FROM section_progress WHERE section_id = ?1",
        params![section_id],
        |row| {
            Ok(SectionProgress {
                section_id: row.get(0)?,
                best: row.get(1)?,
                last: row.get(2)?,
                done: row.get(3)?,
                updated_at: row.get(4)?,
            })
        },
    )
    .optional()
}

pub fn get_stats(conn: &Connection) -> SqliteResult<ProgressStats> {
    let (total_score, completed_count, attempted_count) = conn.query_row(
        "SELECT COALESCE(SUM(best), 0), COALESCE(SUM(done), 0), COUNT(*) FROM section_progress",
        [],
        |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?, row.get::<_, i64>(2)?)),
    )?;
    let favorite_count: i64 =
        conn.query_row("SELECT COUNT(*) FROM favorites", [], |row| row.get(0))?;

    Ok(ProgressStats {
        total_score: total_score.try_into().unwrap_or_default(),
        completed_count: completed_count.try_into().unwrap_or_default(),
        attempted_count: attempted_count.try_into().unwrap_or_default(),
        favorite_count: favorite_count.try_into().unwrap_or_default(),
    })
}

/// Clear all progress and favorites
pub fn reset_progress(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch("DELETE FROM section_progress; DELETE FROM favorites;")?;
    tracing::info!("reset study progress");
    Ok(())
}

// ============= Favorites =============

/// Flip the favorite flag of a section. Returns the new state.
pub fn toggle_favorite(conn: &Connection, section_id: &str) -> SqliteResult<bool> {
    let removed = conn.execute("DELETE FROM favorites WHERE section_id = ?1", params![section_id])?;
    let favorite = removed == 0;
    if favorite {
        conn.execute(
            "INSERT INTO favorites (section_id, added_at) VALUES (?1, ?2)",
            params![section_id, chrono::Utc::now().to_rfc3339()],
        )?;
    }

    tracing::info!(section_id, favorite, "toggled favorite");
    Ok(favorite)
}

pub fn is_favorite(conn: &Connection, section_id: &str) -> SqliteResult<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM favorites WHERE section_id = ?1)",
        params![section_id],
        |row| row.get(0),
    )
}

/// Favorite section ids, in the order they were added
pub fn list_favorites(conn: &Connection) -> SqliteResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT section_id FROM favorites ORDER BY rowid")?;
    let ids = stmt.query_map([], |row| row.get(0))?;
    ids.collect()
}

// ============= Python Bindings =============

#[cfg(feature = "python")]
fn open(db_path: &str) -> PyResult<Connection> {
    crate::db::init_database(db_path).map_err(runtime_err)
}

#[cfg(feature = "python")]
fn runtime_err(e: rusqlite::Error) -> PyErr {
    pyo3::exceptions::PyRuntimeError::new_err(e.to_string())
}

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "update_section_progress")]
pub fn py_update_section_progress(
    db_path: &str,
    section_id: &str,
    score: u32,
    total: u32,
) -> PyResult<bool> {
    let pass_ratio = crate::config::py_match_config()?.pass_ratio;
    update_section_progress_with(&open(db_path)?, section_id, score, total, pass_ratio)
        .map_err(runtime_err)
}

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "get_section_progress")]
pub fn py_get_section_progress(
    db_path: &str,
    section_id: &str,
) -> PyResult<Option<SectionProgress>> {
    get_section_progress(&open(db_path)?, section_id).map_err(runtime_err)
}

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "get_stats")]
pub fn py_get_stats(db_path: &str) -> PyResult<ProgressStats> {
    get_stats(&open(db_path)?).map_err(runtime_err)
}

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "reset_progress")]
pub fn py_reset_progress(db_path: &str) -> PyResult<()> {
    reset_progress(&open(db_path)?).map_err(runtime_err)
}

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "toggle_favorite")]
pub fn py_toggle_favorite(db_path: &str, section_id: &str) -> PyResult<bool> {
    toggle_favorite(&open(db_path)?, section_id).map_err(runtime_err)
}

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "is_favorite")]
pub fn py_is_favorite(db_path: &str, section_id: &str) -> PyResult<bool> {
    is_favorite(&open(db_path)?, section_id).map_err(runtime_err)
}

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "list_favorites")]
pub fn py_list_favorites(db_path: &str) -> PyResult<Vec<String>> {
    list_favorites(&open(db_path)?).map_err(runtime_err)
}
