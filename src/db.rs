//! SQLite storage for published courses, favorites and study progress

use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use serde::{Deserialize, Serialize};

use crate::course::{Course, ParsedCourse};
use crate::error::{PublishOrStoreError, StoreError};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Course list entry, without chapter content
#[cfg_attr(feature = "python", pyclass(get_all))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSummary {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub color: String,
    pub updated_at: String,
}

#[cfg(feature = "python")]
#[pymethods]
impl CourseSummary {
    fn __repr__(&self) -> String {
        format!("CourseSummary(id='{}', title='{}')", self.id, self.title)
    }
}

/// Open the database and create the schema if needed
pub fn init_database(db_path: &str) -> SqliteResult<Connection> {
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS custom_courses (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            icon TEXT NOT NULL,
            color TEXT NOT NULL,
            payload TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS favorites (
            section_id TEXT PRIMARY KEY,
            added_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS section_progress (
            section_id TEXT PRIMARY KEY,
            best INTEGER NOT NULL,
            last INTEGER NOT NULL,
            done INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}

/// Insert or fully replace a course. `created_at` survives replacement.
pub fn save_course(conn: &Connection, course: &Course) -> Result<(), StoreError> {
    let payload = serde_json::to_string(course)?;
    let now = chrono::Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO custom_courses (id, title, icon, color, payload, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
         ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            icon = excluded.icon,
            color = excluded.color,
            payload = excluded.payload,
            updated_at = excluded.updated_at",
        params![course.id, course.title, course.icon, course.color, payload, now],
    )?;

    tracing::info!(course_id = %course.id, "saved course");
    Ok(())
}

pub fn get_course(conn: &Connection, course_id: &str) -> Result<Option<Course>, StoreError> {
    let payload: Option<String> = conn
        .query_row(
            "SELECT payload FROM custom_courses WHERE id = ?1",
            params![course_id],
            |row| row.get(0),
        )
        .optional()?;

    match payload {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// All stored courses, oldest first
pub fn list_courses(conn: &Connection) -> SqliteResult<Vec<CourseSummary>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, icon, color, updated_at FROM custom_courses ORDER BY created_at, id",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(CourseSummary {
            id: row.get(0)?,
            title: row.get(1)?,
            icon: row.get(2)?,
            color: row.get(3)?,
            updated_at: row.get(4)?,
        })
    })?;

    rows.collect()
}

/// Delete a course. Returns whether it existed.
pub fn delete_course(conn: &Connection, course_id: &str) -> SqliteResult<bool> {
    let deleted = conn.execute("DELETE FROM custom_courses WHERE id = ?1", params![course_id])? > 0;
    tracing::info!(course_id, deleted, "deleted course");
    Ok(deleted)
}

/// Publish a parsed course under a fresh id and store it.
pub fn publish_course(
    conn: &Connection,
    parsed: ParsedCourse,
    icon: &str,
    color: &str,
) -> Result<Course, PublishOrStoreError> {
    let course = parsed.publish(icon, color)?;
    save_course(conn, &course)?;
    tracing::info!(course_id = %course.id, title = %course.title, "published course");
    Ok(course)
}

// ============= Python Bindings =============

#[cfg(feature = "python")]
fn runtime_err(e: impl std::fmt::Display) -> PyErr {
    pyo3::exceptions::PyRuntimeError::new_err(e.to_string())
}

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "init_database")]
pub fn py_init_database(db_path: &str) -> PyResult<()> {
    init_database(db_path).map(|_| ()).map_err(runtime_err)
}

/// Takes a parsed course as JSON, returns the published course as JSON.
#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "publish_course")]
pub fn py_publish_course(
    db_path: &str,
    parsed_json: &str,
    icon: &str,
    color: &str,
) -> PyResult<String> {
    let parsed: ParsedCourse = serde_json::from_str(parsed_json)
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;
    let conn = init_database(db_path).map_err(runtime_err)?;
    let course = publish_course(&conn, parsed, icon, color).map_err(runtime_err)?;
    serde_json::to_string(&course).map_err(runtime_err)
}

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "get_course")]
pub fn py_get_course(db_path: &str, course_id: &str) -> PyResult<Option<String>> {
    let conn = init_database(db_path).map_err(runtime_err)?;
    get_course(&conn, course_id)
        .map_err(runtime_err)?
        .map(|course| serde_json::to_string(&course).map_err(runtime_err))
        .transpose()
}

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "list_courses")]
pub fn py_list_courses(db_path: &str) -> PyResult<Vec<CourseSummary>> {
    let conn = init_database(db_path).map_err(runtime_err)?;
    list_courses(&conn).map_err(runtime_err)
}

#[cfg(feature = "python")]
#[pyfunction]
#[pyo3(name = "delete_course")]
pub fn py_delete_course(db_path: &str, course_id: &str) -> PyResult<bool> {
    let conn = init_database(db_path).map_err(runtime_err)?;
    delete_course(&conn, course_id).map_err(runtime_err)
}
