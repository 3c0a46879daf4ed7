//! CSV loader for the school and student tables.

use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use tracing::info;

use crate::analyzers::types::{SchoolRecord, StudentRecord};
use crate::error::{ReportError, Result};

/// Required school columns; each entry lists the accepted header spellings.
const SCHOOL_COLUMNS: &[&[&str]] = &[&["school_name"], &["type", "school_type"], &["budget"]];

const STUDENT_COLUMNS: &[&[&str]] = &[
    &["Student ID", "student_id"],
    &["school_name"],
    &["grade"],
    &["reading_score"],
    &["math_score"],
];

/// Reads the school table from a CSV file.
///
/// # Errors
///
/// Fails when the file cannot be opened, a required column is missing, or a
/// row does not parse.
#[tracing::instrument]
pub fn load_schools(path: &str) -> Result<Vec<SchoolRecord>> {
    let file = open_source("schools", path)?;
    let rows = load_schools_from_reader(file)?;
    info!(rows = rows.len(), "School table loaded");
    Ok(rows)
}

/// Reads the student table from a CSV file.
#[tracing::instrument]
pub fn load_students(path: &str) -> Result<Vec<StudentRecord>> {
    let file = open_source("students", path)?;
    let rows = load_students_from_reader(file)?;
    info!(rows = rows.len(), "Student table loaded");
    Ok(rows)
}

pub fn load_schools_from_reader<R: Read>(reader: R) -> Result<Vec<SchoolRecord>> {
    read_table("schools", reader, SCHOOL_COLUMNS)
}

pub fn load_students_from_reader<R: Read>(reader: R) -> Result<Vec<StudentRecord>> {
    read_table("students", reader, STUDENT_COLUMNS)
}

fn open_source(source_name: &'static str, path: &str) -> Result<File> {
    File::open(path).map_err(|source| ReportError::SourceUnavailable {
        source_name,
        path: path.to_string(),
        source,
    })
}

fn read_table<T, R>(
    source_name: &'static str,
    reader: R,
    required: &[&[&'static str]],
) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    for accepted in required {
        if !accepted.iter().any(|c| headers.iter().any(|h| h == *c)) {
            return Err(ReportError::MissingColumn {
                source_name,
                column: accepted[0],
            });
        }
    }

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let record: T = result.map_err(|e| malformed(source_name, e))?;
        rows.push(record);
    }

    Ok(rows)
}

fn malformed(source_name: &'static str, err: csv::Error) -> ReportError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    ReportError::Malformed {
        source_name,
        line,
        message: err.to_string(),
    }
}
