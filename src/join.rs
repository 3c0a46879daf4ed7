//! Left join of student rows onto the school table.

use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::analyzers::types::{JoinedRecord, SchoolRecord, StudentRecord};
use crate::error::{ReportError, Result};

/// Counts describing how well the two tables matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinSummary {
    pub students: usize,
    pub matched: usize,
    pub unmatched: usize,
    /// Distinct school names referenced by students without a school row.
    pub unknown_schools: Vec<String>,
}

/// Joins every student to the school with the same `school_name`.
///
/// Output has one row per student in input order. Students whose school is
/// not in the table are kept with `school: None`.
///
/// # Errors
///
/// Returns [`ReportError::InconsistentSchool`] when the school table holds
/// several rows for one name that disagree on type or budget, and
/// [`ReportError::DuplicateStudent`] when a student id occurs twice.
#[tracing::instrument(skip_all, fields(students = students.len(), schools = schools.len()))]
pub fn join(students: Vec<StudentRecord>, schools: &[SchoolRecord]) -> Result<Vec<JoinedRecord>> {
    let index = index_schools(schools)?;

    let mut seen: HashSet<u64> = HashSet::with_capacity(students.len());
    for student in &students {
        if !seen.insert(student.student_id) {
            return Err(ReportError::DuplicateStudent {
                student_id: student.student_id,
            });
        }
    }

    let rows: Vec<JoinedRecord> = students
        .into_iter()
        .map(|student| {
            let school = index.get(student.school_name.as_str()).map(|s| (*s).clone());
            JoinedRecord { student, school }
        })
        .collect();

    let summary = summarize(&rows);
    if summary.unmatched > 0 {
        warn!(
            unmatched = summary.unmatched,
            unknown_schools = ?summary.unknown_schools,
            "Students reference schools missing from the school table"
        );
    }
    info!(rows = rows.len(), matched = summary.matched, "Tables joined");

    Ok(rows)
}

/// Indexes schools by name, collapsing duplicate rows that agree.
fn index_schools(schools: &[SchoolRecord]) -> Result<HashMap<&str, &SchoolRecord>> {
    let mut index: HashMap<&str, &SchoolRecord> = HashMap::with_capacity(schools.len());

    for school in schools {
        let Some(first) = index.get(school.school_name.as_str()).copied() else {
            index.insert(school.school_name.as_str(), school);
            continue;
        };

        if first.school_type != school.school_type {
            return Err(ReportError::InconsistentSchool {
                school: school.school_name.clone(),
                field: "type",
            });
        }
        if first.budget.to_bits() != school.budget.to_bits() {
            return Err(ReportError::InconsistentSchool {
                school: school.school_name.clone(),
                field: "budget",
            });
        }
        debug!(school = %school.school_name, "Duplicate school row collapsed");
    }

    Ok(index)
}

/// Tallies matched and unmatched students of a joined table.
pub fn summarize(rows: &[JoinedRecord]) -> JoinSummary {
    let mut summary = JoinSummary {
        students: rows.len(),
        ..Default::default()
    };

    for row in rows {
        if row.school.is_some() {
            summary.matched += 1;
        } else {
            summary.unmatched += 1;
            if !summary.unknown_schools.iter().any(|s| s == row.school_name()) {
                summary.unknown_schools.push(row.school_name().to_string());
            }
        }
    }

    summary.unknown_schools.sort();
    summary
}
