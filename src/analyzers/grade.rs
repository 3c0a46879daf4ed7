//! Per-grade score breakdown by school.

use crate::analyzers::types::{GradeScores, JoinedRecord, Subject};
use std::collections::BTreeMap;
use tracing::debug;

/// Grade levels reported in the breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeLevel {
    Ninth,
    Tenth,
    Eleventh,
    Twelfth,
}

impl GradeLevel {
    pub const ALL: [GradeLevel; 4] = [
        GradeLevel::Ninth,
        GradeLevel::Tenth,
        GradeLevel::Eleventh,
        GradeLevel::Twelfth,
    ];

    pub fn label(self) -> &'static str {
        match self {
            GradeLevel::Ninth => "9th",
            GradeLevel::Tenth => "10th",
            GradeLevel::Eleventh => "11th",
            GradeLevel::Twelfth => "12th",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.label() == label)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Mean `subject` score per grade for every school, ordered by school name.
///
/// A school with no students in a grade gets `None` for that grade, never
/// zero. Rows whose grade is not one of the four levels are skipped.
pub fn scores_by_grade(rows: &[JoinedRecord], subject: Subject) -> Vec<GradeScores> {
    // (sum, count) per grade, indexed by GradeLevel
    let mut per_school: BTreeMap<&str, [(f64, usize); 4]> = BTreeMap::new();
    let mut skipped = 0usize;

    for row in rows {
        let cells = per_school.entry(row.school_name()).or_default();
        match GradeLevel::from_label(&row.student.grade) {
            Some(level) => {
                let cell = &mut cells[level.index()];
                cell.0 += subject.score(&row.student);
                cell.1 += 1;
            }
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(skipped, ?subject, "Rows with unrecognised grade skipped");
    }

    per_school
        .into_iter()
        .map(|(name, cells)| {
            let avg = |level: GradeLevel| {
                let (sum, count) = cells[level.index()];
                (count > 0).then(|| sum / count as f64)
            };
            GradeScores {
                school_name: name.to_string(),
                ninth: avg(GradeLevel::Ninth),
                tenth: avg(GradeLevel::Tenth),
                eleventh: avg(GradeLevel::Eleventh),
                twelfth: avg(GradeLevel::Twelfth),
            }
        })
        .collect()
}
