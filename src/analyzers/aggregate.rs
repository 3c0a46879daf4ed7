use crate::analyzers::types::{DistrictSummary, JoinedRecord, SchoolSummary, Subject};
use crate::analyzers::utility::{mean, pct};
use crate::error::{ReportError, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

/// Running totals for a set of student rows.
#[derive(Default)]
struct ScoreTally {
    math_scores: Vec<f64>,
    reading_scores: Vec<f64>,
    students: HashSet<u64>,
    passing_math: HashSet<u64>,
    passing_reading: HashSet<u64>,
    passing_overall: HashSet<u64>,
}

impl ScoreTally {
    fn push(&mut self, row: &JoinedRecord, passing_score: f64) {
        let id = row.student.student_id;

        self.math_scores.push(row.student.math_score);
        self.reading_scores.push(row.student.reading_score);
        self.students.insert(id);

        if row.passes(Subject::Math, passing_score) {
            self.passing_math.insert(id);
        }
        if row.passes(Subject::Reading, passing_score) {
            self.passing_reading.insert(id);
        }
        if row.passes_overall(passing_score) {
            self.passing_overall.insert(id);
        }
    }

    /// Distinct students seen.
    fn count(&self) -> usize {
        self.students.len()
    }

    fn pct_passing(&self, passing: &HashSet<u64>) -> f64 {
        pct(passing.len(), self.count())
    }
}

/// Computes district-wide metrics over every joined row.
///
/// Budget is summed once per matched school rather than once per student,
/// and pass rates count distinct student ids.
pub fn district_summary(rows: &[JoinedRecord], passing_score: f64) -> DistrictSummary {
    let mut tally = ScoreTally::default();
    let mut budgets: BTreeMap<&str, f64> = BTreeMap::new();

    for row in rows {
        tally.push(row, passing_score);
        // An empty budget still registers the school name.
        let budget = budgets.entry(row.school_name()).or_insert(0.0);
        if let Some(b) = row.budget() {
            *budget = b;
        }
    }

    DistrictSummary {
        total_schools: budgets.len(),
        total_students: tally.count(),
        total_budget: budgets.values().sum(),
        avg_math_score: mean(&tally.math_scores),
        avg_reading_score: mean(&tally.reading_scores),
        pct_passing_math: tally.pct_passing(&tally.passing_math),
        pct_passing_reading: tally.pct_passing(&tally.passing_reading),
        pct_overall_passing: tally.pct_passing(&tally.passing_overall),
    }
}

struct SchoolGroup<'a> {
    first: &'a JoinedRecord,
    tally: ScoreTally,
}

/// Groups joined rows by school name and computes one [`SchoolSummary`] per
/// school, ordered by name.
///
/// Student counts and pass rates count distinct student ids, the same way
/// [`district_summary`] does.
///
/// # Errors
///
/// Returns [`ReportError::InconsistentSchool`] if rows of the same school
/// disagree on type or budget.
pub fn school_summaries(rows: &[JoinedRecord], passing_score: f64) -> Result<Vec<SchoolSummary>> {
    let mut groups: BTreeMap<&str, SchoolGroup<'_>> = BTreeMap::new();

    for row in rows {
        let group = groups.entry(row.school_name()).or_insert_with(|| SchoolGroup {
            first: row,
            tally: ScoreTally::default(),
        });

        if group.first.school_type() != row.school_type() {
            return Err(ReportError::InconsistentSchool {
                school: row.school_name().to_string(),
                field: "type",
            });
        }
        if group.first.budget().map(f64::to_bits) != row.budget().map(f64::to_bits) {
            return Err(ReportError::InconsistentSchool {
                school: row.school_name().to_string(),
                field: "budget",
            });
        }

        group.tally.push(row, passing_score);
    }

    for mismatch in size_mismatches(rows) {
        warn!(
            school = %mismatch.school_name,
            declared = mismatch.declared,
            counted = mismatch.counted,
            "Declared school size differs from counted students"
        );
    }

    let summaries: Vec<SchoolSummary> = groups
        .into_iter()
        .map(|(name, group)| {
            let tally = &group.tally;
            let total_budget = group.first.budget();
            let total_students = tally.count();

            SchoolSummary {
                school_name: name.to_string(),
                school_type: group.first.school_type().map(str::to_string),
                total_students,
                total_budget,
                per_student_budget: total_budget.map(|b| b / total_students as f64),
                avg_math_score: mean(&tally.math_scores),
                avg_reading_score: mean(&tally.reading_scores),
                pct_passing_math: tally.pct_passing(&tally.passing_math),
                pct_passing_reading: tally.pct_passing(&tally.passing_reading),
                pct_overall_passing: tally.pct_passing(&tally.passing_overall),
            }
        })
        .collect();

    debug!(schools = summaries.len(), "School summaries computed");
    Ok(summaries)
}

/// A school whose declared `size` disagrees with its student rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeMismatch {
    pub school_name: String,
    pub declared: usize,
    pub counted: usize,
}

/// Lists matched schools whose declared size differs from the number of
/// joined student rows, ordered by name.
pub fn size_mismatches(rows: &[JoinedRecord]) -> Vec<SizeMismatch> {
    let mut counted: HashMap<&str, (usize, Option<usize>)> = HashMap::new();

    for row in rows {
        let declared = row.school.as_ref().and_then(|s| s.size);
        let entry = counted.entry(row.school_name()).or_insert((0, declared));
        entry.0 += 1;
    }

    let mut mismatches: Vec<SizeMismatch> = counted
        .into_iter()
        .filter_map(|(name, (counted, declared))| match declared {
            Some(declared) if declared != counted => Some(SizeMismatch {
                school_name: name.to_string(),
                declared,
                counted,
            }),
            _ => None,
        })
        .collect();

    mismatches.sort_by(|a, b| a.school_name.cmp(&b.school_name));
    mismatches
}
