//! Data types used by the report pipeline.

use serde::{Deserialize, Serialize};

/// A single row of the school table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolRecord {
    #[serde(rename = "School ID", default)]
    pub school_id: Option<u32>,
    pub school_name: String,
    #[serde(rename = "type", alias = "school_type")]
    pub school_type: String,
    /// Enrollment as declared by the school table. Reports use the counted
    /// student rows instead.
    #[serde(default, alias = "total_students")]
    pub size: Option<usize>,
    pub budget: f64,
}

/// A single row of the student table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    #[serde(rename = "Student ID", alias = "student_id")]
    pub student_id: u64,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    pub grade: String,
    pub school_name: String,
    pub reading_score: f64,
    pub math_score: f64,
}

/// A student row with its school's attributes attached.
///
/// `school` is `None` when the student's `school_name` has no match in the
/// school table.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRecord {
    pub student: StudentRecord,
    pub school: Option<SchoolRecord>,
}

impl JoinedRecord {
    pub fn school_name(&self) -> &str {
        &self.student.school_name
    }

    pub fn school_type(&self) -> Option<&str> {
        self.school.as_ref().map(|s| s.school_type.as_str())
    }

    pub fn budget(&self) -> Option<f64> {
        self.school.as_ref().map(|s| s.budget)
    }

    pub fn passes(&self, subject: Subject, passing_score: f64) -> bool {
        subject.score(&self.student) >= passing_score
    }

    /// Passing overall means passing both math and reading.
    pub fn passes_overall(&self, passing_score: f64) -> bool {
        self.passes(Subject::Math, passing_score) && self.passes(Subject::Reading, passing_score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Math,
    Reading,
}

impl Subject {
    pub fn score(self, student: &StudentRecord) -> f64 {
        match self {
            Subject::Math => student.math_score,
            Subject::Reading => student.reading_score,
        }
    }
}

/// District-wide metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictSummary {
    pub total_schools: usize,
    pub total_students: usize,
    pub total_budget: f64,
    pub avg_math_score: f64,
    pub avg_reading_score: f64,
    pub pct_passing_math: f64,
    pub pct_passing_reading: f64,
    pub pct_overall_passing: f64,
}

/// Per-school metrics. Budget and type are absent for schools that never
/// matched the school table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchoolSummary {
    pub school_name: String,
    pub school_type: Option<String>,
    pub total_students: usize,
    pub total_budget: Option<f64>,
    pub per_student_budget: Option<f64>,
    pub avg_math_score: f64,
    pub avg_reading_score: f64,
    pub pct_passing_math: f64,
    pub pct_passing_reading: f64,
    pub pct_overall_passing: f64,
}

/// Mean score per grade for one school. Grades without students are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeScores {
    pub school_name: String,
    #[serde(rename = "9th")]
    pub ninth: Option<f64>,
    #[serde(rename = "10th")]
    pub tenth: Option<f64>,
    #[serde(rename = "11th")]
    pub eleventh: Option<f64>,
    #[serde(rename = "12th")]
    pub twelfth: Option<f64>,
}

/// Metrics averaged over the schools of one bucket (spending range, size
/// range or school type). Metrics are `None` when the bucket is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSummary {
    pub bucket: String,
    pub school_count: usize,
    pub avg_math_score: Option<f64>,
    pub avg_reading_score: Option<f64>,
    pub pct_passing_math: Option<f64>,
    pub pct_passing_reading: Option<f64>,
    pub pct_overall_passing: Option<f64>,
}

/// Every derived table of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictReport {
    pub district: DistrictSummary,
    pub schools: Vec<SchoolSummary>,
    pub top_schools: Vec<SchoolSummary>,
    pub bottom_schools: Vec<SchoolSummary>,
    pub math_by_grade: Vec<GradeScores>,
    pub reading_by_grade: Vec<GradeScores>,
    pub spending_summary: Vec<BucketSummary>,
    pub size_summary: Vec<BucketSummary>,
    pub type_summary: Vec<BucketSummary>,
}
