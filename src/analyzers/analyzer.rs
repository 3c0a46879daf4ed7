use crate::analyzers::aggregate::{district_summary, school_summaries};
use crate::analyzers::bins::{size_summary, spending_summary, type_summary};
use crate::analyzers::grade::scores_by_grade;
use crate::analyzers::ranking::{bottom_schools, top_schools};
use crate::analyzers::types::{DistrictReport, JoinedRecord, Subject};
use crate::config::ReportConfig;
use crate::error::Result;
use crate::join::join;
use crate::loader::{load_schools, load_students};
use tracing::info;

/// Loads both tables, joins them and builds every report table.
#[tracing::instrument(skip(config))]
pub fn analyze(schools_path: &str, students_path: &str, config: &ReportConfig) -> Result<DistrictReport> {
    let rows = load_joined(schools_path, students_path)?;
    build_report(&rows, config)
}

/// Loads both tables and joins students onto schools.
pub fn load_joined(schools_path: &str, students_path: &str) -> Result<Vec<JoinedRecord>> {
    let schools = load_schools(schools_path)?;
    let students = load_students(students_path)?;
    join(students, &schools)
}

/// Computes every derived table from an already joined table.
///
/// Pure function of its inputs: the same rows and config always give the
/// same report.
pub fn build_report(rows: &[JoinedRecord], config: &ReportConfig) -> Result<DistrictReport> {
    let district = district_summary(rows, config.passing_score);
    let schools = school_summaries(rows, config.passing_score)?;

    let report = DistrictReport {
        top_schools: top_schools(&schools, config.top_n),
        bottom_schools: bottom_schools(&schools, config.top_n),
        math_by_grade: scores_by_grade(rows, Subject::Math),
        reading_by_grade: scores_by_grade(rows, Subject::Reading),
        spending_summary: spending_summary(&schools, &config.spending_bins, config.weighting),
        size_summary: size_summary(&schools, &config.size_bins, config.weighting),
        type_summary: type_summary(&schools, config.weighting),
        district,
        schools,
    };

    info!(
        schools = report.district.total_schools,
        students = report.district.total_students,
        overall_passing = report.district.pct_overall_passing,
        "District report built"
    );

    Ok(report)
}
