use district_report::analyzers::types::{SchoolRecord, StudentRecord};
use district_report::join::join;
use district_report::{DistrictReport, ReportConfig, build_report};
use proptest::prelude::*;

const GRADES: [&str; 4] = ["9th", "10th", "11th", "12th"];

/// Builds a report from generated `(school index, math, reading, grade index)`
/// students and one budget per school.
fn report_for(students: &[(usize, u32, u32, usize)], budgets: &[f64]) -> DistrictReport {
    let schools: Vec<SchoolRecord> = budgets
        .iter()
        .enumerate()
        .map(|(i, &budget)| SchoolRecord {
            school_id: Some(i as u32),
            school_name: format!("School {i:02}"),
            school_type: if i % 2 == 0 { "District" } else { "Charter" }.to_string(),
            size: None,
            budget,
        })
        .collect();

    let students: Vec<StudentRecord> = students
        .iter()
        .enumerate()
        .map(|(id, &(school, math, reading, grade))| StudentRecord {
            student_id: id as u64,
            student_name: None,
            gender: None,
            grade: GRADES[grade].to_string(),
            school_name: format!("School {:02}", school % budgets.len()),
            reading_score: reading as f64,
            math_score: math as f64,
        })
        .collect();

    let rows = join(students, &schools).unwrap();
    build_report(&rows, &ReportConfig::default()).unwrap()
}

fn students_strategy() -> impl Strategy<Value = Vec<(usize, u32, u32, usize)>> {
    prop::collection::vec((0usize..12, 0u32..=100, 0u32..=100, 0usize..4), 1..300)
}

fn budgets_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1_000.0f64..3_000_000.0, 12)
}

proptest! {
    /// Property: per-student budget is the school budget over its student count.
    #[test]
    fn per_student_budget_divides_budget(students in students_strategy(), budgets in budgets_strategy()) {
        let report = report_for(&students, &budgets);
        for school in &report.schools {
            let budget = school.total_budget.unwrap();
            prop_assert_eq!(
                school.per_student_budget,
                Some(budget / school.total_students as f64)
            );
        }
    }

    /// Property: pass rates are percentages and overall never exceeds either subject.
    #[test]
    fn pass_rates_are_bounded(students in students_strategy(), budgets in budgets_strategy()) {
        let report = report_for(&students, &budgets);
        for school in &report.schools {
            for rate in [school.pct_passing_math, school.pct_passing_reading, school.pct_overall_passing] {
                prop_assert!((0.0..=100.0).contains(&rate));
            }
            prop_assert!(
                school.pct_overall_passing
                    <= school.pct_passing_math.min(school.pct_passing_reading)
            );
        }
    }

    /// Property: every student is counted in exactly one school.
    #[test]
    fn student_counts_add_up(students in students_strategy(), budgets in budgets_strategy()) {
        let report = report_for(&students, &budgets);
        let per_school: usize = report.schools.iter().map(|s| s.total_students).sum();
        prop_assert_eq!(report.district.total_students, per_school);
        prop_assert_eq!(report.district.total_students, students.len());
    }

    /// Property: the pipeline is a pure function of its input.
    #[test]
    fn rerun_is_identical(students in students_strategy(), budgets in budgets_strategy()) {
        prop_assert_eq!(report_for(&students, &budgets), report_for(&students, &budgets));
    }

    /// Property: with at least ten schools, top and bottom lists are disjoint
    /// and bound every other school.
    #[test]
    fn rankings_are_disjoint_and_bounding(
        students in prop::collection::vec((0usize..12, 0u32..=100, 0u32..=100, 0usize..4), 60..300),
        budgets in budgets_strategy(),
    ) {
        let report = report_for(&students, &budgets);
        prop_assume!(report.schools.len() >= 10);

        let top: Vec<&str> = report.top_schools.iter().map(|s| s.school_name.as_str()).collect();
        let bottom: Vec<&str> = report.bottom_schools.iter().map(|s| s.school_name.as_str()).collect();
        prop_assert!(top.iter().all(|name| !bottom.contains(name)));

        let top_min = report.top_schools.iter().map(|s| s.pct_overall_passing).fold(f64::INFINITY, f64::min);
        let bottom_max = report.bottom_schools.iter().map(|s| s.pct_overall_passing).fold(f64::NEG_INFINITY, f64::max);
        for school in &report.schools {
            prop_assert!(top_min >= school.pct_overall_passing || top.contains(&school.school_name.as_str()));
            prop_assert!(bottom_max <= school.pct_overall_passing || bottom.contains(&school.school_name.as_str()));
        }
    }

    /// Property: every school with a spending bucket lands in exactly one bin.
    #[test]
    fn spending_buckets_partition_binned_schools(students in students_strategy(), budgets in budgets_strategy()) {
        let report = report_for(&students, &budgets);
        let config = ReportConfig::default();
        let binned = report
            .schools
            .iter()
            .filter(|s| {
                let v = s.per_student_budget.unwrap();
                config.spending_bins.iter().filter(|b| b.contains(v)).count() == 1
            })
            .count();
        let bucketed: usize = report.spending_summary.iter().map(|b| b.school_count).sum();
        prop_assert_eq!(binned, bucketed);
    }
}
