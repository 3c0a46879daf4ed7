//! Bucketed re-aggregation of school summaries by spending, size and type.

use crate::analyzers::types::{BucketSummary, SchoolSummary};
use crate::analyzers::utility::weighted_mean;
use crate::config::{Bin, Weighting};
use std::collections::BTreeMap;
use tracing::debug;

/// Index of the first bin whose `(lower, upper]` interval holds `value`.
pub fn bin_index(bins: &[Bin], value: f64) -> Option<usize> {
    bins.iter().position(|bin| bin.contains(value))
}

/// Buckets schools by per-student budget. Schools with no budget or a value
/// outside every bin are left out.
pub fn spending_summary(
    schools: &[SchoolSummary],
    bins: &[Bin],
    weighting: Weighting,
) -> Vec<BucketSummary> {
    binned_summary(schools, bins, weighting, |s| s.per_student_budget)
}

/// Buckets schools by counted enrollment.
pub fn size_summary(
    schools: &[SchoolSummary],
    bins: &[Bin],
    weighting: Weighting,
) -> Vec<BucketSummary> {
    binned_summary(schools, bins, weighting, |s| Some(s.total_students as f64))
}

/// Groups schools by school type, ordered by type name. Schools without a
/// type are left out.
pub fn type_summary(schools: &[SchoolSummary], weighting: Weighting) -> Vec<BucketSummary> {
    let mut groups: BTreeMap<&str, Vec<&SchoolSummary>> = BTreeMap::new();
    for school in schools {
        if let Some(school_type) = school.school_type.as_deref() {
            groups.entry(school_type).or_default().push(school);
        }
    }

    groups
        .into_iter()
        .map(|(label, members)| bucket_summary(label, &members, weighting))
        .collect()
}

fn binned_summary<F>(
    schools: &[SchoolSummary],
    bins: &[Bin],
    weighting: Weighting,
    key: F,
) -> Vec<BucketSummary>
where
    F: Fn(&SchoolSummary) -> Option<f64>,
{
    let mut members: Vec<Vec<&SchoolSummary>> = vec![Vec::new(); bins.len()];
    let mut unbinned = 0usize;

    for school in schools {
        let slot = key(school).and_then(|v| bin_index(bins, v));
        match slot {
            Some(i) => members[i].push(school),
            None => unbinned += 1,
        }
    }

    if unbinned > 0 {
        debug!(unbinned, "Schools outside every bin");
    }

    bins.iter()
        .zip(members)
        .map(|(bin, members)| bucket_summary(&bin.label, &members, weighting))
        .collect()
}

/// Averages the score and pass-rate columns of `members`.
pub fn bucket_summary(
    label: &str,
    members: &[&SchoolSummary],
    weighting: Weighting,
) -> BucketSummary {
    let average = |metric: fn(&SchoolSummary) -> f64| {
        let pairs: Vec<(f64, f64)> = members
            .iter()
            .map(|s| {
                let weight = match weighting {
                    Weighting::Unweighted => 1.0,
                    Weighting::ByStudentCount => s.total_students as f64,
                };
                (metric(s), weight)
            })
            .collect();
        weighted_mean(&pairs)
    };

    BucketSummary {
        bucket: label.to_string(),
        school_count: members.len(),
        avg_math_score: average(|s| s.avg_math_score),
        avg_reading_score: average(|s| s.avg_reading_score),
        pct_passing_math: average(|s| s.pct_passing_math),
        pct_passing_reading: average(|s| s.pct_passing_reading),
        pct_overall_passing: average(|s| s.pct_overall_passing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_size_bins, default_spending_bins};

    fn summary(name: &str, school_type: &str, students: usize, budget: f64, math: f64) -> SchoolSummary {
        SchoolSummary {
            school_name: name.to_string(),
            school_type: Some(school_type.to_string()),
            total_students: students,
            total_budget: Some(budget),
            per_student_budget: Some(budget / students as f64),
            avg_math_score: math,
            avg_reading_score: 80.0,
            pct_passing_math: math,
            pct_passing_reading: 90.0,
            pct_overall_passing: math - 10.0,
        }
    }

    #[test]
    fn test_huang_high_school_spending_bucket() {
        let per_student: f64 = 1910635.0 / 2917.0;
        assert!((per_student - 655.0).abs() < 0.5);

        let bins = default_spending_bins();
        let slot = bin_index(&bins, per_student).unwrap();
        assert_eq!(bins[slot].label, "$645-680");
    }

    #[test]
    fn test_boundaries_and_out_of_range() {
        let bins = default_spending_bins();
        assert_eq!(bin_index(&bins, 585.0), Some(0));
        assert_eq!(bin_index(&bins, 585.01), Some(1));
        assert_eq!(bin_index(&bins, 630.0), Some(1));
        assert_eq!(bin_index(&bins, 680.0), Some(3));
        assert_eq!(bin_index(&bins, 0.0), None);
        assert_eq!(bin_index(&bins, -5.0), None);
        assert_eq!(bin_index(&bins, 680.5), None);
    }

    #[test]
    fn test_spending_summary_lists_every_bin() {
        let schools = vec![
            summary("A", "District", 1000, 580_000.0, 70.0), // 580
            summary("B", "Charter", 1000, 600_000.0, 80.0),  // 600
            summary("C", "Charter", 1000, 610_000.0, 90.0),  // 610
            summary("D", "District", 1000, 900_000.0, 60.0), // 900, no bin
        ];

        let buckets = spending_summary(&schools, &default_spending_bins(), Weighting::Unweighted);

        let labels: Vec<&str> = buckets.iter().map(|b| b.bucket.as_str()).collect();
        assert_eq!(labels, vec!["<$585", "$585-630", "$630-645", "$645-680"]);
        assert_eq!(buckets[0].school_count, 1);
        assert_eq!(buckets[1].school_count, 2);
        assert_eq!(buckets[1].avg_math_score, Some(85.0));
        assert_eq!(buckets[2].school_count, 0);
        assert_eq!(buckets[2].avg_math_score, None);
        assert_eq!(buckets[3].pct_overall_passing, None);
    }

    #[test]
    fn test_size_summary() {
        let schools = vec![
            summary("A", "Charter", 427, 245_000.0, 90.0),
            summary("B", "District", 1800, 1_000_000.0, 80.0),
            summary("C", "District", 4976, 3_000_000.0, 60.0),
            summary("D", "District", 2000, 1_200_000.0, 70.0),
        ];

        let buckets = size_summary(&schools, &default_size_bins(), Weighting::Unweighted);

        assert_eq!(buckets[0].bucket, "Small (<1000)");
        assert_eq!(buckets[0].school_count, 1);
        // 2000 is the closed upper edge of Medium.
        assert_eq!(buckets[1].school_count, 2);
        assert_eq!(buckets[1].avg_math_score, Some(75.0));
        assert_eq!(buckets[2].school_count, 1);
    }

    #[test]
    fn test_weighting_by_student_count() {
        let schools = vec![
            summary("A", "Charter", 100, 60_000.0, 60.0),
            summary("B", "Charter", 300, 180_000.0, 100.0),
        ];

        let unweighted = type_summary(&schools, Weighting::Unweighted);
        let weighted = type_summary(&schools, Weighting::ByStudentCount);

        assert_eq!(unweighted[0].avg_math_score, Some(80.0));
        assert_eq!(weighted[0].avg_math_score, Some(90.0));
    }

    #[test]
    fn test_type_summary_skips_untyped_schools() {
        let mut ghost = summary("Ghost", "District", 10, 1.0, 50.0);
        ghost.school_type = None;
        let schools = vec![
            summary("A", "District", 100, 60_000.0, 60.0),
            summary("B", "Charter", 100, 60_000.0, 100.0),
            ghost,
        ];

        let buckets = type_summary(&schools, Weighting::Unweighted);

        let labels: Vec<&str> = buckets.iter().map(|b| b.bucket.as_str()).collect();
        assert_eq!(labels, vec!["Charter", "District"]);
        assert_eq!(buckets[1].school_count, 1);
        assert_eq!(buckets[1].avg_math_score, Some(60.0));
    }
}
