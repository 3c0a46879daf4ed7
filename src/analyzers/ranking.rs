use crate::analyzers::types::SchoolSummary;
use std::cmp::Ordering;

/// Highest `n` schools by overall passing percentage.
///
/// Ties are broken by school name ascending so the ranking does not depend on
/// input order.
pub fn top_schools(summaries: &[SchoolSummary], n: usize) -> Vec<SchoolSummary> {
    ranked(summaries, n, rank_order)
}

/// Lowest `n` schools by overall passing percentage.
///
/// This is the top ranking read from the other end, so ties come out by
/// school name descending and the two lists never share a school while there
/// are at least `2 * n` schools.
pub fn bottom_schools(summaries: &[SchoolSummary], n: usize) -> Vec<SchoolSummary> {
    ranked(summaries, n, |a, b| rank_order(b, a))
}

fn rank_order(a: &SchoolSummary, b: &SchoolSummary) -> Ordering {
    b.pct_overall_passing
        .total_cmp(&a.pct_overall_passing)
        .then_with(|| a.school_name.cmp(&b.school_name))
}

fn ranked<F>(summaries: &[SchoolSummary], n: usize, order: F) -> Vec<SchoolSummary>
where
    F: Fn(&SchoolSummary, &SchoolSummary) -> Ordering,
{
    let mut ranked = summaries.to_vec();
    ranked.sort_by(|a, b| order(a, b));
    ranked.truncate(n);
    ranked
}
