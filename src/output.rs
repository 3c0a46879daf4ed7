//! Output formatting and persistence for district reports.
//!
//! Supports pretty-printing, JSON serialization, plain-text tables and CSV
//! export of every table.

use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analyzers::types::{BucketSummary, DistrictReport, GradeScores, SchoolSummary};
use crate::error::Result;

/// JSON document written next to the exported CSV tables.
#[derive(Serialize)]
struct ReportDocument<'a> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    report: &'a DistrictReport,
}

/// Logs the report using Rust's debug pretty-print format.
pub fn print_pretty(report: &DistrictReport) {
    debug!("{:#?}", report);
}

/// Writes the report as pretty-printed JSON.
pub fn write_json<W: Write>(mut out: W, report: &DistrictReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, report)?;
    writeln!(out)?;
    Ok(())
}

/// Serializes `rows` as a CSV table with a header row.
pub fn write_csv<W: Write, T: Serialize>(out: W, rows: &[T]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(out);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes every table as CSV, each preceded by a `# title` line.
pub fn write_all_csv<W: Write>(mut out: W, report: &DistrictReport) -> Result<()> {
    for (i, (title, _)) in TABLE_FILES.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        writeln!(out, "# {title}")?;
        write_table(&mut out, i, report)?;
    }
    Ok(())
}

/// Table titles and the file names used by [`export_tables`].
const TABLE_FILES: [(&str, &str); 9] = [
    ("District Summary", "district_summary.csv"),
    ("School Summary", "school_summary.csv"),
    ("Top Schools", "top_schools.csv"),
    ("Bottom Schools", "bottom_schools.csv"),
    ("Math Scores by Grade", "math_scores_by_grade.csv"),
    ("Reading Scores by Grade", "reading_scores_by_grade.csv"),
    ("Scores by School Spending", "spending_summary.csv"),
    ("Scores by School Size", "size_summary.csv"),
    ("Scores by School Type", "type_summary.csv"),
];

fn write_table<W: Write>(out: W, index: usize, report: &DistrictReport) -> Result<()> {
    match index {
        0 => write_csv(out, std::slice::from_ref(&report.district)),
        1 => write_csv(out, &report.schools),
        2 => write_csv(out, &report.top_schools),
        3 => write_csv(out, &report.bottom_schools),
        4 => write_csv(out, &report.math_by_grade),
        5 => write_csv(out, &report.reading_by_grade),
        6 => write_csv(out, &report.spending_summary),
        7 => write_csv(out, &report.size_summary),
        _ => write_csv(out, &report.type_summary),
    }
}

/// Writes each table to its own CSV file in `dir`, plus `report.json`.
///
/// Creates `dir` if it does not exist and overwrites existing files. Returns
/// the paths written.
pub fn export_tables(dir: &Path, report: &DistrictReport) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(TABLE_FILES.len() + 1);

    for (i, (_, file_name)) in TABLE_FILES.iter().enumerate() {
        let path = dir.join(file_name);
        write_table(File::create(&path)?, i, report)?;
        debug!(path = %path.display(), "Table exported");
        written.push(path);
    }

    let json_path = dir.join("report.json");
    let document = ReportDocument {
        generated_at: Utc::now(),
        report,
    };
    serde_json::to_writer_pretty(File::create(&json_path)?, &document)?;
    written.push(json_path);

    info!(dir = %dir.display(), files = written.len(), "Report exported");
    Ok(written)
}

/// Renders every table as aligned plain text.
pub fn write_text<W: Write>(mut out: W, report: &DistrictReport) -> Result<()> {
    let d = &report.district;
    let district = TextTable {
        headers: vec![
            "Total Schools",
            "Total Students",
            "Total Budget",
            "Average Math Score",
            "Average Reading Score",
            "% Passing Math",
            "% Passing Reading",
            "% Overall Passing",
        ],
        rows: vec![vec![
            d.total_schools.to_string(),
            d.total_students.to_string(),
            money(Some(d.total_budget)),
            number(Some(d.avg_math_score)),
            number(Some(d.avg_reading_score)),
            number(Some(d.pct_passing_math)),
            number(Some(d.pct_passing_reading)),
            number(Some(d.pct_overall_passing)),
        ]],
    };

    let sections = [
        ("District Summary", district),
        ("School Summary", school_table(&report.schools)),
        ("Top Schools", school_table(&report.top_schools)),
        ("Bottom Schools", school_table(&report.bottom_schools)),
        ("Math Scores by Grade", grade_table(&report.math_by_grade)),
        ("Reading Scores by Grade", grade_table(&report.reading_by_grade)),
        (
            "Scores by School Spending",
            bucket_table("Spending Ranges (Per Student)", &report.spending_summary),
        ),
        ("Scores by School Size", bucket_table("School Size", &report.size_summary)),
        ("Scores by School Type", bucket_table("School Type", &report.type_summary)),
    ];

    for (i, (title, table)) in sections.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        writeln!(out, "{title}")?;
        table.render(&mut out)?;
    }

    Ok(())
}

struct TextTable {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    fn render<W: Write>(&self, out: &mut W) -> Result<()> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.len()).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let line = |cells: Vec<&str>| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, &w)| format!("{cell:>w$}"))
                .collect::<Vec<_>>()
                .join("  ")
        };

        writeln!(out, "{}", line(self.headers.clone()))?;
        for row in &self.rows {
            writeln!(out, "{}", line(row.iter().map(String::as_str).collect()))?;
        }
        Ok(())
    }
}

fn school_table(schools: &[SchoolSummary]) -> TextTable {
    TextTable {
        headers: vec![
            "School Name",
            "School Type",
            "Total Students",
            "Total School Budget",
            "Per Student Budget",
            "Average Math Score",
            "Average Reading Score",
            "% Passing Math",
            "% Passing Reading",
            "% Overall Passing",
        ],
        rows: schools
            .iter()
            .map(|s| {
                vec![
                    s.school_name.clone(),
                    s.school_type.clone().unwrap_or_else(|| "-".to_string()),
                    s.total_students.to_string(),
                    money(s.total_budget),
                    money(s.per_student_budget),
                    number(Some(s.avg_math_score)),
                    number(Some(s.avg_reading_score)),
                    number(Some(s.pct_passing_math)),
                    number(Some(s.pct_passing_reading)),
                    number(Some(s.pct_overall_passing)),
                ]
            })
            .collect(),
    }
}

fn grade_table(grades: &[GradeScores]) -> TextTable {
    TextTable {
        headers: vec!["School Name", "9th", "10th", "11th", "12th"],
        rows: grades
            .iter()
            .map(|g| {
                vec![
                    g.school_name.clone(),
                    number(g.ninth),
                    number(g.tenth),
                    number(g.eleventh),
                    number(g.twelfth),
                ]
            })
            .collect(),
    }
}

fn bucket_table(bucket_header: &'static str, buckets: &[BucketSummary]) -> TextTable {
    TextTable {
        headers: vec![
            bucket_header,
            "Schools",
            "Average Math Score",
            "Average Reading Score",
            "% Passing Math",
            "% Passing Reading",
            "% Overall Passing",
        ],
        rows: buckets
            .iter()
            .map(|b| {
                vec![
                    b.bucket.clone(),
                    b.school_count.to_string(),
                    number(b.avg_math_score),
                    number(b.avg_reading_score),
                    number(b.pct_passing_math),
                    number(b.pct_passing_reading),
                    number(b.pct_overall_passing),
                ]
            })
            .collect(),
    }
}

fn number(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn money(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("${v:.2}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::DistrictSummary;
    use std::env;

    fn report() -> DistrictReport {
        let school = SchoolSummary {
            school_name: "Huang High School".to_string(),
            school_type: Some("District".to_string()),
            total_students: 2917,
            total_budget: Some(1910635.0),
            per_student_budget: Some(655.0),
            avg_math_score: 76.63,
            avg_reading_score: 81.18,
            pct_passing_math: 65.68,
            pct_passing_reading: 81.32,
            pct_overall_passing: 53.51,
        };
        DistrictReport {
            district: DistrictSummary {
                total_schools: 1,
                total_students: 2917,
                total_budget: 1910635.0,
                avg_math_score: 76.63,
                avg_reading_score: 81.18,
                pct_passing_math: 65.68,
                pct_passing_reading: 81.32,
                pct_overall_passing: 53.51,
            },
            schools: vec![school.clone()],
            top_schools: vec![school.clone()],
            bottom_schools: vec![school],
            math_by_grade: vec![GradeScores {
                school_name: "Huang High School".to_string(),
                ninth: Some(77.03),
                tenth: None,
                eleventh: Some(76.45),
                twelfth: Some(77.23),
            }],
            reading_by_grade: vec![],
            spending_summary: vec![],
            size_summary: vec![],
            type_summary: vec![],
        }
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&report());
    }

    #[test]
    fn test_write_json_round_trips_as_value() {
        let mut buf = Vec::new();
        write_json(&mut buf, &report()).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["district"]["total_students"], 2917);
        assert_eq!(value["math_by_grade"][0]["10th"], serde_json::Value::Null);
    }

    #[test]
    fn test_write_csv_leaves_missing_cells_empty() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &report().math_by_grade).unwrap();

        let content = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "school_name,9th,10th,11th,12th");
        assert_eq!(lines[1], "Huang High School,77.03,,76.45,77.23");
    }

    #[test]
    fn test_write_text_contains_every_section() {
        let mut buf = Vec::new();
        write_text(&mut buf, &report()).unwrap();

        let content = String::from_utf8(buf).unwrap();
        for (title, _) in TABLE_FILES {
            assert!(content.contains(title), "missing section {title}");
        }
        assert!(content.contains("$1910635.00"));
    }

    #[test]
    fn test_write_all_csv_has_titles() {
        let mut buf = Vec::new();
        write_all_csv(&mut buf, &report()).unwrap();

        let content = String::from_utf8(buf).unwrap();
        let titles = content.lines().filter(|l| l.starts_with("# ")).count();
        assert_eq!(titles, TABLE_FILES.len());
    }

    #[test]
    fn test_export_tables_writes_every_file() {
        let dir = env::temp_dir().join("district_report_test_export");
        let _ = fs::remove_dir_all(&dir);

        let written = export_tables(&dir, &report()).unwrap();

        assert_eq!(written.len(), TABLE_FILES.len() + 1);
        for path in &written {
            assert!(path.exists(), "{} not written", path.display());
        }
        let json = fs::read_to_string(dir.join("report.json")).unwrap();
        assert!(json.contains("generated_at"));

        fs::remove_dir_all(&dir).unwrap();
    }
}
