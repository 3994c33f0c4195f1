//! CSV builders for assessment reports.
//!
//! # Invariants
//! - Rows are filtered to the inclusive range and sorted by due date, then id.
//! - Assessments without a due date never appear in a report.
//! - Both builders quote through [`quote_field`], so quoting is identical.

use crate::model::assessment::Assessment;
use crate::model::course::Course;
use crate::model::term::Term;
use crate::report::ReportRange;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use std::collections::HashMap;
use std::fmt::Write;

/// Default title of the minimal export.
pub const DEFAULT_REPORT_TITLE: &str = "Upcoming Assessments Report";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Wraps a field in double quotes, doubling any inner quote.
pub fn quote_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Quotes a field only when it contains a comma, a double quote or a line
/// break.
pub fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        quote_field(value)
    } else {
        value.to_string()
    }
}

/// Builds the minimal five-column export.
///
/// The title column is always quoted.
pub fn build_assessment_csv(
    assessments: &[Assessment],
    range: &ReportRange,
    title: &str,
    generated_at: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    push_line(&mut out, &escape_field(title));
    push_line(
        &mut out,
        &format!("Generated: {} UTC", generated_at.format("%Y-%m-%d %H:%M")),
    );
    push_line(&mut out, &format!("Range: {}", range_text(range)));
    push_line(&mut out, "AssessmentId,Type,Title,StartDate,DueDate");

    for (assessment, due) in in_range_by_due_date(assessments, range) {
        push_line(
            &mut out,
            &format!(
                "{},{},{},{},{}",
                assessment.id.unwrap_or_default(),
                assessment.kind.code(),
                quote_field(&assessment.title),
                assessment.start_date.format(DATE_FORMAT),
                due.format(DATE_FORMAT)
            ),
        );
    }
    out
}

/// Builds the multi-column export with parent course and term resolved.
///
/// Unresolved parents leave their columns empty.
pub fn build_upcoming_report(
    assessments: &[Assessment],
    courses: &[Course],
    terms: &[Term],
    range: &ReportRange,
    generated_at: DateTime<Utc>,
) -> String {
    let courses_by_id: HashMap<i64, &Course> = courses
        .iter()
        .filter_map(|course| course.id.map(|id| (id, course)))
        .collect();
    let terms_by_id: HashMap<i64, &Term> = terms
        .iter()
        .filter_map(|term| term.id.map(|id| (id, term)))
        .collect();

    let mut out = String::new();
    push_line(&mut out, "Report Title,Upcoming Assessments");
    push_line(
        &mut out,
        &format!(
            "Generated (UTC),{}",
            generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
    );
    push_line(&mut out, &format!("Range,{}", range_text(range)));
    push_line(
        &mut out,
        "Assessment Title,Type,Due Date,Course,Course Status,Term,Term Start,Term End",
    );

    for (assessment, due) in in_range_by_due_date(assessments, range) {
        let course = courses_by_id.get(&assessment.course_id).copied();
        let term = course.and_then(|course| terms_by_id.get(&course.term_id).copied());

        push_line(
            &mut out,
            &format!(
                "{},{},{},{},{},{},{},{}",
                escape_field(&assessment.title),
                assessment.kind.code(),
                due.format(DATE_FORMAT),
                escape_field(course.map_or("", |course| course.title.as_str())),
                course.map_or("", |course| course.status.code()),
                escape_field(term.map_or("", |term| term.title.as_str())),
                optional_date(term.map(|term| term.start_date)),
                optional_date(term.map(|term| term.end_date)),
            ),
        );
    }
    out
}

fn in_range_by_due_date<'a>(
    assessments: &'a [Assessment],
    range: &ReportRange,
) -> Vec<(&'a Assessment, NaiveDate)> {
    let mut rows: Vec<(&Assessment, NaiveDate)> = assessments
        .iter()
        .filter_map(|assessment| assessment.due_date.map(|due| (assessment, due)))
        .filter(|(_, due)| range.contains(*due))
        .collect();
    rows.sort_by_key(|(assessment, due)| (*due, assessment.id));
    rows
}

fn range_text(range: &ReportRange) -> String {
    format!(
        "{} to {}",
        range.from.format(DATE_FORMAT),
        range.to.format(DATE_FORMAT)
    )
}

fn optional_date(date: Option<NaiveDate>) -> String {
    date.map(|date| date.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn push_line(out: &mut String, line: &str) {
    // Writing to a String cannot fail.
    let _ = writeln!(out, "{line}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::assessment::AssessmentType;
    use crate::model::course::CourseStatus;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn generated() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 8, 30, 0).unwrap()
    }

    fn assessment(id: i64, course_id: i64, title: &str, due: Option<NaiveDate>) -> Assessment {
        let mut assessment = Assessment::new(
            course_id,
            AssessmentType::Performance,
            title,
            date(2025, 2, 1),
            due,
        );
        assessment.id = Some(id);
        assessment
    }

    #[test]
    fn quoting_doubles_inner_quotes() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(quote_field("Perf A"), "\"Perf A\"");
    }

    #[test]
    fn minimal_export_matches_expected_lines() {
        let range = ReportRange::new(date(2025, 1, 1), date(2025, 12, 31));
        let csv = build_assessment_csv(
            &[assessment(1, 1, "Perf A", Some(date(2025, 2, 10)))],
            &range,
            DEFAULT_REPORT_TITLE,
            generated(),
        );

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Upcoming Assessments Report");
        assert_eq!(lines[1], "Generated: 2025-01-15 08:30 UTC");
        assert_eq!(lines[2], "Range: 2025-01-01 to 2025-12-31");
        assert!(lines.contains(&"AssessmentId,Type,Title,StartDate,DueDate"));
        assert!(lines.contains(&"1,Performance,\"Perf A\",2025-02-01,2025-02-10"));
    }

    #[test]
    fn range_is_inclusive_and_rows_sorted_by_due_date() {
        let range = ReportRange::new(date(2025, 3, 1), date(2025, 3, 31));
        let rows = [
            assessment(1, 1, "late", Some(date(2025, 3, 31))),
            assessment(2, 1, "outside", Some(date(2025, 4, 1))),
            assessment(3, 1, "early", Some(date(2025, 3, 1))),
            assessment(4, 1, "unset", None),
        ];

        let csv = build_assessment_csv(&rows, &range, "R", generated());
        let body: Vec<&str> = csv.lines().skip(4).collect();

        assert_eq!(body.len(), 2);
        assert!(body[0].starts_with("3,"));
        assert!(body[1].starts_with("1,"));
    }

    #[test]
    fn rich_report_resolves_parents_and_blanks_missing_ones() {
        let mut term = Term::new("Fall, 2025", date(2025, 1, 1), date(2025, 6, 1));
        term.id = Some(10);
        let mut course = Course::new(10, "CS 301", date(2025, 1, 2), date(2025, 5, 1));
        course.id = Some(20);
        course.status = CourseStatus::InProgress;
        let range = ReportRange::new(date(2025, 1, 1), date(2025, 12, 31));

        let csv = build_upcoming_report(
            &[
                assessment(1, 20, "Lab \"1\"", Some(date(2025, 2, 10))),
                assessment(2, 99, "Orphan", Some(date(2025, 2, 11))),
            ],
            &[course],
            &[term],
            &range,
            generated(),
        );
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Report Title,Upcoming Assessments");
        assert_eq!(lines[1], "Generated (UTC),2025-01-15T08:30:00Z");
        assert_eq!(lines[2], "Range,2025-01-01 to 2025-12-31");
        assert_eq!(
            lines[4],
            "\"Lab \"\"1\"\"\",Performance,2025-02-10,CS 301,InProgress,\"Fall, 2025\",2025-01-01,2025-06-01"
        );
        assert_eq!(lines[5], "Orphan,Performance,2025-02-11,,,,,");
    }
}
