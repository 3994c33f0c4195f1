//! Input sanitization and validation for planner entities.
//!
//! # Responsibility
//! - Produce a cleaned copy of caller input plus ordered user-facing errors.
//! - Stay pure: no storage access, no mutation of the input.
//!
//! # Invariants
//! - Date ranges use a strict rule: an end date equal to the start is rejected.
//! - Error messages are stable strings; callers display them verbatim.

use crate::model::assessment::Assessment;
use crate::model::course::Course;
use crate::model::term::Term;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EXTRA_WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s{2,}").expect("valid whitespace regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

const PHONE_MIN_DIGITS: usize = 10;
const PHONE_MAX_DIGITS: usize = 15;

/// Validation failure carrying every message in check order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub messages: Vec<String>,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.messages.join(" "))
    }
}

impl Error for ValidationError {}

/// Sanitized value plus the errors found while checking it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated<T> {
    pub value: T,
    pub errors: Vec<String>,
}

impl<T> Validated<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            errors: Vec::new(),
        }
    }

    fn reject(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the sanitized value, or every collected message as one error.
    pub fn into_result(self) -> Result<T, ValidationError> {
        if self.errors.is_empty() {
            Ok(self.value)
        } else {
            Err(ValidationError {
                messages: self.errors,
            })
        }
    }
}

/// Trims and collapses runs of two or more whitespace characters to one space.
///
/// `None` and whitespace-only input become the empty string.
pub fn clean(value: Option<&str>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    EXTRA_WHITESPACE_RE.replace_all(trimmed, " ").into_owned()
}

/// Checks a simple `local@domain.tld` shape. Empty input is invalid.
pub fn looks_like_email(value: &str) -> bool {
    !value.is_empty() && EMAIL_RE.is_match(value)
}

/// Checks that the value carries 10 to 15 digits, ignoring other characters.
/// Empty input is invalid.
pub fn looks_like_phone(value: &str) -> bool {
    if value.trim().is_empty() {
        return false;
    }
    let digits = value.chars().filter(char::is_ascii_digit).count();
    (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits)
}

pub fn validate_term(input: &Term) -> Validated<Term> {
    let mut result = Validated::new(Term {
        id: input.id,
        title: clean(Some(&input.title)),
        start_date: input.start_date,
        end_date: input.end_date,
    });

    if result.value.title.is_empty() {
        result.reject("Term title is required.");
    }
    if !ends_after(result.value.start_date, result.value.end_date) {
        result.reject("Term end date must be after start date.");
    }

    result
}

pub fn validate_course(input: &Course) -> Validated<Course> {
    let mut result = Validated::new(Course {
        id: input.id,
        term_id: input.term_id,
        title: clean(Some(&input.title)),
        start_date: input.start_date,
        end_date: input.end_date,
        status: input.status,
        instructor_name: clean(Some(&input.instructor_name)),
        instructor_phone: clean(Some(&input.instructor_phone)),
        instructor_email: clean(Some(&input.instructor_email)),
        notes: input.notes.trim().to_string(),
        start_alert_enabled: input.start_alert_enabled,
        end_alert_enabled: input.end_alert_enabled,
    });

    let course = &result.value;
    let title_missing = course.title.is_empty();
    let range_invalid = !ends_after(course.start_date, course.end_date);
    let email_invalid =
        !course.instructor_email.is_empty() && !looks_like_email(&course.instructor_email);
    let phone_invalid =
        !course.instructor_phone.is_empty() && !looks_like_phone(&course.instructor_phone);

    if title_missing {
        result.reject("Course title is required.");
    }
    if range_invalid {
        result.reject("Course end date must be after start date.");
    }
    if email_invalid {
        result.reject("Instructor email must look like name@domain.tld.");
    }
    if phone_invalid {
        result.reject("Instructor phone must contain 10-15 digits.");
    }

    result
}

pub fn validate_assessment(input: &Assessment) -> Validated<Assessment> {
    let mut result = Validated::new(Assessment {
        title: clean(Some(&input.title)),
        ..input.clone()
    });

    if result.value.title.is_empty() {
        result.reject("Assessment title is required.");
    }
    if result.value.due_date.is_none() {
        result.reject("Assessment due date is required.");
    }

    result
}

/// Reports the first course that no longer fits inside `term`'s dates.
pub fn check_courses_within_term(term: &Term, courses: &[Course]) -> Vec<String> {
    courses
        .iter()
        .find(|course| course.start_date < term.start_date || course.end_date > term.end_date)
        .map(|course| {
            vec![format!(
                "Course '{}' falls outside the new term dates.",
                course.title
            )]
        })
        .unwrap_or_default()
}

/// Checks an inclusive report window.
pub fn validate_report_range(from: NaiveDate, to: NaiveDate) -> Result<(), ValidationError> {
    if to < from {
        return Err(ValidationError {
            messages: vec!["Report end date must not be before start date.".to_string()],
        });
    }
    Ok(())
}

fn ends_after(start: NaiveDate, end: NaiveDate) -> bool {
    end > start
}
