//! Local reminder planning for course and assessment dates.
//!
//! # Responsibility
//! - Derive deterministic notification ids from entity identity.
//! - Decide schedule vs cancel from alert flags and fire times, and hand the
//!   result to an external [`NotificationScheduler`].
//!
//! # Invariants
//! - Re-planning the same logical alert always reuses the same id, so a
//!   platform scheduler overwrites instead of duplicating.
//! - Fire times at or before `now` are cancelled, never scheduled.
//! - Assessment ids also depend on type, so syncing cancels the other type's
//!   ids and cancelling clears all four.
//! - Log lines carry ids only; titles stay out of logs.

use crate::model::assessment::{Assessment, AssessmentId, AssessmentType};
use crate::model::course::{Course, CourseId};
use crate::service::planner_service::CascadeSummary;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::debug;

const COURSE_BAND: i64 = 50_000;
const PERFORMANCE_START_BAND: i64 = 1_000_000;
const PERFORMANCE_DUE_BAND: i64 = 1_100_000;
const OBJECTIVE_START_BAND: i64 = 1_200_000;
const OBJECTIVE_DUE_BAND: i64 = 1_300_000;

/// Local hour at which date-based alerts fire.
pub const ALERT_HOUR: u32 = 9;

/// Platform notification boundary. Delivery is fire-and-forget.
pub trait NotificationScheduler {
    fn schedule(&mut self, id: i64, title: &str, body: &str, fire_at: NaiveDateTime);
    fn cancel(&mut self, id: i64);
}

/// Which edge of an entity's date range an alert belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertEdge {
    Start,
    End,
}

pub fn course_alert_id(course_id: CourseId, edge: AlertEdge) -> i64 {
    match edge {
        AlertEdge::Start => COURSE_BAND + course_id * 2,
        AlertEdge::End => COURSE_BAND + 1 + course_id * 2,
    }
}

pub fn assessment_alert_id(id: AssessmentId, kind: AssessmentType, edge: AlertEdge) -> i64 {
    let band = match (kind, edge) {
        (AssessmentType::Performance, AlertEdge::Start) => PERFORMANCE_START_BAND,
        (AssessmentType::Performance, AlertEdge::End) => PERFORMANCE_DUE_BAND,
        (AssessmentType::Objective, AlertEdge::Start) => OBJECTIVE_START_BAND,
        (AssessmentType::Objective, AlertEdge::End) => OBJECTIVE_DUE_BAND,
    };
    band + id
}

/// Local fire time for a date-based alert.
pub fn fire_time(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(ALERT_HOUR, 0, 0).unwrap_or(NaiveTime::MIN))
}

/// Schedules or cancels both course alerts. Unsaved courses are skipped.
pub fn sync_course_alerts(
    scheduler: &mut dyn NotificationScheduler,
    course: &Course,
    now: NaiveDateTime,
) {
    let Some(id) = course.id else {
        return;
    };
    schedule_or_cancel(
        scheduler,
        course_alert_id(id, AlertEdge::Start),
        course.start_alert_enabled.then_some(course.start_date),
        "Course starts",
        &format!("{} starts today.", course.title),
        now,
    );
    schedule_or_cancel(
        scheduler,
        course_alert_id(id, AlertEdge::End),
        course.end_alert_enabled.then_some(course.end_date),
        "Course ends",
        &format!("{} ends today.", course.title),
        now,
    );
}

/// Schedules or cancels both assessment alerts. Unsaved assessments are
/// skipped; an unset due date cancels the due alert. Ids left over from a
/// previous type are cancelled.
pub fn sync_assessment_alerts(
    scheduler: &mut dyn NotificationScheduler,
    assessment: &Assessment,
    now: NaiveDateTime,
) {
    let Some(id) = assessment.id else {
        return;
    };
    schedule_or_cancel(
        scheduler,
        assessment_alert_id(id, assessment.kind, AlertEdge::Start),
        assessment
            .start_alert_enabled
            .then_some(assessment.start_date),
        "Assessment starts",
        &format!("{} starts today.", assessment.title),
        now,
    );
    schedule_or_cancel(
        scheduler,
        assessment_alert_id(id, assessment.kind, AlertEdge::End),
        assessment
            .due_date
            .filter(|_| assessment.end_alert_enabled),
        "Assessment due",
        &format!("{} is due today.", assessment.title),
        now,
    );
    let stale = other_kind(assessment.kind);
    scheduler.cancel(assessment_alert_id(id, stale, AlertEdge::Start));
    scheduler.cancel(assessment_alert_id(id, stale, AlertEdge::End));
}

pub fn cancel_course_alerts(scheduler: &mut dyn NotificationScheduler, course_id: CourseId) {
    scheduler.cancel(course_alert_id(course_id, AlertEdge::Start));
    scheduler.cancel(course_alert_id(course_id, AlertEdge::End));
}

/// Cancels the start and due ids of both assessment types.
pub fn cancel_assessment_alerts(scheduler: &mut dyn NotificationScheduler, id: AssessmentId) {
    for kind in [AssessmentType::Performance, AssessmentType::Objective] {
        scheduler.cancel(assessment_alert_id(id, kind, AlertEdge::Start));
        scheduler.cancel(assessment_alert_id(id, kind, AlertEdge::End));
    }
}

/// Cancels every alert that belonged to rows removed by a cascade.
pub fn cancel_cascade_alerts(scheduler: &mut dyn NotificationScheduler, summary: &CascadeSummary) {
    for course_id in &summary.course_ids {
        cancel_course_alerts(scheduler, *course_id);
    }
    for (id, _) in &summary.assessments {
        cancel_assessment_alerts(scheduler, *id);
    }
    debug!(
        "event=alert_cancel module=alerts status=ok courses={} assessments={}",
        summary.course_ids.len(),
        summary.assessments.len()
    );
}

fn other_kind(kind: AssessmentType) -> AssessmentType {
    match kind {
        AssessmentType::Performance => AssessmentType::Objective,
        AssessmentType::Objective => AssessmentType::Performance,
    }
}

fn schedule_or_cancel(
    scheduler: &mut dyn NotificationScheduler,
    id: i64,
    date: Option<NaiveDate>,
    title: &str,
    body: &str,
    now: NaiveDateTime,
) {
    match date.map(fire_time) {
        Some(fire_at) if fire_at > now => {
            scheduler.schedule(id, title, body, fire_at);
            debug!("event=alert_schedule module=alerts status=ok id={id} fire_at={fire_at}");
        }
        _ => {
            scheduler.cancel(id);
            debug!("event=alert_schedule module=alerts status=cancelled id={id}");
        }
    }
}
