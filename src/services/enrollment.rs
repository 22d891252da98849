use std::sync::Arc;

use thiserror::Error;

use crate::models::course::{Course, RosterEntry};
use crate::models::user::{Enrollment, User};
use crate::store::{Store, StoreError};
use crate::utils::logger::LOGGER;

#[derive(Debug, Error)]
pub enum EnrollmentError {
    #[error("course not found")]
    CourseNotFound,
    #[error("student not found")]
    StudentNotFound,
    #[error("student is not registered to the course")]
    NotRegistered,
    #[error("student has no enrolled course units")]
    NoEnrollments,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Enrollment and grading over the student and course collections.
///
/// Every enrollment exists twice: as an `Enrollment` on the student and
/// as a `RosterEntry` on the course. The two writes that keep them in
/// step are independent document updates; there is no atomicity across
/// collections, so a crash between them can leave the copies out of
/// sync. A concurrent register/grade race on the same pair is likewise
/// possible and accepted (see DESIGN.md).
pub struct EnrollmentEngine {
    store: Arc<Store>,
}

impl EnrollmentEngine {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Registers a student to a course on both documents with set-union
    /// semantics: registering the same pair again changes nothing.
    pub fn register_course(
        &self,
        student_id: &str,
        course_id: &str,
    ) -> Result<Course, EnrollmentError> {
        let course = self
            .store
            .courses
            .find_by_id(course_id)?
            .ok_or(EnrollmentError::CourseNotFound)?;
        let student = self
            .store
            .students
            .find_by_id(student_id)?
            .ok_or(EnrollmentError::StudentNotFound)?;

        self.store.students.update_one(
            |u| u.id == student_id,
            |u| {
                if !u.courses.iter().any(|e| e.course_id == course.id) {
                    u.courses.push(Enrollment {
                        course_id: course.id.clone(),
                        name: course.name.clone(),
                        teacher: course.teacher.clone(),
                        score: 0,
                        course_unit: course.course_unit,
                    });
                }
            },
        )?;

        self.store.courses.update_one(
            |c| c.id == course_id,
            |c| {
                if !c.students.iter().any(|r| r.student_id == student.id) {
                    c.students.push(RosterEntry {
                        student_id: student.id.clone(),
                        name: student.name.clone(),
                        email: student.email.clone(),
                        score: None,
                    });
                }
            },
        )?;

        LOGGER.log_business_event(
            "course_registered",
            Some(student_id),
            [(
                "course_id".to_string(),
                serde_json::Value::String(course_id.to_string()),
            )]
            .into_iter()
            .collect(),
        );

        Ok(course)
    }

    /// Records a score on both copies and recomputes the GPA from
    /// scratch over all of the student's enrollments. An enrollment that
    /// was never graded keeps score 0 in the numerator while its units
    /// still count in the denominator.
    pub fn record_grade(
        &self,
        student_id: &str,
        course_id: &str,
        score: i32,
    ) -> Result<User, EnrollmentError> {
        let student = self
            .store
            .students
            .find_by_id(student_id)?
            .ok_or(EnrollmentError::StudentNotFound)?;
        self.store
            .courses
            .find_by_id(course_id)?
            .ok_or(EnrollmentError::CourseNotFound)?;

        let total_units: u32 = student.courses.iter().map(|e| e.course_unit).sum();
        if total_units == 0 {
            return Err(EnrollmentError::NoEnrollments);
        }

        if !student.courses.iter().any(|e| e.course_id == course_id) {
            // Matches the historical behavior: the student-side score is
            // silently skipped when the enrollment entry is missing.
            tracing::warn!(
                student_id,
                course_id,
                "grade not recorded on student side: no matching enrollment entry"
            );
        }

        let updated = self
            .store
            .students
            .update_one(
                |u| u.id == student_id,
                |u| {
                    if let Some(entry) = u.courses.iter_mut().find(|e| e.course_id == course_id) {
                        entry.score = score;
                    }
                    let units: u32 = u.courses.iter().map(|e| e.course_unit).sum();
                    if units > 0 {
                        let weighted: i64 = u
                            .courses
                            .iter()
                            .map(|e| i64::from(e.score) * i64::from(e.course_unit))
                            .sum();
                        u.gpa = Some(weighted as f64 / f64::from(units));
                    }
                },
            )?
            .ok_or(EnrollmentError::StudentNotFound)?;

        self.store.courses.update_one(
            |c| c.id == course_id,
            |c| {
                if let Some(entry) = c.students.iter_mut().find(|r| r.student_id == student_id) {
                    entry.score = Some(score);
                }
            },
        )?;

        LOGGER.log_business_event(
            "grade_recorded",
            Some(student_id),
            [
                (
                    "course_id".to_string(),
                    serde_json::Value::String(course_id.to_string()),
                ),
                (
                    "score".to_string(),
                    serde_json::Value::Number(score.into()),
                ),
            ]
            .into_iter()
            .collect(),
        );

        Ok(updated)
    }

    /// A student's recorded score in a course, read from the course-side
    /// roster. Registered-but-ungraded reads as 0.
    pub fn student_grade_in_course(
        &self,
        course_id: &str,
        student_id: &str,
    ) -> Result<i32, EnrollmentError> {
        let course = self
            .store
            .courses
            .find_by_id(course_id)?
            .ok_or(EnrollmentError::CourseNotFound)?;
        let entry = course
            .students
            .iter()
            .find(|r| r.student_id == student_id)
            .ok_or(EnrollmentError::NotRegistered)?;
        Ok(entry.score.unwrap_or(0))
    }
}
