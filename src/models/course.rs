use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One student as mirrored on a course document. `score` stays absent
/// until a grade is recorded for this student in this course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub student_id: String,
    pub name: String,
    pub email: String,
    pub score: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub teacher: String,
    pub course_unit: u32,
    pub students: Vec<RosterEntry>,
    pub created_at: DateTime<Utc>,
}

impl Course {
    pub fn new(name: impl Into<String>, teacher: impl Into<String>, course_unit: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            teacher: teacher.into(),
            course_unit,
            students: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub teacher: String,
    #[validate(range(min = 1))]
    pub course_unit: u32,
}

/// Course view without the roster; the roster has its own endpoint.
#[derive(Debug, Serialize)]
pub struct CourseResponse {
    pub id: String,
    pub name: String,
    pub teacher: String,
    pub course_unit: u32,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            name: course.name,
            teacher: course.teacher,
            course_unit: course.course_unit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GradeResponse {
    pub score: i32,
}
