use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use validator::Validate;

use crate::{
    middleware::auth::AuthContext,
    models::course::{Course, CourseResponse, CreateCourseRequest, GradeResponse, RosterEntry},
    services::{enrollment::EnrollmentEngine, policy::Action},
    utils::errors::AppError,
    AppState,
};

pub async fn list_courses(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<CourseResponse>>, AppError> {
    auth.authorize(Action::ListCourses)?;

    let courses = state.store.courses.find_all()?;
    Ok(Json(courses.into_iter().map(Into::into).collect()))
}

pub async fn create_course(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<CourseResponse>), AppError> {
    auth.authorize(Action::CreateCourse)?;
    payload.validate()?;

    let course = Course::new(payload.name, payload.teacher, payload.course_unit);
    state
        .store
        .courses
        .insert_one(course.id.clone(), course.clone())?;
    Ok((StatusCode::CREATED, Json(course.into())))
}

pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    auth: AuthContext,
) -> Result<Json<CourseResponse>, AppError> {
    auth.authorize(Action::ViewCourse)?;

    let course = state
        .store
        .courses
        .find_by_id(&course_id)?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;
    Ok(Json(course.into()))
}

pub async fn course_roster(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    auth: AuthContext,
) -> Result<Json<Vec<RosterEntry>>, AppError> {
    auth.authorize(Action::ViewRoster)?;

    let course = state
        .store
        .courses
        .find_by_id(&course_id)?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;
    Ok(Json(course.students))
}

pub async fn student_grade(
    State(state): State<AppState>,
    Path((course_id, student_id)): Path<(String, String)>,
    auth: AuthContext,
) -> Result<Json<GradeResponse>, AppError> {
    auth.authorize(Action::ViewStudentGrade {
        student_id: &student_id,
    })?;

    let engine = EnrollmentEngine::new(state.store.clone());
    let score = engine.student_grade_in_course(&course_id, &student_id)?;
    Ok(Json(GradeResponse { score }))
}
