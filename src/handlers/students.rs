use axum::{
    extract::{Path, State},
    response::Json,
};
use validator::Validate;

use crate::{
    middleware::auth::AuthContext,
    models::course::CourseResponse,
    models::user::{MessageResponse, ScoreRequest, StudentResponse, UpdateStudentRequest},
    services::{credentials::CredentialStore, enrollment::EnrollmentEngine, policy::Action},
    utils::{errors::AppError, logger::LOGGER},
    AppState,
};

pub async fn list_students(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<Vec<StudentResponse>>, AppError> {
    auth.authorize(Action::ListStudents)?;

    let students = state.store.students.find_all()?;
    Ok(Json(students.into_iter().map(Into::into).collect()))
}

pub async fn get_student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    auth: AuthContext,
) -> Result<Json<StudentResponse>, AppError> {
    auth.authorize(Action::ViewStudent {
        student_id: &student_id,
    })?;

    let credentials = CredentialStore::new(state.store.clone());
    let user = credentials
        .find_by_id(&student_id)?
        .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;
    Ok(Json(user.into()))
}

pub async fn update_student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    auth: AuthContext,
    Json(payload): Json<UpdateStudentRequest>,
) -> Result<Json<StudentResponse>, AppError> {
    auth.authorize(Action::UpdateStudent {
        student_id: &student_id,
    })?;
    payload.validate()?;

    let credentials = CredentialStore::new(state.store.clone());
    let user = credentials
        .update_profile(&student_id, payload.name, payload.email)?
        .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;
    Ok(Json(user.into()))
}

pub async fn delete_student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    auth: AuthContext,
) -> Result<Json<MessageResponse>, AppError> {
    auth.authorize(Action::DeleteStudent)?;

    let credentials = CredentialStore::new(state.store.clone());
    if !credentials.delete_user(&student_id)? {
        return Err(AppError::NotFound("Student not found".to_string()));
    }

    LOGGER.log_business_event("student_deleted", Some(&student_id), Default::default());
    Ok(Json(MessageResponse::new("Deleted")))
}

pub async fn register_course(
    State(state): State<AppState>,
    Path((course_id, student_id)): Path<(String, String)>,
    auth: AuthContext,
) -> Result<Json<CourseResponse>, AppError> {
    auth.authorize(Action::RegisterCourse {
        student_id: &student_id,
    })?;

    let engine = EnrollmentEngine::new(state.store.clone());
    let course = engine.register_course(&student_id, &course_id)?;
    Ok(Json(course.into()))
}

pub async fn record_grade(
    State(state): State<AppState>,
    Path((course_id, student_id)): Path<(String, String)>,
    auth: AuthContext,
    Json(payload): Json<ScoreRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    auth.authorize(Action::RecordGrade)?;

    let engine = EnrollmentEngine::new(state.store.clone());
    engine.record_grade(&student_id, &course_id, payload.score)?;
    Ok(Json(MessageResponse::new("Successfully recorded score")))
}
