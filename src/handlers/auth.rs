use axum::{extract::State, http::StatusCode, response::Json};
use validator::Validate;

use crate::{
    middleware::auth::AuthContext,
    models::user::{
        CreateStudentRequest, LoginRequest, MessageResponse, SignupRequest, StudentResponse,
        TokenResponse, UserRole,
    },
    services::{credentials::CredentialStore, policy::Action},
    utils::{errors::AppError, logger::LOGGER},
    AppState,
};

/// Bootstrap signup. Unauthenticated so the first admin can be created
/// on a fresh deployment; defaults to the admin role.
pub async fn admin_signup(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<StudentResponse>), AppError> {
    auth.authorize(Action::AdminSignup)?;
    payload.validate()?;

    let role = payload.role.unwrap_or(UserRole::Admin);
    let credentials = CredentialStore::new(state.store.clone());
    let user = credentials.create_user(&payload.name, &payload.email, &payload.password, role)?;

    LOGGER.log_business_event("user_signed_up", Some(&user.id), Default::default());
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn create_student(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(payload): Json<CreateStudentRequest>,
) -> Result<(StatusCode, Json<StudentResponse>), AppError> {
    auth.authorize(Action::CreateStudent)?;
    payload.validate()?;

    let credentials = CredentialStore::new(state.store.clone());
    let user = credentials.create_user(
        &payload.name,
        &payload.email,
        &payload.password,
        UserRole::Student,
    )?;

    LOGGER.log_business_event("student_created", Some(&user.id), Default::default());
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    payload.validate()?;

    let credentials = CredentialStore::new(state.store.clone());
    let user = credentials
        .find_by_email(&payload.email)?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    if !credentials.verify_password(&payload.password, &user.password_hash) {
        LOGGER.log_business_event("login_failed", Some(&user.id), Default::default());
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let token = state.tokens.issue(&user.id)?;
    LOGGER.log_business_event("login_succeeded", Some(&user.id), Default::default());
    Ok(Json(TokenResponse { token }))
}

/// Blacklists whatever token the header carries. The token does not
/// have to still validate; only its presence is required.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<MessageResponse>, AppError> {
    auth.authorize(Action::Logout)?;
    let token = auth.token.as_deref().ok_or(AppError::NoToken)?;

    state.tokens.revoke(token)?;
    LOGGER.log_business_event(
        "logout",
        auth.claims.as_ref().map(|c| c.user_id.as_str()),
        Default::default(),
    );
    Ok(Json(MessageResponse::new("Logged out")))
}
