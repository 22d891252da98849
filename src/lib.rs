pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{
    handlers::{auth, courses, students},
    services::tokens::TokenService,
    store::Store,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(store: Arc<Store>, jwt_secret: &str) -> Self {
        let tokens = Arc::new(TokenService::new(store.clone(), jwt_secret));
        Self { store, tokens }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route(
            "/courses/",
            get(courses::list_courses).post(courses::create_course),
        )
        .route("/courses/:course_id", get(courses::get_course))
        .route(
            "/courses/:course_id/student_list",
            get(courses::course_roster),
        )
        .route(
            "/courses/:course_id/:student_id/student_grades",
            get(courses::student_grade),
        )
        .route(
            "/students/",
            get(students::list_students).post(auth::admin_signup),
        )
        .route("/students/create_students", post(auth::create_student))
        .route("/students/login", post(auth::login))
        .route("/students/logout", post(auth::logout))
        .route(
            "/students/:student_id",
            get(students::get_student)
                .put(students::update_student)
                .delete(students::delete_student),
        )
        .route(
            "/students/register_course/:course_id/:student_id",
            put(students::register_course),
        )
        .route(
            "/students/record_grade/:course_id/:student_id",
            post(students::record_grade),
        )
        .with_state(state)
}
