// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{attempt, auth, category, exam, exam_result, question_paper, test_series, user},
    state::AppState,
};

/// Multipart uploads (question/answer papers) are capped at 10 MB.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, catalog, attempts, uploads).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (pool, config, delegate clients).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login));

    let category_routes = Router::new()
        .route(
            "/",
            post(category::create_category).get(category::list_categories),
        )
        .route(
            "/{id}",
            put(category::update_category).delete(category::delete_category),
        );

    let exam_routes = Router::new()
        .route("/", post(exam::create_exam).get(exam::list_exams))
        .route("/{id}", put(exam::update_exam).delete(exam::delete_exam));

    let test_series_routes = Router::new()
        .route(
            "/",
            post(test_series::create_series).get(test_series::list_series),
        )
        .route(
            "/{id}",
            get(test_series::get_series)
                .put(test_series::update_series)
                .delete(test_series::delete_series),
        )
        .route(
            "/{id}/questions",
            post(test_series::add_question).get(test_series::list_questions),
        )
        .route(
            "/{id}/questions/{question_id}",
            get(test_series::get_question)
                .put(test_series::update_question)
                .delete(test_series::delete_question),
        );

    let user_routes = Router::new()
        .route("/students", get(user::list_students))
        .route("/students/list", get(user::list_students_paginated))
        .route("/{id}", put(user::update_user).delete(user::delete_user))
        .route("/{user_id}/exams", get(user::user_exams));

    let exam_result_routes = Router::new()
        .route("/{user_id}", post(exam_result::record_result))
        .route("/{user_id}/results", get(exam_result::list_results))
        .route(
            "/{user_id}/{test_series_id}",
            get(exam_result::result_detail),
        );

    let question_paper_routes = Router::new().route(
        "/",
        post(question_paper::upload_question_paper)
            .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
    );

    let apply_routes = Router::new()
        .route("/apply-test", post(attempt::apply_test))
        .route("/submit-test", post(attempt::submit_test))
        .route(
            "/submit-answer-paper",
            post(attempt::submit_answer_paper)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/examinations", get(attempt::examinations))
        .route("/applied-tests-exams", get(attempt::applied_tests_exams))
        .route("/question-paper/{test_id}", get(attempt::question_paper));

    Router::new()
        .route("/", get(|| async { "Backend is Connected!" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/categories", category_routes)
        .nest("/api/exams", exam_routes)
        .nest("/api/test-series", test_series_routes)
        .nest("/api/user", user_routes)
        .nest("/api/examResult", exam_result_routes)
        .nest("/api/question-papers", question_paper_routes)
        .nest("/api/apply", apply_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
