use axum::{http::StatusCode, response::IntoResponse, response::Response, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::breakdown::{analyze_course, CourseBreakdown};
use super::domain::{AssignmentId, CourseGrades};
use super::error::GradingError;
use super::solver::solve_target_score;
use super::what_if::{what_if, WhatIfScenario};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatIfRequest {
    pub course: CourseGrades,
    #[serde(default)]
    pub scenario: WhatIfScenario,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetRequest {
    pub course: CourseGrades,
    pub assignment_id: AssignmentId,
    pub target_grade: f64,
}

/// Router exposing the grade analysis operations over HTTP.
pub fn grading_router() -> Router {
    Router::new()
        .route("/api/v1/grades/breakdown", post(breakdown_handler))
        .route("/api/v1/grades/what-if", post(what_if_handler))
        .route("/api/v1/grades/target", post(target_handler))
}

pub(crate) async fn breakdown_handler(Json(course): Json<CourseGrades>) -> Json<CourseBreakdown> {
    Json(analyze_course(&course))
}

pub(crate) async fn what_if_handler(Json(request): Json<WhatIfRequest>) -> Response {
    match what_if(&request.course, &request.scenario) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(error) => rejection(error),
    }
}

pub(crate) async fn target_handler(Json(request): Json<TargetRequest>) -> Response {
    match solve_target_score(&request.course, request.target_grade, request.assignment_id) {
        Ok(solution) => (StatusCode::OK, Json(solution)).into_response(),
        Err(error) => rejection(error),
    }
}

fn rejection(error: GradingError) -> Response {
    debug!(%error, "rejected grading request");
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
}
