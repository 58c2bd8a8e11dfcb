//! Beta feedback API endpoints.
//!
//! Accepts feedback submissions from library apps and files them as
//! issues in the configured tracker. A hidden `website` field acts as a
//! honeypot: bots that fill it get a fake success and nothing is filed.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, AppState};
use crate::tickets::FeedbackContext;
use crate::validation::{error_message, validate_feedback};

/// Routes for feedback submission.
pub fn feedback_routes() -> Router<AppState> {
    Router::new()
        .route("/api/feedback", post(submit_feedback))
        .route("/api/feedback/health", get(feedback_health))
}

// ============================================================================
// Request / Response DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Feedback kind: "bug", "feature" or anything else for a plain task.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Honeypot. Real clients never send this.
    pub website: Option<String>,
    /// Environment details from the reporting app.
    #[serde(default)]
    pub context: FeedbackContext,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub success: bool,
    pub issue_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackHealthResponse {
    pub status: String,
    pub tickets_configured: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/feedback - file a feedback issue in the tracker.
async fn submit_feedback(
    State(state): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackResponse>), ApiError> {
    // Bots fill the honeypot; pretend it worked and drop the submission.
    if req.website.as_deref().is_some_and(|w| !w.trim().is_empty()) {
        tracing::warn!("feedback honeypot triggered, submission dropped");
        return Ok((
            StatusCode::OK,
            Json(FeedbackResponse {
                success: true,
                issue_key: "SPAM-0".to_string(),
                message: None,
            }),
        ));
    }

    let title = req.title.as_deref().unwrap_or_default().trim();
    let description = req.description.as_deref().unwrap_or_default().trim();
    validate_feedback(title, description).map_err(|e| ApiError::Validation(error_message(&e)))?;

    let kind = req.kind.as_deref().unwrap_or("bug");
    let issue_key = state
        .tickets
        .create_issue(kind, title, description, &req.context)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(FeedbackResponse {
            success: true,
            issue_key,
            message: Some("Thank you for your feedback!".to_string()),
        }),
    ))
}

/// GET /api/feedback/health - whether the tracker integration is live.
async fn feedback_health(State(state): State<AppState>) -> Json<FeedbackHealthResponse> {
    Json(FeedbackHealthResponse {
        status: "ok".to_string(),
        tickets_configured: state.tickets.is_configured(),
    })
}
