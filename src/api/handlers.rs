//! HTTP request handlers for the Reimbursement Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::calculate_reimbursement;
use crate::error::EngineResult;
use crate::models::{ReimbursementResult, TripInput};

use super::request::{BatchRequest, TripRequest};
use super::response::{
    ApiError, ApiErrorResponse, BatchEntry, BatchResponse, CalculationResponse, ENGINE_VERSION,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .route("/calculate/batch", post(batch_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

/// Maps a body extraction failure to an API error.
fn rejection_error(rejection: JsonRejection, correlation_id: Uuid) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    }
}

fn score(request: TripRequest, state: &AppState) -> EngineResult<ReimbursementResult> {
    let trip = TripInput::try_from(request)?;
    calculate_reimbursement(&trip, state.policy())
}

/// Handler for POST /calculate endpoint.
///
/// Accepts one trip and returns its reimbursement with the audit trace.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<TripRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing calculation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                rejection_error(rejection, correlation_id),
            );
        }
    };

    let start_time = Instant::now();
    match score(request, &state) {
        Ok(result) => {
            let duration_us = start_time.elapsed().as_micros() as u64;
            info!(
                correlation_id = %correlation_id,
                duration_days = result.input.duration_days,
                amount = %result.amount,
                duration_us,
                "Calculation completed successfully"
            );
            let response =
                CalculationResponse::new(&state.policy().policy().code, result, duration_us);
            json_response(StatusCode::OK, response)
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Calculation failed"
            );
            let api_error: ApiErrorResponse = err.into();
            json_response(api_error.status, api_error.error)
        }
    }
}

/// Handler for POST /calculate/batch endpoint.
///
/// Scores each trip independently. A rejected trip produces an error entry
/// and does not fail the rest of the batch.
async fn batch_handler(
    State(state): State<AppState>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                rejection_error(rejection, correlation_id),
            );
        }
    };
    info!(
        correlation_id = %correlation_id,
        trips = request.trips.len(),
        "Processing batch request"
    );

    let start_time = Instant::now();
    let results: Vec<BatchEntry> = request
        .trips
        .into_iter()
        .enumerate()
        .map(|(index, trip)| match score(trip, &state) {
            Ok(result) => BatchEntry::Ok { index, result },
            Err(err) => {
                warn!(
                    correlation_id = %correlation_id,
                    index,
                    error = %err,
                    "Batch trip rejected"
                );
                let api_error: ApiErrorResponse = err.into();
                BatchEntry::Error {
                    index,
                    error: api_error.error,
                }
            }
        })
        .collect();
    let duration_us = start_time.elapsed().as_micros() as u64;

    let succeeded = results
        .iter()
        .filter(|entry| matches!(entry, BatchEntry::Ok { .. }))
        .count();
    let failed = results.len() - succeeded;
    info!(
        correlation_id = %correlation_id,
        succeeded,
        failed,
        duration_us,
        "Batch completed"
    );

    json_response(
        StatusCode::OK,
        BatchResponse {
            batch_id: correlation_id,
            timestamp: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
            succeeded,
            failed,
            results,
            duration_us,
        },
    )
}
