//! HTTP API module for the Reimbursement Engine.
//!
//! This module provides the REST endpoints for scoring single trips and
//! batches of trips under the loaded policy.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{BatchRequest, TripRequest};
pub use response::{
    ApiError, ApiErrorResponse, BatchEntry, BatchResponse, CalculationResponse, ENGINE_VERSION,
};
pub use state::AppState;
