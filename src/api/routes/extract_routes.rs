//! Extraction routes (e.g., /api/v1/extract/*)

use axum::{routing::get, Router};

use crate::api::controller::extract::ExtractController;
use crate::app_state::AppState;

pub fn extract_routes() -> Router<AppState> {
    Router::new()
        .route("/getdata", get(ExtractController::get_data))
}
