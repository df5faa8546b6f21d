//! Spreadsheet job routes (e.g., /api/v1/sheet/*)

use axum::{routing::post, Router};

use crate::api::controller::sheet::SheetController;
use crate::app_state::AppState;

pub fn sheet_routes() -> Router<AppState> {
    Router::new()
        .route("/generate", post(SheetController::generate_sheet))
}
