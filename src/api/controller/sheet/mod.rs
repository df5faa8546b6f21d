//! Spreadsheet controller: runs the monthly revenue sheet job

use axum::extract::State;
use axum::Json;

use crate::api::dto::ApiResponse;
use crate::api::util::json::to_json;
use crate::app_state::AppState;
use crate::domain::sheet::service::SheetReport;
use crate::errors::AppError;

pub struct SheetController;

impl SheetController {
    pub async fn generate_sheet(
        State(state): State<AppState>,
    ) -> Result<Json<ApiResponse<SheetReport>>, AppError> {
        to_json(state.sheet_service.generate_sheet().await)
    }
}
