//! Extraction controller: validates `/getdata` queries and runs the fan-out

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use tracing::debug;
use validator::Validate;

use crate::api::dto::get_data_query_dto::GetDataQueryDto;
use crate::app_state::AppState;
use crate::domain::metric::model::Metric;
use crate::errors::AppError;

pub struct ExtractController;

impl ExtractController {
    /// Responds with the bare metric array; partial source failures only
    /// show up in the service logs.
    pub async fn get_data(
        State(state): State<AppState>,
        query: Result<Query<GetDataQueryDto>, QueryRejection>,
    ) -> Result<Json<Vec<Metric>>, AppError> {
        let Query(q) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
        q.validate().map_err(|e| AppError::BadRequest(e.to_string()))?;

        let data = state
            .extract_service
            .get_data(
                &q.sources(),
                &q.metric_types(),
                &q.starts(),
                &q.ends(),
                &q.dimension_list(),
            )
            .await;

        debug!(count = data.len(), "getdata served");
        Ok(Json(data))
    }
}
