use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::extract::service::ExtractService;
use crate::domain::sheet::service::SheetService;

#[derive(Clone)]
pub struct AppState {
    pub extract_service: Arc<ExtractService>,
    pub sheet_service: Arc<SheetService>,
}

pub fn build_app_state(config: &AppConfig) -> AppState {
    app_state_with(config, Arc::new(ExtractService::from_config(config)))
}

/// State around a pre-built extraction service, used by tests and embedders.
pub fn app_state_with(config: &AppConfig, extract_service: Arc<ExtractService>) -> AppState {
    let sheet_service = Arc::new(SheetService::from_config(config, extract_service.clone()));

    AppState {
        extract_service,
        sheet_service,
    }
}
