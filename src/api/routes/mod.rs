//! API route declarations (e.g., /api/v1/*)

pub mod extract_routes;
pub mod sheet_routes;
