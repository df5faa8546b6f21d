pub mod adapter;
pub mod date_range;
pub mod error;
pub mod service;
pub mod source_adapter;
