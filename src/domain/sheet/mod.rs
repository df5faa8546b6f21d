pub mod grid;
pub mod monthly_dates;
pub mod service;
