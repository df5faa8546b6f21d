pub mod ga;
pub mod ga4;
