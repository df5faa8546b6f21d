pub mod extract;
pub mod metric;
pub mod sheet;
