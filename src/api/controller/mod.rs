pub mod extract;
pub mod sheet;
