pub mod headers;
pub mod interactions;
pub mod reorder;
pub mod select;
