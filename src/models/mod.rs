//! Row-level data model shared by the grid and navigation pipelines

pub mod row;
pub mod value;

pub use row::RawRow;
pub use value::ScalarValue;
