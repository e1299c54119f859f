//! Generic grid support: result normalization and pagination

pub mod normalize;
pub mod pagination;

pub use normalize::{is_homogeneous, normalize, normalize_opt, NormalizedResult};
pub use pagination::{showing_range, slice, total_pages, Pager, DEFAULT_PAGE_SIZE};
