//! Navigation tree synthesis
//!
//! `ReadNavigation` returns two flat sets: top-level modules and their
//! children. This module turns them into a two-level menu:
//!
//! - `types`: row shapes (`NavModule`, `NavChild`, `ObjNo`)
//! - `overrides`: FormID reconciliation table for the ERM subtree
//! - `synthesize`: the pure tree build
//! - `cell`: load-once cache with watch-based notification
//! - `source`: the fetch seam (`NavigationSource`)

pub mod cell;
pub mod overrides;
pub mod source;
pub mod synthesize;
pub mod types;

pub use cell::{NavigationCell, NavigationState, NavigationWatcher};
pub use overrides::{FormIdOverrideTable, DEFAULT_ERM_PARENT_OBJ_NO};
pub use source::{NavigationData, NavigationSource, READ_NAVIGATION};
pub use synthesize::{synthesize, MenuChild, MenuModule, NavigationTree};
pub use types::{NavChild, NavModule, NavRoute, ObjNo};
