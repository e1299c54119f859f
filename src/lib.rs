//! IPS portal backend
//!
//! A thin API over the IPS stored procedures: a generic ERM grid fed by
//! `ReadNewERM` and a two-level navigation menu synthesized from
//! `ReadNavigation`.

pub mod config;
pub mod erm;
pub mod error;
pub mod grid;
pub mod models;
pub mod navigation;

#[cfg(feature = "database")]
pub mod database;

#[cfg(feature = "server")]
pub mod api;

pub use config::{AppConfig, DatabaseConfig};
pub use error::{ConfigError, PortalError, Result};
