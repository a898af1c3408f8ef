//! # ARLAB Common Library
//!
//! Shared code for the laboratory AR service:
//! - Laboratory catalogue and content models
//! - Database schema initialization
//! - Admin authentication primitives and API types
//! - Configuration loading
//! - Identifier generation

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod ids;
pub mod labs;

pub use db::models::{Asset, LabConfig};
pub use error::{Error, Result};
pub use labs::{LabKey, Laboratory};
