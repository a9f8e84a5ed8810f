//! core
//!
//! Process-wide concerns shared by every layer.
//!
//! # Modules
//!
//! - [`config`] - Configuration schema and loading

pub mod config;
