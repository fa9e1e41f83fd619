//! NutriMind Tools module
//!
//! MCP tool implementations for NutriMind.

pub mod dashboard;
pub mod foods;
pub mod plans;
pub mod reports;
pub mod status;
