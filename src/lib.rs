//! NutriMind Library
//!
//! Nutrition dataset matching, food logging and meal planning.

pub mod assistant;
pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;
