//! Hydration model
//!
//! Glasses of water per day.

use rusqlite::{Connection, OptionalExtension};

use crate::db::DbResult;

pub struct Hydration;

impl Hydration {
    /// Add one glass for a date, returning the new count
    pub fn add_glass(conn: &Connection, log_date: &str) -> DbResult<i64> {
        let glasses = conn.query_row(
            r#"
            INSERT INTO hydration_logs (log_date, glasses) VALUES (?1, 1)
            ON CONFLICT(log_date) DO UPDATE SET glasses = glasses + 1
            RETURNING glasses
            "#,
            [log_date],
            |row| row.get(0),
        )?;
        Ok(glasses)
    }

    /// Glasses logged for a date (0 if none)
    pub fn glasses(conn: &Connection, log_date: &str) -> DbResult<i64> {
        let glasses = conn
            .query_row(
                "SELECT glasses FROM hydration_logs WHERE log_date = ?1",
                [log_date],
                |row| row.get(0),
            )
            .optional()?;
        Ok(glasses.unwrap_or(0))
    }
}
