//! Nutrition engine errors

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the dataset loader and the food matcher
#[derive(Debug, Error)]
pub enum NutritionError {
    #[error("Failed to read nutrition data at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed nutrition data file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("No nutrition data files found in {0}")]
    NoDataFiles(PathBuf),

    #[error("Nutrition data file {0} has no 'food' column")]
    MissingFoodColumn(PathBuf),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl NutritionError {
    /// True for failures reading or parsing the source files
    pub fn is_data_load(&self) -> bool {
        matches!(
            self,
            NutritionError::Io { .. } | NutritionError::Malformed { .. } | NutritionError::NoDataFiles(_)
        )
    }

    /// True when a source file does not follow the expected column schema
    pub fn is_schema(&self) -> bool {
        matches!(self, NutritionError::MissingFoodColumn(_))
    }
}

/// Result type for nutrition engine operations
pub type NutritionResult<T> = Result<T, NutritionError>;
