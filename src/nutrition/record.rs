//! Nutrition record schema
//!
//! The fixed nutrient columns of the dataset, the typed record built from a
//! source row, and the flat normalized mapping handed to callers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Generates the `Nutrients` struct and its column table from one list, so
/// the struct fields and the normalized column names never drift apart.
macro_rules! nutrient_schema {
    ($( $field:ident => $column:literal ),+ $(,)?) => {
        /// Every numeric nutrient column known to the dataset
        ///
        /// Values are always finite; anything missing or unparseable in the
        /// source is stored as 0.
        #[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
        pub struct Nutrients {
            $(
                #[serde(rename = $column, default)]
                pub $field: f64,
            )+
        }

        impl Nutrients {
            /// Normalized column names, in dataset order
            pub const COLUMNS: &'static [&'static str] = &[$($column),+];

            /// Get a nutrient by its normalized column name
            pub fn get(&self, column: &str) -> Option<f64> {
                match column {
                    $($column => Some(self.$field),)+
                    _ => None,
                }
            }

            /// Set a nutrient by its normalized column name
            ///
            /// Returns false if the column is not part of the schema.
            pub fn set(&mut self, column: &str, value: f64) -> bool {
                match column {
                    $($column => {
                        self.$field = value;
                        true
                    })+
                    _ => false,
                }
            }

            /// Iterate over (column, value) pairs in schema order
            pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
                [$(($column, self.$field)),+].into_iter()
            }
        }
    };
}

nutrient_schema! {
    caloric_value => "caloric value",
    fat => "fat",
    saturated_fats => "saturated fats",
    monounsaturated_fats => "monounsaturated fats",
    polyunsaturated_fats => "polyunsaturated fats",
    carbohydrates => "carbohydrates",
    sugars => "sugars",
    protein => "protein",
    dietary_fiber => "dietary fiber",
    cholesterol => "cholesterol",
    sodium => "sodium",
    water => "water",
    vitamin_a => "vitamin a",
    vitamin_b1 => "vitamin b1",
    vitamin_b11 => "vitamin b11",
    vitamin_b12 => "vitamin b12",
    vitamin_b2 => "vitamin b2",
    vitamin_b3 => "vitamin b3",
    vitamin_b5 => "vitamin b5",
    vitamin_b6 => "vitamin b6",
    vitamin_c => "vitamin c",
    vitamin_d => "vitamin d",
    vitamin_e => "vitamin e",
    vitamin_k => "vitamin k",
    calcium => "calcium",
    copper => "copper",
    iron => "iron",
    magnesium => "magnesium",
    manganese => "manganese",
    phosphorus => "phosphorus",
    potassium => "potassium",
    selenium => "selenium",
    zinc => "zinc",
    nutrition_density => "nutrition density",
}

/// Name of the column holding the canonical food name
pub const FOOD_COLUMN: &str = "food";

/// SQL column name for a normalized nutrient column ("caloric value" -> "caloric_value")
pub fn db_column(column: &str) -> String {
    column.replace(' ', "_")
}

/// Parse a cell of a known numeric column
///
/// Empty, NaN, infinite and non-numeric cells become 0.
pub fn parse_numeric(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Value of a column outside the fixed schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Coerce a raw cell: empty or NaN -> 0, numeric -> f64, otherwise text
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return FieldValue::Number(0.0);
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => FieldValue::Number(v),
            Ok(_) => FieldValue::Number(0.0),
            Err(_) => FieldValue::Text(trimmed.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(v) => Some(*v),
            FieldValue::Text(_) => None,
        }
    }
}

/// One row of the merged dataset
#[derive(Debug, Clone, PartialEq)]
pub struct NutritionRecord {
    /// Lowercase canonical name
    pub food: String,
    pub nutrients: Nutrients,
    /// Columns outside the fixed schema, keyed by normalized name
    pub extra: BTreeMap<String, FieldValue>,
}

impl NutritionRecord {
    /// Build the normalized mapping for this record
    ///
    /// `extra_columns` is the union of extra columns across all source files;
    /// columns this record's file did not have are emitted as 0.
    pub fn normalize(&self, extra_columns: &[String]) -> NormalizedFood {
        let extra = extra_columns
            .iter()
            .map(|column| {
                let value = self
                    .extra
                    .get(column)
                    .cloned()
                    .unwrap_or(FieldValue::Number(0.0));
                (column.clone(), value)
            })
            .collect();

        NormalizedFood {
            food: self.food.clone(),
            nutrients: self.nutrients,
            extra,
        }
    }
}

/// Flat, fixed-schema view of a matched record
///
/// Serializes as a single JSON object: `food`, every nutrient column, then any
/// extra columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedFood {
    pub food: String,
    #[serde(flatten)]
    pub nutrients: Nutrients,
    #[serde(flatten)]
    pub extra: BTreeMap<String, FieldValue>,
}

impl NormalizedFood {
    /// Look up any field by normalized name
    pub fn get(&self, column: &str) -> Option<FieldValue> {
        if column == FOOD_COLUMN {
            return Some(FieldValue::Text(self.food.clone()));
        }
        self.nutrients
            .get(column)
            .map(FieldValue::Number)
            .or_else(|| self.extra.get(column).cloned())
    }

    /// The flat nutrient-name -> value mapping
    pub fn to_map(&self) -> BTreeMap<String, FieldValue> {
        let mut map = BTreeMap::new();
        map.insert(FOOD_COLUMN.to_string(), FieldValue::Text(self.food.clone()));
        for (column, value) in self.nutrients.iter() {
            map.insert(column.to_string(), FieldValue::Number(value));
        }
        for (column, value) in &self.extra {
            map.insert(column.clone(), value.clone());
        }
        map
    }
}

/// A successful food match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodMatch {
    /// Similarity score on a 0-100 scale
    pub score: f64,
    /// Position of the matched row in the dataset
    pub position: usize,
    pub nutrition: NormalizedFood,
}
