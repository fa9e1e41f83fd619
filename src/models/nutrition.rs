//! Macro summary
//!
//! The four totals shown on the dashboard, meal plans and reports.

use serde::{Deserialize, Serialize};

use crate::nutrition::Nutrients;

/// Calorie and macronutrient totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroSummary {
    pub calories: f64,
    pub protein: f64, // grams
    pub carbs: f64,   // grams
    pub fat: f64,     // grams
}

impl MacroSummary {
    /// Create a new summary with all zeros
    pub fn zero() -> Self {
        Self::default()
    }

    /// Add another summary to this one
    pub fn add(&self, other: &MacroSummary) -> Self {
        Self {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            carbs: self.carbs + other.carbs,
            fat: self.fat + other.fat,
        }
    }

    /// Round every total to the nearest whole number, halves to even
    pub fn rounded(&self) -> Self {
        Self {
            calories: self.calories.round_ties_even(),
            protein: self.protein.round_ties_even(),
            carbs: self.carbs.round_ties_even(),
            fat: self.fat.round_ties_even(),
        }
    }
}

impl From<&Nutrients> for MacroSummary {
    fn from(n: &Nutrients) -> Self {
        Self {
            calories: n.caloric_value,
            protein: n.protein,
            carbs: n.carbohydrates,
            fat: n.fat,
        }
    }
}

impl std::ops::Add for MacroSummary {
    type Output = MacroSummary;

    fn add(self, other: MacroSummary) -> MacroSummary {
        MacroSummary::add(&self, &other)
    }
}

impl std::iter::Sum for MacroSummary {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(MacroSummary::zero(), |acc, n| acc + n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_and_round() {
        let items = vec![
            MacroSummary { calories: 149.6, protein: 10.0, carbs: 1.6, fat: 11.0 },
            MacroSummary { calories: 69.0, protein: 3.6, carbs: 12.0, fat: 0.9 },
        ];
        let total: MacroSummary = items.into_iter().sum();
        let rounded = total.rounded();

        assert_eq!(rounded.calories, 219.0);
        assert_eq!(rounded.protein, 14.0);
        assert_eq!(rounded.carbs, 14.0);
        assert_eq!(rounded.fat, 12.0);
    }

    #[test]
    fn test_round_halves_to_even() {
        let rounded = MacroSummary { calories: 2.5, protein: 3.5, carbs: 0.5, fat: 10.5 }.rounded();
        assert_eq!(rounded.calories, 2.0);
        assert_eq!(rounded.protein, 4.0);
        assert_eq!(rounded.carbs, 0.0);
        assert_eq!(rounded.fat, 10.0);
    }

    #[test]
    fn test_from_nutrients() {
        let n = Nutrients {
            caloric_value: 52.0,
            protein: 0.3,
            carbohydrates: 14.0,
            fat: 0.2,
            sugars: 10.0,
            ..Default::default()
        };
        let m = MacroSummary::from(&n);
        assert_eq!(m, MacroSummary { calories: 52.0, protein: 0.3, carbs: 14.0, fat: 0.2 });
    }
}
