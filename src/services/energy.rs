// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Energy model: BMR (Mifflin-St Jeor) and TDEE.

use crate::models::{Defaulted, Sex, UsedDefaults};

pub const DEFAULT_WEIGHT_KG: f64 = 70.0;
pub const DEFAULT_HEIGHT_CM: f64 = 175.0;
pub const DEFAULT_AGE_YEARS: u32 = 30;

/// Body metrics with fallbacks applied, remembering which were substituted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyMetrics {
    pub weight_kg: Defaulted<f64>,
    pub height_cm: Defaulted<f64>,
    pub age_years: Defaulted<u32>,
}

impl BodyMetrics {
    /// Fill in missing (or non-positive) values with the fallback defaults.
    pub fn resolve(weight_kg: Option<f64>, height_cm: Option<f64>, age_years: Option<u32>) -> Self {
        Self {
            weight_kg: Defaulted::or_default(weight_kg.filter(|w| *w > 0.0), DEFAULT_WEIGHT_KG),
            height_cm: Defaulted::or_default(height_cm.filter(|h| *h > 0.0), DEFAULT_HEIGHT_CM),
            age_years: Defaulted::or_default(age_years.filter(|a| *a > 0), DEFAULT_AGE_YEARS),
        }
    }

    pub fn used_defaults(&self) -> UsedDefaults {
        UsedDefaults {
            weight: self.weight_kg.was_defaulted,
            height: self.height_cm.was_defaulted,
            age: self.age_years.was_defaulted,
        }
    }

    pub fn bmr(&self, sex: Option<Sex>) -> i32 {
        compute_bmr(
            self.weight_kg.value,
            self.height_cm.value,
            self.age_years.value,
            sex,
        )
    }
}

/// Mifflin-St Jeor BMR in kcal/day, rounded.
///
/// `Other` and unknown sex get no offset; the neutral base is used as is.
pub fn compute_bmr(weight_kg: f64, height_cm: f64, age_years: u32, sex: Option<Sex>) -> i32 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age_years);
    let offset = match sex {
        Some(Sex::Male) => 5.0,
        Some(Sex::Female) => -161.0,
        Some(Sex::Other) | None => 0.0,
    };
    (base + offset).round() as i32
}

/// TDEE in kcal/day.
pub fn compute_tdee(bmr: i32, activity_factor: f64) -> f64 {
    f64::from(bmr) * activity_factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        // 10*80 + 6.25*180 - 5*30 = 1775
        assert_eq!(compute_bmr(80.0, 180.0, 30, Some(Sex::Male)), 1780);
        assert_eq!(compute_bmr(80.0, 180.0, 30, Some(Sex::Female)), 1614);
        assert_eq!(compute_bmr(80.0, 180.0, 30, Some(Sex::Other)), 1775);
        assert_eq!(compute_bmr(80.0, 180.0, 30, None), 1775);
    }

    #[test]
    fn test_male_minus_female_is_166() {
        for (w, h, a) in [(50.5, 150.0, 18), (70.0, 175.0, 30), (123.4, 201.7, 77)] {
            let male = compute_bmr(w, h, a, Some(Sex::Male));
            let female = compute_bmr(w, h, a, Some(Sex::Female));
            assert_eq!(male - female, 166, "w={} h={} a={}", w, h, a);
        }
    }

    #[test]
    fn test_resolve_flags_defaults() {
        let metrics = BodyMetrics::resolve(Some(82.0), None, Some(0));
        assert_eq!(metrics.weight_kg.value, 82.0);
        assert_eq!(metrics.height_cm.value, DEFAULT_HEIGHT_CM);
        assert_eq!(metrics.age_years.value, DEFAULT_AGE_YEARS);
        assert_eq!(
            metrics.used_defaults(),
            UsedDefaults {
                weight: false,
                height: true,
                age: true,
            }
        );
    }

    #[test]
    fn test_all_defaults_bmr() {
        let metrics = BodyMetrics::resolve(None, None, None);
        assert!(metrics.used_defaults().any());
        // 700 + 1093.75 - 150 + 5 = 1648.75
        assert_eq!(metrics.bmr(Some(Sex::Male)), 1649);
    }

    #[test]
    fn test_tdee() {
        assert_eq!(compute_tdee(1600, 1.375), 2200.0);
        assert_eq!(compute_tdee(1500, 1.2), 1800.0);
    }
}
