use crate::models::{BiologicalSex, DerivedMetrics, Profile};

/// Harris-Benedict BMR and activity-scaled daily need.
///
/// Returns [`DerivedMetrics::ABSENT`] unless all five profile fields are set.
/// NaN inputs yield NaN outputs. Always a full recomputation.
pub fn compute_metrics(profile: &Profile) -> DerivedMetrics {
    let (Some(sex), Some(weight), Some(height), Some(age), Some(level)) = (
        profile.biological_sex,
        profile.weight_kg,
        profile.height_cm,
        profile.age_years,
        profile.activity_level,
    ) else {
        return DerivedMetrics::ABSENT;
    };

    let bmr = match sex {
        BiologicalSex::Male => 88.36 + 13.4 * weight + 4.8 * height - 5.7 * age,
        BiologicalSex::Female => 447.6 + 9.2 * weight + 3.1 * height - 4.3 * age,
    };
    let daily = bmr * level.factor();

    DerivedMetrics {
        basal_metabolic_rate: Some(bmr.round()),
        daily_caloric_need: Some(daily.round()),
    }
}
