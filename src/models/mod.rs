use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiologicalSex {
    Male,
    Female,
}

/// Physical activity tier picked on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    Athlete,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::VeryActive,
        ActivityLevel::Athlete,
    ];

    /// Multiplier applied to BMR to get the daily caloric need.
    pub const fn factor(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::Athlete => 1.9,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::LightlyActive => "lightly_active",
            ActivityLevel::ModeratelyActive => "moderately_active",
            ActivityLevel::VeryActive => "very_active",
            ActivityLevel::Athlete => "athlete",
        }
    }

    /// Unknown values (including the picker's empty "Selecionar" entry) mean unset.
    pub fn from_string(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|level| level.as_str() == s)
    }
}

impl std::fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ActivityLevel::Sedentary => "Sedentário",
            ActivityLevel::LightlyActive => "Levemente ativo",
            ActivityLevel::ModeratelyActive => "Moderadamente ativo",
            ActivityLevel::VeryActive => "Muito ativo",
            ActivityLevel::Athlete => "Atleta",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub biological_sex: Option<BiologicalSex>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub age_years: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
}

/// Parses a numeric form field. Blank input leaves the field unset, anything
/// else that does not parse becomes NaN so it flows through the formulas.
/// A decimal comma (pt-BR keyboards) is accepted.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.replace(',', ".").parse::<f64>().unwrap_or(f64::NAN))
}

/// Whole kcal, or `None` for NaN, infinities and values past the `i64` range.
fn whole_kcal(value: Option<f64>) -> Option<i64> {
    const LIMIT: f64 = i64::MAX as f64;
    value
        .filter(|v| v.is_finite() && v.abs() < LIMIT)
        .map(|v| v as i64)
}

/// BMR and daily caloric need, rounded to whole kcal.
///
/// Kept as floats so a NaN coming from a malformed field is visible to the
/// caller instead of being coerced into a number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub basal_metabolic_rate: Option<f64>,
    pub daily_caloric_need: Option<f64>,
}

impl DerivedMetrics {
    pub const ABSENT: DerivedMetrics = DerivedMetrics {
        basal_metabolic_rate: None,
        daily_caloric_need: None,
    };

    /// Both figures present, representable as whole kcal and non-zero.
    pub fn is_complete(&self) -> bool {
        let usable = |kcal: Option<i64>| matches!(kcal, Some(k) if k != 0);
        usable(self.basal_kcal()) && usable(self.daily_kcal())
    }

    pub fn daily_kcal(&self) -> Option<i64> {
        whole_kcal(self.daily_caloric_need)
    }

    pub fn basal_kcal(&self) -> Option<i64> {
        whole_kcal(self.basal_metabolic_rate)
    }
}

/// Ordered ingredient names. Duplicates are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientList(Vec<String>);

impl IngredientList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the trimmed value. Blank input is silently ignored.
    pub fn added(mut self, raw: &str) -> Self {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            self.0.push(trimmed.to_string());
        }
        self
    }

    /// Drops every entry equal to `value`.
    pub fn removed(mut self, value: &str) -> Self {
        self.0.retain(|item| item != value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn joined(&self) -> String {
        self.0.join(", ")
    }
}

impl<S: Into<String>> FromIterator<S> for IngredientList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        iter.into_iter()
            .fold(IngredientList::new(), |list, item| list.added(&item.into()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietSuggestion {
    pub content: String,
    pub generated_at: DateTime<Utc>,
}

/// Everything the form renders, owned by the session.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub profile: Profile,
    pub metrics: DerivedMetrics,
    pub ingredients: IngredientList,
    pub suggestion: Option<DietSuggestion>,
    pub last_error: Option<String>,
}
