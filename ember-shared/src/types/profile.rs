use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
            Gender::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(format!("unknown gender: {s}")),
        }
    }
}

/// Which genders a user wants to see in their feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderPreference {
    Male,
    Female,
    Both,
}

/// Per-user discovery preferences, stored as a jsonb column on the user row.
///
/// `Preferences::default()` is the single source of truth for the values a
/// freshly registered account starts with:
/// - age range 18..=99
/// - interested in both genders
/// - 100 km maximum distance
/// - no interest-based ranking
/// - age and distance visible to others
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub age_min: i32,
    pub age_max: i32,
    pub gender: GenderPreference,
    pub max_distance_km: Option<f64>,
    pub interests_priority: bool,
    pub show_my_age: bool,
    pub show_my_distance: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            age_min: 18,
            age_max: 99,
            gender: GenderPreference::Both,
            max_distance_km: Some(100.0),
            interests_priority: false,
            show_my_age: true,
            show_my_distance: true,
        }
    }
}

impl Preferences {
    /// Parse preferences out of the jsonb column, falling back to the
    /// defaults when the payload is missing or malformed.
    pub fn from_json(value: &serde_json::Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }

    /// Apply a partial update, leaving unset fields untouched.
    pub fn merge(&self, update: &PreferencesUpdate) -> Self {
        Self {
            age_min: update.age_min.unwrap_or(self.age_min),
            age_max: update.age_max.unwrap_or(self.age_max),
            gender: update.gender.unwrap_or(self.gender),
            max_distance_km: match update.max_distance_km {
                Some(v) => v,
                None => self.max_distance_km,
            },
            interests_priority: update.interests_priority.unwrap_or(self.interests_priority),
            show_my_age: update.show_my_age.unwrap_or(self.show_my_age),
            show_my_distance: update.show_my_distance.unwrap_or(self.show_my_distance),
        }
    }
}

/// Field-wise preferences patch. `max_distance_km: Some(None)` clears the
/// distance cap entirely.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesUpdate {
    pub age_min: Option<i32>,
    pub age_max: Option<i32>,
    pub gender: Option<GenderPreference>,
    #[serde(default, with = "double_option")]
    pub max_distance_km: Option<Option<f64>>,
    pub interests_priority: Option<bool>,
    pub show_my_age: Option<bool>,
    pub show_my_distance: Option<bool>,
}

/// Distinguish "field absent" from "field set to null" for nullable fields.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let prefs = Preferences::default();
        assert_eq!(prefs.age_min, 18);
        assert_eq!(prefs.age_max, 99);
        assert_eq!(prefs.gender, GenderPreference::Both);
        assert_eq!(prefs.max_distance_km, Some(100.0));
        assert!(!prefs.interests_priority);
        assert!(prefs.show_my_age);
        assert!(prefs.show_my_distance);
    }

    #[test]
    fn from_json_falls_back_to_defaults_on_garbage() {
        assert_eq!(Preferences::from_json(&serde_json::json!("nope")), Preferences::default());
        assert_eq!(Preferences::from_json(&serde_json::Value::Null), Preferences::default());
    }

    #[test]
    fn merge_keeps_unset_fields() {
        let base = Preferences::default();
        let update = PreferencesUpdate {
            age_min: Some(25),
            gender: Some(GenderPreference::Female),
            ..Default::default()
        };
        let merged = base.merge(&update);
        assert_eq!(merged.age_min, 25);
        assert_eq!(merged.age_max, 99);
        assert_eq!(merged.gender, GenderPreference::Female);
        assert_eq!(merged.max_distance_km, Some(100.0));
    }

    #[test]
    fn merge_can_clear_distance_cap() {
        let base = Preferences::default();
        let update: PreferencesUpdate =
            serde_json::from_value(serde_json::json!({ "max_distance_km": null })).unwrap();
        assert_eq!(base.merge(&update).max_distance_km, None);
    }

    #[test]
    fn gender_round_trips_through_strings() {
        for g in [Gender::Male, Gender::Female, Gender::Other] {
            assert_eq!(g.to_string().parse::<Gender>().unwrap(), g);
        }
    }
}
