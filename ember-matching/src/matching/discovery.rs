use serde::Deserialize;

use ember_shared::types::profile::{Gender, GenderPreference, Preferences};

/// How the candidate gender filter is derived. Both variants shipped in
/// different product revisions; the choice is configuration, not code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderPolicy {
    /// Filter by the requester's stated preference ("both" means no filter).
    Preference,
    /// Strict heterosexual derivation from the requester's own gender;
    /// "other" sees male and female candidates.
    Opposite,
}

/// Where the onboarding gate is enforced for the discovery feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnboardingGate {
    /// Unfinished profiles silently get an empty feed.
    Service,
    /// Unfinished profiles get a 403 at the API boundary.
    Api,
}

/// The genders a requester's feed is restricted to. `None` means no filter.
pub fn gender_targets(
    policy: GenderPolicy,
    own_gender: Gender,
    preference: GenderPreference,
) -> Option<Vec<Gender>> {
    match policy {
        GenderPolicy::Preference => match preference {
            GenderPreference::Both => None,
            GenderPreference::Male => Some(vec![Gender::Male]),
            GenderPreference::Female => Some(vec![Gender::Female]),
        },
        GenderPolicy::Opposite => match own_gender {
            Gender::Male => Some(vec![Gender::Female]),
            Gender::Female => Some(vec![Gender::Male]),
            Gender::Other => Some(vec![Gender::Male, Gender::Female]),
        },
    }
}

/// Great-circle distance in km between two lat/lng points.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const R: f64 = 6371.0; // Earth radius in km
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    R * c
}

/// Distance between two optional coordinate pairs; `None` when either side
/// has no geolocation.
pub fn distance_between(a: Option<(f64, f64)>, b: Option<(f64, f64)>) -> Option<f64> {
    match (a, b) {
        (Some((lat1, lng1)), Some((lat2, lng2))) => Some(haversine_km(lat1, lng1, lat2, lng2)),
        _ => None,
    }
}

/// Inclusive age-range check against the requester's preferences.
pub fn within_age_range(prefs: &Preferences, age: i32) -> bool {
    age >= prefs.age_min && age <= prefs.age_max
}

/// Max-distance check. Absent cap or unknown distance degrades to "passes".
pub fn within_distance(max_km: Option<f64>, distance_km: Option<f64>) -> bool {
    match (max_km, distance_km) {
        (Some(max), Some(d)) => d <= max,
        _ => true,
    }
}

pub fn shared_interest_count(a: &[String], b: &[String]) -> usize {
    b.iter().filter(|tag| a.contains(tag)).count()
}

/// Stable re-rank by shared-interest count, highest first. Candidates with
/// equal counts keep their incoming (newest-first) order.
pub fn rank_by_shared_interests<T>(items: &mut [T], shared: impl Fn(&T) -> usize) {
    items.sort_by_key(|item| std::cmp::Reverse(shared(item)));
}

/// Page window over the filtered, ranked candidate list. Pages are 1-based.
pub fn page_slice<T>(items: Vec<T>, page: u64, limit: u64) -> Vec<T> {
    let skip = (page.saturating_sub(1) * limit) as usize;
    items
        .into_iter()
        .skip(skip)
        .take(limit as usize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preference_policy_follows_stated_preference() {
        let targets = gender_targets(GenderPolicy::Preference, Gender::Male, GenderPreference::Female);
        assert_eq!(targets, Some(vec![Gender::Female]));
        let none = gender_targets(GenderPolicy::Preference, Gender::Male, GenderPreference::Both);
        assert_eq!(none, None);
    }

    #[test]
    fn opposite_policy_ignores_stated_preference() {
        let targets = gender_targets(GenderPolicy::Opposite, Gender::Male, GenderPreference::Male);
        assert_eq!(targets, Some(vec![Gender::Female]));
        let other = gender_targets(GenderPolicy::Opposite, Gender::Other, GenderPreference::Both);
        assert_eq!(other, Some(vec![Gender::Male, Gender::Female]));
    }

    #[test]
    fn haversine_one_degree_of_latitude() {
        // One degree of latitude is ~111.2 km anywhere on the globe.
        let d = haversine_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.2).abs() < 0.5, "got {d}");
    }

    #[test]
    fn haversine_london_to_paris() {
        let d = haversine_km(51.5074, -0.1278, 48.8566, 2.3522);
        assert!((d - 343.5).abs() < 1.0, "got {d}");
    }

    #[test]
    fn distance_requires_both_coordinates() {
        assert!(distance_between(Some((1.0, 1.0)), None).is_none());
        assert!(distance_between(None, Some((1.0, 1.0))).is_none());
        assert!(distance_between(Some((1.0, 1.0)), Some((1.0, 1.0))).unwrap() < 1e-9);
    }

    #[test]
    fn age_range_is_inclusive() {
        let prefs = Preferences { age_min: 25, age_max: 30, ..Default::default() };
        assert!(within_age_range(&prefs, 25));
        assert!(within_age_range(&prefs, 30));
        assert!(!within_age_range(&prefs, 24));
        assert!(!within_age_range(&prefs, 31));
    }

    #[test]
    fn distance_filter_degrades_gracefully() {
        // No cap set, or no coordinates on either side: candidate passes.
        assert!(within_distance(None, Some(5000.0)));
        assert!(within_distance(Some(10.0), None));
        assert!(within_distance(Some(10.0), Some(9.9)));
        assert!(!within_distance(Some(10.0), Some(10.5)));
    }

    #[test]
    fn distance_filter_boundary_around_cap() {
        // Candidates ~104.5 km and ~111.2 km out against a 105 km cap.
        let just_inside = haversine_km(0.0, 0.0, 0.94, 0.0);
        let beyond = haversine_km(0.0, 0.0, 1.0, 0.0);
        assert!(within_distance(Some(105.0), Some(just_inside)));
        assert!(!within_distance(Some(105.0), Some(beyond)));
    }

    #[test]
    fn shared_interest_counting() {
        let mine = vec!["hiking".to_string(), "jazz".to_string(), "films".to_string()];
        let theirs = vec!["jazz".to_string(), "films".to_string(), "running".to_string()];
        assert_eq!(shared_interest_count(&mine, &theirs), 2);
        assert_eq!(shared_interest_count(&mine, &[]), 0);
    }

    #[test]
    fn interest_ranking_is_stable() {
        // (name, shared count); equal counts must keep incoming order.
        let mut items = vec![("a", 1), ("b", 3), ("c", 1), ("d", 3), ("e", 0)];
        rank_by_shared_interests(&mut items, |&(_, n)| n);
        assert_eq!(
            items.iter().map(|&(name, _)| name).collect::<Vec<_>>(),
            vec!["b", "d", "a", "c", "e"],
        );
    }

    #[test]
    fn pages_are_disjoint_and_cover_the_prefix() {
        let items: Vec<u32> = (0..25).collect();
        let page1 = page_slice(items.clone(), 1, 10);
        let page2 = page_slice(items.clone(), 2, 10);
        assert_eq!(page1, (0..10).collect::<Vec<_>>());
        assert_eq!(page2, (10..20).collect::<Vec<_>>());

        let first_twenty = page_slice(items.clone(), 1, 20);
        let mut union = page1;
        union.extend(page2);
        assert_eq!(union, first_twenty);
    }

    #[test]
    fn out_of_range_page_is_empty() {
        let items: Vec<u32> = (0..5).collect();
        assert!(page_slice(items, 3, 10).is_empty());
    }
}
