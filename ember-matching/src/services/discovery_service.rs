use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use ember_shared::errors::AppResult;

use crate::matching::discovery::{
    self, distance_between, page_slice, rank_by_shared_interests, within_age_range,
    within_distance, GenderPolicy,
};
use crate::models::{Block, Match, User};
use crate::schema::{blocks, matches, swipes, users};

pub struct FeedCandidate {
    pub user: User,
    pub distance_km: Option<f64>,
    pub shared_interests: usize,
}

/// Build the discovery feed for an onboarded requester.
///
/// Exclusions (self, swiped, blocked, optionally matched) and the gender
/// filter are pushed into the candidate query; age, distance, interest
/// ranking and pagination run over the loaded rows so the page window is
/// applied after every filter, not before.
pub fn build_feed(
    conn: &mut PgConnection,
    gender_policy: GenderPolicy,
    exclude_matched: bool,
    requester: &User,
    page: u64,
    limit: u64,
) -> AppResult<Vec<FeedCandidate>> {
    let mut exclude_ids = vec![requester.id];

    let swiped: Vec<Uuid> = swipes::table
        .filter(swipes::swiper_id.eq(requester.id))
        .select(swipes::target_id)
        .load(conn)?;
    exclude_ids.extend(swiped);

    let block_edges: Vec<Block> = blocks::table
        .filter(blocks::blocker_id.eq(requester.id).or(blocks::blocked_id.eq(requester.id)))
        .load(conn)?;
    exclude_ids.extend(block_edges.into_iter().map(|b| {
        if b.blocker_id == requester.id {
            b.blocked_id
        } else {
            b.blocker_id
        }
    }));

    if exclude_matched {
        let matched: Vec<Match> = matches::table
            .filter(matches::user1_id.eq(requester.id).or(matches::user2_id.eq(requester.id)))
            .filter(matches::unmatched.eq(false))
            .load(conn)?;
        exclude_ids.extend(matched.into_iter().map(|m| m.other_user(requester.id)));
    }

    let prefs = requester.preferences();
    let targets = discovery::gender_targets(gender_policy, requester.gender(), prefs.gender);

    let mut query = users::table
        .filter(users::onboarding_complete.eq(true))
        .filter(users::id.ne_all(&exclude_ids))
        .order(users::created_at.desc())
        .into_boxed();

    if let Some(genders) = targets {
        let gender_strings: Vec<String> = genders.iter().map(|g| g.to_string()).collect();
        query = query.filter(users::gender.eq_any(gender_strings));
    }

    let candidates: Vec<User> = query.load(conn)?;

    let requester_coords = requester.coordinates();
    let requester_tags = requester.interest_tags();

    let mut feed: Vec<FeedCandidate> = candidates
        .into_iter()
        .filter(|c| within_age_range(&prefs, c.age))
        .map(|c| {
            let distance_km = distance_between(requester_coords, c.coordinates());
            let shared_interests = discovery::shared_interest_count(&requester_tags, &c.interest_tags());
            FeedCandidate { user: c, distance_km, shared_interests }
        })
        .filter(|c| within_distance(prefs.max_distance_km, c.distance_km))
        .collect();

    if prefs.interests_priority {
        rank_by_shared_interests(&mut feed, |c| c.shared_interests);
    }

    Ok(page_slice(feed, page, limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewBlock, NewSwipe};
    use crate::services::test_support::{connect, seed_user, SeedUser};
    use ember_shared::types::profile::Preferences;

    fn load_user(conn: &mut PgConnection, id: Uuid) -> User {
        users::table.find(id).first(conn).unwrap()
    }

    fn feed_ids(feed: &[FeedCandidate]) -> Vec<Uuid> {
        feed.iter().map(|c| c.user.id).collect()
    }

    #[test]
    #[ignore = "requires Postgres (TEST_DATABASE_URL)"]
    fn feed_never_contains_self_swiped_or_blocked() {
        let mut conn = connect();
        let me = seed_user(&mut conn, SeedUser { name: "me", ..Default::default() });
        let swiped = seed_user(&mut conn, SeedUser { name: "swiped", ..Default::default() });
        let blocker = seed_user(&mut conn, SeedUser { name: "blocker", ..Default::default() });
        let blocked = seed_user(&mut conn, SeedUser { name: "blocked", ..Default::default() });
        let visible = seed_user(&mut conn, SeedUser { name: "visible", ..Default::default() });

        diesel::insert_into(swipes::table)
            .values(&NewSwipe { swiper_id: me, target_id: swiped, direction: "dislike".into() })
            .execute(&mut conn)
            .unwrap();
        diesel::insert_into(blocks::table)
            .values(&NewBlock { blocker_id: me, blocked_id: blocked })
            .execute(&mut conn)
            .unwrap();
        diesel::insert_into(blocks::table)
            .values(&NewBlock { blocker_id: blocker, blocked_id: me })
            .execute(&mut conn)
            .unwrap();

        let requester = load_user(&mut conn, me);
        let feed = build_feed(&mut conn, GenderPolicy::Preference, false, &requester, 1, 1000).unwrap();
        let ids = feed_ids(&feed);

        assert!(!ids.contains(&me));
        assert!(!ids.contains(&swiped));
        assert!(!ids.contains(&blocked));
        assert!(!ids.contains(&blocker));
        assert!(ids.contains(&visible));
    }

    #[test]
    #[ignore = "requires Postgres (TEST_DATABASE_URL)"]
    fn unonboarded_candidates_are_hidden() {
        let mut conn = connect();
        let me = seed_user(&mut conn, SeedUser::default());
        let ghost = seed_user(&mut conn, SeedUser { onboarding_complete: false, ..Default::default() });

        let requester = load_user(&mut conn, me);
        let feed = build_feed(&mut conn, GenderPolicy::Preference, false, &requester, 1, 1000).unwrap();
        assert!(!feed_ids(&feed).contains(&ghost));
    }

    #[test]
    #[ignore = "requires Postgres (TEST_DATABASE_URL)"]
    fn exclude_matched_policy_drops_existing_matches() {
        let mut conn = connect();
        let me = seed_user(&mut conn, SeedUser::default());
        let partner = seed_user(&mut conn, SeedUser::default());

        crate::services::swipe_service::record_swipe(
            &mut conn, me, partner, crate::matching::SwipeDirection::Like,
        )
        .unwrap();
        crate::services::swipe_service::record_swipe(
            &mut conn, partner, me, crate::matching::SwipeDirection::Like,
        )
        .unwrap();

        // With the exclusion off the partner is already gone (swiped);
        // the policy matters for the partner's own feed.
        let partner_user = load_user(&mut conn, partner);
        crate::services::swipe_service::undo_swipe(&mut conn, partner, me).unwrap();

        let with_matches = build_feed(&mut conn, GenderPolicy::Preference, false, &partner_user, 1, 1000).unwrap();
        assert!(feed_ids(&with_matches).contains(&me));

        let without_matches = build_feed(&mut conn, GenderPolicy::Preference, true, &partner_user, 1, 1000).unwrap();
        assert!(!feed_ids(&without_matches).contains(&me));
    }

    #[test]
    #[ignore = "requires Postgres (TEST_DATABASE_URL)"]
    fn distance_cap_filters_far_candidates() {
        let mut conn = connect();
        // Requester in central Paris with a 50 km cap.
        let me = seed_user(&mut conn, SeedUser {
            coordinates: Some((48.8566, 2.3522)),
            preferences: Preferences { max_distance_km: Some(50.0), ..Default::default() },
            ..Default::default()
        });
        // Versailles: ~17 km away.
        let near = seed_user(&mut conn, SeedUser {
            coordinates: Some((48.8049, 2.1204)),
            ..Default::default()
        });
        // Lyon: ~390 km away.
        let far = seed_user(&mut conn, SeedUser {
            coordinates: Some((45.7640, 4.8357)),
            ..Default::default()
        });

        let requester = load_user(&mut conn, me);
        let feed = build_feed(&mut conn, GenderPolicy::Preference, false, &requester, 1, 1000).unwrap();
        let ids = feed_ids(&feed);

        assert!(ids.contains(&near));
        assert!(!ids.contains(&far));

        let near_entry = feed.iter().find(|c| c.user.id == near).unwrap();
        let km = near_entry.distance_km.unwrap();
        assert!((km - 17.0).abs() < 2.0, "got {km}");
    }

    #[test]
    #[ignore = "requires Postgres (TEST_DATABASE_URL)"]
    fn interest_priority_reorders_the_feed() {
        let mut conn = connect();
        let me = seed_user(&mut conn, SeedUser {
            interests: vec!["jazz", "hiking", "films"],
            preferences: Preferences { interests_priority: true, ..Default::default() },
            ..Default::default()
        });
        let one_shared = seed_user(&mut conn, SeedUser { interests: vec!["jazz"], ..Default::default() });
        let two_shared = seed_user(&mut conn, SeedUser { interests: vec!["jazz", "hiking"], ..Default::default() });

        let requester = load_user(&mut conn, me);
        let feed = build_feed(&mut conn, GenderPolicy::Preference, false, &requester, 1, 1000).unwrap();
        let ids = feed_ids(&feed);

        let pos_one = ids.iter().position(|id| *id == one_shared).unwrap();
        let pos_two = ids.iter().position(|id| *id == two_shared).unwrap();
        assert!(pos_two < pos_one);
    }

    #[test]
    #[ignore = "requires Postgres (TEST_DATABASE_URL)"]
    fn pagination_is_stable_with_no_intervening_writes() {
        let mut conn = connect();
        let me = seed_user(&mut conn, SeedUser::default());
        for _ in 0..25 {
            seed_user(&mut conn, SeedUser::default());
        }

        let requester = load_user(&mut conn, me);
        let page1 = feed_ids(&build_feed(&mut conn, GenderPolicy::Preference, false, &requester, 1, 10).unwrap());
        let page2 = feed_ids(&build_feed(&mut conn, GenderPolicy::Preference, false, &requester, 2, 10).unwrap());
        let first_twenty = feed_ids(&build_feed(&mut conn, GenderPolicy::Preference, false, &requester, 1, 20).unwrap());

        assert_eq!(page1.len(), 10);
        assert_eq!(page2.len(), 10);
        assert!(page1.iter().all(|id| !page2.contains(id)));

        let mut union = page1;
        union.extend(page2);
        assert_eq!(union, first_twenty);
    }
}
