use diesel::dsl::count_star;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use ember_shared::errors::{AppError, AppResult, ErrorCode};

use crate::matching::SwipeDirection;
use crate::models::{NewSwipe, Swipe};
use crate::schema::{blocks, swipes, users};
use crate::services::match_service::{self, MatchOutcome};

#[derive(Debug)]
pub struct SwipeOutcome {
    pub swipe: Swipe,
    pub match_outcome: Option<MatchOutcome>,
}

impl SwipeOutcome {
    pub fn is_match(&self) -> bool {
        self.match_outcome.is_some()
    }
}

/// Record one user's verdict on another and run mutual-match detection.
///
/// The swipe insert and the match check run in one transaction: a failed
/// match check leaves no swipe row behind. Swipe uniqueness is enforced by
/// the (swiper_id, target_id) constraint, so a concurrent duplicate surfaces
/// as `AlreadySwiped` instead of a second row.
pub fn record_swipe(
    conn: &mut PgConnection,
    swiper_id: Uuid,
    target_id: Uuid,
    direction: SwipeDirection,
) -> AppResult<SwipeOutcome> {
    if swiper_id == target_id {
        return Err(AppError::new(ErrorCode::CannotSwipeSelf, "cannot swipe on yourself"));
    }

    conn.transaction::<SwipeOutcome, AppError, _>(|conn| {
        // Lock both user rows, always in id order. Concurrent swipes within
        // the same pair serialize on these locks, so the reverse-swipe read
        // in the detector only ever sees committed rows; the unique
        // constraint on the canonical pair stays as the backstop.
        let locked: Vec<Uuid> = users::table
            .filter(users::id.eq_any(vec![swiper_id, target_id]))
            .order(users::id.asc())
            .select(users::id)
            .for_update()
            .load(conn)?;
        if !locked.contains(&target_id) {
            return Err(AppError::new(ErrorCode::UserNotFound, "target user not found"));
        }

        let blocked: i64 = blocks::table
            .filter(
                blocks::blocker_id.eq(swiper_id).and(blocks::blocked_id.eq(target_id))
                    .or(blocks::blocker_id.eq(target_id).and(blocks::blocked_id.eq(swiper_id))),
            )
            .select(count_star())
            .first(conn)?;
        if blocked > 0 {
            return Err(AppError::new(ErrorCode::BlockedPair, "cannot swipe on a blocked user"));
        }

        let new_swipe = NewSwipe {
            swiper_id,
            target_id,
            direction: direction.as_str().to_string(),
        };

        let swipe: Swipe = diesel::insert_into(swipes::table)
            .values(&new_swipe)
            .get_result(conn)
            .map_err(|e| match e {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    AppError::new(ErrorCode::AlreadySwiped, "already swiped on this user")
                }
                other => AppError::Database(other),
            })?;

        let match_outcome = match_service::try_create_match(conn, swiper_id, target_id, direction)?;

        Ok(SwipeOutcome { swipe, match_outcome })
    })
}

/// Delete the caller's swipe on `target_id`. An existing match is left
/// intact; retracting a match is the explicit unmatch operation, not a side
/// effect of undo.
pub fn undo_swipe(conn: &mut PgConnection, swiper_id: Uuid, target_id: Uuid) -> AppResult<()> {
    let deleted = diesel::delete(
        swipes::table
            .filter(swipes::swiper_id.eq(swiper_id))
            .filter(swipes::target_id.eq(target_id)),
    )
    .execute(conn)?;

    if deleted == 0 {
        return Err(AppError::new(ErrorCode::SwipeNotFound, "no swipe to undo"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewBlock;
    use crate::schema::matches;
    use crate::services::test_support::{connect, seed_user, SeedUser};
    use ember_shared::errors::ErrorCode;

    fn seed_pair(conn: &mut PgConnection) -> (Uuid, Uuid) {
        let a = seed_user(conn, SeedUser { name: "alice", ..Default::default() });
        let b = seed_user(conn, SeedUser { name: "bob", ..Default::default() });
        (a, b)
    }

    fn match_rows(conn: &mut PgConnection, a: Uuid, b: Uuid) -> Vec<crate::models::Match> {
        let (lo, hi) = crate::matching::canonical_pair(a, b);
        matches::table
            .filter(matches::user1_id.eq(lo))
            .filter(matches::user2_id.eq(hi))
            .load(conn)
            .unwrap()
    }

    #[test]
    #[ignore = "requires Postgres (TEST_DATABASE_URL)"]
    fn self_swipe_is_rejected() {
        let mut conn = connect();
        let (a, _) = seed_pair(&mut conn);
        let err = record_swipe(&mut conn, a, a, SwipeDirection::Like).unwrap_err();
        assert_eq!(err.error_code(), Some(ErrorCode::CannotSwipeSelf));

        let count: i64 = swipes::table
            .filter(swipes::swiper_id.eq(a))
            .select(count_star())
            .first(&mut conn)
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    #[ignore = "requires Postgres (TEST_DATABASE_URL)"]
    fn swiping_a_missing_user_is_not_found() {
        let mut conn = connect();
        let (a, _) = seed_pair(&mut conn);
        let err = record_swipe(&mut conn, a, Uuid::new_v4(), SwipeDirection::Like).unwrap_err();
        assert_eq!(err.error_code(), Some(ErrorCode::UserNotFound));
    }

    #[test]
    #[ignore = "requires Postgres (TEST_DATABASE_URL)"]
    fn duplicate_swipe_conflicts_and_keeps_one_row() {
        let mut conn = connect();
        let (a, b) = seed_pair(&mut conn);

        record_swipe(&mut conn, a, b, SwipeDirection::Like).unwrap();
        let err = record_swipe(&mut conn, a, b, SwipeDirection::Dislike).unwrap_err();
        assert_eq!(err.error_code(), Some(ErrorCode::AlreadySwiped));

        let count: i64 = swipes::table
            .filter(swipes::swiper_id.eq(a))
            .filter(swipes::target_id.eq(b))
            .select(count_star())
            .first(&mut conn)
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    #[ignore = "requires Postgres (TEST_DATABASE_URL)"]
    fn blocked_pair_cannot_swipe_in_either_direction() {
        let mut conn = connect();
        let (a, b) = seed_pair(&mut conn);

        diesel::insert_into(blocks::table)
            .values(&NewBlock { blocker_id: a, blocked_id: b })
            .execute(&mut conn)
            .unwrap();

        let err = record_swipe(&mut conn, a, b, SwipeDirection::Like).unwrap_err();
        assert_eq!(err.error_code(), Some(ErrorCode::BlockedPair));
        // The block suppresses the reverse direction too.
        let err = record_swipe(&mut conn, b, a, SwipeDirection::Like).unwrap_err();
        assert_eq!(err.error_code(), Some(ErrorCode::BlockedPair));
    }

    #[test]
    #[ignore = "requires Postgres (TEST_DATABASE_URL)"]
    fn one_sided_like_does_not_match() {
        let mut conn = connect();
        let (a, b) = seed_pair(&mut conn);

        let outcome = record_swipe(&mut conn, a, b, SwipeDirection::Like).unwrap();
        assert!(!outcome.is_match());
        assert!(match_rows(&mut conn, a, b).is_empty());
    }

    #[test]
    #[ignore = "requires Postgres (TEST_DATABASE_URL)"]
    fn like_against_dislike_never_matches() {
        let mut conn = connect();
        let (a, b) = seed_pair(&mut conn);

        record_swipe(&mut conn, a, b, SwipeDirection::Like).unwrap();
        let outcome = record_swipe(&mut conn, b, a, SwipeDirection::Dislike).unwrap();
        assert!(!outcome.is_match());
        assert!(match_rows(&mut conn, a, b).is_empty());
    }

    #[test]
    #[ignore = "requires Postgres (TEST_DATABASE_URL)"]
    fn reciprocal_likes_match_once_in_canonical_order() {
        let mut conn = connect();
        let (a, b) = seed_pair(&mut conn);

        let first = record_swipe(&mut conn, a, b, SwipeDirection::Like).unwrap();
        assert!(!first.is_match());

        let second = record_swipe(&mut conn, b, a, SwipeDirection::Superlike).unwrap();
        assert!(second.is_match());

        let rows = match_rows(&mut conn, a, b);
        assert_eq!(rows.len(), 1);
        let (lo, hi) = crate::matching::canonical_pair(a, b);
        assert_eq!(rows[0].user1_id, lo);
        assert_eq!(rows[0].user2_id, hi);
        assert!(!rows[0].unmatched);
    }

    #[test]
    #[ignore = "requires Postgres (TEST_DATABASE_URL)"]
    fn concurrent_reciprocal_swipes_create_exactly_one_match() {
        // Both users swipe at the same instant, repeatedly with fresh pairs.
        // The pair locks serialize the two transactions, so the later one
        // must observe the earlier swipe and create the match; the unique
        // canonical-pair constraint keeps the row count at one.
        const ROUNDS: usize = 20;

        for _ in 0..ROUNDS {
            let mut conn = connect();
            let (a, b) = seed_pair(&mut conn);

            let barrier = std::sync::Arc::new(std::sync::Barrier::new(2));
            let handles: Vec<_> = [(a, b), (b, a)]
                .into_iter()
                .map(|(swiper, target)| {
                    let barrier = barrier.clone();
                    std::thread::spawn(move || {
                        let mut conn = connect();
                        barrier.wait();
                        record_swipe(&mut conn, swiper, target, SwipeDirection::Like)
                    })
                })
                .collect();

            let outcomes: Vec<_> = handles
                .into_iter()
                .map(|h| h.join().unwrap().unwrap())
                .collect();

            // At least one side must observe the match; the table holds one row.
            assert!(outcomes.iter().any(|o| o.is_match()));
            assert_eq!(match_rows(&mut conn, a, b).len(), 1);
        }
    }

    #[test]
    #[ignore = "requires Postgres (TEST_DATABASE_URL)"]
    fn undo_removes_the_swipe_but_keeps_the_match() {
        let mut conn = connect();
        let (a, b) = seed_pair(&mut conn);

        record_swipe(&mut conn, a, b, SwipeDirection::Like).unwrap();
        record_swipe(&mut conn, b, a, SwipeDirection::Like).unwrap();
        assert_eq!(match_rows(&mut conn, a, b).len(), 1);

        undo_swipe(&mut conn, a, b).unwrap();

        let remaining: i64 = swipes::table
            .filter(swipes::swiper_id.eq(a))
            .filter(swipes::target_id.eq(b))
            .select(count_star())
            .first(&mut conn)
            .unwrap();
        assert_eq!(remaining, 0);
        // Unmatching is a separate explicit action; undo leaves the match.
        assert!(!match_rows(&mut conn, a, b)[0].unmatched);
    }

    #[test]
    #[ignore = "requires Postgres (TEST_DATABASE_URL)"]
    fn undo_without_a_swipe_is_not_found() {
        let mut conn = connect();
        let (a, b) = seed_pair(&mut conn);
        let err = undo_swipe(&mut conn, a, b).unwrap_err();
        assert_eq!(err.error_code(), Some(ErrorCode::SwipeNotFound));
    }

    #[test]
    #[ignore = "requires Postgres (TEST_DATABASE_URL)"]
    fn rematch_after_unmatch_revives_the_same_row() {
        let mut conn = connect();
        let (a, b) = seed_pair(&mut conn);

        record_swipe(&mut conn, a, b, SwipeDirection::Like).unwrap();
        record_swipe(&mut conn, b, a, SwipeDirection::Like).unwrap();
        let original = match_rows(&mut conn, a, b).remove(0);

        diesel::update(matches::table.find(original.id))
            .set(matches::unmatched.eq(true))
            .execute(&mut conn)
            .unwrap();

        // A re-qualifies the pair by undoing and swiping again.
        undo_swipe(&mut conn, a, b).unwrap();
        let outcome = record_swipe(&mut conn, a, b, SwipeDirection::Like).unwrap();

        let revived = outcome.match_outcome.expect("expected a rematch");
        assert!(revived.rematch);
        assert_eq!(revived.record.id, original.id);

        let rows = match_rows(&mut conn, a, b);
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].unmatched);
    }
}
