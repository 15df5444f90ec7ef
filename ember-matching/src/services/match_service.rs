use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use ember_shared::errors::AppResult;

use crate::matching::{canonical_pair, SwipeDirection};
use crate::models::{Match, NewMatch};
use crate::schema::{matches, swipes};

#[derive(Debug)]
pub struct MatchOutcome {
    pub record: Match,
    /// True when a previously unmatched pair was revived instead of created.
    pub rematch: bool,
}

/// Mutual-match detection for a just-recorded swipe.
///
/// Runs only for positive directions. Looks up the reverse swipe; when it is
/// also positive, upserts the canonical Match row. The insert goes through
/// `ON CONFLICT DO NOTHING` against the unique (user1_id, user2_id)
/// constraint, so two reciprocal swipes landing at the same instant both
/// converge on the single surviving row instead of racing a read-then-write
/// check.
///
/// A surviving row with the tombstone set is flipped back to active: the
/// pair unmatched at some point and has now re-qualified through a fresh
/// reciprocal swipe.
pub fn try_create_match(
    conn: &mut PgConnection,
    user_a: Uuid,
    user_b: Uuid,
    direction_just_recorded: SwipeDirection,
) -> AppResult<Option<MatchOutcome>> {
    if !direction_just_recorded.is_positive() {
        return Ok(None);
    }

    let reverse: Option<crate::models::Swipe> = swipes::table
        .filter(swipes::swiper_id.eq(user_b))
        .filter(swipes::target_id.eq(user_a))
        .first(conn)
        .optional()?;

    let Some(reverse) = reverse else {
        return Ok(None);
    };
    if !reverse.direction().is_positive() {
        return Ok(None);
    }

    let (user1_id, user2_id) = canonical_pair(user_a, user_b);

    diesel::insert_into(matches::table)
        .values(&NewMatch { user1_id, user2_id })
        .on_conflict((matches::user1_id, matches::user2_id))
        .do_nothing()
        .execute(conn)?;

    let record: Match = matches::table
        .filter(matches::user1_id.eq(user1_id))
        .filter(matches::user2_id.eq(user2_id))
        .first(conn)?;

    if record.unmatched {
        let revived: Match = diesel::update(matches::table.find(record.id))
            .set(matches::unmatched.eq(false))
            .get_result(conn)?;
        tracing::info!(match_id = %revived.id, "previously unmatched pair re-matched");
        return Ok(Some(MatchOutcome { record: revived, rematch: true }));
    }

    Ok(Some(MatchOutcome { record, rematch: false }))
}
