use uuid::Uuid;

/// Canonical encoding of an unordered user pair: smaller id first.
///
/// Match rows are stored and looked up under this key; the database enforces
/// `user1_id < user2_id` plus uniqueness on the pair.
pub fn canonical_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_smaller_id_first() {
        let lo = Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap();
        let hi = Uuid::parse_str("00000000-0000-0000-0000-000000000002").unwrap();
        assert_eq!(canonical_pair(lo, hi), (lo, hi));
        assert_eq!(canonical_pair(hi, lo), (lo, hi));
    }

    #[test]
    fn is_symmetric_for_random_pairs() {
        for _ in 0..32 {
            let a = Uuid::new_v4();
            let b = Uuid::new_v4();
            assert_eq!(canonical_pair(a, b), canonical_pair(b, a));
            let (lo, hi) = canonical_pair(a, b);
            assert!(lo < hi);
        }
    }
}
