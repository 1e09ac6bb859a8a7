use checkin_kiosk::checkin::{CooldownFilter, Decision, SessionRegistry};
use proptest::prelude::*;
use std::time::{Duration, Instant};

const COOLDOWN: Duration = Duration::from_millis(3000);

fn identifier() -> impl Strategy<Value = String> {
    "STU[0-9]{1,3}"
}

proptest! {
    #[test]
    fn test_no_two_admissions_within_cooldown(
        scans in prop::collection::vec((0u64..2000, identifier()), 1..60)
    ) {
        let start = Instant::now();
        let mut filter = CooldownFilter::new(COOLDOWN);
        let registry = SessionRegistry::new();
        let mut at = start;
        let mut admitted: Vec<Instant> = Vec::new();

        for (gap, id) in &scans {
            at += Duration::from_millis(*gap);
            if filter.admit(id, at, &registry).proceeds() {
                admitted.push(at);
            }
        }

        for pair in admitted.windows(2) {
            prop_assert!(pair[1] - pair[0] >= COOLDOWN);
        }
    }

    #[test]
    fn test_second_scan_inside_window_is_silent(
        first in identifier(),
        second in identifier(),
        gap in 0u64..3000,
    ) {
        let start = Instant::now();
        let mut filter = CooldownFilter::new(COOLDOWN);
        let registry = SessionRegistry::new();

        prop_assert_eq!(filter.admit(&first, start, &registry), Decision::Proceed);
        prop_assert_eq!(
            filter.admit(&second, start + Duration::from_millis(gap), &registry),
            Decision::SuppressedByCooldown
        );
    }

    #[test]
    fn test_registered_identifier_is_duplicate(id in identifier(), gap in 3000u64..60_000) {
        let start = Instant::now();
        let mut filter = CooldownFilter::new(COOLDOWN);
        let mut registry = SessionRegistry::new();

        prop_assert!(filter.admit(&id, start, &registry).proceeds());
        prop_assert!(registry.record(id.clone(), "08:00:00".into()));

        prop_assert_eq!(
            filter.admit(&id, start + Duration::from_millis(gap), &registry),
            Decision::SuppressedAsDuplicate
        );
        prop_assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_keys_unique_and_recent_first(
        ids in prop::collection::vec(identifier(), 0..40)
    ) {
        let mut registry = SessionRegistry::new();
        for (n, id) in ids.iter().enumerate() {
            registry.record(id.clone(), format!("t{}", n));
        }

        let mut distinct = ids.clone();
        distinct.sort();
        distinct.dedup();
        prop_assert_eq!(registry.len(), distinct.len());

        // Most recent first: the first appearance order, reversed.
        let mut first_seen: Vec<&String> = Vec::new();
        for id in &ids {
            if !first_seen.contains(&id) {
                first_seen.push(id);
            }
        }
        let shown: Vec<&String> = registry.recent_first().map(|e| &e.identifier).collect();
        let expected: Vec<&String> = first_seen.into_iter().rev().collect();
        prop_assert_eq!(shown, expected);
    }
}
