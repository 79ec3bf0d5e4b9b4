//! Invariant round-trip helper.

use salesarena_core::aggregate::AggregateRoot;

/// Checks that `aggregate` currently satisfies its invariants, that
/// `corrupt` breaks them, and that `restore` repairs them.
///
/// The closures get the aggregate mutably; they are expected to reach the
/// props through the test-only unchecked accessor.
///
/// # Panics
///
/// Panics with a descriptive message if any of the three checks fails.
pub fn assert_invariant_round_trip<A: AggregateRoot>(
    aggregate: &mut A,
    corrupt: impl FnOnce(&mut A),
    restore: impl FnOnce(&mut A),
) {
    assert!(
        aggregate.validate_invariants().is_ok(),
        "{} {} should start valid",
        A::KIND,
        aggregate.id()
    );

    corrupt(aggregate);
    assert!(
        aggregate.validate_invariants().is_err(),
        "{} {} should be invalid after corruption",
        A::KIND,
        aggregate.id()
    );

    restore(aggregate);
    assert!(
        aggregate.validate_invariants().is_ok(),
        "{} {} should be valid again after restore",
        A::KIND,
        aggregate.id()
    );
}
