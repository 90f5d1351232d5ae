//! Tenant-contract share validation.
//!
//! Each tenant on a contract holds a percentage share of the unit. A single
//! share must lie in (0, 100], and the shares on one contract must never sum
//! past 100. The storage layer enforces the sum transactionally (contract
//! row locked, shares re-read inside the same transaction); the functions
//! here are the pure rule it applies.

use rust_decimal::Decimal;

/// Upper bound for a contract's combined shares.
pub const FULL_SHARE: Decimal = Decimal::ONE_HUNDRED;

/// Returns true if a single share percentage is valid: 0 < p <= 100.
#[must_use]
pub fn is_valid_share(percentage: Decimal) -> bool {
    percentage > Decimal::ZERO && percentage <= FULL_SHARE
}

/// Sums the existing shares on a contract.
#[must_use]
pub fn share_sum(existing: &[Decimal]) -> Decimal {
    existing.iter().copied().sum()
}

/// Returns true if adding `new_share` to the existing shares keeps the
/// contract at or under 100%.
#[must_use]
pub fn share_fits(existing: &[Decimal], new_share: Decimal) -> bool {
    share_sum(existing) + new_share <= FULL_SHARE
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_share_bounds() {
        assert!(is_valid_share(dec!(0.01)));
        assert!(is_valid_share(dec!(50)));
        assert!(is_valid_share(dec!(100)));
        assert!(!is_valid_share(dec!(0)));
        assert!(!is_valid_share(dec!(-10)));
        assert!(!is_valid_share(dec!(100.01)));
    }

    #[test]
    fn test_share_fits() {
        assert!(share_fits(&[dec!(50)], dec!(50)));
        assert!(share_fits(&[], dec!(100)));
        assert!(!share_fits(&[dec!(60)], dec!(50)));
        assert!(!share_fits(&[dec!(40), dec!(40)], dec!(30)));
    }

    fn share_strategy() -> impl Strategy<Value = Decimal> {
        // Shares with two decimal places in (0, 100]
        (1u32..=10_000).prop_map(|cents| Decimal::new(i64::from(cents), 2))
    }

    proptest! {
        /// Any share accepted by `share_fits` keeps the total at or under
        /// 100.
        #[test]
        fn prop_accepted_share_keeps_sum_bounded(
            existing in prop::collection::vec(share_strategy(), 0..4),
            new_share in share_strategy(),
        ) {
            if share_fits(&existing, new_share) {
                prop_assert!(share_sum(&existing) + new_share <= FULL_SHARE);
            }
        }

        /// Two shares can each fit the same contract independently while
        /// their combination does not. This is exactly the race the storage
        /// layer closes by re-checking inside the writing transaction.
        #[test]
        fn prop_independent_checks_can_both_pass(
            base in share_strategy(),
        ) {
            prop_assume!(base <= dec!(50));
            let existing = vec![FULL_SHARE - base - base + Decimal::new(1, 2)];
            // Each fits alone against the same snapshot...
            if share_fits(&existing, base) && share_fits(&existing, base) {
                // ...but applying both sequentially must fail the second.
                let mut applied = existing.clone();
                applied.push(base);
                prop_assert!(!share_fits(&applied, base));
            }
        }
    }
}
