//! Consumption record rules.
//!
//! A consumption record is keyed by `(contract, consumption type, period)`.
//! The database enforces this with a unique index; the pure check here
//! mirrors it so duplicate detection (and the safe-retry upsert built on
//! it) can be tested without storage.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rentora_shared::types::BillingPeriod;

/// Kind of utility a consumption record measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumptionType {
    /// Electricity meter readings.
    Electricity,
    /// Cold/hot water.
    Water,
    /// Gas.
    Gas,
    /// District or central heating.
    Heating,
    /// Anything metered that does not fit the above.
    Other,
}

impl ConsumptionType {
    /// Returns the string representation of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Electricity => "electricity",
            Self::Water => "water",
            Self::Gas => "gas",
            Self::Heating => "heating",
            Self::Other => "other",
        }
    }

    /// Parses a consumption type from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "electricity" => Some(Self::Electricity),
            "water" => Some(Self::Water),
            "gas" => Some(Self::Gas),
            "heating" => Some(Self::Heating),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// The natural key of a consumption record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReadingKey {
    /// Contract the reading belongs to.
    pub contract_id: Uuid,
    /// What was measured.
    pub consumption_type: ConsumptionType,
    /// Billing month.
    pub period: BillingPeriod,
}

/// Returns true if no record with the same natural key exists yet.
#[must_use]
pub fn is_reading_unique<S: std::hash::BuildHasher>(
    existing: &HashSet<ReadingKey, S>,
    key: &ReadingKey,
) -> bool {
    !existing.contains(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(contract: Uuid, kind: ConsumptionType, period: &str) -> ReadingKey {
        ReadingKey {
            contract_id: contract,
            consumption_type: kind,
            period: period.parse().unwrap(),
        }
    }

    #[test]
    fn test_same_key_is_duplicate() {
        let contract = Uuid::new_v4();
        let mut existing = HashSet::new();
        existing.insert(key(contract, ConsumptionType::Water, "2026-03"));

        assert!(!is_reading_unique(
            &existing,
            &key(contract, ConsumptionType::Water, "2026-03")
        ));
    }

    #[test]
    fn test_key_components_discriminate() {
        let contract = Uuid::new_v4();
        let mut existing = HashSet::new();
        existing.insert(key(contract, ConsumptionType::Water, "2026-03"));

        // Different period
        assert!(is_reading_unique(
            &existing,
            &key(contract, ConsumptionType::Water, "2026-04")
        ));
        // Different type
        assert!(is_reading_unique(
            &existing,
            &key(contract, ConsumptionType::Gas, "2026-03")
        ));
        // Different contract
        assert!(is_reading_unique(
            &existing,
            &key(Uuid::new_v4(), ConsumptionType::Water, "2026-03")
        ));
    }

    #[test]
    fn test_type_round_trip() {
        for kind in [
            ConsumptionType::Electricity,
            ConsumptionType::Water,
            ConsumptionType::Gas,
            ConsumptionType::Heating,
            ConsumptionType::Other,
        ] {
            assert_eq!(ConsumptionType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ConsumptionType::parse("solar"), None);
    }
}
