//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::cbor;
use std::{cmp::Ordering, fmt};

/// Execution costs of a script, in memory units and CPU steps.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    cbor::Encode,
    cbor::Decode,
    serde::Deserialize,
    serde::Serialize,
)]
#[cbor(array)]
pub struct ExecutionUnits {
    #[n(0)]
    #[serde(alias = "memory")]
    mem: u64,
    #[n(1)]
    #[serde(alias = "cpu")]
    steps: u64,
}

impl fmt::Display for ExecutionUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionUnits")
            .field("mem", &self.mem())
            .field("steps", &self.steps())
            .finish()
    }
}

impl PartialOrd for ExecutionUnits {
    fn partial_cmp(&self, rhs: &Self) -> Option<Ordering> {
        Some(self.cmp(rhs))
    }
}

impl Ord for ExecutionUnits {
    fn cmp(&self, rhs: &Self) -> Ordering {
        match self.mem().cmp(&rhs.mem()) {
            Ordering::Equal => self.steps().cmp(&rhs.steps()),
            ordering @ Ordering::Less | ordering @ Ordering::Greater => ordering,
        }
    }
}

// ------------------------------------------------------------------ Inspecting

impl ExecutionUnits {
    pub fn mem(&self) -> u64 {
        self.mem
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }
}

// -------------------------------------------------------------------- Building

impl ExecutionUnits {
    pub fn new(mem: u64, steps: u64) -> Self {
        Self { mem, steps }
    }

    /// Component-wise sum, saturating at the numeric bounds.
    pub fn saturating_add(self, rhs: Self) -> Self {
        Self {
            mem: self.mem.saturating_add(rhs.mem),
            steps: self.steps.saturating_add(rhs.steps),
        }
    }
}

impl std::iter::Sum for ExecutionUnits {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Self::saturating_add)
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod tests {
    use crate::{ExecutionUnits, any, cbor, cbor::ToCbor};
    use proptest::prelude::*;

    // -------------------------------------------------------------- Unit tests

    #[test]
    fn display_execution_units() {
        assert_eq!(
            ExecutionUnits::default().to_string(),
            "ExecutionUnits { mem: 0, steps: 0 }",
        );
    }

    #[test]
    fn encode_as_pair() {
        assert_eq!(hex::encode(ExecutionUnits::new(1, 500).to_cbor()), "82011901f4");
    }

    // -------------------------------------------------------------- Properties

    proptest! {
        #[test]
        fn cbor_roundtrip(execution_units in any::execution_units()) {
            let bytes = execution_units.to_cbor();
            prop_assert_eq!(cbor::decode::<ExecutionUnits>(&bytes).unwrap(), execution_units);
        }
    }

    // -------------------------------------------------------------- Generators

    pub mod generators {
        use super::*;

        prop_compose! {
            pub fn execution_units()(mem in any::<u64>(), steps in any::<u64>()) -> ExecutionUnits {
                ExecutionUnits::new(mem, steps)
            }
        }
    }
}
