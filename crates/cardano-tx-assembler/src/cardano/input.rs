//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Hash, cbor};
use std::fmt;

/// A reference to a past transaction output.
///
/// Inputs are ordered by transaction id first, and output index second; which is also the order
/// the ledger assigns them within a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Input {
    transaction_id: Hash<32>,
    output_index: u64,
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Input({}#{})", self.transaction_id, self.output_index)
    }
}

// -------------------------------------------------------------------- Building

impl Input {
    /// See also [`input!`](crate::input).
    pub fn new(transaction_id: Hash<32>, output_index: u64) -> Self {
        Self {
            transaction_id,
            output_index,
        }
    }
}

// ------------------------------------------------------------------ Inspecting

impl Input {
    pub fn transaction_id(&self) -> Hash<32> {
        self.transaction_id
    }

    pub fn output_index(&self) -> u64 {
        self.output_index
    }
}

// -------------------------------------------------------------------- Encoding

impl<C> cbor::Encode<C> for Input {
    fn encode<W: cbor::encode::write::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        e.array(2)?;
        e.bytes(self.transaction_id.as_ref())?;
        e.u64(self.output_index)?;
        Ok(())
    }
}

impl<'d, C> cbor::Decode<'d, C> for Input {
    fn decode(d: &mut cbor::Decoder<'d>, _ctx: &mut C) -> Result<Self, cbor::decode::Error> {
        if d.array()? != Some(2) {
            return Err(cbor::decode::Error::message("expected input as 2-element array"));
        }
        let transaction_id = Hash::try_from(d.bytes()?.to_vec())
            .map_err(|e| cbor::decode::Error::message(e.to_string()))?;
        Ok(Self::new(transaction_id, d.u64()?))
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod tests {
    use crate::{Input, any, cbor, cbor::ToCbor, hash};
    use proptest::prelude::*;

    // -------------------------------------------------------------- Unit tests

    #[test]
    fn display_input() {
        assert_eq!(
            Input::new(
                hash!("702206530b2e1566e90b3aec753bd0abbf397842bd5421e0c3d23ed10167b3ce"),
                42,
            )
            .to_string(),
            "Input(702206530b2e1566e90b3aec753bd0abbf397842bd5421e0c3d23ed10167b3ce#42)",
        );
    }

    #[test]
    fn inputs_sort_by_id_then_index() {
        let a = Input::new(hash!("00000000000000000000000000000000000000000000000000000000000000ff"), 1);
        let b = Input::new(hash!("0100000000000000000000000000000000000000000000000000000000000000"), 0);
        let c = Input::new(hash!("0100000000000000000000000000000000000000000000000000000000000000"), 2);
        let mut inputs = vec![c, b, a];
        inputs.sort();
        assert_eq!(inputs, vec![a, b, c]);
    }

    #[test]
    fn inputs_dedup_in_hash_sets() {
        let id = hash!("702206530b2e1566e90b3aec753bd0abbf397842bd5421e0c3d23ed10167b3ce");
        let inputs = std::collections::HashSet::from([
            Input::new(id, 0),
            Input::new(id, 1),
            Input::new(id, 0),
        ]);
        assert_eq!(inputs.len(), 2);
        assert!(inputs.contains(&Input::new(id, 1)));
    }

    proptest! {
        #[test]
        fn cbor_roundtrip(input in any::input()) {
            prop_assert_eq!(cbor::decode::<Input>(&input.to_cbor()).unwrap(), input);
        }
    }

    // -------------------------------------------------------------- Generators

    pub mod generators {
        use super::*;

        prop_compose! {
            pub fn input()(id in any::hash32(), ix in any::<u64>()) -> Input {
                Input::new(id, ix)
            }
        }
    }
}
