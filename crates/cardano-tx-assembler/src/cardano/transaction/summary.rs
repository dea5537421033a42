//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Error, Hash, Input, Redeemer, cbor, redeemer::decode_redeemers};

/// A few figures read back from a serialised transaction, regardless of who built it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSummary {
    pub id: Hash<32>,
    pub inputs: Vec<Input>,
    pub fee: u64,
    pub total_collateral: Option<u64>,
    pub redeemers: Vec<Redeemer>,
}

impl TransactionSummary {
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, Error> {
        let mut d = cbor::Decoder::new(bytes);

        d.array()?;

        let body_start = d.position();
        let (inputs, fee, total_collateral) = decode_body(&mut d)?;
        let id = Hash::blake2b_256(&bytes[body_start..d.position()]);

        let redeemers = decode_witness_set(&mut d)?;

        Ok(Self {
            id,
            inputs,
            fee: fee.ok_or_else(|| Error::Precondition("transaction has no fee".to_string()))?,
            total_collateral,
            redeemers,
        })
    }
}

type Body = (Vec<Input>, Option<u64>, Option<u64>);

fn decode_body(d: &mut cbor::Decoder<'_>) -> Result<Body, Error> {
    let mut inputs = Vec::new();
    let mut fee = None;
    let mut total_collateral = None;
    cbor::decode_map(d, |d| {
        match d.u64()? {
            0 => {
                cbor::skip_set_tag(d)?;
                inputs = cbor::decode_array(d, |d| d.decode())?;
            }
            2 => fee = Some(d.u64()?),
            17 => total_collateral = Some(d.u64()?),
            _ => d.skip()?,
        }
        Ok(((), ()))
    })?;
    Ok((inputs, fee, total_collateral))
}

fn decode_witness_set(d: &mut cbor::Decoder<'_>) -> Result<Vec<Redeemer>, Error> {
    let mut redeemers = Vec::new();
    cbor::decode_map(d, |d| {
        match d.u64()? {
            5 => redeemers = decode_redeemers(d)?,
            _ => d.skip()?,
        }
        Ok(((), ()))
    })?;
    Ok(redeemers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_garbage() {
        assert!(TransactionSummary::from_cbor(&[0x01]).is_err());
    }

    #[test]
    fn require_a_fee() {
        let result = TransactionSummary::from_cbor(&hex::decode("84a0a0f5f6").unwrap());
        assert!(matches!(result, Err(Error::Precondition(..))));
    }

    #[test]
    fn minimal_transaction() {
        let bytes = hex::decode("84a30080018002182aa0f5f6").unwrap();
        let summary = TransactionSummary::from_cbor(&bytes).unwrap();
        assert!(summary.inputs.is_empty());
        assert_eq!(summary.fee, 42);
        assert_eq!(summary.total_collateral, None);
        assert!(summary.redeemers.is_empty());
        assert_eq!(summary.id, Hash::blake2b_256(&bytes[1..9]));
    }

    #[test]
    fn inputs_in_either_set_form() {
        let id = "ff".repeat(32);
        for inputs in [format!("81825820{id}07"), format!("d9010281825820{id}07")] {
            let bytes = hex::decode(format!("84a200{inputs}02182aa0f5f6")).unwrap();
            let summary = TransactionSummary::from_cbor(&bytes).unwrap();
            assert_eq!(summary.inputs, vec![Input::new(Hash::from([0xff; 32]), 7)]);
        }
    }

    #[test]
    fn reject_unknown_tags_on_inputs() {
        let bytes = hex::decode("84a200d9010380021801a0f5f6").unwrap();
        assert!(TransactionSummary::from_cbor(&bytes).is_err());
    }
}
