//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Era, Hash, Input, MultiAsset, NetworkId, Output, cbor, cbor::ToCbor};

/// The part of a transaction that gets signed, and whose hash is the transaction id.
///
/// Certificates, withdrawals and governance fields are not supported.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransactionBody {
    pub era: Era,
    /// Spent inputs, sorted and without duplicates.
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
    pub fee: u64,
    pub ttl: Option<u64>,
    pub auxiliary_data_hash: Option<Hash<32>>,
    pub validity_interval_start: Option<u64>,
    pub mint: MultiAsset,
    pub script_data_hash: Option<Hash<32>>,
    /// Collateral inputs, sorted and without duplicates.
    pub collateral: Vec<Input>,
    pub required_signers: Vec<Hash<28>>,
    pub network_id: Option<NetworkId>,
    pub collateral_return: Option<Output>,
    pub total_collateral: Option<u64>,
    /// Reference inputs, sorted and without duplicates.
    pub reference_inputs: Vec<Input>,
}

impl TransactionBody {
    pub fn id(&self) -> Hash<32> {
        Hash::blake2b_256(&self.to_cbor())
    }
}

// -------------------------------------------------------------------- Encoding

impl<C> cbor::Encode<C> for TransactionBody {
    fn encode<W: cbor::encode::write::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        let len = 3
            + u64::from(self.ttl.is_some())
            + u64::from(self.auxiliary_data_hash.is_some())
            + u64::from(self.validity_interval_start.is_some())
            + u64::from(!self.mint.is_empty())
            + u64::from(self.script_data_hash.is_some())
            + u64::from(!self.collateral.is_empty())
            + u64::from(!self.required_signers.is_empty())
            + u64::from(self.network_id.is_some())
            + u64::from(self.collateral_return.is_some())
            + u64::from(self.total_collateral.is_some())
            + u64::from(!self.reference_inputs.is_empty());

        e.map(len)?;

        e.u8(0)?;
        self.era.encode_set(e, self.inputs.iter(), ctx)?;

        e.u8(1)?;
        e.encode_with(&self.outputs, ctx)?;

        e.u8(2)?;
        e.u64(self.fee)?;

        if let Some(ttl) = self.ttl {
            e.u8(3)?;
            e.u64(ttl)?;
        }

        if let Some(hash) = &self.auxiliary_data_hash {
            e.u8(7)?;
            e.encode_with(hash, ctx)?;
        }

        if let Some(slot) = self.validity_interval_start {
            e.u8(8)?;
            e.u64(slot)?;
        }

        if !self.mint.is_empty() {
            e.u8(9)?;
            e.encode_with(&self.mint, ctx)?;
        }

        if let Some(hash) = &self.script_data_hash {
            e.u8(11)?;
            e.encode_with(hash, ctx)?;
        }

        if !self.collateral.is_empty() {
            e.u8(13)?;
            self.era.encode_set(e, self.collateral.iter(), ctx)?;
        }

        if !self.required_signers.is_empty() {
            e.u8(14)?;
            self.era.encode_set(e, self.required_signers.iter(), ctx)?;
        }

        if let Some(network_id) = self.network_id {
            e.u8(15)?;
            e.encode_with(network_id, ctx)?;
        }

        if let Some(output) = &self.collateral_return {
            e.u8(16)?;
            e.encode_with(output, ctx)?;
        }

        if let Some(total_collateral) = self.total_collateral {
            e.u8(17)?;
            e.u64(total_collateral)?;
        }

        if !self.reference_inputs.is_empty() {
            e.u8(18)?;
            self.era.encode_set(e, self.reference_inputs.iter(), ctx)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input;

    const TX_ID: &str = "702206530b2e1566e90b3aec753bd0abbf397842bd5421e0c3d23ed10167b3ce";

    #[test]
    fn minimal_babbage_body() {
        let body = TransactionBody {
            inputs: vec![input!(TX_ID, 0)],
            fee: 170000,
            ..TransactionBody::default()
        };
        assert_eq!(
            hex::encode(body.to_cbor()),
            format!("a30081825820{TX_ID}00018002 1a00029810").replace(' ', ""),
        );
    }

    #[test]
    fn conway_body_tags_sets() {
        let body = TransactionBody {
            era: Era::Conway,
            inputs: vec![input!(TX_ID, 0)],
            fee: 0,
            network_id: Some(NetworkId::Mainnet),
            total_collateral: Some(5),
            ..TransactionBody::default()
        };
        assert_eq!(
            hex::encode(body.to_cbor()),
            format!("a500d9010281825820{TX_ID}0001800200 0f01 1105").replace(' ', ""),
        );
    }

    #[test]
    fn id_is_the_hash_of_the_body() {
        let body = TransactionBody::default();
        assert_eq!(body.id(), Hash::blake2b_256(&body.to_cbor()));
    }
}
