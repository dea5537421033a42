//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{
    AuxiliaryData, Hash, Input, Output, ProtocolParameters, TransactionBody, WitnessSet, cbor,
    cbor::ToCbor,
};
use std::fmt;

pub mod body;
pub mod builder;
pub mod summary;

/// A fully assembled transaction: its body, witnesses and auxiliary data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    body: TransactionBody,
    witness_set: WitnessSet,
    auxiliary_data: Option<AuxiliaryData>,
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transaction({})", self.id())
    }
}

// -------------------------------------------------------------------- Building

impl Transaction {
    pub fn new(
        body: TransactionBody,
        witness_set: WitnessSet,
        auxiliary_data: Option<AuxiliaryData>,
    ) -> Self {
        Self {
            body,
            witness_set,
            auxiliary_data,
        }
    }

    /// Start building a new transaction; see [`builder::TransactionBuilder`].
    pub fn builder(params: &ProtocolParameters) -> builder::TransactionBuilder<'_> {
        builder::TransactionBuilder::new(params)
    }
}

// ------------------------------------------------------------------ Inspecting

impl Transaction {
    /// The transaction id, hash of the serialised body.
    pub fn id(&self) -> Hash<32> {
        self.body.id()
    }

    pub fn body(&self) -> &TransactionBody {
        &self.body
    }

    pub fn witness_set(&self) -> &WitnessSet {
        &self.witness_set
    }

    pub fn auxiliary_data(&self) -> Option<&AuxiliaryData> {
        self.auxiliary_data.as_ref()
    }

    pub fn fee(&self) -> u64 {
        self.body.fee
    }

    pub fn total_collateral(&self) -> Option<u64> {
        self.body.total_collateral
    }

    pub fn inputs(&self) -> &[Input] {
        &self.body.inputs
    }

    pub fn outputs(&self) -> &[Output] {
        &self.body.outputs
    }

    pub fn collateral_return(&self) -> Option<&Output> {
        self.body.collateral_return.as_ref()
    }

    /// Size of the serialised transaction, in bytes.
    pub fn size(&self) -> usize {
        self.to_cbor().len()
    }
}

// -------------------------------------------------------------------- Encoding

impl<C> cbor::Encode<C> for Transaction {
    fn encode<W: cbor::encode::write::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        e.array(4)?;
        e.encode_with(&self.body, ctx)?;
        e.encode_with(&self.witness_set, ctx)?;
        e.bool(true)?;
        match &self.auxiliary_data {
            Some(auxiliary_data) => e.encode_with(auxiliary_data, ctx)?,
            None => e.null()?,
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope() {
        let tx = Transaction::new(TransactionBody::default(), WitnessSet::default(), None);
        assert_eq!(hex::encode(tx.to_cbor()), "84a3008001800200a0f5f6");
    }
}
