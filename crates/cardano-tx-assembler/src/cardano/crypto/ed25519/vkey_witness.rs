//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Signature, Signer, VerificationKey, cbor};

/// A verification key alongside its signature of the transaction id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Deserialize)]
pub struct VKeyWitness {
    pub vkey: VerificationKey,
    pub signature: Signature,
}

impl VKeyWitness {
    pub fn new(vkey: VerificationKey, signature: Signature) -> Self {
        Self { vkey, signature }
    }

    /// Sign the given transaction id.
    pub fn sign(signer: &(impl Signer + ?Sized), transaction_id: &[u8]) -> Self {
        Self::new(signer.verification_key(), signer.sign(transaction_id))
    }

    /// A zero-filled witness, standing in for a signature that will be added after the
    /// transaction is built.
    pub fn placeholder() -> Self {
        Self::new(VerificationKey::placeholder(), Signature::placeholder())
    }
}

// -------------------------------------------------------------------- Encoding

impl<C> cbor::Encode<C> for VKeyWitness {
    fn encode<W: cbor::encode::write::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        e.array(2)?;
        e.encode_with(self.vkey, ctx)?;
        e.encode_with(self.signature, ctx)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SigningKey, cbor::ToCbor};

    #[test]
    fn placeholder_encoding() {
        assert_eq!(
            hex::encode(VKeyWitness::placeholder().to_cbor()),
            format!("825820{}5840{}", "00".repeat(32), "00".repeat(64)),
        );
    }

    #[test]
    fn signed_witness_verifies() {
        let key = SigningKey::from([3; 32]);
        let witness = VKeyWitness::sign(&key, &[1; 32]);
        assert!(witness.vkey.verify([1; 32], &witness.signature));
    }
}
