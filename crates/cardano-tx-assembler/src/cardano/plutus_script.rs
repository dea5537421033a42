//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Hash, PlutusVersion, cbor};

/// A compiled (flat-encoded, CBOR-wrapped) Plutus script, tagged with its language version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PlutusScript(PlutusVersion, Vec<u8>);

// --------------------------------------------------------------------- Building

impl PlutusScript {
    /// See also [`plutus_script!`](crate::plutus_script).
    pub fn new(version: PlutusVersion, script: Vec<u8>) -> Self {
        Self(version, script)
    }
}

// ------------------------------------------------------------------ Inspecting

impl PlutusScript {
    pub fn version(&self) -> PlutusVersion {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.1
    }

    pub fn size(&self) -> u64 {
        self.1.len() as u64
    }

    pub fn hash(&self) -> Hash<28> {
        let mut buffer: Vec<u8> = vec![u8::from(self.0)];
        buffer.extend_from_slice(self.1.as_slice());
        Hash::blake2b_224(&buffer)
    }
}

// -------------------------------------------------------------------- Encoding

/// Scripts are serialised as plain byte strings; their version is implied by where they sit.
impl<C> cbor::Encode<C> for PlutusScript {
    fn encode<W: cbor::encode::write::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        e.bytes(&self.1)?;
        Ok(())
    }
}
