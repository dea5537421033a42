//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Hash, Metadata, NativeScript, PlutusScript, PlutusVersion, cbor, cbor::ToCbor};

/// Data attached to a transaction without taking part in its validation: metadata, and scripts
/// published alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuxiliaryData {
    metadata: Metadata,
    native_scripts: Vec<NativeScript>,
    plutus_scripts: Vec<PlutusScript>,
}

// -------------------------------------------------------------------- Building

impl AuxiliaryData {
    pub fn new(
        metadata: Metadata,
        native_scripts: Vec<NativeScript>,
        plutus_scripts: Vec<PlutusScript>,
    ) -> Self {
        Self {
            metadata,
            native_scripts,
            plutus_scripts,
        }
    }
}

// ------------------------------------------------------------------ Inspecting

impl AuxiliaryData {
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty() && self.native_scripts.is_empty() && self.plutus_scripts.is_empty()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The hash committed to in the transaction body.
    pub fn hash(&self) -> Hash<32> {
        Hash::blake2b_256(&self.to_cbor())
    }

    fn plutus_scripts(&self, version: PlutusVersion) -> Vec<&PlutusScript> {
        self.plutus_scripts
            .iter()
            .filter(|script| script.version() == version)
            .collect()
    }
}

// -------------------------------------------------------------------- Encoding

impl<C> cbor::Encode<C> for AuxiliaryData {
    fn encode<W: cbor::encode::write::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        let scripts = [
            (2, self.plutus_scripts(PlutusVersion::V1)),
            (3, self.plutus_scripts(PlutusVersion::V2)),
            (4, self.plutus_scripts(PlutusVersion::V3)),
        ];

        let len = u64::from(!self.metadata.is_empty())
            + u64::from(!self.native_scripts.is_empty())
            + scripts.iter().filter(|(_, s)| !s.is_empty()).count() as u64;

        e.tag(cbor::data::Tag::new(cbor::TAG_AUXILIARY_DATA))?;
        e.map(len)?;

        if !self.metadata.is_empty() {
            e.u8(0)?;
            e.encode_with(&self.metadata, ctx)?;
        }

        if !self.native_scripts.is_empty() {
            e.u8(1)?;
            e.encode_with(&self.native_scripts, ctx)?;
        }

        for (key, scripts) in scripts.iter().filter(|(_, s)| !s.is_empty()) {
            e.u8(*key)?;
            e.array(scripts.len() as u64)?;
            for script in scripts {
                e.encode_with(*script, ctx)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Metadatum, plutus_script};

    #[test]
    fn metadata_only() {
        let aux = AuxiliaryData::new(
            Metadata::default().with(1, Metadatum::Int(2)),
            vec![],
            vec![],
        );
        assert_eq!(hex::encode(aux.to_cbor()), "d90103a100a10102");
    }

    #[test]
    fn scripts_are_grouped_by_version() {
        let aux = AuxiliaryData::new(
            Metadata::default(),
            vec![NativeScript::InvalidBefore(1)],
            vec![
                plutus_script!(PlutusVersion::V3, "01"),
                plutus_script!(PlutusVersion::V1, "02"),
            ],
        );
        assert_eq!(
            hex::encode(aux.to_cbor()),
            "d90103a301818204010281410204814101",
        );
    }

    #[test]
    fn empty() {
        assert!(AuxiliaryData::default().is_empty());
    }
}
