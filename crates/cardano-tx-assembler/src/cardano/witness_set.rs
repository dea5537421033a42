//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{
    Era, NativeScript, PlutusData, PlutusScript, PlutusVersion, Redeemer, VKeyWitness, cbor,
    redeemer::Redeemers,
};

/// Everything that proves a transaction may do what it does: signatures, scripts, datums and
/// redeemers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WitnessSet {
    pub era: Era,
    pub vkey_witnesses: Vec<VKeyWitness>,
    pub native_scripts: Vec<NativeScript>,
    pub plutus_scripts: Vec<PlutusScript>,
    pub datums: Vec<PlutusData>,
    pub redeemers: Vec<Redeemer>,
}

impl WitnessSet {
    pub fn redeemers(&self) -> Redeemers<'_> {
        Redeemers::new(self.era, &self.redeemers)
    }

    fn plutus_scripts(&self, version: PlutusVersion) -> Vec<&PlutusScript> {
        self.plutus_scripts
            .iter()
            .filter(|script| script.version() == version)
            .collect()
    }
}

// -------------------------------------------------------------------- Encoding

impl<C> cbor::Encode<C> for WitnessSet {
    fn encode<W: cbor::encode::write::Write>(
        &self,
        e: &mut cbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), cbor::encode::Error<W::Error>> {
        let v1 = self.plutus_scripts(PlutusVersion::V1);
        let v2 = self.plutus_scripts(PlutusVersion::V2);
        let v3 = self.plutus_scripts(PlutusVersion::V3);

        let len = [
            self.vkey_witnesses.is_empty(),
            self.native_scripts.is_empty(),
            v1.is_empty(),
            self.datums.is_empty(),
            self.redeemers.is_empty(),
            v2.is_empty(),
            v3.is_empty(),
        ]
        .iter()
        .filter(|is_empty| !**is_empty)
        .count();

        e.map(len as u64)?;

        if !self.vkey_witnesses.is_empty() {
            e.u8(0)?;
            self.era.encode_set(e, self.vkey_witnesses.iter(), ctx)?;
        }

        if !self.native_scripts.is_empty() {
            e.u8(1)?;
            self.era.encode_set(e, self.native_scripts.iter(), ctx)?;
        }

        if !v1.is_empty() {
            e.u8(3)?;
            self.era.encode_set(e, v1.iter().copied(), ctx)?;
        }

        if !self.datums.is_empty() {
            e.u8(4)?;
            self.era.encode_set(e, self.datums.iter(), ctx)?;
        }

        if !self.redeemers.is_empty() {
            e.u8(5)?;
            e.encode_with(self.redeemers(), ctx)?;
        }

        if !v2.is_empty() {
            e.u8(6)?;
            self.era.encode_set(e, v2.iter().copied(), ctx)?;
        }

        if !v3.is_empty() {
            e.u8(7)?;
            self.era.encode_set(e, v3.iter().copied(), ctx)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExecutionUnits, RedeemerTag, cbor::ToCbor, plutus_script};

    #[test]
    fn empty_witness_set() {
        assert_eq!(hex::encode(WitnessSet::default().to_cbor()), "a0");
    }

    #[test]
    fn babbage_witness_set() {
        let witness_set = WitnessSet {
            era: Era::Babbage,
            vkey_witnesses: vec![VKeyWitness::placeholder()],
            plutus_scripts: vec![plutus_script!(PlutusVersion::V2, "01")],
            redeemers: vec![
                Redeemer::new(RedeemerTag::Spend, 0, PlutusData::integer(0))
                    .with_execution_units(ExecutionUnits::new(1, 2)),
            ],
            ..WitnessSet::default()
        };
        assert_eq!(
            hex::encode(witness_set.to_cbor()),
            format!(
                "a3008182{}{}05818400000082010206814101",
                format_args!("5820{}", "00".repeat(32)),
                format_args!("5840{}", "00".repeat(64)),
            ),
        );
    }

    #[test]
    fn conway_witness_set_tags_sets() {
        let witness_set = WitnessSet {
            era: Era::Conway,
            native_scripts: vec![NativeScript::InvalidHereafter(1)],
            plutus_scripts: vec![plutus_script!(PlutusVersion::V3, "01")],
            datums: vec![PlutusData::integer(1)],
            ..WitnessSet::default()
        };
        assert_eq!(
            hex::encode(witness_set.to_cbor()),
            "a301d9010281820501 04d901028101 07d90102814101".replace(' ', ""),
        );
    }
}
